use crate::codec::decode_element;
use crate::codec::encode;
use crate::error::MarshalError;
use crate::tree::parse_document;
use crate::tree::write_document;
use crate::tree::XmlElement;
use crate::tree::XmlNode;
use crate::value::RpcValue;

/// Builds the `<methodCall>` tree for `method` with positional `args`.
///
/// Absent or empty arguments produce a `<params>` element holding only an
/// empty text placeholder.
pub fn build_call(method: &str, args: Option<&[RpcValue]>) -> Result<XmlElement, MarshalError> {
    let mut params = XmlElement::new("params");
    match args {
        Some(args) if !args.is_empty() => {
            for arg in args {
                params.push(
                    XmlElement::new("param")
                        .with_child(XmlElement::new("value").with_child(encode(arg)?)),
                );
            }
        }
        _ => params.push(XmlNode::text("")),
    }

    Ok(XmlElement::new("methodCall")
        .with_child(XmlElement::with_text("methodName", method))
        .with_child(params))
}

/// Serializes a method call to request text.
pub fn pack_message(method: &str, args: Option<&[RpcValue]>) -> Result<String, MarshalError> {
    write_document(&build_call(method, args)?)
}

/// Parses a response and decodes the first `<value>` below the root.
///
/// Responses are assumed to carry a single value; any later values are ignored.
/// A fault response decodes to its `faultCode`/`faultString` struct.
pub fn unpack_message(xml: &str) -> Result<RpcValue, MarshalError> {
    let root = parse_document(xml)?;
    let value = root
        .find_descendant("value")
        .ok_or(MarshalError::MissingValue)?;
    decode_element(value)
}
