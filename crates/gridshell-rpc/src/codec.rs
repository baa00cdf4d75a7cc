//! Conversion between [`RpcValue`] and XML-RPC element trees.

use chrono::Datelike;
use chrono::NaiveDateTime;

use crate::error::MarshalError;
use crate::tree::XmlElement;
use crate::tree::XmlNode;
use crate::value::format_number;
use crate::value::RpcValue;
use crate::value::Struct;

const DATE_FORMAT: &str = "%Y%m%dT%H%M%S";
// Form produced by Python's xmlrpclib.
const DATE_FORMAT_COLONS: &str = "%Y%m%dT%H:%M:%S";

/// How a top-level number is tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberStyle {
    /// `<int>` for whole numbers, `<double>` otherwise.
    #[default]
    Auto,
    /// Always `<double>`.
    Double,
}

pub fn encode(value: &RpcValue) -> Result<XmlNode, MarshalError> {
    encode_with(value, NumberStyle::Auto)
}

/// Encodes `value`; `style` only applies to a top-level number; nested
/// numbers always use [`NumberStyle::Auto`].
pub fn encode_with(value: &RpcValue, style: NumberStyle) -> Result<XmlNode, MarshalError> {
    let node = match value {
        RpcValue::String(s) => XmlElement::with_text("string", s.as_str()).into(),
        RpcValue::Number(n) => encode_number(*n, style)?.into(),
        RpcValue::Boolean(b) => {
            XmlElement::with_text("boolean", if *b { "true" } else { "false" }).into()
        }
        RpcValue::DateTime(dt) => encode_date(dt)?.into(),
        RpcValue::Null => XmlNode::text(""),
        RpcValue::List(items) => {
            let mut data = XmlElement::new("data");
            for item in items {
                data.push(XmlElement::new("value").with_child(encode(item)?));
            }
            XmlElement::new("array").with_child(data).into()
        }
        RpcValue::Struct(members) => {
            let mut node = XmlElement::new("struct");
            for (name, member) in members {
                node.push(
                    XmlElement::new("member")
                        .with_child(XmlElement::with_text("name", name.as_str()))
                        .with_child(XmlElement::new("value").with_child(encode(member)?)),
                );
            }
            if members.is_empty() {
                node.push(XmlNode::text(""));
            }
            node.into()
        }
    };
    Ok(node)
}

fn encode_number(n: f64, style: NumberStyle) -> Result<XmlElement, MarshalError> {
    if !n.is_finite() {
        return Err(MarshalError::UnsupportedType(format!(
            "non-finite number {}",
            n
        )));
    }
    let tag = if n.fract() != 0.0 || style == NumberStyle::Double {
        "double"
    } else {
        "int"
    };
    Ok(XmlElement::with_text(tag, format_number(n)))
}

fn encode_date(dt: &NaiveDateTime) -> Result<XmlElement, MarshalError> {
    if !(0..=9999).contains(&dt.year()) {
        return Err(MarshalError::UnsupportedType(format!(
            "date with year {} has no four-digit form",
            dt.year()
        )));
    }
    Ok(XmlElement::with_text(
        "dateTime.iso8601",
        dt.format(DATE_FORMAT).to_string(),
    ))
}

pub fn decode(node: &XmlNode) -> Result<RpcValue, MarshalError> {
    match node {
        XmlNode::Element(el) => decode_element(el),
        XmlNode::Text(text) => Ok(RpcValue::String(text.clone())),
    }
}

pub fn decode_element(el: &XmlElement) -> Result<RpcValue, MarshalError> {
    match el.name.as_str() {
        // A bare <value> holds either a typed element or untyped string text.
        "value" => match el.elements().next() {
            Some(inner) => decode_element(inner),
            None => Ok(RpcValue::String(el.text())),
        },
        "string" => Ok(RpcValue::String(el.text())),
        "int" | "i4" => {
            let text = el.text();
            match text.trim().parse::<f64>() {
                Ok(n) if n.is_finite() && n.fract() == 0.0 => Ok(RpcValue::Number(n)),
                _ => Err(invalid(el, text)),
            }
        }
        "double" => {
            let text = el.text();
            match text.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(RpcValue::Number(n)),
                _ => Err(invalid(el, text)),
            }
        }
        "boolean" | "bool" => {
            let text = el.text().trim().to_lowercase();
            Ok(RpcValue::Boolean(text == "true" || text == "1"))
        }
        "dateTime.iso8601" => {
            let text = el.text();
            let trimmed = text.trim();
            NaiveDateTime::parse_from_str(trimmed, DATE_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(trimmed, DATE_FORMAT_COLONS))
                .map(RpcValue::DateTime)
                .map_err(|_| invalid(el, text))
        }
        "array" => {
            let mut items = Vec::new();
            if let Some(data) = el.first_named("data") {
                for value in data.children_named("value") {
                    items.push(decode_element(value)?);
                }
            }
            Ok(RpcValue::List(items))
        }
        "struct" => {
            let mut members = Struct::new();
            for member in el.children_named("member") {
                let name = member
                    .first_named("name")
                    .ok_or_else(|| MarshalError::Parse("struct member without <name>".into()))?
                    .text();
                let value = member
                    .first_named("value")
                    .ok_or_else(|| MarshalError::Parse("struct member without <value>".into()))?;
                members.insert(name, decode_element(value)?);
            }
            Ok(RpcValue::Struct(members))
        }
        other => Err(MarshalError::UnknownElement(other.to_string())),
    }
}

fn invalid(el: &XmlElement, text: String) -> MarshalError {
    MarshalError::InvalidScalar {
        tag: el.name.clone(),
        text,
    }
}
