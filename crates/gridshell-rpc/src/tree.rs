//! Minimal XML element tree with quick-xml parsing and serialization.
//!
//! Only elements and text are modeled. Attributes, comments, processing
//! instructions and doctypes are dropped on parse since XML-RPC never
//! relies on them.

use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Reader;
use quick_xml::Writer;

use crate::error::MarshalError;

/// Deepest element nesting `parse_document` accepts.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn text(text: impl Into<String>) -> Self {
        XmlNode::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        }
    }
}

impl From<XmlElement> for XmlNode {
    fn from(el: XmlElement) -> Self {
        XmlNode::Element(el)
    }
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Element holding a single text node.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_child(XmlNode::text(text))
    }

    pub fn with_child(mut self, child: impl Into<XmlNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn push(&mut self, child: impl Into<XmlNode>) {
        self.children.push(child.into());
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Direct children with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |el| el.name == name)
    }

    pub fn first_named(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.name == name)
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// First descendant (not including `self`) named `name`, in document order.
    pub fn find_descendant(&self, name: &str) -> Option<&XmlElement> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(name) {
                return Some(found);
            }
        }
        None
    }
}

/// Parses a complete document and returns its root element.
///
/// Documents nested deeper than [`MAX_DEPTH`] are rejected.
pub fn parse_document(xml: &str) -> Result<XmlElement, MarshalError> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(|err| {
            MarshalError::Parse(format!(
                "{} at position {}",
                err,
                reader.buffer_position()
            ))
        })?;
        match event {
            Event::Start(ref e) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(MarshalError::Parse(format!(
                        "nesting deeper than {} elements",
                        MAX_DEPTH
                    )));
                }
                stack.push(XmlElement::new(element_name(e)?));
            }
            Event::End(_) => {
                let completed = stack
                    .pop()
                    .ok_or_else(|| MarshalError::Parse("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, completed)?;
            }
            Event::Empty(ref e) => {
                let el = XmlElement::new(element_name(e)?);
                attach(&mut stack, &mut root, el)?;
            }
            Event::Text(ref e) => {
                let text = e
                    .unescape()
                    .map_err(|err| MarshalError::Parse(format!("bad text: {}", err)))?;
                match stack.last_mut() {
                    Some(parent) => parent.push(XmlNode::Text(text.into_owned())),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(MarshalError::Parse(
                            "text outside of the root element".to_string(),
                        ))
                    }
                }
            }
            Event::CData(e) => {
                let text = String::from_utf8(e.into_inner().into_owned())
                    .map_err(|err| MarshalError::Parse(format!("bad CDATA: {}", err)))?;
                if let Some(parent) = stack.last_mut() {
                    parent.push(XmlNode::Text(text));
                }
            }
            Event::Eof => {
                if let Some(open) = stack.last() {
                    return Err(MarshalError::Parse(format!(
                        "unclosed element <{}>",
                        open.name
                    )));
                }
                break;
            }
            _ => {}
        }
    }

    root.ok_or_else(|| MarshalError::Parse("document has no root element".to_string()))
}

fn element_name(e: &BytesStart<'_>) -> Result<String, MarshalError> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(|err| MarshalError::Parse(format!("invalid element name: {}", err)))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    el: XmlElement,
) -> Result<(), MarshalError> {
    if let Some(parent) = stack.last_mut() {
        parent.push(el);
        return Ok(());
    }
    if root.is_some() {
        return Err(MarshalError::Parse(format!(
            "second root element <{}>",
            el.name
        )));
    }
    *root = Some(el);
    Ok(())
}

/// Serializes `root` with an XML declaration and no added whitespace.
pub fn write_document(root: &XmlElement) -> Result<String, MarshalError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
        .map_err(write_error)?;
    write_element(&mut writer, root)?;
    String::from_utf8(writer.into_inner())
        .map_err(|err| MarshalError::Parse(format!("serialized XML is not UTF-8: {}", err)))
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &XmlElement) -> Result<(), MarshalError> {
    writer
        .write_event(Event::Start(BytesStart::new(el.name.as_str())))
        .map_err(write_error)?;
    for child in &el.children {
        match child {
            XmlNode::Element(inner) => write_element(writer, inner)?,
            XmlNode::Text(text) if text.is_empty() => {}
            XmlNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(el.name.as_str())))
        .map_err(write_error)
}

fn write_error(err: quick_xml::Error) -> MarshalError {
    MarshalError::Parse(format!("failed to write XML: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let root = parse_document(
            r#"<?xml version="1.0"?>
<methodResponse>
  <params>
    <param><value><string>a &amp; b</string></value></param>
  </params>
</methodResponse>"#,
        )
        .unwrap();
        assert_eq!(root.name, "methodResponse");
        let string = root.find_descendant("string").unwrap();
        assert_eq!(string.text(), "a & b");
    }

    #[test]
    fn test_find_descendant_is_document_order() {
        let root = parse_document(
            "<r><a><value>1</value></a><value>2</value></r>",
        )
        .unwrap();
        assert_eq!(root.find_descendant("value").unwrap().text(), "1");
    }

    #[test]
    fn test_parse_self_closing_and_cdata() {
        let root = parse_document("<r><empty/><s><![CDATA[<raw>]]></s></r>").unwrap();
        assert!(root.first_named("empty").unwrap().children.is_empty());
        assert_eq!(root.first_named("s").unwrap().text(), "<raw>");
    }

    #[test]
    fn test_parse_rejects_mismatched_tags() {
        let err = parse_document("<a><b></a>").unwrap_err();
        assert!(matches!(err, MarshalError::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_unclosed_root() {
        let err = parse_document("<methodResponse><params>").unwrap_err();
        assert!(matches!(err, MarshalError::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(matches!(parse_document(""), Err(MarshalError::Parse(_))));
        assert!(matches!(parse_document("not xml"), Err(MarshalError::Parse(_))));
    }

    #[test]
    fn test_parse_depth_limit() {
        let nested = |depth: usize| format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        assert!(parse_document(&nested(MAX_DEPTH)).is_ok());
        let err = parse_document(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert!(matches!(err, MarshalError::Parse(msg) if msg.contains("nesting")));
    }

    #[test]
    fn test_write_escapes_text_and_keeps_empty_elements() {
        let root = XmlElement::new("r")
            .with_child(XmlElement::with_text("s", "1 < 2"))
            .with_child(XmlElement::new("params").with_child(XmlNode::text("")));
        let xml = write_document(&root).unwrap();
        assert_eq!(
            xml,
            r#"<?xml version="1.0"?><r><s>1 &lt; 2</s><params></params></r>"#
        );
    }
}
