//! Generic XML tree for ServiceDesk Plus responses.
//!
//! SDP answers every operation with XML, but the shape varies per
//! operation. This module parses a document into a small owned DOM with
//! `quick-xml` and converts that DOM into a `serde_json::Value` without any
//! knowledge of the SDP schema:
//!
//! - the document becomes `{ "<root>": node }`
//! - text is trimmed, and a node with no attributes and no children is its
//!   text (`null` if empty)
//! - otherwise a node is an object: attributes under `"@name"`, text under
//!   `"#text"`, children under their element name, with a repeated name
//!   collected into an array in document order
//!
//! The single-vs-array ambiguity this produces is resolved later by the
//! record extraction in [`models`](crate::models).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::SdpError;

/// An element of a parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Element name as written in the document.
    pub name: String,

    /// Attributes in document order, values unescaped.
    pub attributes: Vec<(String, String)>,

    /// Child elements in document order.
    pub children: Vec<XmlElement>,

    /// Concatenated text and CDATA content exactly as sent, `None` when
    /// there is none. Whitespace between child elements is not kept.
    pub text: Option<String>,
}

impl XmlElement {
    /// Parses a complete XML document and returns its root element.
    ///
    /// Leaf text keeps its whitespace; whitespace-only text in an element
    /// that has children is dropped.
    ///
    /// # Errors
    ///
    /// Returns `SdpError::Xml` for reader-level failures (bad syntax,
    /// mismatched closing tags) and `SdpError::MalformedXml` for documents
    /// with no root, several roots, unclosed elements, or text outside the
    /// root.
    pub fn parse(xml: &str) -> Result<Self, SdpError> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(SdpError::malformed("content after the root element"));
                    }
                    stack.push(Self::open(&e)?);
                }
                Event::Empty(e) => {
                    let element = Self::open(&e)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| SdpError::malformed("closing tag without an open element"))?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    Self::push_text(&mut stack, &text)?;
                }
                Event::CData(e) => {
                    let raw = e.into_inner();
                    Self::push_text(&mut stack, &String::from_utf8_lossy(&raw))?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(SdpError::malformed(format!(
                "element <{}> is never closed",
                open.name
            )));
        }

        root.ok_or_else(|| SdpError::malformed("document has no root element"))
    }

    fn open(start: &BytesStart<'_>) -> Result<Self, SdpError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(XmlElement {
            name,
            attributes,
            children: Vec::new(),
            text: None,
        })
    }

    fn attach(
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
        mut element: XmlElement,
    ) -> Result<(), SdpError> {
        // indentation between children
        if !element.children.is_empty()
            && element.text.as_deref().is_some_and(|t| t.trim().is_empty())
        {
            element.text = None;
        }

        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_some() => {
                return Err(SdpError::malformed("document has more than one root element"));
            }
            None => *root = Some(element),
        }
        Ok(())
    }

    fn push_text(stack: &mut [XmlElement], text: &str) -> Result<(), SdpError> {
        match stack.last_mut() {
            Some(element) => element.text.get_or_insert_with(String::new).push_str(text),
            None if text.trim().is_empty() => {}
            None => return Err(SdpError::malformed("text outside the root element")),
        }
        Ok(())
    }

    /// Returns the first direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Iterates over the direct children with the given name.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Iterates over this element and all its descendants with the given
    /// name, in document order.
    pub fn descendants<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        let mut pending = vec![self];
        std::iter::from_fn(move || {
            while let Some(element) = pending.pop() {
                pending.extend(element.children.iter().rev());
                if element.name == name {
                    return Some(element);
                }
            }
            None
        })
    }

    /// Returns the element's text, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Converts the document rooted at this element into a JSON-compatible tree.
    pub fn to_value(&self) -> Value {
        let mut document = Map::new();
        document.insert(self.name.clone(), self.node_value());
        Value::Object(document)
    }

    fn trimmed_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    fn node_value(&self) -> Value {
        if self.attributes.is_empty() && self.children.is_empty() {
            return match self.trimmed_text() {
                Some(text) => Value::String(text.to_string()),
                None => Value::Null,
            };
        }

        let mut node = Map::new();
        for (key, value) in &self.attributes {
            node.insert(format!("@{}", key), Value::String(value.clone()));
        }

        for child in &self.children {
            let value = child.node_value();
            match node.get_mut(&child.name) {
                // node_value never yields an array, so an array here is one we built
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    node.insert(child.name.clone(), value);
                }
            }
        }

        if let Some(text) = self.trimmed_text() {
            node.insert("#text".to_string(), Value::String(text.to_string()));
        }

        Value::Object(node)
    }
}

/// Parses an XML document straight into its generic JSON-compatible tree.
pub fn xml_to_value(xml: &str) -> Result<Value, SdpError> {
    Ok(XmlElement::parse(xml)?.to_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_nested_elements() {
        let root = XmlElement::parse("<a><b>one</b><c><b>two</b></c></a>").unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.child("b").and_then(XmlElement::text), Some("one"));
        let all: Vec<_> = root.descendants("b").filter_map(XmlElement::text).collect();
        assert_eq!(all, vec!["one", "two"]);
    }

    #[test]
    fn test_parse_unescapes_text_and_attributes() {
        let root = XmlElement::parse(r#"<v kind="a&amp;b">x &lt; y<![CDATA[ & z]]></v>"#).unwrap();
        assert_eq!(root.attributes, vec![("kind".to_string(), "a&b".to_string())]);
        assert_eq!(root.text(), Some("x < y & z"));
    }

    #[test]
    fn test_parse_skips_declaration_and_whitespace() {
        let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a>\n  <b/>\n</a>\n";
        let root = XmlElement::parse(xml).unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.text(), None);
    }

    #[test]
    fn test_parse_keeps_leaf_whitespace() {
        let root = XmlElement::parse("<a>\n  <b>  padded \n</b>\n  <c>   </c>\n</a>").unwrap();
        assert_eq!(root.text(), None);
        assert_eq!(root.child("b").and_then(XmlElement::text), Some("  padded \n"));
        assert_eq!(root.child("c").and_then(XmlElement::text), Some("   "));
    }

    #[test]
    fn test_to_value_trims_text() {
        let value = xml_to_value("<a>\n  <b>  padded \n</b>\n  <c>   </c>\n</a>").unwrap();
        assert_eq!(value, json!({"a": {"b": "padded", "c": null}}));
    }

    #[test]
    fn test_parse_rejects_unclosed_element() {
        let err = XmlElement::parse("<a><b>text</b>").unwrap_err();
        assert!(matches!(err, SdpError::MalformedXml(_)));
    }

    #[test]
    fn test_parse_rejects_mismatched_tags() {
        assert!(XmlElement::parse("<a><b></a></b>").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_document() {
        let err = XmlElement::parse("   ").unwrap_err();
        assert!(matches!(err, SdpError::MalformedXml(_)));
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        assert!(XmlElement::parse("Internal Server Error").is_err());
    }

    #[test]
    fn test_to_value_leaf_and_empty() {
        let value = xml_to_value("<a><b>text</b><c/></a>").unwrap();
        assert_eq!(value, json!({"a": {"b": "text", "c": null}}));
    }

    #[test]
    fn test_to_value_repeated_children_become_array() {
        let value = xml_to_value("<a><p>1</p><q>x</q><p>2</p><p>3</p></a>").unwrap();
        assert_eq!(value, json!({"a": {"p": ["1", "2", "3"], "q": "x"}}));
    }

    #[test]
    fn test_to_value_attributes_and_text() {
        let value = xml_to_value(r#"<a id="7">body<b>c</b></a>"#).unwrap();
        assert_eq!(value, json!({"a": {"@id": "7", "b": "c", "#text": "body"}}));
    }

    #[test]
    fn test_to_value_attribute_only_leaf() {
        let value = xml_to_value(r#"<a><b name="x"/></a>"#).unwrap();
        assert_eq!(value, json!({"a": {"b": {"@name": "x"}}}));
    }
}
