//! Owned XML elements for the protocol's message grammar.
//!
//! One logical message is one top-level element. Inbound text is cut
//! into elements by [`Framer`] and parsed here into an owned
//! [`Element`] tree, so nothing downstream borrows from transient
//! read buffers.

use crate::{types::Error, Result};
use std::fmt;

mod stream;

pub use stream::Framer;

/// One parsed XML element: tag name, attributes in document order,
/// the concatenated character data, and the child elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Parses the text of exactly one element.
    pub fn parse(text: &str) -> Result<Element> {
        let doc = roxmltree::Document::parse(text)
            .map_err(|e| Error::ParseError(format!("malformed XML: {}", e)))?;

        Ok(from_node(doc.root_element()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The element's character data, entity references resolved,
    /// surrounding markup removed but whitespace kept verbatim.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }
}

fn from_node(node: roxmltree::Node) -> Element {
    Element {
        name: node.tag_name().name().to_string(),
        attributes: node
            .attributes()
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect(),
        text: node
            .children()
            .filter(|c| c.is_text())
            .filter_map(|c| c.text())
            .collect(),
        children: node
            .children()
            .filter(|c| c.is_element())
            .map(from_node)
            .collect(),
    }
}

/// Replaces the five characters that cannot appear raw in attribute
/// values or character data.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}", self.name)?;

        for (k, v) in &self.attributes {
            write!(f, " {}=\"{}\"", k, escape(v))?;
        }

        if self.children.is_empty() && self.text.is_empty() {
            return write!(f, "/>");
        }

        write!(f, ">{}", escape(&self.text))?;

        for child in &self.children {
            write!(f, "{}", child)?;
        }

        write!(f, "</{}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes_and_text() {
        let e = Element::parse(
            "<oneText name=\"HOST\" label=\"Host &amp; port\">indi.example</oneText>",
        )
        .unwrap();

        assert_eq!(e.name(), "oneText");
        assert_eq!(e.attr("name"), Some("HOST"));
        assert_eq!(e.attr("label"), Some("Host & port"));
        assert_eq!(e.attr("missing"), None);
        assert_eq!(e.text(), "indi.example");
    }

    #[test]
    fn test_parse_children() {
        let e = Element::parse(
            "<newNumberVector device=\"Cam\" name=\"EXPOSURE\">\n  \
             <oneNumber name=\"EXP\">2.5</oneNumber>\n  \
             <oneNumber name=\"GAIN\">4</oneNumber>\n\
             </newNumberVector>",
        )
        .unwrap();

        assert_eq!(e.children().len(), 2);
        assert_eq!(e.children()[0].attr("name"), Some("EXP"));
        assert_eq!(e.children()[1].text(), "4");
    }

    #[test]
    fn test_parse_rejects_malformed_text() {
        assert!(Element::parse("<open>").is_err());
        assert!(Element::parse("no markup").is_err());
        assert!(Element::parse("<a><b></a></b>").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let text = "<setSwitchVector device=\"Mount\" name=\"CONNECTION\">\
                    <oneSwitch name=\"CONNECT\">On</oneSwitch>\
                    </setSwitchVector>";
        let e = Element::parse(text).unwrap();

        assert_eq!(Element::parse(&e.to_string()).unwrap(), e);
    }

    #[test]
    fn test_display_escapes_markup() {
        let e = Element::parse("<message message=\"a &lt; b\"/>").unwrap();

        assert!(e.to_string().contains("a &lt; b"));
        assert_eq!(Element::parse(&e.to_string()).unwrap(), e);
    }
}
