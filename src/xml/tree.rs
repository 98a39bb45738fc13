//! Owned XML element tree
//!
//! The encoder lowers a document into one of these and hands it to the
//! writer. Unrecognized extension content captured during decode is kept
//! in the same shape, so it is written back exactly as it was read.

use crate::codec::{AttributeGroup, ToXml, XmlValue};
use serde::{Deserialize, Serialize};

pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Element node: tag name, ordered attributes, ordered children
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

/// Child of an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Element whose only content is `text`
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.set_text(text);
        element
    }

    // ------------------------------------------------------------------------
    // Building
    // ------------------------------------------------------------------------

    pub fn attr(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.push((name.to_string(), value.into()));
    }

    pub fn opt_attr<T: XmlValue>(&mut self, name: &str, value: &Option<T>) {
        if let Some(value) = value {
            self.attr(name, value.to_value());
        }
    }

    pub fn group<G: AttributeGroup>(&mut self, group: &G) {
        group.write(self);
    }

    /// Replace all content with a single text node (nothing for empty text)
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn child<T: ToXml>(&mut self, name: &str, value: &T) {
        self.push(value.to_xml(name));
    }

    pub fn opt_child<T: ToXml>(&mut self, name: &str, value: &Option<T>) {
        if let Some(value) = value {
            self.child(name, value);
        }
    }

    pub fn children<T: ToXml>(&mut self, name: &str, values: &[T]) {
        for value in values {
            self.child(name, value);
        }
    }

    pub fn text_child<T: XmlValue>(&mut self, name: &str, value: &T) {
        self.push(XmlElement::with_text(name, value.to_value()));
    }

    pub fn opt_text_child<T: XmlValue>(&mut self, name: &str, value: &Option<T>) {
        if let Some(value) = value {
            self.text_child(name, value);
        }
    }

    pub fn text_children<T: XmlValue>(&mut self, name: &str, values: &[T]) {
        for value in values {
            self.text_child(name, value);
        }
    }

    /// Empty marker element such as `<chord/>`, written only when set
    pub fn flag(&mut self, name: &str, present: bool) {
        if present {
            self.push(XmlElement::new(name));
        }
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    // ------------------------------------------------------------------------
    // Capture
    // ------------------------------------------------------------------------

    /// Copy a parsed node verbatim, dropping comments and processing
    /// instructions and whitespace-only text between elements.
    ///
    /// Namespace prefixes are kept as written, and each binding the subtree
    /// relies on is declared on the outermost captured element that uses it.
    pub fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        Self::capture(node, &mut Vec::new())
    }

    /// `scope` holds the (prefix, uri) bindings declared by captured ancestors
    fn capture(node: roxmltree::Node<'_, '_>, scope: &mut Vec<(String, String)>) -> Self {
        let depth = scope.len();
        let mut declarations = Vec::new();

        let tag = node.tag_name();
        let mut element = Self::new(qualify(node, tag.namespace(), tag.name(), false, scope, &mut declarations));
        let mut attributes = Vec::new();
        for attribute in node.attributes() {
            let name = qualify(node, attribute.namespace(), attribute.name(), true, scope, &mut declarations);
            attributes.push((name, attribute.value().to_string()));
        }
        element.attributes = declarations;
        element.attributes.extend(attributes);

        let has_elements = node.children().any(|c| c.is_element());
        for child in node.children() {
            if child.is_element() {
                element.push(Self::capture(child, scope));
            } else if child.is_text() {
                let text = child.text().unwrap_or("");
                if has_elements && text.trim().is_empty() {
                    continue;
                }
                element.children.push(XmlNode::Text(text.to_string()));
            }
        }

        scope.truncate(depth);
        element
    }
}

/// Prefixed name for an element or attribute, recording an `xmlns`
/// declaration when the binding is not yet in scope
fn qualify(
    node: roxmltree::Node<'_, '_>,
    namespace: Option<&str>,
    local: &str,
    is_attribute: bool,
    scope: &mut Vec<(String, String)>,
    declarations: &mut Vec<(String, String)>,
) -> String {
    let (prefix, uri) = match namespace {
        Some(XML_NAMESPACE) => return format!("xml:{}", local),
        Some(uri) if is_attribute => {
            // attributes never take the default namespace
            let prefix = node
                .namespaces()
                .find(|ns| ns.uri() == uri && ns.name().is_some())
                .and_then(|ns| ns.name());
            match prefix {
                Some(prefix) => (prefix, uri),
                None => return local.to_string(),
            }
        }
        Some(uri) => (node.lookup_prefix(uri).unwrap_or(""), uri),
        None if is_attribute => return local.to_string(),
        None => ("", ""),
    };

    let bound = scope
        .iter()
        .rev()
        .find(|(p, _)| p == prefix)
        .map(|(_, u)| u.as_str())
        .unwrap_or("");
    if bound != uri {
        let declaration = match prefix {
            "" => "xmlns".to_string(),
            prefix => format!("xmlns:{}", prefix),
        };
        declarations.push((declaration, uri.to_string()));
        scope.push((prefix.to_string(), uri.to_string()));
    }

    match prefix {
        "" => local.to_string(),
        prefix => format!("{}:{}", prefix, local),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_keeps_attributes_and_structure() {
        let xml = r#"<ext xmlns:xlink="http://www.w3.org/1999/xlink" kind="vendor" xlink:href="x.png">
            <inner a="1">text</inner>
            <empty/>
        </ext>"#;
        let doc = roxmltree::Document::parse(xml).expect("test XML should parse");
        let captured = XmlElement::from_node(doc.root_element());

        assert_eq!(captured.name, "ext");
        assert_eq!(captured.attribute("kind"), Some("vendor"));
        assert_eq!(captured.attribute("xlink:href"), Some("x.png"));
        assert_eq!(captured.elements().count(), 2, "whitespace between elements is dropped");

        let inner = captured.find("inner").expect("inner element captured");
        assert_eq!(inner.attribute("a"), Some("1"));
        assert_eq!(inner.text(), "text");
    }

    #[test]
    fn test_capture_keeps_vendor_namespaces() {
        let xml = r#"<direction-type xmlns:v="urn:vendor"><v:mark v:level="2"><v:inner/><plain/></v:mark></direction-type>"#;
        let doc = roxmltree::Document::parse(xml).expect("test XML should parse");
        let mark = doc.root_element().first_element_child().expect("mark element");
        let captured = XmlElement::from_node(mark);

        assert_eq!(captured.name, "v:mark");
        assert_eq!(
            captured.attributes,
            vec![
                ("xmlns:v".to_string(), "urn:vendor".to_string()),
                ("v:level".to_string(), "2".to_string()),
            ]
        );
        let inner = captured.find("v:inner").expect("prefixed child captured");
        assert!(inner.attributes.is_empty(), "binding is declared once, on the outer element");
        assert!(captured.find("plain").is_some());
    }

    #[test]
    fn test_capture_redeclares_default_namespace() {
        let doc = roxmltree::Document::parse(r#"<x xmlns="urn:d"><y xmlns=""/></x>"#).expect("test XML should parse");
        let captured = XmlElement::from_node(doc.root_element());

        assert_eq!(captured.attribute("xmlns"), Some("urn:d"));
        let y = captured.find("y").expect("child captured");
        assert_eq!(y.attribute("xmlns"), Some(""));
    }

    #[test]
    fn test_set_text_empty_leaves_no_children() {
        let element = XmlElement::with_text("words", "");
        assert!(element.children.is_empty());
    }
}
