//! Cursor over a parsed element used by every `FromXml` implementation
//!
//! Children are claimed by name in any order; whatever is left unclaimed
//! when [`ElementReader::finish`] runs is reported as an unexpected
//! element. Ordered-choice content is drained in document order with
//! [`ElementReader::choices`].

use super::tree::{XLINK_NAMESPACE, XML_NAMESPACE};
use crate::codec::{
    decode_child, AttributeGroup, ChoiceItem, DecodeContext, DecodeError, DecodeResult, FromXml,
    XmlValue,
};
use roxmltree::Node;
use std::borrow::Cow;
use std::collections::HashMap;

pub struct ElementReader<'a, 'input> {
    node: Node<'a, 'input>,
    children: Vec<Node<'a, 'input>>,
    consumed: Vec<bool>,
}

impl<'a, 'input> ElementReader<'a, 'input> {
    pub fn new(node: Node<'a, 'input>) -> Self {
        let children: Vec<_> = node.children().filter(|n| n.is_element()).collect();
        let consumed = vec![false; children.len()];
        Self {
            node,
            children,
            consumed,
        }
    }

    pub fn node(&self) -> Node<'a, 'input> {
        self.node
    }

    pub fn name(&self) -> &'a str {
        self.node.tag_name().name()
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    /// Raw attribute text; `xml:` and `xlink:` prefixes map to their namespaces
    pub fn raw_attr(&self, name: &str) -> Option<&'a str> {
        match name.split_once(':') {
            Some(("xml", local)) => self.node.attribute((XML_NAMESPACE, local)),
            Some(("xlink", local)) => self.node.attribute((XLINK_NAMESPACE, local)),
            _ => self.node.attribute(name),
        }
    }

    pub fn attr<T: XmlValue>(&self, name: &str, cx: &mut DecodeContext) -> DecodeResult<Option<T>> {
        let Some(text) = self.raw_attr(name) else {
            return Ok(None);
        };
        let segment = format!("@{}", name);
        cx.enter(&segment, None);
        let value = T::parse_value(text, cx);
        cx.leave();
        value.map(Some).map_err(|e| e.at(&segment, None))
    }

    pub fn req_attr<T: XmlValue>(&self, name: &str, cx: &mut DecodeContext) -> DecodeResult<T> {
        self.attr(name, cx)?
            .ok_or_else(|| DecodeError::missing(format!("@{}", name)))
    }

    pub fn group<G: AttributeGroup>(&self, cx: &mut DecodeContext) -> DecodeResult<G> {
        G::read(self, cx)
    }

    // ------------------------------------------------------------------------
    // Text content
    // ------------------------------------------------------------------------

    /// All text content, including text split by comments or processing instructions
    pub fn text(&self) -> Cow<'a, str> {
        text_content(self.node)
    }

    pub fn value<T: XmlValue>(&self, cx: &mut DecodeContext) -> DecodeResult<T> {
        T::parse_value(&self.text(), cx)
    }

    // ------------------------------------------------------------------------
    // Children
    // ------------------------------------------------------------------------

    fn take(&mut self, name: &str) -> Option<Node<'a, 'input>> {
        let index = self
            .children
            .iter()
            .zip(&self.consumed)
            .position(|(node, consumed)| !consumed && node.tag_name().name() == name)?;
        self.consumed[index] = true;
        Some(self.children[index])
    }

    /// Whether an unclaimed child with this tag exists
    pub fn has(&self, name: &str) -> bool {
        self.children
            .iter()
            .zip(&self.consumed)
            .any(|(node, consumed)| !consumed && node.tag_name().name() == name)
    }

    pub fn child<T: FromXml>(&mut self, name: &str, cx: &mut DecodeContext) -> DecodeResult<Option<T>> {
        match self.take(name) {
            Some(node) => decode_child(node, None, cx).map(Some),
            None => Ok(None),
        }
    }

    pub fn req_child<T: FromXml>(&mut self, name: &str, cx: &mut DecodeContext) -> DecodeResult<T> {
        self.child(name, cx)?
            .ok_or_else(|| DecodeError::missing(name))
    }

    pub fn children<T: FromXml>(&mut self, name: &str, cx: &mut DecodeContext) -> DecodeResult<Vec<T>> {
        let mut values = Vec::new();
        while let Some(node) = self.take(name) {
            values.push(decode_child(node, Some(values.len()), cx)?);
        }
        Ok(values)
    }

    pub fn text_child<T: XmlValue>(&mut self, name: &str, cx: &mut DecodeContext) -> DecodeResult<Option<T>> {
        match self.take(name) {
            Some(node) => parse_text_node(node, None, cx).map(Some),
            None => Ok(None),
        }
    }

    pub fn req_text_child<T: XmlValue>(&mut self, name: &str, cx: &mut DecodeContext) -> DecodeResult<T> {
        self.text_child(name, cx)?
            .ok_or_else(|| DecodeError::missing(name))
    }

    pub fn text_children<T: XmlValue>(&mut self, name: &str, cx: &mut DecodeContext) -> DecodeResult<Vec<T>> {
        let mut values = Vec::new();
        while let Some(node) = self.take(name) {
            values.push(parse_text_node(node, Some(values.len()), cx)?);
        }
        Ok(values)
    }

    /// Claim an empty marker element such as `<chord/>`
    pub fn flag(&mut self, name: &str) -> bool {
        self.take(name).is_some()
    }

    /// Decode every unclaimed child, in document order, as an ordered-choice item.
    pub fn choices<T: ChoiceItem>(&mut self, cx: &mut DecodeContext) -> DecodeResult<Vec<T>> {
        let mut items = Vec::new();
        let mut ordinals: HashMap<&'a str, usize> = HashMap::new();

        for i in 0..self.children.len() {
            if self.consumed[i] {
                continue;
            }
            let node = self.children[i];
            let name = node.tag_name().name();
            let ordinal = ordinals.entry(name).or_insert(0);
            let index = Some(*ordinal);
            *ordinal += 1;

            cx.enter(name, index);
            let decoded = T::decode_item(name, node, cx);
            cx.leave();

            match decoded {
                Some(item) => items.push(item.map_err(|e| e.at(name, index))?),
                None => return Err(DecodeError::unexpected(name)),
            }
            self.consumed[i] = true;
        }
        Ok(items)
    }

    /// Fail on the first child nobody claimed
    pub fn finish(self) -> DecodeResult<()> {
        match self
            .children
            .iter()
            .zip(&self.consumed)
            .find(|(_, consumed)| !**consumed)
        {
            Some((node, _)) => Err(DecodeError::unexpected(node.tag_name().name())),
            None => Ok(()),
        }
    }
}

fn text_content<'a>(node: Node<'a, '_>) -> Cow<'a, str> {
    let mut texts = node.children().filter(|c| c.is_text()).filter_map(|c| c.text());
    match (texts.next(), texts.next()) {
        (None, _) => Cow::Borrowed(""),
        (Some(first), None) => Cow::Borrowed(first),
        (Some(first), Some(second)) => {
            let mut joined = String::from(first);
            joined.push_str(second);
            joined.extend(texts);
            Cow::Owned(joined)
        }
    }
}

fn parse_text_node<T: XmlValue>(node: Node<'_, '_>, index: Option<usize>, cx: &mut DecodeContext) -> DecodeResult<T> {
    let name = node.tag_name().name();
    cx.enter(name, index);
    let value = T::parse_value(&text_content(node), cx);
    cx.leave();
    value.map_err(|e| e.at(name, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DecodeErrorKind;

    #[test]
    fn test_children_claimed_in_any_order() {
        let doc = roxmltree::Document::parse("<pitch><octave>4</octave><step>C</step></pitch>")
            .expect("test XML should parse");
        let mut cx = DecodeContext::default();
        let mut el = ElementReader::new(doc.root_element());

        let step: Option<String> = el.text_child("step", &mut cx).expect("step parses");
        let octave: Option<u32> = el.text_child("octave", &mut cx).expect("octave parses");
        assert_eq!(step.as_deref(), Some("C"));
        assert_eq!(octave, Some(4));
        assert!(el.finish().is_ok());
    }

    #[test]
    fn test_leftover_child_is_unexpected() {
        let doc = roxmltree::Document::parse("<pitch><step>C</step><color>red</color></pitch>")
            .expect("test XML should parse");
        let mut cx = DecodeContext::default();
        let mut el = ElementReader::new(doc.root_element());
        let _: Option<String> = el.text_child("step", &mut cx).expect("step parses");

        let err = el.finish().expect_err("unclaimed <color> must be rejected");
        assert_eq!(
            err.kind(),
            &DecodeErrorKind::UnexpectedElement { name: "color".to_string() }
        );
    }

    #[test]
    fn test_attribute_error_names_attribute() {
        let doc = roxmltree::Document::parse(r#"<measure width="wide"/>"#).expect("test XML should parse");
        let mut cx = DecodeContext::default();
        let el = ElementReader::new(doc.root_element());

        let err = el.attr::<f64>("width", &mut cx).expect_err("non-numeric width");
        assert_eq!(err.path().to_string(), "@width");
    }

    #[test]
    fn test_text_split_by_comment_is_joined() {
        let doc = roxmltree::Document::parse("<direction-type><words>ab<!-- c -->cd<?pi x?>ef</words></direction-type>")
            .expect("test XML should parse");
        let mut cx = DecodeContext::default();
        let mut el = ElementReader::new(doc.root_element());

        let words: Option<String> = el.text_child("words", &mut cx).expect("words parses");
        assert_eq!(words.as_deref(), Some("abcdef"));

        let words = doc.root_element().first_element_child().expect("words element");
        assert_eq!(ElementReader::new(words).text(), "abcdef");
    }
}
