//! XML serialization of the owned element tree using quick-xml

use super::tree::{XmlElement, XmlNode};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// Serialize `root` with an XML declaration and optional DOCTYPE.
///
/// `indent` is the number of spaces per nesting level; `None` writes
/// everything on one line. Text-only elements always stay on one line so
/// their content is not padded with whitespace.
pub fn write_document(
    root: &XmlElement,
    doctype: Option<&str>,
    indent: Option<usize>,
) -> quick_xml::Result<Vec<u8>> {
    let mut writer = match indent {
        Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
        None => Writer::new(Vec::new()),
    };

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;
    if let Some(doctype) = doctype {
        writer.write_event(Event::DocType(BytesText::from_escaped(doctype)))?;
    }
    write_element(&mut writer, root)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serialize a single element (attributes and text are escaped)
pub fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> quick_xml::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(element: &XmlElement, indent: Option<usize>) -> String {
        let bytes = write_document(element, None, indent).expect("write should succeed");
        String::from_utf8(bytes).expect("writer emits UTF-8")
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let mut words = XmlElement::with_text("words", "Song & Dance <Test>");
        words.attr("font-family", "A \"quoted\" font");

        let xml = render(&words, None);
        assert!(xml.contains("Song &amp; Dance &lt;Test&gt;"), "text should be escaped: {}", xml);
        assert!(xml.contains("&quot;quoted&quot;"), "attribute should be escaped: {}", xml);
    }

    #[test]
    fn test_empty_element_is_self_closing() {
        let mut note = XmlElement::new("note");
        note.push(XmlElement::new("chord"));
        note.push(XmlElement::with_text("duration", "4"));

        let xml = render(&note, Some(2));
        assert!(xml.contains("<chord/>"), "got: {}", xml);
        assert!(xml.contains("<duration>4</duration>"), "text stays inline: {}", xml);
    }

    #[test]
    fn test_declaration_and_doctype() {
        let root = XmlElement::new("score-partwise");
        let xml = render_with_doctype(&root);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>"));
        assert!(xml.contains("<!DOCTYPE score-partwise PUBLIC"));
    }

    fn render_with_doctype(root: &XmlElement) -> String {
        let doctype = "score-partwise PUBLIC \"-//Recordare//DTD MusicXML 4.0 Partwise//EN\" \"http://www.musicxml.org/dtds/partwise.dtd\"";
        let bytes = write_document(root, Some(doctype), Some(2)).expect("write should succeed");
        String::from_utf8(bytes).expect("writer emits UTF-8")
    }
}
