//! Building blocks shared across schema areas
//!
//! - [`Valued`]: text-content element with an attribute group
//! - empty elements distinguished only by the attribute groups they carry
//! - editorial children (`footnote`, `level`)
//! - `dynamics`, used by both directions and notations
//! - [`RawElement`]: verbatim capture of unrecognized extension content

use super::groups::*;
use super::primitives::*;
use crate::codec::{AttributeGroup, ChoiceItem, DecodeContext, DecodeResult, FromXml, ToXml, XmlValue};
use crate::xml::{ElementReader, XmlElement};
use roxmltree::Node;
use serde::{Deserialize, Serialize};

/// Unrecognized element kept exactly as read
pub type RawElement = XmlElement;

/// Capture an unknown child at an extension point, recording a warning
pub(crate) fn capture_extension(node: Node<'_, '_>, cx: &mut DecodeContext) -> RawElement {
    cx.warn(format!("unrecognized element <{}> kept verbatim", node.tag_name().name()));
    XmlElement::from_node(node)
}

// ============================================================================
// TEXT ELEMENTS
// ============================================================================

/// Element whose content is a single scalar value, plus attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Valued<V, A = Empty> {
    pub value: V,
    pub attributes: A,
}

impl<V, A: Default> Valued<V, A> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            attributes: A::default(),
        }
    }
}

impl<V: XmlValue, A: AttributeGroup> FromXml for Valued<V, A> {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let value = el.value(cx)?;
        el.finish()?;
        Ok(Self { value, attributes })
    }
}

impl<V: XmlValue, A: AttributeGroup> ToXml for Valued<V, A> {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.set_text(self.value.to_value());
        element
    }
}

attribute_group! { TypeAttribute { kind: String => "type" } }

attribute_group! {
    PlacementTextAttributes {}
    embeds { print_style: PrintStyle, placement: Placement }
}

attribute_group! {
    OtherPlacementTextAttributes {}
    embeds { print_style: PrintStyle, placement: Placement, smufl: Smufl }
}

attribute_group! {
    /// Lyric text formatting
    TextElementAttributes {
        rotation: RotationDegrees => "rotation",
        letter_spacing: NumberOrNormal => "letter-spacing",
        lang: XmlLang => "xml:lang",
        dir: TextDirection => "dir",
        color: Color => "color",
    }
    embeds { font: Font, text_decoration: TextDecoration }
}

attribute_group! {
    AccidentalTextAttributes {}
    embeds { text_formatting: TextFormatting, smufl: Smufl }
}

pub type FormattedText = Valued<String, TextFormatting>;
pub type FormattedTextId = Valued<String, TextFormattingId>;
pub type FormattedSymbol = Valued<SmuflGlyphName, SymbolFormatting>;
pub type FormattedSymbolId = Valued<SmuflGlyphName, SymbolFormattingId>;
/// Text with an author-defined `type` (creator, rights, relation)
pub type TypedText = Valued<String, TypeAttribute>;
pub type StyleText = Valued<String, PrintStyle>;
pub type PlacementText = Valued<String, PlacementTextAttributes>;
pub type OtherPlacementText = Valued<String, OtherPlacementTextAttributes>;
/// Text of an `other-*` element, optionally naming a SMuFL glyph
pub type OtherText = Valued<String, Smufl>;
pub type TextElementData = Valued<String, TextElementAttributes>;
pub type AccidentalText = Valued<AccidentalValue, AccidentalTextAttributes>;

// ============================================================================
// EMPTY ELEMENTS
// ============================================================================

attribute_group! {
    /// Element with neither attributes nor content
    Empty {}
}

attribute_group! { EmptyPrintStyle {} embeds { print_style: PrintStyle } }
attribute_group! { EmptyPrintStyleAlign {} embeds { print_style_align: PrintStyleAlign } }
attribute_group! { EmptyPlacement {} embeds { print_style: PrintStyle, placement: Placement } }

attribute_group! {
    EmptyPlacementSmufl {}
    embeds { print_style: PrintStyle, placement: Placement, smufl: Smufl }
}

attribute_group! {
    EmptyPrintStyleAlignId {}
    embeds { print_style_align: PrintStyleAlign, id: OptionalUniqueId }
}

attribute_group! {
    EmptyPrintObjectStyleAlign {}
    embeds { print_object: PrintObject, print_style_align: PrintStyleAlign }
}

attribute_group! {
    EmptyTrillSound {}
    embeds { print_style: PrintStyle, placement: Placement, trill_sound: TrillSound }
}

attribute_group! {
    /// Jazz-style line marks (scoop, plop, doit, falloff)
    EmptyLine {
        line_shape: LineShape => "line-shape",
        line_type: LineType => "line-type",
        line_length: LineLength => "line-length",
    }
    embeds {
        dashed_formatting: DashedFormatting,
        print_style: PrintStyle,
        placement: Placement,
    }
}

attribute_group! {
    /// Font-only element such as `music-font`
    EmptyFont {}
    embeds { font: Font }
}

empty_element!(
    Empty,
    EmptyPrintStyle,
    EmptyPrintStyleAlign,
    EmptyPlacement,
    EmptyPlacementSmufl,
    EmptyPrintStyleAlignId,
    EmptyPrintObjectStyleAlign,
    EmptyTrillSound,
    EmptyLine,
    EmptyFont,
);

// ============================================================================
// EDITORIAL
// ============================================================================

attribute_group! {
    LevelAttributes {
        reference: YesNo => "reference",
        kind: StartStopSingle => "type",
    }
    embeds { level_display: LevelDisplay }
}

/// Editorial level of the enclosing element
pub type Level = Valued<String, LevelAttributes>;

/// `footnote` and `level`, which lead the content of many elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Editorial {
    pub footnote: Option<FormattedText>,
    pub level: Option<Level>,
}

impl Editorial {
    pub fn read(el: &mut ElementReader<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        Ok(Self {
            footnote: el.child("footnote", cx)?,
            level: el.child("level", cx)?,
        })
    }

    pub fn write(&self, element: &mut XmlElement) {
        element.opt_child("footnote", &self.footnote);
        element.opt_child("level", &self.level);
    }
}

// ============================================================================
// NAME DISPLAYS
// ============================================================================

/// One run of a part or group name display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NameDisplayItem {
    DisplayText(FormattedText),
    AccidentalText(AccidentalText),
}

impl ChoiceItem for NameDisplayItem {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        match name {
            "display-text" => Some(FromXml::from_xml(node, cx).map(NameDisplayItem::DisplayText)),
            "accidental-text" => Some(FromXml::from_xml(node, cx).map(NameDisplayItem::AccidentalText)),
            _ => None,
        }
    }

    fn to_element(&self) -> XmlElement {
        match self {
            NameDisplayItem::DisplayText(text) => text.to_xml("display-text"),
            NameDisplayItem::AccidentalText(text) => text.to_xml("accidental-text"),
        }
    }
}

/// Formatted replacement for a plain part or group name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameDisplay {
    pub items: Vec<NameDisplayItem>,
    pub print_object: PrintObject,
}

impl FromXml for NameDisplay {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let print_object = el.group(cx)?;
        let items = el.choices(cx)?;
        el.finish()?;
        Ok(Self { items, print_object })
    }
}

impl ToXml for NameDisplay {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.print_object);
        for item in &self.items {
            element.push(item.to_element());
        }
        element
    }
}

// ============================================================================
// DYNAMICS
// ============================================================================

xml_enum! {
    /// Tag names of the predefined dynamics marks
    DynamicsValue {
        P => "p", Pp => "pp", Ppp => "ppp", Pppp => "pppp", Ppppp => "ppppp", Pppppp => "pppppp",
        F => "f", Ff => "ff", Fff => "fff", Ffff => "ffff", Fffff => "fffff", Ffffff => "ffffff",
        Mp => "mp", Mf => "mf", Sf => "sf", Sfp => "sfp", Sfpp => "sfpp", Fp => "fp", Rf => "rf",
        Rfz => "rfz", Sfz => "sfz", Sffz => "sffz", Fz => "fz", N => "n", Pf => "pf", Sfzp => "sfzp",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DynamicsMark {
    Mark(DynamicsValue),
    OtherDynamics(OtherText),
    Extension(RawElement),
}

impl ChoiceItem for DynamicsMark {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        if name == "other-dynamics" {
            return Some(FromXml::from_xml(node, cx).map(DynamicsMark::OtherDynamics));
        }
        match DynamicsValue::from_literal(name) {
            Some(mark) => Some(ElementReader::new(node).finish().map(|_| DynamicsMark::Mark(mark))),
            None => Some(Ok(DynamicsMark::Extension(capture_extension(node, cx)))),
        }
    }

    fn to_element(&self) -> XmlElement {
        match self {
            DynamicsMark::Mark(mark) => XmlElement::new(mark.as_str()),
            DynamicsMark::OtherDynamics(text) => text.to_xml("other-dynamics"),
            DynamicsMark::Extension(raw) => raw.clone(),
        }
    }
}

attribute_group! {
    DynamicsAttributes {
        enclosure: EnclosureShape => "enclosure",
    }
    embeds {
        print_style_align: PrintStyleAlign,
        placement: Placement,
        text_decoration: TextDecoration,
        id: OptionalUniqueId,
    }
}

/// Ordered dynamics marks (`<dynamics><s/><f/><z/></dynamics>` style combinations)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dynamics {
    pub marks: Vec<DynamicsMark>,
    pub attributes: DynamicsAttributes,
}

impl FromXml for Dynamics {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let marks = el.choices(cx)?;
        el.finish()?;
        Ok(Self { marks, attributes })
    }
}

impl ToXml for Dynamics {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        for mark in &self.marks {
            element.push(mark.to_element());
        }
        element
    }
}

// ============================================================================
// MIDI
// ============================================================================

attribute_group! {
    MidiDeviceAttributes {
        port: Midi16 => "port",
        id: String => "id",
    }
}

pub type MidiDevice = Valued<String, MidiDeviceAttributes>;

/// MIDI binding of a score instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiInstrument {
    pub id: String,
    pub midi_channel: Option<Midi16>,
    pub midi_name: Option<String>,
    pub midi_bank: Option<Midi16384>,
    pub midi_program: Option<Midi128>,
    pub midi_unpitched: Option<Midi128>,
    pub volume: Option<Percent>,
    pub pan: Option<RotationDegrees>,
    pub elevation: Option<RotationDegrees>,
}

impl MidiInstrument {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            midi_channel: None,
            midi_name: None,
            midi_bank: None,
            midi_program: None,
            midi_unpitched: None,
            volume: None,
            pan: None,
            elevation: None,
        }
    }
}

impl FromXml for MidiInstrument {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            id: el.req_attr("id", cx)?,
            midi_channel: el.text_child("midi-channel", cx)?,
            midi_name: el.text_child("midi-name", cx)?,
            midi_bank: el.text_child("midi-bank", cx)?,
            midi_program: el.text_child("midi-program", cx)?,
            midi_unpitched: el.text_child("midi-unpitched", cx)?,
            volume: el.text_child("volume", cx)?,
            pan: el.text_child("pan", cx)?,
            elevation: el.text_child("elevation", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for MidiInstrument {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.attr("id", self.id.as_str());
        element.opt_text_child("midi-channel", &self.midi_channel);
        element.opt_text_child("midi-name", &self.midi_name);
        element.opt_text_child("midi-bank", &self.midi_bank);
        element.opt_text_child("midi-program", &self.midi_program);
        element.opt_text_child("midi-unpitched", &self.midi_unpitched);
        element.opt_text_child("volume", &self.volume);
        element.opt_text_child("pan", &self.pan);
        element.opt_text_child("elevation", &self.elevation);
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_child;

    fn parse<T: FromXml>(xml: &str) -> DecodeResult<T> {
        let doc = roxmltree::Document::parse(xml).expect("test XML should parse");
        let mut cx = DecodeContext::default();
        decode_child(doc.root_element(), None, &mut cx)
    }

    #[test]
    fn test_valued_text_with_attributes() {
        let words: FormattedText =
            parse(r#"<words font-style="italic" xml:space="preserve">dolce  </words>"#).expect("words decode");
        assert_eq!(words.value, "dolce  ");
        assert_eq!(words.attributes.space, Some(XmlSpace::Preserve));

        let element = words.to_xml("words");
        assert_eq!(element.text(), "dolce  ");
        assert_eq!(element.attribute("font-style"), Some("italic"));
        assert_eq!(element.attribute("xml:space"), Some("preserve"));
    }

    #[test]
    fn test_empty_element_rejects_children() {
        let err = parse::<EmptyPlacement>("<accent><x/></accent>").expect_err("accent has no children");
        assert_eq!(err.path().to_string(), "accent");
    }

    #[test]
    fn test_dynamics_keep_mark_order() {
        let dynamics: Dynamics = parse(r#"<dynamics placement="below"><s/><f/><other-dynamics>sfffz</other-dynamics></dynamics>"#)
            .expect("dynamics decode");

        // <s/> is not a predefined mark and lands in the extension variant
        assert!(matches!(&dynamics.marks[0], DynamicsMark::Extension(raw) if raw.name == "s"));
        assert_eq!(dynamics.marks[1], DynamicsMark::Mark(DynamicsValue::F));
        assert!(matches!(&dynamics.marks[2], DynamicsMark::OtherDynamics(text) if text.value == "sfffz"));
        assert_eq!(dynamics.attributes.placement.placement, Some(AboveBelow::Below));

        let element = dynamics.to_xml("dynamics");
        let tags: Vec<&str> = element.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(tags, vec!["s", "f", "other-dynamics"]);
    }

    #[test]
    fn test_midi_instrument_fields() {
        let midi: MidiInstrument = parse(
            r#"<midi-instrument id="P1-I1"><midi-channel>1</midi-channel><midi-program>1</midi-program><volume>80</volume><pan>0</pan></midi-instrument>"#,
        )
        .expect("midi-instrument decode");
        assert_eq!(midi.midi_channel, Some(Midi16(1)));
        assert_eq!(midi.volume, Some(Percent(80.0)));

        let element = midi.to_xml("midi-instrument");
        assert_eq!(element.find("pan").map(|e| e.text()), Some("0".to_string()));
    }
}
