//! Page, system and staff layout, shared by `defaults` and `print`

use super::common::*;
use super::groups::*;
use super::primitives::*;
use crate::codec::{DecodeContext, DecodeError, DecodeResult, FromXml, ToXml};
use crate::xml::{ElementReader, XmlElement};
use roxmltree::Node;
use serde::{Deserialize, Serialize};

/// Millimeters per given number of tenths
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaling {
    pub millimeters: Millimeters,
    pub tenths: Tenths,
}

impl Scaling {
    /// Size in millimeters of one tenth
    pub fn millimeters_per_tenth(&self) -> f64 {
        if self.tenths.0 == 0.0 {
            return 0.0;
        }
        self.millimeters.0 / self.tenths.0
    }
}

impl FromXml for Scaling {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            millimeters: el.req_text_child("millimeters", cx)?,
            tenths: el.req_text_child("tenths", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Scaling {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.text_child("millimeters", &self.millimeters);
        element.text_child("tenths", &self.tenths);
        element
    }
}

// ============================================================================
// PAGE AND SYSTEM
// ============================================================================

attribute_group! { PageMarginsAttributes { kind: MarginType => "type" } }

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    pub left_margin: Tenths,
    pub right_margin: Tenths,
    pub top_margin: Tenths,
    pub bottom_margin: Tenths,
    pub attributes: PageMarginsAttributes,
}

impl FromXml for PageMargins {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            left_margin: el.req_text_child("left-margin", cx)?,
            right_margin: el.req_text_child("right-margin", cx)?,
            top_margin: el.req_text_child("top-margin", cx)?,
            bottom_margin: el.req_text_child("bottom-margin", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for PageMargins {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.text_child("left-margin", &self.left_margin);
        element.text_child("right-margin", &self.right_margin);
        element.text_child("top-margin", &self.top_margin);
        element.text_child("bottom-margin", &self.bottom_margin);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_height: Option<Tenths>,
    pub page_width: Option<Tenths>,
    /// Odd and even pages may each carry their own margins
    pub page_margins: Vec<PageMargins>,
}

impl FromXml for PageLayout {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            page_height: el.text_child("page-height", cx)?,
            page_width: el.text_child("page-width", cx)?,
            page_margins: el.children("page-margins", cx)?,
        };
        match (&value.page_height, &value.page_width) {
            (Some(_), None) => return Err(DecodeError::missing("page-width")),
            (None, Some(_)) => return Err(DecodeError::missing("page-height")),
            _ => {}
        }
        if value.page_margins.len() > 2 {
            return Err(DecodeError::unexpected("page-margins"));
        }
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for PageLayout {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.opt_text_child("page-height", &self.page_height);
        element.opt_text_child("page-width", &self.page_width);
        element.children("page-margins", &self.page_margins);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemMargins {
    pub left_margin: Tenths,
    pub right_margin: Tenths,
}

impl FromXml for SystemMargins {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            left_margin: el.req_text_child("left-margin", cx)?,
            right_margin: el.req_text_child("right-margin", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for SystemMargins {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.text_child("left-margin", &self.left_margin);
        element.text_child("right-margin", &self.right_margin);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemDividers {
    pub left_divider: EmptyPrintObjectStyleAlign,
    pub right_divider: EmptyPrintObjectStyleAlign,
}

impl FromXml for SystemDividers {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            left_divider: el.req_child("left-divider", cx)?,
            right_divider: el.req_child("right-divider", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for SystemDividers {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.child("left-divider", &self.left_divider);
        element.child("right-divider", &self.right_divider);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemLayout {
    pub system_margins: Option<SystemMargins>,
    pub system_distance: Option<Tenths>,
    pub top_system_distance: Option<Tenths>,
    pub system_dividers: Option<SystemDividers>,
}

impl FromXml for SystemLayout {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            system_margins: el.child("system-margins", cx)?,
            system_distance: el.text_child("system-distance", cx)?,
            top_system_distance: el.text_child("top-system-distance", cx)?,
            system_dividers: el.child("system-dividers", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for SystemLayout {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.opt_child("system-margins", &self.system_margins);
        element.opt_text_child("system-distance", &self.system_distance);
        element.opt_text_child("top-system-distance", &self.top_system_distance);
        element.opt_child("system-dividers", &self.system_dividers);
        element
    }
}

attribute_group! { StaffLayoutAttributes { number: StaffNumber => "number" } }

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffLayout {
    pub staff_distance: Option<Tenths>,
    pub attributes: StaffLayoutAttributes,
}

impl FromXml for StaffLayout {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            staff_distance: el.text_child("staff-distance", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for StaffLayout {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.opt_text_child("staff-distance", &self.staff_distance);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureLayout {
    pub measure_distance: Option<Tenths>,
}

impl FromXml for MeasureLayout {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            measure_distance: el.text_child("measure-distance", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for MeasureLayout {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.opt_text_child("measure-distance", &self.measure_distance);
        element
    }
}

attribute_group! {
    MeasureNumberingAttributes {
        system: SystemRelationNumber => "system",
        staff: StaffNumber => "staff",
        multiple_rest_always: YesNo => "multiple-rest-always",
        multiple_rest_range: YesNo => "multiple-rest-range",
    }
    embeds { print_style_align: PrintStyleAlign }
}

pub type MeasureNumbering = Valued<MeasureNumberingValue, MeasureNumberingAttributes>;

// ============================================================================
// APPEARANCE
// ============================================================================

attribute_group! {
    /// Open-ended `type` naming what the value applies to
    AppearanceType {
        required { kind: String => "type" }
    }
}

attribute_group! { NoteSizeAttributes { required { kind: NoteSizeType => "type" } } }

pub type LineWidth = Valued<Tenths, AppearanceType>;
pub type NoteSize = Valued<NonNegativeDecimal, NoteSizeAttributes>;
pub type Distance = Valued<Tenths, AppearanceType>;
pub type Glyph = Valued<SmuflGlyphName, AppearanceType>;
pub type OtherAppearance = Valued<String, AppearanceType>;

/// Global rendering defaults for line widths, note sizes and glyphs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub line_widths: Vec<LineWidth>,
    pub note_sizes: Vec<NoteSize>,
    pub distances: Vec<Distance>,
    pub glyphs: Vec<Glyph>,
    pub other_appearances: Vec<OtherAppearance>,
}

impl Appearance {
    pub fn line_width(&self, kind: &str) -> Option<Tenths> {
        self.line_widths
            .iter()
            .find(|width| width.attributes.kind == kind)
            .map(|width| width.value)
    }
}

impl FromXml for Appearance {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            line_widths: el.children("line-width", cx)?,
            note_sizes: el.children("note-size", cx)?,
            distances: el.children("distance", cx)?,
            glyphs: el.children("glyph", cx)?,
            other_appearances: el.children("other-appearance", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Appearance {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.children("line-width", &self.line_widths);
        element.children("note-size", &self.note_sizes);
        element.children("distance", &self.distances);
        element.children("glyph", &self.glyphs);
        element.children("other-appearance", &self.other_appearances);
        element
    }
}

// ============================================================================
// PRINT
// ============================================================================

attribute_group! {
    PrintElementAttributes {}
    embeds {
        print: PrintAttributes,
        id: OptionalUniqueId,
    }
}

/// Layout changes and breaks starting at the current measure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Print {
    pub page_layout: Option<PageLayout>,
    pub system_layout: Option<SystemLayout>,
    pub staff_layouts: Vec<StaffLayout>,
    pub measure_layout: Option<MeasureLayout>,
    pub measure_numbering: Option<MeasureNumbering>,
    pub part_name_display: Option<NameDisplay>,
    pub part_abbreviation_display: Option<NameDisplay>,
    pub attributes: PrintElementAttributes,
}

impl Print {
    pub fn new_system() -> Self {
        let mut print = Self::default();
        print.attributes.print.new_system = Some(YesNo::Yes);
        print
    }

    pub fn new_page() -> Self {
        let mut print = Self::default();
        print.attributes.print.new_page = Some(YesNo::Yes);
        print
    }
}

impl FromXml for Print {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            page_layout: el.child("page-layout", cx)?,
            system_layout: el.child("system-layout", cx)?,
            staff_layouts: el.children("staff-layout", cx)?,
            measure_layout: el.child("measure-layout", cx)?,
            measure_numbering: el.child("measure-numbering", cx)?,
            part_name_display: el.child("part-name-display", cx)?,
            part_abbreviation_display: el.child("part-abbreviation-display", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Print {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.opt_child("page-layout", &self.page_layout);
        element.opt_child("system-layout", &self.system_layout);
        element.children("staff-layout", &self.staff_layouts);
        element.opt_child("measure-layout", &self.measure_layout);
        element.opt_child("measure-numbering", &self.measure_numbering);
        element.opt_child("part-name-display", &self.part_name_display);
        element.opt_child("part-abbreviation-display", &self.part_abbreviation_display);
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
    fn test_page_layout_with_both_margins() {
        let layout: PageLayout = parse(
            r#"<page-layout><page-height>1683</page-height><page-width>1190</page-width><page-margins type="even"><left-margin>70</left-margin><right-margin>70</right-margin><top-margin>88</top-margin><bottom-margin>88</bottom-margin></page-margins><page-margins type="odd"><left-margin>80</left-margin><right-margin>60</right-margin><top-margin>88</top-margin><bottom-margin>88</bottom-margin></page-margins></page-layout>"#,
        )
        .expect("page-layout decode");
        assert_eq!(layout.page_height, Some(Tenths(1683.0)));
        assert_eq!(layout.page_margins.len(), 2);
        assert_eq!(layout.page_margins[1].attributes.kind, Some(MarginType::Odd));
        assert_eq!(layout.page_margins[1].left_margin, Tenths(80.0));
    }

    #[test]
    fn test_page_size_needs_both_dimensions() {
        let err = parse::<PageLayout>("<page-layout><page-height>1683</page-height></page-layout>")
            .expect_err("width is required with height");
        assert_eq!(err.to_string(), "missing required field page-width at page-layout");
    }

    #[test]
    fn test_print_with_system_break_and_numbering() {
        let print: Print = parse(
            r#"<print new-system="yes"><system-layout><system-distance>121</system-distance></system-layout><staff-layout number="2"><staff-distance>65</staff-distance></staff-layout><measure-numbering system="only-top">system</measure-numbering></print>"#,
        )
        .expect("print decode");
        assert_eq!(print.attributes.print.new_system, Some(YesNo::Yes));
        assert_eq!(
            print.system_layout.as_ref().and_then(|s| s.system_distance),
            Some(Tenths(121.0))
        );
        assert_eq!(print.staff_layouts[0].attributes.number, Some(StaffNumber(2)));
        assert_eq!(
            print.measure_numbering.as_ref().map(|m| &m.value),
            Some(&MeasureNumberingValue::System)
        );
        assert_eq!(Print::new_system().to_xml("print").attribute("new-system"), Some("yes"));
    }

    #[test]
    fn test_appearance_lookup_by_type() {
        let appearance: Appearance = parse(
            r#"<appearance><line-width type="stem">0.7487</line-width><line-width type="beam">5</line-width><note-size type="cue">60</note-size></appearance>"#,
        )
        .expect("appearance decode");
        assert_eq!(appearance.line_width("beam"), Some(Tenths(5.0)));
        assert_eq!(appearance.line_width("staff"), None);
        assert_eq!(appearance.note_sizes[0].attributes.kind, NoteSizeType::Cue);
    }
}
