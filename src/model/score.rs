//! Document roots, parts, measures and the music-data sequence

use super::attributes::Attributes;
use super::barline::Barline;
use super::common::*;
use super::direction::Direction;
use super::groups::*;
use super::harmony::{FiguredBass, Harmony};
use super::header::{Bookmark, Link, ScoreHeader};
use super::layout::Print;
use super::note::{Backup, Forward, Note};
use super::primitives::*;
use super::sound::{Listening, Sound};
use crate::codec::{
    decode_child, ChoiceItem, DecodeContext, DecodeError, DecodeErrorKind, DecodeFn, DecodeResult,
    FromXml, ToXml,
};
use crate::xml::{ElementReader, XmlElement};
use once_cell::sync::Lazy;
use roxmltree::Node;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `version` assumed when the root element does not carry one
pub const DEFAULT_VERSION: &str = "1.0";

/// `version` written by documents built in code
pub const CURRENT_VERSION: &str = "4.0";

// ============================================================================
// GROUPING
// ============================================================================

attribute_group! {
    GroupingAttributes {
        required { kind: StartStopSingle => "type" }
        number: String => "number",
        member_of: String => "member-of",
    }
    embeds { id: OptionalUniqueId }
}

/// Analysis grouping such as a phrase or a motif
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grouping {
    pub features: Vec<TypedText>,
    pub attributes: GroupingAttributes,
}

impl FromXml for Grouping {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            features: el.children("feature", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Grouping {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.children("feature", &self.features);
        element
    }
}

// ============================================================================
// MUSIC DATA
// ============================================================================

/// One entry of a measure's content, in document order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MusicData {
    Note(Box<Note>),
    Backup(Backup),
    Forward(Forward),
    Direction(Box<Direction>),
    Attributes(Box<Attributes>),
    Harmony(Box<Harmony>),
    FiguredBass(FiguredBass),
    Print(Box<Print>),
    Sound(Sound),
    Listening(Listening),
    Barline(Box<Barline>),
    Grouping(Grouping),
    Link(Link),
    Bookmark(Bookmark),
}

static MUSIC_DATA_DECODERS: Lazy<HashMap<&'static str, DecodeFn<MusicData>>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, DecodeFn<MusicData>> = HashMap::new();
    table.insert("note", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Note));
    table.insert("backup", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Backup));
    table.insert("forward", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Forward));
    table.insert("direction", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Direction));
    table.insert("attributes", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Attributes));
    table.insert("harmony", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Harmony));
    table.insert("figured-bass", |n, cx| FromXml::from_xml(n, cx).map(MusicData::FiguredBass));
    table.insert("print", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Print));
    table.insert("sound", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Sound));
    table.insert("listening", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Listening));
    table.insert("barline", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Barline));
    table.insert("grouping", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Grouping));
    table.insert("link", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Link));
    table.insert("bookmark", |n, cx| FromXml::from_xml(n, cx).map(MusicData::Bookmark));
    table
});

impl MusicData {
    /// Tag name of the element this entry encodes to
    pub fn name(&self) -> &'static str {
        match self {
            MusicData::Note(_) => "note",
            MusicData::Backup(_) => "backup",
            MusicData::Forward(_) => "forward",
            MusicData::Direction(_) => "direction",
            MusicData::Attributes(_) => "attributes",
            MusicData::Harmony(_) => "harmony",
            MusicData::FiguredBass(_) => "figured-bass",
            MusicData::Print(_) => "print",
            MusicData::Sound(_) => "sound",
            MusicData::Listening(_) => "listening",
            MusicData::Barline(_) => "barline",
            MusicData::Grouping(_) => "grouping",
            MusicData::Link(_) => "link",
            MusicData::Bookmark(_) => "bookmark",
        }
    }
}

impl ChoiceItem for MusicData {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        MUSIC_DATA_DECODERS.get(name).map(|decode| decode(node, cx))
    }

    fn to_element(&self) -> XmlElement {
        let tag = self.name();
        match self {
            MusicData::Note(v) => v.to_xml(tag),
            MusicData::Backup(v) => v.to_xml(tag),
            MusicData::Forward(v) => v.to_xml(tag),
            MusicData::Direction(v) => v.to_xml(tag),
            MusicData::Attributes(v) => v.to_xml(tag),
            MusicData::Harmony(v) => v.to_xml(tag),
            MusicData::FiguredBass(v) => v.to_xml(tag),
            MusicData::Print(v) => v.to_xml(tag),
            MusicData::Sound(v) => v.to_xml(tag),
            MusicData::Listening(v) => v.to_xml(tag),
            MusicData::Barline(v) => v.to_xml(tag),
            MusicData::Grouping(v) => v.to_xml(tag),
            MusicData::Link(v) => v.to_xml(tag),
            MusicData::Bookmark(v) => v.to_xml(tag),
        }
    }
}

impl From<Note> for MusicData {
    fn from(note: Note) -> Self {
        MusicData::Note(Box::new(note))
    }
}

impl From<Backup> for MusicData {
    fn from(backup: Backup) -> Self {
        MusicData::Backup(backup)
    }
}

impl From<Forward> for MusicData {
    fn from(forward: Forward) -> Self {
        MusicData::Forward(forward)
    }
}

impl From<Direction> for MusicData {
    fn from(direction: Direction) -> Self {
        MusicData::Direction(Box::new(direction))
    }
}

impl From<Attributes> for MusicData {
    fn from(attributes: Attributes) -> Self {
        MusicData::Attributes(Box::new(attributes))
    }
}

impl From<Harmony> for MusicData {
    fn from(harmony: Harmony) -> Self {
        MusicData::Harmony(Box::new(harmony))
    }
}

impl From<Print> for MusicData {
    fn from(print: Print) -> Self {
        MusicData::Print(Box::new(print))
    }
}

impl From<Sound> for MusicData {
    fn from(sound: Sound) -> Self {
        MusicData::Sound(sound)
    }
}

impl From<Barline> for MusicData {
    fn from(barline: Barline) -> Self {
        MusicData::Barline(Box::new(barline))
    }
}

fn write_music_data(element: &mut XmlElement, items: &[MusicData]) {
    for item in items {
        element.push(item.to_element());
    }
}

// ============================================================================
// MEASURE
// ============================================================================

attribute_group! {
    MeasureAttributes {
        required { number: MeasureText => "number" }
        text: MeasureText => "text",
        implicit: YesNo => "implicit",
        non_controlling: YesNo => "non-controlling",
        width: Tenths => "width",
    }
    embeds { id: OptionalUniqueId }
}

impl MeasureAttributes {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: MeasureText(number.into()),
            text: None,
            implicit: None,
            non_controlling: None,
            width: None,
            id: OptionalUniqueId::default(),
        }
    }
}

/// Measure of a partwise part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub attributes: MeasureAttributes,
    pub music_data: Vec<MusicData>,
}

impl Measure {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            attributes: MeasureAttributes::new(number),
            music_data: Vec::new(),
        }
    }

    pub fn number(&self) -> &str {
        self.attributes.number.as_str()
    }

    pub fn push(&mut self, item: impl Into<MusicData>) {
        self.music_data.push(item.into());
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        notes_of(&self.music_data)
    }
}

fn notes_of(items: &[MusicData]) -> impl Iterator<Item = &Note> {
    items.iter().filter_map(|item| match item {
        MusicData::Note(note) => Some(note.as_ref()),
        _ => None,
    })
}

impl FromXml for Measure {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let music_data = el.choices(cx)?;
        el.finish()?;
        Ok(Self {
            attributes,
            music_data,
        })
    }
}

impl ToXml for Measure {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        write_music_data(&mut element, &self.music_data);
        element
    }
}

/// Part of a partwise document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Refers to a `score-part` of the part list
    pub id: String,
    pub measures: Vec<Measure>,
}

impl Part {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            measures: Vec::new(),
        }
    }

    pub fn measure(&self, number: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.number() == number)
    }
}

impl FromXml for Part {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            id: el.req_attr("id", cx)?,
            measures: el.children("measure", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Part {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.attr("id", self.id.as_str());
        element.children("measure", &self.measures);
        element
    }
}

// ============================================================================
// TIMEWISE BODY
// ============================================================================

/// One part's content inside a timewise measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimewisePart {
    pub id: String,
    pub music_data: Vec<MusicData>,
}

impl TimewisePart {
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        notes_of(&self.music_data)
    }
}

impl FromXml for TimewisePart {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let id = el.req_attr("id", cx)?;
        let music_data = el.choices(cx)?;
        el.finish()?;
        Ok(Self { id, music_data })
    }
}

impl ToXml for TimewisePart {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.attr("id", self.id.as_str());
        write_music_data(&mut element, &self.music_data);
        element
    }
}

/// Measure of a timewise document, holding every part's slice of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimewiseMeasure {
    pub attributes: MeasureAttributes,
    pub parts: Vec<TimewisePart>,
}

impl TimewiseMeasure {
    pub fn number(&self) -> &str {
        self.attributes.number.as_str()
    }
}

impl FromXml for TimewiseMeasure {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            parts: el.children("part", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for TimewiseMeasure {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.children("part", &self.parts);
        element
    }
}

// ============================================================================
// DOCUMENT ROOTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePartwise {
    pub version: String,
    pub header: ScoreHeader,
    pub parts: Vec<Part>,
}

impl FromXml for ScorePartwise {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let version = el.attr("version", cx)?;
        let header = ScoreHeader::read(&mut el, cx)?;
        let parts = el.children("part", cx)?;
        el.finish()?;
        Ok(Self {
            version: version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            header,
            parts,
        })
    }
}

impl ToXml for ScorePartwise {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.attr("version", self.version.as_str());
        self.header.write(&mut element);
        element.children("part", &self.parts);
        element
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTimewise {
    pub version: String,
    pub header: ScoreHeader,
    pub measures: Vec<TimewiseMeasure>,
}

impl FromXml for ScoreTimewise {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let version = el.attr("version", cx)?;
        let header = ScoreHeader::read(&mut el, cx)?;
        let measures = el.children("measure", cx)?;
        el.finish()?;
        Ok(Self {
            version: version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            header,
            measures,
        })
    }
}

impl ToXml for ScoreTimewise {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.attr("version", self.version.as_str());
        self.header.write(&mut element);
        element.children("measure", &self.measures);
        element
    }
}

/// A MusicXML document in one of its two layouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoreDocument {
    Partwise(ScorePartwise),
    Timewise(ScoreTimewise),
}

impl ScoreDocument {
    /// Decode from the document element, choosing the layout by tag name
    pub fn from_root(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        match node.tag_name().name() {
            "score-partwise" => decode_child(node, None, cx).map(ScoreDocument::Partwise),
            "score-timewise" => decode_child(node, None, cx).map(ScoreDocument::Timewise),
            other => Err(DecodeError::new(DecodeErrorKind::UnexpectedRootElement(
                other.to_string(),
            ))),
        }
    }

    pub fn to_root_element(&self) -> XmlElement {
        match self {
            ScoreDocument::Partwise(score) => score.to_xml(self.root_name()),
            ScoreDocument::Timewise(score) => score.to_xml(self.root_name()),
        }
    }

    pub fn root_name(&self) -> &'static str {
        match self {
            ScoreDocument::Partwise(_) => "score-partwise",
            ScoreDocument::Timewise(_) => "score-timewise",
        }
    }

    pub fn layout_name(&self) -> &'static str {
        match self {
            ScoreDocument::Partwise(_) => "partwise",
            ScoreDocument::Timewise(_) => "timewise",
        }
    }

    pub fn version(&self) -> &str {
        match self {
            ScoreDocument::Partwise(score) => &score.version,
            ScoreDocument::Timewise(score) => &score.version,
        }
    }

    pub fn header(&self) -> &ScoreHeader {
        match self {
            ScoreDocument::Partwise(score) => &score.header,
            ScoreDocument::Timewise(score) => &score.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut ScoreHeader {
        match self {
            ScoreDocument::Partwise(score) => &mut score.header,
            ScoreDocument::Timewise(score) => &mut score.header,
        }
    }

    /// Part ids used by the body, in first-seen order
    pub fn body_part_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        match self {
            ScoreDocument::Partwise(score) => {
                for part in &score.parts {
                    if !ids.contains(&part.id.as_str()) {
                        ids.push(part.id.as_str());
                    }
                }
            }
            ScoreDocument::Timewise(score) => {
                for part in score.measures.iter().flat_map(|m| &m.parts) {
                    if !ids.contains(&part.id.as_str()) {
                        ids.push(part.id.as_str());
                    }
                }
            }
        }
        ids
    }

    pub fn part_count(&self) -> usize {
        self.body_part_ids().len()
    }

    /// Longest part in measures
    pub fn measure_count(&self) -> usize {
        match self {
            ScoreDocument::Partwise(score) => score
                .parts
                .iter()
                .map(|part| part.measures.len())
                .max()
                .unwrap_or(0),
            ScoreDocument::Timewise(score) => score.measures.len(),
        }
    }

    /// Body part ids with no matching `score-part`
    pub fn unresolved_part_ids(&self) -> Vec<&str> {
        let part_list = &self.header().part_list;
        self.body_part_ids()
            .into_iter()
            .filter(|id| part_list.score_part(id).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: FromXml>(xml: &str) -> DecodeResult<T> {
        let doc = roxmltree::Document::parse(xml).expect("test XML should parse");
        let mut cx = DecodeContext::default();
        decode_child(doc.root_element(), None, &mut cx)
    }

    #[test]
    fn test_measure_keeps_interleaved_order() {
        let measure: Measure = parse(
            r#"<measure number="1"><attributes><divisions>1</divisions></attributes><note><pitch><step>C</step><octave>4</octave></pitch><duration>4</duration><voice>1</voice></note><backup><duration>4</duration></backup><note><rest/><duration>4</duration><voice>2</voice></note><barline location="right"><bar-style>light-heavy</bar-style></barline></measure>"#,
        )
        .expect("measure decode");

        let names: Vec<&str> = measure.music_data.iter().map(MusicData::name).collect();
        assert_eq!(names, vec!["attributes", "note", "backup", "note", "barline"]);
        assert_eq!(measure.notes().count(), 2);

        let element = measure.to_xml("measure");
        let written: Vec<&str> = element.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(written, names);
    }

    #[test]
    fn test_unknown_music_data_is_rejected_with_path() {
        let err = parse::<Part>(r#"<part id="P1"><measure number="1"/><measure number="2"><melody/></measure></part>"#)
            .expect_err("melody is not music data");
        assert_eq!(err.kind(), &DecodeErrorKind::UnexpectedElement { name: "melody".to_string() });
        assert_eq!(err.path().to_string(), "part/measure[1]");
    }

    #[test]
    fn test_measure_number_is_required() {
        let err = parse::<Measure>("<measure/>").expect_err("number is required");
        assert_eq!(err.to_string(), "missing required field @number at measure");
    }

    #[test]
    fn test_grouping_features() {
        let grouping: Grouping = parse(
            r#"<grouping type="start" number="2"><feature type="phrase">A</feature></grouping>"#,
        )
        .expect("grouping decode");
        assert_eq!(grouping.attributes.kind, StartStopSingle::Start);
        assert_eq!(grouping.features[0].value, "A");
    }

    #[test]
    fn test_version_defaults_when_absent() {
        let score: ScorePartwise = parse(
            r#"<score-partwise><part-list><score-part id="P1"><part-name>A</part-name></score-part></part-list><part id="P1"/></score-partwise>"#,
        )
        .expect("score decode");
        assert_eq!(score.version, DEFAULT_VERSION);
        assert_eq!(score.to_xml("score-partwise").attribute("version"), Some("1.0"));
    }

    #[test]
    fn test_timewise_counts() {
        let score: ScoreTimewise = parse(
            r#"<score-timewise version="4.0"><part-list><score-part id="P1"><part-name>A</part-name></score-part><score-part id="P2"><part-name>B</part-name></score-part></part-list><measure number="1"><part id="P1"/><part id="P2"/></measure><measure number="2"><part id="P1"/><part id="P3"/></measure></score-timewise>"#,
        )
        .expect("timewise decode");
        let document = ScoreDocument::Timewise(score);
        assert_eq!(document.part_count(), 3);
        assert_eq!(document.measure_count(), 2);
        assert_eq!(document.unresolved_part_ids(), vec!["P3"]);
        assert_eq!(document.root_name(), "score-timewise");
    }
}
