//! Score header: work and identification metadata, defaults, credits and
//! the part list

use super::common::*;
use super::direction::Image;
use super::groups::*;
use super::layout::{Appearance, PageLayout, Scaling, StaffLayout, SystemLayout};
use super::primitives::*;
use super::sound::InstrumentData;
use crate::codec::{ChoiceItem, DecodeContext, DecodeError, DecodeResult, FromXml, ToXml, XmlValue};
use crate::xml::{ElementReader, XmlElement};
use roxmltree::Node;
use serde::{Deserialize, Serialize};

/// Scalar content of a text-only element reached through an ordered choice
fn text_content<T: XmlValue>(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<T> {
    let el = ElementReader::new(node);
    let value = el.value(cx)?;
    el.finish()?;
    Ok(value)
}

// ============================================================================
// LINKS
// ============================================================================

attribute_group! {
    /// XLink to another document, from `link` or a credit
    Link {
        name: String => "name",
    }
    embeds {
        link: LinkAttributes,
        element: ElementPosition,
        position: Position,
    }
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            link: LinkAttributes::new(href),
            ..Self::default()
        }
    }
}

attribute_group! {
    /// Named anchor that links can point at
    Bookmark {
        required { id: String => "id" }
        name: String => "name",
    }
    embeds { element: ElementPosition }
}

empty_element!(Link, Bookmark);

// ============================================================================
// WORK
// ============================================================================

attribute_group! { Opus {} embeds { link: LinkAttributes } }

empty_element!(Opus);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub work_number: Option<String>,
    pub work_title: Option<String>,
    pub opus: Option<Opus>,
}

impl FromXml for Work {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            work_number: el.text_child("work-number", cx)?,
            work_title: el.text_child("work-title", cx)?,
            opus: el.child("opus", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Work {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.opt_text_child("work-number", &self.work_number);
        element.opt_text_child("work-title", &self.work_title);
        element.opt_child("opus", &self.opus);
        element
    }
}

// ============================================================================
// IDENTIFICATION
// ============================================================================

attribute_group! {
    /// Feature the encoding does or does not support
    Supports {
        required {
            kind: YesNo => "type",
            element: String => "element",
        }
        attribute: String => "attribute",
        value: String => "value",
    }
}

empty_element!(Supports);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncodingItem {
    EncodingDate(YyyyMmDd),
    Encoder(TypedText),
    Software(String),
    EncodingDescription(String),
    Supports(Supports),
}

impl ChoiceItem for EncodingItem {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "encoding-date" => text_content(node, cx).map(EncodingItem::EncodingDate),
            "encoder" => FromXml::from_xml(node, cx).map(EncodingItem::Encoder),
            "software" => text_content(node, cx).map(EncodingItem::Software),
            "encoding-description" => text_content(node, cx).map(EncodingItem::EncodingDescription),
            "supports" => FromXml::from_xml(node, cx).map(EncodingItem::Supports),
            _ => return None,
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            EncodingItem::EncodingDate(date) => XmlElement::with_text("encoding-date", date.as_str()),
            EncodingItem::Encoder(encoder) => encoder.to_xml("encoder"),
            EncodingItem::Software(software) => XmlElement::with_text("software", software.as_str()),
            EncodingItem::EncodingDescription(text) => {
                XmlElement::with_text("encoding-description", text.as_str())
            }
            EncodingItem::Supports(supports) => supports.to_xml("supports"),
        }
    }
}

/// Provenance of the digital encoding, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Encoding {
    pub items: Vec<EncodingItem>,
}

impl Encoding {
    pub fn software(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            EncodingItem::Software(software) => Some(software.as_str()),
            _ => None,
        })
    }
}

impl FromXml for Encoding {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let items = el.choices(cx)?;
        el.finish()?;
        Ok(Self { items })
    }
}

impl ToXml for Encoding {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        for item in &self.items {
            element.push(item.to_element());
        }
        element
    }
}

attribute_group! { MiscellaneousFieldAttributes { required { name: String => "name" } } }

pub type MiscellaneousField = Valued<String, MiscellaneousFieldAttributes>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    pub creators: Vec<TypedText>,
    pub rights: Vec<TypedText>,
    pub encoding: Option<Encoding>,
    pub source: Option<String>,
    pub relations: Vec<TypedText>,
    /// Children of `miscellaneous`; the wrapper is written only when non-empty
    pub miscellaneous: Vec<MiscellaneousField>,
}

impl Identification {
    /// First creator with the given `type`, such as `composer`
    pub fn creator(&self, kind: &str) -> Option<&str> {
        self.creators
            .iter()
            .find(|creator| creator.attributes.kind.as_deref() == Some(kind))
            .map(|creator| creator.value.as_str())
    }
}

impl FromXml for Identification {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let mut value = Self {
            creators: el.children("creator", cx)?,
            rights: el.children("rights", cx)?,
            encoding: el.child("encoding", cx)?,
            source: el.text_child("source", cx)?,
            relations: el.children("relation", cx)?,
            miscellaneous: Vec::new(),
        };
        if let Some(Miscellaneous(fields)) = el.child("miscellaneous", cx)? {
            value.miscellaneous = fields;
        }
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Identification {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.children("creator", &self.creators);
        element.children("rights", &self.rights);
        element.opt_child("encoding", &self.encoding);
        element.opt_text_child("source", &self.source);
        element.children("relation", &self.relations);
        if !self.miscellaneous.is_empty() {
            let mut miscellaneous = XmlElement::new("miscellaneous");
            miscellaneous.children("miscellaneous-field", &self.miscellaneous);
            element.push(miscellaneous);
        }
        element
    }
}

struct Miscellaneous(Vec<MiscellaneousField>);

impl FromXml for Miscellaneous {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let fields = el.children("miscellaneous-field", cx)?;
        el.finish()?;
        Ok(Self(fields))
    }
}

// ============================================================================
// DEFAULTS
// ============================================================================

attribute_group! {
    LyricFont {
        number: String => "number",
        name: String => "name",
    }
    embeds { font: Font }
}

attribute_group! {
    LyricLanguage {
        required { lang: XmlLang => "xml:lang" }
        number: String => "number",
        name: String => "name",
    }
}

empty_element!(LyricFont, LyricLanguage);

/// Score-wide formatting defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    pub scaling: Option<Scaling>,
    /// Written pitch is concert pitch throughout
    pub concert_score: bool,
    pub page_layout: Option<PageLayout>,
    pub system_layout: Option<SystemLayout>,
    pub staff_layouts: Vec<StaffLayout>,
    pub appearance: Option<Appearance>,
    pub music_font: Option<EmptyFont>,
    pub word_font: Option<EmptyFont>,
    pub lyric_fonts: Vec<LyricFont>,
    pub lyric_languages: Vec<LyricLanguage>,
}

impl FromXml for Defaults {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            scaling: el.child("scaling", cx)?,
            concert_score: el.flag("concert-score"),
            page_layout: el.child("page-layout", cx)?,
            system_layout: el.child("system-layout", cx)?,
            staff_layouts: el.children("staff-layout", cx)?,
            appearance: el.child("appearance", cx)?,
            music_font: el.child("music-font", cx)?,
            word_font: el.child("word-font", cx)?,
            lyric_fonts: el.children("lyric-font", cx)?,
            lyric_languages: el.children("lyric-language", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Defaults {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.opt_child("scaling", &self.scaling);
        element.flag("concert-score", self.concert_score);
        element.opt_child("page-layout", &self.page_layout);
        element.opt_child("system-layout", &self.system_layout);
        element.children("staff-layout", &self.staff_layouts);
        element.opt_child("appearance", &self.appearance);
        element.opt_child("music-font", &self.music_font);
        element.opt_child("word-font", &self.word_font);
        element.children("lyric-font", &self.lyric_fonts);
        element.children("lyric-language", &self.lyric_languages);
        element
    }
}

// ============================================================================
// CREDIT
// ============================================================================

/// Run of credit text; links and bookmarks may sit between the runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CreditItem {
    Words(FormattedTextId),
    Symbol(FormattedSymbolId),
    Link(Link),
    Bookmark(Bookmark),
}

impl ChoiceItem for CreditItem {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "credit-words" => FromXml::from_xml(node, cx).map(CreditItem::Words),
            "credit-symbol" => FromXml::from_xml(node, cx).map(CreditItem::Symbol),
            "link" => FromXml::from_xml(node, cx).map(CreditItem::Link),
            "bookmark" => FromXml::from_xml(node, cx).map(CreditItem::Bookmark),
            _ => return None,
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            CreditItem::Words(words) => words.to_xml("credit-words"),
            CreditItem::Symbol(symbol) => symbol.to_xml("credit-symbol"),
            CreditItem::Link(link) => link.to_xml("link"),
            CreditItem::Bookmark(bookmark) => bookmark.to_xml("bookmark"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CreditContent {
    Image(Image),
    /// Starts with `credit-words` or `credit-symbol`
    Text(Vec<CreditItem>),
}

attribute_group! {
    CreditAttributes {
        page: u32 => "page",
    }
    embeds { id: OptionalUniqueId }
}

/// Title, composer or other text printed on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    pub credit_types: Vec<String>,
    pub links: Vec<Link>,
    pub bookmarks: Vec<Bookmark>,
    pub content: CreditContent,
    pub attributes: CreditAttributes,
}

impl Credit {
    pub fn words(page: u32, text: impl Into<String>) -> Self {
        Self {
            credit_types: Vec::new(),
            links: Vec::new(),
            bookmarks: Vec::new(),
            content: CreditContent::Text(vec![CreditItem::Words(Valued::new(text.into()))]),
            attributes: CreditAttributes {
                page: Some(page),
                ..CreditAttributes::default()
            },
        }
    }

    /// Concatenated `credit-words` text
    pub fn text(&self) -> String {
        match &self.content {
            CreditContent::Image(_) => String::new(),
            CreditContent::Text(items) => items
                .iter()
                .filter_map(|item| match item {
                    CreditItem::Words(words) => Some(words.value.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }
}

impl FromXml for Credit {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let credit_types = el.text_children("credit-type", cx)?;
        let image: Option<Image> = el.child("credit-image", cx)?;

        // leading links and bookmarks belong to the credit, later ones to the text
        let mut links = Vec::new();
        let mut bookmarks = Vec::new();
        let mut items = Vec::new();
        for item in el.choices::<CreditItem>(cx)? {
            match item {
                CreditItem::Link(link) if items.is_empty() => links.push(link),
                CreditItem::Bookmark(bookmark) if items.is_empty() => bookmarks.push(bookmark),
                CreditItem::Link(_) | CreditItem::Bookmark(_) if image.is_some() => {
                    return Err(DecodeError::unexpected(item.to_element().name));
                }
                _ => items.push(item),
            }
        }
        el.finish()?;

        let content = match image {
            Some(image) if items.is_empty() => CreditContent::Image(image),
            Some(_) => return Err(DecodeError::unexpected(items[0].to_element().name)),
            None if items.is_empty() => return Err(DecodeError::missing("credit-words")),
            None => CreditContent::Text(items),
        };

        Ok(Self {
            credit_types,
            links,
            bookmarks,
            content,
            attributes,
        })
    }
}

impl ToXml for Credit {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.text_children("credit-type", &self.credit_types);
        element.children("link", &self.links);
        element.children("bookmark", &self.bookmarks);
        match &self.content {
            CreditContent::Image(image) => element.child("credit-image", image),
            CreditContent::Text(items) => {
                for item in items {
                    element.push(item.to_element());
                }
            }
        }
        element
    }
}

// ============================================================================
// PART GROUP
// ============================================================================

attribute_group! {
    GroupNameAttributes {
        justify: LeftCenterRight => "justify",
    }
    embeds { print_style: PrintStyle }
}

pub type GroupName = Valued<String, GroupNameAttributes>;

attribute_group! {
    GroupSymbolAttributes {
        color: Color => "color",
    }
    embeds { position: Position }
}

pub type GroupSymbol = Valued<GroupSymbolValue, GroupSymbolAttributes>;

attribute_group! { GroupBarlineAttributes { color: Color => "color" } }

pub type GroupBarline = Valued<GroupBarlineValue, GroupBarlineAttributes>;

attribute_group! {
    PartGroupAttributes {
        required { kind: StartStop => "type" }
        number: String => "number",
    }
}

/// Start or stop marker of a bracketed or braced group of parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartGroup {
    pub group_name: Option<GroupName>,
    pub group_name_display: Option<NameDisplay>,
    pub group_abbreviation: Option<GroupName>,
    pub group_abbreviation_display: Option<NameDisplay>,
    pub group_symbol: Option<GroupSymbol>,
    pub group_barline: Option<GroupBarline>,
    /// Time signatures span the whole group
    pub group_time: bool,
    pub editorial: Editorial,
    pub attributes: PartGroupAttributes,
}

impl PartGroup {
    pub fn new(kind: StartStop, number: impl Into<String>) -> Self {
        Self {
            group_name: None,
            group_name_display: None,
            group_abbreviation: None,
            group_abbreviation_display: None,
            group_symbol: None,
            group_barline: None,
            group_time: false,
            editorial: Editorial::default(),
            attributes: PartGroupAttributes {
                kind,
                number: Some(number.into()),
            },
        }
    }

    /// Group number used to pair start and stop, `1` when absent
    pub fn number(&self) -> &str {
        self.attributes.number.as_deref().unwrap_or("1")
    }
}

impl FromXml for PartGroup {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            group_name: el.child("group-name", cx)?,
            group_name_display: el.child("group-name-display", cx)?,
            group_abbreviation: el.child("group-abbreviation", cx)?,
            group_abbreviation_display: el.child("group-abbreviation-display", cx)?,
            group_symbol: el.child("group-symbol", cx)?,
            group_barline: el.child("group-barline", cx)?,
            group_time: el.flag("group-time"),
            editorial: Editorial::read(&mut el, cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for PartGroup {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.opt_child("group-name", &self.group_name);
        element.opt_child("group-name-display", &self.group_name_display);
        element.opt_child("group-abbreviation", &self.group_abbreviation);
        element.opt_child("group-abbreviation-display", &self.group_abbreviation_display);
        element.opt_child("group-symbol", &self.group_symbol);
        element.opt_child("group-barline", &self.group_barline);
        element.flag("group-time", self.group_time);
        self.editorial.write(&mut element);
        element
    }
}

// ============================================================================
// SCORE PART
// ============================================================================

/// Instrument sound played by a part, possibly one of several
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreInstrument {
    pub id: String,
    pub instrument_name: String,
    pub instrument_abbreviation: Option<String>,
    pub data: InstrumentData,
}

impl ScoreInstrument {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            instrument_name: name.into(),
            instrument_abbreviation: None,
            data: InstrumentData::default(),
        }
    }
}

impl FromXml for ScoreInstrument {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            id: el.req_attr("id", cx)?,
            instrument_name: el.req_text_child("instrument-name", cx)?,
            instrument_abbreviation: el.text_child("instrument-abbreviation", cx)?,
            data: InstrumentData::read(&mut el, cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for ScoreInstrument {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.attr("id", self.id.as_str());
        element.text_child("instrument-name", &self.instrument_name);
        element.opt_text_child("instrument-abbreviation", &self.instrument_abbreviation);
        self.data.write(&mut element);
        element
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub player_name: String,
}

impl FromXml for Player {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            id: el.req_attr("id", cx)?,
            player_name: el.req_text_child("player-name", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Player {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.attr("id", self.id.as_str());
        element.text_child("player-name", &self.player_name);
        element
    }
}

attribute_group! { InstrumentLink { required { id: String => "id" } } }

empty_element!(InstrumentLink);

/// Link from a score part to the same part in another document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartLink {
    pub instrument_links: Vec<InstrumentLink>,
    pub group_links: Vec<String>,
    pub link: LinkAttributes,
}

impl FromXml for PartLink {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            link: el.group(cx)?,
            instrument_links: el.children("instrument-link", cx)?,
            group_links: el.text_children("group-link", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for PartLink {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.link);
        element.children("instrument-link", &self.instrument_links);
        element.text_children("group-link", &self.group_links);
        element
    }
}

attribute_group! {
    PartNameAttributes {
        justify: LeftCenterRight => "justify",
    }
    embeds {
        print_style: PrintStyle,
        print_object: PrintObject,
    }
}

pub type PartName = Valued<String, PartNameAttributes>;

/// One `midi-device` / `midi-instrument` pairing of a score part
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MidiAssignment {
    pub midi_device: Option<MidiDevice>,
    pub midi_instrument: Option<MidiInstrument>,
}

enum MidiItem {
    Device(MidiDevice),
    Instrument(MidiInstrument),
}

impl ChoiceItem for MidiItem {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        match name {
            "midi-device" => Some(FromXml::from_xml(node, cx).map(MidiItem::Device)),
            "midi-instrument" => Some(FromXml::from_xml(node, cx).map(MidiItem::Instrument)),
            _ => None,
        }
    }

    fn to_element(&self) -> XmlElement {
        match self {
            MidiItem::Device(device) => device.to_xml("midi-device"),
            MidiItem::Instrument(instrument) => instrument.to_xml("midi-instrument"),
        }
    }
}

fn pair_midi(items: Vec<MidiItem>) -> Vec<MidiAssignment> {
    let mut assignments: Vec<MidiAssignment> = Vec::new();
    for item in items {
        match item {
            MidiItem::Device(device) => assignments.push(MidiAssignment {
                midi_device: Some(device),
                midi_instrument: None,
            }),
            MidiItem::Instrument(instrument) => match assignments.last_mut() {
                Some(last) if last.midi_instrument.is_none() => last.midi_instrument = Some(instrument),
                _ => assignments.push(MidiAssignment {
                    midi_device: None,
                    midi_instrument: Some(instrument),
                }),
            },
        }
    }
    assignments
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePart {
    pub id: String,
    pub identification: Option<Identification>,
    pub part_links: Vec<PartLink>,
    pub part_name: PartName,
    pub part_name_display: Option<NameDisplay>,
    pub part_abbreviation: Option<PartName>,
    pub part_abbreviation_display: Option<NameDisplay>,
    pub groups: Vec<String>,
    pub score_instruments: Vec<ScoreInstrument>,
    pub players: Vec<Player>,
    pub midi: Vec<MidiAssignment>,
}

impl ScorePart {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            identification: None,
            part_links: Vec::new(),
            part_name: Valued::new(name.into()),
            part_name_display: None,
            part_abbreviation: None,
            part_abbreviation_display: None,
            groups: Vec::new(),
            score_instruments: Vec::new(),
            players: Vec::new(),
            midi: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.part_name.value
    }
}

impl FromXml for ScorePart {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            id: el.req_attr("id", cx)?,
            identification: el.child("identification", cx)?,
            part_links: el.children("part-link", cx)?,
            part_name: el.req_child("part-name", cx)?,
            part_name_display: el.child("part-name-display", cx)?,
            part_abbreviation: el.child("part-abbreviation", cx)?,
            part_abbreviation_display: el.child("part-abbreviation-display", cx)?,
            groups: el.text_children("group", cx)?,
            score_instruments: el.children("score-instrument", cx)?,
            players: el.children("player", cx)?,
            midi: pair_midi(el.choices(cx)?),
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for ScorePart {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.attr("id", self.id.as_str());
        element.opt_child("identification", &self.identification);
        element.children("part-link", &self.part_links);
        element.child("part-name", &self.part_name);
        element.opt_child("part-name-display", &self.part_name_display);
        element.opt_child("part-abbreviation", &self.part_abbreviation);
        element.opt_child("part-abbreviation-display", &self.part_abbreviation_display);
        element.text_children("group", &self.groups);
        element.children("score-instrument", &self.score_instruments);
        element.children("player", &self.players);
        for assignment in &self.midi {
            element.opt_child("midi-device", &assignment.midi_device);
            element.opt_child("midi-instrument", &assignment.midi_instrument);
        }
        element
    }
}

// ============================================================================
// PART LIST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartListItem {
    PartGroup(PartGroup),
    ScorePart(ScorePart),
}

impl ChoiceItem for PartListItem {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        match name {
            "part-group" => Some(FromXml::from_xml(node, cx).map(PartListItem::PartGroup)),
            "score-part" => Some(FromXml::from_xml(node, cx).map(PartListItem::ScorePart)),
            _ => None,
        }
    }

    fn to_element(&self) -> XmlElement {
        match self {
            PartListItem::PartGroup(group) => group.to_xml("part-group"),
            PartListItem::ScorePart(part) => part.to_xml("score-part"),
        }
    }
}

/// Parts and part groups in score order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartList {
    pub items: Vec<PartListItem>,
}

impl PartList {
    pub fn score_parts(&self) -> impl Iterator<Item = &ScorePart> {
        self.items.iter().filter_map(|item| match item {
            PartListItem::ScorePart(part) => Some(part),
            PartListItem::PartGroup(_) => None,
        })
    }

    pub fn score_part(&self, id: &str) -> Option<&ScorePart> {
        self.score_parts().find(|part| part.id == id)
    }

    pub fn part_groups(&self) -> impl Iterator<Item = &PartGroup> {
        self.items.iter().filter_map(|item| match item {
            PartListItem::PartGroup(group) => Some(group),
            PartListItem::ScorePart(_) => None,
        })
    }

    /// Group numbers stopped without being open, or never stopped
    pub fn unbalanced_groups(&self) -> Vec<String> {
        let mut open: Vec<&str> = Vec::new();
        let mut unbalanced = Vec::new();

        for group in self.part_groups() {
            let number = group.number();
            match group.attributes.kind {
                StartStop::Start => {
                    if open.contains(&number) {
                        unbalanced.push(number.to_string());
                    } else {
                        open.push(number);
                    }
                }
                StartStop::Stop => match open.iter().position(|n| *n == number) {
                    Some(index) => {
                        open.remove(index);
                    }
                    None => unbalanced.push(number.to_string()),
                },
                StartStop::Unrecognized(_) => {}
            }
        }

        unbalanced.extend(open.into_iter().map(str::to_string));
        unbalanced
    }
}

impl FromXml for PartList {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let items = el.choices(cx)?;
        el.finish()?;
        let list = Self { items };
        if list.score_parts().next().is_none() {
            return Err(DecodeError::missing("score-part"));
        }
        Ok(list)
    }
}

impl ToXml for PartList {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        for item in &self.items {
            element.push(item.to_element());
        }
        element
    }
}

// ============================================================================
// SCORE HEADER
// ============================================================================

/// Everything in a score document ahead of the parts or measures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreHeader {
    pub work: Option<Work>,
    pub movement_number: Option<String>,
    pub movement_title: Option<String>,
    pub identification: Option<Identification>,
    pub defaults: Option<Defaults>,
    pub credits: Vec<Credit>,
    pub part_list: PartList,
}

impl ScoreHeader {
    pub fn new(part_list: PartList) -> Self {
        Self {
            part_list,
            ..Self::default()
        }
    }

    /// Work title, falling back to the movement title
    pub fn title(&self) -> Option<&str> {
        self.work
            .as_ref()
            .and_then(|work| work.work_title.as_deref())
            .or(self.movement_title.as_deref())
    }

    pub(crate) fn read(el: &mut ElementReader<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        Ok(Self {
            work: el.child("work", cx)?,
            movement_number: el.text_child("movement-number", cx)?,
            movement_title: el.text_child("movement-title", cx)?,
            identification: el.child("identification", cx)?,
            defaults: el.child("defaults", cx)?,
            credits: el.children("credit", cx)?,
            part_list: el.req_child("part-list", cx)?,
        })
    }

    pub(crate) fn write(&self, element: &mut XmlElement) {
        element.opt_child("work", &self.work);
        element.opt_text_child("movement-number", &self.movement_number);
        element.opt_text_child("movement-title", &self.movement_title);
        element.opt_child("identification", &self.identification);
        element.opt_child("defaults", &self.defaults);
        element.children("credit", &self.credits);
        element.child("part-list", &self.part_list);
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
    fn test_part_list_keeps_group_order() {
        let list: PartList = parse(
            r#"<part-list><part-group type="start" number="1"><group-symbol>bracket</group-symbol></part-group><score-part id="P1"><part-name>Violin I</part-name></score-part><score-part id="P2"><part-name>Violin II</part-name></score-part><part-group type="stop" number="1"/></part-list>"#,
        )
        .expect("part-list decode");

        let tags: Vec<String> = list.items.iter().map(|i| i.to_element().name).collect();
        assert_eq!(tags, vec!["part-group", "score-part", "score-part", "part-group"]);
        assert_eq!(list.score_part("P2").map(ScorePart::name), Some("Violin II"));
        assert!(list.unbalanced_groups().is_empty());
    }

    #[test]
    fn test_unbalanced_groups_are_reported() {
        let mut list = PartList::default();
        list.items.push(PartListItem::PartGroup(PartGroup::new(StartStop::Start, "1")));
        list.items.push(PartListItem::ScorePart(ScorePart::new("P1", "Flute")));
        list.items.push(PartListItem::PartGroup(PartGroup::new(StartStop::Stop, "2")));
        assert_eq!(list.unbalanced_groups(), vec!["2".to_string(), "1".to_string()]);
    }

    #[test]
    fn test_part_list_needs_a_score_part() {
        let err = parse::<PartList>(r#"<part-list><part-group type="start"/></part-list>"#)
            .expect_err("score-part is required");
        assert_eq!(err.to_string(), "missing required field score-part at part-list");
    }

    #[test]
    fn test_midi_pairs_follow_document_order() {
        let part: ScorePart = parse(
            r#"<score-part id="P1"><part-name>Drums</part-name><score-instrument id="P1-I36"><instrument-name>Kick</instrument-name></score-instrument><score-instrument id="P1-I39"><instrument-name>Snare</instrument-name></score-instrument><midi-device port="1">Bank 1</midi-device><midi-instrument id="P1-I36"><midi-channel>10</midi-channel></midi-instrument><midi-instrument id="P1-I39"><midi-channel>10</midi-channel></midi-instrument></score-part>"#,
        )
        .expect("score-part decode");

        assert_eq!(part.score_instruments.len(), 2);
        assert_eq!(part.midi.len(), 2);
        assert!(part.midi[0].midi_device.is_some());
        assert!(part.midi[1].midi_device.is_none());

        let tags: Vec<String> = part.to_xml("score-part").elements().map(|e| e.name.clone()).collect();
        assert_eq!(
            &tags[3..],
            &["midi-device", "midi-instrument", "midi-instrument"]
        );
    }

    #[test]
    fn test_identification_and_encoding() {
        let identification: Identification = parse(
            r#"<identification><creator type="composer">J. S. Bach</creator><rights>Public domain</rights><encoding><software>Finale</software><encoding-date>2024-01-31</encoding-date><supports element="accidental" type="yes"/></encoding><miscellaneous><miscellaneous-field name="difficulty">3</miscellaneous-field></miscellaneous></identification>"#,
        )
        .expect("identification decode");

        assert_eq!(identification.creator("composer"), Some("J. S. Bach"));
        let encoding = identification.encoding.as_ref().expect("encoding");
        assert_eq!(encoding.software().collect::<Vec<_>>(), vec!["Finale"]);
        assert!(matches!(encoding.items[1], EncodingItem::EncodingDate(_)));
        assert_eq!(identification.miscellaneous[0].attributes.name, "difficulty");

        let element = identification.to_xml("identification");
        assert!(element.find("miscellaneous").is_some());
    }

    #[test]
    fn test_credit_words_with_inner_link() {
        let credit: Credit = parse(
            r#"<credit page="1"><credit-type>title</credit-type><credit-words justify="center">Sonata</credit-words><link xmlns:xlink="http://www.w3.org/1999/xlink" xlink:href="https://example.org"/><credit-words> in C</credit-words></credit>"#,
        )
        .expect("credit decode");

        assert_eq!(credit.credit_types, vec!["title".to_string()]);
        assert!(credit.links.is_empty());
        assert_eq!(credit.text(), "Sonata in C");
        assert!(matches!(&credit.content, CreditContent::Text(items) if items.len() == 3));
    }

    #[test]
    fn test_credit_without_content_is_rejected() {
        let err = parse::<Credit>("<credit><credit-type>title</credit-type></credit>")
            .expect_err("credit content is required");
        assert_eq!(err.to_string(), "missing required field credit-words at credit");
    }
}
