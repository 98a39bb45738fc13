//! Directions: musical instructions not attached to a single note
//!
//! A `direction` holds one or more `direction-type` children, each an
//! ordered list of [`DirectionTypeItem`]s. Item decoders are looked up in
//! a tag-name table built on first use.

use super::barline::{Coda, Segno};
use super::common::*;
use super::groups::*;
use super::note::TimeModification;
use super::primitives::*;
use super::sound::{Listening, Offset, Sound};
use crate::codec::{AttributeGroup, ChoiceItem, DecodeContext, DecodeError, DecodeFn, DecodeResult, FromXml, ToXml};
use crate::xml::{ElementReader, XmlElement};
use once_cell::sync::Lazy;
use roxmltree::Node;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// SPANNERS
// ============================================================================

attribute_group! {
    /// Crescendo or diminuendo hairpin; start and stop pair up by `number`
    Wedge {
        required { kind: WedgeType => "type" }
        number: NumberLevel => "number",
        spread: Tenths => "spread",
        niente: YesNo => "niente",
        line_type: LineType => "line-type",
        color: Color => "color",
    }
    embeds {
        dashed_formatting: DashedFormatting,
        position: Position,
        id: OptionalUniqueId,
    }
}

impl Wedge {
    pub fn new(kind: WedgeType) -> Self {
        Self {
            kind,
            number: None,
            spread: None,
            niente: None,
            line_type: None,
            color: None,
            dashed_formatting: DashedFormatting::default(),
            position: Position::default(),
            id: OptionalUniqueId::default(),
        }
    }

    /// Number used to pair start and stop, 1 when absent
    pub fn pairing_number(&self) -> NumberLevel {
        self.number.unwrap_or(NumberLevel::DEFAULT)
    }
}

attribute_group! {
    Dashes {
        required { kind: StartStopContinue => "type" }
        number: NumberLevel => "number",
        color: Color => "color",
    }
    embeds {
        dashed_formatting: DashedFormatting,
        position: Position,
        id: OptionalUniqueId,
    }
}

attribute_group! {
    Bracket {
        required {
            kind: StartStopContinue => "type",
            line_end: LineEnd => "line-end",
        }
        number: NumberLevel => "number",
        end_length: Tenths => "end-length",
        line_type: LineType => "line-type",
        color: Color => "color",
    }
    embeds {
        dashed_formatting: DashedFormatting,
        position: Position,
        id: OptionalUniqueId,
    }
}

attribute_group! {
    Pedal {
        required { kind: PedalType => "type" }
        number: NumberLevel => "number",
        line: YesNo => "line",
        sign: YesNo => "sign",
        abbreviated: YesNo => "abbreviated",
    }
    embeds {
        print_style_align: PrintStyleAlign,
        id: OptionalUniqueId,
    }
}

attribute_group! {
    OctaveShift {
        required { kind: UpDownStopContinue => "type" }
        number: NumberLevel => "number",
        /// 8 when absent
        size: u32 => "size",
    }
    embeds {
        dashed_formatting: DashedFormatting,
        print_style: PrintStyle,
        id: OptionalUniqueId,
    }
}

attribute_group! {
    StringMute {
        required { kind: OnOff => "type" }
    }
    embeds {
        print_style_align: PrintStyleAlign,
        id: OptionalUniqueId,
    }
}

attribute_group! {
    StaffDivide {
        required { kind: StaffDivideSymbol => "type" }
    }
    embeds {
        print_style_align: PrintStyleAlign,
        id: OptionalUniqueId,
    }
}

empty_element!(Wedge, Dashes, Bracket, Pedal, OctaveShift, StringMute, StaffDivide);

// ============================================================================
// METRONOME
// ============================================================================

attribute_group! { MetronomeBeam { number: BeamLevel => "number" } }

pub type MetronomeBeamValue = Valued<BeamValue, MetronomeBeam>;

attribute_group! {
    MetronomeTupletAttributes {
        required { kind: StartStop => "type" }
        bracket: YesNo => "bracket",
        show_number: ShowTuplet => "show-number",
    }
}

/// Tuplet ratio inside a metric modulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetronomeTuplet {
    pub ratio: TimeModification,
    pub attributes: MetronomeTupletAttributes,
}

impl FromXml for MetronomeTuplet {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let attributes = ElementReader::new(node).group(cx)?;
        let ratio = TimeModification::from_xml(node, cx)?;
        Ok(Self { ratio, attributes })
    }
}

impl ToXml for MetronomeTuplet {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = self.ratio.to_xml(tag);
        self.attributes.write(&mut element);
        element
    }
}

attribute_group! { MetronomeTied { required { kind: StartStop => "type" } } }

empty_element!(MetronomeTied);

/// Note pictured in a metric modulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetronomeNote {
    pub metronome_type: NoteTypeValue,
    pub metronome_dots: Vec<Empty>,
    pub metronome_beams: Vec<MetronomeBeamValue>,
    pub metronome_tied: Option<MetronomeTied>,
    pub metronome_tuplet: Option<MetronomeTuplet>,
}

impl FromXml for MetronomeNote {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            metronome_type: el.req_text_child("metronome-type", cx)?,
            metronome_dots: el.children("metronome-dot", cx)?,
            metronome_beams: el.children("metronome-beam", cx)?,
            metronome_tied: el.child("metronome-tied", cx)?,
            metronome_tuplet: el.child("metronome-tuplet", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for MetronomeNote {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.text_child("metronome-type", &self.metronome_type);
        element.children("metronome-dot", &self.metronome_dots);
        element.children("metronome-beam", &self.metronome_beams);
        element.opt_child("metronome-tied", &self.metronome_tied);
        element.opt_child("metronome-tuplet", &self.metronome_tuplet);
        element
    }
}

/// Tied beat unit such as the second half of a dotted-quarter-tied-eighth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatUnitTied {
    pub beat_unit: NoteTypeValue,
    pub beat_unit_dots: Vec<Empty>,
}

impl FromXml for BeatUnitTied {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            beat_unit: el.req_text_child("beat-unit", cx)?,
            beat_unit_dots: el.children("beat-unit-dot", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for BeatUnitTied {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.text_child("beat-unit", &self.beat_unit);
        element.children("beat-unit-dot", &self.beat_unit_dots);
        element
    }
}

pub type PerMinute = Valued<String, EmptyFont>;

/// Metronome content in document order
///
/// Dots and tied units belong to the nearest preceding `BeatUnit`, so the
/// content is kept as a flat list rather than grouped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetronomePart {
    BeatUnit(NoteTypeValue),
    BeatUnitDot,
    BeatUnitTied(BeatUnitTied),
    PerMinute(PerMinute),
    MetronomeArrows,
    MetronomeNote(MetronomeNote),
    MetronomeRelation(String),
}

impl ChoiceItem for MetronomePart {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "beat-unit" => <Valued<NoteTypeValue>>::from_xml(node, cx).map(|v| MetronomePart::BeatUnit(v.value)),
            "beat-unit-dot" => Empty::from_xml(node, cx).map(|_| MetronomePart::BeatUnitDot),
            "beat-unit-tied" => FromXml::from_xml(node, cx).map(MetronomePart::BeatUnitTied),
            "per-minute" => FromXml::from_xml(node, cx).map(MetronomePart::PerMinute),
            "metronome-arrows" => Empty::from_xml(node, cx).map(|_| MetronomePart::MetronomeArrows),
            "metronome-note" => FromXml::from_xml(node, cx).map(MetronomePart::MetronomeNote),
            "metronome-relation" => {
                <Valued<String>>::from_xml(node, cx).map(|v| MetronomePart::MetronomeRelation(v.value))
            }
            _ => return None,
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            MetronomePart::BeatUnit(unit) => XmlElement::with_text("beat-unit", unit.as_str()),
            MetronomePart::BeatUnitDot => XmlElement::new("beat-unit-dot"),
            MetronomePart::BeatUnitTied(tied) => tied.to_xml("beat-unit-tied"),
            MetronomePart::PerMinute(per_minute) => per_minute.to_xml("per-minute"),
            MetronomePart::MetronomeArrows => XmlElement::new("metronome-arrows"),
            MetronomePart::MetronomeNote(note) => note.to_xml("metronome-note"),
            MetronomePart::MetronomeRelation(relation) => XmlElement::with_text("metronome-relation", relation.as_str()),
        }
    }
}

attribute_group! {
    MetronomeAttributes {
        parentheses: YesNo => "parentheses",
        justify: LeftCenterRight => "justify",
    }
    embeds {
        print_style_align: PrintStyleAlign,
        id: OptionalUniqueId,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metronome {
    pub parts: Vec<MetronomePart>,
    pub attributes: MetronomeAttributes,
}

impl Metronome {
    /// `beat-unit = per-minute` mark, e.g. quarter = 120
    pub fn per_minute(unit: NoteTypeValue, dots: usize, per_minute: impl Into<String>) -> Self {
        let mut parts = vec![MetronomePart::BeatUnit(unit)];
        parts.extend(std::iter::repeat(MetronomePart::BeatUnitDot).take(dots));
        parts.push(MetronomePart::PerMinute(Valued::new(per_minute.into())));
        Self {
            parts,
            attributes: MetronomeAttributes::default(),
        }
    }

    pub fn beat_unit(&self) -> Option<&NoteTypeValue> {
        self.parts.iter().find_map(|part| match part {
            MetronomePart::BeatUnit(unit) => Some(unit),
            _ => None,
        })
    }

    pub fn per_minute_text(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            MetronomePart::PerMinute(per_minute) => Some(per_minute.value.as_str()),
            _ => None,
        })
    }
}

impl FromXml for Metronome {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let parts = el.choices(cx)?;
        el.finish()?;
        Ok(Self { parts, attributes })
    }
}

impl ToXml for Metronome {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        for part in &self.parts {
            element.push(part.to_element());
        }
        element
    }
}

// ============================================================================
// INSTRUMENT-SPECIFIC DIRECTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedalTuning {
    pub pedal_step: Step,
    pub pedal_alter: Semitones,
}

impl FromXml for PedalTuning {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            pedal_step: el.req_text_child("pedal-step", cx)?,
            pedal_alter: el.req_text_child("pedal-alter", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for PedalTuning {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.text_child("pedal-step", &self.pedal_step);
        element.text_child("pedal-alter", &self.pedal_alter);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarpPedals {
    pub pedal_tunings: Vec<PedalTuning>,
    pub attributes: EmptyPrintStyleAlignId,
}

impl FromXml for HarpPedals {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            pedal_tunings: el.children("pedal-tuning", cx)?,
        };
        if value.pedal_tunings.is_empty() {
            return Err(DecodeError::missing("pedal-tuning"));
        }
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for HarpPedals {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.children("pedal-tuning", &self.pedal_tunings);
        element
    }
}

/// Tuning of one string in a scordatura
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accord {
    pub string: StringNumber,
    pub tuning_step: Step,
    pub tuning_alter: Option<Semitones>,
    pub tuning_octave: Octave,
}

impl FromXml for Accord {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            string: el.req_attr("string", cx)?,
            tuning_step: el.req_text_child("tuning-step", cx)?,
            tuning_alter: el.text_child("tuning-alter", cx)?,
            tuning_octave: el.req_text_child("tuning-octave", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Accord {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.attr("string", self.string.to_string());
        element.text_child("tuning-step", &self.tuning_step);
        element.opt_text_child("tuning-alter", &self.tuning_alter);
        element.text_child("tuning-octave", &self.tuning_octave);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scordatura {
    pub accords: Vec<Accord>,
    pub id: OptionalUniqueId,
}

impl FromXml for Scordatura {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            id: el.group(cx)?,
            accords: el.children("accord", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Scordatura {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.id);
        element.children("accord", &self.accords);
        element
    }
}

/// Image placed in the score as a direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub image: ImageAttributes,
    pub id: OptionalUniqueId,
}

impl AttributeGroup for Image {
    fn read(el: &ElementReader<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        Ok(Self {
            image: el.group(cx)?,
            id: el.group(cx)?,
        })
    }

    fn write(&self, element: &mut XmlElement) {
        self.image.write(element);
        self.id.write(element);
    }

    fn is_empty(&self) -> bool {
        false
    }
}

empty_element!(Image);

attribute_group! {
    PrincipalVoiceAttributes {
        required {
            kind: StartStop => "type",
            symbol: PrincipalVoiceSymbol => "symbol",
        }
    }
    embeds {
        print_style_align: PrintStyleAlign,
        id: OptionalUniqueId,
    }
}

pub type PrincipalVoice = Valued<String, PrincipalVoiceAttributes>;

attribute_group! {
    AccordionRegistrationAttributes {}
    embeds {
        print_style_align: PrintStyleAlign,
        id: OptionalUniqueId,
    }
}

/// Dots in the high, middle and low reed sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccordionRegistration {
    pub accordion_high: bool,
    pub accordion_middle: Option<AccordionMiddle>,
    pub accordion_low: bool,
    pub attributes: AccordionRegistrationAttributes,
}

impl FromXml for AccordionRegistration {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            accordion_high: el.flag("accordion-high"),
            accordion_middle: el.text_child("accordion-middle", cx)?,
            accordion_low: el.flag("accordion-low"),
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for AccordionRegistration {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.flag("accordion-high", self.accordion_high);
        element.opt_text_child("accordion-middle", &self.accordion_middle);
        element.flag("accordion-low", self.accordion_low);
        element
    }
}

// ============================================================================
// PERCUSSION
// ============================================================================

attribute_group! { BeaterAttributes { tip: TipDirection => "tip" } }

pub type Beater = Valued<BeaterValue, BeaterAttributes>;

attribute_group! {
    StickAttributes {
        tip: TipDirection => "tip",
        parentheses: YesNo => "parentheses",
        dashed_circle: YesNo => "dashed-circle",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stick {
    pub stick_type: StickType,
    pub stick_material: StickMaterial,
    pub attributes: StickAttributes,
}

impl FromXml for Stick {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            stick_type: el.req_text_child("stick-type", cx)?,
            stick_material: el.req_text_child("stick-material", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Stick {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.text_child("stick-type", &self.stick_type);
        element.text_child("stick-material", &self.stick_material);
        element
    }
}

/// Percussion pictogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PercussionKind {
    Glass(Valued<GlassValue, Smufl>),
    Metal(Valued<Metal, Smufl>),
    Wood(Valued<Wood, Smufl>),
    Pitched(Valued<PitchedValue, Smufl>),
    Membrane(Valued<Membrane, Smufl>),
    Effect(Valued<Effect, Smufl>),
    Timpani(Smufl),
    Beater(Beater),
    Stick(Stick),
    StickLocation(StickLocation),
    OtherPercussion(OtherText),
}

impl ChoiceItem for PercussionKind {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "glass" => FromXml::from_xml(node, cx).map(PercussionKind::Glass),
            "metal" => FromXml::from_xml(node, cx).map(PercussionKind::Metal),
            "wood" => FromXml::from_xml(node, cx).map(PercussionKind::Wood),
            "pitched" => FromXml::from_xml(node, cx).map(PercussionKind::Pitched),
            "membrane" => FromXml::from_xml(node, cx).map(PercussionKind::Membrane),
            "effect" => FromXml::from_xml(node, cx).map(PercussionKind::Effect),
            "timpani" => FromXml::from_xml(node, cx).map(PercussionKind::Timpani),
            "beater" => FromXml::from_xml(node, cx).map(PercussionKind::Beater),
            "stick" => FromXml::from_xml(node, cx).map(PercussionKind::Stick),
            "stick-location" => {
                <Valued<StickLocation>>::from_xml(node, cx).map(|v| PercussionKind::StickLocation(v.value))
            }
            "other-percussion" => FromXml::from_xml(node, cx).map(PercussionKind::OtherPercussion),
            _ => return None,
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            PercussionKind::Glass(v) => v.to_xml("glass"),
            PercussionKind::Metal(v) => v.to_xml("metal"),
            PercussionKind::Wood(v) => v.to_xml("wood"),
            PercussionKind::Pitched(v) => v.to_xml("pitched"),
            PercussionKind::Membrane(v) => v.to_xml("membrane"),
            PercussionKind::Effect(v) => v.to_xml("effect"),
            PercussionKind::Timpani(v) => v.to_xml("timpani"),
            PercussionKind::Beater(v) => v.to_xml("beater"),
            PercussionKind::Stick(v) => v.to_xml("stick"),
            PercussionKind::StickLocation(v) => XmlElement::with_text("stick-location", v.as_str()),
            PercussionKind::OtherPercussion(v) => v.to_xml("other-percussion"),
        }
    }
}

empty_element!(Smufl);

attribute_group! {
    PercussionAttributes {
        enclosure: EnclosureShape => "enclosure",
    }
    embeds {
        print_style_align: PrintStyleAlign,
        id: OptionalUniqueId,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Percussion {
    pub kind: PercussionKind,
    pub attributes: PercussionAttributes,
}

impl FromXml for Percussion {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let mut kinds: Vec<PercussionKind> = el.choices(cx)?;
        if kinds.len() > 1 {
            let extra = kinds[1].to_element();
            return Err(DecodeError::unexpected(extra.name));
        }
        let kind = kinds.pop().ok_or_else(|| DecodeError::missing("glass"))?;
        Ok(Self { kind, attributes })
    }
}

impl ToXml for Percussion {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.push(self.kind.to_element());
        element
    }
}

attribute_group! {
    OtherDirectionAttributes {}
    embeds {
        print_object: PrintObject,
        print_style_align: PrintStyleAlign,
        smufl: Smufl,
        id: OptionalUniqueId,
    }
}

pub type OtherDirection = Valued<String, OtherDirectionAttributes>;

// ============================================================================
// DIRECTION TYPE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DirectionTypeItem {
    Rehearsal(FormattedTextId),
    Segno(Segno),
    Coda(Coda),
    Words(FormattedTextId),
    Symbol(FormattedSymbolId),
    Wedge(Wedge),
    Dynamics(Dynamics),
    Dashes(Dashes),
    Bracket(Bracket),
    Pedal(Pedal),
    Metronome(Metronome),
    OctaveShift(OctaveShift),
    HarpPedals(HarpPedals),
    Damp(EmptyPrintStyleAlignId),
    DampAll(EmptyPrintStyleAlignId),
    Eyeglasses(EmptyPrintStyleAlignId),
    StringMute(StringMute),
    Scordatura(Scordatura),
    Image(Image),
    PrincipalVoice(PrincipalVoice),
    Percussion(Percussion),
    AccordionRegistration(AccordionRegistration),
    StaffDivide(StaffDivide),
    OtherDirection(OtherDirection),
    Extension(RawElement),
}

static DIRECTION_TYPE_DECODERS: Lazy<HashMap<&'static str, DecodeFn<DirectionTypeItem>>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, DecodeFn<DirectionTypeItem>> = HashMap::new();
    table.insert("rehearsal", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Rehearsal));
    table.insert("segno", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Segno));
    table.insert("coda", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Coda));
    table.insert("words", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Words));
    table.insert("symbol", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Symbol));
    table.insert("wedge", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Wedge));
    table.insert("dynamics", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Dynamics));
    table.insert("dashes", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Dashes));
    table.insert("bracket", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Bracket));
    table.insert("pedal", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Pedal));
    table.insert("metronome", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Metronome));
    table.insert("octave-shift", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::OctaveShift));
    table.insert("harp-pedals", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::HarpPedals));
    table.insert("damp", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Damp));
    table.insert("damp-all", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::DampAll));
    table.insert("eyeglasses", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Eyeglasses));
    table.insert("string-mute", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::StringMute));
    table.insert("scordatura", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Scordatura));
    table.insert("image", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Image));
    table.insert("principal-voice", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::PrincipalVoice));
    table.insert("percussion", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::Percussion));
    table.insert("accordion-registration", |n, cx| {
        FromXml::from_xml(n, cx).map(DirectionTypeItem::AccordionRegistration)
    });
    table.insert("staff-divide", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::StaffDivide));
    table.insert("other-direction", |n, cx| FromXml::from_xml(n, cx).map(DirectionTypeItem::OtherDirection));
    table
});

impl ChoiceItem for DirectionTypeItem {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        match DIRECTION_TYPE_DECODERS.get(name) {
            Some(decode) => Some(decode(node, cx)),
            None => Some(Ok(DirectionTypeItem::Extension(capture_extension(node, cx)))),
        }
    }

    fn to_element(&self) -> XmlElement {
        match self {
            DirectionTypeItem::Rehearsal(v) => v.to_xml("rehearsal"),
            DirectionTypeItem::Segno(v) => v.to_xml("segno"),
            DirectionTypeItem::Coda(v) => v.to_xml("coda"),
            DirectionTypeItem::Words(v) => v.to_xml("words"),
            DirectionTypeItem::Symbol(v) => v.to_xml("symbol"),
            DirectionTypeItem::Wedge(v) => v.to_xml("wedge"),
            DirectionTypeItem::Dynamics(v) => v.to_xml("dynamics"),
            DirectionTypeItem::Dashes(v) => v.to_xml("dashes"),
            DirectionTypeItem::Bracket(v) => v.to_xml("bracket"),
            DirectionTypeItem::Pedal(v) => v.to_xml("pedal"),
            DirectionTypeItem::Metronome(v) => v.to_xml("metronome"),
            DirectionTypeItem::OctaveShift(v) => v.to_xml("octave-shift"),
            DirectionTypeItem::HarpPedals(v) => v.to_xml("harp-pedals"),
            DirectionTypeItem::Damp(v) => v.to_xml("damp"),
            DirectionTypeItem::DampAll(v) => v.to_xml("damp-all"),
            DirectionTypeItem::Eyeglasses(v) => v.to_xml("eyeglasses"),
            DirectionTypeItem::StringMute(v) => v.to_xml("string-mute"),
            DirectionTypeItem::Scordatura(v) => v.to_xml("scordatura"),
            DirectionTypeItem::Image(v) => v.to_xml("image"),
            DirectionTypeItem::PrincipalVoice(v) => v.to_xml("principal-voice"),
            DirectionTypeItem::Percussion(v) => v.to_xml("percussion"),
            DirectionTypeItem::AccordionRegistration(v) => v.to_xml("accordion-registration"),
            DirectionTypeItem::StaffDivide(v) => v.to_xml("staff-divide"),
            DirectionTypeItem::OtherDirection(v) => v.to_xml("other-direction"),
            DirectionTypeItem::Extension(raw) => raw.clone(),
        }
    }
}

/// One `direction-type` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionType {
    pub items: Vec<DirectionTypeItem>,
    pub id: OptionalUniqueId,
}

impl DirectionType {
    pub fn single(item: DirectionTypeItem) -> Self {
        Self {
            items: vec![item],
            id: OptionalUniqueId::default(),
        }
    }
}

impl FromXml for DirectionType {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let id = el.group(cx)?;
        let items = el.choices(cx)?;
        if items.is_empty() {
            return Err(DecodeError::missing("words"));
        }
        el.finish()?;
        Ok(Self { items, id })
    }
}

impl ToXml for DirectionType {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.id);
        for item in &self.items {
            element.push(item.to_element());
        }
        element
    }
}

// ============================================================================
// DIRECTION
// ============================================================================

attribute_group! {
    DirectionAttributes {
        directive: YesNo => "directive",
        system: SystemRelationNumber => "system",
    }
    embeds {
        placement: Placement,
        id: OptionalUniqueId,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    pub direction_types: Vec<DirectionType>,
    pub offset: Option<Offset>,
    pub editorial: Editorial,
    pub voice: Option<String>,
    pub staff: Option<StaffNumber>,
    pub sound: Option<Sound>,
    pub listening: Option<Listening>,
    pub attributes: DirectionAttributes,
}

impl Direction {
    pub fn new(item: DirectionTypeItem) -> Self {
        Self {
            direction_types: vec![DirectionType::single(item)],
            ..Self::default()
        }
    }

    pub fn words(text: impl Into<String>) -> Self {
        Self::new(DirectionTypeItem::Words(Valued::new(text.into())))
    }

    /// Every item of every `direction-type`, in document order
    pub fn items(&self) -> impl Iterator<Item = &DirectionTypeItem> {
        self.direction_types.iter().flat_map(|dt| dt.items.iter())
    }
}

impl FromXml for Direction {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let direction_types: Vec<DirectionType> = el.children("direction-type", cx)?;
        if direction_types.is_empty() {
            return Err(DecodeError::missing("direction-type"));
        }
        let value = Self {
            direction_types,
            offset: el.child("offset", cx)?,
            editorial: Editorial::read(&mut el, cx)?,
            voice: el.text_child("voice", cx)?,
            staff: el.text_child("staff", cx)?,
            sound: el.child("sound", cx)?,
            listening: el.child("listening", cx)?,
            attributes,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Direction {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.children("direction-type", &self.direction_types);
        element.opt_child("offset", &self.offset);
        self.editorial.write(&mut element);
        element.opt_text_child("voice", &self.voice);
        element.opt_text_child("staff", &self.staff);
        element.opt_child("sound", &self.sound);
        element.opt_child("listening", &self.listening);
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_child, DecodeErrorKind};

    fn parse<T: FromXml>(xml: &str) -> DecodeResult<T> {
        let doc = roxmltree::Document::parse(xml).expect("test XML should parse");
        let mut cx = DecodeContext::default();
        decode_child(doc.root_element(), None, &mut cx)
    }

    #[test]
    fn test_direction_type_items_keep_order() {
        let direction: Direction = parse(
            r#"<direction placement="above"><direction-type><words>cresc.</words><dashes type="start"/></direction-type><direction-type><dynamics><p/></dynamics></direction-type><staff>1</staff></direction>"#,
        )
        .expect("direction decode");

        assert_eq!(direction.direction_types.len(), 2);
        let items: Vec<&DirectionTypeItem> = direction.items().collect();
        assert!(matches!(items[0], DirectionTypeItem::Words(words) if words.value == "cresc."));
        assert!(matches!(items[1], DirectionTypeItem::Dashes(_)));
        assert!(matches!(items[2], DirectionTypeItem::Dynamics(_)));
        assert_eq!(direction.staff, Some(StaffNumber(1)));

        let element = direction.to_xml("direction");
        let tags: Vec<&str> = element.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(tags, vec!["direction-type", "direction-type", "staff"]);
    }

    #[test]
    fn test_wedge_pairing_number_defaults_to_one() {
        let direction: Direction =
            parse(r#"<direction><direction-type><wedge type="crescendo" spread="0"/></direction-type></direction>"#)
                .expect("wedge decode");
        match direction.items().next() {
            Some(DirectionTypeItem::Wedge(wedge)) => {
                assert_eq!(wedge.kind, WedgeType::Crescendo);
                assert_eq!(wedge.number, None);
                assert_eq!(wedge.pairing_number(), NumberLevel(1));
            }
            other => panic!("expected wedge, got {:?}", other),
        };
    }

    #[test]
    fn test_metronome_parts() {
        let metronome: Metronome = parse(
            r#"<metronome parentheses="no"><beat-unit>quarter</beat-unit><beat-unit-dot/><per-minute>72</per-minute></metronome>"#,
        )
        .expect("metronome decode");
        assert_eq!(metronome.parts.len(), 3);
        assert_eq!(metronome.beat_unit(), Some(&NoteTypeValue::Quarter));
        assert_eq!(metronome.per_minute_text(), Some("72"));
        assert_eq!(metronome, {
            let mut built = Metronome::per_minute(NoteTypeValue::Quarter, 1, "72");
            built.attributes.parentheses = Some(YesNo::No);
            built
        });
    }

    #[test]
    fn test_unknown_direction_type_child_is_captured() {
        let doc = roxmltree::Document::parse(
            r#"<direction-type><vendor-tempo bpm="90">Allegro</vendor-tempo></direction-type>"#,
        )
        .expect("test XML should parse");
        let mut cx = DecodeContext::default();
        let direction_type: DirectionType =
            decode_child(doc.root_element(), None, &mut cx).expect("extension capture");

        match &direction_type.items[0] {
            DirectionTypeItem::Extension(raw) => {
                assert_eq!(raw.name, "vendor-tempo");
                assert_eq!(raw.attribute("bpm"), Some("90"));
                assert_eq!(raw.text(), "Allegro");
            }
            other => panic!("expected extension, got {:?}", other),
        }
        assert_eq!(cx.warnings().len(), 1);
    }

    #[test]
    fn test_direction_without_type_is_rejected() {
        let err = parse::<Direction>("<direction><staff>1</staff></direction>").expect_err("direction-type required");
        assert_eq!(
            err.kind(),
            &DecodeErrorKind::MissingRequiredField { field: "direction-type".to_string() }
        );
    }

    #[test]
    fn test_percussion_single_pictogram() {
        let percussion: Percussion =
            parse(r#"<percussion><membrane>snare drum</membrane></percussion>"#).expect("percussion decode");
        assert!(matches!(&percussion.kind, PercussionKind::Membrane(m) if m.value == Membrane::SnareDrum));
    }
}
