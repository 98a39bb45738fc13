//! Notations attached to a note
//!
//! `notations`, `ornaments`, `technical` and `articulations` are ordered
//! choices. Each keeps its children as a list of tagged items in document
//! order; unknown children are captured verbatim as `Extension` items.

use super::common::*;
use super::groups::*;
use super::primitives::*;
use crate::codec::{ChoiceItem, DecodeContext, DecodeResult, FromXml, ToXml};
use crate::xml::{ElementReader, XmlElement};
use roxmltree::Node;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPANNERS
// ============================================================================

attribute_group! {
    /// Notated tie; the sounding tie is the note's `tie` child
    Tied {
        required { kind: TiedType => "type" }
        number: NumberLevel => "number",
        line_type: LineType => "line-type",
        orientation: OverUnder => "orientation",
        color: Color => "color",
    }
    embeds {
        dashed_formatting: DashedFormatting,
        position: Position,
        placement: Placement,
        bezier: Bezier,
        id: OptionalUniqueId,
    }
}

attribute_group! {
    Slur {
        required { kind: StartStopContinue => "type" }
        number: NumberLevel => "number",
        line_type: LineType => "line-type",
        orientation: OverUnder => "orientation",
        color: Color => "color",
    }
    embeds {
        dashed_formatting: DashedFormatting,
        position: Position,
        placement: Placement,
        bezier: Bezier,
        id: OptionalUniqueId,
    }
}

impl Tied {
    pub fn new(kind: TiedType) -> Self {
        Self {
            kind,
            number: None,
            line_type: None,
            orientation: None,
            color: None,
            dashed_formatting: DashedFormatting::default(),
            position: Position::default(),
            placement: Placement::default(),
            bezier: Bezier::default(),
            id: OptionalUniqueId::default(),
        }
    }
}

impl Slur {
    pub fn new(kind: StartStopContinue) -> Self {
        Self {
            kind,
            number: None,
            line_type: None,
            orientation: None,
            color: None,
            dashed_formatting: DashedFormatting::default(),
            position: Position::default(),
            placement: Placement::default(),
            bezier: Bezier::default(),
            id: OptionalUniqueId::default(),
        }
    }

    /// Pairing number, 1 when absent
    pub fn pairing_number(&self) -> NumberLevel {
        self.number.unwrap_or(NumberLevel::DEFAULT)
    }
}

empty_element!(Tied, Slur);

attribute_group! {
    TupletFont {
        color: Color => "color",
    }
    embeds { font: Font }
}

empty_element!(TupletFont);

pub type TupletNumber = Valued<u32, TupletFont>;
pub type TupletType = Valued<NoteTypeValue, TupletFont>;

/// Displayed count and note type of one side of the tuplet ratio
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TupletPortion {
    pub tuplet_number: Option<TupletNumber>,
    pub tuplet_type: Option<TupletType>,
    pub tuplet_dots: Vec<TupletFont>,
}

impl FromXml for TupletPortion {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            tuplet_number: el.child("tuplet-number", cx)?,
            tuplet_type: el.child("tuplet-type", cx)?,
            tuplet_dots: el.children("tuplet-dot", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for TupletPortion {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.opt_child("tuplet-number", &self.tuplet_number);
        element.opt_child("tuplet-type", &self.tuplet_type);
        element.children("tuplet-dot", &self.tuplet_dots);
        element
    }
}

attribute_group! {
    TupletAttributes {
        required { kind: StartStop => "type" }
        number: NumberLevel => "number",
        bracket: YesNo => "bracket",
        show_number: ShowTuplet => "show-number",
        show_type: ShowTuplet => "show-type",
        line_shape: LineShape => "line-shape",
    }
    embeds {
        position: Position,
        placement: Placement,
        id: OptionalUniqueId,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuplet {
    pub tuplet_actual: Option<TupletPortion>,
    pub tuplet_normal: Option<TupletPortion>,
    pub attributes: TupletAttributes,
}

impl FromXml for Tuplet {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            tuplet_actual: el.child("tuplet-actual", cx)?,
            tuplet_normal: el.child("tuplet-normal", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Tuplet {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.opt_child("tuplet-actual", &self.tuplet_actual);
        element.opt_child("tuplet-normal", &self.tuplet_normal);
        element
    }
}

attribute_group! {
    /// Attributes of `glissando` and `slide`
    GlissandoAttributes {
        required { kind: StartStop => "type" }
        number: NumberLevel => "number",
        line_type: LineType => "line-type",
    }
    embeds {
        dashed_formatting: DashedFormatting,
        print_style: PrintStyle,
        bend_sound: BendSound,
        id: OptionalUniqueId,
    }
}

pub type Glissando = Valued<String, GlissandoAttributes>;
pub type Slide = Valued<String, GlissandoAttributes>;

// ============================================================================
// ORNAMENTS
// ============================================================================

attribute_group! {
    /// Turns; `slash` crosses the turn symbol
    HorizontalTurn {
        slash: YesNo => "slash",
    }
    embeds {
        print_style: PrintStyle,
        placement: Placement,
        trill_sound: TrillSound,
    }
}

attribute_group! {
    WavyLine {
        required { kind: StartStopContinue => "type" }
        number: NumberLevel => "number",
        color: Color => "color",
    }
    embeds {
        smufl: Smufl,
        position: Position,
        placement: Placement,
        trill_sound: TrillSound,
    }
}

attribute_group! {
    Mordent {
        long: YesNo => "long",
        approach: AboveBelow => "approach",
        departure: AboveBelow => "departure",
    }
    embeds {
        print_style: PrintStyle,
        placement: Placement,
        trill_sound: TrillSound,
    }
}

empty_element!(HorizontalTurn, WavyLine, Mordent);

attribute_group! {
    TremoloAttributes {
        kind: TremoloType => "type",
    }
    embeds {
        print_style: PrintStyle,
        placement: Placement,
        smufl: Smufl,
    }
}

/// Number of tremolo marks, 0-8
pub type Tremolo = Valued<TremoloMarks, TremoloAttributes>;

attribute_group! {
    AccidentalMarkAttributes {}
    embeds {
        level_display: LevelDisplay,
        print_style: PrintStyle,
        placement: Placement,
        smufl: Smufl,
        id: OptionalUniqueId,
    }
}

pub type AccidentalMark = Valued<AccidentalValue, AccidentalMarkAttributes>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Ornament {
    TrillMark(EmptyTrillSound),
    Turn(HorizontalTurn),
    DelayedTurn(HorizontalTurn),
    InvertedTurn(HorizontalTurn),
    DelayedInvertedTurn(HorizontalTurn),
    VerticalTurn(EmptyTrillSound),
    InvertedVerticalTurn(EmptyTrillSound),
    Shake(EmptyTrillSound),
    WavyLine(WavyLine),
    Mordent(Mordent),
    InvertedMordent(Mordent),
    Schleifer(EmptyPlacement),
    Tremolo(Tremolo),
    Haydn(EmptyTrillSound),
    OtherOrnament(OtherPlacementText),
    /// Accidental applying to the preceding ornament
    AccidentalMark(AccidentalMark),
    Extension(RawElement),
}

impl ChoiceItem for Ornament {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "trill-mark" => FromXml::from_xml(node, cx).map(Ornament::TrillMark),
            "turn" => FromXml::from_xml(node, cx).map(Ornament::Turn),
            "delayed-turn" => FromXml::from_xml(node, cx).map(Ornament::DelayedTurn),
            "inverted-turn" => FromXml::from_xml(node, cx).map(Ornament::InvertedTurn),
            "delayed-inverted-turn" => FromXml::from_xml(node, cx).map(Ornament::DelayedInvertedTurn),
            "vertical-turn" => FromXml::from_xml(node, cx).map(Ornament::VerticalTurn),
            "inverted-vertical-turn" => FromXml::from_xml(node, cx).map(Ornament::InvertedVerticalTurn),
            "shake" => FromXml::from_xml(node, cx).map(Ornament::Shake),
            "wavy-line" => FromXml::from_xml(node, cx).map(Ornament::WavyLine),
            "mordent" => FromXml::from_xml(node, cx).map(Ornament::Mordent),
            "inverted-mordent" => FromXml::from_xml(node, cx).map(Ornament::InvertedMordent),
            "schleifer" => FromXml::from_xml(node, cx).map(Ornament::Schleifer),
            "tremolo" => FromXml::from_xml(node, cx).map(Ornament::Tremolo),
            "haydn" => FromXml::from_xml(node, cx).map(Ornament::Haydn),
            "other-ornament" => FromXml::from_xml(node, cx).map(Ornament::OtherOrnament),
            "accidental-mark" => FromXml::from_xml(node, cx).map(Ornament::AccidentalMark),
            _ => Ok(Ornament::Extension(capture_extension(node, cx))),
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            Ornament::TrillMark(v) => v.to_xml("trill-mark"),
            Ornament::Turn(v) => v.to_xml("turn"),
            Ornament::DelayedTurn(v) => v.to_xml("delayed-turn"),
            Ornament::InvertedTurn(v) => v.to_xml("inverted-turn"),
            Ornament::DelayedInvertedTurn(v) => v.to_xml("delayed-inverted-turn"),
            Ornament::VerticalTurn(v) => v.to_xml("vertical-turn"),
            Ornament::InvertedVerticalTurn(v) => v.to_xml("inverted-vertical-turn"),
            Ornament::Shake(v) => v.to_xml("shake"),
            Ornament::WavyLine(v) => v.to_xml("wavy-line"),
            Ornament::Mordent(v) => v.to_xml("mordent"),
            Ornament::InvertedMordent(v) => v.to_xml("inverted-mordent"),
            Ornament::Schleifer(v) => v.to_xml("schleifer"),
            Ornament::Tremolo(v) => v.to_xml("tremolo"),
            Ornament::Haydn(v) => v.to_xml("haydn"),
            Ornament::OtherOrnament(v) => v.to_xml("other-ornament"),
            Ornament::AccidentalMark(v) => v.to_xml("accidental-mark"),
            Ornament::Extension(raw) => raw.clone(),
        }
    }
}

// ============================================================================
// TECHNICAL
// ============================================================================

xml_enum! { HarmonicKind { Natural => "natural", Artificial => "artificial" } }
xml_enum! { HarmonicPitch { Base => "base-pitch", Touching => "touching-pitch", Sounding => "sounding-pitch" } }

attribute_group! {
    HarmonicAttributes {}
    embeds {
        print_object: PrintObject,
        print_style: PrintStyle,
        placement: Placement,
    }
}

/// Natural or artificial harmonic, and which pitch the note represents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    pub kind: Option<HarmonicKind>,
    pub pitch: Option<HarmonicPitch>,
    pub attributes: HarmonicAttributes,
}

fn read_marker<T: crate::codec::XmlValue>(
    el: &mut ElementReader<'_, '_>,
    candidates: &[&str],
    cx: &mut DecodeContext,
) -> DecodeResult<Option<T>> {
    for candidate in candidates {
        if el.flag(candidate) {
            return T::parse_value(candidate, cx).map(Some);
        }
    }
    Ok(None)
}

impl FromXml for Harmonic {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            kind: read_marker(&mut el, &["natural", "artificial"], cx)?,
            pitch: read_marker(&mut el, &["base-pitch", "touching-pitch", "sounding-pitch"], cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Harmonic {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        if let Some(kind) = &self.kind {
            element.push(XmlElement::new(kind.as_str()));
        }
        if let Some(pitch) = &self.pitch {
            element.push(XmlElement::new(pitch.as_str()));
        }
        element
    }
}

attribute_group! {
    FingeringAttributes {
        substitution: YesNo => "substitution",
        alternate: YesNo => "alternate",
    }
    embeds { print_style: PrintStyle, placement: Placement }
}

pub type Fingering = Valued<String, FingeringAttributes>;

attribute_group! {
    FretAttributes {
        color: Color => "color",
    }
    embeds { font: Font }
}

pub type Fret = Valued<u32, FretAttributes>;

pub type StringMark = Valued<StringNumber, EmptyPlacement>;

attribute_group! {
    HammerOnPullOffAttributes {
        required { kind: StartStop => "type" }
        number: NumberLevel => "number",
    }
    embeds { print_style: PrintStyle, placement: Placement }
}

pub type HammerOnPullOff = Valued<String, HammerOnPullOffAttributes>;

attribute_group! { BendRelease { offset: Divisions => "offset" } }

empty_element!(BendRelease);

/// Bend direction: a pre-bend, a release, or an ordinary bend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BendKind {
    Normal,
    PreBend,
    Release(BendRelease),
}

attribute_group! {
    BendAttributes {
        shape: BendShape => "shape",
    }
    embeds { print_style: PrintStyle, bend_sound: BendSound }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bend {
    pub bend_alter: Semitones,
    pub kind: BendKind,
    pub with_bar: Option<PlacementText>,
    pub attributes: BendAttributes,
}

impl FromXml for Bend {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let bend_alter = el.req_text_child("bend-alter", cx)?;
        let kind = if el.flag("pre-bend") {
            BendKind::PreBend
        } else {
            match el.child("release", cx)? {
                Some(release) => BendKind::Release(release),
                None => BendKind::Normal,
            }
        };
        let value = Self {
            bend_alter,
            kind,
            with_bar: el.child("with-bar", cx)?,
            attributes,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Bend {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.text_child("bend-alter", &self.bend_alter);
        match &self.kind {
            BendKind::Normal => {}
            BendKind::PreBend => element.flag("pre-bend", true),
            BendKind::Release(release) => element.child("release", release),
        }
        element.opt_child("with-bar", &self.with_bar);
        element
    }
}

attribute_group! {
    TapAttributes {
        hand: TapHand => "hand",
    }
    embeds { print_style: PrintStyle, placement: Placement }
}

pub type Tap = Valued<String, TapAttributes>;

attribute_group! {
    HeelToe {
        substitution: YesNo => "substitution",
    }
    embeds { print_style: PrintStyle, placement: Placement }
}

empty_element!(HeelToe);

attribute_group! { HoleClosedAttributes { location: HoleClosedLocation => "location" } }

pub type HoleClosed = Valued<HoleClosedValue, HoleClosedAttributes>;

/// Woodwind and brass fingering hole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub hole_type: Option<String>,
    pub hole_closed: HoleClosed,
    pub hole_shape: Option<String>,
    pub attributes: EmptyPlacement,
}

impl FromXml for Hole {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            hole_type: el.text_child("hole-type", cx)?,
            hole_closed: el.req_child("hole-closed", cx)?,
            hole_shape: el.text_child("hole-shape", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Hole {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.opt_text_child("hole-type", &self.hole_type);
        element.child("hole-closed", &self.hole_closed);
        element.opt_text_child("hole-shape", &self.hole_shape);
        element
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrowContent {
    Directional {
        direction: ArrowDirection,
        style: Option<ArrowStyle>,
        arrowhead: bool,
    },
    Circular(CircularArrow),
}

attribute_group! {
    ArrowAttributes {}
    embeds { print_style: PrintStyle, placement: Placement, smufl: Smufl }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub content: ArrowContent,
    pub attributes: ArrowAttributes,
}

impl FromXml for Arrow {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let content = match el.text_child("circular-arrow", cx)? {
            Some(circular) => ArrowContent::Circular(circular),
            None => ArrowContent::Directional {
                direction: el.req_text_child("arrow-direction", cx)?,
                style: el.text_child("arrow-style", cx)?,
                arrowhead: el.flag("arrowhead"),
            },
        };
        el.finish()?;
        Ok(Self { content, attributes })
    }
}

impl ToXml for Arrow {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        match &self.content {
            ArrowContent::Directional {
                direction,
                style,
                arrowhead,
            } => {
                element.text_child("arrow-direction", direction);
                element.opt_text_child("arrow-style", style);
                element.flag("arrowhead", *arrowhead);
            }
            ArrowContent::Circular(circular) => element.text_child("circular-arrow", circular),
        }
        element
    }
}

pub type Handbell = Valued<HandbellValue, EmptyPlacement>;

attribute_group! { HarmonClosedAttributes { location: HarmonClosedLocation => "location" } }

pub type HarmonClosed = Valued<HarmonClosedValue, HarmonClosedAttributes>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonMute {
    pub harmon_closed: HarmonClosed,
    pub attributes: EmptyPlacement,
}

impl FromXml for HarmonMute {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            harmon_closed: el.req_child("harmon-closed", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for HarmonMute {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.child("harmon-closed", &self.harmon_closed);
        element
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Technical {
    UpBow(EmptyPlacement),
    DownBow(EmptyPlacement),
    Harmonic(Harmonic),
    OpenString(EmptyPlacement),
    ThumbPosition(EmptyPlacement),
    Fingering(Fingering),
    Pluck(PlacementText),
    DoubleTongue(EmptyPlacement),
    TripleTongue(EmptyPlacement),
    Stopped(EmptyPlacementSmufl),
    SnapPizzicato(EmptyPlacement),
    Fret(Fret),
    String(StringMark),
    HammerOn(HammerOnPullOff),
    PullOff(HammerOnPullOff),
    Bend(Bend),
    Tap(Tap),
    Heel(HeelToe),
    Toe(HeelToe),
    Fingernails(EmptyPlacement),
    Hole(Hole),
    Arrow(Arrow),
    Handbell(Handbell),
    BrassBend(EmptyPlacement),
    Flip(EmptyPlacement),
    Smear(EmptyPlacement),
    Open(EmptyPlacementSmufl),
    HalfMuted(EmptyPlacementSmufl),
    HarmonMute(HarmonMute),
    Golpe(EmptyPlacement),
    OtherTechnical(OtherPlacementText),
    Extension(RawElement),
}

impl ChoiceItem for Technical {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "up-bow" => FromXml::from_xml(node, cx).map(Technical::UpBow),
            "down-bow" => FromXml::from_xml(node, cx).map(Technical::DownBow),
            "harmonic" => FromXml::from_xml(node, cx).map(Technical::Harmonic),
            "open-string" => FromXml::from_xml(node, cx).map(Technical::OpenString),
            "thumb-position" => FromXml::from_xml(node, cx).map(Technical::ThumbPosition),
            "fingering" => FromXml::from_xml(node, cx).map(Technical::Fingering),
            "pluck" => FromXml::from_xml(node, cx).map(Technical::Pluck),
            "double-tongue" => FromXml::from_xml(node, cx).map(Technical::DoubleTongue),
            "triple-tongue" => FromXml::from_xml(node, cx).map(Technical::TripleTongue),
            "stopped" => FromXml::from_xml(node, cx).map(Technical::Stopped),
            "snap-pizzicato" => FromXml::from_xml(node, cx).map(Technical::SnapPizzicato),
            "fret" => FromXml::from_xml(node, cx).map(Technical::Fret),
            "string" => FromXml::from_xml(node, cx).map(Technical::String),
            "hammer-on" => FromXml::from_xml(node, cx).map(Technical::HammerOn),
            "pull-off" => FromXml::from_xml(node, cx).map(Technical::PullOff),
            "bend" => FromXml::from_xml(node, cx).map(Technical::Bend),
            "tap" => FromXml::from_xml(node, cx).map(Technical::Tap),
            "heel" => FromXml::from_xml(node, cx).map(Technical::Heel),
            "toe" => FromXml::from_xml(node, cx).map(Technical::Toe),
            "fingernails" => FromXml::from_xml(node, cx).map(Technical::Fingernails),
            "hole" => FromXml::from_xml(node, cx).map(Technical::Hole),
            "arrow" => FromXml::from_xml(node, cx).map(Technical::Arrow),
            "handbell" => FromXml::from_xml(node, cx).map(Technical::Handbell),
            "brass-bend" => FromXml::from_xml(node, cx).map(Technical::BrassBend),
            "flip" => FromXml::from_xml(node, cx).map(Technical::Flip),
            "smear" => FromXml::from_xml(node, cx).map(Technical::Smear),
            "open" => FromXml::from_xml(node, cx).map(Technical::Open),
            "half-muted" => FromXml::from_xml(node, cx).map(Technical::HalfMuted),
            "harmon-mute" => FromXml::from_xml(node, cx).map(Technical::HarmonMute),
            "golpe" => FromXml::from_xml(node, cx).map(Technical::Golpe),
            "other-technical" => FromXml::from_xml(node, cx).map(Technical::OtherTechnical),
            _ => Ok(Technical::Extension(capture_extension(node, cx))),
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            Technical::UpBow(v) => v.to_xml("up-bow"),
            Technical::DownBow(v) => v.to_xml("down-bow"),
            Technical::Harmonic(v) => v.to_xml("harmonic"),
            Technical::OpenString(v) => v.to_xml("open-string"),
            Technical::ThumbPosition(v) => v.to_xml("thumb-position"),
            Technical::Fingering(v) => v.to_xml("fingering"),
            Technical::Pluck(v) => v.to_xml("pluck"),
            Technical::DoubleTongue(v) => v.to_xml("double-tongue"),
            Technical::TripleTongue(v) => v.to_xml("triple-tongue"),
            Technical::Stopped(v) => v.to_xml("stopped"),
            Technical::SnapPizzicato(v) => v.to_xml("snap-pizzicato"),
            Technical::Fret(v) => v.to_xml("fret"),
            Technical::String(v) => v.to_xml("string"),
            Technical::HammerOn(v) => v.to_xml("hammer-on"),
            Technical::PullOff(v) => v.to_xml("pull-off"),
            Technical::Bend(v) => v.to_xml("bend"),
            Technical::Tap(v) => v.to_xml("tap"),
            Technical::Heel(v) => v.to_xml("heel"),
            Technical::Toe(v) => v.to_xml("toe"),
            Technical::Fingernails(v) => v.to_xml("fingernails"),
            Technical::Hole(v) => v.to_xml("hole"),
            Technical::Arrow(v) => v.to_xml("arrow"),
            Technical::Handbell(v) => v.to_xml("handbell"),
            Technical::BrassBend(v) => v.to_xml("brass-bend"),
            Technical::Flip(v) => v.to_xml("flip"),
            Technical::Smear(v) => v.to_xml("smear"),
            Technical::Open(v) => v.to_xml("open"),
            Technical::HalfMuted(v) => v.to_xml("half-muted"),
            Technical::HarmonMute(v) => v.to_xml("harmon-mute"),
            Technical::Golpe(v) => v.to_xml("golpe"),
            Technical::OtherTechnical(v) => v.to_xml("other-technical"),
            Technical::Extension(raw) => raw.clone(),
        }
    }
}

// ============================================================================
// ARTICULATIONS
// ============================================================================

attribute_group! {
    StrongAccent {
        kind: UpDown => "type",
    }
    embeds { print_style: PrintStyle, placement: Placement }
}

empty_element!(StrongAccent);

pub type BreathMark = Valued<BreathMarkValue, EmptyPlacement>;
pub type Caesura = Valued<CaesuraValue, EmptyPlacement>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Articulation {
    Accent(EmptyPlacement),
    StrongAccent(StrongAccent),
    Staccato(EmptyPlacement),
    Tenuto(EmptyPlacement),
    DetachedLegato(EmptyPlacement),
    Staccatissimo(EmptyPlacement),
    Spiccato(EmptyPlacement),
    Scoop(EmptyLine),
    Plop(EmptyLine),
    Doit(EmptyLine),
    Falloff(EmptyLine),
    BreathMark(BreathMark),
    Caesura(Caesura),
    Stress(EmptyPlacement),
    Unstress(EmptyPlacement),
    SoftAccent(EmptyPlacement),
    OtherArticulation(OtherPlacementText),
    Extension(RawElement),
}

impl ChoiceItem for Articulation {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "accent" => FromXml::from_xml(node, cx).map(Articulation::Accent),
            "strong-accent" => FromXml::from_xml(node, cx).map(Articulation::StrongAccent),
            "staccato" => FromXml::from_xml(node, cx).map(Articulation::Staccato),
            "tenuto" => FromXml::from_xml(node, cx).map(Articulation::Tenuto),
            "detached-legato" => FromXml::from_xml(node, cx).map(Articulation::DetachedLegato),
            "staccatissimo" => FromXml::from_xml(node, cx).map(Articulation::Staccatissimo),
            "spiccato" => FromXml::from_xml(node, cx).map(Articulation::Spiccato),
            "scoop" => FromXml::from_xml(node, cx).map(Articulation::Scoop),
            "plop" => FromXml::from_xml(node, cx).map(Articulation::Plop),
            "doit" => FromXml::from_xml(node, cx).map(Articulation::Doit),
            "falloff" => FromXml::from_xml(node, cx).map(Articulation::Falloff),
            "breath-mark" => FromXml::from_xml(node, cx).map(Articulation::BreathMark),
            "caesura" => FromXml::from_xml(node, cx).map(Articulation::Caesura),
            "stress" => FromXml::from_xml(node, cx).map(Articulation::Stress),
            "unstress" => FromXml::from_xml(node, cx).map(Articulation::Unstress),
            "soft-accent" => FromXml::from_xml(node, cx).map(Articulation::SoftAccent),
            "other-articulation" => FromXml::from_xml(node, cx).map(Articulation::OtherArticulation),
            _ => Ok(Articulation::Extension(capture_extension(node, cx))),
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            Articulation::Accent(v) => v.to_xml("accent"),
            Articulation::StrongAccent(v) => v.to_xml("strong-accent"),
            Articulation::Staccato(v) => v.to_xml("staccato"),
            Articulation::Tenuto(v) => v.to_xml("tenuto"),
            Articulation::DetachedLegato(v) => v.to_xml("detached-legato"),
            Articulation::Staccatissimo(v) => v.to_xml("staccatissimo"),
            Articulation::Spiccato(v) => v.to_xml("spiccato"),
            Articulation::Scoop(v) => v.to_xml("scoop"),
            Articulation::Plop(v) => v.to_xml("plop"),
            Articulation::Doit(v) => v.to_xml("doit"),
            Articulation::Falloff(v) => v.to_xml("falloff"),
            Articulation::BreathMark(v) => v.to_xml("breath-mark"),
            Articulation::Caesura(v) => v.to_xml("caesura"),
            Articulation::Stress(v) => v.to_xml("stress"),
            Articulation::Unstress(v) => v.to_xml("unstress"),
            Articulation::SoftAccent(v) => v.to_xml("soft-accent"),
            Articulation::OtherArticulation(v) => v.to_xml("other-articulation"),
            Articulation::Extension(raw) => raw.clone(),
        }
    }
}

// ============================================================================
// LISTS WITH AN ID
// ============================================================================

/// Ordered item list carrying only an optional `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemList<T> {
    pub items: Vec<T>,
    pub id: Option<String>,
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            id: None,
        }
    }
}

impl<T: ChoiceItem> FromXml for ItemList<T> {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let id = el.attr("id", cx)?;
        let items = el.choices(cx)?;
        el.finish()?;
        Ok(Self { items, id })
    }
}

impl<T: ChoiceItem> ToXml for ItemList<T> {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.opt_attr("id", &self.id);
        for item in &self.items {
            element.push(item.to_element());
        }
        element
    }
}

pub type Ornaments = ItemList<Ornament>;
pub type TechnicalList = ItemList<Technical>;
pub type Articulations = ItemList<Articulation>;

// ============================================================================
// OTHER NOTATIONS
// ============================================================================

attribute_group! {
    FermataAttributes {
        kind: UprightInverted => "type",
    }
    embeds { print_style: PrintStyle, id: OptionalUniqueId }
}

/// Fermata shape; the empty literal is the normal fermata
pub type Fermata = Valued<FermataShape, FermataAttributes>;

attribute_group! {
    Arpeggiate {
        number: NumberLevel => "number",
        direction: UpDown => "direction",
        unbroken: YesNo => "unbroken",
        color: Color => "color",
    }
    embeds {
        position: Position,
        placement: Placement,
        id: OptionalUniqueId,
    }
}

attribute_group! {
    NonArpeggiate {
        required { kind: TopBottom => "type" }
        number: NumberLevel => "number",
        color: Color => "color",
    }
    embeds {
        position: Position,
        placement: Placement,
        id: OptionalUniqueId,
    }
}

empty_element!(Arpeggiate, NonArpeggiate);

attribute_group! {
    OtherNotationAttributes {
        required { kind: StartStopSingle => "type" }
        number: NumberLevel => "number",
    }
    embeds {
        print_object: PrintObject,
        print_style: PrintStyle,
        placement: Placement,
        smufl: Smufl,
        id: OptionalUniqueId,
    }
}

pub type OtherNotation = Valued<String, OtherNotationAttributes>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notation {
    Tied(Tied),
    Slur(Slur),
    Tuplet(Tuplet),
    Glissando(Glissando),
    Slide(Slide),
    Ornaments(Ornaments),
    Technical(TechnicalList),
    Articulations(Articulations),
    Dynamics(Dynamics),
    Fermata(Fermata),
    Arpeggiate(Arpeggiate),
    NonArpeggiate(NonArpeggiate),
    AccidentalMark(AccidentalMark),
    OtherNotation(OtherNotation),
    Extension(RawElement),
}

impl ChoiceItem for Notation {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "tied" => FromXml::from_xml(node, cx).map(Notation::Tied),
            "slur" => FromXml::from_xml(node, cx).map(Notation::Slur),
            "tuplet" => FromXml::from_xml(node, cx).map(Notation::Tuplet),
            "glissando" => FromXml::from_xml(node, cx).map(Notation::Glissando),
            "slide" => FromXml::from_xml(node, cx).map(Notation::Slide),
            "ornaments" => FromXml::from_xml(node, cx).map(Notation::Ornaments),
            "technical" => FromXml::from_xml(node, cx).map(Notation::Technical),
            "articulations" => FromXml::from_xml(node, cx).map(Notation::Articulations),
            "dynamics" => FromXml::from_xml(node, cx).map(Notation::Dynamics),
            "fermata" => FromXml::from_xml(node, cx).map(Notation::Fermata),
            "arpeggiate" => FromXml::from_xml(node, cx).map(Notation::Arpeggiate),
            "non-arpeggiate" => FromXml::from_xml(node, cx).map(Notation::NonArpeggiate),
            "accidental-mark" => FromXml::from_xml(node, cx).map(Notation::AccidentalMark),
            "other-notation" => FromXml::from_xml(node, cx).map(Notation::OtherNotation),
            _ => Ok(Notation::Extension(capture_extension(node, cx))),
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            Notation::Tied(v) => v.to_xml("tied"),
            Notation::Slur(v) => v.to_xml("slur"),
            Notation::Tuplet(v) => v.to_xml("tuplet"),
            Notation::Glissando(v) => v.to_xml("glissando"),
            Notation::Slide(v) => v.to_xml("slide"),
            Notation::Ornaments(v) => v.to_xml("ornaments"),
            Notation::Technical(v) => v.to_xml("technical"),
            Notation::Articulations(v) => v.to_xml("articulations"),
            Notation::Dynamics(v) => v.to_xml("dynamics"),
            Notation::Fermata(v) => v.to_xml("fermata"),
            Notation::Arpeggiate(v) => v.to_xml("arpeggiate"),
            Notation::NonArpeggiate(v) => v.to_xml("non-arpeggiate"),
            Notation::AccidentalMark(v) => v.to_xml("accidental-mark"),
            Notation::OtherNotation(v) => v.to_xml("other-notation"),
            Notation::Extension(raw) => raw.clone(),
        }
    }
}

/// One `notations` element; a note may carry several
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notations {
    pub editorial: Editorial,
    pub items: Vec<Notation>,
    pub print_object: PrintObject,
    pub id: OptionalUniqueId,
}

impl Notations {
    pub fn from_items(items: Vec<Notation>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }
}

impl FromXml for Notations {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let print_object = el.group(cx)?;
        let id = el.group(cx)?;
        let editorial = Editorial::read(&mut el, cx)?;
        let items = el.choices(cx)?;
        el.finish()?;
        Ok(Self {
            editorial,
            items,
            print_object,
            id,
        })
    }
}

impl ToXml for Notations {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.print_object);
        element.group(&self.id);
        self.editorial.write(&mut element);
        for item in &self.items {
            element.push(item.to_element());
        }
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_child;

    fn parse<T: FromXml>(xml: &str) -> (DecodeResult<T>, DecodeContext) {
        let doc = roxmltree::Document::parse(xml).expect("test XML should parse");
        let mut cx = DecodeContext::default();
        let value = decode_child(doc.root_element(), None, &mut cx);
        (value, cx)
    }

    #[test]
    fn test_notations_keep_order_and_capture_unknown() {
        let (notations, cx) = parse::<Notations>(
            r#"<notations><slur type="start" number="1"/><vendor-mark style="x"><inner/></vendor-mark><tied type="let-ring"/></notations>"#,
        );
        let notations = notations.expect("notations decode");
        assert_eq!(notations.items.len(), 3);
        assert!(matches!(&notations.items[0], Notation::Slur(slur) if slur.pairing_number() == NumberLevel(1)));
        assert!(matches!(&notations.items[1], Notation::Extension(raw) if raw.attribute("style") == Some("x")));
        assert!(matches!(&notations.items[2], Notation::Tied(tied) if tied.kind == TiedType::LetRing));
        assert_eq!(cx.warnings().len(), 1);
        assert_eq!(cx.warnings()[0].path.to_string(), "notations/vendor-mark[0]");

        let element = notations.to_xml("notations");
        let tags: Vec<&str> = element.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(tags, vec!["slur", "vendor-mark", "tied"]);
    }

    #[test]
    fn test_ornaments_with_accidental_mark() {
        let (ornaments, _) = parse::<Ornaments>(
            r#"<ornaments><turn slash="yes"/><accidental-mark placement="above">sharp</accidental-mark><tremolo type="single">3</tremolo></ornaments>"#,
        );
        let ornaments = ornaments.expect("ornaments decode");
        assert!(matches!(&ornaments.items[0], Ornament::Turn(turn) if turn.slash == Some(YesNo::Yes)));
        assert!(matches!(&ornaments.items[1], Ornament::AccidentalMark(mark) if mark.value == AccidentalValue::Sharp));
        assert!(matches!(&ornaments.items[2], Ornament::Tremolo(tremolo) if tremolo.value == TremoloMarks(3)));
    }

    #[test]
    fn test_technical_fingering_and_bend() {
        let (technical, _) = parse::<TechnicalList>(
            "<technical><fingering>3</fingering><bend><bend-alter>2</bend-alter><release/></bend><string>1</string></technical>",
        );
        let technical = technical.expect("technical decode");
        assert!(matches!(&technical.items[0], Technical::Fingering(f) if f.value == "3"));
        match &technical.items[1] {
            Technical::Bend(bend) => {
                assert_eq!(bend.bend_alter, Semitones(2.0));
                assert!(matches!(bend.kind, BendKind::Release(_)));
            }
            other => panic!("expected bend, got {:?}", other),
        }
        assert!(matches!(&technical.items[2], Technical::String(s) if s.value == StringNumber(1)));
    }

    #[test]
    fn test_empty_fermata_shape_round_trips() {
        let (fermata, _) = parse::<Fermata>(r#"<fermata type="upright"/>"#);
        let fermata = fermata.expect("fermata decode");
        assert_eq!(fermata.value, FermataShape::Empty);

        let element = fermata.to_xml("fermata");
        assert!(element.children.is_empty());
        assert_eq!(element.attribute("type"), Some("upright"));
    }

    #[test]
    fn test_tuplet_portions() {
        let (tuplet, _) = parse::<Tuplet>(
            r#"<tuplet type="start" bracket="yes"><tuplet-actual><tuplet-number>3</tuplet-number><tuplet-type>eighth</tuplet-type></tuplet-actual></tuplet>"#,
        );
        let tuplet = tuplet.expect("tuplet decode");
        let actual = tuplet.tuplet_actual.expect("actual portion");
        assert_eq!(actual.tuplet_number.map(|n| n.value), Some(3));
        assert_eq!(actual.tuplet_type.map(|t| t.value), Some(NoteTypeValue::Eighth));
        assert!(tuplet.tuplet_normal.is_none());
    }
}
