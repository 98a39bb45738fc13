//! The `attributes` element: divisions, key, time, staves, clefs, transposition
//!
//! # Recursion
//!
//! `Clef`, `Transpose` and `Slash` may each hold a nested value of their own
//! type (a cue clef, the transposition of a doubled part, a nested slash
//! region). The nested value is an owned `Option<Box<Self>>`; it is written
//! only when present.

use super::common::*;
use super::groups::*;
use super::primitives::*;
use crate::codec::{ChoiceItem, DecodeContext, DecodeError, DecodeResult, FromXml, ToXml};
use crate::xml::{ElementReader, XmlElement};
use roxmltree::Node;
use serde::{Deserialize, Serialize};

/// Musical attributes that usually change at measure boundaries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub editorial: Editorial,
    pub divisions: Option<PositiveDivisions>,
    pub keys: Vec<Key>,
    pub times: Vec<Time>,
    pub staves: Option<u32>,
    pub part_symbol: Option<PartSymbol>,
    pub instruments: Option<u32>,
    pub clefs: Vec<Clef>,
    pub staff_details: Vec<StaffDetails>,
    pub transpose: Vec<Transpose>,
    pub for_parts: Vec<ForPart>,
    pub directives: Vec<Directive>,
    pub measure_styles: Vec<MeasureStyle>,
}

impl FromXml for Attributes {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            editorial: Editorial::read(&mut el, cx)?,
            divisions: el.text_child("divisions", cx)?,
            keys: el.children("key", cx)?,
            times: el.children("time", cx)?,
            staves: el.text_child("staves", cx)?,
            part_symbol: el.child("part-symbol", cx)?,
            instruments: el.text_child("instruments", cx)?,
            clefs: el.children("clef", cx)?,
            staff_details: el.children("staff-details", cx)?,
            transpose: el.children("transpose", cx)?,
            for_parts: el.children("for-part", cx)?,
            directives: el.children("directive", cx)?,
            measure_styles: el.children("measure-style", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Attributes {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        self.editorial.write(&mut element);
        element.opt_text_child("divisions", &self.divisions);
        element.children("key", &self.keys);
        element.children("time", &self.times);
        element.opt_text_child("staves", &self.staves);
        element.opt_child("part-symbol", &self.part_symbol);
        element.opt_text_child("instruments", &self.instruments);
        element.children("clef", &self.clefs);
        element.children("staff-details", &self.staff_details);
        element.children("transpose", &self.transpose);
        element.children("for-part", &self.for_parts);
        element.children("directive", &self.directives);
        element.children("measure-style", &self.measure_styles);
        element
    }
}

// ============================================================================
// KEY
// ============================================================================

attribute_group! {
    /// Attributes shared by `key`, `time` and `clef`
    StaffElementAttributes {
        number: StaffNumber => "number",
    }
    embeds {
        print_style: PrintStyle,
        print_object: PrintObject,
        id: OptionalUniqueId,
    }
}

attribute_group! { CancelAttributes { location: CancelLocation => "location" } }

/// Cancellation of the previous key, given as its fifths
pub type Cancel = Valued<Fifths, CancelAttributes>;

pub type KeyAccidental = Valued<AccidentalValue, Smufl>;

attribute_group! {
    KeyOctaveAttributes {
        required { number: u32 => "number" }
        cancel: YesNo => "cancel",
    }
}

/// Octave of one key-signature accidental; `number` is its 1-based position
pub type KeyOctave = Valued<Octave, KeyOctaveAttributes>;

/// One altered step of a non-traditional key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyStepAlter {
    pub step: Step,
    pub alter: Semitones,
    pub accidental: Option<KeyAccidental>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyContent {
    Traditional {
        cancel: Option<Cancel>,
        fifths: Fifths,
        mode: Option<Mode>,
    },
    NonTraditional(Vec<KeyStepAlter>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub content: KeyContent,
    pub key_octaves: Vec<KeyOctave>,
    pub attributes: StaffElementAttributes,
}

impl Key {
    pub fn traditional(fifths: i32, mode: Option<Mode>) -> Self {
        Self {
            content: KeyContent::Traditional {
                cancel: None,
                fifths: Fifths(fifths),
                mode,
            },
            key_octaves: Vec::new(),
            attributes: StaffElementAttributes::default(),
        }
    }
}

enum KeyStepPart {
    Step(Step),
    Alter(Semitones),
    Accidental(KeyAccidental),
}

impl ChoiceItem for KeyStepPart {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        match name {
            "key-step" => Some(<Valued<Step>>::from_xml(node, cx).map(|v| KeyStepPart::Step(v.value))),
            "key-alter" => Some(<Valued<Semitones>>::from_xml(node, cx).map(|v| KeyStepPart::Alter(v.value))),
            "key-accidental" => Some(FromXml::from_xml(node, cx).map(KeyStepPart::Accidental)),
            _ => None,
        }
    }

    fn to_element(&self) -> XmlElement {
        match self {
            KeyStepPart::Step(step) => XmlElement::with_text("key-step", step.as_str()),
            KeyStepPart::Alter(alter) => XmlElement::with_text("key-alter", alter.to_string()),
            KeyStepPart::Accidental(accidental) => accidental.to_xml("key-accidental"),
        }
    }
}

/// Pair each `key-step` with the `key-alter` (and optional `key-accidental`) after it
fn group_key_steps(parts: Vec<KeyStepPart>) -> DecodeResult<Vec<KeyStepAlter>> {
    let mut steps: Vec<(Step, Option<Semitones>, Option<KeyAccidental>)> = Vec::new();
    for part in parts {
        match part {
            KeyStepPart::Step(step) => steps.push((step, None, None)),
            KeyStepPart::Alter(alter) => match steps.last_mut() {
                Some(last) if last.1.is_none() => last.1 = Some(alter),
                _ => return Err(DecodeError::unexpected("key-alter")),
            },
            KeyStepPart::Accidental(accidental) => match steps.last_mut() {
                Some(last) if last.1.is_some() && last.2.is_none() => last.2 = Some(accidental),
                _ => return Err(DecodeError::unexpected("key-accidental")),
            },
        }
    }
    steps
        .into_iter()
        .map(|(step, alter, accidental)| {
            let alter = alter.ok_or_else(|| DecodeError::missing("key-alter"))?;
            Ok(KeyStepAlter {
                step,
                alter,
                accidental,
            })
        })
        .collect()
}

impl FromXml for Key {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let key_octaves = el.children("key-octave", cx)?;

        let content = if el.has("fifths") {
            KeyContent::Traditional {
                cancel: el.child("cancel", cx)?,
                fifths: el.req_text_child("fifths", cx)?,
                mode: el.text_child("mode", cx)?,
            }
        } else {
            let parts = el.choices::<KeyStepPart>(cx)?;
            if parts.is_empty() {
                return Err(DecodeError::missing("fifths"));
            }
            KeyContent::NonTraditional(group_key_steps(parts)?)
        };
        el.finish()?;

        Ok(Self {
            content,
            key_octaves,
            attributes,
        })
    }
}

impl ToXml for Key {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        match &self.content {
            KeyContent::Traditional { cancel, fifths, mode } => {
                element.opt_child("cancel", cancel);
                element.text_child("fifths", fifths);
                element.opt_text_child("mode", mode);
            }
            KeyContent::NonTraditional(steps) => {
                for step in steps {
                    element.push(KeyStepPart::Step(step.step.clone()).to_element());
                    element.push(KeyStepPart::Alter(step.alter).to_element());
                    element.opt_child("key-accidental", &step.accidental);
                }
            }
        }
        element.children("key-octave", &self.key_octaves);
        element
    }
}

// ============================================================================
// TIME
// ============================================================================

/// `beats` over `beat-type`; both are strings because `3+2` is allowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats: String,
    pub beat_type: String,
}

impl TimeSignature {
    pub fn new(beats: impl Into<String>, beat_type: impl Into<String>) -> Self {
        Self {
            beats: beats.into(),
            beat_type: beat_type.into(),
        }
    }
}

fn read_signatures(el: &mut ElementReader<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Vec<TimeSignature>> {
    let beats: Vec<String> = el.text_children("beats", cx)?;
    let beat_types: Vec<String> = el.text_children("beat-type", cx)?;
    if beats.len() != beat_types.len() {
        let missing = if beats.len() < beat_types.len() { "beats" } else { "beat-type" };
        return Err(DecodeError::missing(missing));
    }
    Ok(beats
        .into_iter()
        .zip(beat_types)
        .map(|(beats, beat_type)| TimeSignature { beats, beat_type })
        .collect())
}

fn write_signatures(element: &mut XmlElement, signatures: &[TimeSignature]) {
    for signature in signatures {
        element.text_child("beats", &signature.beats);
        element.text_child("beat-type", &signature.beat_type);
    }
}

attribute_group! {
    TimeDisplayAttributes {
        symbol: TimeSymbol => "symbol",
        separator: TimeSeparator => "separator",
    }
}

/// Alternative signature shown alongside the main one (e.g. `6/8 (2/4)`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interchangeable {
    pub time_relation: Option<TimeRelation>,
    pub signatures: Vec<TimeSignature>,
    pub attributes: TimeDisplayAttributes,
}

impl FromXml for Interchangeable {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            time_relation: el.text_child("time-relation", cx)?,
            signatures: read_signatures(&mut el, cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Interchangeable {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.opt_text_child("time-relation", &self.time_relation);
        write_signatures(&mut element, &self.signatures);
        element
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimeContent {
    Signatures {
        signatures: Vec<TimeSignature>,
        interchangeable: Option<Interchangeable>,
    },
    /// Unmeasured music; the text is an optional symbol such as `X`
    SenzaMisura(String),
}

attribute_group! {
    TimeAttributes {
        halign: LeftCenterRight => "halign",
        valign: Valign => "valign",
    }
    embeds {
        display: TimeDisplayAttributes,
        staff: StaffElementAttributes,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Time {
    pub content: TimeContent,
    pub attributes: TimeAttributes,
}

impl Time {
    pub fn new(beats: impl Into<String>, beat_type: impl Into<String>) -> Self {
        Self {
            content: TimeContent::Signatures {
                signatures: vec![TimeSignature::new(beats, beat_type)],
                interchangeable: None,
            },
            attributes: TimeAttributes::default(),
        }
    }
}

impl FromXml for Time {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let content = match el.text_child::<String>("senza-misura", cx)? {
            Some(symbol) => TimeContent::SenzaMisura(symbol),
            None => {
                let signatures = read_signatures(&mut el, cx)?;
                if signatures.is_empty() {
                    return Err(DecodeError::missing("beats"));
                }
                TimeContent::Signatures {
                    signatures,
                    interchangeable: el.child("interchangeable", cx)?,
                }
            }
        };
        el.finish()?;
        Ok(Self { content, attributes })
    }
}

impl ToXml for Time {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        match &self.content {
            TimeContent::Signatures {
                signatures,
                interchangeable,
            } => {
                write_signatures(&mut element, signatures);
                element.opt_child("interchangeable", interchangeable);
            }
            TimeContent::SenzaMisura(symbol) => element.text_child("senza-misura", symbol),
        }
        element
    }
}

// ============================================================================
// CLEF
// ============================================================================

attribute_group! {
    ClefAttributes {
        additional: YesNo => "additional",
        size: SymbolSize => "size",
        after_barline: YesNo => "after-barline",
    }
    embeds {
        staff: StaffElementAttributes,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clef {
    pub sign: ClefSign,
    pub line: Option<StaffLine>,
    pub clef_octave_change: Option<i32>,
    /// Cue clef shown together with this one
    pub clef: Option<Box<Clef>>,
    pub attributes: ClefAttributes,
}

impl Clef {
    pub fn new(sign: ClefSign, line: Option<i32>) -> Self {
        Self {
            sign,
            line: line.map(StaffLine),
            clef_octave_change: None,
            clef: None,
            attributes: ClefAttributes::default(),
        }
    }

    pub fn treble() -> Self {
        Self::new(ClefSign::G, Some(2))
    }

    pub fn bass() -> Self {
        Self::new(ClefSign::F, Some(4))
    }

    /// Depth of the nested cue-clef chain, counting this clef
    pub fn depth(&self) -> usize {
        1 + self.clef.as_ref().map_or(0, |nested| nested.depth())
    }
}

impl FromXml for Clef {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            sign: el.req_text_child("sign", cx)?,
            line: el.text_child("line", cx)?,
            clef_octave_change: el.text_child("clef-octave-change", cx)?,
            clef: el.child("clef", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Clef {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.text_child("sign", &self.sign);
        element.opt_text_child("line", &self.line);
        element.opt_text_child("clef-octave-change", &self.clef_octave_change);
        element.opt_child("clef", &self.clef);
        element
    }
}

attribute_group! {
    PartSymbolAttributes {
        top_staff: StaffNumber => "top-staff",
        bottom_staff: StaffNumber => "bottom-staff",
        color: Color => "color",
    }
    embeds { position: Position }
}

pub type PartSymbol = Valued<PartSymbolValue, PartSymbolAttributes>;

// ============================================================================
// STAFF DETAILS
// ============================================================================

attribute_group! {
    LineDetail {
        required { line: StaffLine => "line" }
        width: Tenths => "width",
        color: Color => "color",
        line_type: LineType => "line-type",
    }
    embeds { print_object: PrintObject }
}

empty_element!(LineDetail);

/// Open-string pitch of one tablature line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffTuning {
    pub line: StaffLine,
    pub tuning_step: Step,
    pub tuning_alter: Option<Semitones>,
    pub tuning_octave: Octave,
}

impl FromXml for StaffTuning {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            line: el.req_attr("line", cx)?,
            tuning_step: el.req_text_child("tuning-step", cx)?,
            tuning_alter: el.text_child("tuning-alter", cx)?,
            tuning_octave: el.req_text_child("tuning-octave", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for StaffTuning {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.attr("line", self.line.to_string());
        element.text_child("tuning-step", &self.tuning_step);
        element.opt_text_child("tuning-alter", &self.tuning_alter);
        element.text_child("tuning-octave", &self.tuning_octave);
        element
    }
}

attribute_group! { StaffSizeAttributes { scaling: NonNegativeDecimal => "scaling" } }

pub type StaffSize = Valued<NonNegativeDecimal, StaffSizeAttributes>;

attribute_group! {
    StaffDetailsAttributes {
        number: StaffNumber => "number",
        show_frets: ShowFrets => "show-frets",
        print_spacing: YesNo => "print-spacing",
    }
    embeds { print_object: PrintObject }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffDetails {
    pub staff_type: Option<StaffType>,
    pub staff_lines: Option<u32>,
    pub line_details: Vec<LineDetail>,
    pub staff_tunings: Vec<StaffTuning>,
    pub capo: Option<u32>,
    pub staff_size: Option<StaffSize>,
    pub attributes: StaffDetailsAttributes,
}

impl FromXml for StaffDetails {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            staff_type: el.text_child("staff-type", cx)?,
            staff_lines: el.text_child("staff-lines", cx)?,
            line_details: el.children("line-detail", cx)?,
            staff_tunings: el.children("staff-tuning", cx)?,
            capo: el.text_child("capo", cx)?,
            staff_size: el.child("staff-size", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for StaffDetails {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.opt_text_child("staff-type", &self.staff_type);
        element.opt_text_child("staff-lines", &self.staff_lines);
        element.children("line-detail", &self.line_details);
        element.children("staff-tuning", &self.staff_tunings);
        element.opt_text_child("capo", &self.capo);
        element.opt_child("staff-size", &self.staff_size);
        element
    }
}

// ============================================================================
// TRANSPOSITION
// ============================================================================

attribute_group! { Double { above: YesNo => "above" } }

empty_element!(Double);

attribute_group! {
    TransposeAttributes {
        number: StaffNumber => "number",
    }
    embeds { id: OptionalUniqueId }
}

/// Written-to-sounding interval for transposing instruments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transpose {
    pub diatonic: Option<i32>,
    pub chromatic: Semitones,
    pub octave_change: Option<i32>,
    pub double: Option<Double>,
    pub transpose: Option<Box<Transpose>>,
    pub attributes: TransposeAttributes,
}

impl FromXml for Transpose {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            diatonic: el.text_child("diatonic", cx)?,
            chromatic: el.req_text_child("chromatic", cx)?,
            octave_change: el.text_child("octave-change", cx)?,
            double: el.child("double", cx)?,
            transpose: el.child("transpose", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Transpose {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.opt_text_child("diatonic", &self.diatonic);
        element.text_child("chromatic", &self.chromatic);
        element.opt_text_child("octave-change", &self.octave_change);
        element.opt_child("double", &self.double);
        element.opt_child("transpose", &self.transpose);
        element
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartClef {
    pub sign: ClefSign,
    pub line: Option<StaffLine>,
    pub clef_octave_change: Option<i32>,
}

impl FromXml for PartClef {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            sign: el.req_text_child("sign", cx)?,
            line: el.text_child("line", cx)?,
            clef_octave_change: el.text_child("clef-octave-change", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for PartClef {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.text_child("sign", &self.sign);
        element.opt_text_child("line", &self.line);
        element.opt_text_child("clef-octave-change", &self.clef_octave_change);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartTranspose {
    pub diatonic: Option<i32>,
    pub chromatic: Semitones,
    pub octave_change: Option<i32>,
    pub double: Option<Double>,
}

impl FromXml for PartTranspose {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            diatonic: el.text_child("diatonic", cx)?,
            chromatic: el.req_text_child("chromatic", cx)?,
            octave_change: el.text_child("octave-change", cx)?,
            double: el.child("double", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for PartTranspose {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.opt_text_child("diatonic", &self.diatonic);
        element.text_child("chromatic", &self.chromatic);
        element.opt_text_child("octave-change", &self.octave_change);
        element.opt_child("double", &self.double);
        element
    }
}

/// Concert-pitch score information for one transposed part
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForPart {
    pub part_clef: Option<PartClef>,
    pub part_transpose: PartTranspose,
    pub attributes: TransposeAttributes,
}

impl FromXml for ForPart {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            part_clef: el.child("part-clef", cx)?,
            part_transpose: el.req_child("part-transpose", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for ForPart {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.opt_child("part-clef", &self.part_clef);
        element.child("part-transpose", &self.part_transpose);
        element
    }
}

attribute_group! {
    DirectiveAttributes {
        lang: XmlLang => "xml:lang",
    }
    embeds { print_style: PrintStyle }
}

/// Deprecated tempo-style text aligned with the time signature
pub type Directive = Valued<String, DirectiveAttributes>;

// ============================================================================
// MEASURE STYLE
// ============================================================================

attribute_group! { MultipleRestAttributes { use_symbols: YesNo => "use-symbols" } }

pub type MultipleRest = Valued<u32, MultipleRestAttributes>;

attribute_group! {
    MeasureRepeatAttributes {
        required { kind: StartStop => "type" }
        slashes: u32 => "slashes",
    }
}

/// Number of measures repeated; empty on the `stop` marker
pub type MeasureRepeat = Valued<PositiveIntegerOrEmpty, MeasureRepeatAttributes>;

attribute_group! {
    SlashAttributes {
        required { kind: StartStop => "type" }
        use_dots: YesNo => "use-dots",
        use_stems: YesNo => "use-stems",
    }
}

fn read_slash_content(
    el: &mut ElementReader<'_, '_>,
    cx: &mut DecodeContext,
) -> DecodeResult<(Option<NoteTypeValue>, Vec<Empty>, Vec<String>)> {
    Ok((
        el.text_child("slash-type", cx)?,
        el.children("slash-dot", cx)?,
        el.text_children("except-voice", cx)?,
    ))
}

fn write_slash_content(element: &mut XmlElement, slash_type: &Option<NoteTypeValue>, dots: &[Empty], except_voices: &[String]) {
    element.opt_text_child("slash-type", slash_type);
    element.children("slash-dot", dots);
    element.text_children("except-voice", except_voices);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatRepeat {
    pub slash_type: Option<NoteTypeValue>,
    pub slash_dots: Vec<Empty>,
    pub except_voices: Vec<String>,
    pub slashes: Option<u32>,
    pub attributes: SlashAttributes,
}

impl FromXml for BeatRepeat {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let slashes = el.attr("slashes", cx)?;
        let (slash_type, slash_dots, except_voices) = read_slash_content(&mut el, cx)?;
        el.finish()?;
        Ok(Self {
            slash_type,
            slash_dots,
            except_voices,
            slashes,
            attributes,
        })
    }
}

impl ToXml for BeatRepeat {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.opt_attr("slashes", &self.slashes);
        write_slash_content(&mut element, &self.slash_type, &self.slash_dots, &self.except_voices);
        element
    }
}

/// Slash notation region; may nest a further slash region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slash {
    pub slash_type: Option<NoteTypeValue>,
    pub slash_dots: Vec<Empty>,
    pub except_voices: Vec<String>,
    pub slash: Option<Box<Slash>>,
    pub attributes: SlashAttributes,
}

impl FromXml for Slash {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let (slash_type, slash_dots, except_voices) = read_slash_content(&mut el, cx)?;
        let slash = el.child("slash", cx)?;
        el.finish()?;
        Ok(Self {
            slash_type,
            slash_dots,
            except_voices,
            slash,
            attributes,
        })
    }
}

impl ToXml for Slash {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        write_slash_content(&mut element, &self.slash_type, &self.slash_dots, &self.except_voices);
        element.opt_child("slash", &self.slash);
        element
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeasureStyleContent {
    MultipleRest(MultipleRest),
    MeasureRepeat(MeasureRepeat),
    BeatRepeat(BeatRepeat),
    Slash(Slash),
}

attribute_group! {
    MeasureStyleAttributes {
        number: StaffNumber => "number",
        color: Color => "color",
    }
    embeds {
        font: Font,
        id: OptionalUniqueId,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureStyle {
    pub content: MeasureStyleContent,
    pub attributes: MeasureStyleAttributes,
}

impl FromXml for MeasureStyle {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let content = if let Some(rest) = el.child("multiple-rest", cx)? {
            MeasureStyleContent::MultipleRest(rest)
        } else if let Some(repeat) = el.child("measure-repeat", cx)? {
            MeasureStyleContent::MeasureRepeat(repeat)
        } else if let Some(repeat) = el.child("beat-repeat", cx)? {
            MeasureStyleContent::BeatRepeat(repeat)
        } else if let Some(slash) = el.child("slash", cx)? {
            MeasureStyleContent::Slash(slash)
        } else {
            return Err(DecodeError::missing("multiple-rest"));
        };
        el.finish()?;
        Ok(Self { content, attributes })
    }
}

impl ToXml for MeasureStyle {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        match &self.content {
            MeasureStyleContent::MultipleRest(rest) => element.child("multiple-rest", rest),
            MeasureStyleContent::MeasureRepeat(repeat) => element.child("measure-repeat", repeat),
            MeasureStyleContent::BeatRepeat(repeat) => element.child("beat-repeat", repeat),
            MeasureStyleContent::Slash(slash) => element.child("slash", slash),
        }
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
    fn test_non_traditional_key_pairs_steps() {
        let key: Key = parse(
            "<key><key-step>B</key-step><key-alter>-1</key-alter><key-step>E</key-step><key-alter>-2</key-alter><key-accidental>flat-flat</key-accidental></key>",
        )
        .expect("key decode");

        let KeyContent::NonTraditional(steps) = &key.content else {
            panic!("expected non-traditional key, got {:?}", key.content);
        };
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].step, Step::B);
        assert!(steps[0].accidental.is_none());
        assert_eq!(steps[1].alter, Semitones(-2.0));
        assert_eq!(
            steps[1].accidental.as_ref().map(|a| a.value.clone()),
            Some(AccidentalValue::FlatFlat)
        );

        let element = key.to_xml("key");
        let tags: Vec<&str> = element.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(tags, vec!["key-step", "key-alter", "key-step", "key-alter", "key-accidental"]);
    }

    #[test]
    fn test_key_step_without_alter_fails() {
        let err = parse::<Key>("<key><key-step>B</key-step></key>").expect_err("alter is required");
        assert_eq!(
            err.kind(),
            &DecodeErrorKind::MissingRequiredField {
                field: "key-alter".to_string()
            }
        );
    }

    #[test]
    fn test_time_pairs_beats_in_order() {
        let time: Time = parse(
            r#"<time symbol="normal"><beats>3</beats><beat-type>8</beat-type><beats>2</beats><beat-type>4</beat-type></time>"#,
        )
        .expect("time decode");
        let TimeContent::Signatures { signatures, .. } = &time.content else {
            panic!("expected signatures");
        };
        assert_eq!(signatures, &vec![TimeSignature::new("3", "8"), TimeSignature::new("2", "4")]);
        assert_eq!(time.attributes.display.symbol, Some(TimeSymbol::Normal));
    }

    #[test]
    fn test_senza_misura() {
        let time: Time = parse("<time><senza-misura/></time>").expect("time decode");
        assert_eq!(time.content, TimeContent::SenzaMisura(String::new()));
        let element = time.to_xml("time");
        assert!(element.find("senza-misura").is_some());
    }

    #[test]
    fn test_nested_transpose() {
        let transpose: Transpose = parse(
            "<transpose><diatonic>-1</diatonic><chromatic>-2</chromatic><transpose><chromatic>-14</chromatic></transpose></transpose>",
        )
        .expect("transpose decode");
        let nested = transpose.transpose.as_ref().expect("nested transpose");
        assert_eq!(nested.chromatic, Semitones(-14.0));
        assert!(nested.transpose.is_none());
    }

    #[test]
    fn test_measure_style_requires_content() {
        let err = parse::<MeasureStyle>("<measure-style/>").expect_err("empty measure-style");
        assert!(matches!(err.kind(), DecodeErrorKind::MissingRequiredField { .. }));

        let style: MeasureStyle =
            parse(r#"<measure-style><measure-repeat type="stop"/></measure-style>"#).expect("measure-style decode");
        let MeasureStyleContent::MeasureRepeat(repeat) = &style.content else {
            panic!("expected measure-repeat");
        };
        assert_eq!(repeat.value, PositiveIntegerOrEmpty::Empty);
        assert_eq!(repeat.attributes.kind, StartStop::Stop);
    }

    #[test]
    fn test_nested_slash_region() {
        let style: MeasureStyle = parse(
            r#"<measure-style><slash type="start" use-stems="yes"><slash-type>quarter</slash-type><slash type="start"><slash-dot/></slash></slash></measure-style>"#,
        )
        .expect("measure-style decode");
        let MeasureStyleContent::Slash(outer) = &style.content else {
            panic!("expected slash, got {:?}", style.content);
        };
        assert_eq!(outer.slash_type, Some(NoteTypeValue::Quarter));
        assert_eq!(outer.attributes.use_stems, Some(YesNo::Yes));

        let inner = outer.slash.as_ref().expect("nested slash");
        assert_eq!(inner.attributes.kind, StartStop::Start);
        assert_eq!(inner.slash_dots.len(), 1);
        assert!(inner.slash.is_none());

        let element = outer.to_xml("slash");
        let nested = element.find("slash").expect("nested slash is written");
        assert_eq!(nested.elements().filter(|e| e.name == "slash").count(), 0, "innermost writes no slash child");
        let bytes = crate::xml::write_document(&element, None, None).expect("write should succeed");
        let text = String::from_utf8(bytes).expect("writer emits UTF-8");
        assert_eq!(parse::<Slash>(&text).expect("re-decode"), *outer);
    }
}
