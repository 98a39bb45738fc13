//! Notes, rests and the cursor-movement elements `backup` and `forward`
//!
//! A note's sounding content is a [`FullNote`]: a chord flag plus exactly
//! one of pitch, unpitched or rest. Rest-specific and pitch-specific data
//! therefore cannot be mixed.

use super::common::*;
use super::groups::*;
use super::notations::Notations;
use super::primitives::*;
use crate::codec::{ChoiceItem, DecodeContext, DecodeError, DecodeResult, FromXml, ToXml};
use crate::xml::{ElementReader, XmlElement};
use roxmltree::Node;
use serde::{Deserialize, Serialize};

// ============================================================================
// FULL NOTE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    pub step: Step,
    pub alter: Option<Semitones>,
    pub octave: Octave,
}

impl Pitch {
    pub fn new(step: Step, octave: i32) -> Self {
        Self {
            step,
            alter: None,
            octave: Octave(octave),
        }
    }
}

impl FromXml for Pitch {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            step: el.req_text_child("step", cx)?,
            alter: el.text_child("alter", cx)?,
            octave: el.req_text_child("octave", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Pitch {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.text_child("step", &self.step);
        element.opt_text_child("alter", &self.alter);
        element.text_child("octave", &self.octave);
        element
    }
}

/// Staff position of an unpitched note or a positioned rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayStepOctave {
    pub display_step: Step,
    pub display_octave: Octave,
}

fn read_display_position(
    el: &mut ElementReader<'_, '_>,
    cx: &mut DecodeContext,
) -> DecodeResult<Option<DisplayStepOctave>> {
    let step: Option<Step> = el.text_child("display-step", cx)?;
    let octave: Option<Octave> = el.text_child("display-octave", cx)?;
    match (step, octave) {
        (Some(display_step), Some(display_octave)) => Ok(Some(DisplayStepOctave {
            display_step,
            display_octave,
        })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(DecodeError::missing("display-octave")),
        (None, Some(_)) => Err(DecodeError::missing("display-step")),
    }
}

fn write_display_position(element: &mut XmlElement, position: &Option<DisplayStepOctave>) {
    if let Some(position) = position {
        element.text_child("display-step", &position.display_step);
        element.text_child("display-octave", &position.display_octave);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unpitched {
    pub display: Option<DisplayStepOctave>,
}

impl FromXml for Unpitched {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let display = read_display_position(&mut el, cx)?;
        el.finish()?;
        Ok(Self { display })
    }
}

impl ToXml for Unpitched {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        write_display_position(&mut element, &self.display);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub display: Option<DisplayStepOctave>,
    /// Whole-measure rest regardless of time signature
    pub measure: Option<YesNo>,
}

impl FromXml for Rest {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let measure = el.attr("measure", cx)?;
        let display = read_display_position(&mut el, cx)?;
        el.finish()?;
        Ok(Self { display, measure })
    }
}

impl ToXml for Rest {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.opt_attr("measure", &self.measure);
        write_display_position(&mut element, &self.display);
        element
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FullNoteContent {
    Pitch(Pitch),
    Unpitched(Unpitched),
    Rest(Rest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullNote {
    /// Sounds together with the previous note
    pub chord: bool,
    pub content: FullNoteContent,
}

impl FullNote {
    pub fn pitch(&self) -> Option<&Pitch> {
        match &self.content {
            FullNoteContent::Pitch(pitch) => Some(pitch),
            _ => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self.content, FullNoteContent::Rest(_))
    }

    fn read(el: &mut ElementReader<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let chord = el.flag("chord");
        let pitch: Option<Pitch> = el.child("pitch", cx)?;
        let unpitched: Option<Unpitched> = el.child("unpitched", cx)?;
        let rest: Option<Rest> = el.child("rest", cx)?;

        let content = match (pitch, unpitched, rest) {
            (Some(pitch), None, None) => FullNoteContent::Pitch(pitch),
            (None, Some(unpitched), None) => FullNoteContent::Unpitched(unpitched),
            (None, None, Some(rest)) => FullNoteContent::Rest(rest),
            (None, None, None) => return Err(DecodeError::missing("pitch")),
            (_, Some(_), _) => return Err(DecodeError::unexpected("unpitched")),
            (Some(_), None, Some(_)) => return Err(DecodeError::unexpected("rest")),
        };
        Ok(Self { chord, content })
    }

    fn write(&self, element: &mut XmlElement) {
        element.flag("chord", self.chord);
        match &self.content {
            FullNoteContent::Pitch(pitch) => element.child("pitch", pitch),
            FullNoteContent::Unpitched(unpitched) => element.child("unpitched", unpitched),
            FullNoteContent::Rest(rest) => element.child("rest", rest),
        }
    }
}

// ============================================================================
// GRACE, CUE, TIE
// ============================================================================

attribute_group! {
    Grace {
        steal_time_previous: Percent => "steal-time-previous",
        steal_time_following: Percent => "steal-time-following",
        make_time: Divisions => "make-time",
        slash: YesNo => "slash",
    }
}

attribute_group! {
    /// Sound of a tie; the notated curve is `notations/tied`
    Tie {
        required { kind: StartStop => "type" }
        time_only: TimeOnly => "time-only",
    }
}

empty_element!(Grace, Tie);

impl Tie {
    pub fn new(kind: StartStop) -> Self {
        Self { kind, time_only: None }
    }
}

/// How the note takes part in the measure's time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NoteKind {
    Regular {
        duration: PositiveDivisions,
        ties: Vec<Tie>,
    },
    /// Grace notes have no duration; a cue grace note has no ties
    Grace {
        grace: Grace,
        cue: bool,
        ties: Vec<Tie>,
    },
    Cue {
        duration: PositiveDivisions,
    },
}

impl NoteKind {
    pub fn duration(&self) -> Option<PositiveDivisions> {
        match self {
            NoteKind::Regular { duration, .. } | NoteKind::Cue { duration } => Some(*duration),
            NoteKind::Grace { .. } => None,
        }
    }

    pub fn ties(&self) -> &[Tie] {
        match self {
            NoteKind::Regular { ties, .. } | NoteKind::Grace { ties, .. } => ties,
            NoteKind::Cue { .. } => &[],
        }
    }
}

// ============================================================================
// NOTE DETAILS
// ============================================================================

attribute_group! { Instrument { required { id: String => "id" } } }

empty_element!(Instrument);

attribute_group! { NoteTypeAttributes { size: SymbolSize => "size" } }

pub type NoteType = Valued<NoteTypeValue, NoteTypeAttributes>;

attribute_group! {
    AccidentalAttributes {
        cautionary: YesNo => "cautionary",
        editorial: YesNo => "editorial",
    }
    embeds {
        level_display: LevelDisplay,
        print_style: PrintStyle,
        smufl: Smufl,
    }
}

pub type Accidental = Valued<AccidentalValue, AccidentalAttributes>;

/// Tuplet ratio of a note, e.g. 3 in the time of 2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeModification {
    pub actual_notes: u32,
    pub normal_notes: u32,
    pub normal_type: Option<NoteTypeValue>,
    pub normal_dots: Vec<Empty>,
}

impl FromXml for TimeModification {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            actual_notes: el.req_text_child("actual-notes", cx)?,
            normal_notes: el.req_text_child("normal-notes", cx)?,
            normal_type: el.text_child("normal-type", cx)?,
            normal_dots: el.children("normal-dot", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for TimeModification {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.text_child("actual-notes", &self.actual_notes);
        element.text_child("normal-notes", &self.normal_notes);
        element.opt_text_child("normal-type", &self.normal_type);
        element.children("normal-dot", &self.normal_dots);
        element
    }
}

attribute_group! {
    StemAttributes {
        color: Color => "color",
    }
    embeds { position: Position }
}

pub type Stem = Valued<StemValue, StemAttributes>;

attribute_group! {
    NoteheadAttributes {
        filled: YesNo => "filled",
        parentheses: YesNo => "parentheses",
        color: Color => "color",
    }
    embeds { font: Font, smufl: Smufl }
}

pub type Notehead = Valued<NoteheadValue, NoteheadAttributes>;

/// Text shown inside a notehead
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteheadText {
    pub items: Vec<NameDisplayItem>,
}

impl FromXml for NoteheadText {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let items = el.choices(cx)?;
        el.finish()?;
        Ok(Self { items })
    }
}

impl ToXml for NoteheadText {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        for item in &self.items {
            element.push(item.to_element());
        }
        element
    }
}

attribute_group! {
    BeamAttributes {
        number: BeamLevel => "number",
        repeater: YesNo => "repeater",
        fan: Fan => "fan",
        color: Color => "color",
    }
    embeds { id: OptionalUniqueId }
}

pub type Beam = Valued<BeamValue, BeamAttributes>;

// ============================================================================
// LYRIC
// ============================================================================

attribute_group! {
    ElisionAttributes {
        color: Color => "color",
    }
    embeds { font: Font, smufl: Smufl }
}

pub type Elision = Valued<String, ElisionAttributes>;

attribute_group! {
    Extend {
        kind: StartStopContinue => "type",
    }
    embeds { print_style: PrintStyle }
}

empty_element!(Extend);

/// Lyric content in document order; syllables, elisions and extenders interleave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LyricItem {
    Syllabic(Syllabic),
    Text(TextElementData),
    Elision(Elision),
    Extend(Extend),
    Laughing(Empty),
    Humming(Empty),
}

impl ChoiceItem for LyricItem {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "syllabic" => <Valued<Syllabic>>::from_xml(node, cx).map(|v| LyricItem::Syllabic(v.value)),
            "text" => FromXml::from_xml(node, cx).map(LyricItem::Text),
            "elision" => FromXml::from_xml(node, cx).map(LyricItem::Elision),
            "extend" => FromXml::from_xml(node, cx).map(LyricItem::Extend),
            "laughing" => FromXml::from_xml(node, cx).map(LyricItem::Laughing),
            "humming" => FromXml::from_xml(node, cx).map(LyricItem::Humming),
            _ => return None,
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            LyricItem::Syllabic(syllabic) => XmlElement::with_text("syllabic", syllabic.as_str()),
            LyricItem::Text(text) => text.to_xml("text"),
            LyricItem::Elision(elision) => elision.to_xml("elision"),
            LyricItem::Extend(extend) => extend.to_xml("extend"),
            LyricItem::Laughing(empty) => empty.to_xml("laughing"),
            LyricItem::Humming(empty) => empty.to_xml("humming"),
        }
    }
}

attribute_group! {
    LyricAttributes {
        number: String => "number",
        name: String => "name",
        justify: LeftCenterRight => "justify",
        color: Color => "color",
        time_only: TimeOnly => "time-only",
    }
    embeds {
        position: Position,
        placement: Placement,
        print_object: PrintObject,
        id: OptionalUniqueId,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lyric {
    pub items: Vec<LyricItem>,
    pub end_line: bool,
    pub end_paragraph: bool,
    pub editorial: Editorial,
    pub attributes: LyricAttributes,
}

impl Lyric {
    /// Single-syllable lyric
    pub fn syllable(syllabic: Syllabic, text: impl Into<String>) -> Self {
        Self {
            items: vec![LyricItem::Syllabic(syllabic), LyricItem::Text(Valued::new(text.into()))],
            ..Self::default()
        }
    }

    /// Concatenated text of all syllables
    pub fn text(&self) -> String {
        self.items
            .iter()
            .filter_map(|item| match item {
                LyricItem::Text(text) => Some(text.value.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl FromXml for Lyric {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let end_line = el.flag("end-line");
        let end_paragraph = el.flag("end-paragraph");
        let editorial = Editorial::read(&mut el, cx)?;
        let items = el.choices(cx)?;
        el.finish()?;
        Ok(Self {
            items,
            end_line,
            end_paragraph,
            editorial,
            attributes,
        })
    }
}

impl ToXml for Lyric {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        for item in &self.items {
            element.push(item.to_element());
        }
        element.flag("end-line", self.end_line);
        element.flag("end-paragraph", self.end_paragraph);
        self.editorial.write(&mut element);
        element
    }
}

// ============================================================================
// PLAY AND LISTEN
// ============================================================================

/// Playback technique for one note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayItem {
    Ipa(String),
    Mute(Mute),
    SemiPitched(SemiPitched),
    OtherPlay(TypedText),
}

impl ChoiceItem for PlayItem {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "ipa" => <Valued<String>>::from_xml(node, cx).map(|v| PlayItem::Ipa(v.value)),
            "mute" => <Valued<Mute>>::from_xml(node, cx).map(|v| PlayItem::Mute(v.value)),
            "semi-pitched" => <Valued<SemiPitched>>::from_xml(node, cx).map(|v| PlayItem::SemiPitched(v.value)),
            "other-play" => FromXml::from_xml(node, cx).map(PlayItem::OtherPlay),
            _ => return None,
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            PlayItem::Ipa(ipa) => XmlElement::with_text("ipa", ipa.as_str()),
            PlayItem::Mute(mute) => XmlElement::with_text("mute", mute.as_str()),
            PlayItem::SemiPitched(pitch) => XmlElement::with_text("semi-pitched", pitch.as_str()),
            PlayItem::OtherPlay(other) => other.to_xml("other-play"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub items: Vec<PlayItem>,
    pub id: Option<String>,
}

impl FromXml for Play {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let id = el.attr("id", cx)?;
        let items = el.choices(cx)?;
        el.finish()?;
        Ok(Self { items, id })
    }
}

impl ToXml for Play {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.opt_attr("id", &self.id);
        for item in &self.items {
            element.push(item.to_element());
        }
        element
    }
}

attribute_group! {
    PlayerTiming {
        player: String => "player",
        time_only: TimeOnly => "time-only",
    }
}

attribute_group! {
    Assess {
        required { kind: YesNo => "type" }
    }
    embeds { timing: PlayerTiming }
}

empty_element!(Assess, PlayerTiming);

attribute_group! {
    OtherListeningAttributes {
        required { kind: String => "type" }
    }
    embeds { timing: PlayerTiming }
}

/// Listening hint whose meaning is defined by its `type`
pub type OtherListening = Valued<String, OtherListeningAttributes>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ListenItem {
    Assess(Assess),
    /// Wait for an external cue before continuing
    Wait(PlayerTiming),
    OtherListen(OtherListening),
}

impl ChoiceItem for ListenItem {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "assess" => FromXml::from_xml(node, cx).map(ListenItem::Assess),
            "wait" => FromXml::from_xml(node, cx).map(ListenItem::Wait),
            "other-listen" => FromXml::from_xml(node, cx).map(ListenItem::OtherListen),
            _ => return None,
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            ListenItem::Assess(assess) => assess.to_xml("assess"),
            ListenItem::Wait(wait) => wait.to_xml("wait"),
            ListenItem::OtherListen(other) => other.to_xml("other-listen"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listen {
    pub items: Vec<ListenItem>,
}

impl FromXml for Listen {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let items = el.choices(cx)?;
        if items.is_empty() {
            return Err(DecodeError::missing("assess"));
        }
        el.finish()?;
        Ok(Self { items })
    }
}

impl ToXml for Listen {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        for item in &self.items {
            element.push(item.to_element());
        }
        element
    }
}

// ============================================================================
// NOTE
// ============================================================================

attribute_group! {
    NoteAttributes {
        print_leger: YesNo => "print-leger",
        dynamics: NonNegativeDecimal => "dynamics",
        end_dynamics: NonNegativeDecimal => "end-dynamics",
        attack: Divisions => "attack",
        release: Divisions => "release",
        time_only: TimeOnly => "time-only",
        pizzicato: YesNo => "pizzicato",
    }
    embeds {
        print_style: PrintStyle,
        printout: Printout,
        id: OptionalUniqueId,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub kind: NoteKind,
    pub full_note: FullNote,
    pub instruments: Vec<Instrument>,
    pub editorial: Editorial,
    pub voice: Option<String>,
    pub note_type: Option<NoteType>,
    pub dots: Vec<EmptyPlacement>,
    pub accidental: Option<Accidental>,
    pub time_modification: Option<TimeModification>,
    pub stem: Option<Stem>,
    pub notehead: Option<Notehead>,
    pub notehead_text: Option<NoteheadText>,
    pub staff: Option<StaffNumber>,
    pub beams: Vec<Beam>,
    pub notations: Vec<Notations>,
    pub lyrics: Vec<Lyric>,
    pub play: Option<Play>,
    pub listen: Option<Listen>,
    pub attributes: NoteAttributes,
}

impl Note {
    fn with_content(content: FullNoteContent, duration: f64) -> Self {
        Self {
            kind: NoteKind::Regular {
                duration: PositiveDivisions(duration),
                ties: Vec::new(),
            },
            full_note: FullNote { chord: false, content },
            instruments: Vec::new(),
            editorial: Editorial::default(),
            voice: None,
            note_type: None,
            dots: Vec::new(),
            accidental: None,
            time_modification: None,
            stem: None,
            notehead: None,
            notehead_text: None,
            staff: None,
            beams: Vec::new(),
            notations: Vec::new(),
            lyrics: Vec::new(),
            play: None,
            listen: None,
            attributes: NoteAttributes::default(),
        }
    }

    /// Regular pitched note with the given duration in divisions
    pub fn pitched(step: Step, octave: i32, duration: f64) -> Self {
        Self::with_content(FullNoteContent::Pitch(Pitch::new(step, octave)), duration)
    }

    pub fn rest(duration: f64) -> Self {
        Self::with_content(FullNoteContent::Rest(Rest::default()), duration)
    }

    pub fn unpitched(duration: f64) -> Self {
        Self::with_content(FullNoteContent::Unpitched(Unpitched::default()), duration)
    }

    pub fn with_type(mut self, value: NoteTypeValue) -> Self {
        self.note_type = Some(Valued::new(value));
        self
    }

    pub fn with_alter(mut self, semitones: f64) -> Self {
        if let FullNoteContent::Pitch(pitch) = &mut self.full_note.content {
            pitch.alter = Some(Semitones(semitones));
        }
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_staff(mut self, staff: u32) -> Self {
        self.staff = Some(StaffNumber(staff));
        self
    }

    pub fn with_dots(mut self, count: usize) -> Self {
        self.dots = vec![EmptyPlacement::default(); count];
        self
    }

    /// Mark this note as sounding with the previous one
    pub fn in_chord(mut self) -> Self {
        self.full_note.chord = true;
        self
    }

    pub fn with_lyric(mut self, lyric: Lyric) -> Self {
        self.lyrics.push(lyric);
        self
    }

    pub fn duration(&self) -> Option<PositiveDivisions> {
        self.kind.duration()
    }

    pub fn pitch(&self) -> Option<&Pitch> {
        self.full_note.pitch()
    }
}

impl FromXml for Note {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;

        let grace: Option<Grace> = el.child("grace", cx)?;
        let cue = el.flag("cue");
        let full_note = FullNote::read(&mut el, cx)?;
        let kind = match grace {
            Some(grace) => {
                let ties = if cue { Vec::new() } else { el.children("tie", cx)? };
                NoteKind::Grace { grace, cue, ties }
            }
            None if cue => NoteKind::Cue {
                duration: el.req_text_child("duration", cx)?,
            },
            None => NoteKind::Regular {
                duration: el.req_text_child("duration", cx)?,
                ties: el.children("tie", cx)?,
            },
        };

        let value = Self {
            kind,
            full_note,
            instruments: el.children("instrument", cx)?,
            editorial: Editorial::read(&mut el, cx)?,
            voice: el.text_child("voice", cx)?,
            note_type: el.child("type", cx)?,
            dots: el.children("dot", cx)?,
            accidental: el.child("accidental", cx)?,
            time_modification: el.child("time-modification", cx)?,
            stem: el.child("stem", cx)?,
            notehead: el.child("notehead", cx)?,
            notehead_text: el.child("notehead-text", cx)?,
            staff: el.text_child("staff", cx)?,
            beams: el.children("beam", cx)?,
            notations: el.children("notations", cx)?,
            lyrics: el.children("lyric", cx)?,
            play: el.child("play", cx)?,
            listen: el.child("listen", cx)?,
            attributes,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Note {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);

        match &self.kind {
            NoteKind::Regular { duration, ties } => {
                self.full_note.write(&mut element);
                element.text_child("duration", duration);
                element.children("tie", ties);
            }
            NoteKind::Grace { grace, cue, ties } => {
                element.child("grace", grace);
                element.flag("cue", *cue);
                self.full_note.write(&mut element);
                element.children("tie", ties);
            }
            NoteKind::Cue { duration } => {
                element.flag("cue", true);
                self.full_note.write(&mut element);
                element.text_child("duration", duration);
            }
        }

        element.children("instrument", &self.instruments);
        self.editorial.write(&mut element);
        element.opt_text_child("voice", &self.voice);
        element.opt_child("type", &self.note_type);
        element.children("dot", &self.dots);
        element.opt_child("accidental", &self.accidental);
        element.opt_child("time-modification", &self.time_modification);
        element.opt_child("stem", &self.stem);
        element.opt_child("notehead", &self.notehead);
        element.opt_child("notehead-text", &self.notehead_text);
        element.opt_text_child("staff", &self.staff);
        element.children("beam", &self.beams);
        element.children("notations", &self.notations);
        element.children("lyric", &self.lyrics);
        element.opt_child("play", &self.play);
        element.opt_child("listen", &self.listen);
        element
    }
}

// ============================================================================
// BACKUP AND FORWARD
// ============================================================================

/// Move the time cursor back, typically to start another voice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub duration: PositiveDivisions,
    pub editorial: Editorial,
}

impl Backup {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: PositiveDivisions(duration),
            editorial: Editorial::default(),
        }
    }
}

impl FromXml for Backup {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            duration: el.req_text_child("duration", cx)?,
            editorial: Editorial::read(&mut el, cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Backup {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.text_child("duration", &self.duration);
        self.editorial.write(&mut element);
        element
    }
}

/// Move the time cursor forward without sounding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forward {
    pub duration: PositiveDivisions,
    pub editorial: Editorial,
    pub voice: Option<String>,
    pub staff: Option<StaffNumber>,
}

impl Forward {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: PositiveDivisions(duration),
            editorial: Editorial::default(),
            voice: None,
            staff: None,
        }
    }
}

impl FromXml for Forward {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            duration: el.req_text_child("duration", cx)?,
            editorial: Editorial::read(&mut el, cx)?,
            voice: el.text_child("voice", cx)?,
            staff: el.text_child("staff", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Forward {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.text_child("duration", &self.duration);
        self.editorial.write(&mut element);
        element.opt_text_child("voice", &self.voice);
        element.opt_text_child("staff", &self.staff);
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
    fn test_rest_note() {
        let note: Note = parse(r#"<note><rest measure="yes"/><duration>16</duration><voice>1</voice></note>"#)
            .expect("note decode");
        assert!(note.full_note.is_rest());
        assert!(note.pitch().is_none());
        assert_eq!(note.duration(), Some(PositiveDivisions(16.0)));
    }

    #[test]
    fn test_grace_note_has_no_duration() {
        let note: Note = parse(
            r#"<note><grace slash="yes"/><pitch><step>D</step><octave>5</octave></pitch><type>eighth</type></note>"#,
        )
        .expect("grace note decode");
        assert!(matches!(note.kind, NoteKind::Grace { cue: false, .. }));
        assert_eq!(note.duration(), None);

        let element = note.to_xml("note");
        let tags: Vec<&str> = element.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(tags, vec!["grace", "pitch", "type"]);
    }

    #[test]
    fn test_two_full_note_forms_are_rejected() {
        let err = parse::<Note>(
            "<note><pitch><step>C</step><octave>4</octave></pitch><rest/><duration>1</duration></note>",
        )
        .expect_err("pitch and rest together");
        assert_eq!(err.kind(), &DecodeErrorKind::UnexpectedElement { name: "rest".to_string() });
        assert_eq!(err.path().to_string(), "note");
    }

    #[test]
    fn test_chord_flag_and_ties() {
        let note: Note = parse(
            r#"<note><chord/><pitch><step>E</step><octave>4</octave></pitch><duration>4</duration><tie type="stop"/><tie type="start"/></note>"#,
        )
        .expect("note decode");
        assert!(note.full_note.chord);
        let ties: Vec<&StartStop> = note.kind.ties().iter().map(|t| &t.kind).collect();
        assert_eq!(ties, vec![&StartStop::Stop, &StartStop::Start]);
    }

    #[test]
    fn test_lyric_items_keep_order() {
        let lyric: Lyric = parse(
            r#"<lyric number="1"><syllabic>begin</syllabic><text>Glo</text><elision>_</elision><syllabic>end</syllabic><text>ri</text><extend/></lyric>"#,
        )
        .expect("lyric decode");
        assert_eq!(lyric.text(), "Glori");
        assert_eq!(lyric.items.len(), 6);
        assert!(matches!(lyric.items[5], LyricItem::Extend(_)));
    }

    #[test]
    fn test_builder_note_encodes_in_schema_order() {
        let note = Note::pitched(Step::F, 4, 2.0)
            .with_alter(1.0)
            .with_voice("1")
            .with_type(NoteTypeValue::Eighth)
            .with_dots(1)
            .with_staff(1);
        let element = note.to_xml("note");
        let tags: Vec<&str> = element.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(tags, vec!["pitch", "duration", "voice", "type", "dot", "staff"]);
        let pitch = element.find("pitch").expect("pitch element");
        assert_eq!(pitch.find("alter").map(|a| a.text()), Some("1".to_string()));
    }
}
