//! Chord symbols, fretboard frames and figured bass

use super::common::*;
use super::groups::*;
use super::note::Extend;
use super::notations::{Fingering, Fret, StringMark};
use super::primitives::*;
use super::sound::Offset;
use crate::codec::{ChoiceItem, DecodeContext, DecodeError, DecodeResult, FromXml, ToXml};
use crate::xml::{ElementReader, XmlElement};
use roxmltree::Node;
use serde::{Deserialize, Serialize};

// ============================================================================
// CHORD COMPONENTS
// ============================================================================

attribute_group! {
    /// Displayed text replacing the computed one
    StepAttributes {
        text: String => "text",
    }
    embeds { print_style: PrintStyle }
}

pub type ChordStep = Valued<Step, StepAttributes>;

attribute_group! {
    ChordAlterAttributes {
        location: LeftRight => "location",
    }
    embeds { print_object: PrintObject, print_style: PrintStyle }
}

pub type ChordAlter = Valued<Semitones, ChordAlterAttributes>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub root_step: ChordStep,
    pub root_alter: Option<ChordAlter>,
}

impl FromXml for Root {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            root_step: el.req_child("root-step", cx)?,
            root_alter: el.child("root-alter", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Root {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.child("root-step", &self.root_step);
        element.opt_child("root-alter", &self.root_alter);
        element
    }
}

attribute_group! {
    KindAttributes {
        use_symbols: YesNo => "use-symbols",
        text: String => "text",
        stack_degrees: YesNo => "stack-degrees",
        parentheses_degrees: YesNo => "parentheses-degrees",
        bracket_degrees: YesNo => "bracket-degrees",
    }
    embeds { print_style_align: PrintStyleAlign }
}

pub type Kind = Valued<KindValue, KindAttributes>;

pub type Inversion = Valued<u32, StepAttributes>;

attribute_group! { BassAttributes { arrangement: HarmonyArrangement => "arrangement" } }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bass {
    pub bass_separator: Option<StyleText>,
    pub bass_step: ChordStep,
    pub bass_alter: Option<ChordAlter>,
    pub attributes: BassAttributes,
}

impl FromXml for Bass {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            bass_separator: el.child("bass-separator", cx)?,
            bass_step: el.req_child("bass-step", cx)?,
            bass_alter: el.child("bass-alter", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Bass {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.opt_child("bass-separator", &self.bass_separator);
        element.child("bass-step", &self.bass_step);
        element.opt_child("bass-alter", &self.bass_alter);
        element
    }
}

attribute_group! {
    DegreeValueAttributes {
        symbol: DegreeSymbolValue => "symbol",
        text: String => "text",
    }
    embeds { print_style: PrintStyle }
}

attribute_group! {
    DegreeAlterAttributes {
        plus_minus: YesNo => "plus-minus",
    }
    embeds { print_style: PrintStyle }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Degree {
    pub degree_value: Valued<u32, DegreeValueAttributes>,
    pub degree_alter: Valued<Semitones, DegreeAlterAttributes>,
    pub degree_type: Valued<DegreeTypeValue, StepAttributes>,
    pub print_object: PrintObject,
}

impl FromXml for Degree {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            print_object: el.group(cx)?,
            degree_value: el.req_child("degree-value", cx)?,
            degree_alter: el.req_child("degree-alter", cx)?,
            degree_type: el.req_child("degree-type", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Degree {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.print_object);
        element.child("degree-value", &self.degree_value);
        element.child("degree-alter", &self.degree_alter);
        element.child("degree-type", &self.degree_type);
        element
    }
}

// ============================================================================
// HARMONY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChordBase {
    Root(Root),
    /// Functional label such as `V`
    Function(StyleText),
}

/// One chord of a `harmony` element; polychords carry several
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonyChord {
    pub base: ChordBase,
    pub kind: Kind,
    pub inversion: Option<Inversion>,
    pub bass: Option<Bass>,
    pub degrees: Vec<Degree>,
}

impl HarmonyChord {
    pub fn new(step: Step, kind: KindValue) -> Self {
        Self {
            base: ChordBase::Root(Root {
                root_step: Valued::new(step),
                root_alter: None,
            }),
            kind: Valued::new(kind),
            inversion: None,
            bass: None,
            degrees: Vec::new(),
        }
    }

    fn write(&self, element: &mut XmlElement) {
        match &self.base {
            ChordBase::Root(root) => element.child("root", root),
            ChordBase::Function(function) => element.child("function", function),
        }
        element.child("kind", &self.kind);
        element.opt_child("inversion", &self.inversion);
        element.opt_child("bass", &self.bass);
        element.children("degree", &self.degrees);
    }
}

enum ChordPart {
    Base(ChordBase),
    Kind(Kind),
    Inversion(Inversion),
    Bass(Bass),
    Degree(Degree),
}

impl ChoiceItem for ChordPart {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let part = match name {
            "root" => FromXml::from_xml(node, cx).map(|root| ChordPart::Base(ChordBase::Root(root))),
            "function" => FromXml::from_xml(node, cx).map(|f| ChordPart::Base(ChordBase::Function(f))),
            "kind" => FromXml::from_xml(node, cx).map(ChordPart::Kind),
            "inversion" => FromXml::from_xml(node, cx).map(ChordPart::Inversion),
            "bass" => FromXml::from_xml(node, cx).map(ChordPart::Bass),
            "degree" => FromXml::from_xml(node, cx).map(ChordPart::Degree),
            _ => return None,
        };
        Some(part)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            ChordPart::Base(ChordBase::Root(root)) => root.to_xml("root"),
            ChordPart::Base(ChordBase::Function(function)) => function.to_xml("function"),
            ChordPart::Kind(kind) => kind.to_xml("kind"),
            ChordPart::Inversion(inversion) => inversion.to_xml("inversion"),
            ChordPart::Bass(bass) => bass.to_xml("bass"),
            ChordPart::Degree(degree) => degree.to_xml("degree"),
        }
    }
}

/// Split the flat chord sequence at each root or function
fn group_chords(parts: Vec<ChordPart>) -> DecodeResult<Vec<HarmonyChord>> {
    let mut chords = Vec::new();
    let mut base: Option<ChordBase> = None;
    let mut current: Option<HarmonyChord> = None;

    for part in parts {
        match part {
            ChordPart::Base(next) => {
                if base.is_some() {
                    return Err(DecodeError::missing("kind"));
                }
                chords.extend(current.take());
                base = Some(next);
            }
            ChordPart::Kind(kind) => match base.take() {
                Some(base) => {
                    current = Some(HarmonyChord {
                        base,
                        kind,
                        inversion: None,
                        bass: None,
                        degrees: Vec::new(),
                    })
                }
                None => return Err(DecodeError::unexpected("kind")),
            },
            ChordPart::Inversion(inversion) => match current.as_mut() {
                Some(chord) if chord.inversion.is_none() => chord.inversion = Some(inversion),
                _ => return Err(DecodeError::unexpected("inversion")),
            },
            ChordPart::Bass(bass) => match current.as_mut() {
                Some(chord) if chord.bass.is_none() => chord.bass = Some(bass),
                _ => return Err(DecodeError::unexpected("bass")),
            },
            ChordPart::Degree(degree) => match current.as_mut() {
                Some(chord) => chord.degrees.push(degree),
                None => return Err(DecodeError::unexpected("degree")),
            },
        }
    }

    if base.is_some() {
        return Err(DecodeError::missing("kind"));
    }
    chords.extend(current);
    if chords.is_empty() {
        return Err(DecodeError::missing("root"));
    }
    Ok(chords)
}

attribute_group! {
    HarmonyAttributes {
        kind: HarmonyType => "type",
        print_frame: YesNo => "print-frame",
        arrangement: HarmonyArrangement => "arrangement",
        system: SystemRelation => "system",
    }
    embeds {
        print_object: PrintObject,
        print_style: PrintStyle,
        placement: Placement,
        id: OptionalUniqueId,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harmony {
    pub chords: Vec<HarmonyChord>,
    pub frame: Option<Frame>,
    pub offset: Option<Offset>,
    pub editorial: Editorial,
    pub staff: Option<StaffNumber>,
    pub attributes: HarmonyAttributes,
}

impl Harmony {
    pub fn chord(step: Step, kind: KindValue) -> Self {
        Self {
            chords: vec![HarmonyChord::new(step, kind)],
            frame: None,
            offset: None,
            editorial: Editorial::default(),
            staff: None,
            attributes: HarmonyAttributes::default(),
        }
    }
}

impl FromXml for Harmony {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let frame = el.child("frame", cx)?;
        let offset = el.child("offset", cx)?;
        let editorial = Editorial::read(&mut el, cx)?;
        let staff = el.text_child("staff", cx)?;
        let chords = group_chords(el.choices(cx)?)?;
        el.finish()?;
        Ok(Self {
            chords,
            frame,
            offset,
            editorial,
            staff,
            attributes,
        })
    }
}

impl ToXml for Harmony {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        for chord in &self.chords {
            chord.write(&mut element);
        }
        element.opt_child("frame", &self.frame);
        element.opt_child("offset", &self.offset);
        self.editorial.write(&mut element);
        element.opt_text_child("staff", &self.staff);
        element
    }
}

// ============================================================================
// FRAME
// ============================================================================

attribute_group! {
    Barre {
        required { kind: StartStop => "type" }
        color: Color => "color",
    }
}

empty_element!(Barre);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameNote {
    pub string: StringMark,
    pub fret: Fret,
    pub fingering: Option<Fingering>,
    pub barre: Option<Barre>,
}

impl FromXml for FrameNote {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            string: el.req_child("string", cx)?,
            fret: el.req_child("fret", cx)?,
            fingering: el.child("fingering", cx)?,
            barre: el.child("barre", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for FrameNote {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.child("string", &self.string);
        element.child("fret", &self.fret);
        element.opt_child("fingering", &self.fingering);
        element.opt_child("barre", &self.barre);
        element
    }
}

attribute_group! {
    FirstFretAttributes {
        text: String => "text",
        location: LeftRight => "location",
    }
}

attribute_group! {
    FrameAttributes {
        height: Tenths => "height",
        width: Tenths => "width",
        unplayed: String => "unplayed",
        color: Color => "color",
        halign: LeftCenterRight => "halign",
        valign: ValignImage => "valign",
    }
    embeds {
        position: Position,
        id: OptionalUniqueId,
    }
}

/// Fretboard diagram of a chord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub frame_strings: u32,
    pub frame_frets: u32,
    pub first_fret: Option<Valued<u32, FirstFretAttributes>>,
    pub frame_notes: Vec<FrameNote>,
    pub attributes: FrameAttributes,
}

impl FromXml for Frame {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            frame_strings: el.req_text_child("frame-strings", cx)?,
            frame_frets: el.req_text_child("frame-frets", cx)?,
            first_fret: el.child("first-fret", cx)?,
            frame_notes: el.children("frame-note", cx)?,
        };
        if value.frame_notes.is_empty() {
            return Err(DecodeError::missing("frame-note"));
        }
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Frame {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.text_child("frame-strings", &self.frame_strings);
        element.text_child("frame-frets", &self.frame_frets);
        element.opt_child("first-fret", &self.first_fret);
        element.children("frame-note", &self.frame_notes);
        element
    }
}

// ============================================================================
// FIGURED BASS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub prefix: Option<StyleText>,
    pub figure_number: Option<StyleText>,
    pub suffix: Option<StyleText>,
    pub extend: Option<Extend>,
    pub editorial: Editorial,
}

impl FromXml for Figure {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            prefix: el.child("prefix", cx)?,
            figure_number: el.child("figure-number", cx)?,
            suffix: el.child("suffix", cx)?,
            extend: el.child("extend", cx)?,
            editorial: Editorial::read(&mut el, cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Figure {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.opt_child("prefix", &self.prefix);
        element.opt_child("figure-number", &self.figure_number);
        element.opt_child("suffix", &self.suffix);
        element.opt_child("extend", &self.extend);
        self.editorial.write(&mut element);
        element
    }
}

attribute_group! {
    FiguredBassAttributes {
        parentheses: YesNo => "parentheses",
    }
    embeds {
        print_style_align: PrintStyleAlign,
        placement: Placement,
        printout: Printout,
        id: OptionalUniqueId,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiguredBass {
    pub figures: Vec<Figure>,
    pub duration: Option<PositiveDivisions>,
    pub editorial: Editorial,
    pub attributes: FiguredBassAttributes,
}

impl FromXml for FiguredBass {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            figures: el.children("figure", cx)?,
            duration: el.text_child("duration", cx)?,
            editorial: Editorial::read(&mut el, cx)?,
        };
        if value.figures.is_empty() {
            return Err(DecodeError::missing("figure"));
        }
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for FiguredBass {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.children("figure", &self.figures);
        element.opt_text_child("duration", &self.duration);
        self.editorial.write(&mut element);
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
    fn test_harmony_with_bass_and_degree() {
        let harmony: Harmony = parse(
            r#"<harmony print-frame="no"><root><root-step>G</root-step></root><kind text="7">dominant</kind><bass><bass-step>B</bass-step></bass><degree><degree-value>9</degree-value><degree-alter>-1</degree-alter><degree-type>add</degree-type></degree><staff>1</staff></harmony>"#,
        )
        .expect("harmony decode");

        assert_eq!(harmony.chords.len(), 1);
        let chord = &harmony.chords[0];
        assert!(matches!(&chord.base, ChordBase::Root(root) if root.root_step.value == Step::G));
        assert_eq!(chord.kind.value, KindValue::Dominant);
        assert_eq!(chord.bass.as_ref().map(|b| &b.bass_step.value), Some(&Step::B));
        assert_eq!(chord.degrees[0].degree_alter.value, Semitones(-1.0));

        let element = harmony.to_xml("harmony");
        let tags: Vec<&str> = element.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(tags, vec!["root", "kind", "bass", "degree", "staff"]);
    }

    #[test]
    fn test_polychord_splits_at_each_root() {
        let harmony: Harmony = parse(
            "<harmony><root><root-step>C</root-step></root><kind>major</kind><root><root-step>D</root-step></root><kind>minor</kind></harmony>",
        )
        .expect("polychord decode");
        assert_eq!(harmony.chords.len(), 2);
        assert_eq!(harmony.chords[1].kind.value, KindValue::Minor);
    }

    #[test]
    fn test_root_without_kind_is_rejected() {
        let err = parse::<Harmony>("<harmony><root><root-step>C</root-step></root></harmony>")
            .expect_err("kind is required");
        assert_eq!(err.to_string(), "missing required field kind at harmony");
    }

    #[test]
    fn test_figured_bass_figures() {
        let figured: FiguredBass = parse(
            "<figured-bass><figure><figure-number>6</figure-number></figure><figure><prefix>flat</prefix><figure-number>4</figure-number></figure><duration>2</duration></figured-bass>",
        )
        .expect("figured-bass decode");
        assert_eq!(figured.figures.len(), 2);
        assert_eq!(figured.figures[1].prefix.as_ref().map(|p| p.value.as_str()), Some("flat"));
        assert_eq!(figured.duration, Some(PositiveDivisions(2.0)));
    }
}
