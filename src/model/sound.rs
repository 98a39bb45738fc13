//! Playback: `sound`, `listening`, and the instrument descriptions they share
//! with `score-instrument`

use super::common::*;
use super::note::{OtherListening, Play, PlayerTiming};
use super::primitives::*;
use crate::codec::{ChoiceItem, DecodeContext, DecodeError, DecodeResult, FromXml, ToXml};
use crate::xml::{ElementReader, XmlElement};
use roxmltree::Node;
use serde::{Deserialize, Serialize};

// ============================================================================
// INSTRUMENT DATA
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualInstrument {
    pub virtual_library: Option<String>,
    pub virtual_name: Option<String>,
}

impl FromXml for VirtualInstrument {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            virtual_library: el.text_child("virtual-library", cx)?,
            virtual_name: el.text_child("virtual-name", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for VirtualInstrument {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.opt_text_child("virtual-library", &self.virtual_library);
        element.opt_text_child("virtual-name", &self.virtual_name);
        element
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Performers {
    Solo,
    /// Section size, empty when unspecified
    Ensemble(PositiveIntegerOrEmpty),
}

/// Sound description of an instrument
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentData {
    /// Standard sound id such as `keyboard.piano`
    pub instrument_sound: Option<String>,
    pub performers: Option<Performers>,
    pub virtual_instrument: Option<VirtualInstrument>,
}

impl InstrumentData {
    pub(crate) fn read(el: &mut ElementReader<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let instrument_sound = el.text_child("instrument-sound", cx)?;
        let performers = if el.flag("solo") {
            Some(Performers::Solo)
        } else {
            el.text_child("ensemble", cx)?.map(Performers::Ensemble)
        };
        Ok(Self {
            instrument_sound,
            performers,
            virtual_instrument: el.child("virtual-instrument", cx)?,
        })
    }

    pub(crate) fn write(&self, element: &mut XmlElement) {
        element.opt_text_child("instrument-sound", &self.instrument_sound);
        match &self.performers {
            Some(Performers::Solo) => element.flag("solo", true),
            Some(Performers::Ensemble(size)) => element.text_child("ensemble", size),
            None => {}
        }
        element.opt_child("virtual-instrument", &self.virtual_instrument);
    }
}

/// Mid-part change of the sounding instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentChange {
    pub id: String,
    pub data: InstrumentData,
}

impl FromXml for InstrumentChange {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let id = el.req_attr("id", cx)?;
        let data = InstrumentData::read(&mut el, cx)?;
        el.finish()?;
        Ok(Self { id, data })
    }
}

impl ToXml for InstrumentChange {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.attr("id", self.id.as_str());
        self.data.write(&mut element);
        element
    }
}

// ============================================================================
// SOUND
// ============================================================================

attribute_group! {
    /// Offset also affects playback when `sound` is yes
    OffsetAttributes { sound: YesNo => "sound" }
}

/// Distance from the current position in divisions
pub type Offset = Valued<Divisions, OffsetAttributes>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SwingContent {
    Straight,
    Ratio {
        first: u32,
        second: u32,
        swing_type: Option<NoteTypeValue>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swing {
    pub content: SwingContent,
    pub swing_style: Option<String>,
}

impl FromXml for Swing {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let content = if el.flag("straight") {
            SwingContent::Straight
        } else {
            SwingContent::Ratio {
                first: el.req_text_child("first", cx)?,
                second: el.req_text_child("second", cx)?,
                swing_type: el.text_child("swing-type", cx)?,
            }
        };
        let value = Self {
            content,
            swing_style: el.text_child("swing-style", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Swing {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        match &self.content {
            SwingContent::Straight => element.flag("straight", true),
            SwingContent::Ratio {
                first,
                second,
                swing_type,
            } => {
                element.text_child("first", first);
                element.text_child("second", second);
                element.opt_text_child("swing-type", swing_type);
            }
        }
        element.opt_text_child("swing-style", &self.swing_style);
        element
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SoundItem {
    InstrumentChange(InstrumentChange),
    MidiDevice(MidiDevice),
    MidiInstrument(MidiInstrument),
    Play(Play),
}

impl ChoiceItem for SoundItem {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "instrument-change" => FromXml::from_xml(node, cx).map(SoundItem::InstrumentChange),
            "midi-device" => FromXml::from_xml(node, cx).map(SoundItem::MidiDevice),
            "midi-instrument" => FromXml::from_xml(node, cx).map(SoundItem::MidiInstrument),
            "play" => FromXml::from_xml(node, cx).map(SoundItem::Play),
            _ => return None,
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            SoundItem::InstrumentChange(v) => v.to_xml("instrument-change"),
            SoundItem::MidiDevice(v) => v.to_xml("midi-device"),
            SoundItem::MidiInstrument(v) => v.to_xml("midi-instrument"),
            SoundItem::Play(v) => v.to_xml("play"),
        }
    }
}

attribute_group! {
    SoundAttributes {
        tempo: NonNegativeDecimal => "tempo",
        dynamics: NonNegativeDecimal => "dynamics",
        dacapo: YesNo => "dacapo",
        segno: String => "segno",
        dalsegno: String => "dalsegno",
        coda: String => "coda",
        tocoda: String => "tocoda",
        divisions: Divisions => "divisions",
        forward_repeat: YesNo => "forward-repeat",
        fine: String => "fine",
        time_only: TimeOnly => "time-only",
        pizzicato: YesNo => "pizzicato",
        pan: RotationDegrees => "pan",
        elevation: RotationDegrees => "elevation",
        damper_pedal: YesNoNumber => "damper-pedal",
        soft_pedal: YesNoNumber => "soft-pedal",
        sostenuto_pedal: YesNoNumber => "sostenuto-pedal",
        id: String => "id",
    }
}

/// Playback parameters, either standalone in a measure or inside a direction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sound {
    pub items: Vec<SoundItem>,
    pub swing: Option<Swing>,
    pub offset: Option<Offset>,
    pub attributes: SoundAttributes,
}

impl Sound {
    /// Tempo change in quarter notes per minute
    pub fn tempo(bpm: f64) -> Self {
        Self {
            attributes: SoundAttributes {
                tempo: Some(NonNegativeDecimal(bpm)),
                ..SoundAttributes::default()
            },
            ..Self::default()
        }
    }
}

impl FromXml for Sound {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let attributes = el.group(cx)?;
        let swing = el.child("swing", cx)?;
        let offset = el.child("offset", cx)?;
        let items = el.choices(cx)?;
        el.finish()?;
        Ok(Self {
            items,
            swing,
            offset,
            attributes,
        })
    }
}

impl ToXml for Sound {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        for item in &self.items {
            element.push(item.to_element());
        }
        element.opt_child("swing", &self.swing);
        element.opt_child("offset", &self.offset);
        element
    }
}

// ============================================================================
// LISTENING
// ============================================================================

attribute_group! {
    Sync {
        required { kind: SyncType => "type" }
        latency: Milliseconds => "latency",
    }
    embeds { timing: PlayerTiming }
}

empty_element!(Sync);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ListeningItem {
    Sync(Sync),
    OtherListening(OtherListening),
}

impl ChoiceItem for ListeningItem {
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>> {
        let item = match name {
            "sync" => FromXml::from_xml(node, cx).map(ListeningItem::Sync),
            "other-listening" => FromXml::from_xml(node, cx).map(ListeningItem::OtherListening),
            _ => return None,
        };
        Some(item)
    }

    fn to_element(&self) -> XmlElement {
        match self {
            ListeningItem::Sync(v) => v.to_xml("sync"),
            ListeningItem::OtherListening(v) => v.to_xml("other-listening"),
        }
    }
}

/// Score-following hints for listening software
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listening {
    pub items: Vec<ListeningItem>,
    pub offset: Option<Offset>,
}

impl FromXml for Listening {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let offset = el.child("offset", cx)?;
        let items = el.choices(cx)?;
        if items.is_empty() {
            return Err(DecodeError::missing("sync"));
        }
        el.finish()?;
        Ok(Self { items, offset })
    }
}

impl ToXml for Listening {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        for item in &self.items {
            element.push(item.to_element());
        }
        element.opt_child("offset", &self.offset);
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
    fn test_sound_attributes_and_sequence() {
        let sound: Sound = parse(
            r#"<sound tempo="96" damper-pedal="yes"><instrument-change id="P1-I2"><instrument-sound>strings.violin</instrument-sound><solo/></instrument-change><midi-instrument id="P1-I2"><midi-program>41</midi-program></midi-instrument><swing><first>2</first><second>1</second><swing-type>eighth</swing-type></swing></sound>"#,
        )
        .expect("sound decode");

        assert_eq!(sound.attributes.tempo, Some(NonNegativeDecimal(96.0)));
        assert_eq!(sound.attributes.damper_pedal, Some(YesNoNumber::YesNo(YesNo::Yes)));
        assert_eq!(sound.items.len(), 2);
        match &sound.items[0] {
            SoundItem::InstrumentChange(change) => {
                assert_eq!(change.data.instrument_sound.as_deref(), Some("strings.violin"));
                assert_eq!(change.data.performers, Some(Performers::Solo));
            }
            other => panic!("expected instrument-change, got {:?}", other),
        }
        assert!(matches!(
            sound.swing.as_ref().map(|s| &s.content),
            Some(SwingContent::Ratio { first: 2, second: 1, .. })
        ));

        let element = sound.to_xml("sound");
        let tags: Vec<&str> = element.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(tags, vec!["instrument-change", "midi-instrument", "swing"]);
    }

    #[test]
    fn test_tempo_constructor() {
        let element = Sound::tempo(120.0).to_xml("sound");
        assert_eq!(element.attribute("tempo"), Some("120"));
        assert!(element.children.is_empty());
    }

    #[test]
    fn test_listening_requires_an_item() {
        assert!(parse::<Listening>("<listening><offset>2</offset></listening>").is_err());
        let listening: Listening =
            parse(r#"<listening><sync type="tempo" latency="100"/></listening>"#).expect("listening decode");
        assert!(matches!(&listening.items[0], ListeningItem::Sync(sync) if sync.latency == Some(Milliseconds(100))));
    }
}
