//! Programmatic construction of score documents
//!
//! Fluent, consuming builders for synthesizing a partwise document
//! without going through the decoder:
//!
//! ```
//! use musicxml_wasm::builder::{MeasureBuilder, PartBuilder, ScoreBuilder};
//! use musicxml_wasm::model::{Clef, Note, NoteTypeValue, Step};
//!
//! let document = ScoreBuilder::new()
//!     .title("Scale")
//!     .part(
//!         PartBuilder::new("P1", "Piano").measure(
//!             MeasureBuilder::new()
//!                 .divisions(1.0)
//!                 .time("4", "4")
//!                 .clef(Clef::treble())
//!                 .note(Note::pitched(Step::C, 4, 4.0).with_type(NoteTypeValue::Whole)),
//!         ),
//!     )
//!     .build();
//! assert_eq!(document.measure_count(), 1);
//! ```

use crate::model::*;

/// Builder for a partwise [`ScoreDocument`]
#[derive(Debug, Clone, Default)]
pub struct ScoreBuilder {
    header: ScoreHeader,
    creators: Vec<TypedText>,
    software: Vec<String>,
    entries: Vec<PartListEntry>,
}

#[derive(Debug, Clone)]
enum PartListEntry {
    Group(PartGroup),
    Part(PartBuilder),
}

impl ScoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the work title
    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.header.work.get_or_insert_with(Work::default).work_title = Some(title.into());
        self
    }

    pub fn movement_title<S: Into<String>>(mut self, title: S) -> Self {
        self.header.movement_title = Some(title.into());
        self
    }

    /// Add a `creator` with the given type, such as `composer` or `lyricist`
    pub fn creator<S: Into<String>>(mut self, kind: &str, name: S) -> Self {
        self.creators.push(Valued {
            value: name.into(),
            attributes: TypeAttribute {
                kind: Some(kind.to_string()),
            },
        });
        self
    }

    pub fn composer<S: Into<String>>(self, name: S) -> Self {
        self.creator("composer", name)
    }

    /// Record the encoding software
    pub fn software<S: Into<String>>(mut self, software: S) -> Self {
        self.software.push(software.into());
        self
    }

    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.header.defaults = Some(defaults);
        self
    }

    pub fn credit(mut self, credit: Credit) -> Self {
        self.header.credits.push(credit);
        self
    }

    /// Add a part group marker at the current position of the part list
    pub fn part_group(mut self, group: PartGroup) -> Self {
        self.entries.push(PartListEntry::Group(group));
        self
    }

    pub fn part(mut self, part: PartBuilder) -> Self {
        self.entries.push(PartListEntry::Part(part));
        self
    }

    /// Assemble the document.
    ///
    /// A `part-list` needs at least one `score-part`: a builder without any
    /// [`part`](Self::part) call still builds, but its encoding is rejected
    /// by the decoder with a missing `score-part`.
    pub fn build(self) -> ScoreDocument {
        let mut header = self.header;

        if !self.creators.is_empty() || !self.software.is_empty() {
            let identification = header.identification.get_or_insert_with(Identification::default);
            identification.creators.extend(self.creators);
            if !self.software.is_empty() {
                let encoding = identification.encoding.get_or_insert_with(Encoding::default);
                encoding
                    .items
                    .extend(self.software.into_iter().map(EncodingItem::Software));
            }
        }

        let mut parts = Vec::new();
        for entry in self.entries {
            match entry {
                PartListEntry::Group(group) => header.part_list.items.push(PartListItem::PartGroup(group)),
                PartListEntry::Part(builder) => {
                    let (score_part, part) = builder.build();
                    header.part_list.items.push(PartListItem::ScorePart(score_part));
                    parts.push(part);
                }
            }
        }

        if parts.is_empty() {
            log::warn!("built score has no parts; its part-list will not decode");
        }
        log::debug!("built score with {} parts", parts.len());

        ScoreDocument::Partwise(ScorePartwise {
            version: CURRENT_VERSION.to_string(),
            header,
            parts,
        })
    }
}

/// Builder for one part plus its `score-part` entry
#[derive(Debug, Clone)]
pub struct PartBuilder {
    score_part: ScorePart,
    measures: Vec<MeasureBuilder>,
}

impl PartBuilder {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            score_part: ScorePart::new(id, name),
            measures: Vec::new(),
        }
    }

    pub fn abbreviation<S: Into<String>>(mut self, abbreviation: S) -> Self {
        self.score_part.part_abbreviation = Some(Valued::new(abbreviation.into()));
        self
    }

    /// Add a score instrument, with a MIDI binding when a program is given
    pub fn instrument(mut self, instrument: ScoreInstrument, midi_program: Option<u32>) -> Self {
        if let Some(program) = midi_program {
            let mut midi = MidiInstrument::new(instrument.id.clone());
            midi.midi_program = Some(Midi128(program));
            self.score_part.midi.push(MidiAssignment {
                midi_device: None,
                midi_instrument: Some(midi),
            });
        }
        self.score_part.score_instruments.push(instrument);
        self
    }

    /// Append a measure; unnumbered measures are numbered from 1 in order
    pub fn measure(mut self, measure: MeasureBuilder) -> Self {
        self.measures.push(measure);
        self
    }

    fn build(self) -> (ScorePart, Part) {
        let measures = self
            .measures
            .into_iter()
            .enumerate()
            .map(|(index, measure)| measure.build(index + 1))
            .collect();

        let part = Part {
            id: self.score_part.id.clone(),
            measures,
        };
        (self.score_part, part)
    }
}

/// Builder for one measure's music data
#[derive(Debug, Clone, Default)]
pub struct MeasureBuilder {
    number: Option<String>,
    implicit: bool,
    print: Option<Print>,
    attributes: Option<Attributes>,
    items: Vec<MusicData>,
}

impl MeasureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number<S: Into<String>>(mut self, number: S) -> Self {
        self.number = Some(number.into());
        self
    }

    /// Pickup measure excluded from measure numbering
    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    /// Start a new system here; written before the measure attributes
    pub fn new_system(mut self) -> Self {
        self.print = Some(Print::new_system());
        self
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        self.attributes.get_or_insert_with(Attributes::default)
    }

    pub fn divisions(mut self, divisions: f64) -> Self {
        self.attributes_mut().divisions = Some(PositiveDivisions(divisions));
        self
    }

    pub fn key(mut self, fifths: i32, mode: Option<Mode>) -> Self {
        self.attributes_mut().keys.push(Key::traditional(fifths, mode));
        self
    }

    pub fn time<B: Into<String>, T: Into<String>>(mut self, beats: B, beat_type: T) -> Self {
        self.attributes_mut().times.push(Time::new(beats, beat_type));
        self
    }

    pub fn staves(mut self, staves: u32) -> Self {
        self.attributes_mut().staves = Some(staves);
        self
    }

    pub fn clef(mut self, clef: Clef) -> Self {
        self.attributes_mut().clefs.push(clef);
        self
    }

    pub fn note(self, note: Note) -> Self {
        self.item(note)
    }

    /// Add several notes sounding together; all but the first get `<chord/>`
    pub fn chord(mut self, notes: Vec<Note>) -> Self {
        for (index, note) in notes.into_iter().enumerate() {
            let note = if index == 0 { note } else { note.in_chord() };
            self.items.push(note.into());
        }
        self
    }

    pub fn backup(self, duration: f64) -> Self {
        self.item(Backup::new(duration))
    }

    pub fn forward(self, duration: f64) -> Self {
        self.item(Forward::new(duration))
    }

    pub fn direction(self, direction: Direction) -> Self {
        self.item(direction)
    }

    pub fn barline(self, barline: Barline) -> Self {
        self.item(barline)
    }

    /// Append any music-data entry after the ones already added
    pub fn item(mut self, item: impl Into<MusicData>) -> Self {
        self.items.push(item.into());
        self
    }

    fn build(self, position: usize) -> Measure {
        let number = self.number.unwrap_or_else(|| position.to_string());
        let mut measure = Measure::new(number);
        if self.implicit {
            measure.attributes.implicit = Some(YesNo::Yes);
        }

        if let Some(print) = self.print {
            measure.push(print);
        }
        if let Some(attributes) = self.attributes {
            measure.push(attributes);
        }
        measure.music_data.extend(self.items);
        measure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_part_score() -> ScoreDocument {
        ScoreBuilder::new()
            .title("Duet")
            .composer("Anonymous")
            .software("musicxml-wasm")
            .part_group(PartGroup::new(StartStop::Start, "1"))
            .part(
                PartBuilder::new("P1", "Flute")
                    .measure(MeasureBuilder::new().divisions(2.0).note(Note::pitched(Step::E, 5, 8.0)))
                    .measure(MeasureBuilder::new().note(Note::rest(8.0))),
            )
            .part(PartBuilder::new("P2", "Oboe").measure(MeasureBuilder::new().note(Note::rest(8.0))))
            .part_group(PartGroup::new(StartStop::Stop, "1"))
            .build()
    }

    #[test]
    fn test_part_list_follows_builder_order() {
        let document = two_part_score();
        let header = document.header();

        assert_eq!(header.title(), Some("Duet"));
        let kinds: Vec<&str> = header
            .part_list
            .items
            .iter()
            .map(|item| match item {
                PartListItem::PartGroup(_) => "group",
                PartListItem::ScorePart(_) => "part",
            })
            .collect();
        assert_eq!(kinds, vec!["group", "part", "part", "group"]);
        assert!(header.part_list.unbalanced_groups().is_empty());
        assert!(document.unresolved_part_ids().is_empty());

        let identification = header.identification.as_ref().expect("identification is set");
        assert_eq!(identification.creator("composer"), Some("Anonymous"));
    }

    #[test]
    fn test_measures_are_numbered_in_order() {
        let document = two_part_score();
        let ScoreDocument::Partwise(score) = &document else {
            panic!("builder produces partwise documents");
        };
        let numbers: Vec<&str> = score.parts[0].measures.iter().map(Measure::number).collect();
        assert_eq!(numbers, vec!["1", "2"]);
        assert_eq!(document.measure_count(), 2);
        assert_eq!(document.version(), CURRENT_VERSION);
    }

    #[test]
    fn test_print_and_attributes_lead_the_measure() {
        let measure = MeasureBuilder::new()
            .note(Note::pitched(Step::C, 4, 1.0))
            .new_system()
            .divisions(1.0)
            .clef(Clef::bass())
            .build(3);

        let names: Vec<&str> = measure.music_data.iter().map(MusicData::name).collect();
        assert_eq!(names, vec!["print", "attributes", "note"]);
        assert_eq!(measure.number(), "3");
    }

    #[test]
    fn test_chord_marks_following_notes() {
        let measure = MeasureBuilder::new()
            .chord(vec![
                Note::pitched(Step::C, 4, 4.0),
                Note::pitched(Step::E, 4, 4.0),
                Note::pitched(Step::G, 4, 4.0),
            ])
            .build(1);
        let chords: Vec<bool> = measure.notes().map(|n| n.full_note.chord).collect();
        assert_eq!(chords, vec![false, true, true]);
    }

    #[test]
    fn test_instrument_with_midi_program() {
        let document = ScoreBuilder::new()
            .part(
                PartBuilder::new("P1", "Piano")
                    .instrument(ScoreInstrument::new("P1-I1", "Acoustic Grand Piano"), Some(1)),
            )
            .build();
        let part = document.header().part_list.score_part("P1").expect("score-part exists");
        assert_eq!(part.score_instruments.len(), 1);
        let midi = part.midi[0].midi_instrument.as_ref().expect("midi binding");
        assert_eq!(midi.id, "P1-I1");
        assert_eq!(midi.midi_program, Some(Midi128(1)));
    }

    #[test]
    fn test_score_without_parts_does_not_decode() {
        let document = ScoreBuilder::new().title("Empty").build();
        assert_eq!(document.header().part_list.score_parts().count(), 0);

        let bytes = crate::codec::encode(&document).expect("encode should succeed");
        let err = crate::codec::decode(&bytes).expect_err("an empty part-list is rejected");
        assert!(matches!(err.kind(), crate::codec::DecodeErrorKind::MissingRequiredField { .. }));
    }
}
