// End-to-end decode scenarios over small, realistic MusicXML documents

use musicxml_wasm::model::{
    DirectionTypeItem, FullNoteContent, MusicData, Note, NoteTypeValue, Octave, PartListItem, ScoreDocument,
    StartStop, Step, WedgeType,
};
use musicxml_wasm::{decode, encode};

fn partwise(measures: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<score-partwise version="4.0">
  <part-list>
    <score-part id="P1"><part-name>Music</part-name></score-part>
  </part-list>
  <part id="P1">{}</part>
</score-partwise>"#,
        measures
    )
}

fn first_measure_data(document: &ScoreDocument) -> &[MusicData] {
    match document {
        ScoreDocument::Partwise(score) => &score.parts[0].measures[0].music_data,
        ScoreDocument::Timewise(_) => panic!("expected a partwise document"),
    }
}

fn notes(data: &[MusicData]) -> Vec<&Note> {
    data.iter()
        .filter_map(|item| match item {
            MusicData::Note(note) => Some(note.as_ref()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_single_quarter_note_c4() {
    let xml = partwise(
        r#"<measure number="1">
      <attributes><divisions>4</divisions></attributes>
      <note>
        <pitch><step>C</step><octave>4</octave></pitch>
        <duration>4</duration>
        <type>quarter</type>
      </note>
    </measure>"#,
    );

    let document = decode(xml.as_bytes()).expect("decode should succeed");
    let data = first_measure_data(&document);
    let notes = notes(data);
    assert_eq!(notes.len(), 1, "measure should contain exactly one note");

    let pitch = notes[0].full_note.pitch().expect("note should be pitched");
    assert_eq!(pitch.step, Step::C);
    assert_eq!(pitch.octave, Octave(4));
    assert_eq!(notes[0].duration().map(|d| d.value()), Some(4.0));
    assert_eq!(notes[0].note_type.as_ref().map(|t| &t.value), Some(&NoteTypeValue::Quarter));
}

#[test]
fn test_backup_between_voices_keeps_order() {
    let xml = partwise(
        r#"<measure number="1">
      <note><pitch><step>E</step><octave>5</octave></pitch><duration>4</duration><voice>1</voice></note>
      <backup><duration>4</duration></backup>
      <note><pitch><step>C</step><octave>3</octave></pitch><duration>4</duration><voice>2</voice></note>
    </measure>"#,
    );

    let document = decode(xml.as_bytes()).expect("decode should succeed");
    let data = first_measure_data(&document);

    let names: Vec<&str> = data.iter().map(MusicData::name).collect();
    assert_eq!(names, vec!["note", "backup", "note"]);

    let MusicData::Backup(backup) = &data[1] else {
        panic!("second item should be a backup");
    };
    assert_eq!(backup.duration.value(), 4.0);

    let voices: Vec<Option<&str>> = notes(data).iter().map(|n| n.voice.as_deref()).collect();
    assert_eq!(voices, vec![Some("1"), Some("2")]);
}

#[test]
fn test_wedge_start_and_stop_pair_by_number() {
    let xml = partwise(
        r#"<measure number="1">
      <direction placement="below">
        <direction-type><wedge type="crescendo"/></direction-type>
      </direction>
      <note><rest/><duration>4</duration></note>
      <direction>
        <direction-type><wedge type="stop"/></direction-type>
      </direction>
    </measure>"#,
    );

    let document = decode(xml.as_bytes()).expect("decode should succeed");
    let wedges: Vec<_> = first_measure_data(&document)
        .iter()
        .filter_map(|item| match item {
            MusicData::Direction(direction) => Some(direction),
            _ => None,
        })
        .flat_map(|direction| direction.direction_types.iter())
        .flat_map(|direction_type| direction_type.items.iter())
        .filter_map(|item| match item {
            DirectionTypeItem::Wedge(wedge) => Some(wedge),
            _ => None,
        })
        .collect();

    assert_eq!(wedges.len(), 2, "both directions should hold a wedge");
    assert_eq!(wedges[0].kind, WedgeType::Crescendo);
    assert_eq!(wedges[1].kind, WedgeType::Stop);
    assert_eq!(wedges[0].pairing_number(), wedges[1].pairing_number());
    assert_eq!(wedges[0].pairing_number().value(), 1);
}

#[test]
fn test_part_group_nesting_survives_round_trip() {
    let xml = r#"<score-partwise version="4.0">
  <part-list>
    <part-group type="start" number="1"><group-symbol>bracket</group-symbol></part-group>
    <score-part id="P1"><part-name>Violin I</part-name></score-part>
    <score-part id="P2"><part-name>Violin II</part-name></score-part>
    <part-group type="stop" number="1"/>
  </part-list>
  <part id="P1"><measure number="1"/></part>
  <part id="P2"><measure number="1"/></part>
</score-partwise>"#;

    let document = decode(xml.as_bytes()).expect("decode should succeed");
    let bytes = encode(&document).expect("encode should succeed");
    let again = decode(&bytes).expect("re-decode should succeed");
    assert_eq!(again, document, "round trip should preserve the document");

    let items = &again.header().part_list.items;
    assert_eq!(items.len(), 4);
    let (PartListItem::PartGroup(start), PartListItem::PartGroup(stop)) = (&items[0], &items[3]) else {
        panic!("part list should open and close with part-group markers");
    };
    assert_eq!(start.attributes.kind, StartStop::Start);
    assert_eq!(stop.attributes.kind, StartStop::Stop);
    assert_eq!(start.number(), stop.number());
    assert!(again.header().part_list.unbalanced_groups().is_empty());

    let ids: Vec<&str> = again.header().part_list.score_parts().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["P1", "P2"]);
}

#[test]
fn test_full_note_is_exactly_one_alternative() {
    let xml = partwise(
        r#"<measure number="1">
      <note><pitch><step>A</step><octave>4</octave></pitch><duration>1</duration></note>
      <note><unpitched><display-step>E</display-step><display-octave>4</display-octave></unpitched><duration>1</duration></note>
      <note><rest/><duration>1</duration></note>
      <note><chord/><pitch><step>C</step><octave>5</octave></pitch><duration>1</duration></note>
    </measure>"#,
    );

    let document = decode(xml.as_bytes()).expect("decode should succeed");
    let notes = notes(first_measure_data(&document));
    let kinds: Vec<&str> = notes
        .iter()
        .map(|note| match &note.full_note.content {
            FullNoteContent::Pitch(_) => "pitch",
            FullNoteContent::Unpitched(_) => "unpitched",
            FullNoteContent::Rest(_) => "rest",
        })
        .collect();
    assert_eq!(kinds, vec!["pitch", "unpitched", "rest", "pitch"]);

    let chords: Vec<bool> = notes.iter().map(|note| note.full_note.chord).collect();
    assert_eq!(chords, vec![false, false, false, true]);
}
