// Extension capture, recursive elements and the timewise layout

use musicxml_wasm::model::{
    Articulation, Clef, ClefSign, DirectionTypeItem, MusicData, Notation, ScoreDocument, Transpose,
};
use musicxml_wasm::{decode, encode, encode_to_string, EncodeOptions};

fn score_with_measure(measure: &str) -> String {
    format!(
        r#"<score-partwise version="4.0"><part-list><score-part id="P1"><part-name>A</part-name></score-part></part-list><part id="P1">{}</part></score-partwise>"#,
        measure
    )
}

fn first_measure(document: &ScoreDocument) -> &[MusicData] {
    match document {
        ScoreDocument::Partwise(score) => &score.parts[0].measures[0].music_data,
        ScoreDocument::Timewise(_) => panic!("expected a partwise document"),
    }
}

#[test]
fn test_unknown_direction_type_child_is_captured_verbatim() {
    let xml = score_with_measure(
        r#"<measure number="1"><direction><direction-type><words>rit.</words><vendor-marking style="bold" size="2"><glyph>x</glyph>tail</vendor-marking></direction-type></direction></measure>"#,
    );
    let document = decode(xml.as_bytes()).expect("extension content should decode");

    let MusicData::Direction(direction) = &first_measure(&document)[0] else {
        panic!("expected a direction");
    };
    let items = &direction.direction_types[0].items;
    assert!(matches!(&items[0], DirectionTypeItem::Words(_)));
    let DirectionTypeItem::Extension(raw) = &items[1] else {
        panic!("unknown child should be captured, got {:?}", items[1]);
    };
    assert_eq!(raw.name, "vendor-marking");
    assert_eq!(raw.attribute("style"), Some("bold"));
    assert_eq!(raw.find("glyph").map(|g| g.text()), Some("x".to_string()));

    let text = encode_to_string(&document, &EncodeOptions::default()).expect("encode should succeed");
    assert!(text.contains(r#"<vendor-marking style="bold" size="2">"#));
    assert_eq!(decode(text.as_bytes()).expect("re-decode should succeed"), document);
}

#[test]
fn test_unknown_notation_and_articulation_children_are_captured() {
    let xml = score_with_measure(
        r#"<measure number="1"><note><pitch><step>D</step><octave>4</octave></pitch><duration>1</duration><notations><articulations><staccato/><flick/></articulations><sparkle/></notations></note></measure>"#,
    );
    let document = decode(xml.as_bytes()).expect("extension content should decode");

    let MusicData::Note(note) = &first_measure(&document)[0] else {
        panic!("expected a note");
    };
    let items = &note.notations[0].items;
    assert_eq!(items.len(), 2);

    let Notation::Articulations(articulations) = &items[0] else {
        panic!("expected articulations");
    };
    assert!(matches!(&articulations.items[0], Articulation::Staccato(_)));
    assert!(matches!(&articulations.items[1], Articulation::Extension(raw) if raw.name == "flick"));
    assert!(matches!(&items[1], Notation::Extension(raw) if raw.name == "sparkle"));

    let bytes = encode(&document).expect("encode should succeed");
    assert_eq!(decode(&bytes).expect("re-decode should succeed"), document);
}

#[test]
fn test_clef_with_nested_cue_clef() {
    let xml = score_with_measure(
        r#"<measure number="1"><attributes><clef><sign>G</sign><line>2</line><clef><sign>F</sign><line>4</line></clef></clef></attributes></measure>"#,
    );
    let document = decode(xml.as_bytes()).expect("nested clef should decode");

    let MusicData::Attributes(attributes) = &first_measure(&document)[0] else {
        panic!("expected attributes");
    };
    let outer = &attributes.clefs[0];
    assert_eq!(outer.sign, ClefSign::G);
    let inner = outer.clef.as_ref().expect("cue clef should be present");
    assert_eq!(inner.sign, ClefSign::F);
    assert!(inner.clef.is_none(), "recursion ends at the innermost clef");

    let text = encode_to_string(&document, &EncodeOptions { indent: None, doctype: false })
        .expect("encode should succeed");
    assert_eq!(text.matches("<clef>").count(), 2, "both clefs should be written");
    assert!(text.contains("<clef><sign>G</sign><line>2</line><clef><sign>F</sign><line>4</line></clef></clef>"));
}

#[test]
fn test_clef_without_cue_writes_single_tag() {
    let element = musicxml_wasm::codec::ToXml::to_xml(&Clef::treble(), "clef");
    assert_eq!(element.elements().filter(|e| e.name == "clef").count(), 0);
    assert_eq!(element.elements().count(), 2, "sign and line only");
}

#[test]
fn test_nested_transpose_round_trips() {
    let xml = score_with_measure(
        r#"<measure number="1"><attributes><transpose><diatonic>-1</diatonic><chromatic>-2</chromatic><transpose><chromatic>0</chromatic></transpose></transpose></attributes></measure>"#,
    );
    let document = decode(xml.as_bytes()).expect("nested transpose should decode");

    let MusicData::Attributes(attributes) = &first_measure(&document)[0] else {
        panic!("expected attributes");
    };
    let outer: &Transpose = &attributes.transpose[0];
    assert_eq!(outer.diatonic, Some(-1));
    assert!(outer.transpose.is_some());

    let bytes = encode(&document).expect("encode should succeed");
    assert_eq!(decode(&bytes).expect("re-decode should succeed"), document);
}

#[test]
fn test_timewise_document_decodes_and_converts() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<score-timewise version="4.0">
  <part-list>
    <score-part id="P1"><part-name>Soprano</part-name></score-part>
    <score-part id="P2"><part-name>Alto</part-name></score-part>
  </part-list>
  <measure number="1">
    <part id="P1"><note><pitch><step>E</step><octave>5</octave></pitch><duration>4</duration></note></part>
    <part id="P2"><note><pitch><step>C</step><octave>5</octave></pitch><duration>4</duration></note></part>
  </measure>
  <measure number="2">
    <part id="P1"><note><rest/><duration>4</duration></note></part>
    <part id="P2"><note><rest/><duration>4</duration></note></part>
  </measure>
</score-timewise>"#;

    let document = decode(xml.as_bytes()).expect("timewise decode should succeed");
    assert_eq!(document.root_name(), "score-timewise");
    assert_eq!(document.part_count(), 2);
    assert_eq!(document.measure_count(), 2);

    let text = encode_to_string(&document, &EncodeOptions::default()).expect("encode should succeed");
    assert!(text.contains("<!DOCTYPE score-timewise PUBLIC"));
    assert_eq!(decode(text.as_bytes()).expect("re-decode should succeed"), document);

    let partwise = document.to_partwise();
    let ScoreDocument::Partwise(score) = &partwise else {
        panic!("conversion should produce a partwise document");
    };
    assert_eq!(score.parts.len(), 2);
    assert_eq!(score.parts[1].id, "P2");
    assert_eq!(score.parts[1].measures.len(), 2);
    assert_eq!(partwise.to_timewise(), document);
}

#[test]
fn test_namespaced_extension_keeps_prefixes() {
    let xml = score_with_measure(
        r#"<measure number="1"><direction><direction-type><v:foo xmlns:v="urn:v" v:a="1"><v:bar/></v:foo></direction-type></direction></measure>"#,
    );
    let document = decode(xml.as_bytes()).expect("namespaced extension should decode");

    let MusicData::Direction(direction) = &first_measure(&document)[0] else {
        panic!("expected a direction");
    };
    let DirectionTypeItem::Extension(raw) = &direction.direction_types[0].items[0] else {
        panic!("namespaced child should be captured");
    };
    assert_eq!(raw.name, "v:foo");
    assert_eq!(raw.attribute("v:a"), Some("1"));

    let text = encode_to_string(&document, &EncodeOptions { indent: None, doctype: false })
        .expect("encode should succeed");
    assert!(
        text.contains(r#"<v:foo xmlns:v="urn:v" v:a="1"><v:bar/></v:foo>"#),
        "prefixes and their declaration should be written back: {}",
        text
    );
    assert_eq!(decode(text.as_bytes()).expect("re-decode should succeed"), document);
}

#[test]
fn test_text_around_comments_is_kept() {
    let xml = score_with_measure(
        r#"<measure number="1"><direction><direction-type><words>ab<!-- editorial -->cd</words></direction-type></direction></measure>"#,
    );
    let document = decode(xml.as_bytes()).expect("decode should succeed");

    let MusicData::Direction(direction) = &first_measure(&document)[0] else {
        panic!("expected a direction");
    };
    let DirectionTypeItem::Words(words) = &direction.direction_types[0].items[0] else {
        panic!("expected words");
    };
    assert_eq!(words.value, "abcd");
}
