// Decode -> encode -> decode idempotence over a score touching most of the model

use musicxml_wasm::model::{MusicData, ScoreDocument};
use musicxml_wasm::{decode, decode_with, encode, encode_to_string, encode_with, DecodeOptions, EncodeOptions};
use std::io::{Read, Seek, SeekFrom, Write};

const SONATA: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise version="4.0">
  <work><work-title>Sonatina</work-title></work>
  <movement-number>1</movement-number>
  <movement-title>Allegro</movement-title>
  <identification>
    <creator type="composer">M. Clementi</creator>
    <rights>Public domain</rights>
    <encoding>
      <software>Hand written</software>
      <encoding-date>2024-05-01</encoding-date>
      <supports element="accidental" type="yes"/>
    </encoding>
  </identification>
  <defaults>
    <scaling><millimeters>7.05</millimeters><tenths>40</tenths></scaling>
    <page-layout>
      <page-height>1584</page-height>
      <page-width>1224</page-width>
      <page-margins type="both">
        <left-margin>70</left-margin><right-margin>70</right-margin>
        <top-margin>88</top-margin><bottom-margin>88</bottom-margin>
      </page-margins>
    </page-layout>
    <word-font font-family="Times New Roman" font-size="10.25"/>
  </defaults>
  <credit page="1">
    <credit-type>title</credit-type>
    <credit-words default-x="612" default-y="1500" justify="center" font-size="24">Sonatina</credit-words>
  </credit>
  <part-list>
    <score-part id="P1">
      <part-name>Piano</part-name>
      <score-instrument id="P1-I1"><instrument-name>Piano</instrument-name></score-instrument>
      <midi-instrument id="P1-I1"><midi-channel>1</midi-channel><midi-program>1</midi-program></midi-instrument>
    </score-part>
  </part-list>
  <part id="P1">
    <measure number="1" width="320.5">
      <print><system-layout><system-margins><left-margin>50</left-margin><right-margin>0</right-margin></system-margins><top-system-distance>170</top-system-distance></system-layout></print>
      <attributes>
        <divisions>2</divisions>
        <key><fifths>0</fifths><mode>major</mode></key>
        <time><beats>4</beats><beat-type>4</beat-type></time>
        <staves>2</staves>
        <clef number="1"><sign>G</sign><line>2</line></clef>
        <clef number="2"><sign>F</sign><line>4</line></clef>
      </attributes>
      <direction placement="above">
        <direction-type><words font-style="italic">dolce</words></direction-type>
        <direction-type><dynamics><p/></dynamics></direction-type>
        <staff>1</staff>
        <sound dynamics="54"/>
      </direction>
      <harmony><root><root-step>C</root-step></root><kind text="">major</kind></harmony>
      <note default-x="80">
        <pitch><step>C</step><octave>5</octave></pitch>
        <duration>2</duration>
        <tie type="start"/>
        <voice>1</voice>
        <type>quarter</type>
        <stem>down</stem>
        <staff>1</staff>
        <notations>
          <tied type="start"/>
          <slur type="start" number="1" placement="above"/>
          <articulations><staccato/><accent placement="above"/></articulations>
        </notations>
        <lyric number="1"><syllabic>begin</syllabic><text>Son</text></lyric>
      </note>
      <note>
        <pitch><step>C</step><octave>5</octave></pitch>
        <duration>1</duration>
        <tie type="stop"/>
        <voice>1</voice>
        <type>eighth</type>
        <stem>down</stem>
        <staff>1</staff>
        <beam number="1">begin</beam>
        <notations><tied type="stop"/></notations>
      </note>
      <note>
        <pitch><step>E</step><alter>-1</alter><octave>5</octave></pitch>
        <duration>1</duration>
        <voice>1</voice>
        <type>eighth</type>
        <accidental>flat</accidental>
        <stem>down</stem>
        <staff>1</staff>
        <beam number="1">end</beam>
        <notations><slur type="stop" number="1"/></notations>
      </note>
      <note>
        <rest/>
        <duration>4</duration>
        <voice>1</voice>
        <type>half</type>
        <staff>1</staff>
      </note>
      <backup><duration>8</duration></backup>
      <note>
        <pitch><step>C</step><octave>3</octave></pitch>
        <duration>8</duration>
        <voice>5</voice>
        <type>whole</type>
        <staff>2</staff>
      </note>
      <barline location="right">
        <bar-style>light-heavy</bar-style>
        <repeat direction="backward"/>
      </barline>
    </measure>
  </part>
</score-partwise>"#;

#[test]
fn test_decode_encode_decode_is_idempotent() {
    let decoded = decode(SONATA.as_bytes()).expect("decode should succeed");
    let bytes = encode(&decoded).expect("encode should succeed");
    let redecoded = decode(&bytes).expect("re-decode should succeed");
    assert_eq!(redecoded, decoded, "typed tree should survive a full round trip");

    // a second pass produces identical bytes
    let again = encode(&redecoded).expect("encode should succeed");
    assert_eq!(again, bytes, "encoding should be deterministic");
}

#[test]
fn test_round_trip_without_indentation_or_doctype() {
    let decoded = decode(SONATA.as_bytes()).expect("decode should succeed");
    let options = EncodeOptions {
        indent: None,
        doctype: false,
    };
    let compact = encode_with(&decoded, &options).expect("encode should succeed");
    assert_eq!(decode(&compact).expect("re-decode should succeed"), decoded);
}

#[test]
fn test_real_score_decodes_without_warnings() {
    let decoded = decode_with(SONATA.as_bytes(), &DecodeOptions::default()).expect("decode should succeed");
    assert!(
        decoded.warnings.is_empty(),
        "a schema-conformant score should not warn: {:?}",
        decoded.warnings
    );
    assert_eq!(decoded.document.header().title(), Some("Sonatina"));
    assert_eq!(decoded.document.part_count(), 1);
}

#[test]
fn test_encoded_order_matches_source_order() {
    let decoded = decode(SONATA.as_bytes()).expect("decode should succeed");
    let ScoreDocument::Partwise(score) = &decoded else {
        panic!("expected a partwise document");
    };
    let names: Vec<&str> = score.parts[0].measures[0].music_data.iter().map(MusicData::name).collect();
    assert_eq!(
        names,
        vec!["print", "attributes", "direction", "harmony", "note", "note", "note", "note", "backup", "note", "barline"]
    );

    let text = encode_to_string(&decoded, &EncodeOptions::default()).expect("encode should succeed");
    let backup = text.find("<backup>").expect("backup is written");
    let barline = text.find("<barline").expect("barline is written");
    let last_note = text.rfind("<note").expect("notes are written");
    assert!(backup < last_note && last_note < barline, "music data should be written in stored order");
}

#[test]
fn test_round_trip_through_a_file() {
    let decoded = decode(SONATA.as_bytes()).expect("decode should succeed");
    let bytes = encode(&decoded).expect("encode should succeed");

    let mut file = tempfile::tempfile().expect("temp file should be created");
    file.write_all(&bytes).expect("write should succeed");
    file.seek(SeekFrom::Start(0)).expect("seek should succeed");

    let mut read_back = Vec::new();
    file.read_to_end(&mut read_back).expect("read should succeed");
    assert_eq!(decode(&read_back).expect("decode from file should succeed"), decoded);
}
