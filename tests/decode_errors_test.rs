// Error taxonomy, error paths and the enum policy

use musicxml_wasm::model::{ClefSign, MusicData, ScoreDocument};
use musicxml_wasm::{decode, decode_with, encode_to_string, DecodeErrorKind, DecodeOptions, EncodeOptions, EnumPolicy};

fn score_with_measure(measure: &str) -> String {
    format!(
        r#"<score-partwise version="4.0"><part-list><score-part id="P1"><part-name>A</part-name></score-part></part-list><part id="P1">{}</part></score-partwise>"#,
        measure
    )
}

#[test]
fn test_malformed_xml_is_fatal() {
    let err = decode(b"<score-partwise><part-list></score-partwise>").expect_err("mismatched tags must fail");
    assert!(matches!(err.kind(), DecodeErrorKind::MalformedXml(_)));
}

#[test]
fn test_unexpected_root_element() {
    let err = decode(br#"<html><body/></html>"#).expect_err("non-MusicXML root must fail");
    assert_eq!(err.kind(), &DecodeErrorKind::UnexpectedRootElement("html".to_string()));
}

#[test]
fn test_unexpected_element_carries_path() {
    let xml = score_with_measure(r#"<measure number="1"/><measure number="2"><note><rest/><duration>1</duration></note><tempo/></measure>"#);
    let err = decode(xml.as_bytes()).expect_err("tempo is not music data");

    assert_eq!(err.kind(), &DecodeErrorKind::UnexpectedElement { name: "tempo".to_string() });
    assert_eq!(err.path().to_string(), "score-partwise/part[0]/measure[1]");
}

#[test]
fn test_missing_score_part_id() {
    let xml = r#"<score-partwise><part-list><score-part><part-name>A</part-name></score-part></part-list></score-partwise>"#;
    let err = decode(xml.as_bytes()).expect_err("score-part id is required");

    assert_eq!(
        err.kind(),
        &DecodeErrorKind::MissingRequiredField {
            field: "@id".to_string()
        }
    );
    assert!(
        err.path().to_string().starts_with("score-partwise/part-list"),
        "path should point into the part list, got {}",
        err.path()
    );
}

#[test]
fn test_missing_measure_number_reports_measure() {
    let xml = score_with_measure("<measure/>");
    let err = decode(xml.as_bytes()).expect_err("measure number is required");
    assert!(err.to_string().starts_with("missing required field @number at score-partwise/part[0]/measure"));
}

#[test]
fn test_strict_policy_rejects_unknown_enum_literal() {
    let xml = score_with_measure(
        r#"<measure number="1"><attributes><clef><sign>treble</sign></clef></attributes></measure>"#,
    );
    let err = decode_with(xml.as_bytes(), &DecodeOptions::strict()).expect_err("strict mode rejects 'treble'");

    assert_eq!(
        err.kind(),
        &DecodeErrorKind::UnknownEnumValue {
            type_name: "ClefSign",
            value: "treble".to_string()
        }
    );
}

#[test]
fn test_lenient_policy_keeps_unknown_literal_and_warns() {
    let xml = score_with_measure(
        r#"<measure number="1"><attributes><clef><sign>treble</sign><line>2</line></clef></attributes></measure>"#,
    );
    let options = DecodeOptions {
        enum_policy: EnumPolicy::Lenient,
        ..DecodeOptions::default()
    };
    let decoded = decode_with(xml.as_bytes(), &options).expect("lenient decode should succeed");
    assert_eq!(decoded.warnings.len(), 1, "one warning for the unknown clef sign");

    let ScoreDocument::Partwise(score) = &decoded.document else {
        panic!("expected a partwise document");
    };
    let MusicData::Attributes(attributes) = &score.parts[0].measures[0].music_data[0] else {
        panic!("expected attributes");
    };
    assert_eq!(attributes.clefs[0].sign, ClefSign::Unrecognized("treble".to_string()));

    // the raw literal is written back unchanged
    let text = encode_to_string(&decoded.document, &EncodeOptions::default()).expect("encode should succeed");
    assert!(text.contains("<sign>treble</sign>"));
}

#[test]
fn test_known_literals_decode_to_exact_variants() {
    for (literal, sign) in [
        ("G", ClefSign::G),
        ("F", ClefSign::F),
        ("C", ClefSign::C),
        ("percussion", ClefSign::Percussion),
        ("TAB", ClefSign::Tab),
        ("jianpu", ClefSign::Jianpu),
        ("none", ClefSign::None),
    ] {
        let xml = score_with_measure(&format!(
            r#"<measure number="1"><attributes><clef><sign>{}</sign></clef></attributes></measure>"#,
            literal
        ));
        let decoded = decode_with(xml.as_bytes(), &DecodeOptions::strict()).expect("known literal should decode");
        let ScoreDocument::Partwise(score) = &decoded.document else {
            panic!("expected a partwise document");
        };
        let MusicData::Attributes(attributes) = &score.parts[0].measures[0].music_data[0] else {
            panic!("expected attributes");
        };
        assert_eq!(attributes.clefs[0].sign, sign);

        let text = encode_to_string(&decoded.document, &EncodeOptions::default()).expect("encode should succeed");
        assert!(text.contains(&format!("<sign>{}</sign>", literal)), "literal {} should be reproduced", literal);
    }
}

#[test]
fn test_yes_no_number_union_rejects_other_text() {
    let xml = score_with_measure(r#"<measure number="1"><sound damper-pedal="sometimes"/></measure>"#);
    let err = decode(xml.as_bytes()).expect_err("neither yes/no nor a number");
    assert!(matches!(err.kind(), DecodeErrorKind::UnparseableUnion { .. }));

    let ok = score_with_measure(r#"<measure number="1"><sound damper-pedal="50"/></measure>"#);
    decode(ok.as_bytes()).expect("numeric form should decode");
}

#[test]
fn test_out_of_range_values_warn_without_failing() {
    let xml = score_with_measure(
        r#"<measure number="1"><sound><midi-instrument id="P1-I1"><midi-channel>17</midi-channel></midi-instrument></sound></measure>"#,
    );
    let decoded = decode_with(xml.as_bytes(), &DecodeOptions::default()).expect("range violations are not fatal");
    assert_eq!(decoded.warnings.len(), 1);

    let unchecked = DecodeOptions {
        check_ranges: false,
        ..DecodeOptions::default()
    };
    let decoded = decode_with(xml.as_bytes(), &unchecked).expect("decode should succeed");
    assert!(decoded.warnings.is_empty());
}

#[test]
fn test_unbalanced_group_warns() {
    let xml = r#"<score-partwise><part-list><part-group type="start" number="2"/><score-part id="P1"><part-name>A</part-name></score-part></part-list><part id="P1"/></score-partwise>"#;
    let decoded = decode_with(xml.as_bytes(), &DecodeOptions::default()).expect("decode should succeed");
    assert_eq!(decoded.warnings.len(), 1);
    assert!(decoded.warnings[0].message.contains("number 2"));
}
