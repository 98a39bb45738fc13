//! WASM build test
//!
//! Exercises the JavaScript-facing codec functions in a browser.

#![cfg(target_arch = "wasm32")]

use musicxml_wasm::api::{decode_musicxml, encode_musicxml, musicxml_to_json, normalize_musicxml};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const SCORE: &str = r#"<score-partwise version="4.0"><part-list><score-part id="P1"><part-name>Flute</part-name></score-part></part-list><part id="P1"><measure number="1"><note><pitch><step>F</step><octave>5</octave></pitch><duration>2</duration></note></measure></part></score-partwise>"#;

#[wasm_bindgen_test]
fn test_decode_and_encode_through_js_values() {
    let decoded = decode_musicxml(SCORE.as_bytes(), JsValue::UNDEFINED).expect("decode should succeed");
    let document = js_sys::Reflect::get(&decoded, &JsValue::from_str("document")).expect("document field");

    let bytes = encode_musicxml(document, JsValue::NULL).expect("encode should succeed");
    let text = String::from_utf8(bytes).expect("encoder emits UTF-8");
    assert!(text.contains("<step>F</step>"));
}

#[wasm_bindgen_test]
fn test_normalize_and_json() {
    let normalized = normalize_musicxml(SCORE.as_bytes()).expect("normalize should succeed");
    assert!(normalized.starts_with("<?xml"));

    let json = musicxml_to_json(SCORE.as_bytes()).expect("json should succeed");
    assert!(json.contains("\"Partwise\""));
}

#[wasm_bindgen_test]
fn test_decode_error_becomes_js_error() {
    let err = decode_musicxml(b"<opus/>", JsValue::UNDEFINED).expect_err("wrong root must fail");
    let message = err.as_string().expect("errors are strings");
    assert!(message.contains("unexpected root element"));
}
