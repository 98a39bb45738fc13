//! MusicXML decode/encode operations exposed to JavaScript
//!
//! The `#[wasm_bindgen]` functions are thin wrappers; the work happens in
//! the plain Rust functions below them so it can be tested natively.

use super::helpers::{deserialize, js_error, options_or_default, serialize};
use crate::codec::{self, DecodeError, DecodeOptions, EncodeError, EncodeOptions};
use crate::model::ScoreDocument;
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Decode MusicXML bytes into a `{ document, warnings }` object
///
/// # Parameters
/// - `bytes`: UTF-8 MusicXML, partwise or timewise
/// - `options`: optional `DecodeOptions` object, e.g. `{ enum_policy: "Strict" }`
#[wasm_bindgen(js_name = decodeMusicXML)]
pub fn decode_musicxml(bytes: &[u8], options: JsValue) -> Result<JsValue, JsValue> {
    let options: DecodeOptions = options_or_default(options, "Invalid decode options")?;
    let decoded = codec::decode_with(bytes, &options).map_err(|e| js_error("MusicXML decode error", e))?;

    log::info!(
        "decodeMusicXML: {} parts, {} warnings",
        decoded.document.part_count(),
        decoded.warnings.len()
    );

    serialize(&decoded, "Document serialization error")
}

/// Encode a document object (as produced by `decodeMusicXML`) back to MusicXML bytes
#[wasm_bindgen(js_name = encodeMusicXML)]
pub fn encode_musicxml(document: JsValue, options: JsValue) -> Result<Vec<u8>, JsValue> {
    let document: ScoreDocument = deserialize(document, "Invalid document")?;
    let options: EncodeOptions = options_or_default(options, "Invalid encode options")?;
    codec::encode_with(&document, &options).map_err(|e| js_error("MusicXML encode error", e))
}

/// Decode and re-encode, producing canonical formatting
#[wasm_bindgen(js_name = normalizeMusicXML)]
pub fn normalize_musicxml(bytes: &[u8]) -> Result<String, JsValue> {
    normalize(bytes).map_err(|e| js_error("MusicXML normalize error", e))
}

/// Decode and render the document tree as pretty-printed JSON
#[wasm_bindgen(js_name = musicXMLToJson)]
pub fn musicxml_to_json(bytes: &[u8]) -> Result<String, JsValue> {
    to_json(bytes).map_err(|e| js_error("MusicXML to JSON error", e))
}

// ============================================================================
// NATIVE IMPLEMENTATIONS
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn normalize(bytes: &[u8]) -> Result<String, ApiError> {
    let document = codec::decode(bytes)?;
    Ok(codec::encode_to_string(&document, &EncodeOptions::default())?)
}

pub fn to_json(bytes: &[u8]) -> Result<String, ApiError> {
    let document = codec::decode(bytes)?;
    Ok(serde_json::to_string_pretty(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORE: &str = r#"<score-partwise version="4.0"><part-list><score-part id="P1"><part-name>Voice</part-name></score-part></part-list><part id="P1"><measure number="1"><note><pitch><step>G</step><octave>4</octave></pitch><duration>1</duration></note></measure></part></score-partwise>"#;

    #[test]
    fn test_normalize_is_stable() {
        let once = normalize(SCORE.as_bytes()).expect("normalize should succeed");
        let twice = normalize(once.as_bytes()).expect("normalize should succeed");
        assert_eq!(once, twice);
        assert!(once.contains("\n  <part-list>"));
    }

    #[test]
    fn test_json_contains_typed_tree() {
        let json = to_json(SCORE.as_bytes()).expect("to_json should succeed");
        let value: serde_json::Value = serde_json::from_str(&json).expect("output is JSON");
        let step = &value["Partwise"]["parts"][0]["measures"][0]["music_data"][0]["Note"]["full_note"]["content"]["Pitch"]["step"];
        assert_eq!(step, "G");
    }

    #[test]
    fn test_decode_errors_pass_through() {
        let err = normalize(b"<opus/>").expect_err("wrong root must fail");
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(err.to_string().starts_with("unexpected root element <opus>"));
    }
}
