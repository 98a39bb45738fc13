//! MusicXML WASM API
//!
//! # Module Structure
//!
//! - `helpers`: serialization to and from `JsValue`, error conversion
//! - `codec`: decode, encode, normalize and JSON export

pub mod codec;
pub mod helpers;

pub use codec::{decode_musicxml, encode_musicxml, musicxml_to_json, normalize_musicxml, ApiError};
