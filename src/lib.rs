//! MusicXML WASM Module
//!
//! A typed MusicXML 4.0 document model with a lossless decoder and encoder.
//! Both `score-partwise` and `score-timewise` documents are supported; the
//! JavaScript surface lives in [`api`].

#[macro_use]
pub mod codec;
pub mod model;
pub mod xml;
pub mod builder;
pub mod convert;
pub mod api;

// Re-export commonly used types
pub use builder::{MeasureBuilder, PartBuilder, ScoreBuilder};
pub use codec::{
    decode, decode_with, encode, encode_to_string, encode_with, DecodeError, DecodeErrorKind, DecodeOptions,
    Decoded, EncodeError, EncodeOptions, EnumPolicy,
};
pub use model::ScoreDocument;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("MusicXML WASM module initialized");
}
