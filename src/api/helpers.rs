//! Shared helpers for the WASM API
//!
//! Serialization between Rust values and `JsValue`, plus the conversion
//! of codec errors into JavaScript exceptions.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

/// Deserialize a value from JavaScript, reporting failures as a JS error
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| js_error(error_context, e))
}

/// Serialize a value for JavaScript, reporting failures as a JS error
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| js_error(error_context, e))
}

/// Deserialize an optional options object; `undefined` and `null` give the defaults
pub fn options_or_default<T: DeserializeOwned + Default>(value: JsValue, error_context: &str) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    deserialize(value, error_context)
}

/// Log an error and wrap it as a JS string exception
pub fn js_error(context: &str, error: impl Display) -> JsValue {
    let message = format!("{}: {}", context, error);
    log::error!("{}", message);
    JsValue::from_str(&message)
}
