//! Pixel Price Calculator: an installable, offline-capable price calculator.
//!
//! The library holds everything that does not need a DOM: the pricing
//! formula, preferences, translations, the manifest model, the form reducer
//! and the offline cache worker. The page (`src/main.rs`) and the service
//! worker (`src/bin/service_worker.rs`) are thin shells over it.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod manifest;
pub mod offline;
pub mod preferences;
pub mod pricing;
pub mod registration;
pub mod state;
pub mod utils;

pub use error::PriceError;
pub use preferences::{Direction, Language, Preferences, Theme};
pub use pricing::{CalculationInput, Mode, PriceFormula, Quote, RateCardFormula};

/// Price a set of form values from JavaScript.
///
/// `inputs` is a plain object of field name to string value; `mode` is
/// `"auto"` or `"manual"`. Returns the serialized [`Quote`].
#[wasm_bindgen(js_name = quotePrice)]
pub fn quote_price(inputs: JsValue, mode: &str) -> Result<JsValue, JsValue> {
    let inputs: CalculationInput = serde_wasm_bindgen::from_value(inputs)
        .map_err(|e| JsValue::from_str(&format!("Failed to read inputs: {e}")))?;
    let mode: Mode = mode.parse().map_err(|e: String| JsValue::from_str(&e))?;

    let formula = RateCardFormula::bundled().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let quote = formula
        .compute(&inputs, mode)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&quote).map_err(|e| JsValue::from_str(&e.to_string()))
}
