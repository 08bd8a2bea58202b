//! WASM bindings for invoice and bill structuring.
//!
//! Only the text half of the pipeline is exposed: acquisition needs native
//! programs and models, so callers pass text they already extracted (from a
//! PDF text layer or browser-side OCR).

use serde::Serialize;
use wasm_bindgen::prelude::*;

use billscan_core::invoice::rules::parse_amount as parse_amount_token;
use billscan_core::models::config::ExtractionConfig;
use billscan_core::TextStructurer;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Maps, large integers and optionals serialize the way `JSON.parse` would produce them.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn compile(rules_json: Option<&str>) -> Result<TextStructurer, String> {
    let config = match rules_json {
        Some(json) => serde_json::from_str::<ExtractionConfig>(json).map_err(|e| format!("invalid rules: {}", e))?,
        None => ExtractionConfig::default(),
    };
    TextStructurer::new(&config).map_err(|e| e.to_string())
}

/// Extract structured invoice data from text using the default rules.
#[wasm_bindgen]
pub fn extract_invoice_from_text(text: &str) -> Result<JsValue, JsValue> {
    let structurer = compile(None).map_err(|e| JsValue::from_str(&e))?;
    to_js(&structurer.structure(text))
}

/// The default field rules and table signatures, as accepted by `InvoiceExtractor`.
#[wasm_bindgen]
pub fn default_rules() -> Result<JsValue, JsValue> {
    to_js(&ExtractionConfig::default())
}

/// Parse a table amount such as `1,234.56`, `1.234,56` or `$40.00`.
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> Option<f64> {
    use rust_decimal::prelude::ToPrimitive;
    parse_amount_token(amount).and_then(|d| d.to_f64())
}

/// Invoice extractor with a custom rule set, compiled once.
#[wasm_bindgen]
pub struct InvoiceExtractor {
    structurer: TextStructurer,
}

#[wasm_bindgen]
impl InvoiceExtractor {
    /// Create an extractor from a rules JSON string, or the defaults when omitted.
    #[wasm_bindgen(constructor)]
    pub fn new(rules_json: Option<String>) -> Result<InvoiceExtractor, JsValue> {
        let structurer = compile(rules_json.as_deref()).map_err(|e| JsValue::from_str(&e))?;
        Ok(Self { structurer })
    }

    /// Extract invoice data from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.structurer.structure(text))
    }

    /// Extract invoice data from text, returned as a JSON string.
    #[wasm_bindgen(js_name = extractJson)]
    pub fn extract_json(&self, text: &str) -> Result<String, JsValue> {
        serde_json::to_string(&self.structurer.structure(text)).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
