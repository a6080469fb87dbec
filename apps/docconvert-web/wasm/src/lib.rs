//! WASM client for the document conversion upload page
//!
//! All page state lives in `docconvert-core`; this crate owns the DOM
//! listeners, fetch calls and timers and applies the controller's effects.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { UploadApp } from './pkg/docconvert_wasm.js';
//!
//! await init();
//!
//! // Defaults match the stock page; override ids or endpoints as needed
//! const app = new UploadApp(JSON.stringify({ api_base: "" }));
//! console.log(app.strategy, app.selectedCount());
//! ```

pub mod app;
pub mod dom;
pub mod files;
pub mod http;
pub mod logging;
pub mod render;
pub mod timer;

use wasm_bindgen::prelude::*;

pub use app::UploadApp;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "docconvert wasm loaded");
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Format bytes as human-readable string
#[wasm_bindgen]
pub fn format_bytes(bytes: f64) -> String {
    docconvert_core::format_bytes(bytes.max(0.0) as u64)
}

/// Default client configuration as JSON, for pages that tweak a few fields
#[wasm_bindgen(js_name = defaultConfig)]
pub fn default_config() -> Result<String, JsValue> {
    serde_json::to_string(&docconvert_core::ClientConfig::default())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
