//! WebAssembly bindings for the indentation engine.
//!
//! All functions share one engine seeded with the built-in languages.
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { calculate_indent, get_tab_string } from './jupyter_autoindent.js';
//!
//! await init();
//!
//! const result = calculate_indent("if ready:", "python", 0);
//! console.log(result.spaces, result.triggeredRule);
//!
//! editor.insertText(get_tab_string("javascript"));
//! ```

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::engine::AutoIndentEngine;
use crate::types::IndentContext;

thread_local! {
    static ENGINE: RefCell<AutoIndentEngine> = RefCell::new(AutoIndentEngine::default());
}

fn with_engine<T>(f: impl FnOnce(&AutoIndentEngine) -> T) -> T {
    ENGINE.with(|engine| f(&engine.borrow()))
}

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Replace the shared engine with one built from a JSON settings document.
///
/// # Returns
/// * `Ok(())` - The new engine is in place
/// * `Err(JsValue)` - The settings could not be parsed or compiled
#[wasm_bindgen]
pub fn configure(settings_json: &str) -> Result<(), JsValue> {
    let settings = crate::config::IndentSettings::from_json(settings_json)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let debug = settings.debug;
    let registry = crate::registry::LanguageIndentRegistry::with_settings(settings)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    ENGINE.with(|engine| {
        *engine.borrow_mut() = AutoIndentEngine::new(std::sync::Arc::new(registry), debug);
    });
    Ok(())
}

/// Calculate the indentation for the line after `line`.
///
/// # Returns
/// * `Ok(JsValue)` - The `IndentResult` as a JavaScript object
/// * `Err(JsValue)` - Error message if serialization fails
#[wasm_bindgen]
pub fn calculate_indent(line: &str, language: &str, current_indent: usize) -> Result<JsValue, JsValue> {
    let context = IndentContext::new(line, language).with_current_indent(current_indent);
    let result = with_engine(|engine| engine.calculate_indent(&context));
    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[wasm_bindgen]
pub fn get_tab_string(language: Option<String>) -> String {
    with_engine(|engine| engine.get_tab_string(language.as_deref()))
}

#[wasm_bindgen]
pub fn get_tab_size(language: Option<String>) -> usize {
    with_engine(|engine| engine.get_tab_size(language.as_deref()))
}

#[wasm_bindgen]
pub fn calculate_outdent(current_indent: usize, language: Option<String>) -> usize {
    with_engine(|engine| engine.calculate_outdent(current_indent, language.as_deref()))
}

/// Rewrite the leading whitespace of `line` in the language's style.
#[wasm_bindgen]
pub fn normalize_indentation(line: &str, language: Option<String>) -> String {
    with_engine(|engine| engine.normalize_indentation(line, language.as_deref()))
}

/// Registered language keys, aliases included.
#[wasm_bindgen]
pub fn registered_languages() -> Vec<String> {
    with_engine(|engine| engine.registry().registered_languages())
}

/// Get the version of the engine.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
