//! # jupyter-autoindent
//!
//! Language-aware automatic indentation for notebook code cells.
//!
//! Given the text of the line the cursor is on, the engine decides how far
//! the next line should be indented, using per-language rule tables held in
//! a shared registry.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`engine`] | Indent calculation, tab strings, outdent, normalization |
//! | [`registry`] | Language configs, aliases, default-language fallback |
//! | [`languages`] | Built-in Python, JavaScript and TypeScript rules |
//! | [`config`] | JSON settings compiled into registry options |
//! | [`editing`] | Enter / Tab / Shift+Tab as text edits |
//! | [`error`] | Error types and diagnostics rendering |
//!
//! The `wasm` feature adds JavaScript bindings.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! jupyter-autoindent = "0.1"
//! ```
//!
//! ```rust
//! use jupyter_autoindent::{AutoIndentEngine, IndentContext};
//!
//! let engine = AutoIndentEngine::default();
//!
//! let result = engine.calculate_indent(&IndentContext::new("function f() {", "js"));
//! assert_eq!(result.spaces, 2);
//!
//! let result = engine.calculate_indent(&IndentContext::new("    return x", "py"));
//! assert!(result.should_dedent);
//! ```

pub mod config;
pub mod editing;
pub mod engine;
pub mod error;
pub mod languages;
pub mod registry;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::IndentSettings;
pub use editing::{apply_edits, handle_key, Key, KeyOutcome, Selection, TextEdit};
pub use engine::{leading_whitespace, leading_whitespace_width, AutoIndentEngine};
pub use error::{ConfigError, ErrorReporter, RegistryError};
pub use registry::LanguageIndentRegistry;
pub use types::{
    AutoIndentOptions, ConfigUpdate, CustomIndentRule, DedentRule, IndentContext, IndentResult,
    IndentRule, LanguageIndentConfig, RuleContext,
};
