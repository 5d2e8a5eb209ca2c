//! Built-in language rule tables.

pub mod javascript;
pub mod python;

pub use javascript::{
    is_in_template_literal, is_javascript_comment, javascript_indent_config,
    typescript_indent_config,
};
pub use python::{
    is_colon_in_string_or_comment, is_in_multiline_string, is_python_comment,
    python_indent_config,
};

use crate::types::LanguageIndentConfig;

/// Built-in configs in registration order.
pub fn builtin_configs() -> Vec<LanguageIndentConfig> {
    vec![
        python_indent_config(),
        javascript_indent_config(),
        typescript_indent_config(),
    ]
}

/// Canonical names of the built-in languages.
pub const BUILTIN_LANGUAGES: [&str; 3] = ["python", "javascript", "typescript"];

/// Built-in `(alias, target)` pairs in registration order.
pub const BUILTIN_ALIASES: [(&str, &str); 5] = [
    ("py", "python"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("jsx", "javascript"),
    ("tsx", "typescript"),
];
