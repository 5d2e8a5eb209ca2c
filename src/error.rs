//! Error types and error reporting for indentation settings.
//!
//! The engine itself never fails: unknown languages fall back and
//! unmatched lines preserve their indentation. Errors only surface at the
//! edges, when a caller asks for the reason a registry mutation was
//! refused or when a settings file cannot be compiled into rules.
//!
//! # Error Types
//!
//! - [`RegistryError`] - Why a registration or update was refused
//! - [`ConfigError`] - Problems compiling declarative settings
//!
//! # Pretty Printing
//!
//! Use [`ErrorReporter`] to point at the offending spot in a settings file:
//!
//! ```rust
//! use jupyter_autoindent::error::ErrorReporter;
//! use jupyter_autoindent::IndentSettings;
//!
//! let source = r#"{ "languages": [ { "language": "ruby", "tabSize": 0 } ] }"#;
//! let reporter = ErrorReporter::new("indent.json", source);
//!
//! if let Err(err) = IndentSettings::from_json(source).and_then(|s| s.into_options()) {
//!     // reporter.report_config_error(&err); // Prints colorful error
//!     assert!(err.to_string().contains("ruby"));
//! }
//! ```

use ariadne::{Color, Label, Report, ReportKind, Source};
use std::ops::Range;
use thiserror::Error;

/// Reasons a registry mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A config (or alias) already occupies this key.
    #[error("language '{language}' already registered; use update_config to modify it")]
    AlreadyRegistered { language: String },

    /// No config is registered under this key.
    #[error("cannot update '{language}': not registered")]
    UnknownLanguage { language: String },

    /// Tab sizes must be positive.
    #[error("invalid tab size {tab_size} for '{language}': must be at least 1")]
    InvalidTabSize { language: String, tab_size: usize },
}

/// Errors raised while loading or compiling declarative settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A rule pattern is not a valid regular expression.
    #[error("invalid pattern for rule '{rule}' in '{language}': {source}")]
    InvalidPattern {
        language: String,
        rule: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A language declared a zero tab size.
    #[error("invalid tab size {tab_size} for '{language}': must be at least 1")]
    InvalidTabSize { language: String, tab_size: usize },

    /// An alias points at a language that is neither built in nor declared.
    #[error("alias '{alias}' targets unknown language '{target}'")]
    UnknownAliasTarget { alias: String, target: String },

    /// The settings document is not valid JSON for the settings schema.
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),

    /// The settings file could not be read.
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Best-effort location of this error inside `source`.
    ///
    /// JSON errors carry a line/column; pattern and tab size errors are
    /// located by searching for the offending text.
    pub fn span_in(&self, source: &str) -> Option<Range<usize>> {
        match self {
            ConfigError::Json(err) if err.line() > 0 => {
                let start = line_column_offset(source, err.line(), err.column());
                Some(start..(start + 1).min(source.len()).max(start))
            }
            ConfigError::InvalidPattern { pattern, .. } => {
                // Patterns are JSON-escaped in the file, so try both forms.
                let escaped = serde_json::to_string(pattern).ok()?;
                let needle = escaped.trim_matches('"');
                find_span(source, needle).or_else(|| find_span(source, pattern))
            }
            ConfigError::InvalidTabSize { language, .. } => {
                find_span(source, &format!("\"{}\"", language))
            }
            ConfigError::UnknownAliasTarget { alias, .. } => {
                find_span(source, &format!("\"{}\"", alias))
            }
            _ => None,
        }
    }
}

fn find_span(source: &str, needle: &str) -> Option<Range<usize>> {
    source.find(needle).map(|start| start..start + needle.len())
}

fn line_column_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

/// Error reporter that uses ariadne for pretty error output.
pub struct ErrorReporter<'src> {
    source_name: String,
    source: &'src str,
}

impl<'src> ErrorReporter<'src> {
    /// Create a new error reporter.
    pub fn new(source_name: impl Into<String>, source: &'src str) -> Self {
        Self {
            source_name: source_name.into(),
            source,
        }
    }

    /// Report a settings error to stderr.
    pub fn report_config_error(&self, error: &ConfigError) -> std::io::Result<()> {
        let span = error.span_in(self.source).unwrap_or(0..0);

        let mut report = Report::build(ReportKind::Error, &self.source_name, span.start)
            .with_message(error.to_string())
            .with_label(
                Label::new((&self.source_name, span))
                    .with_color(Color::Red)
                    .with_message("here"),
            );

        if let ConfigError::InvalidPattern { pattern, .. } = error {
            report = report.with_note(format!("pattern: {}", pattern));
        }
        if matches!(error, ConfigError::InvalidTabSize { .. }) {
            report = report.with_help("tabSize must be a positive integer");
        }

        report
            .finish()
            .eprint((&self.source_name, Source::from(self.source)))
    }
}
