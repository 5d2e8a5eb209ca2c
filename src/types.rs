//! Rule and configuration types for language-aware indentation.
//!
//! Rules are heuristic: each one is a regular expression over the text of a
//! single line. A [`LanguageIndentConfig`] bundles the ordered rule lists for
//! one language together with its tab preferences.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a rule pattern is expected to match.
///
/// Every context is currently evaluated as a regex test over the whole
/// line; the pattern itself carries any `^`/`$` anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleContext {
    LineEnd,
    LineStart,
    Anywhere,
}

/// Predicate that vetoes an otherwise matching rule.
pub type LineGuard = fn(&str) -> bool;

/// Rule for increasing indentation after a line.
#[derive(Debug, Clone)]
pub struct IndentRule {
    /// Identifier reported in [`IndentResult::triggered_rule`].
    pub name: String,
    pub pattern: Regex,
    pub context: RuleContext,
    /// Width added on top of the line's own indentation.
    pub indent_amount: usize,
    /// Only apply when the previous line also matches this pattern.
    pub requires_previous_match: Option<Regex>,
    /// Skip the rule when this returns `true` for the line.
    pub unless: Option<LineGuard>,
}

impl IndentRule {
    /// Create a rule with no previous-line requirement and no guard.
    pub fn new(
        name: impl Into<String>,
        pattern: Regex,
        context: RuleContext,
        indent_amount: usize,
    ) -> Self {
        Self {
            name: name.into(),
            pattern,
            context,
            indent_amount,
            requires_previous_match: None,
            unless: None,
        }
    }

    pub fn requires_previous_match(mut self, pattern: Regex) -> Self {
        self.requires_previous_match = Some(pattern);
        self
    }

    pub fn unless(mut self, guard: LineGuard) -> Self {
        self.unless = Some(guard);
        self
    }
}

/// Rule marking a line that ends a block (e.g. `return`).
///
/// The dedent amount is informational: it describes how far the caller
/// should pull back the line that follows.
#[derive(Debug, Clone)]
pub struct DedentRule {
    pub name: String,
    pub pattern: Regex,
    pub context: RuleContext,
    pub dedent_amount: usize,
}

impl DedentRule {
    pub fn new(
        name: impl Into<String>,
        pattern: Regex,
        context: RuleContext,
        dedent_amount: usize,
    ) -> Self {
        Self {
            name: name.into(),
            pattern,
            context,
            dedent_amount,
        }
    }
}

type Condition = dyn Fn(&str, &IndentContext) -> bool + Send + Sync;
type Apply = dyn Fn(usize, &IndentContext) -> usize + Send + Sync;

/// Escape hatch evaluated after the indent and dedent triggers.
///
/// `condition` decides whether the rule fires for a line; `apply` maps the
/// indentation computed so far to the new one.
#[derive(Clone)]
pub struct CustomIndentRule {
    pub name: String,
    condition: Arc<Condition>,
    apply: Arc<Apply>,
}

impl CustomIndentRule {
    pub fn new<C, A>(name: impl Into<String>, condition: C, apply: A) -> Self
    where
        C: Fn(&str, &IndentContext) -> bool + Send + Sync + 'static,
        A: Fn(usize, &IndentContext) -> usize + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            condition: Arc::new(condition),
            apply: Arc::new(apply),
        }
    }

    /// Rule that fires when `pattern` matches the line and pulls the
    /// indentation back by `amount`, stopping at zero.
    pub fn dedent_on(name: impl Into<String>, pattern: Regex, amount: usize) -> Self {
        Self::new(
            name,
            move |line, _| pattern.is_match(line),
            move |indent, _| indent.saturating_sub(amount),
        )
    }

    pub fn matches(&self, line: &str, context: &IndentContext) -> bool {
        (self.condition)(line, context)
    }

    pub fn apply(&self, current_indent: usize, context: &IndentContext) -> usize {
        (self.apply)(current_indent, context)
    }
}

impl fmt::Debug for CustomIndentRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomIndentRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Indentation rules for a single language.
#[derive(Debug, Clone)]
pub struct LanguageIndentConfig {
    /// Canonical language identifier (e.g. `python`).
    pub language: String,
    /// Width of one indentation level.
    pub tab_size: usize,
    /// Insert tab characters rather than spaces.
    pub use_tabs: bool,
    pub indent_triggers: Vec<IndentRule>,
    pub dedent_triggers: Vec<DedentRule>,
    pub custom_rules: Vec<CustomIndentRule>,
}

impl LanguageIndentConfig {
    /// An empty rule set: lines keep their indentation.
    pub fn new(language: impl Into<String>, tab_size: usize, use_tabs: bool) -> Self {
        Self {
            language: language.into(),
            tab_size,
            use_tabs,
            indent_triggers: Vec::new(),
            dedent_triggers: Vec::new(),
            custom_rules: Vec::new(),
        }
    }

    /// Copy of this config under a different language tag.
    pub fn with_language(&self, language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..self.clone()
        }
    }

    /// Merge `update` over this config. List fields are replaced wholesale
    /// and the language tag is always kept.
    pub fn merged(&self, update: ConfigUpdate) -> Self {
        Self {
            language: self.language.clone(),
            tab_size: update.tab_size.unwrap_or(self.tab_size),
            use_tabs: update.use_tabs.unwrap_or(self.use_tabs),
            indent_triggers: update
                .indent_triggers
                .unwrap_or_else(|| self.indent_triggers.clone()),
            dedent_triggers: update
                .dedent_triggers
                .unwrap_or_else(|| self.dedent_triggers.clone()),
            custom_rules: update
                .custom_rules
                .unwrap_or_else(|| self.custom_rules.clone()),
        }
    }
}

/// Partial update for [`LanguageIndentConfig`]; `None` keeps the field.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub tab_size: Option<usize>,
    pub use_tabs: Option<bool>,
    pub indent_triggers: Option<Vec<IndentRule>>,
    pub dedent_triggers: Option<Vec<DedentRule>>,
    pub custom_rules: Option<Vec<CustomIndentRule>>,
}

impl ConfigUpdate {
    pub fn tab_size(mut self, tab_size: usize) -> Self {
        self.tab_size = Some(tab_size);
        self
    }

    pub fn use_tabs(mut self, use_tabs: bool) -> Self {
        self.use_tabs = Some(use_tabs);
        self
    }

    pub fn indent_triggers(mut self, rules: Vec<IndentRule>) -> Self {
        self.indent_triggers = Some(rules);
        self
    }

    pub fn dedent_triggers(mut self, rules: Vec<DedentRule>) -> Self {
        self.dedent_triggers = Some(rules);
        self
    }

    pub fn custom_rules(mut self, rules: Vec<CustomIndentRule>) -> Self {
        self.custom_rules = Some(rules);
        self
    }
}

/// Per-call input for [`crate::AutoIndentEngine::calculate_indent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndentContext {
    /// Text of the line the cursor is leaving.
    pub current_line: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_line: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_lines: Vec<String>,
    /// Language identifier; empty means the registry's default language.
    #[serde(default)]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_position: Option<usize>,
    /// Base indentation in spaces.
    #[serde(default)]
    pub current_indent: usize,
}

impl IndentContext {
    pub fn new(current_line: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            current_line: current_line.into(),
            language: language.into(),
            ..Self::default()
        }
    }

    pub fn with_current_indent(mut self, current_indent: usize) -> Self {
        self.current_indent = current_indent;
        self
    }

    pub fn with_previous_line(mut self, previous_line: impl Into<String>) -> Self {
        self.previous_line = Some(previous_line.into());
        self
    }

    pub fn with_cursor_position(mut self, cursor_position: usize) -> Self {
        self.cursor_position = Some(cursor_position);
        self
    }
}

/// Indentation decision for the line following [`IndentContext::current_line`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndentResult {
    /// Resulting indentation width.
    pub spaces: usize,
    pub should_indent: bool,
    pub should_dedent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_rule: Option<String>,
}

impl IndentResult {
    /// Keep `spaces` as is; nothing fired.
    pub fn preserve(spaces: usize) -> Self {
        Self {
            spaces,
            ..Self::default()
        }
    }
}

/// Registry construction options.
#[derive(Debug, Clone)]
pub struct AutoIndentOptions {
    /// Language used when a lookup key is absent or unknown.
    pub default_language: String,
    /// Extra languages registered after the built-ins.
    pub custom_configs: Vec<LanguageIndentConfig>,
    /// Extra `(alias, target)` pairs registered after `custom_configs`.
    pub custom_aliases: Vec<(String, String)>,
    /// Emit registry warnings for refused mutations.
    pub debug: bool,
    /// Tab size of the synthesized fallback config; `0` means 4.
    pub fallback_tab_size: usize,
    /// Whether the synthesized fallback config uses tabs.
    pub preserve_tabs: bool,
}

impl Default for AutoIndentOptions {
    fn default() -> Self {
        Self {
            default_language: "python".to_string(),
            custom_configs: Vec::new(),
            custom_aliases: Vec::new(),
            debug: false,
            fallback_tab_size: 4,
            preserve_tabs: false,
        }
    }
}
