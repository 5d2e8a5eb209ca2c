//! AutoIndent engine.
//!
//! Computes the indentation for the line following the cursor from the
//! text of the current line. Evaluation runs in three phases, each
//! first-match-wins:
//!
//! 1. **Indent triggers**: the line opens a block; add the rule's amount.
//! 2. **Dedent triggers**: only if no indent trigger fired; the line ends a
//!    block. The width is left alone and [`IndentResult::should_dedent`]
//!    tells the caller to pull the following line back.
//! 3. **Custom rules**: always evaluated; the first matching rule rewrites
//!    the width computed so far.
//!
//! ```rust
//! use jupyter_autoindent::{AutoIndentEngine, IndentContext};
//!
//! let engine = AutoIndentEngine::default();
//! let result = engine.calculate_indent(&IndentContext::new("if x > 0:", "python"));
//!
//! assert_eq!(result.spaces, 4);
//! assert!(result.should_indent);
//! assert_eq!(result.triggered_rule.as_deref(), Some("colon-indent"));
//! ```

use std::sync::Arc;

use crate::registry::LanguageIndentRegistry;
use crate::types::{DedentRule, IndentContext, IndentResult, IndentRule, RuleContext};

/// Width of a tab when measuring existing indentation.
///
/// Independent of the language's `tab_size`, which only
/// governs the indentation the engine produces.
pub const MEASURE_TAB_WIDTH: usize = 4;

/// Engine for calculating language-aware indentation.
#[derive(Debug, Clone)]
pub struct AutoIndentEngine {
    registry: Arc<LanguageIndentRegistry>,
    debug: bool,
}

impl Default for AutoIndentEngine {
    fn default() -> Self {
        Self::new(Arc::new(LanguageIndentRegistry::new()), false)
    }
}

impl AutoIndentEngine {
    /// Create an engine over a (possibly shared) registry.
    pub fn new(registry: Arc<LanguageIndentRegistry>, debug: bool) -> Self {
        Self { registry, debug }
    }

    pub fn registry(&self) -> &Arc<LanguageIndentRegistry> {
        &self.registry
    }

    /// Calculate the indentation for the line after `context.current_line`.
    pub fn calculate_indent(&self, context: &IndentContext) -> IndentResult {
        let line = context.current_line.as_str();
        let current_line_indent = leading_whitespace_width(line);

        // Blank lines only carry their own width forward.
        if line.trim().is_empty() {
            return IndentResult::preserve(current_line_indent);
        }

        let config = self.registry.get_config_or_default(Some(context.language.as_str()));

        let mut result = IndentResult::preserve(current_line_indent);

        if let Some(rule) = config
            .indent_triggers
            .iter()
            .find(|rule| matches_indent_rule(line, context.previous_line.as_deref(), rule))
        {
            result.spaces = current_line_indent + rule.indent_amount;
            result.should_indent = true;
            result.triggered_rule = Some(rule.name.clone());
        }

        if !result.should_indent {
            if let Some(rule) = config
                .dedent_triggers
                .iter()
                .find(|rule| matches_dedent_rule(line, rule))
            {
                result.should_dedent = true;
                result.triggered_rule = Some(rule.name.clone());
            }
        }

        if let Some(rule) = config
            .custom_rules
            .iter()
            .find(|rule| rule.matches(line, context))
        {
            result.spaces = rule.apply(result.spaces, context);
            if self.debug {
                tracing::trace!(target: "autoindent::engine", rule = %rule.name, "custom rule applied");
            }
        }

        if self.debug {
            tracing::debug!(
                target: "autoindent::engine",
                language = %config.language,
                line,
                spaces = result.spaces,
                should_indent = result.should_indent,
                should_dedent = result.should_dedent,
                rule = result.triggered_rule.as_deref().unwrap_or("-"),
                "calculated indent"
            );
        }

        result
    }

    /// String inserted for one Tab press: a tab character or `tab_size` spaces.
    pub fn get_tab_string(&self, language: Option<&str>) -> String {
        let config = self.registry.get_config_or_default(language);
        if config.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(config.tab_size)
        }
    }

    /// Width of one indentation level.
    pub fn get_tab_size(&self, language: Option<&str>) -> usize {
        self.registry.get_config_or_default(language).tab_size
    }

    /// Whether the language indents with tab characters.
    pub fn uses_tabs(&self, language: Option<&str>) -> bool {
        self.registry.get_config_or_default(language).use_tabs
    }

    /// Indentation after one Shift+Tab, never below zero.
    pub fn calculate_outdent(&self, current_indent: usize, language: Option<&str>) -> usize {
        current_indent.saturating_sub(self.get_tab_size(language))
    }

    /// Leading tabs and spaces of `line`.
    pub fn get_leading_whitespace<'a>(&self, line: &'a str) -> &'a str {
        leading_whitespace(line)
    }

    /// Rewrite the leading whitespace of `line` in the language's style.
    ///
    /// With tabs: the prefix width (tabs counted as `tab_size`) becomes
    /// whole tabs plus remainder spaces. With spaces: every leading tab
    /// becomes `tab_size` spaces. The rest of the line is untouched.
    pub fn normalize_indentation(&self, line: &str, language: Option<&str>) -> String {
        let config = self.registry.get_config_or_default(language);
        let prefix = leading_whitespace(line);
        let rest = &line[prefix.len()..];

        let normalized = if config.use_tabs {
            let width = whitespace_width(prefix, config.tab_size);
            let mut out = "\t".repeat(width / config.tab_size);
            out.push_str(&" ".repeat(width % config.tab_size));
            out
        } else {
            prefix.replace('\t', &" ".repeat(config.tab_size))
        };

        normalized + rest
    }
}

/// Leading run of tabs and spaces.
pub fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Width of the leading whitespace, tabs counted as [`MEASURE_TAB_WIDTH`].
pub fn leading_whitespace_width(line: &str) -> usize {
    whitespace_width(leading_whitespace(line), MEASURE_TAB_WIDTH)
}

fn whitespace_width(prefix: &str, tab_width: usize) -> usize {
    prefix
        .chars()
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum()
}

fn matches_indent_rule(line: &str, previous_line: Option<&str>, rule: &IndentRule) -> bool {
    let matched = match rule.context {
        RuleContext::LineEnd | RuleContext::LineStart | RuleContext::Anywhere => {
            rule.pattern.is_match(line)
        }
    };
    if !matched {
        return false;
    }

    if let Some(required) = &rule.requires_previous_match {
        if !previous_line.is_some_and(|prev| required.is_match(prev)) {
            return false;
        }
    }

    !rule.unless.is_some_and(|guard| guard(line))
}

fn matches_dedent_rule(line: &str, rule: &DedentRule) -> bool {
    match rule.context {
        RuleContext::LineStart | RuleContext::Anywhere => rule.pattern.is_match(line),
        // Dedent rules are not defined for line ends.
        RuleContext::LineEnd => false,
    }
}
