//! Declarative indentation settings.
//!
//! Settings are JSON documents using the same option names as the editor
//! plugin (`defaultLanguage`, `fallbackTabSize`, ...) plus a `languages`
//! list. Rule patterns are regular expressions written as strings; custom
//! rules pick one of a fixed set of actions since closures cannot be
//! written down.
//!
//! ```json
//! {
//!   "defaultLanguage": "python",
//!   "languages": [
//!     {
//!       "language": "ruby",
//!       "tabSize": 2,
//!       "aliases": ["rb"],
//!       "indentTriggers": [
//!         { "name": "block-start", "pattern": "\\b(do|then)\\s*$" }
//!       ],
//!       "dedentTriggers": [
//!         { "name": "return", "pattern": "^\\s*return\\b" }
//!       ],
//!       "customRules": [
//!         { "name": "end-dedent", "pattern": "^\\s*end\\b", "action": { "type": "dedent" } }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::languages::{BUILTIN_ALIASES, BUILTIN_LANGUAGES};
use crate::registry::LanguageIndentRegistry;
use crate::types::{
    AutoIndentOptions, CustomIndentRule, DedentRule, IndentRule, LanguageIndentConfig, RuleContext,
};

/// Top-level settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct IndentSettings {
    pub default_language: String,
    pub debug: bool,
    pub fallback_tab_size: usize,
    pub preserve_tabs: bool,
    pub languages: Vec<LanguageSpec>,
    /// Extra `alias -> language` pairs, registered after every language.
    pub aliases: IndexMap<String, String>,
}

impl Default for IndentSettings {
    fn default() -> Self {
        let options = AutoIndentOptions::default();
        Self {
            default_language: options.default_language,
            debug: options.debug,
            fallback_tab_size: options.fallback_tab_size,
            preserve_tabs: options.preserve_tabs,
            languages: Vec::new(),
            aliases: IndexMap::new(),
        }
    }
}

/// One language's rules, as written in a settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LanguageSpec {
    pub language: String,
    pub tab_size: usize,
    #[serde(default)]
    pub use_tabs: bool,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub indent_triggers: Vec<IndentRuleSpec>,
    #[serde(default)]
    pub dedent_triggers: Vec<DedentRuleSpec>,
    #[serde(default)]
    pub custom_rules: Vec<CustomRuleSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IndentRuleSpec {
    pub name: String,
    pub pattern: String,
    #[serde(default = "line_end")]
    pub context: RuleContext,
    /// Defaults to the language's tab size.
    #[serde(default)]
    pub indent_amount: Option<usize>,
    #[serde(default)]
    pub requires_previous_match: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DedentRuleSpec {
    pub name: String,
    pub pattern: String,
    #[serde(default = "line_start")]
    pub context: RuleContext,
    /// Defaults to the language's tab size.
    #[serde(default)]
    pub dedent_amount: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomRuleSpec {
    pub name: String,
    /// Fires when this pattern matches the current line.
    pub pattern: String,
    pub action: CustomAction,
}

/// What a declarative custom rule does to the computed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CustomAction {
    /// Pull back by `amount` (default: tab size), stopping at zero.
    Dedent {
        #[serde(default)]
        amount: Option<usize>,
    },
    /// Push in by `amount` (default: tab size).
    Indent {
        #[serde(default)]
        amount: Option<usize>,
    },
    /// Leave the width alone; stops later custom rules from firing.
    Keep,
    /// Force an absolute width.
    Set { spaces: usize },
}

fn line_end() -> RuleContext {
    RuleContext::LineEnd
}

fn line_start() -> RuleContext {
    RuleContext::LineStart
}

impl IndentSettings {
    /// Parse a settings document.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read and parse a settings file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    /// Compile every language spec into registry options.
    ///
    /// Top-level aliases must target a built-in language or alias, or one
    /// declared in this document.
    pub fn into_options(self) -> Result<AutoIndentOptions, ConfigError> {
        let mut custom_configs = Vec::with_capacity(self.languages.len());
        let mut custom_aliases = Vec::new();

        for spec in &self.languages {
            custom_configs.push(spec.compile()?);
        }

        for spec in &self.languages {
            for alias in &spec.aliases {
                custom_aliases.push((alias.clone(), spec.language.clone()));
            }
        }

        for (alias, target) in &self.aliases {
            let known = BUILTIN_LANGUAGES.contains(&target.as_str())
                || BUILTIN_ALIASES.iter().any(|(builtin, _)| *builtin == target.as_str())
                || custom_aliases.iter().any(|(declared, _)| declared == target)
                || self.languages.iter().any(|spec| &spec.language == target);
            if !known {
                return Err(ConfigError::UnknownAliasTarget {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
            custom_aliases.push((alias.clone(), target.clone()));
        }

        Ok(AutoIndentOptions {
            default_language: self.default_language,
            custom_configs,
            custom_aliases,
            debug: self.debug,
            fallback_tab_size: self.fallback_tab_size,
            preserve_tabs: self.preserve_tabs,
        })
    }
}

impl LanguageSpec {
    /// Compile patterns and actions into a [`LanguageIndentConfig`].
    pub fn compile(&self) -> Result<LanguageIndentConfig, ConfigError> {
        if self.tab_size == 0 {
            return Err(ConfigError::InvalidTabSize {
                language: self.language.clone(),
                tab_size: self.tab_size,
            });
        }

        let mut config = LanguageIndentConfig::new(&self.language, self.tab_size, self.use_tabs);

        for rule in &self.indent_triggers {
            let mut compiled = IndentRule::new(
                &rule.name,
                self.regex(&rule.name, &rule.pattern)?,
                rule.context,
                rule.indent_amount.unwrap_or(self.tab_size),
            );
            if let Some(previous) = &rule.requires_previous_match {
                compiled = compiled.requires_previous_match(self.regex(&rule.name, previous)?);
            }
            config.indent_triggers.push(compiled);
        }

        for rule in &self.dedent_triggers {
            config.dedent_triggers.push(DedentRule::new(
                &rule.name,
                self.regex(&rule.name, &rule.pattern)?,
                rule.context,
                rule.dedent_amount.unwrap_or(self.tab_size),
            ));
        }

        for rule in &self.custom_rules {
            let pattern = self.regex(&rule.name, &rule.pattern)?;
            config
                .custom_rules
                .push(custom_rule(&rule.name, pattern, rule.action, self.tab_size));
        }

        Ok(config)
    }

    fn regex(&self, rule: &str, pattern: &str) -> Result<Regex, ConfigError> {
        Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            language: self.language.clone(),
            rule: rule.to_string(),
            pattern: pattern.to_string(),
            source,
        })
    }
}

fn custom_rule(name: &str, pattern: Regex, action: CustomAction, tab_size: usize) -> CustomIndentRule {
    match action {
        CustomAction::Dedent { amount } => {
            CustomIndentRule::dedent_on(name, pattern, amount.unwrap_or(tab_size))
        }
        CustomAction::Indent { amount } => {
            let amount = amount.unwrap_or(tab_size);
            CustomIndentRule::new(
                name,
                move |line, _| pattern.is_match(line),
                move |indent, _| indent + amount,
            )
        }
        CustomAction::Keep => {
            CustomIndentRule::new(name, move |line, _| pattern.is_match(line), |indent, _| indent)
        }
        CustomAction::Set { spaces } => {
            CustomIndentRule::new(name, move |line, _| pattern.is_match(line), move |_, _| spaces)
        }
    }
}

impl LanguageIndentRegistry {
    /// Build a registry from a settings document.
    pub fn with_settings(settings: IndentSettings) -> Result<Self, ConfigError> {
        Ok(Self::with_options(settings.into_options()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IndentContext;
    use pretty_assertions::assert_eq;

    const RUBY: &str = r#"{
        "languages": [{
            "language": "ruby",
            "tabSize": 2,
            "aliases": ["rb"],
            "indentTriggers": [
                { "name": "block-start", "pattern": "\\b(do|then)\\s*$" }
            ],
            "dedentTriggers": [
                { "name": "return", "pattern": "^\\s*return\\b", "dedentAmount": 2 }
            ],
            "customRules": [
                { "name": "end-dedent", "pattern": "^\\s*end\\b", "action": { "type": "dedent" } }
            ]
        }]
    }"#;

    #[test]
    fn test_defaults_match_options() {
        let settings = IndentSettings::from_json("{}").unwrap();
        assert_eq!(settings, IndentSettings::default());
        assert_eq!(settings.default_language, "python");
        assert_eq!(settings.fallback_tab_size, 4);
    }

    #[test]
    fn test_compile_ruby() {
        let options = IndentSettings::from_json(RUBY).unwrap().into_options().unwrap();
        assert_eq!(options.custom_aliases, vec![("rb".to_string(), "ruby".to_string())]);

        let ruby = &options.custom_configs[0];
        assert_eq!(ruby.language, "ruby");
        assert_eq!(ruby.indent_triggers[0].indent_amount, 2);
        assert_eq!(ruby.indent_triggers[0].context, RuleContext::LineEnd);
        assert_eq!(ruby.dedent_triggers[0].context, RuleContext::LineStart);

        let ctx = IndentContext::new("  end", "ruby");
        assert!(ruby.custom_rules[0].matches("  end", &ctx));
        assert_eq!(ruby.custom_rules[0].apply(4, &ctx), 2);
    }

    #[test]
    fn test_actions() {
        let ctx = IndentContext::default();
        let pattern = Regex::new("x").unwrap();
        assert_eq!(
            custom_rule("i", pattern.clone(), CustomAction::Indent { amount: Some(3) }, 4).apply(1, &ctx),
            4
        );
        assert_eq!(custom_rule("k", pattern.clone(), CustomAction::Keep, 4).apply(7, &ctx), 7);
        assert_eq!(
            custom_rule("s", pattern, CustomAction::Set { spaces: 0 }, 4).apply(7, &ctx),
            0
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let source = r#"{"languages": [{"language": "x", "tabSize": 2,
            "indentTriggers": [{"name": "broken", "pattern": "(("}]}]}"#;
        let err = IndentSettings::from_json(source).unwrap().into_options().unwrap_err();
        match err {
            ConfigError::InvalidPattern { language, rule, .. } => {
                assert_eq!(language, "x");
                assert_eq!(rule, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_tab_size_rejected() {
        let source = r#"{"languages": [{"language": "x", "tabSize": 0}]}"#;
        let err = IndentSettings::from_json(source).unwrap().into_options().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTabSize { tab_size: 0, .. }));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = IndentSettings::from_json(r#"{"tabsize": 2}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_top_level_aliases() {
        let source = r#"{"aliases": {"python3": "py", "ipython": "python"}}"#;
        let options = IndentSettings::from_json(source).unwrap().into_options().unwrap();
        assert_eq!(
            options.custom_aliases,
            vec![
                ("python3".to_string(), "py".to_string()),
                ("ipython".to_string(), "python".to_string()),
            ]
        );

        let source = r#"{"aliases": {"rb": "ruby"}}"#;
        let err = IndentSettings::from_json(source).unwrap().into_options().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAliasTarget { .. }));
    }

    #[test]
    fn test_registry_from_settings() {
        let registry =
            LanguageIndentRegistry::with_settings(IndentSettings::from_json(RUBY).unwrap()).unwrap();
        assert!(registry.has_language(Some("RB")));
        assert_eq!(registry.get_config(Some("rb")).unwrap().language, "ruby");
    }
}
