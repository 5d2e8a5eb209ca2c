//! Integration tests for the language registry as seen through the engine.

use std::sync::Arc;
use std::thread;

use jupyter_autoindent::editing::indent_string;
use jupyter_autoindent::{
    AutoIndentEngine, AutoIndentOptions, ConfigUpdate, CustomIndentRule, DedentRule,
    IndentContext, IndentRule, LanguageIndentConfig, LanguageIndentRegistry, RegistryError,
    RuleContext,
};
use pretty_assertions::assert_eq;
use regex::Regex;

fn ruby_config() -> LanguageIndentConfig {
    let mut config = LanguageIndentConfig::new("ruby", 2, false);
    config.indent_triggers.push(IndentRule::new(
        "block-start",
        Regex::new(r"\b(do|then)\s*(\|[^|]*\|)?\s*$").unwrap(),
        RuleContext::LineEnd,
        2,
    ));
    config.dedent_triggers.push(DedentRule::new(
        "return",
        Regex::new(r"^\s*return\b").unwrap(),
        RuleContext::LineStart,
        2,
    ));
    config.custom_rules.push(CustomIndentRule::dedent_on(
        "end-dedent",
        Regex::new(r"^\s*end\b").unwrap(),
        2,
    ));
    config
}

#[test]
fn test_custom_language_through_options() {
    let registry = LanguageIndentRegistry::with_options(AutoIndentOptions {
        custom_configs: vec![ruby_config()],
        custom_aliases: vec![("rb".to_string(), "ruby".to_string())],
        ..AutoIndentOptions::default()
    });
    let engine = AutoIndentEngine::new(Arc::new(registry), false);

    let result = engine.calculate_indent(&IndentContext::new("items.each do |item|", "rb"));
    assert_eq!(result.spaces, 2);
    assert_eq!(result.triggered_rule.as_deref(), Some("block-start"));

    let result = engine.calculate_indent(&IndentContext::new("    end", "ruby"));
    assert_eq!(result.spaces, 2);
    assert!(!result.should_indent);

    assert!(engine.calculate_indent(&IndentContext::new("  return x", "RB")).should_dedent);
}

#[test]
fn test_builtins_win_over_custom_configs() {
    let registry = LanguageIndentRegistry::with_options(AutoIndentOptions {
        custom_configs: vec![LanguageIndentConfig::new("python", 8, true)],
        ..AutoIndentOptions::default()
    });

    let python = registry.get_config(Some("python")).unwrap();
    assert_eq!(python.tab_size, 4);
    assert!(!python.use_tabs);
}

#[test]
fn test_try_register_reports_duplicates() {
    let registry = LanguageIndentRegistry::new();
    assert_eq!(registry.try_register_language(ruby_config()), Ok(()));
    assert_eq!(
        registry.try_register_language(LanguageIndentConfig::new("ruby", 8, false)),
        Err(RegistryError::AlreadyRegistered {
            language: "ruby".to_string()
        })
    );
    assert_eq!(registry.get_config(Some("ruby")).unwrap().tab_size, 2);
}

#[test]
fn test_zero_tab_size_never_reaches_engine() {
    let registry = Arc::new(LanguageIndentRegistry::with_options(AutoIndentOptions {
        custom_configs: vec![LanguageIndentConfig::new("make", 0, true)],
        ..AutoIndentOptions::default()
    }));
    let engine = AutoIndentEngine::new(Arc::clone(&registry), false);

    assert!(!registry.has_language(Some("make")));
    assert_eq!(engine.get_tab_size(Some("make")), 4);
    assert_eq!(engine.normalize_indentation("\t  x", Some("make")), "      x");
    assert_eq!(indent_string(&engine, 6, Some("make")), "      ");

    assert_eq!(
        registry.try_register_language(LanguageIndentConfig::new("make", 0, true)),
        Err(RegistryError::InvalidTabSize {
            language: "make".to_string(),
            tab_size: 0
        })
    );
}

#[test]
fn test_alias_replaces_registered_language() {
    let registry = LanguageIndentRegistry::new();
    registry.register_language(LanguageIndentConfig::new("ipython", 8, false));
    assert_eq!(registry.get_config(Some("ipython")).unwrap().tab_size, 8);

    registry.register_alias("ipython", "python");

    let config = registry.get_config(Some("ipython")).unwrap();
    assert_eq!(config.language, "python");
    assert_eq!(config.tab_size, 4);
}

#[test]
fn test_alias_sees_later_updates() {
    let registry = Arc::new(LanguageIndentRegistry::new());
    let engine = AutoIndentEngine::new(Arc::clone(&registry), false);

    registry.register_alias("ipython", "py");
    assert!(registry.update_config("python", ConfigUpdate::default().use_tabs(true)));

    assert_eq!(engine.get_tab_string(Some("ipython")), "\t");
    assert_eq!(engine.get_tab_string(Some("py")), "\t");
    assert!(Arc::ptr_eq(
        &registry.get_config(Some("ipython")).unwrap(),
        &registry.get_config(Some("python")).unwrap()
    ));
}

#[test]
fn test_update_keeps_unrelated_fields() {
    let registry = LanguageIndentRegistry::new();
    let before = registry.get_config(Some("javascript")).unwrap();

    assert!(registry.update_config("JS", ConfigUpdate::default().tab_size(4)));

    let after = registry.get_config(Some("javascript")).unwrap();
    assert_eq!(after.language, "javascript");
    assert_eq!(after.tab_size, 4);
    assert_eq!(after.use_tabs, before.use_tabs);
    assert_eq!(after.indent_triggers.len(), before.indent_triggers.len());
    assert_eq!(after.custom_rules.len(), before.custom_rules.len());
}

#[test]
fn test_try_update_reasons() {
    let registry = LanguageIndentRegistry::new();
    assert_eq!(
        registry.try_update_config("go", ConfigUpdate::default().tab_size(4)),
        Err(RegistryError::UnknownLanguage {
            language: "go".to_string()
        })
    );
    assert!(matches!(
        registry.try_update_config("python", ConfigUpdate::default().tab_size(0)),
        Err(RegistryError::InvalidTabSize { tab_size: 0, .. })
    ));
}

#[test]
fn test_reset_drops_custom_state() {
    let registry = LanguageIndentRegistry::new();
    registry.register_language(ruby_config());
    registry.update_config("python", ConfigUpdate::default().tab_size(2));

    registry.reset();

    assert!(!registry.has_language(Some("ruby")));
    assert!(registry.has_language(Some("tsx")));
    assert_eq!(registry.get_config(Some("python")).unwrap().tab_size, 4);
}

#[test]
fn test_cleared_registry_still_answers() {
    let registry = Arc::new(LanguageIndentRegistry::new());
    registry.clear();
    let engine = AutoIndentEngine::new(Arc::clone(&registry), false);

    assert!(registry.registered_languages().is_empty());
    assert_eq!(engine.get_tab_size(Some("python")), 4);
    assert_eq!(
        engine
            .calculate_indent(&IndentContext::new("if x:", "python"))
            .spaces,
        0
    );
}

#[test]
fn test_readers_and_writers_share_registry() {
    let registry = Arc::new(LanguageIndentRegistry::new());
    let engine = AutoIndentEngine::new(Arc::clone(&registry), false);

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let result = engine.calculate_indent(&IndentContext::new("if x:", "py"));
                    assert!(result.should_indent);
                    assert_eq!(result.spaces, 4);
                    let tab = engine.get_tab_string(Some("python"));
                    assert!(tab == "\t" || tab == "    ");
                }
            })
        })
        .collect();

    for use_tabs in [true, false, true, false] {
        registry.update_config("python", ConfigUpdate::default().use_tabs(use_tabs));
    }

    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_reset_is_atomic_for_readers() {
    let registry = Arc::new(LanguageIndentRegistry::new());
    let engine = AutoIndentEngine::new(Arc::clone(&registry), false);

    let resetter = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for _ in 0..2_000 {
                registry.reset();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let result = engine.calculate_indent(&IndentContext::new("if x:", "py"));
                    assert_eq!(result.triggered_rule.as_deref(), Some("colon-indent"));
                    assert_eq!(engine.get_tab_string(Some("js")), "  ");
                }
            })
        })
        .collect();

    resetter.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}
