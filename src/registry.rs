//! Language indentation registry.
//!
//! Central registry mapping language identifiers to their indentation
//! rules. Lookups are case-insensitive, aliases (`py` → `python`) resolve
//! to their target's current config, and [`LanguageIndentRegistry::get_config_or_default`]
//! always produces something the engine can evaluate.
//!
//! The registry is read-mostly. Mutations take a write lock so that a
//! registry shared through an `Arc` can be updated while other threads
//! are resolving configs; resolved configs are `Arc` snapshots and stay
//! valid after the registry changes.
//!
//! ```rust
//! use jupyter_autoindent::LanguageIndentRegistry;
//!
//! let registry = LanguageIndentRegistry::new();
//! let config = registry.get_config(Some("Python")).unwrap();
//! assert_eq!(config.tab_size, 4);
//! assert!(registry.has_language(Some("tsx")));
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::RegistryError;
use crate::languages::{builtin_configs, BUILTIN_ALIASES};
use crate::types::{AutoIndentOptions, ConfigUpdate, LanguageIndentConfig};

const DEFAULT_FALLBACK_TAB_SIZE: usize = 4;

/// A registry slot: either a config or a pointer at a canonical key.
#[derive(Debug, Clone)]
enum Entry {
    Language(Arc<LanguageIndentConfig>),
    Alias(String),
}

/// Registry for language indentation configurations.
#[derive(Debug)]
pub struct LanguageIndentRegistry {
    entries: RwLock<IndexMap<String, Entry>>,
    default_language: String,
    debug: bool,
    fallback_tab_size: usize,
    preserve_tabs: bool,
}

impl Default for LanguageIndentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageIndentRegistry {
    /// Create a registry seeded with the built-in languages.
    pub fn new() -> Self {
        Self::with_options(AutoIndentOptions::default())
    }

    /// Create a registry with custom options.
    ///
    /// Built-in languages and aliases are registered first, so a custom
    /// config reusing a built-in name is ignored.
    pub fn with_options(options: AutoIndentOptions) -> Self {
        let registry = Self {
            entries: RwLock::new(builtin_entries()),
            default_language: options.default_language,
            debug: options.debug,
            fallback_tab_size: options.fallback_tab_size,
            preserve_tabs: options.preserve_tabs,
        };

        for config in options.custom_configs {
            registry.register_language(config);
        }
        for (alias, target) in &options.custom_aliases {
            registry.register_alias(alias, target);
        }

        registry
    }

    /// Language used for absent or unknown lookup keys.
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Register a language configuration under `config.language`.
    ///
    /// The key is used as given. If it is already taken, or the config has
    /// a zero tab size, the call is a no-op; use [`Self::update_config`] to
    /// modify an existing language.
    pub fn register_language(&self, config: LanguageIndentConfig) {
        if let Err(err) = self.try_register_language(config) {
            if self.debug {
                tracing::warn!(target: "autoindent::registry", "{}", err);
            }
        }
    }

    /// Like [`Self::register_language`], reporting why a registration was refused.
    pub fn try_register_language(&self, config: LanguageIndentConfig) -> Result<(), RegistryError> {
        if self.debug {
            tracing::debug!(
                target: "autoindent::registry",
                language = %config.language,
                tab_size = config.tab_size,
                "registering language"
            );
        }
        insert_language(&mut self.entries.write(), config)
    }

    /// Make `alias` resolve to `target_language`.
    ///
    /// Silently skipped when the target is not registered. A language
    /// registered under `alias` is replaced, and aliases that pointed at
    /// it follow the new target.
    pub fn register_alias(&self, alias: &str, target_language: &str) {
        let registered = insert_alias(&mut self.entries.write(), alias, target_language);
        if !registered && self.debug {
            tracing::warn!(
                target: "autoindent::registry",
                alias,
                to = target_language,
                "alias target not registered; skipped"
            );
        }
    }

    /// Get the configuration for a language.
    ///
    /// `None` or an empty key looks up the default language.
    pub fn get_config(&self, language: Option<&str>) -> Option<Arc<LanguageIndentConfig>> {
        let language = match language {
            Some(language) if !language.is_empty() => language,
            _ => self.default_language.as_str(),
        };

        let entries = self.entries.read();
        Self::resolve(&entries, &normalize(language))
    }

    fn resolve(entries: &IndexMap<String, Entry>, key: &str) -> Option<Arc<LanguageIndentConfig>> {
        match entries.get(key)? {
            Entry::Language(config) => Some(Arc::clone(config)),
            Entry::Alias(target) => match entries.get(target)? {
                Entry::Language(config) => Some(Arc::clone(config)),
                Entry::Alias(_) => None,
            },
        }
    }

    /// Get the configuration for a language, never failing.
    ///
    /// Falls back to the default language, then to a minimal config with
    /// no rules.
    pub fn get_config_or_default(&self, language: Option<&str>) -> Arc<LanguageIndentConfig> {
        if let Some(config) = self.get_config(language) {
            return config;
        }

        if let Some(config) = self.get_config(Some(self.default_language.as_str())) {
            if self.debug {
                tracing::warn!(
                    target: "autoindent::registry",
                    language = language.unwrap_or_default(),
                    default = %self.default_language,
                    "language not found, using default"
                );
            }
            return config;
        }

        if self.debug {
            tracing::error!(
                target: "autoindent::registry",
                language = language.unwrap_or_default(),
                default = %self.default_language,
                "no config found and default language missing"
            );
        }
        Arc::new(self.fallback_config(language.filter(|l| !l.is_empty()).unwrap_or("unknown")))
    }

    fn fallback_config(&self, language: &str) -> LanguageIndentConfig {
        let tab_size = match self.fallback_tab_size {
            0 => DEFAULT_FALLBACK_TAB_SIZE,
            n => n,
        };
        LanguageIndentConfig::new(language, tab_size, self.preserve_tabs)
    }

    /// Whether a config or alias is registered under this key.
    pub fn has_language(&self, language: Option<&str>) -> bool {
        match language {
            Some(language) if !language.is_empty() => {
                self.entries.read().contains_key(&normalize(language))
            }
            _ => false,
        }
    }

    /// Merge `updates` over an existing config.
    ///
    /// Returns `false` when the language is not registered or the update
    /// is invalid. Updating through an alias updates its target.
    pub fn update_config(&self, language: &str, updates: ConfigUpdate) -> bool {
        match self.try_update_config(language, updates) {
            Ok(()) => true,
            Err(err) => {
                if self.debug {
                    tracing::warn!(target: "autoindent::registry", "{}", err);
                }
                false
            }
        }
    }

    /// Like [`Self::update_config`], reporting why an update was refused.
    pub fn try_update_config(&self, language: &str, updates: ConfigUpdate) -> Result<(), RegistryError> {
        let normalized = normalize(language);

        if updates.tab_size == Some(0) {
            return Err(RegistryError::InvalidTabSize {
                language: language.to_string(),
                tab_size: 0,
            });
        }

        let mut entries = self.entries.write();

        let key = match entries.get(&normalized) {
            Some(Entry::Alias(target)) => target.clone(),
            Some(Entry::Language(_)) => normalized,
            None => {
                return Err(RegistryError::UnknownLanguage {
                    language: language.to_string(),
                })
            }
        };

        let Some(Entry::Language(existing)) = entries.get(&key) else {
            return Err(RegistryError::UnknownLanguage {
                language: language.to_string(),
            });
        };

        let updated = existing.merged(updates);
        if self.debug {
            tracing::debug!(
                target: "autoindent::registry",
                language = %key,
                tab_size = updated.tab_size,
                use_tabs = updated.use_tabs,
                "updated config"
            );
        }
        entries.insert(key, Entry::Language(Arc::new(updated)));
        Ok(())
    }

    /// Registered keys (languages and aliases) in registration order.
    pub fn registered_languages(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Remove every config and alias.
    pub fn clear(&self) {
        self.entries.write().clear();
        if self.debug {
            tracing::debug!(target: "autoindent::registry", "cleared all configurations");
        }
    }

    /// Drop custom configs and restore the built-in languages.
    ///
    /// The seeded table is swapped in under one write lock, so concurrent
    /// readers never observe a partially seeded registry.
    pub fn reset(&self) {
        let seeded = builtin_entries();
        *self.entries.write() = seeded;
        if self.debug {
            tracing::debug!(target: "autoindent::registry", "reset to default configurations");
        }
    }
}

fn builtin_entries() -> IndexMap<String, Entry> {
    let mut entries = IndexMap::new();
    for config in builtin_configs() {
        // Built-in tables are distinct and have positive tab sizes.
        let _ = insert_language(&mut entries, config);
    }
    for (alias, target) in BUILTIN_ALIASES {
        insert_alias(&mut entries, alias, target);
    }
    entries
}

fn insert_language(
    entries: &mut IndexMap<String, Entry>,
    config: LanguageIndentConfig,
) -> Result<(), RegistryError> {
    if config.tab_size == 0 {
        return Err(RegistryError::InvalidTabSize {
            language: config.language,
            tab_size: 0,
        });
    }
    if entries.contains_key(&config.language) {
        return Err(RegistryError::AlreadyRegistered {
            language: config.language,
        });
    }
    entries.insert(config.language.clone(), Entry::Language(Arc::new(config)));
    Ok(())
}

/// Returns `false` when the target is missing or is the alias itself.
fn insert_alias(entries: &mut IndexMap<String, Entry>, alias: &str, target: &str) -> bool {
    let canonical = match entries.get(target) {
        Some(Entry::Language(_)) => target.to_string(),
        Some(Entry::Alias(canonical)) => canonical.clone(),
        None => return false,
    };
    if canonical == alias {
        return false;
    }

    if matches!(entries.get(alias), Some(Entry::Language(_))) {
        for entry in entries.values_mut() {
            if matches!(entry, Entry::Alias(pointee) if pointee.as_str() == alias) {
                *entry = Entry::Alias(canonical.clone());
            }
        }
    }

    entries.insert(alias.to_string(), Entry::Alias(canonical));
    true
}

fn normalize(language: &str) -> String {
    language.trim().to_lowercase()
}
