//! Settings file
//!
//! Every key is optional; missing keys take the defaults below. Command-line
//! flags override whatever the file says.
//!
//! ```toml
//! data_dir = "/home/me/cemantix"
//!
//! [search]
//! delay_min_ms = 100
//! delay_max_ms = 500
//!
//! [lexicon]
//! backend = "ollama"
//!
//! [languages.fr]
//! url = "https://cemantix.certitudes.org"
//! ```

use crate::core::Language;
use crate::solver::{Politeness, SearchSettings};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// A failed save is always retried at least once
pub const MIN_PERSIST_ATTEMPTS: u32 = 2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed config '{path}': {source}", path = path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub oracle_timeout_secs: u64,
    pub max_retries: u32,
    pub persist_attempts: u32,
    pub autosave_every: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            delay_min_ms: 100,
            delay_max_ms: 500,
            oracle_timeout_secs: 10,
            max_retries: 2,
            persist_attempts: 3,
            autosave_every: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub ranking_size: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { ranking_size: 25 }
    }
}

/// Which source of related words to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexiconKind {
    #[default]
    WordNet,
    Ollama,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LexiconConfig {
    pub backend: LexiconKind,
    /// Relative paths are resolved against the data directory
    pub wordnet_dir: PathBuf,
    pub plural_fallback: bool,
    pub ollama_url: String,
    pub ollama_model: String,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            backend: LexiconKind::WordNet,
            wordnet_dir: PathBuf::from("wordnet"),
            plural_fallback: true,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LanguageConfig {
    pub url: Option<String>,
}

/// Complete runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub search: SearchConfig,
    pub display: DisplayConfig,
    pub lexicon: LexiconConfig,
    pub languages: BTreeMap<Language, LanguageConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            search: SearchConfig::default(),
            display: DisplayConfig::default(),
            lexicon: LexiconConfig::default(),
            languages: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when no file is given
    ///
    /// # Errors
    /// Returns a `ConfigError` if the file cannot be read or parsed, or
    /// holds an invalid combination of values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// # Errors
    /// Returns `ConfigError::Invalid` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let search = &self.search;
        if search.delay_min_ms > search.delay_max_ms {
            return Err(ConfigError::Invalid {
                key: "search.delay_min_ms",
                message: format!(
                    "{} is above search.delay_max_ms ({})",
                    search.delay_min_ms, search.delay_max_ms
                ),
            });
        }
        if search.persist_attempts < MIN_PERSIST_ATTEMPTS {
            return Err(ConfigError::Invalid {
                key: "search.persist_attempts",
                message: format!("must be at least {MIN_PERSIST_ATTEMPTS}"),
            });
        }
        if search.oracle_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "search.oracle_timeout_secs",
                message: "must be positive".to_string(),
            });
        }
        if self.display.ranking_size == 0 {
            return Err(ConfigError::Invalid {
                key: "display.ranking_size",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.search.oracle_timeout_secs)
    }

    #[must_use]
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            politeness: Politeness::new(
                Duration::from_millis(self.search.delay_min_ms),
                Duration::from_millis(self.search.delay_max_ms),
            ),
            oracle_timeout: self.oracle_timeout(),
            max_retries: self.search.max_retries,
            persist_attempts: self.search.persist_attempts,
            autosave_every: self.search.autosave_every,
        }
    }

    /// Game server for a language, falling back to the public one
    #[must_use]
    pub fn oracle_url(&self, language: Language) -> &str {
        self.languages
            .get(&language)
            .and_then(|config| config.url.as_deref())
            .unwrap_or_else(|| language.default_url())
    }

    #[must_use]
    pub fn wordnet_dir(&self) -> PathBuf {
        if self.lexicon.wordnet_dir.is_absolute() {
            self.lexicon.wordnet_dir.clone()
        } else {
            self.data_dir.join(&self.lexicon.wordnet_dir)
        }
    }

    #[must_use]
    pub fn error_log(&self) -> PathBuf {
        self.data_dir.join("error.log")
    }
}
