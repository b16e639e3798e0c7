//! Wiring shared by every command: settings, store, lexicon and engines

use crate::config::{LexiconKind, Settings};
use crate::core::Language;
use crate::lexicon::{LexiconBackend, NoLexicon, OllamaLexicon, WordNetLexicon};
use crate::oracle::CemantixOracle;
use crate::solver::{EngineContext, Orchestrator, SearchEngine};
use crate::store::SessionStore;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Upper bound on one model generation
const MODEL_TIMEOUT: Duration = Duration::from_secs(60);

/// Engine type used by the binary
pub type Engine = SearchEngine<CemantixOracle, LexiconBackend>;

/// Settings plus what every command derives from them
#[derive(Debug, Clone)]
pub struct AppContext {
    pub settings: Settings,
    pub store: SessionStore,
    pub languages: Vec<Language>,
    pub day: NaiveDate,
}

impl AppContext {
    /// Context for today's games in the given languages
    ///
    /// Languages are de-duplicated, keeping the order they were given in.
    #[must_use]
    pub fn new(settings: Settings, languages: &[Language]) -> Self {
        let mut unique = Vec::new();
        for &language in languages {
            if !unique.contains(&language) {
                unique.push(language);
            }
        }

        Self {
            store: SessionStore::new(&settings.data_dir),
            settings,
            languages: unique,
            day: Local::now().date_naive(),
        }
    }

    #[must_use]
    pub fn ranking_size(&self) -> usize {
        self.settings.display.ranking_size
    }
}

/// Build the configured lexicon
///
/// A lexicon that cannot be loaded is reported and replaced by one that
/// never proposes anything, so the search still runs on seeds alone.
#[must_use]
pub fn load_lexicon(settings: &Settings) -> LexiconBackend {
    match settings.lexicon.backend {
        LexiconKind::WordNet => {
            let dir = settings.wordnet_dir();
            match WordNetLexicon::load(&dir) {
                Ok(lexicon) => {
                    info!(dir = %dir.display(), languages = ?lexicon.languages(), "using WordNet");
                    LexiconBackend::WordNet(lexicon.with_plural_fallback(settings.lexicon.plural_fallback))
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "WordNet unavailable, searching without a lexicon");
                    LexiconBackend::None(NoLexicon)
                }
            }
        }
        LexiconKind::Ollama => match OllamaLexicon::new(
            &settings.lexicon.ollama_url,
            &settings.lexicon.ollama_model,
            MODEL_TIMEOUT,
        ) {
            Ok(lexicon) => LexiconBackend::Ollama(lexicon),
            Err(e) => {
                warn!(error = %e, "Ollama client unavailable, searching without a lexicon");
                LexiconBackend::None(NoLexicon)
            }
        },
        LexiconKind::None => LexiconBackend::None(NoLexicon),
    }
}

/// Open today's session for one language
///
/// # Errors
/// Fails if the HTTP client cannot be built or the session files cannot be
/// read.
pub fn open_engine(
    context: &AppContext,
    language: Language,
    lexicon: &Arc<LexiconBackend>,
) -> Result<Engine> {
    let url = context.settings.oracle_url(language);
    let oracle = CemantixOracle::new(url, context.settings.oracle_timeout())
        .with_context(|| format!("failed to set up the {} client for {url}", language.title()))?;

    SearchEngine::open(EngineContext {
        language,
        day: context.day,
        oracle,
        lexicon: Arc::clone(lexicon),
        store: context.store.clone(),
        settings: context.settings.search_settings(),
    })
    .with_context(|| format!("failed to open the {language} session"))
}

/// Open one engine per selected language
///
/// # Errors
/// Fails if the data directory cannot be prepared or any session cannot be
/// opened.
pub fn open_orchestrator(
    context: &AppContext,
    lexicon: LexiconBackend,
) -> Result<Orchestrator<CemantixOracle, LexiconBackend>> {
    context
        .store
        .ensure_layout(&context.languages)
        .context("failed to prepare the data directory")?;

    let lexicon = Arc::new(lexicon);
    let mut orchestrator = Orchestrator::new();
    for &language in &context.languages {
        orchestrator.insert(open_engine(context, language, &lexicon)?);
    }
    Ok(orchestrator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages_are_deduplicated_in_order() {
        let context = AppContext::new(
            Settings::default(),
            &[Language::French, Language::English, Language::French],
        );
        assert_eq!(context.languages, [Language::French, Language::English]);
        assert_eq!(context.ranking_size(), 25);
    }

    #[test]
    fn missing_wordnet_falls_back_to_no_lexicon() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_dir: dir.path().to_path_buf(),
            ..Settings::default()
        };
        assert!(matches!(load_lexicon(&settings), LexiconBackend::None(_)));
    }

    #[test]
    fn orchestrator_prepares_layout() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_dir: dir.path().to_path_buf(),
            ..Settings::default()
        };
        let context = AppContext::new(settings, &[Language::French]);
        let orchestrator = open_orchestrator(&context, LexiconBackend::None(NoLexicon)).unwrap();

        assert_eq!(orchestrator.languages(), [Language::French]);
        assert!(dir.path().join("Dicts/fr.txt").is_file());
    }
}
