//! Lexical expansion
//!
//! Given a word that scored, a lexicon proposes semantically related words:
//! synonyms, broader terms and narrower terms across every sense of the word.

mod ollama;
pub mod wordnet;

pub use ollama::OllamaLexicon;
pub use wordnet::WordNetLexicon;

use crate::core::{Language, Word};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("no entry for '{word}' in {language}")]
    Miss { word: Word, language: Language },

    #[error("no lemma table for {0}")]
    UnsupportedLanguage(Language),

    #[error("failed to read '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("lexicon request failed: {0}")]
    Remote(#[from] reqwest::Error),

    #[error("unusable lexicon response: {0}")]
    Response(String),
}

/// A source of words related to a given word
pub trait Lexicon: Send + Sync {
    /// Related words for `word` in `language`, without duplicates
    fn related(
        &self,
        word: &Word,
        language: Language,
    ) -> impl Future<Output = Result<Vec<Word>, LexiconError>> + Send;

    /// Human-readable backend name (for logs)
    fn name(&self) -> &str;
}

/// Lexicon that never proposes anything
///
/// The search then relies on seed words and nearby lists only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLexicon;

impl Lexicon for NoLexicon {
    async fn related(&self, _word: &Word, _language: Language) -> Result<Vec<Word>, LexiconError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Runtime choice of lexicon backend
///
/// Allows runtime selection while keeping static dispatch.
pub enum LexiconBackend {
    WordNet(WordNetLexicon),
    Ollama(OllamaLexicon),
    None(NoLexicon),
}

impl Lexicon for LexiconBackend {
    async fn related(&self, word: &Word, language: Language) -> Result<Vec<Word>, LexiconError> {
        match self {
            Self::WordNet(lexicon) => lexicon.related(word, language).await,
            Self::Ollama(lexicon) => lexicon.related(word, language).await,
            Self::None(lexicon) => lexicon.related(word, language).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::WordNet(lexicon) => lexicon.name(),
            Self::Ollama(lexicon) => lexicon.name(),
            Self::None(lexicon) => lexicon.name(),
        }
    }
}
