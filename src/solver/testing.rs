//! In-memory oracle and lexicon for engine tests

use super::engine::{EngineContext, SearchSettings};
use super::frontier::Frontier;
use super::politeness::Politeness;
use crate::core::{Language, ScoreResult, SessionRecord, Word, words_from_slice};
use crate::lexicon::{Lexicon, LexiconError};
use crate::oracle::{Oracle, OracleError};
use crate::store::SessionStore;
use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

pub fn w(text: &str) -> Word {
    Word::new(text).unwrap()
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

pub fn found(score: f64) -> ScoreResult {
    ScoreResult::found(score)
}

/// Oracle answering from a fixed table; unknown words are `NotFound`
#[derive(Default)]
pub struct FakeOracle {
    pub scores: FxHashMap<Word, ScoreResult>,
    pub nearby: FxHashMap<Word, Vec<Word>>,
    pub yesterday: Option<Word>,
    /// Words whose requests fail at the transport level
    pub failing: FxHashSet<Word>,
    /// Words whose requests hang for seconds
    pub slow: FxHashSet<Word>,
    /// Words answered only after the given pause
    pub delayed: FxHashMap<Word, Duration>,
    /// Cancel the token once this many words were scored
    pub cancel_after: Option<(usize, CancellationToken)>,
    calls: Mutex<Vec<Word>>,
}

impl FakeOracle {
    pub fn with_scores(scores: &[(&str, ScoreResult)]) -> Self {
        Self {
            scores: scores.iter().map(|(text, result)| (w(text), *result)).collect(),
            ..Self::default()
        }
    }

    /// Every word sent to `score`, in order
    pub fn calls(&self) -> Vec<Word> {
        self.calls.lock().unwrap().clone()
    }
}

impl Oracle for FakeOracle {
    async fn score(&self, word: &Word) -> Result<ScoreResult, OracleError> {
        if self.slow.contains(word) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        if let Some(pause) = self.delayed.get(word) {
            tokio::time::sleep(*pause).await;
        }
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(word.clone());
            calls.len()
        };
        if let Some((after, token)) = &self.cancel_after
            && count >= *after
        {
            token.cancel();
        }
        if self.failing.contains(word) {
            return Err(OracleError::Malformed("boom".to_string()));
        }
        Ok(self.scores.get(word).copied().unwrap_or(ScoreResult::NotFound))
    }

    async fn nearby(&self, word: &Word) -> Result<Vec<Word>, OracleError> {
        Ok(self.nearby.get(word).cloned().unwrap_or_default())
    }

    async fn yesterday(&self) -> Result<Option<Word>, OracleError> {
        Ok(self.yesterday.clone())
    }
}

/// Lexicon answering from a fixed table; unknown words are a miss
#[derive(Default)]
pub struct FakeLexicon {
    related: FxHashMap<Word, Vec<Word>>,
}

impl FakeLexicon {
    pub fn with(entries: &[(&str, &[&str])]) -> Self {
        Self {
            related: entries
                .iter()
                .map(|(word, related)| (w(word), words_from_slice(related)))
                .collect(),
        }
    }
}

impl Lexicon for FakeLexicon {
    async fn related(&self, word: &Word, language: Language) -> Result<Vec<Word>, LexiconError> {
        self.related.get(word).cloned().ok_or_else(|| LexiconError::Miss {
            word: word.clone(),
            language,
        })
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub fn settings() -> SearchSettings {
    SearchSettings {
        politeness: Politeness::none(),
        oracle_timeout: Duration::from_millis(200),
        max_retries: 2,
        persist_attempts: 2,
        autosave_every: 0,
    }
}

pub fn context(
    dir: &TempDir,
    oracle: FakeOracle,
    lexicon: FakeLexicon,
) -> EngineContext<FakeOracle, FakeLexicon> {
    EngineContext {
        language: Language::French,
        day: day(),
        oracle,
        lexicon: Arc::new(lexicon),
        store: SessionStore::new(dir.path()),
        settings: settings(),
    }
}

/// Frontier whose pop order is the reverse of `words`
pub fn frontier(words: &[&str]) -> Frontier {
    let mut frontier = Frontier::new();
    frontier.extend(words_from_slice(words), &SessionRecord::new());
    frontier
}
