//! Runs one search engine per language
//!
//! Each language has its own engine, its own oracle and its own files; the
//! orchestrator only maps languages to engines and owns the worker tasks.

use super::engine::{EngineError, SearchEngine};
use super::events::EngineStatus;
use crate::core::{Language, ScoreResult, Word};
use crate::lexicon::Lexicon;
use crate::oracle::Oracle;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

struct Worker {
    cancel: CancellationToken,
    task: JoinHandle<Result<EngineStatus, EngineError>>,
}

struct Session<O, L> {
    engine: SearchEngine<O, L>,
    worker: Option<Worker>,
}

/// Language → engine mapping plus the tasks running them
pub struct Orchestrator<O, L> {
    sessions: BTreeMap<Language, Session<O, L>>,
}

impl<O, L> Default for Orchestrator<O, L> {
    fn default() -> Self {
        Self {
            sessions: BTreeMap::new(),
        }
    }
}

impl<O, L> Orchestrator<O, L>
where
    O: Oracle + 'static,
    L: Lexicon + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an engine, replacing any previous one for its language
    pub fn insert(&mut self, engine: SearchEngine<O, L>) {
        self.sessions
            .insert(engine.language(), Session { engine, worker: None });
    }

    #[must_use]
    pub fn engine(&self, language: Language) -> Option<&SearchEngine<O, L>> {
        self.sessions.get(&language).map(|session| &session.engine)
    }

    pub fn engines(&self) -> impl Iterator<Item = &SearchEngine<O, L>> {
        self.sessions.values().map(|session| &session.engine)
    }

    #[must_use]
    pub fn languages(&self) -> Vec<Language> {
        self.sessions.keys().copied().collect()
    }

    #[must_use]
    pub fn is_running(&self, language: Language) -> bool {
        self.sessions
            .get(&language)
            .and_then(|session| session.worker.as_ref())
            .is_some_and(|worker| !worker.task.is_finished())
    }

    /// Spawn the search loop for `language` on the current runtime
    ///
    /// Returns `false` if the language is unknown or already running. Must be
    /// called from within a tokio runtime.
    pub fn start(&mut self, language: Language, cancel: CancellationToken) -> bool {
        if self.is_running(language) {
            return false;
        }
        let Some(session) = self.sessions.get_mut(&language) else {
            return false;
        };

        let engine = session.engine.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move { engine.run(token).await });
        session.worker = Some(Worker { cancel, task });
        debug!(%language, "worker started");
        true
    }

    /// Ask a running search to stop without waiting for it
    pub fn request_stop(&self, language: Language) -> bool {
        match self.sessions.get(&language).and_then(|session| session.worker.as_ref()) {
            Some(worker) => {
                worker.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every running search without waiting
    pub fn cancel_all(&self) {
        for worker in self.sessions.values().filter_map(|session| session.worker.as_ref()) {
            worker.cancel.cancel();
        }
    }

    /// Stop a search and wait until it has saved its session
    ///
    /// Returns `Ok(None)` if nothing was running.
    ///
    /// # Errors
    /// Returns the engine's error if its final save failed or the task
    /// panicked.
    pub async fn stop(&mut self, language: Language) -> Result<Option<EngineStatus>, EngineError> {
        let Some(worker) = self
            .sessions
            .get_mut(&language)
            .and_then(|session| session.worker.take())
        else {
            return Ok(None);
        };
        worker.cancel.cancel();
        worker.task.await?.map(Some)
    }

    /// Collect the outcome of searches that ended on their own
    pub async fn reap(&mut self) -> Vec<(Language, Result<EngineStatus, EngineError>)> {
        let mut finished = Vec::new();
        for (&language, session) in &mut self.sessions {
            if session.worker.as_ref().is_some_and(|worker| worker.task.is_finished())
                && let Some(worker) = session.worker.take()
            {
                finished.push((language, flatten(worker.task.await)));
            }
        }
        finished
    }

    /// Wait for every running search to end
    pub async fn join_all(&mut self) -> Vec<(Language, Result<EngineStatus, EngineError>)> {
        let mut outcomes = Vec::new();
        for (&language, session) in &mut self.sessions {
            if let Some(worker) = session.worker.take() {
                outcomes.push((language, flatten(worker.task.await)));
            }
        }
        outcomes
    }

    /// Score a word by hand for one language
    ///
    /// Returns `None` if the language has no engine.
    pub async fn submit(
        &self,
        language: Language,
        word: Word,
    ) -> Option<Result<ScoreResult, EngineError>> {
        let engine = self.engine(language)?;
        Some(engine.submit(word).await)
    }

    /// Save every session now
    pub async fn save_all(&self) -> Vec<(Language, Result<PathBuf, EngineError>)> {
        let mut saved = Vec::new();
        for (&language, session) in &self.sessions {
            saved.push((language, session.engine.persist().await));
        }
        saved
    }

    /// Stop every search and save every session
    ///
    /// Running searches save themselves on the way out; idle ones are saved
    /// here.
    pub async fn shutdown(&mut self) -> Vec<(Language, Result<(), EngineError>)> {
        self.cancel_all();

        let mut outcomes = Vec::new();
        for (&language, session) in &mut self.sessions {
            let outcome = match session.worker.take() {
                Some(worker) => flatten(worker.task.await).map(|_| ()),
                None => session.engine.persist().await.map(|_| ()),
            };
            if let Err(e) = &outcome {
                warn!(%language, error = %e, "shutdown save failed");
            }
            outcomes.push((language, outcome));
        }
        outcomes
    }
}

fn flatten(
    joined: Result<Result<EngineStatus, EngineError>, tokio::task::JoinError>,
) -> Result<EngineStatus, EngineError> {
    joined?
}
