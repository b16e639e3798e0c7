//! Best-first search engine for one language
//!
//! The engine pops words from its [`Frontier`], asks the oracle for their
//! score, records the answer and expands successes through the lexicon. One
//! engine owns one language's session; the [`Orchestrator`] runs several of
//! them side by side.
//!
//! [`Orchestrator`]: super::Orchestrator

use super::events::{EngineStatus, SearchEvent};
use super::frontier::Frontier;
use super::politeness::Politeness;
use crate::config::MIN_PERSIST_ATTEMPTS;
use crate::core::{Language, ScoreResult, SessionRecord, Word, is_max_score};
use crate::lexicon::Lexicon;
use crate::oracle::{Oracle, OracleError};
use crate::store::{SessionStore, StoreError};
use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

const EVENT_CAPACITY: usize = 256;
const PERSIST_BACKOFF: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("oracle did not answer for '{word}' within {after:?}")]
    Timeout { word: Word, after: Duration },

    #[error("could not save the {language} session after {attempts} attempts: {source}")]
    Persistence {
        language: Language,
        attempts: u32,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("search task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Tunables of the search loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    pub politeness: Politeness,
    /// Bound on a single oracle call
    pub oracle_timeout: Duration,
    /// How many times a word is re-queued after transport failures
    pub max_retries: u32,
    /// Save attempts before giving up, never fewer than two
    pub persist_attempts: u32,
    /// Save the session every this many oracle answers, 0 disables
    pub autosave_every: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            politeness: Politeness::default(),
            oracle_timeout: Duration::from_secs(10),
            max_retries: 2,
            persist_attempts: 3,
            autosave_every: 25,
        }
    }
}

/// Everything an engine needs apart from its session state
pub struct EngineContext<O, L> {
    pub language: Language,
    pub day: NaiveDate,
    pub oracle: O,
    pub lexicon: Arc<L>,
    pub store: SessionStore,
    pub settings: SearchSettings,
}

/// What happened to one popped or submitted word
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The oracle answered
    Scored { word: Word, result: ScoreResult },
    /// Already in today's record; the oracle was not called
    Skipped(Word),
    /// Transport failure, the word will be tried again later
    Requeued(Word),
    /// Timed out or out of retries, the word is abandoned for this run
    Dropped(Word),
}

impl Step {
    #[must_use]
    pub const fn called_oracle(&self) -> bool {
        !matches!(self, Self::Skipped(_))
    }

    #[must_use]
    pub fn found_target(&self) -> bool {
        matches!(self, Self::Scored { result, .. } if result.is_target())
    }
}

/// Point-in-time view of an engine for display
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub language: Language,
    pub day: NaiveDate,
    pub status: EngineStatus,
    pub ranking: Vec<(Word, f64)>,
    pub best: Option<(Word, f64)>,
    /// Words recorded today
    pub tries: usize,
    pub queued: usize,
    pub next: Option<Word>,
    pub last: Option<(Word, ScoreResult)>,
    pub yesterday: Option<Word>,
    pub not_found: usize,
}

impl EngineSnapshot {
    #[must_use]
    pub fn best_score(&self) -> f64 {
        self.best.as_ref().map_or(0.0, |(_, score)| *score)
    }
}

enum Attempt {
    /// Answered earlier today, no request made
    Known(ScoreResult),
    Answered(ScoreResult, Recorded),
    Failed(OracleError),
    TimedOut,
}

/// Bookkeeping from recording one answer
struct Recorded {
    tries: usize,
    /// Present when an autosave is due
    autosave: Option<SessionRecord>,
}

#[derive(Debug, Default)]
struct SessionState {
    frontier: Frontier,
    record: SessionRecord,
    not_found: Vec<Word>,
    status: EngineStatus,
    retries: FxHashMap<Word, u32>,
    last: Option<(Word, ScoreResult)>,
    yesterday: Option<Word>,
    answers: usize,
}

struct EngineInner<O, L> {
    language: Language,
    day: NaiveDate,
    oracle: O,
    lexicon: Arc<L>,
    store: SessionStore,
    settings: SearchSettings,
    state: Mutex<SessionState>,
    /// Held for the duration of every oracle request
    gate: tokio::sync::Mutex<()>,
    events: broadcast::Sender<SearchEvent>,
}

/// Search session for one language and one day
///
/// Cloning is cheap and yields another handle on the same session.
pub struct SearchEngine<O, L> {
    inner: Arc<EngineInner<O, L>>,
}

impl<O, L> Clone for SearchEngine<O, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O: Oracle, L: Lexicon> SearchEngine<O, L> {
    /// Resume today's session from disk and seed the frontier
    ///
    /// A corrupt session file is logged, renamed out of the way and treated
    /// as empty.
    ///
    /// # Errors
    /// Returns `EngineError::Store` if the session or seed file cannot be
    /// read, or a corrupt one cannot be set aside.
    pub fn open(context: EngineContext<O, L>) -> Result<Self, EngineError> {
        let record = match context.store.load(context.day, context.language) {
            Ok(record) => record,
            Err(e @ StoreError::CorruptState { .. }) => {
                warn!(language = %context.language, error = %e, "ignoring corrupt session");
                context.store.set_aside(context.day, context.language)?;
                SessionRecord::new()
            }
            Err(e) => return Err(e.into()),
        };

        let seeds = context.store.load_seed(context.language)?;
        let frontier = Frontier::from_seeds(seeds, &record, &mut rand::rng());
        info!(
            language = %context.language,
            day = %context.day,
            tested = record.len(),
            queued = frontier.len(),
            "session opened"
        );
        Ok(Self::with_state(context, record, frontier))
    }

    /// Build an engine around an existing record and frontier
    #[must_use]
    pub fn with_state(context: EngineContext<O, L>, record: SessionRecord, frontier: Frontier) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = SessionState {
            frontier,
            record,
            ..SessionState::default()
        };

        Self {
            inner: Arc::new(EngineInner {
                language: context.language,
                day: context.day,
                oracle: context.oracle,
                lexicon: context.lexicon,
                store: context.store,
                settings: context.settings,
                state: Mutex::new(state),
                gate: tokio::sync::Mutex::new(()),
                events,
            }),
        }
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.inner.language
    }

    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.inner.day
    }

    #[must_use]
    pub fn oracle(&self) -> &O {
        &self.inner.oracle
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.inner.events.subscribe()
    }

    #[must_use]
    pub fn status(&self) -> EngineStatus {
        self.state().status
    }

    /// Copy of today's record
    #[must_use]
    pub fn record(&self) -> SessionRecord {
        self.state().record.clone()
    }

    /// Words the oracle rejected and that are not yet pruned from the seeds
    #[must_use]
    pub fn not_found(&self) -> Vec<Word> {
        self.state().not_found.clone()
    }

    #[must_use]
    pub fn snapshot(&self, ranking_size: usize) -> EngineSnapshot {
        let state = self.state();
        EngineSnapshot {
            language: self.inner.language,
            day: self.inner.day,
            status: state.status,
            ranking: state.record.ranking(ranking_size),
            best: state.record.best().map(|(word, score)| (word.clone(), score)),
            tries: state.record.len(),
            queued: state.frontier.len(),
            next: state.frontier.peek().cloned(),
            last: state.last.clone(),
            yesterday: state.yesterday.clone(),
            not_found: state.not_found.len(),
        }
    }

    /// Queue a word so it is tried next
    ///
    /// Returns `false` if the word was already scored today.
    pub fn enqueue(&self, word: Word) -> bool {
        let mut guard = self.state();
        let state = &mut *guard;
        state.frontier.push(word, &state.record)
    }

    /// Seed the frontier from yesterday's target
    ///
    /// The target comes from yesterday's session when it was solved, and
    /// from the oracle otherwise. Its neighbours are queued so the closest
    /// one is tried first. Returns the number of words queued; every failure
    /// is logged and yields 0.
    #[instrument(skip_all, fields(language = %self.inner.language))]
    pub async fn bootstrap(&self) -> usize {
        let solved = self.state().record.is_solved();
        if solved {
            return 0;
        }

        let Some(winner) = self.yesterday_target().await else {
            debug!("no target known for yesterday");
            return 0;
        };
        self.state().yesterday = Some(winner.clone());

        let answer = {
            let _turn = self.inner.gate.lock().await;
            timeout(self.inner.settings.oracle_timeout, self.inner.oracle.nearby(&winner)).await
        };
        let neighbours = match answer {
            Ok(Ok(neighbours)) => neighbours,
            Ok(Err(e)) => {
                warn!(%winner, error = %e, "nearby request failed");
                return 0;
            }
            Err(_) => {
                warn!(%winner, "nearby request timed out");
                return 0;
            }
        };

        let added = {
            let mut guard = self.state();
            let state = &mut *guard;
            state.frontier.extend(neighbours.into_iter().rev(), &state.record)
        };
        info!(%winner, added, "bootstrapped from yesterday");
        self.emit(SearchEvent::Bootstrapped {
            language: self.inner.language,
            from: winner,
            added,
        });
        added
    }

    async fn yesterday_target(&self) -> Option<Word> {
        let yesterday = self.inner.day.pred_opt()?;
        match self.inner.store.load(yesterday, self.inner.language) {
            Ok(record) if record.is_solved() => {
                return record.best().map(|(word, _)| word.clone());
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "could not read yesterday's session"),
        }

        let _turn = self.inner.gate.lock().await;
        match timeout(self.inner.settings.oracle_timeout, self.inner.oracle.yesterday()).await {
            Ok(Ok(word)) => word,
            Ok(Err(e)) => {
                debug!(error = %e, "oracle did not tell yesterday's word");
                None
            }
            Err(_) => None,
        }
    }

    /// Search until the target is found, the frontier runs dry or `cancel`
    /// fires, then save the session
    ///
    /// A session that is already solved returns `Converged` without calling
    /// the oracle.
    ///
    /// # Errors
    /// Returns `EngineError::Persistence` if the final save keeps failing.
    #[instrument(skip_all, fields(language = %self.inner.language))]
    pub async fn run(&self, cancel: CancellationToken) -> Result<EngineStatus, EngineError> {
        let (solved, queued) = {
            let state = self.state();
            (state.record.is_solved(), state.frontier.len())
        };
        if solved {
            info!("already solved today");
            self.set_status(EngineStatus::Converged);
            return Ok(EngineStatus::Converged);
        }

        self.set_status(EngineStatus::Running);
        info!(queued, "search started");
        self.emit(SearchEvent::Started {
            language: self.inner.language,
            queued,
        });

        let status = loop {
            let solved = self.state().record.is_solved();
            if solved {
                break EngineStatus::Converged;
            }
            if cancel.is_cancelled() {
                break EngineStatus::Interrupted;
            }
            let Some(step) = self.step().await else {
                break EngineStatus::Exhausted;
            };
            if !step.called_oracle() || step.found_target() {
                continue;
            }

            let delay = self.inner.settings.politeness.next_delay();
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => {}
            }
        };

        self.finish(status).await
    }

    /// Pop the next word and evaluate it, `None` once the frontier is empty
    pub async fn step(&self) -> Option<Step> {
        let word = self.state().frontier.pop()?;
        let tested = self.state().record.contains(&word);
        if tested {
            return Some(Step::Skipped(word));
        }
        Some(self.evaluate(word).await)
    }

    /// Score a word typed by the user
    ///
    /// Goes through the same recording and expansion as searched words and
    /// shares the one-request-at-a-time gate with the search loop. A word
    /// already answered today, or in flight from the loop, is answered from
    /// the record without a second request.
    ///
    /// # Errors
    /// Returns the oracle failure or timeout; nothing is recorded then.
    #[instrument(skip(self), fields(language = %self.inner.language))]
    pub async fn submit(&self, word: Word) -> Result<ScoreResult, EngineError> {
        match self.query(&word).await {
            Attempt::Known(result) => Ok(result),
            Attempt::Answered(result, recorded) => {
                self.apply(&word, result, recorded).await;
                Ok(result)
            }
            Attempt::Failed(e) => Err(e.into()),
            Attempt::TimedOut => Err(EngineError::Timeout {
                word,
                after: self.inner.settings.oracle_timeout,
            }),
        }
    }

    async fn evaluate(&self, word: Word) -> Step {
        match self.query(&word).await {
            Attempt::Known(_) => Step::Skipped(word),
            Attempt::Answered(result, recorded) => {
                self.apply(&word, result, recorded).await;
                Step::Scored { word, result }
            }
            Attempt::TimedOut => {
                warn!(%word, after = ?self.inner.settings.oracle_timeout, "oracle timed out");
                self.emit(SearchEvent::OracleUnavailable {
                    language: self.inner.language,
                    word: word.clone(),
                    reason: "timed out".to_string(),
                });
                Step::Dropped(word)
            }
            Attempt::Failed(e) => {
                let requeued = self.retry_later(&word);
                warn!(%word, error = %e, requeued, "oracle unavailable");
                self.emit(SearchEvent::OracleUnavailable {
                    language: self.inner.language,
                    word: word.clone(),
                    reason: e.to_string(),
                });
                if requeued {
                    Step::Requeued(word)
                } else {
                    Step::Dropped(word)
                }
            }
        }
    }

    /// Ask the oracle about `word` unless it was answered already
    ///
    /// The answer is recorded before the gate is released, so a caller that
    /// waited on the same word finds it in the record.
    async fn query(&self, word: &Word) -> Attempt {
        let _turn = self.inner.gate.lock().await;
        if let Some(result) = self.known(word) {
            return Attempt::Known(result);
        }
        self.emit(SearchEvent::Trying {
            language: self.inner.language,
            word: word.clone(),
        });

        match timeout(self.inner.settings.oracle_timeout, self.inner.oracle.score(word)).await {
            Ok(Ok(result)) => Attempt::Answered(result, self.record_answer(word, result)),
            Ok(Err(e)) => Attempt::Failed(e),
            Err(_) => Attempt::TimedOut,
        }
    }

    fn known(&self, word: &Word) -> Option<ScoreResult> {
        let state = self.state();
        match state.record.get(word) {
            Some(score) => Some(ScoreResult::found(score)),
            None => state.not_found.contains(word).then_some(ScoreResult::NotFound),
        }
    }

    fn retry_later(&self, word: &Word) -> bool {
        let mut guard = self.state();
        let state = &mut *guard;
        let retries = state.retries.entry(word.clone()).or_insert(0);
        if *retries >= self.inner.settings.max_retries {
            return false;
        }
        *retries += 1;
        state.frontier.requeue_last(word.clone(), &state.record);
        true
    }

    async fn apply(&self, word: &Word, result: ScoreResult, recorded: Recorded) {
        let Recorded { tries, autosave } = recorded;
        debug!(%word, %result, tries, "scored");
        self.emit(SearchEvent::WordScored {
            language: self.inner.language,
            word: word.clone(),
            result,
            tries,
        });

        if let ScoreResult::Found { score } = result {
            if is_max_score(score) {
                info!(%word, tries, "target found");
            } else {
                self.expand(word).await;
            }
        }

        if let Some(record) = autosave {
            match self.inner.store.save(self.inner.day, self.inner.language, &record) {
                Ok(path) => debug!(path = %path.display(), "autosaved"),
                Err(e) => warn!(error = %e, "autosave failed"),
            }
        }
    }

    fn record_answer(&self, word: &Word, result: ScoreResult) -> Recorded {
        let mut guard = self.state();
        let state = &mut *guard;

        // Answered words never come back, whatever the answer
        state.frontier.remove(word);
        match result.recorded_score() {
            Some(score) => {
                state.record.insert(word.clone(), score);
            }
            None => {
                if !state.not_found.contains(word) {
                    state.not_found.push(word.clone());
                }
            }
        }
        state.retries.remove(word);
        state.last = Some((word.clone(), result));
        state.answers += 1;

        let every = self.inner.settings.autosave_every;
        let autosave = (every > 0 && state.answers.is_multiple_of(every)).then(|| state.record.clone());
        Recorded {
            tries: state.record.len(),
            autosave,
        }
    }

    async fn expand(&self, word: &Word) {
        let language = self.inner.language;
        match self.inner.lexicon.related(word, language).await {
            Ok(related) => {
                let mut guard = self.state();
                let state = &mut *guard;
                let added = state.frontier.extend(related, &state.record);
                debug!(%word, added, lexicon = self.inner.lexicon.name(), "expanded");
            }
            Err(e) => {
                debug!(%word, error = %e, lexicon = self.inner.lexicon.name(), "no expansion");
            }
        }
    }

    /// Save today's record and prune rejected words from the seeds
    ///
    /// The save is retried with a growing pause; pruning failures are only
    /// logged.
    ///
    /// # Errors
    /// Returns `EngineError::Persistence` once every attempt failed.
    pub async fn persist(&self) -> Result<PathBuf, EngineError> {
        let (record, rejected) = {
            let state = self.state();
            (state.record.clone(), state.not_found.clone())
        };
        let attempts = self.inner.settings.persist_attempts.max(MIN_PERSIST_ATTEMPTS);

        let mut attempt = 1;
        let path = loop {
            match self.inner.store.save(self.inner.day, self.inner.language, &record) {
                Ok(path) => break path,
                Err(source) if attempt >= attempts => {
                    return Err(EngineError::Persistence {
                        language: self.inner.language,
                        attempts,
                        source,
                    });
                }
                Err(e) => {
                    warn!(attempt, error = %e, "save failed, retrying");
                    tokio::time::sleep(PERSIST_BACKOFF * attempt).await;
                    attempt += 1;
                }
            }
        };

        if !rejected.is_empty() {
            match self.inner.store.prune_seed(self.inner.language, &rejected) {
                Ok(_) => {
                    let pruned: FxHashSet<&Word> = rejected.iter().collect();
                    self.state().not_found.retain(|word| !pruned.contains(word));
                }
                Err(e) => warn!(error = %e, "could not prune seed words"),
            }
        }

        info!(path = %path.display(), words = record.len(), "session saved");
        self.emit(SearchEvent::Saved {
            language: self.inner.language,
            path: path.clone(),
        });
        Ok(path)
    }

    async fn finish(&self, status: EngineStatus) -> Result<EngineStatus, EngineError> {
        self.set_status(status);
        let saved = self.persist().await;

        let (best, tries) = {
            let state = self.state();
            (
                state.record.best().map(|(word, score)| (word.clone(), score)),
                state.record.len(),
            )
        };
        let language = self.inner.language;
        let event = match (status, best) {
            (EngineStatus::Converged, Some((word, _))) => {
                info!(%word, tries, "search converged");
                SearchEvent::Converged { language, word, tries }
            }
            (EngineStatus::Interrupted, _) => {
                info!(tries, "search interrupted");
                SearchEvent::Interrupted { language }
            }
            (_, best) => {
                info!(tries, "frontier exhausted");
                SearchEvent::Exhausted { language, best }
            }
        };
        self.emit(event);

        saved.map(|_| status)
    }

    fn set_status(&self, status: EngineStatus) {
        self.state().status = status;
    }

    fn emit(&self, event: SearchEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
