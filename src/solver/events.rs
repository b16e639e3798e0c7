//! Events emitted by a search engine
//!
//! Front-ends subscribe to these instead of being called back from the
//! search loop.

use crate::core::{Language, ScoreResult, Word};
use std::path::PathBuf;

/// Lifecycle state of one language's search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineStatus {
    #[default]
    Idle,
    Running,
    /// The target was found
    Converged,
    /// The frontier ran out before the target was found
    Exhausted,
    /// Stopped by the user or a signal
    Interrupted,
}

impl EngineStatus {
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "searching",
            Self::Converged => "found",
            Self::Exhausted => "exhausted",
            Self::Interrupted => "stopped",
        }
    }
}

/// Something that happened in a search session
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    Started {
        language: Language,
        queued: usize,
    },
    /// A word is about to be sent to the oracle
    Trying {
        language: Language,
        word: Word,
    },
    WordScored {
        language: Language,
        word: Word,
        result: ScoreResult,
        /// Number of oracle calls recorded so far
        tries: usize,
    },
    /// The oracle could not be reached for this word
    OracleUnavailable {
        language: Language,
        word: Word,
        reason: String,
    },
    Bootstrapped {
        language: Language,
        from: Word,
        added: usize,
    },
    Converged {
        language: Language,
        word: Word,
        tries: usize,
    },
    Exhausted {
        language: Language,
        best: Option<(Word, f64)>,
    },
    Interrupted {
        language: Language,
    },
    Saved {
        language: Language,
        path: PathBuf,
    },
}

impl SearchEvent {
    #[must_use]
    pub const fn language(&self) -> Language {
        match self {
            Self::Started { language, .. }
            | Self::Trying { language, .. }
            | Self::WordScored { language, .. }
            | Self::OracleUnavailable { language, .. }
            | Self::Bootstrapped { language, .. }
            | Self::Converged { language, .. }
            | Self::Exhausted { language, .. }
            | Self::Interrupted { language }
            | Self::Saved { language, .. } => *language,
        }
    }
}
