//! Core domain types for the semantic guessing game
//!
//! This module contains the fundamental domain types with no I/O.
//! All types here are pure and testable.

mod language;
mod record;
mod score;
mod word;

pub use language::Language;
pub use record::SessionRecord;
pub use score::{MAX_SCORE, ScoreResult, is_max_score, score_percent};
pub use word::{Word, WordError, words_from_slice};
