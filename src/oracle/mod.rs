//! Scoring oracle
//!
//! The oracle is the remote game server. It scores a word against the hidden
//! target and can list the nearest neighbours of a known word.

mod http;
pub mod response;

pub use http::CemantixOracle;

use crate::core::{ScoreResult, Word};
use std::future::Future;
use thiserror::Error;

/// Transport-level oracle failures
///
/// A word the server does not know is not an error; it is reported as
/// [`ScoreResult::NotFound`].
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A game server that scores words
pub trait Oracle: Send + Sync {
    /// Score one word against today's target
    fn score(&self, word: &Word)
    -> impl Future<Output = Result<ScoreResult, OracleError>> + Send;

    /// Words closest to `word`, most similar first
    ///
    /// Only meaningful for a past target.
    fn nearby(&self, word: &Word) -> impl Future<Output = Result<Vec<Word>, OracleError>> + Send;

    /// Yesterday's target as published by the server, if any
    fn yesterday(&self) -> impl Future<Output = Result<Option<Word>, OracleError>> + Send;
}
