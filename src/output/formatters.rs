//! Formatting utilities for terminal output

use crate::core::{MAX_SCORE, ScoreResult};

/// How close a score is to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heat {
    /// Above 80 % of the maximum
    Hot,
    /// Above 50 %
    Warm,
    Cold,
}

/// How expensive a search was, by number of tries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effort {
    /// Fewer than 10 % of `MAX_SCORE` tries
    Low,
    /// Fewer than 50 %
    Medium,
    High,
}

#[must_use]
pub fn heat(score: f64) -> Heat {
    if score > MAX_SCORE * 0.8 {
        Heat::Hot
    } else if score > MAX_SCORE * 0.5 {
        Heat::Warm
    } else {
        Heat::Cold
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)] // try counts are far below 2^52
pub fn effort(tries: usize) -> Effort {
    let tries = tries as f64;
    if tries < MAX_SCORE * 0.1 {
        Effort::Low
    } else if tries < MAX_SCORE * 0.5 {
        Effort::Medium
    } else {
        Effort::High
    }
}

/// Score with two decimals, the way the game shows it
#[must_use]
pub fn format_score(score: f64) -> String {
    format!("{score:.2}")
}

#[must_use]
pub fn format_result(result: &ScoreResult) -> String {
    match result {
        ScoreResult::Found { score } => format_score(*score),
        ScoreResult::NotFound => "unknown word".to_string(),
        ScoreResult::Unscored => "no score".to_string(),
    }
}

/// Create a progress bar string
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn create_progress_bar(value: f64, max: f64, width: usize) -> String {
    // Cast is safe: values are clamped to [0, width]
    let filled = ((value / max).clamp(0.0, 1.0) * width as f64) as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Score as a bar against `MAX_SCORE`
#[must_use]
pub fn score_bar(score: f64, width: usize) -> String {
    create_progress_bar(score, MAX_SCORE, width)
}
