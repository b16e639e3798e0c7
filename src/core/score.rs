//! Oracle score classification

use std::fmt;

/// Score returned for the hidden target itself
pub const MAX_SCORE: f64 = 1000.0;

/// Normalised outcome of scoring one word
///
/// The oracle's raw response shape differs between deployments; adapters
/// reduce it to one of these three cases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreResult {
    /// The word is known and ranked, `score` is in `[0, MAX_SCORE]`
    Found { score: f64 },
    /// The oracle does not know the word
    NotFound,
    /// The word is known but the oracle returned no usable score
    Unscored,
}

impl ScoreResult {
    /// Build a `Found` result, clamping the score into `[0, MAX_SCORE]`
    ///
    /// Non-finite scores are treated as 0.
    #[must_use]
    pub fn found(score: f64) -> Self {
        let score = if score.is_finite() {
            score.clamp(0.0, MAX_SCORE)
        } else {
            0.0
        };
        Self::Found { score }
    }

    /// Score to store in the session record, `None` for `NotFound`
    #[must_use]
    pub const fn recorded_score(&self) -> Option<f64> {
        match self {
            Self::Found { score } => Some(*score),
            Self::Unscored => Some(0.0),
            Self::NotFound => None,
        }
    }

    /// Whether this result identifies the hidden target
    #[must_use]
    pub fn is_target(&self) -> bool {
        matches!(self, Self::Found { score } if is_max_score(*score))
    }
}

impl fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { score } => write!(f, "{score}"),
            Self::NotFound => write!(f, "not found"),
            Self::Unscored => write!(f, "unscored"),
        }
    }
}

/// Whether a recorded score means the target was found
#[inline]
#[must_use]
pub fn is_max_score(score: f64) -> bool {
    score >= MAX_SCORE
}

/// Score expressed as a percentage of `MAX_SCORE`
#[inline]
#[must_use]
pub fn score_percent(score: f64) -> f64 {
    score / MAX_SCORE * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_clamps_into_range() {
        assert_eq!(ScoreResult::found(-3.0), ScoreResult::Found { score: 0.0 });
        assert_eq!(
            ScoreResult::found(1500.0),
            ScoreResult::Found { score: MAX_SCORE }
        );
        assert_eq!(ScoreResult::found(f64::NAN), ScoreResult::Found { score: 0.0 });
        assert_eq!(ScoreResult::found(42.5), ScoreResult::Found { score: 42.5 });
    }

    #[test]
    fn recorded_score_per_variant() {
        assert_eq!(ScoreResult::found(12.0).recorded_score(), Some(12.0));
        assert_eq!(ScoreResult::Unscored.recorded_score(), Some(0.0));
        assert_eq!(ScoreResult::NotFound.recorded_score(), None);
    }

    #[test]
    fn only_max_score_is_target() {
        assert!(ScoreResult::found(MAX_SCORE).is_target());
        assert!(!ScoreResult::found(999.99).is_target());
        assert!(!ScoreResult::Unscored.is_target());
        assert!(!ScoreResult::NotFound.is_target());
    }

    #[test]
    fn percent_of_max() {
        assert!((score_percent(500.0) - 50.0).abs() < f64::EPSILON);
        assert!((score_percent(MAX_SCORE) - 100.0).abs() < f64::EPSILON);
    }
}
