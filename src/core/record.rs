//! Per-day session record

use super::score::{MAX_SCORE, is_max_score};
use super::word::Word;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Word → last-known score for one day and one language
///
/// Serialises as a flat JSON object, the same shape the session files on
/// disk use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRecord {
    scores: FxHashMap<Word, f64>,
}

impl SessionRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a score, overwriting any previous value for the word
    pub fn insert(&mut self, word: Word, score: f64) {
        self.scores.insert(word, score);
    }

    #[must_use]
    pub fn get(&self, word: &Word) -> Option<f64> {
        self.scores.get(word).copied()
    }

    #[must_use]
    pub fn contains(&self, word: &Word) -> bool {
        self.scores.contains_key(word)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Word, f64)> {
        self.scores.iter().map(|(word, &score)| (word, score))
    }

    /// Best word and its score, `None` while nothing scored above 0
    ///
    /// Ties resolve to the lexicographically smallest word so the answer
    /// does not depend on hash order.
    #[must_use]
    pub fn best(&self) -> Option<(&Word, f64)> {
        self.iter()
            .filter(|&(_, score)| score > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(a.0)))
    }

    /// Best score so far, 0 for an empty record
    #[must_use]
    pub fn best_score(&self) -> f64 {
        self.best().map_or(0.0, |(_, score)| score)
    }

    /// Whether the target has been found in this session
    #[must_use]
    pub fn is_solved(&self) -> bool {
        is_max_score(self.best_score())
    }

    /// Words sorted by score (highest first), zero scores omitted
    #[must_use]
    pub fn ranking(&self, limit: usize) -> Vec<(Word, f64)> {
        let mut ranked: Vec<(Word, f64)> = self
            .iter()
            .filter(|&(_, score)| score > 0.0)
            .map(|(word, score)| (word.clone(), score))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }

    /// Fraction of the way to `MAX_SCORE`, in `[0, 1]`
    #[must_use]
    pub fn progress(&self) -> f64 {
        (self.best_score() / MAX_SCORE).clamp(0.0, 1.0)
    }
}

impl FromIterator<(Word, f64)> for SessionRecord {
    fn from_iter<I: IntoIterator<Item = (Word, f64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(text: &str) -> Word {
        Word::new(text).unwrap()
    }

    #[test]
    fn insert_overwrites() {
        let mut record = SessionRecord::new();
        record.insert(w("chien"), 10.0);
        record.insert(w("chien"), 42.0);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get(&w("chien")), Some(42.0));
    }

    #[test]
    fn best_ignores_zero_scores() {
        let mut record = SessionRecord::new();
        assert!(record.best().is_none());

        record.insert(w("xyz"), 0.0);
        assert!(record.best().is_none());
        assert!((record.best_score() - 0.0).abs() < f64::EPSILON);

        record.insert(w("chat"), 12.0);
        record.insert(w("chien"), 42.0);
        let (word, score) = record.best().unwrap();
        assert_eq!(word.text(), "chien");
        assert!((score - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn solved_at_max_score() {
        let mut record = SessionRecord::new();
        record.insert(w("mot"), 999.0);
        assert!(!record.is_solved());
        record.insert(w("mot"), MAX_SCORE);
        assert!(record.is_solved());
        assert!((record.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ranking_sorted_and_truncated() {
        let record: SessionRecord = [
            (w("a"), 5.0),
            (w("b"), 50.0),
            (w("c"), 0.0),
            (w("d"), 20.0),
        ]
        .into_iter()
        .collect();

        let ranking = record.ranking(2);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].0.text(), "b");
        assert_eq!(ranking[1].0.text(), "d");

        let all = record.ranking(10);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut record = SessionRecord::new();
        record.insert(w("chien"), 42.0);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"chien":42.0}"#);

        let parsed: SessionRecord = serde_json::from_str(r#"{"loup": 7.5, "chat": 0}"#).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get(&w("chat")), Some(0.0));
    }
}
