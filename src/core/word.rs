//! Game word representation
//!
//! A Word is a trimmed, lowercased token. Diacritics are kept as-is, so
//! `"Été"` and `"été"` are the same word but `"ete"` is not.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A case-normalised word submitted to (or proposed for) the oracle
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Word(String);

/// Error type for invalid words
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordError {
    #[error("word is empty")]
    Empty,
    #[error("word '{0}' contains whitespace")]
    Whitespace(String),
    #[error("word '{0}' contains control characters")]
    Control(String),
}

impl Word {
    /// Create a new Word from a string
    ///
    /// Surrounding whitespace is trimmed and the text is lowercased.
    ///
    /// # Errors
    /// Returns `WordError` if:
    /// - The trimmed text is empty
    /// - It contains interior whitespace
    /// - It contains control characters
    ///
    /// # Examples
    /// ```
    /// use cemantix_solver::core::Word;
    ///
    /// let word = Word::new("  Château ").unwrap();
    /// assert_eq!(word.text(), "château");
    ///
    /// assert!(Word::new("two words").is_err());
    /// assert!(Word::new("   ").is_err());
    /// ```
    pub fn new(text: impl AsRef<str>) -> Result<Self, WordError> {
        let text = text.as_ref().trim().to_lowercase();

        if text.is_empty() {
            return Err(WordError::Empty);
        }

        if text.chars().any(char::is_whitespace) {
            return Err(WordError::Whitespace(text));
        }

        if text.chars().any(char::is_control) {
            return Err(WordError::Control(text));
        }

        Ok(Self(text))
    }

    /// Build a word from a lexical-database lemma
    ///
    /// Multi-word lemmas use `_` or spaces as separators; each run of
    /// separators becomes a single `-`.
    ///
    /// # Errors
    /// Returns `WordError` if nothing usable is left after normalisation.
    pub fn from_lemma(lemma: &str) -> Result<Self, WordError> {
        let joined = lemma
            .split(|c: char| c == '_' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        Self::new(joined)
    }

    /// Get the word as a string slice
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Consume the word, returning the normalised text
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Word {
    type Error = WordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.0
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convert a slice of strings into words, skipping invalid entries
#[must_use]
pub fn words_from_slice(slice: &[&str]) -> Vec<Word> {
    slice.iter().filter_map(|&s| Word::new(s).ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_creation_valid() {
        let word = Word::new("chien").unwrap();
        assert_eq!(word.text(), "chien");
    }

    #[test]
    fn word_creation_uppercase_normalized() {
        let word = Word::new("CHIEN").unwrap();
        assert_eq!(word.text(), "chien");

        let word2 = Word::new("ChIeN").unwrap();
        assert_eq!(word2.text(), "chien");
    }

    #[test]
    fn word_keeps_diacritics() {
        let word = Word::new("ÉTÉ").unwrap();
        assert_eq!(word.text(), "été");
        assert_ne!(word, Word::new("ete").unwrap());
    }

    #[test]
    fn word_trims_surrounding_whitespace() {
        let word = Word::new("\tloup\n").unwrap();
        assert_eq!(word.text(), "loup");
    }

    #[test]
    fn word_creation_invalid() {
        assert_eq!(Word::new(""), Err(WordError::Empty));
        assert_eq!(Word::new("   "), Err(WordError::Empty));
        assert!(matches!(
            Word::new("pomme de terre"),
            Err(WordError::Whitespace(_))
        ));
        assert!(matches!(Word::new("a\u{7}b"), Err(WordError::Control(_))));
    }

    #[test]
    fn lemma_separators_become_hyphen() {
        assert_eq!(Word::from_lemma("pomme_de_terre").unwrap().text(), "pomme-de-terre");
        assert_eq!(Word::from_lemma("hot  dog").unwrap().text(), "hot-dog");
        assert_eq!(Word::from_lemma("_odd__lemma_").unwrap().text(), "odd-lemma");
        assert!(Word::from_lemma("__").is_err());
    }

    #[test]
    fn words_from_slice_skips_invalid() {
        let words = words_from_slice(&["chien", "", "deux mots", "Chat"]);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text(), "chien");
        assert_eq!(words[1].text(), "chat");
    }

    #[test]
    fn word_serde_normalizes() {
        let word: Word = serde_json::from_str("\"Loup\"").unwrap();
        assert_eq!(word.text(), "loup");
        assert!(serde_json::from_str::<Word>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&word).unwrap(), "\"loup\"");
    }

    #[test]
    fn word_display() {
        let word = Word::new("animal").unwrap();
        assert_eq!(format!("{word}"), "animal");
    }
}
