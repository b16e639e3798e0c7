//! Lexicon backed by a local language model served by Ollama

use super::{Lexicon, LexiconError};
use crate::core::{Language, Word};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Asks a model for the lexical field of a word
#[derive(Debug, Clone)]
pub struct OllamaLexicon {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaLexicon {
    /// # Errors
    /// Returns `LexiconError::Remote` if the HTTP client cannot be built.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, LexiconError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn prompt(word: &Word, language: Language) -> String {
        format!(
            "You are a web server that provides the lexical field of a word in a language \
             and you must return a JSON array of strings.\n\
             I have the word {word} in {lang}. List words in the same lexical field as \
             {word}, answering in {lang} only.",
            lang = language.name()
        )
    }
}

impl Lexicon for OllamaLexicon {
    #[instrument(skip(self), fields(model = %self.model))]
    async fn related(&self, word: &Word, language: Language) -> Result<Vec<Word>, LexiconError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: Self::prompt(word, language),
            stream: false,
        };

        let response: GenerateResponse = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let words = parse_word_list(&response.response);
        debug!(count = words.len(), "model proposed words");
        if words.is_empty() {
            return Err(LexiconError::Response(format!(
                "no words in model answer for '{word}'"
            )));
        }
        Ok(words)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Extract words from free-form model output
///
/// Prefers the first JSON array of strings in the text; otherwise splits on
/// newlines and commas and strips list markers.
fn parse_word_list(text: &str) -> Vec<Word> {
    let from_json = text
        .find('[')
        .zip(text.rfind(']'))
        .filter(|(start, end)| start < end)
        .and_then(|(start, end)| serde_json::from_str::<Vec<String>>(&text[start..=end]).ok());

    let candidates: Vec<String> = from_json.unwrap_or_else(|| {
        text.split(['\n', ','])
            .map(|item| {
                item.trim()
                    .trim_start_matches(|c: char| {
                        c == '-' || c == '*' || c == '•' || c.is_ascii_digit() || c == '.' || c == ')'
                    })
                    .trim()
                    .trim_matches('"')
                    .to_string()
            })
            .collect()
    });

    let mut seen = FxHashSet::default();
    candidates
        .iter()
        .filter_map(|item| Word::from_lemma(item).ok())
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(words: &[Word]) -> Vec<&str> {
        words.iter().map(Word::text).collect()
    }

    #[test]
    fn parses_embedded_json_array() {
        let answer = "Sure! Here you go:\n[\"cellule\", \"barreaux\", \"Détenu\", \"cellule\"]\nEnjoy.";
        assert_eq!(texts(&parse_word_list(answer)), ["cellule", "barreaux", "détenu"]);
    }

    #[test]
    fn falls_back_to_list_lines() {
        let answer = "1. cellule\n2. gardien de prison\n- barreaux\n";
        assert_eq!(
            texts(&parse_word_list(answer)),
            ["cellule", "gardien-de-prison", "barreaux"]
        );
    }

    #[test]
    fn comma_separated_answer() {
        assert_eq!(texts(&parse_word_list("geôle, cachot")), ["geôle", "cachot"]);
    }

    #[test]
    fn prompt_mentions_language() {
        let prompt = OllamaLexicon::prompt(&Word::new("prison").unwrap(), Language::French);
        assert!(prompt.contains("prison"));
        assert!(prompt.contains("French"));
    }
}
