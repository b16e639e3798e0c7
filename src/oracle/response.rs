//! Normalisation of raw oracle responses
//!
//! The two game deployments disagree on field names (`percentile` vs `p`,
//! `error` vs `e`), so everything is reduced to [`ScoreResult`] here.

use super::OracleError;
use crate::core::{ScoreResult, Word};
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RawScore {
    #[serde(default, alias = "p")]
    percentile: Option<f64>,
    #[serde(default, alias = "e")]
    error: Option<Value>,
}

/// Classify the body of a `/score` response
///
/// # Errors
/// Returns `OracleError::Malformed` if a non-empty body is not a JSON object.
pub fn parse_score(body: &str) -> Result<ScoreResult, OracleError> {
    if body.trim().is_empty() {
        return Ok(ScoreResult::Unscored);
    }

    let raw: RawScore =
        serde_json::from_str(body).map_err(|e| OracleError::Malformed(e.to_string()))?;

    Ok(match (raw.percentile, raw.error) {
        (Some(score), _) => ScoreResult::found(score),
        (None, Some(_)) => ScoreResult::NotFound,
        (None, None) => ScoreResult::Unscored,
    })
}

/// Extract the ordered word list from a `/nearby` response
///
/// Each row is an array whose first element is the word. Rows that do not
/// carry a valid word are skipped.
///
/// # Errors
/// Returns `OracleError::Malformed` if the body is not a JSON array.
pub fn parse_nearby(body: &str) -> Result<Vec<Word>, OracleError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<Value> =
        serde_json::from_str(body).map_err(|e| OracleError::Malformed(e.to_string()))?;

    Ok(rows
        .iter()
        .filter_map(|row| match row {
            Value::Array(fields) => fields.first().and_then(Value::as_str),
            Value::String(word) => Some(word.as_str()),
            _ => None,
        })
        .filter_map(|word| Word::new(word).ok())
        .collect())
}

/// Find yesterday's word in the game's home page
///
/// Returns the text of the element with `id="yesterday"`, including text
/// inside nested markup.
#[must_use]
pub fn parse_yesterday(html: &str) -> Option<Word> {
    let selector = Selector::parse("#yesterday").ok()?;
    let document = Html::parse_document(html);
    let element = document.select(&selector).next()?;
    let text: String = element.text().collect();
    Word::new(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_long_field_names() {
        assert_eq!(
            parse_score(r#"{"percentile": 42.0, "score": 0.31}"#).unwrap(),
            ScoreResult::Found { score: 42.0 }
        );
        assert_eq!(
            parse_score(r#"{"error": "Je ne connais pas le mot <i>xyzzy</i>."}"#).unwrap(),
            ScoreResult::NotFound
        );
    }

    #[test]
    fn score_short_field_names() {
        assert_eq!(
            parse_score(r#"{"p": 1000, "s": 1.0}"#).unwrap(),
            ScoreResult::Found { score: 1000.0 }
        );
        assert_eq!(parse_score(r#"{"e": "unknown"}"#).unwrap(), ScoreResult::NotFound);
    }

    #[test]
    fn score_without_usable_field_is_unscored() {
        assert_eq!(parse_score("").unwrap(), ScoreResult::Unscored);
        assert_eq!(parse_score("  \n").unwrap(), ScoreResult::Unscored);
        assert_eq!(
            parse_score(r#"{"s": 0.02, "v": 12}"#).unwrap(),
            ScoreResult::Unscored
        );
    }

    #[test]
    fn score_out_of_range_is_clamped() {
        assert_eq!(
            parse_score(r#"{"p": 1200.5}"#).unwrap(),
            ScoreResult::Found { score: 1000.0 }
        );
    }

    #[test]
    fn score_garbage_is_malformed() {
        assert!(matches!(
            parse_score("<html>rate limited</html>"),
            Err(OracleError::Malformed(_))
        ));
    }

    #[test]
    fn nearby_keeps_server_order() {
        let body = r#"[["chat", 1000, 1.0], ["chaton", 999, 0.8], [12, 0], ["", 1], "félin"]"#;
        let words = parse_nearby(body).unwrap();
        let texts: Vec<_> = words.iter().map(Word::text).collect();
        assert_eq!(texts, ["chat", "chaton", "félin"]);
    }

    #[test]
    fn nearby_empty_body() {
        assert!(parse_nearby("").unwrap().is_empty());
        assert!(parse_nearby("{}").is_err());
    }

    #[test]
    fn yesterday_from_html() {
        let html = r#"<p>Le mot d'hier était <b id="yesterday">Lanterne</b>.</p>"#;
        assert_eq!(parse_yesterday(html).unwrap().text(), "lanterne");
        assert!(parse_yesterday("<p>nothing here</p>").is_none());
        assert!(parse_yesterday(r#"<b id="yesterday"></b>"#).is_none());
    }

    #[test]
    fn yesterday_with_nested_markup() {
        let html = r#"<div><span id='yesterday'> <i>Lan</i><b>terne</b> </span></div>"#;
        assert_eq!(parse_yesterday(html).unwrap().text(), "lanterne");
    }
}
