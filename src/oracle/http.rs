//! HTTP client for the Cemantix / Cemantle servers

use super::response::{parse_nearby, parse_score, parse_yesterday};
use super::{Oracle, OracleError};
use crate::core::{ScoreResult, Word};
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER};
use std::time::Duration;
use tracing::{debug, instrument};

/// Oracle backed by a game server's `/score` and `/nearby` endpoints
#[derive(Debug, Clone)]
pub struct CemantixOracle {
    client: reqwest::Client,
    base_url: String,
}

impl CemantixOracle {
    /// Create a client for the server at `base_url`
    ///
    /// The server only answers requests that carry its own origin, so
    /// `Origin` and `Referer` are set on every request.
    ///
    /// # Errors
    /// Returns `OracleError::Transport` if the HTTP client cannot be built,
    /// or `OracleError::Malformed` if the URL cannot be used as a header.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, OracleError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let origin = HeaderValue::from_str(&base_url)
            .map_err(|e| OracleError::Malformed(format!("invalid base URL '{base_url}': {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, origin.clone());
        headers.insert(REFERER, origin);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!("cemantix_solver/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_word(&self, path: &str, word: &Word) -> Result<String, OracleError> {
        let response = self
            .client
            .post(self.url(path))
            .form(&[("word", word.text())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl Oracle for CemantixOracle {
    #[instrument(skip(self), fields(url = %self.base_url))]
    async fn score(&self, word: &Word) -> Result<ScoreResult, OracleError> {
        let body = self.post_word("/score", word).await?;
        let result = parse_score(&body)?;
        debug!(%result, "scored");
        Ok(result)
    }

    #[instrument(skip(self), fields(url = %self.base_url))]
    async fn nearby(&self, word: &Word) -> Result<Vec<Word>, OracleError> {
        let body = self.post_word("/nearby", word).await?;
        let words = parse_nearby(&body)?;
        debug!(count = words.len(), "nearby words");
        Ok(words)
    }

    #[instrument(skip(self), fields(url = %self.base_url))]
    async fn yesterday(&self) -> Result<Option<Word>, OracleError> {
        let response = self.client.get(self.url("/")).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(parse_yesterday(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let oracle =
            CemantixOracle::new("https://cemantix.certitudes.org/", Duration::from_secs(5)).unwrap();
        assert_eq!(oracle.base_url(), "https://cemantix.certitudes.org");
        assert_eq!(oracle.url("/score"), "https://cemantix.certitudes.org/score");
    }

    #[test]
    fn invalid_header_url_is_rejected() {
        let result = CemantixOracle::new("https://bad\nhost", Duration::from_secs(5));
        assert!(matches!(result, Err(OracleError::Malformed(_))));
    }
}
