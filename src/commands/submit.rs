//! Score one word by hand

use super::setup::{AppContext, open_orchestrator};
use crate::core::{Language, ScoreResult, Word};
use crate::lexicon::{LexiconBackend, NoLexicon};
use crate::output::print_submission;
use anyhow::{Context, Result};

/// Submit `word` to every selected language's game and save the sessions
///
/// # Errors
/// Fails if a session cannot be opened or saved, or the oracle cannot be
/// reached.
pub async fn submit_word(context: &AppContext, word: &Word) -> Result<Vec<(Language, ScoreResult)>> {
    // Expansion only feeds the in-memory frontier, which is not kept
    let orchestrator = open_orchestrator(context, LexiconBackend::None(NoLexicon))?;

    let mut results = Vec::new();
    for engine in orchestrator.engines() {
        let language = engine.language();
        let result = engine
            .submit(word.clone())
            .await
            .with_context(|| format!("could not score '{word}' in {}", language.title()))?;
        print_submission(language, word, &result);
        engine.persist().await?;
        results.push((language, result));
    }
    Ok(results)
}
