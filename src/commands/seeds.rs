//! Seed dictionary maintenance

use crate::core::{Language, Word};
use crate::store::SessionStore;
use anyhow::{Context, Result};
use colored::Colorize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedsAction {
    /// Append words that are not listed yet
    Add(Vec<Word>),
    /// Drop repeated entries
    Dedupe,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedsReport {
    pub language: Language,
    /// Lines added or removed by the action
    pub changed: usize,
    /// Words in the file afterwards
    pub total: usize,
}

/// Apply a maintenance action to each language's seed file
///
/// # Errors
/// Fails on the first seed file that cannot be read or rewritten.
pub fn run_seeds(
    store: &SessionStore,
    languages: &[Language],
    action: &SeedsAction,
) -> Result<Vec<SeedsReport>> {
    languages
        .iter()
        .map(|&language| -> Result<SeedsReport> {
            let changed = match action {
                SeedsAction::Add(words) => store.append_seed(language, words),
                SeedsAction::Dedupe => store.dedupe_seed(language),
                SeedsAction::Count => Ok(0),
            }
            .with_context(|| format!("failed to update the {language} seed file"))?;

            let total = store
                .load_seed(language)
                .with_context(|| format!("failed to read the {language} seed file"))?
                .len();
            Ok(SeedsReport {
                language,
                changed,
                total,
            })
        })
        .collect()
}

pub fn print_seeds_report(action: &SeedsAction, reports: &[SeedsReport]) {
    for report in reports {
        let change = match action {
            SeedsAction::Add(_) => format!("+{} added", report.changed).green().to_string(),
            SeedsAction::Dedupe => format!("-{} duplicates", report.changed).yellow().to_string(),
            SeedsAction::Count => String::new(),
        };
        println!(
            "{} {:<10} {:>7} words  {}",
            report.language.flag(),
            report.language.name(),
            report.total,
            change
        );
    }
}
