//! Headless search - the classic bot
//!
//! Runs every selected language concurrently with one progress bar each,
//! then prints the rankings.

use super::setup::{AppContext, Engine, open_orchestrator};
use crate::core::{MAX_SCORE, Word};
use crate::lexicon::LexiconBackend;
use crate::output::formatters::{format_result, format_score};
use crate::output::print_outcome;
use crate::solver::{EngineSnapshot, EngineStatus, SearchEvent};
use anyhow::{Context, Result, bail};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Outcome of one language's search
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub snapshot: EngineSnapshot,
    pub error: Option<String>,
}

/// Run the search for every selected language until each one converges,
/// runs dry or `cancel` fires
///
/// Yesterday's neighbours are queued first; `manual` is queued on top of
/// them so it is the very first word tried.
///
/// # Errors
/// Fails if a session cannot be opened, or after printing the results if
/// any session could not be saved.
pub async fn run_search(
    context: &AppContext,
    lexicon: LexiconBackend,
    manual: Option<Word>,
    cancel: CancellationToken,
) -> Result<Vec<SearchReport>> {
    let mut orchestrator = open_orchestrator(context, lexicon)?;
    let bars = MultiProgress::new();
    let style = bar_style()?;

    let mut trackers = Vec::new();
    for engine in orchestrator.engines() {
        engine.bootstrap().await;
        if let Some(word) = &manual {
            engine.enqueue(word.clone());
        }

        let bar = bars.add(ProgressBar::new(progress_position(MAX_SCORE)));
        bar.set_style(style.clone());
        bar.set_prefix(format!("{} {}", engine.language().flag(), engine.language().title()));
        bar.set_message(progress_line(&engine.snapshot(1), None));
        trackers.push((
            tokio::spawn(track(engine.clone(), engine.subscribe(), bar.clone())),
            bar,
        ));
    }

    for language in orchestrator.languages() {
        orchestrator.start(language, cancel.child_token());
    }
    let outcomes = orchestrator.join_all().await;

    for (tracker, bar) in trackers {
        tracker.abort();
        bar.finish();
    }

    let mut reports = Vec::new();
    for (language, outcome) in outcomes {
        let engine = orchestrator
            .engine(language)
            .context("finished search has no engine")?;
        let snapshot = engine.snapshot(context.ranking_size());
        print_outcome(&snapshot);

        let error = outcome.err().map(|e| {
            error!(%language, error = %e, "search ended with an error");
            e.to_string()
        });
        reports.push(SearchReport { snapshot, error });
    }

    if let Some(failed) = reports.iter().find_map(|report| report.error.as_ref()) {
        bail!("{failed}");
    }
    Ok(reports)
}

/// Mirror one engine's events on its progress bar
async fn track(engine: Engine, mut events: broadcast::Receiver<SearchEvent>, bar: ProgressBar) {
    loop {
        match events.recv().await {
            Ok(SearchEvent::Trying { word, .. }) => {
                bar.set_message(progress_line(&engine.snapshot(1), Some(&word)));
            }
            Ok(SearchEvent::WordScored { .. } | SearchEvent::Bootstrapped { .. }) => {
                let snapshot = engine.snapshot(1);
                bar.set_position(progress_position(snapshot.best_score()));
                bar.set_message(progress_line(&snapshot, None));
            }
            Ok(SearchEvent::Converged { word, tries, .. }) => {
                bar.set_position(progress_position(MAX_SCORE));
                bar.set_message(format!("found '{word}' in {tries} tries"));
                break;
            }
            Ok(SearchEvent::Exhausted { .. } | SearchEvent::Interrupted { .. }) => break,
            Ok(_) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => break,
        }
    }
}

fn bar_style() -> Result<ProgressStyle> {
    Ok(
        ProgressStyle::with_template("{prefix:<12.bold} [{bar:30.red/blue}] {msg}")
            .context("invalid progress template")?
            .progress_chars("█▓░"),
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn progress_position(score: f64) -> u64 {
    score.clamp(0.0, MAX_SCORE).round() as u64
}

/// `Best: 512.30 | Found: meute (12.00) | Trying: chien | Tries: 87`
///
/// `Found` is the last answered word and its score.
fn progress_line(snapshot: &EngineSnapshot, trying: Option<&Word>) -> String {
    let status = match snapshot.status {
        EngineStatus::Running | EngineStatus::Idle => String::new(),
        other => format!(" | {}", other.label()),
    };
    let found = snapshot.last.as_ref().map_or_else(
        || "-".to_string(),
        |(word, result)| format!("{word} ({})", format_result(result)),
    );
    let trying = trying.map_or_else(|| "-".to_string(), ToString::to_string);
    format!(
        "Best: {} | Found: {found} | Trying: {trying} | Tries: {}{status}",
        format_score(snapshot.best_score()),
        snapshot.tries
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Language, ScoreResult};
    use chrono::NaiveDate;

    fn snapshot() -> EngineSnapshot {
        EngineSnapshot {
            language: Language::French,
            day: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            status: EngineStatus::Running,
            ranking: Vec::new(),
            best: Some((Word::new("loup").unwrap(), 512.3)),
            tries: 87,
            queued: 400,
            next: None,
            last: Some((Word::new("meute").unwrap(), ScoreResult::found(12.0))),
            yesterday: None,
            not_found: 0,
        }
    }

    #[test]
    fn progress_line_shows_best_found_trying() {
        let chien = Word::new("chien").unwrap();
        assert_eq!(
            progress_line(&snapshot(), Some(&chien)),
            "Best: 512.30 | Found: meute (12.00) | Trying: chien | Tries: 87"
        );

        let mut snapshot = snapshot();
        snapshot.last = Some((Word::new("xyzzy").unwrap(), ScoreResult::NotFound));
        assert_eq!(
            progress_line(&snapshot, None),
            "Best: 512.30 | Found: xyzzy (unknown word) | Trying: - | Tries: 87"
        );
    }

    #[test]
    fn progress_line_shows_final_status() {
        let mut snapshot = snapshot();
        snapshot.status = EngineStatus::Exhausted;
        assert!(progress_line(&snapshot, None).ends_with(" | exhausted"));
    }

    #[test]
    fn progress_position_is_clamped() {
        assert_eq!(progress_position(-3.0), 0);
        assert_eq!(progress_position(512.4), 512);
        assert_eq!(progress_position(2000.0), 1000);
    }

    #[test]
    fn bar_template_is_valid() {
        assert!(bar_style().is_ok());
    }
}
