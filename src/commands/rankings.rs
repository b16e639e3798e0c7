//! Leaderboard of a stored session

use crate::core::{Language, Word};
use crate::output::{print_rankings, print_summary};
use crate::store::SessionStore;
use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Best words of one stored session
#[derive(Debug, Clone, PartialEq)]
pub struct RankingReport {
    pub language: Language,
    pub day: NaiveDate,
    pub ranking: Vec<(Word, f64)>,
    pub best: Option<(Word, f64)>,
    pub tries: usize,
}

/// Load the leaderboard of `day` for one language
///
/// # Errors
/// Fails if the session file cannot be read or parsed.
pub fn load_rankings(
    store: &SessionStore,
    language: Language,
    day: NaiveDate,
    limit: usize,
) -> Result<RankingReport> {
    let record = store
        .load(day, language)
        .with_context(|| format!("cannot show the {language} rankings"))?;

    Ok(RankingReport {
        language,
        day,
        ranking: record.ranking(limit),
        best: record.best().map(|(word, score)| (word.clone(), score)),
        tries: record.len(),
    })
}

/// Print the leaderboards of `day` for every language
///
/// # Errors
/// Fails on the first session that cannot be read.
pub fn show_rankings(
    store: &SessionStore,
    languages: &[Language],
    day: NaiveDate,
    limit: usize,
) -> Result<Vec<RankingReport>> {
    let mut reports = Vec::with_capacity(languages.len());
    for &language in languages {
        let report = load_rankings(store, language, day, limit)?;
        print_rankings(report.language, report.day, &report.ranking);
        print_summary(report.best.as_ref(), report.tries);
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionRecord;

    fn w(text: &str) -> Word {
        Word::new(text).unwrap()
    }

    #[test]
    fn rankings_sorted_and_limited() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let record: SessionRecord = [
            (w("chat"), 120.0),
            (w("loup"), 640.5),
            (w("été"), 0.0),
            (w("chien"), 300.0),
        ]
        .into_iter()
        .collect();
        store.save(day, Language::French, &record).unwrap();

        let report = load_rankings(&store, Language::French, day, 2).unwrap();
        assert_eq!(report.ranking, [(w("loup"), 640.5), (w("chien"), 300.0)]);
        assert_eq!(report.best, Some((w("loup"), 640.5)));
        assert_eq!(report.tries, 4);
    }

    #[test]
    fn missing_day_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let reports = show_rankings(&store, &[Language::English], day, 10).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].ranking.is_empty());
        assert_eq!(reports[0].best, None);
    }
}
