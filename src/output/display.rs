//! Display functions for command results

use super::formatters::{Effort, Heat, effort, format_result, format_score, heat, score_bar};
use crate::core::{Language, ScoreResult, Word};
use crate::solver::{EngineSnapshot, EngineStatus};
use chrono::NaiveDate;
use colored::{ColoredString, Colorize};

/// Colour a score by how close it is to the target
#[must_use]
pub fn paint_score(score: f64) -> ColoredString {
    let text = format_score(score);
    match heat(score) {
        Heat::Hot => text.red().bold(),
        Heat::Warm => text.yellow(),
        Heat::Cold => text.blue(),
    }
}

/// Colour a try count by how expensive the search was
#[must_use]
pub fn paint_tries(tries: usize) -> ColoredString {
    let text = tries.to_string();
    match effort(tries) {
        Effort::Low => text.green(),
        Effort::Medium => text.yellow(),
        Effort::High => text.red(),
    }
}

fn header(title: &str) {
    println!("\n{}", "═".repeat(60).cyan());
    println!(" {} ", title.bright_cyan().bold());
    println!("{}", "═".repeat(60).cyan());
}

/// Print a leaderboard, best first
pub fn print_rankings(language: Language, day: NaiveDate, ranking: &[(Word, f64)]) {
    header(&format!(
        "{} {} · {}",
        language.flag(),
        language.title(),
        day.format("%d-%m-%Y")
    ));

    if ranking.is_empty() {
        println!("\n   {}", "No scored words yet".bright_black());
        return;
    }

    println!();
    for (rank, (word, score)) in ranking.iter().enumerate() {
        println!(
            "   {:>3}. {:<24} {:>8}  {}",
            rank + 1,
            word.text(),
            paint_score(*score),
            score_bar(*score, 20).bright_black()
        );
    }
}

/// Print `best: score | in N tries`
pub fn print_summary(best: Option<&(Word, f64)>, tries: usize) {
    let best = match best {
        Some((word, score)) => format!("{} ({})", paint_score(*score), word.text().bold()),
        None => "-".bright_black().to_string(),
    };
    println!("\nbest: {best} | in {} tries", paint_tries(tries));
}

/// Print the answer to a manual submission
pub fn print_submission(language: Language, word: &Word, result: &ScoreResult) {
    let answer = match result {
        ScoreResult::Found { score } => paint_score(*score),
        other => format_result(other).bright_black(),
    };
    println!("{} {} → {}", language.flag(), word.text().bold(), answer);
    if result.is_target() {
        println!("{}", "✅ That's the word of the day!".green().bold());
    }
}

/// Print how a headless search ended
pub fn print_outcome(snapshot: &EngineSnapshot) {
    print_rankings(snapshot.language, snapshot.day, &snapshot.ranking);

    println!();
    match (snapshot.status, &snapshot.best) {
        (EngineStatus::Converged, Some((word, _))) => println!(
            "{}",
            format!("✅ Found '{}' in {} tries", word.text(), snapshot.tries)
                .green()
                .bold()
        ),
        (EngineStatus::Interrupted, _) => println!("{}", "⏸  Search stopped".yellow()),
        (EngineStatus::Exhausted, _) => println!(
            "{}",
            "No candidates left. Add seed words and run again.".bright_black()
        ),
        _ => {}
    }
    print_summary(snapshot.best.as_ref(), snapshot.tries);
}
