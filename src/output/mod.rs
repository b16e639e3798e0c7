//! Terminal output formatting
//!
//! Display utilities for CLI results and pretty-printing.

pub mod display;
pub mod formatters;

pub use display::{paint_score, print_outcome, print_rankings, print_submission, print_summary};
