//! Cemantix Solver
//!
//! A bot for the Cemantix (French) and Cemantle (English) semantic word
//! games. Each language runs a best-first search: every scored word is
//! expanded through a lexicon into related words, and the candidates with
//! the best-scoring parents are tried first.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cemantix_solver::core::{Language, Word};
//! use cemantix_solver::oracle::{CemantixOracle, Oracle};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let oracle = CemantixOracle::new(Language::French.default_url(), Duration::from_secs(10))?;
//! let result = oracle.score(&Word::new("chien")?).await?;
//! println!("chien: {result}");
//! # Ok(())
//! # }
//! ```

// Core domain types
pub mod core;

// Configuration file and logging setup
pub mod config;
pub mod logging;

// Game server and related-word sources
pub mod lexicon;
pub mod oracle;

// Session files and seed dictionaries
pub mod store;

// Search engine and per-language orchestration
pub mod solver;

// Command implementations
pub mod commands;

// Terminal output formatting
pub mod output;

// Interactive TUI interface
pub mod interactive;
