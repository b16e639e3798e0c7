//! Command implementations

pub mod rankings;
pub mod search;
pub mod seeds;
pub mod setup;
pub mod submit;

pub use rankings::{RankingReport, load_rankings, show_rankings};
pub use search::{SearchReport, run_search};
pub use seeds::{SeedsAction, SeedsReport, print_seeds_report, run_seeds};
pub use setup::{AppContext, Engine, load_lexicon, open_engine, open_orchestrator};
pub use submit::submit_word;
