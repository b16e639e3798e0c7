//! Best-first lexical search
//!
//! A [`SearchEngine`] plays one language's daily game: it pops candidates
//! from a [`Frontier`], scores them through an oracle and expands every hit
//! with related words. The [`Orchestrator`] runs one engine per language.

mod engine;
pub mod events;
pub mod frontier;
mod orchestrator;
pub mod politeness;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{EngineContext, EngineError, EngineSnapshot, SearchEngine, SearchSettings, Step};
pub use events::{EngineStatus, SearchEvent};
pub use frontier::Frontier;
pub use orchestrator::Orchestrator;
pub use politeness::Politeness;
