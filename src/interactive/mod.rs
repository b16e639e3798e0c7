//! Interactive TUI: one tab per language, live rankings and manual input

mod app;
mod rendering;

pub use app::{App, Message, MessageStyle, run_tui};
