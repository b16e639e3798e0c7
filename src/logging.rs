//! Tracing setup
//!
//! Two layers: a compact stderr layer whose level follows `-v`, and a
//! diagnostic file layer that always records debug output from this crate.
//! `RUST_LOG` overrides the stderr level. The stderr layer is off while the
//! TUI owns the terminal.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, Layer, filter::LevelFilter, fmt, prelude::*};

const FILE_DIRECTIVES: &str = "warn,cemantix_solver=debug,cemantix=debug";

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Headless commands: stderr and the diagnostic file
    Terminal,
    /// The TUI draws on the terminal: diagnostic file only
    FileOnly,
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: &Path, target: LogTarget) -> Result<()> {
    let stderr_filter = match target {
        LogTarget::FileOnly => EnvFilter::new("off"),
        LogTarget::Terminal if quiet => EnvFilter::new("off"),
        LogTarget::Terminal => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::default().add_directive(level_for(verbosity).into())),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(stderr_filter);

    let file = open_log_file(log_file)?;
    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(EnvFilter::new(FILE_DIRECTIVES));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install the global logger")?;
    Ok(())
}

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory '{}'", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing::debug;

    #[test]
    fn verbosity_selects_level() {
        assert_eq!(level_for(0), LevelFilter::WARN);
        assert_eq!(level_for(1), LevelFilter::INFO);
        assert_eq!(level_for(2), LevelFilter::DEBUG);
        assert_eq!(level_for(9), LevelFilter::TRACE);
    }

    #[test]
    fn log_file_is_appended_and_parents_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("error.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn file_layer_records_crate_debug_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.log");

        let file_layer = fmt::layer()
            .with_writer(Mutex::new(open_log_file(&path).unwrap()))
            .with_ansi(false)
            .with_filter(EnvFilter::new(FILE_DIRECTIVES));
        let subscriber = tracing_subscriber::registry().with(file_layer);

        tracing::subscriber::with_default(subscriber, || {
            debug!(word = "chien", "no expansion");
        });

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("no expansion"));
        assert!(content.contains("DEBUG"));
    }
}
