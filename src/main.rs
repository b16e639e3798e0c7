//! Cemantix Solver - CLI
//!
//! Cemantix/Cemantle bot with TUI and headless modes, searching best-first
//! through a lexicon of related words.

use anyhow::{Context, Result};
use cemantix_solver::{
    commands::{
        AppContext, SeedsAction, load_lexicon, open_orchestrator, print_seeds_report, run_search,
        run_seeds, show_rankings, submit_word,
    },
    config::Settings,
    core::{Language, Word},
    logging::{LogTarget, setup_logging},
    store::SessionStore,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "cemantix",
    about = "Cemantix/Cemantle bot using best-first lexical search",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Game language: en (Cemantle) or fr (Cémantix); repeat for several
    #[arg(short, long = "language", global = true, value_enum, default_value = "en")]
    languages: Vec<Language>,

    /// Directory holding Dicts/ and Days/ (overrides the settings file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, global = true, env = "CEMANTIX_CONFIG")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// No log output on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Diagnostic log file (default: <data-dir>/error.log)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive TUI mode (default)
    Play,

    /// Run the bot headless until every language is solved or runs dry
    Run {
        /// Word to try first
        #[arg(short, long)]
        word: Option<String>,
    },

    /// Score a single word in every selected language
    Submit {
        word: String,
    },

    /// Show the leaderboard of a stored session
    Rankings {
        /// Number of rows (default: display.ranking_size)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Day to show, as dd-mm-YYYY (default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Maintain the seed dictionaries
    Seeds {
        #[command(subcommand)]
        action: SeedsCommand,
    },
}

#[derive(Subcommand)]
enum SeedsCommand {
    /// Append words to the seed list
    Add {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Remove repeated entries
    Dedupe,
    /// Count the seed words
    Count,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }

    // Default to Play mode if no command given
    let command = cli.command.unwrap_or(Commands::Play);

    let target = match command {
        Commands::Play => LogTarget::FileOnly,
        _ => LogTarget::Terminal,
    };
    let log_file = cli.log_file.unwrap_or_else(|| settings.error_log());
    setup_logging(cli.verbose, cli.quiet, &log_file, target)?;

    let context = AppContext::new(settings, &cli.languages);

    match command {
        Commands::Play => run_play_command(&context),
        Commands::Run { word } => run_search_command(&context, word.as_deref()),
        Commands::Submit { word } => {
            let word = Word::new(&word)?;
            runtime()?.block_on(submit_word(&context, &word))?;
            Ok(())
        }
        Commands::Rankings { limit, date } => {
            let day = match date {
                Some(text) => SessionStore::parse_day(&text)
                    .with_context(|| format!("invalid date '{text}', expected dd-mm-YYYY"))?,
                None => context.day,
            };
            show_rankings(
                &context.store,
                &context.languages,
                day,
                limit.unwrap_or_else(|| context.ranking_size()),
            )?;
            Ok(())
        }
        Commands::Seeds { action } => run_seeds_command(&context, action),
    }
}

fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")
}

fn run_play_command(context: &AppContext) -> Result<()> {
    use cemantix_solver::interactive::{App, run_tui};

    let runtime = runtime()?;
    let orchestrator = open_orchestrator(context, load_lexicon(&context.settings))?;
    let app = App::new(orchestrator, runtime.handle().clone(), &context.settings);
    run_tui(app)
}

fn run_search_command(context: &AppContext, word: Option<&str>) -> Result<()> {
    let manual = word.map(Word::new).transpose()?;
    let lexicon = load_lexicon(&context.settings);
    let cancel = CancellationToken::new();

    runtime()?.block_on(async {
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        });
        run_search(context, lexicon, manual, cancel).await
    })?;
    Ok(())
}

fn run_seeds_command(context: &AppContext, command: SeedsCommand) -> Result<()> {
    let action = match command {
        SeedsCommand::Add { words } => SeedsAction::Add(
            words
                .iter()
                .map(Word::new)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        SeedsCommand::Dedupe => SeedsAction::Dedupe,
        SeedsCommand::Count => SeedsAction::Count,
    };

    context
        .store
        .ensure_layout(&context.languages)
        .context("failed to prepare the data directory")?;
    let reports = run_seeds(&context.store, &context.languages, &action)?;
    print_seeds_report(&action, &reports);
    Ok(())
}
