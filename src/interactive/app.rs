//! TUI application state and logic

use crate::config::Settings;
use crate::core::{Language, ScoreResult, Word};
use crate::lexicon::Lexicon;
use crate::oracle::Oracle;
use crate::output::formatters::format_result;
use crate::solver::{EngineError, EngineSnapshot, Orchestrator, SearchEvent};
use anyhow::{Result, bail};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::process::{Command, Stdio};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const MAX_MESSAGES: usize = 8;
const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub style: MessageStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStyle {
    Info,
    Success,
    Error,
}

/// Application state
///
/// Engines run on the tokio runtime behind `runtime`; the TUI thread only
/// reads snapshots and drains event channels.
pub struct App<O, L> {
    orchestrator: Orchestrator<O, L>,
    runtime: Handle,
    languages: Vec<Language>,
    websites: Vec<String>,
    events: Vec<broadcast::Receiver<SearchEvent>>,
    notices: mpsc::UnboundedReceiver<Message>,
    notifier: mpsc::UnboundedSender<Message>,
    ranking_size: usize,
    pub snapshots: Vec<EngineSnapshot>,
    pub selected: usize,
    pub input: String,
    pub messages: Vec<Message>,
    pub should_quit: bool,
}

impl<O, L> App<O, L> {
    #[must_use]
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    #[must_use]
    pub fn selected_language(&self) -> Option<Language> {
        self.languages.get(self.selected).copied()
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&EngineSnapshot> {
        self.snapshots.get(self.selected)
    }
}

impl<O, L> App<O, L>
where
    O: Oracle + 'static,
    L: Lexicon + 'static,
{
    #[must_use]
    pub fn new(orchestrator: Orchestrator<O, L>, runtime: Handle, settings: &Settings) -> Self {
        let languages = orchestrator.languages();
        let websites = languages
            .iter()
            .map(|&language| settings.oracle_url(language).to_string())
            .collect();
        let events = orchestrator.engines().map(|engine| engine.subscribe()).collect();
        let ranking_size = settings.display.ranking_size;
        let snapshots = orchestrator
            .engines()
            .map(|engine| engine.snapshot(ranking_size))
            .collect();
        let (notifier, notices) = mpsc::unbounded_channel();

        Self {
            orchestrator,
            runtime,
            languages,
            websites,
            events,
            notices,
            notifier,
            ranking_size,
            snapshots,
            selected: 0,
            input: String::new(),
            messages: vec![Message {
                text: "Ctrl-R starts the search. Type a word and press Enter to try it.".to_string(),
                style: MessageStyle::Info,
            }],
            should_quit: false,
        }
    }

    #[must_use]
    pub fn is_running(&self, language: Language) -> bool {
        self.orchestrator.is_running(language)
    }

    /// Queue yesterday's neighbours for every language in the background
    pub fn bootstrap(&self) {
        for engine in self.orchestrator.engines() {
            let engine = engine.clone();
            self.runtime.spawn(async move {
                engine.bootstrap().await;
            });
        }
    }

    /// Pull everything that happened since the last frame
    pub fn tick(&mut self) {
        let mut incoming = Vec::new();
        for receiver in &mut self.events {
            loop {
                match receiver.try_recv() {
                    Ok(event) => incoming.extend(describe(&event)),
                    Err(TryRecvError::Lagged(_)) => {}
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }
        }
        while let Ok(message) = self.notices.try_recv() {
            incoming.push(message);
        }
        for message in incoming {
            self.push_message(message);
        }

        let finished = self.runtime.block_on(self.orchestrator.reap());
        for (language, outcome) in finished {
            if let Err(e) = outcome {
                self.add_message(&format!("{}: {e}", language.title()), MessageStyle::Error);
            }
        }

        self.snapshots = self
            .orchestrator
            .engines()
            .map(|engine| engine.snapshot(self.ranking_size))
            .collect();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if control => self.should_quit = true,
            KeyCode::Char('r') if control => self.toggle_search(),
            KeyCode::Char('s') if control => self.save_all(),
            KeyCode::Char('o') if control => self.open_website(),
            KeyCode::Tab => self.next_language(),
            KeyCode::BackTab => self.previous_language(),
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if !control && !c.is_control() => self.input.push(c),
            _ => {}
        }
    }

    pub fn next_language(&mut self) {
        if !self.languages.is_empty() {
            self.selected = (self.selected + 1) % self.languages.len();
        }
    }

    pub fn previous_language(&mut self) {
        if !self.languages.is_empty() {
            self.selected = (self.selected + self.languages.len() - 1) % self.languages.len();
        }
    }

    /// Start the selected language's search, or ask it to stop
    pub fn toggle_search(&mut self) {
        let Some(language) = self.selected_language() else {
            return;
        };

        if self.orchestrator.is_running(language) {
            self.orchestrator.request_stop(language);
            self.add_message(&format!("{}: stopping…", language.title()), MessageStyle::Info);
        } else {
            let _runtime = self.runtime.enter();
            self.orchestrator.start(language, CancellationToken::new());
        }
    }

    /// Send the typed word to the selected language's game
    pub fn submit_input(&mut self) {
        let text = std::mem::take(&mut self.input);
        if text.trim().is_empty() {
            return;
        }
        let word = match Word::new(&text) {
            Ok(word) => word,
            Err(e) => {
                self.add_message(&e.to_string(), MessageStyle::Error);
                return;
            }
        };
        let Some(engine) = self
            .selected_language()
            .and_then(|language| self.orchestrator.engine(language))
            .cloned()
        else {
            return;
        };

        let notifier = self.notifier.clone();
        self.runtime.spawn(async move {
            let language = engine.language();
            let message = match engine.submit(word.clone()).await {
                Ok(result) => submission_message(language, &word, &result),
                Err(e) => Message {
                    text: format!("{}: {e}", language.title()),
                    style: MessageStyle::Error,
                },
            };
            let _ = notifier.send(message);
        });
    }

    /// Save every session in the background
    pub fn save_all(&mut self) {
        let engines: Vec<_> = self.orchestrator.engines().cloned().collect();
        let notifier = self.notifier.clone();
        self.runtime.spawn(async move {
            for engine in engines {
                if let Err(e) = engine.persist().await {
                    let _ = notifier.send(Message {
                        text: e.to_string(),
                        style: MessageStyle::Error,
                    });
                }
            }
        });
    }

    pub fn open_website(&mut self) {
        let Some(url) = self.websites.get(self.selected).cloned() else {
            return;
        };
        if let Err(e) = open_in_browser(&url) {
            warn!(%url, error = %e, "could not open browser");
            self.add_message(&format!("Could not open {url}"), MessageStyle::Error);
        }
    }

    pub fn add_message(&mut self, text: &str, style: MessageStyle) {
        self.push_message(Message {
            text: text.to_string(),
            style,
        });
    }

    fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }

    /// Stop every search and save every session
    pub fn shutdown(mut self) -> Vec<(Language, Result<(), EngineError>)> {
        self.runtime.block_on(self.orchestrator.shutdown())
    }
}

fn submission_message(language: Language, word: &Word, result: &ScoreResult) -> Message {
    let style = match result {
        _ if result.is_target() => MessageStyle::Success,
        ScoreResult::NotFound => MessageStyle::Error,
        _ => MessageStyle::Info,
    };
    let text = if result.is_target() {
        format!("🎉 {}: '{word}' is the word of the day!", language.title())
    } else {
        format!("{}: {word} → {}", language.title(), format_result(result))
    };
    Message { text, style }
}

/// Message for the log panel, if the event deserves one
fn describe(event: &SearchEvent) -> Option<Message> {
    let (text, style) = match event {
        SearchEvent::Started { language, queued } => (
            format!("{}: searching, {queued} words queued", language.title()),
            MessageStyle::Info,
        ),
        SearchEvent::Bootstrapped { language, from, added } => (
            format!("{}: {added} neighbours of yesterday's '{from}' queued", language.title()),
            MessageStyle::Info,
        ),
        SearchEvent::Converged { language, word, tries } => (
            format!("🎉 {}: found '{word}' in {tries} tries", language.title()),
            MessageStyle::Success,
        ),
        SearchEvent::Exhausted { language, .. } => (
            format!("{}: no candidates left", language.title()),
            MessageStyle::Info,
        ),
        SearchEvent::Interrupted { language } => (
            format!("{}: search stopped", language.title()),
            MessageStyle::Info,
        ),
        SearchEvent::Saved { language, .. } => {
            (format!("{}: session saved", language.title()), MessageStyle::Info)
        }
        SearchEvent::Trying { .. }
        | SearchEvent::WordScored { .. }
        | SearchEvent::OracleUnavailable { .. } => return None,
    };
    Some(Message { text, style })
}

fn open_in_browser(url: &str) -> io::Result<()> {
    let mut command = if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    } else if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(url);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    };
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

/// Run the TUI application, then stop and save every session
///
/// # Errors
///
/// Returns an error if terminal setup/cleanup fails, if there's an I/O error
/// during rendering or event handling, or if a session could not be saved.
pub fn run_tui<O, L>(mut app: App<O, L>) -> Result<()>
where
    O: Oracle + 'static,
    L: Lexicon + 'static,
{
    app.bootstrap();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err}");
    }

    println!("Saving sessions…");
    let failures: Vec<_> = app
        .shutdown()
        .into_iter()
        .filter_map(|(language, outcome)| outcome.err().map(|e| (language, e)))
        .collect();
    for (language, e) in &failures {
        eprintln!("{}: {e}", language.title());
    }
    if !failures.is_empty() {
        bail!("{} session(s) could not be saved", failures.len());
    }
    Ok(())
}

fn run_app<B, O, L>(terminal: &mut Terminal<B>, app: &mut App<O, L>) -> Result<()>
where
    B: ratatui::backend::Backend,
    O: Oracle + 'static,
    L: Lexicon + 'static,
{
    loop {
        app.tick();
        terminal.draw(|f| super::rendering::ui(f, app))?;

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            // Only process key press events (fixes Windows double-input bug)
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionRecord;
    use crate::solver::testing::{FakeLexicon, FakeOracle, context, found, frontier, w};
    use crate::solver::{EngineContext, EngineStatus, SearchEngine};
    use tempfile::TempDir;
    use tokio::runtime::Runtime;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app(dir: &TempDir, runtime: &Runtime) -> App<FakeOracle, FakeLexicon> {
        let mut orchestrator = Orchestrator::new();
        for (language, words) in [(Language::English, vec!["dog"]), (Language::French, vec!["chat"])] {
            let oracle = FakeOracle::with_scores(&[("loup", found(420.0)), ("chat", found(12.0))]);
            let context = EngineContext {
                language,
                ..context(dir, oracle, FakeLexicon::default())
            };
            orchestrator.insert(SearchEngine::with_state(
                context,
                SessionRecord::new(),
                frontier(&words),
            ));
        }
        App::new(orchestrator, runtime.handle().clone(), &Settings::default())
    }

    fn wait_until(app: &mut App<FakeOracle, FakeLexicon>, done: impl Fn(&App<FakeOracle, FakeLexicon>) -> bool) {
        for _ in 0..200 {
            app.tick();
            if done(app) {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("condition not reached");
    }

    #[test]
    fn tab_cycles_languages() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new().unwrap();
        let mut app = app(&dir, &runtime);

        assert_eq!(app.selected_language(), Some(Language::English));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.selected_language(), Some(Language::French));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.selected_language(), Some(Language::English));
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.selected_language(), Some(Language::French));
    }

    #[test]
    fn typed_word_is_submitted_to_selected_language() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new().unwrap();
        let mut app = app(&dir, &runtime);
        app.handle_key(key(KeyCode::Tab));

        for c in "Loup".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Backspace));
        app.handle_key(key(KeyCode::Char('p')));
        assert_eq!(app.input, "Loup");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.input.is_empty());

        wait_until(&mut app, |app| app.snapshot().is_some_and(|s| s.tries == 1));
        let snapshot = app.snapshot().unwrap();
        assert_eq!(snapshot.language, Language::French);
        assert_eq!(snapshot.best, Some((w("loup"), 420.0)));
        assert!(app.messages.iter().any(|m| m.text.contains("loup → 420.00")));
    }

    #[test]
    fn invalid_word_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new().unwrap();
        let mut app = app(&dir, &runtime);

        for c in "deux mots".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.messages.last().map(|m| m.style), Some(MessageStyle::Error));
    }

    #[test]
    fn ctrl_r_runs_search_to_the_end() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new().unwrap();
        let mut app = app(&dir, &runtime);
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(ctrl('r'));

        wait_until(&mut app, |app| {
            app.snapshot().is_some_and(|s| s.status == EngineStatus::Exhausted)
        });
        assert!(app.messages.iter().any(|m| m.text.contains("no candidates left")));
        assert!(!app.is_running(Language::French));
    }

    #[test]
    fn escape_quits_and_shutdown_saves() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new().unwrap();
        let mut app = app(&dir, &runtime);
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);

        let outcomes = app.shutdown();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|(_, outcome)| outcome.is_ok()));
        assert!(dir.path().join("Days/fr").is_dir());
    }

    #[test]
    fn messages_are_capped() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new().unwrap();
        let mut app = app(&dir, &runtime);
        for i in 0..20 {
            app.add_message(&format!("m{i}"), MessageStyle::Info);
        }
        assert_eq!(app.messages.len(), MAX_MESSAGES);
        assert_eq!(app.messages.last().unwrap().text, "m19");
    }

    #[test]
    fn quiet_events_have_no_message() {
        let trying = SearchEvent::Trying {
            language: Language::French,
            word: w("chat"),
        };
        assert!(describe(&trying).is_none());

        let converged = SearchEvent::Converged {
            language: Language::French,
            word: w("mot"),
            tries: 12,
        };
        assert_eq!(describe(&converged).unwrap().style, MessageStyle::Success);
    }
}
