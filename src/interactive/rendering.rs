//! TUI rendering logic

use super::app::{App, MessageStyle};
use crate::core::score_percent;
use crate::output::formatters::{Heat, format_result, format_score, heat};
use crate::solver::{EngineSnapshot, EngineStatus};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table, Tabs},
};

/// Main UI rendering function
pub fn ui<O, L>(f: &mut Frame, app: &App<O, L>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Language tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Input
            Constraint::Length(3), // Status bar
        ])
        .split(f.area());

    render_tabs(f, chunks[0], app);
    render_main_content(f, chunks[1], app);
    render_input(f, chunks[2], app);
    render_status_bar(f, chunks[3], app);
}

fn render_tabs<O, L>(f: &mut Frame, area: Rect, app: &App<O, L>) {
    let titles: Vec<Line> = app
        .languages()
        .iter()
        .zip(&app.snapshots)
        .map(|(language, snapshot)| {
            Line::from(vec![
                Span::raw(format!("{} {} ", language.flag(), language.title())),
                Span::styled(
                    snapshot.status.label(),
                    Style::default().fg(status_color(snapshot.status)),
                ),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.selected)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" 🔥 CEMANTIX SOLVER "),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    f.render_widget(tabs, area);
}

fn render_main_content<O, L>(f: &mut Frame, area: Rect, app: &App<O, L>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    match app.snapshot() {
        Some(snapshot) => {
            render_rankings(f, chunks[0], snapshot);
            render_side_panel(f, chunks[1], snapshot, app);
        }
        None => {
            let empty = Paragraph::new("No language selected")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(empty, area);
        }
    }
}

fn render_rankings(f: &mut Frame, area: Rect, snapshot: &EngineSnapshot) {
    let rows: Vec<Row> = snapshot
        .ranking
        .iter()
        .enumerate()
        .map(|(i, (word, score))| {
            Row::new(vec![
                Cell::from(format!("{:>3}", i + 1)),
                Cell::from(word.text().to_string()),
                Cell::from(format_score(*score)).style(Style::default().fg(heat_color(*score))),
            ])
        })
        .collect();

    let title = format!(
        " Rankings · {} · {} tries ",
        snapshot.day.format("%d/%m/%Y"),
        snapshot.tries
    );
    let table = Table::new(
        rows,
        [Constraint::Length(4), Constraint::Min(12), Constraint::Length(9)],
    )
    .header(
        Row::new(vec!["#", "Word", "Score"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(title),
    );
    f.render_widget(table, area);
}

fn render_side_panel<O, L>(f: &mut Frame, area: Rect, snapshot: &EngineSnapshot, app: &App<O, L>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Best score gauge
            Constraint::Length(6), // Search state
            Constraint::Min(5),    // Messages
        ])
        .split(area);

    let best = snapshot.best_score();
    let label = match &snapshot.best {
        Some((word, score)) => format!("{word} · {}", format_score(*score)),
        None => "no score yet".to_string(),
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" 🎯 Best "),
        )
        .gauge_style(Style::default().fg(heat_color(best)).bg(Color::Black))
        .percent(score_percent(best).round().clamp(0.0, 100.0) as u16)
        .label(label);
    f.render_widget(gauge, chunks[0]);

    let dim = Style::default().fg(Color::Gray);
    let last = snapshot.last.as_ref().map_or_else(
        || "-".to_string(),
        |(word, result)| format!("{word} → {}", format_result(result)),
    );
    let state = vec![
        Line::from(vec![
            Span::styled("Yesterday: ", dim),
            Span::raw(
                snapshot
                    .yesterday
                    .as_ref()
                    .map_or_else(|| "unknown".to_string(), ToString::to_string),
            ),
        ]),
        Line::from(vec![Span::styled("Last:      ", dim), Span::raw(last)]),
        Line::from(vec![
            Span::styled("Next:      ", dim),
            Span::raw(
                snapshot
                    .next
                    .as_ref()
                    .map_or_else(|| "-".to_string(), ToString::to_string),
            ),
        ]),
        Line::from(vec![
            Span::styled("Queued:    ", dim),
            Span::raw(format!("{} ({} unknown)", snapshot.queued, snapshot.not_found)),
        ]),
    ];
    let state = Paragraph::new(state).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Search "),
    );
    f.render_widget(state, chunks[1]);

    let items: Vec<ListItem> = app
        .messages
        .iter()
        .map(|msg| {
            let style = match msg.style {
                MessageStyle::Info => Style::default().fg(Color::Cyan),
                MessageStyle::Success => Style::default().fg(Color::Green),
                MessageStyle::Error => Style::default().fg(Color::Red),
            };
            ListItem::new(Line::from(Span::styled(msg.text.clone(), style)))
        })
        .collect();
    let messages = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Messages "),
    );
    f.render_widget(messages, chunks[2]);
}

fn render_input<O, L>(f: &mut Frame, area: Rect, app: &App<O, L>) {
    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Yellow)),
        Span::styled(
            app.input.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Try a word (Enter) "),
    );
    f.render_widget(input, area);
}

fn render_status_bar<O, L>(f: &mut Frame, area: Rect, app: &App<O, L>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    let status = app.snapshot().map_or(EngineStatus::Idle, |s| s.status);
    let status_text = Paragraph::new(Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::Gray)),
        Span::styled(
            status.label(),
            Style::default()
                .fg(status_color(status))
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(status_text, chunks[0]);

    let help = Paragraph::new(
        "Tab: language │ Ctrl-R: start/stop │ Ctrl-S: save │ Ctrl-O: website │ Esc: quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[1]);
}

const fn status_color(status: EngineStatus) -> Color {
    match status {
        EngineStatus::Idle => Color::Gray,
        EngineStatus::Running => Color::Yellow,
        EngineStatus::Converged => Color::Green,
        EngineStatus::Exhausted | EngineStatus::Interrupted => Color::Magenta,
    }
}

fn heat_color(score: f64) -> Color {
    match heat(score) {
        Heat::Hot => Color::Red,
        Heat::Warm => Color::Yellow,
        Heat::Cold => Color::Blue,
    }
}
