//! TUI rendering module.
//!
//! This module handles all visual rendering using ratatui:
//! - Start sequence bar at the top
//! - Entry list on the left, with a state glyph per entry
//! - Details of the selected entry on the right
//! - Status bar with mode, message and counters
//! - Help overlay

pub mod glyphs;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::model::{AppMode, AppState, Entry, EntryStatus, RealignmentStatus};

/// Width reserved for the entry list (including border).
const ENTRY_PANEL_WIDTH: u16 = 34;
/// Minimum width for the details panel.
const MIN_DETAIL_PANEL_WIDTH: u16 = 20;
/// Height of the start sequence bar.
const START_BAR_HEIGHT: u16 = 1;
/// Height of the status bar.
const STATUS_BAR_HEIGHT: u16 = 1;
/// Number of bases of the start sequence shown in the top bar.
const START_PREVIEW_LEN: usize = 40;

const HELP_TEXT: &[(&str, &str)] = &[
    ("j / k", "next / previous entry"),
    ("g / G", "first / last entry"),
    ("r", "realign all entries"),
    ("w", "write results to output directory"),
    (":start SEQ", "set start sequence"),
    (":startfile PATH", "load start sequence from file"),
    (":add PATH", "add a genome file"),
    (":fetch ACC,...", "download NCBI accessions"),
    (":w [DIR]", "write results (optionally to DIR)"),
    (":wi [DIR]", "write normalized inputs"),
    (":zip PATH", "write results as a ZIP archive"),
    ("? / :h", "toggle this help"),
    ("q / :q", "quit"),
];

/// Color scheme for nucleotides.
pub trait ColorScheme {
    fn get_color(&self, c: char) -> Color;
}

/// DNA nucleotide color scheme.
pub struct DnaColorScheme;

impl ColorScheme for DnaColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            'A' => Color::Red,
            'C' => Color::Green,
            'G' => Color::Yellow,
            'T' => Color::Blue,
            _ => Color::DarkGray,
        }
    }
}

/// Renders the complete UI.
pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(START_BAR_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(ENTRY_PANEL_WIDTH),
            Constraint::Min(MIN_DETAIL_PANEL_WIDTH),
        ])
        .split(main_layout[1]);

    render_start_bar(frame, state, main_layout[0]);
    render_entry_panel(frame, state, content_layout[0]);
    render_detail_panel(frame, state, content_layout[1]);
    render_status_bar(frame, state, main_layout[2]);

    if state.show_help {
        render_help(frame, area);
    }
}

/// Renders the current start sequence.
fn render_start_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let line = match &state.start {
        Some(start) => {
            let preview: String = start.as_str().chars().take(START_PREVIEW_LEN).collect();
            let ellipsis = if start.len() > START_PREVIEW_LEN { "…" } else { "" };
            Line::from(vec![
                Span::styled(" Start ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!("{} ({} bp) ", start.id(), start.len())),
                Span::styled(
                    format!("{}{}", preview, ellipsis),
                    Style::default().fg(Color::Cyan),
                ),
            ])
        }
        None => Line::from(vec![
            Span::styled(" Start ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("not set", Style::default().fg(Color::DarkGray)),
        ]),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Glyph and color for an entry's current state.
fn entry_marker(entry: &Entry, glyphs: &glyphs::Glyphs) -> (&'static str, Color) {
    match (&entry.status, &entry.realignment) {
        (EntryStatus::Pending, _) => (glyphs.pending, Color::DarkGray),
        (EntryStatus::Invalid(_), _) => (glyphs.invalid, Color::Red),
        (EntryStatus::Valid(_), RealignmentStatus::NotAttempted) => (glyphs.valid, Color::White),
        (EntryStatus::Valid(_), RealignmentStatus::NotFound) => (glyphs.not_found, Color::Yellow),
        (EntryStatus::Valid(_), RealignmentStatus::Matched(r)) if r.is_reversed() => {
            (glyphs.reversed, Color::Magenta)
        }
        (EntryStatus::Valid(_), RealignmentStatus::Matched(_)) => (glyphs.forward, Color::Green),
    }
}

/// Renders the entry list.
fn render_entry_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let visible_rows = area.height.saturating_sub(2) as usize;
    let glyphs = &state.settings.glyphs;
    let max_name_len = (ENTRY_PANEL_WIDTH.saturating_sub(8)) as usize;

    let start_row = state.viewport.first_row;
    let end_row = (start_row + visible_rows).min(state.entries.len());

    let lines: Vec<Line> = state.entries[start_row..end_row]
        .iter()
        .enumerate()
        .map(|(offset, entry)| {
            let is_current = start_row + offset == state.cursor;
            let (marker, color) = entry_marker(entry, glyphs);

            // Truncate name if too long
            let name = if entry.id.chars().count() > max_name_len {
                let head: String = entry.id.chars().take(max_name_len - 1).collect();
                format!("{}…", head)
            } else {
                entry.id.clone()
            };

            let name_style = if is_current {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let cursor = if is_current { glyphs.cursor } else { " " };

            Line::from(vec![
                Span::raw(cursor),
                Span::styled(format!("{} ", marker), Style::default().fg(color)),
                Span::styled(name, name_style),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Genomes ({})", state.entries.len()));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders details of the selected entry.
fn render_detail_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let width = area.width.saturating_sub(2).max(1) as usize;
    let label = Style::default().add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = Vec::new();

    let Some(entry) = state.selected() else {
        lines.push(Line::from("No genomes loaded. Use :add <PATH>."));
        let block = Block::default().borders(Borders::ALL).title("Details");
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    };

    lines.push(Line::from(vec![
        Span::styled("Entry: ", label),
        Span::raw(entry.id.clone()),
    ]));

    match &entry.status {
        EntryStatus::Pending => lines.push(Line::from(vec![
            Span::styled("Status: ", label),
            Span::raw("loading"),
        ])),
        EntryStatus::Invalid(reason) => {
            lines.push(Line::from(vec![
                Span::styled("Status: ", label),
                Span::styled("invalid", Style::default().fg(Color::Red)),
            ]));
            for part in textwrap::wrap(reason, width) {
                lines.push(Line::from(Span::styled(
                    part.into_owned(),
                    Style::default().fg(Color::Red),
                )));
            }
        }
        EntryStatus::Valid(record) => {
            lines.push(Line::from(vec![
                Span::styled("Status: ", label),
                Span::raw(format!("valid, {} bp", record.len())),
            ]));
            lines.push(Line::from(Span::styled("Description:", label)));
            for part in textwrap::wrap(record.description(), width) {
                lines.push(Line::from(part.into_owned()));
            }
        }
    }

    lines.push(Line::from(""));
    match &entry.realignment {
        RealignmentStatus::NotAttempted => lines.push(Line::from(vec![
            Span::styled("Realignment: ", label),
            Span::styled("not run", Style::default().fg(Color::DarkGray)),
        ])),
        RealignmentStatus::NotFound => lines.push(Line::from(vec![
            Span::styled("Realignment: ", label),
            Span::styled(
                "start sequence not found in this genome",
                Style::default().fg(Color::Yellow),
            ),
        ])),
        RealignmentStatus::Matched(realigned) => {
            lines.push(Line::from(vec![
                Span::styled("Realignment: ", label),
                Span::styled(
                    format!("found on {} strand", realigned.strand),
                    Style::default().fg(Color::Green),
                ),
            ]));
            if let Some(name) = entry.result_file_name() {
                lines.push(Line::from(vec![Span::styled("Output: ", label), Span::raw(name)]));
            }
            lines.push(Line::from(Span::styled("Begins:", label)));
            lines.push(sequence_preview(realigned.record.sequence(), width));
        }
    }

    let block = Block::default().borders(Borders::ALL).title("Details");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Colored view of the first `width` bases of a sequence.
fn sequence_preview(sequence: &str, width: usize) -> Line<'static> {
    let color_scheme = DnaColorScheme;
    let spans: Vec<Span> = sequence
        .chars()
        .take(width)
        .map(|c| {
            Span::styled(
                c.to_string(),
                Style::default().fg(Color::Black).bg(color_scheme.get_color(c)),
            )
        })
        .collect();
    Line::from(spans)
}

/// Renders the status bar at the bottom.
fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let (mode_str, command_str) = match &state.mode {
        AppMode::Normal => ("NORMAL", String::new()),
        AppMode::Command(cmd) => ("COMMAND", format!(":{}", cmd)),
    };

    let realigned = state.entries.iter().filter(|e| e.realigned().is_some()).count();
    let position_info = format!(
        "Entry {}/{} | Realigned {} ",
        (state.cursor + 1).min(state.entries.len()),
        state.entries.len(),
        realigned
    );

    let message = state.status_message.as_deref().unwrap_or("");

    let left_content = if command_str.is_empty() {
        format!(" {} | {} ", mode_str, message)
    } else {
        format!(" {} | {} ", mode_str, command_str)
    };

    // Keep the counters visible on narrow terminals
    let room = (area.width as usize).saturating_sub(position_info.len());
    let left_content: String = left_content.chars().take(room).collect();
    let left_len = left_content.chars().count();
    let status_line = Line::from(vec![
        Span::styled(
            left_content,
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::styled(
            " ".repeat((area.width as usize).saturating_sub(left_len + position_info.len())),
            Style::default().bg(Color::Cyan),
        ),
        Span::styled(
            position_info,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(status_line), area);
}

/// Renders the help overlay in the middle of the screen.
fn render_help(frame: &mut Frame, area: Rect) {
    let key_width = HELP_TEXT.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let lines: Vec<Line> = HELP_TEXT
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<width$}  ", key, width = key_width),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(*what),
            ])
        })
        .collect();

    let width = (area.width.saturating_sub(4)).min(60);
    let height = (HELP_TEXT.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help (any key to close)");
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// Number of entry rows that fit in a terminal of the given size.
pub fn calculate_visible_rows(terminal_height: u16) -> usize {
    // Account for borders, start bar and status bar
    terminal_height.saturating_sub(START_BAR_HEIGHT + STATUS_BAR_HEIGHT + 2) as usize
}
