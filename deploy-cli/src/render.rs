use crossterm::style::{self, Stylize};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{Controller, UiState};

/// Dot spinner frames.
pub const SPINNER_FRAMES: &[&str] = &["⣾ ", "⣽ ", "⣻ ", "⢿ ", "⡿ ", "⣟ ", "⣯ ", "⣷ "];
pub const LOADING_CAPTION: &str = " should you?...";

const SPINNER_COLOR: Color = Color::Indexed(205);
const FOREGROUND: style::Color = style::Color::Rgb { r: 0xFA, g: 0xFA, b: 0xFA };
const POSITIVE: style::Color = style::Color::Rgb { r: 0x16, g: 0xC4, b: 0x7F };
const NEGATIVE: style::Color = style::Color::Rgb { r: 0xAF, g: 0x3E, b: 0x3E };

/// Which styling path a finished state is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Error,
}

pub fn tone(state: &UiState) -> Option<Tone> {
    match state {
        UiState::Done(result) if result.should_deploy => Some(Tone::Positive),
        UiState::Done(_) => Some(Tone::Negative),
        UiState::Failed(_) => Some(Tone::Error),
        _ => None,
    }
}

pub fn spinner(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

/// Draws the live part of the UI. Finished states are printed after the
/// terminal is released, see [`final_text`].
pub fn draw(frame: &mut Frame, controller: &Controller) {
    let area = frame.area();

    match controller.state() {
        UiState::SelectingTimezone { selected } => {
            draw_catalog(frame, area, controller.timezones(), *selected)
        }
        UiState::Loading => {
            let line = Line::from(vec![
                Span::styled(
                    spinner(controller.spinner_frame()),
                    Style::default().fg(SPINNER_COLOR),
                ),
                Span::raw(LOADING_CAPTION),
            ]);
            frame.render_widget(Paragraph::new(line), area);
        }
        UiState::Done(_) | UiState::Failed(_) => {}
    }
}

fn draw_catalog(frame: &mut Frame, area: Rect, timezones: &[String], selected: usize) {
    let items: Vec<ListItem> = timezones
        .iter()
        .map(|tz| ListItem::new(tz.as_str()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Pick a timezone (↑/↓, enter, q to quit) "),
        )
        .highlight_style(
            Style::default()
                .fg(SPINNER_COLOR)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Text printed once the UI has exited; `None` when the user quit or nothing finished.
pub fn final_text(state: &UiState, plain: bool) -> Option<String> {
    let text = match state {
        UiState::Done(result) => result.message.clone(),
        UiState::Failed(err) => format!("Error: {err}"),
        _ => return None,
    };

    if plain {
        return Some(text);
    }

    let styled = match tone(state)? {
        Tone::Positive => verdict_box(&text, POSITIVE),
        Tone::Negative => verdict_box(&text, NEGATIVE),
        Tone::Error => text.with(NEGATIVE).bold().to_string(),
    };
    Some(styled)
}

/// The message in a padded block: one blank line above, two below.
fn verdict_box(message: &str, background: style::Color) -> String {
    let width = message.chars().count() + 4;
    let blank = " ".repeat(width);
    let paint = |text: String| text.with(FOREGROUND).on(background).bold().to_string();

    [
        paint(blank.clone()),
        paint(format!("  {message}  ")),
        paint(blank.clone()),
        paint(blank),
    ]
    .join("\n")
}
