//! Reusable UI components
//!
//! - Header (title, backend, session status)
//! - Footer (command help)

use super::styling::session_state_color;
use crate::state::{AppState, InputMode, Screen};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the application header with backend and session info
pub fn render_header(frame: &mut Frame, area: Rect, base_url: &str, state: &AppState) {
    let mut spans = vec![
        Span::styled(
            format!("timetrack tui - {base_url} | "),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            state.session_state.label(),
            Style::default().fg(session_state_color(state.session_state)),
        ),
    ];

    if let Some(username) = &state.username {
        spans.push(Span::styled(
            format!(" as {username}"),
            Style::default().fg(Color::Cyan),
        ));
    }

    if let Some(hint) = &state.token_hint {
        spans.push(Span::styled(
            format!(" | token {hint}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let header =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

/// Render the footer with command help
pub fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let footer_text = if state.notification.is_some() {
        "Enter/Esc:Dismiss"
    } else {
        match (&state.screen, &state.input_mode) {
            (Screen::Login, _) => "Tab:Switch field Enter:Log in Esc:Quit",
            (Screen::Dashboard, InputMode::ConfirmLogout) => "y:Log out n/Esc:Cancel",
            (Screen::Dashboard, InputMode::ConfirmDeleteActivity(_)) => "y:Delete n/Esc:Cancel",
            (Screen::Dashboard, InputMode::AddSession) => {
                "Tab/←/→:Activity 0-9:Duration Enter:Save Esc:Cancel"
            }
            (Screen::Dashboard, InputMode::AddActivity) => "Enter:Save Esc:Cancel",
            (Screen::Dashboard, InputMode::Normal) => {
                "Tab:Panel j/k:Nav a:Add session n:New activity d:Delete r:Reload L:Logout q:Quit"
            }
        }
    };

    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Commands"));

    frame.render_widget(footer, area);
}
