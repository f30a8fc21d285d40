//! Screen rendering
//!
//! - Login form (centered)
//! - Sessions panel (left side of the dashboard)
//! - Activities panel (right side)

use super::modals::centered_rect;
use super::styling::{spinner_frame, HELP_FG};
use crate::state::{total_minutes, AppState, Focus, LoadingState, LoginField};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render_login_form(frame: &mut Frame, area: Rect, state: &AppState, spinner_index: usize) {
    let form_area = centered_rect(area, 60, 60, 9);
    frame.render_widget(Clear, form_area);

    let block = Block::default()
        .title(" Log in ")
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let field_style = |field: LoginField| {
        if state.login.active_field == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        }
    };
    let cursor = |field: LoginField| {
        if state.login.active_field == field {
            "_"
        } else {
            ""
        }
    };

    frame.render_widget(
        Paragraph::new("Username:").style(Style::default().fg(Color::LightCyan)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(format!(
            "{}{}",
            state.login.username,
            cursor(LoginField::Username)
        ))
        .style(field_style(LoginField::Username)),
        chunks[1],
    );

    frame.render_widget(
        Paragraph::new("Password:").style(Style::default().fg(Color::LightCyan)),
        chunks[2],
    );
    // Never echo the password
    frame.render_widget(
        Paragraph::new(format!(
            "{}{}",
            "•".repeat(state.login.password.chars().count()),
            cursor(LoginField::Password)
        ))
        .style(field_style(LoginField::Password)),
        chunks[3],
    );

    let status = if state.login.submitting {
        format!("{} Logging in...", spinner_frame(spinner_index))
    } else {
        "Enter: Log in  |  Tab: Switch field  |  Esc: Quit".to_string()
    };
    frame.render_widget(
        Paragraph::new(status)
            .style(Style::default().fg(HELP_FG))
            .alignment(Alignment::Center),
        chunks[5],
    );
}

pub fn render_sessions_panel(frame: &mut Frame, area: Rect, state: &AppState, spinner_index: usize) {
    let title = format!(
        "[1] Sessions ({}, {} min)",
        state.sessions.len(),
        total_minutes(state)
    );
    let block = panel_block(title, state.focus == Focus::Sessions);

    match &state.loading_state {
        LoadingState::Loading if state.sessions.is_empty() => {
            let loading = Paragraph::new(format!(
                "{} Loading sessions\n\nPlease wait...",
                spinner_frame(spinner_index)
            ))
            .style(Style::default().fg(Color::Yellow))
            .block(block);
            frame.render_widget(loading, area);
        }
        LoadingState::Error(error) if state.sessions.is_empty() => {
            let message = Paragraph::new(format!("{error}\n\nPress [r] to retry"))
                .style(Style::default().fg(Color::Red))
                .block(block);
            frame.render_widget(message, area);
        }
        _ if state.sessions.is_empty() => {
            let empty = Paragraph::new("No sessions recorded yet")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
        }
        _ => {
            let items: Vec<ListItem> = state
                .sessions
                .iter()
                .map(|session| {
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            session.activity.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!(" - {} min", session.duration),
                            Style::default().fg(Color::Gray),
                        ),
                        Span::styled(
                            format!("  {}", display_date(&session.date)),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]))
                })
                .collect();

            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().bg(Color::DarkGray))
                .highlight_symbol("> ");

            let mut list_state = ListState::default();
            list_state.select(Some(state.selected_session));
            frame.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

pub fn render_activities_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Focus::Activities;
    let block = panel_block(
        format!("[2] Activities ({})", state.activities.len()),
        focused,
    );

    if state.activities.is_empty() {
        let empty = Paragraph::new("No activities available")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .activities
        .iter()
        .map(|name| ListItem::new(format!("• {name}")))
        .collect();

    let mut list = List::new(items).block(block);
    let mut list_state = ListState::default();
    // Only the focused panel shows its cursor
    if focused {
        list = list
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        list_state.select(Some(state.selected_activity));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

/// `2024-03-01T10:00:00.123` -> `2024-03-01 10:00`
fn display_date(date: &str) -> String {
    match date.split_once('T') {
        Some((day, time)) => {
            let time: String = time.chars().take(5).collect();
            format!("{day} {time}")
        }
        None => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-03-01T10:00:00.123456"), "2024-03-01 10:00");
        assert_eq!(display_date("2024-03-01"), "2024-03-01");
        assert_eq!(display_date(""), "");
    }
}
