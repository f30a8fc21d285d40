//! Modal dialog rendering
//!
//! - Notification modal (success, warning, error)
//! - Logout and delete confirmation modals
//! - Session and activity forms

use super::styling::{notification_color, spinner_frame, HELP_FG, MODAL_BG};
use crate::state::{AppState, Notification};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Rect of `height` rows and `percent` of the width (capped at `max_width`),
/// centered in `area`
pub fn centered_rect(area: Rect, percent: u16, max_width: u16, height: u16) -> Rect {
    let width = (area.width as u32 * percent as u32 / 100).min(max_width as u32) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

pub fn render_notification_modal(frame: &mut Frame, notification: &Notification) {
    let modal_area = centered_rect(frame.area(), 60, 70, 8);
    let color = notification_color(notification.kind);

    // Clear the background behind the modal
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .title(format!(" {} ", notification.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(MODAL_BG).fg(Color::White));

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let message = Paragraph::new(notification.message.clone())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(message, chunks[0]);

    let help = Paragraph::new("Enter/Esc: Dismiss")
        .style(Style::default().fg(HELP_FG))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[1]);
}

pub fn render_logout_confirmation_modal(frame: &mut Frame) {
    let modal_area = centered_rect(frame.area(), 50, 60, 7);

    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .title(" Log out? ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(MODAL_BG).fg(Color::White));

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let message = Paragraph::new("Your session will be closed on this machine.")
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(message, chunks[0]);

    let actions = Paragraph::new("[Y] Yes, log out  |  [N] Cancel")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    frame.render_widget(actions, chunks[2]);
}

pub fn render_delete_activity_modal(frame: &mut Frame, name: &str) {
    let modal_area = centered_rect(frame.area(), 50, 60, 7);

    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .title(" Delete activity? ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(MODAL_BG).fg(Color::White));

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let message = Paragraph::new(format!("\"{name}\" will be removed."))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(message, chunks[0]);

    let actions = Paragraph::new("[Y] Yes, delete  |  [N] Cancel")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    frame.render_widget(actions, chunks[2]);
}

/// Title, labelled rows and a status line inside a form modal
fn render_form(
    frame: &mut Frame,
    title: &str,
    rows: &[(&str, String)],
    status: String,
) {
    let height = rows.len() as u16 * 2 + 4;
    let modal_area = centered_rect(frame.area(), 60, 60, height);

    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .style(Style::default().bg(MODAL_BG).fg(Color::White));

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let mut constraints = vec![Constraint::Length(1); rows.len() * 2];
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, (label, value)) in rows.iter().enumerate() {
        frame.render_widget(
            Paragraph::new(*label).style(Style::default().fg(Color::LightCyan)),
            chunks[i * 2],
        );
        frame.render_widget(
            Paragraph::new(value.as_str()).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            chunks[i * 2 + 1],
        );
    }

    let help = Paragraph::new(status)
        .style(Style::default().fg(HELP_FG))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[chunks.len() - 1]);
}

fn form_status(state: &AppState, spinner_index: usize) -> String {
    if state.saving {
        format!("{} Saving...", spinner_frame(spinner_index))
    } else {
        "Enter: Save  |  Esc: Cancel".to_string()
    }
}

pub fn render_session_form(frame: &mut Frame, state: &AppState, spinner_index: usize) {
    let activity = match state.form_activity_name() {
        Some(name) => format!("< {name} >"),
        None if state.activities.is_empty() => "(add an activity first)".to_string(),
        None => "< select an activity >".to_string(),
    };
    let rows = [
        ("Activity (Tab/←/→):", activity),
        ("Duration (minutes):", format!("{}_", state.session_form.duration)),
    ];
    render_form(frame, "Add session", &rows, form_status(state, spinner_index));
}

pub fn render_activity_form(frame: &mut Frame, state: &AppState, spinner_index: usize) {
    let rows = [("Name:", format!("{}_", state.activity_form.name))];
    render_form(frame, "New activity", &rows, form_status(state, spinner_index));
}
