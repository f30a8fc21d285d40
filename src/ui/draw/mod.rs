//! UI drawing module
//!
//! This module is organized into focused submodules:
//! - `components`: Reusable UI components (header, footer, spinners)
//! - `modals`: Modal dialogs (notifications, confirmations, entry forms)
//! - `panels`: Screens (login form, sessions and activities panels)
//! - `styling`: Color schemes and style constants

mod components;
mod modals;
mod panels;
mod styling;

use crate::state::{AppState, InputMode, Screen};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

pub use components::{render_footer, render_header};
pub use modals::{
    render_activity_form, render_delete_activity_modal, render_logout_confirmation_modal,
    render_notification_modal, render_session_form,
};
pub use panels::{render_activities_panel, render_login_form, render_sessions_panel};

/// Draw one full frame
pub fn render(frame: &mut Frame, state: &AppState, base_url: &str, spinner_index: usize) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, main_chunks[0], base_url, state);

    match state.screen {
        Screen::Login => render_login_form(frame, main_chunks[1], state, spinner_index),
        Screen::Dashboard => {
            let body_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(main_chunks[1]);

            render_sessions_panel(frame, body_chunks[0], state, spinner_index);
            render_activities_panel(frame, body_chunks[1], state);
        }
    }

    render_footer(frame, main_chunks[2], state);

    // Render modals LAST - after everything else
    match &state.input_mode {
        InputMode::Normal => {}
        InputMode::ConfirmLogout => render_logout_confirmation_modal(frame),
        InputMode::ConfirmDeleteActivity(name) => render_delete_activity_modal(frame, name),
        InputMode::AddSession => render_session_form(frame, state, spinner_index),
        InputMode::AddActivity => render_activity_form(frame, state, spinner_index),
    }
    if let Some(notification) = &state.notification {
        render_notification_modal(frame, notification);
    }
}
