//! Styling utilities and color schemes
//!
//! This module contains color helpers and style constants used throughout the UI.

use crate::state::NotificationKind;
use ratatui::style::Color;
use timetrack_tui::SessionState;

/// Spinner frames for in-flight requests
pub const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

/// Modal background
pub const MODAL_BG: Color = Color::Rgb(30, 30, 30);

/// Muted help text
pub const HELP_FG: Color = Color::Rgb(150, 150, 150);

pub fn notification_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Success => Color::Green,
        NotificationKind::Warning => Color::Yellow,
        NotificationKind::Error => Color::Red,
    }
}

pub fn session_state_color(state: SessionState) -> Color {
    match state {
        SessionState::Authenticated => Color::Green,
        SessionState::Refreshing => Color::Yellow,
        SessionState::Unauthenticated => Color::DarkGray,
    }
}

pub fn spinner_frame(index: usize) -> &'static str {
    SPINNER[index % SPINNER.len()]
}
