use crate::types::{HOME, LOGIN_BOUNDARY};

/// Session changes announced by the client.
///
/// The client never navigates by itself; subscribers decide what a
/// destination means for them (the TUI switches screens).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    LoggedIn,
    /// Refresh failed or the server kept rejecting the session
    SessionExpired,
    LoggedOut,
}

impl AuthEvent {
    pub fn destination(&self) -> &'static str {
        match self {
            AuthEvent::LoggedIn => HOME,
            AuthEvent::SessionExpired | AuthEvent::LoggedOut => LOGIN_BOUNDARY,
        }
    }
}
