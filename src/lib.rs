//! Session-aware HTTP client for the time-tracking backend.
//!
//! The heart of the crate is [`AuthenticatedApiClient`]: every call goes out
//! with the session cookies attached, a 401 triggers exactly one token refresh
//! followed by one retry, and unrecoverable auth failures are reported as
//! [`AuthEvent`]s instead of navigating anywhere. The terminal front end in
//! `main.rs` is one subscriber of those events.

pub mod client;
pub mod config;
pub mod cookies;
pub mod error;
pub mod events;
pub mod logging;
pub mod refresh;
pub mod token;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{AuthenticatedApiClient, ClientOptions, MAX_AUTH_RETRIES};
pub use cookies::{has_liveness_marker, SessionCookies};
pub use error::ClientError;
pub use events::AuthEvent;
pub use refresh::{run_refresh_tick, RefreshScheduler, RefreshTick};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transport::{HttpTransport, Transport};
pub use types::{ApiRequest, ApiResponse, LoginResponse, SessionState, HOME, LOGIN_BOUNDARY};
