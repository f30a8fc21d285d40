//! Authenticated API client
//!
//! Every backend call goes through [`AuthenticatedApiClient`]. It owns the
//! session bookkeeping:
//!
//! - credentials are attached to every request (cookie jar, optional bearer)
//! - a 401 triggers one refresh, then one retry of the original request
//! - refreshes are single-flight: concurrent callers share one outcome
//! - logout always wins over a refresh that is still in flight
//!
//! Navigation is not the client's business. Session transitions are
//! published as [`AuthEvent`]s and the application decides what to show.

use crate::cookies::{cookie_value, has_liveness_marker, SessionCookies, ACCESS_TOKEN_COOKIE};
use crate::error::ClientError;
use crate::events::AuthEvent;
use crate::refresh::{RefreshScheduler, DEFAULT_REFRESH_INTERVAL};
use crate::token::TokenStore;
use crate::transport::Transport;
use crate::types::{ApiRequest, LoginRequest, LoginResponse, SessionState, LOGIN_BOUNDARY};
use parking_lot::Mutex;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Refresh-and-retry cycles allowed per request
pub const MAX_AUTH_RETRIES: u32 = 1;

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Period of the background refresh task
    pub refresh_interval: Duration,
    /// Upper bound on refresh and logout round-trips
    pub refresh_timeout: Duration,
    /// Also send the cached token as `Authorization: Bearer`
    pub bearer_header: bool,
    pub login_path: String,
    pub refresh_path: String,
    /// `/logout` is the deprecated spelling; `/api/logout` is canonical
    pub logout_path: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            refresh_timeout: Duration::from_secs(10),
            bearer_header: false,
            login_path: "/login".to_string(),
            refresh_path: "/api/refresh".to_string(),
            logout_path: "/api/logout".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshTrigger {
    /// On demand or after a 401; failure ends the session
    Interactive,
    /// Startup or timer; failure is only logged
    Background,
}

#[derive(Debug)]
struct SessionTracker {
    state: SessionState,
    /// Bumped by login and logout. A refresh that started under an older
    /// epoch must not touch the session when it completes.
    epoch: u64,
    /// The session of this epoch has ended. Only a login clears it.
    expired: bool,
}

pub struct AuthenticatedApiClient {
    transport: Arc<dyn Transport>,
    cookies: Arc<SessionCookies>,
    tokens: Arc<dyn TokenStore>,
    options: ClientOptions,
    events: broadcast::Sender<AuthEvent>,
    session: Mutex<SessionTracker>,
    /// Held for the whole refresh round-trip; stores the latest outcome
    refresh_gate: tokio::sync::Mutex<Result<(), ClientError>>,
    /// Number of completed refreshes
    refresh_generation: AtomicU64,
}

impl fmt::Debug for AuthenticatedApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedApiClient")
            .field("state", &self.session_state())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl AuthenticatedApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        cookies: Arc<SessionCookies>,
        tokens: Arc<dyn TokenStore>,
        options: ClientOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let client = Self {
            transport,
            cookies,
            tokens,
            options,
            events,
            session: Mutex::new(SessionTracker {
                state: SessionState::Unauthenticated,
                epoch: 0,
                expired: false,
            }),
            refresh_gate: tokio::sync::Mutex::new(Ok(())),
            refresh_generation: AtomicU64::new(0),
        };

        if client.is_logged_in() {
            client.session.lock().state = SessionState::Authenticated;
        }
        client
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.lock().state
    }

    /// True once the session has expired or been logged out, until the
    /// next successful login
    pub fn session_ended(&self) -> bool {
        self.session.lock().expired
    }

    /// True while a liveness marker cookie is present
    pub fn is_logged_in(&self) -> bool {
        self.cookies
            .header_value()
            .is_some_and(|header| has_liveness_marker(&header))
    }

    /// Session token: the local cache first, then the cookie
    pub fn current_token(&self) -> Option<String> {
        match self.tokens.load() {
            Ok(Some(token)) => return Some(token),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not read local token cache"),
        }
        self.cookies
            .header_value()
            .and_then(|header| cookie_value(&header, ACCESS_TOKEN_COOKIE))
            .filter(|token| !token.is_empty())
    }

    /// Startup guard: a liveness marker and a token must both be present
    pub fn ensure_session(&self) -> Result<(), ClientError> {
        let epoch = self.session.lock().epoch;
        if !self.session_ended() && self.is_logged_in() && self.current_token().is_some() {
            return Ok(());
        }
        self.expire_session(epoch, "no session token or liveness marker");
        Err(ClientError::NotAuthenticated)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "Please fill in both username and password".to_string(),
            ));
        }

        let body = serde_json::to_value(LoginRequest { username, password })?;
        let request = ApiRequest::new(Method::POST, self.options.login_path.as_str())
            .with_body(Some(body));
        let response = self.transport.send(&request).await?;

        if !response.is_success() {
            warn!(username, status = response.status, "login rejected");
            return Err(response.into_status_error());
        }

        let login: LoginResponse = serde_json::from_str(&response.body)?;
        if let Some(token) = &login.access_token {
            self.tokens.save(token)?;
        }

        if login.logged_in {
            {
                let mut session = self.session.lock();
                session.epoch += 1;
                session.state = SessionState::Authenticated;
                session.expired = false;
            }
            info!(username, "logged in");
            self.emit(AuthEvent::LoggedIn);
        }

        Ok(login)
    }

    /// Refresh the session on demand.
    ///
    /// On failure the session is over: the state drops to
    /// `Unauthenticated` and a single [`AuthEvent::SessionExpired`] goes out.
    pub async fn refresh_token(&self) -> Result<(), ClientError> {
        self.refresh(RefreshTrigger::Interactive).await
    }

    /// Refresh without ending the session on failure
    pub(crate) async fn refresh_in_background(&self) -> Result<(), ClientError> {
        self.refresh(RefreshTrigger::Background).await
    }

    async fn refresh(&self, trigger: RefreshTrigger) -> Result<(), ClientError> {
        let observed_generation = self.refresh_generation.load(Ordering::Acquire);
        let epoch = {
            let session = self.session.lock();
            if session.expired {
                debug!("session has ended; refusing to refresh until the next login");
                return Err(ClientError::NotAuthenticated);
            }
            session.epoch
        };

        let mut last_outcome = self.refresh_gate.lock().await;
        let outcome = if self.refresh_generation.load(Ordering::Acquire) != observed_generation {
            debug!("refresh completed while waiting; sharing its outcome");
            last_outcome.clone()
        } else {
            self.set_state_in_epoch(epoch, SessionState::Refreshing);
            let outcome = self.send_refresh().await;
            *last_outcome = outcome.clone();
            self.refresh_generation.fetch_add(1, Ordering::AcqRel);
            outcome
        };
        drop(last_outcome);

        self.finish_refresh(epoch, trigger, &outcome);
        outcome
    }

    async fn send_refresh(&self) -> Result<(), ClientError> {
        debug!("attempting to refresh token");
        let request = ApiRequest::new(Method::POST, self.options.refresh_path.as_str());

        match tokio::time::timeout(self.options.refresh_timeout, self.transport.send(&request))
            .await
        {
            Err(_) => Err(ClientError::RefreshFailed(format!(
                "no response within {:?}",
                self.options.refresh_timeout
            ))),
            Ok(Err(e)) => Err(ClientError::RefreshFailed(e.to_string())),
            Ok(Ok(response)) if response.is_success() => Ok(()),
            Ok(Ok(response)) => Err(ClientError::RefreshFailed(format!(
                "server answered {}",
                response.status
            ))),
        }
    }

    fn finish_refresh(&self, epoch: u64, trigger: RefreshTrigger, outcome: &Result<(), ClientError>) {
        match (outcome, trigger) {
            (Ok(()), _) => {
                self.set_state_in_epoch(epoch, SessionState::Authenticated);
                debug!("token refreshed");
            }
            (Err(e), RefreshTrigger::Background) => {
                let fallback = if self.is_logged_in() {
                    SessionState::Authenticated
                } else {
                    SessionState::Unauthenticated
                };
                self.set_state_in_epoch(epoch, fallback);
                debug!(error = %e, "background refresh failed; session left as is");
            }
            (Err(e), RefreshTrigger::Interactive) => {
                self.expire_session(epoch, &e.to_string());
            }
        }
    }

    /// Issue one request with the refresh-retry policy.
    ///
    /// A 401 leads to one refresh; if that succeeds the request is sent once
    /// more. A second 401 ends the session. Other error statuses and
    /// transport failures are returned as-is, never retried.
    pub async fn api_request(
        &self,
        path: &str,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError> {
        let epoch = self.session.lock().epoch;
        let mut retries = 0;

        loop {
            if self.session_ended() {
                debug!(path, "session has ended; request not sent");
                return Err(ClientError::NotAuthenticated);
            }
            if !self.is_logged_in() {
                self.expire_session(epoch, "no liveness marker");
                return Err(ClientError::NotAuthenticated);
            }

            let request = ApiRequest::new(method.clone(), path)
                .with_body(body.clone())
                .with_bearer(self.bearer());
            let response = self.transport.send(&request).await?;

            if response.is_unauthorized() {
                if retries >= MAX_AUTH_RETRIES {
                    self.expire_session(epoch, "still unauthorized after refresh");
                    return Err(ClientError::AuthExpired);
                }
                retries += 1;
                debug!(path, "unauthorized; refreshing before retry");
                self.refresh_token().await?;
                continue;
            }

            if !response.is_success() {
                debug!(path, status = response.status, "request failed");
                return Err(response.into_status_error());
            }

            return response.json();
        }
    }

    /// [`api_request`](Self::api_request) decoded into `T`
    pub async fn api_request_as<T: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> Result<T, ClientError> {
        let value = self.api_request(path, method, body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Best-effort logout.
    ///
    /// Local state is always cleared and [`AuthEvent::LoggedOut`] always
    /// fires; the server call's error, if any, is returned for logging.
    pub async fn logout(&self) -> Result<(), ClientError> {
        {
            let mut session = self.session.lock();
            session.epoch += 1;
            session.state = SessionState::Unauthenticated;
            session.expired = true;
        }

        let request = ApiRequest::new(Method::POST, self.options.logout_path.as_str())
            .with_bearer(self.bearer());
        let outcome =
            match tokio::time::timeout(self.options.refresh_timeout, self.transport.send(&request))
                .await
            {
                Err(_) => Err(ClientError::Network("logout timed out".to_string())),
                Ok(Err(e)) => Err(e),
                Ok(Ok(response)) if response.is_success() => Ok(()),
                Ok(Ok(response)) => Err(response.into_status_error()),
            };

        if let Err(e) = &outcome {
            warn!(error = %e, "logout request failed; signing out locally anyway");
        }
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "could not clear local token cache");
        }
        self.cookies.clear();

        info!("logged out");
        self.emit(AuthEvent::LoggedOut);
        outcome
    }

    /// Start the periodic refresh task for this client
    pub fn start_background_refresh(self: &Arc<Self>) -> RefreshScheduler {
        RefreshScheduler::spawn(Arc::clone(self), self.options.refresh_interval)
    }

    fn bearer(&self) -> Option<String> {
        if self.options.bearer_header {
            self.current_token()
        } else {
            None
        }
    }

    /// Ended sessions stay `Unauthenticated` until the next login
    fn set_state_in_epoch(&self, epoch: u64, state: SessionState) {
        let mut session = self.session.lock();
        if session.epoch == epoch && !session.expired {
            session.state = state;
        }
    }

    /// End the session and announce it once per epoch. Does nothing if a
    /// login or logout happened since `epoch`.
    fn expire_session(&self, epoch: u64, reason: &str) {
        {
            let mut session = self.session.lock();
            if session.epoch != epoch {
                debug!(reason, "session changed since request began; not expiring");
                return;
            }
            session.state = SessionState::Unauthenticated;
            if session.expired {
                return;
            }
            session.expired = true;
        }
        warn!(reason, "session expired; sending user to {}", LOGIN_BOUNDARY);
        self.emit(AuthEvent::SessionExpired);
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
