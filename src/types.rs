use crate::error::ClientError;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unauthenticated entry page; every failed-auth flow ends here
pub const LOGIN_BOUNDARY: &str = "/login";

/// Landing page after a successful login
pub const HOME: &str = "/";

/// A single call against the backend, relative to the configured base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub path: String,
    pub method: Method,
    pub body: Option<serde_json::Value>,
    /// Sent as `Authorization: Bearer` when set
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
            bearer: None,
        }
    }

    pub fn with_body(mut self, body: Option<serde_json::Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_bearer(mut self, bearer: Option<String>) -> Self {
        self.bearer = bearer;
        self
    }
}

/// Represents an HTTP response received from the backend
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code (200, 401, etc.)
    pub status: u16,

    /// Raw response body
    pub body: String,

    /// Time taken to complete the request
    pub duration: Duration,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            duration: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Decode the body as JSON. An empty body decodes as `null`.
    pub fn json(&self) -> Result<serde_json::Value, ClientError> {
        if self.body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Server-provided error text: `message` first, then `msg`
    pub fn error_message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        ["message", "msg"]
            .iter()
            .find_map(|key| value.get(key).and_then(|m| m.as_str()))
            .map(str::to_string)
    }

    /// Convert a non-success response into the matching error
    pub fn into_status_error(self) -> ClientError {
        ClientError::Status {
            status: self.status,
            message: self.error_message(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Per-process view of the browser-style session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Refreshing,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "signed out",
            SessionState::Authenticated => "signed in",
            SessionState::Refreshing => "refreshing",
        }
    }
}
