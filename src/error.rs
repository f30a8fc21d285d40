/// Shown when the server gives no usable message
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong, please try again";

/// Errors surfaced by the authenticated client.
///
/// `Clone` because a single refresh outcome is handed to every caller that
/// waited on it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The server answered 401 and the one allowed recovery did not help
    #[error("authentication expired")]
    AuthExpired,
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Validation(String),
    /// No liveness marker or token; nothing was sent
    #[error("not logged in")]
    NotAuthenticated,
    #[error("request failed with status {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("token store error: {0}")]
    Store(String),
    /// The HTTP client could not be set up
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Failures that end the session. These are recovered by the login
    /// screen, so they are never shown as a notification.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ClientError::AuthExpired | ClientError::RefreshFailed(_) | ClientError::NotAuthenticated
        )
    }

    /// Text for the user-facing error notification
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ClientError::Validation(message) => message.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ClientError::Config(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_uses_server_message() {
        let err = ClientError::Status {
            status: 400,
            message: Some("Cette activité existe déjà".to_string()),
        };
        assert_eq!(err.user_message(), "Cette activité existe déjà");
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = ClientError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);

        let err = ClientError::Status {
            status: 500,
            message: Some("   ".to_string()),
        };
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);

        let err = ClientError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_auth_failures() {
        assert!(ClientError::AuthExpired.is_auth_failure());
        assert!(ClientError::RefreshFailed("401".into()).is_auth_failure());
        assert!(ClientError::NotAuthenticated.is_auth_failure());
        assert!(!ClientError::Network("x".into()).is_auth_failure());
        assert!(!ClientError::Validation("x".into()).is_auth_failure());
        assert!(!ClientError::Config("x".into()).is_auth_failure());
    }

    #[tokio::test]
    async fn test_builder_errors_are_configuration_errors() {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        assert!(err.is_builder());

        let err = ClientError::from(err);
        assert!(matches!(err, ClientError::Config(_)));
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }
}
