use crate::cookies::SessionCookies;
use crate::error::ClientError;
use crate::types::{ApiRequest, ApiResponse};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Network seam of the client.
///
/// A send that produced any HTTP response is `Ok`, whatever the status;
/// only transport-level failures come back as [`ClientError::Network`].
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// reqwest-backed transport sharing the session cookie jar
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        cookies: Arc<SessionCookies>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        // Fail early on a bad base URL rather than on the first request
        build_url(base_url, "/")?;

        let client = reqwest::Client::builder()
            .cookie_provider(cookies)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = build_url(&self.base_url, &request.path)?;
        let mut request_builder = self.client.request(request.method.clone(), url);

        // Only announce JSON when there is a body to go with it
        if let Some(body) = &request.body {
            request_builder = request_builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(serde_json::to_string(body)?);
        }

        if let Some(token) = &request.bearer {
            request_builder = request_builder.bearer_auth(token);
        }

        let start = Instant::now();
        let response = request_builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let duration = start.elapsed();

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status,
            elapsed_ms = duration.as_millis() as u64,
            "request completed"
        );

        Ok(ApiResponse {
            status,
            body,
            duration,
        })
    }
}

/// Join the base URL and a request path into a full URL
pub(crate) fn build_url(base_url: &str, path: &str) -> Result<String, ClientError> {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    let full_path = format!("{}{}", base_url.trim_end_matches('/'), path);

    let url = Url::parse(&full_path)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidUrl(format!(
            "unsupported scheme: {}",
            url.scheme()
        )));
    }

    Ok(url.to_string())
}
