//! Scripted in-memory transport for unit tests

use crate::cookies::SessionCookies;
use crate::error::ClientError;
use crate::transport::Transport;
use crate::types::{ApiRequest, ApiResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Respond {
        status: u16,
        body: String,
        /// `Set-Cookie` headers applied to the shared jar
        set_cookies: Vec<String>,
    },
    NetworkError,
    /// Never answers
    Hang,
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub(crate) fn status(status: u16, body: &str) -> Self {
        Reply::Respond {
            status,
            body: body.to_string(),
            set_cookies: Vec::new(),
        }
    }

    pub(crate) fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn with_cookie(mut self, header: &str) -> Self {
        if let Reply::Respond { set_cookies, .. } = &mut self {
            set_cookies.push(header.to_string());
        }
        self
    }

    pub(crate) fn after(self, delay: Duration) -> Self {
        Reply::Delayed(delay, Box::new(self))
    }
}

/// Replays queued replies per path and records every request it sees.
/// Unscripted paths answer 404.
pub(crate) struct ScriptedTransport {
    cookies: Arc<SessionCookies>,
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(cookies: Arc<SessionCookies>) -> Self {
        Self {
            cookies,
            replies: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, path: &str, reply: Reply) {
        self.replies
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.path.clone()).collect()
    }

    pub(crate) fn count(&self, path: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.path == path).count()
    }

    async fn play(&self, reply: Reply) -> Result<ApiResponse, ClientError> {
        let mut reply = reply;
        loop {
            match reply {
                Reply::Respond {
                    status,
                    body,
                    set_cookies,
                } => {
                    for header in &set_cookies {
                        self.cookies.apply_set_cookie(header);
                    }
                    return Ok(ApiResponse::new(status, body));
                }
                Reply::NetworkError => {
                    return Err(ClientError::Network("connection refused".to_string()))
                }
                Reply::Hang => std::future::pending::<()>().await,
                Reply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        self.requests.lock().push(request.clone());
        let reply = self
            .replies
            .lock()
            .get_mut(&request.path)
            .and_then(|queue| queue.pop_front());

        match reply {
            Some(reply) => self.play(reply).await,
            None => Ok(ApiResponse::new(404, r#"{"msg": "not scripted"}"#)),
        }
    }
}
