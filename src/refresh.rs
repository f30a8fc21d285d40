//! Periodic token refresh
//!
//! One task per client: a refresh right away, then one per interval, each
//! only while a liveness marker is present. Failures here are logged and
//! otherwise ignored; the next 401 on a real request takes care of an expired
//! session.

use crate::client::AuthenticatedApiClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(45 * 60);

/// Shortest period accepted; tokio rejects a zero interval
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTick {
    /// Not logged in, nothing was sent
    Skipped,
    Refreshed,
    Failed,
}

/// One scheduled refresh attempt
pub async fn run_refresh_tick(client: &AuthenticatedApiClient, reason: &str) -> RefreshTick {
    if client.session_ended() || !client.is_logged_in() {
        debug!(reason, "not logged in; skipping token refresh");
        return RefreshTick::Skipped;
    }

    match client.refresh_in_background().await {
        Ok(()) => {
            info!(reason, "token refresh completed");
            RefreshTick::Refreshed
        }
        Err(e) => {
            warn!(reason, error = %e, "token refresh failed");
            RefreshTick::Failed
        }
    }
}

/// Handle to the background refresh task; the task stops when this drops
#[derive(Debug)]
pub struct RefreshScheduler {
    handle: JoinHandle<()>,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn spawn(client: Arc<AuthenticatedApiClient>, interval: Duration) -> Self {
        let interval = interval.max(MIN_REFRESH_INTERVAL);

        let handle = tokio::spawn(async move {
            run_refresh_tick(&client, "initial").await;

            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                run_refresh_tick(&client, "scheduled").await;
            }
        });

        debug!(interval_secs = interval.as_secs(), "background token refresh started");
        Self { handle, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientOptions;
    use crate::cookies::{SessionCookies, USER_SESSION_COOKIE};
    use crate::events::AuthEvent;
    use crate::testing::{Reply, ScriptedTransport};
    use crate::token::MemoryTokenStore;

    const REFRESH: &str = "/api/refresh";

    fn setup(
        logged_in: bool,
    ) -> (
        Arc<AuthenticatedApiClient>,
        Arc<ScriptedTransport>,
        Arc<SessionCookies>,
    ) {
        let cookies = Arc::new(SessionCookies::new());
        if logged_in {
            cookies.set(USER_SESSION_COOKIE, "active");
        }
        let transport = Arc::new(ScriptedTransport::new(Arc::clone(&cookies)));
        let client = Arc::new(AuthenticatedApiClient::new(
            transport.clone(),
            Arc::clone(&cookies),
            Arc::new(MemoryTokenStore::new()),
            ClientOptions::default(),
        ));
        (client, transport, cookies)
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_tick_skips_when_logged_out() {
        let (client, transport, _) = setup(false);
        assert_eq!(run_refresh_tick(&client, "test").await, RefreshTick::Skipped);
        assert_eq!(transport.count(REFRESH), 0);
    }

    #[tokio::test]
    async fn test_tick_refreshes_when_logged_in() {
        let (client, transport, _) = setup(true);
        transport.push(REFRESH, Reply::ok("{}"));
        assert_eq!(run_refresh_tick(&client, "test").await, RefreshTick::Refreshed);
        assert_eq!(transport.count(REFRESH), 1);
    }

    #[tokio::test]
    async fn test_tick_failure_does_not_redirect() {
        let (client, transport, _) = setup(true);
        let mut events = client.subscribe();
        transport.push(REFRESH, Reply::status(401, ""));

        assert_eq!(run_refresh_tick(&client, "test").await, RefreshTick::Failed);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_fires_at_start_and_every_interval() {
        let (client, transport, _) = setup(true);
        for _ in 0..3 {
            transport.push(REFRESH, Reply::ok("{}"));
        }

        let scheduler = client.start_background_refresh();
        assert_eq!(scheduler.interval(), DEFAULT_REFRESH_INTERVAL);
        settle().await;
        assert_eq!(transport.count(REFRESH), 1);

        tokio::time::advance(DEFAULT_REFRESH_INTERVAL).await;
        settle().await;
        assert_eq!(transport.count(REFRESH), 2);

        tokio::time::advance(Duration::from_secs(44 * 60)).await;
        settle().await;
        assert_eq!(transport.count(REFRESH), 2);

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(transport.count(REFRESH), 3);

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_silent_while_logged_out() {
        let (client, transport, cookies) = setup(false);
        transport.push(REFRESH, Reply::ok("{}"));

        let _scheduler = RefreshScheduler::spawn(Arc::clone(&client), Duration::from_secs(60));
        settle().await;
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(transport.count(REFRESH), 0);

        cookies.set(USER_SESSION_COOKIE, "active");
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(transport.count(REFRESH), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_survives_failures() {
        let (client, transport, _) = setup(true);
        let mut events = client.subscribe();
        transport.push(REFRESH, Reply::NetworkError);
        transport.push(REFRESH, Reply::ok("{}"));

        let scheduler = RefreshScheduler::spawn(Arc::clone(&client), Duration::from_secs(60));
        settle().await;
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;

        assert_eq!(transport.count(REFRESH), 2);
        assert!(scheduler.is_running());
        assert!(!matches!(events.try_recv(), Ok(AuthEvent::SessionExpired)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_scheduler_stops_it() {
        let (client, transport, _) = setup(true);
        transport.push(REFRESH, Reply::ok("{}"));
        transport.push(REFRESH, Reply::ok("{}"));

        let scheduler = RefreshScheduler::spawn(Arc::clone(&client), Duration::from_secs(60));
        settle().await;
        drop(scheduler);

        tokio::time::advance(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(transport.count(REFRESH), 1);
    }
}
