//! Background calls into the authenticated client
//!
//! Each function spawns a task, so the UI loop never waits on the network.
//! Results land in `AppState` through actions. Auth failures are left to the
//! client's `AuthEvent`s; everything else becomes a notification.

use crate::actions::{apply_action, AppAction};
use crate::forms::{self, ACTIVITIES_PATH, SESSIONS_PATH};
use crate::state::{AppState, Me, Notification, Screen, SessionEntry};
use chrono::Utc;
use parking_lot::RwLock;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use timetrack_tui::{AuthenticatedApiClient, ClientError};
use tracing::{debug, warn};

/// Apply a single action to shared state
pub fn apply(state: &Arc<RwLock<AppState>>, action: AppAction) {
    let mut s = state.write();
    apply_action(action, &mut s);
}

/// Turn a failed call into UI feedback.
///
/// Auth failures stay silent: the login screen is already on its way.
pub(crate) fn report_error(state: &Arc<RwLock<AppState>>, context: &str, err: &ClientError) {
    if err.is_auth_failure() {
        debug!(context, error = %err, "auth failure; waiting for redirect");
        return;
    }

    warn!(context, error = %err, "request failed");
    let notification = match err {
        ClientError::Validation(message) => Notification::warning(message.clone()),
        _ => Notification::error(err.user_message()),
    };
    apply(state, AppAction::Notify(notification));
}

pub fn login_background(
    state: Arc<RwLock<AppState>>,
    client: Arc<AuthenticatedApiClient>,
    username: String,
    password: String,
) {
    apply(&state, AppAction::SetSubmitting(true));

    tokio::spawn(async move {
        let result = client.login(&username, &password).await;
        apply(&state, AppAction::SetSubmitting(false));

        match result {
            // The LoggedIn event switches screens
            Ok(login) if login.logged_in => {
                apply(&state, AppAction::Notify(Notification::success("Logged in")));
            }
            Ok(_) => {
                apply(
                    &state,
                    AppAction::Notify(Notification::error("Login was not accepted")),
                );
            }
            // A rejected login is a form error, not an expired session
            Err(ClientError::Status { message, .. }) => {
                let message = message.unwrap_or_else(|| "Login failed".to_string());
                apply(&state, AppAction::Notify(Notification::error(message)));
            }
            Err(e) => report_error(&state, "login", &e),
        }
    });
}

/// Fetch user, sessions and activities side by side
pub fn load_dashboard_background(state: Arc<RwLock<AppState>>, client: Arc<AuthenticatedApiClient>) {
    apply(&state, AppAction::StartLoading);

    tokio::spawn(async move {
        let (me, sessions, activities) = tokio::join!(
            client.api_request_as::<Me>("/api/me", Method::GET, None),
            client.api_request_as::<Vec<SessionEntry>>(SESSIONS_PATH, Method::GET, None),
            client.api_request_as::<Vec<String>>(ACTIVITIES_PATH, Method::GET, None),
        );
        apply_dashboard(&state, me, sessions, activities);
    });
}

/// True while the dashboard is on screen. Results of calls that outlived
/// the session are dropped instead of landing behind the login form.
fn on_dashboard(state: &Arc<RwLock<AppState>>) -> bool {
    state.read().screen == Screen::Dashboard
}

pub(crate) fn apply_dashboard(
    state: &Arc<RwLock<AppState>>,
    me: Result<Me, ClientError>,
    sessions: Result<Vec<SessionEntry>, ClientError>,
    activities: Result<Vec<String>, ClientError>,
) {
    if !on_dashboard(state) {
        debug!("dashboard closed while loading; dropping results");
        return;
    }

    let mut first_error = None;

    match me {
        Ok(me) => apply(state, AppAction::SetUsername(me.username)),
        // The page still works without the name
        Err(e) => warn!(error = %e, "failed to get user info"),
    }

    match sessions {
        Ok(sessions) => apply(state, AppAction::SetSessions(sessions)),
        Err(e) => first_error = Some(("sessions", e)),
    }

    match activities {
        Ok(activities) => apply(state, AppAction::SetActivities(activities)),
        Err(e) => {
            if first_error.is_none() {
                first_error = Some(("activities", e));
            }
        }
    }

    match first_error {
        Some((context, e)) => {
            apply(state, AppAction::FailLoading(e.to_string()));
            report_error(state, context, &e);
        }
        None => apply(state, AppAction::FinishLoading),
    }
}

pub fn add_session_background(
    state: Arc<RwLock<AppState>>,
    client: Arc<AuthenticatedApiClient>,
    activity: Option<String>,
    duration: String,
) {
    let session = match forms::validate_session(activity.as_deref(), &duration) {
        Ok(session) => session,
        Err(e) => return report_error(&state, "add session", &e),
    };

    apply(&state, AppAction::SetSaving(true));
    tokio::spawn(async move {
        let body = session.to_body(Utc::now());
        let result = client
            .api_request(SESSIONS_PATH, Method::POST, Some(body))
            .await;
        if finish_save(&state, "add session", result, "Session saved") {
            load_dashboard_background(state, client);
        }
    });
}

pub fn add_activity_background(
    state: Arc<RwLock<AppState>>,
    client: Arc<AuthenticatedApiClient>,
    name: String,
) {
    let name = match forms::validate_activity_name(&name) {
        Ok(name) => name,
        Err(e) => return report_error(&state, "add activity", &e),
    };

    apply(&state, AppAction::SetSaving(true));
    tokio::spawn(async move {
        let result = client
            .api_request(ACTIVITIES_PATH, Method::POST, Some(json!({ "name": name })))
            .await;
        if finish_save(&state, "add activity", result, "Activity added") {
            load_dashboard_background(state, client);
        }
    });
}

pub fn delete_activity_background(
    state: Arc<RwLock<AppState>>,
    client: Arc<AuthenticatedApiClient>,
    name: String,
) {
    apply(&state, AppAction::SetSaving(true));
    tokio::spawn(async move {
        let result = client
            .api_request(&forms::activity_path(&name), Method::DELETE, None)
            .await;
        // Sessions may have used the activity, so the whole dashboard reloads
        if finish_save(&state, "delete activity", result, "Activity deleted") {
            load_dashboard_background(state, client);
        }
    });
}

/// Settle a create or delete call. Returns true when the dashboard should
/// reload.
pub(crate) fn finish_save(
    state: &Arc<RwLock<AppState>>,
    context: &str,
    result: Result<Value, ClientError>,
    fallback: &str,
) -> bool {
    apply(state, AppAction::SetSaving(false));
    if !on_dashboard(state) {
        debug!(context, "dashboard closed while saving; dropping result");
        return false;
    }

    match result {
        Ok(response) => {
            let message = response
                .get("message")
                .and_then(Value::as_str)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or(fallback);
            apply(state, AppAction::CompleteForm);
            apply(state, AppAction::Notify(Notification::success(message)));
            true
        }
        Err(e) => {
            // The form stays open so the input can be fixed
            report_error(state, context, &e);
            false
        }
    }
}

pub fn logout_background(state: Arc<RwLock<AppState>>, client: Arc<AuthenticatedApiClient>) {
    tokio::spawn(async move {
        // The LoggedOut event fires either way; a failed server call is only logged
        if let Err(e) = client.logout().await {
            debug!(error = %e, "logout finished with a server error");
        }
        apply(&state, AppAction::ExitConfirmLogout);
    });
}
