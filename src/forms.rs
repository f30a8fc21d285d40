//! Client-side checks for the dashboard forms
//!
//! Everything here runs before a request is built. A rejected form comes back
//! as `ClientError::Validation` and is shown as a warning, never sent.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use timetrack_tui::ClientError;
use url::form_urlencoded;

pub const SESSIONS_PATH: &str = "/api/sessions";
pub const ACTIVITIES_PATH: &str = "/api/activities";

/// A session that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub activity: String,
    /// Minutes
    pub duration: i64,
}

impl NewSession {
    /// `POST /api/sessions` body, stamped with `now`
    pub fn to_body(&self, now: DateTime<Utc>) -> Value {
        json!({
            "activity": self.activity,
            "duration": self.duration,
            "date": now.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

pub fn validate_session(activity: Option<&str>, duration: &str) -> Result<NewSession, ClientError> {
    let activity = match activity {
        Some(activity) if !activity.is_empty() => activity.to_string(),
        _ => {
            return Err(ClientError::Validation(
                "Please select an activity".to_string(),
            ))
        }
    };

    match duration.trim().parse::<i64>() {
        Ok(duration) if duration > 0 => Ok(NewSession { activity, duration }),
        _ => Err(ClientError::Validation(
            "Please enter a valid duration".to_string(),
        )),
    }
}

/// Trimmed activity name, or a validation error when nothing is left
pub fn validate_activity_name(name: &str) -> Result<String, ClientError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClientError::Validation(
            "Please enter an activity name".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// `DELETE` target for one activity; the name is a single path segment
pub fn activity_path(name: &str) -> String {
    let segment: String = form_urlencoded::byte_serialize(name.as_bytes()).collect();
    // byte_serialize writes spaces as '+', which a path keeps literally
    format!("{ACTIVITIES_PATH}/{}", segment.replace('+', "%20"))
}
