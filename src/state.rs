use serde::Deserialize;
use timetrack_tui::SessionState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Login,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    ConfirmLogout,
    AddSession,
    AddActivity,
    /// Waiting for y/n on deleting the named activity
    ConfirmDeleteActivity(String),
}

/// Dashboard panel that receives j/k
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Sessions,
    Activities,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadingState {
    Idle,
    Loading,
    Complete,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

/// Dismissible message shown on top of the current screen
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
            kind: NotificationKind::Error,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            title: "Attention".to_string(),
            message: message.into(),
            kind: NotificationKind::Warning,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            title: "Success".to_string(),
            message: message.into(),
            kind: NotificationKind::Success,
        }
    }
}

/// One row of `GET /api/sessions`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub activity: String,
    /// Minutes
    pub duration: i64,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Me {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub active_field: LoginField,
    /// A login call is in flight
    pub submitting: bool,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            active_field: LoginField::Username,
            submitting: false,
        }
    }
}

/// New session form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionForm {
    /// Index into `AppState::activities`; nothing is picked up front
    pub activity: Option<usize>,
    pub duration: String,
}

/// New activity form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityForm {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub input_mode: InputMode,
    pub login: LoginForm,
    pub username: Option<String>,
    pub sessions: Vec<SessionEntry>,
    pub activities: Vec<String>,
    pub loading_state: LoadingState,
    pub notification: Option<Notification>,
    pub selected_session: usize,
    pub selected_activity: usize,
    pub focus: Focus,
    pub session_form: SessionForm,
    pub activity_form: ActivityForm,
    /// A create or delete call is in flight
    pub saving: bool,
    /// Mirrors the client's session state for the header
    pub session_state: SessionState,
    pub token_hint: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            screen: Screen::Login,
            input_mode: InputMode::Normal,
            login: LoginForm::default(),
            username: None,
            sessions: Vec::new(),
            activities: Vec::new(),
            loading_state: LoadingState::Idle,
            notification: None,
            selected_session: 0,
            selected_activity: 0,
            focus: Focus::Sessions,
            session_form: SessionForm::default(),
            activity_form: ActivityForm::default(),
            saving: false,
            session_state: SessionState::Unauthenticated,
            token_hint: None,
        }
    }
}

/// Total minutes across the loaded sessions
pub fn total_minutes(state: &AppState) -> i64 {
    state.sessions.iter().map(|s| s.duration).sum()
}

impl AppState {
    pub fn selected_activity_name(&self) -> Option<&str> {
        self.activities
            .get(self.selected_activity)
            .map(String::as_str)
    }

    /// Activity picked in the session form
    pub fn form_activity_name(&self) -> Option<&str> {
        self.session_form
            .activity
            .and_then(|index| self.activities.get(index))
            .map(String::as_str)
    }
}
