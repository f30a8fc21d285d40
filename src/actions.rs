use crate::state::{
    ActivityForm, AppState, Focus, InputMode, LoadingState, LoginField, LoginForm, Notification,
    Screen, SessionEntry, SessionForm,
};
use timetrack_tui::SessionState;

/// Represents all possible state-changing actions in the application
/// This pattern separates input handling and background tasks from state
/// mutations, so screen transitions can be tested without a terminal
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    // Login form
    AppendToLoginField(char),
    BackspaceLoginField,
    SwitchLoginField,
    SetSubmitting(bool),

    // Screen transitions
    ShowDashboard,
    ShowLogin,

    // Dashboard data
    StartLoading,
    SetUsername(String),
    SetSessions(Vec<SessionEntry>),
    SetActivities(Vec<String>),
    FinishLoading,
    FailLoading(String),

    // Navigation
    SelectNextSession,
    SelectPreviousSession,
    SelectNextActivity,
    SelectPreviousActivity,
    SwitchFocus,

    // Entry forms
    OpenSessionForm,
    OpenActivityForm,
    CycleFormActivity { forward: bool },
    AppendToForm(char),
    BackspaceForm,
    CloseForm,
    /// The server accepted the form; reset it and close
    CompleteForm,
    EnterConfirmDeleteActivity,
    SetSaving(bool),

    // Modals
    EnterConfirmLogout,
    ExitConfirmLogout,
    Notify(Notification),
    DismissNotification,

    // Session mirror
    SyncSession {
        state: SessionState,
        token_hint: Option<String>,
    },
}

/// Apply an action to the application state
pub fn apply_action(action: AppAction, state: &mut AppState) {
    match action {
        AppAction::AppendToLoginField(ch) => match state.login.active_field {
            LoginField::Username => state.login.username.push(ch),
            LoginField::Password => state.login.password.push(ch),
        },
        AppAction::BackspaceLoginField => {
            match state.login.active_field {
                LoginField::Username => state.login.username.pop(),
                LoginField::Password => state.login.password.pop(),
            };
        }
        AppAction::SwitchLoginField => {
            state.login.active_field = match state.login.active_field {
                LoginField::Username => LoginField::Password,
                LoginField::Password => LoginField::Username,
            };
        }
        AppAction::SetSubmitting(submitting) => state.login.submitting = submitting,

        AppAction::ShowDashboard => {
            state.screen = Screen::Dashboard;
            state.input_mode = InputMode::Normal;
            // Never keep the password around once it has been used
            state.login = LoginForm {
                username: state.login.username.clone(),
                ..LoginForm::default()
            };
        }
        AppAction::ShowLogin => {
            state.screen = Screen::Login;
            state.input_mode = InputMode::Normal;
            state.login.password.clear();
            state.login.submitting = false;
            state.login.active_field = LoginField::Username;
            state.username = None;
            state.sessions.clear();
            state.activities.clear();
            state.selected_session = 0;
            state.selected_activity = 0;
            state.focus = Focus::Sessions;
            state.session_form = SessionForm::default();
            state.activity_form = ActivityForm::default();
            state.saving = false;
            state.loading_state = LoadingState::Idle;
        }

        AppAction::StartLoading => state.loading_state = LoadingState::Loading,
        AppAction::SetUsername(username) => state.username = Some(username),
        AppAction::SetSessions(sessions) => {
            state.sessions = sessions;
            if state.selected_session >= state.sessions.len() {
                state.selected_session = state.sessions.len().saturating_sub(1);
            }
        }
        AppAction::SetActivities(activities) => {
            state.activities = activities;
            if state.selected_activity >= state.activities.len() {
                state.selected_activity = state.activities.len().saturating_sub(1);
            }
            if state
                .session_form
                .activity
                .is_some_and(|index| index >= state.activities.len())
            {
                state.session_form.activity = None;
            }
        }
        AppAction::FinishLoading => {
            if state.loading_state == LoadingState::Loading {
                state.loading_state = LoadingState::Complete;
            }
        }
        AppAction::FailLoading(message) => state.loading_state = LoadingState::Error(message),

        AppAction::SelectNextSession => {
            if state.selected_session + 1 < state.sessions.len() {
                state.selected_session += 1;
            }
        }
        AppAction::SelectPreviousSession => {
            state.selected_session = state.selected_session.saturating_sub(1);
        }
        AppAction::SelectNextActivity => {
            if state.selected_activity + 1 < state.activities.len() {
                state.selected_activity += 1;
            }
        }
        AppAction::SelectPreviousActivity => {
            state.selected_activity = state.selected_activity.saturating_sub(1);
        }
        AppAction::SwitchFocus => {
            state.focus = match state.focus {
                Focus::Sessions => Focus::Activities,
                Focus::Activities => Focus::Sessions,
            };
        }

        AppAction::OpenSessionForm => state.input_mode = InputMode::AddSession,
        AppAction::OpenActivityForm => state.input_mode = InputMode::AddActivity,
        AppAction::CycleFormActivity { forward } => {
            let count = state.activities.len();
            if count == 0 {
                state.session_form.activity = None;
                return;
            }
            state.session_form.activity = Some(match (state.session_form.activity, forward) {
                (None, true) => 0,
                (None, false) => count - 1,
                (Some(index), true) => (index + 1) % count,
                (Some(index), false) => (index + count - 1) % count,
            });
        }
        AppAction::AppendToForm(ch) => match state.input_mode {
            InputMode::AddSession => state.session_form.duration.push(ch),
            InputMode::AddActivity => state.activity_form.name.push(ch),
            _ => {}
        },
        AppAction::BackspaceForm => {
            match state.input_mode {
                InputMode::AddSession => state.session_form.duration.pop(),
                InputMode::AddActivity => state.activity_form.name.pop(),
                _ => None,
            };
        }
        AppAction::CloseForm => state.input_mode = InputMode::Normal,
        AppAction::CompleteForm => {
            match state.input_mode {
                InputMode::AddSession => state.session_form = SessionForm::default(),
                InputMode::AddActivity => state.activity_form = ActivityForm::default(),
                _ => {}
            }
            state.input_mode = InputMode::Normal;
        }
        AppAction::EnterConfirmDeleteActivity => {
            if let Some(name) = state.selected_activity_name().map(str::to_string) {
                state.input_mode = InputMode::ConfirmDeleteActivity(name);
            }
        }
        AppAction::SetSaving(saving) => state.saving = saving,

        AppAction::EnterConfirmLogout => state.input_mode = InputMode::ConfirmLogout,
        AppAction::ExitConfirmLogout => state.input_mode = InputMode::Normal,
        AppAction::Notify(notification) => state.notification = Some(notification),
        AppAction::DismissNotification => state.notification = None,

        AppAction::SyncSession {
            state: session_state,
            token_hint,
        } => {
            state.session_state = session_state;
            state.token_hint = token_hint;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NotificationKind;

    fn entry(activity: &str, duration: i64) -> SessionEntry {
        SessionEntry {
            id: None,
            activity: activity.to_string(),
            duration,
            date: "2024-03-01T10:00:00".to_string(),
        }
    }

    #[test]
    fn test_typing_into_login_fields() {
        let mut state = AppState::default();
        for ch in "alice".chars() {
            apply_action(AppAction::AppendToLoginField(ch), &mut state);
        }
        apply_action(AppAction::SwitchLoginField, &mut state);
        apply_action(AppAction::AppendToLoginField('x'), &mut state);
        apply_action(AppAction::AppendToLoginField('y'), &mut state);
        apply_action(AppAction::BackspaceLoginField, &mut state);

        assert_eq!(state.login.username, "alice");
        assert_eq!(state.login.password, "x");
        assert_eq!(state.login.active_field, LoginField::Password);

        apply_action(AppAction::SwitchLoginField, &mut state);
        assert_eq!(state.login.active_field, LoginField::Username);
    }

    #[test]
    fn test_backspace_on_empty_field() {
        let mut state = AppState::default();
        apply_action(AppAction::BackspaceLoginField, &mut state);
        assert!(state.login.username.is_empty());
    }

    #[test]
    fn test_show_dashboard_drops_password() {
        let mut state = AppState::default();
        state.login.username = "alice".to_string();
        state.login.password = "x".to_string();
        state.login.submitting = true;

        apply_action(AppAction::ShowDashboard, &mut state);

        assert_eq!(state.screen, Screen::Dashboard);
        assert_eq!(state.login.username, "alice");
        assert!(state.login.password.is_empty());
        assert!(!state.login.submitting);
    }

    #[test]
    fn test_show_login_clears_dashboard() {
        let mut state = AppState::default();
        state.screen = Screen::Dashboard;
        state.input_mode = InputMode::ConfirmLogout;
        state.username = Some("alice".to_string());
        state.sessions = vec![entry("Rust", 45)];
        state.activities = vec!["Rust".to_string()];
        state.selected_session = 0;

        apply_action(AppAction::ShowLogin, &mut state);

        assert_eq!(state.screen, Screen::Login);
        assert_eq!(state.input_mode, InputMode::Normal);
        assert!(state.username.is_none());
        assert!(state.sessions.is_empty());
        assert!(state.activities.is_empty());
        assert_eq!(state.loading_state, LoadingState::Idle);
    }

    #[test]
    fn test_session_selection_bounds() {
        let mut state = AppState::default();
        apply_action(AppAction::SelectNextSession, &mut state);
        assert_eq!(state.selected_session, 0);

        apply_action(
            AppAction::SetSessions(vec![entry("Rust", 45), entry("Reading", 30)]),
            &mut state,
        );
        apply_action(AppAction::SelectNextSession, &mut state);
        apply_action(AppAction::SelectNextSession, &mut state);
        assert_eq!(state.selected_session, 1);

        apply_action(AppAction::SelectPreviousSession, &mut state);
        apply_action(AppAction::SelectPreviousSession, &mut state);
        assert_eq!(state.selected_session, 0);
    }

    #[test]
    fn test_shrinking_session_list_clamps_selection() {
        let mut state = AppState::default();
        state.sessions = vec![entry("a", 1), entry("b", 2), entry("c", 3)];
        state.selected_session = 2;

        apply_action(AppAction::SetSessions(vec![entry("a", 1)]), &mut state);
        assert_eq!(state.selected_session, 0);
    }

    #[test]
    fn test_loading_lifecycle() {
        let mut state = AppState::default();
        apply_action(AppAction::StartLoading, &mut state);
        assert_eq!(state.loading_state, LoadingState::Loading);
        apply_action(AppAction::FinishLoading, &mut state);
        assert_eq!(state.loading_state, LoadingState::Complete);

        apply_action(AppAction::StartLoading, &mut state);
        apply_action(AppAction::FailLoading("offline".to_string()), &mut state);
        // A failure is not overwritten by the trailing finish
        apply_action(AppAction::FinishLoading, &mut state);
        assert_eq!(state.loading_state, LoadingState::Error("offline".to_string()));
    }

    #[test]
    fn test_notification_roundtrip() {
        let mut state = AppState::default();
        apply_action(
            AppAction::Notify(Notification::error("Données manquantes")),
            &mut state,
        );
        let shown = state.notification.clone().unwrap();
        assert_eq!(shown.kind, NotificationKind::Error);
        assert_eq!(shown.message, "Données manquantes");

        apply_action(AppAction::DismissNotification, &mut state);
        assert!(state.notification.is_none());
    }

    #[test]
    fn test_confirm_logout_mode() {
        let mut state = AppState::default();
        apply_action(AppAction::EnterConfirmLogout, &mut state);
        assert_eq!(state.input_mode, InputMode::ConfirmLogout);
        apply_action(AppAction::ExitConfirmLogout, &mut state);
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_session_form_editing() {
        let mut state = AppState::default();
        state.activities = vec!["Rust".to_string(), "Reading".to_string()];

        apply_action(AppAction::OpenSessionForm, &mut state);
        assert_eq!(state.input_mode, InputMode::AddSession);
        assert_eq!(state.form_activity_name(), None);

        apply_action(AppAction::CycleFormActivity { forward: false }, &mut state);
        assert_eq!(state.form_activity_name(), Some("Reading"));
        apply_action(AppAction::CycleFormActivity { forward: true }, &mut state);
        assert_eq!(state.form_activity_name(), Some("Rust"));

        for ch in "450".chars() {
            apply_action(AppAction::AppendToForm(ch), &mut state);
        }
        apply_action(AppAction::BackspaceForm, &mut state);
        assert_eq!(state.session_form.duration, "45");
        // Typing only reaches the open form
        assert!(state.activity_form.name.is_empty());

        // Closing keeps the draft, completing clears it
        apply_action(AppAction::CloseForm, &mut state);
        assert_eq!(state.input_mode, InputMode::Normal);
        assert_eq!(state.session_form.duration, "45");

        apply_action(AppAction::OpenSessionForm, &mut state);
        apply_action(AppAction::CompleteForm, &mut state);
        assert_eq!(state.input_mode, InputMode::Normal);
        assert_eq!(state.session_form, SessionForm::default());
    }

    #[test]
    fn test_cycle_without_activities() {
        let mut state = AppState::default();
        apply_action(AppAction::CycleFormActivity { forward: true }, &mut state);
        assert_eq!(state.session_form.activity, None);
    }

    #[test]
    fn test_shrinking_activity_list_drops_stale_picks() {
        let mut state = AppState::default();
        state.activities = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        state.selected_activity = 2;
        state.session_form.activity = Some(2);

        apply_action(AppAction::SetActivities(vec!["a".to_string()]), &mut state);
        assert_eq!(state.selected_activity, 0);
        assert_eq!(state.session_form.activity, None);
    }

    #[test]
    fn test_confirm_delete_uses_selected_activity() {
        let mut state = AppState::default();
        apply_action(AppAction::EnterConfirmDeleteActivity, &mut state);
        assert_eq!(state.input_mode, InputMode::Normal);

        state.activities = vec!["Rust".to_string(), "Reading".to_string()];
        apply_action(AppAction::SwitchFocus, &mut state);
        assert_eq!(state.focus, Focus::Activities);
        apply_action(AppAction::SelectNextActivity, &mut state);
        apply_action(AppAction::SelectNextActivity, &mut state);
        apply_action(AppAction::EnterConfirmDeleteActivity, &mut state);
        assert_eq!(
            state.input_mode,
            InputMode::ConfirmDeleteActivity("Reading".to_string())
        );
    }

    #[test]
    fn test_show_login_resets_forms() {
        let mut state = AppState::default();
        state.screen = Screen::Dashboard;
        state.input_mode = InputMode::AddActivity;
        state.activity_form.name = "Piano".to_string();
        state.focus = Focus::Activities;
        state.saving = true;

        apply_action(AppAction::ShowLogin, &mut state);

        assert_eq!(state.activity_form, ActivityForm::default());
        assert_eq!(state.focus, Focus::Sessions);
        assert!(!state.saving);
    }

    #[test]
    fn test_sync_session() {
        let mut state = AppState::default();
        apply_action(
            AppAction::SyncSession {
                state: SessionState::Refreshing,
                token_hint: Some("eyJhbGc...abcdef".to_string()),
            },
            &mut state,
        );
        assert_eq!(state.session_state, SessionState::Refreshing);
        assert_eq!(state.token_hint.as_deref(), Some("eyJhbGc...abcdef"));
    }
}
