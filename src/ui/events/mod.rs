//! Event handling
//!
//! Translates key presses into state-changing actions. Anything that needs
//! the network is returned as a [`Command`] so the app can hand it to a
//! background task.
//!
//! Precedence: an open notification swallows keys until dismissed, then an
//! open form or confirmation, then the active screen.

use crate::actions::AppAction;
use crate::request::apply;
use crate::state::{AppState, Focus, InputMode, Screen};
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// Work the app must start on behalf of the user
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { username: String, password: String },
    Reload,
    Logout,
    AddSession {
        activity: Option<String>,
        duration: String,
    },
    AddActivity { name: String },
    DeleteActivity { name: String },
}

impl Command {
    /// Name for logs; never includes the password
    pub fn label(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Reload => "reload",
            Command::Logout => "logout",
            Command::AddSession { .. } => "add session",
            Command::AddActivity { .. } => "add activity",
            Command::DeleteActivity { .. } => "delete activity",
        }
    }
}

/// Event handler for managing user input and state updates
#[derive(Debug, Default)]
pub struct EventHandler {
    pub should_quit: bool,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll the terminal once and handle at most one key
    pub fn handle_events(&mut self, state: &Arc<RwLock<AppState>>) -> Result<Option<Command>> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key, state));
                }
            }
        }
        Ok(None)
    }

    pub fn handle_key(&mut self, key: KeyEvent, state: &Arc<RwLock<AppState>>) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        let (screen, input_mode, has_notification) = {
            let s = state.read();
            (s.screen, s.input_mode.clone(), s.notification.is_some())
        };

        if has_notification {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                apply(state, AppAction::DismissNotification);
            }
            return None;
        }

        match (screen, input_mode) {
            (Screen::Login, _) => self.handle_login_key(key, state),
            (Screen::Dashboard, InputMode::ConfirmLogout) => handle_logout_confirmation(key, state),
            (Screen::Dashboard, InputMode::AddSession) => handle_session_form_key(key, state),
            (Screen::Dashboard, InputMode::AddActivity) => handle_activity_form_key(key, state),
            (Screen::Dashboard, InputMode::ConfirmDeleteActivity(name)) => {
                handle_delete_confirmation(key, state, name)
            }
            (Screen::Dashboard, InputMode::Normal) => self.handle_dashboard_key(key, state),
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent, state: &Arc<RwLock<AppState>>) -> Option<Command> {
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                apply(state, AppAction::SwitchLoginField);
                None
            }
            KeyCode::Backspace => {
                apply(state, AppAction::BackspaceLoginField);
                None
            }
            KeyCode::Char(ch) => {
                apply(state, AppAction::AppendToLoginField(ch));
                None
            }
            KeyCode::Enter => {
                let s = state.read();
                // One login in flight at a time
                if s.login.submitting {
                    return None;
                }
                Some(Command::Login {
                    username: s.login.username.clone(),
                    password: s.login.password.clone(),
                })
            }
            _ => None,
        }
    }

    fn handle_dashboard_key(
        &mut self,
        key: KeyEvent,
        state: &Arc<RwLock<AppState>>,
    ) -> Option<Command> {
        let (focus, saving) = {
            let s = state.read();
            (s.focus, s.saving)
        };

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Tab => {
                apply(state, AppAction::SwitchFocus);
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                apply(
                    state,
                    match focus {
                        Focus::Sessions => AppAction::SelectNextSession,
                        Focus::Activities => AppAction::SelectNextActivity,
                    },
                );
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                apply(
                    state,
                    match focus {
                        Focus::Sessions => AppAction::SelectPreviousSession,
                        Focus::Activities => AppAction::SelectPreviousActivity,
                    },
                );
                None
            }
            KeyCode::Char('r') | KeyCode::F(5) => Some(Command::Reload),
            // One create or delete in flight at a time
            KeyCode::Char('a') if !saving => {
                apply(state, AppAction::OpenSessionForm);
                None
            }
            KeyCode::Char('n') if !saving => {
                apply(state, AppAction::OpenActivityForm);
                None
            }
            KeyCode::Char('d') | KeyCode::Delete if !saving && focus == Focus::Activities => {
                apply(state, AppAction::EnterConfirmDeleteActivity);
                None
            }
            KeyCode::Char('L') => {
                apply(state, AppAction::EnterConfirmLogout);
                None
            }
            _ => None,
        }
    }
}

fn handle_logout_confirmation(key: KeyEvent, state: &Arc<RwLock<AppState>>) -> Option<Command> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(Command::Logout),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            apply(state, AppAction::ExitConfirmLogout);
            None
        }
        _ => None,
    }
}

fn handle_session_form_key(key: KeyEvent, state: &Arc<RwLock<AppState>>) -> Option<Command> {
    match key.code {
        KeyCode::Esc => {
            apply(state, AppAction::CloseForm);
            None
        }
        KeyCode::Tab | KeyCode::Right | KeyCode::Down => {
            apply(state, AppAction::CycleFormActivity { forward: true });
            None
        }
        KeyCode::BackTab | KeyCode::Left | KeyCode::Up => {
            apply(state, AppAction::CycleFormActivity { forward: false });
            None
        }
        KeyCode::Backspace => {
            apply(state, AppAction::BackspaceForm);
            None
        }
        KeyCode::Char(ch) => {
            apply(state, AppAction::AppendToForm(ch));
            None
        }
        KeyCode::Enter => {
            let s = state.read();
            if s.saving {
                return None;
            }
            Some(Command::AddSession {
                activity: s.form_activity_name().map(str::to_string),
                duration: s.session_form.duration.clone(),
            })
        }
        _ => None,
    }
}

fn handle_activity_form_key(key: KeyEvent, state: &Arc<RwLock<AppState>>) -> Option<Command> {
    match key.code {
        KeyCode::Esc => {
            apply(state, AppAction::CloseForm);
            None
        }
        KeyCode::Backspace => {
            apply(state, AppAction::BackspaceForm);
            None
        }
        KeyCode::Char(ch) => {
            apply(state, AppAction::AppendToForm(ch));
            None
        }
        KeyCode::Enter => {
            let s = state.read();
            if s.saving {
                return None;
            }
            Some(Command::AddActivity {
                name: s.activity_form.name.clone(),
            })
        }
        _ => None,
    }
}

fn handle_delete_confirmation(
    key: KeyEvent,
    state: &Arc<RwLock<AppState>>,
    name: String,
) -> Option<Command> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            apply(state, AppAction::CloseForm);
            Some(Command::DeleteActivity { name })
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            apply(state, AppAction::CloseForm);
            None
        }
        _ => None,
    }
}
