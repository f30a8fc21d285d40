use crate::actions::AppAction;
use crate::request::{self, apply};
use crate::state::AppState;
use crate::ui::{self, draw, Command};
use crate::utils::mask_token;
use color_eyre::Result;
use parking_lot::RwLock;
use ratatui::DefaultTerminal;
use std::sync::Arc;
use std::time::Instant;
use timetrack_tui::config::{validate_url, Config};
use timetrack_tui::{
    AuthEvent, AuthenticatedApiClient, FileTokenStore, HttpTransport, SessionCookies,
};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info};

#[derive(Debug)]
pub struct App {
    state: Arc<RwLock<AppState>>,
    client: Arc<AuthenticatedApiClient>,
    auth_events: broadcast::Receiver<AuthEvent>,
    base_url: String,
    spinner_index: usize,
    last_tick: Instant,
    event_handler: ui::EventHandler,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.base_url().to_string();
        validate_url(&base_url).map_err(|e| color_eyre::eyre::eyre!("{e}: {base_url}"))?;

        let cookies = Arc::new(SessionCookies::new());
        let transport =
            HttpTransport::new(&base_url, Arc::clone(&cookies), config.request_timeout())?;
        let tokens = FileTokenStore::new(Config::token_path()?);

        let client = Arc::new(AuthenticatedApiClient::new(
            Arc::new(transport),
            cookies,
            Arc::new(tokens),
            config.client_options(),
        ));
        let auth_events = client.subscribe();

        Ok(Self {
            state: Arc::new(RwLock::new(AppState::default())),
            client,
            auth_events,
            base_url,
            spinner_index: 0,
            last_tick: Instant::now(),
            event_handler: ui::EventHandler::new(),
        })
    }

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let refresh = self.client.start_background_refresh();

        // Resume an existing session; otherwise SessionExpired keeps us on the login screen
        if self.client.ensure_session().is_ok() {
            apply(&self.state, AppAction::ShowDashboard);
            self.reload();
        }

        // Main UI loop
        while !self.event_handler.should_quit {
            // Update spinner animation
            if self.last_tick.elapsed().as_millis() > 100 {
                self.spinner_index = self.spinner_index.wrapping_add(1);
                self.last_tick = Instant::now();
            }

            self.process_auth_events();
            self.sync_session();

            {
                let state = self.state.read();
                terminal.draw(|frame| draw::render(frame, &state, &self.base_url, self.spinner_index))?;
            }

            if let Some(command) = self.event_handler.handle_events(&self.state)? {
                self.dispatch(command);
            }
        }

        refresh.stop();
        info!("shutting down");
        Ok(())
    }

    fn dispatch(&self, command: Command) {
        debug!(command = command.label(), "dispatching");
        match command {
            Command::Login { username, password } => request::login_background(
                Arc::clone(&self.state),
                Arc::clone(&self.client),
                username,
                password,
            ),
            Command::Reload => self.reload(),
            Command::Logout => {
                request::logout_background(Arc::clone(&self.state), Arc::clone(&self.client))
            }
            Command::AddSession { activity, duration } => request::add_session_background(
                Arc::clone(&self.state),
                Arc::clone(&self.client),
                activity,
                duration,
            ),
            Command::AddActivity { name } => request::add_activity_background(
                Arc::clone(&self.state),
                Arc::clone(&self.client),
                name,
            ),
            Command::DeleteActivity { name } => request::delete_activity_background(
                Arc::clone(&self.state),
                Arc::clone(&self.client),
                name,
            ),
        }
    }

    fn reload(&self) {
        request::load_dashboard_background(Arc::clone(&self.state), Arc::clone(&self.client));
    }

    /// React to session changes announced by the client
    fn process_auth_events(&mut self) {
        loop {
            let event = match self.auth_events.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "auth events lagged");
                    continue;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return,
            };

            info!(?event, destination = event.destination(), "navigating");
            match event {
                AuthEvent::LoggedIn => {
                    apply(&self.state, AppAction::ShowDashboard);
                    self.reload();
                }
                AuthEvent::SessionExpired | AuthEvent::LoggedOut => {
                    apply(&self.state, AppAction::ShowLogin);
                }
            }
        }
    }

    fn sync_session(&self) {
        let token_hint = self.client.current_token().map(|token| mask_token(&token));
        apply(
            &self.state,
            AppAction::SyncSession {
                state: self.client.session_state(),
                token_hint,
            },
        );
    }
}
