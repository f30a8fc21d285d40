use crate::client::ClientOptions;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "timetrack-tui";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_LOG_FILE: &str = "/tmp/timetrack-tui.log";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Backend base URL; requests and the login page live under it
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub refresh_interval_secs: u64,
    pub refresh_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub bearer_header: bool,
    pub login_path: String,
    pub refresh_path: String,
    pub logout_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let options = ClientOptions::default();
        Self {
            refresh_interval_secs: options.refresh_interval.as_secs(),
            refresh_timeout_secs: options.refresh_timeout.as_secs(),
            request_timeout_secs: 30,
            bearer_header: options.bearer_header,
            login_path: options.login_path,
            refresh_path: options.refresh_path,
            logout_path: options.logout_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: PathBuf,
    /// Default filter; `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Application directory, `~/.config/timetrack-tui`
    pub fn app_dir() -> Result<PathBuf> {
        // Use ~/.config instead of platform-specific directory
        let home_dir = dirs::home_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not find home directory"))?;

        let app_dir = home_dir.join(".config").join(APP_NAME);

        // Create directory if it doesn't exist
        if !app_dir.exists() {
            fs::create_dir_all(&app_dir)?;
        }

        Ok(app_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("config.toml"))
    }

    /// Where the local token cache lives
    pub fn token_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("session.toml"))
    }

    /// Load config from file, or return default if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        self.server.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.session.request_timeout_secs.max(1))
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            refresh_interval: Duration::from_secs(self.session.refresh_interval_secs),
            refresh_timeout: Duration::from_secs(self.session.refresh_timeout_secs.max(1)),
            bearer_header: self.session.bearer_header,
            login_path: self.session.login_path.clone(),
            refresh_path: self.session.refresh_path.clone(),
            logout_path: self.session.logout_path.clone(),
        }
    }
}

/// Simple URL validation
pub fn validate_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("URL must start with http:// or https://".to_string());
    }

    url::Url::parse(url).map_err(|e| format!("Invalid URL format: {e}"))?;

    Ok(())
}
