//! Application-level configuration loading: participant page URL, completion
//! message, admin token and session idle timeout.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::services::qr::QrCodec;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCAVENGER_HUNT_CONFIG_PATH";
/// Environment variable that overrides the admin token from the file.
const ADMIN_TOKEN_ENV: &str = "SCAVENGER_HUNT_ADMIN_TOKEN";

const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000/";
const DEFAULT_COMPLETION_MESSAGE: &str = "Mission complete!";
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(4 * 60 * 60);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    public_base_url: String,
    completion_message: String,
    admin_token: Option<String>,
    session_ttl: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults,
    /// then apply environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        public_base_url = %app_config.public_base_url,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        match env::var(ADMIN_TOKEN_ENV) {
            Ok(token) => config.with_admin_token(token),
            Err(_) => config,
        }
    }

    /// Replace the admin token. Blank tokens disable the admin surface.
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = non_blank(token.into());
        self
    }

    /// Replace the participant page URL, keeping the current one when `url` is unusable.
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if QrCodec::new(&url).is_ok() {
            self.public_base_url = url;
        } else {
            warn!(%url, "ignoring invalid public base url");
        }
        self
    }

    /// Replace the text shown when a reached station has no clue of its own.
    pub fn with_completion_message(mut self, message: impl Into<String>) -> Self {
        if let Some(message) = non_blank(message.into()) {
            self.completion_message = message;
        }
        self
    }

    /// Replace how long a hunt session may stay untouched before it is dropped.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Participant page URL encoded into station QR codes.
    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub fn completion_message(&self) -> &str {
        &self.completion_message
    }

    /// Configured admin token; `None` rejects every admin request.
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            public_base_url: DEFAULT_PUBLIC_BASE_URL.into(),
            completion_message: DEFAULT_COMPLETION_MESSAGE.into(),
            admin_token: None,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    public_base_url: Option<String>,
    completion_message: Option<String>,
    admin_token: Option<String>,
    session_ttl_minutes: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let mut config = Self::default();
        if let Some(url) = value.public_base_url {
            config = config.with_public_base_url(url);
        }
        if let Some(message) = value.completion_message {
            config = config.with_completion_message(message);
        }
        if let Some(token) = value.admin_token {
            config = config.with_admin_token(token);
        }
        if let Some(minutes) = value.session_ttl_minutes {
            config = config.with_session_ttl(Duration::from_secs(minutes.saturating_mul(60)));
        }
        config
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
