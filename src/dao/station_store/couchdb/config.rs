use reqwest::Url;

use super::error::{CouchDaoError, CouchResult};

const DEFAULT_DATABASE: &str = "scavenger_hunt";

/// Basic-auth pair sent with every CouchDB request.
#[derive(Clone)]
pub struct CouchCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CouchCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouchCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Where the station documents live.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    pub base_url: Url,
    pub database: String,
    pub credentials: Option<CouchCredentials>,
}

impl CouchConfig {
    /// Parse `base_url` and target `database`, or `scavenger_hunt` when none is given.
    pub fn new(base_url: &str, database: Option<&str>) -> CouchResult<Self> {
        let invalid = || CouchDaoError::InvalidBaseUrl {
            url: base_url.to_owned(),
        };
        let parsed = Url::parse(base_url.trim_end_matches('/')).map_err(|_| invalid())?;
        if parsed.cannot_be_a_base() {
            return Err(invalid());
        }

        let database = database
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DATABASE)
            .to_owned();

        Ok(Self {
            base_url: parsed,
            database,
            credentials: None,
        })
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(CouchCredentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Read `COUCH_BASE_URL` (required), `COUCH_DB`, `COUCH_USERNAME` and `COUCH_PASSWORD`.
    pub fn from_env() -> CouchResult<Self> {
        let base_url =
            std::env::var("COUCH_BASE_URL").map_err(|_| CouchDaoError::MissingEnvVar {
                var: "COUCH_BASE_URL",
            })?;
        let database = std::env::var("COUCH_DB").ok();
        let config = Self::new(&base_url, database.as_deref())?;

        Ok(
            match (
                std::env::var("COUCH_USERNAME").ok(),
                std::env::var("COUCH_PASSWORD").ok(),
            ) {
                (Some(username), Some(password)) => config.with_credentials(username, password),
                _ => config,
            },
        )
    }
}
