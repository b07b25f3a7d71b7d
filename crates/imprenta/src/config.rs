//! Client configuration.

use std::env::VarError;
use std::path::PathBuf;

use imprenta_session::SessionConfig;

use crate::ConfigError;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Everything the app needs to know to reach the backend and keep a
/// session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every request path is joined onto.
    pub api_url: String,

    pub session: SessionConfig,

    /// Where the token is persisted. `None` keeps it in memory only, so
    /// the session ends with the process.
    pub store_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session: SessionConfig::default(),
            store_path: None,
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from the environment, loading `.env` first
    /// if there is one.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `IMPRENTA_API_URL` | `api_url` |
    /// | `IMPRENTA_TOKEN_KEY` | `session.token_key` |
    /// | `IMPRENTA_AUTH_HEADER` | `session.credential_header` |
    /// | `IMPRENTA_LOGIN_PATH` | `session.login_path` |
    /// | `IMPRENTA_STORE_PATH` | `store_path` |
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|name| std::env::var(name))
    }

    /// Same as [`from_env`](Self::from_env), reading variables through
    /// `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let var = |name: &str| match lookup(name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(name.to_string())),
        };

        let mut config = Self::default();
        if let Some(url) = var("IMPRENTA_API_URL")? {
            config.api_url = url;
        }
        if let Some(key) = var("IMPRENTA_TOKEN_KEY")? {
            config.session.token_key = key;
        }
        if let Some(header) = var("IMPRENTA_AUTH_HEADER")? {
            config.session.credential_header = header;
        }
        if let Some(path) = var("IMPRENTA_LOGIN_PATH")? {
            config.session.login_path = path;
        }
        config.store_path = var("IMPRENTA_STORE_PATH")?
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }

    /// Checks the fields that have no usable fallback.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        Ok(())
    }

    /// Absolute URL of the credential exchange.
    pub fn login_url(&self) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            self.session.login_path.trim_start_matches('/')
        )
    }
}
