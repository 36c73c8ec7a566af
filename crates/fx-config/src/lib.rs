//! # fx-config
//!
//! Layered settings for the FixIt binary. Later layers win:
//!
//! 1. built-in defaults
//! 2. `fixit.toml` in the working directory, if present
//! 3. `FIXIT_*` environment variables (a `.env` file is loaded first)

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Shortest accepted `session_key`, in bytes.
pub const MIN_SESSION_KEY_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// HMAC key for session cookies. A random key is used when unset.
    pub session_key: Option<SecretString>,
    pub session_ttl_hours: i64,
    /// Reserved for real mail delivery; mail is only logged today.
    pub sendgrid_api_key: Option<SecretString>,
    pub from_email: String,
    pub from_name: String,
    pub root_url: String,
    /// Render internal error details on the 500 page.
    pub show_errors: bool,
    pub log_format: LogFormat,
    /// Insert demo data at startup when the database is empty.
    pub seed: bool,
}

fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("app_name", "FixIt")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", 8080)?
        .set_default("database_url", "sqlite://fixit.db")?
        .set_default("session_ttl_hours", 24 * 7)?
        .set_default("from_email", "noreply@fixit.local")?
        .set_default("from_name", "FixIt")?
        .set_default("root_url", "http://localhost:8080")?
        .set_default("show_errors", false)?
        .set_default("log_format", "pretty")?
        .set_default("seed", false)
}

impl AppConfig {
    /// Reads `.env`, `fixit.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        let settings = defaults()?
            .add_source(File::with_name("fixit").required(false))
            .add_source(Environment::with_prefix("FIXIT").try_parsing(true))
            .build()?;
        Self::finish(settings)
    }

    /// Defaults overlaid with a TOML document. Ignores the environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let settings = defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<Self, ConfigError> {
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(key) = &self.session_key {
            if key.expose_secret().len() < MIN_SESSION_KEY_BYTES {
                return Err(ConfigError::Invalid(format!(
                    "session_key must be at least {MIN_SESSION_KEY_BYTES} bytes"
                )));
            }
        }
        if self.session_ttl_hours <= 0 {
            return Err(ConfigError::Invalid(
                "session_ttl_hours must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
