use crate::errors::ConfigError;
use axum::http::HeaderValue;
use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};
use tracing::info;

pub const DEFAULT_RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";
const LOCAL_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_path: PathBuf,
    /// The single browser origin allowed to make credentialed requests.
    pub allowed_origin: HeaderValue,
    pub session_max_age: Duration,
    pub secure_cookies: bool,
    pub recaptcha_secret: Option<String>,
    pub recaptcha_verify_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("PORT", "8080")?,
            data_path: PathBuf::from(load_or("APP_DATA_PATH", "data/state.json")),
            allowed_origin: parse_origin(&load_or("ALLOWED_ORIGIN", LOCAL_ORIGIN))?,
            session_max_age: Duration::from_secs(try_load("SESSION_MAX_AGE_SECS", "86400")?),
            secure_cookies: try_load("COOKIE_SECURE", "true")?,
            recaptcha_secret: env::var("RECAPTCHA_SECRET_KEY")
                .ok()
                .filter(|secret| !secret.trim().is_empty()),
            recaptcha_verify_url: load_or("RECAPTCHA_VERIFY_URL", DEFAULT_RECAPTCHA_VERIFY_URL),
        })
    }

    /// Settings for a server on `data_path` with cookies usable over plain http.
    pub fn local(data_path: impl Into<PathBuf>) -> Self {
        Self {
            port: 0,
            data_path: data_path.into(),
            allowed_origin: HeaderValue::from_static(LOCAL_ORIGIN),
            session_max_age: Duration::from_secs(86_400),
            secure_cookies: false,
            recaptcha_secret: None,
            recaptcha_verify_url: DEFAULT_RECAPTCHA_VERIFY_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let poll_secs: u64 = try_load("POLL_INTERVAL_SECS", "10")?;
        if poll_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "POLL_INTERVAL_SECS",
                value: poll_secs.to_string(),
                reason: "must be at least one second".to_string(),
            });
        }

        Ok(Self {
            base_url: load_or("RESUME_API_URL", "http://127.0.0.1:8080"),
            poll_interval: Duration::from_secs(poll_secs),
        })
    }
}

fn load_or(key: &'static str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    parse_value(key, &load_or(key, default))
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: err.to_string(),
    })
}

/// Credentialed CORS responses cannot name the wildcard origin.
fn parse_origin(value: &str) -> Result<HeaderValue, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key: "ALLOWED_ORIGIN",
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let value = value.trim();
    if value == "*" {
        return Err(invalid("wildcard origin cannot be used with credentials"));
    }
    HeaderValue::from_str(value).map_err(|err| invalid(&err.to_string()))
}
