use crate::config::ServerConfig;
use crate::models::SiteData;
use crate::recaptcha::RecaptchaVerifier;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub data: Arc<Mutex<SiteData>>,
    pub recaptcha: Option<Arc<RecaptchaVerifier>>,
}

impl AppState {
    pub fn new(config: ServerConfig, data: SiteData) -> Self {
        let recaptcha = config.recaptcha_secret.as_ref().map(|secret| {
            Arc::new(RecaptchaVerifier::new(
                reqwest::Client::new(),
                secret.clone(),
                config.recaptcha_verify_url.clone(),
            ))
        });
        Self {
            config: Arc::new(config),
            data: Arc::new(Mutex::new(data)),
            recaptcha,
        }
    }

    /// Session lifetime as a calendar duration; falls back to one day if out of range.
    pub fn session_max_age(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.config.session_max_age)
            .unwrap_or_else(|_| chrono::Duration::days(1))
    }
}
