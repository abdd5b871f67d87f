use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What a counter widget shows: a placeholder, a server count, or the error marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterValue {
    #[default]
    Loading,
    Count(u64),
    Error,
}

impl CounterValue {
    pub fn is_error(&self) -> bool {
        matches!(self, CounterValue::Error)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, CounterValue::Loading)
    }
}

impl fmt::Display for CounterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterValue::Loading => f.write_str("Loading..."),
            CounterValue::Count(count) => write!(f, "{count}"),
            CounterValue::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionStatus {
    pub has_visited: bool,
    pub has_liked: bool,
}

impl SessionStatus {
    /// Assumed when the server cannot be asked: a first-time visitor who has not liked.
    pub const FIRST_VISIT: SessionStatus = SessionStatus {
        has_visited: false,
        has_liked: false,
    };
}

/// `/session` bodies come either flat or wrapped in `data`, depending on the API version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SessionEnvelope {
    Flat(SessionStatus),
    Wrapped { data: SessionStatus },
}

impl From<SessionEnvelope> for SessionStatus {
    fn from(envelope: SessionEnvelope) -> Self {
        match envelope {
            SessionEnvelope::Flat(status) | SessionEnvelope::Wrapped { data: status } => status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
}

impl CountResponse {
    pub fn new(count: u64) -> Self {
        Self {
            count,
            success: true,
            message: None,
            liked: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub recaptcha: String,
}

impl ContactRequest {
    /// Checks the fields the form marks as required.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.message.trim().is_empty() {
            return Err("message is required");
        }
        if !looks_like_email(self.email.trim()) {
            return Err("a valid email is required");
        }
        if self.recaptcha.trim().is_empty() {
            return Err("recaptcha token is required");
        }
        Ok(())
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    #[serde(default)]
    pub has_visited: bool,
    #[serde(default)]
    pub has_liked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    pub received_at: DateTime<Utc>,
}

/// Everything the API server persists between restarts.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SiteData {
    #[serde(default)]
    pub visitors: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub sessions: BTreeMap<String, UserSession>,
    #[serde(default)]
    pub messages: Vec<ContactMessage>,
}
