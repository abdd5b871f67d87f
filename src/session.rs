use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";

/// The caller's session id, attached to every request by [`track`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Pulls a well-formed session id out of the request's `Cookie` headers.
pub fn from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| is_valid_id(value))
        .map(|value| SessionId(value.to_string()))
}

fn is_valid_id(value: &str) -> bool {
    !value.is_empty() && value.len() <= 128 && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub fn set_cookie(session: &SessionId, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={}; HttpOnly; SameSite=Strict; Max-Age={}; Path=/",
        session.as_str(),
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Middleware that resolves or mints the session id and refreshes the cookie on the response.
pub async fn track(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let session = from_headers(req.headers()).unwrap_or_else(|| {
        let session = SessionId::generate();
        debug!(session = session.as_str(), "new session");
        session
    });
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;
    let cookie = set_cookie(&session, state.config.session_max_age, state.config.secure_cookies);
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(err) => warn!("could not encode session cookie: {err}"),
    }
    response
}
