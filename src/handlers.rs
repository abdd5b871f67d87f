use crate::errors::AppError;
use crate::models::{
    ContactMessage, ContactRequest, CountResponse, MessageResponse, SessionStatus, SiteData,
};
use crate::session::SessionId;
use crate::state::AppState;
use crate::storage::persist_data;
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use tracing::{info, warn};

pub async fn get_visitor_count(State(state): State<AppState>) -> Json<CountResponse> {
    let data = state.data.lock().await;
    Json(CountResponse::new(data.visitors))
}

pub async fn increment_visitor_count(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<CountResponse>, AppError> {
    let now = Utc::now();
    let max_age = state.session_max_age();
    let outcome = update(&state, |data| {
        data.record_visit(session.as_str(), now, max_age)
    })
    .await?;

    if !outcome.counted {
        return Ok(Json(CountResponse::new(outcome.count).with_message("already_counted")));
    }
    info!(count = outcome.count, "visitor counted");
    Ok(Json(CountResponse::new(outcome.count).with_message("incremented")))
}

pub async fn get_like_count(State(state): State<AppState>) -> Json<CountResponse> {
    let data = state.data.lock().await;
    Json(CountResponse::new(data.likes))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<CountResponse>, AppError> {
    let now = Utc::now();
    let max_age = state.session_max_age();
    let outcome = update(&state, |data| {
        data.toggle_like(session.as_str(), now, max_age)
    })
    .await?;

    let action = if outcome.liked { "liked" } else { "unliked" };
    info!(event = "like", action, count = outcome.count, "like toggled");
    let mut response = CountResponse::new(outcome.count).with_message(action);
    response.liked = Some(outcome.liked);
    Ok(Json(response))
}

pub async fn session_status(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Json<SessionStatus> {
    let data = state.data.lock().await;
    Json(data.session_status(session.as_str(), Utc::now()))
}

pub async fn contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(request) = payload.map_err(|err| {
        warn!("undecodable contact body: {err}");
        AppError::bad_request("Invalid request body")
    })?;

    if let Err(reason) = request.validate() {
        warn!(reason, "contact request rejected");
        return Err(AppError::bad_request("Invalid request"));
    }

    if let Some(verifier) = &state.recaptcha {
        let accepted = verifier.verify(&request.recaptcha).await.map_err(|err| {
            warn!("recaptcha verification failed: {err}");
            AppError::bad_request("Invalid request")
        })?;
        if !accepted {
            warn!(email = %request.email, "recaptcha rejected contact request");
            return Err(AppError::bad_request("Invalid request"));
        }
    }

    let message = ContactMessage {
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        message: request.message.trim().to_string(),
        received_at: Utc::now(),
    };
    info!(event = "contact", name = %message.name, email = %message.email, "contact message received");

    update(&state, |data| data.messages.push(message)).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Message sent successfully".to_string(),
    }))
}

pub async fn not_found() -> AppError {
    AppError::not_found()
}

/// Applies `change` under the data lock and persists the result. When the write fails the data
/// is put back as it was, so memory always matches the last successful write.
async fn update<T>(
    state: &AppState,
    change: impl FnOnce(&mut SiteData) -> T,
) -> Result<T, AppError> {
    let mut data = state.data.lock().await;
    let before = data.clone();
    let outcome = change(&mut *data);
    let pruned = data.prune_sessions(Utc::now());

    if let Err(err) = persist_data(&state.config.data_path, &data).await {
        *data = before;
        warn!("change discarded after failed write");
        return Err(err);
    }
    if pruned > 0 {
        info!(pruned, "expired sessions pruned");
    }
    Ok(outcome)
}
