use crate::handlers;
use crate::session;
use crate::state::AppState;
use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.allowed_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .route("/getVisitorCount", get(handlers::get_visitor_count))
        .route("/incrementVisitorCount", post(handlers::increment_visitor_count))
        .route("/getLikeCount", get(handlers::get_like_count))
        .route("/toggleLike", post(handlers::toggle_like))
        .route("/session", get(handlers::session_status))
        .route("/contact", post(handlers::contact))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), session::track))
        .layer(cors)
        .with_state(state)
}
