use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    // The exact media ceiling is enforced per-field in the upload handler;
    // the framework-level limit just needs headroom for multipart framing
    // and the text fields riding alongside the media part
    let body_limit = (state.limits.max_bytes as usize).saturating_add(1024 * 1024);

    Router::new()
        // Health check
        .route("/api/health", get(handlers::health))
        // Session lifecycle
        .route("/api/verify-token", post(handlers::verify_token))
        .route("/api/session/start", post(handlers::start_session))
        .route("/api/session/finish", post(handlers::finish_session))
        // Answer ingest
        .route("/api/upload-one", post(handlers::upload_one))
        // Stored media artifacts, served read-only for playback
        .nest_service("/uploads", ServeDir::new(state.store.root()))
        .layer(DefaultBodyLimit::max(body_limit))
        // Request logging and permissive CORS for browser clients
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
