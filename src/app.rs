use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/moods", get(handlers::list_moods))
        .route("/api/classify", post(handlers::classify))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/entries", get(handlers::list_entries))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/journey", post(handlers::record_journey))
        .route("/api/chat", post(handlers::start_chat))
        .route(
            "/api/chat/:id",
            get(handlers::get_chat).delete(handlers::close_chat),
        )
        .route("/api/chat/:id/messages", post(handlers::send_chat_message))
        .with_state(state)
}
