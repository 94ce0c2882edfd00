//! HTTP interface - shared state and router.
//!
//! Thin layer over the core workflows: handlers deserialize, call core,
//! publish events, and serialize. No business rules live here.

mod routes;

use crate::{config::AppConfig, core::events::EventBus, openai::AiClient};
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state handed to every handler.
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Upstream AI client
    pub ai: AiClient,
    /// Per-topic realtime event bus
    pub events: EventBus,
}

impl AppState {
    /// Assembles the shared state from loaded configuration and an open
    /// database connection.
    #[must_use]
    pub fn new(config: &AppConfig, db: DatabaseConnection) -> Arc<Self> {
        Arc::new(Self {
            db,
            ai: AiClient::new(config.openai_api_key.clone(), config.openai_model.clone()),
            events: EventBus::new(),
        })
    }
}

/// Builds the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Profiles
        .route("/api/profiles", post(routes::ensure_profile))
        .route("/api/profiles/:id", get(routes::get_profile))
        .route("/api/profiles/:id", patch(routes::update_profile))
        .route("/api/profiles/:id/role", put(routes::set_role))
        .route("/api/profiles/:id/activities", get(routes::get_activities))
        // Questions
        .route("/api/questions", post(routes::create_question))
        .route("/api/questions/pending", get(routes::get_pending_questions))
        .route("/api/questions/:id", get(routes::get_question))
        .route("/api/questions/:id", patch(routes::edit_question))
        .route("/api/questions/:id", delete(routes::delete_question))
        .route("/api/profiles/:id/questions", get(routes::get_user_questions))
        // Answers
        .route("/api/questions/:id/answers", get(routes::get_question_answers))
        .route("/api/questions/:id/answers", post(routes::submit_answer))
        .route(
            "/api/questions/:id/answers/:answer_id/select",
            post(routes::select_answer),
        )
        .route("/api/answers/:id/reject", post(routes::reject_answer))
        .route("/api/answers/:id", patch(routes::edit_answer))
        // Points
        .route("/api/profiles/:id/points", get(routes::get_point_history))
        .route(
            "/api/profiles/:id/points/summary",
            get(routes::get_point_summary),
        )
        .route("/api/profiles/:id/points/use", post(routes::use_points))
        // AI relay and speech-to-text
        .route("/api/ai", post(routes::ask_ai))
        .route("/api/whisper", post(routes::whisper))
        // Realtime notifications
        .route("/api/events", get(routes::subscribe_events))
        // Health check
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
