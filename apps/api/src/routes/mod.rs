pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as comics;
use crate::state::AppState;
use crate::story::handlers as story;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/styles", get(comics::handle_list_styles))
        // Story intake
        .route("/api/v1/story/analyze", post(story::handle_analyze_story))
        .route(
            "/api/v1/characters/describe",
            post(story::handle_describe_characters),
        )
        // Comics
        .route(
            "/api/v1/storyboard/paginate",
            post(comics::handle_preview_layout),
        )
        .route("/api/v1/comics/paginate", post(comics::handle_paginate))
        .route("/api/v1/comics/generate", post(comics::handle_generate))
        .route("/api/v1/comics/edit", post(comics::handle_edit_panel))
        .route(
            "/api/v1/panels/regenerate",
            post(comics::handle_regenerate_panel),
        )
        .with_state(state)
}
