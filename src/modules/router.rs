use super::user;
use crate::{types::Context, utils::response::ApiResponse};
use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use serde_json::json;
use std::sync::Arc;

async fn health_check() -> impl IntoResponse {
    ApiResponse::with_message(StatusCode::OK, json!("OK"), "Health check passed")
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/healthcheck", get(health_check))
        .nest("/users", user::get_router())
}
