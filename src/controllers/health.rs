use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Story narrator is running" }))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
