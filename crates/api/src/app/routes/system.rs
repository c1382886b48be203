use axum::{Json, http::StatusCode, response::IntoResponse};

pub async fn root() -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Contacts API" })),
    )
        .into_response()
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
