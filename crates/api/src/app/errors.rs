//! Consistent JSON error responses.
//!
//! Every error body is `{"error": code, "message": ...}`.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use serde_json::json;

use rolodex_core::DomainError;
use rolodex_infra::StoreError;
use rolodex_limiter::Decision;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthenticated => unauthenticated(),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::DuplicateEmail => {
            json_error(StatusCode::CONFLICT, "conflict", "email already registered")
        }
        StoreError::Backend(msg) => {
            tracing::error!(error = %msg, "store failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "internal storage error",
            )
        }
    }
}

/// Uniform 401: same body and `WWW-Authenticate` challenge for every cause.
pub fn unauthenticated() -> axum::response::Response {
    let mut response = json_error(
        StatusCode::UNAUTHORIZED,
        "unauthenticated",
        "could not validate credentials",
    );
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

/// 429 with retry guidance. The rate headers appear only on rejections.
pub fn rate_limited(decision: &Decision) -> axum::response::Response {
    let retry_secs = decision.retry_after.num_seconds().max(1);

    let mut response = json_error(
        StatusCode::TOO_MANY_REQUESTS,
        "rate_limited",
        format!("rate limit exceeded, retry in {retry_secs} seconds"),
    );

    let headers = response.headers_mut();
    insert_numeric(headers, header::RETRY_AFTER, retry_secs);
    insert_numeric_named(headers, "x-ratelimit-limit", i64::from(decision.limit));
    insert_numeric_named(headers, "x-ratelimit-remaining", 0);
    insert_numeric_named(headers, "x-ratelimit-reset", decision.reset_at.timestamp());
    response
}

fn insert_numeric(headers: &mut axum::http::HeaderMap, name: header::HeaderName, value: i64) {
    if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
        headers.insert(name, value);
    }
}

fn insert_numeric_named(headers: &mut axum::http::HeaderMap, name: &'static str, value: i64) {
    if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
        headers.insert(name, value);
    }
}
