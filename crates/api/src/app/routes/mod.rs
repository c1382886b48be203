use axum::{Router, routing::get};

pub mod auth;
pub mod contacts;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn protected_router() -> Router {
    Router::new()
        .route("/users/me", get(users::me))
        .route(
            "/users/avatar",
            axum::routing::put(users::upload_avatar).delete(users::delete_avatar),
        )
        .merge(contacts::router())
}

/// Router for unauthenticated endpoints.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/register", axum::routing::post(auth::register))
        .route("/login", axum::routing::post(auth::login))
        .route("/refresh", axum::routing::post(auth::refresh))
        .route("/verify-email", get(auth::verify_email))
        .route(
            "/resend-verification",
            axum::routing::post(auth::resend_verification),
        )
}
