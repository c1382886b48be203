//! Registration, login, token refresh, and email verification.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use rolodex_auth::{
    User, generate_verification_token, hash_password, user::normalize_email, validate_password,
    verify_password,
};

use crate::app::{dto, errors, services::AppServices};

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    if let Err(e) = validate_password(&body.password) {
        return errors::domain_error_to_response(e);
    }

    let password_hash = match hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(error = %e, "password hashing failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "hash_error",
                "could not process password",
            );
        }
    };

    let token = generate_verification_token();
    let user = match User::register(&body.email, password_hash, token.clone(), Utc::now()) {
        Ok(u) => u,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let user = match services.users.insert(user).await {
        Ok(u) => u,
        Err(e) => return errors::store_error_to_response(e),
    };

    // Delivery is best-effort; registration never fails on mail problems.
    if let Err(e) = services.mailer.send_verification(&user.email, &token).await {
        tracing::warn!(email = %user.email, error = %e, "verification email not sent");
    }

    (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response()
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let Ok(email) = normalize_email(&body.email) else {
        return errors::unauthenticated();
    };

    let user = match services.users.find_by_email(&email).await {
        Ok(Some(u)) => u,
        Ok(None) => return errors::unauthenticated(),
        Err(e) => return errors::store_error_to_response(e),
    };

    if !verify_password(&user.password_hash, &body.password) {
        return errors::unauthenticated();
    }
    if !user.is_verified {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "email_not_verified",
            "email not verified",
        );
    }

    issue_pair(&services, &user.email)
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RefreshRequest>,
) -> axum::response::Response {
    let Ok(data) = services.tokens.verify(&body.refresh_token, Utc::now()) else {
        return errors::unauthenticated();
    };

    // The subject must still resolve to an account.
    match services.users.find_by_email(&data.subject).await {
        Ok(Some(user)) => issue_pair(&services, &user.email),
        Ok(None) => errors::unauthenticated(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn verify_email(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::VerifyEmailQuery>,
) -> axum::response::Response {
    let mut user = match services.users.find_by_verification_token(&query.token).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_token",
                "invalid or already used verification token",
            );
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    user.confirm_email(Utc::now());
    if let Err(e) = services.users.update(&user).await {
        return errors::store_error_to_response(e);
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "email verified" })),
    )
        .into_response()
}

pub async fn resend_verification(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ResendVerificationQuery>,
) -> axum::response::Response {
    let email = match normalize_email(&query.email) {
        Ok(e) => e,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let mut user = match services.users.find_by_email(&email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    let token = generate_verification_token();
    if let Err(e) = user.rotate_verification_token(token.clone(), Utc::now()) {
        return errors::domain_error_to_response(e);
    }
    if let Err(e) = services.users.update(&user).await {
        return errors::store_error_to_response(e);
    }

    if let Err(e) = services.mailer.send_verification(&user.email, &token).await {
        tracing::warn!(email = %user.email, error = %e, "verification email not sent");
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "verification email sent" })),
    )
        .into_response()
}

fn issue_pair(services: &AppServices, subject: &str) -> axum::response::Response {
    let now = Utc::now();
    let pair = services
        .tokens
        .issue_access(subject, now)
        .and_then(|access| {
            services
                .tokens
                .issue_refresh(subject, now)
                .map(|refresh| (access, refresh))
        });

    match pair {
        Ok((access, refresh)) => {
            (StatusCode::OK, Json(dto::token_pair_json(access, refresh))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "token signing failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_error",
                "could not issue tokens",
            )
        }
    }
}
