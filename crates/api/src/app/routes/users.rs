//! Account profile routes (avatar management).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Multipart},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::app::{dto, errors, services::AppServices};
use crate::context::CurrentUser;

pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> axum::response::Response {
    (StatusCode::OK, Json(dto::user_to_json(&user))).into_response()
}

/// Replace the account avatar from a multipart `file` part. The part must
/// carry an `image/*` content type.
pub async fn upload_avatar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(CurrentUser(mut user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> axum::response::Response {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    "missing file part",
                );
            }
            Err(e) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    format!("malformed multipart body: {e}"),
                );
            }
        }
    };

    let is_image = field
        .content_type()
        .map(|ct| ct.starts_with("image/"))
        .unwrap_or(false);
    if !is_image {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "file must be an image",
        );
    }

    let bytes = match field.bytes().await {
        Ok(b) => b,
        Err(e) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("could not read upload: {e}"),
            );
        }
    };

    let url = match services.avatars.upload(user.id, bytes.to_vec()).await {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "avatar upload failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "avatar_error",
                "could not store avatar",
            );
        }
    };

    user.set_avatar(Some(url), Utc::now());
    if let Err(e) = services.users.update(&user).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::user_to_json(&user))).into_response()
}

pub async fn delete_avatar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(CurrentUser(mut user)): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(e) = services.avatars.delete(user.id).await {
        tracing::error!(error = %e, "avatar delete failed");
        return errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "avatar_error",
            "could not delete avatar",
        );
    }

    user.set_avatar(None, Utc::now());
    if let Err(e) = services.users.update(&user).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::user_to_json(&user))).into_response()
}
