use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use rolodex_auth::TokenCodec;
use rolodex_infra::UserStore;

use crate::app::errors;
use crate::context::{ClientIp, CurrentUser};

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenCodec>,
    pub users: Arc<dyn UserStore>,
}

/// Bearer gate for protected routes.
///
/// Every failure (missing header, malformed header, bad signature, expired,
/// refresh token on an access route, unknown account) maps to the same 401
/// so the response never reveals which check tripped.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(errors::unauthenticated)?;

    let subject = state
        .tokens
        .verify_access(token, Utc::now())
        .map_err(|_| errors::unauthenticated())?;

    let user = state
        .users
        .find_by_email(&subject)
        .await
        .map_err(errors::store_error_to_response)?
        .ok_or_else(errors::unauthenticated)?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Resolve the client address for rate-limit keying.
pub async fn client_ip_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let ip = forwarded_for(req.headers())
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string());

    req.extensions_mut().insert(ClientIp(ip));
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

/// First entry of `X-Forwarded-For`, the client as seen by the outermost
/// proxy.
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    let header = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = header.split(',').next()?.trim();
    if first.is_empty() {
        return None;
    }
    Some(first.to_string())
}
