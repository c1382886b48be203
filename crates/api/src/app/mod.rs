//! HTTP application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: infrastructure wiring (stores, mailer, token codec, limiter)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//! - `rate.rs`: per-class rate-limit admission

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::config::Config;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod rate;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: Config) -> anyhow::Result<Router> {
    let services = if config.use_persistent_stores {
        #[cfg(feature = "postgres")]
        {
            services::AppServices::persistent(&config).await?
        }
        #[cfg(not(feature = "postgres"))]
        {
            anyhow::bail!("USE_PERSISTENT_STORES requires the `postgres` feature")
        }
    } else {
        services::AppServices::in_memory(&config)
    };

    Ok(build_router(Arc::new(services)))
}

/// Assemble the router around an already-wired service set. Tests use this
/// to inject recording fakes.
pub fn build_router(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        tokens: services.tokens.clone(),
        users: services.users.clone(),
    };

    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::client_ip_middleware))
                .layer(Extension(services)),
        )
}
