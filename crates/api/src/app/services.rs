//! Infrastructure wiring behind the HTTP handlers.

use std::sync::Arc;

use rolodex_auth::TokenCodec;
use rolodex_infra::{
    AvatarStore, ContactStore, InMemoryAvatarStore, InMemoryContactStore, InMemoryUserStore,
    LogMailer, Mailer, UserStore,
};
use rolodex_limiter::{Quota, SlidingWindowLimiter};

use crate::config::Config;

/// Shared service handles, injected into handlers via `Extension`.
pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub mailer: Arc<dyn Mailer>,
    pub avatars: Arc<dyn AvatarStore>,
    pub tokens: Arc<TokenCodec>,
    pub limiter: SlidingWindowLimiter,
    /// Quota for mutating contact operations (per minute).
    pub write_quota: Quota,
    /// Quota for contact reads, search, and birthday queries (per hour).
    pub read_quota: Quota,
}

impl AppServices {
    /// In-memory stack: default for dev and tests.
    pub fn in_memory(config: &Config) -> Self {
        Self {
            users: Arc::new(InMemoryUserStore::new()),
            contacts: Arc::new(InMemoryContactStore::new()),
            mailer: Arc::new(LogMailer),
            avatars: Arc::new(InMemoryAvatarStore::new()),
            tokens: Arc::new(TokenCodec::new(config.jwt_secret.as_bytes())),
            limiter: SlidingWindowLimiter::new(),
            write_quota: Quota::per_minute(config.rate_limit_per_minute),
            read_quota: Quota::per_hour(config.rate_limit_per_hour),
        }
    }

    /// Postgres-backed stack. Requires `DATABASE_URL`.
    #[cfg(feature = "postgres")]
    pub async fn persistent(config: &Config) -> anyhow::Result<Self> {
        use rolodex_infra::{PgContactStore, PgUserStore, connect, ensure_schema};

        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("USE_PERSISTENT_STORES set but DATABASE_URL missing"))?;

        let pool = connect(database_url).await?;
        ensure_schema(&pool).await?;

        Ok(Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            contacts: Arc::new(PgContactStore::new(pool)),
            mailer: Arc::new(LogMailer),
            avatars: Arc::new(InMemoryAvatarStore::new()),
            tokens: Arc::new(TokenCodec::new(config.jwt_secret.as_bytes())),
            limiter: SlidingWindowLimiter::new(),
            write_quota: Quota::per_minute(config.rate_limit_per_minute),
            read_quota: Quota::per_hour(config.rate_limit_per_hour),
        })
    }
}
