//! Process configuration from the environment.

/// Defaults match the original deployment: mutating contact endpoints at
/// 10/minute, read endpoints at 100/hour.
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 10;
pub const DEFAULT_RATE_LIMIT_PER_HOUR: u32 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub jwt_secret: String,
    /// Use the Postgres stores instead of the in-memory ones. Requires the
    /// `postgres` feature and `DATABASE_URL`.
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub rate_limit_per_minute: u32,
    pub rate_limit_per_hour: u32,
}

impl Config {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            jwt_secret,
            use_persistent_stores: env_flag("USE_PERSISTENT_STORES"),
            database_url: std::env::var("DATABASE_URL").ok(),
            rate_limit_per_minute: env_u32("RATE_LIMIT_PER_MINUTE", DEFAULT_RATE_LIMIT_PER_MINUTE),
            rate_limit_per_hour: env_u32("RATE_LIMIT_PER_HOUR", DEFAULT_RATE_LIMIT_PER_HOUR),
        }
    }

    /// In-memory configuration for tests; rate limits are high enough to stay
    /// out of the way unless a test lowers them.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: jwt_secret.to_string(),
            use_persistent_stores: false,
            database_url: None,
            rate_limit_per_minute: 10_000,
            rate_limit_per_hour: 100_000,
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn env_u32(name: &str, default: u32) -> u32 {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(name, raw, "unparseable value; using default");
            default
        }),
        Err(_) => default,
    }
}
