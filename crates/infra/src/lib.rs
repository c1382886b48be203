//! `rolodex-infra` — storage and outbound adapters.
//!
//! Async store contracts with in-memory implementations for dev/test and
//! Postgres implementations behind the `postgres` feature, plus the
//! best-effort email transport and avatar blob-store boundaries.

pub mod avatar;
pub mod mailer;
pub mod store;

pub use avatar::{AvatarError, AvatarStore, InMemoryAvatarStore};
pub use mailer::{LogMailer, MailError, Mailer, RecordingMailer};
pub use store::{ContactStore, InMemoryContactStore, InMemoryUserStore, StoreError, UserStore};

#[cfg(feature = "postgres")]
pub use store::postgres::{PgContactStore, PgUserStore, connect, ensure_schema};
