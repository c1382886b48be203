//! `rolodex-auth` — pure authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: password
//! hashing, the signed-token codec, the identity entity, and the
//! email-verification token issuer all operate on in-memory values only.

pub mod password;
pub mod token;
pub mod user;
pub mod verification;

pub use password::{MIN_PASSWORD_LENGTH, hash_password, validate_password, verify_password};
pub use token::{InvalidToken, TokenCodec, TokenData, TokenKind};
pub use user::User;
pub use verification::generate_verification_token;
