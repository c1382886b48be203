//! User identity entity.
//!
//! # Invariants
//! - `email` is unique (enforced by the store) and stored trimmed/lowercased.
//! - `verification_token` is non-null only while `is_verified` is false; once
//!   verified it is cleared and never reused.
//! - Users are never hard-deleted by this core.

use chrono::{DateTime, Utc};

use rolodex_core::{DomainError, DomainResult, UserId};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an unverified account with an outstanding verification token.
    pub fn register(
        email: &str,
        password_hash: String,
        verification_token: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let email = normalize_email(email)?;
        Ok(Self {
            id: UserId::new(),
            email,
            password_hash,
            is_verified: false,
            verification_token: Some(verification_token),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Mark the email as verified and consume the outstanding token.
    pub fn confirm_email(&mut self, now: DateTime<Utc>) {
        self.is_verified = true;
        self.verification_token = None;
        self.updated_at = now;
    }

    /// Replace the outstanding verification token (resend flow).
    ///
    /// Rejected once the account is verified: a verified user must never hold
    /// a token again.
    pub fn rotate_verification_token(
        &mut self,
        token: String,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.is_verified {
            return Err(DomainError::validation("email already verified"));
        }
        self.verification_token = Some(token);
        self.updated_at = now;
        Ok(())
    }

    /// Point the account at a new avatar URL, or clear it.
    pub fn set_avatar(&mut self, url: Option<String>, now: DateTime<Utc>) {
        self.avatar_url = url;
        self.updated_at = now;
    }
}

/// Trim, lowercase, and shape-check an email address.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}
