//! Signed bearer-token codec (JWT, HS256 symmetric secret).
//!
//! Two token kinds exist: short-lived `access` tokens presented at protected
//! endpoints and long-lived `refresh` tokens exchanged for a new pair. The
//! kind travels inside the signed claim set, so a refresh token can never be
//! replayed where an access token is required.
//!
//! Verification collapses every failure cause (malformed envelope, bad
//! signature, expiry, unrecognized kind, missing subject) into one opaque
//! [`InvalidToken`] so callers cannot leak the reason to the end user.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Access tokens authorize API calls for half an hour.
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 30;

/// Refresh tokens stay exchangeable for a week.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Discriminator embedded in the signed claim set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by every issued token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject email.
    sub: String,
    /// Absolute expiry (unix seconds).
    exp: i64,
    #[serde(rename = "type")]
    kind: TokenKind,
}

/// Decoded, verified token contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    pub subject: String,
    pub kind: TokenKind,
}

/// Uniform verification failure. Deliberately carries no cause.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid token")]
pub struct InvalidToken;

/// Token signing failure (key/serialization trouble at issue time).
#[derive(Debug, Error)]
#[error("token signing failed")]
pub struct SignError(#[source] jsonwebtoken::errors::Error);

/// Issues and verifies signed, expiring bearer tokens.
///
/// Pure over its inputs and the caller-supplied `now`; rotating the secret
/// invalidates every outstanding token (there is no key versioning).
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the caller-supplied instant instead of
        // the decoder's wall clock, with zero skew tolerance.
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Embed `subject` and `kind` into a signed envelope expiring at `now + ttl`.
    pub fn issue(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, SignError> {
        let claims = Claims {
            sub: subject.to_owned(),
            exp: (now + ttl).timestamp(),
            kind,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(SignError)
    }

    pub fn issue_access(&self, subject: &str, now: DateTime<Utc>) -> Result<String, SignError> {
        self.issue(
            subject,
            TokenKind::Access,
            Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
            now,
        )
    }

    pub fn issue_refresh(&self, subject: &str, now: DateTime<Utc>) -> Result<String, SignError> {
        self.issue(
            subject,
            TokenKind::Refresh,
            Duration::days(REFRESH_TOKEN_TTL_DAYS),
            now,
        )
    }

    /// Check signature integrity and expiry; return the decoded subject and
    /// kind only when both hold and the kind is recognized.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenData, InvalidToken> {
        let decoded = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| InvalidToken)?;
        let claims = decoded.claims;
        if claims.sub.is_empty() {
            return Err(InvalidToken);
        }
        if now.timestamp() >= claims.exp {
            return Err(InvalidToken);
        }
        Ok(TokenData {
            subject: claims.sub,
            kind: claims.kind,
        })
    }

    /// As [`verify`](Self::verify), but a structurally valid refresh token is
    /// a failure, not a success with a different payload.
    pub fn verify_access(&self, token: &str, now: DateTime<Utc>) -> Result<String, InvalidToken> {
        let data = self.verify(token, now)?;
        match data.kind {
            TokenKind::Access => Ok(data.subject),
            TokenKind::Refresh => Err(InvalidToken),
        }
    }
}
