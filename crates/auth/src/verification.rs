//! Email-verification token issuer.
//!
//! Tokens are opaque random strings proving control of a registered email
//! address. They are single-use: the store clears the token once it is
//! matched, so replay is impossible. No expiry is enforced.

use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;

/// Token length in characters (~190 bits over the alphanumeric alphabet).
pub const VERIFICATION_TOKEN_LENGTH: usize = 32;

/// Generate a fresh verification token from OS entropy.
pub fn generate_verification_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
