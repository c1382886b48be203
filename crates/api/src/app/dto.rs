//! Request/response DTOs and JSON mapping helpers.

use serde::Deserialize;
use serde_json::json;

use rolodex_auth::User;
use rolodex_contacts::Contact;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationQuery {
    pub email: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct BirthdaysQuery {
    pub days: Option<u32>,
}

pub fn token_pair_json(access_token: String, refresh_token: String) -> serde_json::Value {
    json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "token_type": "bearer",
    })
}

/// Public view of an account; the password hash and verification token never
/// leave the server.
pub fn user_to_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id.to_string(),
        "email": user.email,
        "is_verified": user.is_verified,
        "avatar_url": user.avatar_url,
        "created_at": user.created_at,
    })
}

pub fn contact_to_json(contact: &Contact) -> serde_json::Value {
    json!({
        "id": contact.id.to_string(),
        "first_name": contact.first_name,
        "last_name": contact.last_name,
        "email": contact.email,
        "phone": contact.phone,
        "birth_date": contact.birth_date,
        "notes": contact.notes,
        "created_at": contact.created_at,
        "updated_at": contact.updated_at,
    })
}
