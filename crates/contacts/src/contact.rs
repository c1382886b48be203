//! Contact entity, creation input, and partial update.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use rolodex_core::{ContactId, DomainError, DomainResult, UserId};

/// A contact record owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    pub owner_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a contact.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewContact {
    /// Trim and shape-check all fields; rejected input never reaches a store.
    pub fn validate(mut self) -> DomainResult<Self> {
        self.first_name = required_trimmed(&self.first_name, "first name")?;
        self.last_name = required_trimmed(&self.last_name, "last name")?;
        self.phone = required_trimmed(&self.phone, "phone")?;
        self.email = valid_email(&self.email)?;
        Ok(self)
    }

    pub fn into_contact(self, owner_id: UserId, now: DateTime<Utc>) -> Contact {
        Contact {
            id: ContactId::new(),
            owner_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            birth_date: self.birth_date,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update: only present fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl ContactPatch {
    pub fn validate(mut self) -> DomainResult<Self> {
        if let Some(v) = &self.first_name {
            self.first_name = Some(required_trimmed(v, "first name")?);
        }
        if let Some(v) = &self.last_name {
            self.last_name = Some(required_trimmed(v, "last name")?);
        }
        if let Some(v) = &self.phone {
            self.phone = Some(required_trimmed(v, "phone")?);
        }
        if let Some(v) = &self.email {
            self.email = Some(valid_email(v)?);
        }
        Ok(self)
    }

    /// Apply the present fields to an existing contact.
    pub fn apply(self, contact: &mut Contact, now: DateTime<Utc>) {
        if let Some(v) = self.first_name {
            contact.first_name = v;
        }
        if let Some(v) = self.last_name {
            contact.last_name = v;
        }
        if let Some(v) = self.email {
            contact.email = v;
        }
        if let Some(v) = self.phone {
            contact.phone = v;
        }
        if let Some(v) = self.birth_date {
            contact.birth_date = v;
        }
        if let Some(v) = self.notes {
            contact.notes = Some(v);
        }
        contact.updated_at = now;
    }
}

/// Case-insensitive substring match over name and email fields.
pub fn matches_query(contact: &Contact, query: &str) -> bool {
    let needle = query.to_lowercase();
    contact.first_name.to_lowercase().contains(&needle)
        || contact.last_name.to_lowercase().contains(&needle)
        || contact.email.to_lowercase().contains(&needle)
}

fn required_trimmed(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_owned())
}

fn valid_email(value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(trimmed.to_owned())
}
