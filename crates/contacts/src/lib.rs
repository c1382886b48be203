//! `rolodex-contacts` — per-user contact records.
//!
//! Pure domain types and birthday arithmetic; persistence lives in
//! `rolodex-infra`. Every contact is owned by exactly one user and stores must
//! filter on that owner for every read and mutation.

pub mod birthdays;
pub mod contact;

pub use birthdays::{birthday_within, next_birthday};
pub use contact::{Contact, ContactPatch, NewContact};
