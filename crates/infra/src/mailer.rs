//! Outbound mail seam.
//!
//! The API only ever sends one kind of message, the email verification link,
//! so the trait stays narrow. `LogMailer` is the default delivery path;
//! `RecordingMailer` captures messages for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a verification token to the given address.
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError>;
}

/// Writes the verification token to the log instead of sending mail.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError> {
        tracing::info!(email, token, "verification email");
        Ok(())
    }
}

/// Captures sent messages so tests can read the token back out.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent token sent to `email`, if any.
    pub fn last_token_for(&self, email: &str) -> Option<String> {
        let sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        sent.iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }

    pub fn sent_count(&self) -> usize {
        let sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        sent.len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError> {
        let mut sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        sent.push((email.to_owned(), token.to_owned()));
        Ok(())
    }
}
