//! Mail delivery seam.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::info;

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// Empty means "let the backend decide".
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl Email {
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: String::new(),
            to: to.into(),
            subject: subject.into(),
            text: String::new(),
        }
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.from = sender.into();
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = body.into();
        self
    }

    pub fn validate(&self) -> Result<(), MailError> {
        if self.to.trim().is_empty() {
            return Err(MailError::InvalidMessage("recipient is required".to_string()));
        }
        if self.subject.trim().is_empty() {
            return Err(MailError::InvalidMessage("subject is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailError {
    #[error("invalid email: {0}")]
    InvalidMessage(String),

    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// Sends emails. Implement this to plug in a real backend.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &Email) -> Result<(), MailError>;
}

impl<M> Mailer for Arc<M>
where
    M: Mailer + ?Sized,
{
    fn send(&self, email: &Email) -> Result<(), MailError> {
        (**self).send(email)
    }
}

/// Writes each email to the log instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

impl Mailer for LogMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        email.validate()?;
        info!(to = %email.to, subject = %email.subject, body = %email.text, "admin email");
        Ok(())
    }
}

/// Keeps sent emails in memory.
///
/// Intended for tests/dev. Can be told to fail every send.
#[derive(Debug, Default)]
pub struct InMemoryMailer {
    sent: Mutex<Vec<Email>>,
    failing: bool,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent().into_iter().map(|e| e.subject).collect()
    }
}

impl Mailer for InMemoryMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        email.validate()?;
        if self.failing {
            return Err(MailError::Delivery("mailer configured to fail".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| MailError::Delivery("lock poisoned".to_string()))?
            .push(email.clone());
        Ok(())
    }
}
