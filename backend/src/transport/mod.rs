//! Mail transport abstraction.
//!
//! A batch opens one [`MailSession`] through a [`MailTransport`], submits
//! every message through it, and releases it when the batch ends. Each
//! submission either queues the message as a draft or sends it right away.

pub mod smtp;

use common::model::merge::DeliveryMode;
use common::model::routing::Recipients;
use thiserror::Error;

/// A fully bound message ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub cc: Option<String>,
    pub bcc: Option<String>,
    pub subject: String,
    pub html_body: String,
}

impl OutgoingMessage {
    pub fn new(recipients: Recipients, subject: String, html_body: String) -> Self {
        let Recipients { to, cc, bcc, .. } = recipients;
        Self {
            to,
            cc: (!cc.is_empty()).then_some(cc),
            bcc: (!bcc.is_empty()).then_some(bcc),
            subject,
            html_body,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    #[error("Could not build message: {0}")]
    Message(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Could not open mail session: {0}")]
    Session(String),
}

/// An open connection to the mail system, owned by one batch.
#[cfg_attr(test, mockall::automock)]
pub trait MailSession: Send {
    /// Queues the message as a draft.
    fn save(&mut self, message: &OutgoingMessage) -> Result<(), TransportError>;

    /// Delivers the message immediately.
    fn send(&mut self, message: &OutgoingMessage) -> Result<(), TransportError>;

    /// Called exactly once when the batch is done with the session.
    fn release(&mut self) {}
}

#[cfg_attr(test, mockall::automock)]
pub trait MailTransport: Send + Sync {
    fn connect(&self, mode: DeliveryMode) -> Result<Box<dyn MailSession>, TransportError>;
}

/// Owns a session for the duration of a batch and releases it on drop,
/// including when the batch unwinds.
pub struct SessionGuard {
    session: Box<dyn MailSession>,
}

impl SessionGuard {
    pub fn new(session: Box<dyn MailSession>) -> Self {
        Self { session }
    }

    pub fn submit(
        &mut self,
        message: &OutgoingMessage,
        mode: DeliveryMode,
    ) -> Result<(), TransportError> {
        match mode {
            DeliveryMode::Draft => self.session.save(message),
            DeliveryMode::Send => self.session.send(message),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.session.release();
    }
}
