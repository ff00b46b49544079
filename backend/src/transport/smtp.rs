//! `lettre`-backed transport.
//!
//! Drafts are written as `.eml` files into a drafts directory; live sends go
//! through an SMTP relay whose connection is tested when the session opens.

use super::{MailSession, MailTransport, OutgoingMessage, TransportError};
use crate::config::{AppConfig, SmtpSettings};
use common::model::merge::DeliveryMode;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MessageBuilder};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{FileTransport, Message, SmtpTransport, Transport};
use log::debug;
use std::fs;
use std::path::PathBuf;

pub struct LettreTransport {
    sender: String,
    drafts_dir: PathBuf,
    smtp: Option<SmtpSettings>,
}

impl LettreTransport {
    pub fn new(sender: impl Into<String>, drafts_dir: PathBuf, smtp: Option<SmtpSettings>) -> Self {
        Self {
            sender: sender.into(),
            drafts_dir,
            smtp,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.sender.clone(),
            config.drafts_dir.clone(),
            config.smtp.clone(),
        )
    }

    fn open_smtp(&self) -> Result<SmtpTransport, TransportError> {
        let settings = self
            .smtp
            .as_ref()
            .ok_or_else(|| TransportError::Session("SMTP_HOST is not configured".to_string()))?;

        let builder = if settings.use_tls {
            SmtpTransport::starttls_relay(&settings.host)
                .map_err(|e| TransportError::Session(e.to_string()))?
        } else {
            SmtpTransport::builder_dangerous(&settings.host)
        };
        let mut builder = builder.port(settings.port);
        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        let transport = builder.build();

        match transport.test_connection() {
            Ok(true) => Ok(transport),
            Ok(false) => Err(TransportError::Session(format!(
                "SMTP server {}:{} did not accept the connection",
                settings.host, settings.port
            ))),
            Err(e) => Err(TransportError::Session(e.to_string())),
        }
    }
}

impl MailTransport for LettreTransport {
    fn connect(&self, mode: DeliveryMode) -> Result<Box<dyn MailSession>, TransportError> {
        let from: Mailbox = self
            .sender
            .parse()
            .map_err(|_| TransportError::InvalidAddress(self.sender.clone()))?;

        let session = match mode {
            DeliveryMode::Draft => {
                fs::create_dir_all(&self.drafts_dir).map_err(|e| {
                    TransportError::Session(format!(
                        "cannot create drafts directory {}: {e}",
                        self.drafts_dir.display()
                    ))
                })?;
                LettreSession {
                    from,
                    drafts: Some(FileTransport::new(&self.drafts_dir)),
                    smtp: None,
                }
            }
            DeliveryMode::Send => LettreSession {
                from,
                drafts: None,
                smtp: Some(self.open_smtp()?),
            },
        };
        Ok(Box::new(session))
    }
}

struct LettreSession {
    from: Mailbox,
    drafts: Option<FileTransport>,
    smtp: Option<SmtpTransport>,
}

impl MailSession for LettreSession {
    fn save(&mut self, message: &OutgoingMessage) -> Result<(), TransportError> {
        let drafts = self
            .drafts
            .as_ref()
            .ok_or_else(|| TransportError::Delivery("session was not opened for drafts".into()))?;
        let email = build_message(&self.from, message)?;
        let id = drafts
            .send(&email)
            .map_err(|e| TransportError::Delivery(e.to_string()))?;
        debug!("Saved draft {} for {}", id, message.to);
        Ok(())
    }

    fn send(&mut self, message: &OutgoingMessage) -> Result<(), TransportError> {
        let smtp = self
            .smtp
            .as_ref()
            .ok_or_else(|| TransportError::Delivery("session was not opened for sending".into()))?;
        let email = build_message(&self.from, message)?;
        smtp.send(&email)
            .map_err(|e| TransportError::Delivery(e.to_string()))?;
        Ok(())
    }

    fn release(&mut self) {
        self.drafts = None;
        self.smtp = None;
    }
}

/// Splits a cell holding one or more addresses separated by `;` or `,`.
fn split_addresses(field: &str) -> impl Iterator<Item = &str> {
    field
        .split([';', ','])
        .map(str::trim)
        .filter(|a| !a.is_empty())
}

fn parse_mailboxes(field: &str) -> Result<Vec<Mailbox>, TransportError> {
    let boxes = split_addresses(field)
        .map(|addr| {
            addr.parse::<Mailbox>()
                .map_err(|_| TransportError::InvalidAddress(addr.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if boxes.is_empty() {
        return Err(TransportError::InvalidAddress(field.to_string()));
    }
    Ok(boxes)
}

fn add_recipients(
    mut builder: MessageBuilder,
    field: Option<&str>,
    add: fn(MessageBuilder, Mailbox) -> MessageBuilder,
) -> Result<MessageBuilder, TransportError> {
    if let Some(field) = field {
        for mailbox in parse_mailboxes(field)? {
            builder = add(builder, mailbox);
        }
    }
    Ok(builder)
}

fn build_message(from: &Mailbox, message: &OutgoingMessage) -> Result<Message, TransportError> {
    let builder = Message::builder()
        .from(from.clone())
        .subject(message.subject.clone());
    let builder = add_recipients(builder, Some(&message.to), MessageBuilder::to)?;
    let builder = add_recipients(builder, message.cc.as_deref(), MessageBuilder::cc)?;
    let builder = add_recipients(builder, message.bcc.as_deref(), MessageBuilder::bcc)?;
    builder
        .header(ContentType::TEXT_HTML)
        .body(message.html_body.clone())
        .map_err(|e| TransportError::Message(e.to_string()))
}
