// SPDX-License-Identifier: GPL-3.0-only

//! Outgoing mail over SMTP

use crate::constants::relay;
use crate::errors::RelayError;
use futures::future::BoxFuture;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

/// SMTP settings, read at send time
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    /// Implicit TLS from the first byte; otherwise STARTTLS when offered
    pub secure: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Sender address, falls back to `user`
    pub from: Option<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: relay::DEFAULT_SMTP_PORT,
            secure: false,
            user: None,
            password: None,
            from: None,
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: relay::DEFAULT_SUBJECT.to_string(),
            body: relay::DEFAULT_BODY.to_string(),
        }
    }
}

impl SmtpConfig {
    /// Sender address: explicit `from`, else the login user
    pub fn sender(&self) -> Option<&str> {
        self.from
            .as_deref()
            .or(self.user.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Split a comma-separated address list, dropping blanks
pub fn parse_address_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// File attached to an outgoing mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// One mail to one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub attachment: MailAttachment,
}

/// Something that can deliver an [`OutgoingMail`]
pub trait Mailer: Send + Sync {
    fn send(&self, mail: OutgoingMail) -> BoxFuture<'static, Result<(), RelayError>>;
}

/// Assemble the MIME message for `mail`
pub fn build_message(config: &SmtpConfig, mail: &OutgoingMail) -> Result<Message, RelayError> {
    let from = config
        .sender()
        .ok_or_else(|| RelayError::Config("SMTP_FROM or SMTP_USER must be set".to_string()))?;

    let mut builder = Message::builder()
        .from(from.parse::<Mailbox>()?)
        .to(mail.to.trim().parse::<Mailbox>()?)
        .subject(config.subject.clone());
    for cc in &config.cc {
        builder = builder.cc(cc.parse::<Mailbox>()?);
    }
    for bcc in &config.bcc {
        builder = builder.bcc(bcc.parse::<Mailbox>()?);
    }

    let content_type = ContentType::parse(&mail.attachment.content_type)
        .map_err(|e| RelayError::InvalidImage(e.to_string()))?;
    let attachment = Attachment::new(mail.attachment.filename.clone())
        .body(mail.attachment.bytes.clone(), content_type);

    let message = builder.multipart(
        MultiPart::mixed()
            .singlepart(SinglePart::plain(config.body.clone()))
            .singlepart(attachment),
    )?;
    Ok(message)
}

/// Build the SMTP transport described by `config`
fn build_transport(config: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, RelayError> {
    let host = config
        .host
        .as_deref()
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| RelayError::Config("SMTP_HOST is not set".to_string()))?;

    let mut builder = if config.secure {
        AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .tls(Tls::Opportunistic(TlsParameters::new(host.to_string())?))
    }
    .port(config.port);

    if let (Some(user), Some(password)) = (&config.user, &config.password) {
        builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
    }
    Ok(builder.build())
}

/// Mailer opening one SMTP connection per mail
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    async fn deliver(config: SmtpConfig, mail: OutgoingMail) -> Result<(), RelayError> {
        let message = build_message(&config, &mail)?;
        let transport = build_transport(&config)?;
        debug!(
            host = config.host.as_deref().unwrap_or_default(),
            port = config.port,
            secure = config.secure,
            "Connecting to SMTP server"
        );

        let response = transport.send(message).await?;
        info!(
            to = %mail.to,
            code = %response.code(),
            attachment = %mail.attachment.filename,
            "Mail accepted by SMTP server"
        );
        Ok(())
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: OutgoingMail) -> BoxFuture<'static, Result<(), RelayError>> {
        Box::pin(Self::deliver(self.config.clone(), mail))
    }
}
