// SPDX-License-Identifier: GPL-3.0-only

//! Mail relay service
//!
//! A single stateless route:
//!
//! ```text
//! POST /api/sendEmail  {"email": "...", "image": "data:image/png;base64,..."}
//!   400 {"message": ...}                          missing or invalid input
//!   200 {"message": "Email sent!"}                mail accepted by SMTP
//!   500 {"message": "Failed to send email", "error": ...}
//! ```
//!
//! Every request opens its own SMTP connection. Nothing is queued, tracked
//! or deduplicated.

pub mod mailer;

pub use mailer::{Mailer, MailAttachment, OutgoingMail, SmtpConfig, SmtpMailer, parse_address_list};

use crate::constants::relay;
use crate::errors::RelayError;
use crate::media::parse_data_uri;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

/// Relay process settings
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub addr: SocketAddr,
    pub smtp: SmtpConfig,
}

/// Request body of the send route; fields are optional so missing input
/// can be answered with a 400 of our own
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Response body of the send route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendEmailResponse {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }
}

type Reply = (StatusCode, Json<SendEmailResponse>);

fn bad_request(message: impl Into<String>) -> Reply {
    (
        StatusCode::BAD_REQUEST,
        Json(SendEmailResponse::message(message)),
    )
}

#[derive(Clone)]
struct RelayState {
    mailer: Arc<dyn Mailer>,
}

/// Router serving the send route through `mailer`
pub fn router(mailer: Arc<dyn Mailer>) -> Router {
    Router::new()
        .route(relay::SEND_EMAIL_PATH, post(send_email))
        .layer(DefaultBodyLimit::max(relay::MAX_BODY_BYTES))
        .with_state(RelayState { mailer })
}

async fn send_email(
    State(state): State<RelayState>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Reply {
    let request_id = Uuid::new_v4();
    let span = info_span!("send_email", %request_id);
    handle_send_email(state, payload).instrument(span).await
}

async fn handle_send_email(
    state: RelayState,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Reply {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable request body");
            return bad_request(format!("Invalid request body: {}", rejection.body_text()));
        }
    };

    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    let image = request.image.as_deref().map(str::trim).unwrap_or_default();
    if email.is_empty() || image.is_empty() {
        warn!(
            has_email = !email.is_empty(),
            has_image = !image.is_empty(),
            "Missing fields"
        );
        return bad_request("Email and image required");
    }

    let decoded = match parse_data_uri(image) {
        Ok(decoded) => decoded,
        Err(reason) => {
            warn!(%reason, "Undecodable image payload");
            return bad_request(RelayError::InvalidImage(reason).to_string());
        }
    };

    let mail = OutgoingMail {
        to: email.to_string(),
        attachment: MailAttachment {
            filename: format!("{}.{}", relay::ATTACHMENT_STEM, decoded.extension()),
            content_type: decoded.mime.clone(),
            bytes: decoded.bytes,
        },
    };
    info!(
        to = %mail.to,
        attachment = %mail.attachment.filename,
        size_kb = mail.attachment.bytes.len() / 1024,
        "Relaying strip"
    );

    match state.mailer.send(mail).await {
        Ok(()) => (
            StatusCode::OK,
            Json(SendEmailResponse::message("Email sent!")),
        ),
        Err(e) => {
            error!(error = %e, "Failed to send email");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SendEmailResponse {
                    message: "Failed to send email".to_string(),
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

/// Bind `config.addr` and serve until Ctrl+C
pub async fn serve(config: RelayConfig) -> Result<(), RelayError> {
    if config.smtp.host.is_none() {
        warn!("SMTP_HOST is not set, every send will fail");
    }
    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(config.smtp));
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %listener.local_addr()?, "Mail relay listening");

    axum::serve(listener, router(mailer))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Mail relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
