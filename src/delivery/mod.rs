// SPDX-License-Identifier: GPL-3.0-only

//! Strip delivery to the mail relay
//!
//! The booth hands a finished PNG to a [`StripSender`]. The production sender
//! is [`RelayClient`], which posts the strip as a data URI to the relay's
//! `/api/sendEmail` route and optionally retries transient failures.

use crate::constants::relay;
use crate::errors::DeliveryError;
use crate::media::to_data_uri;
use crate::pipelines::photo::PNG_MIME;
use crate::pipelines::photo::encoding::guess_mime;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Something that can email a strip to an address
pub trait StripSender: Send + Sync {
    fn send(&self, email: String, png: Vec<u8>) -> BoxFuture<'static, Result<(), DeliveryError>>;
}

/// Bounded retry for transient delivery failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub retries: u32,
    /// Delay before each extra attempt
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Single attempt
    pub const fn none() -> Self {
        Self {
            retries: 0,
            backoff: Duration::from_secs(1),
        }
    }

    pub const fn with_retries(retries: u32) -> Self {
        Self {
            retries,
            backoff: Duration::from_secs(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// JSON body accepted by the relay
#[derive(Debug, Clone, Serialize)]
pub struct SendEmailPayload {
    pub email: String,
    pub image: String,
}

impl SendEmailPayload {
    /// Payload carrying `image` as a data URI (PNG unless the bytes say otherwise)
    pub fn new(email: String, image: &[u8]) -> Self {
        let mime = guess_mime(image).unwrap_or(PNG_MIME);
        Self {
            email,
            image: to_data_uri(mime, image),
        }
    }
}

/// JSON body the relay answers with
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// HTTP client for the mail relay
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl RelayClient {
    /// Client for the relay at `base_url` (e.g. `http://127.0.0.1:3000`)
    pub fn new(base_url: &str, retry: RetryPolicy) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(relay::REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint_url(base_url),
            retry,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post the strip, retrying recoverable failures per the policy
    pub async fn send_strip(&self, email: &str, png: &[u8]) -> Result<(), DeliveryError> {
        let payload = SendEmailPayload::new(email.to_string(), png);
        let max_attempts = self.retry.max_attempts();

        let mut attempt = 1;
        loop {
            match self.post(&payload).await {
                Ok(message) => {
                    info!(attempt, %message, "Strip delivered to relay");
                    return Ok(());
                }
                Err(e) if e.is_recoverable() && attempt < max_attempts => {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "Relay request failed, retrying after {}ms",
                        self.retry.backoff.as_millis()
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post(&self, payload: &SendEmailPayload) -> Result<String, DeliveryError> {
        debug!(endpoint = %self.endpoint, "Posting strip to relay");
        let response = self.http.post(&self.endpoint).json(payload).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: RelayResponse = serde_json::from_str(&text).unwrap_or_default();

        if status.is_success() {
            return Ok(body.message);
        }

        let message = match (body.message.is_empty(), body.error) {
            (false, Some(error)) => format!("{}: {}", body.message, error),
            (false, None) => body.message,
            (true, _) if !text.is_empty() => text,
            (true, _) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

impl StripSender for RelayClient {
    fn send(&self, email: String, png: Vec<u8>) -> BoxFuture<'static, Result<(), DeliveryError>> {
        let client = self.clone();
        Box::pin(async move { client.send_strip(&email, &png).await })
    }
}

/// Full URL of the send route below `base_url`
pub fn endpoint_url(base_url: &str) -> String {
    format!(
        "{}{}",
        base_url.trim_end_matches('/'),
        relay::SEND_EMAIL_PATH
    )
}
