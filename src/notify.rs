//! Webhook Notification
//!
//! Posts the finished rotation to a Discord-style webhook as a JSON
//! `content` message. A generation failure never reaches this module; the
//! caller only notifies on success.

use crate::error::NotifyError;
use crate::generate::Rotation;
use crate::output;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::info;

const WEBHOOK_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const WEBHOOK_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one webhook endpoint.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .connect_timeout(WEBHOOK_CONNECT_TIMEOUT)
            .timeout(WEBHOOK_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Post the rotation as a single message, one layer name per line.
    pub async fn post_rotation(&self, rotation: &Rotation) -> Result<(), NotifyError> {
        let payload = json!({ "content": output::rotation_lines(rotation) });
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(map_request_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(NotifyError::Rejected { status, body });
        }

        info!(layers = rotation.len(), "rotation posted to webhook");
        Ok(())
    }
}

fn map_request_error(error: reqwest::Error) -> NotifyError {
    if error.is_timeout() {
        NotifyError::Request(format!("request timeout: {}", error))
    } else if error.is_connect() {
        NotifyError::Request(format!("connection error: {}", error))
    } else {
        NotifyError::Request(error.to_string())
    }
}
