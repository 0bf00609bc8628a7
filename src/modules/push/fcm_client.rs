//! Firebase Cloud Messaging (HTTP v1) client
//!
//! The v1 API addresses one device per request, so a multicast is issued as
//! a batch of single-token sends, at most [`MAX_CONCURRENT_SENDS`] in flight,
//! whose outcomes are tallied.

use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::core::config::PushConfig;
use crate::modules::push::token_manager::{ServiceAccountTokenManager, TokenError};

const FCM_API_BASE: &str = "https://fcm.googleapis.com/v1/projects";

/// Upper bound on simultaneous requests to FCM within one multicast
pub const MAX_CONCURRENT_SENDS: usize = 16;

/// Notification content shared by every device in a multicast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Key/value payload delivered to the client app alongside the notification
    pub data: HashMap<String, String>,
}

/// Per-batch delivery tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryResult {
    pub success_count: usize,
    pub failure_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("FCM authentication failed: {0}")]
    Auth(#[from] TokenError),

    #[error("FCM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("FCM returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: Message<'a>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    token: &'a str,
    notification: Notification<'a>,
    data: &'a HashMap<String, String>,
    android: AndroidConfig,
}

#[derive(Debug, Serialize)]
struct Notification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct AndroidConfig {
    priority: &'static str,
}

/// Sends push notifications through FCM using service account credentials
pub struct FcmClient {
    client: Client,
    send_url: String,
    token_manager: ServiceAccountTokenManager,
}

impl FcmClient {
    pub fn new(config: &PushConfig) -> Result<Self, PushError> {
        let send_url = format!("{}/{}/messages:send", FCM_API_BASE, config.project_id);
        Self::with_send_url(config, send_url)
    }

    fn with_send_url(config: &PushConfig, send_url: String) -> Result<Self, PushError> {
        let client = Client::new();
        let token_manager = ServiceAccountTokenManager::new(config, client.clone())?;

        info!("FCM client initialized for project: {}", config.project_id);

        Ok(Self {
            client,
            send_url,
            token_manager,
        })
    }

    /// Deliver `message` to every token in one batch.
    ///
    /// Individual device failures are counted, not returned as errors. An
    /// error means the batch could not be attempted at all.
    pub async fn send_multicast(
        &self,
        message: &PushMessage,
        tokens: &[String],
    ) -> Result<DeliveryResult, PushError> {
        if tokens.is_empty() {
            return Ok(DeliveryResult::default());
        }

        let access_token = self.token_manager.get_access_token().await?;

        let sends: Vec<_> = tokens
            .iter()
            .map(|token| self.send_one(&access_token, message, token))
            .collect();
        let outcomes: Vec<Result<(), PushError>> = stream::iter(sends)
            .buffer_unordered(MAX_CONCURRENT_SENDS)
            .collect()
            .await;

        let mut result = DeliveryResult::default();
        for outcome in outcomes {
            match outcome {
                Ok(()) => result.success_count += 1,
                Err(e) => {
                    warn!("FCM delivery to one device failed: {}", e);
                    result.failure_count += 1;
                }
            }
        }

        Ok(result)
    }

    async fn send_one(
        &self,
        access_token: &str,
        message: &PushMessage,
        token: &str,
    ) -> Result<(), PushError> {
        let payload = SendRequest {
            message: Message {
                token,
                notification: Notification {
                    title: &message.title,
                    body: &message.body,
                },
                data: &message.data,
                android: AndroidConfig { priority: "high" },
            },
        };

        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(PushError::Api { status, body });
        }

        Ok(())
    }
}
