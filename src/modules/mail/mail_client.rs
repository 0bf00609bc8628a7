use reqwest::Client;
use serde::Serialize;

use crate::core::config::MailConfig;

/// A single plaintext email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub subject: String,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Mail API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
}

/// JSON payload accepted by the mail-sending API
#[derive(Debug, Serialize)]
struct SendMailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends alert emails to the configured recipient through an HTTP mail API
pub struct MailClient {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
    to: String,
}

impl MailClient {
    pub fn new(config: MailConfig) -> Self {
        tracing::info!("Mail client initialized, alerts go to {}", config.to);
        Self {
            client: Client::new(),
            api_url: config.api_url,
            api_key: config.api_key,
            from: config.from,
            to: config.to,
        }
    }

    pub async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let payload = SendMailPayload {
            from: &self.from,
            to: &self.to,
            subject: &message.subject,
            text: &message.text,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(MailError::Api { status, body });
        }

        tracing::debug!("Mail sent: {}", message.subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::spawn_stub;
    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    type Received = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    /// Mail API stand-in: `/send` records requests, the others fail
    async fn mail_stub(received: Received) -> String {
        let router = Router::new()
            .route(
                "/send",
                post(move |headers: HeaderMap, Json(body): Json<Value>| {
                    let received = Arc::clone(&received);
                    async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        received.lock().await.push((auth, body));
                        (StatusCode::ACCEPTED, Json(json!({ "id": "msg-1" })))
                    }
                }),
            )
            .route(
                "/reject",
                post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "invalid recipient") }),
            )
            .route(
                "/down",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
            );
        spawn_stub(router).await
    }

    fn client(api_url: String) -> MailClient {
        MailClient::new(MailConfig {
            api_url,
            api_key: "mail-key".to_string(),
            from: "alerts@clinick.test".to_string(),
            to: "dispatch@clinick.test".to_string(),
        })
    }

    fn message() -> MailMessage {
        MailMessage {
            subject: "New Emergency Report: high".to_string(),
            text: "Patient Name: Jane".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_payload_with_bearer_key() {
        let received = Received::default();
        let base = mail_stub(Arc::clone(&received)).await;

        client(format!("{}/send", base))
            .send(&message())
            .await
            .unwrap();

        let received = received.lock().await;
        assert_eq!(received.len(), 1);
        let (auth, body) = &received[0];
        assert_eq!(auth.as_deref(), Some("Bearer mail-key"));
        assert_eq!(
            *body,
            json!({
                "from": "alerts@clinick.test",
                "to": "dispatch@clinick.test",
                "subject": "New Emergency Report: high",
                "text": "Patient Name: Jane"
            })
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let base = mail_stub(Received::default()).await;

        let err = client(format!("{}/reject", base))
            .send(&message())
            .await
            .unwrap_err();
        assert!(
            matches!(err, MailError::Api { status: 422, ref body } if body == "invalid recipient")
        );

        let err = client(format!("{}/down", base))
            .send(&message())
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_request_error() {
        // Nothing listens on the discard port
        let err = client("http://127.0.0.1:9/send".to_string())
            .send(&message())
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::Request(_)));
    }
}
