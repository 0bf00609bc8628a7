use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::core::config::PushConfig;

/// OAuth2 scope required to send FCM messages
const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Lifetime requested for each signed assertion (Google caps it at one hour)
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Response from the Google OAuth2 token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(rename = "token_type")]
    pub _token_type: String,
}

/// Claims of the service account JWT assertion
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Cached token with expiration tracking
struct TokenCache {
    token: TokenResponse,
    fetched_at: Instant,
}

/// Exchanges the service account key for FCM access tokens and caches them
pub struct ServiceAccountTokenManager {
    client_email: String,
    token_uri: String,
    signing_key: EncodingKey,
    client: reqwest::Client,
    cache: Arc<RwLock<Option<TokenCache>>>,
    /// Refresh token this many seconds before expiration
    refresh_margin: Duration,
}

impl ServiceAccountTokenManager {
    pub fn new(config: &PushConfig, client: reqwest::Client) -> Result<Self, TokenError> {
        let signing_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())
            .map_err(|e| TokenError::InvalidKey(e.to_string()))?;

        Ok(Self {
            client_email: config.client_email.clone(),
            token_uri: config.token_uri.clone(),
            signing_key,
            client,
            cache: Arc::new(RwLock::new(None)),
            refresh_margin: Duration::from_secs(60),
        })
    }

    /// Get a valid access token, fetching a new one if necessary
    pub async fn get_access_token(&self) -> Result<String, TokenError> {
        {
            let cache = self.cache.read().await;
            if let Some(token) = self.cached_token(&cache) {
                return Ok(token);
            }
        }

        // Concurrent misses queue here; only the first one fetches
        let mut cache = self.cache.write().await;
        if let Some(token) = self.cached_token(&cache) {
            return Ok(token);
        }

        let token = self.fetch_token().await?;
        *cache = Some(TokenCache {
            token: token.clone(),
            fetched_at: Instant::now(),
        });

        Ok(token.access_token)
    }

    /// The cached token, unless it expires within the refresh margin
    fn cached_token(&self, cache: &Option<TokenCache>) -> Option<String> {
        let cached = cache.as_ref()?;
        let elapsed = cached.fetched_at.elapsed();
        let expires_in = Duration::from_secs(cached.token.expires_in);

        if elapsed + self.refresh_margin < expires_in {
            tracing::debug!(
                "Using cached FCM access token (expires in {} seconds)",
                (expires_in - elapsed).as_secs()
            );
            return Some(cached.token.access_token.clone());
        }
        None
    }

    fn sign_assertion(&self) -> Result<String, TokenError> {
        let iat = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: FCM_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| TokenError::InvalidKey(e.to_string()))
    }

    async fn fetch_token(&self) -> Result<TokenResponse, TokenError> {
        tracing::debug!("Fetching new FCM access token from {}", self.token_uri);

        let assertion = self.sign_assertion()?;

        let response = self
            .client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TokenError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::FetchError(format!(
                "Token request failed: HTTP {} - {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| TokenError::ParseError(e.to_string()))?;

        tracing::info!(
            "Fetched new FCM access token, expires in {} seconds",
            token_response.expires_in
        );

        Ok(token_response)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid service account key: {0}")]
    InvalidKey(String),

    #[error("Failed to fetch token: {0}")]
    FetchError(String),

    #[error("Failed to parse token response: {0}")]
    ParseError(String),
}

/// OAuth2 token endpoint stand-in that counts how many tokens it issued
#[cfg(test)]
pub(super) fn stub_token_router(
    issued: Arc<std::sync::atomic::AtomicUsize>,
    expires_in: u64,
) -> axum::Router {
    use axum::{http::StatusCode, routing::post, Form, Json};
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;

    axum::Router::new().route(
        "/token",
        post(move |Form(form): Form<HashMap<String, String>>| {
            let issued = Arc::clone(&issued);
            async move {
                let grant_type = form.get("grant_type").map(String::as_str);
                if grant_type != Some("urn:ietf:params:oauth:grant-type:jwt-bearer")
                    || !form.contains_key("assertion")
                {
                    return Err(StatusCode::BAD_REQUEST);
                }

                // Slow enough for concurrent callers to overlap
                tokio::time::sleep(Duration::from_millis(50)).await;
                let n = issued.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(Json(serde_json::json!({
                    "access_token": format!("ya29.test-{}", n),
                    "expires_in": expires_in,
                    "token_type": "Bearer"
                })))
            }
        }),
    )
}
