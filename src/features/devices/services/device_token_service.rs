use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Set of device tokens that receive report push notifications
#[async_trait]
pub trait DeviceTokenStore: Send + Sync {
    /// Register `token` unless it is already known.
    ///
    /// Returns `true` when a new row was inserted.
    async fn register_if_absent(&self, token: &str) -> Result<bool>;

    /// Every registered token, in no particular order
    async fn all_tokens(&self) -> Result<Vec<String>>;
}

/// Reject empty or whitespace-only tokens
pub fn normalize_token(token: &str) -> Result<&str> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Validation("token is required".to_string()));
    }
    Ok(token)
}

/// Postgres-backed device token registry
pub struct DeviceTokenService {
    pool: PgPool,
}

impl DeviceTokenService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceTokenStore for DeviceTokenService {
    async fn register_if_absent(&self, token: &str) -> Result<bool> {
        let token = normalize_token(token)?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM device_tokens WHERE token = $1)")
                .bind(token)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to look up device token: {:?}", e);
                    AppError::Database(e)
                })?;

        if exists {
            tracing::debug!("Device token already registered");
            return Ok(false);
        }

        // The unique index absorbs a concurrent registration of the same token
        let result = sqlx::query(
            r#"
            INSERT INTO device_tokens (id, token)
            VALUES ($1, $2)
            ON CONFLICT (token) DO NOTHING
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save device token: {:?}", e);
            AppError::Database(e)
        })?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            tracing::info!("Registered new device token");
        }
        Ok(inserted)
    }

    async fn all_tokens(&self) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT token FROM device_tokens")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load device tokens: {:?}", e);
                AppError::Database(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("  abc:123 ").unwrap(), "abc:123");
        assert!(matches!(normalize_token(""), Err(AppError::Validation(_))));
        assert!(matches!(
            normalize_token("   "),
            Err(AppError::Validation(_))
        ));
    }
}
