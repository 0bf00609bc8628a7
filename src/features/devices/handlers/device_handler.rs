use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::devices::dtos::SaveTokenDto;
use crate::features::devices::services::DeviceTokenStore;
use crate::shared::constants::ERR_SAVE_TOKEN;
use crate::shared::types::{ErrorResponse, OkResponse};

/// Register a device for report push notifications
///
/// Registering a token that is already known is a no-op.
#[utoipa::path(
    post,
    path = "/save-token",
    request_body = SaveTokenDto,
    responses(
        (status = 200, description = "Token registered", body = OkResponse),
        (status = 400, description = "Token missing", body = ErrorResponse),
        (status = 500, description = "Failed to save token", body = ErrorResponse)
    ),
    tag = "devices"
)]
pub async fn save_token(
    State(store): State<Arc<dyn DeviceTokenStore>>,
    AppJson(dto): AppJson<SaveTokenDto>,
) -> Result<Json<OkResponse>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let token = dto.token.unwrap_or_default();
    store
        .register_if_absent(&token)
        .await
        .map_err(|e| e.or_storage_failure(ERR_SAVE_TOKEN))?;

    Ok(Json(OkResponse::ok()))
}

#[cfg(test)]
mod tests {
    use crate::features::devices::routes;
    use crate::features::devices::services::DeviceTokenStore;
    use crate::shared::test_helpers::InMemoryDeviceTokenStore;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn server(store: Arc<InMemoryDeviceTokenStore>) -> TestServer {
        TestServer::new(routes::routes(store)).unwrap()
    }

    #[tokio::test]
    async fn test_save_token_twice_stores_once() {
        let store = Arc::new(InMemoryDeviceTokenStore::default());
        let server = server(store.clone());

        for _ in 0..2 {
            let response = server
                .post("/save-token")
                .json(&json!({ "token": "fcm-token-1" }))
                .await;
            response.assert_status_ok();
            assert_eq!(response.json::<Value>(), json!({ "ok": true }));
        }

        assert_eq!(store.all_tokens().await.unwrap(), vec!["fcm-token-1"]);
    }

    #[tokio::test]
    async fn test_save_token_missing_token_is_bad_request() {
        let store = Arc::new(InMemoryDeviceTokenStore::default());
        let server = server(store.clone());

        let response = server.post("/save-token").json(&json!({})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["ok"], false);
        assert!(body["error"].is_string());

        let response = server
            .post("/save-token")
            .json(&json!({ "token": "  " }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        assert!(store.all_tokens().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_token_storage_failure() {
        let store = Arc::new(InMemoryDeviceTokenStore::failing());
        let server = server(store);

        let response = server
            .post("/save-token")
            .json(&json!({ "token": "fcm-token-1" }))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<Value>(),
            json!({ "ok": false, "error": "Failed to save token" })
        );
    }
}
