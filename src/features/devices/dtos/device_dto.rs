use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request DTO for registering a device for push notifications
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaveTokenDto {
    /// Opaque FCM registration token
    #[validate(
        required(message = "token is required"),
        length(min = 1, message = "token is required")
    )]
    pub token: Option<String>,
}
