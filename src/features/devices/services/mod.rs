mod device_token_service;

pub use device_token_service::{normalize_token, DeviceTokenService, DeviceTokenStore};
