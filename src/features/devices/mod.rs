//! Device registry for push notification delivery.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/save-token` | Register a device token (idempotent) |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::{DeviceTokenService, DeviceTokenStore};
