//! Push notification module
//!
//! Delivers report alerts to registered devices via Firebase Cloud Messaging.

mod fcm_client;
mod token_manager;

pub use fcm_client::{DeliveryResult, FcmClient, PushError, PushMessage};
