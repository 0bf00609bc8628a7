//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for external services like push delivery and mail.

pub mod mail;
pub mod push;
