//! Mail module
//!
//! Sends plaintext alert emails through an HTTP mail-sending API.

mod mail_client;

pub use mail_client::{MailClient, MailError, MailMessage};
