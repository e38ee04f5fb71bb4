//! Types for one-time code service results

use crate::domain::entities::OneTimeCode;

/// A code that was stored and handed to the email dispatcher
#[derive(Debug, Clone)]
pub struct IssuedCode {
    /// The stored record
    pub code: OneTimeCode,
    /// Message id returned by the email provider
    pub message_id: String,
}
