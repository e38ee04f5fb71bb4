//! Follow-up actions behind a verified code: password reset and email
//! verification.

mod service;

#[cfg(test)]
mod tests;

pub use service::{AccountService, AccountServiceConfig, MIN_PASSWORD_LENGTH};
