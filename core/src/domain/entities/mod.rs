//! Domain entities representing core business objects.

pub mod account;
pub mod one_time_code;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use account::Account;
pub use one_time_code::{
    CodeState, OneTimeCode, OtpPurpose, CODE_LENGTH, DEFAULT_EXPIRATION_MINUTES,
    DEFAULT_MAX_ATTEMPTS,
};
