pub mod account;
pub mod otp;

pub use account::{AccountRepository, InMemoryAccountRepository};
pub use otp::{AttemptRecord, ConsumeRecord, InMemoryOtpRepository, OtpRepository};
