//! MySQL implementations of the core repository traits

pub mod account_repository_impl;
pub mod otp_repository_impl;

pub use account_repository_impl::MySqlAccountRepository;
pub use otp_repository_impl::MySqlOtpRepository;
