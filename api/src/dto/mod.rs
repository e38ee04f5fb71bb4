//! Request and response bodies

pub mod otp;

pub use otp::{
    ResetPasswordRequest, SendCodeRequest, VerificationData, VerifyCodeRequest,
    VerifyEmailRequest,
};
