//! Route table
//!
//! - `otp` - issuing and verifying codes
//! - `auth` - the password reset and email verification follow-ups
//! - `health` - liveness and backend probes

pub mod auth;
pub mod health;
pub mod otp;

use actix_web::{web, HttpResponse};

use dl_core::VerificationOutcome;
use dl_shared::ApiResponse;

use crate::dto::VerificationData;

/// Register the versioned API under `/api/v1`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health)).service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health::health))
            .service(
                web::scope("/otp")
                    .route("/send", web::post().to(otp::send_code))
                    .route("/verify", web::post().to(otp::verify_code)),
            )
            .service(
                web::scope("/auth")
                    .route("/reset-password", web::post().to(auth::reset_password))
                    .route("/verify-email", web::post().to(auth::verify_email)),
            ),
    );
}

/// 200 for a verified code, 400 with the reason otherwise
pub(crate) fn outcome_response(
    outcome: &VerificationOutcome,
    success_message: &str,
    request_id: String,
) -> HttpResponse {
    match (outcome.reason, VerificationData::from_outcome(outcome)) {
        (Some(reason), Some(data)) if !outcome.valid => HttpResponse::BadRequest().json(
            ApiResponse::failed(reason.user_message())
                .with_data(data)
                .with_request_id(request_id),
        ),
        _ => HttpResponse::Ok()
            .json(ApiResponse::<()>::ok(success_message).with_request_id(request_id)),
    }
}
