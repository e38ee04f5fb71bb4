use actix_web::{web, HttpRequest, HttpResponse};
use tracing_actix_web::RequestId;
use validator::Validate;

use dl_core::RateLimitAction;

use crate::dto::{ResetPasswordRequest, VerifyEmailRequest};
use crate::handlers::{domain_error_response, validation_error_response};
use crate::middleware::enforce_rate_limit;
use crate::state::AppState;

use super::outcome_response;

/// POST /api/v1/auth/reset-password
///
/// Verifies a `password_reset` code and stores the new password. A wrong
/// code leaves the password as it was.
pub async fn reset_password(
    req: HttpRequest,
    request_id: RequestId,
    state: web::Data<AppState>,
    body: web::Json<ResetPasswordRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }

    if let Err(response) =
        enforce_rate_limit(&state, &req, RateLimitAction::VerifyCode, Some(&body.email)).await
    {
        return response;
    }

    match state
        .account_service
        .reset_password(&body.email, &body.code, &body.new_password)
        .await
    {
        Ok(outcome) => outcome_response(
            &outcome,
            "Password updated successfully",
            request_id.to_string(),
        ),
        Err(e) => domain_error_response(&e),
    }
}

/// POST /api/v1/auth/verify-email
pub async fn verify_email(
    req: HttpRequest,
    request_id: RequestId,
    state: web::Data<AppState>,
    body: web::Json<VerifyEmailRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }

    if let Err(response) =
        enforce_rate_limit(&state, &req, RateLimitAction::VerifyCode, Some(&body.email)).await
    {
        return response;
    }

    match state.account_service.verify_email(&body.email, &body.code).await {
        Ok(outcome) => {
            outcome_response(&outcome, "Email verified successfully", request_id.to_string())
        }
        Err(e) => domain_error_response(&e),
    }
}
