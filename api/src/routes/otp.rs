use actix_web::{web, HttpRequest, HttpResponse};
use tracing_actix_web::RequestId;
use validator::Validate;

use dl_core::RateLimitAction;
use dl_shared::email::mask_email;
use dl_shared::ApiResponse;

use crate::dto::{SendCodeRequest, VerifyCodeRequest};
use crate::handlers::{domain_error_response, validation_error_response};
use crate::middleware::enforce_rate_limit;
use crate::state::AppState;

use super::outcome_response;

/// POST /api/v1/otp/send
///
/// ```json
/// { "email": "ada@devlink.io", "purpose": "password_reset" }
/// ```
///
/// Issues a fresh code for the pair, replacing any earlier one, and mails
/// it. Password reset codes are only sent to registered addresses.
pub async fn send_code(
    req: HttpRequest,
    request_id: RequestId,
    state: web::Data<AppState>,
    body: web::Json<SendCodeRequest>,
) -> HttpResponse {
    let body = body.into_inner();
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }

    if let Err(response) =
        enforce_rate_limit(&state, &req, RateLimitAction::IssueCode, Some(&body.email)).await
    {
        return response;
    }

    tracing::info!(
        email = %mask_email(&body.email),
        purpose = %body.purpose,
        "Processing send code request"
    );

    match state
        .account_service
        .request_code(&body.email, body.purpose)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(
            ApiResponse::<()>::ok("Verification code sent").with_request_id(request_id.to_string()),
        ),
        Err(e) => domain_error_response(&e),
    }
}

/// POST /api/v1/otp/verify
///
/// ```json
/// { "email": "ada@devlink.io", "code": "123456", "purpose": "email_verification" }
/// ```
///
/// Runs the follow-up for the purpose on success; `new_password` must be
/// present for `password_reset`.
pub async fn verify_code(
    req: HttpRequest,
    request_id: RequestId,
    state: web::Data<AppState>,
    body: web::Json<VerifyCodeRequest>,
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

    let result = state
        .account_service
        .verify_code(
            &body.email,
            &body.code,
            body.purpose,
            body.new_password.as_deref(),
        )
        .await;

    match result {
        Ok(outcome) => outcome_response(&outcome, "Code verified", request_id.to_string()),
        Err(e) => domain_error_response(&e),
    }
}
