use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::{header, StatusCode},
    HttpRequest, HttpResponse,
};
use std::collections::HashMap;
use validator::ValidationErrors;

use dl_core::DomainError;
use dl_shared::{error_codes, ErrorResponse};

/// Map a domain error onto a status and the uniform error body
///
/// Storage, dispatch and internal failures are logged with their detail;
/// the client only sees a generic message for them.
pub fn domain_error_response(error: &DomainError) -> HttpResponse {
    match error {
        DomainError::Validation { message } => {
            HttpResponse::BadRequest().json(ErrorResponse::new(error.error_code(), message.clone()))
        }
        DomainError::NotFound { resource } => HttpResponse::NotFound().json(ErrorResponse::new(
            error.error_code(),
            format!("No {} matches this request", resource),
        )),
        DomainError::RateLimited {
            retry_after_seconds,
        } => rate_limited_response(*retry_after_seconds),
        DomainError::Dispatch { message } => {
            tracing::error!(error = %message, "Email dispatch failed");
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
                error_codes::EMAIL_DELIVERY_FAILED,
                "We could not send the email. Please try again later",
            ))
        }
        DomainError::Storage { message } | DomainError::Internal { message } => {
            tracing::error!(error = %message, code = error.error_code(), "Request failed");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                error_codes::INTERNAL_ERROR,
                "An internal error occurred",
            ))
        }
    }
}

/// 429 with a `Retry-After` header
pub fn rate_limited_response(retry_after_seconds: u64) -> HttpResponse {
    HttpResponse::TooManyRequests()
        .insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()))
        .json(
            ErrorResponse::new(
                error_codes::RATE_LIMIT_EXCEEDED,
                format!(
                    "Too many requests. Please try again in {} seconds",
                    retry_after_seconds
                ),
            )
            .add_detail("retry_after_seconds", retry_after_seconds),
        )
}

/// 400 listing the failing fields
pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    let fields: HashMap<String, Vec<String>> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect();

    HttpResponse::BadRequest().json(
        ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data")
            .add_detail("fields", fields),
    )
}

/// Malformed JSON bodies get the same error shape as everything else
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::Deserialize(e) => format!("Invalid request body: {}", e),
        other => format!("Invalid request body: {}", other),
    };
    let status = match &err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            StatusCode::PAYLOAD_TOO_LARGE
        }
        _ => StatusCode::BAD_REQUEST,
    };

    let response =
        HttpResponse::build(status).json(ErrorResponse::new(error_codes::BAD_REQUEST, message));
    InternalError::from_response(err, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            domain_error_response(&DomainError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            domain_error_response(&DomainError::not_found("account")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            domain_error_response(&DomainError::RateLimited {
                retry_after_seconds: 30
            })
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            domain_error_response(&DomainError::dispatch("smtp down")).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            domain_error_response(&DomainError::storage("redis down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = rate_limited_response(42);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "42"
        );
    }
}
