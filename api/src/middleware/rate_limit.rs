//! Per-identity throttling for the code endpoints
//!
//! Handlers call [`enforce_rate_limit`] before touching the code
//! lifecycle. The key is the normalized email from the body; requests
//! without one fall back to the client address. Outside production the
//! gate is open unless `rate_limit.enforce_in_development` is set.

use actix_web::{HttpRequest, HttpResponse};

use dl_core::{DomainError, RateLimitAction, RateLimitStatus};
use dl_shared::email::{mask_email, normalize_email};
use dl_shared::{error_codes, ErrorResponse};

use crate::handlers::domain_error_response;
use crate::state::AppState;

/// Client address: first `X-Forwarded-For` hop, then `X-Real-IP`, then
/// the peer address
pub fn extract_client_ip(req: &HttpRequest) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = req
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Limiter key for a request
pub fn rate_limit_key(req: &HttpRequest, email: Option<&str>) -> String {
    match email.map(normalize_email).filter(|e| !e.is_empty()) {
        Some(email) => format!("email:{}", email),
        None => format!("ip:{}", extract_client_ip(req)),
    }
}

/// Count the request against `action`'s window
///
/// Returns the response to send instead of running the handler when the
/// window is full (429) or the limiter itself failed (503).
pub async fn enforce_rate_limit(
    state: &AppState,
    req: &HttpRequest,
    action: RateLimitAction,
    email: Option<&str>,
) -> Result<(), HttpResponse> {
    if !state.config.rate_limit.is_enforced(state.config.environment) {
        return Ok(());
    }

    let key = rate_limit_key(req, email);

    match state.rate_limiter.check_and_record(action, &key).await {
        Ok(RateLimitStatus::Allowed { remaining, .. }) => {
            tracing::debug!(action = %action, remaining, "Rate limit check passed");
            Ok(())
        }
        Ok(RateLimitStatus::Exceeded {
            retry_after_seconds,
            limit,
            window_seconds,
        }) => {
            tracing::warn!(
                action = %action,
                identity = %email.map(mask_email).unwrap_or_else(|| "ip".to_string()),
                limit,
                window_seconds,
                retry_after_seconds,
                event = "rate_limit_exceeded",
                "Rate limit exceeded"
            );
            Err(domain_error_response(&DomainError::RateLimited {
                retry_after_seconds,
            }))
        }
        Err(e) => {
            tracing::error!(action = %action, error = %e, "Rate limiter unavailable");
            Err(HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
                error_codes::RATE_LIMIT_UNAVAILABLE,
                "Service temporarily unavailable. Please try again later",
            )))
        }
    }
}
