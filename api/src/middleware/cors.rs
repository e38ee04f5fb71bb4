//! CORS policy for browser clients

use actix_cors::Cors;
use actix_web::http::{header, Method};

use dl_shared::config::CorsConfig;

/// Build the CORS middleware from `config`
///
/// `*` in `allowed_origins` accepts any origin; credentials are only
/// offered for an explicit origin list.
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-request-id"),
        ])
        .expose_headers(vec![
            header::RETRY_AFTER,
            header::HeaderName::from_static("x-request-id"),
        ])
        .max_age(config.max_age);

    if config.allows_any_origin() {
        tracing::info!("CORS allows any origin");
        return cors.allow_any_origin();
    }

    for origin in config.allowed_origins.iter().map(|o| o.trim()) {
        if !origin.is_empty() {
            tracing::info!(origin = origin, "Adding allowed origin");
            cors = cors.allowed_origin(origin);
        }
    }

    if config.allow_credentials {
        cors = cors.supports_credentials();
    }

    cors
}
