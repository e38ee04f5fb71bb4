use actix_web::{web, HttpResponse};
use chrono::Utc;

use dl_shared::{HealthResponse, HealthStatus};

use crate::state::AppState;

/// GET /health
///
/// Healthy when every configured connection answers. A failing cache or
/// database reports `unhealthy` with 503 so load balancers drain the node.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let mut healthy = true;

    if let Some(redis) = &state.connections.redis {
        if !redis.health_check().await.unwrap_or(false) {
            tracing::warn!("Redis health check failed");
            healthy = false;
        }
    }

    if let Some(database) = &state.connections.database {
        if !database.health_check().await.unwrap_or(false) {
            tracing::warn!("Database health check failed");
            healthy = false;
        }
    }

    let status = if healthy {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };
    let body = HealthResponse {
        status,
        service: "devlink-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
