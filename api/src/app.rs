//! Application factory

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use dl_shared::{error_codes, ErrorResponse};

use crate::handlers::json_error_handler;
use crate::middleware::create_cors;
use crate::routes;
use crate::state::AppState;

/// Build the application around shared state
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let cors = create_cors(&state.config.cors);
    let json_config = web::JsonConfig::default()
        .limit(state.config.server.max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        .app_data(state)
        .app_data(json_config)
        .wrap(cors)
        .wrap(TracingLogger::default())
        .configure(routes::configure)
        .default_service(web::route().to(not_found))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
