use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;

use dl_api::{config, create_app, state, telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load().context("loading configuration")?;
    telemetry::init(&config.logging)?;

    info!(
        environment = %config.environment,
        bind = %config.server.bind_address(),
        "Starting DevLink API server"
    );

    let bind_address = config.server.bind_address();
    let workers = config.server.workers;
    let keep_alive = std::time::Duration::from_secs(config.server.keep_alive);

    let bootstrapped = state::bootstrap(config).await?;
    let state = web::Data::new(bootstrapped.state);

    let mut server = HttpServer::new(move || create_app(state.clone()))
        .keep_alive(keep_alive)
        .bind(&bind_address)
        .with_context(|| format!("binding {}", bind_address))?;
    if workers > 0 {
        server = server.workers(workers);
    }

    server.run().await?;

    if let Some(sweeper) = bootstrapped.sweeper {
        sweeper.abort();
    }
    info!("Server stopped");
    Ok(())
}
