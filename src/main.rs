use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use tracing::{info, warn};

mod config;
mod models;
mod pdf;
mod render;
mod server;

use crate::config::Config;
use crate::pdf::{ChromiumEngine, PdfEngine};

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stockly_pdf_service=info".parse()?),
        )
        .init();

    info!("Starting stockly-pdf-service");

    // Load configuration
    let config = Config::load()?;
    if config.api_key.is_none() {
        warn!("STOCKLY_API_KEY is not set; /pdf routes will refuse every request");
    }

    // Initialize the PDF engine and verify the browser binary before
    // accepting traffic.
    let engine: Arc<dyn PdfEngine> = Arc::new(ChromiumEngine::new(
        &config.chromium_path,
        Duration::from_secs(config.render_timeout_seconds),
    ));
    engine
        .health_check()
        .await
        .context("pdf engine health check failed")?;

    let port = config.port;
    let engine_data = web::Data::from(engine.clone());
    let config_data = web::Data::new(config);

    let http_server = HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(engine_data.clone())
            .app_data(web::JsonConfig::default().limit(server::JSON_BODY_LIMIT))
            .wrap(server::cors(&config_data.allowed_origins))
            .wrap(server::security_headers())
            .configure(server::routes)
    })
    .bind(("0.0.0.0", port))
    .with_context(|| format!("failed to bind port {port}"))?
    .run();

    info!("stockly-pdf-service listening on port {}", port);
    http_server.await?;

    // Actix stops accepting connections on SIGINT/SIGTERM; close the engine
    // once in-flight requests have drained.
    engine.shutdown().await;
    info!("shutdown complete");
    Ok(())
}
