use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hb_api::{app, middleware::spawn_sweeper, routes};
use hb_core::services::{FixedWindowRateLimiter, InMemoryRateLimitStore};
use hb_infra::{load_config, HttpOtpApi};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os("HOMEBOOK_CONFIG").map(PathBuf::from);
    let config = load_config(config_path.as_deref()).context("failed to load configuration")?;

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(config.logging.level.as_str()));

    info!("Starting HomeBook API Server ({})", config.environment);

    let upstream = Arc::new(HttpOtpApi::new(config.client.clone())?);
    let limiter = Arc::new(FixedWindowRateLimiter::new(
        Arc::new(InMemoryRateLimitStore::new()),
        config.rate_limit.clone(),
    ));

    if config.rate_limit.enabled {
        info!(
            "Rate limiting OTP endpoints to {} requests per {}s per client",
            config.rate_limit.max_requests, config.rate_limit.window_seconds
        );
        spawn_sweeper(
            limiter.clone(),
            Duration::from_secs(config.rate_limit.sweep_interval_seconds.max(1)),
        );
    }

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);
    info!("Forwarding OTP requests to {}", upstream.base_url());

    let max_payload_size = config.server.max_payload_size;
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| app::configure(cfg, upstream.clone(), limiter.clone(), max_payload_size))
            // Default 404 handler
            .default_service(web::route().to(routes::not_found))
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    Ok(())
}
