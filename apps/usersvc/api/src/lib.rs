//! Users Service
//!
//! HTTP front end for the users domain.
//!
//! ## Routes
//!
//! ```text
//! /api/users          GET list, POST create
//! /api/users/{id}     GET, PATCH/PUT update, DELETE
//! /health             liveness with app name and version
//! /api-docs/openapi.json
//! ```

pub mod config;
pub mod openapi;

use axum::Router;
use axum_helpers::server::{create_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{HandlerConfig, InMemoryUserRepository, UserService, handlers};
use eyre::WrapErr;
use tracing::info;

pub use config::Config;

/// Assemble the full application router for `config`.
pub fn app(config: &Config) -> eyre::Result<Router> {
    let service = UserService::builder()
        .repository(InMemoryUserRepository::new())
        .build()
        .wrap_err("Failed to build user service")?;

    let handler_config = HandlerConfig {
        request_timeout: config.server.request_timeout,
    };
    let api_routes = Router::new().nest("/users", handlers::router(service, handler_config));

    Ok(create_router::<openapi::ApiDoc>(api_routes).merge(health_router(config.app)))
}

/// Load configuration, initialise logging and serve until a shutdown signal.
pub async fn run() -> eyre::Result<()> {
    // Before any fallible operation so startup errors render with color-eyre
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let app = app(&config)?;

    info!(
        name = %config.app.name,
        version = %config.app.version,
        request_timeout = ?config.server.request_timeout,
        "Starting users API"
    );

    create_app(app, &config.server)
        .await
        .wrap_err("Server error")?;

    info!("Users API shutdown complete");
    Ok(())
}
