use std::sync::Arc;

use axum::{Router, http::HeaderValue, routing::get};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    database::Database,
    http_server::{http_routes::api_router, state::AppState},
};

pub const API_BASE_PATH: &str = "/api/cinema";

async fn health() -> &'static str {
    "ok"
}

/// Permissive in debug builds or when no origins are configured.
pub fn cors_layer(allowed_origins: &[String]) -> color_eyre::Result<CorsLayer> {
    if cfg!(debug_assertions) || allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .wrap_err_with(|| eyre!("Invalid CORS origin: {}", origin))
        })
        .collect::<color_eyre::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

pub fn build_router(app_state: Arc<AppState>, cors_layer: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest(API_BASE_PATH, api_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(app_state)
}

pub async fn start(config: &Config, database: Arc<Database>) -> color_eyre::Result<()> {
    let app_state = Arc::new(AppState {
        db: database,
        order_page_size: config.order_page_size,
        max_page_size: config.max_page_size,
    });

    let app = build_router(app_state, cors_layer(&config.cors_allowed_origins)?);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", config.port))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
