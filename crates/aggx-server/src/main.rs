//! # aggx-server: HTTP Service for Aggregate Trait Satisfaction
//!
//! Exposes the trait satisfaction engine and the exec translator to a coordinator that
//! plans in another process.
//!
//! ## Endpoints
//!
//! - `GET  /health`               - Health check
//! - `POST /aggregate/satisfy`    - Try to satisfy a required trait set on an aggregate
//! - `POST /aggregate/translate`  - Lower an aggregate into its pipeline descriptor
//!
//! ## Configuration
//!
//! The server listens on `0.0.0.0:3000` unless `AGGX_LISTEN_ADDR` is set.
//! `AGGX_SHUFFLE_BY_PARTIAL_KEY_ENABLED` sets the server-wide default for
//! `table.optimizer.shuffle-by-partial-key-enabled`. Logging is controlled by the
//! `RUST_LOG` environment variable (defaults to `aggx=debug`).

mod routes;
mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aggx=debug")),
        )
        .init();

    let state = Arc::new(state::AppState::new(state::ServerConfig::from_env()));
    let listen_addr = state.config.listen_addr.clone();

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/aggregate/satisfy", post(routes::satisfy))
        .route("/aggregate/translate", post(routes::translate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!("aggx-server listening on http://{}", listen_addr);
    axum::serve(listener, app).await
}
