//! # CMS Routes
//!
//! Route table and HTTP dispatch for a CMS: an admin panel (dashboard, media
//! library, dynamic post types and taxonomies, frontend settings) and the
//! public frontend (home page, pages by slug).
//!
//! ## Features
//!
//! - **Route groups**: prefixes, namespaces, name prefixes and middleware
//!   compose from parent to child
//! - **Inline parameters**: patterns like `term_type={type}/all`
//! - **Build-time validation**: duplicate names and conflicting or
//!   unreachable patterns abort startup
//! - **Named routes**: reverse URL generation with `url_for`
//! - **Named middleware**: `auth`, `admin`, `throttle`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  HTTP Server                    │
//! │   /health/*            fallback: dispatch       │
//! ├─────────────────────────────────────────────────┤
//! │  RouteTable::resolve ─► middleware ─► action    │
//! ├─────────────────────────────────────────────────┤
//! │  routes::admin_group      routes::frontend_group│
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the server
//! cargo run --release -- serve
//!
//! # List the route table
//! cargo run -- routes
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod routing;
pub mod state;

pub use config::{AuthConfig, Config};
pub use error::{AppError, Result};
pub use handlers::{Action, ActionContext, ActionRegistry};
pub use routing::{HandlerRef, Route, RouteGroup, RouteTable};
pub use state::AppState;

use axum::{http::StatusCode, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Run the server with the given configuration and controller actions.
pub async fn run(config: Config, actions: ActionRegistry) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState::new(config, actions)?;
    let app = create_router(state);

    info!(address = %addr, "HTTP server starting");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let body_limit = RequestBodyLimitLayer::new(state.config.server.max_body_size);
    let timeout = TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(state.config.server.request_timeout),
    );

    if state.config.rate_limit.enabled {
        info!(
            requests_per_window = state.config.rate_limit.requests_per_window,
            window_seconds = state.config.rate_limit.window_seconds,
            "Rate limiting enabled for `throttle` routes"
        );
    }

    Router::new()
        .nest("/health", handlers::health_routes())
        .fallback(handlers::dispatch)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(body_limit)
                .layer(timeout),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
