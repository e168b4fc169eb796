//! Application state management.
//!
//! This module defines the shared application state that is accessible
//! from the dispatcher, health handlers and every controller action.
//!
//! # Usage
//!
//! ```rust,ignore
//! let state = AppState::new(config, actions)?;
//! let url = state.url_for("frontend_page", &[("slug", "about")])?;
//! ```

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::handlers::ActionRegistry;
use crate::middleware::MiddlewareRegistry;
use crate::routes;
use crate::routing::RouteTable;

/// Shared application state
///
/// Everything here is immutable after startup; cloning only bumps `Arc`
/// counts.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// The route table
    pub routes: Arc<RouteTable>,

    /// Named middleware
    pub middleware: Arc<MiddlewareRegistry>,

    /// Controller actions
    pub actions: Arc<ActionRegistry>,

    /// Process start time
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create the application state with the application's route table
    ///
    /// # Errors
    /// Returns error if the route table fails to build or references
    /// unregistered middleware
    pub fn new(config: Config, actions: ActionRegistry) -> Result<Self> {
        let table = routes::load()?;
        let middleware = MiddlewareRegistry::from_config(&config);
        Self::with_routes(config, table, middleware, actions)
    }

    /// Create the application state from explicit parts
    pub fn with_routes(
        config: Config,
        routes: RouteTable,
        middleware: MiddlewareRegistry,
        actions: ActionRegistry,
    ) -> Result<Self> {
        middleware.verify(&routes)?;

        let missing = actions.missing(&routes);
        if !missing.is_empty() {
            warn!(
                count = missing.len(),
                handlers = %missing
                    .iter()
                    .map(|handler| handler.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
                "Routes without a registered action will answer 501"
            );
        }

        info!(
            routes = routes.len(),
            actions = actions.len(),
            credentials = config.auth.credentials.len(),
            "Application state ready"
        );

        Ok(Self {
            config: Arc::new(config),
            routes: Arc::new(routes),
            middleware: Arc::new(middleware),
            actions: Arc::new(actions),
            started_at: Utc::now(),
        })
    }

    /// Get the base URL for absolute route URLs
    pub fn base_url(&self) -> &str {
        &self.config.server.base_url
    }

    /// Absolute URL of a named route
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String> {
        let path = self.routes.url_for(name, params)?;
        Ok(format!("{}{}", self.base_url(), path))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &"<Config>")
            .field("routes", &self.routes.len())
            .field("middleware", &self.middleware)
            .field("actions", &self.actions)
            .finish()
    }
}
