//! Named route middleware.
//!
//! Routes reference middleware by name (`auth`, `admin`, `throttle`). The
//! dispatcher runs a route's middleware in declared order after the route is
//! resolved and before its action; the first rejection short-circuits the
//! request.
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = MiddlewareRegistry::from_config(&config);
//! registry.verify(&table)?;
//! registry.run(&route.middleware, &mut request)?;
//! ```

pub mod auth;
pub mod rate_limit;

pub use auth::{RequireRole, TokenAuth};
pub use rate_limit::RateLimiter;

use axum::body::Body;
use axum::http::Request;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::routing::{RouteError, RouteTable};

pub const AUTH: &str = "auth";
pub const ADMIN: &str = "admin";
pub const THROTTLE: &str = "throttle";

/// A guard run before a route's action.
///
/// Implementations may attach request extensions (e.g. an
/// [`Identity`](crate::models::Identity)) or reject with an error response.
pub trait Middleware: Send + Sync {
    fn handle(&self, request: &mut Request<Body>) -> Result<()>;
}

/// Middleware looked up by name
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    entries: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `auth`, `admin` and `throttle` middleware
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        registry
            .register(AUTH, TokenAuth::new(&config.auth))
            .register(ADMIN, RequireRole::new(&config.auth.admin_role))
            .register(THROTTLE, RateLimiter::new(&config.rate_limit));
        registry
    }

    /// Register (or replace) a middleware under a name
    pub fn register<M>(&mut self, name: impl Into<String>, middleware: M) -> &mut Self
    where
        M: Middleware + 'static,
    {
        self.entries.insert(name.into(), Arc::new(middleware));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Check that every middleware referenced by the table is registered.
    ///
    /// # Errors
    /// `RouteError::UnknownMiddleware` naming the first offending route
    pub fn verify(&self, table: &RouteTable) -> std::result::Result<(), RouteError> {
        for route in table.routes() {
            if let Some(missing) = route.middleware.iter().find(|name| !self.contains(name)) {
                return Err(RouteError::UnknownMiddleware {
                    name: missing.clone(),
                    route: route
                        .name
                        .clone()
                        .unwrap_or_else(|| format!("{} {}", route.method, route.pattern)),
                });
            }
        }
        Ok(())
    }

    /// Run the named middleware in order
    pub fn run(&self, names: &[String], request: &mut Request<Body>) -> Result<()> {
        for name in names {
            let middleware = self
                .entries
                .get(name)
                .ok_or_else(|| AppError::internal(format!("Middleware `{}` is not registered", name)))?;
            trace!(middleware = %name, path = %request.uri().path(), "Running middleware");
            middleware.handle(request)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("MiddlewareRegistry")
            .field("names", &names)
            .finish()
    }
}
