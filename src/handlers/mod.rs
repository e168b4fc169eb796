//! HTTP request handlers.
//!
//! - `dispatch`: the fallback handler serving every route-table request
//! - `health`: health check endpoints, mounted outside the route table
//!
//! Controller actions are supplied by the embedding application through an
//! [`ActionRegistry`] keyed by [`HandlerRef`].
//!
//! # Example
//!
//! ```rust,ignore
//! let mut actions = ActionRegistry::new();
//! actions.register(
//!     HandlerRef::new("frontend", "HomeController", "page"),
//!     |ctx: ActionContext| async move { ctx.param("slug").map(|slug| format!("page {slug}")) },
//! );
//! ```

pub mod dispatch;
pub mod health;

pub use dispatch::dispatch;
pub use health::health_routes;

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use futures::future::{BoxFuture, FutureExt};
use std::{collections::HashMap, fmt::Display, future::Future, str::FromStr, sync::Arc};

use crate::error::{AppError, Result};
use crate::models::Identity;
use crate::routing::{HandlerRef, PathParams, RouteEntry, RouteTable};
use crate::state::AppState;

/// Everything an action gets for one request
pub struct ActionContext {
    pub state: AppState,
    /// The matched route
    pub route: Arc<RouteEntry>,
    /// Captured path parameters
    pub params: PathParams,
    /// The request, after middleware ran
    pub request: Request<Body>,
}

impl ActionContext {
    /// A captured path parameter
    pub fn param(&self, name: &str) -> Result<&str> {
        self.params
            .get(name)
            .ok_or_else(|| AppError::validation(format!("Missing path parameter `{}`", name)))
    }

    /// A captured path parameter parsed as `T`; 400 when it does not parse
    pub fn param_as<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.param(name)?;
        raw.parse().map_err(|err: T::Err| {
            AppError::validation(format!("Invalid path parameter `{}`: {}", name, err))
        })
    }

    /// Identity attached by the `auth` middleware, if it ran
    pub fn identity(&self) -> Option<&Identity> {
        self.request.extensions().get::<Identity>()
    }

    /// Absolute URL of a named route
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String> {
        self.state.url_for(name, params)
    }
}

/// A controller action
pub trait Action: Send + Sync + 'static {
    fn call(&self, ctx: ActionContext) -> BoxFuture<'static, Response>;
}

impl<F, Fut, R> Action for F
where
    F: Fn(ActionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + 'static,
{
    fn call(&self, ctx: ActionContext) -> BoxFuture<'static, Response> {
        (self)(ctx).map(IntoResponse::into_response).boxed()
    }
}

/// Controller actions keyed by handler reference
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<HandlerRef, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the action for a handler
    pub fn register<A: Action>(&mut self, handler: HandlerRef, action: A) -> &mut Self {
        self.actions.insert(handler, Arc::new(action));
        self
    }

    pub fn get(&self, handler: &HandlerRef) -> Option<Arc<dyn Action>> {
        self.actions.get(handler).cloned()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Handlers referenced by the table that have no action, deduplicated
    pub fn missing<'a>(&self, table: &'a RouteTable) -> Vec<&'a HandlerRef> {
        let mut missing: Vec<&HandlerRef> = Vec::new();
        for route in table.routes() {
            if !self.actions.contains_key(&route.handler) && !missing.contains(&&route.handler) {
                missing.push(&route.handler);
            }
        }
        missing
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.actions.len())
            .finish()
    }
}
