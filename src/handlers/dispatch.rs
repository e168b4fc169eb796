//! Route-table dispatch.
//!
//! Mounted as the router fallback, so every request not claimed by a
//! static axum route goes through here:
//!
//! 1. resolve method and path against the route table (404 / 405)
//! 2. run the route's middleware in order (401 / 403 / 429)
//! 3. call the registered action (501 when none is registered)

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
};
use tracing::debug;

use super::ActionContext;
use crate::error::{AppError, Result};
use crate::routing::{Resolution, RouteMatch};
use crate::state::AppState;

pub async fn dispatch(State(state): State<AppState>, mut request: Request<Body>) -> Result<Response> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let RouteMatch { route, params } = match state.routes.resolve(&method, &path) {
        Resolution::Matched(matched) => matched,
        Resolution::MethodNotAllowed(allowed) => {
            return Err(AppError::method_not_allowed(method, allowed));
        }
        Resolution::NotFound => {
            return Err(AppError::not_found(format!("No route for {} {}", method, path)));
        }
    };

    state.middleware.run(&route.middleware, &mut request)?;

    let action = state.actions.get(&route.handler).ok_or_else(|| {
        AppError::not_implemented(format!("No action registered for {}", route.handler))
    })?;

    debug!(
        method = %method,
        path = %path,
        route = route.name.as_deref().unwrap_or("-"),
        handler = %route.handler,
        "Dispatching request"
    );

    let ctx = ActionContext {
        state: state.clone(),
        route,
        params,
        request,
    };

    Ok(action.call(ctx).await)
}
