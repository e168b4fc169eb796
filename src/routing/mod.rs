//! Routing core: patterns, groups, and the immutable route table.
//!
//! ```text
//! RouteGroup ──┐
//! RouteGroup ──┼─► RouteTable::build ─► RouteTable ─► resolve(method, path)
//!   (nested) ──┘        (validates)                  url_for(name, params)
//! ```

pub mod group;
pub mod params;
pub mod pattern;
pub mod table;

pub use group::{HandlerRef, Route, RouteGroup};
pub use params::PathParams;
pub use pattern::RoutePattern;
pub use table::{Resolution, RouteEntry, RouteMatch, RouteTable};

use thiserror::Error;

/// Route table build and reverse-routing errors.
///
/// Build errors are fatal: the server refuses to start.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Duplicate route name: {name}")]
    DuplicateName { name: String },

    #[error("{method} {pattern} conflicts with earlier route {method} {existing}")]
    ConflictingPattern {
        method: String,
        pattern: String,
        existing: String,
    },

    #[error("{method} {pattern} is unreachable behind earlier route {method} {existing}")]
    ShadowedPattern {
        method: String,
        pattern: String,
        existing: String,
    },

    #[error("Invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid handler reference `{handler}` (expected Controller@action)")]
    InvalidHandler { handler: String },

    #[error("Route `{route}` uses unregistered middleware `{name}`")]
    UnknownMiddleware { name: String, route: String },

    #[error("No route named `{name}`")]
    UnknownRoute { name: String },

    #[error("Route `{route}` requires parameter `{param}`")]
    MissingParameter { route: String, param: String },
}
