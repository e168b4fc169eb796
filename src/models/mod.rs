//! Data models shared between middleware, handlers and the CLI.

pub mod identity;
pub mod route_summary;

pub use identity::Identity;
pub use route_summary::RouteSummary;
