//! The application's route table.
//!
//! Two groups are registered, in this order:
//!
//! | Group      | Prefix    | Names        | Middleware      |
//! |------------|-----------|--------------|-----------------|
//! | admin      | `/admin`  | `admin_*`    | `auth`, `admin` |
//! | frontend   | `/`       | `frontend_*` | none            |
//!
//! `cms-routes routes` prints the full listing.

pub mod admin;
pub mod frontend;

pub use admin::admin_group;
pub use frontend::frontend_group;

use tracing::info;

use crate::routing::{RouteError, RouteGroup, RouteTable};

/// All route groups in registration order
pub fn groups() -> Vec<RouteGroup> {
    vec![admin_group(), frontend_group()]
}

/// Build the application's route table.
///
/// # Errors
/// Any `RouteError` here is a declaration bug and aborts startup.
pub fn load() -> Result<RouteTable, RouteError> {
    let table = RouteTable::build(groups())?;
    info!(routes = table.len(), "Route table loaded");
    Ok(table)
}
