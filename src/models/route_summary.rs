//! Serializable view of a route table entry, used by `cms-routes routes`.

use serde::Serialize;

use crate::routing::RouteEntry;

/// One row of the route listing
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub method: String,
    pub path: String,
    pub name: Option<String>,
    pub handler: String,
    pub middleware: Vec<String>,
}

impl RouteSummary {
    pub fn from_entry(entry: &RouteEntry) -> Self {
        Self {
            method: entry.method.to_string(),
            path: entry.pattern.to_string(),
            name: entry.name.clone(),
            handler: entry.handler.to_string(),
            middleware: entry.middleware.clone(),
        }
    }

    /// Fixed-width line for terminal output
    pub fn to_line(&self) -> String {
        format!(
            "{:<6} {:<55} {:<30} {:<50} {}",
            self.method,
            self.path,
            self.name.as_deref().unwrap_or("-"),
            self.handler,
            self.middleware.join(",")
        )
    }
}
