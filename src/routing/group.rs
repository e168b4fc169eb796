//! Route and route-group declarations.
//!
//! Declarations are plain values; nothing is validated until the groups are
//! handed to [`RouteTable::build`](super::RouteTable::build).
//!
//! # Example
//! ```rust,ignore
//! let group = RouteGroup::new("admin/")
//!     .namespace("admin")
//!     .name_prefix("admin_")
//!     .middleware(["auth", "admin"])
//!     .route(Route::get("dashboard", "DashboardController@index").name("dashboard"));
//! ```

use axum::http::Method;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::RouteError;

/// Reference to a controller action: `namespace::Controller@action`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    namespace: String,
    controller: String,
    action: String,
}

impl HandlerRef {
    pub fn new(
        namespace: impl Into<String>,
        controller: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            controller: controller.into(),
            action: action.into(),
        }
    }

    /// Parse `Controller@action` inside the given namespace
    pub(crate) fn parse_in(namespace: &str, target: &str) -> Result<Self, RouteError> {
        let invalid = || RouteError::InvalidHandler {
            handler: target.to_string(),
        };

        let (controller, action) = target.split_once('@').ok_or_else(invalid)?;
        if !is_identifier(controller) || !is_identifier(action) {
            return Err(invalid());
        }

        Ok(Self::new(namespace, controller, action))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn action(&self) -> &str {
        &self.action
    }
}

impl FromStr for HandlerRef {
    type Err = RouteError;

    /// Accepts `Controller@action` or `namespace::Controller@action`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once("::") {
            Some((namespace, target)) => Self::parse_in(namespace, target),
            None => Self::parse_in("", s),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}@{}", self.controller, self.action)
        } else {
            write!(f, "{}::{}@{}", self.namespace, self.controller, self.action)
        }
    }
}

impl Serialize for HandlerRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A single route declaration
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) method: Method,
    pub(crate) pattern: String,
    pub(crate) handler: String,
    pub(crate) name: Option<String>,
    pub(crate) middleware: Vec<String>,
}

impl Route {
    /// Declare a route for any method. `handler` is `Controller@action`,
    /// resolved against the enclosing group's namespace.
    pub fn new(method: Method, pattern: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            method,
            pattern: pattern.into(),
            handler: handler.into(),
            name: None,
            middleware: Vec::new(),
        }
    }

    pub fn get(pattern: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new(Method::GET, pattern, handler)
    }

    pub fn post(pattern: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new(Method::POST, pattern, handler)
    }

    /// Name the route (the group name prefix is prepended at build time)
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Middleware applied after the enclosing groups' middleware
    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(names.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Member {
    Route(Route),
    Group(RouteGroup),
}

/// A set of routes sharing a prefix, namespace, name prefix and middleware
#[derive(Debug, Clone, Default)]
pub struct RouteGroup {
    pub(crate) prefix: String,
    pub(crate) namespace: String,
    pub(crate) name_prefix: String,
    pub(crate) middleware: Vec<String>,
    pub(crate) members: Vec<Member>,
}

impl RouteGroup {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.members.push(Member::Route(route));
        self
    }

    /// Nest a group; its prefix, namespace, name prefix and middleware
    /// extend this group's.
    pub fn group(mut self, group: RouteGroup) -> Self {
        self.members.push(Member::Group(group));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_ref_parse_and_display() {
        let handler: HandlerRef = "admin::MediaController@destroy".parse().unwrap();
        assert_eq!(handler.namespace(), "admin");
        assert_eq!(handler.controller(), "MediaController");
        assert_eq!(handler.action(), "destroy");
        assert_eq!(handler.to_string(), "admin::MediaController@destroy");

        let bare: HandlerRef = "HomeController@index".parse().unwrap();
        assert_eq!(bare.namespace(), "");
        assert_eq!(bare.to_string(), "HomeController@index");
    }

    #[test]
    fn test_handler_ref_rejects_malformed() {
        for bad in ["HomeController", "@index", "HomeController@", "Home Controller@index"] {
            assert!(bad.parse::<HandlerRef>().is_err(), "{bad:?} should be rejected");
        }
    }
}
