//! The immutable route table.
//!
//! # Responsibilities
//! - Flatten route groups into entries (prefixes, namespaces, name prefixes
//!   and middleware compose parent-first)
//! - Reject duplicate names and conflicting patterns at build time
//! - Resolve a method and path to a route, or an explicit no-match
//! - Generate URLs for named routes
//!
//! The table is never mutated after [`RouteTable::build`] returns, so it is
//! shared across request tasks behind an `Arc` without locking.

use axum::http::Method;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

use super::group::{HandlerRef, Member, Route, RouteGroup};
use super::params::PathParams;
use super::pattern::RoutePattern;
use super::RouteError;

/// A fully composed route
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub method: Method,
    pub pattern: RoutePattern,
    pub handler: HandlerRef,
    /// Full name including group name prefixes
    pub name: Option<String>,
    /// Middleware names in execution order, without duplicates
    pub middleware: Vec<String>,
    /// Prefix of the top-level group that declared the route (e.g. `/admin`),
    /// whatever groups are nested inside it
    pub group_prefix: String,
}

/// Result of looking up a request
#[derive(Debug)]
pub enum Resolution {
    Matched(RouteMatch),
    /// The path exists under other methods
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// A matched route with its captured parameters
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteEntry>,
    pub params: PathParams,
}

/// Inherited group settings while flattening
#[derive(Default)]
struct Scope {
    prefix: String,
    group_prefix: String,
    namespace: String,
    name_prefix: String,
    middleware: Vec<String>,
}

impl Scope {
    fn enter(&self, group: &RouteGroup) -> Scope {
        let namespace = match (self.namespace.is_empty(), group.namespace.is_empty()) {
            (_, true) => self.namespace.clone(),
            (true, false) => group.namespace.clone(),
            (false, false) => format!("{}::{}", self.namespace, group.namespace),
        };

        let prefix = join_paths(&self.prefix, &group.prefix);
        let group_prefix = if self.group_prefix.is_empty() {
            prefix.clone()
        } else {
            self.group_prefix.clone()
        };

        Scope {
            prefix,
            group_prefix,
            namespace,
            name_prefix: format!("{}{}", self.name_prefix, group.name_prefix),
            middleware: merge_middleware(&self.middleware, &group.middleware),
        }
    }
}

fn join_paths(parent: &str, child: &str) -> String {
    let parent = parent.trim_matches('/');
    let child = child.trim_matches('/');
    match (parent.is_empty(), child.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", child),
        (false, true) => format!("/{}", parent),
        (false, false) => format!("/{}/{}", parent, child),
    }
}

fn merge_middleware(parent: &[String], child: &[String]) -> Vec<String> {
    let mut merged = parent.to_vec();
    for name in child {
        if !merged.contains(name) {
            merged.push(name.clone());
        }
    }
    merged
}

/// Immutable, ordered route table
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Arc<RouteEntry>>,
    by_name: HashMap<String, usize>,
}

impl RouteTable {
    /// Build a table from route groups, in registration order.
    ///
    /// # Errors
    /// Fails on the first invalid pattern, malformed handler reference,
    /// duplicate route name, or pattern conflicting with or shadowed by an
    /// earlier route under the same method.
    pub fn build<I>(groups: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = RouteGroup>,
    {
        let mut table = Self::default();
        let root = Scope::default();

        for group in groups {
            table.add_group(&root.enter(&group), &group)?;
        }

        Ok(table)
    }

    fn add_group(&mut self, scope: &Scope, group: &RouteGroup) -> Result<(), RouteError> {
        for member in &group.members {
            match member {
                Member::Route(route) => self.add_route(scope, route)?,
                Member::Group(child) => self.add_group(&scope.enter(child), child)?,
            }
        }
        Ok(())
    }

    fn add_route(&mut self, scope: &Scope, route: &Route) -> Result<(), RouteError> {
        let pattern = RoutePattern::parse(&join_paths(&scope.prefix, &route.pattern))?;
        let handler = HandlerRef::parse_in(&scope.namespace, &route.handler)?;
        let name = route
            .name
            .as_ref()
            .map(|name| format!("{}{}", scope.name_prefix, name));

        if let Some(name) = &name {
            if self.by_name.contains_key(name) {
                return Err(RouteError::DuplicateName { name: name.clone() });
            }
        }

        if let Some(existing) = self
            .routes
            .iter()
            .find(|r| r.method == route.method && r.pattern.same_shape(&pattern))
        {
            return Err(RouteError::ConflictingPattern {
                method: route.method.to_string(),
                pattern: pattern.to_string(),
                existing: existing.pattern.to_string(),
            });
        }

        // An earlier route that matches every path of this one wins them all
        let sample = pattern.sample_path();
        if let Some(existing) = self
            .routes
            .iter()
            .find(|r| r.method == route.method && r.pattern.matches(&sample).is_some())
        {
            return Err(RouteError::ShadowedPattern {
                method: route.method.to_string(),
                pattern: pattern.to_string(),
                existing: existing.pattern.to_string(),
            });
        }

        debug!(
            method = %route.method,
            pattern = %pattern,
            name = name.as_deref().unwrap_or("-"),
            handler = %handler,
            "Registered route"
        );

        let entry = RouteEntry {
            method: route.method.clone(),
            pattern,
            handler,
            name: name.clone(),
            middleware: merge_middleware(&scope.middleware, &route.middleware),
            group_prefix: scope.group_prefix.clone(),
        };

        if let Some(name) = name {
            self.by_name.insert(name, self.routes.len());
        }
        self.routes.push(Arc::new(entry));

        Ok(())
    }

    /// Resolve a request. The first registered match wins; `HEAD` is served
    /// by `GET` routes and listed as allowed wherever `GET` is.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution {
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };

            if route.method == *method || (*method == Method::HEAD && route.method == Method::GET)
            {
                return Resolution::Matched(RouteMatch {
                    route: Arc::clone(route),
                    params,
                });
            }

            if !allowed.contains(&route.method) {
                allowed.push(route.method.clone());
            }
            if route.method == Method::GET && !allowed.contains(&Method::HEAD) {
                allowed.push(Method::HEAD);
            }
        }

        if allowed.is_empty() {
            Resolution::NotFound
        } else {
            Resolution::MethodNotAllowed(allowed)
        }
    }

    /// Look up a route by its full name
    pub fn get(&self, name: &str) -> Option<&Arc<RouteEntry>> {
        self.by_name.get(name).map(|&index| &self.routes[index])
    }

    /// All routes in registration order
    pub fn routes(&self) -> impl Iterator<Item = &Arc<RouteEntry>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Every middleware name referenced by any route
    pub fn middleware_names(&self) -> BTreeSet<&str> {
        self.routes
            .iter()
            .flat_map(|route| route.middleware.iter().map(String::as_str))
            .collect()
    }

    /// Generate the path of a named route.
    ///
    /// Parameters not used by the pattern are appended as a query string,
    /// in the order given.
    ///
    /// # Errors
    /// `UnknownRoute` if no route has this name, `MissingParameter` if a
    /// pattern parameter has no value.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError> {
        let route = self.get(name).ok_or_else(|| RouteError::UnknownRoute {
            name: name.to_string(),
        })?;

        let lookup = |param: &str| {
            params
                .iter()
                .find(|(key, _)| *key == param)
                .map(|(_, value)| (*value).to_string())
        };

        let mut path = route
            .pattern
            .to_path(lookup)
            .map_err(|param| RouteError::MissingParameter {
                route: name.to_string(),
                param,
            })?;

        let used: Vec<&str> = route.pattern.param_names().collect();
        let query: Vec<String> = params
            .iter()
            .filter(|(key, _)| !used.contains(key))
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect();

        if !query.is_empty() {
            path.push('?');
            path.push_str(&query.join("&"));
        }

        Ok(path)
    }
}
