//! Token authentication (`auth`) and role check (`admin`) middleware.
//!
//! # Authentication Methods
//!
//! `auth` accepts a token via:
//! 1. `Authorization: Bearer <token>` header
//! 2. `X-API-Key: <token>` header
//! 3. `?api_key=<token>` query parameter
//!
//! Tokens are configured under `[[auth.credentials]]`. A valid token attaches
//! an [`Identity`] to the request; `admin` then requires that identity to
//! hold the configured admin role.

use axum::{body::Body, http::Request};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

use super::Middleware;
use crate::config::AuthConfig;
use crate::error::{AppError, Result};
use crate::models::Identity;

/// Bearer-token authentication
#[derive(Clone)]
pub struct TokenAuth {
    /// Token to identity, for O(1) lookup
    identities: Arc<HashMap<String, Identity>>,
}

impl TokenAuth {
    pub fn new(config: &AuthConfig) -> Self {
        let identities = config
            .credentials
            .iter()
            .map(|credential| (credential.token.clone(), Identity::from(credential)))
            .collect();

        Self {
            identities: Arc::new(identities),
        }
    }

    fn identify(&self, token: &str) -> Option<&Identity> {
        self.identities.get(token)
    }
}

impl Middleware for TokenAuth {
    fn handle(&self, request: &mut Request<Body>) -> Result<()> {
        let path = request.uri().path().to_string();

        let Some(token) = extract_token(request) else {
            warn!(path = %path, "Missing credentials");
            return Err(AppError::unauthorized("Authentication required"));
        };

        match self.identify(&token) {
            Some(identity) => {
                debug!(path = %path, user = %identity.user, "Authenticated request");
                request.extensions_mut().insert(identity.clone());
                Ok(())
            }
            None => {
                warn!(path = %path, "Invalid token");
                Err(AppError::unauthorized("Invalid credentials"))
            }
        }
    }
}

/// Requires an authenticated identity holding a role
#[derive(Clone)]
pub struct RequireRole {
    role: String,
}

impl RequireRole {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

impl Middleware for RequireRole {
    fn handle(&self, request: &mut Request<Body>) -> Result<()> {
        match request.extensions().get::<Identity>() {
            Some(identity) if identity.has_role(&self.role) => Ok(()),
            Some(identity) => {
                warn!(
                    user = %identity.user,
                    role = %self.role,
                    path = %request.uri().path(),
                    "Missing required role"
                );
                Err(AppError::forbidden(format!("Requires the `{}` role", self.role)))
            }
            None => Err(AppError::unauthorized("Authentication required")),
        }
    }
}

/// Extract a token from the request
fn extract_token<B>(req: &Request<B>) -> Option<String> {
    if let Some(auth_header) = req.headers().get("authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    if let Some(api_key_header) = req.headers().get("x-api-key") {
        if let Ok(key) = api_key_header.to_str() {
            return Some(key.to_string());
        }
    }

    req.uri().query().and_then(|query| {
        query
            .split('&')
            .find_map(|param| param.strip_prefix("api_key="))
            .and_then(|key| urlencoding::decode(key).ok())
            .map(|key| key.into_owned())
    })
}
