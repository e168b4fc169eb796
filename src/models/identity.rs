//! Authenticated identity attached to requests by the `auth` middleware.

use serde::Serialize;

use crate::config::CredentialConfig;

/// The user behind an authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// User name from the matching credential
    pub user: String,
    /// Roles granted to the user
    pub roles: Vec<String>,
}

impl Identity {
    pub fn new(user: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            user: user.into(),
            roles,
        }
    }

    /// Check whether the user holds a role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl From<&CredentialConfig> for Identity {
    fn from(credential: &CredentialConfig) -> Self {
        Self::new(credential.user.clone(), credential.roles.clone())
    }
}
