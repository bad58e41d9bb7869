//! Server configuration.
//!
//! `ServerConfig` decides how resource locations are rendered in `meta` and
//! `Location` headers, and how strictly PATCH paths are interpreted.

use crate::error::ConfigError;

/// What to do with PATCH operations whose path is not understood.
///
/// Covers paths outside the supported filter grammar and attribute names that
/// are not part of the resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathPolicy {
    /// Drop the operation and keep going. Partially-understood clients keep
    /// working.
    #[default]
    Ignore,
    /// Fail the whole request with 400 `invalidPath`. Nothing is written.
    Reject,
}

/// Configuration for resource locations and PATCH strictness.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Scheme and authority the server is reachable at, e.g. `https://scim.example.com`.
    pub base_url: String,

    /// Path the SCIM endpoints are mounted under, e.g. `/scim/v2`.
    pub base_path: String,

    /// Handling of unrecognized PATCH paths.
    pub path_policy: PathPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            base_path: "/scim/v2".to_string(),
            path_policy: PathPolicy::Ignore,
        }
    }
}

impl ServerConfig {
    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the base path.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Set the PATCH path policy.
    pub fn with_path_policy(mut self, path_policy: PathPolicy) -> Self {
        self.path_policy = path_policy;
        self
    }

    /// Validate the configuration.
    ///
    /// The base URL must be an absolute http(s) URL without a trailing slash.
    /// The base path must be empty or start with `/` and not end with one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let authority = self
            .base_url
            .strip_prefix("https://")
            .or_else(|| self.base_url.strip_prefix("http://"));

        match authority {
            Some(rest) if !rest.is_empty() && !rest.ends_with('/') => {}
            _ => return Err(ConfigError::InvalidBaseUrl(self.base_url.clone())),
        }

        if !self.base_path.is_empty()
            && (!self.base_path.starts_with('/') || self.base_path.ends_with('/'))
        {
            return Err(ConfigError::InvalidBasePath(self.base_path.clone()));
        }

        Ok(())
    }

    /// Absolute location of a resource: `<base_url><base_path>/<endpoint>/<id>`.
    pub fn location(&self, endpoint: &str, id: &str) -> String {
        format!("{}{}/{}/{}", self.base_url, self.base_path, endpoint, id)
    }
}
