//! API endpoint configuration
//!
//! Every project is served from its own subdomain of the dispatcher host:
//!
//! - Authentication: `{scheme}://{project}.{host}/api/authentication`
//! - Data: `{scheme}://{project}.{host}/api/data?{query}`
//!
//! The project name is lower-cased when forming the subdomain.

use crate::query::Query;

/// Production dispatcher host.
pub const DEFAULT_API_HOST: &str = "sr.dispatcher.acelerex.com";

/// Default URL scheme.
pub const DEFAULT_SCHEME: &str = "https";

/// Authentication endpoint path
pub const AUTHENTICATION_PATH: &str = "api/authentication";

/// Data endpoint path
pub const DATA_PATH: &str = "api/data";

/// Authentication strategy sent with credentials.
pub const AUTH_STRATEGY: &str = "local";

/// Endpoint layout for the dispatcher API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// URL scheme (`https` in production)
    pub scheme: String,
    /// Host that project subdomains hang off
    pub host: String,
}

impl ApiConfig {
    /// Configuration for a custom host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: host.into(),
        }
    }

    /// Override the URL scheme (e.g. `http` for a local test server).
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Authentication URL for a project.
    pub fn auth_url(&self, project: &str) -> String {
        self.build_url(project, AUTHENTICATION_PATH, None)
    }

    /// Data URL for a project and query.
    pub fn data_url(&self, project: &str, query: &Query) -> String {
        self.build_url(project, DATA_PATH, Some(&query.to_query_string()))
    }

    fn build_url(&self, project: &str, path: &str, query: Option<&str>) -> String {
        let base = format!(
            "{}://{}.{}/{}",
            self.scheme,
            project.to_lowercase(),
            self.host,
            path
        );
        match query {
            Some(query) => format!("{base}?{query}"),
            None => base,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_HOST)
    }
}
