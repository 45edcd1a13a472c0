//! Settings supplied by configuration collaborators.
//!
//! The client never reads configuration files. Whatever loads them hands
//! over a [`RetrievalSettings`] value, either directly or through a
//! [`ConfigSource`]. [`EnvConfigSource`] covers the common deployment case of
//! settings passed as environment variables.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::query::{QueryResult, Selector, TimeRange, DEFAULT_PAGE_LIMIT};
use crate::session::Credentials;

/// Default prefix for [`EnvConfigSource`].
pub const DEFAULT_ENV_PREFIX: &str = "ACELERATE";

/// Settings errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required setting absent
    #[error("missing setting: {0}")]
    Missing(String),

    /// Setting present but unusable
    #[error("invalid setting {key}: {reason}")]
    Invalid {
        /// Setting name
        key: String,
        /// What is wrong with it
        reason: String,
    },
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_LIMIT
}

/// Everything needed to run a retrieval, as plain values.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Project (API subdomain)
    pub project: String,
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
    /// Device to query
    pub device_id: u32,
    /// Field addresses to query on the device
    #[serde(alias = "field_address")]
    pub field_addresses: Vec<u32>,
    /// Range start, as date/time text
    pub t_start: String,
    /// Range end, as date/time text
    pub t_end: String,
    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl RetrievalSettings {
    /// Account credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.project, &self.email, &self.password)
    }

    /// Parsed and validated time range.
    pub fn time_range(&self) -> QueryResult<TimeRange> {
        TimeRange::new(&self.t_start, &self.t_end)
    }

    /// One selector per configured field address, in order.
    pub fn selectors(&self) -> Vec<Selector> {
        self.field_addresses
            .iter()
            .map(|&field_address| Selector::new(self.device_id, field_address))
            .collect()
    }
}

impl fmt::Debug for RetrievalSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievalSettings")
            .field("project", &self.project)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("device_id", &self.device_id)
            .field("field_addresses", &self.field_addresses)
            .field("t_start", &self.t_start)
            .field("t_end", &self.t_end)
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Capability: produce retrieval settings.
pub trait ConfigSource {
    /// Load settings.
    fn load(&self) -> Result<RetrievalSettings, ConfigError>;
}

impl ConfigSource for RetrievalSettings {
    fn load(&self) -> Result<RetrievalSettings, ConfigError> {
        Ok(self.clone())
    }
}

/// Reads `{PREFIX}_PROJECT`, `_EMAIL`, `_PASSWORD`, `_DEVICE_ID`,
/// `_FIELD_ADDRESSES` (comma-separated), `_T_START`, `_T_END` and the
/// optional `_PAGE_SIZE`.
#[derive(Debug, Clone)]
pub struct EnvConfigSource {
    prefix: String,
}

impl EnvConfigSource {
    /// Source using a custom variable prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }

    fn optional(&self, name: &str) -> Option<String> {
        std::env::var(self.key(name))
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name)
            .ok_or_else(|| ConfigError::Missing(self.key(name)))
    }

    fn parse_number(&self, name: &str, raw: &str) -> Result<u32, ConfigError> {
        raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
            key: self.key(name),
            reason: format!("{raw:?}: {e}"),
        })
    }
}

impl Default for EnvConfigSource {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }
}

impl ConfigSource for EnvConfigSource {
    fn load(&self) -> Result<RetrievalSettings, ConfigError> {
        let device_id = self.parse_number("DEVICE_ID", &self.required("DEVICE_ID")?)?;

        let field_addresses = self
            .required("FIELD_ADDRESSES")?
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| self.parse_number("FIELD_ADDRESSES", part))
            .collect::<Result<Vec<_>, _>>()?;

        if field_addresses.is_empty() {
            return Err(ConfigError::Missing(self.key("FIELD_ADDRESSES")));
        }

        let page_size = match self.optional("PAGE_SIZE") {
            Some(raw) => self.parse_number("PAGE_SIZE", &raw)?,
            None => DEFAULT_PAGE_LIMIT,
        };

        Ok(RetrievalSettings {
            project: self.required("PROJECT")?,
            email: self.required("EMAIL")?,
            password: self.required("PASSWORD")?,
            device_id,
            field_addresses,
            t_start: self.required("T_START")?,
            t_end: self.required("T_END")?,
            page_size,
        })
    }
}
