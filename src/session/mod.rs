//! Authentication lifecycle
//!
//! The [`SessionManager`] owns the access token for one project/account. It
//! moves through
//!
//! ```text
//! Unauthenticated -> Authorizing -> Authorized
//!                        ^              |
//!                        +-- expiry ----+
//! ```
//!
//! and hands out [`AuthorizedHeader`] values tagged with the *generation* of
//! the authorization that produced them. When several retrievals observe the
//! same expiry, only the first re-authorizes; the rest see that the
//! generation has moved on and reuse the fresh token.
//!
//! Consumers depend on the [`Authorizer`] capability rather than the concrete
//! manager.

use async_trait::async_trait;
use std::fmt;

pub mod manager;

pub use manager::SessionManager;

/// Session errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Credentials rejected, or the authentication endpoint was unusable
    #[error("authorization failed for {email} on project {project}: {reason}")]
    AuthorizationFailed {
        /// Project the credentials belong to
        project: String,
        /// Account email
        email: String,
        /// What went wrong (never contains secrets)
        reason: String,
    },

    /// An authorized operation was attempted without a token
    #[error("session is not authorized")]
    NotAuthorized,
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Authorization state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No token held
    Unauthenticated,
    /// Authentication request in flight
    Authorizing,
    /// Token held and presumed valid
    Authorized,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authorizing => "authorizing",
            SessionState::Authorized => "authorized",
        };
        f.write_str(s)
    }
}

/// Account credentials for one project.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    project: String,
    email: String,
    password: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(
        project: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Project (API subdomain)
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Account email
    pub fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("project", &self.project)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `Authorization` header value plus the session generation it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizedHeader {
    value: String,
    generation: u64,
}

impl AuthorizedHeader {
    pub(crate) fn bearer(token: &str, generation: u64) -> Self {
        Self {
            value: format!("Bearer {token}"),
            generation,
        }
    }

    /// Header value, `Bearer <token>`.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Authorization generation that issued the token.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for AuthorizedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedHeader")
            .field("value", &"Bearer <redacted>")
            .field("generation", &self.generation)
            .finish()
    }
}

/// Capability: produce an authorized header, and refresh it on expiry.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Project the authorization is scoped to.
    fn project(&self) -> &str;

    /// Current header; authorizes first if no token is held.
    async fn ensure_authorized(&self) -> SessionResult<AuthorizedHeader>;

    /// Current header without side effects.
    ///
    /// # Errors
    /// [`SessionError::NotAuthorized`] if no valid token is held.
    async fn authorized_header(&self) -> SessionResult<AuthorizedHeader>;

    /// Replace a token the server rejected. Returns the header to retry with.
    async fn reauthorize(&self, stale: &AuthorizedHeader) -> SessionResult<AuthorizedHeader>;
}
