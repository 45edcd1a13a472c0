//! Session manager: the sole owner of the access token.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::api::config::AUTH_STRATEGY;
use crate::api::{ApiConfig, ResponseParser, Transport};
use crate::metrics;
use crate::session::{
    AuthorizedHeader, Authorizer, Credentials, SessionError, SessionResult, SessionState,
};

#[derive(Debug)]
struct Session {
    state: SessionState,
    token: Option<String>,
    generation: u64,
    /// Failed re-authorization and the stale generation it was answering
    failed_reauthorization: Option<(u64, SessionError)>,
}

impl Session {
    fn header(&self) -> SessionResult<AuthorizedHeader> {
        match (self.state, &self.token) {
            (SessionState::Authorized, Some(token)) => {
                Ok(AuthorizedHeader::bearer(token, self.generation))
            }
            _ => Err(SessionError::NotAuthorized),
        }
    }
}

/// Owns the authentication lifecycle for one set of credentials.
///
/// Share it across concurrent retrievals with an [`Arc`]. Token reads take a
/// read lock; authorization is serialized so at most one authentication
/// request is ever in flight.
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    api: ApiConfig,
    credentials: Credentials,
    session: RwLock<Session>,
    authorize_lock: Mutex<()>,
}

impl SessionManager {
    /// Create an unauthenticated session.
    pub fn new(transport: Arc<dyn Transport>, api: ApiConfig, credentials: Credentials) -> Self {
        Self {
            transport,
            api,
            credentials,
            session: RwLock::new(Session {
                state: SessionState::Unauthenticated,
                token: None,
                generation: 0,
                failed_reauthorization: None,
            }),
            authorize_lock: Mutex::new(()),
        }
    }

    /// Transport used for authentication (shared with the retrieval engine).
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Endpoint configuration.
    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    /// Credentials this session authenticates with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Current state.
    pub async fn state(&self) -> SessionState {
        self.session.read().await.state
    }

    /// Number of successful authorizations so far.
    pub async fn generation(&self) -> u64 {
        self.session.read().await.generation
    }

    /// Authenticate with the stored credentials.
    ///
    /// One network round trip. On success the token is stored and the
    /// session becomes [`SessionState::Authorized`]; on failure any previous
    /// token is discarded and the session is
    /// [`SessionState::Unauthenticated`].
    ///
    /// # Errors
    /// [`SessionError::AuthorizationFailed`] on a non-2xx reply, a reply
    /// without `accessToken`, or a transport failure.
    pub async fn authorize(&self) -> SessionResult<AuthorizedHeader> {
        let _guard = self.authorize_lock.lock().await;
        self.authorize_locked().await
    }

    /// Caller must hold `authorize_lock`.
    async fn authorize_locked(&self) -> SessionResult<AuthorizedHeader> {
        self.session.write().await.state = SessionState::Authorizing;

        let project = self.credentials.project();
        let email = self.credentials.email();
        let url = self.api.auth_url(project);
        let body = json!({
            "strategy": AUTH_STRATEGY,
            "email": email,
            "password": self.credentials.password(),
        });

        debug!(project = %project, email = %email, "Requesting access token");

        let started = Instant::now();
        let outcome = match self.transport.post_json(&url, &body).await {
            Ok(reply) => {
                metrics::record_api_request("authentication", reply.status, started.elapsed());
                if !reply.is_success() {
                    Err(format!("HTTP {}", reply.status))
                } else {
                    ResponseParser::parse_access_token(&reply.body)
                        .ok_or_else(|| "response did not contain an access token".to_string())
                }
            }
            Err(e) => Err(e.to_string()),
        };

        let mut session = self.session.write().await;
        match outcome {
            Ok(token) => {
                session.generation += 1;
                session.token = Some(token);
                session.failed_reauthorization = None;
                session.state = SessionState::Authorized;
                info!(
                    project = %project,
                    email = %email,
                    generation = session.generation,
                    "Authorized"
                );
                session.header()
            }
            Err(reason) => {
                session.token = None;
                session.state = SessionState::Unauthenticated;
                warn!(project = %project, email = %email, reason = %reason, "Authorization failed");
                Err(SessionError::AuthorizationFailed {
                    project: project.to_string(),
                    email: email.to_string(),
                    reason,
                })
            }
        }
    }
}

#[async_trait]
impl Authorizer for SessionManager {
    fn project(&self) -> &str {
        self.credentials.project()
    }

    async fn ensure_authorized(&self) -> SessionResult<AuthorizedHeader> {
        if let Ok(header) = self.session.read().await.header() {
            return Ok(header);
        }

        let _guard = self.authorize_lock.lock().await;
        // Another task may have finished authorizing while we waited
        if let Ok(header) = self.session.read().await.header() {
            return Ok(header);
        }
        self.authorize_locked().await
    }

    async fn authorized_header(&self) -> SessionResult<AuthorizedHeader> {
        self.session.read().await.header()
    }

    async fn reauthorize(&self, stale: &AuthorizedHeader) -> SessionResult<AuthorizedHeader> {
        let _guard = self.authorize_lock.lock().await;

        {
            let session = self.session.read().await;
            if session.generation != stale.generation() {
                if let Ok(header) = session.header() {
                    debug!(
                        generation = session.generation,
                        "Token already refreshed by a concurrent request"
                    );
                    return Ok(header);
                }
            }
            // A concurrent request already tried to replace this token and failed
            if let Some((generation, error)) = &session.failed_reauthorization {
                if *generation == stale.generation() {
                    debug!(generation, "Re-authorization already failed for this token");
                    return Err(error.clone());
                }
            }
        }

        info!(
            project = %self.credentials.project(),
            stale_generation = stale.generation(),
            "Access token rejected, re-authorizing"
        );
        metrics::record_reauthorization();
        let result = self.authorize_locked().await;
        if let Err(error) = &result {
            self.session.write().await.failed_reauthorization =
                Some((stale.generation(), error.clone()));
        }
        result
    }
}
