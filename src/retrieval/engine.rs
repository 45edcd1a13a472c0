//! Retrieval engine: the authenticated pagination loop.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::api::{ApiConfig, ApiReply, ApiResult, QueryResponse, ResponseParser, Transport};
use crate::cancel::CancelSignal;
use crate::metrics;
use crate::query::{PageOptions, Query, Selector, TimeRange};
use crate::retrieval::config::{calculate_backoff, EngineConfig};
use crate::retrieval::progress::Progress;
use crate::retrieval::{FailureReason, RetrievalError};
use crate::session::{AuthorizedHeader, Authorizer, SessionManager};
use crate::Record;

/// Result of one page request before expiry handling.
enum PageOutcome {
    Page(QueryResponse),
    Expired,
}

/// Drives paginated retrievals over a shared, authorized session.
///
/// Pages of one retrieval are fetched sequentially because each cursor
/// depends on the previous page's record count. Independent retrievals may
/// run concurrently on the same engine.
pub struct RetrievalEngine {
    authorizer: Arc<dyn Authorizer>,
    transport: Arc<dyn Transport>,
    api: ApiConfig,
    config: EngineConfig,
    cancel: Option<CancelSignal>,
}

impl RetrievalEngine {
    /// Engine over an explicit authorizer and transport.
    pub fn new(
        authorizer: Arc<dyn Authorizer>,
        transport: Arc<dyn Transport>,
        api: ApiConfig,
    ) -> Self {
        Self {
            authorizer,
            transport,
            api,
            config: EngineConfig::default(),
            cancel: None,
        }
    }

    /// Engine sharing the session's transport and endpoint configuration.
    pub fn from_session(session: Arc<SessionManager>) -> Self {
        let transport = session.transport();
        let api = session.api().clone();
        Self::new(session, transport, api)
    }

    /// Override tuning.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a cancellation signal.
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Retrieve every record of `selector` within `range`.
    ///
    /// # Errors
    /// - [`RetrievalError::Query`] if `page_size` is zero
    /// - [`RetrievalError::Session`] if the initial authorization fails
    /// - [`RetrievalError::Failed`] if the page loop stops early; the error
    ///   carries the records retrieved so far
    pub async fn retrieve(
        &self,
        range: &TimeRange,
        selector: Selector,
        page_size: u32,
    ) -> Result<Vec<Record>, RetrievalError> {
        let span = info_span!(
            "retrieve",
            device_id = selector.device_id,
            field_address = selector.field_address
        );
        self.retrieve_inner(range, selector, page_size)
            .instrument(span)
            .await
    }

    /// Retrieve several fields of one device concurrently.
    ///
    /// Outcomes are returned in the order of `field_addresses`; one field
    /// failing does not affect the others.
    pub async fn retrieve_fields(
        &self,
        range: &TimeRange,
        device_id: u32,
        field_addresses: &[u32],
        page_size: u32,
    ) -> Vec<(Selector, Result<Vec<Record>, RetrievalError>)> {
        let selectors: Vec<Selector> = field_addresses
            .iter()
            .map(|&field_address| Selector::new(device_id, field_address))
            .collect();

        info!(
            device_id,
            fields = selectors.len(),
            range = %range,
            "Retrieving fields concurrently"
        );

        let outcomes = join_all(
            selectors
                .iter()
                .map(|&selector| self.retrieve(range, selector, page_size)),
        )
        .await;

        selectors.into_iter().zip(outcomes).collect()
    }

    async fn retrieve_inner(
        &self,
        range: &TimeRange,
        selector: Selector,
        page_size: u32,
    ) -> Result<Vec<Record>, RetrievalError> {
        let mut options = PageOptions::new(page_size)?.with_sort(self.config.sort);
        let mut header = self.authorizer.ensure_authorized().await?;
        let started = Instant::now();
        let mut records: Vec<Record> = Vec::new();
        let mut pages = 0usize;

        info!(range = %range, page_size, "Starting retrieval");

        loop {
            if self.is_cancelled() {
                return Err(Self::fail(selector, FailureReason::Cancelled, records));
            }

            if pages >= self.config.max_pages {
                let reason = FailureReason::PageLimitExceeded {
                    max_pages: self.config.max_pages,
                };
                return Err(Self::fail(selector, reason, records));
            }

            let query = Query::new(range.clone(), selector, options);
            let page = match self.fetch_page(&query, &mut header).await {
                Ok(page) => page,
                Err(reason) => return Err(Self::fail(selector, reason, records)),
            };
            pages += 1;

            let returned = page.records.len();
            let progress =
                Progress::new(page.progress.total, options.limit(), options.skip()).advance(returned);
            records.extend(page.records);
            metrics::record_page(returned);

            debug!(
                page = pages,
                skip = options.skip(),
                returned,
                total = progress.total,
                progress = %progress,
                "Page retrieved"
            );

            if progress.is_complete() {
                info!(
                    pages,
                    records = records.len(),
                    total = progress.total,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Retrieval complete"
                );
                metrics::record_retrieval_completed(started.elapsed());
                return Ok(records);
            }

            if returned == 0 {
                let reason = FailureReason::StalledPagination {
                    skip: progress.skip,
                    total: progress.total,
                };
                return Err(Self::fail(selector, reason, records));
            }

            options = progress.next_page(options);
        }
    }

    /// Fetch one page, re-authorizing once if the token has expired.
    async fn fetch_page(
        &self,
        query: &Query,
        header: &mut AuthorizedHeader,
    ) -> Result<QueryResponse, FailureReason> {
        match self.request_page(query, header).await? {
            PageOutcome::Page(page) => Ok(page),
            PageOutcome::Expired => {
                warn!(
                    skip = query.options().skip(),
                    generation = header.generation(),
                    "Access token rejected, re-authorizing before retrying page"
                );
                *header = self
                    .authorizer
                    .reauthorize(header)
                    .await
                    .map_err(|e| FailureReason::AuthExpiredRetryFailed(e.to_string()))?;

                match self.request_page(query, header).await? {
                    PageOutcome::Page(page) => Ok(page),
                    PageOutcome::Expired => Err(FailureReason::AuthExpiredRetryFailed(
                        "token rejected again after re-authorization".to_string(),
                    )),
                }
            }
        }
    }

    /// Issue one page request, retrying transient failures if configured.
    async fn request_page(
        &self,
        query: &Query,
        header: &AuthorizedHeader,
    ) -> Result<PageOutcome, FailureReason> {
        let url = self.api.data_url(self.authorizer.project(), query);
        let max_attempts = self.config.max_transport_retries + 1;
        let mut attempt = 0u32;

        loop {
            let started = Instant::now();
            let failure = match self.send(&url, header).await? {
                Ok(reply) => {
                    metrics::record_api_request("data", reply.status, started.elapsed());
                    if reply.is_success() {
                        return ResponseParser::parse_data_page(&reply.body)
                            .map(PageOutcome::Page)
                            .map_err(|e| FailureReason::Transport(e.to_string()));
                    }
                    if reply.is_unauthorized() {
                        return Ok(PageOutcome::Expired);
                    }
                    if !reply.is_retryable() {
                        return Err(FailureReason::Transport(reply.into_error().to_string()));
                    }
                    reply.into_error().to_string()
                }
                Err(e) => e.to_string(),
            };

            if attempt + 1 >= max_attempts {
                return Err(FailureReason::Transport(failure));
            }

            let backoff = calculate_backoff(attempt);
            warn!(
                attempt = attempt + 1,
                max_attempts,
                backoff_ms = backoff.as_millis() as u64,
                "Page request failed, retrying: {}",
                failure
            );
            self.sleep_unless_cancelled(backoff).await?;
            attempt += 1;
        }
    }

    /// Run the transport call, abandoning it if cancellation is requested.
    async fn send(
        &self,
        url: &str,
        header: &AuthorizedHeader,
    ) -> Result<ApiResult<ApiReply>, FailureReason> {
        let request = self.transport.get(url, header.as_str());
        match &self.cancel {
            Some(cancel) => tokio::select! {
                reply = request => Ok(reply),
                _ = cancel.cancelled() => Err(FailureReason::Cancelled),
            },
            None => Ok(request.await),
        }
    }

    async fn sleep_unless_cancelled(&self, duration: std::time::Duration) -> Result<(), FailureReason> {
        match &self.cancel {
            Some(cancel) => tokio::select! {
                _ = tokio::time::sleep(duration) => Ok(()),
                _ = cancel.cancelled() => Err(FailureReason::Cancelled),
            },
            None => {
                tokio::time::sleep(duration).await;
                Ok(())
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|cancel| cancel.is_cancelled())
            .unwrap_or(false)
    }

    fn fail(selector: Selector, reason: FailureReason, partial: Vec<Record>) -> RetrievalError {
        warn!(
            reason = %reason,
            retrieved = partial.len(),
            "Retrieval failed"
        );
        metrics::record_retrieval_failed(reason.label());
        RetrievalError::Failed {
            selector,
            reason,
            partial,
        }
    }
}
