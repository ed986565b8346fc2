//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The pluggable [`Transport`] boundary and its `reqwest` implementation
//! - Building HTTP clients with proper user agent strings
//! - GET requests for pages that are being crawled
//! - Lightweight HEAD (falling back to GET) existence probes for links and images
//! - Redirect following with scope and robots.txt checks on every hop
//! - Timeout enforcement and error classification

use crate::config::UserAgentConfig;
use crate::state::{CrawlScope, FailureReason, PageStatus};
use crate::url::{resolve_link, NormalizedUrl};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// HTTP method used by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
}

/// Raw response handed back by a [`Transport`]
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// `Location` of a redirect response
    pub fn redirect_location(&self) -> Option<&str> {
        if !matches!(self.status, 301 | 302 | 303 | 307 | 308) {
            return None;
        }
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Category of a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

/// A request that produced no HTTP response
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout() -> Self {
        Self::new(TransportErrorKind::Timeout, "Request timeout")
    }

    pub fn reason(&self) -> FailureReason {
        match self.kind {
            TransportErrorKind::Timeout => FailureReason::Timeout,
            TransportErrorKind::Connect => FailureReason::Connection(self.message.clone()),
            TransportErrorKind::Other => FailureReason::Transport(self.message.clone()),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout()
        } else if e.is_connect() {
            Self::new(TransportErrorKind::Connect, e.to_string())
        } else {
            Self::new(TransportErrorKind::Other, e.to_string())
        }
    }
}

/// The HTTP boundary of the crawler
///
/// Implementations must not raise on non-2xx statuses: those are ordinary
/// responses. Only failures that produce no response at all are errors.
/// Redirects are returned as-is; [`PageFetcher`] follows them so every hop
/// can be checked against the crawl's scope and robots.txt.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(
        &self,
        method: Method,
        url: &NormalizedUrl,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_inspector::config::UserAgentConfig;
/// use site_inspector::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Transport`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(
        &self,
        method: Method,
        url: &NormalizedUrl,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let target = url.request_url().as_str();
        let request = match method {
            Method::Get => self.client.get(target),
            Method::Head => self.client.head(target),
        };

        let response = request.timeout(timeout).send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = match method {
            Method::Head => Vec::new(),
            Method::Get => response.bytes().await?.to_vec(),
        };

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Result of fetching a page that is being crawled
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Where the page was finally served from, after redirects; relative
    /// links on the page resolve against this
    pub url: NormalizedUrl,
    pub status: PageStatus,
    pub content_type: Option<String>,
    pub body: Option<String>,
}

impl FetchedPage {
    /// Returns true when the body should be handed to the HTML parser
    ///
    /// A missing Content-Type is given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            None => true,
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            }
        }
    }
}

/// Outcome of an existence probe
pub type ProbeOutcome = Result<(), FailureReason>;

/// End of a redirect chain
#[derive(Debug)]
enum Hop {
    /// A non-redirect response, and the URL that produced it
    Arrived(RawResponse, NormalizedUrl),

    /// A redirect pointed somewhere that may not be requested
    Blocked(NormalizedUrl),
}

/// Run-wide memo of probe outcomes keyed by target URL
#[derive(Debug, Clone, Default)]
pub struct ProbeCache {
    inner: Arc<Mutex<HashMap<NormalizedUrl, ProbeOutcome>>>,
}

impl ProbeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &NormalizedUrl) -> Option<ProbeOutcome> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    pub fn insert(&self, url: NormalizedUrl, outcome: ProbeOutcome) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(url)
            .or_insert(outcome);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-worker fetcher wrapping the shared transport
///
/// Every worker builds its own `PageFetcher`; only the transport and the
/// probe cache are shared.
pub struct PageFetcher {
    transport: Arc<dyn Transport>,
    page_timeout: Duration,
    probe_timeout: Duration,
    probes: ProbeCache,
}

impl PageFetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        page_timeout: Duration,
        probe_timeout: Duration,
        probes: ProbeCache,
    ) -> Self {
        Self {
            transport,
            page_timeout,
            probe_timeout,
            probes,
        }
    }

    /// Sends one request, enforcing `timeout` regardless of the transport
    async fn send(
        &self,
        method: Method,
        url: &NormalizedUrl,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        match tokio::time::timeout(timeout, self.transport.fetch(method, url, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::timeout()),
        }
    }

    /// Sends a request and follows redirects until `blocked` rejects a hop
    ///
    /// Each hop gets the full `timeout`.
    async fn follow(
        &self,
        method: Method,
        url: &NormalizedUrl,
        timeout: Duration,
        blocked: impl Fn(&NormalizedUrl) -> bool,
    ) -> Result<Hop, TransportError> {
        let mut current = url.clone();

        for _ in 0..=MAX_REDIRECTS {
            let response = self.send(method, &current, timeout).await?;
            let next = response
                .redirect_location()
                .and_then(|location| resolve_link(location, &current));

            let Some(next) = next else {
                return Ok(Hop::Arrived(response, current));
            };
            if blocked(&next) {
                tracing::debug!("Not following redirect {} -> {}", current, next);
                return Ok(Hop::Blocked(next));
            }

            tracing::trace!("Following redirect {} -> {}", current, next);
            current = next;
        }

        Err(TransportError::new(
            TransportErrorKind::Other,
            format!("more than {} redirects from {}", MAX_REDIRECTS, url),
        ))
    }

    /// Fetches an arbitrary document (used for robots.txt)
    pub async fn fetch_document(&self, url: &NormalizedUrl) -> Result<RawResponse, TransportError> {
        match self.follow(Method::Get, url, self.page_timeout, |_| false).await? {
            Hop::Arrived(response, _) => Ok(response),
            Hop::Blocked(target) => Err(TransportError::new(
                TransportErrorKind::Other,
                format!("redirect to {} not followed", target),
            )),
        }
    }

    /// Fetches a page that is being crawled
    ///
    /// Never fails: connection errors, timeouts and non-2xx statuses all come
    /// back as a [`PageStatus`]. A redirect that leaves `scope` or enters a
    /// path robots.txt disallows is not followed and yields
    /// [`PageStatus::Redirected`]. The outcome also seeds the probe cache so
    /// later links to this page are not probed again.
    pub async fn fetch(&self, url: &NormalizedUrl, scope: &CrawlScope) -> FetchedPage {
        let hop = self
            .follow(Method::Get, url, self.page_timeout, |next| {
                !scope.is_in_scope(next) || !scope.is_allowed(next)
            })
            .await;

        let page = match hop {
            Ok(Hop::Arrived(response, final_url)) if response.is_success() => FetchedPage {
                url: final_url,
                status: PageStatus::Ok,
                content_type: response.content_type().map(str::to_string),
                body: Some(response.text()),
            },
            Ok(Hop::Arrived(response, final_url)) => FetchedPage {
                url: final_url,
                status: PageStatus::HttpError(response.status),
                content_type: response.content_type().map(str::to_string),
                body: None,
            },
            Ok(Hop::Blocked(target)) => FetchedPage {
                url: url.clone(),
                status: PageStatus::Redirected(target.to_string()),
                content_type: None,
                body: None,
            },
            Err(e) => {
                tracing::debug!("Fetch of {} failed: {}", url, e);
                FetchedPage {
                    url: url.clone(),
                    status: PageStatus::FetchError(e.reason()),
                    content_type: None,
                    body: None,
                }
            }
        };

        let outcome = match page.status.failure_reason() {
            None => Ok(()),
            Some(reason) => Err(reason),
        };
        self.probes.insert(url.clone(), outcome);

        page
    }

    /// Checks that a link or image target exists
    ///
    /// # Request Flow
    ///
    /// 1. Return the cached outcome if this target was already probed
    /// 2. Send HEAD; a 2xx answer means the target exists
    /// 3. Otherwise (non-2xx, or a failure other than a timeout) retry once
    ///    with GET, since many servers reject or mishandle HEAD
    /// 4. The GET result is final
    ///
    /// Redirects are followed, except into same-site paths robots.txt
    /// disallows; such a target counts as existing.
    pub async fn probe(&self, url: &NormalizedUrl, scope: &CrawlScope) -> ProbeOutcome {
        if let Some(outcome) = self.probes.get(url) {
            tracing::trace!("Probe cache hit for {}", url);
            return outcome;
        }

        let blocked = |next: &NormalizedUrl| scope.is_in_scope(next) && !scope.is_allowed(next);
        let outcome = match self.follow(Method::Head, url, self.probe_timeout, blocked).await {
            Ok(Hop::Arrived(response, _)) if response.is_success() => Ok(()),
            Ok(Hop::Blocked(_)) => Ok(()),
            Err(e) if e.kind == TransportErrorKind::Timeout => Err(FailureReason::Timeout),
            _ => match self.follow(Method::Get, url, self.probe_timeout, blocked).await {
                Ok(Hop::Arrived(response, _)) if response.is_success() => Ok(()),
                Ok(Hop::Arrived(response, _)) => Err(FailureReason::HttpStatus(response.status)),
                Ok(Hop::Blocked(_)) => Ok(()),
                Err(e) => Err(e.reason()),
            },
        };

        tracing::trace!("Probed {}: {:?}", url, outcome);
        self.probes.insert(url.clone(), outcome.clone());
        outcome
    }
}
