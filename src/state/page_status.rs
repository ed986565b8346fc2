/// Page status definitions for recording fetch and probe outcomes
///
/// This module defines how a fetched page ended up and why a page, link or
/// image was considered broken.
use serde::Serialize;
use std::fmt;

/// Why a page, link or image could not be used
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The server answered with a non-2xx status
    HttpStatus(u16),

    /// No complete response arrived within the request timeout
    Timeout,

    /// Connection refused, DNS failure or TLS handshake failure
    Connection(String),

    /// Any other transport-level failure
    Transport(String),

    /// The page was fetched but is not HTML (carries the Content-Type)
    NotHtml(String),

    /// The page body could not be parsed
    Parse(String),
}

impl FailureReason {
    /// Returns true for failures reported by the server rather than the network
    pub fn is_http_error(&self) -> bool {
        matches!(self, Self::HttpStatus(_))
    }

    /// Returns true for failures where no response was received at all
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Connection(_) | Self::Transport(_)
        )
    }

    /// Short machine-friendly label
    pub fn label(&self) -> &'static str {
        match self {
            Self::HttpStatus(_) => "http_status",
            Self::Timeout => "timeout",
            Self::Connection(_) => "connection",
            Self::Transport(_) => "transport",
            Self::NotHtml(_) => "not_html",
            Self::Parse(_) => "parse",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::Timeout => write!(f, "request timed out"),
            Self::Connection(msg) => write!(f, "connection failed: {}", msg),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::NotHtml(content_type) => write!(f, "not HTML (Content-Type: {})", content_type),
            Self::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

/// Outcome of fetching a page that was dequeued for crawling
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum PageStatus {
    /// 2xx response with a body
    Ok,

    /// Non-2xx response
    HttpError(u16),

    /// No usable response (timeout, connection or transport failure)
    FetchError(FailureReason),

    /// Redirected off-site or into a path robots.txt disallows; not followed
    Redirected(String),
}

impl PageStatus {
    /// Returns true if the page was fetched successfully
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns the failure behind this status, if any
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            Self::Ok | Self::Redirected(_) => None,
            Self::HttpError(code) => Some(FailureReason::HttpStatus(*code)),
            Self::FetchError(reason) => Some(reason.clone()),
        }
    }
}

impl From<FailureReason> for PageStatus {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::HttpStatus(code) => Self::HttpError(code),
            other => Self::FetchError(other),
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::HttpError(code) => write!(f, "http_error({})", code),
            Self::FetchError(reason) => write!(f, "fetch_error({})", reason),
            Self::Redirected(target) => write!(f, "redirected({})", target),
        }
    }
}
