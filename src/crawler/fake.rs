//! In-memory transport used by unit tests

use crate::crawler::fetcher::{Method, RawResponse, Transport, TransportError, TransportErrorKind};
use crate::url::NormalizedUrl;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, LOCATION};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Route {
    Body {
        status: u16,
        content_type: &'static str,
        body: String,
    },
    Redirect {
        status: u16,
        location: String,
    },
    Error(TransportErrorKind),
}

/// Serves canned responses keyed by normalized URL; anything unknown is a 404
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    routes: HashMap<String, Route>,
    delays: HashMap<String, Duration>,
    reject_head: bool,
    log: Mutex<Vec<(Method, String)>>,
}

fn key(url: &str) -> String {
    NormalizedUrl::parse(url)
        .map(|u| u.as_str().to_string())
        .unwrap_or_else(|_| url.to_string())
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(self, url: &str, html: &str) -> Self {
        self.body(url, 200, "text/html; charset=utf-8", html)
    }

    pub(crate) fn status(self, url: &str, status: u16) -> Self {
        self.body(url, status, "text/html", "")
    }

    pub(crate) fn body(
        mut self,
        url: &str,
        status: u16,
        content_type: &'static str,
        body: &str,
    ) -> Self {
        self.routes.insert(
            key(url),
            Route::Body {
                status,
                content_type,
                body: body.to_string(),
            },
        );
        self
    }

    pub(crate) fn redirect(mut self, url: &str, status: u16, location: &str) -> Self {
        self.routes.insert(
            key(url),
            Route::Redirect {
                status,
                location: location.to_string(),
            },
        );
        self
    }

    pub(crate) fn error(mut self, url: &str, kind: TransportErrorKind) -> Self {
        self.routes.insert(key(url), Route::Error(kind));
        self
    }

    pub(crate) fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(key(url), delay);
        self
    }

    /// Answer every HEAD request with 405
    pub(crate) fn reject_head(mut self) -> Self {
        self.reject_head = true;
        self
    }

    pub(crate) fn count(&self, method: Method, url: &str) -> usize {
        let wanted = key(url);
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, u)| *m == method && *u == wanted)
            .count()
    }

    pub(crate) fn requested(&self, url: &str) -> bool {
        self.count(Method::Get, url) + self.count(Method::Head, url) > 0
    }

    pub(crate) fn gets(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| *m == Method::Get)
            .map(|(_, u)| u.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch(
        &self,
        method: Method,
        url: &NormalizedUrl,
        _timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let key = url.as_str().to_string();
        self.log.lock().unwrap().push((method, key.clone()));

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }

        if self.reject_head && method == Method::Head {
            return Ok(RawResponse {
                status: 405,
                headers: HeaderMap::new(),
                body: Vec::new(),
            });
        }

        match self.routes.get(&key) {
            Some(Route::Body {
                status,
                content_type,
                body,
            }) => {
                let mut headers = HeaderMap::new();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(*content_type));
                Ok(RawResponse {
                    status: *status,
                    headers,
                    body: match method {
                        Method::Get => body.clone().into_bytes(),
                        Method::Head => Vec::new(),
                    },
                })
            }
            Some(Route::Redirect { status, location }) => {
                let mut headers = HeaderMap::new();
                headers.insert(LOCATION, HeaderValue::from_str(location).unwrap());
                Ok(RawResponse {
                    status: *status,
                    headers,
                    body: Vec::new(),
                })
            }
            Some(Route::Error(kind)) => Err(TransportError::new(*kind, "simulated failure")),
            None => Ok(RawResponse {
                status: 404,
                headers: HeaderMap::new(),
                body: Vec::new(),
            }),
        }
    }
}
