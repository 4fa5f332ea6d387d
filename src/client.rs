//! Message Source Client.
//!
//! Fetches one page of the upstream `/messages/` collection. The upstream is
//! known to be picky: depending on the deployment it rejects one URL scheme or
//! requests without browser-like headers. Every page request therefore walks
//! [`FALLBACK_POLICY`] until one combination is accepted.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{redirect, ClientBuilder};
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::message::Page;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Statuses meaning "this scheme/header combination is rejected, try the next".
const REJECTED_STATUSES: [u16; 2] = [400, 401];

const MAX_REDIRECTS: usize = 10;
const ERROR_BODY_CHARS: usize = 300;
const LOG_BODY_CHARS: usize = 200;

/// Anything able to serve one page of messages.
pub trait PageSource {
    fn fetch_page(&self, skip: usize, limit: usize) -> impl Future<Output = Result<Page>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// The base URL exactly as configured.
    Configured,
    /// The configured host with `http` and `https` swapped.
    Flipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProfile {
    Bare,
    AcceptJson,
    Browser,
}

impl HeaderProfile {
    pub fn headers(self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if matches!(self, HeaderProfile::AcceptJson | HeaderProfile::Browser) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        if self == HeaderProfile::Browser {
            headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        }
        headers
    }

    pub fn label(self) -> &'static str {
        match self {
            HeaderProfile::Bare => "bare",
            HeaderProfile::AcceptJson => "accept-json",
            HeaderProfile::Browser => "browser",
        }
    }
}

/// Attempt order for a single page: every header profile on the configured
/// scheme, then every header profile on the flipped scheme.
pub const FALLBACK_POLICY: [(Scheme, HeaderProfile); 6] = [
    (Scheme::Configured, HeaderProfile::Bare),
    (Scheme::Configured, HeaderProfile::AcceptJson),
    (Scheme::Configured, HeaderProfile::Browser),
    (Scheme::Flipped, HeaderProfile::Bare),
    (Scheme::Flipped, HeaderProfile::AcceptJson),
    (Scheme::Flipped, HeaderProfile::Browser),
];

/// Swaps `https` and `http`. A base without a scheme becomes `https`.
pub fn flip_scheme(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if let Some(rest) = base.strip_prefix("https://") {
        format!("http://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("https://{}", rest)
    } else {
        format!("https://{}", base)
    }
}

pub fn messages_url(base: &str) -> String {
    format!("{}/messages/", base.trim_end_matches('/'))
}

fn snippet(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}

#[derive(Debug, Clone)]
pub struct MessagesClient {
    base: String,
    timeout: Duration,
}

impl MessagesClient {
    pub fn new(base: impl Into<String>, timeout: Duration) -> Self {
        MessagesClient {
            base: base.into(),
            timeout,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn base_for(&self, scheme: Scheme) -> String {
        match scheme {
            Scheme::Configured => self.base.trim_end_matches('/').to_string(),
            Scheme::Flipped => flip_scheme(&self.base),
        }
    }

    /// One HTTP round trip. The client lives only for this attempt.
    async fn attempt(&self, url: &str, profile: HeaderProfile, skip: usize, limit: usize) -> Result<Page> {
        let client = ClientBuilder::new()
            .timeout(self.timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .default_headers(profile.headers())
            .build()?;

        let response = client
            .get(url)
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                url,
                skip,
                limit,
                profile = profile.label(),
                body = %snippet(&body, LOG_BODY_CHARS),
                "Upstream returned an error status"
            );
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                body: snippet(&body, ERROR_BODY_CHARS),
            });
        }

        response
            .json::<Page>()
            .await
            .map_err(|e| AppError::ParseError(format!("Invalid page from {}: {}", url, e)))
    }
}

impl PageSource for MessagesClient {
    async fn fetch_page(&self, skip: usize, limit: usize) -> Result<Page> {
        // A status error outranks a later transport error when reporting failure.
        let mut last_status: Option<AppError> = None;
        let mut last_error: Option<AppError> = None;

        for (scheme, profile) in FALLBACK_POLICY {
            let url = messages_url(&self.base_for(scheme));
            match self.attempt(&url, profile, skip, limit).await {
                Ok(mut page) => {
                    if let Some(items) = page.items.as_mut() {
                        if items.len() > limit {
                            debug!(returned = items.len(), limit, "Truncating oversized page");
                            items.truncate(limit);
                        }
                    }
                    return Ok(page);
                }
                Err(err) => match err.upstream_status() {
                    Some(status) => {
                        if REJECTED_STATUSES.contains(&status) {
                            debug!(status, profile = profile.label(), "Combination rejected, trying next");
                        }
                        last_status = Some(err);
                    }
                    None => {
                        warn!(url = %url, profile = profile.label(), error = %err, "Request to upstream failed");
                        last_error = Some(err);
                    }
                },
            }
        }

        Err(last_status.or(last_error).unwrap_or_else(|| {
            AppError::FetchError(format!("All attempts to fetch {} failed", messages_url(&self.base)))
        }))
    }
}
