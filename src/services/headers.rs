//! Security header check.
//!
//! Sends a `HEAD` request to the domain root over HTTPS and, if that fails at
//! the network level, over plain HTTP. The first response received, whatever
//! its status code, is checked against [`SECURITY_HEADERS`]. Certificate
//! errors are ignored so that misconfigured TLS does not hide the headers.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{redirect, Client};

use crate::errors::{error_chain, AppError};
use crate::models::scan::{format_score, SecurityHeaders, SECURITY_HEADERS};

/// Schemes tried in order; the first one that answers wins.
const SCHEMES: [&str; 2] = ["https", "http"];

/// Maximum redirect hops followed per attempt.
const MAX_REDIRECTS: usize = 10;

/// Outcome of a single request attempt.
#[derive(Debug)]
pub enum HeaderAttempt {
    Responded(HeaderMap),
    Failed(String),
}

/// Checks domains for the presence of security response headers.
#[derive(Debug, Clone)]
pub struct SecurityHeaderChecker {
    client: Client,
}

impl SecurityHeaderChecker {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!("DomainRecon/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Request `domain` and report which security headers it sends.
    ///
    /// `domain` is used verbatim as the URL authority, so `host:port` works.
    pub async fn check(&self, domain: &str) -> SecurityHeaders {
        let urls: Vec<String> = SCHEMES
            .iter()
            .map(|scheme| format!("{scheme}://{domain}/"))
            .collect();
        self.check_urls(&urls).await
    }

    /// Try `urls` in order and evaluate the first one that responds.
    ///
    /// Later URLs are never requested once one has answered. When none
    /// answers, the result carries the last failure.
    pub async fn check_urls(&self, urls: &[String]) -> SecurityHeaders {
        let mut last_failure = String::from("no URL to request");

        for url in urls {
            match self.attempt(url).await {
                HeaderAttempt::Responded(headers) => {
                    let result = evaluate(&headers);
                    tracing::info!(url = %url, score = %result.score, "Header check finished");
                    return result;
                }
                HeaderAttempt::Failed(reason) => {
                    tracing::info!(url = %url, error = %reason, "Header check attempt failed");
                    last_failure = reason;
                }
            }
        }

        tracing::warn!(?urls, error = %last_failure, "No URL answered");
        SecurityHeaders::unreachable(last_failure)
    }

    async fn attempt(&self, url: &str) -> HeaderAttempt {
        match self.client.head(url).send().await {
            Ok(response) => {
                tracing::debug!(url, status = %response.status(), "Received header response");
                HeaderAttempt::Responded(response.headers().clone())
            }
            Err(e) => HeaderAttempt::Failed(error_chain(&e)),
        }
    }
}

/// Check a response's headers against [`SECURITY_HEADERS`].
///
/// Headers present with an empty value count as missing.
pub fn evaluate(headers: &HeaderMap) -> SecurityHeaders {
    let mut result = SecurityHeaders {
        headers_found: Default::default(),
        headers_missing: Vec::new(),
        score: String::new(),
        error: None,
    };

    for name in SECURITY_HEADERS {
        let value = headers
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
            .filter(|v| !v.is_empty());

        match value {
            Some(value) => {
                result.headers_found.insert(name.to_string(), value);
            }
            None => result.headers_missing.push(name.to_string()),
        }
    }

    result.score = format_score(result.headers_found.len());
    result
}
