//! RDAP lookup pipeline
//!
//! The [`router`] turns a query into its first request URI and the
//! [`fetcher`] walks the redirect chain from there to a document or an error.
//! Network access goes through the [`Transport`] trait so the pipeline can be
//! driven without a live registry.

pub mod client;
pub mod fetcher;
pub mod router;
pub mod transport;

// Re-export main functionality
pub use client::RdapClient;
pub use fetcher::Fetcher;
pub use transport::ReqwestTransport;

use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use std::time::Duration;

/// One outgoing GET
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub timeout: Duration,
}

/// Raw response as seen by the fetcher, before classification
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response with the canonical reason phrase for `status`
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            reason,
            location: None,
            body: body.into(),
        }
    }

    /// Override the reason phrase
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Set the `Location` header
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// `[code] reason`, the status line used in error messages
    pub fn status_line(&self) -> String {
        format!("[{}] {}", self.status, self.reason)
    }
}

/// HTTP(S) exchange used by the fetcher
///
/// Implementations must not follow redirects themselves and must report TLS
/// failures as [`crate::RdapError::Ssl`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single GET and read the whole body
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse>;
}
