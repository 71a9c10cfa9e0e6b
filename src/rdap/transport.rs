//! reqwest-backed transport

use crate::error::{RdapError, Result};
use crate::rdap::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

/// Transport over a shared `reqwest` client
///
/// TLS always verifies the peer, plain http is refused, and redirects are
/// returned to the caller untouched.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .use_rustls_tls()
            .https_only(true)
            .redirect(Policy::none())
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| RdapError::connection(format!("Failed to create HTTP client: {}", e), ""))?;

        Ok(Self::with_client(client))
    }

    /// Wrap an existing client. It must not follow redirects on its own.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let response = self
            .client
            .get(request.url.clone())
            .headers(request.headers.clone())
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| classify_error(&e, request))?;

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(&e, request))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            location,
            body: body.to_vec(),
        })
    }
}

fn classify_error(err: &reqwest::Error, request: &HttpRequest) -> RdapError {
    let url = request.url.as_str();

    if err.is_timeout() {
        return RdapError::timeout(url, request.timeout);
    }

    if let Some(message) = tls_failure(err) {
        let host = request.url.host_str().unwrap_or_default();
        return RdapError::ssl(message, host);
    }

    RdapError::connection(error_chain(err), url)
}

/// Find a TLS failure anywhere in the source chain
fn tls_failure(err: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(tls) = err.downcast_ref::<rustls::Error>() {
            return Some(tls.to_string());
        }
        // hyper-rustls reports handshake failures as io::Error wrapping rustls::Error
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if let Some(tls) = io.get_ref().and_then(|inner| inner.downcast_ref::<rustls::Error>()) {
                return Some(tls.to_string());
            }
            if io.kind() == std::io::ErrorKind::InvalidData && io.to_string().contains("certificate") {
                return Some(io.to_string());
            }
        }
        current = err.source();
    }
    None
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        message.push_str(": ");
        message.push_str(&source.to_string());
        current = source.source();
    }
    message
}
