//! Redirect-following fetcher and response classification

use crate::error::{RdapError, Result};
use crate::rdap::{HttpRequest, HttpResponse, Transport};
use crate::types::Document;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Url;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Accept header sent by default. Some registries reject a bare `application/rdap+json`.
pub const DEFAULT_ACCEPT: &str = "application/rdap+json, application/json, */*;q=0.8";

/// User agent sent by default
pub fn default_user_agent() -> String {
    format!("rdap-query/{}", crate::VERSION)
}

/// Default headers with the caller's headers merged over them, names compared case-insensitively
pub fn merge_headers(custom: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    let user_agent = HeaderValue::from_str(&default_user_agent())
        .map_err(|e| RdapError::invalid_argument(e.to_string()))?;
    headers.insert(USER_AGENT, user_agent);

    for (name, value) in custom {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RdapError::invalid_argument(format!("Invalid header name: {}", name)))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            RdapError::invalid_argument(format!("Invalid value for header {}: {:?}", name, value))
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// Resolves a request URI to a document, following redirects up to a budget
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch `uri` and every redirect after it until a terminal response
    ///
    /// At most `max_redirects` redirects are followed, so at most
    /// `max_redirects + 1` requests are sent.
    pub async fn fetch(
        &self,
        uri: Url,
        timeout: Duration,
        headers: &HeaderMap,
        max_redirects: u32,
    ) -> Result<Document> {
        let mut uri = uri;
        let mut remaining = max_redirects.saturating_add(1);

        loop {
            if remaining == 0 {
                tracing::warn!(url = %uri, limit = max_redirects, "Redirect budget exhausted");
                return Err(RdapError::server(
                    format!("Too many redirections (> {}) at {}", max_redirects, uri),
                    None,
                    Some(uri.to_string()),
                ));
            }
            remaining -= 1;

            let request = HttpRequest {
                url: uri.clone(),
                headers: headers.clone(),
                timeout,
            };

            tracing::debug!(url = %uri, remaining = remaining, "Sending RDAP request");
            let response = match self.transport.get(&request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(url = %uri, error = %e, "RDAP transport failure");
                    return Err(e);
                }
            };
            tracing::debug!(url = %uri, status = response.status, "RDAP response received");

            match classify(&uri, response)? {
                Outcome::Document(document) => return Ok(document),
                Outcome::Redirect(location) => {
                    let next = follow(&uri, &location)?;
                    tracing::debug!(from = %uri, to = %next, remaining = remaining, "Following redirect");
                    uri = next;
                }
            }
        }
    }
}

enum Outcome {
    Document(Document),
    Redirect(String),
}

fn classify(uri: &Url, response: HttpResponse) -> Result<Outcome> {
    match response.status {
        200..=299 => success(uri, &response).map(Outcome::Document),
        404 => Err(not_found(&response)),
        429 => Err(RdapError::too_many_requests(response.status_line())),
        300..=399 => match &response.location {
            Some(location) => Ok(Outcome::Redirect(location.clone())),
            None => Err(RdapError::server(
                format!("{} (redirect without Location)", response.status_line()),
                Some(response.status),
                Some(uri.to_string()),
            )),
        },
        status => {
            tracing::warn!(url = %uri, status = status, "RDAP server error");
            Err(RdapError::server(
                response.status_line(),
                Some(status),
                Some(uri.to_string()),
            ))
        }
    }
}

fn success(uri: &Url, response: &HttpResponse) -> Result<Document> {
    if response.body.is_empty() {
        return Err(RdapError::empty_response(response.status_line(), response.status));
    }

    let value: Value = serde_json::from_slice(&response.body).map_err(|e| {
        RdapError::invalid_response(format!("JSON parser error: {}", e), uri.as_str())
    })?;

    let document = match value {
        Value::Object(document) => document,
        other => {
            return Err(RdapError::invalid_response(
                format!("JSON parser error: expected an object, found {}", json_kind(&other)),
                uri.as_str(),
            ))
        }
    };

    // Some servers report errors inside a 2xx envelope
    if let Some(code) = document
        .get("errorCode")
        .filter(|code| !matches!(code, Value::Null | Value::Bool(false)))
    {
        return Err(RdapError::server(
            format!("[{}] {} ({})", field_text(code), title(&document), uri),
            Some(response.status),
            Some(uri.to_string()),
        ));
    }

    Ok(document)
}

/// A 404 body is only a hint; anything unparseable falls back to the status line.
fn not_found(response: &HttpResponse) -> RdapError {
    let document = serde_json::from_slice::<Value>(&response.body)
        .ok()
        .and_then(|value| match value {
            Value::Object(document) => Some(document),
            _ => None,
        })
        .filter(|document| document.contains_key("errorCode") || document.contains_key("title"));

    match document {
        Some(document) => {
            let code = document
                .get("errorCode")
                .map(field_text)
                .unwrap_or_else(|| response.status.to_string());
            RdapError::not_found(format!("[{}] {}", code, title(&document)))
        }
        None => RdapError::not_found(response.status_line()),
    }
}

fn follow(current: &Url, location: &str) -> Result<Url> {
    let next = current.join(location).map_err(|e| {
        RdapError::server(
            format!("Invalid redirect location '{}' from {}: {}", location, current, e),
            None,
            Some(current.to_string()),
        )
    })?;

    if next.scheme() != "https" {
        return Err(RdapError::server(
            format!("Refusing non-https redirect to {} from {}", next, current),
            None,
            Some(current.to_string()),
        ));
    }

    Ok(next)
}

fn title(document: &Document) -> String {
    document.get("title").map(field_text).unwrap_or_default()
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
