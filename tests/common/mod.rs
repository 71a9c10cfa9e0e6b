//! Scripted transport shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rdap_query::rdap::{HttpRequest, HttpResponse};
use rdap_query::{RdapError, Result, Transport};
use std::collections::HashMap;

/// Answers each URL with a fixed response and records every request it sees
pub struct ScriptedTransport {
    routes: HashMap<String, Result<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn route(mut self, url: &str, response: HttpResponse) -> Self {
        self.routes.insert(url.to_string(), Ok(response));
        self
    }

    pub fn redirect(self, from: &str, to: &str) -> Self {
        self.route(from, HttpResponse::new(302, "").with_location(to))
    }

    pub fn json(self, url: &str, status: u16, body: &str) -> Self {
        self.route(url, HttpResponse::new(status, body))
    }

    pub fn fail(mut self, url: &str, error: RdapError) -> Self {
        self.routes.insert(url.to_string(), Err(error));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.url.to_string()).collect()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.url.as_str() == url).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().push(request.clone());
        match self.routes.get(request.url.as_str()) {
            Some(outcome) => outcome.clone(),
            None => Err(RdapError::connection("no scripted route", request.url.as_str())),
        }
    }
}

/// A trimmed copy of the Verisign record for google.com
pub const GOOGLE_COM: &str = r#"{
  "objectClassName": "domain",
  "handle": "2138514_DOMAIN_COM-VRSN",
  "ldhName": "GOOGLE.COM",
  "events": [
    {"eventAction": "registration", "eventDate": "1997-09-15T04:00:00Z"}
  ],
  "nameservers": [
    {"objectClassName": "nameserver", "ldhName": "NS1.GOOGLE.COM"},
    {"objectClassName": "nameserver", "ldhName": "NS2.GOOGLE.COM"}
  ],
  "rdapConformance": ["rdap_level_0"]
}"#;
