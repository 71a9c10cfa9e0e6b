//! RDAP client entry points

use crate::error::Result;
use crate::rdap::fetcher::{merge_headers, Fetcher};
use crate::rdap::{router, ReqwestTransport, Transport};
use crate::types::{Document, Query, QueryOptions, QueryType};
use std::sync::Arc;
use std::time::Instant;

/// RDAP client
///
/// Holds only the transport; every lookup gets its own redirect budget and
/// header set, so one client can serve concurrent lookups.
#[derive(Clone)]
pub struct RdapClient {
    fetcher: Fetcher,
}

impl RdapClient {
    /// Create a client over the default reqwest transport
    pub fn new() -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client over a custom transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            fetcher: Fetcher::new(transport),
        }
    }

    /// Look up a domain name
    pub async fn domain(&self, identifier: &str, options: &QueryOptions) -> Result<Document> {
        self.lookup(identifier, QueryType::Domain, options).await
    }

    /// Look up an IP address or network
    pub async fn ip(&self, identifier: &str, options: &QueryOptions) -> Result<Document> {
        self.lookup(identifier, QueryType::Ip, options).await
    }

    /// Look up an autonomous system number
    pub async fn autonomous_system(&self, identifier: &str, options: &QueryOptions) -> Result<Document> {
        self.lookup(identifier, QueryType::Autnum, options).await
    }

    /// Look up by type name; anything but `domain`, `ip` or `autnum` is rejected
    pub async fn query(&self, identifier: &str, query_type: &str, options: &QueryOptions) -> Result<Document> {
        let query = Query::parse(identifier, query_type, options)?;
        self.execute(&query).await
    }

    /// Look up a typed query
    pub async fn lookup(&self, identifier: &str, query_type: QueryType, options: &QueryOptions) -> Result<Document> {
        let query = Query::new(identifier, query_type, options)?;
        self.execute(&query).await
    }

    /// Run a prepared query
    pub async fn execute(&self, query: &Query) -> Result<Document> {
        let uri = router::resolve(query)?;
        let headers = merge_headers(&query.headers)?;

        let start_time = Instant::now();
        let result = self
            .fetcher
            .fetch(uri, query.timeout, &headers, query.max_redirects)
            .await;
        let duration = start_time.elapsed();

        match &result {
            Ok(_) => tracing::debug!(
                identifier = %query.identifier,
                query_type = %query.query_type,
                duration_ms = %duration.as_millis(),
                "RDAP lookup completed"
            ),
            Err(e) => tracing::debug!(
                identifier = %query.identifier,
                query_type = %query.query_type,
                duration_ms = %duration.as_millis(),
                error = %e,
                "RDAP lookup failed"
            ),
        }

        result
    }
}
