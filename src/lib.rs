//! rdap-query - RDAP lookups for domains, IP networks and autonomous systems
//!
//! A query starts at a bootstrap server (`https://rdap.org/` by default) and
//! follows its redirects to the registry that holds the authoritative record.
//! The record comes back as an untyped JSON object; failures come back as one
//! [`RdapError`] variant.
//!
//! ```no_run
//! # async fn run() -> rdap_query::Result<()> {
//! let options = rdap_query::QueryOptions::default();
//! let document = rdap_query::domain("google.com", &options).await?;
//! assert_eq!(document["objectClassName"], "domain");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod rdap;
pub mod types;

// Re-export commonly used types
pub use error::{RdapError, Result};
pub use types::{Document, Query, QueryOptions, QueryType, BOOTSTRAP_SERVER};

// Re-export main functionality
pub use rdap::{RdapClient, Transport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}

/// Look up a domain name
pub async fn domain(identifier: &str, options: &QueryOptions) -> Result<Document> {
    RdapClient::new()?.domain(identifier, options).await
}

/// Look up an IP address or network
pub async fn ip(identifier: &str, options: &QueryOptions) -> Result<Document> {
    RdapClient::new()?.ip(identifier, options).await
}

/// Look up an autonomous system number
pub async fn autonomous_system(identifier: &str, options: &QueryOptions) -> Result<Document> {
    RdapClient::new()?.autonomous_system(identifier, options).await
}

/// Look up by type name (`domain`, `ip` or `autnum`)
pub async fn query(identifier: &str, query_type: &str, options: &QueryOptions) -> Result<Document> {
    let query = Query::parse(identifier, query_type, options)?;
    RdapClient::new()?.execute(&query).await
}
