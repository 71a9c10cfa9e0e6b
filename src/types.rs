//! Core types and structures for rdap-query

use crate::error::{RdapError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Public bootstrap service that redirects to the authoritative registry
pub const BOOTSTRAP_SERVER: &str = "https://rdap.org/";

/// Default timeout applied to connect and body read
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of redirects followed before giving up
pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

/// Decoded RDAP response body
pub type Document = serde_json::Map<String, serde_json::Value>;

/// RDAP object class being looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Domain,
    Ip,
    Autnum,
}

impl QueryType {
    /// Every supported query type, in path-segment order
    pub const ALL: [QueryType; 3] = [QueryType::Domain, QueryType::Ip, QueryType::Autnum];

    /// Path segment used in the request URI
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Domain => "domain",
            QueryType::Ip => "ip",
            QueryType::Autnum => "autnum",
        }
    }

    fn supported_list() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
        format!("[{}]", names.join(", "))
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = RdapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                RdapError::invalid_argument(format!(
                    "RDAP: Invalid query type: {}, supported types: {}",
                    s,
                    Self::supported_list()
                ))
            })
    }
}

/// Per-call lookup options
///
/// The struct is closed: deserializing options that name any other key fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryOptions {
    /// Applied to connection establishment and to reading the body
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Base server; the bootstrap service unless pointed at a registry directly
    pub server: String,
    /// Merged over the default headers, caller values win per name
    pub headers: BTreeMap<String, String>,
    /// Redirect budget for one lookup
    pub max_redirects: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            server: BOOTSTRAP_SERVER.to_string(),
            headers: BTreeMap::new(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl QueryOptions {
    /// Set the base server
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add or replace one request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the redirect budget
    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Parse options from a JSON object, rejecting unknown keys
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| RdapError::invalid_argument(format!("Invalid options: {}", e)))
    }

    /// Load options from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RdapError::invalid_argument(format!("Cannot read options file {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Build options from `RDAP_*` environment variables over the defaults
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();

        if let Ok(server) = std::env::var("RDAP_SERVER") {
            options.server = server;
        }

        if let Ok(timeout) = std::env::var("RDAP_TIMEOUT") {
            options.timeout = parse_timeout(&timeout)?;
        }

        if let Ok(max_redirects) = std::env::var("RDAP_MAX_REDIRECTS") {
            options.max_redirects = max_redirects.trim().parse().map_err(|_| {
                RdapError::invalid_argument(format!("RDAP_MAX_REDIRECTS is not a number: {}", max_redirects))
            })?;
        }

        if let Ok(user_agent) = std::env::var("RDAP_USER_AGENT") {
            options.headers.insert("User-Agent".to_string(), user_agent);
        }

        Ok(options)
    }

    /// Check the options that can be checked without building a URI
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(RdapError::invalid_argument("timeout must be greater than zero"));
        }
        if self.server.trim().is_empty() {
            return Err(RdapError::invalid_argument("server cannot be empty"));
        }
        Ok(())
    }
}

/// Parse a timeout given in (possibly fractional) seconds
pub fn parse_timeout(value: &str) -> Result<Duration> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| RdapError::invalid_argument(format!("timeout is not a number: {}", value)))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(RdapError::invalid_argument(format!(
            "timeout must be a positive number of seconds: {}",
            value
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| RdapError::invalid_argument(format!("timeout is too large: {}", value)))
}

/// Serializes a `Duration` as seconds
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom("timeout must be a non-negative number of seconds"));
        }
        Duration::try_from_secs_f64(secs)
            .map_err(|_| serde::de::Error::custom("timeout is too large"))
    }
}

/// One lookup, fixed at construction
#[derive(Debug, Clone)]
pub struct Query {
    pub identifier: String,
    pub query_type: QueryType,
    pub server: String,
    pub timeout: Duration,
    pub headers: BTreeMap<String, String>,
    pub max_redirects: u32,
}

impl Query {
    /// Build a query from a type name, failing on anything but domain/ip/autnum
    pub fn parse(identifier: &str, query_type: &str, options: &QueryOptions) -> Result<Self> {
        let query_type = query_type.parse()?;
        Self::new(identifier, query_type, options)
    }

    /// Build a query for a known type
    pub fn new(identifier: &str, query_type: QueryType, options: &QueryOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            identifier: identifier.to_string(),
            query_type,
            server: options.server.clone(),
            timeout: options.timeout,
            headers: options.headers.clone(),
            max_redirects: options.max_redirects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_type_round_trip_names() {
        assert_eq!("domain".parse::<QueryType>().unwrap(), QueryType::Domain);
        assert_eq!("ip".parse::<QueryType>().unwrap(), QueryType::Ip);
        assert_eq!("autnum".parse::<QueryType>().unwrap(), QueryType::Autnum);
        assert_eq!(QueryType::Autnum.to_string(), "autnum");
    }

    #[test]
    fn test_query_type_rejects_unknown() {
        let error = "xxx".parse::<QueryType>().unwrap_err();
        assert!(matches!(error, RdapError::InvalidArgument { .. }));
        assert_eq!(
            error.to_string(),
            "Invalid argument: RDAP: Invalid query type: xxx, supported types: [domain, ip, autnum]"
        );
        assert!("Domain".parse::<QueryType>().is_err());
    }

    #[test]
    fn test_default_options() {
        let options = QueryOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.server, "https://rdap.org/");
        assert!(options.headers.is_empty());
        assert_eq!(options.max_redirects, 5);
    }

    #[test]
    fn test_options_from_json() {
        let options = QueryOptions::from_json_str(
            r#"{"timeout": 2.5, "server": "https://rdap.verisign.com/com/v1", "headers": {"User-Agent": "My application"}}"#,
        )
        .unwrap();
        assert_eq!(options.timeout, Duration::from_millis(2500));
        assert_eq!(options.server, "https://rdap.verisign.com/com/v1");
        assert_eq!(options.headers.get("User-Agent").map(String::as_str), Some("My application"));
        assert_eq!(options.max_redirects, 5);
    }

    #[test]
    fn test_options_reject_unknown_key() {
        let error = QueryOptions::from_json_str(r#"{"invalid": "option"}"#).unwrap_err();
        assert!(matches!(error, RdapError::InvalidArgument { .. }));
        assert!(error.to_string().contains("invalid"));
    }

    #[test]
    fn test_options_file_errors_are_invalid_arguments() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        let error = QueryOptions::from_file(&missing).unwrap_err();
        assert!(matches!(error, RdapError::InvalidArgument { .. }));
        assert!(error.is_caller_error());
        assert!(!error.is_server_error());

        let malformed = dir.path().join("malformed.json");
        std::fs::write(&malformed, "{ not json").unwrap();
        let error = QueryOptions::from_file(&malformed).unwrap_err();
        assert!(matches!(error, RdapError::InvalidArgument { .. }));
        assert!(error.to_string().contains("Invalid options"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let options = QueryOptions::default().with_timeout(Duration::ZERO);
        assert!(Query::new("example.com", QueryType::Domain, &options).is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("3").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_timeout("0.5").unwrap(), Duration::from_millis(500));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("-1").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_huge_timeout_rejected() {
        let error = parse_timeout("1e30").unwrap_err();
        assert!(matches!(error, RdapError::InvalidArgument { .. }));
        assert!(error.to_string().contains("too large"));

        let error = QueryOptions::from_json_str(r#"{"timeout": 1e30}"#).unwrap_err();
        assert!(matches!(error, RdapError::InvalidArgument { .. }));
        assert!(error.to_string().contains("too large"));
    }

    #[test]
    fn test_query_parse() {
        let options = QueryOptions::default().with_header("Accept-Encoding", "gzip");
        let query = Query::parse("16276", "autnum", &options).unwrap();
        assert_eq!(query.query_type, QueryType::Autnum);
        assert_eq!(query.identifier, "16276");
        assert_eq!(query.headers.len(), 1);

        assert!(Query::parse("google.com", "xxx", &options).is_err());
    }
}
