//! Request URI construction for the three lookup types

use crate::error::{RdapError, Result};
use crate::types::Query;
use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;

/// Characters allowed in an RFC 3986 path: pchar plus `/` for CIDR-style identifiers.
fn identifier_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    if let Some(regex) = PATTERN.get() {
        return Ok(regex);
    }
    let regex = Regex::new(r"^(?:[A-Za-z0-9\-._~!$&'()*+,;=:@/]|%[0-9A-Fa-f]{2})+$")
        .map_err(|e| RdapError::invalid_argument(e.to_string()))?;
    Ok(PATTERN.get_or_init(|| regex))
}

/// Check that the base server is an absolute https URL with a host
pub fn validate_server(server: &str) -> Result<Url> {
    let url = Url::parse(server)
        .map_err(|e| RdapError::invalid_argument(format!("Invalid server URL '{}': {}", server, e)))?;

    if url.scheme() != "https" {
        return Err(RdapError::invalid_argument(format!(
            "Server must use https, got '{}'",
            server
        )));
    }
    if url.host_str().is_none() {
        return Err(RdapError::invalid_argument(format!("Server URL has no host: '{}'", server)));
    }

    Ok(url)
}

/// Build `{server}/{type}/{identifier}` for a query
///
/// The identifier is used verbatim. Characters that cannot appear in a URI
/// path produce [`RdapError::UriSyntax`] instead of being escaped.
pub fn resolve(query: &Query) -> Result<Url> {
    validate_server(&query.server)?;

    if query.identifier.is_empty() {
        return Err(RdapError::invalid_argument("identifier cannot be empty"));
    }

    let uri = format!(
        "{}/{}/{}",
        query.server.trim_end_matches('/'),
        query.query_type,
        query.identifier
    );

    if !identifier_pattern()?.is_match(&query.identifier) {
        return Err(RdapError::uri_syntax(
            uri,
            format!("identifier contains characters not allowed in a URI path: {}", query.identifier),
        ));
    }

    Url::parse(&uri).map_err(|e| RdapError::uri_syntax(uri.clone(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QueryOptions, QueryType};

    fn query(identifier: &str, query_type: QueryType, server: &str) -> Query {
        let options = QueryOptions::default().with_server(server);
        Query::new(identifier, query_type, &options).unwrap()
    }

    #[test]
    fn test_resolve_each_type() {
        for query_type in QueryType::ALL {
            let url = resolve(&query("example", query_type, "https://rdap.org/")).unwrap();
            assert_eq!(url.as_str(), format!("https://rdap.org/{}/example", query_type));
        }
    }

    #[test]
    fn test_resolve_strips_trailing_slash() {
        let url = resolve(&query("google.com", QueryType::Domain, "https://rdap.verisign.com/com/v1/")).unwrap();
        assert_eq!(url.as_str(), "https://rdap.verisign.com/com/v1/domain/google.com");

        let url = resolve(&query(
            "google.com",
            QueryType::Domain,
            "https://rdap-bootstrap.arin.net/bootstrap",
        ))
        .unwrap();
        assert_eq!(url.as_str(), "https://rdap-bootstrap.arin.net/bootstrap/domain/google.com");
    }

    #[test]
    fn test_resolve_ipv6_and_cidr() {
        let url = resolve(&query("2620:119:35::35", QueryType::Ip, "https://rdap.org")).unwrap();
        assert_eq!(url.as_str(), "https://rdap.org/ip/2620:119:35::35");

        let url = resolve(&query("8.8.8.0/24", QueryType::Ip, "https://rdap.org")).unwrap();
        assert_eq!(url.as_str(), "https://rdap.org/ip/8.8.8.0/24");
    }

    #[test]
    fn test_resolve_rejects_malformed_identifier() {
        let error = resolve(&query("u$&~(!*@&@^#}", QueryType::Domain, "https://rdap.org/")).unwrap_err();
        assert!(matches!(error, RdapError::UriSyntax { .. }));
        assert_eq!(
            error.to_string(),
            "bad URI(is not URI?): \"https://rdap.org/domain/u$&~(!*@&@^#}\""
        );

        assert!(resolve(&query("with space.com", QueryType::Domain, "https://rdap.org/")).is_err());
        assert!(resolve(&query("bad%zz", QueryType::Domain, "https://rdap.org/")).is_err());
    }

    #[test]
    fn test_resolve_accepts_percent_encoding() {
        let url = resolve(&query("xn--caf-dma.fr", QueryType::Domain, "https://rdap.org/")).unwrap();
        assert!(url.as_str().ends_with("/domain/xn--caf-dma.fr"));
        assert!(resolve(&query("caf%C3%A9.fr", QueryType::Domain, "https://rdap.org/")).is_ok());
    }

    #[test]
    fn test_validate_server() {
        assert!(validate_server("https://rdap.org/").is_ok());
        assert!(matches!(
            validate_server("http://rdap.org/"),
            Err(RdapError::InvalidArgument { .. })
        ));
        assert!(validate_server("rdap.org").is_err());
    }

    #[test]
    fn test_empty_identifier() {
        let error = resolve(&query("", QueryType::Domain, "https://rdap.org/")).unwrap_err();
        assert!(matches!(error, RdapError::InvalidArgument { .. }));
    }
}
