//! Error handling for rdap-query

use std::time::Duration;
use thiserror::Error;

/// Main error type for rdap-query
///
/// Every terminal outcome of a lookup that is not a document lands in exactly
/// one of these variants. Use [`RdapError::is_server_error`] to treat the
/// server-side failures as one category.
#[derive(Error, Debug, Clone)]
pub enum RdapError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("bad URI(is not URI?): \"{uri}\"")]
    UriSyntax { uri: String, message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    TooManyRequests { message: String },

    #[error("{message}")]
    EmptyResponse { message: String, status_code: u16 },

    #[error("{message}")]
    InvalidResponse { message: String, url: String },

    #[error("{message}")]
    Server {
        message: String,
        status_code: Option<u16>,
        url: Option<String>,
    },

    #[error("{message} ({host})")]
    Ssl { message: String, host: String },

    #[error("Timeout error: request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Network error: {message}")]
    Connection { message: String, url: String },
}

impl RdapError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a URI syntax error
    pub fn uri_syntax(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UriSyntax {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a rate limit error
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::TooManyRequests {
            message: message.into(),
        }
    }

    /// Create an empty response error
    pub fn empty_response(message: impl Into<String>, status_code: u16) -> Self {
        Self::EmptyResponse {
            message: message.into(),
            status_code,
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a server error
    pub fn server(message: impl Into<String>, status_code: Option<u16>, url: Option<String>) -> Self {
        Self::Server {
            message: message.into(),
            status_code,
            url,
        }
    }

    /// Create a TLS error
    pub fn ssl(message: impl Into<String>, host: impl Into<String>) -> Self {
        Self::Ssl {
            message: message.into(),
            host: host.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            url: url.into(),
            timeout,
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Whether this is a server-side failure rather than a caller or lookup error
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Server { .. }
                | Self::Ssl { .. }
                | Self::EmptyResponse { .. }
                | Self::InvalidResponse { .. }
                | Self::Timeout { .. }
                | Self::Connection { .. }
        )
    }

    /// Whether the error was raised before any network activity
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. } | Self::UriSyntax { .. })
    }

    /// HTTP status code that produced this error, when there was one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::TooManyRequests { .. } => Some(429),
            Self::EmptyResponse { status_code, .. } => Some(*status_code),
            Self::Server { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidArgument { message } => {
                format!("❌ Invalid argument: {}\n💡 Use --help for usage information", message)
            }
            Self::UriSyntax { uri, .. } => {
                format!("❌ Cannot build a request URI: {}\n💡 Check the identifier for illegal characters", uri)
            }
            Self::NotFound { message } => {
                format!("🔍 Not found: {}", message)
            }
            Self::TooManyRequests { message } => {
                format!("⏱️  Rate limited: {}\n💡 Wait a moment before querying this registry again", message)
            }
            Self::EmptyResponse { message, .. } => {
                format!("❌ Empty response: {}", message)
            }
            Self::InvalidResponse { message, url } => {
                format!("❌ Invalid response from {}: {}", url, message)
            }
            Self::Server { message, .. } => {
                format!("❌ Server error: {}", message)
            }
            Self::Ssl { message, host } => {
                format!("🔒 TLS failure for {}: {}\n💡 The registry certificate could not be verified", host, message)
            }
            Self::Timeout { url, timeout } => {
                format!("⏱️  {} timed out after {:?}\n💡 Try increasing --timeout", url, timeout)
            }
            Self::Connection { message, url } => {
                format!("❌ Network error ({}): {}\n💡 Check your internet connection", url, message)
            }
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RdapError>;

/// Build an [`RdapError::InvalidArgument`] from a message or format string
#[macro_export]
macro_rules! invalid_argument {
    ($msg:expr) => {
        $crate::error::RdapError::invalid_argument($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::RdapError::invalid_argument(format!($fmt, $($arg)*))
    };
}
