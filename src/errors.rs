//! Error types for the syslog forwarder

use std::fmt;
use std::net::SocketAddr;

pub type Result<T> = std::result::Result<T, CollectorError>;

#[derive(Debug)]
pub enum CollectorError {
    /// IO operation failed
    Io(std::io::Error),

    /// HTTP client could not be built or the request failed to send
    Http(reqwest::Error),

    /// JSON serialization failed
    Json(serde_json::Error),

    /// Configuration error
    Config(String),

    /// A listening socket could not be bound
    Bind {
        transport: &'static str,
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Message did not match the syslog structure
    Unparsed(String),

    /// Structure matched but the `<PRI>` value is not an integer
    InvalidPriority(String),

    /// Endpoint answered with a non-success status
    Delivery(String),

    /// Endpoint did not answer in time
    Timeout,
}

impl CollectorError {
    /// True for the failures that mean "message could not be parsed".
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            CollectorError::Unparsed(_) | CollectorError::InvalidPriority(_)
        )
    }
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectorError::Io(err) => write!(f, "IO error: {}", err),
            CollectorError::Http(err) => write!(f, "HTTP error: {}", err),
            CollectorError::Json(err) => write!(f, "JSON error: {}", err),
            CollectorError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CollectorError::Bind { transport, addr, source } => {
                write!(f, "Failed to bind {} socket on {}: {}", transport, addr, source)
            }
            CollectorError::Unparsed(msg) => write!(f, "Unparsed syslog message: {}", msg),
            CollectorError::InvalidPriority(pri) => write!(f, "Invalid syslog priority: {}", pri),
            CollectorError::Delivery(msg) => write!(f, "Delivery failed: {}", msg),
            CollectorError::Timeout => write!(f, "Delivery failed: request timed out"),
        }
    }
}

impl std::error::Error for CollectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectorError::Io(err) => Some(err),
            CollectorError::Http(err) => Some(err),
            CollectorError::Json(err) => Some(err),
            CollectorError::Bind { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CollectorError {
    fn from(err: std::io::Error) -> Self {
        CollectorError::Io(err)
    }
}

impl From<reqwest::Error> for CollectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CollectorError::Timeout
        } else {
            CollectorError::Http(err)
        }
    }
}

impl From<serde_json::Error> for CollectorError {
    fn from(err: serde_json::Error) -> Self {
        CollectorError::Json(err)
    }
}
