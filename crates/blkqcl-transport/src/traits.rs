use crate::http::{HeaderError, HttpRequest, HttpResponse};
use thiserror::Error;

/// Errors raised below the SOAP layer: socket, timeout and HTTP framing
/// failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("connect to {0} timed out")]
    ConnectTimeout(String),
    #[error("timed out waiting for response")]
    ResponseTimeout,
    #[error("malformed HTTP response: {0}")]
    MalformedResponse(String),
    #[error("connection closed before a complete response was read")]
    ConnectionClosed,
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("invalid request header: {0}")]
    InvalidHeader(#[from] HeaderError),
}

/// Async trait for exchanging one HTTP request for one response.
///
/// Implementors own at most one open connection. Callers hold `&mut self`
/// for the whole exchange, so requests on one transport never interleave.
pub trait Transport: Send {
    /// Sends `request` and reads the matching response, status and body
    /// included. Non-2xx statuses are returned, not raised.
    async fn round_trip(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Drops any open connection. The next `round_trip` reconnects.
    async fn close(&mut self);
}
