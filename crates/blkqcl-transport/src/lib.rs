#![allow(async_fn_in_trait)]

pub mod auth;
pub mod connection;
pub mod endpoint;
pub mod http;
pub mod keep_alive;
pub mod pipeline;
pub mod traits;

pub use auth::Authorization;
pub use connection::TransportOptions;
pub use endpoint::Endpoint;
pub use http::{HeaderError, HttpRequest, HttpResponse, HttpStatusError};
pub use keep_alive::KeepAliveTransport;
pub use pipeline::PipelinedTransport;
pub use traits::{Transport, TransportError};

/// The two production transports behind one type, so a client can start on
/// keep-alive for version negotiation and switch to pipelining afterwards.
#[derive(Debug)]
pub enum HttpTransport {
    KeepAlive(KeepAliveTransport),
    Pipelined(PipelinedTransport),
}

impl HttpTransport {
    pub fn endpoint(&self) -> &Endpoint {
        match self {
            Self::KeepAlive(t) => t.endpoint(),
            Self::Pipelined(t) => t.endpoint(),
        }
    }

    pub fn is_pipelined(&self) -> bool {
        matches!(self, Self::Pipelined(_))
    }
}

impl From<KeepAliveTransport> for HttpTransport {
    fn from(t: KeepAliveTransport) -> Self {
        Self::KeepAlive(t)
    }
}

impl From<PipelinedTransport> for HttpTransport {
    fn from(t: PipelinedTransport) -> Self {
        Self::Pipelined(t)
    }
}

impl Transport for HttpTransport {
    async fn round_trip(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        match self {
            Self::KeepAlive(t) => t.round_trip(request).await,
            Self::Pipelined(t) => t.round_trip(request).await,
        }
    }

    async fn close(&mut self) {
        match self {
            Self::KeepAlive(t) => t.close().await,
            Self::Pipelined(t) => t.close().await,
        }
    }
}
