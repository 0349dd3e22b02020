use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::http::{read_response, HttpResponse};
use crate::{Endpoint, TransportError};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(12);

/// Timeouts shared by both transport modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    /// Bound on reading each response. `None` waits indefinitely, which long
    /// scans may need.
    pub response_timeout: Option<Duration>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            response_timeout: None,
        }
    }
}

/// One open TCP stream to the device.
#[derive(Debug)]
pub(crate) struct Connection {
    stream: BufReader<TcpStream>,
}

impl Connection {
    pub(crate) async fn open(
        endpoint: &Endpoint,
        options: &TransportOptions,
    ) -> Result<Self, TransportError> {
        log::debug!("connecting to {endpoint}");
        let stream = timeout(
            options.connect_timeout,
            TcpStream::connect((endpoint.host(), endpoint.port())),
        )
        .await
        .map_err(|_| TransportError::ConnectTimeout(endpoint.to_string()))??;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream: BufReader::new(stream),
        })
    }

    pub(crate) async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let stream = self.stream.get_mut();
        stream.write_all(bytes).await?;
        stream.flush().await?;
        Ok(())
    }

    pub(crate) async fn receive(
        &mut self,
        options: &TransportOptions,
    ) -> Result<HttpResponse, TransportError> {
        match options.response_timeout {
            Some(limit) => timeout(limit, read_response(&mut self.stream))
                .await
                .map_err(|_| TransportError::ResponseTimeout)?,
            None => read_response(&mut self.stream).await,
        }
    }

    pub(crate) async fn shutdown(mut self) {
        if let Err(err) = self.stream.get_mut().shutdown().await {
            log::trace!("shutdown after close: {err}");
        }
    }
}
