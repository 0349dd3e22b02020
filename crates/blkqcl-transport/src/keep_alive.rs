use crate::connection::Connection;
use crate::{Endpoint, HttpRequest, HttpResponse, Transport, TransportError, TransportOptions};

/// One request, one response, over a cached connection.
///
/// The connection opens on the first call and is reused until the peer
/// signals close or an I/O or framing error occurs; in both cases it is
/// dropped and the next call reconnects.
#[derive(Debug)]
pub struct KeepAliveTransport {
    endpoint: Endpoint,
    options: TransportOptions,
    connection: Option<Connection>,
}

impl KeepAliveTransport {
    pub fn new(endpoint: Endpoint, options: TransportOptions) -> Self {
        Self {
            endpoint,
            options,
            connection: None,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

impl Transport for KeepAliveTransport {
    async fn round_trip(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let bytes = request.serialize(&self.endpoint)?;
        // Taken out so that any early return drops it.
        let mut connection = match self.connection.take() {
            Some(c) => c,
            None => Connection::open(&self.endpoint, &self.options).await?,
        };
        log::trace!("sending {} byte request to {}", bytes.len(), self.endpoint);
        connection.send(&bytes).await?;
        let response = connection.receive(&self.options).await?;
        log::trace!("received HTTP {} from {}", response.status(), self.endpoint);
        if response.will_close() {
            log::debug!("{} closes the connection after this response", self.endpoint);
            connection.shutdown().await;
        } else {
            self.connection = Some(connection);
        }
        Ok(response)
    }

    async fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            log::debug!("closing connection to {}", self.endpoint);
            connection.shutdown().await;
        }
    }
}
