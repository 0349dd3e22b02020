//! Homogeneous HTTP pipelining.
//!
//! The first request ever sent is serialized once and frozen. Opening a
//! connection writes the frozen bytes `depth` times before anything is read;
//! after that every call writes one more copy and reads the oldest unread
//! response. Later requests are never serialized: callers must repeat the
//! same command with the same arguments.

use std::mem;
use std::sync::Arc;

use crate::connection::Connection;
use crate::{Endpoint, HttpRequest, HttpResponse, Transport, TransportError, TransportOptions};

#[derive(Debug)]
enum State {
    Idle,
    /// Open, nothing written yet.
    Connected(Connection),
    /// `in_flight` requests written whose responses are still unread.
    AwaitingReplies {
        connection: Connection,
        in_flight: usize,
    },
    /// The peer announced close or a read failed; the next call reconnects.
    Closing {
        connection: Connection,
        abandoned: usize,
    },
}

#[derive(Debug)]
struct Frozen {
    request: HttpRequest,
    bytes: Arc<[u8]>,
}

#[derive(Debug)]
pub struct PipelinedTransport {
    endpoint: Endpoint,
    options: TransportOptions,
    depth: usize,
    frozen: Option<Frozen>,
    state: State,
}

impl PipelinedTransport {
    /// `depth` requests are kept in flight; values below 1 are raised to 1.
    pub fn new(endpoint: Endpoint, options: TransportOptions, depth: usize) -> Self {
        Self {
            endpoint,
            options,
            depth: depth.max(1),
            frozen: None,
            state: State::Idle,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_connected(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    /// Requests written on the current connection whose responses are unread.
    pub fn in_flight(&self) -> usize {
        match &self.state {
            State::AwaitingReplies { in_flight, .. } => *in_flight,
            State::Closing { abandoned, .. } => *abandoned,
            State::Idle | State::Connected(_) => 0,
        }
    }

    /// Opens the connection ahead of the first call. A no-op when one is open.
    pub async fn connect(&mut self) -> Result<(), TransportError> {
        if matches!(self.state, State::Idle) {
            let connection = Connection::open(&self.endpoint, &self.options).await?;
            self.state = State::Connected(connection);
        }
        Ok(())
    }

    fn frozen_bytes(&mut self, request: &HttpRequest) -> Result<Arc<[u8]>, TransportError> {
        match &self.frozen {
            Some(frozen) => {
                if frozen.request != *request {
                    log::debug!("pipelined call differs from the first; replaying the first");
                }
                Ok(frozen.bytes.clone())
            }
            None => {
                let bytes: Arc<[u8]> = request.serialize(&self.endpoint)?.into();
                self.frozen = Some(Frozen {
                    request: request.clone(),
                    bytes: bytes.clone(),
                });
                Ok(bytes)
            }
        }
    }

    async fn prime(
        &self,
        mut connection: Connection,
        bytes: &[u8],
    ) -> Result<(Connection, usize), TransportError> {
        log::trace!(
            "priming pipeline to {} with {} x {} bytes",
            self.endpoint,
            self.depth,
            bytes.len()
        );
        for _ in 0..self.depth {
            connection.send(bytes).await?;
        }
        Ok((connection, self.depth))
    }
}

impl Transport for PipelinedTransport {
    async fn round_trip(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let bytes = self.frozen_bytes(request)?;
        // Left Idle on every early return below, which drops the connection.
        let state = mem::replace(&mut self.state, State::Idle);
        let (mut connection, in_flight) = match state {
            State::Idle => {
                let connection = Connection::open(&self.endpoint, &self.options).await?;
                self.prime(connection, &bytes).await?
            }
            State::Connected(connection) => self.prime(connection, &bytes).await?,
            State::AwaitingReplies {
                mut connection,
                in_flight,
            } => {
                connection.send(&bytes).await?;
                (connection, in_flight + 1)
            }
            State::Closing {
                connection,
                abandoned,
            } => {
                if abandoned > 0 {
                    log::warn!(
                        "reopening pipelined connection to {} with {abandoned} replies unread",
                        self.endpoint
                    );
                } else {
                    log::debug!("reopening pipelined connection to {}", self.endpoint);
                }
                connection.shutdown().await;
                let connection = Connection::open(&self.endpoint, &self.options).await?;
                self.prime(connection, &bytes).await?
            }
        };

        let remaining = in_flight.saturating_sub(1);
        match connection.receive(&self.options).await {
            Ok(response) => {
                self.state = if response.will_close() {
                    log::debug!("{} closes the pipelined connection", self.endpoint);
                    State::Closing {
                        connection,
                        abandoned: remaining,
                    }
                } else {
                    State::AwaitingReplies {
                        connection,
                        in_flight: remaining,
                    }
                };
                Ok(response)
            }
            Err(err) => {
                self.state = State::Closing {
                    connection,
                    abandoned: remaining,
                };
                Err(err)
            }
        }
    }

    async fn close(&mut self) {
        match mem::replace(&mut self.state, State::Idle) {
            State::Idle => {}
            State::Connected(connection)
            | State::AwaitingReplies { connection, .. }
            | State::Closing { connection, .. } => {
                log::debug!("closing pipelined connection to {}", self.endpoint);
                connection.shutdown().await;
            }
        }
    }
}
