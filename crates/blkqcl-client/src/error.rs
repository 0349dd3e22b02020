use blkqcl_core::{DecodeError, EncodeError};
use blkqcl_transport::{HttpStatusError, TransportError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::fault::ProtocolFault;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("SOAP fault: {0}")]
    Fault(#[from] ProtocolFault),
    #[error("unexpected status: {0}")]
    HttpStatus(#[from] HttpStatusError),
    #[error("no known protocol version was accepted by the device")]
    NegotiationFailed,
}
