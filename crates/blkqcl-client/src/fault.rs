use blkqcl_core::fault::fault_string;
use blkqcl_transport::HttpStatusError;
use thiserror::Error;

use crate::ClientError;

/// A SOAP fault raised by the device, with the HTTP error that carried it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{fault_string}")]
pub struct ProtocolFault {
    pub fault_string: String,
    #[source]
    pub cause: HttpStatusError,
}

impl ProtocolFault {
    pub fn status(&self) -> u16 {
        self.cause.status
    }
}

/// 5xx responses whose body carries a `faultstring` become
/// [`ClientError::Fault`]; every other non-2xx response stays an HTTP error.
pub(crate) fn translate(err: HttpStatusError) -> ClientError {
    if (500..600).contains(&err.status) {
        if let Some(fault_string) = fault_string(&err.body) {
            return ProtocolFault {
                fault_string,
                cause: err,
            }
            .into();
        }
    }
    err.into()
}
