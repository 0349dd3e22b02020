use crate::encoding::tree::Element;
use crate::{DecodeError, ProtocolVersion};

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Per-call response metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultEnvelope {
    /// Device-side `timestamp`, when the response carried one.
    pub timestamp: Option<f64>,
}

/// Wraps a `blk:`-prefixed request fragment in a SOAP 1.1 envelope that binds
/// the prefix to `version`'s namespace.
pub fn wrap(fragment: &str, version: ProtocolVersion) -> String {
    format!(
        "<soapenv:Envelope xmlns:soapenv=\"{SOAP_ENVELOPE_NS}\" xmlns:blk=\"{}\">\
         <soapenv:Header/><soapenv:Body>{fragment}</soapenv:Body></soapenv:Envelope>",
        version.namespace()
    )
}

pub fn unwrap(body: &[u8]) -> Result<Element, DecodeError> {
    Element::parse(body)
}

/// Reads the first `timestamp` element, in any namespace.
pub fn timestamp(root: &Element) -> Result<Option<f64>, DecodeError> {
    root.find_local("timestamp")
        .map(|e| {
            e.text()
                .trim()
                .parse()
                .map_err(|_| DecodeError::invalid("timestamp", e.text()))
        })
        .transpose()
}
