//! BLKQCL protocol encoding and decoding in pure Rust.
//!
//! `blkqcl-core` knows how to talk to a Block Engineering BLK-15 / BLKQCL
//! laser-spectrometer controller at the message level: it builds the SOAP
//! request fragments for every supported schema revision, wraps them in the
//! SOAP envelope, and turns response documents back into typed values. It does
//! no I/O; see `blkqcl-transport` and `blkqcl-client` for that.
//!
//! # Feature flags
//!
//! - **`serde`**: derives `Serialize`/`Deserialize` on the value model and enums.

/// SOAP envelope framing and response metadata.
pub mod envelope;
/// XML fragment writer, response tree, and text formatting helpers.
pub mod encoding;
/// Error types for encoding and decoding operations.
pub mod error;
/// SOAP fault detection.
pub mod fault;
/// Per-command request encoders and response decoders.
pub mod services;
/// Closed enumerations used as command arguments.
pub mod types;
/// Presence-sparse result values and scan spectra.
pub mod value;
/// Supported schema revisions.
pub mod version;

pub use error::{DecodeError, EncodeError};
pub use value::{Bounds, CommandResult, Pid, Spectrum, Value};
pub use version::ProtocolVersion;
