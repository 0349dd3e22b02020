//! High-level async client for BLK-15 / BLKQCL laser-spectrometer controllers.
//!
//! ```no_run
//! # async fn demo() -> Result<(), blkqcl_client::ClientError> {
//! use blkqcl_client::{BlkqclClient, ClientConfig};
//!
//! let config = ClientConfig::builder("192.168.1.50")
//!     .with_credentials("operator", "secret")
//!     .build()?;
//! let mut client = BlkqclClient::connect(config).await?;
//! println!("{} speaks {}", client.get_device_name().await?, client.version());
//! # Ok(())
//! # }
//! ```
#![allow(async_fn_in_trait)]

pub mod client;
pub mod config;
pub mod error;
pub mod fault;

pub use blkqcl_core::envelope::ResultEnvelope;
pub use blkqcl_core::services::laser_operation::{MoveTuneRequest, StepTuneRequest, SweepTuneRequest};
pub use blkqcl_core::services::scan::{
    CoAdd, InterleavedScanRequest, StepScanRequest, SweepScanRequest,
};
pub use blkqcl_core::types::{
    AlarmKind, AlarmSelection, LaserTransition, ScanResolution, SensorKind, SensorSelection,
    ToggleState, ToggleSwitch,
};
pub use blkqcl_core::{Bounds, CommandResult, Pid, ProtocolVersion, Spectrum, Value};
pub use blkqcl_transport::{
    Authorization, Endpoint, HeaderError, HttpTransport, Transport, TransportError,
};
pub use client::BlkqclClient;
pub use config::{ClientConfig, ClientConfigBuilder, ConfigError, Pipelining, VersionSelector};
pub use error::ClientError;
pub use fault::ProtocolFault;
