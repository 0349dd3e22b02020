use std::time::Duration;

use crate::encoding::format;
use crate::encoding::node::Node;
use crate::encoding::tree::Element;
use crate::encoding::writer::Writer;
use crate::services::Repeated;
use crate::types::LaserTransition;
use crate::{DecodeError, EncodeError, ProtocolVersion};

pub const STOP_LASERS: &str = "StopLasers";
pub const MOVE_TUNE: &str = "MoveTune";
pub const STEP_TUNE: &str = "StepTune";
pub const SWEEP_TUNE: &str = "SweepTune";
pub const EXTERNALLY_CONTROLLED_TUNE: &str = "ExternallyControlledTune";
pub const DELAY: &str = "Delay";

/// Tunes to one wave number, or on newer schemas walks a list of them.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveTuneRequest {
    pub wave_numbers: Vec<f64>,
    pub transition: LaserTransition,
}

impl MoveTuneRequest {
    pub fn single(wave_number: f64, transition: LaserTransition) -> Self {
        Self {
            wave_numbers: vec![wave_number],
            transition,
        }
    }

    pub fn encode(&self, version: ProtocolVersion) -> Result<String, EncodeError> {
        let wave_numbers = self
            .wave_numbers
            .iter()
            .map(|&wn| format::finite("waveNumber", wn).map(format::float))
            .collect::<Result<Vec<_>, _>>()?;
        let mut w = Writer::new();
        match wave_numbers.as_slice() {
            [] => {
                return Err(EncodeError::InvalidArgument(
                    "MoveTune needs at least one wave number".into(),
                ))
            }
            [wave_number] if version.predates_2015() => {
                w.empty_with(
                    MOVE_TUNE,
                    &[
                        ("waveNumber", wave_number.as_str()),
                        ("duringTransition", self.transition.as_str()),
                    ],
                );
            }
            _ if version.predates_2015() => {
                return Err(EncodeError::Unsupported {
                    operation: "MoveTune with several wave numbers",
                    version: version.label(),
                })
            }
            many => {
                w.start_with(MOVE_TUNE, &[("duringTransition", self.transition.as_str())]);
                for wave_number in many {
                    w.text("WaveNumber", wave_number);
                }
                w.end(MOVE_TUNE);
            }
        }
        Ok(w.finish())
    }
}

/// Steps from `start` to `end` in `delta` increments, dwelling at each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepTuneRequest {
    pub start: f64,
    pub end: f64,
    pub delta: f64,
    pub dwell: Duration,
    pub transition: LaserTransition,
}

impl StepTuneRequest {
    pub fn encode(&self, version: ProtocolVersion) -> Result<String, EncodeError> {
        let (start_attr, end_attr, delta_attr) = if version.is_blk15() {
            ("startWaveNumber", "stopWaveNumber", "stepSize")
        } else {
            ("start", "end", "delta")
        };
        let start = format::float(format::finite("start", self.start)?);
        let end = format::float(format::finite("end", self.end)?);
        let delta = format::float(format::finite("delta", self.delta)?);
        let dwell = format::duration(self.dwell);
        let mut w = Writer::new();
        w.empty_with(
            STEP_TUNE,
            &[
                (start_attr, start.as_str()),
                (end_attr, end.as_str()),
                (delta_attr, delta.as_str()),
                ("dwellTime", dwell.as_str()),
                ("duringTransition", self.transition.as_str()),
            ],
        );
        Ok(w.finish())
    }
}

/// Sweeps continuously from `start` to `end` at `rate`, `repeat_count` times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepTuneRequest {
    pub start: f64,
    pub end: f64,
    pub rate: f64,
    pub repeat_count: u32,
    pub inter_repeat_delay: Duration,
}

impl SweepTuneRequest {
    /// The 2014 schemas cannot repeat a sweep server-side, so each repeat
    /// becomes its own request and the inter-repeat delay is not expressible.
    pub fn encode(&self, version: ProtocolVersion) -> Result<Repeated, EncodeError> {
        if self.repeat_count == 0 {
            return Err(EncodeError::InvalidArgument(
                "SweepTune repeat count must be at least 1".into(),
            ));
        }
        let (start_attr, end_attr, rate_attr) = if version.is_blk15() {
            ("startWaveNumber", "stopWaveNumber", "sweepSpeed")
        } else {
            ("start", "end", "sweepRate")
        };
        let start = format::float(format::finite("start", self.start)?);
        let end = format::float(format::finite("end", self.end)?);
        let rate = format::float(format::finite("sweepRate", self.rate)?);
        let mut w = Writer::new();

        if version.predates_2015() {
            w.empty_with(
                SWEEP_TUNE,
                &[(start_attr, start.as_str()), (end_attr, end.as_str()), (rate_attr, rate.as_str())],
            );
            return Ok(Repeated {
                fragment: w.finish(),
                sends: self.repeat_count,
            });
        }

        let repeat = self.repeat_count.to_string();
        let delay = format::duration(self.inter_repeat_delay);
        w.empty_with(
            SWEEP_TUNE,
            &[
                (start_attr, start.as_str()),
                (end_attr, end.as_str()),
                (rate_attr, rate.as_str()),
                ("repeatCount", repeat.as_str()),
                ("interRepeatDelay", delay.as_str()),
            ],
        );
        Ok(Repeated::once(w.finish()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRequest {
    pub duration: Duration,
}

impl DelayRequest {
    pub fn encode(&self) -> String {
        let mut w = Writer::new();
        w.text(DELAY, &format::duration(self.duration));
        w.finish()
    }
}

/// The wave number the laser settled on.
pub fn decode_move_tune(root: &Element, version: ProtocolVersion) -> Result<f64, DecodeError> {
    Node::new(root, version).require("WaveNumber")?.parse()
}

/// Every wave number visited, in order.
pub fn decode_step_tune(root: &Element, version: ProtocolVersion) -> Result<Vec<f64>, DecodeError> {
    Node::new(root, version)
        .find_all("WaveNumber")
        .map(Node::parse)
        .collect()
}
