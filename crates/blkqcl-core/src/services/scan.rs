use std::time::Duration;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::encoding::format;
use crate::encoding::writer::Writer;
use crate::types::{LaserTransition, ScanResolution};
use crate::{DecodeError, EncodeError, ProtocolVersion, Spectrum};

pub const STEP_SCAN: &str = "StepScan";
pub const SWEEP_SCAN: &str = "SweepScan";
pub const INTERLEAVED_SCAN: &str = "InterleavedScan";

/// Co-adding parameters shared by every scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoAdd {
    pub scans_per_spectrum: u32,
    pub delay_between: Duration,
}

impl Default for CoAdd {
    fn default() -> Self {
        Self {
            scans_per_spectrum: 1,
            delay_between: Duration::ZERO,
        }
    }
}

impl CoAdd {
    fn write(&self, w: &mut Writer) -> Result<(), EncodeError> {
        if self.scans_per_spectrum == 0 {
            return Err(EncodeError::InvalidArgument(
                "scans per spectrum must be at least 1".into(),
            ));
        }
        w.text("ScansPerSpectrum", &self.scans_per_spectrum.to_string())
            .text("DelayBetweenCoAdds", &format::duration(self.delay_between));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepScanRequest {
    pub start: f64,
    pub end: f64,
    pub delta: f64,
    pub dwell: Duration,
    pub transition: LaserTransition,
    pub co_add: CoAdd,
}

impl StepScanRequest {
    pub fn encode(&self, version: ProtocolVersion) -> Result<String, EncodeError> {
        let dwell = format::duration(self.dwell);
        let mut w = Writer::new();
        w.start(STEP_SCAN)
            .text("Start", &format::float(format::finite("start", self.start)?))
            .text("End", &format::float(format::finite("end", self.end)?))
            .text("Delta", &format::float(format::finite("delta", self.delta)?));
        if version.is_blk15() {
            w.text("DuringTransition", self.transition.as_str())
                .text("StepDwellTime", &dwell);
        } else {
            w.text("DwellTime", &dwell)
                .text("DuringTransition", self.transition.as_str());
        }
        self.co_add.write(&mut w)?;
        w.end(STEP_SCAN);
        Ok(w.finish())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepScanRequest {
    pub start: f64,
    pub end: f64,
    pub rate: f64,
    pub resolution: ScanResolution,
    pub co_add: CoAdd,
}

impl SweepScanRequest {
    pub fn encode(&self) -> Result<String, EncodeError> {
        let mut w = Writer::new();
        w.start(SWEEP_SCAN)
            .text("Start", &format::float(format::finite("start", self.start)?))
            .text("End", &format::float(format::finite("end", self.end)?))
            .text("SweepRate", &format::float(format::finite("sweepRate", self.rate)?))
            .text("ScanResolution", &resolution_text(self.resolution)?);
        self.co_add.write(&mut w)?;
        w.end(SWEEP_SCAN);
        Ok(w.finish())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterleavedScanRequest {
    pub measurement_time: Duration,
    pub resolution: ScanResolution,
    pub co_add: CoAdd,
}

impl InterleavedScanRequest {
    pub fn encode(&self, version: ProtocolVersion) -> Result<String, EncodeError> {
        let resolution = resolution_text(self.resolution)?;
        let time = format::duration(self.measurement_time);
        let mut w = Writer::new();
        w.start(INTERLEAVED_SCAN);
        if version.is_blk15() {
            w.text("DeltaResolution", &resolution)
                .text("SingleSpectrumMeasurementTime", &time);
        } else {
            w.text("SingleSpectrumMeasurementTime", &time)
                .text("ScanResolution", &resolution);
        }
        self.co_add.write(&mut w)?;
        w.end(INTERLEAVED_SCAN);
        Ok(w.finish())
    }
}

fn resolution_text(resolution: ScanResolution) -> Result<String, EncodeError> {
    if let ScanResolution::WaveNumbers(v) = resolution {
        format::finite("scanResolution", v)?;
    }
    Ok(resolution.to_string())
}

/// A decoded scan response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    pub spectrum: Spectrum,
    pub timestamp: Option<f64>,
}

/// Streams over the raw response, collecting every `Measurement` element's
/// `waveNumber`/`intensity` attributes (in either order, any prefix) and the
/// first `timestamp`. No tree is built; scan responses can be large.
pub fn decode_spectrum(body: &[u8]) -> Result<ScanResult, DecodeError> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();
    let mut result = ScanResult::default();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut in_timestamp = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                saw_root = true;
                match e.local_name().as_ref() {
                    b"Measurement" => push_measurement(&e, &mut result.spectrum)?,
                    b"timestamp" => in_timestamp = result.timestamp.is_none(),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                saw_root = true;
                if e.local_name().as_ref() == b"Measurement" {
                    push_measurement(&e, &mut result.spectrum)?;
                }
            }
            Event::Text(t) if in_timestamp => {
                let text = t.unescape()?;
                let value = text
                    .trim()
                    .parse()
                    .map_err(|_| DecodeError::invalid("timestamp", &*text))?;
                result.timestamp = Some(value);
                in_timestamp = false;
            }
            Event::End(e) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    DecodeError::Xml("unbalanced end tag".into())
                })?;
                if e.local_name().as_ref() == b"timestamp" {
                    in_timestamp = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(DecodeError::UnexpectedEof);
    }
    if !saw_root {
        return Err(DecodeError::EmptyDocument);
    }
    Ok(result)
}

fn push_measurement(e: &BytesStart<'_>, spectrum: &mut Spectrum) -> Result<(), DecodeError> {
    let mut wave_number = None;
    let mut intensity = None;
    for attr in e.attributes() {
        let attr = attr?;
        let slot = match attr.key.local_name().as_ref() {
            b"waveNumber" => &mut wave_number,
            b"intensity" => &mut intensity,
            _ => continue,
        };
        let raw = attr.unescape_value()?;
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| DecodeError::invalid("Measurement", &*raw))?;
        *slot = Some(value);
    }
    let missing = |attribute| DecodeError::MissingAttribute {
        element: "Measurement".into(),
        attribute,
    };
    spectrum.insert(
        wave_number.ok_or_else(|| missing("waveNumber"))?,
        intensity.ok_or_else(|| missing("intensity"))?,
    );
    Ok(())
}
