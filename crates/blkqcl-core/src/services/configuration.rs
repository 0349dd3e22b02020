//! Factory and user settings.
//!
//! Settings travel as presence-sparse [`CommandResult`] maps. The same field
//! table drives both directions, so a map read from a device can be written
//! back unchanged, including on the BLK-15 schema where several elements
//! carry their older names.

use crate::encoding::node::{insert_if, Node};
use crate::encoding::tree::Element;
use crate::encoding::writer::Writer;
use crate::services::scalar_text;
use crate::value::Bounds;
use crate::{CommandResult, DecodeError, EncodeError, Pid, ProtocolVersion, Value};

pub const GET_FACTORY_SETTINGS: &str = "GetFactorySettings";
pub const SET_FACTORY_SETTINGS: &str = "SetFactorySettings";
pub const RESET_TO_FACTORY_DEFAULTS: &str = "ResetToFactoryDefaults";
pub const GET_USER_SETTINGS: &str = "GetUserSettings";
pub const SET_USER_SETTINGS: &str = "SetUserSettings";

/// A result key whose element was renamed after the BLK-15 schema.
#[derive(Debug, Clone, Copy)]
struct Renamed {
    key: &'static str,
    blk15: &'static str,
}

impl Renamed {
    const fn tag(self, version: ProtocolVersion) -> &'static str {
        if version.is_blk15() {
            self.blk15
        } else {
            self.key
        }
    }

    const fn other_tag(self, version: ProtocolVersion) -> &'static str {
        if version.is_blk15() {
            self.key
        } else {
            self.blk15
        }
    }
}

const DETECTOR_SET_POINT_RANGE: Renamed = Renamed {
    key: "DetectorTemperatureSetPointRange",
    blk15: "CCUTemperatureSetPointRange",
};
const DETECTOR_PID: Renamed = Renamed {
    key: "DetectorTECPIDParameters",
    blk15: "CCUTECPIDParameters",
};
const SYSTEM_TEMPERATURE_RANGE: Renamed = Renamed {
    key: "SystemTemperatureRange",
    blk15: "EnvironmentalOperationTemperatures",
};
const DETECTOR_SET_POINT: Renamed = Renamed {
    key: "DetectorTemperatureSetPoint",
    blk15: "CCUTemperatureSetPoint",
};

const IDLE_POWER_STATES: [&str; 4] = ["Off", "Hibernate", "Sleep", "LaserNotReady"];

const REFERENCE_NORMALIZATION: [&str; 5] = [
    "ScanningSpeed",
    "NumberOfSamples",
    "LaserTemperature",
    "StartPosition",
    "StopPosition",
];

const MIRROR_RELATION: [&str; 2] = ["Slope", "YIntercept"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetFactorySettingsRequest<'a> {
    pub settings: &'a CommandResult,
}

impl SetFactorySettingsRequest<'_> {
    pub fn encode(&self, version: ProtocolVersion) -> Result<String, EncodeError> {
        let mut w = Writer::new();
        w.start(SET_FACTORY_SETTINGS);
        write_factory_fields(&mut w, self.settings, version)?;
        w.end(SET_FACTORY_SETTINGS);
        Ok(w.finish())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetUserSettingsRequest<'a> {
    pub settings: &'a CommandResult,
}

impl SetUserSettingsRequest<'_> {
    pub fn encode(&self, version: ProtocolVersion) -> Result<String, EncodeError> {
        let mut w = Writer::new();
        w.start(SET_USER_SETTINGS);
        write_user_fields(&mut w, self.settings, version)?;
        w.end(SET_USER_SETTINGS);
        Ok(w.finish())
    }
}

pub fn decode_factory_settings(
    root: &Element,
    version: ProtocolVersion,
) -> Result<CommandResult, DecodeError> {
    let response = Node::new(root, version).require("GetFactorySettingsResponse")?;
    decode_factory_fields(response, version)
}

pub fn decode_user_settings(
    root: &Element,
    version: ProtocolVersion,
) -> Result<CommandResult, DecodeError> {
    let response = Node::new(root, version).require("GetUserSettingsResponse")?;
    decode_user_fields(response, version)
}

fn decode_factory_fields(
    node: Node<'_>,
    version: ProtocolVersion,
) -> Result<CommandResult, DecodeError> {
    let mut out = CommandResult::new();
    insert_if(&mut out, "BiasDAC", node.find("BiasDAC"), Node::int)?;
    if let Some(defaults) = node.find("DefaultUserSettings") {
        out.insert("DefaultUserSettings", decode_user_fields(defaults, version)?);
    }
    insert_if(
        &mut out,
        DETECTOR_SET_POINT_RANGE.key,
        node.find(DETECTOR_SET_POINT_RANGE.tag(version)),
        Node::float_range,
    )?;
    insert_if(
        &mut out,
        DETECTOR_PID.key,
        node.find(DETECTOR_PID.tag(version)),
        Node::pid,
    )?;
    insert_if(&mut out, "DetectorDarkMode", node.find("DetectorDarkMode"), Node::string)?;

    if let Some(stitches) = node.find("LaserStitchPoints") {
        let mut points = Vec::new();
        for explicit in stitches.children("Explicit") {
            let mut point = CommandResult::new();
            insert_if(&mut point, "LowerTuner", explicit.child("LowerTuner"), Node::int)?;
            insert_if(&mut point, "UpperTuner", explicit.child("UpperTuner"), Node::int)?;
            insert_if(&mut point, "WaveNumber", explicit.child("WaveNumber"), Node::float)?;
            points.push(Value::Map(point));
        }
        out.insert("LaserStitchPoints", Value::List(points));
    }

    insert_if(
        &mut out,
        "LaserPulseDurationLimit",
        node.find("LaserPulseDurationLimit"),
        Node::text_range,
    )?;
    insert_if(
        &mut out,
        "LaserDutyCycleLimit",
        node.find("LaserDutyCycleLimit"),
        Node::float,
    )?;
    insert_if(&mut out, "LightToPostDark", node.find("LightToPostDark"), Node::string)?;
    insert_if(
        &mut out,
        "MirrorMoveSmoothingDuration",
        node.find("MirrorMoveSmoothingDuration"),
        Node::string,
    )?;
    insert_if(
        &mut out,
        "OpticsTemperatureRange",
        node.find("OpticsTemperatureRange"),
        Node::float_range,
    )?;
    insert_if(&mut out, "PreDarkToLight", node.find("PreDarkToLight"), Node::string)?;
    insert_if(
        &mut out,
        "SampleDelayRange",
        node.find("SampleDelayRange"),
        Node::text_range,
    )?;
    insert_if(
        &mut out,
        SYSTEM_TEMPERATURE_RANGE.key,
        node.find(SYSTEM_TEMPERATURE_RANGE.tag(version)),
        Node::float_range,
    )?;

    if let Some(features) = node.find("SupportedFeatures") {
        let list = features
            .find_all("SupportedFeature")
            .map(|n| Value::Text(n.text().trim().to_owned()))
            .collect();
        out.insert("SupportedFeatures", Value::List(list));
    }

    if let Some(toggles) = node.find("ToggleSwitchInitialValues") {
        let mut initial = CommandResult::new();
        for pair in toggles.find_all("SwitchAndValue") {
            initial.insert(pair.attribute("Switch")?, pair.attribute("InitialValue")?);
        }
        out.insert("ToggleSwitchInitialValues", initial);
    }

    if let Some(tuners) = node.find("Tuners") {
        let mut by_id = CommandResult::new();
        for tuner in tuners.children("Tuner") {
            by_id.insert(tuner.attribute("Tuner")?, decode_tuner(tuner)?);
        }
        out.insert("Tuners", by_id);
    }
    Ok(out)
}

fn decode_tuner(node: Node<'_>) -> Result<CommandResult, DecodeError> {
    let mut out = CommandResult::new();
    insert_if(
        &mut out,
        "ReferenceLaserVoltage",
        node.find("ReferenceLaserVoltage"),
        Node::float,
    )?;
    insert_if(
        &mut out,
        "LaserWaveNumberRanges",
        node.find("LaserWaveNumberRanges"),
        Node::float_range,
    )?;
    insert_if(
        &mut out,
        "TunerTECControlParameters",
        node.find("TunerTECControlParameters"),
        Node::pid,
    )?;
    insert_if(
        &mut out,
        "TECCurrentUpperBound",
        node.find("TECCurrentUpperBound"),
        Node::float,
    )?;
    if let Some(relation) = node.find("MirrorCurrentToDriveVoltageRelation") {
        let mut fields = CommandResult::new();
        for field in MIRROR_RELATION {
            insert_if(&mut fields, field, relation.find(field), Node::float)?;
        }
        out.insert("MirrorCurrentToDriveVoltageRelation", fields);
    }
    insert_if(
        &mut out,
        "LaserOperationTemperatures",
        node.find("LaserOperationTemperatures"),
        Node::float_range,
    )?;
    insert_if(
        &mut out,
        "LaserPumpingVoltageBounds",
        node.find("LaserPumpingVoltageBounds"),
        Node::float_range,
    )?;
    for field in [
        "LaserFixedPumpingVoltage",
        "LaserMaximumPumpingCurrent",
        "ReferenceMirrorPosition",
    ] {
        insert_if(&mut out, field, node.find(field), Node::float)?;
    }
    insert_if(
        &mut out,
        "MirrorMovementRange",
        node.find("MirrorMovementRange"),
        Node::int_range,
    )?;
    insert_if(
        &mut out,
        "MirrorOperationFrequency",
        node.find("MirrorOperationFrequency"),
        Node::float,
    )?;

    if let Some(table) = node.find("LaserVariablePumpingVoltage") {
        let rows = table
            .children("PumpingVoltage")
            .map(|row| -> Result<_, DecodeError> {
                Ok((Value::Float(row.parse_attribute("waveNumber")?), row.float()?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        out.insert("LaserVariablePumpingVoltage", Value::Table(rows));
    }
    if let Some(table) = node.find("WaveNumberToDriveVoltageCalibrationTable") {
        let rows = table
            .children("Map")
            .map(|row| -> Result<_, DecodeError> {
                Ok((
                    Value::Float(row.parse_attribute("waveNumber")?),
                    Value::Int(row.parse_attribute("drivingVoltage")?),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        out.insert("WaveNumberToDriveVoltageCalibrationTable", Value::Table(rows));
    }
    if let Some(table) = node.find("CurrentToWaveNumberCalibrationTable") {
        let rows = table
            .children("Map")
            .map(|row| -> Result<_, DecodeError> {
                Ok((
                    Value::Int(row.parse_attribute("ADC")?),
                    Value::Float(row.parse_attribute("waveNumber")?),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        out.insert("CurrentToWaveNumberCalibrationTable", Value::Table(rows));
    }

    if let Some(params) = node.find("ReferenceNormalizationParameters") {
        let mut fields = CommandResult::new();
        for field in REFERENCE_NORMALIZATION {
            insert_if(&mut fields, field, params.find(field), Node::float)?;
        }
        out.insert("ReferenceNormalizationParameters", fields);
    }
    Ok(out)
}

fn decode_user_fields(node: Node<'_>, version: ProtocolVersion) -> Result<CommandResult, DecodeError> {
    let mut out = CommandResult::new();
    if let Some(temperatures) = node.find("LaserTemperature") {
        out.insert("LaserTemperature", tuner_floats(temperatures)?);
    }
    if let Some(pumping) = node.find("LaserPumpingVoltage") {
        out.insert("LaserPumpingVoltage", decode_pumping_voltage(pumping, version)?);
    }
    insert_if(&mut out, "SystemTemperature", node.find("SystemTemperature"), Node::float)?;
    insert_if(&mut out, "PulsePeriod", node.find("PulsePeriod"), Node::string)?;
    insert_if(&mut out, "PulseDuration", node.find("PulseDuration"), Node::string)?;
    insert_if(&mut out, "LaserControlMode", node.find("LaserControlMode"), Node::string)?;
    insert_if(
        &mut out,
        "ContinueFiringAfterInterleavedScans",
        node.find("ContinueFiringAfterInterleavedScans"),
        Node::boolean,
    )?;
    insert_if(
        &mut out,
        "AutomaticallyAdjustInterleavedScanLag",
        node.find("AutomaticallyAdjustInterleavedScanLag"),
        Node::boolean,
    )?;
    insert_if(&mut out, "TRIG_OUTDelayTime", node.find("TRIG_OUTDelayTime"), Node::string)?;
    if let Some(idle) = node.find("IdleAutoPowerStateChanges") {
        let mut states = CommandResult::new();
        for state in IDLE_POWER_STATES {
            insert_if(&mut states, state, idle.find(state), Node::string)?;
        }
        out.insert("IdleAutoPowerStateChanges", states);
    }
    insert_if(&mut out, "MonitorDACEnable", node.find("MonitorDACEnable"), Node::boolean)?;
    insert_if(&mut out, "GainDAC", node.find("GainDAC"), Node::int)?;
    insert_if(&mut out, "SampleDelay", node.find("SampleDelay"), Node::string)?;
    insert_if(&mut out, "SampleWidth", node.find("SampleWidth"), Node::string)?;
    // Some firmware reports the set point under the BLK-15 name on every schema.
    let set_point = node
        .find(DETECTOR_SET_POINT.tag(version))
        .or_else(|| node.find(DETECTOR_SET_POINT.other_tag(version)));
    insert_if(&mut out, DETECTOR_SET_POINT.key, set_point, Node::float)?;
    insert_if(&mut out, "OnDiskspaceLow", node.find("OnDiskspaceLow"), Node::string)?;
    insert_if(
        &mut out,
        "DeleteScansOlderThan",
        node.find("DeleteScansOlderThan"),
        Node::string,
    )?;
    Ok(out)
}

/// `Tuner` elements keyed by their `Tuner` attribute; the first occurrence wins.
fn tuner_floats(node: Node<'_>) -> Result<Value, DecodeError> {
    let mut tuners = CommandResult::new();
    for tuner in node.find_all("Tuner") {
        let id = tuner.attribute("Tuner")?;
        if !tuners.contains_key(id) {
            tuners.insert(id, tuner.float()?);
        }
    }
    Ok(Value::Map(tuners))
}

fn decode_pumping_voltage(node: Node<'_>, version: ProtocolVersion) -> Result<Value, DecodeError> {
    let mut out = CommandResult::new();
    if version.is_blk15() {
        match node.find("Fixed") {
            Some(fixed) => out.insert("Fixed", tuner_floats(fixed)?),
            None => out.insert("Variable", true),
        };
        return Ok(Value::Map(out));
    }
    for tuner in node.find_all("Tuner") {
        let id = tuner.attribute("Tuner")?;
        if out.contains_key(id) {
            continue;
        }
        if let Some(fixed) = tuner.child("Fixed") {
            let mut setting = CommandResult::new();
            setting.insert("Fixed", fixed.parse_attribute::<f64>("Voltage")?);
            out.insert(id, setting);
        } else if tuner.child("Variable").is_some() {
            out.insert(id, "Variable");
        }
    }
    Ok(Value::Map(out))
}

fn invalid_field(field: &str, expected: &'static str) -> EncodeError {
    EncodeError::InvalidField {
        field: field.to_owned(),
        expected,
    }
}

fn map_field<'a>(field: &str, value: &'a Value) -> Result<&'a CommandResult, EncodeError> {
    value.as_map().ok_or_else(|| invalid_field(field, "a map"))
}

fn write_scalar(
    w: &mut Writer,
    settings: &CommandResult,
    key: &str,
    tag: &str,
) -> Result<(), EncodeError> {
    if let Some(value) = settings.get(key) {
        w.text(tag, &scalar_text(key, value)?);
    }
    Ok(())
}

fn write_scalars(w: &mut Writer, settings: &CommandResult, keys: &[&str]) -> Result<(), EncodeError> {
    for key in keys {
        write_scalar(w, settings, key, key)?;
    }
    Ok(())
}

fn write_range(
    w: &mut Writer,
    settings: &CommandResult,
    key: &str,
    tag: &str,
) -> Result<(), EncodeError> {
    let Some(value) = settings.get(key) else {
        return Ok(());
    };
    let Bounds { lower, upper } = value
        .as_range()
        .ok_or_else(|| invalid_field(key, "a range"))?;
    let upper = scalar_text(key, upper)?;
    let lower = scalar_text(key, lower)?;
    w.empty_with(
        tag,
        &[("upperBound", upper.as_str()), ("lowerBound", lower.as_str())],
    );
    Ok(())
}

fn write_pid(
    w: &mut Writer,
    settings: &CommandResult,
    key: &str,
    tag: &str,
) -> Result<(), EncodeError> {
    let Some(value) = settings.get(key) else {
        return Ok(());
    };
    let Pid { p, i, d } = *value
        .as_pid()
        .ok_or_else(|| invalid_field(key, "PID gains"))?;
    w.start(tag)
        .text("P", &p.to_string())
        .text("I", &i.to_string())
        .text("D", &d.to_string())
        .end(tag);
    Ok(())
}

fn write_nested(
    w: &mut Writer,
    settings: &CommandResult,
    key: &str,
    fields: &[&str],
) -> Result<(), EncodeError> {
    let Some(value) = settings.get(key) else {
        return Ok(());
    };
    let nested = map_field(key, value)?;
    w.start(key);
    write_scalars(w, nested, fields)?;
    w.end(key);
    Ok(())
}

fn write_factory_fields(
    w: &mut Writer,
    settings: &CommandResult,
    version: ProtocolVersion,
) -> Result<(), EncodeError> {
    write_range(
        w,
        settings,
        SYSTEM_TEMPERATURE_RANGE.key,
        SYSTEM_TEMPERATURE_RANGE.tag(version),
    )?;
    write_range(w, settings, "OpticsTemperatureRange", "OpticsTemperatureRange")?;

    if let Some(value) = settings.get("LaserStitchPoints") {
        let points = value
            .as_list()
            .ok_or_else(|| invalid_field("LaserStitchPoints", "a list"))?;
        w.start("LaserStitchPoints");
        for point in points {
            let point = map_field("LaserStitchPoints", point)?;
            w.start("Explicit");
            write_scalars(w, point, &["LowerTuner", "UpperTuner", "WaveNumber"])?;
            w.end("Explicit");
        }
        w.end("LaserStitchPoints");
    }

    write_range(w, settings, "LaserPulseDurationLimit", "LaserPulseDurationLimit")?;
    write_pid(w, settings, DETECTOR_PID.key, DETECTOR_PID.tag(version))?;
    write_range(
        w,
        settings,
        DETECTOR_SET_POINT_RANGE.key,
        DETECTOR_SET_POINT_RANGE.tag(version),
    )?;
    write_range(w, settings, "SampleDelayRange", "SampleDelayRange")?;
    write_scalars(
        w,
        settings,
        &[
            "BiasDAC",
            "PreDarkToLight",
            "LightToPostDark",
            "LaserDutyCycleLimit",
            "MirrorMoveSmoothingDuration",
            "DetectorDarkMode",
        ],
    )?;

    if let Some(value) = settings.get("ToggleSwitchInitialValues") {
        let initial = map_field("ToggleSwitchInitialValues", value)?;
        w.start("ToggleSwitchInitialValues");
        for (switch, state) in initial {
            let state = scalar_text("ToggleSwitchInitialValues", state)?;
            w.empty_with(
                "SwitchAndValue",
                &[("Switch", switch.as_str()), ("InitialValue", state.as_str())],
            );
        }
        w.end("ToggleSwitchInitialValues");
    }

    if let Some(value) = settings.get("Tuners") {
        let tuners = map_field("Tuners", value)?;
        w.start("Tuners");
        for (id, tuner) in tuners {
            let tuner = map_field("Tuners", tuner)?;
            w.start_with("Tuner", &[("Tuner", id.as_str())]);
            write_tuner(w, tuner)?;
            w.end("Tuner");
        }
        w.end("Tuners");
    }

    if let Some(value) = settings.get("DefaultUserSettings") {
        let defaults = map_field("DefaultUserSettings", value)?;
        w.start("DefaultUserSettings");
        write_user_fields(w, defaults, version)?;
        w.end("DefaultUserSettings");
    }

    if let Some(value) = settings.get("SupportedFeatures") {
        let features = value
            .as_list()
            .ok_or_else(|| invalid_field("SupportedFeatures", "a list"))?;
        w.start("SupportedFeatures");
        for feature in features {
            w.text("SupportedFeature", &scalar_text("SupportedFeatures", feature)?);
        }
        w.end("SupportedFeatures");
    }
    Ok(())
}

fn write_tuner(w: &mut Writer, tuner: &CommandResult) -> Result<(), EncodeError> {
    write_scalar(w, tuner, "ReferenceLaserVoltage", "ReferenceLaserVoltage")?;
    write_range(w, tuner, "LaserWaveNumberRanges", "LaserWaveNumberRanges")?;
    write_pid(w, tuner, "TunerTECControlParameters", "TunerTECControlParameters")?;
    write_scalar(w, tuner, "TECCurrentUpperBound", "TECCurrentUpperBound")?;
    write_nested(w, tuner, "MirrorCurrentToDriveVoltageRelation", &MIRROR_RELATION)?;
    write_range(w, tuner, "LaserOperationTemperatures", "LaserOperationTemperatures")?;
    write_range(w, tuner, "LaserPumpingVoltageBounds", "LaserPumpingVoltageBounds")?;
    write_scalars(
        w,
        tuner,
        &[
            "LaserFixedPumpingVoltage",
            "LaserMaximumPumpingCurrent",
            "ReferenceMirrorPosition",
        ],
    )?;
    write_range(w, tuner, "MirrorMovementRange", "MirrorMovementRange")?;
    write_scalar(w, tuner, "MirrorOperationFrequency", "MirrorOperationFrequency")?;

    write_table(w, tuner, "LaserVariablePumpingVoltage", |w, key, value| {
        w.text_with("PumpingVoltage", &[("waveNumber", key)], value);
    })?;
    write_table(
        w,
        tuner,
        "WaveNumberToDriveVoltageCalibrationTable",
        |w, key, value| {
            w.empty_with("Map", &[("waveNumber", key), ("drivingVoltage", value)]);
        },
    )?;
    write_table(
        w,
        tuner,
        "CurrentToWaveNumberCalibrationTable",
        |w, key, value| {
            w.empty_with("Map", &[("waveNumber", value), ("ADC", key)]);
        },
    )?;

    write_nested(
        w,
        tuner,
        "ReferenceNormalizationParameters",
        &REFERENCE_NORMALIZATION,
    )
}

fn write_table(
    w: &mut Writer,
    settings: &CommandResult,
    key: &str,
    row: impl Fn(&mut Writer, &str, &str),
) -> Result<(), EncodeError> {
    let Some(value) = settings.get(key) else {
        return Ok(());
    };
    let rows = value
        .as_table()
        .ok_or_else(|| invalid_field(key, "a table"))?;
    w.start(key);
    for (k, v) in rows {
        row(w, &scalar_text(key, k)?, &scalar_text(key, v)?);
    }
    w.end(key);
    Ok(())
}

fn write_user_fields(
    w: &mut Writer,
    settings: &CommandResult,
    version: ProtocolVersion,
) -> Result<(), EncodeError> {
    if let Some(value) = settings.get("LaserTemperature") {
        let tuners = map_field("LaserTemperature", value)?;
        w.start("LaserTemperature");
        write_tuner_values(w, "LaserTemperature", tuners)?;
        w.end("LaserTemperature");
    }
    if let Some(value) = settings.get("LaserPumpingVoltage") {
        let pumping = map_field("LaserPumpingVoltage", value)?;
        w.start("LaserPumpingVoltage");
        write_pumping_voltage(w, pumping, version)?;
        w.end("LaserPumpingVoltage");
    }
    write_scalars(
        w,
        settings,
        &[
            "SystemTemperature",
            "PulseDuration",
            "PulsePeriod",
            "LaserControlMode",
            "ContinueFiringAfterInterleavedScans",
            "AutomaticallyAdjustInterleavedScanLag",
            "TRIG_OUTDelayTime",
        ],
    )?;
    write_nested(w, settings, "IdleAutoPowerStateChanges", &IDLE_POWER_STATES)?;
    write_scalars(
        w,
        settings,
        &["MonitorDACEnable", "GainDAC", "SampleDelay", "SampleWidth"],
    )?;
    write_scalar(
        w,
        settings,
        DETECTOR_SET_POINT.key,
        DETECTOR_SET_POINT.tag(version),
    )?;
    write_scalars(w, settings, &["OnDiskspaceLow", "DeleteScansOlderThan"])
}

fn write_tuner_values(
    w: &mut Writer,
    field: &str,
    tuners: &CommandResult,
) -> Result<(), EncodeError> {
    for (id, value) in tuners {
        w.text_with("Tuner", &[("Tuner", id.as_str())], &scalar_text(field, value)?);
    }
    Ok(())
}

fn write_pumping_voltage(
    w: &mut Writer,
    pumping: &CommandResult,
    version: ProtocolVersion,
) -> Result<(), EncodeError> {
    if version.is_blk15() {
        if pumping.contains_key("Variable") {
            w.empty("Variable");
            return Ok(());
        }
        let fixed = pumping
            .get("Fixed")
            .ok_or_else(|| invalid_field("LaserPumpingVoltage", "Variable or Fixed"))?;
        w.start("Fixed");
        write_tuner_values(w, "LaserPumpingVoltage", map_field("LaserPumpingVoltage", fixed)?)?;
        w.end("Fixed");
        return Ok(());
    }

    for (id, setting) in pumping {
        w.start_with("Tuner", &[("Tuner", id.as_str())]);
        match setting {
            Value::Text(mode) if mode == "Variable" => {
                w.empty("Variable");
            }
            Value::Map(fixed) => {
                let voltage = fixed
                    .get("Fixed")
                    .ok_or_else(|| invalid_field("LaserPumpingVoltage", "Variable or Fixed"))?;
                let voltage = scalar_text("LaserPumpingVoltage", voltage)?;
                w.empty_with("Fixed", &[("Voltage", voltage.as_str())]);
            }
            _ => return Err(invalid_field("LaserPumpingVoltage", "Variable or Fixed")),
        }
        w.end("Tuner");
    }
    Ok(())
}
