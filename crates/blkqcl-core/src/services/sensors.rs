use crate::encoding::node::{insert_if, Node};
use crate::encoding::tree::Element;
use crate::encoding::writer::Writer;
use crate::types::SensorSelection;
use crate::{CommandResult, DecodeError, EncodeError, ProtocolVersion, Value};

pub const READ_SENSORS: &str = "ReadSensors";

const SCALAR_READINGS: [&str; 13] = [
    "DetectorTemperature",
    "SystemTemperature",
    "OpticsTemperature",
    "ExternalPressure1",
    "ExternalPressure2",
    "ExternalPressure3",
    "ExternalPressure4",
    "ExternalTemperature1",
    "ExternalTemperature2",
    "ExternalTemperature3",
    "ExternalTemperature4",
    "ElectricalBoardTemperature",
    "SystemHumidity",
];

/// Per-tuner groups: container element and the child that carries a reading.
const TUNER_READINGS: [(&str, &str); 3] = [
    ("LaserTemperature", "Temperature"),
    ("LaserCurrent", "Current"),
    ("LaserVoltage", "Voltage"),
];

const ACCELEROMETER_AXES: [&str; 6] = [
    "AngularVelocityX",
    "AngularVelocityY",
    "AngularVelocityZ",
    "AccelerationX",
    "AccelerationY",
    "AccelerationZ",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadSensorsRequest {
    pub selection: SensorSelection,
}

impl ReadSensorsRequest {
    pub fn encode(&self) -> Result<String, EncodeError> {
        let mut w = Writer::new();
        w.start(READ_SENSORS);
        match &self.selection {
            SensorSelection::All => {
                w.empty("All");
            }
            SensorSelection::Only(kinds) if kinds.is_empty() => {
                return Err(EncodeError::InvalidArgument(
                    "sensor selection is empty".into(),
                ));
            }
            SensorSelection::Only(kinds) => {
                for kind in kinds {
                    w.text("Sensor", kind.as_str());
                }
            }
        }
        w.end(READ_SENSORS);
        Ok(w.finish())
    }
}

/// Decodes whichever readings the controller returned. Tuner groups are keyed
/// by the `Tuner` attribute (`"1"`..`"4"`).
pub fn decode_sensor_readings(
    root: &Element,
    version: ProtocolVersion,
) -> Result<CommandResult, DecodeError> {
    let doc = Node::new(root, version);
    let mut out = CommandResult::new();

    for field in SCALAR_READINGS {
        insert_if(&mut out, field, doc.find(field), Node::float)?;
    }

    for (group, reading) in TUNER_READINGS {
        if let Some(node) = doc.find(group) {
            out.insert(group, per_tuner(node, reading)?);
        }
    }

    if let Some(node) = doc.find("Accelerometer") {
        let mut axes = CommandResult::new();
        for axis in ACCELEROMETER_AXES {
            insert_if(&mut axes, axis, node.find(axis), Node::float)?;
        }
        out.insert("Accelerometer", axes);
    }

    insert_if(&mut out, "ActiveLaser", doc.find("ActiveLaser"), Node::int)?;
    insert_if(
        &mut out,
        "ActiveLaserWaveNumber",
        doc.find("ActiveLaserWaveNumber"),
        Node::float,
    )?;
    insert_if(&mut out, "RangeFinder", doc.find("RangeFinder"), Node::float)?;
    Ok(out)
}

fn per_tuner(group: Node<'_>, reading: &str) -> Result<Value, DecodeError> {
    let mut tuners = CommandResult::new();
    for node in group.find_all(reading) {
        let Ok(tuner) = node.attribute("Tuner") else {
            continue;
        };
        if !tuners.contains_key(tuner) {
            tuners.insert(tuner, node.float()?);
        }
    }
    Ok(Value::Map(tuners))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope;
    use crate::types::SensorKind;

    #[test]
    fn request_shapes() {
        let all = ReadSensorsRequest {
            selection: SensorSelection::All,
        };
        assert_eq!(all.encode().unwrap(), "<blk:ReadSensors><blk:All/></blk:ReadSensors>");

        let some = ReadSensorsRequest {
            selection: SensorSelection::Only(vec![
                SensorKind::LaserCurrent,
                SensorKind::SystemHumidity,
            ]),
        };
        assert_eq!(
            some.encode().unwrap(),
            "<blk:ReadSensors><blk:Sensor>LaserCurrent</blk:Sensor>\
             <blk:Sensor>SystemHumidity</blk:Sensor></blk:ReadSensors>"
        );

        let none = ReadSensorsRequest {
            selection: SensorSelection::Only(vec![]),
        };
        assert!(none.encode().is_err());
    }

    #[test]
    fn decodes_groups_and_scalars() {
        let v = ProtocolVersion::V2017_04;
        let body = "<blk:ReadSensorsResponse>\
            <blk:SystemTemperature>31.5</blk:SystemTemperature>\
            <blk:LaserCurrent><blk:Current Tuner=\"1\">0.25</blk:Current>\
            <blk:Current Tuner=\"3\">0.5</blk:Current></blk:LaserCurrent>\
            <blk:Accelerometer><blk:AccelerationX>0.1</blk:AccelerationX>\
            <blk:AccelerationZ>9.8</blk:AccelerationZ></blk:Accelerometer>\
            <blk:ActiveLaser>2</blk:ActiveLaser>\
            </blk:ReadSensorsResponse>";
        let root = envelope::unwrap(envelope::wrap(body, v).as_bytes()).unwrap();
        let r = decode_sensor_readings(&root, v).unwrap();

        assert_eq!(r.get("SystemTemperature"), Some(&Value::Float(31.5)));
        assert_eq!(r.get("ActiveLaser"), Some(&Value::Int(2)));
        let current = r.get("LaserCurrent").and_then(Value::as_map).unwrap();
        assert_eq!(current.get("1"), Some(&Value::Float(0.25)));
        assert_eq!(current.get("3"), Some(&Value::Float(0.5)));
        assert!(!current.contains_key("2"));
        let accel = r.get("Accelerometer").and_then(Value::as_map).unwrap();
        assert_eq!(accel.len(), 2);
        assert!(!r.contains_key("LaserTemperature"));
        assert!(!r.contains_key("DetectorTemperature"));
    }
}
