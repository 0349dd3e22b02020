use crate::encoding::format;
use crate::encoding::node::{insert_if, Node};
use crate::encoding::tree::Element;
use crate::encoding::writer::Writer;
use crate::types::{AlarmSelection, ToggleState, ToggleSwitch};
use crate::{CommandResult, DecodeError, ProtocolVersion};

pub const GET_DEVICE_NAME: &str = "GetDeviceName";
pub const SET_DEVICE_NAME: &str = "SetDeviceName";
pub const GET_POWER_STATE: &str = "GetPowerState";
pub const SET_POWER_STATE: &str = "SetPowerState";
pub const GET_ALARMS: &str = "GetAlarms";
pub const CLEAR_ALARMS: &str = "ClearAlarms";
pub const GET_BATTERY_STATUS: &str = "GetBatteryStatus";
pub const GET_VERSION_DETAILS: &str = "GetVersionDetails";
pub const GET_LASER_POINTER_ON: &str = "GetLaserPointerOn";
pub const SET_LASER_POINTER_ON: &str = "SetLaserPointerOn";
pub const GET_TOGGLE_SWITCH_STATE: &str = "GetToggleSwitchState";
pub const SET_TOGGLE_SWITCH_STATE: &str = "SetToggleSwitchState";

const VERSION_DETAIL_FIELDS: [&str; 7] = [
    "ModelName",
    "ModelNumber",
    "FactorySerialNumber",
    "ACU-FPGA-SoftwareVersion",
    "CCU-FPGA-SoftwareVersion",
    "BLK-Controller-SoftwareVersion",
    "OS-SoftwareVersion",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetDeviceNameRequest<'a> {
    pub name: &'a str,
}

impl SetDeviceNameRequest<'_> {
    pub fn encode(&self) -> String {
        let mut w = Writer::new();
        w.text(SET_DEVICE_NAME, self.name);
        w.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetPowerStateRequest<'a> {
    pub state: &'a str,
}

impl SetPowerStateRequest<'_> {
    pub fn encode(&self) -> String {
        let mut w = Writer::new();
        w.text(SET_POWER_STATE, self.state);
        w.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearAlarmsRequest {
    pub selection: AlarmSelection,
}

impl ClearAlarmsRequest {
    pub fn encode(&self) -> String {
        let mut w = Writer::new();
        w.start(CLEAR_ALARMS);
        match &self.selection {
            AlarmSelection::All => {
                w.empty("All");
            }
            AlarmSelection::Only(kinds) => {
                w.start("Alarms");
                for kind in kinds {
                    w.text("Alarm", kind.as_str());
                }
                w.end("Alarms");
            }
        }
        w.end(CLEAR_ALARMS);
        w.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetLaserPointerRequest {
    pub on: bool,
}

impl SetLaserPointerRequest {
    pub fn encode(&self) -> String {
        let mut w = Writer::new();
        w.text(SET_LASER_POINTER_ON, format::boolean(self.on));
        w.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetToggleSwitchStateRequest {
    pub which: ToggleSwitch,
}

impl GetToggleSwitchStateRequest {
    pub fn encode(&self) -> String {
        let mut w = Writer::new();
        w.start(GET_TOGGLE_SWITCH_STATE)
            .text("Which", self.which.as_str())
            .end(GET_TOGGLE_SWITCH_STATE);
        w.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetToggleSwitchStateRequest {
    pub which: ToggleSwitch,
    pub state: ToggleState,
}

impl SetToggleSwitchStateRequest {
    pub fn encode(&self) -> String {
        let mut w = Writer::new();
        w.start(SET_TOGGLE_SWITCH_STATE)
            .text("Which", self.which.as_str())
            .text("State", self.state.as_str())
            .end(SET_TOGGLE_SWITCH_STATE);
        w.finish()
    }
}

fn response_text<'a>(
    root: &'a Element,
    version: ProtocolVersion,
    name: &'static str,
) -> Result<&'a str, DecodeError> {
    Ok(Node::new(root, version).require(name)?.text().trim())
}

pub fn decode_device_name(root: &Element, version: ProtocolVersion) -> Result<String, DecodeError> {
    response_text(root, version, "GetDeviceNameResponse").map(str::to_owned)
}

pub fn decode_power_state(root: &Element, version: ProtocolVersion) -> Result<String, DecodeError> {
    response_text(root, version, "GetPowerStateResponse").map(str::to_owned)
}

pub fn decode_laser_pointer(root: &Element, version: ProtocolVersion) -> Result<bool, DecodeError> {
    response_text(root, version, "GetLaserPointerOnResponse").map(format::parse_boolean)
}

pub fn decode_toggle_state(
    root: &Element,
    version: ProtocolVersion,
) -> Result<ToggleState, DecodeError> {
    let text = response_text(root, version, "GetToggleSwitchStateResponse")?;
    text.parse()
        .map_err(|_| DecodeError::invalid("GetToggleSwitchStateResponse", text))
}

/// Every `Alarm` in the response, active or remaining after a clear.
pub fn decode_alarms(root: &Element, version: ProtocolVersion) -> Vec<String> {
    Node::new(root, version)
        .find_all("Alarm")
        .map(|n| n.text().trim().to_owned())
        .collect()
}

pub fn decode_battery_status(
    root: &Element,
    version: ProtocolVersion,
) -> Result<CommandResult, DecodeError> {
    let doc = Node::new(root, version);
    let mut out = CommandResult::new();
    insert_if(&mut out, "BatteryCapable", doc.find("BatteryCapable"), Node::boolean)?;
    insert_if(&mut out, "BatteryPresent", doc.find("BatteryPresent"), Node::boolean)?;
    insert_if(
        &mut out,
        "BatteryPercentCharged",
        doc.find("BatteryPercentCharged"),
        Node::float,
    )?;
    insert_if(
        &mut out,
        "ExternalPowerPresent",
        doc.find("ExternalPowerPresent"),
        Node::boolean,
    )?;
    insert_if(&mut out, "Charging", doc.find("Charging"), Node::boolean)?;
    Ok(out)
}

pub fn decode_version_details(
    root: &Element,
    version: ProtocolVersion,
) -> Result<CommandResult, DecodeError> {
    let doc = Node::new(root, version);
    let mut out = CommandResult::new();
    for field in VERSION_DETAIL_FIELDS {
        insert_if(&mut out, field, doc.find(field), Node::string)?;
    }
    Ok(out)
}
