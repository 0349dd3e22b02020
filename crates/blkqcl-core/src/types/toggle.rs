wire_enum! {
    pub enum ToggleSwitch {
        FanA => "FanA",
        FanB => "FanB",
        SolenoidA => "SolenoidA",
        SolenoidB => "SolenoidB",
    }
}

wire_enum! {
    pub enum ToggleState {
        Off => "Off",
        On => "On",
    }
}

impl From<bool> for ToggleState {
    fn from(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}
