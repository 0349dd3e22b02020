wire_enum! {
    /// Alarm conditions the controller can raise.
    pub enum AlarmKind {
        CriticalCannotTalkToFpga => "Critical_CannotTalkToFPGA",
        CriticalLaserOverDriving => "Critical_LaserOverDriving",
        CriticalLaserOverheating => "Critical_LaserOverheating",
        CriticalMirrorOverCurrent => "Critical_MirrorOverCurrent",
        CriticalMirrorNoCurrent => "Critical_MirrorNoCurrent",
        CriticalSystemOverTemperature => "Critical_SystemOverTemperature",
        CriticalLowVoltageFromPowerBoard => "Critical_LowVoltageFromPowerBoard",
        ErrorLaserTemperatureNotSettled => "Error_LaserTemperatureNotSettled",
        ErrorSystemTemperatureNotSettled => "Error_SystemTemperatureNotSettled",
        ErrorDetectorTemperatureNotLocked => "Error_DetectorTemperatureNotLocked",
        ErrorThermalControlFault => "Error_ThermalControlFault",
        ErrorPulseParameterFault => "Error_PulseParameterFault",
        WarningAmbientTemperatureTooHigh => "Warning_AmbientTemperatureTooHigh",
        WarningVibrationTooHigh => "Warning_VibrationTooHigh",
        WarningDetectorSignalTooCloseToSaturationLevel => "Warning_DetectorSignalTooCloseToSaturationLevel",
        WarningLaserImpedenceTooHigh => "Warning_LaserImpedenceTooHigh",
        WarningMirrorImpedenceTooHigh => "Warning_MirrorImpedenceTooHigh",
        WarningCalibrationTooHigh => "Warning_CalibrationTooHigh",
        WarningUserDiskspaceLow => "Warning_UserDiskspaceLow",
    }
}

impl AlarmKind {
    pub fn is_critical(self) -> bool {
        self.as_str().starts_with("Critical_")
    }
}

/// Which alarms `ClearAlarms` should clear.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AlarmSelection {
    #[default]
    All,
    Only(Vec<AlarmKind>),
}

impl AlarmSelection {
    pub fn parse<I, S>(names: I) -> Result<Self, crate::EncodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()
            .map(Self::Only)
    }
}

impl From<Vec<AlarmKind>> for AlarmSelection {
    fn from(kinds: Vec<AlarmKind>) -> Self {
        Self::Only(kinds)
    }
}
