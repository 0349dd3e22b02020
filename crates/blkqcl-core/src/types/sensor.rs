wire_enum! {
    /// A sensor that `ReadSensors` can be asked for.
    pub enum SensorKind {
        Accelerometer => "Accelerometer",
        ActiveLaser => "ActiveLaser",
        DetectorTemperature => "DetectorTemperature",
        ElectricalBoardTemperature => "ElectricalBoardTemperature",
        ExternalPressure1 => "ExternalPressure1",
        ExternalPressure2 => "ExternalPressure2",
        ExternalPressure3 => "ExternalPressure3",
        ExternalPressure4 => "ExternalPressure4",
        ExternalTemperature1 => "ExternalTemperature1",
        ExternalTemperature2 => "ExternalTemperature2",
        ExternalTemperature3 => "ExternalTemperature3",
        ExternalTemperature4 => "ExternalTemperature4",
        LaserCurrent => "LaserCurrent",
        LaserTemperature => "LaserTemperature",
        LaserVoltage => "LaserVoltage",
        MirrorTemperature => "MirrorTemperature",
        RangeFinder => "RangeFinder",
        SystemHumidity => "SystemHumidity",
        SystemTemperature => "SystemTemperature",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SensorSelection {
    #[default]
    All,
    Only(Vec<SensorKind>),
}

impl SensorSelection {
    /// Parses sensor names, failing on the first unknown one.
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

impl From<Vec<SensorKind>> for SensorSelection {
    fn from(kinds: Vec<SensorKind>) -> Self {
        Self::Only(kinds)
    }
}
