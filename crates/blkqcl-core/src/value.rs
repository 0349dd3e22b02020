use std::collections::{btree_map, BTreeMap, HashMap};

/// A single decoded setting, sensor reading, or report field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Range(Box<Bounds>),
    Pid(Pid),
    /// Numeric-keyed calibration table, in document order.
    Table(Vec<(Value, Value)>),
    Map(CommandResult),
}

/// A `lowerBound`/`upperBound` pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub lower: Value,
    pub upper: Value,
}

/// Proportional/integral/derivative gains of a TEC control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pid {
    pub p: i64,
    pub i: i64,
    pub d: i64,
}

impl Value {
    pub fn range(lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        Self::Range(Box::new(Bounds {
            lower: lower.into(),
            upper: upper.into(),
        }))
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floats, and integers widened to float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&Bounds> {
        match self {
            Self::Range(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_pid(&self) -> Option<&Pid> {
        match self {
            Self::Pid(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Table(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_map(&self) -> Option<&CommandResult> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Pid> for Value {
    fn from(v: Pid) -> Self {
        Self::Pid(v)
    }
}

impl From<CommandResult> for Value {
    fn from(v: CommandResult) -> Self {
        Self::Map(v)
    }
}

/// Presence-sparse result map: a key exists only when the device reported
/// the corresponding element.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CommandResult {
    fields: BTreeMap<String, Value>,
}

impl CommandResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for CommandResult {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for CommandResult {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a CommandResult {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    pub wave_number: f64,
    pub intensity: f64,
}

/// Wave number to intensity mapping returned by a scan, in the order the
/// wave numbers first appeared. A repeated wave number overwrites the
/// earlier intensity in place.
#[derive(Debug, Clone, Default)]
pub struct Spectrum {
    measurements: Vec<Measurement>,
    index: HashMap<u64, usize>,
}

impl Spectrum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, wave_number: f64, intensity: f64) {
        match self.index.get(&key(wave_number)) {
            Some(&at) => self.measurements[at].intensity = intensity,
            None => {
                self.index.insert(key(wave_number), self.measurements.len());
                self.measurements.push(Measurement {
                    wave_number,
                    intensity,
                });
            }
        }
    }

    pub fn get(&self, wave_number: f64) -> Option<f64> {
        self.index
            .get(&key(wave_number))
            .map(|&at| self.measurements[at].intensity)
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn as_slice(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Measurement> {
        self.measurements.iter()
    }

    pub fn wave_numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.measurements.iter().map(|m| m.wave_number)
    }
}

// 0.0 and -0.0 name the same wave number.
fn key(wave_number: f64) -> u64 {
    if wave_number == 0.0 {
        0
    } else {
        wave_number.to_bits()
    }
}

impl PartialEq for Spectrum {
    fn eq(&self, other: &Self) -> bool {
        self.measurements == other.measurements
    }
}

impl FromIterator<(f64, f64)> for Spectrum {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut spectrum = Spectrum::new();
        for (wave_number, intensity) in iter {
            spectrum.insert(wave_number, intensity);
        }
        spectrum
    }
}

impl<'a> IntoIterator for &'a Spectrum {
    type Item = &'a Measurement;
    type IntoIter = core::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Spectrum {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.measurements.serialize(serializer)
    }
}
