//! Metric values and the per-run metrics table

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::fmt;

/// A single extracted value
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Counters such as primes found or sprites generated
    Int(i64),
    /// Rates and durations
    Float(f64),
    /// Free-form values that are not numeric
    Text(String),
}

impl MetricValue {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Int(v) => Some(*v as f64),
            MetricValue::Float(v) => Some(*v),
            MetricValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetricValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, MetricValue::Text(_))
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Int(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{}", v),
            MetricValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Int(value)
    }
}

impl From<i32> for MetricValue {
    fn from(value: i32) -> Self {
        MetricValue::Int(value as i64)
    }
}

impl From<u64> for MetricValue {
    fn from(value: u64) -> Self {
        MetricValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Float(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

/// Named metric produced by an extractor
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct MetricEntry {
    pub name: String,
    pub value: MetricValue,
}

impl MetricEntry {
    pub fn new<N: Into<String>, V: Into<MetricValue>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Insertion-ordered mapping from metric name to value.
///
/// The table only grows: once a name has been written its value is fixed
/// for the rest of the run, and later writes of the same name are ignored.
/// Probe metric names carry a per-probe prefix ("CPU ...", "2D ...") so in
/// practice no two probes ever compete for a key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsTable {
    entries: Vec<MetricEntry>,
}

impl MetricsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a metric; returns `false` if the name was already present
    pub fn insert<N: Into<String>, V: Into<MetricValue>>(&mut self, name: N, value: V) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.entries.push(MetricEntry {
            name,
            value: value.into(),
        });
        true
    }

    /// Merge extractor output, returning how many entries were new
    pub fn extend<I: IntoIterator<Item = MetricEntry>>(&mut self, entries: I) -> usize {
        entries
            .into_iter()
            .filter(|entry| self.insert(entry.name.clone(), entry.value.clone()))
            .count()
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }
}

impl FromIterator<MetricEntry> for MetricsTable {
    fn from_iter<I: IntoIterator<Item = MetricEntry>>(iter: I) -> Self {
        let mut table = MetricsTable::new();
        table.extend(iter);
        table
    }
}

// Serialized as a JSON object whose keys keep insertion order
impl Serialize for MetricsTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.value)?;
        }
        map.end()
    }
}
