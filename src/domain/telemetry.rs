// Telemetry data domain models
use serde::Serialize;

/// One sample from a sensor. `value` is NaN when the payload held something
/// that could not be read as a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub value: f64,
    pub timestamp: Option<i64>,
}

impl Reading {
    pub fn new(value: f64, timestamp: Option<i64>) -> Self {
        Self { value, timestamp }
    }

    /// The numeric value, or `None` when the reading is invalid.
    pub fn measurement(&self) -> Option<f64> {
        self.value.is_finite().then_some(self.value)
    }
}

/// Parsed form of a snapshot: the most recent reading and the
/// timestamp-ascending history it was taken from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSeries {
    pub latest: Option<Reading>,
    pub points: Vec<Reading>,
    /// The payload carried no timestamp; `latest` was stamped at parse time
    pub clock_stamped: bool,
}

impl NormalizedSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn latest_value(&self) -> Option<f64> {
        self.latest.as_ref().and_then(Reading::measurement)
    }

    /// Timestamp of `latest` as sent by the store, ignoring parse-time stamps
    pub fn reported_timestamp(&self) -> Option<i64> {
        if self.clock_stamped {
            return None;
        }
        self.latest.and_then(|reading| reading.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl ChartData {
    pub fn new(labels: Vec<String>, values: Vec<Option<f64>>) -> Self {
        Self { labels, values }
    }
}
