// Sensor domain model
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Ph,
    Turbidity,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [SensorKind::Temperature, SensorKind::Ph, SensorKind::Turbidity];

    /// Key used for element ids and chart series ids
    pub fn key(self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Ph => "ph",
            SensorKind::Turbidity => "turbidity",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SensorKind::Temperature => "Temperature",
            SensorKind::Ph => "pH",
            SensorKind::Turbidity => "Turbidity",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SensorKind::Temperature => "C",
            SensorKind::Ph => "pH",
            SensorKind::Turbidity => "NTU",
        }
    }

    pub fn value_element(self) -> String {
        format!("{}-value", self.key())
    }

    pub fn unit_element(self) -> String {
        format!("{}-unit", self.key())
    }

    pub fn status_element(self) -> String {
        format!("{}-status", self.key())
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Last-known value per sensor. Each slot is written only when its own
/// sensor reports; the health score reads all three.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorState {
    pub temperature: Option<f64>,
    pub ph: Option<f64>,
    pub turbidity: Option<f64>,
    pub latest_ts: Option<i64>,
}

impl SensorState {
    pub fn get(&self, sensor: SensorKind) -> Option<f64> {
        match sensor {
            SensorKind::Temperature => self.temperature,
            SensorKind::Ph => self.ph,
            SensorKind::Turbidity => self.turbidity,
        }
    }

    pub fn set(&mut self, sensor: SensorKind, value: Option<f64>) {
        let slot = match sensor {
            SensorKind::Temperature => &mut self.temperature,
            SensorKind::Ph => &mut self.ph,
            SensorKind::Turbidity => &mut self.turbidity,
        };
        *slot = value;
    }

    /// Keeps the running maximum and returns it
    pub fn observe_timestamp(&mut self, ts: i64) -> i64 {
        let latest = self.latest_ts.map_or(ts, |current| current.max(ts));
        self.latest_ts = Some(latest);
        latest
    }
}
