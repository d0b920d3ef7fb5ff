// Status classification - fixed safety tiers per sensor
use super::sensor::SensorKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Safe,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Safe => "Safe",
            Status::Warning => "Warning",
            Status::Critical => "Critical",
            Status::Unknown => "Unknown",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Status::Safe => "status-safe",
            Status::Warning => "status-warning",
            Status::Critical => "status-critical",
            Status::Unknown => "status-unknown",
        }
    }
}

/// What a missing or invalid value classifies as
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStatus {
    #[default]
    Unknown,
    Warning,
}

/// Which tier a turbidity reading of exactly 50 NTU falls into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurbidityBoundary {
    /// 10 ≤ v ≤ 50 is warning, critical above 50
    #[default]
    InclusiveWarning,
    /// 10 ≤ v < 50 is warning, critical from 50
    InclusiveCritical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusClassifier {
    pub missing: MissingStatus,
    pub turbidity_boundary: TurbidityBoundary,
}

impl StatusClassifier {
    pub fn new(missing: MissingStatus, turbidity_boundary: TurbidityBoundary) -> Self {
        Self {
            missing,
            turbidity_boundary,
        }
    }

    pub fn classify(&self, sensor: SensorKind, value: Option<f64>) -> Status {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return match self.missing {
                MissingStatus::Unknown => Status::Unknown,
                MissingStatus::Warning => Status::Warning,
            };
        };

        match sensor {
            SensorKind::Ph => {
                if v < 6.0 {
                    Status::Critical
                } else if v <= 8.5 {
                    Status::Safe
                } else {
                    Status::Warning
                }
            }
            SensorKind::Turbidity => {
                let critical = match self.turbidity_boundary {
                    TurbidityBoundary::InclusiveWarning => v > 50.0,
                    TurbidityBoundary::InclusiveCritical => v >= 50.0,
                };
                if v < 10.0 {
                    Status::Safe
                } else if critical {
                    Status::Critical
                } else {
                    Status::Warning
                }
            }
            // No critical tier for temperature
            SensorKind::Temperature => {
                if (10.0..=35.0).contains(&v) {
                    Status::Safe
                } else {
                    Status::Warning
                }
            }
        }
    }
}
