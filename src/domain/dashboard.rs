// Dashboard domain model - the rendered state clients draw from
use super::sensor::SensorKind;
use super::status::Status;
use super::telemetry::ChartData;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardState {
    pub status: Status,
    pub class: &'static str,
}

impl CardState {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            class: status.css_class(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub expires_at_ms: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub texts: BTreeMap<String, String>,
    pub cards: BTreeMap<SensorKind, CardState>,
    pub charts: BTreeMap<String, ChartData>,
    pub notice: Option<Notice>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, element: &str) -> Option<&str> {
        self.texts.get(element).map(String::as_str)
    }

    pub fn card(&self, sensor: SensorKind) -> Option<Status> {
        self.cards.get(&sensor).map(|card| card.status)
    }

    pub fn chart(&self, series_id: &str) -> Option<&ChartData> {
        self.charts.get(series_id)
    }
}
