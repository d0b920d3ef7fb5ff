// Dashboard controller - runs each snapshot through parse, classify, store and score
use crate::application::display_sink::DisplaySink;
use crate::application::realtime_store::StoreEvent;
use crate::domain::health::{HealthScore, ScoringStrategy};
use crate::domain::sensor::{SensorKind, SensorState};
use crate::domain::series::WindowedSeriesStore;
use crate::domain::snapshot::parse_snapshot;
use crate::domain::status::StatusClassifier;
use crate::domain::telemetry::Reading;
use chrono::{Local, TimeZone};
use serde_json::Value;

pub const HEALTH_SERIES: &str = "health";
pub const HEALTH_SCORE: &str = "health-score";
pub const HEALTH_STATUS: &str = "health-status";
pub const HEALTH_META: &str = "health-meta";
pub const LAST_UPDATED: &str = "last-updated";
pub const CONNECTION_STATUS: &str = "connection-status";
pub const CONNECTION_LOST: &str = "Connection lost";

const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub scoring: ScoringStrategy,
    pub classifier: StatusClassifier,
    pub chart_points: usize,
    pub notice_ttl_ms: i64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            scoring: ScoringStrategy::default(),
            classifier: StatusClassifier::default(),
            chart_points: 24,
            notice_ttl_ms: 5_000,
        }
    }
}

pub struct DashboardController<S: DisplaySink> {
    options: PipelineOptions,
    state: SensorState,
    series: WindowedSeriesStore,
    sink: S,
}

impl<S: DisplaySink> DashboardController<S> {
    pub fn new(options: PipelineOptions, sink: S) -> Self {
        let mut controller = Self {
            options,
            state: SensorState::default(),
            series: WindowedSeriesStore::new(options.chart_points),
            sink,
        };
        controller.reset_display();
        controller
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn state(&self) -> &SensorState {
        &self.state
    }

    pub fn health(&self) -> HealthScore {
        self.options
            .scoring
            .score(
                self.state.get(SensorKind::Ph),
                self.state.get(SensorKind::Turbidity),
                self.state.get(SensorKind::Temperature),
            )
    }

    pub fn handle(&mut self, event: StoreEvent, now_ms: i64) {
        match event {
            StoreEvent::Snapshot { sensor, payload } => self.apply_snapshot(sensor, &payload, now_ms),
            StoreEvent::Failed { sensor, message } => self.report_failure(sensor, &message, now_ms),
        }
    }

    pub fn apply_snapshot(&mut self, sensor: SensorKind, raw: &Value, now_ms: i64) {
        let parsed = parse_snapshot(raw, now_ms);
        let value = parsed.latest_value();
        let status = self.options.classifier.classify(sensor, value);

        tracing::debug!(
            "{} snapshot: latest={:?} status={:?} history={}",
            sensor,
            value,
            status,
            parsed.points.len()
        );

        self.sink.set_text(&sensor.value_element(), &format_value(value));
        self.sink.set_text(&sensor.status_element(), status.label());
        self.sink.set_card_state(sensor, status);

        self.state.set(sensor, value);

        if !parsed.points.is_empty() {
            self.update_chart(sensor, &parsed.points, parsed.clock_stamped);
        }

        self.render_health();

        // Parse-time stamps would move the label on every repeat
        if let Some(ts) = parsed.reported_timestamp() {
            let latest = self.state.observe_timestamp(ts);
            self.sink
                .set_text(LAST_UPDATED, &format!("Last updated {}", display_time(latest)));
        }
    }

    pub fn report_failure(&mut self, sensor: SensorKind, message: &str, now_ms: i64) {
        tracing::warn!("Realtime connection error for {}: {}", sensor, message);
        let notice = format!("Realtime connection error ({}): {}", sensor.title(), message);
        self.sink.notify(&notice, now_ms + self.options.notice_ttl_ms);
        self.set_connection_status(CONNECTION_LOST);
    }

    pub fn set_connection_status(&mut self, text: &str) {
        self.sink.set_text(CONNECTION_STATUS, text);
    }

    pub fn expire_notices(&mut self, now_ms: i64) -> bool {
        self.sink.expire_notices(now_ms)
    }

    fn update_chart(&mut self, sensor: SensorKind, points: &[Reading], clock_stamped: bool) {
        let skip = points.len().saturating_sub(self.options.chart_points);
        let window = points.iter().skip(skip).map(|reading| {
            let ts = if clock_stamped { None } else { reading.timestamp };
            (time_label(ts), reading.measurement())
        });
        self.series.replace(sensor, window);

        if let Some(series) = self.series.get(sensor).filter(|series| !series.is_empty()) {
            tracing::debug!("{} chart holds {} points", sensor, series.len());
            let chart = series.to_chart();
            self.sink.render(sensor.key(), &chart.labels, &chart.values);
        }
    }

    fn render_health(&mut self) {
        let health = self.health();
        let gauge = health.gauge();
        self.sink.render(
            HEALTH_SERIES,
            &["Health".to_string(), "Remaining".to_string()],
            &[Some(gauge[0]), Some(gauge[1])],
        );

        match (health.score, self.state.ph, self.state.turbidity, self.state.temperature) {
            (Some(score), Some(ph), Some(turbidity), Some(temperature)) => {
                self.sink.set_text(HEALTH_SCORE, &score.to_string());
                self.sink
                    .set_text(HEALTH_STATUS, &format!("{} River", health.label.as_str()));
                self.sink.set_text(
                    HEALTH_META,
                    &format!(
                        "pH {:.2}, Turbidity {:.1} NTU, Temp {:.1} C",
                        ph, turbidity, temperature
                    ),
                );
            }
            _ => {
                self.sink.set_text(HEALTH_SCORE, PLACEHOLDER);
                self.sink.set_text(HEALTH_STATUS, "Awaiting data");
                self.sink
                    .set_text(HEALTH_META, "Live score updates when all sensors report.");
            }
        }
    }

    fn reset_display(&mut self) {
        for sensor in SensorKind::ALL {
            let status = self.options.classifier.classify(sensor, None);
            self.sink.set_text(&sensor.value_element(), PLACEHOLDER);
            self.sink.set_text(&sensor.unit_element(), sensor.unit());
            self.sink.set_text(&sensor.status_element(), status.label());
            self.sink.set_card_state(sensor, status);
        }
        self.sink.set_text(LAST_UPDATED, PLACEHOLDER);
        self.render_health();
    }
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{:.2}", v))
}

fn time_label(ts: Option<i64>) -> String {
    ts.and_then(|ts| Local.timestamp_millis_opt(ts).single())
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn display_time(ts: i64) -> String {
    Local
        .timestamp_millis_opt(ts)
        .single()
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}
