// Configuration - layered defaults, config/dashboard.toml and WATER__ environment overrides
use crate::application::dashboard_service::PipelineOptions;
use crate::domain::health::ScoringStrategy;
use crate::domain::sensor::SensorKind;
use crate::domain::status::{MissingStatus, StatusClassifier, TurbidityBoundary};
use serde::Deserialize;
use std::collections::BTreeMap;

const PLACEHOLDER: &str = "REPLACE_ME";
const ENV_PREFIX: &str = "WATER";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub firebase: FirebaseSettings,
    pub dashboard: DashboardSettings,
    pub sensors: SensorPaths,
}

/// Connection parameters as the Firebase console hands them out
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FirebaseSettings {
    pub api_key: String,
    pub auth_domain: String,
    pub database_url: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    /// Database secret or ID token appended as `auth=`
    pub auth_token: Option<String>,
}

impl Default for FirebaseSettings {
    fn default() -> Self {
        Self {
            api_key: PLACEHOLDER.to_string(),
            auth_domain: PLACEHOLDER.to_string(),
            database_url: PLACEHOLDER.to_string(),
            project_id: PLACEHOLDER.to_string(),
            storage_bucket: PLACEHOLDER.to_string(),
            messaging_sender_id: PLACEHOLDER.to_string(),
            app_id: PLACEHOLDER.to_string(),
            auth_token: None,
        }
    }
}

impl FirebaseSettings {
    pub fn is_configured(&self) -> bool {
        let url = self.database_url.trim();
        let api_key = self.api_key.trim();
        !is_placeholder(url)
            && !is_placeholder(api_key)
            && (url.starts_with("https://") || url.starts_with("http://"))
    }
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value == PLACEHOLDER
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardSettings {
    pub listen_addr: String,
    pub history_window: usize,
    pub chart_points: usize,
    pub notice_ttl_secs: u64,
    pub scoring: ScoringStrategy,
    pub missing_status: MissingStatus,
    pub turbidity_boundary: TurbidityBoundary,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            history_window: 48,
            chart_points: 24,
            notice_ttl_secs: 5,
            scoring: ScoringStrategy::default(),
            missing_status: MissingStatus::default(),
            turbidity_boundary: TurbidityBoundary::default(),
        }
    }
}

impl DashboardSettings {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            scoring: self.scoring,
            classifier: StatusClassifier::new(self.missing_status, self.turbidity_boundary),
            chart_points: self.chart_points.max(1),
            notice_ttl_ms: (self.notice_ttl_secs * 1_000) as i64,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SensorPaths {
    pub temperature: String,
    pub ph: String,
    pub turbidity: String,
}

impl Default for SensorPaths {
    fn default() -> Self {
        Self {
            temperature: "/Riventhra/temperature".to_string(),
            ph: "/Riventhra/pH".to_string(),
            turbidity: "/Riventhra/turbidity".to_string(),
        }
    }
}

impl SensorPaths {
    pub fn by_sensor(&self) -> BTreeMap<SensorKind, String> {
        BTreeMap::from([
            (SensorKind::Temperature, self.temperature.clone()),
            (SensorKind::Ph, self.ph.clone()),
            (SensorKind::Turbidity, self.turbidity.clone()),
        ])
    }
}

/// Defaults, then `config/dashboard.toml` if present, then `WATER__*` env vars
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
