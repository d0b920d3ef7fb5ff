// Realtime store trait - push-based subscriptions to sensor nodes
use crate::domain::sensor::SensorKind;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What a subscription delivers to the dashboard loop
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Full current contents of the sensor's node
    Snapshot { sensor: SensorKind, payload: Value },
    /// The subscription failed and will not deliver further snapshots
    Failed { sensor: SensorKind, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid database url: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error("listener cancelled by server: {0}")]
    Cancelled(String),
    #[error("stream closed by server")]
    Closed,
    #[error("malformed event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Handle for one live subscription. Dropping it leaves the listener running;
/// call [`Subscription::cancel`] to stop it.
#[derive(Debug)]
pub struct Subscription {
    sensor: SensorKind,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn new(sensor: SensorKind, task: JoinHandle<()>) -> Self {
        Self { sensor, task }
    }

    pub fn cancel(self) {
        tracing::info!("Cancelling {} subscription", self.sensor);
        self.task.abort();
    }
}

#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Start listening to `path`, limited to the newest `window` entries.
    /// Fires once with the initial contents and again on every change.
    ///
    /// Returns without waiting on the store; connection failures arrive
    /// later as [`StoreEvent::Failed`].
    async fn subscribe(
        &self,
        sensor: SensorKind,
        path: &str,
        window: usize,
        events: mpsc::Sender<StoreEvent>,
    ) -> Result<Subscription, StoreError>;
}
