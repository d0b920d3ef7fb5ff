// Streaming dashboard runtime - one consumer loop fed by per-sensor subscriptions
use crate::application::dashboard_service::{DashboardController, PipelineOptions};
use crate::application::realtime_store::{RealtimeStore, StoreEvent, Subscription};
use crate::domain::dashboard::DashboardView;
use crate::domain::sensor::SensorKind;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

const EVENT_BUFFER: usize = 100;
const NOTICE_TICK: Duration = Duration::from_secs(1);

/// Wall-clock milliseconds, advanced by the tokio timer after start
#[derive(Debug, Clone, Copy)]
struct Clock {
    origin_ms: i64,
    origin: Instant,
}

impl Clock {
    fn start() -> Self {
        Self {
            origin_ms: chrono::Utc::now().timestamp_millis(),
            origin: Instant::now(),
        }
    }

    fn now_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.origin_ms.saturating_add(elapsed)
    }
}

pub struct DashboardRuntime {
    store: Option<Arc<dyn RealtimeStore>>,
    paths: BTreeMap<SensorKind, String>,
    history_window: usize,
    options: PipelineOptions,
}

impl DashboardRuntime {
    /// `store` is `None` when the store is not configured; the dashboard
    /// then runs disconnected and only shows placeholders.
    pub fn new(
        store: Option<Arc<dyn RealtimeStore>>,
        paths: BTreeMap<SensorKind, String>,
        history_window: usize,
        options: PipelineOptions,
    ) -> Self {
        Self {
            store,
            paths,
            history_window,
            options,
        }
    }

    /// Process events until `shutdown` resolves, publishing the view after
    /// every change. Events are handled one at a time.
    pub async fn run<F>(self, view_tx: watch::Sender<DashboardView>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let clock = Clock::start();
        let mut controller = DashboardController::new(self.options, DashboardView::new());
        view_tx.send_replace(controller.sink().clone());

        let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
        let subscriptions = self.subscribe_all(&mut controller, tx, &clock).await;
        let mut open = !subscriptions.is_empty();
        view_tx.send_replace(controller.sink().clone());

        let mut ticker = tokio::time::interval(NOTICE_TICK);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                event = rx.recv(), if open => match event {
                    Some(event) => {
                        controller.handle(event, clock.now_ms());
                        view_tx.send_replace(controller.sink().clone());
                    }
                    None => {
                        tracing::warn!("All realtime subscriptions have ended");
                        open = false;
                    }
                },
                _ = ticker.tick() => {
                    if controller.expire_notices(clock.now_ms()) {
                        view_tx.send_replace(controller.sink().clone());
                    }
                }
            }
        }

        tracing::info!("Stopping dashboard runtime");
        for subscription in subscriptions {
            subscription.cancel();
        }
    }

    async fn subscribe_all(
        &self,
        controller: &mut DashboardController<DashboardView>,
        tx: mpsc::Sender<StoreEvent>,
        clock: &Clock,
    ) -> Vec<Subscription> {
        let Some(store) = &self.store else {
            tracing::warn!("Realtime store not configured, running disconnected");
            controller.set_connection_status("Disconnected: realtime store is not configured");
            return Vec::new();
        };

        let mut subscriptions = Vec::new();
        let mut failed = false;
        for sensor in SensorKind::ALL {
            let Some(path) = self.paths.get(&sensor) else {
                tracing::warn!("No path configured for {}, skipping", sensor);
                continue;
            };

            match store
                .subscribe(sensor, path, self.history_window, tx.clone())
                .await
            {
                Ok(subscription) => {
                    tracing::info!("Subscribed to {} at {}", sensor, path);
                    subscriptions.push(subscription);
                }
                Err(e) => {
                    controller.report_failure(sensor, &e.to_string(), clock.now_ms());
                    failed = true;
                }
            }
        }

        // report_failure has already set the status
        if !failed {
            let status = if subscriptions.is_empty() {
                "Disconnected"
            } else {
                "Connected"
            };
            controller.set_connection_status(status);
        }
        subscriptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::{CONNECTION_LOST, CONNECTION_STATUS, HEALTH_SCORE};
    use crate::application::realtime_store::StoreError;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tokio::sync::oneshot;

    /// Replays canned payloads per sensor, then either fails or stays open
    #[derive(Default)]
    struct ScriptedStore {
        payloads: BTreeMap<SensorKind, Vec<Value>>,
        failures: BTreeMap<SensorKind, String>,
        rejected: Vec<SensorKind>,
    }

    #[async_trait]
    impl RealtimeStore for ScriptedStore {
        async fn subscribe(
            &self,
            sensor: SensorKind,
            path: &str,
            _window: usize,
            events: mpsc::Sender<StoreEvent>,
        ) -> Result<Subscription, StoreError> {
            if self.rejected.contains(&sensor) {
                return Err(StoreError::InvalidUrl(path.to_string()));
            }
            let payloads = self.payloads.get(&sensor).cloned().unwrap_or_default();
            let failure = self.failures.get(&sensor).cloned();
            let task = tokio::spawn(async move {
                for payload in payloads {
                    let _ = events.send(StoreEvent::Snapshot { sensor, payload }).await;
                }
                match failure {
                    Some(message) => {
                        let _ = events.send(StoreEvent::Failed { sensor, message }).await;
                    }
                    None => std::future::pending::<()>().await,
                }
            });
            Ok(Subscription::new(sensor, task))
        }
    }

    fn paths() -> BTreeMap<SensorKind, String> {
        SensorKind::ALL
            .into_iter()
            .map(|sensor| (sensor, format!("/test/{}", sensor)))
            .collect()
    }

    #[tokio::test]
    async fn test_runtime_scores_all_sensors() {
        let store = ScriptedStore {
            payloads: BTreeMap::from([
                (SensorKind::Ph, vec![json!({"value": 7.0, "ts": 1})]),
                (SensorKind::Turbidity, vec![json!({"a": {"value": 0.0, "ts": 2}})]),
                (SensorKind::Temperature, vec![json!(22.5)]),
            ]),
            ..ScriptedStore::default()
        };
        let runtime = DashboardRuntime::new(Some(Arc::new(store)), paths(), 48, PipelineOptions::default());

        let (view_tx, mut view_rx) = watch::channel(DashboardView::new());
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(runtime.run(view_tx, async move {
            let _ = stop_rx.await;
        }));

        let view = tokio::time::timeout(
            Duration::from_secs(5),
            view_rx.wait_for(|view| view.text(HEALTH_SCORE) == Some("100")),
        )
        .await
        .expect("timed out waiting for score")
        .expect("runtime dropped the view")
        .clone();
        assert_eq!(view.text(CONNECTION_STATUS), Some("Connected"));

        stop_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runtime did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_runtime_without_store_runs_disconnected() {
        let runtime = DashboardRuntime::new(None, paths(), 48, PipelineOptions::default());
        let (view_tx, view_rx) = watch::channel(DashboardView::new());

        runtime.run(view_tx, async {}).await;

        let view = view_rx.borrow();
        assert!(view.text(CONNECTION_STATUS).unwrap().starts_with("Disconnected"));
        assert_eq!(view.text(HEALTH_SCORE), Some("--"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_failure_shows_notice_until_it_expires() {
        let store = ScriptedStore {
            payloads: BTreeMap::from([(SensorKind::Ph, vec![json!({"value": 7.0, "ts": 1})])]),
            failures: BTreeMap::from([(SensorKind::Ph, "stream closed by server".to_string())]),
            ..ScriptedStore::default()
        };
        let runtime = DashboardRuntime::new(Some(Arc::new(store)), paths(), 48, PipelineOptions::default());

        let (view_tx, mut view_rx) = watch::channel(DashboardView::new());
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(runtime.run(view_tx, async move {
            let _ = stop_rx.await;
        }));

        let lost = view_rx
            .wait_for(|view| view.text(CONNECTION_STATUS) == Some(CONNECTION_LOST))
            .await
            .unwrap()
            .clone();
        let notice = lost.notice.as_ref().expect("failure notice");
        assert_eq!(notice.message, "Realtime connection error (pH): stream closed by server");
        assert_eq!(lost.text("ph-value"), Some("7.00"));
        let raised = Instant::now();

        let cleared = tokio::time::timeout(
            Duration::from_secs(60),
            view_rx.wait_for(|view| view.notice.is_none()),
        )
        .await
        .expect("notice never expired")
        .unwrap()
        .clone();
        assert!(raised.elapsed() >= Duration::from_secs(4));
        assert_eq!(cleared.text(CONNECTION_STATUS), Some(CONNECTION_LOST));

        stop_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_subscription_reports_connection_lost() {
        let store = ScriptedStore {
            rejected: vec![SensorKind::Turbidity],
            ..ScriptedStore::default()
        };
        let runtime = DashboardRuntime::new(Some(Arc::new(store)), paths(), 48, PipelineOptions::default());
        let (view_tx, view_rx) = watch::channel(DashboardView::new());

        runtime.run(view_tx, async {}).await;

        let view = view_rx.borrow();
        assert_eq!(view.text(CONNECTION_STATUS), Some(CONNECTION_LOST));
        let notice = view.notice.as_ref().expect("failure notice");
        assert!(notice.message.starts_with("Realtime connection error (Turbidity): "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_follows_tokio_time() {
        let clock = Clock::start();
        let before = clock.now_ms();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(clock.now_ms() - before, 5_000);
    }
}
