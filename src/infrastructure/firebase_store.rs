// Firebase Realtime Database client over the REST streaming API
use crate::application::realtime_store::{RealtimeStore, StoreError, StoreEvent, Subscription};
use crate::domain::sensor::SensorKind;
use crate::infrastructure::config::FirebaseSettings;
use crate::infrastructure::event_stream::{EventStreamDecoder, ServerEvent};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct FirebaseStore {
    client: reqwest::Client,
    database_url: String,
    auth_token: Option<String>,
}

impl FirebaseStore {
    pub fn new(settings: &FirebaseSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            database_url: settings.database_url.trim().trim_end_matches('/').to_string(),
            auth_token: settings.auth_token.clone().filter(|token| !token.is_empty()),
        }
    }

    fn listen_url(&self, path: &str, window: usize) -> Result<String, StoreError> {
        if !(self.database_url.starts_with("https://") || self.database_url.starts_with("http://")) {
            return Err(StoreError::InvalidUrl(self.database_url.clone()));
        }

        let mut url = format!(
            "{}/{}.json?orderBy={}&limitToLast={}",
            self.database_url,
            path.trim_matches('/'),
            urlencoding::encode("\"$key\""),
            window.max(1)
        );
        if let Some(token) = &self.auth_token {
            url.push_str("&auth=");
            url.push_str(&urlencoding::encode(token));
        }
        Ok(url)
    }
}

#[async_trait]
impl RealtimeStore for FirebaseStore {
    async fn subscribe(
        &self,
        sensor: SensorKind,
        path: &str,
        window: usize,
        events: mpsc::Sender<StoreEvent>,
    ) -> Result<Subscription, StoreError> {
        let url = self.listen_url(path, window)?;
        tracing::debug!("Opening event stream for {} at {}", sensor, path);

        let request = self.client.get(url).header(ACCEPT, "text/event-stream");
        let task = tokio::spawn(async move {
            if let Err(e) = listen(sensor, request, window, &events).await {
                tracing::warn!("{} event stream ended: {}", sensor, e);
                let _ = events
                    .send(StoreEvent::Failed {
                        sensor,
                        message: e.to_string(),
                    })
                    .await;
            }
        });

        Ok(Subscription::new(sensor, task))
    }
}

async fn listen(
    sensor: SensorKind,
    request: reqwest::RequestBuilder,
    window: usize,
    events: &mpsc::Sender<StoreEvent>,
) -> Result<(), StoreError> {
    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(StoreError::Status(response.status()));
    }
    pump_events(sensor, response, window, events).await
}

/// Reads the event stream until it fails. Returns `Ok` only when the
/// receiving side has gone away.
async fn pump_events(
    sensor: SensorKind,
    response: reqwest::Response,
    window: usize,
    events: &mpsc::Sender<StoreEvent>,
) -> Result<(), StoreError> {
    let mut mirror = SnapshotMirror::new(window);
    let mut decoder = EventStreamDecoder::new();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        for event in decoder.feed(&chunk) {
            if let Some(payload) = mirror.apply(&event)? {
                if events.send(StoreEvent::Snapshot { sensor, payload }).await.is_err() {
                    return Ok(());
                }
            }
        }
    }

    Err(StoreError::Closed)
}

#[derive(Debug, Deserialize)]
struct PathUpdate {
    path: String,
    data: Value,
}

/// Local copy of one listened node, kept in sync from `put`/`patch` events
/// and trimmed to the newest `window` children.
#[derive(Debug, Clone)]
pub struct SnapshotMirror {
    root: Value,
    window: usize,
}

impl SnapshotMirror {
    pub fn new(window: usize) -> Self {
        Self {
            root: Value::Null,
            window: window.max(1),
        }
    }

    pub fn snapshot(&self) -> &Value {
        &self.root
    }

    /// Apply one stream event. Returns the full node when it changed.
    pub fn apply(&mut self, event: &ServerEvent) -> Result<Option<Value>, StoreError> {
        match event.event.as_str() {
            "put" => {
                let update: PathUpdate = serde_json::from_str(&event.data)?;
                set_at(&mut self.root, &segments(&update.path), update.data);
            }
            "patch" => {
                let update: PathUpdate = serde_json::from_str(&event.data)?;
                let base = segments(&update.path);
                if let Value::Object(children) = update.data {
                    for (key, value) in children {
                        let mut path = base.clone();
                        path.extend(key.split('/').filter(|s| !s.is_empty()));
                        set_at(&mut self.root, &path, value);
                    }
                }
            }
            "keep-alive" => return Ok(None),
            "cancel" => return Err(StoreError::Cancelled(event.data.clone())),
            "auth_revoked" => return Err(StoreError::Cancelled("auth revoked".to_string())),
            other => {
                tracing::debug!("Ignoring unknown event type {}", other);
                return Ok(None);
            }
        }

        self.trim();
        Ok(Some(self.root.clone()))
    }

    fn trim(&mut self) {
        let Value::Object(children) = &mut self.root else {
            return;
        };
        if children.contains_key("value") || children.len() <= self.window {
            return;
        }
        let excess = children.len() - self.window;
        let oldest: Vec<String> = children.keys().take(excess).cloned().collect();
        for key in oldest {
            children.remove(&key);
        }
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn set_at(node: &mut Value, path: &[&str], data: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = data;
        return;
    };

    if !node.is_object() {
        if data.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }

    let emptied = match node {
        Value::Object(children) => {
            let child = children.entry(head.to_string()).or_insert(Value::Null);
            set_at(child, rest, data);
            if child.is_null() {
                children.remove(*head);
            }
            children.is_empty()
        }
        _ => false,
    };
    // Firebase has no empty objects
    if emptied {
        *node = Value::Null;
    }
}
