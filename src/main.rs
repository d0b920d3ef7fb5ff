// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, routing::get};
use tokio::sync::{oneshot, watch};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use water_telemetry::application::realtime_store::RealtimeStore;
use water_telemetry::application::streaming_service::DashboardRuntime;
use water_telemetry::domain::dashboard::DashboardView;
use water_telemetry::infrastructure::config::load_app_config;
use water_telemetry::infrastructure::firebase_store::FirebaseStore;
use water_telemetry::presentation::app_state::AppState;
use water_telemetry::presentation::handlers::{get_dashboard, health_check, service_status, stream_dashboard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config().context("Failed to load configuration")?;
    let addr: SocketAddr = config
        .dashboard
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.dashboard.listen_addr))?;

    // Create realtime store (infrastructure layer)
    let store: Option<Arc<dyn RealtimeStore>> = if config.firebase.is_configured() {
        Some(Arc::new(FirebaseStore::new(&config.firebase)))
    } else {
        tracing::warn!(
            "Firebase config not set. Add your project settings to config/dashboard.toml to connect to the Realtime Database."
        );
        None
    };
    let connected = store.is_some();

    // Start the dashboard runtime (application layer)
    let runtime = DashboardRuntime::new(
        store,
        config.sensors.by_sensor(),
        config.dashboard.history_window,
        config.dashboard.pipeline_options(),
    );
    let (view_tx, view_rx) = watch::channel(DashboardView::new());
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let runtime_handle = tokio::spawn(runtime.run(view_tx, async move {
        let _ = stop_rx.await;
    }));

    // Create application state
    let state = Arc::new(AppState {
        view: view_rx,
        connected,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/status", get(service_status))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/stream", get(stream_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    tracing::info!("Starting water-telemetry service on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Stopping the runtime closes the view channel, which ends open streams
    let shutdown = async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown requested");
        let _ = stop_tx.send(());
    };
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await;

    if let Err(e) = runtime_handle.await {
        tracing::error!("Dashboard runtime panicked: {}", e);
    }

    if let Err(e) = &served {
        tracing::error!("Server error: {}", e);
    }
    served?;
    Ok(())
}
