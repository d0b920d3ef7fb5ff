// Application state for HTTP handlers
use crate::domain::dashboard::DashboardView;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub view: watch::Receiver<DashboardView>,
    pub connected: bool,
}
