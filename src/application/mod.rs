// Application layer - Use cases and the ports they depend on
pub mod dashboard_service;
pub mod display_sink;
pub mod realtime_store;
pub mod streaming_service;
