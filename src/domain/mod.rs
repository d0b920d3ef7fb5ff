// Domain layer - Sensor readings and the pure scoring pipeline
pub mod dashboard;
pub mod health;
pub mod sensor;
pub mod series;
pub mod snapshot;
pub mod status;
pub mod telemetry;
