//! TCP streaming glue: telemetry out, velocity requests in

pub mod messages;
pub mod publisher;
pub mod receiver;

pub use messages::{TelemetryMessage, VelocityRequest};
pub use publisher::TelemetryPublisher;
pub use receiver::CommandReceiver;
