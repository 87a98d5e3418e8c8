//! Niyantra - control loop daemon for a differential-drive vacuum base
//!
//! Converts wheel-encoder samples into a dead-reckoned pose estimate, maps
//! velocity requests onto safe wheel commands, enforces the hardware safety
//! interlock, and streams telemetry to TCP clients.

pub mod config;
pub mod control;
pub mod devices;
pub mod drivers;
pub mod error;
pub mod motion;
pub mod odometry;
pub mod streaming;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
