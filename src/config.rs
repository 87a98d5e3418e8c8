//! Configuration for the niyantra daemon
//!
//! Loads configuration from a TOML file with the minimal parameters needed
//! to drive one base controller and stream its telemetry.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub hardware: HardwareConfig,
    pub robot: RobotConfig,
    pub control: ControlConfig,
    pub streaming: StreamingConfig,
    pub frames: FrameConfig,
}

/// Hardware configuration (serial port)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HardwareConfig {
    /// Base controller serial port
    pub port: String,
    /// Serial baud rate
    pub baud_rate: u32,
}

/// Robot geometry and command limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobotConfig {
    /// Distance between wheel centers in meters
    pub track_width_m: f32,

    /// Encoder ticks per meter of wheel travel
    ///
    /// The base controller reports cumulative ticks; 1000 ticks correspond
    /// to one meter on this platform.
    pub ticks_per_meter: f32,

    /// Maximum wheel speed in raw command units (mm/s equivalent)
    pub max_wheel_speed: i16,
}

/// Control loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Tick rate in Hz
    pub rate_hz: u32,
}

/// TCP streaming configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamingConfig {
    /// TCP bind address for outbound telemetry
    pub telemetry_address: String,
    /// TCP bind address for inbound velocity requests
    pub command_address: String,
}

/// Frame names attached to published poses and scans
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrameConfig {
    pub odom_frame: String,
    pub base_frame: String,
    pub laser_frame: String,
}

impl ControlConfig {
    /// Tick period derived from the rate
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz.max(1) as f64)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration for the Botvac-class base
    ///
    /// Suitable for testing and development. Production deployments should
    /// use a TOML configuration file.
    pub fn botvac_defaults() -> Self {
        Self {
            hardware: HardwareConfig {
                port: "/dev/ttyUSB0".to_string(),
                baud_rate: 115200,
            },
            robot: RobotConfig {
                track_width_m: 0.248,
                ticks_per_meter: 1000.0,
                max_wheel_speed: 300,
            },
            control: ControlConfig { rate_hz: 5 },
            streaming: StreamingConfig {
                telemetry_address: "0.0.0.0:5560".to_string(),
                command_address: "0.0.0.0:5561".to_string(),
            },
            frames: FrameConfig {
                odom_frame: "odom".to_string(),
                base_frame: "base_link".to_string(),
                laser_frame: "base_laser_link".to_string(),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::botvac_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::botvac_defaults();
        assert_eq!(config.hardware.port, "/dev/ttyUSB0");
        assert_eq!(config.robot.max_wheel_speed, 300);
        assert_eq!(config.control.rate_hz, 5);
        assert_eq!(config.control.period(), Duration::from_millis(200));
        assert_eq!(config.frames.base_frame, "base_link");
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[hardware]
port = "/dev/ttyS3"
baud_rate = 57600

[robot]
track_width_m = 0.25
ticks_per_meter = 1000.0
max_wheel_speed = 250

[control]
rate_hz = 10

[streaming]
telemetry_address = "127.0.0.1:5560"
command_address = "127.0.0.1:5561"

[frames]
odom_frame = "odom"
base_frame = "base_link"
laser_frame = "laser"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.hardware.port, "/dev/ttyS3");
        assert_eq!(config.robot.max_wheel_speed, 250);
        assert_eq!(config.control.period(), Duration::from_millis(100));
        assert_eq!(config.frames.laser_frame, "laser");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let toml_string = toml::to_string_pretty(&AppConfig::botvac_defaults()).unwrap();
        file.write_all(toml_string.as_bytes()).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.robot.track_width_m, 0.248);
    }
}
