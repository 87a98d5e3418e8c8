//! Wire message types for TCP streaming.
//!
//! Telemetry is published as newline-delimited JSON, one tagged message per
//! line. Velocity requests arrive the same way on the command socket.

use serde::{Deserialize, Serialize};

/// Conversion from accelerometer milli-g to m/s²
pub const MILLI_G_TO_MS2: f32 = 9.80665 / 1000.0;

/// Laser scan geometry of the ranging subsystem
pub const SCAN_ANGLE_MIN: f32 = -3.13;
pub const SCAN_ANGLE_MAX: f32 = 3.13;
pub const SCAN_ANGLE_INCREMENT: f32 = 0.017_437_326;
pub const SCAN_RANGE_MIN: f32 = 0.020;
pub const SCAN_RANGE_MAX: f32 = 5.0;

/// Measuring envelope of the wall/drop range sensors in meters
pub const RANGE_SENSOR_MIN: f32 = 0.0;
pub const RANGE_SENSOR_MAX: f32 = 0.255;

/// Inbound velocity request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VelocityRequest {
    /// Forward velocity in m/s
    pub linear_x: f32,
    /// Angular velocity in rad/s, positive CCW
    pub angular_z: f32,
}

/// Top-level telemetry message published per control cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TelemetryMessage {
    Transform(TransformSample),
    Odometry(OdometrySample),
    Scan(ScanSample),
    Button(ButtonEvent),
    Sensor(SensorEvent),
    Acceleration(AccelerationSample),
    Range(RangeSample),
    Magnetic(MagneticSample),
}

/// Pose transform between the odometry frame and the robot body frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformSample {
    pub timestamp_us: u64,
    pub parent_frame: String,
    pub child_frame: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Heading quaternion z component
    pub qz: f32,
    /// Heading quaternion w component
    pub qw: f32,
}

/// Odometry snapshot: accumulated pose plus the current twist estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdometrySample {
    pub timestamp_us: u64,
    pub frame: String,
    pub child_frame: String,
    pub x: f32,
    pub y: f32,
    pub qz: f32,
    pub qw: f32,
    /// Linear velocity in m/s
    pub linear_x: f32,
    /// Angular velocity in rad/s
    pub angular_z: f32,
}

/// One revolution of laser ranges, passed through from the hardware
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSample {
    pub timestamp_us: u64,
    pub frame: String,
    pub angle_min: f32,
    pub angle_max: f32,
    pub angle_increment: f32,
    pub range_min: f32,
    pub range_max: f32,
    /// Ranges in meters
    pub ranges: Vec<f32>,
}

/// A button press transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub timestamp_us: u64,
    pub name: String,
    pub value: u8,
}

/// A bump or wheel-drop flag asserted this cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorEvent {
    pub timestamp_us: u64,
    pub name: String,
    pub value: u8,
}

/// Body acceleration in m/s²
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccelerationSample {
    pub timestamp_us: u64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A single range reading in meters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSample {
    pub timestamp_us: u64,
    /// "wall", "drop_left" or "drop_right"
    pub sensor: String,
    pub range: f32,
    pub min_range: f32,
    pub max_range: f32,
}

/// Raw magnetic sensor reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagneticSample {
    pub timestamp_us: u64,
    pub name: String,
    pub value: i32,
}

/// Microseconds since the Unix epoch, 0 if the clock is unset
pub fn timestamp_us() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
