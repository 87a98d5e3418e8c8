//! Base controller driver trait

use crate::error::Result;
use crate::types::{AnalogSensors, Buttons, DigitalSensors, EncoderPair, Led, LedColor, LedMode};

/// Driver trait for the vacuum base controller.
///
/// One implementor owns one hardware channel; the control loop is the sole
/// caller during a run. All reads sample fresh values and all writes take
/// effect immediately on the hardware.
pub trait BaseDriver: Send {
    /// Read cumulative wheel encoder ticks
    fn encoders(&mut self) -> Result<EncoderPair>;

    /// Read battery charge level (0-100%)
    fn battery_level(&mut self) -> Result<u8>;

    /// Read one revolution of laser ranges in meters
    fn scan_ranges(&mut self) -> Result<Vec<f32>>;

    /// Read the six digital bump/wheel flags
    fn digital_sensors(&mut self) -> Result<DigitalSensors>;

    /// Read the eight analog channels
    fn analog_sensors(&mut self) -> Result<AnalogSensors>;

    /// Read the five button states
    fn buttons(&mut self) -> Result<Buttons>;

    /// Set wheel speed targets with a speed limit, all in raw command units
    fn set_motors(&mut self, left: i16, right: i16, speed_limit: i16) -> Result<()>;

    /// Set an indicator LED
    fn set_led(&mut self, led: Led, color: LedColor, mode: LedMode) -> Result<()>;

    /// Switch the display backlight
    fn set_backlight(&mut self, on: bool) -> Result<()>;

    /// Switch the laser ranging subsystem
    fn set_lds(&mut self, on: bool) -> Result<()>;

    /// Switch the diagnostic test mode that exposes raw sensor access
    fn set_test_mode(&mut self, on: bool) -> Result<()>;
}
