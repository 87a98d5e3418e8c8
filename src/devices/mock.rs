//! Scripted in-memory base controller
//!
//! Used by control-loop tests and for hardware-free bring-up. Clones share
//! state, so a test keeps one handle to script sensors and inspect writes
//! while the control loop owns another.

use crate::drivers::BaseDriver;
use crate::error::{Error, Result};
use crate::types::{AnalogSensors, Buttons, DigitalSensors, EncoderPair, Led, LedColor, LedMode};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Scriptable state behind a [`MockBase`]
#[derive(Default)]
pub struct MockState {
    // Sensor values returned to the loop
    pub encoders: EncoderPair,
    pub battery_level: u8,
    pub ranges: Vec<f32>,
    pub digital: DigitalSensors,
    pub analog: AnalogSensors,
    pub buttons: Buttons,

    // Recorded writes, oldest first
    pub motor_writes: Vec<(i16, i16, i16)>,
    pub led_writes: Vec<(Led, LedColor, LedMode)>,
    pub backlight_writes: Vec<bool>,
    pub lds_writes: Vec<bool>,
    pub test_mode_writes: Vec<bool>,

    /// When set, sensor reads fail with a timeout; writes still succeed so
    /// a safe shutdown remains observable
    pub fail_reads: bool,
}

/// In-memory [`BaseDriver`] over shared scriptable state
#[derive(Clone, Default)]
pub struct MockBase {
    inner: Arc<Mutex<MockState>>,
}

impl MockBase {
    /// Create a mock with full battery and quiet sensors
    pub fn new() -> Self {
        let mock = Self::default();
        mock.state().battery_level = 100;
        mock
    }

    /// Lock the shared state for scripting or inspection
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock()
    }

    fn read_state(&self) -> Result<MutexGuard<'_, MockState>> {
        let state = self.inner.lock();
        if state.fail_reads {
            return Err(Error::Timeout);
        }
        Ok(state)
    }
}

impl BaseDriver for MockBase {
    fn encoders(&mut self) -> Result<EncoderPair> {
        Ok(self.read_state()?.encoders)
    }

    fn battery_level(&mut self) -> Result<u8> {
        Ok(self.read_state()?.battery_level)
    }

    fn scan_ranges(&mut self) -> Result<Vec<f32>> {
        Ok(self.read_state()?.ranges.clone())
    }

    fn digital_sensors(&mut self) -> Result<DigitalSensors> {
        Ok(self.read_state()?.digital)
    }

    fn analog_sensors(&mut self) -> Result<AnalogSensors> {
        Ok(self.read_state()?.analog)
    }

    fn buttons(&mut self) -> Result<Buttons> {
        Ok(self.read_state()?.buttons)
    }

    fn set_motors(&mut self, left: i16, right: i16, speed_limit: i16) -> Result<()> {
        self.state().motor_writes.push((left, right, speed_limit));
        Ok(())
    }

    fn set_led(&mut self, led: Led, color: LedColor, mode: LedMode) -> Result<()> {
        self.state().led_writes.push((led, color, mode));
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.state().backlight_writes.push(on);
        Ok(())
    }

    fn set_lds(&mut self, on: bool) -> Result<()> {
        self.state().lds_writes.push(on);
        Ok(())
    }

    fn set_test_mode(&mut self, on: bool) -> Result<()> {
        self.state().test_mode_writes.push(on);
        Ok(())
    }
}
