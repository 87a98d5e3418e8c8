//! Fixed-rate control loop
//!
//! Owns the hardware channel for the whole run: samples sensors, integrates
//! odometry, evaluates the safety interlock, resolves the motor command and
//! hands telemetry to the publisher, once per tick. Shutdown (clean or
//! faulted) always walks the full safe-stop sequence.

use crate::config::{AppConfig, FrameConfig};
use crate::drivers::BaseDriver;
use crate::error::Result;
use crate::motion::{CommandCell, check_interlock};
use crate::odometry::{PoseIntegrator, PoseUpdate};
use crate::streaming::messages::{
    AccelerationSample, ButtonEvent, MILLI_G_TO_MS2, MagneticSample, OdometrySample,
    RANGE_SENSOR_MAX, RANGE_SENSOR_MIN, RangeSample, SCAN_ANGLE_INCREMENT, SCAN_ANGLE_MAX,
    SCAN_ANGLE_MIN, SCAN_RANGE_MAX, SCAN_RANGE_MIN, ScanSample, SensorEvent, TelemetryMessage,
    TransformSample, timestamp_us,
};
use crate::types::{
    AnalogSensors, Buttons, DigitalSensors, Led, LedColor, LedMode, WheelCommand,
};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Battery indicator state for a charge level
///
/// Below 10% the indicator pulses red, below 25% it holds yellow, otherwise
/// it holds green.
fn battery_indicator(level: u8) -> (LedColor, LedMode) {
    if level < 10 {
        (LedColor::Red, LedMode::Pulse)
    } else if level < 25 {
        (LedColor::Yellow, LedMode::Solid)
    } else {
        (LedColor::Green, LedMode::Solid)
    }
}

/// The control loop scheduler
pub struct ControlLoop<D: BaseDriver> {
    driver: D,
    integrator: PoseIntegrator,
    pending: Arc<CommandCell>,
    telemetry: Sender<TelemetryMessage>,
    period: Duration,
    frames: FrameConfig,
    /// Last command actually written to the hardware
    last_sent: WheelCommand,
    prev_buttons: Buttons,
    overruns: u64,
    dropped_messages: u64,
}

impl<D: BaseDriver> ControlLoop<D> {
    /// Create a control loop over an exclusively owned driver
    pub fn new(
        driver: D,
        config: &AppConfig,
        pending: Arc<CommandCell>,
        telemetry: Sender<TelemetryMessage>,
    ) -> Self {
        Self {
            driver,
            integrator: PoseIntegrator::new(
                config.robot.ticks_per_meter,
                config.robot.track_width_m,
            ),
            pending,
            telemetry,
            period: config.control.period(),
            frames: config.frames.clone(),
            last_sent: WheelCommand::stop(),
            prev_buttons: Buttons::default(),
            overruns: 0,
            dropped_messages: 0,
        }
    }

    /// Run until the flag clears or a fault unwinds the loop.
    ///
    /// Both exits walk the safe-stop sequence; a fault is returned to the
    /// caller after the sequence has run.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        let result = self.startup().and_then(|()| self.spin(running));

        match result {
            Ok(()) => {
                log::info!("ControlLoop: shutdown requested");
                self.shutdown(false);
                Ok(())
            }
            Err(e) => {
                log::error!("ControlLoop: fault during cycle: {}", e);
                self.shutdown(true);
                Err(e)
            }
        }
    }

    /// Bring up the ranging subsystem and indicators
    fn startup(&mut self) -> Result<()> {
        log::info!("ControlLoop: starting up");
        self.driver.set_test_mode(true)?;
        self.driver.set_lds(true)?;
        self.driver.set_backlight(true)?;
        self.driver.set_led(Led::Info, LedColor::Blue, LedMode::Solid)?;
        Ok(())
    }

    /// Tick at the configured rate until the flag clears
    fn spin(&mut self, running: &AtomicBool) -> Result<()> {
        log::info!(
            "ControlLoop: running at {:.1} Hz",
            1.0 / self.period.as_secs_f64()
        );

        let mut first_tick = true;
        let mut last_tick = Instant::now();

        while running.load(Ordering::Relaxed) {
            let tick_start = Instant::now();
            // The first tick has no previous cycle; use the period as dt
            let dt = if first_tick {
                first_tick = false;
                self.period.as_secs_f32()
            } else {
                tick_start.duration_since(last_tick).as_secs_f32()
            };

            self.tick(dt)?;
            last_tick = tick_start;

            let elapsed = tick_start.elapsed();
            if elapsed > self.period {
                self.overruns += 1;
                if self.overruns % 10 == 1 {
                    log::warn!(
                        "ControlLoop: tick overrun - {:.1}ms (target {:.1}ms), {} total",
                        elapsed.as_secs_f32() * 1000.0,
                        self.period.as_secs_f32() * 1000.0,
                        self.overruns
                    );
                }
            }
            thread::sleep(self.period.saturating_sub(elapsed));
        }
        Ok(())
    }

    /// One control cycle
    fn tick(&mut self, dt: f32) -> Result<()> {
        let level = self.driver.battery_level()?;
        let (color, mode) = battery_indicator(level);
        self.driver.set_led(Led::Battery, color, mode)?;

        // Pose and twist come from the same encoder delta and the same dt
        let ticks = self.driver.encoders()?;
        let update = self.integrator.update(ticks, dt);

        let ranges = self.driver.scan_ranges()?;
        let digital = self.driver.digital_sensors()?;
        let analog = self.driver.analog_sensors()?;
        let buttons = self.driver.buttons()?;

        let resolved = match check_interlock(&analog, &digital) {
            Some(violation) => {
                log::warn!("ControlLoop: safety stop - {}", violation);
                self.pending.reset();
                WheelCommand::stop()
            }
            None => self.pending.snapshot(),
        };

        // Identical commands are not re-sent
        if resolved != self.last_sent {
            self.driver
                .set_motors(resolved.left, resolved.right, resolved.speed_limit())?;
            log::debug!(
                "ControlLoop: motors (L:{}, R:{}) limit {}",
                resolved.left,
                resolved.right,
                resolved.speed_limit()
            );
            self.last_sent = resolved;
        }

        self.publish(&update, ranges, &digital, &analog, &buttons);
        self.prev_buttons = buttons;
        Ok(())
    }

    /// Hand this cycle's telemetry to the publisher
    fn publish(
        &mut self,
        update: &PoseUpdate,
        ranges: Vec<f32>,
        digital: &DigitalSensors,
        analog: &AnalogSensors,
        buttons: &Buttons,
    ) {
        let now = timestamp_us();
        let (qz, qw) = update.pose.heading_quaternion();

        self.emit(TelemetryMessage::Transform(TransformSample {
            timestamp_us: now,
            parent_frame: self.frames.odom_frame.clone(),
            child_frame: self.frames.base_frame.clone(),
            x: update.pose.x,
            y: update.pose.y,
            z: 0.0,
            qz,
            qw,
        }));

        self.emit(TelemetryMessage::Scan(ScanSample {
            timestamp_us: now,
            frame: self.frames.laser_frame.clone(),
            angle_min: SCAN_ANGLE_MIN,
            angle_max: SCAN_ANGLE_MAX,
            angle_increment: SCAN_ANGLE_INCREMENT,
            range_min: SCAN_RANGE_MIN,
            range_max: SCAN_RANGE_MAX,
            ranges,
        }));

        self.emit(TelemetryMessage::Odometry(OdometrySample {
            timestamp_us: now,
            frame: self.frames.odom_frame.clone(),
            child_frame: self.frames.base_frame.clone(),
            x: update.pose.x,
            y: update.pose.y,
            qz,
            qw,
            linear_x: update.twist.linear,
            angular_z: update.twist.angular,
        }));

        // Button events fire on the press transition only
        for ((name, pressed), (_, was_pressed)) in
            buttons.named().iter().zip(self.prev_buttons.named().iter())
        {
            if *pressed && !*was_pressed {
                self.emit(TelemetryMessage::Button(ButtonEvent {
                    timestamp_us: now,
                    name: (*name).to_string(),
                    value: 1,
                }));
            }
        }

        // Contact events fire every cycle while asserted
        for (name, asserted) in digital.named() {
            if asserted {
                self.emit(TelemetryMessage::Sensor(SensorEvent {
                    timestamp_us: now,
                    name: name.to_string(),
                    value: 1,
                }));
            }
        }

        self.emit(TelemetryMessage::Acceleration(AccelerationSample {
            timestamp_us: now,
            x: analog.accel_x as f32 * MILLI_G_TO_MS2,
            y: analog.accel_y as f32 * MILLI_G_TO_MS2,
            z: analog.accel_z as f32 * MILLI_G_TO_MS2,
        }));

        for (sensor, raw) in [
            ("wall", analog.wall),
            ("drop_left", analog.drop_left),
            ("drop_right", analog.drop_right),
        ] {
            self.emit(TelemetryMessage::Range(RangeSample {
                timestamp_us: now,
                sensor: sensor.to_string(),
                range: raw as f32 / 1000.0,
                min_range: RANGE_SENSOR_MIN,
                max_range: RANGE_SENSOR_MAX,
            }));
        }

        for (name, value) in [
            ("left_magnetic", analog.magnetic_left),
            ("right_magnetic", analog.magnetic_right),
        ] {
            self.emit(TelemetryMessage::Magnetic(MagneticSample {
                timestamp_us: now,
                name: name.to_string(),
                value,
            }));
        }
    }

    fn emit(&mut self, message: TelemetryMessage) {
        if self.telemetry.try_send(message).is_err() {
            self.dropped_messages += 1;
            if self.dropped_messages % 100 == 1 {
                log::warn!(
                    "ControlLoop: telemetry channel full, {} messages dropped",
                    self.dropped_messages
                );
            }
        }
    }

    /// Safe-stop sequence for both shutdown paths.
    ///
    /// Every step is attempted even when earlier steps fail; a fault
    /// mid-cycle must not block the stop command or the indicator state.
    fn shutdown(&mut self, faulted: bool) {
        log::info!(
            "ControlLoop: stopping ({})",
            if faulted { "faulted" } else { "clean" }
        );

        if let Err(e) = self.driver.set_motors(0, 0, 0) {
            log::error!("ControlLoop: failed to stop motors: {}", e);
        }
        if let Err(e) = self.driver.set_backlight(false) {
            log::error!("ControlLoop: failed to switch off backlight: {}", e);
        }
        if let Err(e) = self
            .driver
            .set_led(Led::Battery, LedColor::Green, LedMode::Off)
        {
            log::error!("ControlLoop: failed to clear battery indicator: {}", e);
        }
        let info_state = if faulted {
            (LedColor::Red, LedMode::Solid)
        } else {
            (LedColor::Blue, LedMode::Off)
        };
        if let Err(e) = self.driver.set_led(Led::Info, info_state.0, info_state.1) {
            log::error!("ControlLoop: failed to set info indicator: {}", e);
        }
        if let Err(e) = self.driver.set_lds(false) {
            log::error!("ControlLoop: failed to stop ranging: {}", e);
        }
        if let Err(e) = self.driver.set_test_mode(false) {
            log::error!("ControlLoop: failed to leave test mode: {}", e);
        }

        log::info!("ControlLoop: stopped");
    }
}
