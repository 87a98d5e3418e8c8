//! Serial base controller driver

pub mod protocol;

use crate::drivers::BaseDriver;
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{AnalogSensors, Buttons, DigitalSensors, EncoderPair, Led, LedColor, LedMode};
use std::time::{Duration, Instant};

/// Maximum wait for one response line from the controller
const RESPONSE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Base controller driver speaking the line protocol over a [`Transport`]
pub struct SerialBase<T: Transport> {
    transport: T,
    /// Bytes received past the last consumed newline
    residual: Vec<u8>,
}

impl<T: Transport> SerialBase<T> {
    /// Create a driver over an open transport
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            residual: Vec::new(),
        }
    }

    /// Send a command line and return the single response line
    fn request(&mut self, parts: &[&str]) -> Result<String> {
        let line = protocol::command_line(parts);
        self.transport.write(line.as_bytes())?;
        self.transport.flush()?;
        self.read_line()
    }

    /// Send a mutating command and check the `ok` acknowledgement
    fn command(&mut self, parts: &[&str]) -> Result<()> {
        let reply = self.request(parts)?;
        if reply == protocol::ACK {
            Ok(())
        } else {
            Err(Error::InvalidResponse(format!(
                "{} not acknowledged: {:?}",
                parts[0], reply
            )))
        }
    }

    /// Read one newline-terminated line, trimmed, within [`RESPONSE_TIMEOUT`]
    fn read_line(&mut self) -> Result<String> {
        let deadline = Instant::now() + RESPONSE_TIMEOUT;
        let mut chunk = [0u8; 256];

        loop {
            if let Some(pos) = self.residual.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.residual.drain(..=pos).collect();
                line.pop(); // newline
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return String::from_utf8(line)
                    .map_err(|_| Error::InvalidResponse("non-UTF8 response".to_string()));
            }

            let n = self.transport.read(&mut chunk)?;
            if n > 0 {
                self.residual.extend_from_slice(&chunk[..n]);
            } else if Instant::now() >= deadline {
                return Err(Error::Timeout);
            } else {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    }
}

impl<T: Transport> BaseDriver for SerialBase<T> {
    fn encoders(&mut self) -> Result<EncoderPair> {
        let reply = self.request(&["getmotors"])?;
        let values = protocol::parse_ints(&reply, 2)?;
        Ok(EncoderPair::new(values[0], values[1]))
    }

    fn battery_level(&mut self) -> Result<u8> {
        let reply = self.request(&["getcharge"])?;
        let values = protocol::parse_ints(&reply, 1)?;
        Ok(values[0].clamp(0, 100) as u8)
    }

    fn scan_ranges(&mut self) -> Result<Vec<f32>> {
        let reply = self.request(&["getscan"])?;
        protocol::parse_ranges_m(&reply)
    }

    fn digital_sensors(&mut self) -> Result<DigitalSensors> {
        let reply = self.request(&["getdigital"])?;
        let v = protocol::parse_ints(&reply, 6)?;
        Ok(DigitalSensors {
            left_side_bumper: v[0] != 0,
            right_side_bumper: v[1] != 0,
            left_bumper: v[2] != 0,
            right_bumper: v[3] != 0,
            left_wheel_extended: v[4] != 0,
            right_wheel_extended: v[5] != 0,
        })
    }

    fn analog_sensors(&mut self) -> Result<AnalogSensors> {
        let reply = self.request(&["getanalog"])?;
        let v = protocol::parse_ints(&reply, 8)?;
        Ok(AnalogSensors {
            accel_x: v[0],
            accel_y: v[1],
            accel_z: v[2],
            magnetic_left: v[3],
            magnetic_right: v[4],
            wall: v[5],
            drop_left: v[6],
            drop_right: v[7],
        })
    }

    fn buttons(&mut self) -> Result<Buttons> {
        let reply = self.request(&["getbuttons"])?;
        let v = protocol::parse_ints(&reply, 5)?;
        Ok(Buttons {
            soft_key: v[0] != 0,
            scroll_up: v[1] != 0,
            start: v[2] != 0,
            back: v[3] != 0,
            scroll_down: v[4] != 0,
        })
    }

    fn set_motors(&mut self, left: i16, right: i16, speed_limit: i16) -> Result<()> {
        self.command(&[
            "setmotors",
            &left.to_string(),
            &right.to_string(),
            &speed_limit.to_string(),
        ])
    }

    fn set_led(&mut self, led: Led, color: LedColor, mode: LedMode) -> Result<()> {
        self.command(&["setled", led.as_str(), color.as_str(), mode.as_str()])
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.command(&["setbacklight", protocol::on_off(on)])
    }

    fn set_lds(&mut self, on: bool) -> Result<()> {
        self.command(&["setlds", protocol::on_off(on)])
    }

    fn set_test_mode(&mut self, on: bool) -> Result<()> {
        self.command(&["testmode", protocol::on_off(on)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn driver_with(responses: &str) -> (SerialBase<MockTransport>, MockTransport) {
        let transport = MockTransport::new();
        transport.inject_read(responses.as_bytes());
        (SerialBase::new(transport.clone()), transport)
    }

    #[test]
    fn test_encoders() {
        let (mut driver, transport) = driver_with("1000 1003\n");
        let ticks = driver.encoders().unwrap();
        assert_eq!(ticks, EncoderPair::new(1000, 1003));
        assert_eq!(transport.written(), b"getmotors\n");
    }

    #[test]
    fn test_battery_level_clamped() {
        let (mut driver, _) = driver_with("130\n");
        assert_eq!(driver.battery_level().unwrap(), 100);
    }

    #[test]
    fn test_scan_ranges_in_meters() {
        let (mut driver, _) = driver_with("5000 20 0\n");
        assert_eq!(driver.scan_ranges().unwrap(), vec![5.0, 0.02, 0.0]);
    }

    #[test]
    fn test_digital_sensors() {
        let (mut driver, _) = driver_with("0 0 1 0 0 1\n");
        let flags = driver.digital_sensors().unwrap();
        assert!(flags.left_bumper);
        assert!(flags.right_wheel_extended);
        assert!(!flags.left_side_bumper);
    }

    #[test]
    fn test_set_motors_acknowledged() {
        let (mut driver, transport) = driver_with("ok\n");
        driver.set_motors(300, -300, 300).unwrap();
        assert_eq!(transport.written(), b"setmotors 300 -300 300\n");
    }

    #[test]
    fn test_set_led_wire_format() {
        let (mut driver, transport) = driver_with("ok\n");
        driver
            .set_led(Led::Battery, LedColor::Red, LedMode::Pulse)
            .unwrap();
        assert_eq!(transport.written(), b"setled battery red pulse\n");
    }

    #[test]
    fn test_missing_ack_is_an_error() {
        let (mut driver, _) = driver_with("err 12\n");
        assert!(matches!(
            driver.set_lds(false),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_crlf_terminated_response() {
        let (mut driver, _) = driver_with("42\r\n");
        assert_eq!(driver.battery_level().unwrap(), 42);
    }

    #[test]
    fn test_two_queued_responses() {
        let (mut driver, _) = driver_with("10 20\n30 40\n");
        assert_eq!(driver.encoders().unwrap(), EncoderPair::new(10, 20));
        assert_eq!(driver.encoders().unwrap(), EncoderPair::new(30, 40));
    }
}
