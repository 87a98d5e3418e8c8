//! Hardware safety interlock

use crate::types::{AnalogSensors, DigitalSensors};
use std::fmt;

/// Drop-sensor reading above which motion is unsafe (raw controller units)
pub const DROP_SENSOR_THRESHOLD: i32 = 30;

/// Reason the interlock forced a stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyViolation {
    /// A floor drop-off detected under one side
    DropSensor {
        side: &'static str,
        value: i32,
    },
    /// A bumper or wheel-drop contact flag asserted
    ContactSensor {
        name: &'static str,
    },
}

impl fmt::Display for SafetyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyViolation::DropSensor { side, value } => {
                write!(f, "drop sensor {} reads {}", side, value)
            }
            SafetyViolation::ContactSensor { name } => {
                write!(f, "contact sensor {} asserted", name)
            }
        }
    }
}

/// Evaluate one cycle's sensor sample against the interlock rules.
///
/// First match wins: either drop reading over the threshold, then any of the
/// six digital flags. There is no hysteresis; a single-cycle blip stops the
/// robot and recovery is immediate once the sensors clear.
pub fn check_interlock(
    analog: &AnalogSensors,
    digital: &DigitalSensors,
) -> Option<SafetyViolation> {
    if analog.drop_left > DROP_SENSOR_THRESHOLD {
        return Some(SafetyViolation::DropSensor {
            side: "left",
            value: analog.drop_left,
        });
    }
    if analog.drop_right > DROP_SENSOR_THRESHOLD {
        return Some(SafetyViolation::DropSensor {
            side: "right",
            value: analog.drop_right,
        });
    }
    digital
        .named()
        .into_iter()
        .find(|(_, asserted)| *asserted)
        .map(|(name, _)| SafetyViolation::ContactSensor { name })
}
