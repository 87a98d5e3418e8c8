//! Sensor sample types reported by the base controller

/// Digital bump and wheel-drop flags (one cycle's sample)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DigitalSensors {
    pub left_side_bumper: bool,
    pub right_side_bumper: bool,
    pub left_bumper: bool,
    pub right_bumper: bool,
    pub left_wheel_extended: bool,
    pub right_wheel_extended: bool,
}

impl DigitalSensors {
    /// Flags with their stable wire names, in report order
    pub fn named(&self) -> [(&'static str, bool); 6] {
        [
            ("left_side_bumper", self.left_side_bumper),
            ("right_side_bumper", self.right_side_bumper),
            ("left_bumper", self.left_bumper),
            ("right_bumper", self.right_bumper),
            ("left_wheel", self.left_wheel_extended),
            ("right_wheel", self.right_wheel_extended),
        ]
    }

    /// True if any flag is asserted
    pub fn any_asserted(&self) -> bool {
        self.named().iter().any(|(_, v)| *v)
    }
}

/// Analog channel sample (raw controller units)
///
/// Accelerometer axes are in milli-g; wall and drop channels are raw range
/// units where 1000 units correspond to one meter; magnetic channels are
/// uncalibrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalogSensors {
    pub accel_x: i32,
    pub accel_y: i32,
    pub accel_z: i32,
    pub magnetic_left: i32,
    pub magnetic_right: i32,
    pub wall: i32,
    pub drop_left: i32,
    pub drop_right: i32,
}

/// Button states (one cycle's sample)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons {
    pub soft_key: bool,
    pub scroll_up: bool,
    pub start: bool,
    pub back: bool,
    pub scroll_down: bool,
}

impl Buttons {
    /// Buttons with their stable wire names, in report order
    pub fn named(&self) -> [(&'static str, bool); 5] {
        [
            ("soft_button", self.soft_key),
            ("up_button", self.scroll_up),
            ("start_button", self.start),
            ("back_button", self.back),
            ("down_button", self.scroll_down),
        ]
    }
}
