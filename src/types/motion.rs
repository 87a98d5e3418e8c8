//! Motion and odometry types

/// Raw cumulative encoder tick counts for both wheels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderPair {
    /// Left wheel tick count
    pub left: i32,
    /// Right wheel tick count
    pub right: i32,
}

impl EncoderPair {
    /// Create a new encoder pair
    pub fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }
}

/// Robot pose in the odometry frame.
///
/// Position in meters, heading in radians. The heading is accumulated
/// without normalization and may grow beyond [-π, π]; consumers that need a
/// bounded orientation should use [`Pose2D::heading_quaternion`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose2D {
    /// X position in meters
    pub x: f32,
    /// Y position in meters
    pub y: f32,
    /// Heading in radians, unbounded
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self { x, y, theta }
    }

    /// Heading as the (z, w) components of a unit quaternion about the
    /// vertical axis
    pub fn heading_quaternion(&self) -> (f32, f32) {
        let half = self.theta / 2.0;
        (half.sin(), half.cos())
    }
}

/// Robot velocity (linear and angular)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    /// Linear velocity in m/s
    pub linear: f32,
    /// Angular velocity in rad/s
    pub angular: f32,
}

impl Velocity {
    /// Create new velocity
    pub fn new(linear: f32, angular: f32) -> Self {
        Self { linear, angular }
    }

    /// Zero velocity
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Target wheel speeds in raw command units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WheelCommand {
    /// Left wheel speed
    pub left: i16,
    /// Right wheel speed
    pub right: i16,
}

impl WheelCommand {
    /// Create a new wheel command
    pub fn new(left: i16, right: i16) -> Self {
        Self { left, right }
    }

    /// Stopped command
    pub fn stop() -> Self {
        Self::default()
    }

    /// Check for the stopped command
    pub fn is_stop(&self) -> bool {
        self.left == 0 && self.right == 0
    }

    /// Speed limit to send alongside the command: the larger wheel magnitude
    pub fn speed_limit(&self) -> i16 {
        self.left.unsigned_abs().max(self.right.unsigned_abs()) as i16
    }
}
