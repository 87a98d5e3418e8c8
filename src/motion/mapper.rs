//! Velocity request to wheel command mapping

use crate::types::{Velocity, WheelCommand};

/// Maps a body velocity request onto integer wheel speed targets.
///
/// Runs whenever a request arrives, independent of the control tick. When
/// the request exceeds the speed envelope, both terms are scaled down
/// uniformly so the commanded curvature is preserved rather than clipping
/// each wheel independently.
#[derive(Debug, Clone, Copy)]
pub struct VelocityMapper {
    track_width_mm: f32,
    max_speed: f32,
}

impl VelocityMapper {
    /// Create a mapper
    ///
    /// # Arguments
    /// * `track_width_m` - Distance between wheel centers in meters
    /// * `max_speed` - Maximum wheel speed in raw command units
    pub fn new(track_width_m: f32, max_speed: i16) -> Self {
        Self {
            track_width_mm: track_width_m * 1000.0,
            max_speed: max_speed as f32,
        }
    }

    /// Map a velocity request (m/s, rad/s) to wheel targets
    pub fn map(&self, request: Velocity) -> WheelCommand {
        let mut x = request.linear * 1000.0;
        let mut th = request.angular * (self.track_width_mm / 2.0);

        let k = (x - th).abs().max((x + th).abs());
        if k > self.max_speed {
            let scale = self.max_speed / k;
            x *= scale;
            th *= scale;
        }

        WheelCommand::new((x - th).round() as i16, (x + th).round() as i16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mapper() -> VelocityMapper {
        VelocityMapper::new(0.248, 300)
    }

    #[test]
    fn test_zero_request() {
        assert_eq!(mapper().map(Velocity::zero()), WheelCommand::stop());
    }

    #[test]
    fn test_straight_within_envelope() {
        let cmd = mapper().map(Velocity::new(0.2, 0.0));
        assert_eq!(cmd, WheelCommand::new(200, 200));
    }

    #[test]
    fn test_straight_scaled_to_envelope() {
        // 0.5 m/s maps to 500 units, scaled by 300/500 onto both wheels
        let cmd = mapper().map(Velocity::new(0.5, 0.0));
        assert_eq!(cmd, WheelCommand::new(300, 300));
    }

    #[test]
    fn test_turn_in_place() {
        let cmd = mapper().map(Velocity::new(0.0, 1.0));
        assert_eq!(cmd, WheelCommand::new(-124, 124));
    }

    #[test]
    fn test_scaling_preserves_curvature() {
        let fast = Velocity::new(0.5, 1.2);
        let x = fast.linear * 1000.0;
        let th = fast.angular * 124.0;

        let cmd = mapper().map(fast);
        assert!(cmd.speed_limit() <= 300);

        // (left - right)/(left + right) must match the unscaled ratio
        let requested = -th / x;
        let produced =
            (cmd.left as f32 - cmd.right as f32) / (cmd.left as f32 + cmd.right as f32);
        assert_relative_eq!(produced, requested, epsilon = 0.01);
    }

    #[test]
    fn test_reverse_request() {
        let cmd = mapper().map(Velocity::new(-0.1, 0.0));
        assert_eq!(cmd, WheelCommand::new(-100, -100));
    }

    #[test]
    fn test_fast_arc_keeps_outer_wheel_at_limit() {
        let cmd = mapper().map(Velocity::new(0.4, 2.0));
        assert_eq!(cmd.speed_limit(), 300);
    }
}
