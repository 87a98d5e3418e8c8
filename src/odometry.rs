//! Dead-reckoned pose integration from wheel encoders

use crate::types::{EncoderPair, Pose2D, Velocity};

/// Result of one integration step
#[derive(Debug, Clone, Copy)]
pub struct PoseUpdate {
    /// Accumulated pose after this step
    pub pose: Pose2D,
    /// Velocity estimate over this step
    pub twist: Velocity,
}

/// Integrates encoder tick deltas into a global pose estimate.
///
/// The pose is owned here and mutated once per cycle by accumulation; it is
/// never reset during a run. Heading accumulates unbounded.
pub struct PoseIntegrator {
    pose: Pose2D,
    ticks_per_meter: f32,
    track_width: f32,
    last_ticks: Option<EncoderPair>,
}

impl PoseIntegrator {
    /// Create an integrator at the origin
    ///
    /// # Arguments
    /// * `ticks_per_meter` - Encoder ticks per meter of wheel travel
    /// * `track_width` - Distance between wheel centers in meters
    pub fn new(ticks_per_meter: f32, track_width: f32) -> Self {
        Self {
            pose: Pose2D::default(),
            ticks_per_meter,
            track_width,
            last_ticks: None,
        }
    }

    /// Current accumulated pose
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Integrate one cycle of encoder readings.
    ///
    /// The first call seeds the stored tick counts and reports zero motion;
    /// the counters may hold arbitrary values at startup. `dt` is the
    /// wall-clock time covered by this sample in seconds; a non-positive
    /// `dt` yields a zero twist while the pose still accumulates.
    pub fn update(&mut self, ticks: EncoderPair, dt: f32) -> PoseUpdate {
        let last = match self.last_ticks.replace(ticks) {
            Some(last) => last,
            None => {
                log::debug!(
                    "PoseIntegrator: seeded encoders L={} R={}",
                    ticks.left,
                    ticks.right
                );
                return PoseUpdate {
                    pose: self.pose,
                    twist: Velocity::zero(),
                };
            }
        };

        let d_left = (ticks.left - last.left) as f32 / self.ticks_per_meter;
        let d_right = (ticks.right - last.right) as f32 / self.ticks_per_meter;

        let dx = (d_left + d_right) / 2.0;
        let dth = (d_right - d_left) / self.track_width;

        // Chord model: the forward displacement is rotated by the heading
        // change, then into the odom frame at the previous heading.
        let local_x = dth.cos() * dx;
        let local_y = -dth.sin() * dx;
        let (sin_t, cos_t) = self.pose.theta.sin_cos();
        self.pose.x += cos_t * local_x - sin_t * local_y;
        self.pose.y += sin_t * local_x + cos_t * local_y;
        self.pose.theta += dth;

        let twist = if dt > 0.0 {
            Velocity::new(dx / dt, dth / dt)
        } else {
            Velocity::zero()
        };

        PoseUpdate {
            pose: self.pose,
            twist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    const TRACK_WIDTH: f32 = 0.248;

    fn integrator() -> PoseIntegrator {
        PoseIntegrator::new(1000.0, TRACK_WIDTH)
    }

    #[test]
    fn test_first_sample_reports_no_motion() {
        let mut odom = integrator();

        // Counters are mid-run at startup; no displacement may be inferred
        let update = odom.update(EncoderPair::new(884211, -3021), 0.2);
        assert_eq!(update.pose, Pose2D::default());
        assert_eq!(update.twist, Velocity::zero());
    }

    #[test]
    fn test_straight_line() {
        let mut odom = integrator();
        odom.update(EncoderPair::new(1000, 1000), 0.2);

        // Both wheels +100 ticks over 0.2s: 0.1m per wheel, no turn
        let update = odom.update(EncoderPair::new(1100, 1100), 0.2);
        assert_relative_eq!(update.pose.x, 0.1, epsilon = 1e-6);
        assert_relative_eq!(update.pose.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(update.pose.theta, 0.0, epsilon = 1e-6);
        assert_relative_eq!(update.twist.linear, 0.5, epsilon = 1e-6);
        assert_relative_eq!(update.twist.angular, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_straight_line_heading_carries_over() {
        let mut odom = integrator();
        odom.update(EncoderPair::new(0, 0), 0.2);

        // Quarter turn in place, then drive straight: motion follows +y
        let arc = FRAC_PI_2 * TRACK_WIDTH / 2.0;
        let ticks = (arc * 1000.0).round() as i32;
        odom.update(EncoderPair::new(-ticks, ticks), 0.2);
        let update = odom.update(EncoderPair::new(-ticks + 200, ticks + 200), 0.2);

        assert_relative_eq!(update.pose.x, 0.0, epsilon = 5e-3);
        assert_relative_eq!(update.pose.y, 0.2, epsilon = 5e-3);
    }

    #[test]
    fn test_rotation_in_place() {
        let mut odom = integrator();
        odom.update(EncoderPair::new(0, 0), 0.2);

        // Opposite wheel motion: no translation, positive heading change
        let update = odom.update(EncoderPair::new(-50, 50), 0.2);
        assert_relative_eq!(update.pose.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(update.pose.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(update.pose.theta, 0.1 / TRACK_WIDTH, epsilon = 1e-6);
    }

    #[test]
    fn test_heading_accumulates_unbounded() {
        let mut odom = integrator();
        odom.update(EncoderPair::new(0, 0), 0.2);

        // Ten full turns in place; heading must not wrap
        let arc_per_turn = std::f32::consts::TAU * TRACK_WIDTH / 2.0;
        let ticks_per_turn = (arc_per_turn * 1000.0) as i32;
        let mut theta = 0.0;
        for turn in 1..=10 {
            let t = ticks_per_turn * turn;
            theta = odom.update(EncoderPair::new(-t, t), 0.2).pose.theta;
        }
        assert!(theta > 60.0, "heading wrapped: {}", theta);
    }

    #[test]
    fn test_incremental_matches_bulk_for_gentle_arc() {
        // Integrating n small deltas that sum to D approximates integrating
        // D in one step when the heading change per step is small.
        let mut fine = integrator();
        let mut bulk = integrator();
        fine.update(EncoderPair::new(0, 0), 0.2);
        bulk.update(EncoderPair::new(0, 0), 0.2);

        let (total_left, total_right) = (400, 402);
        let steps = 100;
        let mut last = Pose2D::default();
        for i in 1..=steps {
            let ticks = EncoderPair::new(total_left * i / steps, total_right * i / steps);
            last = fine.update(ticks, 0.01).pose;
        }
        let one_shot = bulk
            .update(EncoderPair::new(total_left, total_right), 1.0)
            .pose;

        assert_relative_eq!(last.x, one_shot.x, epsilon = 0.01);
        assert_relative_eq!(last.y, one_shot.y, epsilon = 0.01);
        assert_relative_eq!(last.theta, one_shot.theta, epsilon = 1e-4);
    }

    #[test]
    fn test_zero_dt_yields_zero_twist() {
        let mut odom = integrator();
        odom.update(EncoderPair::new(0, 0), 0.2);

        let update = odom.update(EncoderPair::new(100, 100), 0.0);
        assert_eq!(update.twist, Velocity::zero());
        // Pose accumulation is unaffected by the degenerate timestamp
        assert_relative_eq!(update.pose.x, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_reverse_motion() {
        let mut odom = integrator();
        odom.update(EncoderPair::new(500, 500), 0.2);

        let update = odom.update(EncoderPair::new(400, 400), 0.2);
        assert_relative_eq!(update.pose.x, -0.1, epsilon = 1e-6);
        assert_relative_eq!(update.twist.linear, -0.5, epsilon = 1e-6);
    }
}
