//! Fling velocity from recent pointer positions
//!
//! A least squares line through the samples of the last [`HORIZON`] seconds, per axis. Simpler
//! than a platform tracker's quadratic fit but good enough to decide fling or not, and in
//! which direction.

use kurbo::{Point, Vec2};

/// Older samples don't contribute, seconds
pub const HORIZON: f64 = 0.1;
/// If the pointer sat still this long before lifting there is no velocity, seconds
pub const ASSUME_STOPPED: f64 = 0.04;
const MAX_SAMPLES: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: Vec<(f64, Point)>,
}

impl VelocityTracker {
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn add(&mut self, time: f64, position: Point) {
        if let Some((last, _)) = self.samples.last() {
            if time - last > ASSUME_STOPPED {
                self.samples.clear();
            }
        }
        self.samples.push((time, position));
        if self.samples.len() > MAX_SAMPLES {
            self.samples.remove(0);
        }
    }

    /// Pixels per second, zero with fewer than two samples
    pub fn velocity(&self) -> Vec2 {
        let Some((newest, _)) = self.samples.last() else {
            return Vec2::ZERO;
        };
        let recent: Vec<_> = self
            .samples
            .iter()
            .filter(|(t, _)| newest - t <= HORIZON)
            .collect();
        if recent.len() < 2 {
            return Vec2::ZERO;
        }

        let n = recent.len() as f64;
        let mean_t = recent.iter().map(|(t, _)| t).sum::<f64>() / n;
        let mean_p = recent
            .iter()
            .fold(Vec2::ZERO, |acc, (_, p)| acc + p.to_vec2())
            / n;
        let (mut cov, mut var) = (Vec2::ZERO, 0.0);
        for (t, p) in recent {
            let dt = t - mean_t;
            cov += (p.to_vec2() - mean_p) * dt;
            var += dt * dt;
        }
        if var <= 0.0 {
            return Vec2::ZERO;
        }
        cov / var
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};

    use super::VelocityTracker;

    #[test]
    fn steady_motion() {
        let mut tracker = VelocityTracker::default();
        for i in 0..6 {
            let t = i as f64 * 0.01;
            tracker.add(t, Point::new(100.0 + 1000.0 * t, 50.0 - 500.0 * t));
        }
        let v = tracker.velocity();
        assert!((v.x - 1000.0).abs() < 1e-6, "{v:?}");
        assert!((v.y + 500.0).abs() < 1e-6, "{v:?}");
    }

    #[test]
    fn single_sample_is_still() {
        let mut tracker = VelocityTracker::default();
        tracker.add(0.0, Point::new(3.0, 4.0));
        assert_eq!(Vec2::ZERO, tracker.velocity());
    }

    #[test]
    fn pause_forgets_motion() {
        let mut tracker = VelocityTracker::default();
        tracker.add(0.0, Point::new(0.0, 0.0));
        tracker.add(0.01, Point::new(50.0, 0.0));
        tracker.add(0.5, Point::new(50.0, 0.0));
        assert_eq!(Vec2::ZERO, tracker.velocity());
    }
}
