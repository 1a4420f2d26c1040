//! Springs translation back to rest after a drag or fling
//!
//! One spring per axis, each independently clamped, in the manner of a pair of
//! `SpringAnimation`s sharing a `SpringForce`.

use kurbo::Vec2;
use tracing::{debug, trace};

use crate::{
    spring::{AnimatedValue, Spring},
    transform::TranslationBounds,
};

/// Where translation settles
pub const REST: f64 = 0.0;

#[derive(Debug, Copy, Clone)]
struct AxisSpring {
    value: AnimatedValue,
    min: f64,
    max: f64,
    /// The first tick only records the time
    anchored: bool,
}

impl AxisSpring {
    fn new(start: f64, velocity: f64, min: f64, max: f64) -> Self {
        Self {
            value: AnimatedValue::new(start.max(min).min(max), REST)
                .with_velocity(velocity),
            min,
            max,
            anchored: false,
        }
    }

    /// Returns the new value and whether the axis came to rest
    fn tick(&mut self, spring: &Spring, time: f64) -> (f64, bool) {
        if !self.anchored {
            self.value.time = time;
            self.anchored = true;
            return (self.value.value, false);
        }
        let mut next = spring.update(time, self.value);
        next.value = next.value.max(self.min).min(self.max);
        let finished = next.is_at_equilibrium();
        if finished {
            next.value = next.final_value;
            next.velocity = 0.0;
        }
        self.value = next;
        (next.value, finished)
    }
}

/// What one frame of settling produced; None for an axis that is not animating
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SettleTick {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl SettleTick {
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }

    /// Overwrite the animated axes of `translation`
    pub fn apply(&self, translation: &mut Vec2) {
        if let Some(x) = self.x {
            translation.x = x;
        }
        if let Some(y) = self.y {
            translation.y = y;
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpringSettler {
    spring: Spring,
    x: Option<AxisSpring>,
    y: Option<AxisSpring>,
}

impl Default for SpringSettler {
    fn default() -> Self {
        Self::new(Spring::low_stiffness())
    }
}

impl SpringSettler {
    pub fn new(spring: Spring) -> Self {
        Self {
            spring,
            x: None,
            y: None,
        }
    }

    /// Launch both axes from `start` with `velocity` (px/s) toward rest.
    ///
    /// Does nothing, and returns false, when `start` is already at rest on both axes.
    pub fn start(&mut self, start: Vec2, velocity: Vec2, bounds: TranslationBounds) -> bool {
        if start.x == REST && start.y == REST {
            return false;
        }
        debug!("Settling from {start:?} at {velocity:?} within {bounds:?}");
        self.x = Some(AxisSpring::new(
            start.x,
            velocity.x,
            bounds.min.x,
            bounds.max.x,
        ));
        self.y = Some(AxisSpring::new(
            start.y,
            velocity.y,
            bounds.min.y,
            bounds.max.y,
        ));
        true
    }

    /// Drop any in-flight settle immediately
    pub fn cancel(&mut self) {
        if self.is_running() {
            debug!("Settle cancelled");
        }
        self.x = None;
        self.y = None;
    }

    pub fn is_running(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    pub fn tick(&mut self, time: f64) -> SettleTick {
        let spring = self.spring;
        let step = |axis: &mut Option<AxisSpring>| -> Option<f64> {
            let running = axis.as_mut()?;
            let (value, finished) = running.tick(&spring, time);
            if finished {
                trace!("Axis settled at {value}");
                *axis = None;
            }
            Some(value)
        };
        SettleTick {
            x: step(&mut self.x),
            y: step(&mut self.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use crate::transform::TranslationBounds;

    use super::{SettleTick, SpringSettler};

    fn bounded() -> TranslationBounds {
        TranslationBounds {
            min: Vec2::new(-100.0, -85.0),
            max: Vec2::new(60.0, 85.0),
        }
    }

    /// 60fps, run until complete or 5s
    fn run(settler: &mut SpringSettler) -> Vec<Vec2> {
        let mut translation = Vec2::ZERO;
        let mut frames = Vec::new();
        for frame in 0..300 {
            let tick = settler.tick(frame as f64 / 60.0);
            if tick.is_empty() {
                break;
            }
            tick.apply(&mut translation);
            frames.push(translation);
        }
        frames
    }

    #[test]
    fn nothing_to_do_at_rest() {
        let mut settler = SpringSettler::default();
        assert!(!settler.start(Vec2::ZERO, Vec2::new(900.0, 0.0), bounded()));
        assert!(!settler.is_running());
        assert_eq!(SettleTick::default(), settler.tick(0.0));
    }

    #[test]
    fn either_axis_off_rest_settles_both() {
        let mut settler = SpringSettler::default();
        assert!(settler.start(Vec2::new(0.0, 40.0), Vec2::ZERO, bounded()));
        let frames = run(&mut settler);
        assert!(!settler.is_running(), "{frames:#?}");
        assert_eq!(Vec2::ZERO, *frames.last().unwrap());
    }

    #[test]
    fn first_tick_holds_start() {
        let mut settler = SpringSettler::default();
        settler.start(Vec2::new(50.0, 0.0), Vec2::ZERO, bounded());
        let tick = settler.tick(3.0);
        assert_eq!(Some(50.0), tick.x);
        assert_eq!(Some(0.0), tick.y);
        let tick = settler.tick(3.0 + 1.0 / 60.0);
        assert!(tick.x.unwrap() < 50.0, "{tick:?}");
    }

    #[test]
    fn stays_within_bounds() {
        let bounds = bounded();
        let mut settler = SpringSettler::default();
        settler.start(
            Vec2::new(50.0, -80.0),
            Vec2::new(8000.0, -8000.0),
            bounds,
        );
        let frames = run(&mut settler);
        assert!(frames.len() > 2);
        for t in frames {
            assert!(t.x >= bounds.min.x && t.x <= bounds.max.x, "{t:?}");
            assert!(t.y >= bounds.min.y && t.y <= bounds.max.y, "{t:?}");
        }
    }

    #[test]
    fn unbounded_overshoots_freely() {
        let mut settler = SpringSettler::default();
        settler.start(
            Vec2::new(10.0, 0.0),
            Vec2::new(8000.0, 0.0),
            TranslationBounds::UNBOUNDED,
        );
        let frames = run(&mut settler);
        assert!(frames.iter().any(|t| t.x > 100.0), "{frames:#?}");
    }

    #[test]
    fn cancel_discards() {
        let mut settler = SpringSettler::default();
        settler.start(Vec2::new(50.0, 50.0), Vec2::ZERO, bounded());
        settler.tick(0.0);
        settler.tick(0.016);
        settler.cancel();
        assert!(!settler.is_running());
        assert!(settler.tick(0.032).is_empty());
    }
}
