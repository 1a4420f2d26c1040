//! The waving arm: a looping raise, wag, lower sequence
//!
//! Time is seconds on the host's frame clock. The first tick after creation anchors the
//! clock, much like an Android `AnimatorSet` starting on the next frame.

use std::time::Duration;

use rand::Rng;
use tracing::trace;

use crate::easing::ease_in_out_pow;

pub const REST_DEGREES: f64 = 0.0;
pub const RAISED_DEGREES: f64 = -170.0;
pub const WAG_DEGREES: f64 = -100.0;

const RAISE: Duration = Duration::from_millis(800);
const WAG_RUN: Duration = Duration::from_millis(500);
/// One forward run plus five reversals
const WAG_RUNS: u32 = 6;
const LOWER: Duration = Duration::from_millis(800);

const DELAY_STEP_MS: u64 = 50;
const DELAY_STEPS: u64 = 10;

/// Delay before each run of the sequence.
///
/// Decorrelates several figures on screen at once. Tests want [`StartDelay::from_millis`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct StartDelay(Duration);

impl StartDelay {
    pub const ZERO: Self = StartDelay(Duration::ZERO);

    /// 0..=450ms in steps of 50ms
    pub fn random() -> Self {
        let steps = rand::thread_rng().gen_range(0..DELAY_STEPS);
        Self::from_millis(steps * DELAY_STEP_MS)
    }

    pub const fn from_millis(millis: u64) -> Self {
        StartDelay(Duration::from_millis(millis))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LimbPhase {
    /// Waiting out the start delay, arm at rest
    Delay,
    Raise,
    Wag,
    Lower,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LimbAnimationState {
    pub angle_degrees: f64,
    pub phase: LimbPhase,
    pub elapsed_in_phase: Duration,
    /// Completed runs of the whole sequence
    pub cycles: u64,
}

impl Default for LimbAnimationState {
    fn default() -> Self {
        Self {
            angle_degrees: REST_DEGREES,
            phase: LimbPhase::Delay,
            elapsed_in_phase: Duration::ZERO,
            cycles: 0,
        }
    }
}

/// Length of one run, start delay included
pub fn cycle_duration(delay: StartDelay) -> Duration {
    delay.0 + RAISE + WAG_RUN * WAG_RUNS + LOWER
}

/// Pose of the arm `elapsed` into a run that starts with `delay`.
///
/// `elapsed` past the end of the run holds the final pose.
pub fn pose_at(delay: StartDelay, elapsed: Duration) -> (LimbPhase, Duration, f64) {
    if elapsed < delay.0 {
        return (LimbPhase::Delay, elapsed, REST_DEGREES);
    }
    let elapsed = elapsed - delay.0;
    if elapsed < RAISE {
        let fraction = elapsed.as_secs_f64() / RAISE.as_secs_f64();
        let angle = lerp(REST_DEGREES, RAISED_DEGREES, ease_in_out_pow(fraction, 2));
        return (LimbPhase::Raise, elapsed, angle);
    }
    let elapsed = elapsed - RAISE;
    let wag = WAG_RUN * WAG_RUNS;
    if elapsed < wag {
        let run = (elapsed.as_nanos() / WAG_RUN.as_nanos()) as u32;
        let in_run = elapsed - WAG_RUN * run;
        let mut fraction = in_run.as_secs_f64() / WAG_RUN.as_secs_f64();
        // Odd runs play backwards
        if run % 2 == 1 {
            fraction = 1.0 - fraction;
        }
        let angle = lerp(RAISED_DEGREES, WAG_DEGREES, ease_in_out_pow(fraction, 2));
        return (LimbPhase::Wag, elapsed, angle);
    }
    let elapsed = (elapsed - wag).min(LOWER);
    let fraction = elapsed.as_secs_f64() / LOWER.as_secs_f64();
    let angle = lerp(RAISED_DEGREES, REST_DEGREES, ease_in_out_pow(fraction, 5));
    (LimbPhase::Lower, elapsed, angle)
}

fn lerp(from: f64, to: f64, fraction: f64) -> f64 {
    from + (to - from) * fraction
}

/// Drives [`LimbAnimationState`] from frame ticks, restarting at the end of every run.
#[derive(Debug, Clone)]
pub struct LimbAnimator {
    delay: StartDelay,
    started_at: Option<f64>,
    cancelled: bool,
    state: LimbAnimationState,
}

impl LimbAnimator {
    pub fn new(delay: StartDelay) -> Self {
        Self {
            delay,
            started_at: None,
            cancelled: false,
            state: LimbAnimationState::default(),
        }
    }

    /// Advance to `time` (seconds). Returns the new angle, or None once cancelled.
    pub fn tick(&mut self, time: f64) -> Option<f64> {
        if self.cancelled {
            return None;
        }
        let started_at = *self.started_at.get_or_insert(time);
        let elapsed = Duration::from_secs_f64((time - started_at).max(0.0));

        let cycle = cycle_duration(self.delay);
        let cycles = (elapsed.as_nanos() / cycle.as_nanos()) as u64;
        let in_cycle = elapsed - cycle * cycles as u32;
        let (phase, elapsed_in_phase, angle_degrees) = pose_at(self.delay, in_cycle);

        if cycles != self.state.cycles {
            trace!("Limb sequence restarted, run {cycles}");
        }
        self.state = LimbAnimationState {
            angle_degrees,
            phase,
            elapsed_in_phase,
            cycles,
        };
        Some(angle_degrees)
    }

    /// Stops for good; a cancelled animator never restarts.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_running(&self) -> bool {
        !self.cancelled
    }

    pub fn state(&self) -> &LimbAnimationState {
        &self.state
    }

    pub fn angle(&self) -> f64 {
        self.state.angle_degrees
    }
}
