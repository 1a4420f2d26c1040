//! Spring-based animation, ported from [Android's implmentation](https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/core/java/com/android/internal/dynamicanimation/animation/)

use crate::error::SpringBuildError;

/// `SpringForce.STIFFNESS_LOW`
pub const STIFFNESS_LOW: f64 = 200.0;
/// `SpringForce.DAMPING_RATIO_MEDIUM_BOUNCY`, the platform default
pub const DAMPING_RATIO_MEDIUM_BOUNCY: f64 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Spring {
    Overdamped {
        gamma_plus: f64,
        gamma_minus: f64,
    },
    CriticallyDamped {
        natural_freq: f64,
    },
    Underdamped {
        damping: f64,
        natural_freq: f64,
        damped_freq: f64,
    },
}

impl Spring {
    pub fn new(damping: f64, stiffness: f64) -> Result<Self, SpringBuildError> {
        if damping < 0.0 {
            return Err(SpringBuildError::InvalidDamping);
        }
        if stiffness <= 0.0 {
            return Err(SpringBuildError::InvalidStiffness);
        }
        Ok(Self::new_internal(damping, stiffness))
    }

    /// Precompute values we need repeatedly
    ///
    /// <https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/core/java/com/android/internal/dynamicanimation/animation/SpringForce.java;l=247-256;drc=d43dfb63eaf6cf07414c0a6a556f4f5881fa9fad>
    fn new_internal(damping: f64, stiffness: f64) -> Self {
        let natural_freq = stiffness.sqrt();
        if damping > 1.0 {
            Self::Overdamped {
                gamma_plus: -damping * natural_freq
                    + natural_freq * (damping * damping - 1.0).sqrt(),
                gamma_minus: -damping * natural_freq
                    - natural_freq * (damping * damping - 1.0).sqrt(),
            }
        } else if damping < 1.0 {
            Self::Underdamped {
                damping,
                natural_freq,
                damped_freq: natural_freq * (1.0 - damping * damping).sqrt(),
            }
        } else {
            Self::CriticallyDamped { natural_freq }
        }
    }

    /// Low stiffness, medium bouncy: what a `SpringForce().setStiffness(STIFFNESS_LOW)` gives you
    pub fn low_stiffness() -> Self {
        Self::new_internal(DAMPING_RATIO_MEDIUM_BOUNCY, STIFFNESS_LOW)
    }

    /// Compute for a new time, such as a new frame
    ///
    /// See:
    /// * [DynamicAnimation::doAnimationFrame](https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/core/java/com/android/internal/dynamicanimation/animation/DynamicAnimation.java;l=663-693;drc=b7d26a383dbb3c7fa3f276d8ad1afdac5bb5443f)
    /// * [SpringForce::updateValues](https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/core/java/com/android/internal/dynamicanimation/animation/SpringForce.java;l=261-307;drc=b7d26a383dbb3c7fa3f276d8ad1afdac5bb5443f)
    pub fn update(&self, time: f64, last: AnimatedValue) -> AnimatedValue {
        let delta_t = time - last.time;
        let last_displacement = last.value - last.final_value;

        let (value, velocity) = match self {
            Spring::Overdamped {
                gamma_plus,
                gamma_minus,
            } => {
                let coeff_a = last_displacement
                    - (gamma_minus * last_displacement - last.velocity)
                        / (gamma_minus - gamma_plus);
                let coeff_b =
                    (gamma_minus * last_displacement - last.velocity) / (gamma_minus - gamma_plus);
                let value = coeff_a * (gamma_minus * delta_t).exp()
                    + coeff_b * (gamma_plus * delta_t).exp();
                let velocity = coeff_a * gamma_minus * (gamma_minus * delta_t).exp()
                    + coeff_b * gamma_plus * (gamma_plus * delta_t).exp();
                (value, velocity)
            }
            Spring::CriticallyDamped { natural_freq } => {
                let coeff_a = last_displacement;
                let coeff_b = last.velocity + natural_freq * last_displacement;
                let value = (coeff_a + coeff_b * delta_t) * (-natural_freq * delta_t).exp();
                let velocity =
                    (coeff_a + coeff_b * delta_t) * (-natural_freq * delta_t).exp() * -natural_freq
                        + coeff_b * (-natural_freq * delta_t).exp();
                (value, velocity)
            }
            Spring::Underdamped {
                damping,
                natural_freq,
                damped_freq,
            } => {
                let cos_coeff = last_displacement;
                let sin_coeff = (1.0 / damped_freq)
                    * (damping * natural_freq * last_displacement + last.velocity);
                let value = (-damping * natural_freq * delta_t).exp()
                    * (cos_coeff * (damped_freq * delta_t).cos()
                        + sin_coeff * (damped_freq * delta_t).sin());
                let velocity = value * -natural_freq * damping
                    + (-damping * natural_freq * delta_t).exp()
                        * (-damped_freq * cos_coeff * (damped_freq * delta_t).sin()
                            + damped_freq * sin_coeff * (damped_freq * delta_t).cos());
                (value, velocity)
            }
        };
        AnimatedValue {
            value: value + last.final_value,
            velocity,
            final_value: last.final_value,
            time,
        }
    }
}

/// The state of something being animated
///
/// <https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/core/java/com/android/internal/dynamicanimation/animation/DynamicAnimation.java;l=332-336;drc=d43dfb63eaf6cf07414c0a6a556f4f5881fa9fad>
/// <https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/core/java/com/android/internal/dynamicanimation/animation/SpringForce.java;l=261-307;drc=b7d26a383dbb3c7fa3f276d8ad1afdac5bb5443f>
#[derive(Debug, Copy, Clone)]
pub struct AnimatedValue {
    pub value: f64,
    pub velocity: f64,
    pub final_value: f64,
    pub time: f64,
}

impl AnimatedValue {
    /// `from` and `to` in pixels
    pub fn new(from: f64, to: f64) -> Self {
        AnimatedValue {
            value: from,
            velocity: 0.0,
            final_value: to,
            time: 0.0,
        }
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    /// <https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/core/java/com/android/internal/dynamicanimation/animation/SpringForce.java;l=221-228;drc=b7d26a383dbb3c7fa3f276d8ad1afdac5bb5443f>
    pub fn is_at_equilibrium(&self) -> bool {
        self.velocity.abs() < VELOCITY_THRESHOLD
            && (self.value - self.final_value).abs() < VALUE_THRESHOLD
    }
}

/// `MIN_VISIBLE_CHANGE_PIXELS` scaled by Android's `THRESHOLD_MULTIPLIER` (0.75)
///
/// <https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/core/java/com/android/internal/dynamicanimation/animation/DynamicAnimation.java>
const VALUE_THRESHOLD: f64 = 1.0 * 0.75;

/// Moving less than the value threshold per 16ms frame counts as stopped
///
/// <https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/core/java/com/android/internal/dynamicanimation/animation/SpringForce.java;l=76-79;drc=b7d26a383dbb3c7fa3f276d8ad1afdac5bb5443f>
const VELOCITY_THRESHOLD: f64 = VALUE_THRESHOLD * 1000.0 / 16.0;
