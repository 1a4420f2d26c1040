//! Where the figure is: translation, rotation and the three finger freeform matrix

use kurbo::{Affine, Insets, Point, Size, Vec2};

use crate::bezop::{rotate_about, MIN_DETERMINANT};

/// Clamp range for translation, per axis
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TranslationBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl TranslationBounds {
    pub const UNBOUNDED: Self = TranslationBounds {
        min: Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        max: Vec2::new(f64::INFINITY, f64::INFINITY),
    };

    pub fn clamp(&self, translation: Vec2) -> Vec2 {
        Vec2::new(
            translation.x.max(self.min.x).min(self.max.x),
            translation.y.max(self.min.y).min(self.max.y),
        )
    }

    pub fn contains(&self, translation: Vec2) -> bool {
        self.clamp(translation) == translation
    }
}

/// Derives [`TranslationBounds`] from the current layout.
///
/// The figure may move until its edges meet the padding, but never so far that rest (zero)
/// falls outside the range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundsPolicy {
    pub limit_enabled: bool,
    pub width_unit: f64,
    pub size: Size,
    pub padding: Insets,
}

impl BoundsPolicy {
    /// Size inside the padding, never negative
    pub fn drawing_size(&self) -> Size {
        drawing_size(self.size, self.padding)
    }

    pub fn bounds(&self) -> TranslationBounds {
        if !self.limit_enabled {
            return TranslationBounds::UNBOUNDED;
        }
        let drawing = self.drawing_size();
        let unit = self.width_unit;
        let padding = self.padding;
        TranslationBounds {
            min: Vec2::new(
                (-drawing.width / 2.0 + unit * 0.5 - padding.x0).min(0.0),
                (-drawing.height / 2.0 + unit * 0.65 - padding.y0).min(0.0),
            ),
            max: Vec2::new(
                (drawing.width / 2.0 - unit * 0.9 + padding.x1).max(0.0),
                (drawing.height / 2.0 - unit * 0.65 + padding.y1).max(0.0),
            ),
        }
    }
}

pub fn drawing_size(size: Size, padding: Insets) -> Size {
    Size::new(
        (size.width - padding.x0 - padding.x1).max(0.0),
        (size.height - padding.y0 - padding.y1).max(0.0),
    )
}

/// Which of rotation or the freeform matrix gestures may currently write
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransformMode {
    #[default]
    Rotation,
    Freeform,
}

/// The authoritative transform, read at draw time.
///
/// While in [`TransformMode::Freeform`] rotation is frozen; leaving freeform mode keeps the
/// matrix so nothing jumps on screen.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct TransformState {
    pub translation: Vec2,
    rotation_degrees: f64,
    freeform: Option<Affine>,
    mode: TransformMode,
}

impl TransformState {
    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn rotation(&self) -> f64 {
        self.rotation_degrees
    }

    /// Returns false, changing nothing, while freeform mode is active
    pub fn set_rotation(&mut self, degrees: f64) -> bool {
        if self.mode == TransformMode::Freeform {
            return false;
        }
        self.rotation_degrees = degrees;
        true
    }

    pub fn freeform(&self) -> Option<Affine> {
        self.freeform
    }

    /// The freeform matrix, identity if there has never been one
    pub fn cumulative_freeform(&self) -> Affine {
        self.freeform.unwrap_or(Affine::IDENTITY)
    }

    pub fn enter_freeform(&mut self) {
        self.mode = TransformMode::Freeform;
    }

    /// Returns false, changing nothing, unless freeform mode is active
    pub fn set_freeform(&mut self, freeform: Affine) -> bool {
        if self.mode != TransformMode::Freeform {
            return false;
        }
        self.freeform = Some(freeform);
        true
    }

    pub fn release_freeform(&mut self) {
        self.mode = TransformMode::Rotation;
    }

    /// Map a screen space movement back through the freeform matrix, so adding the result
    /// to translation moves the drawn figure by exactly `delta`.
    pub fn unfreeform(&self, delta: Vec2) -> Vec2 {
        let [a, b, c, d, _, _] = self.cumulative_freeform().as_coeffs();
        let det = a * d - b * c;
        if det.abs() < MIN_DETERMINANT {
            return delta;
        }
        Vec2::new((d * delta.x - c * delta.y) / det, (a * delta.y - b * delta.x) / det)
    }

    /// Everything applied to the figure: `freeform * translate * rotate about pivot`
    pub fn matrix(&self, bounds: TranslationBounds, pivot: Point) -> Affine {
        self.cumulative_freeform()
            * Affine::translate(bounds.clamp(self.translation))
            * rotate_about(self.rotation_degrees, pivot)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Affine, Insets, Point, Size, Vec2};

    use super::*;

    fn scenario_policy() -> BoundsPolicy {
        BoundsPolicy {
            limit_enabled: true,
            width_unit: 100.0,
            size: Size::new(300.0, 300.0),
            padding: Insets::ZERO,
        }
    }

    #[test]
    fn bounds_for_centered_figure() {
        let bounds = scenario_policy().bounds();
        assert_eq!(Vec2::new(-100.0, -85.0), bounds.min);
        assert_eq!(Vec2::new(60.0, 85.0), bounds.max);
    }

    #[test]
    fn bounds_always_contain_rest() {
        let policy = BoundsPolicy {
            size: Size::new(50.0, 20.0),
            padding: Insets::uniform(30.0),
            ..scenario_policy()
        };
        assert_eq!(Size::ZERO, policy.drawing_size());
        let bounds = policy.bounds();
        assert!(bounds.contains(Vec2::ZERO), "{bounds:?}");
    }

    #[test]
    fn unlimited_is_unbounded() {
        let policy = BoundsPolicy {
            limit_enabled: false,
            ..scenario_policy()
        };
        assert_eq!(TranslationBounds::UNBOUNDED, policy.bounds());
        let far = Vec2::new(1e9, -1e9);
        assert_eq!(far, policy.bounds().clamp(far));
    }

    #[test]
    fn freeform_mode_freezes_rotation() {
        let mut state = TransformState::default();
        assert!(state.set_rotation(30.0));
        state.enter_freeform();
        assert!(!state.set_rotation(45.0));
        assert_eq!(30.0, state.rotation());
        assert!(state.set_freeform(Affine::scale(2.0)));
        state.release_freeform();
        assert!(!state.set_freeform(Affine::scale(3.0)));
        assert_eq!(Some(Affine::scale(2.0)), state.freeform());
        assert!(state.set_rotation(45.0));
    }

    #[test]
    fn unfreeform_cancels_linear_part() {
        let mut state = TransformState::default();
        assert_eq!(Vec2::new(50.0, 0.0), state.unfreeform(Vec2::new(50.0, 0.0)));

        state.enter_freeform();
        let freeform = Affine::translate((7.0, -3.0)) * Affine::rotate(0.7) * Affine::scale(2.0);
        state.set_freeform(freeform);
        state.release_freeform();
        let local = state.unfreeform(Vec2::new(50.0, 0.0));
        state.translation = local;
        let pivot = Point::new(150.0, 135.0);
        let moved = state.matrix(TranslationBounds::UNBOUNDED, pivot) * Point::ZERO
            - freeform * Point::ZERO;
        assert!((moved - Vec2::new(50.0, 0.0)).hypot() < 1e-9, "{moved:?}");
    }

    #[test]
    fn matrix_uses_clamped_translation() {
        let state = TransformState {
            translation: Vec2::new(500.0, 0.0),
            ..Default::default()
        };
        let bounds = scenario_policy().bounds();
        let m = state.matrix(bounds, Point::new(150.0, 135.0));
        assert_eq!(Point::new(60.0, 0.0), m * Point::ZERO);
    }
}
