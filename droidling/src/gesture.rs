//! Turns pointer sequences into drag, fling, rotate and freeform transform changes
//!
//! A sequence is only accepted if it starts inside the figure's hit box. From there:
//!
//! ```text
//!   Idle --down in hit box--> Pressed --past touch slop--> Dragging
//!   Pressed --up--> Idle (click)
//!   Dragging --up/cancel--> Idle (settle, with fling velocity if fast enough)
//!   Idle/Pressed/Dragging --2nd pointer--> Rotating --2nd pointer up--> Idle
//!   Rotating --3rd pointer--> Transforming --one of three up--> Rotating
//!   any --cancel--> Idle
//! ```
//!
//! The translator mutates [`TransformState`] directly and reports everything else the widget
//! has to do as [`GestureEffect`]s.

use kurbo::{Affine, Point, Rect, Vec2};
use tracing::debug;

use crate::{
    bezop::triangle_affine,
    touch::{TouchAction, TouchEvent},
    transform::{TransformMode, TransformState},
    velocity::VelocityTracker,
};

/// Movement before a press becomes a drag, px
pub const TOUCH_SLOP: f64 = 8.0;
/// Slower releases don't fling, px/s
pub const MIN_FLING_VELOCITY: f64 = 50.0;
/// Fling velocity is capped to this, per axis, px/s
pub const MAX_FLING_VELOCITY: f64 = 8000.0;

/// Angle of the line through two pointers, in degrees, counter-clockwise on screen
pub fn pointer_angle(p0: Point, p1: Point) -> f64 {
    let delta = p0 - p1;
    -delta.y.atan2(delta.x).to_degrees()
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    /// Down inside the hit box, could still be a tap
    Pressed,
    Dragging,
    Rotating {
        base_rotation: f64,
    },
    Transforming {
        baseline: Affine,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GestureEffect {
    /// Ask (true) or stop asking (false) ancestors not to steal the sequence
    DisallowIntercept(bool),
    /// Drop any in-flight settle before translation is touched
    CancelSettle,
    /// Settle translation back toward rest, starting at this velocity
    Settle { velocity: Vec2 },
    Click,
    Redraw,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchResponse {
    /// Whether the sequence belongs to us
    pub handled: bool,
    pub effects: Vec<GestureEffect>,
}

impl TouchResponse {
    fn ignored() -> Self {
        Self::default()
    }
}

/// Everything remembered about one pointer sequence
#[derive(Debug, Clone)]
struct GestureSession {
    down: Point,
    last: Point,
    tracker: VelocityTracker,
    state: GestureState,
}

#[derive(Debug, Clone, Default)]
pub struct GestureTranslator {
    session: Option<GestureSession>,
}

impl GestureTranslator {
    pub fn state(&self) -> GestureState {
        self.session
            .as_ref()
            .map(|s| s.state)
            .unwrap_or(GestureState::Idle)
    }

    /// Whether a sequence is in progress and ours
    pub fn is_tracking(&self) -> bool {
        self.session.is_some()
    }

    /// Forget the current sequence without emitting anything, e.g. on detach
    pub fn reset(&mut self, transform: &mut TransformState) {
        if transform.mode() == TransformMode::Freeform {
            transform.release_freeform();
        }
        self.session = None;
    }

    pub fn on_touch(
        &mut self,
        event: &TouchEvent,
        hit_box: Rect,
        transform: &mut TransformState,
    ) -> TouchResponse {
        let before = self.state();
        let mut effects = Vec::new();
        let session = match (event.action, self.session.as_mut()) {
            (TouchAction::Down, _) => return self.on_down(event, hit_box),
            (_, None) => return TouchResponse::ignored(),
            (TouchAction::Up | TouchAction::Cancel, Some(session)) => {
                session.end(event, transform, &mut effects);
                debug!("{:?} ends {:?}", event.action, before);
                self.session = None;
                return TouchResponse {
                    handled: true,
                    effects,
                };
            }
            (TouchAction::PointerDown(..), Some(session)) => {
                session.pointer_down(event, transform);
                session
            }
            (TouchAction::Move, Some(session)) => {
                session.moved(event, transform, &mut effects);
                session
            }
            (TouchAction::PointerUp(..), Some(session)) => {
                session.pointer_up(event, transform);
                session
            }
        };
        if session.state != before {
            debug!("{before:?} => {:?}", session.state);
        }
        TouchResponse {
            handled: true,
            effects,
        }
    }

    fn on_down(&mut self, event: &TouchEvent, hit_box: Rect) -> TouchResponse {
        let Some(at) = event.primary() else {
            return TouchResponse::ignored();
        };
        if !hit_box.contains(at) {
            debug!("Down at {at:?} misses {hit_box:?}");
            self.session = None;
            return TouchResponse::ignored();
        }
        let mut tracker = VelocityTracker::default();
        tracker.add(event.time, at);
        self.session = Some(GestureSession {
            down: at,
            last: at,
            tracker,
            state: GestureState::Pressed,
        });
        TouchResponse {
            handled: true,
            effects: vec![GestureEffect::DisallowIntercept(true)],
        }
    }
}

impl GestureSession {
    fn pointer_down(&mut self, event: &TouchEvent, transform: &mut TransformState) {
        match event.pointers.as_slice() {
            [p0, p1] => {
                self.state = GestureState::Rotating {
                    base_rotation: transform.rotation() + pointer_angle(*p0, *p1),
                };
            }
            [p0, p1, p2] => {
                let Some(touch) = triangle_affine([*p0, *p1, *p2]) else {
                    debug!("Ignoring collinear third pointer");
                    return;
                };
                // Freeform(now) = touch(now) * baseline, which at this instant is the current matrix
                let baseline = touch.inverse() * transform.cumulative_freeform();
                transform.enter_freeform();
                self.state = GestureState::Transforming { baseline };
            }
            _ => (),
        }
    }

    fn moved(
        &mut self,
        event: &TouchEvent,
        transform: &mut TransformState,
        effects: &mut Vec<GestureEffect>,
    ) {
        match self.state {
            GestureState::Idle => (),
            GestureState::Pressed => {
                let Some(at) = event.primary() else {
                    return;
                };
                self.tracker.add(event.time, at);
                if (at - self.down).hypot() > TOUCH_SLOP {
                    self.state = GestureState::Dragging;
                    effects.push(GestureEffect::CancelSettle);
                    self.drag_to(at, transform, effects);
                }
            }
            GestureState::Dragging => {
                let Some(at) = event.primary() else {
                    return;
                };
                self.tracker.add(event.time, at);
                self.drag_to(at, transform, effects);
            }
            GestureState::Rotating { base_rotation } => {
                if let [p0, p1, ..] = event.pointers.as_slice() {
                    if transform.set_rotation(base_rotation - pointer_angle(*p0, *p1)) {
                        effects.push(GestureEffect::Redraw);
                    }
                }
            }
            GestureState::Transforming { baseline } => {
                if let [p0, p1, p2, ..] = event.pointers.as_slice() {
                    let Some(touch) = triangle_affine([*p0, *p1, *p2]) else {
                        return;
                    };
                    if transform.set_freeform(touch * baseline) {
                        effects.push(GestureEffect::Redraw);
                    }
                }
            }
        }
    }

    fn drag_to(&mut self, at: Point, transform: &mut TransformState, effects: &mut Vec<GestureEffect>) {
        transform.translation += transform.unfreeform(at - self.last);
        self.last = at;
        effects.push(GestureEffect::Redraw);
    }

    fn pointer_up(&mut self, event: &TouchEvent, transform: &mut TransformState) {
        let remaining = event.remaining();
        match (self.state, remaining.as_slice()) {
            (GestureState::Transforming { .. }, [p0, p1]) => {
                transform.release_freeform();
                self.state = GestureState::Rotating {
                    base_rotation: transform.rotation() + pointer_angle(*p0, *p1),
                };
            }
            (GestureState::Transforming { .. }, [p0, p1, p2, ..]) => {
                // A different triangle now leads; re-anchor so the figure stays put
                if let Some(touch) = triangle_affine([*p0, *p1, *p2]) {
                    self.state = GestureState::Transforming {
                        baseline: touch.inverse() * transform.cumulative_freeform(),
                    };
                }
            }
            (GestureState::Rotating { .. }, [_]) => self.state = GestureState::Idle,
            (GestureState::Rotating { .. }, [p0, p1, ..]) => {
                self.state = GestureState::Rotating {
                    base_rotation: transform.rotation() + pointer_angle(*p0, *p1),
                };
            }
            _ => (),
        }
    }

    fn end(
        &mut self,
        event: &TouchEvent,
        transform: &mut TransformState,
        effects: &mut Vec<GestureEffect>,
    ) {
        if transform.mode() == TransformMode::Freeform {
            transform.release_freeform();
        }
        match (event.action, self.state) {
            (TouchAction::Up, GestureState::Pressed) => effects.push(GestureEffect::Click),
            (TouchAction::Up, GestureState::Dragging) => {
                if let Some(at) = event.primary() {
                    self.tracker.add(event.time, at);
                }
                effects.push(GestureEffect::Settle {
                    velocity: transform.unfreeform(fling_velocity(self.tracker.velocity())),
                });
            }
            _ => effects.push(GestureEffect::Settle {
                velocity: Vec2::ZERO,
            }),
        }
        effects.push(GestureEffect::DisallowIntercept(false));
    }
}

/// Release velocity if it is a fling, capped; otherwise zero
fn fling_velocity(velocity: Vec2) -> Vec2 {
    if velocity.x.abs() <= MIN_FLING_VELOCITY && velocity.y.abs() <= MIN_FLING_VELOCITY {
        return Vec2::ZERO;
    }
    Vec2::new(
        velocity.x.clamp(-MAX_FLING_VELOCITY, MAX_FLING_VELOCITY),
        velocity.y.clamp(-MAX_FLING_VELOCITY, MAX_FLING_VELOCITY),
    )
}

#[cfg(test)]
mod tests {
    use kurbo::{Affine, Point, Rect, Vec2};

    use crate::{
        touch::{TouchAction, TouchEvent},
        transform::{TransformMode, TransformState},
    };

    use super::*;

    fn hit_box() -> Rect {
        Rect::new(100.0, 50.0, 200.0, 215.0)
    }

    fn touch(
        translator: &mut GestureTranslator,
        transform: &mut TransformState,
        event: TouchEvent,
    ) -> TouchResponse {
        translator.on_touch(&event, hit_box(), transform)
    }

    fn pts(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|p| Point::new(p.0, p.1)).collect()
    }

    #[test]
    fn angle_is_counter_clockwise_positive() {
        assert_eq!(0.0, pointer_angle(Point::new(10.0, 0.0), Point::ZERO));
        // y-down: a pointer above the other is counter-clockwise on screen
        assert!((pointer_angle(Point::new(0.0, -10.0), Point::ZERO) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn down_outside_is_ignored_until_next_down() {
        let mut translator = GestureTranslator::default();
        let mut transform = TransformState::default();
        let response = touch(&mut translator, &mut transform, TouchEvent::down(0.0, (10.0, 10.0)));
        assert!(!response.handled);
        let response = touch(
            &mut translator,
            &mut transform,
            TouchEvent::moved(0.1, pts(&[(150.0, 150.0)])),
        );
        assert!(!response.handled);
        assert_eq!(Vec2::ZERO, transform.translation);
        assert_eq!(GestureState::Idle, translator.state());
    }

    #[test]
    fn tap_clicks_once() {
        let mut translator = GestureTranslator::default();
        let mut transform = TransformState::default();
        let down = touch(&mut translator, &mut transform, TouchEvent::down(0.0, (150.0, 150.0)));
        assert_eq!(vec![GestureEffect::DisallowIntercept(true)], down.effects);
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::moved(0.02, pts(&[(153.0, 151.0)])),
        );
        let up = touch(&mut translator, &mut transform, TouchEvent::up(0.05, (153.0, 151.0)));
        assert_eq!(
            vec![
                GestureEffect::Click,
                GestureEffect::DisallowIntercept(false)
            ],
            up.effects
        );
        assert_eq!(Vec2::ZERO, transform.translation);
        assert!(!translator.is_tracking());
    }

    #[test]
    fn drag_translates_by_total_displacement() {
        let mut translator = GestureTranslator::default();
        let mut transform = TransformState::default();
        touch(&mut translator, &mut transform, TouchEvent::down(0.0, (150.0, 150.0)));
        let first = touch(
            &mut translator,
            &mut transform,
            TouchEvent::moved(0.016, pts(&[(170.0, 150.0)])),
        );
        assert_eq!(GestureState::Dragging, translator.state());
        assert_eq!(GestureEffect::CancelSettle, first.effects[0]);
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::moved(0.032, pts(&[(200.0, 150.0)])),
        );
        assert_eq!(Vec2::new(50.0, 0.0), transform.translation);
    }

    #[test]
    fn slow_release_settles_without_velocity() {
        let mut translator = GestureTranslator::default();
        let mut transform = TransformState::default();
        touch(&mut translator, &mut transform, TouchEvent::down(0.0, (150.0, 150.0)));
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::moved(0.016, pts(&[(200.0, 150.0)])),
        );
        // Hold still long enough that no velocity remains
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::moved(0.5, pts(&[(200.0, 150.0)])),
        );
        let up = touch(&mut translator, &mut transform, TouchEvent::up(0.52, (200.0, 150.0)));
        assert_eq!(
            vec![
                GestureEffect::Settle {
                    velocity: Vec2::ZERO
                },
                GestureEffect::DisallowIntercept(false)
            ],
            up.effects
        );
    }

    #[test]
    fn fast_release_flings() {
        let mut translator = GestureTranslator::default();
        let mut transform = TransformState::default();
        touch(&mut translator, &mut transform, TouchEvent::down(0.0, (150.0, 150.0)));
        for i in 1..=5 {
            let t = i as f64 * 0.01;
            touch(
                &mut translator,
                &mut transform,
                TouchEvent::moved(t, pts(&[(150.0 + 2000.0 * t, 150.0)])),
            );
        }
        let up = touch(&mut translator, &mut transform, TouchEvent::up(0.06, (270.0, 150.0)));
        let GestureEffect::Settle { velocity } = up.effects[0] else {
            panic!("Expected a settle, got {:?}", up.effects);
        };
        assert!((velocity.x - 2000.0).abs() < 1e-6, "{velocity:?}");
        assert_eq!(0.0, velocity.y);
    }

    #[test]
    fn fling_is_capped() {
        assert_eq!(
            Vec2::new(MAX_FLING_VELOCITY, -20.0),
            fling_velocity(Vec2::new(20000.0, -20.0))
        );
        assert_eq!(Vec2::ZERO, fling_velocity(Vec2::new(30.0, -40.0)));
    }

    #[test]
    fn two_pointers_rotate() {
        let mut translator = GestureTranslator::default();
        let mut transform = TransformState::default();
        touch(&mut translator, &mut transform, TouchEvent::down(0.0, (150.0, 150.0)));
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::new(
                TouchAction::PointerDown(1),
                pts(&[(150.0, 150.0), (250.0, 150.0)]),
                0.01,
            ),
        );
        assert!(matches!(
            translator.state(),
            GestureState::Rotating { .. }
        ));
        // Second pointer swings a quarter turn clockwise around the first
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::moved(0.02, pts(&[(150.0, 150.0), (150.0, 250.0)])),
        );
        // -270, which draws the same as 90
        assert!(
            (transform.rotation().rem_euclid(360.0) - 90.0).abs() < 1e-9,
            "{}",
            transform.rotation()
        );

        touch(
            &mut translator,
            &mut transform,
            TouchEvent::new(
                TouchAction::PointerUp(1),
                pts(&[(150.0, 150.0), (150.0, 250.0)]),
                0.03,
            ),
        );
        assert_eq!(GestureState::Idle, translator.state());
        // The remaining pointer doesn't drag
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::moved(0.04, pts(&[(190.0, 150.0)])),
        );
        assert_eq!(Vec2::ZERO, transform.translation);
        assert!((transform.rotation().rem_euclid(360.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn three_pointers_transform_then_rotate_without_jump() {
        let mut translator = GestureTranslator::default();
        let mut transform = TransformState::default();
        transform.set_rotation(10.0);
        let a = (150.0, 150.0);
        let b = (250.0, 150.0);
        let c = (150.0, 250.0);
        touch(&mut translator, &mut transform, TouchEvent::down(0.0, a));
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::new(TouchAction::PointerDown(1), pts(&[a, b]), 0.01),
        );
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::new(TouchAction::PointerDown(2), pts(&[a, b, c]), 0.02),
        );
        assert_eq!(TransformMode::Freeform, transform.mode());
        assert!(matches!(
            translator.state(),
            GestureState::Transforming { .. }
        ));

        // Spread everything to twice the size around a
        let (b2, c2) = ((350.0, 150.0), (150.0, 350.0));
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::moved(0.03, pts(&[a, b2, c2])),
        );
        let freeform = transform.freeform().unwrap();
        let expected = Affine::translate((150.0, 150.0))
            * Affine::scale(2.0)
            * Affine::translate((-150.0, -150.0));
        for (e, f) in expected.as_coeffs().iter().zip(freeform.as_coeffs()) {
            assert!((e - f).abs() < 1e-9, "{expected:?} vs {freeform:?}");
        }
        // Rotation is frozen while transforming
        assert_eq!(10.0, transform.rotation());

        let before = (transform.rotation(), transform.freeform());
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::new(TouchAction::PointerUp(2), pts(&[a, b2, c2]), 0.04),
        );
        assert_eq!(TransformMode::Rotation, transform.mode());
        assert_eq!(before, (transform.rotation(), transform.freeform()));

        // The same positions reported again change nothing
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::moved(0.05, pts(&[a, b2])),
        );
        assert!((transform.rotation() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn cancel_settles_and_releases() {
        let mut translator = GestureTranslator::default();
        let mut transform = TransformState::default();
        touch(&mut translator, &mut transform, TouchEvent::down(0.0, (150.0, 150.0)));
        touch(
            &mut translator,
            &mut transform,
            TouchEvent::moved(0.016, pts(&[(180.0, 150.0)])),
        );
        let cancel = touch(&mut translator, &mut transform, TouchEvent::cancel(0.02));
        assert_eq!(
            vec![
                GestureEffect::Settle {
                    velocity: Vec2::ZERO
                },
                GestureEffect::DisallowIntercept(false)
            ],
            cancel.effects
        );
        assert_eq!(GestureState::Idle, translator.state());
    }
}
