//! The widget: owns transform and animation state and answers the host's calls
//!
//! The host drives everything. It attaches and detaches the widget, measures and lays it
//! out, forwards touch events and frame ticks, and draws whatever [`Droid::draw`] returns.
//! Requests going the other way (redraw, relayout, click, keep the touch sequence) go
//! through [`Host`].

use kurbo::{Insets, Rect, Size};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    config::{Color, DroidConfig, MeasureSpec},
    gesture::{GestureEffect, GestureTranslator},
    limb::{LimbAnimator, StartDelay, REST_DEGREES},
    render::{self, Figure},
    settle::SpringSettler,
    state::SavedState,
    touch::TouchEvent,
    transform::{BoundsPolicy, TransformState},
};

const DESIRED_WIDTH_UNITS: f64 = 1.8;
const DESIRED_HEIGHT_UNITS: f64 = 1.3;

/// Callbacks into whatever hosts the widget
pub trait Host {
    /// Draw again on the next frame
    fn invalidate(&mut self);
    /// Measure and lay out again
    fn request_layout(&mut self);
    /// Ask ancestors not to intercept the current touch sequence, or stop asking
    fn request_disallow_intercept(&mut self, disallow: bool);
    fn perform_click(&mut self);
}

/// A [`Host`] that only counts, for headless runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingHost {
    pub invalidations: usize,
    pub layout_requests: usize,
    pub clicks: usize,
    pub disallow_intercept: bool,
}

impl Host for RecordingHost {
    fn invalidate(&mut self) {
        self.invalidations += 1;
    }

    fn request_layout(&mut self) {
        self.layout_requests += 1;
    }

    fn request_disallow_intercept(&mut self, disallow: bool) {
        self.disallow_intercept = disallow;
    }

    fn perform_click(&mut self) {
        self.clicks += 1;
    }
}

/// What a property change requires of the host
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// Unchanged
    None,
    Redraw,
    /// Measure, lay out and redraw
    Relayout,
}

impl Invalidation {
    /// Pass the request on to `host`
    pub fn notify(self, host: &mut dyn Host) -> Self {
        match self {
            Invalidation::None => (),
            Invalidation::Redraw => host.invalidate(),
            Invalidation::Relayout => {
                host.request_layout();
                host.invalidate();
            }
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct Droid {
    config: DroidConfig,
    size: Size,
    padding: Insets,
    transform: TransformState,
    limb: Option<LimbAnimator>,
    limb_angle: f64,
    settler: SpringSettler,
    gestures: GestureTranslator,
    hit_box: Rect,
}

impl Default for Droid {
    fn default() -> Self {
        Self::new(DroidConfig::default())
    }
}

impl Droid {
    pub fn new(config: DroidConfig) -> Self {
        Self {
            config,
            size: Size::ZERO,
            padding: Insets::ZERO,
            transform: TransformState::default(),
            limb: None,
            limb_angle: REST_DEGREES,
            settler: SpringSettler::default(),
            gestures: GestureTranslator::default(),
            hit_box: Rect::ZERO,
        }
    }

    pub fn config(&self) -> &DroidConfig {
        &self.config
    }

    pub fn width_unit(&self) -> f64 {
        self.config.width_unit
    }

    pub fn set_width_unit(&mut self, width_unit: f64, host: &mut dyn Host) -> Invalidation {
        if width_unit == self.config.width_unit {
            return Invalidation::None;
        }
        self.config.width_unit = width_unit;
        Invalidation::Relayout.notify(host)
    }

    pub fn limit_to_bounds(&self) -> bool {
        self.config.limit_to_bounds
    }

    pub fn set_limit_to_bounds(&mut self, limit: bool, host: &mut dyn Host) -> Invalidation {
        if limit == self.config.limit_to_bounds {
            return Invalidation::None;
        }
        self.config.limit_to_bounds = limit;
        Invalidation::Redraw.notify(host)
    }

    pub fn color(&self) -> Color {
        self.config.color
    }

    pub fn set_color(&mut self, color: Color, host: &mut dyn Host) -> Invalidation {
        if color == self.config.color {
            return Invalidation::None;
        }
        self.config.color = color;
        Invalidation::Redraw.notify(host)
    }

    /// Starts the limb animation, after `delay`, with the arm at rest
    pub fn attach(&mut self, delay: StartDelay) {
        if let Some(limb) = self.limb.as_mut() {
            limb.cancel();
        }
        debug!("Attached, limb starts after {:?}", delay.duration());
        self.limb = Some(LimbAnimator::new(delay));
        self.limb_angle = REST_DEGREES;
    }

    /// Stops every animation and forgets any touch sequence in progress
    pub fn detach(&mut self) {
        if let Some(mut limb) = self.limb.take() {
            limb.cancel();
        }
        self.settler.cancel();
        self.gestures.reset(&mut self.transform);
        debug!("Detached");
    }

    pub fn is_attached(&self) -> bool {
        self.limb.is_some()
    }

    /// `1.8u` by `1.3u`, whole pixels
    pub fn suggested_minimum_size(&self) -> Size {
        let unit = self.config.width_unit;
        Size::new(
            (unit * DESIRED_WIDTH_UNITS).trunc(),
            (unit * DESIRED_HEIGHT_UNITS).trunc(),
        )
    }

    /// The suggested minimum plus padding, then whatever the parent allows
    pub fn measure(&self, width: MeasureSpec, height: MeasureSpec, padding: Insets) -> Size {
        let minimum = self.suggested_minimum_size();
        Size::new(
            width.resolve(minimum.width + padding.x0 + padding.x1),
            height.resolve(minimum.height + padding.y0 + padding.y1),
        )
    }

    pub fn layout(&mut self, size: Size, padding: Insets) {
        if size != self.size || padding != self.padding {
            debug!("Layout {size:?} padded {padding:?}");
        }
        self.size = size;
        self.padding = padding;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds_policy(&self) -> BoundsPolicy {
        BoundsPolicy {
            limit_enabled: self.config.limit_to_bounds,
            width_unit: self.config.width_unit,
            size: self.size,
            padding: self.padding,
        }
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn limb_angle(&self) -> f64 {
        self.limb_angle
    }

    pub fn is_settling(&self) -> bool {
        self.settler.is_running()
    }

    /// Bounds of the figure as last drawn; empty before the first draw
    pub fn hit_box(&self) -> Rect {
        self.hit_box
    }

    /// Returns whether the sequence this event belongs to is ours
    pub fn on_touch(&mut self, event: &TouchEvent, host: &mut dyn Host) -> bool {
        let response = self
            .gestures
            .on_touch(event, self.hit_box, &mut self.transform);
        for effect in response.effects {
            match effect {
                GestureEffect::DisallowIntercept(disallow) => {
                    host.request_disallow_intercept(disallow)
                }
                GestureEffect::CancelSettle => self.settler.cancel(),
                GestureEffect::Settle { velocity } => {
                    let bounds = self.bounds_policy().bounds();
                    let start = bounds.clamp(self.transform.translation);
                    if self.settler.start(start, velocity, bounds) {
                        host.invalidate();
                    }
                }
                GestureEffect::Click => {
                    info!("Click");
                    host.perform_click();
                }
                GestureEffect::Redraw => host.invalidate(),
            }
        }
        response.handled
    }

    /// Advance animations to `time`, seconds. Returns whether anything moved.
    pub fn on_frame(&mut self, time: f64, host: &mut dyn Host) -> bool {
        let mut changed = false;
        if let Some(angle) = self.limb.as_mut().and_then(|limb| limb.tick(time)) {
            changed |= angle != self.limb_angle;
            self.limb_angle = angle;
        }
        let settle = self.settler.tick(time);
        if !settle.is_empty() {
            settle.apply(&mut self.transform.translation);
            changed = true;
        }
        if changed {
            host.invalidate();
        }
        changed
    }

    /// Build this frame's figure; also refreshes the hit box
    pub fn draw(&mut self) -> Figure {
        let figure = render::draw(
            &self.bounds_policy(),
            &self.transform,
            self.limb_angle,
            self.config.color,
        );
        self.hit_box = figure.bounds;
        figure
    }

    /// `parent` is the host's own state, returned by [`Droid::restore_state`]
    pub fn save_state(&self, parent: Option<Value>) -> Value {
        SavedState {
            rotation: self.transform.rotation(),
            parent,
        }
        .to_json()
    }

    /// Applies a saved rotation, returning the host's own state. Unrecognized input is ignored.
    pub fn restore_state(&mut self, state: &Value) -> Option<Value> {
        let saved = SavedState::from_json(state)?;
        if !self.transform.set_rotation(saved.rotation) {
            debug!("Not restoring rotation during a freeform gesture");
        }
        saved.parent
    }
}
