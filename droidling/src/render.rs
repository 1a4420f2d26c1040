//! Draws the figure
//!
//! Every dimension is a multiple of the width unit `u`. The figure occupies `u` by `1.3u`,
//! centered in the padded area, before transforms apply.

use kurbo::{Affine, Arc, BezPath, Insets, Point, Rect, RoundedRectRadii, Shape, Size, Vec2};

use crate::{
    bezop::{clamped_round_rect, hole, rotate_about, TOLERANCE},
    config::Color,
    transform::{drawing_size, BoundsPolicy, TransformState},
};

const HEIGHT_UNITS: f64 = 1.3;
const HAND_OFFSET: f64 = 0.42;
const LEG_OFFSET: f64 = 0.75;
const LIMB_WIDTH: f64 = 0.16;
const LIMB_LENGTH: f64 = 0.55;
const LIMB_RADIUS: f64 = 0.2;
const ANTENNA_DEGREES: f64 = 40.0;

/// One frame's worth of drawing
#[derive(Debug, Clone)]
pub struct Figure {
    /// Fill non-zero
    pub path: BezPath,
    pub fill: Color,
    /// Bounds of the transformed path; the hit box
    pub bounds: Rect,
}

impl Figure {
    /// Whether `point` lands on paint, as opposed to merely inside [`Figure::bounds`]
    pub fn paints(&self, point: Point) -> bool {
        self.path.winding(point) != 0
    }

    /// A standalone svg of a `size` canvas holding the figure
    pub fn to_svg(&self, size: Size) -> String {
        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg viewBox=\"0 0 {:.2} {:.2}\" version=\"1.1\" xmlns=\"http://www.w3.org/2000/svg\">\n",
            size.width, size.height
        ));
        svg.push_str(&format!(
            "  <path fill=\"{}\" fill-rule=\"nonzero\" d=\"{}\" />\n",
            self.fill,
            self.path.to_svg()
        ));
        svg.push_str("</svg>\n");
        svg
    }
}

/// Top-left of the untransformed figure
pub fn figure_origin(size: Size, padding: Insets, unit: f64) -> Point {
    let drawing = drawing_size(size, padding);
    Point::new(
        (drawing.width - unit) / 2.0 + padding.x0,
        (drawing.height - unit * HEIGHT_UNITS) / 2.0 + padding.y0,
    )
}

/// Rotation from two finger gestures turns the figure about this point
pub fn rotation_pivot(size: Size, padding: Insets, unit: f64) -> Point {
    figure_origin(size, padding, unit) + Vec2::new(unit / 2.0, unit / 2.0)
}

fn limb(at: Point, unit: f64) -> BezPath {
    let rect = Rect::from_origin_size(at, (unit * LIMB_WIDTH, unit * LIMB_LENGTH));
    clamped_round_rect(rect, RoundedRectRadii::from_single_radius(unit * LIMB_RADIUS))
        .to_path(TOLERANCE)
}

/// A dome with antennae and two eyes punched out
fn head(at: Point, unit: f64) -> BezPath {
    let local = |x: f64, y: f64| at + Vec2::new(unit * x, unit * y);
    let mut path = BezPath::new();

    let dome = Arc {
        center: local(0.32, 0.35),
        radii: Vec2::new(unit * 0.32, unit * 0.35),
        start_angle: std::f64::consts::PI,
        sweep_angle: std::f64::consts::PI,
        x_rotation: 0.0,
    };
    path.extend(dome.path_elements(TOLERANCE));
    path.close_path();

    let antenna = clamped_round_rect(
        Rect::from_points(local(0.29, -0.13), local(0.35, 0.1)),
        RoundedRectRadii::from_single_radius(unit * LIMB_RADIUS),
    );
    let antenna_pivot = local(0.32, 0.25);
    for degrees in [-ANTENNA_DEGREES, ANTENNA_DEGREES] {
        let tilt = rotate_about(degrees, antenna_pivot);
        path.extend(antenna.path_elements(TOLERANCE).map(|el| tilt * el));
    }

    for eye in [local(0.2, 0.17), local(0.42, 0.17)] {
        path.extend(hole(eye, unit * 0.02).path_elements(TOLERANCE));
    }
    path
}

/// Square shoulders, rounded bottom
fn body(at: Point, unit: f64) -> BezPath {
    let rect = Rect::new(at.x + unit * 0.18, at.y, at.x + unit * 0.82, at.y + unit * 0.6);
    clamped_round_rect(
        rect,
        RoundedRectRadii::new(0.0, 0.0, unit * 0.1, unit * 0.1),
    )
    .to_path(TOLERANCE)
}

/// The untransformed figure with its right arm at `limb_degrees`, back to front
pub fn figure_path(origin: Point, unit: f64, limb_degrees: f64) -> BezPath {
    let (left, top) = (origin.x, origin.y);
    let hands = top + unit * HAND_OFFSET;
    let legs = top + unit * LEG_OFFSET;

    let mut path = BezPath::new();
    let shoulder = Point::new(left + unit * 0.925, hands + unit * 0.075);
    let mut right_hand = limb(Point::new(left + unit * 0.84, hands), unit);
    right_hand.apply_affine(rotate_about(limb_degrees, shoulder));

    let parts = [
        right_hand,
        head(Point::new(left + unit * 0.18, top + unit * 0.05), unit),
        limb(Point::new(left, hands), unit),
        limb(Point::new(left + unit * 0.28, legs), unit),
        limb(Point::new(left + unit * 0.56, legs), unit),
        body(Point::new(left, hands), unit),
    ];
    for part in parts {
        path.extend(part.path_elements(TOLERANCE));
    }
    path
}

/// The whole transform applied to [`figure_path`]
pub fn figure_transform(policy: &BoundsPolicy, transform: &TransformState) -> Affine {
    let pivot = rotation_pivot(policy.size, policy.padding, policy.width_unit);
    transform.matrix(policy.bounds(), pivot)
}

pub fn draw(
    policy: &BoundsPolicy,
    transform: &TransformState,
    limb_degrees: f64,
    fill: Color,
) -> Figure {
    let unit = policy.width_unit;
    let origin = figure_origin(policy.size, policy.padding, unit);
    let mut path = figure_path(origin, unit, limb_degrees);
    // Bounds must come after the transform so hit testing follows rotation and scale
    path.apply_affine(figure_transform(policy, transform));
    let bounds = path.bounding_box();
    Figure { path, fill, bounds }
}
