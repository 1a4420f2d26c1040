use kurbo::{Affine, BezPath, Circle, Point, Rect, RoundedRect, RoundedRectRadii, Shape, Vec2};

/// Flattening tolerance used when turning curved shapes into paths, in px
pub const TOLERANCE: f64 = 0.1;

/// Below this a three point affine is considered degenerate
pub(crate) const MIN_DETERMINANT: f64 = 1e-6;

/// Rotate by `degrees`, clockwise on a y-down surface, about `center`
pub fn rotate_about(degrees: f64, center: Point) -> Affine {
    let center = center.to_vec2();
    Affine::translate(center) * Affine::rotate(degrees.to_radians()) * Affine::translate(-center)
}

/// A rounded rect whose radii never exceed half its shorter side, as a platform canvas would draw it
pub fn clamped_round_rect(rect: Rect, radii: RoundedRectRadii) -> RoundedRect {
    let limit = 0.5 * rect.width().abs().min(rect.height().abs());
    let clamp = |r: f64| r.max(0.0).min(limit);
    RoundedRect::from_rect(
        rect,
        RoundedRectRadii::new(
            clamp(radii.top_left),
            clamp(radii.top_right),
            clamp(radii.bottom_right),
            clamp(radii.bottom_left),
        ),
    )
}

/// A circle wound opposite to kurbo's default.
///
/// Appended to a path filled non-zero it punches a hole through anything wound the default
/// way, which is all the subtraction we need.
pub fn hole(center: Point, radius: f64) -> BezPath {
    let mut path = Circle::new(center, radius).to_path(TOLERANCE);
    // A reflection reverses winding
    let c = center.to_vec2();
    path.apply_affine(
        Affine::translate(c) * Affine::scale_non_uniform(1.0, -1.0) * Affine::translate(-c),
    );
    path
}

/// The affine that takes the unit triangle (0,0), (1,0), (0,1) onto `points`.
///
/// Mapping one triangle of touch points onto another is `to * from.inverse()`. None when the
/// points are (nearly) collinear and no such mapping is invertible.
pub fn triangle_affine(points: [Point; 3]) -> Option<Affine> {
    let [p0, p1, p2] = points;
    let u: Vec2 = p1 - p0;
    let v: Vec2 = p2 - p0;
    let affine = Affine::new([u.x, u.y, v.x, v.y, p0.x, p0.y]);
    (affine.determinant().abs() >= MIN_DETERMINANT).then_some(affine)
}
