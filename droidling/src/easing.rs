//! Timing curves

/// Symmetric ease-in-out over an arbitrary power.
///
/// 2 is quadratic, 5 is close to a step. `fraction` is expected in [0, 1]; the
/// result is in [0, 1] and `ease_in_out_pow(1 - f, n) == 1 - ease_in_out_pow(f, n)`.
pub fn ease_in_out_pow(fraction: f64, exponent: i32) -> f64 {
    let t = fraction * 2.0;
    if t < 1.0 {
        0.5 * t.powi(exponent)
    } else {
        1.0 - 0.5 * (2.0 - t).powi(exponent).abs()
    }
}
