//! Mathematical structs and functions.

use cgmath::Point2;

/// A 2D point
pub type Point2d = Point2<f64>;

/// Returns `count` evenly spaced values over the closed interval `[start, end]`.
pub fn linspace(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |i| start + step * i as f64)
}

/// Returns the multiples of `step` in `[0, end)`.
/// Empty unless `end` is finite and `step` is positive.
pub fn arange(end: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = if end.is_finite() && step > 0.0 {
        (end / step).ceil().max(0.0) as usize
    } else {
        0
    };
    (0..count)
        .map(move |i| step * i as f64)
        .filter(move |x| *x < end)
}
