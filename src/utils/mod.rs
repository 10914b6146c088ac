//! Shared constants and numeric helpers

pub mod constants;

/// Clip `value` into `[lower, upper]`
///
/// NaN passes through unchanged and inverted bounds never panic, unlike
/// `f64::clamp`. Infinite values are clipped like any other.
#[inline]
pub fn clip(value: f64, lower: f64, upper: f64) -> f64 {
    if value < lower {
        lower
    } else if value > upper {
        upper
    } else {
        value
    }
}
