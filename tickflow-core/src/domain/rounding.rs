//! Fixed-decimal rounding applied after every derived accounting value.
//!
//! Position and portfolio figures are rounded to [`DECIMAL_PLACES`] after each
//! computation so that long runs do not accumulate binary floating-point drift.

/// Number of decimal places kept for derived values.
pub const DECIMAL_PLACES: i32 = 4;

/// Round to the engine's fixed precision.
pub fn round(value: f64) -> f64 {
    round_dp(value, DECIMAL_PLACES)
}

/// Round half away from zero to `places` decimal places.
pub fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round() / factor;
    // normalise -0.0 so serialized output stays stable
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
