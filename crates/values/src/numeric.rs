//! Float helpers following the "NaN means undefined" convention.
//!
//! Layout arithmetic lets undefined values flow through unchanged; every
//! comparison against an undefined value is false.

/// The undefined float.
pub const UNDEFINED: f32 = f32::NAN;

/// Tolerance used when comparing layout floats.
const EPSILON: f32 = 0.0001;

/// Tolerance used when comparing scaled values during pixel rounding.
const DOUBLE_EPSILON: f64 = 0.0001;

#[inline]
pub const fn is_undefined(value: f32) -> bool {
    value.is_nan()
}

#[inline]
pub const fn is_defined(value: f32) -> bool {
    !value.is_nan()
}

/// Larger of two floats, preferring whichever is defined.
#[inline]
pub fn float_max(lhs: f32, rhs: f32) -> f32 {
    if is_defined(lhs) && is_defined(rhs) {
        lhs.max(rhs)
    } else if is_undefined(lhs) {
        rhs
    } else {
        lhs
    }
}

/// Smaller of two floats, preferring whichever is defined.
#[inline]
pub fn float_min(lhs: f32, rhs: f32) -> f32 {
    if is_defined(lhs) && is_defined(rhs) {
        lhs.min(rhs)
    } else if is_undefined(lhs) {
        rhs
    } else {
        lhs
    }
}

/// Approximate equality; two undefined values are equal.
#[inline]
pub fn floats_equal(lhs: f32, rhs: f32) -> bool {
    if is_defined(lhs) && is_defined(rhs) {
        (lhs - rhs).abs() < EPSILON
    } else {
        is_undefined(lhs) && is_undefined(rhs)
    }
}

#[inline]
fn doubles_equal(lhs: f64, rhs: f64) -> bool {
    if lhs.is_nan() || rhs.is_nan() {
        lhs.is_nan() && rhs.is_nan()
    } else {
        (lhs - rhs).abs() < DOUBLE_EPSILON
    }
}

/// Fractional part of `value * scale`, normalised into `[0, 1)`.
#[inline]
pub fn scaled_fraction(value: f64, scale: f64) -> f64 {
    let fraction = (value * scale) % 1.0;
    if fraction < 0.0 { fraction + 1.0 } else { fraction }
}

/// True when `value * scale` is not (approximately) a whole number.
#[inline]
pub fn has_fractional_part(value: f64, scale: f64) -> bool {
    let fraction = (value * scale) % 1.0;
    !doubles_equal(fraction, 0.0) && !doubles_equal(fraction, 1.0)
}

/// Snap `value` to the grid of `1 / point_scale_factor`.
///
/// Values already on the grid are kept. Otherwise `force_ceil` and
/// `force_floor` pick a direction, and plain rounding rounds half up.
pub fn round_value_to_pixel_grid(
    value: f64,
    point_scale_factor: f64,
    force_ceil: bool,
    force_floor: bool,
) -> f32 {
    let mut scaled = value * point_scale_factor;
    let fraction = scaled_fraction(value, point_scale_factor);
    if doubles_equal(fraction, 0.0) {
        scaled -= fraction;
    } else if doubles_equal(fraction, 1.0) {
        scaled = scaled - fraction + 1.0;
    } else if force_ceil {
        scaled = scaled - fraction + 1.0;
    } else if force_floor {
        scaled -= fraction;
    } else {
        let round_up = !fraction.is_nan() && (fraction > 0.5 || doubles_equal(fraction, 0.5));
        scaled = scaled - fraction + if round_up { 1.0 } else { 0.0 };
    }
    if scaled.is_nan() || point_scale_factor.is_nan() {
        UNDEFINED
    } else {
        (scaled / point_scale_factor) as f32
    }
}
