//! Optional float with NaN as the "absent" marker.

use crate::numeric::{UNDEFINED, is_undefined};
use core::ops::Add;
use serde::{Deserialize, Serialize};

/// An `f32` that may be undefined.
///
/// Stored inline as a single float. Arithmetic with an undefined operand
/// yields undefined; [`FloatOptional::max`] prefers the defined operand.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct FloatOptional(f32);

impl FloatOptional {
    pub const UNDEFINED: Self = Self(UNDEFINED);

    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn is_undefined(self) -> bool {
        is_undefined(self.0)
    }

    #[inline]
    pub const fn is_defined(self) -> bool {
        !is_undefined(self.0)
    }

    /// Raw float, NaN when undefined.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    #[inline]
    pub const fn value_or(self, fallback: f32) -> f32 {
        if self.is_undefined() { fallback } else { self.0 }
    }

    /// Larger of the two, preferring whichever is defined.
    #[inline]
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        match (self.is_defined(), other.is_defined()) {
            (true, true) => Self(self.0.max(other.0)),
            (true, false) => self,
            _ => other,
        }
    }

    #[inline]
    pub fn to_option(self) -> Option<f32> {
        self.is_defined().then_some(self.0)
    }
}

impl Default for FloatOptional {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl From<f32> for FloatOptional {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

impl From<Option<f32>> for FloatOptional {
    fn from(value: Option<f32>) -> Self {
        Self(value.unwrap_or(UNDEFINED))
    }
}

impl Add for FloatOptional {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        if self.is_undefined() || rhs.is_undefined() {
            Self::UNDEFINED
        } else {
            Self(self.0 + rhs.0)
        }
    }
}

impl PartialEq for FloatOptional {
    #[allow(clippy::float_cmp, reason = "Style equality is exact, not approximate")]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 || (self.is_undefined() && other.is_undefined())
    }
}

impl PartialEq<f32> for FloatOptional {
    #[allow(clippy::float_cmp, reason = "Style equality is exact, not approximate")]
    fn eq(&self, other: &f32) -> bool {
        self.0 == *other || (self.is_undefined() && is_undefined(*other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// # Panics
    /// Panics if undefined does not absorb addition.
    fn undefined_absorbs_addition() {
        let sum = FloatOptional::new(2.0) + FloatOptional::UNDEFINED;
        assert!(sum.is_undefined());
        assert_eq!(FloatOptional::new(2.0) + FloatOptional::new(3.0), 5.0);
    }

    #[test]
    /// # Panics
    /// Panics if `max` picks an undefined operand over a defined one.
    fn max_prefers_defined() {
        assert_eq!(FloatOptional::UNDEFINED.max(FloatOptional::new(1.0)), 1.0);
        assert_eq!(FloatOptional::new(4.0).max(FloatOptional::new(1.0)), 4.0);
        assert!(FloatOptional::UNDEFINED.max(FloatOptional::UNDEFINED).is_undefined());
    }

    #[test]
    /// # Panics
    /// Panics if the option conversion loses definedness.
    fn option_round_trip() {
        assert_eq!(FloatOptional::from(Some(3.5)).to_option(), Some(3.5));
        assert_eq!(FloatOptional::from(None).to_option(), None);
        assert!((FloatOptional::UNDEFINED.value_or(7.0) - 7.0).abs() < f32::EPSILON);
    }
}
