//! Style values: undefined, auto, points or percent.

use crate::enums::Unit;
use crate::float_optional::FloatOptional;
use crate::numeric::{UNDEFINED, is_undefined};
use core::fmt;
use serde::{Deserialize, Serialize};

/// A style length.
///
/// Points and percents carry a number; `Auto` and `Undefined` ignore it.
/// Building a point or percent value from NaN produces [`Value::UNDEFINED`].
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Value {
    pub value: f32,
    pub unit: Unit,
}

impl Value {
    pub const UNDEFINED: Self = Self {
        value: UNDEFINED,
        unit: Unit::Undefined,
    };

    pub const AUTO: Self = Self {
        value: UNDEFINED,
        unit: Unit::Auto,
    };

    pub const ZERO: Self = Self {
        value: 0.0,
        unit: Unit::Point,
    };

    #[inline]
    pub const fn points(value: f32) -> Self {
        if is_undefined(value) {
            Self::UNDEFINED
        } else {
            Self {
                value,
                unit: Unit::Point,
            }
        }
    }

    #[inline]
    pub const fn percent(value: f32) -> Self {
        if is_undefined(value) {
            Self::UNDEFINED
        } else {
            Self {
                value,
                unit: Unit::Percent,
            }
        }
    }

    #[inline]
    pub const fn is_undefined(self) -> bool {
        matches!(self.unit, Unit::Undefined)
    }

    #[inline]
    pub const fn is_auto(self) -> bool {
        matches!(self.unit, Unit::Auto)
    }

    /// Resolve against `reference`, the size percentages are relative to.
    ///
    /// Percentages of an undefined reference stay undefined.
    #[inline]
    pub fn resolve(self, reference: f32) -> FloatOptional {
        match self.unit {
            Unit::Point => FloatOptional::new(self.value),
            Unit::Percent => FloatOptional::new(self.value * reference * 0.01),
            Unit::Auto | Unit::Undefined => FloatOptional::UNDEFINED,
        }
    }

    /// Like [`Value::resolve`] but `auto` margins count as zero.
    #[inline]
    pub fn resolve_margin(self, reference: f32) -> FloatOptional {
        if self.is_auto() {
            FloatOptional::new(0.0)
        } else {
            self.resolve(reference)
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl PartialEq for Value {
    #[allow(clippy::float_cmp, reason = "Style equality is exact, not approximate")]
    fn eq(&self, other: &Self) -> bool {
        if self.unit != other.unit {
            return false;
        }
        match self.unit {
            Unit::Undefined | Unit::Auto => true,
            Unit::Point | Unit::Percent => {
                self.value == other.value || (is_undefined(self.value) && is_undefined(other.value))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::Undefined => formatter.write_str("undefined"),
            Unit::Auto => formatter.write_str("auto"),
            Unit::Point => write!(formatter, "{}px", self.value),
            Unit::Percent => write!(formatter, "{}%", self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// # Panics
    /// Panics if percentages do not resolve against the reference size.
    fn percent_resolves_against_reference() {
        assert_eq!(Value::percent(50.0).resolve(200.0), 100.0);
        assert!(Value::percent(50.0).resolve(UNDEFINED).is_undefined());
        assert_eq!(Value::points(12.0).resolve(UNDEFINED), 12.0);
        assert!(Value::AUTO.resolve(100.0).is_undefined());
    }

    #[test]
    /// # Panics
    /// Panics if auto margins do not resolve to zero.
    fn auto_margin_resolves_to_zero() {
        assert_eq!(Value::AUTO.resolve_margin(100.0), 0.0);
        assert!(Value::UNDEFINED.resolve_margin(100.0).is_undefined());
    }

    #[test]
    /// # Panics
    /// Panics if NaN inputs are not normalised to undefined.
    fn nan_builds_undefined() {
        assert_eq!(Value::points(f32::NAN), Value::UNDEFINED);
        assert_eq!(Value::percent(f32::NAN), Value::UNDEFINED);
    }

    #[test]
    /// # Panics
    /// Panics if structural equality ignores units or numbers.
    fn equality_is_structural() {
        assert_eq!(Value::AUTO, Value::AUTO);
        assert_ne!(Value::points(10.0), Value::percent(10.0));
        assert_ne!(Value::points(10.0), Value::points(11.0));
        assert_eq!(Value::UNDEFINED, Value::default());
    }

    #[test]
    /// # Panics
    /// Panics if display formatting changes.
    fn display_shows_units() {
        assert_eq!(Value::points(4.0).to_string(), "4px");
        assert_eq!(Value::percent(25.0).to_string(), "25%");
        assert_eq!(Value::AUTO.to_string(), "auto");
    }
}
