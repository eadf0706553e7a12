//! Value and unit model for the Sprig layout engine.
//!
//! Styles store [`Value`]s (undefined, auto, points, percent); the layout
//! algorithm works on raw `f32`s where NaN stands for "undefined" and
//! resolves values into [`FloatOptional`]s.

mod enums;
mod float_optional;
pub mod numeric;
mod value;

pub use enums::{
    Align, Dimension, Direction, Display, Edge, ExperimentalFeature, FlexDirection, Gutter,
    Justify, LogLevel, MeasureMode, NodeType, Overflow, PositionType, Unit, Wrap,
};
pub use float_optional::FloatOptional;
pub use numeric::{UNDEFINED, float_max, float_min, floats_equal, is_defined, is_undefined};
pub use value::Value;

/// A measured width/height pair.
#[derive(Copy, Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}
