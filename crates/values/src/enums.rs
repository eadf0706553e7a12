//! Keyword enums shared by styles and computed layouts.
//!
//! Each enum keeps the keyword set and the initial value of the matching
//! style property. `name` returns the CSS-like spelling used by the debug
//! printer.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Implements `Display` in terms of an inherent `name` method.
macro_rules! display_by_name {
    ($($kind:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $kind {
                fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                    formatter.write_str(self.name())
                }
            }
        )+
    };
}

/// `align-items`, `align-self` and `align-content` keywords.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Auto,
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
    Baseline,
    SpaceBetween,
    SpaceAround,
}

impl Align {
    /// CSS-like keyword spelling.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::FlexStart => "flex-start",
            Self::Center => "center",
            Self::FlexEnd => "flex-end",
            Self::Stretch => "stretch",
            Self::Baseline => "baseline",
            Self::SpaceBetween => "space-between",
            Self::SpaceAround => "space-around",
        }
    }
}

/// Physical dimension of a box.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Width,
    Height,
}

impl Dimension {
    /// Index into two-element dimension arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::Width => 0,
            Self::Height => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
        }
    }
}

/// Inline text direction.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Inherit,
    Ltr,
    Rtl,
}

impl Direction {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inherit => "inherit",
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

/// `display` keywords understood by the engine.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Display {
    #[default]
    Flex,
    None,
}

impl Display {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Flex => "flex",
            Self::None => "none",
        }
    }
}

/// Box edges, including the logical and shorthand pseudo-edges.
///
/// Only the first four are physical and appear in computed layouts.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
    Start,
    End,
    Horizontal,
    Vertical,
    All,
}

impl Edge {
    /// Number of edges addressable in a style.
    pub const COUNT: usize = 9;

    /// Every edge in index order.
    pub const ALL_EDGES: [Self; Self::COUNT] = [
        Self::Left,
        Self::Top,
        Self::Right,
        Self::Bottom,
        Self::Start,
        Self::End,
        Self::Horizontal,
        Self::Vertical,
        Self::All,
    ];

    /// Index into per-edge arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Top => 1,
            Self::Right => 2,
            Self::Bottom => 3,
            Self::Start => 4,
            Self::End => 5,
            Self::Horizontal => 6,
            Self::Vertical => 7,
            Self::All => 8,
        }
    }

    /// True for the four edges stored in computed layouts.
    pub const fn is_physical(self) -> bool {
        matches!(self, Self::Left | Self::Top | Self::Right | Self::Bottom)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Start => "start",
            Self::End => "end",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::All => "all",
        }
    }
}

/// Optional behaviours that deviate from the stable algorithm.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ExperimentalFeature {
    /// Recompute explicit flex bases on every layout generation.
    WebFlexBasis,
}

impl ExperimentalFeature {
    pub const COUNT: usize = 1;

    pub const fn index(self) -> usize {
        match self {
            Self::WebFlexBasis => 0,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::WebFlexBasis => "web-flex-basis",
        }
    }
}

/// `flex-direction` keywords; also used as an axis identifier.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FlexDirection {
    #[default]
    Column,
    ColumnReverse,
    Row,
    RowReverse,
}

impl FlexDirection {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::ColumnReverse => "column-reverse",
            Self::Row => "row",
            Self::RowReverse => "row-reverse",
        }
    }

    pub const fn is_row(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    pub const fn is_column(self) -> bool {
        matches!(self, Self::Column | Self::ColumnReverse)
    }

    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }

    /// Edge at which items start along this axis.
    pub const fn leading_edge(self) -> Edge {
        match self {
            Self::Column => Edge::Top,
            Self::ColumnReverse => Edge::Bottom,
            Self::Row => Edge::Left,
            Self::RowReverse => Edge::Right,
        }
    }

    /// Edge at which items end along this axis.
    pub const fn trailing_edge(self) -> Edge {
        match self {
            Self::Column => Edge::Bottom,
            Self::ColumnReverse => Edge::Top,
            Self::Row => Edge::Right,
            Self::RowReverse => Edge::Left,
        }
    }

    /// Dimension measured along this axis.
    pub const fn dimension(self) -> Dimension {
        if self.is_row() {
            Dimension::Width
        } else {
            Dimension::Height
        }
    }

    /// Flips row axes under right-to-left text.
    pub const fn resolve(self, direction: Direction) -> Self {
        match (self, direction) {
            (Self::Row, Direction::Rtl) => Self::RowReverse,
            (Self::RowReverse, Direction::Rtl) => Self::Row,
            (axis, _) => axis,
        }
    }

    /// Cross axis for a resolved main axis.
    pub const fn cross(self, direction: Direction) -> Self {
        if self.is_column() {
            Self::Row.resolve(direction)
        } else {
            Self::Column
        }
    }
}

/// Gap gutters.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Gutter {
    Column,
    Row,
    All,
}

impl Gutter {
    pub const COUNT: usize = 3;

    pub const fn index(self) -> usize {
        match self {
            Self::Column => 0,
            Self::Row => 1,
            Self::All => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Column => "column-gap",
            Self::Row => "row-gap",
            Self::All => "gap",
        }
    }
}

/// `justify-content` keywords.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Justify {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

impl Justify {
    pub const fn name(self) -> &'static str {
        match self {
            Self::FlexStart => "flex-start",
            Self::Center => "center",
            Self::FlexEnd => "flex-end",
            Self::SpaceBetween => "space-between",
            Self::SpaceAround => "space-around",
            Self::SpaceEvenly => "space-evenly",
        }
    }
}

/// Severity of messages sent to a configured logger.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Verbose,
    Fatal,
}

impl LogLevel {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Verbose => "verbose",
            Self::Fatal => "fatal",
        }
    }
}

/// How an available size constrains a measurement.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum MeasureMode {
    /// No constraint; the size argument is undefined.
    #[default]
    Undefined,
    /// The result must equal the given size.
    Exactly,
    /// The given size is an upper bound.
    AtMost,
}

impl MeasureMode {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Exactly => "exactly",
            Self::AtMost => "at-most",
        }
    }
}

/// Whether a node is a plain box or sizes its own content.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    #[default]
    Default,
    Text,
}

impl NodeType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Text => "text",
        }
    }
}

/// `overflow` keywords.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
}

impl Overflow {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Scroll => "scroll",
        }
    }
}

/// `position` keywords.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

impl PositionType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Relative => "relative",
            Self::Absolute => "absolute",
        }
    }
}

/// Units carried by a style value.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    Undefined,
    Point,
    Percent,
    Auto,
}

impl Unit {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Point => "point",
            Self::Percent => "percent",
            Self::Auto => "auto",
        }
    }
}

/// `flex-wrap` keywords.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Wrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

impl Wrap {
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoWrap => "no-wrap",
            Self::Wrap => "wrap",
            Self::WrapReverse => "wrap-reverse",
        }
    }
}

display_by_name!(
    Align,
    Dimension,
    Direction,
    Display,
    Edge,
    ExperimentalFeature,
    FlexDirection,
    Gutter,
    Justify,
    LogLevel,
    MeasureMode,
    NodeType,
    Overflow,
    PositionType,
    Unit,
    Wrap,
);
