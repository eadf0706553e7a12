//! Sprig flexbox layout engine.
//!
//! A [`LayoutTree`] owns every node. Callers build a tree with the child
//! operations, set styles, run [`LayoutTree::calculate_layout`] on a root
//! and read positions back relative to each node's parent.
//!
//! ```
//! use sprig_layout::{Direction, LayoutTree, Value};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut tree = LayoutTree::new();
//! let root = tree.new_node();
//! let child = tree.new_node();
//! tree.set_width(root, Value::points(100.0))?;
//! tree.set_height(root, Value::points(100.0))?;
//! tree.set_flex_grow(child, 1.0)?;
//! tree.insert_child(root, child, 0)?;
//! tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;
//! assert_eq!(tree.layout_height(child)?, 100.0);
//! # Ok(())
//! # }
//! ```

mod algorithm;
mod config;
mod event;
mod layout;
mod node;
pub mod print;
mod style;
mod tree;

pub use config::{CloneNodeFunc, Config, LoggerFunc};
pub use event::{LayoutEvent, LayoutListener, LayoutPassReason, LayoutStats, LayoutType};
pub use layout::{CachedMeasurement, ComputedLayout, LayoutResults, MAX_CACHED_MEASUREMENTS};
pub use node::{
    BaselineFunc, BaselineInput, DirtiedFunc, MeasureFunc, MeasureInput, Node, PrintFunc,
};
pub use print::PrintOptions;
pub use sprig_values::{
    Align, Dimension, Direction, Display, Edge, ExperimentalFeature, FlexDirection, FloatOptional,
    Gutter, Justify, LogLevel, MeasureMode, NodeType, Overflow, PositionType, Size, Unit, Value,
    Wrap,
};
pub use style::Style;
pub use tree::{LayoutTree, NodeId};
