//! Computed layout of a node plus its measurement cache.

use serde::{Deserialize, Serialize};
use sprig_values::{Dimension, Direction, Edge, FloatOptional, MeasureMode, UNDEFINED};

/// Number of measure-only results remembered per node.
pub const MAX_CACHED_MEASUREMENTS: usize = 8;

/// Constraints a node was laid out under and the size that came out.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedMeasurement {
    pub available_width: f32,
    pub available_height: f32,
    pub width_measure_mode: MeasureMode,
    pub height_measure_mode: MeasureMode,
    pub computed_width: f32,
    pub computed_height: f32,
}

impl Default for CachedMeasurement {
    fn default() -> Self {
        Self {
            available_width: -1.0,
            available_height: -1.0,
            width_measure_mode: MeasureMode::Undefined,
            height_measure_mode: MeasureMode::Undefined,
            computed_width: -1.0,
            computed_height: -1.0,
        }
    }
}

/// Output of the layout algorithm for one node.
///
/// Physical arrays are indexed by [`Edge::index`] (`Left`, `Top`, `Right`,
/// `Bottom`) and [`Dimension::index`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayoutResults {
    pub position: [f32; 4],
    /// Final size after pixel rounding.
    pub dimensions: [f32; 2],
    /// Size produced by the last layout or measurement.
    pub measured_dimensions: [f32; 2],
    pub margin: [f32; 4],
    pub border: [f32; 4],
    pub padding: [f32; 4],
    pub direction: Direction,
    pub had_overflow: bool,
    pub computed_flex_basis: FloatOptional,
    pub computed_flex_basis_generation: u32,
    /// Pass in which this node was last visited.
    pub generation_count: u32,
    /// Direction the owner passed on the last visit, `None` before the first.
    pub last_owner_direction: Option<Direction>,
    /// Flex line the node was placed on inside its parent.
    pub line_index: usize,
    pub next_cached_measurements_index: usize,
    pub cached_measurements: [CachedMeasurement; MAX_CACHED_MEASUREMENTS],
    /// Last full layout, `None` until one has been recorded.
    pub cached_layout: Option<CachedMeasurement>,
}

impl Default for LayoutResults {
    fn default() -> Self {
        Self {
            position: [0.0; 4],
            dimensions: [UNDEFINED; 2],
            measured_dimensions: [UNDEFINED; 2],
            margin: [0.0; 4],
            border: [0.0; 4],
            padding: [0.0; 4],
            direction: Direction::Inherit,
            had_overflow: false,
            computed_flex_basis: FloatOptional::UNDEFINED,
            computed_flex_basis_generation: 0,
            generation_count: 0,
            last_owner_direction: None,
            line_index: 0,
            next_cached_measurements_index: 0,
            cached_measurements: [CachedMeasurement::default(); MAX_CACHED_MEASUREMENTS],
            cached_layout: None,
        }
    }
}

impl LayoutResults {
    #[inline]
    pub fn position(&self, edge: Edge) -> f32 {
        self.position[edge.index()]
    }

    #[inline]
    pub fn set_position(&mut self, edge: Edge, value: f32) {
        self.position[edge.index()] = value;
    }

    #[inline]
    pub fn measured(&self, dimension: Dimension) -> f32 {
        self.measured_dimensions[dimension.index()]
    }

    #[inline]
    pub fn set_measured(&mut self, dimension: Dimension, value: f32) {
        self.measured_dimensions[dimension.index()] = value;
    }

    #[inline]
    pub fn dimension(&self, dimension: Dimension) -> f32 {
        self.dimensions[dimension.index()]
    }

    #[inline]
    pub fn set_dimension(&mut self, dimension: Dimension, value: f32) {
        self.dimensions[dimension.index()] = value;
    }

    /// Forget cached layouts; the next visit recomputes from scratch.
    pub fn invalidate_cache(&mut self) {
        self.next_cached_measurements_index = 0;
        self.cached_layout = None;
    }
}

/// Read-only snapshot of a node's final geometry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputedLayout {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
    pub direction: Direction,
    pub had_overflow: bool,
}

impl From<&LayoutResults> for ComputedLayout {
    fn from(layout: &LayoutResults) -> Self {
        Self {
            left: layout.position(Edge::Left),
            top: layout.position(Edge::Top),
            right: layout.position(Edge::Right),
            bottom: layout.position(Edge::Bottom),
            width: layout.dimension(Dimension::Width),
            height: layout.dimension(Dimension::Height),
            direction: layout.direction,
            had_overflow: layout.had_overflow,
        }
    }
}
