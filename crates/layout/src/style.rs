//! Per-node style: the user-specified constraints the algorithm reads.

use serde::{Deserialize, Serialize};
use sprig_values::{
    Align, Dimension, Direction, Display, Edge, FlexDirection, FloatOptional, Gutter, Justify,
    Overflow, PositionType, Unit, Value, Wrap,
};

/// One [`Value`] per [`Edge`], including the shorthand edges.
pub type Edges = [Value; Edge::COUNT];

/// One [`Value`] per [`Dimension`].
pub type Dimensions = [Value; 2];

/// Flexbox style of a single node.
///
/// Equality is structural. Defaults follow the engine's initial values;
/// [`Style::web_defaults`] switches to the CSS initial values for
/// `flex-direction` and `align-content`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub direction: Direction,
    pub flex_direction: FlexDirection,
    pub justify_content: Justify,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub position_type: PositionType,
    pub flex_wrap: Wrap,
    pub overflow: Overflow,
    pub display: Display,
    /// `flex` shorthand factor.
    pub flex: FloatOptional,
    pub flex_grow: FloatOptional,
    pub flex_shrink: FloatOptional,
    pub flex_basis: Value,
    pub margin: Edges,
    pub position: Edges,
    pub padding: Edges,
    pub border: Edges,
    /// Gaps indexed by [`Gutter::index`].
    pub gap: [Value; Gutter::COUNT],
    pub dimensions: Dimensions,
    pub min_dimensions: Dimensions,
    pub max_dimensions: Dimensions,
    pub aspect_ratio: FloatOptional,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: Justify::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,
            flex: FloatOptional::UNDEFINED,
            flex_grow: FloatOptional::UNDEFINED,
            flex_shrink: FloatOptional::UNDEFINED,
            flex_basis: Value::AUTO,
            margin: [Value::UNDEFINED; Edge::COUNT],
            position: [Value::UNDEFINED; Edge::COUNT],
            padding: [Value::UNDEFINED; Edge::COUNT],
            border: [Value::UNDEFINED; Edge::COUNT],
            gap: [Value::UNDEFINED; Gutter::COUNT],
            dimensions: [Value::AUTO; 2],
            min_dimensions: [Value::UNDEFINED; 2],
            max_dimensions: [Value::UNDEFINED; 2],
            aspect_ratio: FloatOptional::UNDEFINED,
        }
    }
}

impl Style {
    /// Initial style when the config asks for web defaults.
    pub fn web_defaults() -> Self {
        Self {
            flex_direction: FlexDirection::Row,
            align_content: Align::Stretch,
            ..Self::default()
        }
    }

    #[inline]
    pub fn dimension(&self, dimension: Dimension) -> Value {
        self.dimensions[dimension.index()]
    }

    #[inline]
    pub fn min_dimension(&self, dimension: Dimension) -> Value {
        self.min_dimensions[dimension.index()]
    }

    #[inline]
    pub fn max_dimension(&self, dimension: Dimension) -> Value {
        self.max_dimensions[dimension.index()]
    }

    /// Effective size for `dimension`: a max that equals the min pins the size.
    pub fn resolved_dimension(&self, dimension: Dimension) -> Value {
        let max = self.max_dimension(dimension);
        if !max.is_undefined() && max == self.min_dimension(dimension) {
            max
        } else {
            self.dimension(dimension)
        }
    }

    /// Column gap, falling back to the `All` gutter.
    pub fn resolved_column_gap(&self) -> Value {
        Self::gutter_or_all(&self.gap, Gutter::Column)
    }

    /// Row gap, falling back to the `All` gutter.
    pub fn resolved_row_gap(&self) -> Value {
        Self::gutter_or_all(&self.gap, Gutter::Row)
    }

    fn gutter_or_all(gaps: &[Value; Gutter::COUNT], gutter: Gutter) -> Value {
        let specific = gaps[gutter.index()];
        if specific.is_undefined() { gaps[Gutter::All.index()] } else { specific }
    }

    /// Value of `edges` on the leading side of `axis`.
    ///
    /// Row axes consult `Start`, then the physical edge, then `Horizontal` and
    /// `All`. Column axes consult the physical edge, then `Vertical` and `All`.
    pub fn leading_edge_value(edges: &Edges, axis: FlexDirection, fallback: Value) -> Value {
        if axis.is_row() {
            Self::row_edge_value(edges, Edge::Start, axis.leading_edge(), fallback)
        } else {
            Self::column_edge_value(edges, axis.leading_edge(), fallback)
        }
    }

    /// Value of `edges` on the trailing side of `axis`.
    pub fn trailing_edge_value(edges: &Edges, axis: FlexDirection, fallback: Value) -> Value {
        if axis.is_row() {
            Self::row_edge_value(edges, Edge::End, axis.trailing_edge(), fallback)
        } else {
            Self::column_edge_value(edges, axis.trailing_edge(), fallback)
        }
    }

    fn row_edge_value(edges: &Edges, logical: Edge, physical: Edge, fallback: Value) -> Value {
        [logical, physical, Edge::Horizontal, Edge::All]
            .into_iter()
            .map(|edge| edges[edge.index()])
            .find(|value| !value.is_undefined())
            .unwrap_or(fallback)
    }

    fn column_edge_value(edges: &Edges, physical: Edge, fallback: Value) -> Value {
        [physical, Edge::Vertical, Edge::All]
            .into_iter()
            .map(|edge| edges[edge.index()])
            .find(|value| !value.is_undefined())
            .unwrap_or(fallback)
    }

    /// True when the leading margin of `axis` is `auto`.
    pub fn has_auto_leading_margin(&self, axis: FlexDirection) -> bool {
        Self::leading_edge_value(&self.margin, axis, Value::UNDEFINED).unit == Unit::Auto
    }

    /// True when the trailing margin of `axis` is `auto`.
    pub fn has_auto_trailing_margin(&self, axis: FlexDirection) -> bool {
        Self::trailing_edge_value(&self.margin, axis, Value::UNDEFINED).unit == Unit::Auto
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// # Panics
    /// Panics if the shorthand chain is consulted in the wrong order.
    fn row_edges_prefer_start_then_physical_then_shorthands() {
        let mut edges: Edges = [Value::UNDEFINED; Edge::COUNT];
        edges[Edge::All.index()] = Value::points(1.0);
        assert_eq!(
            Style::leading_edge_value(&edges, FlexDirection::Row, Value::ZERO),
            Value::points(1.0)
        );
        edges[Edge::Horizontal.index()] = Value::points(2.0);
        assert_eq!(
            Style::leading_edge_value(&edges, FlexDirection::Row, Value::ZERO),
            Value::points(2.0)
        );
        edges[Edge::Left.index()] = Value::points(3.0);
        assert_eq!(
            Style::leading_edge_value(&edges, FlexDirection::Row, Value::ZERO),
            Value::points(3.0)
        );
        edges[Edge::Start.index()] = Value::points(4.0);
        assert_eq!(
            Style::leading_edge_value(&edges, FlexDirection::Row, Value::ZERO),
            Value::points(4.0)
        );
        // Vertical shorthand never applies to the row axis.
        edges[Edge::Vertical.index()] = Value::points(9.0);
        assert_eq!(
            Style::trailing_edge_value(&edges, FlexDirection::Row, Value::ZERO),
            Value::points(2.0)
        );
    }

    #[test]
    /// # Panics
    /// Panics if column edges consult `Start`/`End`.
    fn column_edges_ignore_logical_edges() {
        let mut edges: Edges = [Value::UNDEFINED; Edge::COUNT];
        edges[Edge::Start.index()] = Value::points(5.0);
        assert_eq!(
            Style::leading_edge_value(&edges, FlexDirection::Column, Value::ZERO),
            Value::ZERO
        );
        edges[Edge::Vertical.index()] = Value::points(6.0);
        assert_eq!(
            Style::trailing_edge_value(&edges, FlexDirection::ColumnReverse, Value::ZERO),
            Value::points(6.0)
        );
    }

    #[test]
    /// # Panics
    /// Panics if equal min and max do not pin the dimension.
    fn equal_min_max_pins_dimension() {
        let mut style = Style::default();
        style.min_dimensions[Dimension::Width.index()] = Value::points(40.0);
        style.max_dimensions[Dimension::Width.index()] = Value::points(40.0);
        assert_eq!(style.resolved_dimension(Dimension::Width), Value::points(40.0));
        assert_eq!(style.resolved_dimension(Dimension::Height), Value::AUTO);
    }

    #[test]
    /// # Panics
    /// Panics if gutters do not fall back to the `All` gap.
    fn gaps_fall_back_to_all() {
        let mut style = Style::default();
        style.gap[Gutter::All.index()] = Value::points(8.0);
        style.gap[Gutter::Row.index()] = Value::points(2.0);
        assert_eq!(style.resolved_column_gap(), Value::points(8.0));
        assert_eq!(style.resolved_row_gap(), Value::points(2.0));
    }

    #[test]
    /// # Panics
    /// Panics if web defaults change more than direction and content alignment.
    fn web_defaults_differ_in_direction_and_content_alignment() {
        let web = Style::web_defaults();
        assert_eq!(web.flex_direction, FlexDirection::Row);
        assert_eq!(web.align_content, Align::Stretch);
        assert_eq!(web.justify_content, Style::default().justify_content);
    }
}
