//! A single box of the layout tree and the per-node quantities the
//! algorithm derives from its style.

use crate::config::Config;
use crate::layout::LayoutResults;
use crate::style::Style;
use crate::tree::NodeId;
use core::any::Any;
use core::fmt;
use smallvec::SmallVec;
use sprig_values::{
    Dimension, Direction, FlexDirection, FloatOptional, MeasureMode, NodeType, PositionType, Size,
    Unit, Value, float_max, float_min, is_undefined,
};
use std::rc::Rc;

/// Arguments handed to a [`MeasureFunc`].
///
/// `width` and `height` are the content box the node may use; they are NaN
/// when the matching mode is [`MeasureMode::Undefined`].
pub struct MeasureInput<'input> {
    pub node: NodeId,
    pub width: f32,
    pub width_mode: MeasureMode,
    pub height: f32,
    pub height_mode: MeasureMode,
    /// The node's own context.
    pub context: Option<&'input dyn Any>,
    /// Context passed to the layout call.
    pub layout_context: Option<&'input dyn Any>,
}

/// Arguments handed to a [`BaselineFunc`].
pub struct BaselineInput<'input> {
    pub node: NodeId,
    pub width: f32,
    pub height: f32,
    pub context: Option<&'input dyn Any>,
    pub layout_context: Option<&'input dyn Any>,
}

/// Sizes a leaf from its content. Must not return NaN.
pub type MeasureFunc = Rc<dyn Fn(&MeasureInput<'_>) -> Size>;
/// Distance from the node's top edge to its first baseline. Must not return NaN.
pub type BaselineFunc = Rc<dyn Fn(&BaselineInput<'_>) -> f32>;
/// Notified when a clean node becomes dirty.
pub type DirtiedFunc = Rc<dyn Fn(NodeId)>;
/// Extra debug text appended to the node's printed representation.
pub type PrintFunc = Rc<dyn Fn(NodeId) -> String>;

/// Child list; most boxes have a handful of children.
pub type Children = SmallVec<NodeId, 4>;

/// One node of a [`LayoutTree`](crate::LayoutTree).
#[derive(Clone)]
pub struct Node {
    pub(crate) style: Style,
    pub(crate) layout: LayoutResults,
    pub(crate) children: Children,
    pub(crate) owner: Option<NodeId>,
    pub(crate) config: Rc<Config>,
    pub(crate) node_type: NodeType,
    pub(crate) is_dirty: bool,
    pub(crate) has_new_layout: bool,
    pub(crate) is_reference_baseline: bool,
    pub(crate) measure: Option<MeasureFunc>,
    pub(crate) baseline: Option<BaselineFunc>,
    pub(crate) dirtied: Option<DirtiedFunc>,
    pub(crate) print: Option<PrintFunc>,
    pub(crate) context: Option<Rc<dyn Any>>,
}

impl Node {
    /// A fresh, dirty node using `config`'s initial style.
    pub fn new(config: Rc<Config>) -> Self {
        let style = if config.use_web_defaults() {
            Style::web_defaults()
        } else {
            Style::default()
        };
        Self {
            style,
            layout: LayoutResults::default(),
            children: Children::new(),
            owner: None,
            config,
            node_type: NodeType::Default,
            is_dirty: true,
            has_new_layout: true,
            is_reference_baseline: false,
            measure: None,
            baseline: None,
            dirtied: None,
            print: None,
            context: None,
        }
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn layout(&self) -> &LayoutResults {
        &self.layout
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn config(&self) -> &Rc<Config> {
        &self.config
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn has_measure_func(&self) -> bool {
        self.measure.is_some()
    }

    pub fn has_baseline_func(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn context(&self) -> Option<&dyn Any> {
        self.context.as_deref()
    }

    /// Replace the opaque context, e.g. from a clone-node callback.
    pub fn set_context(&mut self, context: Option<Rc<dyn Any>>) {
        self.context = context;
    }

    /// Flip the dirty flag; true when the node went from clean to dirty.
    pub(crate) fn set_dirty(&mut self, dirty: bool) -> bool {
        if self.is_dirty == dirty {
            return false;
        }
        self.is_dirty = dirty;
        dirty
    }

    pub(crate) fn resolve_direction(&self, owner_direction: Direction) -> Direction {
        if self.style.direction == Direction::Inherit {
            if owner_direction == Direction::Inherit {
                Direction::Ltr
            } else {
                owner_direction
            }
        } else {
            self.style.direction
        }
    }

    // Insets

    pub(crate) fn is_leading_position_defined(&self, axis: FlexDirection) -> bool {
        !Style::leading_edge_value(&self.style.position, axis, Value::UNDEFINED).is_undefined()
    }

    pub(crate) fn is_trailing_position_defined(&self, axis: FlexDirection) -> bool {
        !Style::trailing_edge_value(&self.style.position, axis, Value::UNDEFINED).is_undefined()
    }

    pub(crate) fn leading_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        Style::leading_edge_value(&self.style.position, axis, Value::ZERO)
            .resolve(axis_size)
            .value()
    }

    pub(crate) fn trailing_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        Style::trailing_edge_value(&self.style.position, axis, Value::ZERO)
            .resolve(axis_size)
            .value()
    }

    /// Offset from relative positioning: the leading inset, else the negated
    /// trailing inset.
    pub(crate) fn relative_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        if self.is_leading_position_defined(axis) {
            return self.leading_position(axis, axis_size);
        }
        let trailing = self.trailing_position(axis, axis_size);
        if is_undefined(trailing) { trailing } else { -trailing }
    }

    // Box model edges. Undefined values count as zero.

    pub(crate) fn leading_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        Style::leading_edge_value(&self.style.margin, axis, Value::ZERO)
            .resolve_margin(width_size)
            .value_or(0.0)
    }

    pub(crate) fn trailing_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        Style::trailing_edge_value(&self.style.margin, axis, Value::ZERO)
            .resolve_margin(width_size)
            .value_or(0.0)
    }

    pub(crate) fn margin_for_axis(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_margin(axis, width_size) + self.trailing_margin(axis, width_size)
    }

    pub(crate) fn leading_border(&self, axis: FlexDirection) -> f32 {
        Style::leading_edge_value(&self.style.border, axis, Value::ZERO)
            .resolve(0.0)
            .value_or(0.0)
            .max(0.0)
    }

    pub(crate) fn trailing_border(&self, axis: FlexDirection) -> f32 {
        Style::trailing_edge_value(&self.style.border, axis, Value::ZERO)
            .resolve(0.0)
            .value_or(0.0)
            .max(0.0)
    }

    pub(crate) fn leading_padding(&self, axis: FlexDirection, width_size: f32) -> f32 {
        Style::leading_edge_value(&self.style.padding, axis, Value::ZERO)
            .resolve(width_size)
            .max(FloatOptional::new(0.0))
            .value()
    }

    pub(crate) fn trailing_padding(&self, axis: FlexDirection, width_size: f32) -> f32 {
        Style::trailing_edge_value(&self.style.padding, axis, Value::ZERO)
            .resolve(width_size)
            .max(FloatOptional::new(0.0))
            .value()
    }

    pub(crate) fn leading_padding_and_border(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_padding(axis, width_size) + self.leading_border(axis)
    }

    pub(crate) fn trailing_padding_and_border(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.trailing_padding(axis, width_size) + self.trailing_border(axis)
    }

    pub(crate) fn padding_and_border_for_axis(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_padding_and_border(axis, width_size)
            + self.trailing_padding_and_border(axis, width_size)
    }

    /// Gap between items along `axis`, never negative.
    pub(crate) fn gap_for_axis(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let gap = if axis.is_row() {
            self.style.resolved_column_gap()
        } else {
            self.style.resolved_row_gap()
        };
        gap.resolve(width_size).value_or(0.0).max(0.0)
    }

    // Flex factors

    /// Flex basis after applying the `flex` shorthand.
    pub(crate) fn resolve_flex_basis(&self) -> Value {
        let basis = self.style.flex_basis;
        if !basis.is_auto() && !basis.is_undefined() {
            return basis;
        }
        if self.style.flex.is_defined() && self.style.flex.value() > 0.0 {
            return if self.config.use_web_defaults() {
                Value::AUTO
            } else {
                Value::ZERO
            };
        }
        Value::AUTO
    }

    pub(crate) fn resolve_flex_grow(&self) -> f32 {
        if self.owner.is_none() {
            return 0.0;
        }
        if self.style.flex_grow.is_defined() {
            return self.style.flex_grow.value();
        }
        if self.style.flex.is_defined() && self.style.flex.value() > 0.0 {
            return self.style.flex.value();
        }
        0.0
    }

    pub(crate) fn resolve_flex_shrink(&self) -> f32 {
        if self.owner.is_none() {
            return 0.0;
        }
        if self.style.flex_shrink.is_defined() {
            return self.style.flex_shrink.value();
        }
        let web_defaults = self.config.use_web_defaults();
        if !web_defaults && self.style.flex.is_defined() && self.style.flex.value() < 0.0 {
            return -self.style.flex.value();
        }
        if web_defaults { 1.0 } else { 0.0 }
    }

    pub(crate) fn is_flexible(&self) -> bool {
        self.style.position_type == PositionType::Relative
            && (self.resolve_flex_grow() != 0.0 || self.resolve_flex_shrink() != 0.0)
    }

    // Sizing

    /// True when the style pins a usable size on `axis`.
    pub(crate) fn is_style_dim_defined(&self, axis: FlexDirection, owner_size: f32) -> bool {
        let resolved = self.style.resolved_dimension(axis.dimension());
        match resolved.unit {
            Unit::Auto | Unit::Undefined => false,
            Unit::Point => is_undefined(resolved.value) || resolved.value >= 0.0,
            Unit::Percent => {
                is_undefined(resolved.value) || (resolved.value >= 0.0 && !is_undefined(owner_size))
            }
        }
    }

    pub(crate) fn is_layout_dim_defined(&self, axis: FlexDirection) -> bool {
        let value = self.layout.measured(axis.dimension());
        !is_undefined(value) && value >= 0.0
    }

    pub(crate) fn bound_axis_within_min_and_max(
        &self,
        axis: FlexDirection,
        value: FloatOptional,
        axis_size: f32,
    ) -> FloatOptional {
        let dimension = axis.dimension();
        let min = self.style.min_dimension(dimension).resolve(axis_size).value();
        let max = self.style.max_dimension(dimension).resolve(axis_size).value();
        let raw = value.value();
        if max >= 0.0 && raw > max {
            return FloatOptional::new(max);
        }
        if min >= 0.0 && raw < min {
            return FloatOptional::new(min);
        }
        value
    }

    /// Clamp to min/max, never below the padding and border of `axis`.
    pub(crate) fn bound_axis(
        &self,
        axis: FlexDirection,
        value: f32,
        axis_size: f32,
        width_size: f32,
    ) -> f32 {
        float_max(
            self.bound_axis_within_min_and_max(axis, FloatOptional::new(value), axis_size)
                .value(),
            self.padding_and_border_for_axis(axis, width_size),
        )
    }

    /// Space left for content on `axis` once margins, padding and border
    /// are removed, clamped to the inner min/max.
    pub(crate) fn available_inner_dim(&self, axis: FlexDirection, available: f32, owner_dim: f32) -> f32 {
        let padding_and_border = self.padding_and_border_for_axis(axis, owner_dim);
        let inner = available - self.margin_for_axis(axis, owner_dim) - padding_and_border;
        if is_undefined(inner) {
            return inner;
        }
        let dimension = axis.dimension();
        let min = self.style.min_dimension(dimension).resolve(owner_dim);
        let max = self.style.max_dimension(dimension).resolve(owner_dim);
        let min_inner = if min.is_undefined() { 0.0 } else { min.value() - padding_and_border };
        let max_inner = if max.is_undefined() { f32::MAX } else { max.value() - padding_and_border };
        float_max(float_min(inner, max_inner), min_inner)
    }

    pub(crate) fn dim_with_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.layout.measured(axis.dimension()) + self.margin_for_axis(axis, width_size)
    }

    /// Tighten `(mode, size)` so the node never exceeds its max dimension.
    pub(crate) fn constrain_max_size_for_mode(
        &self,
        axis: FlexDirection,
        owner_axis_size: f32,
        owner_width: f32,
        mode: MeasureMode,
        size: f32,
    ) -> (MeasureMode, f32) {
        let max_size = self
            .style
            .max_dimension(axis.dimension())
            .resolve(owner_axis_size)
            .value()
            + self.margin_for_axis(axis, owner_width);
        match mode {
            MeasureMode::Exactly | MeasureMode::AtMost => {
                if is_undefined(max_size) || size < max_size {
                    (mode, size)
                } else {
                    (mode, max_size)
                }
            }
            MeasureMode::Undefined => {
                if is_undefined(max_size) {
                    (mode, size)
                } else {
                    (MeasureMode::AtMost, max_size)
                }
            }
        }
    }

    /// Seed the layout position with margins and relative offsets.
    pub(crate) fn set_position(
        &mut self,
        direction: Direction,
        main_size: f32,
        cross_size: f32,
        owner_width: f32,
    ) {
        let effective_direction = if self.owner.is_some() { direction } else { Direction::Ltr };
        let main_axis = self.style.flex_direction.resolve(effective_direction);
        let cross_axis = main_axis.cross(effective_direction);
        let relative_main = self.relative_position(main_axis, main_size);
        let relative_cross = self.relative_position(cross_axis, cross_size);

        let leading_main = self.leading_margin(main_axis, owner_width) + relative_main;
        let trailing_main = self.trailing_margin(main_axis, owner_width) + relative_main;
        let leading_cross = self.leading_margin(cross_axis, owner_width) + relative_cross;
        let trailing_cross = self.trailing_margin(cross_axis, owner_width) + relative_cross;

        self.layout.set_position(main_axis.leading_edge(), leading_main);
        self.layout.set_position(main_axis.trailing_edge(), trailing_main);
        self.layout.set_position(cross_axis.leading_edge(), leading_cross);
        self.layout.set_position(cross_axis.trailing_edge(), trailing_cross);
    }

    pub(crate) fn measured_size(&self) -> Size {
        Size::new(
            self.layout.measured(Dimension::Width),
            self.layout.measured(Dimension::Height),
        )
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Node")
            .field("style", &self.style)
            .field("layout", &self.layout)
            .field("children", &self.children)
            .field("owner", &self.owner)
            .field("node_type", &self.node_type)
            .field("is_dirty", &self.is_dirty)
            .field("has_measure_func", &self.measure.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprig_values::Edge;

    fn node() -> Node {
        Node::new(Rc::new(Config::new()))
    }

    #[test]
    /// # Panics
    /// Panics if root nodes report non-zero flex factors.
    fn root_never_flexes() {
        let mut root = node();
        root.style.flex_grow = FloatOptional::new(2.0);
        assert!(root.resolve_flex_grow().abs() < f32::EPSILON);
        root.owner = Some(NodeId::from_raw(7, 0));
        assert!((root.resolve_flex_grow() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    /// # Panics
    /// Panics if the `flex` shorthand does not feed grow, shrink and basis.
    fn flex_shorthand_maps_to_factors() {
        let mut child = node();
        child.owner = Some(NodeId::from_raw(0, 0));
        child.style.flex = FloatOptional::new(3.0);
        assert!((child.resolve_flex_grow() - 3.0).abs() < f32::EPSILON);
        assert!(child.resolve_flex_shrink().abs() < f32::EPSILON);
        assert_eq!(child.resolve_flex_basis(), Value::ZERO);
        child.style.flex = FloatOptional::new(-2.0);
        assert!((child.resolve_flex_shrink() - 2.0).abs() < f32::EPSILON);
        assert_eq!(child.resolve_flex_basis().unit, Unit::Auto);
    }

    #[test]
    /// # Panics
    /// Panics if web defaults do not change the shrink default and basis mapping.
    fn web_defaults_shrink_by_default() {
        let mut config = Config::new();
        config.set_use_web_defaults(true);
        let mut child = Node::new(Rc::new(config));
        child.owner = Some(NodeId::from_raw(0, 0));
        assert!((child.resolve_flex_shrink() - 1.0).abs() < f32::EPSILON);
        child.style.flex = FloatOptional::new(1.0);
        assert_eq!(child.resolve_flex_basis(), Value::AUTO);
    }

    #[test]
    /// # Panics
    /// Panics if min/max clamping or the padding floor misbehave.
    fn bound_axis_clamps_and_floors() {
        let mut item = node();
        item.style.min_dimensions[Dimension::Width.index()] = Value::points(20.0);
        item.style.max_dimensions[Dimension::Width.index()] = Value::points(50.0);
        item.style.padding[Edge::Left.index()] = Value::points(30.0);
        let row = FlexDirection::Row;
        assert!((item.bound_axis(row, 80.0, 100.0, 100.0) - 50.0).abs() < f32::EPSILON);
        assert!((item.bound_axis(row, 10.0, 100.0, 100.0) - 30.0).abs() < f32::EPSILON);
        assert!((item.bound_axis(row, 40.0, 100.0, 100.0) - 40.0).abs() < f32::EPSILON);
    }

    #[test]
    /// # Panics
    /// Panics if an undefined mode is not bounded by the max dimension.
    fn max_size_turns_undefined_into_at_most() {
        let mut item = node();
        item.style.max_dimensions[Dimension::Height.index()] = Value::points(25.0);
        let (mode, size) = item.constrain_max_size_for_mode(
            FlexDirection::Column,
            100.0,
            100.0,
            MeasureMode::Undefined,
            f32::NAN,
        );
        assert_eq!(mode, MeasureMode::AtMost);
        assert!((size - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    /// # Panics
    /// Panics if relative offsets do not prefer the leading inset.
    fn relative_position_prefers_leading() {
        let mut item = node();
        item.style.position[Edge::Right.index()] = Value::points(5.0);
        assert!((item.relative_position(FlexDirection::Row, 100.0) + 5.0).abs() < f32::EPSILON);
        item.style.position[Edge::Left.index()] = Value::percent(10.0);
        assert!((item.relative_position(FlexDirection::Row, 100.0) - 10.0).abs() < f32::EPSILON);
    }
}
