//! Style setters and getters.
//!
//! Every setter compares against the stored value and only marks the node
//! (and its ancestors) dirty when something changed.

use super::{LayoutTree, NodeId};
use crate::style::Style;
use anyhow::Result;
use sprig_values::{
    Align, Dimension, Direction, Display, Edge, FlexDirection, FloatOptional, Gutter, Justify,
    Overflow, PositionType, Value, Wrap,
};

macro_rules! keyword_property {
    ($($field:ident, $setter:ident: $kind:ty;)+) => {
        $(
            /// # Errors
            /// Returns an error if `id` is not live.
            pub fn $setter(&mut self, id: NodeId, value: $kind) -> Result<()> {
                self.update_style(id, value, |style| &mut style.$field)
            }

            /// # Errors
            /// Returns an error if `id` is not live.
            pub fn $field(&self, id: NodeId) -> Result<$kind> {
                Ok(self.node(id)?.style.$field)
            }
        )+
    };
}

macro_rules! factor_property {
    ($($field:ident, $setter:ident;)+) => {
        $(
            /// Pass NaN to unset.
            ///
            /// # Errors
            /// Returns an error if `id` is not live.
            pub fn $setter(&mut self, id: NodeId, value: f32) -> Result<()> {
                self.update_style(id, FloatOptional::new(value), |style| &mut style.$field)
            }

            /// NaN when unset.
            ///
            /// # Errors
            /// Returns an error if `id` is not live.
            pub fn $field(&self, id: NodeId) -> Result<f32> {
                Ok(self.node(id)?.style.$field.value())
            }
        )+
    };
}

macro_rules! dimension_property {
    ($($getter:ident, $setter:ident: $array:ident[$dimension:expr];)+) => {
        $(
            /// # Errors
            /// Returns an error if `id` is not live.
            pub fn $setter(&mut self, id: NodeId, value: Value) -> Result<()> {
                self.update_style(id, value, |style| &mut style.$array[$dimension.index()])
            }

            /// # Errors
            /// Returns an error if `id` is not live.
            pub fn $getter(&self, id: NodeId) -> Result<Value> {
                Ok(self.node(id)?.style.$array[$dimension.index()])
            }
        )+
    };
}

impl LayoutTree {
    fn update_style<T: PartialEq>(
        &mut self,
        id: NodeId,
        value: T,
        field: fn(&mut Style) -> &mut T,
    ) -> Result<()> {
        let slot = field(&mut self.node_mut(id)?.style);
        if *slot == value {
            return Ok(());
        }
        *slot = value;
        self.mark_dirty_and_propagate(id)
    }

    keyword_property! {
        direction, set_direction: Direction;
        flex_direction, set_flex_direction: FlexDirection;
        justify_content, set_justify_content: Justify;
        align_content, set_align_content: Align;
        align_items, set_align_items: Align;
        align_self, set_align_self: Align;
        position_type, set_position_type: PositionType;
        flex_wrap, set_flex_wrap: Wrap;
        overflow, set_overflow: Overflow;
        display, set_display: Display;
        flex_basis, set_flex_basis: Value;
    }

    factor_property! {
        flex, set_flex;
        flex_grow, set_flex_grow;
        flex_shrink, set_flex_shrink;
        aspect_ratio, set_aspect_ratio;
    }

    dimension_property! {
        width, set_width: dimensions[Dimension::Width];
        height, set_height: dimensions[Dimension::Height];
        min_width, set_min_width: min_dimensions[Dimension::Width];
        min_height, set_min_height: min_dimensions[Dimension::Height];
        max_width, set_max_width: max_dimensions[Dimension::Width];
        max_height, set_max_height: max_dimensions[Dimension::Height];
    }

    /// Set an inset; only meaningful for relative offsets and absolute children.
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_position(&mut self, id: NodeId, edge: Edge, value: Value) -> Result<()> {
        self.update_edge(id, edge, value, |style| &mut style.position)
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn position(&self, id: NodeId, edge: Edge) -> Result<Value> {
        Ok(self.node(id)?.style.position[edge.index()])
    }

    /// Margins accept [`Value::AUTO`].
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_margin(&mut self, id: NodeId, edge: Edge, value: Value) -> Result<()> {
        self.update_edge(id, edge, value, |style| &mut style.margin)
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn margin(&self, id: NodeId, edge: Edge) -> Result<Value> {
        Ok(self.node(id)?.style.margin[edge.index()])
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_padding(&mut self, id: NodeId, edge: Edge, value: Value) -> Result<()> {
        self.update_edge(id, edge, value, |style| &mut style.padding)
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn padding(&self, id: NodeId, edge: Edge) -> Result<Value> {
        Ok(self.node(id)?.style.padding[edge.index()])
    }

    /// Borders are plain point widths; NaN unsets the edge.
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_border(&mut self, id: NodeId, edge: Edge, width: f32) -> Result<()> {
        self.update_edge(id, edge, Value::points(width), |style| &mut style.border)
    }

    /// NaN when unset.
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn border(&self, id: NodeId, edge: Edge) -> Result<f32> {
        Ok(self.node(id)?.style.border[edge.index()].value)
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_gap(&mut self, id: NodeId, gutter: Gutter, value: Value) -> Result<()> {
        let node = self.node_mut(id)?;
        let slot = &mut node.style.gap[gutter.index()];
        if *slot == value {
            return Ok(());
        }
        *slot = value;
        self.mark_dirty_and_propagate(id)
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn gap(&self, id: NodeId, gutter: Gutter) -> Result<Value> {
        Ok(self.node(id)?.style.gap[gutter.index()])
    }

    fn update_edge(
        &mut self,
        id: NodeId,
        edge: Edge,
        value: Value,
        edges: fn(&mut Style) -> &mut [Value; Edge::COUNT],
    ) -> Result<()> {
        let slot = &mut edges(&mut self.node_mut(id)?.style)[edge.index()];
        if *slot == value {
            return Ok(());
        }
        *slot = value;
        self.mark_dirty_and_propagate(id)
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn style(&self, id: NodeId) -> Result<&Style> {
        Ok(&self.node(id)?.style)
    }

    /// Replace the whole style at once.
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_style(&mut self, id: NodeId, style: Style) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.style == style {
            return Ok(());
        }
        node.style = style;
        self.mark_dirty_and_propagate(id)
    }

    /// Copy the style of `source` onto `target`.
    ///
    /// # Errors
    /// Returns an error if either node is not live.
    pub fn copy_style(&mut self, target: NodeId, source: NodeId) -> Result<()> {
        let style = self.node(source)?.style.clone();
        self.set_style(target, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_pair() -> Result<(LayoutTree, NodeId, NodeId)> {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let child = tree.new_node();
        tree.insert_child(root, child, 0)?;
        tree.calculate_layout(root, 100.0, 100.0, Direction::Ltr)?;
        Ok((tree, root, child))
    }

    #[test]
    /// # Panics
    /// Panics if setting an unchanged value dirties the tree.
    fn unchanged_value_keeps_tree_clean() -> Result<()> {
        let (mut tree, root, child) = clean_pair()?;
        assert!(!tree.is_dirty(root)?);
        tree.set_flex_direction(child, FlexDirection::Column)?;
        tree.set_width(child, Value::AUTO)?;
        tree.set_flex_grow(child, f32::NAN)?;
        tree.set_margin(child, Edge::Left, Value::UNDEFINED)?;
        assert!(!tree.is_dirty(child)?);
        assert!(!tree.is_dirty(root)?);
        Ok(())
    }

    #[test]
    /// # Panics
    /// Panics if a changed value does not dirty the node and its ancestors.
    fn changed_value_dirties_ancestors() -> Result<()> {
        let (mut tree, root, child) = clean_pair()?;
        tree.set_margin(child, Edge::Top, Value::points(3.0))?;
        assert!(tree.is_dirty(child)?);
        assert!(tree.is_dirty(root)?);
        assert_eq!(tree.margin(child, Edge::Top)?, Value::points(3.0));
        Ok(())
    }

    #[test]
    /// # Panics
    /// Panics if factors do not round-trip NaN as unset.
    fn factors_report_nan_when_unset() -> Result<()> {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        assert!(tree.flex_grow(node)?.is_nan());
        tree.set_flex_grow(node, 2.0)?;
        assert!((tree.flex_grow(node)? - 2.0).abs() < f32::EPSILON);
        assert!(tree.border(node, Edge::All)?.is_nan());
        Ok(())
    }

    #[test]
    /// # Panics
    /// Panics if copying an identical style dirties the target.
    fn copy_style_only_dirties_on_change() -> Result<()> {
        let (mut tree, root, child) = clean_pair()?;
        tree.copy_style(child, child)?;
        assert!(!tree.is_dirty(child)?);
        let other = tree.new_node();
        tree.set_flex_wrap(other, Wrap::Wrap)?;
        tree.copy_style(child, other)?;
        assert!(tree.is_dirty(root)?);
        assert_eq!(tree.flex_wrap(child)?, Wrap::Wrap);
        Ok(())
    }
}
