//! Snapping computed geometry to the device pixel grid.

use super::LayoutPass;
use crate::tree::NodeId;
use anyhow::Result;
use sprig_values::numeric::{has_fractional_part, round_value_to_pixel_grid};
use sprig_values::{Dimension, Edge, NodeType};

impl LayoutPass<'_, '_> {
    /// Round positions and sizes of the subtree at `id`.
    ///
    /// Edges are rounded in absolute coordinates so that adjacent boxes stay
    /// adjacent; sizes are derived from the rounded edges. Text nodes are
    /// never rounded smaller than their content.
    pub(super) fn round_to_pixel_grid(
        &mut self,
        id: NodeId,
        point_scale_factor: f64,
        absolute_left: f64,
        absolute_top: f64,
    ) -> Result<()> {
        if point_scale_factor == 0.0 {
            return Ok(());
        }
        let node = self.tree.node_mut(id)?;
        let layout = &mut node.layout;
        let left = f64::from(layout.position(Edge::Left));
        let top = f64::from(layout.position(Edge::Top));
        let width = f64::from(layout.dimension(Dimension::Width));
        let height = f64::from(layout.dimension(Dimension::Height));
        let absolute_node_left = absolute_left + left;
        let absolute_node_top = absolute_top + top;
        let absolute_node_right = absolute_node_left + width;
        let absolute_node_bottom = absolute_node_top + height;

        let text_rounding = node.node_type == NodeType::Text;
        layout.set_position(
            Edge::Left,
            round_value_to_pixel_grid(left, point_scale_factor, false, text_rounding),
        );
        layout.set_position(
            Edge::Top,
            round_value_to_pixel_grid(top, point_scale_factor, false, text_rounding),
        );

        let fractional_width = has_fractional_part(width, point_scale_factor);
        let fractional_height = has_fractional_part(height, point_scale_factor);
        let rounded_width = round_value_to_pixel_grid(
            absolute_node_right,
            point_scale_factor,
            text_rounding && fractional_width,
            text_rounding && !fractional_width,
        ) - round_value_to_pixel_grid(absolute_node_left, point_scale_factor, false, text_rounding);
        let rounded_height = round_value_to_pixel_grid(
            absolute_node_bottom,
            point_scale_factor,
            text_rounding && fractional_height,
            text_rounding && !fractional_height,
        ) - round_value_to_pixel_grid(absolute_node_top, point_scale_factor, false, text_rounding);
        layout.set_dimension(Dimension::Width, rounded_width);
        layout.set_dimension(Dimension::Height, rounded_height);

        let children = node.children.clone();
        for child in children {
            self.round_to_pixel_grid(child, point_scale_factor, absolute_node_left, absolute_node_top)?;
        }
        Ok(())
    }
}
