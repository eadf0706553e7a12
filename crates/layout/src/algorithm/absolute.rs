//! Layout of absolutely positioned children.

use super::cross_axis::align_item;
use super::{FlexContainer, LayoutPass, LayoutRequest};
use crate::event::LayoutPassReason;
use crate::tree::NodeId;
use anyhow::Result;
use sprig_values::{
    Align, Dimension, FlexDirection, Justify, MeasureMode, UNDEFINED, Wrap, is_undefined,
};

impl LayoutPass<'_, '_> {
    /// Size an absolute child from its style and insets, then place it
    /// against the container's padding box.
    #[allow(clippy::too_many_lines, reason = "Sizing then placement on both axes")]
    pub(super) fn absolute_layout_child(&mut self, container: &FlexContainer, child: NodeId) -> Result<()> {
        let main_axis = container.main_axis;
        let cross_axis = container.cross_axis;
        let is_main_axis_row = container.is_main_axis_row;
        let width = container.available_inner_width;
        let height = container.available_inner_height;
        let width_mode = if is_main_axis_row {
            container.measure_mode_main_dim
        } else {
            container.measure_mode_cross_dim
        };

        let parent = self.tree.node(container.node)?;
        let child_node = self.tree.node(child)?;
        let parent_size = parent.measured_size();
        let margin_row = child_node.margin_for_axis(FlexDirection::Row, width);
        let margin_column = child_node.margin_for_axis(FlexDirection::Column, width);

        let mut child_width = UNDEFINED;
        if child_node.is_style_dim_defined(FlexDirection::Row, width) {
            child_width = child_node
                .style
                .resolved_dimension(Dimension::Width)
                .resolve(width)
                .value()
                + margin_row;
        } else if child_node.is_leading_position_defined(FlexDirection::Row)
            && child_node.is_trailing_position_defined(FlexDirection::Row)
        {
            let inset_width = parent_size.width
                - (parent.leading_border(FlexDirection::Row) + parent.trailing_border(FlexDirection::Row))
                - (child_node.leading_position(FlexDirection::Row, width)
                    + child_node.trailing_position(FlexDirection::Row, width));
            child_width = child_node.bound_axis(FlexDirection::Row, inset_width, width, width);
        }

        let mut child_height = UNDEFINED;
        if child_node.is_style_dim_defined(FlexDirection::Column, height) {
            child_height = child_node
                .style
                .resolved_dimension(Dimension::Height)
                .resolve(height)
                .value()
                + margin_column;
        } else if child_node.is_leading_position_defined(FlexDirection::Column)
            && child_node.is_trailing_position_defined(FlexDirection::Column)
        {
            let inset_height = parent_size.height
                - (parent.leading_border(FlexDirection::Column)
                    + parent.trailing_border(FlexDirection::Column))
                - (child_node.leading_position(FlexDirection::Column, height)
                    + child_node.trailing_position(FlexDirection::Column, height));
            child_height = child_node.bound_axis(FlexDirection::Column, inset_height, height, width);
        }

        // One known dimension anchors the other through the aspect ratio.
        let aspect_ratio = child_node.style.aspect_ratio;
        if is_undefined(child_width) != is_undefined(child_height) && aspect_ratio.is_defined() {
            if is_undefined(child_width) {
                child_width = margin_row + (child_height - margin_column) * aspect_ratio.value();
            } else {
                child_height = margin_column + (child_width - margin_row) / aspect_ratio.value();
            }
        }

        if is_undefined(child_width) || is_undefined(child_height) {
            let mut child_width_mode = if is_undefined(child_width) {
                MeasureMode::Undefined
            } else {
                MeasureMode::Exactly
            };
            let child_height_mode = if is_undefined(child_height) {
                MeasureMode::Undefined
            } else {
                MeasureMode::Exactly
            };
            // Let content wrap at the container's width.
            if !is_main_axis_row
                && is_undefined(child_width)
                && width_mode != MeasureMode::Undefined
                && !is_undefined(width)
                && width > 0.0
            {
                child_width = width;
                child_width_mode = MeasureMode::AtMost;
            }
            self.layout_node_internal(
                child,
                &LayoutRequest {
                    available_width: child_width,
                    available_height: child_height,
                    owner_direction: container.direction,
                    width_mode: child_width_mode,
                    height_mode: child_height_mode,
                    owner_width: child_width,
                    owner_height: child_height,
                    perform_layout: false,
                    reason: LayoutPassReason::AbsMeasureChild,
                },
            )?;
            let measured = self.tree.node(child)?.measured_size();
            child_width = measured.width + margin_row;
            child_height = measured.height + margin_column;
        }

        self.layout_node_internal(
            child,
            &LayoutRequest {
                available_width: child_width,
                available_height: child_height,
                owner_direction: container.direction,
                width_mode: MeasureMode::Exactly,
                height_mode: MeasureMode::Exactly,
                owner_width: child_width,
                owner_height: child_height,
                perform_layout: true,
                reason: LayoutPassReason::AbsLayout,
            },
        )?;

        let owner = self.tree.node(container.node)?;
        let placed = self.tree.node(child)?;
        let justify_content = owner.style.justify_content;
        let align = align_item(owner, placed);
        let wrap_reverse = owner.style.flex_wrap == Wrap::WrapReverse;
        let mut placements = Vec::with_capacity(2);
        for (axis, axis_size) in [
            (main_axis, if is_main_axis_row { width } else { height }),
            (cross_axis, if is_main_axis_row { height } else { width }),
        ] {
            if placed.is_leading_position_defined(axis) {
                continue;
            }
            let dimension = axis.dimension();
            let free = owner.layout.measured(dimension) - placed.layout.measured(dimension);
            let is_main = axis == main_axis;
            let position = if placed.is_trailing_position_defined(axis) {
                free - owner.trailing_border(axis)
                    - placed.trailing_margin(axis, width)
                    - placed.trailing_position(axis, axis_size)
            } else if (is_main && justify_content == Justify::Center) || (!is_main && align == Align::Center) {
                free / 2.0
            } else if (is_main && justify_content == Justify::FlexEnd)
                || (!is_main && ((align == Align::FlexEnd) != wrap_reverse))
            {
                free
            } else {
                continue;
            };
            placements.push((axis.leading_edge(), position));
        }

        let child_mut = self.tree.node_mut(child)?;
        for (edge, position) in placements {
            child_mut.layout.set_position(edge, position);
        }
        Ok(())
    }
}
