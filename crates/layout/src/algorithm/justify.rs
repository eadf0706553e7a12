//! Main-axis placement of the children of one line.

use super::flex_line::FlexLine;
use super::{FlexContainer, LayoutPass};
use anyhow::Result;
use sprig_values::{Dimension, Display, FlexDirection, Justify, MeasureMode, PositionType, float_max};

impl LayoutPass<'_, '_> {
    /// Position the children of `line` along the main axis and compute the
    /// line's main and cross extents.
    #[allow(clippy::too_many_lines, reason = "Placement walks the line once")]
    pub(super) fn justify_main_axis(
        &mut self,
        container: &FlexContainer,
        line: &mut FlexLine,
        start: usize,
    ) -> Result<()> {
        let main_axis = container.main_axis;
        let cross_axis = container.cross_axis;
        let available_inner_width = container.available_inner_width;
        let line_children = container
            .children
            .get(start..line.end_of_line_index)
            .unwrap_or(&[]);

        let node = self.tree.node(container.node)?;
        let leading_padding_and_border_main =
            node.leading_padding_and_border(main_axis, container.owner_width);
        let trailing_padding_and_border_main =
            node.trailing_padding_and_border(main_axis, container.owner_width);
        let leading_border_main = node.leading_border(main_axis);
        let justify_content = node.style.justify_content;
        let min_main = node
            .style
            .min_dimension(main_axis.dimension())
            .resolve(container.main_axis_owner_size);

        // Content-sized containers only hand out space up to their min size.
        if container.measure_mode_main_dim == MeasureMode::AtMost && line.remaining_free_space > 0.0 {
            line.remaining_free_space = if min_main.is_defined() {
                let min_available_main = min_main.value()
                    - leading_padding_and_border_main
                    - trailing_padding_and_border_main;
                let occupied = container.available_inner_main_dim - line.remaining_free_space;
                float_max(0.0, min_available_main - occupied)
            } else {
                0.0
            };
        }

        let mut auto_margin_count = 0u16;
        let mut last_in_flow = None;
        for (offset, &child) in line_children.iter().enumerate() {
            let child_node = self.tree.node(child)?;
            if child_node.style.position_type != PositionType::Relative {
                continue;
            }
            auto_margin_count += u16::from(child_node.style.has_auto_leading_margin(main_axis));
            auto_margin_count += u16::from(child_node.style.has_auto_trailing_margin(main_axis));
            if child_node.style.display != Display::None {
                last_in_flow = Some(offset);
            }
        }

        let gap = container.main_gap;
        let remaining = line.remaining_free_space;
        let items = line.items_on_line as f32;
        let mut leading_main_dim = 0.0;
        let mut between_main_dim = gap;
        if auto_margin_count == 0 {
            match justify_content {
                Justify::Center => leading_main_dim = remaining / 2.0,
                Justify::FlexEnd => leading_main_dim = remaining,
                Justify::SpaceBetween => {
                    if line.items_on_line > 1 {
                        between_main_dim += float_max(remaining, 0.0) / (items - 1.0);
                    }
                }
                Justify::SpaceEvenly => {
                    leading_main_dim = remaining / (items + 1.0);
                    between_main_dim += leading_main_dim;
                }
                Justify::SpaceAround => {
                    if line.items_on_line > 0 {
                        leading_main_dim = remaining / items / 2.0;
                        between_main_dim += leading_main_dim * 2.0;
                    }
                }
                Justify::FlexStart => {}
            }
        }
        let auto_margin_share = remaining / f32::from(auto_margin_count.max(1));

        line.main_dim = leading_padding_and_border_main + leading_main_dim;
        line.cross_dim = 0.0;
        let can_skip_flex =
            !container.perform_layout && container.measure_mode_cross_dim == MeasureMode::Exactly;
        let is_baseline_layout = self.is_baseline_layout(container.node)?;
        let mut max_ascent = 0.0f32;
        let mut max_descent = 0.0f32;
        let leading_edge = main_axis.leading_edge();

        for (offset, &child) in line_children.iter().enumerate() {
            if last_in_flow == Some(offset) {
                between_main_dim -= gap;
            }
            let child_node = self.tree.node_mut(child)?;
            if child_node.style.display == Display::None {
                continue;
            }
            let is_absolute = child_node.style.position_type == PositionType::Absolute;
            if is_absolute && child_node.is_leading_position_defined(main_axis) {
                if container.perform_layout {
                    let position = child_node.leading_position(main_axis, container.available_inner_main_dim)
                        + leading_border_main
                        + child_node.leading_margin(main_axis, available_inner_width);
                    child_node.layout.set_position(leading_edge, position);
                }
                continue;
            }
            if is_absolute {
                if container.perform_layout {
                    let position =
                        child_node.layout.position(leading_edge) + leading_border_main + leading_main_dim;
                    child_node.layout.set_position(leading_edge, position);
                }
                continue;
            }

            if child_node.style.has_auto_leading_margin(main_axis) {
                line.main_dim += auto_margin_share;
            }
            if container.perform_layout {
                let position = child_node.layout.position(leading_edge) + line.main_dim;
                child_node.layout.set_position(leading_edge, position);
            }
            if child_node.style.has_auto_trailing_margin(main_axis) {
                line.main_dim += auto_margin_share;
            }

            if can_skip_flex {
                line.main_dim += between_main_dim
                    + child_node.margin_for_axis(main_axis, available_inner_width)
                    + child_node.layout.computed_flex_basis.value();
                line.cross_dim = container.available_inner_cross_dim;
                continue;
            }
            line.main_dim += between_main_dim + child_node.dim_with_margin(main_axis, available_inner_width);
            if is_baseline_layout {
                let leading_margin = child_node.leading_margin(FlexDirection::Column, available_inner_width);
                let outer_height = child_node.layout.measured(Dimension::Height)
                    + child_node.margin_for_axis(FlexDirection::Column, available_inner_width);
                let ascent = self.baseline(child)? + leading_margin;
                max_ascent = float_max(max_ascent, ascent);
                max_descent = float_max(max_descent, outer_height - ascent);
            } else {
                line.cross_dim = float_max(
                    line.cross_dim,
                    child_node.dim_with_margin(cross_axis, available_inner_width),
                );
            }
        }

        line.main_dim += trailing_padding_and_border_main;
        if is_baseline_layout {
            line.cross_dim = max_ascent + max_descent;
        }
        Ok(())
    }
}
