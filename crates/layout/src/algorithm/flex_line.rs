//! Splitting children into flex lines.

use super::{FlexContainer, LayoutPass};
use crate::tree::NodeId;
use anyhow::Result;
use sprig_values::{Display, PositionType};

/// Children sharing one line and the running totals of the line.
#[derive(Debug, Default)]
pub(super) struct FlexLine {
    /// In-flow children placed on the line, in order.
    pub relative_children: Vec<NodeId>,
    pub items_on_line: usize,
    /// Outer hypothetical main size of the line, gaps included.
    pub size_consumed: f32,
    pub total_flex_grow_factors: f32,
    /// Sum of `-shrink * basis` over flexible children.
    pub total_flex_shrink_scaled_factors: f32,
    /// Index of the first child of the next line.
    pub end_of_line_index: usize,
    pub remaining_free_space: f32,
    pub main_dim: f32,
    pub cross_dim: f32,
}

impl LayoutPass<'_, '_> {
    /// Gather the next line starting at child `start`.
    pub(super) fn collect_flex_items_row(
        &mut self,
        container: &FlexContainer,
        start: usize,
        line_index: usize,
    ) -> Result<FlexLine> {
        let main_axis = container.main_axis;
        let mut line = FlexLine {
            relative_children: Vec::with_capacity(container.children.len()),
            end_of_line_index: container.children.len(),
            ..FlexLine::default()
        };

        for (index, &child) in container.children.iter().enumerate().skip(start) {
            let child_node = self.tree.node_mut(child)?;
            if child_node.style.display == Display::None
                || child_node.style.position_type == PositionType::Absolute
            {
                continue;
            }
            child_node.layout.line_index = line_index;
            let leading_gap = if line.items_on_line == 0 { 0.0 } else { container.main_gap };
            let outer_margin = child_node.margin_for_axis(main_axis, container.available_inner_width);
            let basis = child_node
                .bound_axis_within_min_and_max(
                    main_axis,
                    child_node.layout.computed_flex_basis,
                    container.main_axis_owner_size,
                )
                .value();
            let outer_size = basis + outer_margin + leading_gap;

            if container.is_wrap
                && line.items_on_line > 0
                && line.size_consumed + outer_size > container.available_inner_main_dim
            {
                line.end_of_line_index = index;
                break;
            }

            line.size_consumed += outer_size;
            line.items_on_line += 1;
            if child_node.is_flexible() {
                line.total_flex_grow_factors += child_node.resolve_flex_grow();
                line.total_flex_shrink_scaled_factors +=
                    -child_node.resolve_flex_shrink() * child_node.layout.computed_flex_basis.value();
            }
            line.relative_children.push(child);
        }

        // Fractional totals below one would amplify the free space.
        if line.total_flex_grow_factors > 0.0 && line.total_flex_grow_factors < 1.0 {
            line.total_flex_grow_factors = 1.0;
        }
        if line.total_flex_shrink_scaled_factors > 0.0 && line.total_flex_shrink_scaled_factors < 1.0 {
            line.total_flex_shrink_scaled_factors = 1.0;
        }
        Ok(line)
    }
}
