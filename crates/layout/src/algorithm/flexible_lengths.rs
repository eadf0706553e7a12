//! Distribution of free space among flexible children.

use super::cross_axis::align_item;
use super::flex_line::FlexLine;
use super::{FlexContainer, LayoutPass, LayoutRequest};
use crate::event::LayoutPassReason;
use anyhow::Result;
use sprig_values::{Align, MeasureMode, Unit, floats_equal, is_undefined};

impl LayoutPass<'_, '_> {
    /// Grow or shrink the children of `line` and lay them out at their
    /// final main size.
    pub(super) fn resolve_flexible_length(&mut self, container: &FlexContainer, line: &mut FlexLine) -> Result<()> {
        let original_free_space = line.remaining_free_space;
        self.distribute_free_space_first_pass(container, line)?;
        let distributed = self.distribute_free_space_second_pass(container, line)?;
        line.remaining_free_space = original_free_space - distributed;
        Ok(())
    }

    /// Freeze children whose min/max constraints clamp their share, and
    /// take them out of the factor totals.
    fn distribute_free_space_first_pass(&self, container: &FlexContainer, line: &mut FlexLine) -> Result<()> {
        let main_axis = container.main_axis;
        let mut delta_free_space = 0.0;
        for &child in &line.relative_children {
            let child_node = self.tree.node(child)?;
            let child_flex_basis = child_node
                .bound_axis_within_min_and_max(
                    main_axis,
                    child_node.layout.computed_flex_basis,
                    container.main_axis_owner_size,
                )
                .value();

            let (factor, total) = if line.remaining_free_space < 0.0 {
                (
                    -child_node.resolve_flex_shrink() * child_flex_basis,
                    line.total_flex_shrink_scaled_factors,
                )
            } else if line.remaining_free_space > 0.0 {
                (child_node.resolve_flex_grow(), line.total_flex_grow_factors)
            } else {
                continue;
            };
            if is_undefined(factor) || factor == 0.0 {
                continue;
            }
            let base_main_size = child_flex_basis + line.remaining_free_space / total * factor;
            let bound_main_size = child_node.bound_axis(
                main_axis,
                base_main_size,
                container.available_inner_main_dim,
                container.available_inner_width,
            );
            if !is_undefined(base_main_size)
                && !is_undefined(bound_main_size)
                && !floats_equal(base_main_size, bound_main_size)
            {
                delta_free_space += bound_main_size - child_flex_basis;
                if line.remaining_free_space < 0.0 {
                    line.total_flex_shrink_scaled_factors -= factor;
                } else {
                    line.total_flex_grow_factors -= factor;
                }
            }
        }
        line.remaining_free_space -= delta_free_space;
        Ok(())
    }

    /// Size every child of the line and lay it out.
    ///
    /// Returns the space consumed beyond the children's bases.
    #[allow(clippy::too_many_lines, reason = "Main and cross constraints are derived together")]
    fn distribute_free_space_second_pass(&mut self, container: &FlexContainer, line: &FlexLine) -> Result<f32> {
        let main_axis = container.main_axis;
        let cross_axis = container.cross_axis;
        let is_main_axis_row = container.is_main_axis_row;
        let available_inner_width = container.available_inner_width;
        let available_inner_cross_dim = container.available_inner_cross_dim;
        let mut delta_free_space = 0.0;

        for &child in &line.relative_children {
            let parent = self.tree.node(container.node)?;
            let child_node = self.tree.node(child)?;
            let child_flex_basis = child_node
                .bound_axis_within_min_and_max(
                    main_axis,
                    child_node.layout.computed_flex_basis,
                    container.main_axis_owner_size,
                )
                .value();
            let mut updated_main_size = child_flex_basis;

            if line.remaining_free_space < 0.0 {
                let shrink_scaled_factor = -child_node.resolve_flex_shrink() * child_flex_basis;
                if shrink_scaled_factor != 0.0 {
                    let child_size = if line.total_flex_shrink_scaled_factors == 0.0 {
                        child_flex_basis + shrink_scaled_factor
                    } else {
                        child_flex_basis
                            + (line.remaining_free_space / line.total_flex_shrink_scaled_factors)
                                * shrink_scaled_factor
                    };
                    updated_main_size = child_node.bound_axis(
                        main_axis,
                        child_size,
                        container.available_inner_main_dim,
                        available_inner_width,
                    );
                }
            } else if line.remaining_free_space > 0.0 {
                let grow_factor = child_node.resolve_flex_grow();
                if !is_undefined(grow_factor) && grow_factor != 0.0 {
                    updated_main_size = child_node.bound_axis(
                        main_axis,
                        child_flex_basis
                            + line.remaining_free_space / line.total_flex_grow_factors * grow_factor,
                        container.available_inner_main_dim,
                        available_inner_width,
                    );
                }
            }
            delta_free_space += updated_main_size - child_flex_basis;

            let margin_main = child_node.margin_for_axis(main_axis, available_inner_width);
            let margin_cross = child_node.margin_for_axis(cross_axis, available_inner_width);
            let mut child_main_size = updated_main_size + margin_main;
            let mut child_main_mode = MeasureMode::Exactly;

            let stretches = align_item(parent, child_node) == Align::Stretch
                && !child_node.style.has_auto_leading_margin(cross_axis)
                && !child_node.style.has_auto_trailing_margin(cross_axis);
            let cross_style_defined = child_node.is_style_dim_defined(cross_axis, available_inner_cross_dim);
            let aspect_ratio = child_node.style.aspect_ratio;

            let (mut child_cross_size, mut child_cross_mode) = if aspect_ratio.is_defined() {
                let inner_main = child_main_size - margin_main;
                let cross = if is_main_axis_row {
                    inner_main / aspect_ratio.value()
                } else {
                    inner_main * aspect_ratio.value()
                };
                (cross + margin_cross, MeasureMode::Exactly)
            } else if !is_undefined(available_inner_cross_dim)
                && !cross_style_defined
                && container.measure_mode_cross_dim == MeasureMode::Exactly
                && !(container.is_wrap && container.flex_basis_overflows)
                && stretches
            {
                (available_inner_cross_dim, MeasureMode::Exactly)
            } else if !cross_style_defined {
                let mode = if is_undefined(available_inner_cross_dim) {
                    MeasureMode::Undefined
                } else {
                    MeasureMode::AtMost
                };
                (available_inner_cross_dim, mode)
            } else {
                let resolved = child_node.style.resolved_dimension(cross_axis.dimension());
                let size = resolved.resolve(available_inner_cross_dim).value() + margin_cross;
                let loose_percentage =
                    resolved.unit == Unit::Percent && container.measure_mode_cross_dim != MeasureMode::Exactly;
                let mode = if is_undefined(size) || loose_percentage {
                    MeasureMode::Undefined
                } else {
                    MeasureMode::Exactly
                };
                (size, mode)
            };

            (child_main_mode, child_main_size) = child_node.constrain_max_size_for_mode(
                main_axis,
                container.available_inner_main_dim,
                available_inner_width,
                child_main_mode,
                child_main_size,
            );
            (child_cross_mode, child_cross_size) = child_node.constrain_max_size_for_mode(
                cross_axis,
                available_inner_cross_dim,
                available_inner_width,
                child_cross_mode,
                child_cross_size,
            );

            let requires_stretch_layout = !cross_style_defined && stretches;
            let is_layout_pass = container.perform_layout && !requires_stretch_layout;
            let (width, width_mode, height, height_mode) = if is_main_axis_row {
                (child_main_size, child_main_mode, child_cross_size, child_cross_mode)
            } else {
                (child_cross_size, child_cross_mode, child_main_size, child_main_mode)
            };
            let owner_direction = parent.layout.direction;

            self.layout_node_internal(
                child,
                &LayoutRequest {
                    available_width: width,
                    available_height: height,
                    owner_direction,
                    width_mode,
                    height_mode,
                    owner_width: available_inner_width,
                    owner_height: container.available_inner_height,
                    perform_layout: is_layout_pass,
                    reason: if is_layout_pass {
                        LayoutPassReason::FlexLayout
                    } else {
                        LayoutPassReason::FlexMeasure
                    },
                },
            )?;

            if self.tree.node(child)?.layout.had_overflow {
                self.tree.node_mut(container.node)?.layout.had_overflow = true;
            }
        }
        Ok(delta_free_space)
    }
}
