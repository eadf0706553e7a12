//! Cross-axis alignment: items within a line, lines within the container,
//! and baselines.

use super::flex_line::FlexLine;
use super::{FlexContainer, LayoutPass, LayoutRequest};
use crate::event::LayoutPassReason;
use crate::node::{BaselineInput, Node};
use crate::tree::NodeId;
use anyhow::Result;
use log::trace;
use sprig_values::{
    Align, Dimension, Display, Edge, FlexDirection, MeasureMode, PositionType, UNDEFINED,
    float_max, floats_equal, is_undefined,
};
use std::rc::Rc;

/// Effective cross alignment of `child` inside `parent`.
///
/// Baseline alignment only exists for row containers.
pub(super) fn align_item(parent: &Node, child: &Node) -> Align {
    let align = if child.style.align_self == Align::Auto {
        parent.style.align_items
    } else {
        child.style.align_self
    };
    if align == Align::Baseline && parent.style.flex_direction.is_column() {
        return Align::FlexStart;
    }
    align
}

impl LayoutPass<'_, '_> {
    /// True when the children of `id` line up on their baselines.
    pub(super) fn is_baseline_layout(&self, id: NodeId) -> Result<bool> {
        let node = self.tree.node(id)?;
        if node.style.flex_direction.is_column() {
            return Ok(false);
        }
        if node.style.align_items == Align::Baseline {
            return Ok(true);
        }
        for &child in &node.children {
            let child_node = self.tree.node(child)?;
            if child_node.style.position_type == PositionType::Relative
                && child_node.style.align_self == Align::Baseline
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Distance from the top of `id` to its first baseline.
    ///
    /// # Errors
    /// Fails if a baseline function returns NaN.
    pub(super) fn baseline(&self, id: NodeId) -> Result<f32> {
        let node = self.tree.node(id)?;
        if let Some(baseline) = node.baseline.as_ref().map(Rc::clone) {
            let value = baseline(&BaselineInput {
                node: id,
                width: node.layout.measured(Dimension::Width),
                height: node.layout.measured(Dimension::Height),
                context: node.context.as_deref(),
                layout_context: self.layout_context,
            });
            trace!(target: "sprig::layout", "[BASELINE] {id} -> {value}");
            if is_undefined(value) {
                return Err(self.tree.violation(id, "Expect custom baseline function to not return NaN"));
            }
            return Ok(value);
        }

        let mut baseline_child = None;
        for &child in &node.children {
            let child_node = self.tree.node(child)?;
            if child_node.layout.line_index > 0 {
                break;
            }
            if child_node.style.position_type == PositionType::Absolute {
                continue;
            }
            if align_item(node, child_node) == Align::Baseline || child_node.is_reference_baseline {
                baseline_child = Some(child);
                break;
            }
            if baseline_child.is_none() {
                baseline_child = Some(child);
            }
        }
        let Some(child) = baseline_child else {
            return Ok(node.layout.measured(Dimension::Height));
        };
        let child_baseline = self.baseline(child)?;
        Ok(child_baseline + self.tree.node(child)?.layout.position(Edge::Top))
    }

    /// Place the children of one line on the cross axis, stretching the
    /// ones that ask for it.
    ///
    /// `line_offset` is the cross position where the line starts.
    #[allow(clippy::too_many_lines, reason = "Stretch and alignment share the per-child walk")]
    pub(super) fn align_items_in_line(
        &mut self,
        container: &FlexContainer,
        line: &FlexLine,
        start: usize,
        container_cross_axis: f32,
        line_offset: f32,
    ) -> Result<()> {
        let main_axis = container.main_axis;
        let cross_axis = container.cross_axis;
        let is_main_axis_row = container.is_main_axis_row;
        let available_inner_width = container.available_inner_width;
        let available_inner_cross_dim = container.available_inner_cross_dim;
        let cross_edge = cross_axis.leading_edge();
        let line_children = container
            .children
            .get(start..line.end_of_line_index)
            .unwrap_or(&[]);

        for &child in line_children {
            let parent = self.tree.node(container.node)?;
            let leading_border_cross = parent.leading_border(cross_axis);
            let cross_does_not_grow = parent.style.align_content != Align::Stretch && container.is_wrap;
            let child_node = self.tree.node(child)?;
            if child_node.style.display == Display::None {
                continue;
            }

            if child_node.style.position_type == PositionType::Absolute {
                let leading_margin = child_node.leading_margin(cross_axis, available_inner_width);
                let mut position = UNDEFINED;
                if child_node.is_leading_position_defined(cross_axis) {
                    position = child_node.leading_position(cross_axis, available_inner_cross_dim)
                        + leading_border_cross
                        + leading_margin;
                }
                if is_undefined(position) {
                    position = leading_border_cross + leading_margin;
                }
                self.tree.node_mut(child)?.layout.set_position(cross_edge, position);
                continue;
            }

            let align = align_item(parent, child_node);
            let has_auto_leading = child_node.style.has_auto_leading_margin(cross_axis);
            let has_auto_trailing = child_node.style.has_auto_trailing_margin(cross_axis);
            let mut leading_cross_dim = 0.0;

            if align == Align::Stretch && !has_auto_leading && !has_auto_trailing {
                if !child_node.is_style_dim_defined(cross_axis, available_inner_cross_dim) {
                    let measured_main = child_node.layout.measured(main_axis.dimension());
                    let aspect_ratio = child_node.style.aspect_ratio;
                    let mut child_cross_size = if aspect_ratio.is_defined() {
                        let derived = if is_main_axis_row {
                            measured_main / aspect_ratio.value()
                        } else {
                            measured_main * aspect_ratio.value()
                        };
                        child_node.margin_for_axis(cross_axis, available_inner_width) + derived
                    } else {
                        line.cross_dim
                    };
                    let mut child_main_size =
                        measured_main + child_node.margin_for_axis(main_axis, available_inner_width);
                    let mut child_main_mode = MeasureMode::Exactly;
                    let mut child_cross_mode = MeasureMode::Exactly;
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
                    trace!(
                        target: "sprig::layout",
                        "[STRETCH] {child} modes {child_main_mode}/{child_cross_mode}"
                    );
                    let (width, height) = if is_main_axis_row {
                        (child_main_size, child_cross_size)
                    } else {
                        (child_cross_size, child_main_size)
                    };
                    let width_mode = if is_undefined(width) || (!is_main_axis_row && cross_does_not_grow) {
                        MeasureMode::Undefined
                    } else {
                        MeasureMode::Exactly
                    };
                    let height_mode = if is_undefined(height) || (is_main_axis_row && cross_does_not_grow) {
                        MeasureMode::Undefined
                    } else {
                        MeasureMode::Exactly
                    };
                    self.layout_node_internal(
                        child,
                        &LayoutRequest {
                            available_width: width,
                            available_height: height,
                            owner_direction: container.direction,
                            width_mode,
                            height_mode,
                            owner_width: available_inner_width,
                            owner_height: container.available_inner_height,
                            perform_layout: true,
                            reason: LayoutPassReason::Stretch,
                        },
                    )?;
                }
            } else {
                let remaining_cross_dim =
                    container_cross_axis - child_node.dim_with_margin(cross_axis, available_inner_width);
                if has_auto_leading && has_auto_trailing {
                    leading_cross_dim += float_max(0.0, remaining_cross_dim / 2.0);
                } else if has_auto_trailing {
                    // Pushed to the start by its trailing auto margin.
                } else if has_auto_leading {
                    leading_cross_dim += float_max(0.0, remaining_cross_dim);
                } else if align == Align::FlexStart {
                    // Already at the start.
                } else if align == Align::Center {
                    leading_cross_dim += remaining_cross_dim / 2.0;
                } else {
                    leading_cross_dim += remaining_cross_dim;
                }
            }

            let child_mut = self.tree.node_mut(child)?;
            let position = child_mut.layout.position(cross_edge) + line_offset + leading_cross_dim;
            child_mut.layout.set_position(cross_edge, position);
        }
        Ok(())
    }

    /// Distribute lines along the cross axis and align items within each
    /// line's final extent.
    #[allow(clippy::too_many_lines, reason = "Line measurement and placement share state")]
    pub(super) fn align_content(
        &mut self,
        container: &FlexContainer,
        line_count: usize,
        total_line_cross_dim: f32,
        leading_padding_and_border_cross: f32,
        cross_gap: f32,
    ) -> Result<()> {
        let main_axis = container.main_axis;
        let cross_axis = container.cross_axis;
        let is_main_axis_row = container.is_main_axis_row;
        let available_inner_width = container.available_inner_width;
        let available_inner_cross_dim = container.available_inner_cross_dim;
        let lines = line_count as f32;
        let align_content = self.tree.node(container.node)?.style.align_content;

        let mut cross_dim_lead = 0.0;
        let mut current_lead = leading_padding_and_border_cross;
        if !is_undefined(available_inner_cross_dim) {
            let remaining = available_inner_cross_dim - total_line_cross_dim;
            let has_room = available_inner_cross_dim > total_line_cross_dim;
            match align_content {
                Align::FlexEnd => current_lead += remaining,
                Align::Center => current_lead += remaining / 2.0,
                Align::Stretch => {
                    if has_room {
                        cross_dim_lead = remaining / lines;
                    }
                }
                Align::SpaceAround => {
                    if has_room {
                        current_lead += remaining / (2.0 * lines);
                        if line_count > 1 {
                            cross_dim_lead = remaining / lines;
                        }
                    } else {
                        current_lead += remaining / 2.0;
                    }
                }
                Align::SpaceBetween => {
                    if has_room && line_count > 1 {
                        cross_dim_lead = remaining / (lines - 1.0);
                    }
                }
                Align::Auto | Align::FlexStart | Align::Baseline => {}
            }
        }

        let children = &container.children;
        let mut end_index = 0;
        for line_index in 0..line_count {
            let start_index = end_index;
            let mut line_height = 0.0f32;
            let mut max_ascent = 0.0f32;
            let mut max_descent = 0.0f32;
            end_index = children.len();
            for (index, &child) in children.iter().enumerate().skip(start_index) {
                let parent = self.tree.node(container.node)?;
                let child_node = self.tree.node(child)?;
                if child_node.style.display == Display::None
                    || child_node.style.position_type == PositionType::Absolute
                {
                    continue;
                }
                if child_node.layout.line_index != line_index {
                    end_index = index;
                    break;
                }
                if child_node.is_layout_dim_defined(cross_axis) {
                    line_height = float_max(
                        line_height,
                        child_node.dim_with_margin(cross_axis, available_inner_width),
                    );
                }
                if align_item(parent, child_node) == Align::Baseline {
                    let ascent = self.baseline(child)?
                        + child_node.leading_margin(FlexDirection::Column, available_inner_width);
                    let descent = child_node.layout.measured(Dimension::Height)
                        + child_node.margin_for_axis(FlexDirection::Column, available_inner_width)
                        - ascent;
                    max_ascent = float_max(max_ascent, ascent);
                    max_descent = float_max(max_descent, descent);
                    line_height = float_max(line_height, max_ascent + max_descent);
                }
            }
            line_height += cross_dim_lead;
            if line_index != 0 {
                current_lead += cross_gap;
            }

            let cross_edge = cross_axis.leading_edge();
            for &child in children.get(start_index..end_index).unwrap_or(&[]) {
                let parent = self.tree.node(container.node)?;
                let child_node = self.tree.node(child)?;
                if child_node.style.display == Display::None
                    || child_node.style.position_type == PositionType::Absolute
                {
                    continue;
                }
                let measured_cross = child_node.layout.measured(cross_axis.dimension());
                let leading_margin = child_node.leading_margin(cross_axis, available_inner_width);
                match align_item(parent, child_node) {
                    Align::FlexStart => {
                        self.set_position(child, cross_edge, current_lead + leading_margin)?;
                    }
                    Align::FlexEnd => {
                        let position = current_lead + line_height
                            - child_node.trailing_margin(cross_axis, available_inner_width)
                            - measured_cross;
                        self.set_position(child, cross_edge, position)?;
                    }
                    Align::Center => {
                        self.set_position(child, cross_edge, current_lead + (line_height - measured_cross) / 2.0)?;
                    }
                    Align::Stretch => {
                        let needs_relayout =
                            !child_node.is_style_dim_defined(cross_axis, available_inner_cross_dim);
                        let measured = child_node.measured_size();
                        let main_margin = child_node.margin_for_axis(main_axis, available_inner_width);
                        self.set_position(child, cross_edge, current_lead + leading_margin)?;
                        if needs_relayout {
                            let (width, height) = if is_main_axis_row {
                                (measured.width + main_margin, line_height)
                            } else {
                                (line_height, measured.height + main_margin)
                            };
                            if !(floats_equal(width, measured.width) && floats_equal(height, measured.height)) {
                                self.layout_node_internal(
                                    child,
                                    &LayoutRequest {
                                        available_width: width,
                                        available_height: height,
                                        owner_direction: container.direction,
                                        width_mode: MeasureMode::Exactly,
                                        height_mode: MeasureMode::Exactly,
                                        owner_width: available_inner_width,
                                        owner_height: container.available_inner_height,
                                        perform_layout: true,
                                        reason: LayoutPassReason::MultilineStretch,
                                    },
                                )?;
                            }
                        }
                    }
                    Align::Baseline => {
                        let position = current_lead + max_ascent - self.baseline(child)?
                            + child_node.leading_position(FlexDirection::Column, available_inner_cross_dim);
                        self.set_position(child, Edge::Top, position)?;
                    }
                    Align::Auto | Align::SpaceBetween | Align::SpaceAround => {}
                }
            }
            current_lead += line_height;
        }
        Ok(())
    }

    fn set_position(&mut self, id: NodeId, edge: Edge, value: f32) -> Result<()> {
        self.tree.node_mut(id)?.layout.set_position(edge, value);
        Ok(())
    }
}
