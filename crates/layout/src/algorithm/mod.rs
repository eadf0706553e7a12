//! The flexbox layout algorithm.
//!
//! A pass walks the tree top-down. Every node visit goes through
//! [`LayoutPass::layout_node_internal`], which answers from the node's cache
//! when the constraints allow it and otherwise runs the full algorithm.
//! Measurement visits (`perform_layout == false`) only compute a size;
//! layout visits also position every child.

mod absolute;
mod cache;
mod cross_axis;
mod flex_basis;
mod flex_line;
mod flexible_lengths;
mod justify;
mod leaf;
mod rounding;

use crate::layout::{CachedMeasurement, MAX_CACHED_MEASUREMENTS};
use crate::event::{LayoutEvent, LayoutListener, LayoutPassReason, LayoutStats, LayoutType};
use crate::node::{Children, Node};
use crate::print::{PrintOptions, node_to_string};
use crate::tree::{LayoutTree, NodeId};
use anyhow::Result;
use core::any::Any;
use log::debug;
use sprig_values::{
    Dimension, Direction, Display, Edge, FlexDirection, FloatOptional, LogLevel, MeasureMode, Overflow,
    PositionType, Wrap, float_max, float_min, is_undefined,
};
use std::rc::Rc;
use tracing::info_span;

/// Constraints for one visit of a node.
#[derive(Copy, Clone, Debug)]
pub(crate) struct LayoutRequest {
    pub available_width: f32,
    pub available_height: f32,
    pub owner_direction: Direction,
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
    pub owner_width: f32,
    pub owner_height: f32,
    pub perform_layout: bool,
    pub reason: LayoutPassReason,
}

/// Quantities of a container shared by the steps laying out its children.
#[derive(Debug)]
pub(crate) struct FlexContainer {
    pub node: NodeId,
    pub children: Children,
    pub direction: Direction,
    pub main_axis: FlexDirection,
    pub cross_axis: FlexDirection,
    pub is_main_axis_row: bool,
    pub is_wrap: bool,
    pub perform_layout: bool,
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
    pub owner_width: f32,
    pub main_axis_owner_size: f32,
    pub cross_axis_owner_size: f32,
    pub available_inner_width: f32,
    pub available_inner_height: f32,
    /// Narrowed per line when the container sizes to its content.
    pub available_inner_main_dim: f32,
    pub available_inner_cross_dim: f32,
    pub measure_mode_main_dim: MeasureMode,
    pub measure_mode_cross_dim: MeasureMode,
    pub flex_basis_overflows: bool,
    pub main_gap: f32,
}

impl FlexContainer {
    /// Inner size along `axis`, used as the owner size of children.
    pub fn available_inner(&self, axis: FlexDirection) -> f32 {
        if axis.is_row() {
            self.available_inner_width
        } else {
            self.available_inner_height
        }
    }
}

/// State of one top-level layout pass.
pub(crate) struct LayoutPass<'tree, 'ctx> {
    tree: &'tree mut LayoutTree,
    generation: u32,
    layout_context: Option<&'ctx dyn Any>,
    stats: LayoutStats,
    listener: Option<LayoutListener>,
}

impl LayoutTree {
    /// Lay out the subtree rooted at `root` within the owner size.
    ///
    /// Pass NaN for an owner dimension that is unconstrained.
    ///
    /// # Errors
    /// Returns an error if a node is stale or a callback breaks its contract.
    pub fn calculate_layout(
        &mut self,
        root: NodeId,
        owner_width: f32,
        owner_height: f32,
        owner_direction: Direction,
    ) -> Result<()> {
        self.calculate_layout_with_context(root, owner_width, owner_height, owner_direction, None)
    }

    /// Like [`LayoutTree::calculate_layout`], forwarding `layout_context` to
    /// every measure and baseline callback.
    ///
    /// # Errors
    /// Returns an error if a node is stale or a callback breaks its contract.
    pub fn calculate_layout_with_context(
        &mut self,
        root: NodeId,
        owner_width: f32,
        owner_height: f32,
        owner_direction: Direction,
        layout_context: Option<&dyn Any>,
    ) -> Result<()> {
        let _span = info_span!("layout.calculate", root = %root).entered();
        self.node(root)?;
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let listener = self.listener.as_ref().map(Rc::clone);
        if let Some(listener) = &listener {
            listener(&LayoutEvent::PassStart { root });
        }

        let mut pass = LayoutPass {
            tree: self,
            generation,
            layout_context,
            stats: LayoutStats::default(),
            listener: listener.as_ref().map(Rc::clone),
        };
        pass.layout_root(root, owner_width, owner_height, owner_direction)?;
        let stats = pass.stats;

        tracing::debug!(
            layouts = stats.layouts,
            measures = stats.measures,
            cached_layouts = stats.cached_layouts,
            cached_measures = stats.cached_measures,
            measure_callbacks = stats.measure_callbacks,
            "layout pass finished"
        );
        if let Some(listener) = &listener {
            listener(&LayoutEvent::PassEnd {
                root,
                stats: &stats,
            });
        }
        self.last_stats = stats;

        let root_node = self.node(root)?;
        if root_node.config.print_tree() {
            let config = Rc::clone(&root_node.config);
            let printed = node_to_string(self, root, PrintOptions::all())?;
            config.log(Some(root), LogLevel::Debug, &printed);
        }
        Ok(())
    }
}

impl LayoutPass<'_, '_> {
    fn node(&self, id: NodeId) -> Result<&Node> {
        self.tree.node(id)
    }

    fn emit(&self, event: &LayoutEvent<'_>) {
        if let Some(listener) = &self.listener {
            listener(event);
        }
    }

    fn layout_root(
        &mut self,
        root: NodeId,
        owner_width: f32,
        owner_height: f32,
        owner_direction: Direction,
    ) -> Result<()> {
        let node = self.node(root)?;
        let (width, width_mode) = if node.is_style_dim_defined(FlexDirection::Row, owner_width) {
            let width = node
                .style
                .resolved_dimension(Dimension::Width)
                .resolve(owner_width)
                .value()
                + node.margin_for_axis(FlexDirection::Row, owner_width);
            (width, MeasureMode::Exactly)
        } else {
            let max_width = node.style.max_dimension(Dimension::Width).resolve(owner_width);
            if max_width.is_defined() {
                (max_width.value(), MeasureMode::AtMost)
            } else if is_undefined(owner_width) {
                (owner_width, MeasureMode::Undefined)
            } else {
                (owner_width, MeasureMode::Exactly)
            }
        };
        let (height, height_mode) = if node.is_style_dim_defined(FlexDirection::Column, owner_height) {
            let height = node
                .style
                .resolved_dimension(Dimension::Height)
                .resolve(owner_height)
                .value()
                + node.margin_for_axis(FlexDirection::Column, owner_width);
            (height, MeasureMode::Exactly)
        } else {
            let max_height = node.style.max_dimension(Dimension::Height).resolve(owner_height);
            if max_height.is_defined() {
                (max_height.value(), MeasureMode::AtMost)
            } else if is_undefined(owner_height) {
                (owner_height, MeasureMode::Undefined)
            } else {
                (owner_height, MeasureMode::Exactly)
            }
        };

        self.layout_node_internal(
            root,
            &LayoutRequest {
                available_width: width,
                available_height: height,
                owner_direction,
                width_mode,
                height_mode,
                owner_width,
                owner_height,
                perform_layout: true,
                reason: LayoutPassReason::Initial,
            },
        )?;

        // A fully cached root still gets positioned and rounded so repeated
        // passes produce identical output.
        let laid_out = self.tree.node_mut(root)?;
        let direction = laid_out.layout.direction;
        laid_out.set_position(direction, owner_width, owner_height, owner_width);
        let scale = f64::from(laid_out.config.point_scale_factor());
        self.round_to_pixel_grid(root, scale, 0.0, 0.0)
    }

    /// Visit `id` under `request`, reusing cached results when possible.
    ///
    /// Returns true when the node's layout was actually recomputed.
    pub(crate) fn layout_node_internal(&mut self, id: NodeId, request: &LayoutRequest) -> Result<bool> {
        let generation = self.generation;
        let node = self.tree.node_mut(id)?;
        let need_to_visit = (node.is_dirty && node.layout.generation_count != generation)
            || node.layout.last_owner_direction != Some(request.owner_direction);
        if need_to_visit {
            node.layout.invalidate_cache();
        }
        let cached = cache::find_cached(node, request);

        if !need_to_visit && let Some((entry, slot)) = cached {
            node.layout.set_measured(Dimension::Width, entry.computed_width);
            node.layout.set_measured(Dimension::Height, entry.computed_height);
            let layout_type = if request.perform_layout {
                self.stats.cached_layouts += 1;
                LayoutType::CachedLayout
            } else {
                self.stats.cached_measures += 1;
                LayoutType::CachedMeasure
            };
            debug!(
                target: "sprig::cache",
                "[CACHE] {id} hit {:?} w={} ({}) h={} ({}) -> {}x{}",
                slot,
                request.available_width,
                request.width_mode,
                request.available_height,
                request.height_mode,
                entry.computed_width,
                entry.computed_height,
            );
            self.emit(&LayoutEvent::NodeLayout {
                node: id,
                layout_type,
                reason: request.reason,
            });
        } else {
            self.layout_impl(id, request)?;
            let entry = CachedMeasurement {
                available_width: request.available_width,
                available_height: request.available_height,
                width_measure_mode: request.width_mode,
                height_measure_mode: request.height_mode,
                computed_width: 0.0,
                computed_height: 0.0,
            };
            let visited = self.tree.node_mut(id)?;
            visited.layout.last_owner_direction = Some(request.owner_direction);
            if cached.is_none() {
                let layout = &mut visited.layout;
                let used_slots = u32::try_from(layout.next_cached_measurements_index + 1).unwrap_or(u32::MAX);
                self.stats.max_measure_cache = self.stats.max_measure_cache.max(used_slots);
                if layout.next_cached_measurements_index == MAX_CACHED_MEASUREMENTS {
                    debug!(target: "sprig::cache", "[CACHE] {id} out of cache entries");
                    layout.next_cached_measurements_index = 0;
                }
                let entry = CachedMeasurement {
                    computed_width: layout.measured(Dimension::Width),
                    computed_height: layout.measured(Dimension::Height),
                    ..entry
                };
                if request.perform_layout {
                    layout.cached_layout = Some(entry);
                } else {
                    layout.cached_measurements[layout.next_cached_measurements_index] = entry;
                    layout.next_cached_measurements_index += 1;
                }
            }
            let layout_type = if request.perform_layout { LayoutType::Layout } else { LayoutType::Measure };
            self.emit(&LayoutEvent::NodeLayout {
                node: id,
                layout_type,
                reason: request.reason,
            });
        }

        let finished = self.tree.node_mut(id)?;
        if request.perform_layout {
            let width = finished.layout.measured(Dimension::Width);
            let height = finished.layout.measured(Dimension::Height);
            finished.layout.set_dimension(Dimension::Width, width);
            finished.layout.set_dimension(Dimension::Height, height);
            finished.has_new_layout = true;
            finished.set_dirty(false);
        }
        finished.layout.generation_count = generation;
        Ok(need_to_visit || cached.is_none())
    }

    /// Record resolved box-model edges on the node's layout.
    fn record_box_model(&mut self, id: NodeId, owner_direction: Direction, owner_width: f32) -> Result<Direction> {
        let node = self.tree.node_mut(id)?;
        let direction = node.resolve_direction(owner_direction);
        node.layout.direction = direction;
        let flex_row = FlexDirection::Row.resolve(direction);
        let flex_column = FlexDirection::Column.resolve(direction);
        let (start_edge, end_edge) = if direction == Direction::Rtl {
            (Edge::Right, Edge::Left)
        } else {
            (Edge::Left, Edge::Right)
        };
        let sides = [
            (start_edge, flex_row, true),
            (end_edge, flex_row, false),
            (Edge::Top, flex_column, true),
            (Edge::Bottom, flex_column, false),
        ];
        for (edge, axis, leading) in sides {
            let (margin, border, padding) = if leading {
                (
                    node.leading_margin(axis, owner_width),
                    node.leading_border(axis),
                    node.leading_padding(axis, owner_width),
                )
            } else {
                (
                    node.trailing_margin(axis, owner_width),
                    node.trailing_border(axis),
                    node.trailing_padding(axis, owner_width),
                )
            };
            let slot = edge.index();
            node.layout.margin[slot] = margin;
            node.layout.border[slot] = border;
            node.layout.padding[slot] = padding;
        }
        Ok(direction)
    }

    /// The flexbox algorithm proper for one node.
    #[allow(clippy::too_many_lines, reason = "Steps of the algorithm read best in sequence")]
    fn layout_impl(&mut self, id: NodeId, request: &LayoutRequest) -> Result<()> {
        if request.perform_layout {
            self.stats.layouts += 1;
        } else {
            self.stats.measures += 1;
        }
        let direction = self.record_box_model(id, request.owner_direction, request.owner_width)?;

        let target = self.node(id)?;
        if target.has_measure_func() {
            return self.measure_with_measure_func(id, request);
        }
        if target.children.is_empty() {
            return self.measure_empty_container(id, request);
        }
        if !request.perform_layout && self.measure_fixed_size(id, request)? {
            return Ok(());
        }

        self.tree.clone_children_if_needed(id)?;
        let node = self.tree.node_mut(id)?;
        node.layout.had_overflow = false;

        // Step 1: axes and box model.
        let owner_width = request.owner_width;
        let main_axis = node.style.flex_direction.resolve(direction);
        let cross_axis = main_axis.cross(direction);
        let is_main_axis_row = main_axis.is_row();
        let is_wrap = node.style.flex_wrap != Wrap::NoWrap;
        let (main_axis_owner_size, cross_axis_owner_size) = if is_main_axis_row {
            (request.owner_width, request.owner_height)
        } else {
            (request.owner_height, request.owner_width)
        };
        let padding_and_border_main = node.padding_and_border_for_axis(main_axis, owner_width);
        let padding_and_border_cross = node.padding_and_border_for_axis(cross_axis, owner_width);
        let (measure_mode_main_dim, measure_mode_cross_dim) = if is_main_axis_row {
            (request.width_mode, request.height_mode)
        } else {
            (request.height_mode, request.width_mode)
        };
        let (padding_and_border_row, padding_and_border_column) = if is_main_axis_row {
            (padding_and_border_main, padding_and_border_cross)
        } else {
            (padding_and_border_cross, padding_and_border_main)
        };
        let margin_row = node.margin_for_axis(FlexDirection::Row, owner_width);
        let margin_column = node.margin_for_axis(FlexDirection::Column, owner_width);
        let min_inner = |dimension: Dimension, owner: f32, padding_and_border: f32| {
            node.style.min_dimension(dimension).resolve(owner).value() - padding_and_border
        };
        let max_inner = |dimension: Dimension, owner: f32, padding_and_border: f32| {
            node.style.max_dimension(dimension).resolve(owner).value() - padding_and_border
        };
        let (min_inner_main_dim, max_inner_main_dim) = if is_main_axis_row {
            (
                min_inner(Dimension::Width, request.owner_width, padding_and_border_row),
                max_inner(Dimension::Width, request.owner_width, padding_and_border_row),
            )
        } else {
            (
                min_inner(Dimension::Height, request.owner_height, padding_and_border_column),
                max_inner(Dimension::Height, request.owner_height, padding_and_border_column),
            )
        };

        // Step 2: available space for children.
        let available_inner_width =
            node.available_inner_dim(FlexDirection::Row, request.available_width, request.owner_width);
        let available_inner_height = node.available_inner_dim(
            FlexDirection::Column,
            request.available_height,
            request.owner_height,
        );
        let (available_inner_main_dim, available_inner_cross_dim) = if is_main_axis_row {
            (available_inner_width, available_inner_height)
        } else {
            (available_inner_height, available_inner_width)
        };
        let leading_padding_and_border_cross = node.leading_padding_and_border(cross_axis, owner_width);
        let main_gap = node.gap_for_axis(main_axis, available_inner_width);
        let cross_gap = node.gap_for_axis(cross_axis, available_inner_width);
        let overflow = node.style.overflow;
        let use_legacy_stretch = node.config.use_legacy_stretch_behaviour();
        let node_flex_grow = node.resolve_flex_grow();

        let mut container = FlexContainer {
            node: id,
            children: node.children.clone(),
            direction,
            main_axis,
            cross_axis,
            is_main_axis_row,
            is_wrap,
            perform_layout: request.perform_layout,
            width_mode: request.width_mode,
            height_mode: request.height_mode,
            owner_width,
            main_axis_owner_size,
            cross_axis_owner_size,
            available_inner_width,
            available_inner_height,
            available_inner_main_dim,
            available_inner_cross_dim,
            measure_mode_main_dim,
            measure_mode_cross_dim,
            flex_basis_overflows: false,
            main_gap,
        };

        // Step 3: flex basis of every child.
        let total_outer_flex_basis = self.compute_flex_basis_for_children(&container)?;
        container.flex_basis_overflows = measure_mode_main_dim != MeasureMode::Undefined
            && total_outer_flex_basis > available_inner_main_dim;
        if is_wrap && container.flex_basis_overflows && measure_mode_main_dim == MeasureMode::AtMost {
            container.measure_mode_main_dim = MeasureMode::Exactly;
        }

        // Step 4: lines.
        let child_count = container.children.len();
        let mut start_of_line_index = 0;
        let mut line_count = 0;
        let mut total_line_cross_dim = 0.0f32;
        let mut max_line_main_dim = 0.0f32;
        while start_of_line_index < child_count {
            let mut line = self.collect_flex_items_row(&container, start_of_line_index, line_count)?;
            let can_skip_flex =
                !request.perform_layout && container.measure_mode_cross_dim == MeasureMode::Exactly;

            let mut size_based_on_content = false;
            if container.measure_mode_main_dim != MeasureMode::Exactly {
                if !is_undefined(min_inner_main_dim) && line.size_consumed < min_inner_main_dim {
                    container.available_inner_main_dim = min_inner_main_dim;
                } else if !is_undefined(max_inner_main_dim) && line.size_consumed > max_inner_main_dim {
                    container.available_inner_main_dim = max_inner_main_dim;
                } else {
                    if !use_legacy_stretch
                        && (line.total_flex_grow_factors == 0.0 || node_flex_grow == 0.0)
                    {
                        container.available_inner_main_dim = line.size_consumed;
                    }
                    size_based_on_content = !use_legacy_stretch;
                }
            }
            if !size_based_on_content && !is_undefined(container.available_inner_main_dim) {
                line.remaining_free_space = container.available_inner_main_dim - line.size_consumed;
            } else if line.size_consumed < 0.0 {
                line.remaining_free_space = -line.size_consumed;
            }

            // Steps 5 and 6: flexible lengths and main axis placement.
            if !can_skip_flex {
                self.resolve_flexible_length(&container, &mut line)?;
            }
            if line.remaining_free_space < 0.0 {
                self.tree.node_mut(id)?.layout.had_overflow = true;
            }
            self.justify_main_axis(&container, &mut line, start_of_line_index)?;

            let line_owner = self.node(id)?;
            let mut container_cross_axis = container.available_inner_cross_dim;
            if matches!(
                container.measure_mode_cross_dim,
                MeasureMode::Undefined | MeasureMode::AtMost
            ) {
                container_cross_axis = line_owner.bound_axis(
                    cross_axis,
                    line.cross_dim + padding_and_border_cross,
                    cross_axis_owner_size,
                    owner_width,
                ) - padding_and_border_cross;
            }
            if !is_wrap && container.measure_mode_cross_dim == MeasureMode::Exactly {
                line.cross_dim = container.available_inner_cross_dim;
            }
            line.cross_dim = line_owner.bound_axis(
                cross_axis,
                line.cross_dim + padding_and_border_cross,
                cross_axis_owner_size,
                owner_width,
            ) - padding_and_border_cross;

            // Step 7: cross axis placement within the line.
            if request.perform_layout {
                self.align_items_in_line(
                    &container,
                    &line,
                    start_of_line_index,
                    container_cross_axis,
                    total_line_cross_dim + leading_padding_and_border_cross,
                )?;
            }

            let applied_cross_gap = if line_count == 0 { 0.0 } else { cross_gap };
            total_line_cross_dim += line.cross_dim + applied_cross_gap;
            max_line_main_dim = float_max(max_line_main_dim, line.main_dim);
            line_count += 1;
            start_of_line_index = line.end_of_line_index;
        }

        // Step 8: multi-line content alignment.
        if request.perform_layout && (is_wrap || self.is_baseline_layout(id)?) {
            self.align_content(
                &container,
                line_count,
                total_line_cross_dim,
                leading_padding_and_border_cross,
                cross_gap,
            )?;
        }

        // Step 9: final container size.
        let container_node = self.tree.node_mut(id)?;
        let width = container_node.bound_axis(
            FlexDirection::Row,
            request.available_width - margin_row,
            request.owner_width,
            owner_width,
        );
        let height = container_node.bound_axis(
            FlexDirection::Column,
            request.available_height - margin_column,
            request.owner_height,
            owner_width,
        );
        container_node.layout.set_measured(Dimension::Width, width);
        container_node.layout.set_measured(Dimension::Height, height);

        let main_mode = container.measure_mode_main_dim;
        if main_mode == MeasureMode::Undefined
            || (overflow != Overflow::Scroll && main_mode == MeasureMode::AtMost)
        {
            let size = container_node.bound_axis(main_axis, max_line_main_dim, main_axis_owner_size, owner_width);
            container_node.layout.set_measured(main_axis.dimension(), size);
        } else if main_mode == MeasureMode::AtMost && overflow == Overflow::Scroll {
            let content = container_node
                .bound_axis_within_min_and_max(
                    main_axis,
                    FloatOptional::new(max_line_main_dim),
                    main_axis_owner_size,
                )
                .value();
            let size = float_max(
                float_min(container.available_inner_main_dim + padding_and_border_main, content),
                padding_and_border_main,
            );
            container_node.layout.set_measured(main_axis.dimension(), size);
        }

        let cross_mode = container.measure_mode_cross_dim;
        if cross_mode == MeasureMode::Undefined
            || (overflow != Overflow::Scroll && cross_mode == MeasureMode::AtMost)
        {
            let size = container_node.bound_axis(
                cross_axis,
                total_line_cross_dim + padding_and_border_cross,
                cross_axis_owner_size,
                owner_width,
            );
            container_node.layout.set_measured(cross_axis.dimension(), size);
        } else if cross_mode == MeasureMode::AtMost && overflow == Overflow::Scroll {
            let content = container_node
                .bound_axis_within_min_and_max(
                    cross_axis,
                    FloatOptional::new(total_line_cross_dim + padding_and_border_cross),
                    cross_axis_owner_size,
                )
                .value();
            let size = float_max(
                float_min(
                    container.available_inner_cross_dim + padding_and_border_cross,
                    content,
                ),
                padding_and_border_cross,
            );
            container_node.layout.set_measured(cross_axis.dimension(), size);
        }

        if request.perform_layout && container_node.style.flex_wrap == Wrap::WrapReverse {
            let container_cross = container_node.layout.measured(cross_axis.dimension());
            for &child in &container.children {
                let child_node = self.tree.node_mut(child)?;
                if child_node.style.position_type != PositionType::Relative {
                    continue;
                }
                let flipped = container_cross
                    - child_node.layout.position(cross_axis.leading_edge())
                    - child_node.layout.measured(cross_axis.dimension());
                child_node.layout.set_position(cross_axis.leading_edge(), flipped);
            }
        }

        if request.perform_layout {
            // Step 10: absolutely positioned children.
            for &child in &container.children {
                let child_node = self.node(child)?;
                if child_node.style.display == Display::None
                    || child_node.style.position_type != PositionType::Absolute
                {
                    continue;
                }
                self.absolute_layout_child(&container, child)?;
            }

            // Step 11: trailing positions on reversed axes.
            let needs_main_trailing = main_axis.is_reverse();
            let needs_cross_trailing = cross_axis.is_reverse();
            if needs_main_trailing || needs_cross_trailing {
                let node_size = self.node(id)?.measured_size();
                for &child in &container.children {
                    let child_node = self.tree.node_mut(child)?;
                    if child_node.style.display == Display::None {
                        continue;
                    }
                    for (needed, axis) in [(needs_main_trailing, main_axis), (needs_cross_trailing, cross_axis)] {
                        if !needed {
                            continue;
                        }
                        let container_size = if axis.is_row() { node_size.width } else { node_size.height };
                        let trailing = container_size
                            - child_node.layout.measured(axis.dimension())
                            - child_node.layout.position(axis.leading_edge());
                        child_node.layout.set_position(axis.trailing_edge(), trailing);
                    }
                }
            }
        }
        Ok(())
    }
}
