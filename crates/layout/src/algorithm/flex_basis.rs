//! Hypothetical main size of each child before flexing.

use super::cross_axis::align_item;
use super::{FlexContainer, LayoutPass, LayoutRequest};
use crate::event::LayoutPassReason;
use crate::layout::LayoutResults;
use crate::tree::NodeId;
use anyhow::Result;
use sprig_values::{
    Align, Dimension, Display, ExperimentalFeature, FlexDirection, FloatOptional, MeasureMode,
    Overflow, PositionType, UNDEFINED, float_max, floats_equal, is_undefined,
};

impl LayoutPass<'_, '_> {
    /// Compute the flex basis of every in-flow child.
    ///
    /// Returns the sum of the bases plus main-axis margins.
    pub(super) fn compute_flex_basis_for_children(&mut self, container: &FlexContainer) -> Result<f32> {
        let main_axis = container.main_axis;
        let main_mode = if container.is_main_axis_row {
            container.width_mode
        } else {
            container.height_mode
        };

        // A lone child that both grows and shrinks in an exact container
        // takes all the space anyway; its basis can start at zero.
        let mut single_flex_child = None;
        if main_mode == MeasureMode::Exactly {
            for &child in &container.children {
                let child_node = self.tree.node(child)?;
                if !child_node.is_flexible() {
                    continue;
                }
                if single_flex_child.is_some()
                    || floats_equal(child_node.resolve_flex_grow(), 0.0)
                    || floats_equal(child_node.resolve_flex_shrink(), 0.0)
                {
                    single_flex_child = None;
                    break;
                }
                single_flex_child = Some(child);
            }
        }

        let mut total_outer_flex_basis = 0.0;
        for &child in &container.children {
            let child_node = self.tree.node_mut(child)?;
            if child_node.style.display == Display::None {
                self.zero_out_layout_recursively(child)?;
                let hidden = self.tree.node_mut(child)?;
                hidden.has_new_layout = true;
                hidden.set_dirty(false);
                continue;
            }
            if container.perform_layout {
                let child_direction = child_node.resolve_direction(container.direction);
                let main_size = container.available_inner(main_axis);
                let cross_size = container.available_inner(container.cross_axis);
                child_node.set_position(
                    child_direction,
                    main_size,
                    cross_size,
                    container.available_inner_width,
                );
            }
            if child_node.style.position_type == PositionType::Absolute {
                continue;
            }
            if single_flex_child == Some(child) {
                child_node.layout.computed_flex_basis_generation = self.generation;
                child_node.layout.computed_flex_basis = FloatOptional::new(0.0);
            } else {
                self.compute_flex_basis_for_child(container, child)?;
            }
            let based = self.tree.node(child)?;
            total_outer_flex_basis += based.layout.computed_flex_basis.value()
                + based.margin_for_axis(main_axis, container.available_inner_width);
        }
        Ok(total_outer_flex_basis)
    }

    fn compute_flex_basis_for_child(&mut self, container: &FlexContainer, child: NodeId) -> Result<()> {
        let child_node = self.tree.node(child)?;
        let main_axis = container.main_axis;
        let owner_width = container.available_inner_width;
        let owner_height = container.available_inner_height;
        let main_axis_size = container.available_inner(main_axis);
        let resolved_flex_basis = child_node.resolve_flex_basis().resolve(main_axis_size);
        let generation = self.generation;

        let basis = if resolved_flex_basis.is_defined() && !is_undefined(main_axis_size) {
            let layout = &child_node.layout;
            let web_flex_basis = child_node
                .config
                .is_experimental_feature_enabled(ExperimentalFeature::WebFlexBasis);
            if layout.computed_flex_basis.is_undefined()
                || (web_flex_basis && layout.computed_flex_basis_generation != generation)
            {
                let padding_and_border = child_node.padding_and_border_for_axis(main_axis, owner_width);
                resolved_flex_basis.max(FloatOptional::new(padding_and_border))
            } else {
                layout.computed_flex_basis
            }
        } else if main_axis.is_row() && child_node.is_style_dim_defined(FlexDirection::Row, owner_width) {
            let padding_and_border = child_node.padding_and_border_for_axis(FlexDirection::Row, owner_width);
            child_node
                .style
                .resolved_dimension(Dimension::Width)
                .resolve(owner_width)
                .max(FloatOptional::new(padding_and_border))
        } else if main_axis.is_column()
            && child_node.is_style_dim_defined(FlexDirection::Column, owner_height)
        {
            let padding_and_border =
                child_node.padding_and_border_for_axis(FlexDirection::Column, owner_width);
            child_node
                .style
                .resolved_dimension(Dimension::Height)
                .resolve(owner_height)
                .max(FloatOptional::new(padding_and_border))
        } else {
            return self.measure_flex_basis(container, child);
        };

        let child_mut = self.tree.node_mut(child)?;
        child_mut.layout.computed_flex_basis = basis;
        child_mut.layout.computed_flex_basis_generation = generation;
        Ok(())
    }

    /// Derive the basis from the child's content size.
    #[allow(clippy::too_many_lines, reason = "Each constraint source is applied in order")]
    fn measure_flex_basis(&mut self, container: &FlexContainer, child: NodeId) -> Result<()> {
        let parent = self.tree.node(container.node)?;
        let child_node = self.tree.node(child)?;
        let is_main_axis_row = container.is_main_axis_row;
        let width = container.available_inner_width;
        let height = container.available_inner_height;
        let owner_width = width;
        let owner_height = height;

        let margin_row = child_node.margin_for_axis(FlexDirection::Row, owner_width);
        let margin_column = child_node.margin_for_axis(FlexDirection::Column, owner_width);
        let is_row_style_dim_defined = child_node.is_style_dim_defined(FlexDirection::Row, owner_width);
        let is_column_style_dim_defined =
            child_node.is_style_dim_defined(FlexDirection::Column, owner_height);

        let mut child_width = UNDEFINED;
        let mut child_height = UNDEFINED;
        let mut child_width_mode = MeasureMode::Undefined;
        let mut child_height_mode = MeasureMode::Undefined;
        if is_row_style_dim_defined {
            child_width = child_node
                .style
                .resolved_dimension(Dimension::Width)
                .resolve(owner_width)
                .value()
                + margin_row;
            child_width_mode = MeasureMode::Exactly;
        }
        if is_column_style_dim_defined {
            child_height = child_node
                .style
                .resolved_dimension(Dimension::Height)
                .resolve(owner_height)
                .value()
                + margin_column;
            child_height_mode = MeasureMode::Exactly;
        }

        // Only a scroll container lets content overflow along its main axis.
        let scrolls = parent.style.overflow == Overflow::Scroll;
        if (!is_main_axis_row || !scrolls) && is_undefined(child_width) && !is_undefined(width) {
            child_width = width;
            child_width_mode = MeasureMode::AtMost;
        }
        if (is_main_axis_row || !scrolls) && is_undefined(child_height) && !is_undefined(height) {
            child_height = height;
            child_height_mode = MeasureMode::AtMost;
        }

        let aspect_ratio = child_node.style.aspect_ratio;
        if aspect_ratio.is_defined() {
            if !is_main_axis_row && child_width_mode == MeasureMode::Exactly {
                child_height = margin_column + (child_width - margin_row) / aspect_ratio.value();
                child_height_mode = MeasureMode::Exactly;
            } else if is_main_axis_row && child_height_mode == MeasureMode::Exactly {
                child_width = margin_row + (child_height - margin_column) * aspect_ratio.value();
                child_width_mode = MeasureMode::Exactly;
            }
        }

        // Stretched children of an exactly sized container know their
        // cross size up front.
        let stretches = align_item(parent, child_node) == Align::Stretch;
        let has_exact_width = !is_undefined(width) && container.width_mode == MeasureMode::Exactly;
        if !is_main_axis_row
            && !is_row_style_dim_defined
            && has_exact_width
            && stretches
            && child_width_mode != MeasureMode::Exactly
        {
            child_width = width;
            child_width_mode = MeasureMode::Exactly;
            if aspect_ratio.is_defined() {
                child_height = (child_width - margin_row) / aspect_ratio.value();
                child_height_mode = MeasureMode::Exactly;
            }
        }
        let has_exact_height = !is_undefined(height) && container.height_mode == MeasureMode::Exactly;
        if is_main_axis_row
            && !is_column_style_dim_defined
            && has_exact_height
            && stretches
            && child_height_mode != MeasureMode::Exactly
        {
            child_height = height;
            child_height_mode = MeasureMode::Exactly;
            if aspect_ratio.is_defined() {
                child_width = (child_height - margin_column) * aspect_ratio.value();
                child_width_mode = MeasureMode::Exactly;
            }
        }

        (child_width_mode, child_width) = child_node.constrain_max_size_for_mode(
            FlexDirection::Row,
            owner_width,
            owner_width,
            child_width_mode,
            child_width,
        );
        (child_height_mode, child_height) = child_node.constrain_max_size_for_mode(
            FlexDirection::Column,
            owner_height,
            owner_width,
            child_height_mode,
            child_height,
        );

        self.layout_node_internal(
            child,
            &LayoutRequest {
                available_width: child_width,
                available_height: child_height,
                owner_direction: container.direction,
                width_mode: child_width_mode,
                height_mode: child_height_mode,
                owner_width,
                owner_height,
                perform_layout: false,
                reason: LayoutPassReason::MeasureChild,
            },
        )?;

        let main_axis = container.main_axis;
        let measured = self.tree.node_mut(child)?;
        let basis = float_max(
            measured.layout.measured(main_axis.dimension()),
            measured.padding_and_border_for_axis(main_axis, owner_width),
        );
        measured.layout.computed_flex_basis = FloatOptional::new(basis);
        measured.layout.computed_flex_basis_generation = self.generation;
        Ok(())
    }

    /// Collapse a `display: none` subtree to zero size.
    pub(super) fn zero_out_layout_recursively(&mut self, id: NodeId) -> Result<()> {
        let node = self.tree.node_mut(id)?;
        node.layout = LayoutResults::default();
        node.layout.set_dimension(Dimension::Width, 0.0);
        node.layout.set_dimension(Dimension::Height, 0.0);
        node.has_new_layout = true;
        self.tree.clone_children_if_needed(id)?;
        let children = self.tree.node(id)?.children.clone();
        for child in children {
            self.zero_out_layout_recursively(child)?;
        }
        Ok(())
    }
}
