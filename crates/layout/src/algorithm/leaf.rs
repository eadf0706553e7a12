//! Sizing of nodes that do not lay out children.

use super::{LayoutPass, LayoutRequest};
use crate::event::LayoutEvent;
use crate::node::MeasureInput;
use crate::tree::NodeId;
use anyhow::Result;
use log::debug;
use sprig_values::{Dimension, FlexDirection, MeasureMode, float_max, is_undefined};
use std::rc::Rc;

const fn sized_by_content(mode: MeasureMode) -> bool {
    matches!(mode, MeasureMode::Undefined | MeasureMode::AtMost)
}

impl LayoutPass<'_, '_> {
    /// Size a leaf through its measure function.
    pub(super) fn measure_with_measure_func(&mut self, id: NodeId, request: &LayoutRequest) -> Result<()> {
        let node = self.tree.node(id)?;
        let LayoutRequest {
            available_width,
            available_height,
            width_mode,
            height_mode,
            owner_width,
            owner_height,
            ..
        } = *request;
        let padding_and_border_row = node.padding_and_border_for_axis(FlexDirection::Row, available_width);
        let padding_and_border_column =
            node.padding_and_border_for_axis(FlexDirection::Column, available_width);
        let margin_row = node.margin_for_axis(FlexDirection::Row, available_width);
        let margin_column = node.margin_for_axis(FlexDirection::Column, available_width);

        if width_mode == MeasureMode::Exactly && height_mode == MeasureMode::Exactly {
            let width = node.bound_axis(FlexDirection::Row, available_width - margin_row, owner_width, owner_width);
            let height = node.bound_axis(
                FlexDirection::Column,
                available_height - margin_column,
                owner_height,
                owner_width,
            );
            let sized = self.tree.node_mut(id)?;
            sized.layout.set_measured(Dimension::Width, width);
            sized.layout.set_measured(Dimension::Height, height);
            return Ok(());
        }

        let inner_width = if is_undefined(available_width) {
            available_width
        } else {
            float_max(0.0, available_width - margin_row - padding_and_border_row)
        };
        let inner_height = if is_undefined(available_height) {
            available_height
        } else {
            float_max(0.0, available_height - margin_column - padding_and_border_column)
        };

        let Some(measure) = node.measure.as_ref().map(Rc::clone) else {
            return Err(self.tree.violation(id, "Expected node to have a measure function"));
        };
        let measured = measure(&MeasureInput {
            node: id,
            width: inner_width,
            width_mode,
            height: inner_height,
            height_mode,
            context: node.context.as_deref(),
            layout_context: self.layout_context,
        });
        self.stats.measure_callbacks += 1;
        self.stats.measure_callback_reasons[request.reason.index()] += 1;
        debug!(
            target: "sprig::layout",
            "[MEASURE] {id} w={inner_width} ({width_mode}) h={inner_height} ({height_mode}) -> {}x{}",
            measured.width,
            measured.height,
        );
        self.emit(&LayoutEvent::MeasureCallbackEnd {
            node: id,
            width: inner_width,
            width_mode,
            height: inner_height,
            height_mode,
            measured,
            reason: request.reason,
        });
        if is_undefined(measured.width) || is_undefined(measured.height) {
            return Err(self.tree.violation(id, "Measure function returned an undefined dimension"));
        }

        let width = node.bound_axis(
            FlexDirection::Row,
            if sized_by_content(width_mode) {
                measured.width + padding_and_border_row
            } else {
                available_width - margin_row
            },
            owner_width,
            owner_width,
        );
        let height = node.bound_axis(
            FlexDirection::Column,
            if sized_by_content(height_mode) {
                measured.height + padding_and_border_column
            } else {
                available_height - margin_column
            },
            owner_height,
            owner_width,
        );
        let measured_node = self.tree.node_mut(id)?;
        measured_node.layout.set_measured(Dimension::Width, width);
        measured_node.layout.set_measured(Dimension::Height, height);
        Ok(())
    }

    /// A container without children is as large as its padding and border.
    pub(super) fn measure_empty_container(&mut self, id: NodeId, request: &LayoutRequest) -> Result<()> {
        let node = self.tree.node_mut(id)?;
        let owner_width = request.owner_width;
        let width = node.bound_axis(
            FlexDirection::Row,
            if sized_by_content(request.width_mode) {
                node.padding_and_border_for_axis(FlexDirection::Row, owner_width)
            } else {
                request.available_width - node.margin_for_axis(FlexDirection::Row, owner_width)
            },
            request.owner_width,
            owner_width,
        );
        let height = node.bound_axis(
            FlexDirection::Column,
            if sized_by_content(request.height_mode) {
                node.padding_and_border_for_axis(FlexDirection::Column, owner_width)
            } else {
                request.available_height - node.margin_for_axis(FlexDirection::Column, owner_width)
            },
            request.owner_height,
            owner_width,
        );
        node.layout.set_measured(Dimension::Width, width);
        node.layout.set_measured(Dimension::Height, height);
        Ok(())
    }

    /// Short-cut for measurements whose outcome does not depend on children.
    ///
    /// Returns true when the size was set.
    pub(super) fn measure_fixed_size(&mut self, id: NodeId, request: &LayoutRequest) -> Result<bool> {
        let LayoutRequest {
            available_width,
            available_height,
            width_mode,
            height_mode,
            owner_width,
            owner_height,
            ..
        } = *request;
        let no_room = |mode: MeasureMode, available: f32| mode == MeasureMode::AtMost && available <= 0.0;
        let both_exact = width_mode == MeasureMode::Exactly && height_mode == MeasureMode::Exactly;
        if !(no_room(width_mode, available_width) || no_room(height_mode, available_height) || both_exact) {
            return Ok(false);
        }
        let node = self.tree.node_mut(id)?;
        let collapse = |mode: MeasureMode, available: f32| {
            is_undefined(available) || (mode == MeasureMode::AtMost && available < 0.0)
        };
        let width = node.bound_axis(
            FlexDirection::Row,
            if collapse(width_mode, available_width) {
                0.0
            } else {
                available_width - node.margin_for_axis(FlexDirection::Row, owner_width)
            },
            owner_width,
            owner_width,
        );
        let height = node.bound_axis(
            FlexDirection::Column,
            if collapse(height_mode, available_height) {
                0.0
            } else {
                available_height - node.margin_for_axis(FlexDirection::Column, owner_width)
            },
            owner_height,
            owner_width,
        );
        node.layout.set_measured(Dimension::Width, width);
        node.layout.set_measured(Dimension::Height, height);
        Ok(true)
    }
}
