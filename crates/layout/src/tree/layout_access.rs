//! Reading computed layouts back out of the tree.

use super::{LayoutTree, NodeId};
use crate::layout::ComputedLayout;
use anyhow::Result;
use sprig_values::{Dimension, Direction, Edge};

macro_rules! layout_edge {
    ($($getter:ident: $edge:ident;)+) => {
        $(
            /// # Errors
            /// Returns an error if `id` is not live.
            pub fn $getter(&self, id: NodeId) -> Result<f32> {
                Ok(self.node(id)?.layout.position(Edge::$edge))
            }
        )+
    };
}

impl LayoutTree {
    layout_edge! {
        layout_left: Left;
        layout_top: Top;
        layout_right: Right;
        layout_bottom: Bottom;
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn layout_width(&self, id: NodeId) -> Result<f32> {
        Ok(self.node(id)?.layout.dimension(Dimension::Width))
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn layout_height(&self, id: NodeId) -> Result<f32> {
        Ok(self.node(id)?.layout.dimension(Dimension::Height))
    }

    /// Direction the node was laid out with.
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn layout_direction(&self, id: NodeId) -> Result<Direction> {
        Ok(self.node(id)?.layout.direction)
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn layout_had_overflow(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.layout.had_overflow)
    }

    /// Resolved margin on one edge.
    ///
    /// # Errors
    /// Returns an error if `id` is not live or `edge` is a shorthand.
    pub fn layout_margin(&self, id: NodeId, edge: Edge) -> Result<f32> {
        let index = self.physical_edge(id, edge, "margin")?;
        Ok(self.node(id)?.layout.margin[index])
    }

    /// Resolved border on one edge.
    ///
    /// # Errors
    /// Returns an error if `id` is not live or `edge` is a shorthand.
    pub fn layout_border(&self, id: NodeId, edge: Edge) -> Result<f32> {
        let index = self.physical_edge(id, edge, "border")?;
        Ok(self.node(id)?.layout.border[index])
    }

    /// Resolved padding on one edge.
    ///
    /// # Errors
    /// Returns an error if `id` is not live or `edge` is a shorthand.
    pub fn layout_padding(&self, id: NodeId, edge: Edge) -> Result<f32> {
        let index = self.physical_edge(id, edge, "padding")?;
        Ok(self.node(id)?.layout.padding[index])
    }

    /// Map `edge` to a physical slot using the node's laid-out direction.
    fn physical_edge(&self, id: NodeId, edge: Edge, property: &str) -> Result<usize> {
        let rtl = self.node(id)?.layout.direction == Direction::Rtl;
        let physical = match edge {
            Edge::Start if rtl => Edge::Right,
            Edge::Start => Edge::Left,
            Edge::End if rtl => Edge::Left,
            Edge::End => Edge::Right,
            Edge::Horizontal | Edge::Vertical | Edge::All => {
                return Err(self.violation(
                    id,
                    &format!("cannot get layout {property} of multi-edge shorthand {}", edge.name()),
                ));
            }
            physical => physical,
        };
        Ok(physical.index())
    }

    /// Snapshot of the node's position, size and direction.
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn computed(&self, id: NodeId) -> Result<ComputedLayout> {
        Ok(ComputedLayout::from(&self.node(id)?.layout))
    }

    /// True when the last pass touched the node and nobody acknowledged it yet.
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn has_new_layout(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.has_new_layout)
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_has_new_layout(&mut self, id: NodeId, has_new_layout: bool) -> Result<()> {
        self.node_mut(id)?.has_new_layout = has_new_layout;
        Ok(())
    }
}
