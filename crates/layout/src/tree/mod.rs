//! Node arena: lifecycle, child lists, ownership and dirty tracking.
//!
//! Nodes live in slots keyed by [`NodeId`]. A child records the one parent
//! that owns it; a parent may also list children owned elsewhere (shared
//! children). Those are cloned before the parent mutates them.

mod layout_access;
mod style_access;

use crate::config::Config;
use crate::event::{LayoutListener, LayoutStats};
use crate::layout::LayoutResults;
use crate::node::{BaselineFunc, Children, DirtiedFunc, MeasureFunc, Node, PrintFunc};
use anyhow::{Result, anyhow};
use core::any::Any;
use core::fmt;
use log::debug;
use serde::{Deserialize, Serialize};
use sprig_values::{FloatOptional, LogLevel, NodeType};
use std::rc::Rc;

/// Handle to a node inside a [`LayoutTree`].
///
/// Ids of freed nodes are never valid again, even when their slot is reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    epoch: u32,
}

impl NodeId {
    pub(crate) const fn from_raw(index: u32, epoch: u32) -> Self {
        Self { index, epoch }
    }

    /// Slot index; stable for the lifetime of the node.
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.index)
    }
}

/// Storage cell of the arena.
#[derive(Debug)]
struct Slot {
    /// Bumped every time the slot is released.
    epoch: u32,
    node: Option<Node>,
}

/// Owner of every node, the default config and the layout generation.
pub struct LayoutTree {
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    pub(crate) config: Rc<Config>,
    /// Number of layout passes run so far.
    pub(crate) generation: u32,
    pub(crate) listener: Option<LayoutListener>,
    pub(crate) last_stats: LayoutStats,
}

impl LayoutTree {
    /// Empty tree whose nodes default to `Config::default()`.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            slots: Vec::new(),
            free_slots: Vec::new(),
            config: Rc::new(config),
            generation: 0,
            listener: None,
            last_stats: LayoutStats::default(),
        }
    }

    /// Config handed to nodes created with [`LayoutTree::new_node`].
    pub fn config(&self) -> &Rc<Config> {
        &self.config
    }

    /// Receive [`LayoutEvent`](crate::LayoutEvent)s from subsequent passes.
    pub fn set_listener(&mut self, listener: Option<LayoutListener>) {
        self.listener = listener;
    }

    /// Counters of the most recent layout pass.
    pub fn last_stats(&self) -> &LayoutStats {
        &self.last_stats
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index())
            .is_some_and(|slot| slot.epoch == id.epoch && slot.node.is_some())
    }

    /// # Errors
    /// Returns an error if `id` does not name a live node.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        match self.slots.get(id.index()) {
            Some(Slot {
                epoch,
                node: Some(node),
            }) if *epoch == id.epoch => Ok(node),
            _ => Err(self.stale(id)),
        }
    }

    /// # Errors
    /// Returns an error if `id` does not name a live node.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        if !self.contains(id) {
            return Err(self.stale(id));
        }
        self.slots
            .get_mut(id.index())
            .and_then(|slot| slot.node.as_mut())
            .ok_or_else(|| anyhow!("Node {id} vanished"))
    }

    fn stale(&self, id: NodeId) -> anyhow::Error {
        let message = format!("Node {id} has been freed or never existed");
        self.config.log(Some(id), LogLevel::Fatal, &message);
        anyhow!(message)
    }

    /// Log a broken contract through the node's logger and turn it into an error.
    pub(crate) fn violation(&self, id: NodeId, message: &str) -> anyhow::Error {
        let config = self
            .slots
            .get(id.index())
            .and_then(|slot| slot.node.as_ref())
            .map_or(&self.config, |node| &node.config);
        config.log(Some(id), LogLevel::Fatal, message);
        anyhow!("{message} (node {id})")
    }

    fn insert_node(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free_slots.pop()
            && let Some(slot) = self.slots.get_mut(index as usize)
        {
            slot.node = Some(node);
            return NodeId::from_raw(index, slot.epoch);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            epoch: 0,
            node: Some(node),
        });
        NodeId::from_raw(index, 0)
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            slot.node = None;
            slot.epoch = slot.epoch.wrapping_add(1);
            self.free_slots.push(id.index);
        }
    }

    // Lifecycle

    pub fn new_node(&mut self) -> NodeId {
        let config = Rc::clone(&self.config);
        self.insert_node(Node::new(config))
    }

    pub fn new_node_with_config(&mut self, config: Rc<Config>) -> NodeId {
        self.insert_node(Node::new(config))
    }

    /// Copy a node. The copy has no owner and shares the original's children.
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn clone_node(&mut self, id: NodeId) -> Result<NodeId> {
        let mut copy = self.node(id)?.clone();
        copy.owner = None;
        Ok(self.insert_node(copy))
    }

    /// Detach a node from its owner and children, then release it.
    ///
    /// Children are not freed; the ones it owned become unowned.
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn free(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        let owner = node.owner;
        let children = node.children.clone();
        if let Some(owner) = owner
            && self.contains(owner)
        {
            let parent = self.node_mut(owner)?;
            if let Some(position) = parent.children.iter().position(|child| *child == id) {
                parent.children.remove(position);
            }
            self.mark_dirty_and_propagate(owner)?;
        }
        for child in children {
            if let Ok(child_node) = self.node_mut(child)
                && child_node.owner == Some(id)
            {
                child_node.owner = None;
            }
        }
        debug!(target: "sprig::tree", "free {id}");
        self.release(id);
        Ok(())
    }

    /// Free a node and every descendant it owns. Shared children are kept.
    ///
    /// # Errors
    /// Returns an error if a node in the subtree is not live.
    pub fn free_recursive(&mut self, id: NodeId) -> Result<()> {
        self.free_recursive_with_cleanup(id, &mut |_freed: NodeId, _node: &Node| {})
    }

    /// Like [`LayoutTree::free_recursive`], calling `cleanup` on each node
    /// right before it is released.
    ///
    /// # Errors
    /// Returns an error if a node in the subtree is not live.
    pub fn free_recursive_with_cleanup<F>(&mut self, id: NodeId, cleanup: &mut F) -> Result<()>
    where
        F: FnMut(NodeId, &Node),
    {
        let mut skipped = 0;
        loop {
            let Some(child) = self.node(id)?.children.get(skipped).copied() else {
                break;
            };
            if self.node(child)?.owner == Some(id) {
                self.remove_child(id, child)?;
                self.free_recursive_with_cleanup(child, cleanup)?;
            } else {
                skipped += 1;
            }
        }
        cleanup(id, self.node(id)?);
        self.free(id)
    }

    /// Restore a detached, childless node to its initial state.
    ///
    /// # Errors
    /// Returns an error if the node still has children or an owner.
    pub fn reset(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if !node.children.is_empty() {
            return Err(self.violation(id, "Cannot reset a node which still has children attached"));
        }
        if node.owner.is_some() {
            return Err(self.violation(id, "Cannot reset a node still attached to a owner"));
        }
        let config = Rc::clone(&node.config);
        *self.node_mut(id)? = Node::new(config);
        Ok(())
    }

    // Children

    /// Insert `child` into `parent` at `index`.
    ///
    /// # Errors
    /// Returns an error if the child already has an owner, the parent has a
    /// measure function, the index is out of bounds or the link would
    /// create a cycle.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        if self.node(child)?.owner.is_some() {
            return Err(self.violation(child, "Child already has a owner, it must be removed first."));
        }
        let parent_node = self.node(parent)?;
        if parent_node.has_measure_func() {
            return Err(self.violation(
                parent,
                "Cannot add child: Nodes with measure functions cannot have children.",
            ));
        }
        let child_count = parent_node.children.len();
        if index > child_count {
            return Err(self.violation(
                parent,
                &format!("Cannot insert child at {index}: node has {child_count} children"),
            ));
        }
        if self.subtree_contains(child, parent)? {
            return Err(self.violation(parent, "Cannot add child: the link would create a cycle"));
        }
        self.clone_children_if_needed(parent)?;
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.owner = Some(parent);
        debug!(target: "sprig::tree", "insert {child} into {parent} at {index}");
        self.mark_dirty_and_propagate(parent)
    }

    /// Remove `child` from `parent`'s child list.
    ///
    /// When the list is shared with another tree, the remaining children are
    /// cloned instead of detached.
    ///
    /// # Errors
    /// Returns an error if either node is not live.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let children = self.node(parent)?.children.clone();
        let Some(&first) = children.first() else {
            return Ok(());
        };
        if self.node(first)?.owner == Some(parent) {
            if let Some(position) = children.iter().position(|candidate| *candidate == child) {
                self.node_mut(parent)?.children.remove(position);
                let removed = self.node_mut(child)?;
                removed.layout = LayoutResults::default();
                removed.owner = None;
                debug!(target: "sprig::tree", "remove {child} from {parent}");
                self.mark_dirty_and_propagate(parent)?;
            }
            return Ok(());
        }
        let mut kept = Children::new();
        for old_child in children {
            if old_child == child {
                self.mark_dirty_and_propagate(parent)?;
                continue;
            }
            let replacement = self.clone_for_owner(old_child, parent, kept.len())?;
            kept.push(replacement);
        }
        self.node_mut(parent)?.children = kept;
        Ok(())
    }

    /// # Errors
    /// Returns an error if `parent` or one of its owned children is not live.
    pub fn remove_all_children(&mut self, parent: NodeId) -> Result<()> {
        let children = self.node(parent)?.children.clone();
        let Some(&first) = children.first() else {
            return Ok(());
        };
        if self.node(first)?.owner == Some(parent) {
            for child in &children {
                let child_node = self.node_mut(*child)?;
                child_node.layout = LayoutResults::default();
                child_node.owner = None;
            }
        }
        self.node_mut(parent)?.children.clear();
        self.mark_dirty_and_propagate(parent)
    }

    /// Replace the whole child list. Children that stay keep their layout.
    ///
    /// # Errors
    /// Returns an error if any node is not live, the parent has a measure
    /// function or a new child is an ancestor of the parent.
    pub fn set_children(&mut self, parent: NodeId, children: &[NodeId]) -> Result<()> {
        let old_children = self.node(parent)?.children.clone();
        if !children.is_empty() && self.node(parent)?.has_measure_func() {
            return Err(self.violation(
                parent,
                "Cannot add child: Nodes with measure functions cannot have children.",
            ));
        }
        for &child in children {
            if self.subtree_contains(child, parent)? {
                return Err(self.violation(parent, "Cannot add child: the link would create a cycle"));
            }
        }
        if children.is_empty() && old_children.is_empty() {
            return Ok(());
        }
        for old_child in old_children {
            if children.contains(&old_child) {
                continue;
            }
            let child_node = self.node_mut(old_child)?;
            if child_node.owner == Some(parent) {
                child_node.layout = LayoutResults::default();
                child_node.owner = None;
            }
        }
        self.node_mut(parent)?.children = children.iter().copied().collect();
        for &child in children {
            self.node_mut(child)?.owner = Some(parent);
        }
        self.mark_dirty_and_propagate(parent)
    }

    /// # Errors
    /// Returns an error if `parent` is not live.
    pub fn child(&self, parent: NodeId, index: usize) -> Result<Option<NodeId>> {
        Ok(self.node(parent)?.children.get(index).copied())
    }

    /// # Errors
    /// Returns an error if `parent` is not live.
    pub fn child_count(&self, parent: NodeId) -> Result<usize> {
        Ok(self.node(parent)?.children.len())
    }

    /// # Errors
    /// Returns an error if `parent` is not live.
    pub fn children(&self, parent: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(parent)?.children)
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn owner(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.owner)
    }

    /// Alias of [`LayoutTree::owner`].
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.owner(id)
    }

    /// True when `target` is `root` or reachable through `root`'s child lists.
    fn subtree_contains(&self, root: NodeId, target: NodeId) -> Result<bool> {
        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            if current == target {
                return Ok(true);
            }
            pending.extend(self.node(current)?.children.iter().copied());
        }
        Ok(false)
    }

    /// Copy `child` for `owner`, through the config's clone callback if any.
    fn clone_for_owner(&mut self, child: NodeId, owner: NodeId, index: usize) -> Result<NodeId> {
        let source = self.node(child)?;
        let mut copy = source
            .config
            .clone_node_func()
            .and_then(|clone_node| clone_node(source, owner, index))
            .unwrap_or_else(|| source.clone());
        copy.owner = Some(owner);
        let id = self.insert_node(copy);
        debug!(target: "sprig::tree", "clone {child} as {id} for {owner}");
        Ok(id)
    }

    /// Give `parent` private copies of the children it does not own.
    pub(crate) fn clone_children_if_needed(&mut self, parent: NodeId) -> Result<()> {
        let children = self.node(parent)?.children.clone();
        for (index, child) in children.into_iter().enumerate() {
            if self.node(child)?.owner == Some(parent) {
                continue;
            }
            let replacement = self.clone_for_owner(child, parent, index)?;
            if let Some(slot) = self.node_mut(parent)?.children.get_mut(index) {
                *slot = replacement;
            }
        }
        Ok(())
    }

    // Dirty tracking

    /// Mark `id` and its ancestors dirty, notifying dirtied callbacks.
    pub(crate) fn mark_dirty_and_propagate(&mut self, id: NodeId) -> Result<()> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node_mut(node_id)?;
            if node.is_dirty {
                break;
            }
            node.set_dirty(true);
            node.layout.computed_flex_basis = FloatOptional::UNDEFINED;
            if let Some(dirtied) = node.dirtied.as_ref().map(Rc::clone) {
                dirtied(node_id);
            }
            current = self.node(node_id)?.owner;
        }
        Ok(())
    }

    /// Mark a measured leaf dirty so it is measured again.
    ///
    /// # Errors
    /// Returns an error if the node has no measure function.
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<()> {
        if !self.node(id)?.has_measure_func() {
            return Err(self.violation(
                id,
                "Only leaf nodes with custom measure functions should manually mark themselves as dirty",
            ));
        }
        self.mark_dirty_and_propagate(id)
    }

    /// Force the whole subtree to be laid out again.
    ///
    /// # Errors
    /// Returns an error if a node in the subtree is not live.
    pub fn mark_dirty_and_propagate_downwards(&mut self, id: NodeId) -> Result<()> {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let node = self.node_mut(current)?;
            node.is_dirty = true;
            pending.extend(node.children.iter().copied());
        }
        Ok(())
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn is_dirty(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.is_dirty)
    }

    // Capabilities

    /// Install or remove the leaf measure function.
    ///
    /// # Errors
    /// Returns an error when installing on a node that has children.
    pub fn set_measure_func(&mut self, id: NodeId, measure: Option<MeasureFunc>) -> Result<()> {
        if measure.is_some() && !self.node(id)?.children.is_empty() {
            return Err(self.violation(
                id,
                "Cannot set measure function: Nodes with measure functions cannot have children.",
            ));
        }
        let node = self.node_mut(id)?;
        node.node_type = if measure.is_some() { NodeType::Text } else { NodeType::Default };
        node.measure = measure;
        Ok(())
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_baseline_func(&mut self, id: NodeId, baseline: Option<BaselineFunc>) -> Result<()> {
        self.node_mut(id)?.baseline = baseline;
        Ok(())
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_dirtied_func(&mut self, id: NodeId, dirtied: Option<DirtiedFunc>) -> Result<()> {
        self.node_mut(id)?.dirtied = dirtied;
        Ok(())
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_print_func(&mut self, id: NodeId, print: Option<PrintFunc>) -> Result<()> {
        self.node_mut(id)?.print = print;
        Ok(())
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_context(&mut self, id: NodeId, context: Option<Rc<dyn Any>>) -> Result<()> {
        self.node_mut(id)?.context = context;
        Ok(())
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn context(&self, id: NodeId) -> Result<Option<&dyn Any>> {
        Ok(self.node(id)?.context.as_deref())
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn node_type(&self, id: NodeId) -> Result<NodeType> {
        Ok(self.node(id)?.node_type)
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_node_type(&mut self, id: NodeId, node_type: NodeType) -> Result<()> {
        self.node_mut(id)?.node_type = node_type;
        Ok(())
    }

    /// Prefer this node when picking the baseline child of its parent.
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn set_is_reference_baseline(&mut self, id: NodeId, is_reference: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.is_reference_baseline != is_reference {
            node.is_reference_baseline = is_reference;
            self.mark_dirty_and_propagate(id)?;
        }
        Ok(())
    }

    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn is_reference_baseline(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.is_reference_baseline)
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}
