//! Instrumentation of layout passes.

use crate::tree::NodeId;
use serde::{Deserialize, Serialize};
use sprig_values::{MeasureMode, Size};
use std::rc::Rc;

/// Why a node is being laid out or measured.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutPassReason {
    Initial,
    AbsLayout,
    Stretch,
    MultilineStretch,
    FlexLayout,
    MeasureChild,
    AbsMeasureChild,
    FlexMeasure,
}

impl LayoutPassReason {
    pub const COUNT: usize = 8;

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::AbsLayout => "abs-layout",
            Self::Stretch => "stretch",
            Self::MultilineStretch => "multiline-stretch",
            Self::FlexLayout => "flex-layout",
            Self::MeasureChild => "measure",
            Self::AbsMeasureChild => "abs-measure",
            Self::FlexMeasure => "flex-measure",
        }
    }
}

/// How a visit of a node was satisfied.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutType {
    Layout,
    Measure,
    CachedLayout,
    CachedMeasure,
}

/// Counters collected over one layout pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStats {
    pub layouts: u32,
    pub measures: u32,
    /// Highest number of measurement cache slots any node used.
    pub max_measure_cache: u32,
    pub cached_layouts: u32,
    pub cached_measures: u32,
    pub measure_callbacks: u32,
    /// Measure callback invocations, indexed by [`LayoutPassReason::index`].
    pub measure_callback_reasons: [u32; LayoutPassReason::COUNT],
}

impl LayoutStats {
    pub fn measure_callbacks_for(&self, reason: LayoutPassReason) -> u32 {
        self.measure_callback_reasons[reason.index()]
    }
}

/// Notification emitted while a pass runs.
#[derive(Debug)]
pub enum LayoutEvent<'event> {
    PassStart {
        root: NodeId,
    },
    PassEnd {
        root: NodeId,
        stats: &'event LayoutStats,
    },
    NodeLayout {
        node: NodeId,
        layout_type: LayoutType,
        reason: LayoutPassReason,
    },
    MeasureCallbackEnd {
        node: NodeId,
        width: f32,
        width_mode: MeasureMode,
        height: f32,
        height_mode: MeasureMode,
        measured: Size,
        reason: LayoutPassReason,
    },
}

/// Observer installed with [`LayoutTree::set_listener`](crate::LayoutTree::set_listener).
pub type LayoutListener = Rc<dyn Fn(&LayoutEvent<'_>)>;
