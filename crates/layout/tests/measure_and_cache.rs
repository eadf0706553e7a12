#![cfg(test)]
#![allow(
    clippy::missing_errors_doc,
    reason = "Test helpers return Result for clear propagation"
)]
#![allow(
    clippy::missing_panics_doc,
    reason = "Assertions in tests are expected"
)]
#![allow(
    clippy::too_many_lines,
    reason = "Integration-style test setup is verbose"
)]

use anyhow::Result;
use core::cell::{Cell, RefCell};
use sprig_layout::{
    Align, BaselineInput, ComputedLayout, Config, Direction, Edge, FlexDirection, LayoutEvent,
    LayoutPassReason, LayoutTree, LogLevel, MeasureFunc, MeasureInput, MeasureMode, NodeId,
    NodeType, Size, Value,
};
use std::rc::Rc;

const EPSILON: f32 = 0.001;

fn assert_close(actual: f32, expected: f32, what: &str) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "{what}: expected {expected}, got {actual}"
    );
}

fn tree_with_scale(scale: f32) -> Result<LayoutTree> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut config = Config::new();
    config.set_point_scale_factor(scale)?;
    Ok(LayoutTree::with_config(config))
}

fn fixed_measure(width: f32, height: f32) -> MeasureFunc {
    Rc::new(move |_input: &MeasureInput<'_>| Size::new(width, height))
}

/// Measure function recording every request it receives.
fn recording_measure(size: Size) -> (MeasureFunc, Rc<RefCell<Vec<(f32, MeasureMode, f32, MeasureMode)>>>) {
    let calls: Rc<RefCell<Vec<_>>> = Rc::default();
    let sink = Rc::clone(&calls);
    let measure: MeasureFunc = Rc::new(move |input: &MeasureInput<'_>| {
        sink.borrow_mut()
            .push((input.width, input.width_mode, input.height, input.height_mode));
        size
    });
    (measure, calls)
}

fn append(tree: &mut LayoutTree, parent: NodeId, child: NodeId) -> Result<()> {
    let index = tree.child_count(parent)?;
    tree.insert_child(parent, child, index)
}

fn snapshot(tree: &LayoutTree, ids: &[NodeId]) -> Result<Vec<ComputedLayout>> {
    ids.iter().map(|&id| tree.computed(id)).collect()
}

#[test]
fn exact_width_wins_over_measured_width() -> Result<()> {
    let mut tree = tree_with_scale(0.0)?;
    let leaf = tree.new_node();
    tree.set_padding(leaf, Edge::All, Value::points(2.0))?;
    let (measure, calls) = recording_measure(Size::new(50.0, 20.0));
    tree.set_measure_func(leaf, Some(measure))?;
    tree.calculate_layout(leaf, 80.0, f32::NAN, Direction::Ltr)?;

    assert_close(tree.layout_width(leaf)?, 80.0, "exact width");
    assert_close(tree.layout_height(leaf)?, 24.0, "measured height plus padding");
    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    let (width, width_mode, height, height_mode) = calls[0];
    assert_close(width, 76.0, "content width offered");
    assert_eq!(width_mode, MeasureMode::Exactly);
    assert!(height.is_nan());
    assert_eq!(height_mode, MeasureMode::Undefined);
    Ok(())
}

#[test]
fn measure_func_sets_text_node_type() -> Result<()> {
    let mut tree = LayoutTree::new();
    let leaf = tree.new_node();
    assert_eq!(tree.node_type(leaf)?, NodeType::Default);
    tree.set_measure_func(leaf, Some(fixed_measure(1.0, 1.0)))?;
    assert_eq!(tree.node_type(leaf)?, NodeType::Text);
    tree.set_measure_func(leaf, None)?;
    assert_eq!(tree.node_type(leaf)?, NodeType::Default);
    Ok(())
}

#[test]
fn measured_child_is_stretched_on_cross_axis() -> Result<()> {
    let mut tree = tree_with_scale(0.0)?;
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row)?;
    tree.set_width(root, Value::points(100.0))?;
    tree.set_height(root, Value::points(50.0))?;
    let text = tree.new_node();
    tree.set_measure_func(text, Some(fixed_measure(30.0, 10.0)))?;
    append(&mut tree, root, text)?;
    tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;

    assert_close(tree.layout_width(text)?, 30.0, "content width");
    assert_close(tree.layout_height(text)?, 50.0, "stretched height");
    Ok(())
}

#[test]
fn second_pass_is_served_from_cache() -> Result<()> {
    let mut tree = tree_with_scale(1.0)?;
    let root = tree.new_node();
    tree.set_width(root, Value::points(200.0))?;
    let mut nodes = vec![root];
    for _ in 0..3 {
        let text = tree.new_node();
        tree.set_measure_func(text, Some(fixed_measure(40.0, 12.5)))?;
        append(&mut tree, root, text)?;
        nodes.push(text);
    }

    tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;
    let first = snapshot(&tree, &nodes)?;
    let first_stats = tree.last_stats().clone();
    assert!(first_stats.measure_callbacks >= 3);
    assert!(first_stats.layouts >= 1);

    tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;
    let second = snapshot(&tree, &nodes)?;
    let second_stats = tree.last_stats();
    assert_eq!(first, second);
    assert_eq!(second_stats.measure_callbacks, 0);
    assert_eq!(second_stats.layouts, 0);
    assert!(second_stats.cached_layouts >= 1);
    Ok(())
}

#[test]
fn mark_dirty_forces_remeasure() -> Result<()> {
    let mut tree = tree_with_scale(0.0)?;
    let root = tree.new_node();
    tree.set_width(root, Value::points(100.0))?;
    let text = tree.new_node();
    let (measure, calls) = recording_measure(Size::new(20.0, 10.0));
    tree.set_measure_func(text, Some(measure))?;
    append(&mut tree, root, text)?;
    tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;
    let before = calls.borrow().len();

    tree.mark_dirty(text)?;
    assert!(tree.is_dirty(root)?);
    tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;
    assert!(calls.borrow().len() > before);
    assert!(!tree.is_dirty(text)?);
    Ok(())
}

#[test]
fn measure_callbacks_are_attributed_to_reasons() -> Result<()> {
    let mut tree = tree_with_scale(0.0)?;
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row)?;
    tree.set_width(root, Value::points(100.0))?;
    let text = tree.new_node();
    tree.set_measure_func(text, Some(fixed_measure(20.0, 10.0)))?;
    append(&mut tree, root, text)?;
    tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;

    let stats = tree.last_stats();
    let attributed: u32 = stats.measure_callback_reasons.iter().sum();
    assert_eq!(attributed, stats.measure_callbacks);
    assert!(stats.measure_callbacks_for(LayoutPassReason::MeasureChild) >= 1);
    Ok(())
}

#[test]
fn listener_sees_pass_and_measure_events() -> Result<()> {
    let mut tree = tree_with_scale(0.0)?;
    let passes = Rc::new(Cell::new((0u32, 0u32)));
    let measures = Rc::new(Cell::new(0u32));
    let pass_sink = Rc::clone(&passes);
    let measure_sink = Rc::clone(&measures);
    tree.set_listener(Some(Rc::new(move |event: &LayoutEvent<'_>| match event {
        LayoutEvent::PassStart { .. } => {
            let (start, end) = pass_sink.get();
            pass_sink.set((start + 1, end));
        }
        LayoutEvent::PassEnd { .. } => {
            let (start, end) = pass_sink.get();
            pass_sink.set((start, end + 1));
        }
        LayoutEvent::MeasureCallbackEnd { .. } => measure_sink.set(measure_sink.get() + 1),
        LayoutEvent::NodeLayout { .. } => {}
    })));
    let root = tree.new_node();
    let text = tree.new_node();
    tree.set_measure_func(text, Some(fixed_measure(5.0, 5.0)))?;
    append(&mut tree, root, text)?;
    tree.calculate_layout(root, 50.0, 50.0, Direction::Ltr)?;

    assert_eq!(passes.get(), (1, 1));
    assert_eq!(measures.get(), tree.last_stats().measure_callbacks);
    Ok(())
}

#[test]
fn layout_context_reaches_measure_callbacks() -> Result<()> {
    let mut tree = LayoutTree::new();
    let seen = Rc::new(Cell::new(0u32));
    let sink = Rc::clone(&seen);
    let leaf = tree.new_node();
    tree.set_measure_func(
        leaf,
        Some(Rc::new(move |input: &MeasureInput<'_>| {
            if let Some(value) = input.layout_context.and_then(|context| context.downcast_ref::<u32>()) {
                sink.set(*value);
            }
            Size::new(1.0, 1.0)
        })),
    )?;
    let frame = 42u32;
    tree.calculate_layout_with_context(leaf, f32::NAN, f32::NAN, Direction::Ltr, Some(&frame))?;
    assert_eq!(seen.get(), 42);
    Ok(())
}

#[test]
fn nan_from_measure_is_an_error() -> Result<()> {
    let mut tree = LayoutTree::new();
    let leaf = tree.new_node();
    tree.set_measure_func(leaf, Some(fixed_measure(f32::NAN, 1.0)))?;
    assert!(tree.calculate_layout(leaf, f32::NAN, f32::NAN, Direction::Ltr).is_err());
    Ok(())
}

#[test]
fn baseline_alignment_lines_up_first_baselines() -> Result<()> {
    let mut tree = tree_with_scale(0.0)?;
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row)?;
    tree.set_align_items(root, Align::Baseline)?;
    tree.set_width(root, Value::points(100.0))?;
    tree.set_height(root, Value::points(100.0))?;
    let tall = tree.new_node();
    tree.set_width(tall, Value::points(10.0))?;
    tree.set_height(tall, Value::points(20.0))?;
    let short = tree.new_node();
    tree.set_width(short, Value::points(10.0))?;
    tree.set_height(short, Value::points(10.0))?;
    tree.set_baseline_func(short, Some(Rc::new(|_input: &BaselineInput<'_>| 5.0)))?;
    append(&mut tree, root, tall)?;
    append(&mut tree, root, short)?;
    tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;

    assert_close(tree.layout_top(tall)?, 0.0, "tall");
    assert_close(tree.layout_top(short)?, 15.0, "short");
    Ok(())
}

#[test]
fn nan_from_baseline_is_an_error() -> Result<()> {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row)?;
    tree.set_align_items(root, Align::Baseline)?;
    let child = tree.new_node();
    tree.set_height(child, Value::points(10.0))?;
    tree.set_baseline_func(child, Some(Rc::new(|_input: &BaselineInput<'_>| f32::NAN)))?;
    append(&mut tree, root, child)?;
    assert!(tree.calculate_layout(root, 100.0, 100.0, Direction::Ltr).is_err());
    Ok(())
}

#[test]
fn rounding_keeps_neighbours_contiguous() -> Result<()> {
    for scale in [1.0, 2.0, 3.0] {
        let mut tree = tree_with_scale(scale)?;
        let root = tree.new_node();
        tree.set_flex_direction(root, FlexDirection::Row)?;
        tree.set_width(root, Value::points(101.0))?;
        tree.set_height(root, Value::points(10.0))?;
        let mut children = Vec::new();
        for _ in 0..3 {
            let child = tree.new_node();
            tree.set_flex_grow(child, 1.0)?;
            append(&mut tree, root, child)?;
            children.push(child);
        }
        tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;

        let mut total = 0.0;
        for pair in children.windows(2) {
            let right = tree.layout_left(pair[0])? + tree.layout_width(pair[0])?;
            assert_close(right, tree.layout_left(pair[1])?, "shared edge");
        }
        for &child in &children {
            let width = tree.layout_width(child)?;
            assert_close((width * scale).round(), width * scale, "on the pixel grid");
            total += width;
        }
        assert_close(total, 101.0, "rounded widths fill the row");
    }
    Ok(())
}

#[test]
fn text_rounding_never_shrinks_content() -> Result<()> {
    let mut tree = tree_with_scale(1.0)?;
    let root = tree.new_node();
    tree.set_align_items(root, Align::FlexStart)?;
    tree.set_width(root, Value::points(100.0))?;
    tree.set_height(root, Value::points(100.0))?;
    let text = tree.new_node();
    tree.set_measure_func(text, Some(fixed_measure(10.2, 5.5)))?;
    append(&mut tree, root, text)?;
    tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;

    assert_close(tree.layout_width(text)?, 11.0, "ceil width");
    assert_close(tree.layout_height(text)?, 6.0, "ceil height");
    Ok(())
}

#[test]
fn forced_relayout_is_deterministic() -> Result<()> {
    let mut tree = tree_with_scale(1.0)?;
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row)?;
    tree.set_padding(root, Edge::All, Value::points(3.3))?;
    let mut nodes = vec![root];
    for index in 0..4 {
        let child = tree.new_node();
        tree.set_flex_grow(child, index as f32 + 0.5)?;
        tree.set_margin(child, Edge::Horizontal, Value::points(1.7))?;
        if index % 2 == 0 {
            tree.set_measure_func(child, Some(fixed_measure(7.3, 4.1)))?;
        }
        append(&mut tree, root, child)?;
        nodes.push(child);
    }
    tree.calculate_layout(root, 313.0, f32::NAN, Direction::Ltr)?;
    let first = snapshot(&tree, &nodes)?;

    tree.mark_dirty_and_propagate_downwards(root)?;
    tree.calculate_layout(root, 313.0, f32::NAN, Direction::Ltr)?;
    assert_eq!(first, snapshot(&tree, &nodes)?);
    assert!(tree.last_stats().layouts >= 1);
    Ok(())
}

#[test]
fn print_tree_logs_through_config_logger() -> Result<()> {
    let lines: Rc<RefCell<Vec<(LogLevel, String)>>> = Rc::default();
    let sink = Rc::clone(&lines);
    let mut config = Config::new();
    config.set_print_tree(true);
    config.set_logger(Some(Rc::new(move |_node, level, message: &str| {
        sink.borrow_mut().push((level, message.to_owned()));
    })));
    let mut tree = LayoutTree::with_config(config);
    let root = tree.new_node();
    tree.calculate_layout(root, 10.0, 10.0, Direction::Ltr)?;

    let lines = lines.borrow();
    assert!(
        lines
            .iter()
            .any(|(level, message)| *level == LogLevel::Debug && message.starts_with("<div"))
    );
    Ok(())
}
