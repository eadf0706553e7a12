use anyhow::Result;
use criterion::{Criterion, criterion_group, criterion_main};
use sprig_layout::{
    Direction, FlexDirection, LayoutTree, MeasureInput, NodeId, Size, Value, Wrap,
};
use std::hint::black_box;
use std::rc::Rc;

/// A wrapping row of cards, each a column holding a text leaf and a footer.
fn build_card_grid(cards: usize) -> Result<(LayoutTree, NodeId)> {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row)?;
    tree.set_flex_wrap(root, Wrap::Wrap)?;
    tree.set_width(root, Value::points(1024.0))?;
    for index in 0..cards {
        let card = tree.new_node();
        tree.set_width(card, Value::points(120.0))?;
        tree.set_flex_grow(card, 1.0)?;
        let text = tree.new_node();
        let words = (index % 7 + 1) as f32;
        tree.set_measure_func(
            text,
            Some(Rc::new(move |input: &MeasureInput<'_>| {
                let natural = words * 30.0;
                let width = if input.width.is_nan() { natural } else { natural.min(input.width) };
                Size::new(width, (natural / width.max(1.0)).ceil() * 16.0)
            })),
        )?;
        let footer = tree.new_node();
        tree.set_height(footer, Value::points(24.0))?;
        tree.insert_child(card, text, 0)?;
        tree.insert_child(card, footer, 1)?;
        tree.insert_child(root, card, index)?;
    }
    Ok((tree, root))
}

fn bench_layout_baseline(criterion: &mut Criterion) {
    criterion.bench_function("layout_card_grid_full", |bencher| {
        bencher.iter(|| -> Result<()> {
            let (mut tree, root) = build_card_grid(200)?;
            tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;
            black_box(tree.layout_height(root)?);
            Ok(())
        });
    });

    criterion.bench_function("layout_card_grid_forced_relayout", |bencher| {
        let Ok((mut tree, root)) = build_card_grid(200) else {
            return;
        };
        bencher.iter(|| -> Result<()> {
            tree.mark_dirty_and_propagate_downwards(root)?;
            tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;
            black_box(tree.last_stats().measure_callbacks);
            Ok(())
        });
    });

    criterion.bench_function("layout_card_grid_cached", |bencher| {
        let Ok((mut tree, root)) = build_card_grid(200) else {
            return;
        };
        bencher.iter(|| -> Result<()> {
            tree.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)?;
            black_box(tree.last_stats().cached_layouts);
            Ok(())
        });
    });
}

criterion_group!(layout_benches, bench_layout_baseline);
criterion_main!(layout_benches);
