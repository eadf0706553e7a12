//! Debug dumps of a laid-out subtree.

use crate::node::Node;
use crate::style::{Edges, Style};
use crate::tree::{LayoutTree, NodeId};
use anyhow::Result;
use core::fmt::Write as _;
use serde_json::{Value as JsonValue, json};
use sprig_values::{Dimension, Edge, FloatOptional, Gutter, Value};

/// What [`node_to_string`] includes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PrintOptions {
    pub layout: bool,
    pub style: bool,
    pub children: bool,
}

impl PrintOptions {
    pub const fn all() -> Self {
        Self {
            layout: true,
            style: true,
            children: true,
        }
    }
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self::all()
    }
}

/// Render the subtree at `id` as nested `<div>` elements.
///
/// Only style properties that differ from the initial style are listed.
///
/// # Errors
/// Returns an error if a node of the subtree is not live.
pub fn node_to_string(tree: &LayoutTree, id: NodeId, options: PrintOptions) -> Result<String> {
    let mut out = String::new();
    print_node(tree, id, options, 0, &mut out)?;
    Ok(out)
}

fn print_node(tree: &LayoutTree, id: NodeId, options: PrintOptions, level: usize, out: &mut String) -> Result<()> {
    let node = tree.node(id)?;
    push_indent(out, level);
    out.push_str("<div ");
    if let Some(print) = &node.print {
        out.push_str(&print(id));
    }
    if options.layout {
        let layout = &node.layout;
        write!(
            out,
            "layout=\"width: {}; height: {}; top: {}; left: {};\" ",
            layout.dimension(Dimension::Width),
            layout.dimension(Dimension::Height),
            layout.position(Edge::Top),
            layout.position(Edge::Left),
        )?;
    }
    if options.style {
        out.push_str("style=\"");
        write_style(out, node)?;
        out.push_str("\" ");
    }
    if node.has_measure_func() {
        out.push_str("has-custom-measure=\"true\"");
    }
    out.push('>');

    if options.children && !node.children.is_empty() {
        for &child in &node.children {
            out.push('\n');
            print_node(tree, child, options, level + 1, out)?;
        }
        out.push('\n');
        push_indent(out, level);
    }
    out.push_str("</div>");
    Ok(())
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn write_style(out: &mut String, node: &Node) -> Result<()> {
    let style = &node.style;
    let initial = if node.config.use_web_defaults() {
        Style::web_defaults()
    } else {
        Style::default()
    };

    macro_rules! keyword {
        ($field:ident, $key:literal) => {
            if style.$field != initial.$field {
                write!(out, "{}: {}; ", $key, style.$field)?;
            }
        };
    }
    keyword!(flex_direction, "flex-direction");
    keyword!(justify_content, "justify-content");
    keyword!(align_items, "align-items");
    keyword!(align_content, "align-content");
    keyword!(align_self, "align-self");
    keyword!(flex_wrap, "flex-wrap");
    keyword!(overflow, "overflow");
    keyword!(display, "display");
    keyword!(direction, "direction");
    keyword!(position_type, "position");

    write_factor(out, "flex", style.flex)?;
    write_factor(out, "flex-grow", style.flex_grow)?;
    write_factor(out, "flex-shrink", style.flex_shrink)?;
    write_factor(out, "aspect-ratio", style.aspect_ratio)?;
    write_value(out, "flex-basis", style.flex_basis, initial.flex_basis)?;

    write_edges(out, "margin", &style.margin)?;
    write_edges(out, "padding", &style.padding)?;
    write_edges(out, "border", &style.border)?;
    write_edges(out, "position", &style.position)?;

    write_value(out, "gap", style.gap[Gutter::All.index()], Value::UNDEFINED)?;
    write_value(out, "column-gap", style.gap[Gutter::Column.index()], Value::UNDEFINED)?;
    write_value(out, "row-gap", style.gap[Gutter::Row.index()], Value::UNDEFINED)?;

    for (dimension, name) in [(Dimension::Width, "width"), (Dimension::Height, "height")] {
        write_value(out, name, style.dimension(dimension), Value::AUTO)?;
        write_value(
            out,
            &format!("min-{name}"),
            style.min_dimension(dimension),
            Value::UNDEFINED,
        )?;
        write_value(
            out,
            &format!("max-{name}"),
            style.max_dimension(dimension),
            Value::UNDEFINED,
        )?;
    }
    Ok(())
}

fn write_factor(out: &mut String, key: &str, factor: FloatOptional) -> Result<()> {
    if factor.is_defined() {
        write!(out, "{key}: {}; ", factor.value())?;
    }
    Ok(())
}

fn write_value(out: &mut String, key: &str, value: Value, initial: Value) -> Result<()> {
    if value != initial {
        write!(out, "{key}: {value}; ")?;
    }
    Ok(())
}

fn write_edges(out: &mut String, key: &str, edges: &Edges) -> Result<()> {
    for edge in Edge::ALL_EDGES {
        let value = edges[edge.index()];
        if value.is_undefined() {
            continue;
        }
        if edge == Edge::All {
            write!(out, "{key}: {value}; ")?;
        } else {
            write!(out, "{key}-{}: {value}; ", edge.name())?;
        }
    }
    Ok(())
}

/// Structured dump of the subtree at `id`: computed layout, full style and
/// children.
///
/// # Errors
/// Returns an error if a node of the subtree is not live or the style
/// cannot be serialized.
pub fn tree_to_json(tree: &LayoutTree, id: NodeId) -> Result<JsonValue> {
    let node = tree.node(id)?;
    let layout = &node.layout;
    let children = node
        .children
        .iter()
        .map(|&child| tree_to_json(tree, child))
        .collect::<Result<Vec<_>>>()?;
    Ok(json!({
        "id": id.index(),
        "layout": {
            "left": layout.position(Edge::Left),
            "top": layout.position(Edge::Top),
            "width": layout.dimension(Dimension::Width),
            "height": layout.dimension(Dimension::Height),
            "direction": layout.direction,
            "had_overflow": layout.had_overflow,
        },
        "style": serde_json::to_value(&node.style)?,
        "has_measure_func": node.has_measure_func(),
        "children": children,
    }))
}
