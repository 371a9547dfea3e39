mod block;
mod curve;
mod routing;
mod text;
mod types;

pub use block::{
    Block, BlockId, BlockLayout, Content, DrawnElement, Drawing, Element, LabelKind,
    MainStrategy, PendingSecondary, Placement, SecondaryRequest, Segment, SegmentKind, Side,
    SpanEntry, Spacing, select_main_group,
};
pub use curve::catmull_rom;
pub use routing::{ShortestPath, shortest_path, visible};
pub use text::{TextMeasure, ThemeMeasure, font_size_for, split_lines};
pub use types::*;

use crate::config::LayoutConfig;
use crate::error::TreeError;
use crate::geometry::{Point, Rect};
use crate::ir::SpecEntry;
use crate::theme::Theme;
use crate::topology::{PreparedSpec, prepare};

pub fn compute_layout(
    spec: &[SpecEntry],
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<TreeLayout, TreeError> {
    let mut measure = ThemeMeasure::new(theme, config);
    compute_layout_with(spec, theme, config, &mut measure)
}

/// Lay out one tree, measuring text with `measure`.
pub fn compute_layout_with(
    spec: &[SpecEntry],
    theme: &Theme,
    config: &LayoutConfig,
    measure: &mut dyn TextMeasure,
) -> Result<TreeLayout, TreeError> {
    let prepared = prepare(spec)?;
    let (drawing, blocks, owners) = build_blocks(&prepared, theme, config, measure)?;
    Ok(finish(&prepared, drawing, &blocks, &owners, theme, config))
}

fn element(measure: &mut dyn TextMeasure, text: &str, kind: LabelKind) -> Element {
    let (width, height) = measure.measure(text, kind);
    Element::new(text, kind, width, height)
}

/// Feed the entries to the engine in topological order. Returns the drawing, the
/// block standing for each entry, and the declaring entry of every secondary edge.
fn build_blocks(
    prepared: &PreparedSpec,
    theme: &Theme,
    config: &LayoutConfig,
    measure: &mut dyn TextMeasure,
) -> Result<(Drawing, Vec<BlockId>, Vec<String>), TreeError> {
    let mut engine = BlockLayout::new(Spacing {
        gap_x: config.gap_x(theme),
        gap_y: config.gap_y(theme),
        secondary_clearance: config.secondary_clearance(theme),
    });
    let seal_detached = prepared.has_nonterminals();
    let mut blocks: Vec<BlockId> = Vec::with_capacity(prepared.len());
    let mut owners: Vec<String> = Vec::new();

    for (idx, entry) in prepared.entries.iter().enumerate() {
        if entry.is_terminal() {
            if !entry.secondary.is_empty() {
                tracing::warn!(id = %entry.id, "secondary edges on terminals are not drawn");
            }
            let id = engine.terminal(element(measure, &entry.label, LabelKind::Word));
            if seal_detached && prepared.parent[idx].is_none() {
                engine.seal(id)?;
            }
            blocks.push(id);
            continue;
        }

        let kids = &prepared.children[idx];
        let children: Vec<BlockId> = kids.iter().map(|&kid| blocks[kid]).collect();
        let strategy = main_strategy(prepared, idx, &blocks, config);
        let flabels: Vec<(BlockId, Element)> = kids
            .iter()
            .filter_map(|&kid| {
                let flabel = prepared.entries[kid].flabel.as_deref()?;
                (!flabel.is_empty()).then_some((kid, flabel))
            })
            .map(|(kid, flabel)| (blocks[kid], element(measure, flabel, LabelKind::Function)))
            .collect();
        let mut secondary = Vec::with_capacity(entry.secondary.len());
        for edge in &entry.secondary {
            let target = prepared.index[edge.id.as_str()];
            let side = if prepared.rightmost[target] > prepared.rightmost[idx] {
                Side::Right
            } else {
                Side::Left
            };
            owners.push(entry.id.clone());
            secondary.push(SecondaryRequest {
                label: element(measure, &edge.label, LabelKind::Secondary),
                target: edge.id.clone(),
                side,
            });
        }

        let node = engine.nonterminal(&children, strategy, flabels, secondary)?;
        let id = if entry.label.is_empty() {
            node
        } else {
            engine.label(node, element(measure, &entry.label, LabelKind::Category), None)?
        };
        blocks.push(id);
    }

    Ok((engine.draw(), blocks, owners))
}

fn main_strategy(
    prepared: &PreparedSpec,
    idx: usize,
    blocks: &[BlockId],
    config: &LayoutConfig,
) -> MainStrategy {
    let entry = &prepared.entries[idx];
    if let Some(only) = &entry.only {
        return MainStrategy::Only(blocks[prepared.index[only.as_str()]]);
    }
    let head = prepared.children[idx].iter().copied().find(|&kid| {
        prepared.entries[kid]
            .flabel
            .as_ref()
            .is_some_and(|flabel| config.head_flabels.contains(flabel))
    });
    match head {
        Some(kid) => MainStrategy::Contains(blocks[kid]),
        None => MainStrategy::Widest,
    }
}

/// Flip the drawing into output coordinates and route the secondary edges.
fn finish(
    prepared: &PreparedSpec,
    drawing: Drawing,
    blocks: &[BlockId],
    owners: &[String],
    theme: &Theme,
    config: &LayoutConfig,
) -> TreeLayout {
    let pad = config.padding;
    let height = drawing.height;
    let flip = |y: f32| pad + height - y;
    let to_output = |p: Point| Point::new(pad + p.x, flip(p.y));

    let labels = drawing
        .elements
        .iter()
        .filter(|drawn| !drawn.element.text.is_empty())
        .map(|drawn| PlacedLabel {
            text: drawn.element.text.clone(),
            kind: drawn.element.kind,
            x: pad + drawn.x,
            y: flip(drawn.y + drawn.element.height),
            width: drawn.element.width,
            height: drawn.element.height,
            font_size: font_size_for(drawn.element.kind, theme, config),
        })
        .collect();

    let lines = drawing
        .segments
        .iter()
        .filter(|s| (s.x1 - s.x2).abs() > f32::EPSILON || (s.y1 - s.y2).abs() > f32::EPSILON)
        .map(|s| LineLayout {
            kind: s.kind,
            x1: pad + s.x1,
            y1: flip(s.y1),
            x2: pad + s.x2,
            y2: flip(s.y2),
        })
        .collect();

    let obstacles: Vec<Rect> = drawing
        .elements
        .iter()
        .filter(|drawn| !drawn.element.text.is_empty())
        .map(DrawnElement::rect)
        .collect();
    let gap = config.endpoint_gap;
    let mut curves = Vec::new();
    let mut unrouted = Vec::new();

    for (pending, owner) in drawing.secondaries.iter().zip(owners) {
        let source = drawing.placements[pending.source].map(|placement| match placement.label {
            Some(label) => Point::new((label.left() + label.right()) / 2.0, label.bottom() - gap),
            None => Point::new(placement.mid, placement.top - gap),
        });
        let target = prepared
            .index
            .get(pending.target.as_str())
            .and_then(|&idx| drawing.placements[blocks[idx]])
            .map(|placement| match placement.label {
                Some(label) => Point::new((label.left() + label.right()) / 2.0, label.top() + gap),
                None => Point::new(placement.mid, placement.top + gap),
            });

        let route = match (source, target) {
            (Some(source), Some(target)) => {
                shortest_path(source, target, &obstacles, &config.routing)
            }
            _ => None,
        };
        match route {
            Some(route) => {
                let points: Vec<Point> = route.path.into_iter().map(to_output).collect();
                let d = catmull_rom(&points, config.routing.curve_tension);
                curves.push(CurveLayout {
                    from: owner.clone(),
                    to: pending.target.clone(),
                    label: pending.label.clone(),
                    points,
                    d,
                });
            }
            None => {
                tracing::warn!(
                    from = %owner,
                    to = %pending.target,
                    label = %pending.label,
                    "no route for secondary edge"
                );
                unrouted.push(UnroutedEdge {
                    from: owner.clone(),
                    to: pending.target.clone(),
                    label: pending.label.clone(),
                });
            }
        }
    }

    TreeLayout {
        width: drawing.width + 2.0 * pad,
        height: height + 2.0 * pad,
        labels,
        lines,
        curves,
        unrouted,
    }
}
