//! The block row engine.
//!
//! Blocks live in an arena owned by one [`BlockLayout`]; the row is the ordered list
//! of blocks not yet absorbed by a parent. Coordinates inside the engine grow upwards
//! from the bottom edge of each block, which is the same for every block of a tree.

use serde::Serialize;

use crate::error::LayoutError;
use crate::geometry::Rect;

pub type BlockId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    Word,
    Category,
    Function,
    Secondary,
}

/// A measured piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub text: String,
    pub kind: LabelKind,
    pub width: f32,
    pub height: f32,
}

impl Element {
    pub fn new(text: impl Into<String>, kind: LabelKind, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            kind,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Element { element: Element, x: f32, y: f32 },
    Nested { block: BlockId, x: f32, y: f32 },
    /// Drawn between the midpoints of the outermost children.
    Bar { from: BlockId, to: BlockId, y: f32 },
    VLine { x: f32, bottom: f32, top: f32 },
    /// The part of the bar spanned by the main group.
    MainBar { from: BlockId, to: BlockId, y: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub mid: f32,
    pub right: f32,
    pub top: f32,
    pub min_height: f32,
    pub contents: Vec<Content>,
    pub sealed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainStrategy {
    Widest,
    Contains(BlockId),
    Only(BlockId),
}

impl MainStrategy {
    fn nominee(self) -> Option<BlockId> {
        match self {
            MainStrategy::Widest => None,
            MainStrategy::Contains(id) | MainStrategy::Only(id) => Some(id),
        }
    }

    fn renamed(self, from: BlockId, to: BlockId) -> Self {
        match self {
            MainStrategy::Contains(id) if id == from => MainStrategy::Contains(to),
            MainStrategy::Only(id) if id == from => MainStrategy::Only(to),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct SecondaryRequest {
    pub label: Element,
    pub target: String,
    pub side: Side,
}

/// A secondary edge waiting for its target to be resolved after layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSecondary {
    pub source: BlockId,
    pub target: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Spacing {
    pub gap_x: f32,
    pub gap_y: f32,
    pub secondary_clearance: f32,
}

/// One row entry as seen by main group selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanEntry {
    pub id: BlockId,
    pub width: f32,
    pub mine: bool,
    /// Always false for spans read off the row: `seal` removes the block from it.
    pub sealed: bool,
}

/// Pick the main group among the children in `span`.
///
/// Returns inclusive span indices. Runs are compared on (nominated, width); the
/// first of equally scored runs wins.
pub fn select_main_group(
    span: &[SpanEntry],
    strategy: MainStrategy,
) -> Result<(usize, usize), LayoutError> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    let mut open: Option<usize> = None;
    let isolated = match strategy {
        MainStrategy::Only(id) => Some(id),
        _ => None,
    };

    for (idx, entry) in span.iter().enumerate() {
        let eligible = entry.mine && !entry.sealed;
        let alone = isolated == Some(entry.id);
        if let Some(start) = open
            && (!eligible || alone)
        {
            runs.push((start, idx - 1));
            open = None;
        }
        if eligible {
            if alone {
                runs.push((idx, idx));
            } else if open.is_none() {
                open = Some(idx);
            }
        }
    }
    if let Some(start) = open {
        runs.push((start, span.len() - 1));
    }
    if runs.is_empty() {
        return Err(LayoutError::EmptyMainGroup);
    }

    let nominee = strategy.nominee();
    let contains_nominee =
        |&(a, b): &(usize, usize)| nominee.is_some_and(|n| span[a..=b].iter().any(|e| e.id == n));
    if let Some(n) = nominee {
        let matched = runs.iter().filter(|run| contains_nominee(run)).count();
        if matched != 1 {
            return Err(LayoutError::Nomination {
                nominee: n,
                matched,
            });
        }
    }

    let mut best = runs[0];
    let mut best_score = (contains_nominee(&best), run_width(span, best));
    for &run in &runs[1..] {
        let score = (contains_nominee(&run), run_width(span, run));
        let better = match (score.0, best_score.0) {
            (true, false) => true,
            (false, true) => false,
            _ => score.1 > best_score.1,
        };
        if better {
            best = run;
            best_score = score;
        }
    }
    Ok(best)
}

fn run_width(span: &[SpanEntry], (a, b): (usize, usize)) -> f32 {
    span[a..=b].iter().map(|e| e.width).sum()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub mid: f32,
    pub top: f32,
    pub right: f32,
    /// Absolute box of the block's own text, if it carries one.
    pub label: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnElement {
    pub element: Element,
    pub x: f32,
    pub y: f32,
}

impl DrawnElement {
    pub fn rect(&self) -> Rect {
        Rect::from_origin(self.x, self.y, self.element.width, self.element.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    Connector,
    Bar,
    MainBar,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// Absolute geometry of a finished tree, y growing upwards from the baseline.
#[derive(Debug, Clone, Default)]
pub struct Drawing {
    pub width: f32,
    pub height: f32,
    pub elements: Vec<DrawnElement>,
    pub segments: Vec<Segment>,
    pub placements: Vec<Option<Placement>>,
    pub secondaries: Vec<PendingSecondary>,
}

#[derive(Debug, Clone)]
pub struct BlockLayout {
    blocks: Vec<Block>,
    row: Vec<BlockId>,
    spacing: Spacing,
    pending: Vec<PendingSecondary>,
}

impl BlockLayout {
    pub fn new(spacing: Spacing) -> Self {
        Self {
            blocks: Vec::new(),
            row: Vec::new(),
            spacing,
            pending: Vec::new(),
        }
    }

    pub fn row(&self) -> &[BlockId] {
        &self.row
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    fn alloc(&mut self, mid: f32, right: f32, top: f32, contents: Vec<Content>) -> BlockId {
        let id = self.blocks.len();
        self.blocks.push(Block {
            id,
            mid,
            right,
            top,
            min_height: top,
            contents,
            sealed: false,
        });
        id
    }

    fn position(&self, id: BlockId) -> Result<usize, LayoutError> {
        self.row
            .iter()
            .position(|&entry| entry == id)
            .ok_or(LayoutError::NotInRow(id))
    }

    fn raise(&mut self, id: BlockId, to: f32) -> Result<(), LayoutError> {
        let block = &mut self.blocks[id];
        if to < block.min_height {
            return Err(LayoutError::HeightDecrease {
                block: id,
                from: block.min_height,
                to,
            });
        }
        block.min_height = to;
        Ok(())
    }

    pub fn terminal(&mut self, element: Element) -> BlockId {
        let (width, height) = (element.width, element.height);
        let id = self.alloc(
            width / 2.0,
            width + self.spacing.gap_x,
            height,
            vec![Content::Element {
                element,
                x: 0.0,
                y: 0.0,
            }],
        );
        self.row.push(id);
        id
    }

    /// Put `element` above the row block `child`, joined to it by a vertical line.
    ///
    /// Without `desired` the label floats one gap above everything the child must
    /// clear; with it, the label's top lands exactly at `desired`.
    pub fn label(
        &mut self,
        child: BlockId,
        element: Element,
        desired: Option<f32>,
    ) -> Result<BlockId, LayoutError> {
        let pos = self.position(child)?;
        let c = &self.blocks[child];
        let (lw, lh) = (element.width, element.height);

        let dx = (lw / 2.0 - c.mid).max(0.0);
        let mid = c.mid + dx;
        let label_left = mid - lw / 2.0;
        let label_bottom = match desired {
            Some(height) => height - lh,
            None => c.min_height + self.spacing.gap_y,
        };
        let length = label_bottom - c.top;
        if length < 0.0 {
            return Err(LayoutError::NegativeConnector { child, length });
        }
        let right = (dx + c.right).max(label_left + lw + self.spacing.gap_x);
        let top = label_bottom + lh;
        let min_height = top.max(c.min_height);
        let child_top = c.top;

        let id = self.alloc(
            mid,
            right,
            top,
            vec![
                Content::Nested {
                    block: child,
                    x: dx,
                    y: 0.0,
                },
                Content::VLine {
                    x: mid,
                    bottom: child_top,
                    top: label_bottom,
                },
                Content::Element {
                    element,
                    x: label_left,
                    y: label_bottom,
                },
            ],
        );
        self.blocks[id].min_height = min_height;
        self.row[pos] = id;
        Ok(id)
    }

    /// Glue a row block onto its left neighbour. Returns false at row position 0,
    /// where there is nothing to glue onto.
    pub fn seal(&mut self, id: BlockId) -> Result<bool, LayoutError> {
        let pos = self.position(id)?;
        if pos == 0 {
            return Ok(false);
        }
        let left = self.row[pos - 1];
        let (width, min_height) = {
            let block = &mut self.blocks[id];
            block.sealed = true;
            (block.right, block.min_height)
        };
        let neighbour = &mut self.blocks[left];
        neighbour.contents.push(Content::Nested {
            block: id,
            x: neighbour.right,
            y: 0.0,
        });
        neighbour.right += width;
        neighbour.min_height = neighbour.min_height.max(min_height);
        self.row.remove(pos);
        tracing::debug!(block = id, into = left, "sealed block into left neighbour");
        Ok(true)
    }

    pub fn nonterminal(
        &mut self,
        children: &[BlockId],
        strategy: MainStrategy,
        flabels: Vec<(BlockId, Element)>,
        secondary: Vec<SecondaryRequest>,
    ) -> Result<BlockId, LayoutError> {
        if children.is_empty() {
            return Err(LayoutError::NoChildren);
        }
        let mut children = children.to_vec();
        let mut strategy = strategy;

        let mut positions = Vec::with_capacity(children.len());
        for &child in &children {
            positions.push(self.position(child)?);
        }
        let lo = positions.iter().copied().min().unwrap_or(0);
        let hi = positions.iter().copied().max().unwrap_or(0);

        let mut desired = self.row[lo..=hi]
            .iter()
            .map(|&id| self.blocks[id].min_height)
            .fold(0.0f32, f32::max);
        for (child, element) in &flabels {
            if !children.contains(child) {
                return Err(LayoutError::NotInRow(*child));
            }
            desired = desired.max(self.blocks[*child].min_height + element.height + self.spacing.gap_y);
        }
        if !secondary.is_empty() {
            desired += self.spacing.secondary_clearance;
        }

        for (child, element) in flabels {
            let labelled = self.label(child, element, Some(desired))?;
            for entry in children.iter_mut().filter(|entry| **entry == child) {
                *entry = labelled;
            }
            strategy = strategy.renamed(child, labelled);
        }

        let bar_y = desired + self.spacing.gap_y;
        let spanned: Vec<BlockId> = self.row[lo..=hi].to_vec();
        for &id in &spanned {
            self.raise(id, bar_y)?;
        }
        for &child in &children {
            let block = &mut self.blocks[child];
            let (mid, top) = (block.mid, block.top);
            block.contents.push(Content::VLine {
                x: mid,
                bottom: top,
                top: bar_y,
            });
        }

        let span: Vec<SpanEntry> = spanned
            .iter()
            .map(|&id| SpanEntry {
                id,
                width: self.blocks[id].right,
                mine: children.contains(&id),
                sealed: self.blocks[id].sealed,
            })
            .collect();
        let (a, b) = select_main_group(&span, strategy)?;
        let mut g0 = lo + a;
        let mut g1 = lo + b;
        let group: Vec<BlockId> = self.row[g0..=g1].to_vec();
        tracing::debug!(?group, ?strategy, "main group selected");

        let mine: Vec<(usize, BlockId)> = span
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.mine)
            .map(|(offset, entry)| (offset, entry.id))
            .collect();
        let mut bar_from = mine.first().map_or(group[0], |&(_, id)| id);
        let mut bar_to = mine.last().map_or(group[group.len() - 1], |&(_, id)| id);
        let orphans: Vec<(usize, BlockId)> = mine
            .iter()
            .filter(|&&(offset, _)| offset < a || offset > b)
            .map(|&(offset, id)| (lo + offset, id))
            .collect();

        for &(pos, id) in orphans.iter().rev() {
            if self.seal(id)? && pos < g0 {
                g0 -= 1;
                g1 -= 1;
            }
        }

        let mut left_blocks = Vec::new();
        let mut right_blocks = Vec::new();
        for request in secondary {
            let source = self.secondary_block(&request.label, desired, bar_y);
            self.pending.push(PendingSecondary {
                source,
                target: request.target,
                label: request.label.text,
            });
            match request.side {
                Side::Left => left_blocks.push(source),
                Side::Right => right_blocks.push(source),
            }
        }
        if let Some(&first) = left_blocks.first()
            && bar_from == group[0]
        {
            bar_from = first;
        }
        if let Some(&last) = right_blocks.last()
            && bar_to == group[group.len() - 1]
        {
            bar_to = last;
        }
        let added_left = left_blocks.len();
        self.row.splice(g0..g0, left_blocks);
        g1 += added_left;
        let added_right = right_blocks.len();
        self.row.splice(g1 + 1..g1 + 1, right_blocks);
        g1 += added_right;

        let members: Vec<BlockId> = self.row.drain(g0..=g1).collect();
        let mut contents = Vec::with_capacity(members.len() + 2);
        let mut x = 0.0;
        let mut first_mid = None;
        let mut last_mid = 0.0;
        for &member in &members {
            let block = &self.blocks[member];
            if group.contains(&member) {
                first_mid.get_or_insert(x + block.mid);
                last_mid = x + block.mid;
            }
            contents.push(Content::Nested {
                block: member,
                x,
                y: 0.0,
            });
            x += block.right;
        }
        let mid = (first_mid.unwrap_or(last_mid) + last_mid) / 2.0;
        contents.push(Content::Bar {
            from: bar_from,
            to: bar_to,
            y: bar_y,
        });
        contents.push(Content::MainBar {
            from: group[0],
            to: group[group.len() - 1],
            y: bar_y,
        });

        let id = self.alloc(mid, x, bar_y, contents);
        self.row.insert(g0, id);
        Ok(id)
    }

    fn secondary_block(&mut self, label: &Element, desired: f32, bar_y: f32) -> BlockId {
        let bottom = (desired - label.height).max(0.0);
        let top = bottom + label.height;
        let mid = label.width / 2.0;
        let id = self.alloc(
            mid,
            label.width + self.spacing.gap_x,
            top,
            vec![
                Content::Element {
                    element: label.clone(),
                    x: 0.0,
                    y: bottom,
                },
                Content::VLine {
                    x: mid,
                    bottom: top,
                    top: bar_y,
                },
            ],
        );
        self.blocks[id].min_height = bar_y;
        id
    }

    /// Resolve every block in the row to absolute coordinates.
    pub fn draw(self) -> Drawing {
        let mut drawing = Drawing {
            placements: vec![None; self.blocks.len()],
            ..Default::default()
        };
        let mut bars: Vec<(SegmentKind, BlockId, BlockId, f32)> = Vec::new();
        let mut x = 0.0;
        for &id in &self.row {
            self.place(id, x, 0.0, &mut drawing, &mut bars);
            let block = &self.blocks[id];
            x += block.right;
            drawing.height = drawing.height.max(block.top);
        }
        drawing.width = x;

        for (kind, from, to, y) in bars {
            let (Some(start), Some(end)) = (drawing.placements[from], drawing.placements[to])
            else {
                continue;
            };
            drawing.segments.push(Segment {
                kind,
                x1: start.mid,
                y1: y,
                x2: end.mid,
                y2: y,
            });
        }
        for element in &drawing.elements {
            drawing.height = drawing.height.max(element.y + element.element.height);
        }
        drawing.secondaries = self.pending;
        drawing
    }

    fn place(
        &self,
        id: BlockId,
        x: f32,
        y: f32,
        drawing: &mut Drawing,
        bars: &mut Vec<(SegmentKind, BlockId, BlockId, f32)>,
    ) {
        let block = &self.blocks[id];
        let mut label = None;
        for content in &block.contents {
            match content {
                Content::Element {
                    element,
                    x: ex,
                    y: ey,
                } => {
                    let drawn = DrawnElement {
                        element: element.clone(),
                        x: x + ex,
                        y: y + ey,
                    };
                    label = Some(drawn.rect());
                    drawing.elements.push(drawn);
                }
                Content::Nested {
                    block: nested,
                    x: nx,
                    y: ny,
                } => self.place(*nested, x + nx, y + ny, drawing, bars),
                Content::VLine {
                    x: lx,
                    bottom,
                    top,
                } => drawing.segments.push(Segment {
                    kind: SegmentKind::Connector,
                    x1: x + lx,
                    y1: y + bottom,
                    x2: x + lx,
                    y2: y + top,
                }),
                Content::Bar { from, to, y: by } => {
                    bars.push((SegmentKind::Bar, *from, *to, y + by))
                }
                Content::MainBar { from, to, y: by } => {
                    bars.push((SegmentKind::MainBar, *from, *to, y + by))
                }
            }
        }
        drawing.placements[id] = Some(Placement {
            x,
            y,
            mid: x + block.mid,
            top: y + block.top,
            right: x + block.right,
            label,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAP: f32 = 5.0;

    fn engine() -> BlockLayout {
        BlockLayout::new(Spacing {
            gap_x: GAP,
            gap_y: GAP,
            secondary_clearance: 4.0,
        })
    }

    fn word(text: &str, width: f32) -> Element {
        Element::new(text, LabelKind::Word, width, 20.0)
    }

    fn category(text: &str) -> Element {
        Element::new(text, LabelKind::Category, 10.0, 20.0)
    }

    fn entry(id: BlockId, width: f32, mine: bool) -> SpanEntry {
        SpanEntry {
            id,
            width,
            mine,
            sealed: false,
        }
    }

    #[test]
    fn terminals_sit_side_by_side() {
        let mut layout = engine();
        let a = layout.terminal(word("a", 10.0));
        let b = layout.terminal(word("b", 30.0));
        let drawing = layout.draw();
        let pa = drawing.placements[a].expect("a placed");
        let pb = drawing.placements[b].expect("b placed");
        assert_eq!(pa.x, 0.0);
        assert_eq!(pb.x, 10.0 + GAP);
        assert_eq!(pa.mid, 5.0);
        assert_eq!(drawing.width, 10.0 + 30.0 + 2.0 * GAP);
        assert_eq!(drawing.height, 20.0);
    }

    #[test]
    fn simple_sentence_bar_spans_children() {
        let mut layout = engine();
        let a = layout.terminal(word("a", 10.0));
        let b = layout.terminal(word("b", 10.0));
        let s = layout
            .nonterminal(&[a, b], MainStrategy::Widest, Vec::new(), Vec::new())
            .expect("nonterminal");
        let labelled = layout.label(s, category("S"), None).expect("label");
        assert_eq!(layout.row(), &[labelled]);

        let top = layout.block(labelled).expect("block").top;
        assert!(top >= 20.0 + 20.0 + 2.0 * GAP);

        let drawing = layout.draw();
        let mid_a = drawing.placements[a].expect("a").mid;
        let mid_b = drawing.placements[b].expect("b").mid;
        let main = drawing
            .segments
            .iter()
            .find(|s| s.kind == SegmentKind::MainBar)
            .expect("main bar");
        assert_eq!((main.x1, main.x2), (mid_a, mid_b));
        assert_eq!(main.y1, 20.0 + GAP);
        let parent = drawing.placements[s].expect("S");
        assert_eq!(parent.mid, (mid_a + mid_b) / 2.0);
    }

    #[test]
    fn wide_label_shifts_child_right() {
        let mut layout = engine();
        let a = layout.terminal(word("a", 10.0));
        let wide = Element::new("NP-SBJ", LabelKind::Category, 40.0, 20.0);
        let labelled = layout.label(a, wide, None).expect("label");
        let block = layout.block(labelled).expect("block").clone();
        assert_eq!(block.mid, 20.0);
        assert_eq!(block.right, 40.0 + GAP);
        assert!(matches!(
            block.contents[0],
            Content::Nested { x, .. } if x == 15.0
        ));
    }

    #[test]
    fn label_rejects_negative_connector() {
        let mut layout = engine();
        let a = layout.terminal(word("a", 10.0));
        let err = layout.label(a, category("X"), Some(25.0)).unwrap_err();
        assert_eq!(
            err,
            LayoutError::NegativeConnector {
                child: a,
                length: -15.0
            }
        );
    }

    #[test]
    fn parentless_punctuation_is_glued_to_its_left_neighbour() {
        let mut layout = engine();
        let a = layout.terminal(word("a", 10.0));
        let b = layout.terminal(word("b", 10.0));
        let colon = layout.terminal(word(":", 4.0));
        let c = layout.terminal(word("c", 10.0));
        let d = layout.terminal(word("d", 10.0));
        assert!(layout.seal(colon).expect("seal"));
        assert_eq!(layout.row(), &[a, b, c, d]);

        let ab = layout
            .nonterminal(&[a, b], MainStrategy::Widest, Vec::new(), Vec::new())
            .expect("AB");
        let cd = layout
            .nonterminal(&[c, d], MainStrategy::Widest, Vec::new(), Vec::new())
            .expect("CD");
        layout
            .nonterminal(&[ab, cd], MainStrategy::Widest, Vec::new(), Vec::new())
            .expect("S");
        assert_eq!(layout.row().len(), 1);

        let drawing = layout.draw();
        let pb = drawing.placements[b].expect("b");
        let pcolon = drawing.placements[colon].expect(":");
        let pc = drawing.placements[c].expect("c");
        assert_eq!(pcolon.x, pb.x + 10.0 + GAP);
        assert_eq!(pc.x, pcolon.x + 4.0 + GAP);
    }

    #[test]
    fn seal_at_row_start_is_a_no_op() {
        let mut layout = engine();
        let a = layout.terminal(word("a", 10.0));
        layout.terminal(word("b", 10.0));
        assert!(!layout.seal(a).expect("seal"));
        assert_eq!(layout.row().len(), 2);
        assert!(!layout.block(a).expect("a").sealed);
    }

    #[test]
    fn only_strategy_seals_the_other_children() {
        let mut layout = engine();
        let a = layout.terminal(word("a", 10.0));
        let b = layout.terminal(word("b", 30.0));
        let c = layout.terminal(word("c", 30.0));
        let s = layout
            .nonterminal(&[a, b, c], MainStrategy::Only(a), Vec::new(), Vec::new())
            .expect("S");
        assert_eq!(layout.row(), &[s]);
        assert!(layout.block(b).expect("b").sealed);
        assert!(layout.block(c).expect("c").sealed);
        let drawing = layout.draw();
        assert_eq!(drawing.placements[s].expect("S").mid, 5.0);
    }

    #[test]
    fn contains_strategy_follows_the_head() {
        let mut layout = engine();
        let a = layout.terminal(word("a", 30.0));
        let b = layout.terminal(word("b", 30.0));
        let p = layout.terminal(word(",", 4.0));
        let c = layout.terminal(word("c", 10.0));
        let s = layout
            .nonterminal(&[a, b, c], MainStrategy::Contains(c), Vec::new(), Vec::new())
            .expect("S");
        // b glued onto a; a stays at the row start
        assert_eq!(layout.row(), &[a, p, s]);
        assert!(layout.block(b).expect("b").sealed);
    }

    #[test]
    fn equal_runs_prefer_the_leftmost() {
        let mut layout = engine();
        let a = layout.terminal(word("a", 10.0));
        let p = layout.terminal(word(",", 10.0));
        let b = layout.terminal(word("b", 10.0));
        let s = layout
            .nonterminal(&[a, b], MainStrategy::Widest, Vec::new(), Vec::new())
            .expect("S");
        assert_eq!(layout.row(), &[s, p]);
        let glued = layout.block(p).expect("p");
        assert!(glued
            .contents
            .iter()
            .any(|content| matches!(content, Content::Nested { block, .. } if *block == b)));
    }

    #[test]
    fn flabels_align_on_a_shared_height() {
        let mut layout = engine();
        let a = layout.terminal(word("a", 10.0));
        let b = layout.terminal(Element::new("b", LabelKind::Word, 10.0, 30.0));
        let fa = Element::new("SS", LabelKind::Function, 8.0, 12.0);
        let fb = Element::new("HD", LabelKind::Function, 8.0, 12.0);
        let s = layout
            .nonterminal(
                &[a, b],
                MainStrategy::Contains(b),
                vec![(a, fa), (b, fb)],
                Vec::new(),
            )
            .expect("S");
        let desired = 30.0 + 12.0 + GAP;
        assert_eq!(layout.block(s).expect("S").top, desired + GAP);
        let drawing = layout.draw();
        let tops: Vec<f32> = drawing
            .elements
            .iter()
            .filter(|e| e.element.kind == LabelKind::Function)
            .map(|e| e.y + e.element.height)
            .collect();
        assert_eq!(tops, vec![desired, desired]);
    }

    #[test]
    fn secondary_edges_add_label_blocks_and_pending_records() {
        let mut layout = engine();
        let a = layout.terminal(word("a", 10.0));
        let b = layout.terminal(word("b", 10.0));
        let request = SecondaryRequest {
            label: Element::new("SB", LabelKind::Secondary, 12.0, 10.0),
            target: "c".to_string(),
            side: Side::Right,
        };
        let s = layout
            .nonterminal(&[a, b], MainStrategy::Widest, Vec::new(), vec![request])
            .expect("S");
        let block = layout.block(s).expect("S").clone();
        assert_eq!(block.right, 3.0 * GAP + 10.0 + 10.0 + 12.0);
        assert_eq!(block.top, 20.0 + 4.0 + GAP);

        let drawing = layout.draw();
        assert_eq!(drawing.secondaries.len(), 1);
        let pending = &drawing.secondaries[0];
        assert_eq!(pending.target, "c");
        let source = drawing.placements[pending.source].expect("label block");
        assert_eq!(source.x, 2.0 * (10.0 + GAP));
        let bar = drawing
            .segments
            .iter()
            .find(|s| s.kind == SegmentKind::Bar)
            .expect("bar");
        assert_eq!(bar.x2, source.mid);
    }

    #[test]
    fn min_height_never_shrinks_towards_the_root() {
        let mut layout = engine();
        let words: Vec<BlockId> = ["jag", "ville", ",", "åka", "dit"]
            .iter()
            .map(|w| layout.terminal(word(w, 12.0)))
            .collect();
        let ip = layout
            .nonterminal(&[words[3], words[4]], MainStrategy::Widest, Vec::new(), Vec::new())
            .expect("IP");
        let ip = layout.label(ip, category("IP"), None).expect("label");
        let vp = layout
            .nonterminal(&[words[1], ip], MainStrategy::Contains(words[1]), Vec::new(), Vec::new())
            .expect("VP");
        let vp = layout.label(vp, category("VP"), None).expect("label");
        layout
            .nonterminal(&[words[0], vp], MainStrategy::Widest, Vec::new(), Vec::new())
            .expect("S");

        for block in layout.blocks() {
            assert!(block.min_height >= block.top, "block {}", block.id);
            for content in &block.contents {
                if let Content::Nested { block: nested, .. } = content {
                    let inner = layout.block(*nested).expect("nested");
                    assert!(
                        inner.min_height <= block.min_height,
                        "{} inside {}",
                        inner.id,
                        block.id
                    );
                }
            }
        }
    }

    #[test]
    fn raising_below_min_height_is_an_error() {
        let mut layout = engine();
        let a = layout.terminal(word("a", 10.0));
        assert!(layout.raise(a, 30.0).is_ok());
        assert_eq!(
            layout.raise(a, 25.0),
            Err(LayoutError::HeightDecrease {
                block: a,
                from: 30.0,
                to: 25.0
            })
        );
    }

    #[test]
    fn main_group_scoring() {
        let span = [
            entry(0, 10.0, true),
            entry(1, 50.0, false),
            entry(2, 10.0, true),
            entry(3, 10.0, true),
        ];
        assert_eq!(select_main_group(&span, MainStrategy::Widest), Ok((2, 3)));
        assert_eq!(select_main_group(&span, MainStrategy::Contains(0)), Ok((0, 0)));
        assert_eq!(select_main_group(&span, MainStrategy::Only(3)), Ok((3, 3)));
        assert_eq!(
            select_main_group(&span, MainStrategy::Contains(1)),
            Err(LayoutError::Nomination {
                nominee: 1,
                matched: 0
            })
        );
    }

    #[test]
    fn sealed_entries_are_not_eligible() {
        let mut span = [entry(0, 10.0, true), entry(1, 10.0, true)];
        span[0].sealed = true;
        assert_eq!(select_main_group(&span, MainStrategy::Widest), Ok((1, 1)));
        span[1].sealed = true;
        assert_eq!(
            select_main_group(&span, MainStrategy::Widest),
            Err(LayoutError::EmptyMainGroup)
        );
    }
}
