use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::config::RoutingConfig;
use crate::geometry::{Line, Point, Rect, intersects};

#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    pub distance: f32,
    pub path: Vec<Point>,
}

/// Candidates reachable from `p` without crossing any of `lines`.
pub fn visible(p: Point, candidates: &[Point], lines: &[Line]) -> Vec<Point> {
    candidates
        .iter()
        .copied()
        .filter(|q| lines.iter().all(|line| !intersects(p, *q, line)))
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Trail {
    point: Point,
    back: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    dist: f32,
    seq: usize,
    trail: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: invert so the shortest distance pops first,
        // and among equal distances the earliest push.
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest unobstructed polyline from `source` to `target` around `boxes`.
///
/// Waypoints are the target and every box corner; obstacles are the box sides,
/// shrunk by the configured scale factors so that paths hugging a box edge or
/// passing through a corner stay legal. Returns `None` when the target cannot be
/// reached.
pub fn shortest_path(
    source: Point,
    target: Point,
    boxes: &[Rect],
    config: &RoutingConfig,
) -> Option<ShortestPath> {
    let mut points = Vec::with_capacity(1 + boxes.len() * 4);
    points.push(target);
    points.extend(boxes.iter().flat_map(|b| b.corners()));
    let lines: Vec<Line> = boxes
        .iter()
        .flat_map(|b| b.scaled(config.box_scale_x, config.box_scale_y).lines())
        .collect();

    let mut trails = vec![Trail {
        point: source,
        back: None,
    }];
    let mut heap = BinaryHeap::new();
    let mut seq = 0usize;
    heap.push(QueueEntry {
        dist: 0.0,
        seq,
        trail: 0,
    });
    let mut visited: HashSet<(u32, u32)> = HashSet::new();
    let target_key = target.key();

    while let Some(QueueEntry { dist, trail, .. }) = heap.pop() {
        let point = trails[trail].point;
        if point.key() == target_key {
            return Some(ShortestPath {
                distance: dist,
                path: unroll(&trails, trail),
            });
        }
        if !visited.insert(point.key()) {
            continue;
        }
        for q in visible(point, &points, &lines) {
            if visited.contains(&q.key()) {
                continue;
            }
            trails.push(Trail {
                point: q,
                back: Some(trail),
            });
            seq += 1;
            heap.push(QueueEntry {
                dist: dist + point.distance(&q),
                seq,
                trail: trails.len() - 1,
            });
        }
    }
    None
}

fn unroll(trails: &[Trail], mut at: usize) -> Vec<Point> {
    let mut out = Vec::new();
    loop {
        out.push(trails[at].point);
        match trails[at].back {
            Some(back) => at = back,
            None => break,
        }
    }
    out.reverse();
    out
}
