use crate::geometry::Point;

use super::{LabelKind, SegmentKind};

/// A label positioned in output coordinates (y down, top-left corner).
#[derive(Debug, Clone)]
pub struct PlacedLabel {
    pub text: String,
    pub kind: LabelKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
}

impl PlacedLabel {
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LineLayout {
    pub kind: SegmentKind,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// A routed secondary edge.
#[derive(Debug, Clone)]
pub struct CurveLayout {
    pub from: String,
    pub to: String,
    pub label: String,
    pub points: Vec<Point>,
    /// SVG path data of the smoothed route.
    pub d: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnroutedEdge {
    pub from: String,
    pub to: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct TreeLayout {
    pub width: f32,
    pub height: f32,
    pub labels: Vec<PlacedLabel>,
    pub lines: Vec<LineLayout>,
    pub curves: Vec<CurveLayout>,
    pub unrouted: Vec<UnroutedEdge>,
}
