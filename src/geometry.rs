use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Bit pattern of both coordinates, for exact-match sets.
    pub(crate) fn key(&self) -> (u32, u32) {
        (self.x.to_bits(), self.y.to_bits())
    }

    fn flipped(&self) -> Point {
        Point::new(self.y, self.x)
    }
}

/// Axis-aligned box given by two opposite corners. The corners need not be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_origin(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn left(&self) -> f32 {
        self.x1.min(self.x2)
    }

    pub fn right(&self) -> f32 {
        self.x1.max(self.x2)
    }

    pub fn bottom(&self) -> f32 {
        self.y1.min(self.y2)
    }

    pub fn top(&self) -> f32 {
        self.y1.max(self.y2)
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x1, self.y1),
            Point::new(self.x1, self.y2),
            Point::new(self.x2, self.y2),
            Point::new(self.x2, self.y1),
        ]
    }

    /// The four sides as obstacle lines.
    pub fn lines(&self) -> [Line; 4] {
        let (left, right, bottom, top) = (self.left(), self.right(), self.bottom(), self.top());
        [
            Line::Vertical { x: left, bottom, top },
            Line::Vertical { x: right, bottom, top },
            Line::Horizontal { y: top, left, right },
            Line::Horizontal { y: bottom, left, right },
        ]
    }

    /// Scale around the centre, independently per axis.
    pub fn scaled(&self, rx: f32, ry: f32) -> Rect {
        let xm = (self.x1 + self.x2) / 2.0;
        let ym = (self.y1 + self.y2) / 2.0;
        let w = (self.x1 - self.x2).abs();
        let h = (self.y1 - self.y2).abs();
        Rect {
            x1: xm - w * rx / 2.0,
            x2: xm + w * rx / 2.0,
            y1: ym - h * ry / 2.0,
            y2: ym + h * ry / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Line {
    Vertical { x: f32, bottom: f32, top: f32 },
    Horizontal { y: f32, left: f32, right: f32 },
}

impl Line {
    /// Mirror across the diagonal so a horizontal line becomes vertical.
    fn flipped(&self) -> Line {
        match *self {
            Line::Vertical { x, bottom, top } => Line::Horizontal {
                y: x,
                left: bottom,
                right: top,
            },
            Line::Horizontal { y, left, right } => Line::Vertical {
                x: y,
                bottom: left,
                top: right,
            },
        }
    }
}

/// Does the segment `p`-`q` cross `line` strictly between the line's endpoints?
///
/// Segments parallel to a vertical line (same x at both ends) never intersect it,
/// even when collinear and overlapping.
pub fn intersects(p: Point, q: Point, line: &Line) -> bool {
    let (x, bottom, top) = match *line {
        Line::Vertical { x, bottom, top } => (x, bottom, top),
        horizontal @ Line::Horizontal { .. } => {
            return intersects(p.flipped(), q.flipped(), &horizontal.flipped());
        }
    };
    let dx = p.x - q.x;
    let dy = p.y - q.y;
    if dx == 0.0 {
        return false;
    }
    let left = p.x.min(q.x);
    let right = p.x.max(q.x);
    if x > right || x < left {
        return false;
    }
    let k = dy / dx;
    let m = p.y - k * p.x;
    let y = k * x + m;
    bottom < y && y < top
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segment_hits_vertical_line() {
        let line = Line::Vertical {
            x: 5.0,
            bottom: 0.0,
            top: 10.0,
        };
        assert!(intersects(Point::new(0.0, 5.0), Point::new(10.0, 5.0), &line));
        assert!(!intersects(Point::new(0.0, 15.0), Point::new(10.0, 15.0), &line));
        assert!(!intersects(Point::new(0.0, 5.0), Point::new(4.0, 5.0), &line));
    }

    #[test]
    fn vertical_segment_never_hits_vertical_line() {
        let line = Line::Vertical {
            x: 5.0,
            bottom: 0.0,
            top: 10.0,
        };
        assert!(!intersects(Point::new(5.0, -5.0), Point::new(5.0, 15.0), &line));
    }

    #[test]
    fn horizontal_line_is_tested_through_flip() {
        let line = Line::Horizontal {
            y: 5.0,
            left: 0.0,
            right: 10.0,
        };
        assert!(intersects(Point::new(3.0, 0.0), Point::new(3.0, 10.0), &line));
        assert!(!intersects(Point::new(12.0, 0.0), Point::new(12.0, 10.0), &line));
    }

    #[test]
    fn touching_the_endpoint_is_not_a_crossing() {
        let line = Line::Vertical {
            x: 5.0,
            bottom: 0.0,
            top: 10.0,
        };
        assert!(!intersects(Point::new(0.0, 10.0), Point::new(10.0, 10.0), &line));
    }

    #[test]
    fn scaling_keeps_centre_and_shrinks() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0).scaled(0.5, 0.5);
        assert_eq!(rect, Rect::new(25.0, 12.5, 75.0, 37.5));
    }

    #[test]
    fn box_sides_cover_all_four_edges() {
        let lines = Rect::new(4.0, 8.0, 0.0, 2.0).lines();
        assert_eq!(
            lines[0],
            Line::Vertical {
                x: 0.0,
                bottom: 2.0,
                top: 8.0
            }
        );
        assert_eq!(
            lines[2],
            Line::Horizontal {
                y: 8.0,
                left: 0.0,
                right: 4.0
            }
        );
    }
}
