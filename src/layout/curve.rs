use crate::geometry::Point;

/// Catmull-Rom spline through `points` as SVG path data, tension `k` (1.0 is the
/// classic uniform spline). The first and last points are duplicated as their own
/// outer neighbours.
pub fn catmull_rom(points: &[Point], k: f32) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first.x, first.y);
    let last = points.len() - 1;
    for i in 0..last {
        let p0 = if i == 0 { points[0] } else { points[i - 1] };
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = if i + 1 == last { p2 } else { points[i + 2] };

        let cp1x = p1.x + (p2.x - p0.x) / 6.0 * k;
        let cp1y = p1.y + (p2.y - p0.y) / 6.0 * k;
        let cp2x = p2.x - (p3.x - p1.x) / 6.0 * k;
        let cp2y = p2.y - (p3.y - p1.y) / 6.0 * k;

        d.push_str(&format!(
            " C {cp1x:.2} {cp1y:.2} {cp2x:.2} {cp2y:.2} {:.2} {:.2}",
            p2.x, p2.y
        ));
    }
    d
}
