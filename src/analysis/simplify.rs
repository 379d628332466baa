//! Douglas-Peucker polygon simplification

use crate::spatial::buffer::Point;

/// Perpendicular distance from `p` to segment `a`-`b`
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let length_sq = abx.mul_add(abx, aby * aby);
    if length_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p.x - a.x).mul_add(abx, (p.y - a.y) * aby) / length_sq).clamp(0.0, 1.0);
    p.distance(Point::new(abx.mul_add(t, a.x), aby.mul_add(t, a.y)))
}

/// Simplify an open polyline, keeping both endpoints
///
/// A point survives when its deviation from the chord of the current span exceeds
/// `tolerance`. Uses an explicit work stack so long contours cannot overflow.
pub fn simplify_polyline(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 || tolerance <= 0.0 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    if let Some(flag) = keep.first_mut() {
        *flag = true;
    }
    if let Some(flag) = keep.last_mut() {
        *flag = true;
    }

    let mut stack = vec![(0usize, last)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (Some(&a), Some(&b)) = (points.get(start), points.get(end)) else {
            continue;
        };
        let mut farthest = start;
        let mut max_distance = 0.0;
        for (offset, &p) in points.get(start + 1..end).unwrap_or_default().iter().enumerate() {
            let distance = point_to_segment_distance(p, a, b);
            if distance > max_distance {
                max_distance = distance;
                farthest = start + 1 + offset;
            }
        }
        if max_distance > tolerance {
            if let Some(flag) = keep.get_mut(farthest) {
                *flag = true;
            }
            stack.push((start, farthest));
            stack.push((farthest, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(&point, kept)| kept.then_some(point))
        .collect()
}

/// Simplify a closed ring (first point not repeated at the end)
///
/// The ring is split at its first point and the vertex farthest from it, and each half
/// is simplified as a polyline. Rings that would collapse below three points are
/// returned unchanged.
pub fn simplify_closed(ring: &[Point], tolerance: f64) -> Vec<Point> {
    if ring.len() < 4 || tolerance <= 0.0 {
        return ring.to_vec();
    }
    let Some(&anchor) = ring.first() else {
        return Vec::new();
    };

    let split = ring
        .iter()
        .enumerate()
        .skip(1)
        .fold((1, 0.0), |best, (index, &p)| {
            let distance = p.distance(anchor);
            if distance > best.1 { (index, distance) } else { best }
        })
        .0;

    let first_half = ring.get(..=split).unwrap_or_default();
    let mut second_half: Vec<Point> = ring.get(split..).unwrap_or_default().to_vec();
    second_half.push(anchor);

    let mut simplified = simplify_polyline(first_half, tolerance);
    let tail = simplify_polyline(&second_half, tolerance);
    // Skip the shared split vertex and the repeated anchor
    let tail_len = tail.len();
    simplified.extend(tail.into_iter().take(tail_len.saturating_sub(1)).skip(1));

    if simplified.len() < 3 {
        ring.to_vec()
    } else {
        simplified
    }
}

/// Signed shoelace area; positive for clockwise rings in image coordinates
pub fn signed_area(ring: &[Point]) -> f64 {
    let len = ring.len();
    if len < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for (i, a) in ring.iter().enumerate() {
        if let Some(b) = ring.get((i + 1) % len) {
            twice_area += a.x.mul_add(b.y, -(b.x * a.y));
        }
    }
    twice_area * 0.5
}
