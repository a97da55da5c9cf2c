//! Douglas-Peucker polyline simplification.

use glam::Vec2;

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Simplify an open chain. Endpoints are always kept.
pub fn simplify_open(points: &[Vec2], tolerance: f32) -> Vec<Vec2> {
    if points.len() <= 2 || tolerance <= 0.0 {
        return points.to_vec();
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0, points.len() - 1)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }
        let (idx, dist) = (first + 1..last)
            .map(|i| (i, segment_distance(points[i], points[first], points[last])))
            .fold((first, 0.0f32), |best, cur| if cur.1 > best.1 { cur } else { best });
        if dist > tolerance {
            keep[idx] = true;
            stack.push((first, idx));
            stack.push((idx, last));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Simplify a closed ring (first point not repeated at the end).
///
/// The ring is split at point 0 and the point farthest from it, and each
/// half is simplified as an open chain.
pub fn simplify_closed(points: &[Vec2], tolerance: f32) -> Vec<Vec2> {
    if points.len() <= 3 || tolerance <= 0.0 {
        return points.to_vec();
    }
    let anchor = points[0];
    let far = (1..points.len())
        .max_by(|&a, &b| {
            anchor
                .distance_squared(points[a])
                .total_cmp(&anchor.distance_squared(points[b]))
        })
        .unwrap_or(1);

    let mut first_half = simplify_open(&points[..=far], tolerance);
    let mut second: Vec<Vec2> = points[far..].to_vec();
    second.push(anchor);
    let second_half = simplify_open(&second, tolerance);

    // Drop the duplicated split points.
    first_half.pop();
    first_half.extend_from_slice(&second_half[..second_half.len() - 1]);
    first_half
}
