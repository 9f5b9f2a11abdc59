//! Offsetting of polylines to the right hand side of their direction of travel, with miter joins
//! that fall back to bevels when a join would get sharper than the miter limit.

use glam::Vec2;

use utils::consts::{LENGTH_EPSILON, POINT_EPSILON};
use utils::PlanarUtils;

/// A pair of points of an offset band: the point at the inner offset and the point at the outer
/// offset. Consecutive pairs form the quads of the band.
pub type BandPair = [Vec2; 2];

/// Removes consecutive duplicates. For closed polylines a trailing point equal to the first one
/// is removed as well, since closure is implied.
pub fn dedup_polyline(points: &[Vec2], closed: bool) -> Vec<Vec2> {
    let mut result: Vec<Vec2> = Vec::with_capacity(points.len());
    for p in points {
        if result
            .last()
            .map_or(true, |last| last.distance(*p) > POINT_EPSILON)
        {
            result.push(*p);
        }
    }
    if closed && result.len() > 1 && result[0].distance(result[result.len() - 1]) <= POINT_EPSILON
    {
        result.pop();
    }
    result
}

enum Join {
    Single(Vec2, f32),
    Bevel(Vec2, Vec2),
}

/// Computes the join at every vertex. Offsets go along the returned direction(s), a miter is
/// scaled such that both adjacent edges end up at the requested distance.
fn joins(points: &[Vec2], closed: bool, miter_limit: f32) -> Vec<Join> {
    let n = points.len();
    let edge_normal = |i: usize| -> Vec2 {
        let a = points[i % n];
        let b = points[(i + 1) % n];
        (b - a).normalize_else().right_hand()
    };

    (0..n)
        .map(|i| {
            let incoming = if i > 0 {
                Some(edge_normal(i - 1))
            } else if closed {
                Some(edge_normal(n - 1))
            } else {
                None
            };
            let outgoing = if i + 1 < n || closed {
                Some(edge_normal(i))
            } else {
                None
            };

            match (incoming, outgoing) {
                (Some(na), Some(nb)) => {
                    let sum = na + nb;
                    if sum.length() < LENGTH_EPSILON {
                        return Join::Bevel(na, nb);
                    }
                    let dir = sum.normalize();
                    let cos_half = dir.dot(na);
                    let scale = 1.0 / cos_half.max(LENGTH_EPSILON);
                    if scale > miter_limit {
                        Join::Bevel(na, nb)
                    } else {
                        Join::Single(dir, scale)
                    }
                }
                (Some(normal), None) | (None, Some(normal)) => Join::Single(normal, 1.0),
                (None, None) => Join::Single(Vec2::ZERO, 0.0),
            }
        })
        .collect()
}

/// Offsets the polyline by `distance` to its right hand side. Bevel joins contribute two points,
/// so the result may be longer than the input.
pub fn offset_polyline(points: &[Vec2], closed: bool, distance: f32, miter_limit: f32) -> Vec<Vec2> {
    offset_band(points, closed, 0.0, distance, miter_limit)
        .into_iter()
        .map(|[_, outer]| outer)
        .collect()
}

/// Offsets the polyline to both `inner` and `outer` distances at once, such that the two sides
/// stay aligned pair by pair. The join type is decided once per vertex so both sides agree.
pub fn offset_band(
    points: &[Vec2],
    closed: bool,
    inner: f32,
    outer: f32,
    miter_limit: f32,
) -> Vec<BandPair> {
    let points = dedup_polyline(points, closed);
    if points.len() < 2 {
        return vec![];
    }
    let closed = closed && points.len() > 2;

    let mut band = Vec::with_capacity(points.len() + 4);
    for (p, join) in points.iter().zip(joins(&points, closed, miter_limit)) {
        match join {
            Join::Single(dir, scale) => {
                band.push([*p + dir * inner * scale, *p + dir * outer * scale]);
            }
            Join::Bevel(na, nb) => {
                band.push([*p + na * inner, *p + na * outer]);
                band.push([*p + nb * inner, *p + nb * outer]);
            }
        }
    }
    band
}
