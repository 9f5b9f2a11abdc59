use glam::Vec2;

use super::PlanarUtils;
use crate::consts::{LENGTH_EPSILON, PARAM_EPSILON};

/// Shoelace area. Positive for counter-clockwise rings.
pub fn signed_area(points: &[Vec2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        sum += a.cross2(b);
    }
    sum * 0.5
}

pub fn polygon_area(points: &[Vec2]) -> f32 {
    signed_area(points).abs()
}

/// True if every turn of the ring goes in the same direction. Collinear vertices are allowed.
pub fn is_convex(points: &[Vec2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let turn = (b - a).cross2(c - b);
        if turn.abs() <= LENGTH_EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}

/// Intersection of the closed segments `a0 a1` and `b0 b1`. Returns the parameters along both
/// segments, or `None` if they do not meet or are parallel.
pub fn segment_intersection(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> Option<(f32, f32)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let denom = da.cross2(db);
    if denom.abs() < LENGTH_EPSILON {
        return None;
    }
    let diff = b0 - a0;
    let s = diff.cross2(db) / denom;
    let t = diff.cross2(da) / denom;
    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some((s, t))
    } else {
        None
    }
}

/// True if no two edges of the ring cross or touch, apart from neighbours sharing their vertex.
/// Two edges meeting only in a vertex of each, as in a repeated vertex, are still allowed.
pub fn is_simple(ring: &[Vec2]) -> bool {
    let n = ring.len();
    let inner = |t: f32| t > PARAM_EPSILON && t < 1.0 - PARAM_EPSILON;
    for i in 0..n {
        // the last edge neighbours the first one
        let end = if i == 0 { n - 1 } else { n };
        for j in i + 2..end {
            let hit = segment_intersection(ring[i], ring[(i + 1) % n], ring[j], ring[(j + 1) % n]);
            if matches!(hit, Some((s, t)) if inner(s) || inner(t)) {
                return false;
            }
        }
    }
    true
}

/// Keeps only left turns while walking the points in order.
fn hull_chain<'a>(points: impl Iterator<Item = &'a Vec2>) -> Vec<Vec2> {
    let mut chain: Vec<Vec2> = vec![];
    for &p in points {
        while chain.len() >= 2 {
            let (a, b) = (chain[chain.len() - 2], chain[chain.len() - 1]);
            if (b - a).cross2(p - b) > 0.0 {
                break;
            }
            chain.pop();
        }
        chain.push(p);
    }
    chain
}

/// Counter-clockwise convex hull, without collinear points.
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }
    let mut lower = hull_chain(sorted.iter());
    let mut upper = hull_chain(sorted.iter().rev());
    // each chain ends where the other one starts
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ]
    }

    #[test]
    fn area_sign_follows_winding() {
        let mut ring = square();
        assert_relative_eq!(signed_area(&ring), 4.0);
        ring.reverse();
        assert_relative_eq!(signed_area(&ring), -4.0);
        assert_relative_eq!(polygon_area(&ring), 4.0);
    }

    #[test]
    fn convexity() {
        assert!(is_convex(&square()));
        let arrow = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(0.5, 1.0),
        ];
        assert!(!is_convex(&arrow));
        assert!(!is_convex(&square()[..2]));
    }

    #[test]
    fn crossing_segments() {
        let (s, t) = segment_intersection(
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, -2.0),
            Vec2::new(0.0, 2.0),
        )
        .unwrap();
        assert_relative_eq!(s, 0.5);
        assert_relative_eq!(t, 0.5);
        assert!(segment_intersection(
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, -2.0),
            Vec2::new(2.0, 2.0),
        )
        .is_none());
    }

    #[test]
    fn bow_tie_is_not_simple() {
        assert!(is_simple(&square()));
        let bow_tie = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 2.0),
        ];
        assert!(!is_simple(&bow_tie));
        // a vertex resting on a far edge
        let pinched = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 2.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 2.0),
        ];
        assert!(!is_simple(&pinched));
        assert!(is_simple(&square()[..3]));
    }

    #[test]
    fn hull_drops_inner_and_collinear_points() {
        let points = vec![
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(
            hull,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(2.0, 2.0),
                Vec2::new(0.0, 2.0),
            ]
        );
        assert_relative_eq!(signed_area(&hull), 4.0);
        assert!(is_convex(&hull));
    }
}
