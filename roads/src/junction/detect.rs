use roads_api::{Point, Segment, SegmentEnd};

use utils::consts::PARAM_EPSILON;
use utils::id::{IdBehaviour, SegmentId};
use utils::math::segment_intersection;

use fixedbitset::FixedBitSet;
use glam::Vec2;
use std::collections::BTreeMap;

/// A segment touching a junction candidate. The road continues from `t` in the direction given
/// by `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Contact {
    pub segment: SegmentId,
    pub end: SegmentEnd,
    pub t: f32,
}

#[derive(Debug, Clone)]
struct Candidate {
    pos: Vec2,
    contacts: Vec<Contact>,
    /// Crossed tails too short to leave, swallowed by the junction.
    consumed: Vec<(SegmentId, f32, f32)>,
}

/// A group of candidates that is built as one junction.
#[derive(Debug, Clone)]
pub(crate) struct Cluster {
    pub center: Vec2,
    /// At most one contact per segment end, ordered by segment.
    pub contacts: Vec<Contact>,
    /// Parameter spans of segments that lie inside the junction.
    pub consumed: Vec<(SegmentId, f32, f32)>,
}

fn shares_point(s: &Segment, o: &Segment) -> bool {
    s.a_point == o.a_point
        || s.a_point == o.b_point
        || s.b_point == o.a_point
        || s.b_point == o.b_point
}

/// Adds the contacts of a segment crossed at `t`. A side too short to leave the junction is
/// consumed instead.
fn crossing_contacts(candidate: &mut Candidate, segment: &Segment, t: f32, threshold: f32) {
    let length = segment.length();
    if t * length > threshold {
        candidate.contacts.push(Contact {
            segment: segment.id,
            end: SegmentEnd::B,
            t,
        });
    } else if t > PARAM_EPSILON {
        candidate.consumed.push((segment.id, 0.0, t));
    }
    if (1.0 - t) * length > threshold {
        candidate.contacts.push(Contact {
            segment: segment.id,
            end: SegmentEnd::A,
            t,
        });
    } else if 1.0 - t > PARAM_EPSILON {
        candidate.consumed.push((segment.id, t, 1.0));
    }
}

fn candidates(points: &[Point], segments: &[Segment], threshold: f32) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = points
        .iter()
        .filter(|p| p.degree() >= 2)
        .map(|p| Candidate {
            pos: p.pos,
            contacts: p
                .segments
                .iter()
                .map(|id| {
                    let segment = &segments[id.to_usize()];
                    if segment.a_point == p.id {
                        Contact {
                            segment: *id,
                            end: SegmentEnd::A,
                            t: 0.0,
                        }
                    } else {
                        Contact {
                            segment: *id,
                            end: SegmentEnd::B,
                            t: 1.0,
                        }
                    }
                })
                .collect(),
            consumed: vec![],
        })
        .collect();

    for (i, s) in segments.iter().enumerate() {
        for o in segments[i + 1..].iter() {
            if shares_point(s, o) {
                continue;
            }
            let Some((ts, to)) = segment_intersection(s.a, s.b, o.a, o.b) else {
                continue;
            };
            let mut candidate = Candidate {
                pos: s.point_at(ts),
                contacts: vec![],
                consumed: vec![],
            };
            crossing_contacts(&mut candidate, s, ts, threshold);
            crossing_contacts(&mut candidate, o, to, threshold);
            if !candidate.contacts.is_empty() {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Merges the contacts of one cluster. Per segment the part between the outermost contacts lies
/// inside the junction; the road leaves forwards only if the last contact is an `A` contact and
/// backwards only if the first one is a `B` contact.
fn merge(members: &[&Candidate]) -> Option<Cluster> {
    let center = members.iter().map(|c| c.pos).sum::<Vec2>() / members.len() as f32;

    let mut per_segment: BTreeMap<SegmentId, Vec<Contact>> = BTreeMap::new();
    for contact in members.iter().flat_map(|c| c.contacts.iter()) {
        per_segment.entry(contact.segment).or_default().push(*contact);
    }

    let mut contacts = vec![];
    let mut consumed: Vec<_> = members
        .iter()
        .flat_map(|c| c.consumed.iter().copied())
        .collect();
    for (segment, list) in per_segment {
        let lo = list.iter().map(|c| c.t).fold(f32::INFINITY, f32::min);
        let hi = list.iter().map(|c| c.t).fold(f32::NEG_INFINITY, f32::max);
        let leaves = |end: SegmentEnd, at: f32| {
            list.iter()
                .any(|c| c.end == end && (c.t - at).abs() <= PARAM_EPSILON)
        };
        if leaves(SegmentEnd::B, lo) {
            contacts.push(Contact {
                segment,
                end: SegmentEnd::B,
                t: lo,
            });
        }
        if leaves(SegmentEnd::A, hi) {
            contacts.push(Contact {
                segment,
                end: SegmentEnd::A,
                t: hi,
            });
        }
        if hi - lo > PARAM_EPSILON {
            consumed.push((segment, lo, hi));
        }
    }

    if contacts.len() < 2 {
        log::debug!(
            "dropping junction candidate at {} with {} approaches",
            center,
            contacts.len()
        );
        return None;
    }
    Some(Cluster {
        center,
        contacts,
        consumed,
    })
}

/// Finds all junctions of the graph. With `tags`, only candidates close to a tag survive.
pub(crate) fn find_clusters(
    points: &[Point],
    segments: &[Segment],
    threshold: f32,
    tags: Option<&[Vec2]>,
) -> Vec<Cluster> {
    let mut candidates = candidates(points, segments, threshold);
    if let Some(tags) = tags {
        candidates.retain(|c| tags.iter().any(|t| t.distance(c.pos) <= threshold));
    }

    let n = candidates.len();
    let mut visited = FixedBitSet::with_capacity(n);
    let mut clusters = vec![];
    for start in 0..n {
        if visited.put(start) {
            continue;
        }
        let mut members = vec![];
        let mut stack = vec![start];
        while let Some(i) = stack.pop() {
            members.push(&candidates[i]);
            for j in 0..n {
                if !visited.contains(j) && candidates[i].pos.distance(candidates[j].pos) <= threshold
                {
                    visited.insert(j);
                    stack.push(j);
                }
            }
        }
        clusters.extend(merge(&members));
    }
    log::debug!(
        "{} junction candidates merged into {} junctions",
        n,
        clusters.len()
    );
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RoadGraph;
    use approx::assert_relative_eq;
    use roads_api::{ComputeSettings, RoadDesc, RoadSchema};

    fn clusters(schema: &RoadSchema, threshold: f32, tags: Option<&[Vec2]>) -> Vec<Cluster> {
        let graph = RoadGraph::build(schema, &ComputeSettings::default());
        find_clusters(&graph.points, &graph.segments, threshold, tags)
    }

    fn crossing() -> RoadSchema {
        RoadSchema::new()
            .with_road(RoadDesc::new(
                "h",
                1,
                1,
                [Vec2::new(-20.0, 0.0), Vec2::new(20.0, 0.0)],
            ))
            .with_road(RoadDesc::new(
                "v",
                1,
                1,
                [Vec2::new(0.0, -20.0), Vec2::new(0.0, 20.0)],
            ))
    }

    #[test]
    fn crossing_gives_four_contacts() {
        let clusters = clusters(&crossing(), 1.0, None);
        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.contacts.len(), 4);
        assert!(cluster.consumed.is_empty());
        assert_relative_eq!(cluster.center.x, 0.0);
        for c in cluster.contacts.iter() {
            assert_relative_eq!(c.t, 0.5);
        }
    }

    #[test]
    fn touching_end_only_leaves_one_way() {
        let schema = RoadSchema::new()
            .with_road(RoadDesc::new(
                "h",
                1,
                1,
                [Vec2::new(-20.0, 0.0), Vec2::new(20.0, 0.0)],
            ))
            .with_road(RoadDesc::new(
                "v",
                1,
                1,
                [Vec2::new(0.0, -20.0), Vec2::new(0.0, 0.0)],
            ));
        let clusters = clusters(&schema, 1.0, None);
        assert_eq!(clusters[0].contacts.len(), 3);
        let stub: Vec<_> = clusters[0]
            .contacts
            .iter()
            .filter(|c| c.segment == SegmentId::from_usize(1))
            .collect();
        assert_eq!(stub.len(), 1);
        assert_eq!(stub[0].end, SegmentEnd::B);
    }

    #[test]
    fn short_segment_between_merged_points_is_internal() {
        let schema = RoadSchema::new().with_road(RoadDesc::new(
            "zigzag",
            1,
            1,
            [
                Vec2::new(-20.0, 0.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(0.5, 0.0),
                Vec2::new(20.0, 0.0),
            ],
        ));
        let clusters = clusters(&schema, 1.0, None);
        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.contacts.len(), 2);
        assert!(cluster
            .contacts
            .iter()
            .all(|c| c.segment != SegmentId::from_usize(1)));
        assert_eq!(cluster.consumed, vec![(SegmentId::from_usize(1), 0.0, 1.0)]);
    }

    #[test]
    fn short_overshoot_is_consumed() {
        let schema = RoadSchema::new()
            .with_road(RoadDesc::new(
                "h",
                1,
                1,
                [Vec2::new(-50.0, 0.0), Vec2::new(50.0, 0.0)],
            ))
            .with_road(RoadDesc::new(
                "v",
                1,
                1,
                [Vec2::new(0.0, -50.0), Vec2::new(0.0, 0.3)],
            ));
        let clusters = clusters(&schema, 1.0, None);
        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.contacts.len(), 3);

        let v = SegmentId::from_usize(1);
        let stub: Vec<_> = cluster.contacts.iter().filter(|c| c.segment == v).collect();
        assert_eq!(stub.len(), 1);
        assert_eq!(stub[0].end, SegmentEnd::B);
        assert_eq!(cluster.consumed.len(), 1);
        let (segment, t0, t1) = cluster.consumed[0];
        assert_eq!(segment, v);
        assert_relative_eq!(t0, stub[0].t);
        assert_relative_eq!(t0, 50.0 / 50.3, epsilon = 1e-5);
        assert_relative_eq!(t1, 1.0);
    }

    #[test]
    fn tags_filter_candidates() {
        let tags = [Vec2::new(50.0, 50.0)];
        assert!(clusters(&crossing(), 1.0, Some(&tags)).is_empty());
        let tags = [Vec2::new(0.5, 0.0)];
        assert_eq!(clusters(&crossing(), 1.0, Some(&tags)).len(), 1);
    }

    #[test]
    fn lone_road_has_no_candidates() {
        let schema = RoadSchema::new().with_road(RoadDesc::new(
            "a",
            1,
            1,
            [Vec2::ZERO, Vec2::new(10.0, 0.0)],
        ));
        assert!(clusters(&schema, 1.0, None).is_empty());
    }
}
