//! The outline of all asphalt in a network, as chains that keep the asphalt on their left. Curbs,
//! sidewalks and edge strips are all offsets of these chains.
use roads_api::{DerivedNetwork, Segment, SegmentEnd, Side};

use curves::dedup_polyline;
use utils::consts::LENGTH_EPSILON;
use utils::id::SegmentId;

use fixedbitset::FixedBitSet;
use glam::Vec2;

/// Positions closer than this are considered the same when chains are stitched.
const STITCH_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryChain {
    pub points: Vec<Vec2>,
    /// Closed chains repeat no point, the last point connects to the first.
    pub closed: bool,
}

/// Returns the complement of the given intervals in `[0, 1]`.
fn complement(mut intervals: Vec<(f32, f32)>) -> Vec<(f32, f32)> {
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut result = vec![];
    let mut cursor = 0.0_f32;
    for (t0, t1) in intervals {
        let (t0, t1) = (t0.clamp(0.0, 1.0), t1.clamp(0.0, 1.0));
        if t0 > cursor {
            result.push((cursor, t0));
        }
        cursor = cursor.max(t1);
    }
    if cursor < 1.0 {
        result.push((cursor, 1.0));
    }
    result
}

/// The visible asphalt runs of a segment: its kept pieces, cut back further to the junction
/// mouths. Each run also tells if its ends are open, i.e. not covered by a junction.
fn runs(network: &DerivedNetwork, segment: &Segment) -> Vec<(f32, f32, bool, bool)> {
    let length = segment.length();
    let endpoints = network.endpoints_of(segment.id);

    let mut cuts = complement(segment.kept.iter().map(|p| (p.t0, p.t1)).collect());
    let mut mouths = vec![];
    for (_, endpoint) in endpoints.iter() {
        let reach = endpoint.anchor.distance(endpoint.mouth) / length;
        let (cut, mouth) = match endpoint.end {
            SegmentEnd::A => ((endpoint.t, endpoint.t + reach), endpoint.t + reach),
            SegmentEnd::B => ((endpoint.t - reach, endpoint.t), endpoint.t - reach),
        };
        cuts.push(cut);
        mouths.push(mouth);
    }
    let at_mouth = |t: f32| mouths.iter().any(|m| (m - t).abs() * length <= STITCH_TOLERANCE);

    complement(cuts)
        .into_iter()
        .filter(|(t0, t1)| (t1 - t0) * length >= LENGTH_EPSILON)
        .map(|(t0, t1)| (t0, t1, !at_mouth(t0), !at_mouth(t1)))
        .collect()
}

/// Every piece of outline as a directed polyline with the asphalt on its left.
fn links(network: &DerivedNetwork) -> Vec<Vec<Vec2>> {
    let mut links = vec![];
    for segment in network.segments.iter() {
        for (t0, t1, open_start, open_end) in runs(network, segment) {
            let right = [segment.edge_at(t0, Side::Right), segment.edge_at(t1, Side::Right)];
            let left = [segment.edge_at(t1, Side::Left), segment.edge_at(t0, Side::Left)];
            links.push(right.to_vec());
            if open_end {
                links.push(vec![right[1], left[0]]);
            }
            links.push(left.to_vec());
            if open_start {
                links.push(vec![left[1], right[0]]);
            }
        }
    }
    for junction in network.junctions.iter() {
        links.extend(junction.connectors.iter().map(|c| c.points.clone()));
    }
    links
}

fn find(links: &[Vec<Vec2>], used: &FixedBitSet, matches: impl Fn(&[Vec2]) -> bool) -> Option<usize> {
    (0..links.len()).find(|i| !used.contains(*i) && matches(&links[*i]))
}

fn same(a: Vec2, b: Vec2) -> bool {
    a.distance(b) <= STITCH_TOLERANCE
}

/// Stitches the outline of the network into chains.
pub fn boundary_chains(network: &DerivedNetwork) -> Vec<BoundaryChain> {
    let links = links(network);
    let mut used = FixedBitSet::with_capacity(links.len());
    let mut chains = vec![];

    for start in 0..links.len() {
        if used.put(start) {
            continue;
        }
        let mut points = links[start].clone();
        let mut closed = false;
        loop {
            if points.len() > 2 && same(points[0], points[points.len() - 1]) {
                closed = true;
                break;
            }
            let end = points[points.len() - 1];
            let Some(next) = find(&links, &used, |l| same(l[0], end)) else {
                break;
            };
            used.insert(next);
            points.extend_from_slice(&links[next][1..]);
        }
        if !closed {
            while let Some(prev) = find(&links, &used, |l| same(l[l.len() - 1], points[0])) {
                used.insert(prev);
                let mut head = links[prev][..links[prev].len() - 1].to_vec();
                head.extend(points);
                points = head;
            }
        }

        let points = dedup_polyline(&points, closed);
        if points.len() >= 2 {
            chains.push(BoundaryChain { points, closed });
        }
    }
    log::debug!(
        "stitched {} outline links into {} chains",
        links.len(),
        chains.len()
    );
    chains
}

/// The parameter intervals of a segment that show asphalt outside of any junction surface.
pub(crate) fn visible_runs(network: &DerivedNetwork, segment: &Segment) -> Vec<(f32, f32)> {
    runs(network, segment)
        .into_iter()
        .map(|(t0, t1, _, _)| (t0, t1))
        .collect()
}

/// Length of the asphalt a segment actually shows, for consumers that skip short runs.
pub fn visible_length(network: &DerivedNetwork, segment: SegmentId) -> f32 {
    let segment = network.segment(segment);
    visible_runs(network, segment)
        .iter()
        .map(|(t0, t1)| (t1 - t0) * segment.length())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roads::compute;
    use roads_api::{ComputeSettings, JunctionMode, PathRef, RoadDesc, RoadSchema};
    use utils::id::IdBehaviour;
    use utils::math::signed_area;

    fn straight() -> DerivedNetwork {
        let schema = RoadSchema::new().with_road(RoadDesc::new(
            "a",
            1,
            1,
            [Vec2::ZERO, Vec2::new(20.0, 0.0)],
        ));
        compute(&schema, &ComputeSettings::default()).unwrap()
    }

    fn tee() -> DerivedNetwork {
        let schema = RoadSchema::new()
            .with_point(0, Vec2::ZERO)
            .with_road(RoadDesc::new(
                "west",
                1,
                1,
                [PathRef::Pos(Vec2::new(-60.0, 0.0)), PathRef::Point(0)],
            ))
            .with_road(RoadDesc::new(
                "east",
                1,
                1,
                [PathRef::Point(0), PathRef::Pos(Vec2::new(60.0, 0.0))],
            ))
            .with_road(RoadDesc::new(
                "north",
                1,
                1,
                [PathRef::Point(0), PathRef::Pos(Vec2::new(0.0, 60.0))],
            ));
        compute(&schema, &ComputeSettings::default()).unwrap()
    }

    #[test]
    fn lone_road_is_one_counter_clockwise_ring() {
        let chains = boundary_chains(&straight());
        assert_eq!(chains.len(), 1);
        let chain = &chains[0];
        assert!(chain.closed);
        assert_eq!(chain.points.len(), 4);
        // asphalt on the left of a closed chain means counter-clockwise
        assert_relative_eq!(signed_area(&chain.points), 20.0 * 10.65, epsilon = 1e-2);
    }

    #[test]
    fn t_junction_outline_is_one_ring() {
        let network = tee();
        let chains = boundary_chains(&network);
        assert_eq!(chains.len(), 1);
        assert!(chains[0].closed);
        assert!(signed_area(&chains[0].points) > 0.0);
    }

    #[test]
    fn short_overshoot_leaves_no_stray_ring() {
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
        let network = compute(&schema, &ComputeSettings::default()).unwrap();
        let chains = boundary_chains(&network);
        assert_eq!(chains.len(), 1);
        assert!(chains[0].closed);
        assert!(signed_area(&chains[0].points) > 0.0);
    }

    #[test]
    fn crossing_with_disabled_junctions_gives_two_rings() {
        let schema = RoadSchema::new()
            .with_road(RoadDesc::new(
                "h",
                1,
                1,
                [Vec2::new(-30.0, 0.0), Vec2::new(30.0, 0.0)],
            ))
            .with_road(RoadDesc::new(
                "v",
                1,
                1,
                [Vec2::new(0.0, -30.0), Vec2::new(0.0, 30.0)],
            ));
        let mut settings = ComputeSettings::default();
        settings.junctions.mode = JunctionMode::Disabled;
        let network = compute(&schema, &settings).unwrap();
        let chains = boundary_chains(&network);
        assert_eq!(chains.len(), 2);
        assert!(chains.iter().all(|c| c.closed));
    }

    #[test]
    fn visible_length_stops_at_mouths() {
        let network = tee();
        let east = &network.junctions[0].endpoints[0];
        let reach = east.anchor.distance(east.mouth);
        assert_relative_eq!(visible_length(&network, SegmentId::from_usize(1)), 60.0 - reach, epsilon = 1e-3);
        assert_relative_eq!(visible_length(&straight(), SegmentId::from_usize(0)), 20.0, epsilon = 1e-5);
    }

    #[test]
    fn empty_network_has_no_outline() {
        assert!(boundary_chains(&DerivedNetwork::default()).is_empty());
    }
}
