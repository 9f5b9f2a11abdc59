use roads_api::{Junction, Segment, SegmentEnd};

use utils::consts::LENGTH_EPSILON;
use utils::id::{IdBehaviour, SegmentId};

/// Returns the complement of `cuts` within `[0, 1]`, sorted and without overlaps.
fn complement(mut cuts: Vec<(f32, f32)>) -> Vec<(f32, f32)> {
    cuts.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut kept = vec![];
    let mut cursor = 0.0_f32;
    for (t0, t1) in cuts {
        let (t0, t1) = (t0.clamp(0.0, 1.0), t1.clamp(0.0, 1.0));
        if t0 > cursor {
            kept.push((cursor, t0));
        }
        cursor = cursor.max(t1);
    }
    if cursor < 1.0 {
        kept.push((cursor, 1.0));
    }
    kept
}

/// Cuts every segment back from the junctions it touches and stores the kept pieces. Without
/// trimming every segment keeps its whole range.
pub(crate) fn apply(
    segments: &mut [Segment],
    junctions: &[Junction],
    consumed: &[(SegmentId, f32, f32)],
    enabled: bool,
) {
    let mut cuts: Vec<Vec<(f32, f32)>> = vec![vec![]; segments.len()];
    if enabled {
        for endpoint in junctions.iter().flat_map(|j| j.endpoints.iter()) {
            let segment = &segments[endpoint.segment.to_usize()];
            let d = endpoint.anchor.distance(endpoint.position) / segment.length();
            cuts[endpoint.segment.to_usize()].push(match endpoint.end {
                SegmentEnd::A => (endpoint.t, endpoint.t + d),
                SegmentEnd::B => (endpoint.t - d, endpoint.t),
            });
        }
        for (segment, t0, t1) in consumed {
            cuts[segment.to_usize()].push((*t0, *t1));
        }
    }

    let mut dropped = 0;
    for (segment, cuts) in segments.iter_mut().zip(cuts) {
        let length = segment.length();
        let kept: Vec<_> = complement(cuts)
            .into_iter()
            .filter(|(t0, t1)| {
                let keep = (t1 - t0) * length >= LENGTH_EPSILON;
                dropped += usize::from(!keep);
                keep
            })
            .collect();
        segment.kept = kept
            .into_iter()
            .map(|(t0, t1)| segment.piece(t0, t1))
            .collect();
    }
    if dropped > 0 {
        log::debug!("dropped {} collapsed pieces", dropped);
    }
}
