use roads_api::{
    BoundaryEdge, Connector, ConnectorKind, Diagnostic, Endpoint, ErrorKind, HalfEdge, Junction,
    JunctionBoundary, JunctionKind, Segment, SegmentEnd, Side, TurnAdjacency,
};

use curves::{dedup_polyline, CtrlPoints};
use utils::consts::{ANGLE_EPSILON, AREA_EPSILON, DEFAULT_MITER_LIMIT, FILLET_SEGMENTS, POINT_EPSILON};
use utils::id::{EndpointId, IdBehaviour, IdManager, JunctionId};
use utils::math::{convex_hull, is_simple, signed_area};
use utils::{Angle, PlanarUtils};

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use super::{Cluster, Contact};

/// Values shared by all junctions of one computation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JunctionParams {
    pub threshold: f32,
    pub trim: Option<f32>,
    pub fillet_radius: f32,
}

/// A road leaving the junction, in the frame of the junction.
#[derive(Debug, Clone, Copy)]
struct Approach {
    contact: Contact,
    anchor: Vec2,
    dir: Vec2,
    heading: f32,
    half_left: f32,
    half_right: f32,
    /// Length of road between the anchor and the end of the segment.
    available: f32,
}

impl Approach {
    fn new(contact: Contact, segment: &Segment) -> Self {
        let length = segment.length();
        let (dir, half_left, half_right, available) = match contact.end {
            SegmentEnd::A => (
                segment.dir(),
                segment.half_width_left,
                segment.half_width_right,
                (1.0 - contact.t) * length,
            ),
            SegmentEnd::B => (
                -segment.dir(),
                segment.half_width_right,
                segment.half_width_left,
                contact.t * length,
            ),
        };
        Self {
            contact,
            anchor: segment.point_at(contact.t),
            dir,
            heading: dir.heading(),
            half_left,
            half_right,
            available,
        }
    }

    fn edge(&self, side: Side) -> Vec2 {
        match side {
            Side::Left => self.anchor + self.dir.left_hand() * self.half_left,
            Side::Right => self.anchor + self.dir.right_hand() * self.half_right,
        }
    }

    /// Distance along the approach from its anchor to the given position.
    fn along(&self, pos: Vec2) -> f32 {
        (pos - self.anchor).dot(self.dir)
    }
}

/// Counter-clockwise angle from `a` to `b`.
fn gap(a: &Approach, b: &Approach) -> f32 {
    (b.heading - a.heading).rad_normalize()
}

fn is_inner(gap: f32) -> bool {
    gap > ANGLE_EPSILON && gap < PI - ANGLE_EPSILON
}

fn is_reflex(gap: f32) -> bool {
    gap > PI + ANGLE_EPSILON && gap < TAU - ANGLE_EPSILON
}

/// Where the left edge of `a` meets the right edge of its counter-clockwise neighbour `b`.
fn facing_corner(a: &Approach, b: &Approach) -> Option<Vec2> {
    a.edge(Side::Left)
        .intersection(a.dir, b.edge(Side::Right), b.dir)
}

fn fillet_tangent(radius: f32, gap: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    radius / (gap * 0.5).tan()
}

/// How far from its anchor every approach has to be cut open, such that the mouths clear the
/// neighbouring roads and leave room for the fillets.
fn reaches(approaches: &[Approach], params: &JunctionParams, multi: bool) -> Vec<f32> {
    let n = approaches.len();
    let mut reach: Vec<f32> = vec![params.threshold.max(params.trim.unwrap_or(0.0)); n];
    for i in 0..n {
        let (a, b) = (&approaches[i], &approaches[(i + 1) % n]);
        let gap = gap(a, b);
        if !is_inner(gap) {
            continue;
        }
        let Some(corner) = facing_corner(a, b) else {
            continue;
        };
        let tangent = if multi {
            fillet_tangent(params.fillet_radius, gap)
        } else {
            0.0
        };
        reach[i] = reach[i].max(a.along(corner) + tangent);
        let j = (i + 1) % n;
        reach[j] = reach[j].max(b.along(corner) + tangent);
    }
    reach
        .into_iter()
        .zip(approaches)
        .map(|(r, a)| r.min(a.available).max(0.0))
        .collect()
}

/// Pushes `p` unless it repeats the last point.
fn push_distinct(points: &mut Vec<Vec2>, p: Vec2) {
    if points
        .last()
        .map_or(true, |last| last.distance(p) > POINT_EPSILON)
    {
        points.push(p);
    }
}

fn connector_points(
    a: (&Approach, &Endpoint),
    b: (&Approach, &Endpoint),
    center: Vec2,
    fillet_radius: f32,
    multi: bool,
) -> (ConnectorKind, Vec<Vec2>) {
    let from = a.1.mouth_corner(Side::Left);
    let to = b.1.mouth_corner(Side::Right);
    let gap = gap(a.0, b.0);
    let corner = facing_corner(a.0, b.0);
    let mut points = vec![from];

    let kind = match corner {
        Some(x) if is_inner(gap) && multi => {
            let from_x = (from - x).dot(a.0.dir);
            let to_x = (to - x).dot(b.0.dir);
            if from_x < 0.0 || to_x < 0.0 {
                ConnectorKind::Straight
            } else if fillet_radius <= 0.0 {
                push_distinct(&mut points, x);
                ConnectorKind::Straight
            } else {
                let tangent = fillet_tangent(fillet_radius, gap).min(from_x).min(to_x);
                let fillet =
                    CtrlPoints::quadratic(x + a.0.dir * tangent, x, x + b.0.dir * tangent);
                for p in fillet.sample(FILLET_SEGMENTS) {
                    if p.distance(to) > POINT_EPSILON {
                        push_distinct(&mut points, p);
                    }
                }
                ConnectorKind::Curved
            }
        }
        Some(x) if is_reflex(gap) => {
            // the outer corner must lie behind both mouths, or the ring would fold over itself
            let limit = DEFAULT_MITER_LIMIT * a.0.half_left.max(b.0.half_right);
            let behind = a.0.along(x) <= a.0.along(a.1.mouth) + POINT_EPSILON
                && b.0.along(x) <= b.0.along(b.1.mouth) + POINT_EPSILON;
            if behind && x.distance(center) <= limit {
                push_distinct(&mut points, x);
            }
            ConnectorKind::Straight
        }
        _ => ConnectorKind::Straight,
    };
    points.push(to);
    (kind, points)
}

fn build_boundary(endpoints: &[Endpoint], connectors: &[Connector]) -> JunctionBoundary {
    let mut vertices = vec![];
    let mut kinds = vec![];
    for (i, (endpoint, connector)) in endpoints.iter().zip(connectors).enumerate() {
        vertices.push(endpoint.mouth_corner(Side::Right));
        kinds.push(BoundaryEdge::Mouth(endpoint.id));
        // the last connector point is the right corner of the next endpoint
        for p in connector.points[..connector.points.len() - 1].iter() {
            vertices.push(*p);
            kinds.push(BoundaryEdge::Connector(i));
        }
    }
    let m = vertices.len();
    let edges = kinds
        .into_iter()
        .enumerate()
        .map(|(k, kind)| HalfEdge {
            origin: k,
            next: (k + 1) % m,
            prev: (k + m - 1) % m,
            kind,
        })
        .collect();
    JunctionBoundary { vertices, edges }
}

/// Builds the junction of a cluster: orders the approaches, opens the mouths and closes the
/// surface with connectors between neighbouring approaches.
pub(crate) fn build_junction(
    id: JunctionId,
    cluster: &Cluster,
    segments: &[Segment],
    params: &JunctionParams,
    endpoint_ids: &mut IdManager<EndpointId>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Junction {
    let mut approaches: Vec<Approach> = cluster
        .contacts
        .iter()
        .map(|c| Approach::new(*c, &segments[c.segment.to_usize()]))
        .collect();
    approaches.sort_by(|a, b| {
        a.heading
            .total_cmp(&b.heading)
            .then(a.contact.segment.cmp(&b.contact.segment))
            .then(a.contact.end.cmp(&b.contact.end))
    });

    let n = approaches.len();
    let kind = if n == 2 {
        JunctionKind::Corner
    } else {
        JunctionKind::Multi
    };
    let multi = kind == JunctionKind::Multi;
    let reach = reaches(&approaches, params, multi);

    let endpoints: Vec<Endpoint> = approaches
        .iter()
        .zip(reach.iter())
        .map(|(a, reach)| {
            let trim = params.trim.unwrap_or(0.0).min(a.available);
            Endpoint {
                id: endpoint_ids.gen(),
                segment: a.contact.segment,
                end: a.contact.end,
                t: a.contact.t,
                anchor: a.anchor,
                position: a.anchor + a.dir * trim,
                mouth: a.anchor + a.dir * *reach,
                dir: a.dir,
                half_left: a.half_left,
                half_right: a.half_right,
            }
        })
        .collect();

    let mut connectors = Vec::with_capacity(n);
    let mut turns = Vec::with_capacity(n);
    for i in 0..n {
        let j = (i + 1) % n;
        let (from, to) = (&endpoints[i], &endpoints[j]);
        let (connector_kind, points) = connector_points(
            (&approaches[i], from),
            (&approaches[j], to),
            cluster.center,
            params.fillet_radius,
            multi,
        );
        connectors.push(Connector {
            from: from.id,
            to: to.id,
            kind: connector_kind,
            points,
        });
        turns.push(TurnAdjacency {
            from_endpoint: from.id,
            from_segment: from.segment,
            from_side: from.segment_side(Side::Left),
            to_endpoint: to.id,
            to_segment: to.segment,
            to_side: to.segment_side(Side::Right),
        });
    }

    let boundary = build_boundary(&endpoints, &connectors);
    let mut surface = dedup_polyline(&boundary.ring(), true);
    if !is_simple(&surface) {
        // approaches too close in angle for their mouths to clear each other
        diagnostics.push(Diagnostic::new(
            ErrorKind::DegenerateGeometry,
            format!(
                "junction {} at {} crosses itself, using its convex hull",
                id, cluster.center
            ),
        ));
        surface = convex_hull(&surface);
    }
    if signed_area(&surface) <= AREA_EPSILON {
        diagnostics.push(Diagnostic::new(
            ErrorKind::DegenerateGeometry,
            format!("junction {} at {} has no area", id, cluster.center),
        ));
    }

    Junction {
        id,
        kind,
        center: cluster.center,
        threshold: params.threshold,
        endpoints,
        surface,
        connectors,
        turns,
        boundary,
    }
}
