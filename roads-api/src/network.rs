//! The derived network is the output of the compute engine. It is computed in one pass and never
//! mutated afterwards.
use glam::Vec2;
use serde::{Deserialize, Serialize};

use utils::id::{EndpointId, IdBehaviour, JunctionId, PointId, RoadId, SegmentId};
use utils::PlanarUtils;

use crate::Diagnostic;

/// The two sides of a segment or an endpoint. Left is the counter-clockwise side of the direction
/// of travel in the `(x, z)` plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn switch(&self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Defines at which end of the remaining road a junction sits. At an `A` end the road continues
/// from the junction in the direction of the segment, at a `B` end against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SegmentEnd {
    A,
    B,
}

impl SegmentEnd {
    /// Converts a side given in the frame of an endpoint into the frame of its segment.
    pub fn to_segment_side(self, side: Side) -> Side {
        match self {
            SegmentEnd::A => side,
            SegmentEnd::B => side.switch(),
        }
    }
}

/// A copy of an input road, for reference by consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub id: RoadId,
    pub tag: String,
    pub points: Vec<Vec2>,
    pub lanes_f: u8,
    pub lanes_b: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub pos: Vec2,
    pub segments: Vec<SegmentId>,
}

impl Point {
    pub fn degree(&self) -> usize {
        self.segments.len()
    }
}

/// The surviving part of a segment after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeptPiece {
    pub t0: f32,
    pub t1: f32,
    /// Counter-clockwise: right at t0, right at t1, left at t1, left at t0.
    pub corners: [Vec2; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub road: RoadId,
    pub a_point: PointId,
    pub b_point: PointId,
    pub a: Vec2,
    pub b: Vec2,
    pub lanes_f: u8,
    pub lanes_b: u8,
    pub half_width_left: f32,
    pub half_width_right: f32,
    pub kept: Vec<KeptPiece>,
}

impl Segment {
    pub fn length(&self) -> f32 {
        (self.b - self.a).length()
    }

    pub fn dir(&self) -> Vec2 {
        (self.b - self.a).normalize_else()
    }

    pub fn left_normal(&self) -> Vec2 {
        self.dir().left_hand()
    }

    pub fn point_at(&self, t: f32) -> Vec2 {
        self.a.lerp(self.b, t)
    }

    /// The mean of both half widths.
    pub fn half_width(&self) -> f32 {
        (self.half_width_left + self.half_width_right) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.half_width_left + self.half_width_right
    }

    pub fn half_width_on(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.half_width_left,
            Side::Right => self.half_width_right,
        }
    }

    /// The point on the given asphalt edge at parameter t.
    pub fn edge_at(&self, t: f32, side: Side) -> Vec2 {
        let offset = match side {
            Side::Left => self.half_width_left,
            Side::Right => -self.half_width_right,
        };
        self.point_at(t) + self.left_normal() * offset
    }

    /// Builds the asphalt quad between two parameters.
    pub fn piece(&self, t0: f32, t1: f32) -> KeptPiece {
        KeptPiece {
            t0,
            t1,
            corners: [
                self.edge_at(t0, Side::Right),
                self.edge_at(t1, Side::Right),
                self.edge_at(t1, Side::Left),
                self.edge_at(t0, Side::Left),
            ],
        }
    }
}

/// One road approaching a junction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,
    pub segment: SegmentId,
    pub end: SegmentEnd,
    /// Parameter on the segment where the segment meets the junction.
    pub t: f32,
    /// World position of `t`.
    pub anchor: Vec2,
    /// Where the kept piece of the segment stops.
    pub position: Vec2,
    /// Where the junction surface meets the road. Never closer to the anchor than `position`.
    pub mouth: Vec2,
    /// Unit direction pointing away from the junction along the road.
    pub dir: Vec2,
    /// Half widths in the frame of the endpoint, i.e. looking along `dir`.
    pub half_left: f32,
    pub half_right: f32,
}

impl Endpoint {
    /// The corner of the mouth on the given side of the endpoint frame.
    pub fn mouth_corner(&self, side: Side) -> Vec2 {
        match side {
            Side::Left => self.mouth + self.dir.left_hand() * self.half_left,
            Side::Right => self.mouth + self.dir.right_hand() * self.half_right,
        }
    }

    /// Converts a side of the endpoint frame into the frame of the owning segment.
    pub fn segment_side(&self, side: Side) -> Side {
        self.end.to_segment_side(side)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorKind {
    Straight,
    Curved,
}

/// Links the left mouth corner of one endpoint to the right mouth corner of the next endpoint
/// counter-clockwise. Curb and sidewalk geometry follows these across the junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub from: EndpointId,
    pub to: EndpointId,
    pub kind: ConnectorKind,
    /// Includes both mouth corners.
    pub points: Vec<Vec2>,
}

/// States that the `from_side` edge of `from_segment` continues into the `to_side` edge of
/// `to_segment` across a junction. Sides are given in the frame of the segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnAdjacency {
    pub from_endpoint: EndpointId,
    pub from_segment: SegmentId,
    pub from_side: Side,
    pub to_endpoint: EndpointId,
    pub to_segment: SegmentId,
    pub to_side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JunctionKind {
    /// Exactly two approaches. The surface is the plain quad between both mouths.
    Corner,
    /// Three or more approaches, with fillets between them.
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryEdge {
    /// Crosses the road of the endpoint, from its right mouth corner to its left one.
    Mouth(EndpointId),
    /// Part of the connector with the given index.
    Connector(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HalfEdge {
    /// Index of the vertex this edge starts at.
    pub origin: usize,
    pub next: usize,
    pub prev: usize,
    pub kind: BoundaryEdge,
}

/// The boundary of a junction surface as a ring of half edges. Every edge knows whether it is a
/// road mouth or part of a connector, so the surface and the stitching order are read off one
/// structure. A ring that crosses itself is kept here as built, while the surface falls back to
/// its convex hull.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JunctionBoundary {
    pub vertices: Vec<Vec2>,
    pub edges: Vec<HalfEdge>,
}

impl JunctionBoundary {
    /// Walks the ring once, starting at the given edge.
    pub fn walk(&self, start: usize) -> impl Iterator<Item = &HalfEdge> + '_ {
        let mut current = Some(start).filter(|s| *s < self.edges.len());
        let mut remaining = self.edges.len();
        std::iter::from_fn(move || {
            let index = current?;
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let edge = &self.edges[index];
            current = Some(edge.next).filter(|n| *n != start);
            Some(edge)
        })
    }

    /// The positions of the ring in walking order.
    pub fn ring(&self) -> Vec<Vec2> {
        self.walk(0).map(|e| self.vertices[e.origin]).collect()
    }

    /// The end position of an edge.
    pub fn target(&self, edge: &HalfEdge) -> Vec2 {
        self.vertices[self.edges[edge.next].origin]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub id: JunctionId,
    pub kind: JunctionKind,
    pub center: Vec2,
    /// The detection threshold this junction was clustered with.
    pub threshold: f32,
    /// Counter-clockwise by the angle of their outward direction.
    pub endpoints: Vec<Endpoint>,
    /// Counter-clockwise ring covering the junction.
    pub surface: Vec<Vec2>,
    pub connectors: Vec<Connector>,
    pub turns: Vec<TurnAdjacency>,
    pub boundary: JunctionBoundary,
}

impl Junction {
    pub fn endpoint(&self, id: EndpointId) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    AsphaltPiece,
    JunctionSurface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveSource {
    /// A segment and the index of the kept piece within it.
    Segment(SegmentId, usize),
    Junction(JunctionId),
}

/// A flattened polygon ready for triangulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub source: PrimitiveSource,
    pub vertices: Vec<Vec2>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedNetwork {
    pub roads: Vec<Road>,
    pub points: Vec<Point>,
    /// Indexed by segment id.
    pub segments: Vec<Segment>,
    /// Indexed by junction id.
    pub junctions: Vec<Junction>,
    pub primitives: Vec<Primitive>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DerivedNetwork {
    pub fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id.to_usize()]
    }

    pub fn junction(&self, id: JunctionId) -> &Junction {
        &self.junctions[id.to_usize()]
    }

    /// All endpoints of all junctions, together with the junction they belong to.
    pub fn endpoints(&self) -> impl Iterator<Item = (&Junction, &Endpoint)> + '_ {
        self.junctions
            .iter()
            .flat_map(|j| j.endpoints.iter().map(move |e| (j, e)))
    }

    /// The endpoints sitting on the given segment.
    pub fn endpoints_of(&self, segment: SegmentId) -> Vec<(&Junction, &Endpoint)> {
        self.endpoints()
            .filter(|(_, e)| e.segment == segment)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
