use roads_api::{
    ComputeSettings, Diagnostic, ErrorKind, PathRef, Point, Road, RoadSchema, SchemaUnits,
    Segment,
};

use utils::consts::{LENGTH_EPSILON, POINT_EPSILON};
use utils::id::{IdBehaviour, IdManager, PointId, RoadId, SegmentId};

use glam::Vec2;
use std::collections::HashMap;

/// Spatial hash used to unify positions that lie within [`POINT_EPSILON`] of each other.
struct PointGrid {
    cells: HashMap<(i64, i64), Vec<PointId>>,
}

impl PointGrid {
    fn new() -> Self {
        Self {
            cells: HashMap::new(),
        }
    }

    fn cell(pos: Vec2) -> (i64, i64) {
        (
            (pos.x / POINT_EPSILON).floor() as i64,
            (pos.y / POINT_EPSILON).floor() as i64,
        )
    }

    fn find(&self, pos: Vec2, points: &[Point]) -> Option<PointId> {
        let (cx, cz) = Self::cell(pos);
        for dx in -1..=1 {
            for dz in -1..=1 {
                let Some(ids) = self.cells.get(&(cx + dx, cz + dz)) else {
                    continue;
                };
                if let Some(id) = ids
                    .iter()
                    .find(|id| points[id.to_usize()].pos.distance(pos) <= POINT_EPSILON)
                {
                    return Some(*id);
                }
            }
        }
        None
    }

    fn insert(&mut self, pos: Vec2, id: PointId) {
        self.cells.entry(Self::cell(pos)).or_default().push(id);
    }
}

/// The point/segment graph of a schema, before any junction work.
pub(crate) struct RoadGraph {
    pub roads: Vec<Road>,
    pub points: Vec<Point>,
    pub segments: Vec<Segment>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Maps a schema position into world space.
pub(crate) fn to_world(pos: Vec2, units: SchemaUnits, settings: &ComputeSettings) -> Vec2 {
    match units {
        SchemaUnits::World => settings.origin + pos,
        SchemaUnits::Tiles => settings.origin + pos * settings.tile_size,
    }
}

impl RoadGraph {
    pub fn build(schema: &RoadSchema, settings: &ComputeSettings) -> Self {
        let mut graph = RoadGraph {
            roads: vec![],
            points: vec![],
            segments: vec![],
            diagnostics: vec![],
        };
        let mut grid = PointGrid::new();
        let mut point_ids: IdManager<PointId> = IdManager::new();
        let mut segment_ids: IdManager<SegmentId> = IdManager::new();
        let mut road_ids: IdManager<RoadId> = IdManager::new();

        let mut named: HashMap<u32, Vec2> = HashMap::new();
        for point in schema.points.iter() {
            if named
                .insert(point.id, to_world(point.pos, schema.units, settings))
                .is_some()
            {
                log::warn!("schema point {} is defined more than once", point.id);
            }
        }

        for desc in schema.roads.iter() {
            let road_id = road_ids.gen();
            let path: Vec<Option<Vec2>> = desc
                .path
                .iter()
                .map(|path_ref| match path_ref {
                    PathRef::Pos(pos) => Some(to_world(*pos, schema.units, settings)),
                    PathRef::Point(id) => {
                        let pos = named.get(id).copied();
                        if pos.is_none() {
                            graph.diagnostics.push(Diagnostic::new(
                                ErrorKind::DanglingReference,
                                format!("road '{}' references unknown point {}", desc.tag, id),
                            ));
                        }
                        pos
                    }
                })
                .collect();

            let (half_left, half_right) = settings.half_widths(desc.lanes_f, desc.lanes_b);
            for pair in path.windows(2) {
                let (Some(a), Some(b)) = (pair[0], pair[1]) else {
                    continue;
                };
                let a_point = graph.get_or_insert_point(a, &mut grid, &mut point_ids);
                let b_point = graph.get_or_insert_point(b, &mut grid, &mut point_ids);
                let a = graph.points[a_point.to_usize()].pos;
                let b = graph.points[b_point.to_usize()].pos;
                if a_point == b_point || a.distance(b) < LENGTH_EPSILON {
                    graph.diagnostics.push(Diagnostic::new(
                        ErrorKind::DegenerateGeometry,
                        format!("road '{}' has a zero length edge at {}", desc.tag, a),
                    ));
                    continue;
                }

                let id = segment_ids.gen();
                graph.points[a_point.to_usize()].segments.push(id);
                graph.points[b_point.to_usize()].segments.push(id);
                graph.segments.push(Segment {
                    id,
                    road: road_id,
                    a_point,
                    b_point,
                    a,
                    b,
                    lanes_f: desc.lanes_f,
                    lanes_b: desc.lanes_b,
                    half_width_left: half_left,
                    half_width_right: half_right,
                    kept: vec![],
                });
            }

            graph.roads.push(Road {
                id: road_id,
                tag: desc.tag.clone(),
                points: path.into_iter().flatten().collect(),
                lanes_f: desc.lanes_f,
                lanes_b: desc.lanes_b,
            });
        }

        log::debug!(
            "road graph: {} roads, {} points, {} segments",
            graph.roads.len(),
            graph.points.len(),
            graph.segments.len()
        );
        graph
    }

    fn get_or_insert_point(
        &mut self,
        pos: Vec2,
        grid: &mut PointGrid,
        ids: &mut IdManager<PointId>,
    ) -> PointId {
        if let Some(id) = grid.find(pos, &self.points) {
            return id;
        }
        let id = ids.gen();
        grid.insert(pos, id);
        self.points.push(Point {
            id,
            pos,
            segments: vec![],
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roads_api::RoadDesc;

    #[test]
    fn shared_positions_become_one_point() {
        let schema = RoadSchema::new()
            .with_road(RoadDesc::new(
                "a",
                1,
                1,
                [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)],
            ))
            .with_road(RoadDesc::new(
                "b",
                1,
                1,
                [Vec2::new(10.0, 0.00001), Vec2::new(10.0, 10.0)],
            ));
        let graph = RoadGraph::build(&schema, &ComputeSettings::default());
        assert_eq!(graph.points.len(), 3);
        assert_eq!(graph.segments.len(), 2);
        assert_eq!(graph.segments[0].b_point, graph.segments[1].a_point);
        assert_eq!(graph.points[1].degree(), 2);
        assert!(graph.diagnostics.is_empty());
    }

    #[test]
    fn dangling_reference_drops_touching_edges() {
        let schema = RoadSchema::new()
            .with_point(1, Vec2::new(5.0, 0.0))
            .with_road(RoadDesc::new(
                "a",
                1,
                1,
                [
                    PathRef::Pos(Vec2::ZERO),
                    PathRef::Point(1),
                    PathRef::Point(2),
                    PathRef::Pos(Vec2::new(20.0, 0.0)),
                ],
            ));
        let graph = RoadGraph::build(&schema, &ComputeSettings::default());
        assert_eq!(graph.segments.len(), 1);
        assert_eq!(graph.segments[0].b, Vec2::new(5.0, 0.0));
        assert_eq!(graph.diagnostics.len(), 1);
        assert_eq!(graph.diagnostics[0].kind, ErrorKind::DanglingReference);
    }

    #[test]
    fn zero_length_edges_are_skipped() {
        let schema = RoadSchema::new().with_road(RoadDesc::new(
            "a",
            1,
            1,
            [Vec2::ZERO, Vec2::ZERO, Vec2::new(3.0, 0.0)],
        ));
        let graph = RoadGraph::build(&schema, &ComputeSettings::default());
        assert_eq!(graph.segments.len(), 1);
        assert_eq!(graph.diagnostics[0].kind, ErrorKind::DegenerateGeometry);
    }

    #[test]
    fn tile_units_are_scaled_and_offset() {
        let settings = ComputeSettings {
            tile_size: 10.0,
            origin: Vec2::new(100.0, 0.0),
            ..Default::default()
        };
        let schema = RoadSchema::new()
            .with_units(SchemaUnits::Tiles)
            .with_road(RoadDesc::new(
                "a",
                1,
                0,
                [Vec2::new(0.5, 0.5), Vec2::new(2.5, 0.5)],
            ));
        let graph = RoadGraph::build(&schema, &settings);
        let segment = &graph.segments[0];
        assert_eq!(segment.a, Vec2::new(105.0, 5.0));
        assert_eq!(segment.b, Vec2::new(125.0, 5.0));
        assert_relative_eq!(segment.half_width_right, 4.8 + 0.1094 * 4.8);
        assert_relative_eq!(segment.half_width_left, 0.1094 * 4.8);
    }
}
