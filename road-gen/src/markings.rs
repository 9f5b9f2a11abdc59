//! Lane markings painted onto the asphalt. Lines follow the kept parts of every segment, cut back
//! to the junction mouths so no marking runs across a junction surface.
use roads_api::{DerivedNetwork, Endpoint, Segment};

use utils::consts::LENGTH_EPSILON;
use utils::PlanarUtils;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::boundary::visible_runs;
use crate::buffers::{LineBuffer, TriangleBuffer};

/// A run end closer than this to a mouth is taken to start at the mouth.
const MOUTH_TOLERANCE: f32 = 1e-3;

/// Crosswalks are only painted where at least this many roads meet.
const CROSSWALK_MIN_ENDPOINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkingSettings {
    /// Height above the asphalt.
    pub lift: f32,
    pub dash_length: f32,
    pub dash_gap: f32,
    /// Distance between both lines of a double centre line.
    pub double_line_gap: f32,
    pub crosswalk_depth: f32,
    pub crosswalk_stripe_width: f32,
    pub crosswalk_stripe_gap: f32,
    /// Distance between the junction mouth and the crosswalk.
    pub crosswalk_offset: f32,
    pub arrow_length: f32,
    pub arrow_width: f32,
    /// Distance between the arrow tip and the downstream end of the road.
    pub arrow_offset: f32,
}

impl Default for MarkingSettings {
    fn default() -> Self {
        Self {
            lift: 0.02,
            dash_length: 3.0,
            dash_gap: 6.0,
            double_line_gap: 0.3,
            crosswalk_depth: 3.0,
            crosswalk_stripe_width: 0.5,
            crosswalk_stripe_gap: 0.5,
            crosswalk_offset: 0.5,
            arrow_length: 4.0,
            arrow_width: 1.2,
            arrow_offset: 6.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Markings {
    pub lines: LineBuffer,
    pub crosswalks: TriangleBuffer,
    pub arrows: TriangleBuffer,
}

impl Markings {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.crosswalks.is_empty() && self.arrows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LineStyle {
    Solid,
    Dashed,
}

/// Lateral offsets of all lines of a segment, positive to the left of its direction.
fn lane_lines(segment: &Segment, lane_width: f32, double_gap: f32) -> Vec<(f32, LineStyle)> {
    let (lf, lb) = (segment.lanes_f as i32, segment.lanes_b as i32);
    if lf + lb == 0 {
        return vec![];
    }
    let mut lines = vec![
        (-lf as f32 * lane_width, LineStyle::Solid),
        (lb as f32 * lane_width, LineStyle::Solid),
    ];
    lines.extend((1..lf).map(|k| (-k as f32 * lane_width, LineStyle::Dashed)));
    lines.extend((1..lb).map(|k| (k as f32 * lane_width, LineStyle::Dashed)));
    if lf > 0 && lb > 0 {
        if lf + lb < 4 {
            lines.push((0.0, LineStyle::Dashed));
        } else {
            lines.push((-double_gap * 0.5, LineStyle::Solid));
            lines.push((double_gap * 0.5, LineStyle::Solid));
        }
    }
    lines
}

fn paint_line(
    out: &mut LineBuffer,
    segment: &Segment,
    offset: f32,
    style: LineStyle,
    (t0, t1): (f32, f32),
    settings: &MarkingSettings,
) {
    let length = segment.length();
    let normal = segment.left_normal() * offset;
    let at = |s: f32| (segment.point_at(s / length) + normal).to_world(settings.lift);
    let (start, end) = (t0 * length, t1 * length);

    match style {
        LineStyle::Solid => out.push(at(start), at(end)),
        LineStyle::Dashed => {
            if settings.dash_length <= 0.0 {
                return;
            }
            let period = settings.dash_length + settings.dash_gap.max(0.0);
            let mut s = start;
            while s < end - LENGTH_EPSILON {
                out.push(at(s), at((s + settings.dash_length).min(end)));
                s += period;
            }
        }
    }
}

/// Pushes the rectangle spanned by `along` and `right` from `origin`, facing up.
fn push_rect(out: &mut TriangleBuffer, origin: Vec2, along: Vec2, right: Vec2, height: f32) {
    out.push_quad(
        origin.to_world(height),
        (origin + along).to_world(height),
        (origin + along + right).to_world(height),
        (origin + right).to_world(height),
    );
}

fn paint_crosswalk(out: &mut TriangleBuffer, endpoint: &Endpoint, settings: &MarkingSettings) {
    let (w, gap) = (settings.crosswalk_stripe_width, settings.crosswalk_stripe_gap.max(0.0));
    let total = endpoint.half_left + endpoint.half_right;
    if w <= 0.0 || total < w {
        return;
    }
    let pitch = w + gap;
    let count = ((total - w) / pitch).floor() as usize + 1;
    let pad = (total - count as f32 * w - (count - 1) as f32 * gap) * 0.5;

    let (dir, left) = (endpoint.dir, endpoint.dir.left_hand());
    let start = endpoint.mouth + dir * settings.crosswalk_offset;
    for i in 0..count {
        let lateral = endpoint.half_left - pad - i as f32 * pitch;
        push_rect(
            out,
            start + left * lateral,
            dir * settings.crosswalk_depth,
            dir.right_hand() * w,
            settings.lift,
        );
    }
}

/// Length of the visible run that starts at the mouth of the endpoint, if any.
fn run_at_mouth(network: &DerivedNetwork, endpoint: &Endpoint) -> Option<f32> {
    let segment = network.segment(endpoint.segment);
    visible_runs(network, segment)
        .into_iter()
        .filter(|(t0, t1)| {
            segment.point_at(*t0).distance(endpoint.mouth) <= MOUTH_TOLERANCE
                || segment.point_at(*t1).distance(endpoint.mouth) <= MOUTH_TOLERANCE
        })
        .map(|(t0, t1)| (t1 - t0) * segment.length())
        .reduce(f32::max)
}

/// An arrow pointing along `dir` with its tip at `tip`.
fn paint_arrow(out: &mut TriangleBuffer, tip: Vec2, dir: Vec2, settings: &MarkingSettings) {
    let (length, width) = (settings.arrow_length, settings.arrow_width);
    let head = length * 0.4;
    let shaft = length - head;
    let shaft_width = width * 0.3;
    let (left, right) = (dir.left_hand(), dir.right_hand());
    let base = tip - dir * head;

    out.push(
        tip.to_world(settings.lift),
        (base + right * width * 0.5).to_world(settings.lift),
        (base + left * width * 0.5).to_world(settings.lift),
    );
    push_rect(
        out,
        base - dir * shaft + left * shaft_width * 0.5,
        dir * shaft,
        right * shaft_width,
        settings.lift,
    );
}

fn paint_arrows(
    out: &mut TriangleBuffer,
    segment: &Segment,
    (t0, t1): (f32, f32),
    lane_width: f32,
    settings: &MarkingSettings,
) {
    if settings.arrow_length <= 0.0
        || (t1 - t0) * segment.length() < settings.arrow_offset + settings.arrow_length
    {
        return;
    }
    let (dir, normal) = (segment.dir(), segment.left_normal());
    for k in 0..segment.lanes_f {
        let lane = normal * -(k as f32 + 0.5) * lane_width;
        let tip = segment.point_at(t1) - dir * settings.arrow_offset + lane;
        paint_arrow(out, tip, dir, settings);
    }
    for k in 0..segment.lanes_b {
        let lane = normal * (k as f32 + 0.5) * lane_width;
        let tip = segment.point_at(t0) + dir * settings.arrow_offset + lane;
        paint_arrow(out, tip, -dir, settings);
    }
}

pub fn build_markings(
    network: &DerivedNetwork,
    settings: &MarkingSettings,
    lane_width: f32,
) -> Markings {
    let mut markings = Markings::default();

    for segment in network.segments.iter() {
        let lines = lane_lines(segment, lane_width, settings.double_line_gap);
        for run in visible_runs(network, segment) {
            for (offset, style) in lines.iter() {
                paint_line(&mut markings.lines, segment, *offset, *style, run, settings);
            }
            paint_arrows(&mut markings.arrows, segment, run, lane_width, settings);
        }
    }

    let needed = settings.crosswalk_offset + settings.crosswalk_depth;
    for junction in network.junctions.iter() {
        if junction.endpoints.len() < CROSSWALK_MIN_ENDPOINTS {
            continue;
        }
        for endpoint in junction.endpoints.iter() {
            match run_at_mouth(network, endpoint) {
                Some(length) if length >= needed => {
                    paint_crosswalk(&mut markings.crosswalks, endpoint, settings)
                }
                _ => log::debug!(
                    "no room for a crosswalk at endpoint {:?} of junction {:?}",
                    endpoint.id,
                    junction.id
                ),
            }
        }
    }

    log::debug!(
        "painted {} lines, {} crosswalk and {} arrow triangles",
        markings.lines.len(),
        markings.crosswalks.len(),
        markings.arrows.len()
    );
    markings
}

#[cfg(test)]
mod tests {
    use super::*;
    use roads::compute;
    use roads_api::{ComputeSettings, PathRef, RoadDesc, RoadSchema};
    use utils::WorldUtils;

    const LANE: f32 = 4.8;

    fn road(lanes_f: u8, lanes_b: u8, length: f32) -> DerivedNetwork {
        let schema = RoadSchema::new().with_road(RoadDesc::new(
            "a",
            lanes_f,
            lanes_b,
            [Vec2::ZERO, Vec2::new(length, 0.0)],
        ));
        compute(&schema, &ComputeSettings::default()).unwrap()
    }

    /// Number of lines at lateral position `z` of a road running along x.
    fn lines_at(markings: &Markings, z: f32) -> usize {
        markings
            .lines
            .lines()
            .filter(|[a, b]| (a.z - z).abs() < 1e-4 && (b.z - z).abs() < 1e-4)
            .count()
    }

    #[test]
    fn two_lane_road_has_dashed_centre() {
        let markings = build_markings(&road(1, 1, 20.0), &MarkingSettings::default(), LANE);
        assert_eq!(lines_at(&markings, -LANE), 1);
        assert_eq!(lines_at(&markings, LANE), 1);
        // dashes start at 0, 9 and 18, the last one is cut off at the end
        assert_eq!(lines_at(&markings, 0.0), 3);
        assert_eq!(markings.lines.len(), 5);
        let last = markings.lines.lines().filter(|[a, _]| a.z == 0.0).last().unwrap();
        assert_eq!(last[1].x, 20.0);
        assert!(markings.lines.lines().flatten().all(|p| p.y == 0.02));
    }

    #[test]
    fn wide_road_has_double_centre_line() {
        let markings = build_markings(&road(2, 2, 20.0), &MarkingSettings::default(), LANE);
        assert_eq!(lines_at(&markings, 0.0), 0);
        assert_eq!(lines_at(&markings, 0.15), 1);
        assert_eq!(lines_at(&markings, -0.15), 1);
        assert_eq!(lines_at(&markings, LANE), 3);
        assert_eq!(lines_at(&markings, -LANE), 3);
        assert_eq!(lines_at(&markings, 2.0 * LANE), 1);
        assert_eq!(lines_at(&markings, -2.0 * LANE), 1);
        assert_eq!(markings.lines.len(), 10);
    }

    #[test]
    fn one_way_road_has_no_centre_line() {
        let markings = build_markings(&road(2, 0, 20.0), &MarkingSettings::default(), LANE);
        assert_eq!(lines_at(&markings, 0.0), 1);
        assert_eq!(lines_at(&markings, -LANE), 3);
        assert_eq!(lines_at(&markings, -2.0 * LANE), 1);
        assert_eq!(markings.lines.len(), 5);
    }

    #[test]
    fn arrows_point_downstream() {
        let settings = MarkingSettings::default();
        let forward = build_markings(&road(1, 0, 40.0), &settings, LANE);
        // head and two shaft triangles
        assert_eq!(forward.arrows.len(), 3);
        let max_x = forward.arrows.triangles().flatten().map(|p| p.x).fold(f32::MIN, f32::max);
        assert!((max_x - 34.0).abs() < 1e-4);
        let [tip, _, _] = forward.arrows.triangles().next().unwrap();
        assert!((tip.z + LANE * 0.5).abs() < 1e-4);

        let backward = build_markings(&road(0, 1, 40.0), &settings, LANE);
        let min_x = backward.arrows.triangles().flatten().map(|p| p.x).fold(f32::MAX, f32::min);
        assert!((min_x - 6.0).abs() < 1e-4);

        for [a, b, c] in forward.arrows.triangles().chain(backward.arrows.triangles()) {
            assert!((b - a).cross(c - a).y > 0.0);
        }
    }

    #[test]
    fn short_roads_get_no_arrows() {
        let markings = build_markings(&road(1, 1, 8.0), &MarkingSettings::default(), LANE);
        assert!(markings.arrows.is_empty());
        assert!(!markings.lines.is_empty());
    }

    fn junction(headings: &[Vec2]) -> DerivedNetwork {
        let mut schema = RoadSchema::new().with_point(0, Vec2::ZERO);
        for (i, dir) in headings.iter().enumerate() {
            schema = schema.with_road(RoadDesc::new(
                format!("r{}", i),
                1,
                1,
                [PathRef::Point(0), PathRef::Pos(*dir * 60.0)],
            ));
        }
        compute(&schema, &ComputeSettings::default()).unwrap()
    }

    #[test]
    fn crosswalks_at_t_junctions_only() {
        let settings = MarkingSettings::default();
        let network = junction(&[Vec2::X, Vec2::Y, Vec2::NEG_X]);
        let markings = build_markings(&network, &settings, LANE);
        // 11 stripes fit into a width of 10.65 at a pitch of 1
        assert_eq!(markings.crosswalks.len(), 3 * 11 * 2);

        let reach = network.junctions[0]
            .endpoints
            .iter()
            .map(|e| e.anchor.distance(e.mouth))
            .fold(f32::MAX, f32::min);
        for p in markings.crosswalks.triangles().flatten() {
            assert!(p.planar().length() >= reach + settings.crosswalk_offset - 1e-3);
        }
        for [a, b, c] in markings.crosswalks.triangles() {
            assert!((b - a).cross(c - a).y > 0.0);
        }

        let bend = build_markings(&junction(&[Vec2::X, Vec2::Y]), &settings, LANE);
        assert!(bend.crosswalks.is_empty());
    }

    #[test]
    fn markings_stop_at_junction_mouths() {
        let network = junction(&[Vec2::X, Vec2::Y, Vec2::NEG_X]);
        let markings = build_markings(&network, &MarkingSettings::default(), LANE);
        let reach = network.junctions[0]
            .endpoints
            .iter()
            .map(|e| e.anchor.distance(e.mouth))
            .fold(f32::MAX, f32::min);
        // lateral offsets only move points further from the centre
        for p in markings.lines.lines().flatten() {
            assert!(p.planar().length() >= reach - 1e-3);
        }
    }

    #[test]
    fn empty_network_has_no_markings() {
        let markings = build_markings(
            &DerivedNetwork::default(),
            &MarkingSettings::default(),
            LANE,
        );
        assert!(markings.is_empty());
    }
}
