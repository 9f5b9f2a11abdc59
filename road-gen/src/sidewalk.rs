use roads_api::DerivedNetwork;

use curves::offset_band;
use utils::consts::DEFAULT_MITER_LIMIT;

use serde::{Deserialize, Serialize};

use crate::boundary::boundary_chains;
use crate::buffers::TriangleBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidewalkSettings {
    pub width: f32,
    /// Height of the walking surface above the asphalt.
    pub lift: f32,
    pub miter_limit: f32,
}

impl Default for SidewalkSettings {
    fn default() -> Self {
        Self {
            width: 2.0,
            lift: 0.2,
            miter_limit: DEFAULT_MITER_LIMIT,
        }
    }
}

/// Builds the sidewalks behind the curbs, starting at `curb_thickness` from the asphalt edge.
pub fn build_sidewalks(
    network: &DerivedNetwork,
    settings: &SidewalkSettings,
    curb_thickness: f32,
) -> TriangleBuffer {
    let mut out = TriangleBuffer::new();
    if settings.width <= 0.0 {
        return out;
    }
    let inner = curb_thickness.max(0.0);
    for chain in boundary_chains(network) {
        let band = offset_band(
            &chain.points,
            chain.closed,
            inner,
            inner + settings.width,
            settings.miter_limit,
        );
        out.push_band(&band, chain.closed, settings.lift);
    }
    log::debug!("built {} sidewalk triangles", out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use roads::compute;
    use crate::boundary::BoundaryChain;
    use approx::assert_relative_eq;
    use roads_api::{ComputeSettings, PathRef, RoadDesc, RoadSchema};
    use std::f32::consts::SQRT_2;

    fn outline_distance(chains: &[BoundaryChain], p: Vec2) -> f32 {
        let mut best = f32::MAX;
        for chain in chains {
            let n = chain.points.len();
            let edges = if chain.closed { n } else { n - 1 };
            for i in 0..edges {
                let (a, b) = (chain.points[i], chain.points[(i + 1) % n]);
                let t = ((p - a).dot(b - a) / (b - a).length_squared()).clamp(0.0, 1.0);
                best = best.min(p.distance(a + (b - a) * t));
            }
        }
        best
    }

    #[test]
    fn sidewalk_starts_behind_the_curb() {
        let schema = RoadSchema::new().with_road(RoadDesc::new(
            "a",
            1,
            1,
            [Vec2::ZERO, Vec2::new(20.0, 0.0)],
        ));
        let network = compute(&schema, &ComputeSettings::default()).unwrap();
        let half = network.segments[0].half_width_left;
        let settings = SidewalkSettings::default();
        let sidewalks = build_sidewalks(&network, &settings, 0.3);
        // closed ring of 4 corners, one quad each
        assert_eq!(sidewalks.len(), 8);
        for p in sidewalks.triangles().flatten() {
            assert_eq!(p.y, settings.lift);
            let d = ((p.x - 10.0).abs() - 10.0).max(p.z.abs() - half);
            assert!((d - 0.3).abs() < 1e-4 || (d - 2.3).abs() < 1e-4, "{}", d);
        }
    }

    #[test]
    fn t_junction_sidewalk_keeps_its_offsets_around_corners() {
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
        let compute_settings = ComputeSettings::default();
        let network = compute(&schema, &compute_settings).unwrap();
        let chains = boundary_chains(&network);
        let half = network.segments[0].half_width_left;
        let radius = compute_settings.fillet_radius();
        let settings = SidewalkSettings::default();
        let (inner, outer) = (0.3, 0.3 + settings.width);
        let sidewalks = build_sidewalks(&network, &settings, inner);

        let (mut fillet, mut miter) = (0, 0);
        for p in sidewalks.triangles().flatten() {
            let p = Vec2::new(p.x, p.z);
            let d = outline_distance(&chains, p);
            assert!(d > inner - 1e-3, "{} at {}", d, p);
            assert!(d < outer * settings.miter_limit, "{} at {}", d, p);
            if p.x < -half && p.x > -half - radius - 3.0 && p.y > half && p.y < half + radius + 3.0 {
                assert!(
                    (d - inner).abs() < 1e-3 || (d - outer).abs() < 1e-3,
                    "{} at {}",
                    d,
                    p
                );
                fillet += 1;
            }
            if p.x < -60.0 {
                let expected = if d < outer { inner } else { outer };
                assert_relative_eq!(d, expected * SQRT_2, epsilon = 1e-3);
                miter += 1;
            }
        }
        assert!(fillet > 4);
        assert!(miter > 0);
    }

    #[test]
    fn no_width_means_no_sidewalk() {
        let settings = SidewalkSettings {
            width: 0.0,
            ..Default::default()
        };
        let network = DerivedNetwork::default();
        assert!(build_sidewalks(&network, &settings, 0.3).is_empty());
    }
}
