use roads_api::{Diagnostic, ErrorKind, Primitive};

use curves::dedup_polyline;
use utils::consts::AREA_EPSILON;
use utils::math::{is_convex, signed_area};
use utils::PlanarUtils;

use glam::Vec2;

use crate::buffers::{Indices, MeshBuffers};

const DEFAULT_UV_SCALE: f32 = 0.1;

/// Triangulates planar polygons into one mesh at a fixed height. Triangles face up.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    height: f32,
    uv_scale: f32,
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
    diagnostics: Vec<Diagnostic>,
}

fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).cross2(c - a) * 0.5
}

/// Fan from the first vertex. Only valid for convex polygons.
fn fan(points: &[Vec2]) -> Vec<[usize; 3]> {
    (1..points.len() - 1).map(|i| [0, i, i + 1]).collect()
}

fn ear_clip(points: &[Vec2]) -> Vec<[usize; 3]> {
    let coords: Vec<f64> = points
        .iter()
        .flat_map(|p| [p.x as f64, p.y as f64])
        .collect();
    match earcutr::earcut(&coords, &[], 2) {
        Ok(indices) => indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect(),
        Err(err) => {
            log::debug!("ear clipping failed: {:?}", err);
            vec![]
        }
    }
}

impl MeshBuilder {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            uv_scale: DEFAULT_UV_SCALE,
            positions: vec![],
            uvs: vec![],
            indices: vec![],
            diagnostics: vec![],
        }
    }

    /// UVs are the world `(x, z)` position times this scale.
    pub fn with_uv_scale(mut self, uv_scale: f32) -> Self {
        self.uv_scale = uv_scale;
        self
    }

    pub fn add_primitives(mut self, primitives: &[Primitive]) -> Self {
        for primitive in primitives {
            self.add_polygon(&primitive.vertices);
        }
        self
    }

    /// Adds one polygon in either winding. Returns false if it was skipped.
    pub fn add_polygon(&mut self, vertices: &[Vec2]) -> bool {
        if vertices.len() < 3 {
            self.diagnostics.push(Diagnostic::new(
                ErrorKind::MalformedPolygon,
                format!("polygon with {} vertices", vertices.len()),
            ));
            return false;
        }

        let mut points = dedup_polyline(vertices, true);
        if signed_area(&points) < 0.0 {
            points.reverse();
        }
        let triangles = if points.len() < 3 || signed_area(&points) <= AREA_EPSILON {
            vec![]
        } else if is_convex(&points) {
            fan(&points)
        } else {
            ear_clip(&points)
        };

        let triangles: Vec<[usize; 3]> = triangles
            .into_iter()
            .filter_map(|[a, b, c]| {
                let area = triangle_area(points[a], points[b], points[c]);
                if area > AREA_EPSILON {
                    Some([a, b, c])
                } else if area < -AREA_EPSILON {
                    Some([a, c, b])
                } else {
                    None
                }
            })
            .collect();
        if triangles.is_empty() {
            self.diagnostics.push(Diagnostic::new(
                ErrorKind::DegenerateGeometry,
                format!("polygon starting at {} has no area", vertices[0]),
            ));
            return false;
        }

        let base = self.positions.len() as u32;
        for p in points.iter() {
            self.positions.push(p.to_world(self.height).into());
            self.uvs.push((*p * self.uv_scale).into());
        }
        // counter-clockwise in the (x, z) plane faces down, so every triangle is flipped
        for [a, b, c] in triangles {
            self.indices
                .extend_from_slice(&[base + a as u32, base + c as u32, base + b as u32]);
        }
        true
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn build(self) -> (MeshBuffers, Vec<Diagnostic>) {
        for diagnostic in self.diagnostics.iter() {
            log::warn!("{}", diagnostic);
        }
        let vertex_count = self.positions.len();
        (
            MeshBuffers {
                positions: self.positions,
                uvs: self.uvs,
                indices: Indices::from_u32(self.indices, vertex_count),
            },
            self.diagnostics,
        )
    }
}
