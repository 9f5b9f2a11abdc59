use curves::BandPair;
use utils::PlanarUtils;

use glam::Vec3;

/// Interleaved vertex layout for uploading a [`MeshBuffers`] in one go.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RoadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Triangle list indices, as narrow as the vertex count allows.
#[derive(Debug, Clone, PartialEq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Default for Indices {
    fn default() -> Self {
        Indices::U16(vec![])
    }
}

impl Indices {
    /// Picks `U16` if every index of a mesh with `vertex_count` vertices fits into it.
    pub fn from_u32(indices: Vec<u32>, vertex_count: usize) -> Self {
        if vertex_count <= u16::MAX as usize + 1 {
            Indices::U16(indices.into_iter().map(|i| i as u16).collect())
        } else {
            Indices::U32(indices)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Indices::U16(i) => i.len(),
            Indices::U32(i) => i.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_u32(&self) -> Vec<u32> {
        match self {
            Indices::U16(i) => i.iter().map(|i| *i as u32).collect(),
            Indices::U32(i) => i.clone(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U16(i) => bytemuck::cast_slice(i),
            Indices::U32(i) => bytemuck::cast_slice(i),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Indices,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The positions as one flat slice of `x, y, z` triples.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn vertices(&self) -> Vec<RoadVertex> {
        self.positions
            .iter()
            .zip(self.uvs.iter())
            .map(|(position, uv)| RoadVertex {
                position: *position,
                uv: *uv,
            })
            .collect()
    }
}

/// A flat line list, 6 floats per line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineBuffer {
    data: Vec<f32>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, a: Vec3, b: Vec3) {
        self.data.extend_from_slice(&[a.x, a.y, a.z, b.x, b.y, b.z]);
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.data.len() / 6
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn lines(&self) -> impl Iterator<Item = [Vec3; 2]> + '_ {
        self.data
            .chunks_exact(6)
            .map(|c| [Vec3::new(c[0], c[1], c[2]), Vec3::new(c[3], c[4], c[5])])
    }

    pub fn append(&mut self, other: &mut LineBuffer) {
        self.data.append(&mut other.data);
    }
}

/// A flat triangle list, 9 floats per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleBuffer {
    data: Vec<f32>,
}

impl TriangleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        self.data
            .extend_from_slice(&[a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z]);
    }

    /// Pushes the quad `a b c d` as the triangles `a b c` and `a c d`.
    pub fn push_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        self.push(a, b, c);
        self.push(a, c, d);
    }

    /// Pushes the flat strip between both sides of an offset band at the given height. The band
    /// must run with its first side on the left, as [`curves::offset_band`] produces it for an
    /// inner offset smaller than the outer one.
    pub fn push_band(&mut self, band: &[BandPair], closed: bool, height: f32) {
        let n = band.len();
        if n < 2 {
            return;
        }
        let quads = if closed { n } else { n - 1 };
        for i in 0..quads {
            let ([a0, a1], [b0, b1]) = (band[i], band[(i + 1) % n]);
            self.push_quad(
                a0.to_world(height),
                b0.to_world(height),
                b1.to_world(height),
                a1.to_world(height),
            );
        }
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.data.len() / 9
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.data.chunks_exact(9).map(|c| {
            [
                Vec3::new(c[0], c[1], c[2]),
                Vec3::new(c[3], c[4], c[5]),
                Vec3::new(c[6], c[7], c[8]),
            ]
        })
    }

    pub fn append(&mut self, other: &mut TriangleBuffer) {
        self.data.append(&mut other.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_indices_when_possible() {
        assert!(matches!(
            Indices::from_u32(vec![0, 1, 2], 3),
            Indices::U16(_)
        ));
        assert!(matches!(
            Indices::from_u32(vec![0, 1, 65535], 65536),
            Indices::U16(_)
        ));
        let wide = Indices::from_u32(vec![0, 1, 65536], 65537);
        assert!(matches!(wide, Indices::U32(_)));
        assert_eq!(wide.to_u32(), vec![0, 1, 65536]);
        assert_eq!(wide.as_bytes().len(), 12);
    }

    #[test]
    fn flat_buffers_count_their_items() {
        let mut lines = LineBuffer::new();
        lines.push(Vec3::ZERO, Vec3::X);
        lines.push(Vec3::Y, Vec3::Z);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.as_slice().len(), 12);
        assert_eq!(lines.lines().nth(1), Some([Vec3::Y, Vec3::Z]));

        let mut triangles = TriangleBuffer::new();
        triangles.push_quad(Vec3::ZERO, Vec3::X, Vec3::ONE, Vec3::Z);
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles.as_slice().len(), 18);
    }

    #[test]
    fn band_faces_up() {
        let band = curves::offset_band(
            &[glam::Vec2::ZERO, glam::Vec2::new(5.0, 0.0), glam::Vec2::new(5.0, 5.0)],
            false,
            0.0,
            1.0,
            4.0,
        );
        let mut triangles = TriangleBuffer::new();
        triangles.push_band(&band, false, 0.2);
        assert_eq!(triangles.len(), 4);
        for [a, b, c] in triangles.triangles() {
            assert!((b - a).cross(c - a).y > 0.0);
            assert_eq!(a.y, 0.2);
        }
    }

    #[test]
    fn positions_flatten_in_order() {
        let mesh = MeshBuffers {
            positions: vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            uvs: vec![[0.0, 0.0], [1.0, 1.0]],
            indices: Indices::default(),
        };
        assert_eq!(mesh.positions_flat(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(mesh.vertices()[1].uv, [1.0, 1.0]);
    }
}
