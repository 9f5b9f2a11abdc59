//! Turns a derived road network into renderable geometry: triangle meshes for the asphalt
//! primitives, and decoration layers for curbs, sidewalks, edge strips and lane markings.
pub mod boundary;
pub mod buffers;
pub mod curb;
pub mod edge_strips;
pub mod markings;
pub mod mesh;
pub mod sidewalk;

pub use boundary::{boundary_chains, BoundaryChain};
pub use buffers::{Indices, LineBuffer, MeshBuffers, RoadVertex, TriangleBuffer};
pub use curb::{build_curbs, CurbSettings};
pub use edge_strips::{build_edge_strips, EdgeStripSettings, EdgeStrips};
pub use markings::{build_markings, MarkingSettings, Markings};
pub use mesh::MeshBuilder;
pub use sidewalk::{build_sidewalks, SidewalkSettings};
