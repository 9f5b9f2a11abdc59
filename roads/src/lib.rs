//! The road network geometry compute engine. Given a road schema and settings, [`compute`] derives
//! the segments, junctions and flattened primitives that all road geometry is built from. The
//! engine is a pure function: it holds no state, and equal input yields an equal output.
pub mod cache;
pub mod tile_map;

mod compute;
mod graph;
mod junction;
mod trim;

pub use cache::{fingerprint, ComputeCache};
pub use compute::compute;
pub use tile_map::{Tile, TileMap, TileMapError};
