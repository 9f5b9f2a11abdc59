//! This crate defines the data that flows between the road crates: the road schema that goes
//! into the compute engine, the settings that steer it, and the derived network that comes out.
//! Consumers of the derived network (mesh and decoration builders) only depend on this crate.
mod error;
mod network;
mod schema;
mod settings;

pub use error::*;
pub use network::*;
pub use schema::*;
pub use settings::*;

pub use utils::id::{EndpointId, JunctionId, PointId, RoadId, SegmentId};
