//! Typed ids for every kind of object in the road network. An id is a thin wrapper around an
//! integer, tagged with a marker type such that ids of different kinds cannot be mixed up.

mod id_manager;

pub use id_manager::{Id, IdBehaviour, IdManager};

pub use id_manager::{EndpointMarker, JunctionMarker, PointMarker, RoadMarker, SegmentMarker};

pub type RoadId = Id<RoadMarker, u32>;
pub type PointId = Id<PointMarker, u32>;
pub type SegmentId = Id<SegmentMarker, u32>;
pub type JunctionId = Id<JunctionMarker, u32>;
pub type EndpointId = Id<EndpointMarker, u32>;
