//! Planar curve helpers used by the road geometry: bezier fillets and polyline offsetting.

mod bezier;
mod offset;

pub use bezier::CtrlPoints;
pub use offset::{dedup_polyline, offset_band, offset_polyline, BandPair};
