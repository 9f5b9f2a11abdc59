use glam::Vec2;

/// Positions closer than this are unified into a single graph point.
pub const POINT_EPSILON: f32 = 1e-4;
/// Segments, directions and kept pieces shorter than this are treated as degenerate.
pub const LENGTH_EPSILON: f32 = 1e-6;
/// Tolerance used when comparing parameters along a segment.
pub const PARAM_EPSILON: f32 = 1e-6;
/// Tolerance on angles given in radians.
pub const ANGLE_EPSILON: f32 = 1e-3;
/// Triangles with a smaller absolute area are dropped by the mesh builders.
pub const AREA_EPSILON: f32 = 1e-9;

/// Number of steps used when sampling a junction fillet.
pub const FILLET_SEGMENTS: u32 = 8;
/// Default miter limit of offset joins, as a multiple of the offset distance.
pub const DEFAULT_MITER_LIMIT: f32 = 4.0;

pub const DEFAULT_DIR: Vec2 = Vec2::new(1.0, 0.0);
