use glam::{Vec2, Vec3};

use crate::consts::{DEFAULT_DIR, LENGTH_EPSILON};

/// Defines utility functions for planar vectors.
pub trait PlanarUtils: Sized {
    /// Rotates a quarter turn counter-clockwise. This is the left side of a direction.
    fn left_hand(self) -> Self;

    /// Rotates a quarter turn clockwise. This is the right side of a direction.
    fn right_hand(self) -> Self;

    /// The z component of the 3D cross product. Positive when other is counter-clockwise of self.
    fn cross2(self, other: Self) -> f32;

    /// Angle of self measured counter-clockwise from the x axis, in `[0, 2π)`.
    fn heading(self) -> f32;

    /// Normalizes self, returning `None` if self is shorter than [`LENGTH_EPSILON`].
    fn try_dir(self) -> Option<Self>;

    fn normalize_else(self) -> Self;

    /// Intersection of the line through self with direction self_dir and the line through
    /// other with direction other_dir. Returns `None` for (nearly) parallel lines.
    fn intersection(self, self_dir: Self, other: Self, other_dir: Self) -> Option<Self>;

    /// Lifts a planar position into world space at the given height.
    fn to_world(self, height: f32) -> Vec3;
}

impl PlanarUtils for Vec2 {
    fn left_hand(self) -> Self {
        Vec2::new(-self.y, self.x)
    }

    fn right_hand(self) -> Self {
        Vec2::new(self.y, -self.x)
    }

    fn cross2(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    fn heading(self) -> f32 {
        use super::Angle;
        self.y.atan2(self.x).rad_normalize()
    }

    fn try_dir(self) -> Option<Self> {
        let length = self.length();
        if length < LENGTH_EPSILON || !length.is_finite() {
            return None;
        }
        Some(self / length)
    }

    fn normalize_else(self) -> Self {
        self.try_dir().unwrap_or(DEFAULT_DIR)
    }

    fn intersection(self, self_dir: Self, other: Self, other_dir: Self) -> Option<Self> {
        let denom = self_dir.cross2(other_dir);
        if denom.abs() < LENGTH_EPSILON {
            return None;
        }
        let s = (other - self).cross2(other_dir) / denom;
        Some(self + self_dir * s)
    }

    fn to_world(self, height: f32) -> Vec3 {
        Vec3::new(self.x, height, self.y)
    }
}

/// Defines utility functions for world space vectors.
pub trait WorldUtils {
    /// Drops the height, returning the planar `(x, z)` position.
    fn planar(self) -> Vec2;
}

impl WorldUtils for Vec3 {
    fn planar(self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }
}
