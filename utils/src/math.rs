//! Contains utils for math as traits that are implemented for different math
//! types. All road geometry is planar: a [`glam::Vec2`] holds world `(x, z)`, with the world
//! `z` coordinate stored in the `y` component.

use std::f32::consts::TAU;

mod polygon;
mod vec;

pub use polygon::{
    convex_hull, is_convex, is_simple, polygon_area, segment_intersection, signed_area,
};
pub use vec::{PlanarUtils, WorldUtils};

/// Defines functions associated with angle computations.
pub trait Angle {
    /// Maps the angle into `[0, 2π)`.
    fn rad_normalize(self) -> Self;
}

impl Angle for f32 {
    fn rad_normalize(self) -> Self {
        let a = self.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if a >= TAU {
            0.0
        } else {
            a
        }
    }
}
