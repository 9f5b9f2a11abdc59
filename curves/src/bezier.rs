use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Control points of a bezier curve of arbitrary degree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtrlPoints(Vec<Vec2>);

impl core::ops::Deref for CtrlPoints {
    type Target = Vec<Vec2>;

    fn deref(self: &'_ Self) -> &'_ Self::Target {
        &self.0
    }
}

impl CtrlPoints {
    /// A quadratic curve from `start` to `end` pulled towards `corner`.
    pub fn quadratic(start: Vec2, corner: Vec2, end: Vec2) -> Self {
        Self(vec![start, corner, end])
    }

    /// Evaluates the curve at `t` in `[0, 1]` using the bernstein form.
    pub fn calc_bezier_pos(&self, t: f32) -> Vec2 {
        let n = self.len();
        if n == 0 {
            return Vec2::ZERO;
        }
        let mut v = Vec2::ZERO;
        let mut r = (1.0 - t).powi(n as i32 - 1);
        let mut l = 1.0;
        for (i, p) in self.iter().enumerate() {
            let f = l * r;
            v += *p * f;
            if t == 1.0 {
                if i + 2 == n {
                    r = 1.0;
                } else {
                    r = 0.0;
                }
            } else {
                r *= t / (1.0 - t);
            }
            l *= n as f32 / (1.0 + i as f32) - 1.0;
        }
        v
    }

    /// Samples `segments + 1` points from the start to the end of the curve, both included.
    pub fn sample(&self, segments: u32) -> Vec<Vec2> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.calc_bezier_pos(i as f32 / segments as f32))
            .collect()
    }
}
