//! This module defines all settings of the compute engine. All fields are named and defaulted,
//! mode-like switches are enums such that invalid combinations cannot be expressed.
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{ComputeError, ComputeResult};

/// Defines if and how junctions are detected.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JunctionMode {
    /// No junctions are built and nothing is trimmed.
    Disabled,
    /// Only junctions close to one of the schema's junction tags are built.
    Tagged,
    /// Junctions are detected geometrically wherever segments meet or cross.
    #[default]
    Auto,
}

/// Defines how far segments are cut back from the junctions they touch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimMode {
    /// Segments keep their full range, junction surfaces are laid on top of them.
    Disabled,
    /// Segments are cut back by the detection threshold of the junction.
    #[default]
    JunctionThreshold,
    /// Segments are cut back by a fixed distance in world units.
    Fixed(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JunctionSettings {
    pub mode: JunctionMode,
    /// Detection threshold as a multiple of the lane width.
    pub threshold_factor: f32,
    /// Radius of the fillets between adjacent approaches as a multiple of the lane width.
    pub fillet_radius_factor: f32,
    pub min_threshold: f32,
    pub max_threshold: f32,
}

impl Default for JunctionSettings {
    fn default() -> Self {
        Self {
            mode: JunctionMode::default(),
            threshold_factor: 2.0,
            fillet_radius_factor: 1.0,
            min_threshold: 0.1,
            max_threshold: 64.0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimSettings {
    pub mode: TrimMode,
}

/// Selects which kinds of primitives are flattened into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimitiveFlags {
    pub asphalt_pieces: bool,
    pub junction_surfaces: bool,
}

impl Default for PrimitiveFlags {
    fn default() -> Self {
        Self {
            asphalt_pieces: true,
            junction_surfaces: true,
        }
    }
}

/// Values that only the renderer looks at. They are carried here so one config file can describe
/// a whole city, but they never influence the derived geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    pub noise_seed: u32,
    pub wear_intensity: f32,
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            noise_seed: 0,
            wear_intensity: 0.5,
        }
    }
}

/// Configuration of the compute engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeSettings {
    /// Side length of a map tile in world units.
    pub tile_size: f32,
    /// Width of a single lane in world units.
    pub lane_width: f32,
    /// The shoulder on each side of the lanes is `margin_factor * lane_width` wide.
    pub margin_factor: f32,
    /// World position of the schema origin.
    pub origin: Vec2,
    pub flags: PrimitiveFlags,
    pub junctions: JunctionSettings,
    pub trim: TrimSettings,
    pub visual: VisualSettings,
}

impl Default for ComputeSettings {
    fn default() -> Self {
        Self {
            tile_size: 24.0,
            lane_width: 4.8,
            margin_factor: 0.1094,
            origin: Vec2::ZERO,
            flags: PrimitiveFlags::default(),
            junctions: JunctionSettings::default(),
            trim: TrimSettings::default(),
            visual: VisualSettings::default(),
        }
    }
}

impl ComputeSettings {
    /// Checks the settings that the engine cannot recover from.
    pub fn validate(&self) -> ComputeResult<()> {
        if !(self.lane_width.is_finite() && self.lane_width > 0.0) {
            return Err(ComputeError::InvalidSettings(format!(
                "lane width must be positive, got {}",
                self.lane_width
            )));
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ComputeError::InvalidSettings(format!(
                "tile size must be positive, got {}",
                self.tile_size
            )));
        }
        if !(self.margin_factor.is_finite() && self.margin_factor >= 0.0) {
            return Err(ComputeError::InvalidSettings(format!(
                "margin factor must not be negative, got {}",
                self.margin_factor
            )));
        }
        Ok(())
    }

    pub fn shoulder(&self) -> f32 {
        self.margin_factor * self.lane_width
    }

    /// Returns the half widths `(left, right)` of a segment with the given lane counts. Forward
    /// lanes lie to the right of the polyline, backward lanes to the left.
    pub fn half_widths(&self, lanes_f: u8, lanes_b: u8) -> (f32, f32) {
        let shoulder = self.shoulder();
        (
            lanes_b as f32 * self.lane_width + shoulder,
            lanes_f as f32 * self.lane_width + shoulder,
        )
    }

    /// The distance within which candidates are merged into one junction.
    pub fn junction_threshold(&self) -> f32 {
        let j = &self.junctions;
        let raw = j.threshold_factor * self.lane_width;
        raw.max(j.min_threshold).min(j.max_threshold.max(j.min_threshold))
    }

    pub fn fillet_radius(&self) -> f32 {
        (self.junctions.fillet_radius_factor * self.lane_width).max(0.0)
    }

    /// How far segments are cut back from a junction with the given threshold, `None` if
    /// trimming is disabled.
    pub fn trim_distance(&self, junction_threshold: f32) -> Option<f32> {
        match self.trim.mode {
            TrimMode::Disabled => None,
            TrimMode::JunctionThreshold => Some(junction_threshold),
            TrimMode::Fixed(distance) => Some(distance.max(0.0)),
        }
    }
}
