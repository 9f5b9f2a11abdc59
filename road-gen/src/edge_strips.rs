use roads_api::DerivedNetwork;

use curves::offset_band;
use utils::consts::DEFAULT_MITER_LIMIT;

use serde::{Deserialize, Serialize};

use crate::boundary::boundary_chains;
use crate::buffers::TriangleBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeStripSettings {
    /// Width of the worn band along the inside of the asphalt edge.
    pub wear_width: f32,
    /// Width of the dirt band on the sidewalk, right behind the curb.
    pub dirt_width: f32,
    pub lift: f32,
    pub miter_limit: f32,
}

impl Default for EdgeStripSettings {
    fn default() -> Self {
        Self {
            wear_width: 0.6,
            dirt_width: 0.4,
            lift: 0.01,
            miter_limit: DEFAULT_MITER_LIMIT,
        }
    }
}

/// Flat decals along the asphalt edge. Both layers are kept apart since they use different
/// materials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeStrips {
    pub wear: TriangleBuffer,
    pub dirt: TriangleBuffer,
}

impl EdgeStrips {
    pub fn is_empty(&self) -> bool {
        self.wear.is_empty() && self.dirt.is_empty()
    }
}

/// The dirt band sits on the sidewalk, so it is lifted relative to `sidewalk_lift`.
pub fn build_edge_strips(
    network: &DerivedNetwork,
    settings: &EdgeStripSettings,
    curb_thickness: f32,
    sidewalk_lift: f32,
) -> EdgeStrips {
    let mut strips = EdgeStrips::default();
    let curb_thickness = curb_thickness.max(0.0);
    for chain in boundary_chains(network) {
        if settings.wear_width > 0.0 {
            let band = offset_band(
                &chain.points,
                chain.closed,
                -settings.wear_width,
                0.0,
                settings.miter_limit,
            );
            strips.wear.push_band(&band, chain.closed, settings.lift);
        }
        if settings.dirt_width > 0.0 {
            let band = offset_band(
                &chain.points,
                chain.closed,
                curb_thickness,
                curb_thickness + settings.dirt_width,
                settings.miter_limit,
            );
            strips
                .dirt
                .push_band(&band, chain.closed, sidewalk_lift + settings.lift);
        }
    }
    log::debug!(
        "built {} wear and {} dirt triangles",
        strips.wear.len(),
        strips.dirt.len()
    );
    strips
}
