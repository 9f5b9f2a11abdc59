use roads_api::DerivedNetwork;

use curves::offset_band;
use utils::consts::DEFAULT_MITER_LIMIT;
use utils::PlanarUtils;

use serde::{Deserialize, Serialize};

use crate::boundary::{boundary_chains, BoundaryChain};
use crate::buffers::TriangleBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurbSettings {
    /// Width of the curb measured outwards from the asphalt edge.
    pub thickness: f32,
    pub height: f32,
    /// Added on top of `height`, to keep the curb visible over uneven asphalt.
    pub extra_height: f32,
    /// How deep the side faces reach below the asphalt.
    pub sink: f32,
    pub miter_limit: f32,
}

impl Default for CurbSettings {
    fn default() -> Self {
        Self {
            thickness: 0.3,
            height: 0.15,
            extra_height: 0.05,
            sink: 0.2,
            miter_limit: DEFAULT_MITER_LIMIT,
        }
    }
}

impl CurbSettings {
    pub fn top(&self) -> f32 {
        self.height + self.extra_height
    }
}

fn build_chain(chain: &BoundaryChain, settings: &CurbSettings, out: &mut TriangleBuffer) {
    let band = offset_band(
        &chain.points,
        chain.closed,
        0.0,
        settings.thickness,
        settings.miter_limit,
    );
    let (top, bottom) = (settings.top(), -settings.sink);
    out.push_band(&band, chain.closed, top);

    let n = band.len();
    let faces = if chain.closed { n } else { n.saturating_sub(1) };
    for i in 0..faces {
        let ([inner_a, outer_a], [inner_b, outer_b]) = (band[i], band[(i + 1) % n]);
        // facing the asphalt
        out.push_quad(
            inner_a.to_world(bottom),
            inner_b.to_world(bottom),
            inner_b.to_world(top),
            inner_a.to_world(top),
        );
        out.push_quad(
            outer_a.to_world(bottom),
            outer_a.to_world(top),
            outer_b.to_world(top),
            outer_b.to_world(bottom),
        );
    }
}

/// Builds the curbs around all asphalt of the network. A curb without thickness is no curb.
pub fn build_curbs(network: &DerivedNetwork, settings: &CurbSettings) -> TriangleBuffer {
    let mut out = TriangleBuffer::new();
    if settings.thickness <= 0.0 {
        return out;
    }
    for chain in boundary_chains(network) {
        build_chain(&chain, settings, &mut out);
    }
    log::debug!("built {} curb triangles", out.len());
    out
}
