//! Everything that is built from one derived network, ready to be handed to a renderer.

use std::fmt;
use std::sync::Arc;

use road_gen::{
    build_curbs, build_edge_strips, build_markings, build_sidewalks, EdgeStrips, Markings,
    MeshBuilder, MeshBuffers, TriangleBuffer,
};
use roads_api::{DerivedNetwork, Diagnostic};

use crate::config::ArchitectConfig;

/// Height of the asphalt surface.
const ASPHALT_HEIGHT: f32 = 0.0;

pub struct Scene {
    pub network: Arc<DerivedNetwork>,
    pub asphalt: MeshBuffers,
    pub curbs: TriangleBuffer,
    pub sidewalks: TriangleBuffer,
    pub edge_strips: EdgeStrips,
    pub markings: Markings,
    /// Diagnostics of the compute engine followed by those of the mesh builder.
    pub diagnostics: Vec<Diagnostic>,
}

impl Scene {
    pub fn build(network: Arc<DerivedNetwork>, config: &ArchitectConfig) -> Self {
        let (asphalt, mesh_diagnostics) = MeshBuilder::new(ASPHALT_HEIGHT)
            .add_primitives(&network.primitives)
            .build();
        let curb_thickness = config.curb.thickness.max(0.0);

        let curbs = build_curbs(&network, &config.curb);
        let sidewalks = build_sidewalks(&network, &config.sidewalk, curb_thickness);
        let edge_strips = build_edge_strips(
            &network,
            &config.edge_strips,
            curb_thickness,
            config.sidewalk.lift,
        );
        let markings = build_markings(&network, &config.markings, config.compute.lane_width);

        let mut diagnostics = network.diagnostics.clone();
        diagnostics.extend(mesh_diagnostics);

        Self {
            network,
            asphalt,
            curbs,
            sidewalks,
            edge_strips,
            markings,
            diagnostics,
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} segments, {} junctions, {} primitives",
            self.network.segments.len(),
            self.network.junctions.len(),
            self.network.primitives.len()
        )?;
        writeln!(
            f,
            "asphalt: {} vertices, {} triangles",
            self.asphalt.vertex_count(),
            self.asphalt.triangle_count()
        )?;
        writeln!(
            f,
            "curbs: {}, sidewalks: {}, wear: {}, dirt: {} triangles",
            self.curbs.len(),
            self.sidewalks.len(),
            self.edge_strips.wear.len(),
            self.edge_strips.dirt.len()
        )?;
        write!(
            f,
            "markings: {} lines, {} crosswalk and {} arrow triangles, {} diagnostics",
            self.markings.lines.len(),
            self.markings.crosswalks.len(),
            self.markings.arrows.len(),
            self.diagnostics.len()
        )
    }
}
