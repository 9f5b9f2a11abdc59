use roads_api::{
    ComputeResult, ComputeSettings, DerivedNetwork, Junction, JunctionMode, Primitive,
    PrimitiveFlags, PrimitiveKind, PrimitiveSource, RoadSchema, Segment,
};

use utils::id::{IdManager, JunctionId};

use glam::Vec2;

use crate::graph::{to_world, RoadGraph};
use crate::junction::{build_junction, find_clusters, JunctionParams};
use crate::trim;

/// Derives the full network geometry of a schema. Fails only on invalid settings, every other
/// problem is recovered from and reported in [`DerivedNetwork::diagnostics`].
pub fn compute(schema: &RoadSchema, settings: &ComputeSettings) -> ComputeResult<DerivedNetwork> {
    settings.validate()?;

    let RoadGraph {
        roads,
        points,
        mut segments,
        mut diagnostics,
    } = RoadGraph::build(schema, settings);

    let threshold = settings.junction_threshold();
    let clusters = match settings.junctions.mode {
        JunctionMode::Disabled => vec![],
        JunctionMode::Tagged => {
            let tags: Vec<Vec2> = schema
                .junction_tags
                .iter()
                .map(|tag| to_world(*tag, schema.units, settings))
                .collect();
            find_clusters(&points, &segments, threshold, Some(&tags))
        }
        JunctionMode::Auto => find_clusters(&points, &segments, threshold, None),
    };

    let params = JunctionParams {
        threshold,
        trim: settings.trim_distance(threshold),
        fillet_radius: settings.fillet_radius(),
    };
    let mut junction_ids: IdManager<JunctionId> = IdManager::new();
    let mut endpoint_ids = IdManager::new();
    let mut consumed = vec![];
    let junctions: Vec<Junction> = clusters
        .iter()
        .map(|cluster| {
            consumed.extend_from_slice(&cluster.consumed);
            build_junction(
                junction_ids.gen(),
                cluster,
                &segments,
                &params,
                &mut endpoint_ids,
                &mut diagnostics,
            )
        })
        .collect();

    trim::apply(
        &mut segments,
        &junctions,
        &consumed,
        params.trim.is_some(),
    );
    let primitives = flatten(&segments, &junctions, settings.flags);

    log::debug!(
        "computed {} segments, {} junctions, {} primitives",
        segments.len(),
        junctions.len(),
        primitives.len()
    );
    for diagnostic in diagnostics.iter() {
        log::warn!("{}", diagnostic);
    }

    Ok(DerivedNetwork {
        roads,
        points,
        segments,
        junctions,
        primitives,
        diagnostics,
    })
}

/// Asphalt pieces first, then junction surfaces.
fn flatten(segments: &[Segment], junctions: &[Junction], flags: PrimitiveFlags) -> Vec<Primitive> {
    let mut primitives = vec![];
    if flags.asphalt_pieces {
        for segment in segments.iter() {
            primitives.extend(segment.kept.iter().enumerate().map(|(i, piece)| Primitive {
                kind: PrimitiveKind::AsphaltPiece,
                source: PrimitiveSource::Segment(segment.id, i),
                vertices: piece.corners.to_vec(),
            }));
        }
    }
    if flags.junction_surfaces {
        primitives.extend(junctions.iter().map(|junction| Primitive {
            kind: PrimitiveKind::JunctionSurface,
            source: PrimitiveSource::Junction(junction.id),
            vertices: junction.surface.clone(),
        }));
    }
    primitives
}
