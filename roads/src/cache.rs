//! A caller owned cache of derived networks. Computing the same schema with the same geometric
//! settings twice returns the shared result of the first computation.
use roads_api::{
    ComputeResult, ComputeSettings, DerivedNetwork, JunctionMode, PathRef, RoadSchema, TrimMode,
};

use glam::Vec2;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

use crate::compute;

fn hash_f32(state: &mut DefaultHasher, value: f32) {
    value.to_bits().hash(state);
}

fn hash_vec2(state: &mut DefaultHasher, value: Vec2) {
    hash_f32(state, value.x);
    hash_f32(state, value.y);
}

/// Fingerprint of everything that influences the derived geometry. Visual settings are left out.
pub fn fingerprint(schema: &RoadSchema, settings: &ComputeSettings) -> u64 {
    let mut state = DefaultHasher::new();

    schema.units.hash(&mut state);
    schema.points.len().hash(&mut state);
    for point in schema.points.iter() {
        point.id.hash(&mut state);
        hash_vec2(&mut state, point.pos);
    }
    schema.roads.len().hash(&mut state);
    for road in schema.roads.iter() {
        road.tag.hash(&mut state);
        road.lanes_f.hash(&mut state);
        road.lanes_b.hash(&mut state);
        road.path.len().hash(&mut state);
        for path_ref in road.path.iter() {
            match path_ref {
                PathRef::Point(id) => {
                    0u8.hash(&mut state);
                    id.hash(&mut state);
                }
                PathRef::Pos(pos) => {
                    1u8.hash(&mut state);
                    hash_vec2(&mut state, *pos);
                }
            }
        }
    }
    schema.junction_tags.len().hash(&mut state);
    for tag in schema.junction_tags.iter() {
        hash_vec2(&mut state, *tag);
    }

    hash_f32(&mut state, settings.tile_size);
    hash_f32(&mut state, settings.lane_width);
    hash_f32(&mut state, settings.margin_factor);
    hash_vec2(&mut state, settings.origin);
    settings.flags.hash(&mut state);
    let junctions = &settings.junctions;
    junctions.mode.hash(&mut state);
    if junctions.mode != JunctionMode::Disabled {
        hash_f32(&mut state, junctions.threshold_factor);
        hash_f32(&mut state, junctions.fillet_radius_factor);
        hash_f32(&mut state, junctions.min_threshold);
        hash_f32(&mut state, junctions.max_threshold);
    }
    match settings.trim.mode {
        TrimMode::Disabled => 0u8.hash(&mut state),
        TrimMode::JunctionThreshold => 1u8.hash(&mut state),
        TrimMode::Fixed(distance) => {
            2u8.hash(&mut state);
            hash_f32(&mut state, distance);
        }
    }
    state.finish()
}

#[derive(Debug, Default)]
pub struct ComputeCache {
    entries: RwLock<HashMap<u64, Arc<DerivedNetwork>>>,
}

impl ComputeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached network for the input, computing and storing it on a miss. Errors are
    /// not cached.
    pub fn get_or_compute(
        &self,
        schema: &RoadSchema,
        settings: &ComputeSettings,
    ) -> ComputeResult<Arc<DerivedNetwork>> {
        let key = fingerprint(schema, settings);
        if let Some(network) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            log::debug!("compute cache hit for {:016x}", key);
            return Ok(Arc::clone(network));
        }

        let network = Arc::new(compute(schema, settings)?);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&network));
        Ok(network)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roads_api::RoadDesc;

    fn schema() -> RoadSchema {
        RoadSchema::new().with_road(RoadDesc::new(
            "a",
            1,
            1,
            [Vec2::ZERO, Vec2::new(30.0, 0.0)],
        ))
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let cache = ComputeCache::new();
        let settings = ComputeSettings::default();
        let first = cache.get_or_compute(&schema(), &settings).unwrap();
        let second = cache.get_or_compute(&schema(), &settings).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn visual_settings_share_an_entry() {
        let mut settings = ComputeSettings::default();
        let a = fingerprint(&schema(), &settings);
        settings.visual.noise_seed = 99;
        assert_eq!(a, fingerprint(&schema(), &settings));
        settings.lane_width = 3.0;
        assert_ne!(a, fingerprint(&schema(), &settings));
    }

    #[test]
    fn different_schemas_are_different_entries() {
        let cache = ComputeCache::new();
        let settings = ComputeSettings::default();
        cache.get_or_compute(&schema(), &settings).unwrap();
        let other = schema().with_junction_tag(Vec2::ONE);
        cache.get_or_compute(&other, &settings).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = ComputeCache::new();
        let settings = ComputeSettings {
            tile_size: 0.0,
            ..Default::default()
        };
        assert!(cache.get_or_compute(&schema(), &settings).is_err());
        assert!(cache.is_empty());
    }
}
