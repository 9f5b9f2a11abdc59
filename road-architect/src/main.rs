mod config;
mod scene;

use std::path::PathBuf;

use anyhow::Context;
use roads::{ComputeCache, TileMap};

use scene::Scene;

/// Builds every tile map given on the command line, or the configured one if there are none.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = config::load_config()?;
    let mut maps: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if maps.is_empty() {
        maps.push(config.map.clone());
    }

    // maps given twice are only computed once
    let cache = ComputeCache::new();
    for path in maps {
        let text = utils::loader::load_string_at(&path)
            .with_context(|| format!("failed to read tile map {}", path.display()))?;
        let map: TileMap = text
            .parse()
            .with_context(|| format!("failed to parse tile map {}", path.display()))?;

        let network = cache
            .get_or_compute(&map.to_schema(), &config.compute)
            .with_context(|| format!("failed to compute the network of {}", path.display()))?;
        let scene = Scene::build(network, &config);
        println!("{}:\n{}\n", path.display(), scene);
    }
    log::info!("computed {} distinct networks", cache.len());
    Ok(())
}
