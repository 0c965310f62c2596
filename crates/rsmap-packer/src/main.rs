//! Batch packer: reads authored area definitions from TOML, verifies them
//! and packs them into a directory-backed cache.
//!
//! The asset-side providers (sprites, fonts, textures, source maps) are
//! stubbed as absent here; deployments plug in a cache-backed asset layer
//! implementing the provider traits. Missing source maps simply produce
//! areas without blocks, per the recoverable-absence rules.

mod cache;
mod config;

use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};

use rsmap_raster::provider::{
    FontMetrics, FontMetricsProvider, GraphicsDefaultsProvider, SpriteProvider,
};
use rsmap_raster::sprite::SpriteSheet;
use rsmap_worldmap::pack::{add_area, area_exists, update_area};
use rsmap_worldmap::providers::{
    MapElement, MapElementConfigProvider, MapProvider, ObjectProvider, OverlayProvider, Providers,
    SourceMapsquare, TextureProvider, Underlay, UnderlayProvider,
};

use cache::DirCache;
use config::PackerConfig;

/// Asset lookups that answer "absent" across the board.
struct AbsentAssets;

impl SpriteProvider for AbsentAssets {
    fn sprite_sheet(&self, _id: i32) -> Option<SpriteSheet> {
        None
    }
}

impl FontMetricsProvider for AbsentAssets {
    fn font(&self, _id: i32) -> Option<FontMetrics> {
        None
    }
}

impl GraphicsDefaultsProvider for AbsentAssets {
    fn map_scenes_group(&self) -> i32 {
        -1
    }
    fn mod_icons_group(&self) -> i32 {
        -1
    }
}

impl TextureProvider for AbsentAssets {
    fn hsl(&self, _id: i32) -> i32 {
        -1
    }
}

impl ObjectProvider for AbsentAssets {
    fn map_scene_id(&self, _id: i32) -> i32 {
        -1
    }
    fn map_icon_id(&self, _id: i32) -> i32 {
        -1
    }
    fn boundary_type(&self, _id: i32) -> i32 {
        0
    }
}

impl OverlayProvider for AbsentAssets {
    fn exists(&self, _id: i32) -> bool {
        false
    }
    fn minimap_colour(&self, _id: i32) -> i32 {
        -1
    }
    fn tile_colour(&self, _id: i32) -> i32 {
        0
    }
    fn texture_id(&self, _id: i32) -> i32 {
        -1
    }
    fn hue(&self, _id: i32) -> i32 {
        0
    }
    fn saturation(&self, _id: i32) -> i32 {
        0
    }
    fn lightness(&self, _id: i32) -> i32 {
        0
    }
}

impl UnderlayProvider for AbsentAssets {
    fn underlay(&self, _id: i32) -> Option<Underlay> {
        None
    }
}

impl MapProvider for AbsentAssets {
    fn map(&self, _mapsquare_x: i32, _mapsquare_y: i32) -> Option<SourceMapsquare> {
        None
    }
}

impl MapElementConfigProvider for AbsentAssets {
    fn map_element(&self, _id: i32) -> MapElement {
        MapElement {
            text: None,
            text_size: 0,
            text_colour: 0,
            graphic: -1,
            horizontal_alignment: 1,
            vertical_alignment: 1,
        }
    }
}

fn main() -> ExitCode {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "packer.toml".into());
    let config = match PackerConfig::load(Path::new(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load {config_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();

    info!(
        "rsmap-packer v{} writing to {}",
        env!("CARGO_PKG_VERSION"),
        config.pack.cache_dir
    );

    let cache = DirCache::new(&config.pack.cache_dir);
    let assets = AbsentAssets;
    let providers = Providers {
        cache: &cache,
        textures: &assets,
        sprites: &assets,
        font_metrics: &assets,
        objects: &assets,
        maps: &assets,
        overlays: &assets,
        map_elements: &assets,
        graphics_defaults: &assets,
        underlays: &assets,
    };
    let options = config.pack.options();

    // Areas are independent units of work; one failure does not block the
    // rest.
    let mut failures = 0;
    for area in &config.areas {
        let details = area.details();
        let elements = area.map_elements();
        let name = details.internal_name.clone();
        let result = if area_exists(&cache, &name) {
            update_area(&providers, &area.name, |_| details, |_| elements, options)
        } else {
            add_area(&providers, details, elements, options)
        };
        match result {
            Ok(()) => info!(area = %name, "packed"),
            Err(e) => {
                failures += 1;
                error!(area = %name, "packing failed: {e}");
            }
        }
    }
    if failures > 0 {
        error!("{failures} area(s) failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
