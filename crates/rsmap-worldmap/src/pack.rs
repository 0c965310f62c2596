//! The batch pipeline: build an area's blocks from its sections, composite
//! the ground, render, and write every artefact back to the cache.

use std::collections::BTreeMap;

use bytes::BytesMut;
use image::RgbImage;
use tracing::{debug, info};

use crate::area::{WorldMapArea, WorldMapAreaData, WorldMapElement, WorldMapMapsquare, WorldMapZone};
use crate::builder::build_section;
use crate::constants::{
    COMPOSITE_MAP_GROUP, COMPOSITE_TEXTURE_GROUP, DATA_ARCHIVE, DETAILS_GROUP, GEOGRAPHY_ARCHIVE,
    GROUND_ARCHIVE, LABELS_FILE,
};
use crate::coordinate::MapsquareId;
use crate::details::WorldMapAreaDetails;
use crate::error::WorldMapError;
use crate::ground::{build_underlay_images, parse_underlay_images, GroundAreas};
use crate::providers::{CacheProvider, MapProvider, ObjectProvider, Providers};
use crate::renderer::{draw_overlays_and_elements, generate_composite_texture};

/// Knobs of the pack pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PackOptions {
    /// Blend mapsquare borders in a separate pass instead of smoothing
    /// across seams directly.
    pub blend_borders_separately: bool,
    /// Palette brightness exponent.
    pub brightness: f64,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            blend_borders_separately: false,
            brightness: 0.7,
        }
    }
}

/// Build all blocks of an area from its section list.
pub fn generate_blocks(
    details: &WorldMapAreaDetails,
    maps: &dyn MapProvider,
    objects: &dyn ObjectProvider,
) -> (Vec<WorldMapMapsquare>, Vec<WorldMapZone>) {
    let mut mapsquares = Vec::new();
    let mut zones = Vec::new();
    for section in &details.sections {
        build_section(section, maps, objects, &mut mapsquares, &mut zones);
    }
    debug!(
        area = %details.internal_name,
        mapsquares = mapsquares.len(),
        zones = zones.len(),
        "generated blocks"
    );
    (mapsquares, zones)
}

/// Render a freshly built area to an image without touching the cache.
pub fn generate_map_image(
    providers: &Providers<'_>,
    details: WorldMapAreaDetails,
    elements: Vec<WorldMapElement>,
    pixels_per_tile: usize,
    options: PackOptions,
) -> RgbImage {
    let (mapsquares, zones) = generate_blocks(&details, providers.maps, providers.objects);
    let area = WorldMapArea {
        internal_name: details.internal_name.clone(),
        details,
        data: WorldMapAreaData {
            mapsquares,
            zones,
            elements,
        },
    };
    let areas = GroundAreas::build(&area.data);
    let images = build_underlay_images(&areas, options.blend_borders_separately, providers.underlays);
    draw_overlays_and_elements(providers, &area, &areas, &images, pixels_per_tile, options.brightness)
}

/// Render an already-packed area, reusing its stored ground images.
pub fn generate_map_image_from_cache(
    providers: &Providers<'_>,
    name: &str,
    pixels_per_tile: usize,
    options: PackOptions,
) -> Result<RgbImage, WorldMapError> {
    let area = WorldMapArea::decode(providers.cache, name)?;
    let areas = GroundAreas::build(&area.data);
    let images = parse_underlay_images(providers.cache, &areas, &area.data);
    Ok(draw_overlays_and_elements(
        providers,
        &area,
        &areas,
        &images,
        pixels_per_tile,
        options.brightness,
    ))
}

/// Whether an area has been packed into the cache.
pub fn area_exists(cache: &dyn CacheProvider, internal_name: &str) -> bool {
    cache.exists_named(DATA_ARCHIVE, DETAILS_GROUP, internal_name)
}

/// Build and pack a new area into the cache.
pub fn add_area(
    providers: &Providers<'_>,
    details: WorldMapAreaDetails,
    elements: Vec<WorldMapElement>,
    options: PackOptions,
) -> Result<(), WorldMapError> {
    info!(area = %details.internal_name, "packing new world map area");
    let (mapsquares, zones) = generate_blocks(&details, providers.maps, providers.objects);
    let area = WorldMapArea {
        internal_name: details.internal_name.clone(),
        details,
        data: WorldMapAreaData {
            mapsquares,
            zones,
            elements,
        },
    };
    let areas = GroundAreas::build(&area.data);
    let sprites = build_underlay_images(&areas, options.blend_borders_separately, providers.underlays);
    let composite = generate_composite_texture(
        providers,
        &areas,
        &sprites,
        area.details.background_colour,
        options.brightness,
    );
    write_area(providers.cache, &composite, &sprites, area, true)
}

/// Re-pack an existing area, transforming its details and elements.
pub fn update_area(
    providers: &Providers<'_>,
    name: &str,
    transform_details: impl FnOnce(WorldMapAreaDetails) -> WorldMapAreaDetails,
    transform_elements: impl FnOnce(Vec<WorldMapElement>) -> Vec<WorldMapElement>,
    options: PackOptions,
) -> Result<(), WorldMapError> {
    let existing = WorldMapArea::decode(providers.cache, name)?;
    let background_colour = existing.details.background_colour;
    let details = transform_details(existing.details);
    let elements = transform_elements(existing.data.elements);
    info!(area = %details.internal_name, "re-packing world map area");
    let (mapsquares, zones) = generate_blocks(&details, providers.maps, providers.objects);
    let area = WorldMapArea {
        internal_name: details.internal_name.clone(),
        details,
        data: WorldMapAreaData {
            mapsquares,
            zones,
            elements,
        },
    };
    let areas = GroundAreas::build(&area.data);
    let sprites = build_underlay_images(&areas, options.blend_borders_separately, providers.underlays);
    let composite =
        generate_composite_texture(providers, &areas, &sprites, background_colour, options.brightness);
    write_area(providers.cache, &composite, &sprites, area, false)
}

fn encode_png(image: &RgbImage) -> Result<Vec<u8>, WorldMapError> {
    let mut bytes = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

/// Write every artefact of a packed area: composite texture, ground images,
/// details, composite map data, and per-block geography groups. Block
/// group/file ids are assigned here from freshly allocated ground groups.
fn write_area(
    cache: &dyn CacheProvider,
    composite: &RgbImage,
    sprites: &BTreeMap<MapsquareId, RgbImage>,
    area: WorldMapArea,
    add: bool,
) -> Result<(), WorldMapError> {
    let internal_name = area.internal_name.clone();
    cache.write_named(
        DATA_ARCHIVE,
        COMPOSITE_TEXTURE_GROUP,
        &internal_name,
        &encode_png(composite)?,
    );
    if add {
        cache.write_named(DATA_ARCHIVE, &internal_name, LABELS_FILE, &[0]);
    }

    let mut ground_groups: BTreeMap<MapsquareId, i32> = BTreeMap::new();
    for (mapsquare_id, image) in sprites {
        let group_id = cache
            .allocate_empty(GROUND_ARCHIVE)
            .ok_or(WorldMapError::ArchiveFull(GROUND_ARCHIVE))?;
        cache.write(GROUND_ARCHIVE, group_id, 0, &encode_png(image)?);
        ground_groups.insert(*mapsquare_id, group_id);
    }

    // Hand out file ids per ground group: mapsquare blocks first, zone
    // blocks after, sharing one counter per group.
    let mut next_file_id: BTreeMap<i32, i32> = BTreeMap::new();
    let mut mapsquares = area.data.mapsquares;
    let mut zones = area.data.zones;
    for mapsquare in &mut mapsquares {
        let id = MapsquareId::new(
            mapsquare.data.mapsquare_destination_x,
            mapsquare.data.mapsquare_destination_y,
        );
        let Some(&group_id) = ground_groups.get(&id) else {
            continue;
        };
        let file_id = next_file_id.entry(group_id).or_insert(0);
        mapsquare.data.group_id = group_id;
        mapsquare.data.file_id = *file_id;
        *file_id += 1;
    }
    for zone in &mut zones {
        let id = MapsquareId::new(
            zone.data.mapsquare_destination_x,
            zone.data.mapsquare_destination_y,
        );
        let Some(&group_id) = ground_groups.get(&id) else {
            continue;
        };
        let file_id = next_file_id.entry(group_id).or_insert(0);
        zone.data.group_id = group_id;
        zone.data.file_id = *file_id;
        *file_id += 1;
    }

    let mut details_buf = BytesMut::new();
    area.details.encode(&mut details_buf)?;
    cache.write_named_with_id(
        DATA_ARCHIVE,
        DETAILS_GROUP,
        &internal_name,
        area.details.id,
        &details_buf,
    );

    let data = WorldMapAreaData {
        mapsquares,
        zones,
        elements: area.data.elements,
    };
    let mut data_buf = BytesMut::new();
    data.encode(&mut data_buf);
    cache.write_named(DATA_ARCHIVE, COMPOSITE_MAP_GROUP, &internal_name, &data_buf);

    for mapsquare in &data.mapsquares {
        let mut buf = BytesMut::new();
        mapsquare.geography.encode(&mut buf);
        cache.write(GEOGRAPHY_ARCHIVE, mapsquare.data.group_id, mapsquare.data.file_id, &buf);
    }
    for zone in &data.zones {
        let mut buf = BytesMut::new();
        zone.geography.encode(&mut buf);
        cache.write(GEOGRAPHY_ARCHIVE, zone.data.group_id, zone.data.file_id, &buf);
    }
    info!(
        area = %internal_name,
        mapsquares = data.mapsquares.len(),
        zones = data.zones.len(),
        elements = data.elements.len(),
        "area packed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use bytes::Bytes;

    use crate::coordinate::Coordinate;
    use crate::providers::{
        Landscape, MapElement, MapElementConfigProvider, ObjectProvider, OverlayProvider,
        SourceMapsquare, TextureProvider, Underlay, UnderlayProvider,
    };
    use crate::section::{MapsquareSingleSection, WorldMapSection};
    use rsmap_raster::provider::{
        FontMetrics, FontMetricsProvider, GraphicsDefaultsProvider, SpriteProvider,
    };
    use rsmap_raster::sprite::SpriteSheet;

    /// In-memory cache for pipeline tests.
    #[derive(Default)]
    struct MemCache {
        by_id: RefCell<HashMap<(i32, i32, i32), Bytes>>,
        named: RefCell<HashMap<(i32, String, String), Bytes>>,
    }

    impl CacheProvider for MemCache {
        fn read(&self, archive: i32, group: i32, file: i32) -> Option<Bytes> {
            self.by_id.borrow().get(&(archive, group, file)).cloned()
        }
        fn read_named(&self, archive: i32, group: &str, file: &str) -> Option<Bytes> {
            self.named
                .borrow()
                .get(&(archive, group.to_string(), file.to_string()))
                .cloned()
        }
        fn exists(&self, archive: i32, group: i32, file: i32) -> bool {
            self.by_id.borrow().contains_key(&(archive, group, file))
        }
        fn exists_named(&self, archive: i32, group: &str, file: &str) -> bool {
            self.named
                .borrow()
                .contains_key(&(archive, group.to_string(), file.to_string()))
        }
        fn write(&self, archive: i32, group: i32, file: i32, data: &[u8]) {
            self.by_id
                .borrow_mut()
                .insert((archive, group, file), Bytes::copy_from_slice(data));
        }
        fn write_named(&self, archive: i32, group: &str, file: &str, data: &[u8]) {
            self.named.borrow_mut().insert(
                (archive, group.to_string(), file.to_string()),
                Bytes::copy_from_slice(data),
            );
        }
        fn write_named_with_id(&self, archive: i32, group: &str, file: &str, _file_id: i32, data: &[u8]) {
            self.write_named(archive, group, file, data);
        }
        fn list(&self, archive: i32) -> Vec<i32> {
            let mut groups: Vec<i32> = self
                .by_id
                .borrow()
                .keys()
                .filter(|(a, _, _)| *a == archive)
                .map(|(_, g, _)| *g)
                .collect();
            groups.sort_unstable();
            groups.dedup();
            groups
        }
        fn list_group(&self, archive: i32, group: i32) -> Vec<i32> {
            let mut files: Vec<i32> = self
                .by_id
                .borrow()
                .keys()
                .filter(|(a, g, _)| *a == archive && *g == group)
                .map(|(_, _, f)| *f)
                .collect();
            files.sort_unstable();
            files
        }
    }

    struct FlatLandscape;

    impl Landscape for FlatLandscape {
        fn underlay_id(&self, level: i32, _x: i32, _y: i32) -> i32 {
            if level == 0 {
                2
            } else {
                -1
            }
        }
        fn overlay_id(&self, _level: i32, _x: i32, _y: i32) -> i32 {
            -1
        }
        fn overlay_shape(&self, _level: i32, _x: i32, _y: i32) -> i32 {
            0
        }
        fn overlay_rotation(&self, _level: i32, _x: i32, _y: i32) -> i32 {
            0
        }
        fn flags(&self, _level: i32, _x: i32, _y: i32) -> i32 {
            0
        }
    }

    struct UniformMaps;

    impl MapProvider for UniformMaps {
        fn map(&self, _x: i32, _y: i32) -> Option<SourceMapsquare> {
            Some(SourceMapsquare {
                landscape: Box::new(FlatLandscape),
                objects: Vec::new(),
            })
        }
    }

    struct NoObjects;

    impl ObjectProvider for NoObjects {
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

    struct NoOverlays;

    impl OverlayProvider for NoOverlays {
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

    struct GreenUnderlays;

    impl UnderlayProvider for GreenUnderlays {
        fn underlay(&self, _id: i32) -> Option<Underlay> {
            Some(Underlay {
                hue: 21,
                hue_multiplier: 64,
                saturation: 150,
                lightness: 120,
            })
        }
    }

    struct NoTextures;

    impl TextureProvider for NoTextures {
        fn hsl(&self, _id: i32) -> i32 {
            -1
        }
    }

    struct NoSprites;

    impl SpriteProvider for NoSprites {
        fn sprite_sheet(&self, _id: i32) -> Option<SpriteSheet> {
            None
        }
    }

    struct NoFonts;

    impl FontMetricsProvider for NoFonts {
        fn font(&self, _id: i32) -> Option<FontMetrics> {
            None
        }
    }

    struct Defaults;

    impl GraphicsDefaultsProvider for Defaults {
        fn map_scenes_group(&self) -> i32 {
            -1
        }
        fn mod_icons_group(&self) -> i32 {
            -1
        }
    }

    struct NoElements;

    impl MapElementConfigProvider for NoElements {
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

    fn providers(cache: &MemCache) -> Providers<'_> {
        Providers {
            cache,
            textures: &NoTextures,
            sprites: &NoSprites,
            font_metrics: &NoFonts,
            objects: &NoObjects,
            maps: &UniformMaps,
            overlays: &NoOverlays,
            map_elements: &NoElements,
            graphics_defaults: &Defaults,
            underlays: &GreenUnderlays,
        }
    }

    fn details() -> WorldMapAreaDetails {
        WorldMapAreaDetails::construct(
            "worldmap.zanaris",
            "Zanaris",
            Coordinate::new(2450, 4470, 0),
            0,
            100,
            vec![WorldMapSection::MapsquareSingle(MapsquareSingleSection {
                level: 0,
                levels_count: 1,
                mapsquare_source_x: 38,
                mapsquare_source_y: 69,
                mapsquare_destination_x: 38,
                mapsquare_destination_y: 69,
            })],
        )
    }

    #[test]
    fn add_area_roundtrips_through_cache() {
        let cache = MemCache::default();
        let providers = providers(&cache);
        let elements = vec![WorldMapElement {
            element_id: 7,
            location: Coordinate::new(38 * 64 + 5, 69 * 64 + 9, 0),
            members: false,
        }];
        add_area(&providers, details(), elements.clone(), PackOptions::default()).unwrap();

        assert!(area_exists(&cache, "zanaris"));
        let decoded = WorldMapArea::decode(&cache, "worldmap.zanaris").unwrap();
        assert_eq!(decoded.internal_name, "zanaris");
        assert_eq!(decoded.data.mapsquares.len(), 1);
        assert_eq!(decoded.data.zones.len(), 0);
        assert_eq!(decoded.data.elements, elements);

        let block = &decoded.data.mapsquares[0];
        assert_eq!(block.data.group_id, 0);
        assert_eq!(block.data.file_id, 0);
        // Underlay id 2 stored 1-based everywhere.
        assert_eq!(block.geography.geography.underlay_id(10, 10), 2);

        // The ground image and composite texture were written.
        assert!(cache.exists(GROUND_ARCHIVE, 0, 0));
        assert!(cache.exists_named(DATA_ARCHIVE, COMPOSITE_TEXTURE_GROUP, "zanaris"));
        assert!(cache.exists_named(DATA_ARCHIVE, "zanaris", LABELS_FILE));
    }

    #[test]
    fn ground_images_are_readable_pngs() {
        let cache = MemCache::default();
        let providers = providers(&cache);
        add_area(&providers, details(), Vec::new(), PackOptions::default()).unwrap();
        let raw = cache.read(GROUND_ARCHIVE, 0, 0).unwrap();
        let decoded = image::load_from_memory(&raw).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (64, 64));
        // The uniform green underlay must produce a non-black interior.
        assert_ne!(decoded.get_pixel(32, 32).0, [0, 0, 0]);
    }

    #[test]
    fn rendered_image_from_cache_matches_fresh_render() {
        let cache = MemCache::default();
        let providers = providers(&cache);
        add_area(&providers, details(), Vec::new(), PackOptions::default()).unwrap();
        let from_cache =
            generate_map_image_from_cache(&providers, "worldmap.zanaris", 4, PackOptions::default())
                .unwrap();
        let fresh = generate_map_image(&providers, details(), Vec::new(), 4, PackOptions::default());
        assert_eq!(from_cache.dimensions(), fresh.dimensions());
        assert_eq!(from_cache.as_raw(), fresh.as_raw());
    }

    #[test]
    fn update_area_requires_existing_data() {
        let cache = MemCache::default();
        let providers = providers(&cache);
        let result = update_area(&providers, "worldmap.zanaris", |d| d, |e| e, PackOptions::default());
        assert!(matches!(result, Err(WorldMapError::MissingEntry { .. })));
    }

    #[test]
    fn update_area_replaces_elements() {
        let cache = MemCache::default();
        let providers = providers(&cache);
        add_area(&providers, details(), Vec::new(), PackOptions::default()).unwrap();
        update_area(
            &providers,
            "worldmap.zanaris",
            |details| details,
            |mut elements| {
                elements.push(WorldMapElement {
                    element_id: 99,
                    location: Coordinate::new(38 * 64, 69 * 64, 0),
                    members: true,
                });
                elements
            },
            PackOptions::default(),
        )
        .unwrap();
        let decoded = WorldMapArea::decode(&cache, "worldmap.zanaris").unwrap();
        assert_eq!(decoded.data.elements.len(), 1);
        assert_eq!(decoded.data.elements[0].element_id, 99);
    }
}
