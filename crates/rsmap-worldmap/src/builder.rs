//! Block builders: sample a source mapsquare's landscape and objects into
//! destination block geography.
//!
//! Level handling follows the game client's collapsing rules: content
//! flagged visible-below renders at level 0, and a bridge flag read at level
//! 1 shifts a tile's upper-level content one level down. The underlay and
//! overlay selection is a known approximation of the client renderer; a
//! handful of tiles differ, and that behaviour is kept for bit-compatibility
//! with existing packed outputs.

use std::ops::Range;

use crate::area::{MapsquareData, WorldMapMapsquare, WorldMapZone, ZoneData};
use crate::constants::{flags, MAPSQUARE_SIZE};
use crate::geography::{DecorationObject, Geography, MapsquareGeography, ZoneGeography};
use crate::providers::{Landscape, MapObject, MapProvider, ObjectProvider, SourceMapsquare};
use crate::section::{
    MapsquareMultiSection, MapsquareSingleSection, WorldMapSection, ZoneMultiSection,
    ZoneSingleSection,
};

/// Map-scene id that bans an object from the world map outright.
const MAPSCENE_MAP_EXCLUDED: i32 = 22;

/// The level a tile's content renders at, after collapsing.
fn view_level(landscape: &dyn Landscape, z: i32, x: i32, y: i32) -> i32 {
    if landscape.flags(z, x, y) & flags::VISIBLE_BELOW != 0 {
        return 0;
    }
    if z > 0 && landscape.flags(1, x, y) & flags::LINK_BELOW != 0 {
        z - 1
    } else {
        z
    }
}

/// Whether an object belongs on the map at the given base level.
fn accept(
    object: &MapObject,
    level: i32,
    objects: &dyn ObjectProvider,
    landscape: &dyn Landscape,
) -> bool {
    let map_scene = objects.map_scene_id(object.id);
    if map_scene == MAPSCENE_MAP_EXCLUDED {
        return false;
    }
    if object.shape == DecorationObject::GROUND_DECOR_SHAPE && objects.map_icon_id(object.id) != -1 {
        return true;
    }
    let bridge = landscape.flags(1, object.coordinate.x(), object.coordinate.y()) & flags::LINK_BELOW != 0;
    let object_level = if bridge {
        object.coordinate.level() - 1
    } else {
        object.coordinate.level()
    };
    if level != object_level {
        return false;
    }
    if matches!(
        object.shape,
        DecorationObject::WALL_STRAIGHT_SHAPE
            | DecorationObject::WALL_L_SHAPE
            | DecorationObject::WALL_SQUARE_CORNER_SHAPE
            | DecorationObject::WALL_DIAGONAL_SHAPE
    ) {
        return true;
    }
    map_scene != -1
        && matches!(
            object.shape,
            DecorationObject::CENTREPIECE_STRAIGHT_SHAPE
                | DecorationObject::CENTREPIECE_DIAGONAL_SHAPE
                | DecorationObject::GROUND_DECOR_SHAPE
        )
}

/// The highest level, scanning down from the top, at which content stops
/// being transparent to the layer below: either a decoration exists there or
/// the collapsed view level still sits above the base.
fn calculate_max_level(
    base_level: i32,
    levels_count: i32,
    x: i32,
    y: i32,
    landscape: &dyn Landscape,
    geography: &Geography,
) -> i32 {
    let mut max_level = base_level;
    let mut z = levels_count - 1;
    while z >= base_level {
        if !geography.decorations_at(z, x, y).is_empty() {
            max_level = z;
            break;
        }
        if view_level(landscape, z, x, y) <= base_level {
            max_level = z;
            break;
        }
        z -= 1;
    }
    max_level
}

/// Sample one source mapsquare into geography arrays.
///
/// `x_range`/`y_range` select source tiles; the offsets shift writes so the
/// filled window lands on the destination zone position.
#[allow(clippy::too_many_arguments)]
fn compute_geography(
    map: &SourceMapsquare,
    base_level: i32,
    levels_count: i32,
    objects: &dyn ObjectProvider,
    x_range: Range<i32>,
    y_range: Range<i32>,
    x_offset: i32,
    y_offset: i32,
) -> Geography {
    let mut geography = Geography::new(levels_count);
    let levels = geography.levels_count() as i32;
    let landscape = map.landscape.as_ref();

    for object in &map.objects {
        let local_x = object.coordinate.x() & 0x3F;
        let local_y = object.coordinate.y() & 0x3F;
        if !x_range.contains(&local_x) || !y_range.contains(&local_y) {
            continue;
        }
        if accept(object, base_level, objects, landscape) {
            let destination_level = object.coordinate.level() - base_level;
            if destination_level < 0 || destination_level >= levels {
                continue;
            }
            geography.decorations.push(
                destination_level as usize,
                (local_x + x_offset) as usize,
                (local_y + y_offset) as usize,
                DecorationObject {
                    object_id: object.id,
                    shape: object.shape,
                    rotation: object.rotation,
                },
            );
        }
    }

    for x in x_range.clone() {
        for y in y_range.clone() {
            let max_level = calculate_max_level(base_level, levels_count, x, y, landscape, &geography)
                .min(base_level + levels - 1);
            // Not entirely perfect: a handful of tiles on the main surface
            // resolve a different underlay than the client renders.
            let has_bridge = landscape.flags(1, x, y) & flags::LINK_BELOW != 0;
            let above_underlay = if has_bridge { landscape.underlay_id(1, x, y) } else { -1 };
            let final_underlay = if above_underlay != -1 {
                above_underlay
            } else {
                landscape.underlay_id(base_level, x, y)
            };
            geography.underlays.set(
                0,
                (x + x_offset) as usize,
                (y + y_offset) as usize,
                (final_underlay + 1) as i16,
            );
            // Overlay copying is flattened onto the base level; level
            // differences mostly wash out on the final map.
            for z in base_level..=max_level {
                let level_index = (z - base_level) as usize;
                let dest_x = (x + x_offset) as usize;
                let dest_y = (y + y_offset) as usize;
                geography.overlays.set(
                    level_index,
                    dest_x,
                    dest_y,
                    ((landscape.overlay_id(z, x, y) + 1) & 0xFF) as i16,
                );
                geography
                    .shapes
                    .set(level_index, dest_x, dest_y, landscape.overlay_shape(z, x, y) as i8);
                geography
                    .rotations
                    .set(level_index, dest_x, dest_y, landscape.overlay_rotation(z, x, y) as i8);
            }
        }
    }
    geography
}

/// Build one destination mapsquare block, or `None` when the source
/// mapsquare has no map data at all.
#[allow(clippy::too_many_arguments)]
pub fn generate_mapsquare(
    maps: &dyn MapProvider,
    objects: &dyn ObjectProvider,
    level: i32,
    levels_count: i32,
    mapsquare_source_x: i32,
    mapsquare_source_y: i32,
    mapsquare_destination_x: i32,
    mapsquare_destination_y: i32,
) -> Option<WorldMapMapsquare> {
    let map = maps.map(mapsquare_source_x, mapsquare_source_y)?;
    let data = MapsquareData {
        level,
        levels_count,
        mapsquare_source_x,
        mapsquare_source_y,
        mapsquare_destination_x,
        mapsquare_destination_y,
        group_id: -1,
        file_id: -1,
    };
    let geography = compute_geography(
        &map,
        level,
        levels_count,
        objects,
        0..MAPSQUARE_SIZE as i32,
        0..MAPSQUARE_SIZE as i32,
        0,
        0,
    );
    Some(WorldMapMapsquare {
        data,
        geography: MapsquareGeography {
            mapsquare_destination_x,
            mapsquare_destination_y,
            geography,
        },
    })
}

pub fn build_mapsquare_single(
    section: &MapsquareSingleSection,
    maps: &dyn MapProvider,
    objects: &dyn ObjectProvider,
) -> Vec<WorldMapMapsquare> {
    generate_mapsquare(
        maps,
        objects,
        section.level,
        section.levels_count,
        section.mapsquare_source_x,
        section.mapsquare_source_y,
        section.mapsquare_destination_x,
        section.mapsquare_destination_y,
    )
    .into_iter()
    .collect()
}

pub fn build_mapsquare_multi(
    section: &MapsquareMultiSection,
    maps: &dyn MapProvider,
    objects: &dyn ObjectProvider,
) -> Vec<WorldMapMapsquare> {
    let mut blocks = Vec::new();
    for x in section.mapsquare_source_min_x..=section.mapsquare_source_max_x {
        for y in section.mapsquare_source_min_y..=section.mapsquare_source_max_y {
            let block = generate_mapsquare(
                maps,
                objects,
                section.level,
                section.levels_count,
                x,
                y,
                section.mapsquare_destination_min_x + (x - section.mapsquare_source_min_x),
                section.mapsquare_destination_min_y + (y - section.mapsquare_source_min_y),
            );
            blocks.extend(block);
        }
    }
    blocks
}

pub fn build_zone_single(
    section: &ZoneSingleSection,
    maps: &dyn MapProvider,
    objects: &dyn ObjectProvider,
) -> Vec<WorldMapZone> {
    let Some(map) = maps.map(section.mapsquare_source_x, section.mapsquare_source_y) else {
        return Vec::new();
    };
    let data = ZoneData {
        level: section.level,
        levels_count: section.levels_count,
        mapsquare_source_x: section.mapsquare_source_x,
        mapsquare_source_y: section.mapsquare_source_y,
        zone_source_x: section.zone_source_x,
        zone_source_y: section.zone_source_y,
        mapsquare_destination_x: section.mapsquare_destination_x,
        mapsquare_destination_y: section.mapsquare_destination_y,
        zone_destination_x: section.zone_destination_x,
        zone_destination_y: section.zone_destination_y,
        group_id: -1,
        file_id: -1,
    };
    let min_x = section.zone_source_x << 3;
    let min_y = section.zone_source_y << 3;
    let geography = compute_geography(
        &map,
        section.level,
        section.levels_count,
        objects,
        min_x..min_x + 8,
        min_y..min_y + 8,
        (section.zone_destination_x << 3) - min_x,
        (section.zone_destination_y << 3) - min_y,
    );
    vec![WorldMapZone {
        data,
        geography: ZoneGeography {
            mapsquare_destination_x: section.mapsquare_destination_x,
            mapsquare_destination_y: section.mapsquare_destination_y,
            zone_destination_x: section.zone_destination_x,
            zone_destination_y: section.zone_destination_y,
            geography,
        },
    }]
}

pub fn build_zone_multi(
    section: &ZoneMultiSection,
    maps: &dyn MapProvider,
    objects: &dyn ObjectProvider,
) -> Vec<WorldMapZone> {
    let Some(map) = maps.map(section.mapsquare_source_x, section.mapsquare_source_y) else {
        return Vec::new();
    };
    let min_x = section.zone_source_min_x << 3;
    let min_y = section.zone_source_min_y << 3;
    let max_x = (section.zone_source_max_x + 1) << 3;
    let max_y = (section.zone_source_max_y + 1) << 3;
    // One shared sampling pass over the whole zone rectangle; every zone
    // block carries the same arrays, and each encodes only its own window.
    let geography = compute_geography(
        &map,
        section.level,
        section.levels_count,
        objects,
        min_x..max_x,
        min_y..max_y,
        (section.zone_destination_min_x << 3) - min_x,
        (section.zone_destination_min_y << 3) - min_y,
    );
    let mut zones = Vec::new();
    for zone_source_x in section.zone_source_min_x..=section.zone_source_max_x {
        for zone_source_y in section.zone_source_min_y..=section.zone_source_max_y {
            let zone_destination_x =
                section.zone_destination_min_x + (zone_source_x - section.zone_source_min_x);
            let zone_destination_y =
                section.zone_destination_min_y + (zone_source_y - section.zone_source_min_y);
            let data = ZoneData {
                level: section.level,
                levels_count: section.levels_count,
                mapsquare_source_x: section.mapsquare_source_x,
                mapsquare_source_y: section.mapsquare_source_y,
                zone_source_x,
                zone_source_y,
                mapsquare_destination_x: section.mapsquare_destination_x,
                mapsquare_destination_y: section.mapsquare_destination_y,
                zone_destination_x,
                zone_destination_y,
                group_id: -1,
                file_id: -1,
            };
            zones.push(WorldMapZone {
                data,
                geography: ZoneGeography {
                    mapsquare_destination_x: section.mapsquare_destination_x,
                    mapsquare_destination_y: section.mapsquare_destination_y,
                    zone_destination_x,
                    zone_destination_y,
                    geography: geography.clone(),
                },
            });
        }
    }
    zones
}

/// Build the blocks of one section, appending to the area's block lists.
pub fn build_section(
    section: &WorldMapSection,
    maps: &dyn MapProvider,
    objects: &dyn ObjectProvider,
    mapsquares: &mut Vec<WorldMapMapsquare>,
    zones: &mut Vec<WorldMapZone>,
) {
    match section {
        WorldMapSection::MapsquareSingle(s) => mapsquares.extend(build_mapsquare_single(s, maps, objects)),
        WorldMapSection::MapsquareMulti(s) => mapsquares.extend(build_mapsquare_multi(s, maps, objects)),
        WorldMapSection::ZoneSingle(s) => zones.extend(build_zone_single(s, maps, objects)),
        WorldMapSection::ZoneMulti(s) => zones.extend(build_zone_multi(s, maps, objects)),
    }
}
