//! Ground compositor: accumulates underlay colour contributions into a
//! smoothed per-mapsquare raster.
//!
//! Every tile with an underlay adds its hue/saturation/lightness into a
//! square brush neighbourhood; a pixel's final colour is the average of the
//! samples that reached it. Two border strategies: either each mapsquare is
//! smoothed in isolation and neighbour strips are mixed in afterwards, or
//! the brush writes straight across mapsquare seams into the neighbours'
//! buffers.

use std::collections::BTreeMap;

use image::RgbImage;

use crate::area::{WorldMapAreaData, WorldMapMapsquare, WorldMapZone};
use crate::constants::{GROUND_ARCHIVE, MAPSQUARE_SIZE, ZONE_SIZE};
use crate::coordinate::MapsquareId;
use crate::geography::DecorationObject;
use crate::providers::{CacheProvider, Underlay, UnderlayProvider};

const MAX_PIXEL_VALUE: i32 = 256;
const BRUSH_SIZE: i32 = 5;
const BORDER_SIZE: usize = 5;

/// Accumulation buffers for one mapsquare's ground colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsquareGround {
    width: usize,
    height: usize,
    hue: Vec<i32>,
    saturation: Vec<i32>,
    lightness: Vec<i32>,
    count: Vec<i32>,
}

impl MapsquareGround {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            hue: vec![0; width * height],
            saturation: vec![0; width * height],
            lightness: vec![0; width * height],
            count: vec![0; width * height],
        }
    }

    fn add(&mut self, x: usize, y: usize, underlay: Underlay) {
        let index = x * self.height + y;
        self.hue[index] += underlay.hue * MAX_PIXEL_VALUE / underlay.hue_multiplier;
        self.saturation[index] += underlay.saturation;
        self.lightness[index] += underlay.lightness;
        self.count[index] += 1;
    }

    /// Add a brush contribution clamped to this buffer.
    pub fn smoothen_area(&mut self, x: i32, y: i32, radius: i32, underlay: Option<Underlay>) {
        let Some(underlay) = underlay else { return };
        if x + radius < 0 || y + radius < 0 {
            return;
        }
        if x - radius > self.width as i32 || y - radius > self.height as i32 {
            return;
        }
        let min_x = (x - radius).max(0);
        let max_x = (x + radius).min(self.width as i32);
        let min_y = (y - radius).max(0);
        let max_y = (y + radius).min(self.height as i32);
        for px in min_x..max_x {
            for py in min_y..max_y {
                self.add(px as usize, py as usize, underlay);
            }
        }
    }

    /// Average colour at a pixel; pure black when no samples landed there.
    pub fn average_rgb(&self, x: i32, y: i32) -> i32 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        let index = x as usize * self.height + y as usize;
        if self.lightness[index] == 0 {
            return 0;
        }
        let hue = self.hue[index] / self.count[index];
        let saturation = self.saturation[index] / self.count[index];
        let lightness = self.lightness[index] / self.count[index];
        hsl_to_rgb(
            hue as f64 / MAX_PIXEL_VALUE as f64,
            saturation as f64 / MAX_PIXEL_VALUE as f64,
            lightness as f64 / MAX_PIXEL_VALUE as f64,
        )
    }

    /// The ground image, pixel (x, y) holding tile (x, y)'s colour.
    pub fn to_image(&self) -> RgbImage {
        let mut image = RgbImage::new(self.width as u32, self.height as u32);
        for x in 0..self.width {
            for y in 0..self.height {
                let rgb = self.average_rgb(x as i32, y as i32);
                image.put_pixel(
                    x as u32,
                    y as u32,
                    image::Rgb([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8]),
                );
            }
        }
        image
    }
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> i32 {
    let mut red = lightness;
    let mut green = lightness;
    let mut blue = lightness;
    if saturation != 0.0 {
        let a = if lightness < 0.5 {
            lightness * (1.0 + saturation)
        } else {
            saturation + lightness - lightness * saturation
        };
        let b = lightness * 2.0 - a;
        let third = 1.0 / 3.0;
        let mut up = hue + third;
        if up > 1.0 {
            up -= 1.0;
        }
        let mut down = hue - third;
        if down < 0.0 {
            down += 1.0;
        }
        let channel = |t: f64| {
            if t * 6.0 < 1.0 {
                b + 6.0 * (a - b) * t
            } else if 2.0 * t < 1.0 {
                a
            } else if t * 3.0 < 2.0 {
                b + (2.0 / 3.0 - t) * (a - b) * 6.0
            } else {
                b
            }
        };
        red = channel(up);
        green = channel(hue);
        blue = channel(down);
    }
    let red = (red * MAX_PIXEL_VALUE as f64) as i32;
    let green = (green * MAX_PIXEL_VALUE as f64) as i32;
    let blue = (blue * MAX_PIXEL_VALUE as f64) as i32;
    blue + (green << 8) + (red << 16)
}

/// The eight neighbour directions, indexed into the neighbour array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighbourPosition {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl NeighbourPosition {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Border-mix order when borders are blended separately.
const BORDER_ORDER: [NeighbourPosition; 8] = [
    NeighbourPosition::NorthEast,
    NeighbourPosition::SouthEast,
    NeighbourPosition::East,
    NeighbourPosition::North,
    NeighbourPosition::West,
    NeighbourPosition::SouthWest,
    NeighbourPosition::NorthWest,
    NeighbourPosition::South,
];

/// A destination mapsquare slot's tile data: either a full mapsquare block
/// or a view over the zone blocks landing in that mapsquare.
pub enum GroundArea<'a> {
    Mapsquare {
        destination_x: i32,
        destination_y: i32,
        block: &'a WorldMapMapsquare,
    },
    Zones {
        destination_x: i32,
        destination_y: i32,
        zones: Vec<&'a WorldMapZone>,
    },
}

fn zone_contains(zone: &WorldMapZone, x: i32, y: i32) -> bool {
    let min_x = zone.geography.zone_destination_x << 3;
    let min_y = zone.geography.zone_destination_y << 3;
    x >= min_x && y >= min_y && x < min_x + ZONE_SIZE as i32 && y < min_y + ZONE_SIZE as i32
}

impl<'a> GroundArea<'a> {
    pub fn destination_x(&self) -> i32 {
        match self {
            GroundArea::Mapsquare { destination_x, .. } | GroundArea::Zones { destination_x, .. } => {
                *destination_x
            }
        }
    }

    pub fn destination_y(&self) -> i32 {
        match self {
            GroundArea::Mapsquare { destination_y, .. } | GroundArea::Zones { destination_y, .. } => {
                *destination_y
            }
        }
    }

    pub fn mapsquare_id(&self) -> MapsquareId {
        MapsquareId::new(self.destination_x(), self.destination_y())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            GroundArea::Mapsquare { .. } => false,
            GroundArea::Zones { zones, .. } => zones.is_empty(),
        }
    }

    pub fn levels(&self) -> usize {
        match self {
            GroundArea::Mapsquare { block, .. } => block.geography.geography.levels_count(),
            GroundArea::Zones { zones, .. } => zones
                .first()
                .map(|zone| zone.geography.geography.levels_count())
                .unwrap_or(1),
        }
    }

    pub fn underlay_id(&self, x: i32, y: i32) -> i32 {
        match self {
            GroundArea::Mapsquare { block, .. } => block.geography.geography.underlay_id(x, y),
            GroundArea::Zones { zones, .. } => zones
                .iter()
                .find(|zone| zone_contains(zone, x, y))
                .map(|zone| zone.geography.geography.underlay_id(x, y))
                .unwrap_or(-1),
        }
    }

    pub fn overlay_id(&self, z: i32, x: i32, y: i32) -> i32 {
        match self {
            GroundArea::Mapsquare { block, .. } => block.geography.geography.overlay_id(z, x, y),
            GroundArea::Zones { zones, .. } => zones
                .iter()
                .find(|zone| zone_contains(zone, x, y))
                .map(|zone| zone.geography.geography.overlay_id(z, x, y))
                .unwrap_or(-1),
        }
    }

    /// Shape at a tile; a zone-based slot answers -1 outside its zones.
    pub fn shape(&self, z: i32, x: i32, y: i32) -> i32 {
        match self {
            GroundArea::Mapsquare { block, .. } => block.geography.geography.overlay_shape(z, x, y),
            GroundArea::Zones { zones, .. } => zones
                .iter()
                .find(|zone| zone_contains(zone, x, y))
                .map(|zone| zone.geography.geography.overlay_shape(z, x, y))
                .unwrap_or(-1),
        }
    }

    /// Rotation at a tile; a zone-based slot answers -1 outside its zones.
    pub fn rotation(&self, z: i32, x: i32, y: i32) -> i32 {
        match self {
            GroundArea::Mapsquare { block, .. } => block.geography.geography.overlay_rotation(z, x, y),
            GroundArea::Zones { zones, .. } => zones
                .iter()
                .find(|zone| zone_contains(zone, x, y))
                .map(|zone| zone.geography.geography.overlay_rotation(z, x, y))
                .unwrap_or(-1),
        }
    }

    pub fn decorations(&self, z: i32, x: i32, y: i32) -> &[DecorationObject] {
        match self {
            GroundArea::Mapsquare { block, .. } => block.geography.geography.decorations_at(z, x, y),
            GroundArea::Zones { zones, .. } => zones
                .iter()
                .find(|zone| zone_contains(zone, x, y))
                .map(|zone| zone.geography.geography.decorations_at(z, x, y))
                .unwrap_or(&[]),
        }
    }
}

/// The area's destination mapsquare slots, row-major over the bounding
/// rectangle. Every slot is filled; slots with no blocks hold an empty
/// zone view.
pub struct GroundAreas<'a> {
    pub min_x: i32,
    pub min_y: i32,
    pub width: usize,
    pub height: usize,
    pub cells: Vec<GroundArea<'a>>,
}

impl<'a> GroundAreas<'a> {
    pub fn build(data: &'a WorldMapAreaData) -> Self {
        let boundaries = data.boundaries();
        let width = boundaries.width() as usize;
        let height = boundaries.height() as usize;
        let mut cells: Vec<Option<GroundArea<'a>>> = Vec::new();
        cells.resize_with(width * height, || None);
        for mapsquare in &data.mapsquares {
            let x = (mapsquare.data.mapsquare_destination_x - boundaries.min_x) as usize;
            let y = (mapsquare.data.mapsquare_destination_y - boundaries.min_y) as usize;
            cells[x * height + y] = Some(GroundArea::Mapsquare {
                destination_x: mapsquare.data.mapsquare_destination_x,
                destination_y: mapsquare.data.mapsquare_destination_y,
                block: mapsquare,
            });
        }
        for x in 0..width {
            for y in 0..height {
                if cells[x * height + y].is_some() {
                    continue;
                }
                let destination_x = boundaries.min_x + x as i32;
                let destination_y = boundaries.min_y + y as i32;
                let zones = data
                    .zones
                    .iter()
                    .filter(|zone| {
                        zone.geography.mapsquare_destination_x == destination_x
                            && zone.geography.mapsquare_destination_y == destination_y
                    })
                    .collect();
                cells[x * height + y] = Some(GroundArea::Zones {
                    destination_x,
                    destination_y,
                    zones,
                });
            }
        }
        Self {
            min_x: boundaries.min_x,
            min_y: boundaries.min_y,
            width,
            height,
            cells: cells.into_iter().flatten().collect(),
        }
    }

    pub fn get(&self, x: usize, y: usize) -> &GroundArea<'a> {
        &self.cells[x * self.height + y]
    }

    /// Slot indices of the eight neighbours, `None` past the grid edge.
    fn neighbour_slots(&self, x: usize, y: usize) -> [Option<usize>; 8] {
        let is_west = x == 0;
        let is_east = x >= self.width - 1;
        let is_south = y == 0;
        let is_north = y >= self.height - 1;
        let slot = |dx: i32, dy: i32| {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            Some(nx as usize * self.height + ny as usize)
        };
        let mut neighbours = [None; 8];
        neighbours[NeighbourPosition::North.index()] = if is_north { None } else { slot(0, 1) };
        neighbours[NeighbourPosition::NorthEast.index()] =
            if !is_north && !is_east { slot(1, 1) } else { None };
        neighbours[NeighbourPosition::NorthWest.index()] =
            if !is_north && !is_west { slot(-1, 1) } else { None };
        neighbours[NeighbourPosition::East.index()] = if is_east { None } else { slot(1, 0) };
        neighbours[NeighbourPosition::West.index()] = if is_west { None } else { slot(-1, 0) };
        neighbours[NeighbourPosition::South.index()] = if is_south { None } else { slot(0, -1) };
        neighbours[NeighbourPosition::SouthEast.index()] =
            if !is_south && !is_east { slot(1, -1) } else { None };
        neighbours[NeighbourPosition::SouthWest.index()] =
            if !is_south && !is_west { slot(-1, -1) } else { None };
        neighbours
    }
}

/// Classify a brush pixel relative to the 64x64 mapsquare, `None` meaning it
/// stays inside.
fn classify(x: i32, y: i32) -> Option<NeighbourPosition> {
    let size = MAPSQUARE_SIZE as i32;
    match (x < 0, x >= size, y < 0, y >= size) {
        (true, _, true, _) => Some(NeighbourPosition::SouthWest),
        (true, _, _, true) => Some(NeighbourPosition::NorthWest),
        (_, true, true, _) => Some(NeighbourPosition::SouthEast),
        (_, true, _, true) => Some(NeighbourPosition::NorthEast),
        (true, _, _, _) => Some(NeighbourPosition::West),
        (_, true, _, _) => Some(NeighbourPosition::East),
        (_, _, true, _) => Some(NeighbourPosition::South),
        (_, _, _, true) => Some(NeighbourPosition::North),
        _ => None,
    }
}

/// Neighbour-aware brush: contributions past the mapsquare edge land in the
/// owning neighbour's buffer, or are dropped at the area edge.
fn smoothen_with_neighbours(
    grounds: &mut [MapsquareGround],
    own_slot: usize,
    neighbours: &[Option<usize>; 8],
    x: i32,
    y: i32,
    radius: i32,
    underlay: Option<Underlay>,
) {
    let Some(underlay) = underlay else { return };
    for px in x - radius..x + radius {
        for py in y - radius..y + radius {
            match classify(px, py) {
                None => grounds[own_slot].add(px as usize, py as usize, underlay),
                Some(position) => {
                    if let Some(slot) = neighbours[position.index()] {
                        grounds[slot].add((px & 0x3F) as usize, (py & 0x3F) as usize, underlay);
                    }
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn paint_block_tiles(
    grounds: &mut [MapsquareGround],
    own_slot: usize,
    neighbours: &[Option<usize>; 8],
    area: &GroundArea<'_>,
    min_x: i32,
    min_y: i32,
    width: i32,
    height: i32,
    borders_separate: bool,
    underlays: &dyn UnderlayProvider,
) {
    for x in min_x..min_x + width {
        for y in min_y..min_y + height {
            let underlay_id = area.underlay_id(x, y);
            if underlay_id == -1 {
                continue;
            }
            let underlay = underlays.underlay(underlay_id);
            if borders_separate {
                grounds[own_slot].smoothen_area(x, y, BRUSH_SIZE, underlay);
            } else {
                smoothen_with_neighbours(grounds, own_slot, neighbours, x, y, BRUSH_SIZE, underlay);
            }
        }
    }
}

/// Mix the 5-pixel border strips of the eight neighbouring areas into one
/// slot's buffer. Reads neighbour tile data, brushes into the own buffer.
fn paint_with_surrounding(
    ground: &mut MapsquareGround,
    areas: &GroundAreas<'_>,
    neighbours: &[Option<usize>; 8],
    underlays: &dyn UnderlayProvider,
) {
    let size = MAPSQUARE_SIZE;
    let edge = size - BORDER_SIZE;
    for position in BORDER_ORDER {
        let Some(slot) = neighbours[position.index()] else {
            continue;
        };
        let source = &areas.cells[slot];
        let (src_x, src_y, dst_x, dst_y, width, height) = match position {
            NeighbourPosition::SouthWest => (edge, edge, 0, 0, BORDER_SIZE, BORDER_SIZE),
            NeighbourPosition::NorthEast => (0, 0, edge, edge, BORDER_SIZE, BORDER_SIZE),
            NeighbourPosition::NorthWest => (edge, 0, 0, edge, BORDER_SIZE, BORDER_SIZE),
            NeighbourPosition::SouthEast => (0, edge, edge, 0, BORDER_SIZE, BORDER_SIZE),
            NeighbourPosition::South => (0, edge, 0, 0, size, BORDER_SIZE),
            NeighbourPosition::North => (0, 0, 0, edge, size, BORDER_SIZE),
            NeighbourPosition::West => (edge, 0, 0, 0, BORDER_SIZE, size),
            NeighbourPosition::East => (0, 0, edge, 0, BORDER_SIZE, size),
        };
        for x in 0..width {
            for y in 0..height {
                let underlay_id = source.underlay_id((x + src_x) as i32, (y + src_y) as i32);
                if underlay_id == -1 {
                    continue;
                }
                let underlay = underlays.underlay(underlay_id);
                ground.smoothen_area((dst_x + x) as i32, (dst_y + y) as i32, BRUSH_SIZE, underlay);
            }
        }
    }
}

/// Paint every slot and return the ground images of the non-empty ones.
pub fn build_underlay_images(
    areas: &GroundAreas<'_>,
    borders_separate: bool,
    underlays: &dyn UnderlayProvider,
) -> BTreeMap<MapsquareId, RgbImage> {
    let mut grounds: Vec<MapsquareGround> = Vec::with_capacity(areas.cells.len());
    grounds.resize_with(areas.cells.len(), || {
        MapsquareGround::new(MAPSQUARE_SIZE, MAPSQUARE_SIZE)
    });
    for x in 0..areas.width {
        for y in 0..areas.height {
            let slot = x * areas.height + y;
            let area = &areas.cells[slot];
            if area.is_empty() {
                continue;
            }
            let neighbours = areas.neighbour_slots(x, y);
            match area {
                GroundArea::Mapsquare { .. } => {
                    paint_block_tiles(
                        &mut grounds,
                        slot,
                        &neighbours,
                        area,
                        0,
                        0,
                        MAPSQUARE_SIZE as i32,
                        MAPSQUARE_SIZE as i32,
                        borders_separate,
                        underlays,
                    );
                }
                GroundArea::Zones { zones, .. } => {
                    for zone in zones {
                        paint_block_tiles(
                            &mut grounds,
                            slot,
                            &neighbours,
                            area,
                            zone.geography.zone_destination_x << 3,
                            zone.geography.zone_destination_y << 3,
                            ZONE_SIZE as i32,
                            ZONE_SIZE as i32,
                            borders_separate,
                            underlays,
                        );
                    }
                }
            }
            if borders_separate {
                paint_with_surrounding(&mut grounds[slot], areas, &neighbours, underlays);
            }
        }
    }
    let mut images = BTreeMap::new();
    for (slot, area) in areas.cells.iter().enumerate() {
        if area.is_empty() {
            continue;
        }
        images.insert(area.mapsquare_id(), grounds[slot].to_image());
    }
    images
}

/// Read previously written ground images back from the cache instead of
/// recomputing them. Slots whose image is missing are simply absent.
pub fn parse_underlay_images(
    cache: &dyn CacheProvider,
    areas: &GroundAreas<'_>,
    data: &WorldMapAreaData,
) -> BTreeMap<MapsquareId, RgbImage> {
    let mut images = BTreeMap::new();
    for mapsquare in &data.mapsquares {
        let id = MapsquareId::new(
            mapsquare.data.mapsquare_destination_x,
            mapsquare.data.mapsquare_destination_y,
        );
        if !cache.exists(GROUND_ARCHIVE, mapsquare.data.group_id, mapsquare.data.file_id) {
            continue;
        }
        let Some(raw) = cache.read(GROUND_ARCHIVE, mapsquare.data.group_id, mapsquare.data.file_id)
        else {
            continue;
        };
        if let Ok(decoded) = image::load_from_memory(&raw) {
            images.insert(id, decoded.to_rgb8());
        }
    }
    for area in &areas.cells {
        let GroundArea::Zones { zones, .. } = area else {
            continue;
        };
        let Some(zone) = zones.first() else { continue };
        let id = area.mapsquare_id();
        if images.contains_key(&id) {
            continue;
        }
        if !cache.exists(GROUND_ARCHIVE, zone.data.group_id, 0) {
            continue;
        }
        let Some(raw) = cache.read(GROUND_ARCHIVE, zone.data.group_id, 0) else {
            continue;
        };
        if let Ok(decoded) = image::load_from_memory(&raw) {
            images.insert(id, decoded.to_rgb8());
        }
    }
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::MapsquareData;
    use crate::geography::{Geography, MapsquareGeography};

    struct TestUnderlays;

    impl UnderlayProvider for TestUnderlays {
        fn underlay(&self, id: i32) -> Option<Underlay> {
            match id {
                0 => Some(Underlay {
                    hue: 22,
                    hue_multiplier: 60,
                    saturation: 120,
                    lightness: 100,
                }),
                1 => Some(Underlay {
                    hue: 48,
                    hue_multiplier: 130,
                    saturation: 60,
                    lightness: 220,
                }),
                _ => None,
            }
        }
    }

    fn uniform_block(dest_x: i32, dest_y: i32, underlay_id: i16) -> WorldMapMapsquare {
        let mut geography = Geography::new(1);
        for x in 0..MAPSQUARE_SIZE {
            for y in 0..MAPSQUARE_SIZE {
                geography.underlays.set(0, x, y, underlay_id);
            }
        }
        WorldMapMapsquare {
            data: MapsquareData {
                level: 0,
                levels_count: 1,
                mapsquare_source_x: dest_x,
                mapsquare_source_y: dest_y,
                mapsquare_destination_x: dest_x,
                mapsquare_destination_y: dest_y,
                group_id: -1,
                file_id: -1,
            },
            geography: MapsquareGeography {
                mapsquare_destination_x: dest_x,
                mapsquare_destination_y: dest_y,
                geography,
            },
        }
    }

    fn two_block_area() -> WorldMapAreaData {
        WorldMapAreaData {
            mapsquares: vec![uniform_block(10, 10, 1), uniform_block(11, 10, 2)],
            zones: Vec::new(),
            elements: Vec::new(),
        }
    }

    #[test]
    fn average_is_black_without_samples() {
        let ground = MapsquareGround::new(4, 4);
        assert_eq!(ground.average_rgb(1, 1), 0);
        assert_eq!(ground.average_rgb(-1, 0), 0);
        assert_eq!(ground.average_rgb(4, 0), 0);
    }

    #[test]
    fn brush_accumulates_neighbourhood() {
        let mut ground = MapsquareGround::new(16, 16);
        let underlay = TestUnderlays.underlay(0);
        ground.smoothen_area(8, 8, 5, underlay);
        // Brush square is [x-5, x+5), clamped.
        assert_ne!(ground.average_rgb(3, 3), 0);
        assert_ne!(ground.average_rgb(12, 12), 0);
        assert_eq!(ground.average_rgb(13, 13), 0);
        assert_eq!(ground.average_rgb(2, 8), 0);
    }

    #[test]
    fn neighbour_aware_blending_is_deterministic() {
        let data = two_block_area();
        let areas = GroundAreas::build(&data);
        let first = build_underlay_images(&areas, false, &TestUnderlays);
        let second = build_underlay_images(&areas, false, &TestUnderlays);
        assert_eq!(first.len(), 2);
        for (id, image) in &first {
            assert_eq!(image.as_raw(), second[id].as_raw());
        }
    }

    #[test]
    fn seamless_mode_spills_into_neighbours() {
        let data = two_block_area();
        let areas = GroundAreas::build(&data);
        let images = build_underlay_images(&areas, false, &TestUnderlays);
        let left = &images[&MapsquareId::new(10, 10)];
        // The left block's east border carries contributions from the
        // right block's different underlay, so it differs from the west
        // border.
        let east = left.get_pixel(63, 32);
        let west = left.get_pixel(0, 32);
        assert_ne!(east, west);
    }

    #[test]
    fn separate_borders_mix_neighbour_strip() {
        let data = two_block_area();
        let areas = GroundAreas::build(&data);
        let blended = build_underlay_images(&areas, true, &TestUnderlays);
        let left = &blended[&MapsquareId::new(10, 10)];
        // With border mixing, the east strip picks up the neighbour's
        // colour; the interior does not.
        assert_ne!(left.get_pixel(63, 32), left.get_pixel(30, 32));
    }

    #[test]
    fn empty_slots_produce_no_image() {
        // Two blocks with a gap between them leave the middle slot empty.
        let data = WorldMapAreaData {
            mapsquares: vec![uniform_block(10, 10, 1), uniform_block(12, 10, 1)],
            zones: Vec::new(),
            elements: Vec::new(),
        };
        let areas = GroundAreas::build(&data);
        assert_eq!(areas.width, 3);
        let images = build_underlay_images(&areas, false, &TestUnderlays);
        assert_eq!(images.len(), 2);
        assert!(!images.contains_key(&MapsquareId::new(11, 10)));
    }
}
