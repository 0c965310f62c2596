//! Per-block geography: tile arrays and their binary codec.
//!
//! A block stores underlay ids (level 0 only), overlay ids, overlay shapes
//! and rotations per level, and decoration lists per level. Ids are stored
//! 1-based so 0 means "none"; accessors return the -1 sentinel convention.
//!
//! The per-tile wire format picks the cheapest layout: a single 0 byte for a
//! fully empty tile, a short "simple" record when the tile holds nothing but
//! an underlay and at most one unshaped level-0 overlay, and a full record
//! otherwise.

use bytes::{Buf, BufMut};

use rsmap_buffer::codec::{get_smart_or_minus_one, put_smart_sentinel, take_u16, take_u8};

use crate::area::AreaType;
use crate::constants::{MAPSQUARE_SIZE, MAX_LEVELS, ZONE_SIZE};
use crate::error::WorldMapError;

const SIMPLE_TILE: u8 = 0x1;
const HAS_OVERLAY: u8 = 0x2;
const HAS_DECORATIONS: u8 = 0x4;

/// An object rendered on the world map as a simplified glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationObject {
    pub object_id: i32,
    pub shape: i32,
    pub rotation: i32,
}

impl DecorationObject {
    pub const WALL_STRAIGHT_SHAPE: i32 = 0;
    pub const WALL_L_SHAPE: i32 = 2;
    pub const WALL_SQUARE_CORNER_SHAPE: i32 = 3;
    pub const WALL_DIAGONAL_SHAPE: i32 = 9;
    pub const CENTREPIECE_STRAIGHT_SHAPE: i32 = 10;
    pub const CENTREPIECE_DIAGONAL_SHAPE: i32 = 11;
    pub const GROUND_DECOR_SHAPE: i32 = 22;

    pub fn is_wall(&self) -> bool {
        matches!(
            self.shape,
            Self::WALL_STRAIGHT_SHAPE
                | Self::WALL_L_SHAPE
                | Self::WALL_SQUARE_CORNER_SHAPE
                | Self::WALL_DIAGONAL_SHAPE
        )
    }

    pub fn is_ground_decoration(&self) -> bool {
        self.shape == Self::GROUND_DECOR_SHAPE
    }

    pub fn is_centrepiece(&self) -> bool {
        matches!(
            self.shape,
            Self::CENTREPIECE_STRAIGHT_SHAPE | Self::CENTREPIECE_DIAGONAL_SHAPE
        )
    }
}

#[inline]
fn tile_index(level: usize, x: usize, y: usize) -> usize {
    level * MAPSQUARE_SIZE * MAPSQUARE_SIZE + x * MAPSQUARE_SIZE + y
}

/// A per-level 64x64 grid on a flat backing buffer, indexed
/// `level * 64 * 64 + x * 64 + y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid<T> {
    levels: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> TileGrid<T> {
    pub fn new(levels: usize) -> Self {
        Self {
            levels,
            data: vec![T::default(); levels * MAPSQUARE_SIZE * MAPSQUARE_SIZE],
        }
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn get(&self, level: usize, x: usize, y: usize) -> T {
        self.data[tile_index(level, x, y)]
    }

    pub fn set(&mut self, level: usize, x: usize, y: usize, value: T) {
        self.data[tile_index(level, x, y)] = value;
    }
}

/// Decoration lists per level and tile, same stride as [`TileGrid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationGrid {
    cells: Vec<Vec<DecorationObject>>,
}

impl DecorationGrid {
    pub fn new(levels: usize) -> Self {
        Self {
            cells: vec![Vec::new(); levels * MAPSQUARE_SIZE * MAPSQUARE_SIZE],
        }
    }

    pub fn get(&self, level: usize, x: usize, y: usize) -> &[DecorationObject] {
        &self.cells[tile_index(level, x, y)]
    }

    pub fn push(&mut self, level: usize, x: usize, y: usize, object: DecorationObject) {
        self.cells[tile_index(level, x, y)].push(object);
    }
}

/// The tile arrays of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geography {
    pub underlays: TileGrid<i16>,
    pub overlays: TileGrid<i16>,
    pub shapes: TileGrid<i8>,
    pub rotations: TileGrid<i8>,
    pub decorations: DecorationGrid,
}

impl Geography {
    /// Allocate empty arrays for `levels_count` levels (capped at 4).
    /// Underlays only ever exist on level 0.
    pub fn new(levels_count: i32) -> Self {
        let levels = (levels_count.max(0) as usize).min(MAX_LEVELS);
        Self {
            underlays: TileGrid::new(1),
            overlays: TileGrid::new(levels),
            shapes: TileGrid::new(levels),
            rotations: TileGrid::new(levels),
            decorations: DecorationGrid::new(levels),
        }
    }

    pub fn levels_count(&self) -> usize {
        self.overlays.levels()
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        (0..MAPSQUARE_SIZE as i32).contains(&x) && (0..MAPSQUARE_SIZE as i32).contains(&y)
    }

    fn level_in_bounds(&self, z: i32) -> bool {
        z >= 0 && (z as usize) < self.levels_count()
    }

    /// 0-based underlay id at level 0, or -1 when absent or out of range.
    pub fn underlay_id(&self, x: i32, y: i32) -> i32 {
        if !self.in_bounds(x, y) {
            return -1;
        }
        self.underlays.get(0, x as usize, y as usize) as i32 - 1
    }

    /// 0-based overlay id, or -1 when absent or out of range.
    pub fn overlay_id(&self, z: i32, x: i32, y: i32) -> i32 {
        if !self.in_bounds(x, y) || !self.level_in_bounds(z) {
            return -1;
        }
        self.overlays.get(z as usize, x as usize, y as usize) as i32 - 1
    }

    /// Overlay shape code, 0 when absent or out of range.
    pub fn overlay_shape(&self, z: i32, x: i32, y: i32) -> i32 {
        if !self.in_bounds(x, y) || !self.level_in_bounds(z) {
            return 0;
        }
        self.shapes.get(z as usize, x as usize, y as usize) as i32
    }

    /// Overlay rotation, 0 when absent or out of range.
    pub fn overlay_rotation(&self, z: i32, x: i32, y: i32) -> i32 {
        if !self.in_bounds(x, y) || !self.level_in_bounds(z) {
            return 0;
        }
        self.rotations.get(z as usize, x as usize, y as usize) as i32
    }

    /// Decorations at a tile, empty when out of range.
    pub fn decorations_at(&self, z: i32, x: i32, y: i32) -> &[DecorationObject] {
        if !self.in_bounds(x, y) || !self.level_in_bounds(z) {
            return &[];
        }
        self.decorations.get(z as usize, x as usize, y as usize)
    }

    fn max_overlay_level(&self, x: usize, y: usize) -> i32 {
        let mut max = -1;
        for level in 0..self.levels_count() {
            if self.overlays.get(level, x, y) != 0 {
                max = level as i32;
            }
        }
        max
    }

    fn max_decoration_level(&self, x: usize, y: usize) -> i32 {
        let mut max = -1;
        for level in 0..self.levels_count() {
            if !self.decorations.get(level, x, y).is_empty() {
                max = level as i32;
            }
        }
        max
    }

    fn is_simple_tile(&self, x: usize, y: usize, max_overlay: i32, max_decoration: i32) -> bool {
        // Decorations and above-ground overlays force the full format.
        if max_decoration != -1 {
            return false;
        }
        if max_overlay == -1 {
            return true;
        }
        if max_overlay > 0 {
            return false;
        }
        for level in 0..=max_overlay as usize {
            if self.overlays.get(level, x, y) == 0 {
                continue;
            }
            if self.shapes.get(level, x, y) != 0 || self.rotations.get(level, x, y) != 0 {
                return false;
            }
        }
        true
    }

    pub fn encode_tile(&self, buf: &mut impl BufMut, x: usize, y: usize) {
        let max_overlay = self.max_overlay_level(x, y);
        let max_decoration = self.max_decoration_level(x, y);
        if self.is_simple_tile(x, y, max_overlay, max_decoration) {
            let overlay = self.overlays.get(0, x, y);
            if overlay != 0 {
                buf.put_u8(SIMPLE_TILE | HAS_OVERLAY);
                buf.put_u16(overlay as u16);
                buf.put_u16(self.underlays.get(0, x, y) as u16);
            } else if self.underlays.get(0, x, y) != 0 {
                buf.put_u8(SIMPLE_TILE);
                buf.put_u16(self.underlays.get(0, x, y) as u16);
            } else {
                buf.put_u8(0);
            }
            return;
        }
        let has_overlays = max_overlay != -1;
        let has_decorations = max_decoration != -1;
        let max_level = max_overlay.max(max_decoration);
        let mut flag = (max_level as u8) << 3;
        if has_overlays {
            flag |= HAS_OVERLAY;
        }
        if has_decorations {
            flag |= HAS_DECORATIONS;
        }
        buf.put_u8(flag);
        buf.put_u16(self.underlays.get(0, x, y) as u16);
        if has_overlays {
            buf.put_u8(max_level as u8 + 1);
            for level in 0..=max_level as usize {
                let overlay_id = self.overlays.get(level, x, y);
                buf.put_u16(overlay_id as u16);
                if overlay_id == 0 {
                    continue;
                }
                let info = ((self.shapes.get(level, x, y) as i32) << 2)
                    | (self.rotations.get(level, x, y) as i32 & 0x3);
                buf.put_u8(info as u8);
            }
        }
        if has_decorations {
            for level in 0..=max_level as usize {
                let decorations = self.decorations.get(level, x, y);
                buf.put_u8(decorations.len() as u8);
                for decoration in decorations {
                    // Encoding is infallible here: object ids are always
                    // -1 or non-negative.
                    let _ = put_smart_sentinel(buf, decoration.object_id);
                    let info = (decoration.shape << 2) | (decoration.rotation & 0x3);
                    buf.put_u8(info as u8);
                }
            }
        }
    }

    pub fn decode_tile(&mut self, buf: &mut impl Buf, x: usize, y: usize) -> Result<(), WorldMapError> {
        let flag = take_u8(buf)?;
        if flag == 0 {
            return Ok(());
        }
        if flag & SIMPLE_TILE != 0 {
            if flag & HAS_OVERLAY != 0 {
                self.overlays.set(0, x, y, take_u16(buf)? as i16);
            }
            self.underlays.set(0, x, y, take_u16(buf)? as i16);
            return Ok(());
        }
        self.underlays.set(0, x, y, take_u16(buf)? as i16);
        if flag & HAS_OVERLAY != 0 {
            let levels = take_u8(buf)? as usize;
            for level in 0..levels {
                let overlay_id = take_u16(buf)? as i16;
                if overlay_id == 0 {
                    continue;
                }
                self.overlays.set(level, x, y, overlay_id);
                let info = take_u8(buf)? as i32;
                self.shapes.set(level, x, y, (info >> 2) as i8);
                self.rotations.set(level, x, y, (info & 0x3) as i8);
            }
        }
        if flag & HAS_DECORATIONS != 0 {
            // The flag's level field drives decoration iteration; it is
            // independent of the overlay level-count byte above.
            let levels = (((flag >> 3) & 0x3) + 1) as usize;
            for level in 0..levels {
                let count = take_u8(buf)? as usize;
                for _ in 0..count {
                    let object_id = get_smart_or_minus_one(buf)?;
                    let info = take_u8(buf)? as i32;
                    self.decorations.push(
                        level,
                        x,
                        y,
                        DecorationObject {
                            object_id,
                            shape: info >> 2,
                            rotation: info & 0x3,
                        },
                    );
                }
            }
        }
        Ok(())
    }
}

/// Geography covering a full 64x64 mapsquare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsquareGeography {
    pub mapsquare_destination_x: i32,
    pub mapsquare_destination_y: i32,
    pub geography: Geography,
}

impl MapsquareGeography {
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(AreaType::Mapsquare.id());
        buf.put_u8(self.mapsquare_destination_x as u8);
        buf.put_u8(self.mapsquare_destination_y as u8);
        for x in 0..MAPSQUARE_SIZE {
            for y in 0..MAPSQUARE_SIZE {
                self.geography.encode_tile(buf, x, y);
            }
        }
    }

    /// Decode a mapsquare geography group, verifying its positional header
    /// against the companion data record.
    pub fn decode(
        buf: &mut impl Buf,
        levels_count: i32,
        expected_x: i32,
        expected_y: i32,
    ) -> Result<Self, WorldMapError> {
        let type_id = take_u8(buf)?;
        if AreaType::from_id(type_id)? != AreaType::Mapsquare {
            return Err(WorldMapError::UnknownAreaType(type_id));
        }
        let mapsquare_destination_x = take_u8(buf)? as i32;
        let mapsquare_destination_y = take_u8(buf)? as i32;
        if mapsquare_destination_x != expected_x {
            return Err(WorldMapError::HeaderMismatch {
                field: "mapsquare destination x",
                header: mapsquare_destination_x,
                expected: expected_x,
            });
        }
        if mapsquare_destination_y != expected_y {
            return Err(WorldMapError::HeaderMismatch {
                field: "mapsquare destination y",
                header: mapsquare_destination_y,
                expected: expected_y,
            });
        }
        let mut geography = Geography::new(levels_count);
        for x in 0..MAPSQUARE_SIZE {
            for y in 0..MAPSQUARE_SIZE {
                geography.decode_tile(buf, x, y)?;
            }
        }
        Ok(Self {
            mapsquare_destination_x,
            mapsquare_destination_y,
            geography,
        })
    }
}

/// Geography covering one 8x8 zone, stored in full-size arrays offset to the
/// destination zone position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneGeography {
    pub mapsquare_destination_x: i32,
    pub mapsquare_destination_y: i32,
    pub zone_destination_x: i32,
    pub zone_destination_y: i32,
    pub geography: Geography,
}

impl ZoneGeography {
    fn min_x_in_mapsquare(&self) -> usize {
        (self.zone_destination_x as usize) << 3
    }

    fn min_y_in_mapsquare(&self) -> usize {
        (self.zone_destination_y as usize) << 3
    }

    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(AreaType::Zone.id());
        buf.put_u8(self.mapsquare_destination_x as u8);
        buf.put_u8(self.mapsquare_destination_y as u8);
        buf.put_u8(self.zone_destination_x as u8);
        buf.put_u8(self.zone_destination_y as u8);
        for x in 0..ZONE_SIZE {
            for y in 0..ZONE_SIZE {
                self.geography
                    .encode_tile(buf, x + self.min_x_in_mapsquare(), y + self.min_y_in_mapsquare());
            }
        }
    }

    /// Decode a zone geography group, verifying its positional header
    /// against the companion data record.
    #[allow(clippy::too_many_arguments)]
    pub fn decode(
        buf: &mut impl Buf,
        levels_count: i32,
        expected_mapsquare_x: i32,
        expected_mapsquare_y: i32,
        expected_zone_x: i32,
        expected_zone_y: i32,
    ) -> Result<Self, WorldMapError> {
        let type_id = take_u8(buf)?;
        if AreaType::from_id(type_id)? != AreaType::Zone {
            return Err(WorldMapError::UnknownAreaType(type_id));
        }
        let mapsquare_destination_x = take_u8(buf)? as i32;
        let mapsquare_destination_y = take_u8(buf)? as i32;
        let zone_destination_x = take_u8(buf)? as i32;
        let zone_destination_y = take_u8(buf)? as i32;
        let mismatches = [
            ("mapsquare destination x", mapsquare_destination_x, expected_mapsquare_x),
            ("mapsquare destination y", mapsquare_destination_y, expected_mapsquare_y),
            ("zone destination x", zone_destination_x, expected_zone_x),
            ("zone destination y", zone_destination_y, expected_zone_y),
        ];
        for (field, header, expected) in mismatches {
            if header != expected {
                return Err(WorldMapError::HeaderMismatch { field, header, expected });
            }
        }
        let mut geography = Geography::new(levels_count);
        for x in 0..ZONE_SIZE {
            for y in 0..ZONE_SIZE {
                geography.decode_tile(
                    buf,
                    x + ((zone_destination_x as usize) << 3),
                    y + ((zone_destination_y as usize) << 3),
                )?;
            }
        }
        Ok(Self {
            mapsquare_destination_x,
            mapsquare_destination_y,
            zone_destination_x,
            zone_destination_y,
            geography,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn mapsquare_roundtrip(geography: MapsquareGeography) {
        let mut buf = BytesMut::new();
        geography.encode(&mut buf);
        let decoded = MapsquareGeography::decode(
            &mut buf.freeze(),
            geography.geography.levels_count() as i32,
            geography.mapsquare_destination_x,
            geography.mapsquare_destination_y,
        )
        .unwrap();
        assert_eq!(decoded, geography);
    }

    #[test]
    fn empty_tile_is_single_zero_byte() {
        let geography = Geography::new(1);
        let mut buf = BytesMut::new();
        geography.encode_tile(&mut buf, 5, 9);
        assert_eq!(&buf[..], &[0]);

        let mut decoded = Geography::new(1);
        decoded.decode_tile(&mut &[0u8][..], 5, 9).unwrap();
        assert_eq!(decoded, Geography::new(1));
    }

    #[test]
    fn simple_tile_underlay_only() {
        let mut geography = Geography::new(1);
        geography.underlays.set(0, 3, 4, 7);
        let mut buf = BytesMut::new();
        geography.encode_tile(&mut buf, 3, 4);
        assert_eq!(&buf[..], &[SIMPLE_TILE, 0, 7]);
    }

    #[test]
    fn simple_tile_with_overlay() {
        let mut geography = Geography::new(1);
        geography.underlays.set(0, 0, 0, 2);
        geography.overlays.set(0, 0, 0, 5);
        let mut buf = BytesMut::new();
        geography.encode_tile(&mut buf, 0, 0);
        assert_eq!(&buf[..], &[SIMPLE_TILE | HAS_OVERLAY, 0, 5, 0, 2]);
    }

    #[test]
    fn shaped_overlay_forces_full_format() {
        let mut geography = Geography::new(1);
        geography.overlays.set(0, 0, 0, 5);
        geography.shapes.set(0, 0, 0, 4);
        geography.rotations.set(0, 0, 0, 2);
        let mut buf = BytesMut::new();
        geography.encode_tile(&mut buf, 0, 0);
        // Full flag: overlay bit set, max level 0.
        assert_eq!(buf[0], HAS_OVERLAY);
        // underlay short, level count, overlay short, packed shape/rotation.
        assert_eq!(&buf[1..], &[0, 0, 1, 0, 5, (4 << 2) | 2]);
    }

    #[test]
    fn decoration_levels_follow_flag_field() {
        let mut geography = Geography::new(4);
        geography.decorations.push(
            2,
            1,
            1,
            DecorationObject {
                object_id: 1234,
                shape: 10,
                rotation: 1,
            },
        );
        let mut buf = BytesMut::new();
        geography.encode_tile(&mut buf, 1, 1);
        // Full format, decorations up to level 2 -> flag level field is 2.
        assert_eq!(buf[0], HAS_DECORATIONS | (2 << 3));

        let mut decoded = Geography::new(4);
        decoded.decode_tile(&mut buf.freeze(), 1, 1).unwrap();
        assert_eq!(
            decoded.decorations_at(2, 1, 1),
            &[DecorationObject {
                object_id: 1234,
                shape: 10,
                rotation: 1,
            }]
        );
    }

    #[test]
    fn accessors_return_sentinels_out_of_range() {
        let geography = Geography::new(2);
        assert_eq!(geography.underlay_id(-1, 0), -1);
        assert_eq!(geography.underlay_id(0, 64), -1);
        assert_eq!(geography.overlay_id(2, 0, 0), -1);
        assert_eq!(geography.overlay_id(-1, 0, 0), -1);
        assert_eq!(geography.overlay_shape(5, 3, 3), 0);
        assert_eq!(geography.overlay_rotation(0, 64, 0), 0);
        assert!(geography.decorations_at(0, -1, 0).is_empty());
    }

    #[test]
    fn mapsquare_header_mismatch_is_fatal() {
        let geography = MapsquareGeography {
            mapsquare_destination_x: 10,
            mapsquare_destination_y: 20,
            geography: Geography::new(1),
        };
        let mut buf = BytesMut::new();
        geography.encode(&mut buf);
        let result = MapsquareGeography::decode(&mut buf.freeze(), 1, 11, 20);
        assert!(matches!(result, Err(WorldMapError::HeaderMismatch { .. })));
    }

    #[test]
    fn zone_header_mismatch_is_fatal() {
        let geography = ZoneGeography {
            mapsquare_destination_x: 1,
            mapsquare_destination_y: 2,
            zone_destination_x: 3,
            zone_destination_y: 4,
            geography: Geography::new(1),
        };
        let mut buf = BytesMut::new();
        geography.encode(&mut buf);
        let result = ZoneGeography::decode(&mut buf.freeze(), 1, 1, 2, 3, 5);
        assert!(matches!(result, Err(WorldMapError::HeaderMismatch { .. })));
    }

    #[test]
    fn wrong_area_type_is_fatal() {
        let geography = ZoneGeography {
            mapsquare_destination_x: 1,
            mapsquare_destination_y: 2,
            zone_destination_x: 3,
            zone_destination_y: 4,
            geography: Geography::new(1),
        };
        let mut buf = BytesMut::new();
        geography.encode(&mut buf);
        // A zone payload fed to the mapsquare decoder must be rejected.
        let result = MapsquareGeography::decode(&mut buf.freeze(), 1, 1, 2);
        assert!(matches!(result, Err(WorldMapError::UnknownAreaType(_))));
    }

    fn random_geography(rng: &mut StdRng, levels: i32) -> Geography {
        let mut geography = Geography::new(levels);
        for x in 0..MAPSQUARE_SIZE {
            for y in 0..MAPSQUARE_SIZE {
                if rng.gen_bool(0.4) {
                    geography.underlays.set(0, x, y, rng.gen_range(1..200));
                }
                for level in 0..geography.levels_count() {
                    if rng.gen_bool(0.2) {
                        geography.overlays.set(level, x, y, rng.gen_range(1..250));
                        geography.shapes.set(level, x, y, rng.gen_range(0..23));
                        geography.rotations.set(level, x, y, rng.gen_range(0..4));
                    }
                    if rng.gen_bool(0.05) {
                        for _ in 0..rng.gen_range(1..3) {
                            geography.push_random_decoration(rng, level, x, y);
                        }
                    }
                }
            }
        }
        geography
    }

    impl Geography {
        fn push_random_decoration(&mut self, rng: &mut StdRng, level: usize, x: usize, y: usize) {
            let shape = [0, 2, 3, 9, 10, 11, 22][rng.gen_range(0..7)];
            let object_id = if rng.gen_bool(0.1) {
                -1
            } else if rng.gen_bool(0.2) {
                rng.gen_range(32767..100_000)
            } else {
                rng.gen_range(0..32767)
            };
            self.decorations.push(
                level,
                x,
                y,
                DecorationObject {
                    object_id,
                    shape,
                    rotation: rng.gen_range(0..4),
                },
            );
        }
    }

    #[test]
    fn random_mapsquare_geography_roundtrips() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        for levels in [1, 2, 4] {
            let geography = random_geography(&mut rng, levels);
            mapsquare_roundtrip(MapsquareGeography {
                mapsquare_destination_x: 45,
                mapsquare_destination_y: 53,
                geography,
            });
        }
    }

    #[test]
    fn random_zone_geography_roundtrips() {
        let mut rng = StdRng::seed_from_u64(0xBEEF);
        for levels in [1, 4] {
            // Only the destination zone's 8x8 window is encoded; fill just
            // that window so the roundtrip compares equal.
            let zone_x = 5usize;
            let zone_y = 2usize;
            let mut geography = Geography::new(levels);
            for x in zone_x * 8..zone_x * 8 + 8 {
                for y in zone_y * 8..zone_y * 8 + 8 {
                    if rng.gen_bool(0.5) {
                        geography.underlays.set(0, x, y, rng.gen_range(1..100));
                    }
                    if rng.gen_bool(0.3) {
                        geography.overlays.set(0, x, y, rng.gen_range(1..250));
                    }
                    if rng.gen_bool(0.1) {
                        geography.push_random_decoration(&mut rng, 0, x, y);
                    }
                }
            }
            let zone = ZoneGeography {
                mapsquare_destination_x: 31,
                mapsquare_destination_y: 72,
                zone_destination_x: zone_x as i32,
                zone_destination_y: zone_y as i32,
                geography,
            };
            let mut buf = BytesMut::new();
            zone.encode(&mut buf);
            let decoded = ZoneGeography::decode(
                &mut buf.freeze(),
                levels,
                31,
                72,
                zone_x as i32,
                zone_y as i32,
            )
            .unwrap();
            assert_eq!(decoded, zone);
        }
    }
}
