//! World-map sections: the mapping from source world tiles onto destination
//! world-map tiles.
//!
//! Four variants share a base level and level count: a single mapsquare, a
//! rectangle of mapsquares, a single zone, or a rectangle of zones within one
//! mapsquare. Multi variants require the source and destination rectangles to
//! have identical extents. All coordinate conversion translates by the delta
//! between the source and destination southwest corners, preserving level.

use bytes::{Buf, BufMut};

use rsmap_buffer::codec::{take_u16, take_u8};
use rsmap_buffer::{BufferError, WireDecode, WireEncode};

use crate::coordinate::Coordinate;
use crate::error::WorldMapError;

const LEVEL_RANGE: std::ops::RangeInclusive<i32> = 0..=3;
const LEVELS_COUNT_RANGE: std::ops::RangeInclusive<i32> = 1..=255;
// Source mapsquare x stops short of the full byte range; the destination
// side allows it. An asymmetry of the wire format, not an oversight.
const SOURCE_X_RANGE: std::ops::RangeInclusive<i32> = 0..=99;
const SOURCE_Y_RANGE: std::ops::RangeInclusive<i32> = 0..=255;
const ZONE_RANGE: std::ops::RangeInclusive<i32> = 0..=7;
const DESTINATION_RANGE: std::ops::RangeInclusive<i32> = 0..=255;

fn check(field: &'static str, value: i32, range: std::ops::RangeInclusive<i32>) -> Result<(), WorldMapError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(WorldMapError::FieldOutOfRange { field, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionType {
    MapsquareMulti,
    MapsquareSingle,
    ZoneMulti,
    ZoneSingle,
}

impl SectionType {
    pub fn id(self) -> u8 {
        match self {
            SectionType::MapsquareMulti => 0,
            SectionType::MapsquareSingle => 1,
            SectionType::ZoneMulti => 2,
            SectionType::ZoneSingle => 3,
        }
    }

    pub fn from_id(id: u8) -> Result<Self, WorldMapError> {
        match id {
            0 => Ok(SectionType::MapsquareMulti),
            1 => Ok(SectionType::MapsquareSingle),
            2 => Ok(SectionType::ZoneMulti),
            3 => Ok(SectionType::ZoneSingle),
            other => Err(WorldMapError::UnknownSectionType(other)),
        }
    }
}

/// One source mapsquare mapped onto one destination mapsquare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsquareSingleSection {
    pub level: i32,
    pub levels_count: i32,
    pub mapsquare_source_x: i32,
    pub mapsquare_source_y: i32,
    pub mapsquare_destination_x: i32,
    pub mapsquare_destination_y: i32,
}

impl MapsquareSingleSection {
    pub fn verify(&self) -> Result<(), WorldMapError> {
        check("level", self.level, LEVEL_RANGE)?;
        check("levels_count", self.levels_count, LEVELS_COUNT_RANGE)?;
        check("mapsquare_source_x", self.mapsquare_source_x, SOURCE_X_RANGE)?;
        check("mapsquare_source_y", self.mapsquare_source_y, SOURCE_Y_RANGE)?;
        check("mapsquare_destination_x", self.mapsquare_destination_x, DESTINATION_RANGE)?;
        check("mapsquare_destination_y", self.mapsquare_destination_y, DESTINATION_RANGE)?;
        Ok(())
    }

    pub fn contains_source_coord(&self, level: i32, x: i32, y: i32) -> bool {
        if level < self.level || level >= self.level + self.levels_count {
            return false;
        }
        x >> 6 == self.mapsquare_source_x && y >> 6 == self.mapsquare_source_y
    }

    pub fn contains_destination_coord(&self, x: i32, y: i32) -> bool {
        x >> 6 == self.mapsquare_destination_x && y >> 6 == self.mapsquare_destination_y
    }

    pub fn convert_to_destination(&self, source: Coordinate) -> Coordinate {
        let delta_x = source.x() - (self.mapsquare_source_x << 6);
        let delta_y = source.y() - (self.mapsquare_source_y << 6);
        Coordinate::new(
            (self.mapsquare_destination_x << 6) + delta_x,
            (self.mapsquare_destination_y << 6) + delta_y,
            source.level(),
        )
    }
}

impl WireEncode for MapsquareSingleSection {
    fn wire_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.level as u8);
        buf.put_u8(self.levels_count as u8);
        buf.put_u16(self.mapsquare_source_x as u16);
        buf.put_u16(self.mapsquare_source_y as u16);
        buf.put_u16(self.mapsquare_destination_x as u16);
        buf.put_u16(self.mapsquare_destination_y as u16);
    }
}

impl WireDecode for MapsquareSingleSection {
    fn wire_decode(buf: &mut impl Buf) -> Result<Self, BufferError> {
        Ok(Self {
            level: take_u8(buf)? as i32,
            levels_count: take_u8(buf)? as i32,
            mapsquare_source_x: take_u16(buf)? as i32,
            mapsquare_source_y: take_u16(buf)? as i32,
            mapsquare_destination_x: take_u16(buf)? as i32,
            mapsquare_destination_y: take_u16(buf)? as i32,
        })
    }
}

/// An axis-aligned rectangle of source mapsquares mapped onto an equal-size
/// rectangle of destination mapsquares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsquareMultiSection {
    pub level: i32,
    pub levels_count: i32,
    pub mapsquare_source_min_x: i32,
    pub mapsquare_source_min_y: i32,
    pub mapsquare_source_max_x: i32,
    pub mapsquare_source_max_y: i32,
    pub mapsquare_destination_min_x: i32,
    pub mapsquare_destination_min_y: i32,
    pub mapsquare_destination_max_x: i32,
    pub mapsquare_destination_max_y: i32,
}

impl MapsquareMultiSection {
    pub fn verify(&self) -> Result<(), WorldMapError> {
        check("level", self.level, LEVEL_RANGE)?;
        check("levels_count", self.levels_count, LEVELS_COUNT_RANGE)?;
        check("mapsquare_source_min_x", self.mapsquare_source_min_x, SOURCE_X_RANGE)?;
        check("mapsquare_source_min_y", self.mapsquare_source_min_y, SOURCE_Y_RANGE)?;
        check("mapsquare_source_max_x", self.mapsquare_source_max_x, SOURCE_X_RANGE)?;
        check("mapsquare_source_max_y", self.mapsquare_source_max_y, SOURCE_Y_RANGE)?;
        // The destination rectangle is held to the source ranges here; the
        // multi variant is stricter than its single counterpart.
        check("mapsquare_destination_min_x", self.mapsquare_destination_min_x, SOURCE_X_RANGE)?;
        check("mapsquare_destination_min_y", self.mapsquare_destination_min_y, SOURCE_Y_RANGE)?;
        check("mapsquare_destination_max_x", self.mapsquare_destination_max_x, SOURCE_X_RANGE)?;
        check("mapsquare_destination_max_y", self.mapsquare_destination_max_y, SOURCE_Y_RANGE)?;
        if self.mapsquare_source_max_x - self.mapsquare_source_min_x
            != self.mapsquare_destination_max_x - self.mapsquare_destination_min_x
        {
            return Err(WorldMapError::MismatchedExtents {
                axis: "width",
                source_min: self.mapsquare_source_min_x,
                source_max: self.mapsquare_source_max_x,
                destination_min: self.mapsquare_destination_min_x,
                destination_max: self.mapsquare_destination_max_x,
            });
        }
        if self.mapsquare_source_max_y - self.mapsquare_source_min_y
            != self.mapsquare_destination_max_y - self.mapsquare_destination_min_y
        {
            return Err(WorldMapError::MismatchedExtents {
                axis: "height",
                source_min: self.mapsquare_source_min_y,
                source_max: self.mapsquare_source_max_y,
                destination_min: self.mapsquare_destination_min_y,
                destination_max: self.mapsquare_destination_max_y,
            });
        }
        Ok(())
    }

    pub fn contains_source_coord(&self, level: i32, x: i32, y: i32) -> bool {
        if level < self.level || level >= self.level + self.levels_count {
            return false;
        }
        (self.mapsquare_source_min_x..=self.mapsquare_source_max_x).contains(&(x >> 6))
            && (self.mapsquare_source_min_y..=self.mapsquare_source_max_y).contains(&(y >> 6))
    }

    pub fn contains_destination_coord(&self, x: i32, y: i32) -> bool {
        (self.mapsquare_destination_min_x..=self.mapsquare_destination_max_x).contains(&(x >> 6))
            && (self.mapsquare_destination_min_y..=self.mapsquare_destination_max_y).contains(&(y >> 6))
    }

    pub fn convert_to_destination(&self, source: Coordinate) -> Coordinate {
        let delta_x = source.x() - (self.mapsquare_source_min_x << 6);
        let delta_y = source.y() - (self.mapsquare_source_min_y << 6);
        Coordinate::new(
            (self.mapsquare_destination_min_x << 6) + delta_x,
            (self.mapsquare_destination_min_y << 6) + delta_y,
            source.level(),
        )
    }
}

impl WireEncode for MapsquareMultiSection {
    fn wire_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.level as u8);
        buf.put_u8(self.levels_count as u8);
        buf.put_u16(self.mapsquare_source_min_x as u16);
        buf.put_u16(self.mapsquare_source_min_y as u16);
        buf.put_u16(self.mapsquare_source_max_x as u16);
        buf.put_u16(self.mapsquare_source_max_y as u16);
        buf.put_u16(self.mapsquare_destination_min_x as u16);
        buf.put_u16(self.mapsquare_destination_min_y as u16);
        buf.put_u16(self.mapsquare_destination_max_x as u16);
        buf.put_u16(self.mapsquare_destination_max_y as u16);
    }
}

impl WireDecode for MapsquareMultiSection {
    fn wire_decode(buf: &mut impl Buf) -> Result<Self, BufferError> {
        Ok(Self {
            level: take_u8(buf)? as i32,
            levels_count: take_u8(buf)? as i32,
            mapsquare_source_min_x: take_u16(buf)? as i32,
            mapsquare_source_min_y: take_u16(buf)? as i32,
            mapsquare_source_max_x: take_u16(buf)? as i32,
            mapsquare_source_max_y: take_u16(buf)? as i32,
            mapsquare_destination_min_x: take_u16(buf)? as i32,
            mapsquare_destination_min_y: take_u16(buf)? as i32,
            mapsquare_destination_max_x: take_u16(buf)? as i32,
            mapsquare_destination_max_y: take_u16(buf)? as i32,
        })
    }
}

/// One source zone (8x8 tiles) mapped onto one destination zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSingleSection {
    pub level: i32,
    pub levels_count: i32,
    pub mapsquare_source_x: i32,
    pub zone_source_x: i32,
    pub mapsquare_source_y: i32,
    pub zone_source_y: i32,
    pub mapsquare_destination_x: i32,
    pub zone_destination_x: i32,
    pub mapsquare_destination_y: i32,
    pub zone_destination_y: i32,
}

impl ZoneSingleSection {
    pub fn verify(&self) -> Result<(), WorldMapError> {
        check("level", self.level, LEVEL_RANGE)?;
        check("levels_count", self.levels_count, LEVELS_COUNT_RANGE)?;
        check("mapsquare_source_x", self.mapsquare_source_x, SOURCE_X_RANGE)?;
        check("mapsquare_source_y", self.mapsquare_source_y, SOURCE_Y_RANGE)?;
        check("zone_source_x", self.zone_source_x, ZONE_RANGE)?;
        check("zone_source_y", self.zone_source_y, ZONE_RANGE)?;
        check("mapsquare_destination_x", self.mapsquare_destination_x, DESTINATION_RANGE)?;
        check("mapsquare_destination_y", self.mapsquare_destination_y, DESTINATION_RANGE)?;
        check("zone_destination_x", self.zone_destination_x, ZONE_RANGE)?;
        check("zone_destination_y", self.zone_destination_y, ZONE_RANGE)?;
        Ok(())
    }

    fn source_sw(&self) -> (i32, i32) {
        (
            (self.mapsquare_source_x << 6) | (self.zone_source_x << 3),
            (self.mapsquare_source_y << 6) | (self.zone_source_y << 3),
        )
    }

    fn destination_sw(&self) -> (i32, i32) {
        (
            (self.mapsquare_destination_x << 6) | (self.zone_destination_x << 3),
            (self.mapsquare_destination_y << 6) | (self.zone_destination_y << 3),
        )
    }

    pub fn contains_source_coord(&self, level: i32, x: i32, y: i32) -> bool {
        if level < self.level || level >= self.level + self.levels_count {
            return false;
        }
        let (sw_x, sw_y) = self.source_sw();
        x >= sw_x && x <= sw_x + 7 && y >= sw_y && y <= sw_y + 7
    }

    pub fn contains_destination_coord(&self, x: i32, y: i32) -> bool {
        let (sw_x, sw_y) = self.destination_sw();
        x >= sw_x && x <= sw_x + 7 && y >= sw_y && y <= sw_y + 7
    }

    pub fn convert_to_destination(&self, source: Coordinate) -> Coordinate {
        let (src_x, src_y) = self.source_sw();
        let (dst_x, dst_y) = self.destination_sw();
        Coordinate::new(
            dst_x + (source.x() - src_x),
            dst_y + (source.y() - src_y),
            source.level(),
        )
    }
}

impl WireEncode for ZoneSingleSection {
    fn wire_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.level as u8);
        buf.put_u8(self.levels_count as u8);
        buf.put_u16(self.mapsquare_source_x as u16);
        buf.put_u8(self.zone_source_x as u8);
        buf.put_u16(self.mapsquare_source_y as u16);
        buf.put_u8(self.zone_source_y as u8);
        buf.put_u16(self.mapsquare_destination_x as u16);
        buf.put_u8(self.zone_destination_x as u8);
        buf.put_u16(self.mapsquare_destination_y as u16);
        buf.put_u8(self.zone_destination_y as u8);
    }
}

impl WireDecode for ZoneSingleSection {
    fn wire_decode(buf: &mut impl Buf) -> Result<Self, BufferError> {
        Ok(Self {
            level: take_u8(buf)? as i32,
            levels_count: take_u8(buf)? as i32,
            mapsquare_source_x: take_u16(buf)? as i32,
            zone_source_x: take_u8(buf)? as i32,
            mapsquare_source_y: take_u16(buf)? as i32,
            zone_source_y: take_u8(buf)? as i32,
            mapsquare_destination_x: take_u16(buf)? as i32,
            zone_destination_x: take_u8(buf)? as i32,
            mapsquare_destination_y: take_u16(buf)? as i32,
            zone_destination_y: take_u8(buf)? as i32,
        })
    }
}

/// A rectangle of source zones within one mapsquare mapped onto an equal-size
/// rectangle of destination zones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneMultiSection {
    pub level: i32,
    pub levels_count: i32,
    pub mapsquare_source_x: i32,
    pub zone_source_min_x: i32,
    pub zone_source_max_x: i32,
    pub mapsquare_source_y: i32,
    pub zone_source_min_y: i32,
    pub zone_source_max_y: i32,
    pub mapsquare_destination_x: i32,
    pub zone_destination_min_x: i32,
    pub zone_destination_max_x: i32,
    pub mapsquare_destination_y: i32,
    pub zone_destination_min_y: i32,
    pub zone_destination_max_y: i32,
}

impl ZoneMultiSection {
    pub fn verify(&self) -> Result<(), WorldMapError> {
        check("level", self.level, LEVEL_RANGE)?;
        check("levels_count", self.levels_count, LEVELS_COUNT_RANGE)?;
        check("mapsquare_source_x", self.mapsquare_source_x, SOURCE_X_RANGE)?;
        check("zone_source_min_x", self.zone_source_min_x, ZONE_RANGE)?;
        check("zone_source_max_x", self.zone_source_max_x, ZONE_RANGE)?;
        check("mapsquare_source_y", self.mapsquare_source_y, SOURCE_Y_RANGE)?;
        check("zone_source_min_y", self.zone_source_min_y, ZONE_RANGE)?;
        check("zone_source_max_y", self.zone_source_max_y, ZONE_RANGE)?;
        check("mapsquare_destination_x", self.mapsquare_destination_x, DESTINATION_RANGE)?;
        check("zone_destination_min_x", self.zone_destination_min_x, ZONE_RANGE)?;
        check("zone_destination_max_x", self.zone_destination_max_x, ZONE_RANGE)?;
        check("mapsquare_destination_y", self.mapsquare_destination_y, DESTINATION_RANGE)?;
        check("zone_destination_min_y", self.zone_destination_min_y, ZONE_RANGE)?;
        check("zone_destination_max_y", self.zone_destination_max_y, ZONE_RANGE)?;
        if self.zone_source_max_x - self.zone_source_min_x
            != self.zone_destination_max_x - self.zone_destination_min_x
        {
            return Err(WorldMapError::MismatchedExtents {
                axis: "width",
                source_min: self.zone_source_min_x,
                source_max: self.zone_source_max_x,
                destination_min: self.zone_destination_min_x,
                destination_max: self.zone_destination_max_x,
            });
        }
        if self.zone_source_max_y - self.zone_source_min_y
            != self.zone_destination_max_y - self.zone_destination_min_y
        {
            return Err(WorldMapError::MismatchedExtents {
                axis: "height",
                source_min: self.zone_source_min_y,
                source_max: self.zone_source_max_y,
                destination_min: self.zone_destination_min_y,
                destination_max: self.zone_destination_max_y,
            });
        }
        Ok(())
    }

    pub fn contains_source_coord(&self, level: i32, x: i32, y: i32) -> bool {
        if level < self.level || level >= self.level + self.levels_count {
            return false;
        }
        let min_x = (self.mapsquare_source_x << 6) + (self.zone_source_min_x << 3);
        let max_x = (self.mapsquare_source_x << 6) + (self.zone_source_max_x << 3) + 7;
        let min_y = (self.mapsquare_source_y << 6) + (self.zone_source_min_y << 3);
        let max_y = (self.mapsquare_source_y << 6) + (self.zone_source_max_y << 3) + 7;
        x >= min_x && x <= max_x && y >= min_y && y <= max_y
    }

    pub fn contains_destination_coord(&self, x: i32, y: i32) -> bool {
        let min_x = (self.mapsquare_destination_x << 6) + (self.zone_destination_min_x << 3);
        let max_x = (self.mapsquare_destination_x << 6) + (self.zone_destination_max_x << 3) + 7;
        let min_y = (self.mapsquare_destination_y << 6) + (self.zone_destination_min_y << 3);
        let max_y = (self.mapsquare_destination_y << 6) + (self.zone_destination_max_y << 3) + 7;
        x >= min_x && x <= max_x && y >= min_y && y <= max_y
    }

    pub fn convert_to_destination(&self, source: Coordinate) -> Coordinate {
        let src_x = (self.mapsquare_source_x << 6) | (self.zone_source_min_x << 3);
        let src_y = (self.mapsquare_source_y << 6) | (self.zone_source_min_y << 3);
        let dst_x = (self.mapsquare_destination_x << 6) | (self.zone_destination_min_x << 3);
        let dst_y = (self.mapsquare_destination_y << 6) | (self.zone_destination_min_y << 3);
        Coordinate::new(
            dst_x + (source.x() - src_x),
            dst_y + (source.y() - src_y),
            source.level(),
        )
    }
}

impl WireEncode for ZoneMultiSection {
    fn wire_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.level as u8);
        buf.put_u8(self.levels_count as u8);
        buf.put_u16(self.mapsquare_source_x as u16);
        buf.put_u8(self.zone_source_min_x as u8);
        buf.put_u8(self.zone_source_max_x as u8);
        buf.put_u16(self.mapsquare_source_y as u16);
        buf.put_u8(self.zone_source_min_y as u8);
        buf.put_u8(self.zone_source_max_y as u8);
        buf.put_u16(self.mapsquare_destination_x as u16);
        buf.put_u8(self.zone_destination_min_x as u8);
        buf.put_u8(self.zone_destination_max_x as u8);
        buf.put_u16(self.mapsquare_destination_y as u16);
        buf.put_u8(self.zone_destination_min_y as u8);
        buf.put_u8(self.zone_destination_max_y as u8);
    }
}

impl WireDecode for ZoneMultiSection {
    fn wire_decode(buf: &mut impl Buf) -> Result<Self, BufferError> {
        Ok(Self {
            level: take_u8(buf)? as i32,
            levels_count: take_u8(buf)? as i32,
            mapsquare_source_x: take_u16(buf)? as i32,
            zone_source_min_x: take_u8(buf)? as i32,
            zone_source_max_x: take_u8(buf)? as i32,
            mapsquare_source_y: take_u16(buf)? as i32,
            zone_source_min_y: take_u8(buf)? as i32,
            zone_source_max_y: take_u8(buf)? as i32,
            mapsquare_destination_x: take_u16(buf)? as i32,
            zone_destination_min_x: take_u8(buf)? as i32,
            zone_destination_max_x: take_u8(buf)? as i32,
            mapsquare_destination_y: take_u16(buf)? as i32,
            zone_destination_min_y: take_u8(buf)? as i32,
            zone_destination_max_y: take_u8(buf)? as i32,
        })
    }
}

/// Any of the four section variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldMapSection {
    MapsquareSingle(MapsquareSingleSection),
    MapsquareMulti(MapsquareMultiSection),
    ZoneSingle(ZoneSingleSection),
    ZoneMulti(ZoneMultiSection),
}

impl WorldMapSection {
    pub fn section_type(&self) -> SectionType {
        match self {
            WorldMapSection::MapsquareSingle(_) => SectionType::MapsquareSingle,
            WorldMapSection::MapsquareMulti(_) => SectionType::MapsquareMulti,
            WorldMapSection::ZoneSingle(_) => SectionType::ZoneSingle,
            WorldMapSection::ZoneMulti(_) => SectionType::ZoneMulti,
        }
    }

    pub fn level(&self) -> i32 {
        match self {
            WorldMapSection::MapsquareSingle(s) => s.level,
            WorldMapSection::MapsquareMulti(s) => s.level,
            WorldMapSection::ZoneSingle(s) => s.level,
            WorldMapSection::ZoneMulti(s) => s.level,
        }
    }

    pub fn levels_count(&self) -> i32 {
        match self {
            WorldMapSection::MapsquareSingle(s) => s.levels_count,
            WorldMapSection::MapsquareMulti(s) => s.levels_count,
            WorldMapSection::ZoneSingle(s) => s.levels_count,
            WorldMapSection::ZoneMulti(s) => s.levels_count,
        }
    }

    pub fn verify(&self) -> Result<(), WorldMapError> {
        match self {
            WorldMapSection::MapsquareSingle(s) => s.verify(),
            WorldMapSection::MapsquareMulti(s) => s.verify(),
            WorldMapSection::ZoneSingle(s) => s.verify(),
            WorldMapSection::ZoneMulti(s) => s.verify(),
        }
    }

    pub fn contains_source_coord(&self, level: i32, x: i32, y: i32) -> bool {
        match self {
            WorldMapSection::MapsquareSingle(s) => s.contains_source_coord(level, x, y),
            WorldMapSection::MapsquareMulti(s) => s.contains_source_coord(level, x, y),
            WorldMapSection::ZoneSingle(s) => s.contains_source_coord(level, x, y),
            WorldMapSection::ZoneMulti(s) => s.contains_source_coord(level, x, y),
        }
    }

    pub fn contains_destination_coord(&self, x: i32, y: i32) -> bool {
        match self {
            WorldMapSection::MapsquareSingle(s) => s.contains_destination_coord(x, y),
            WorldMapSection::MapsquareMulti(s) => s.contains_destination_coord(x, y),
            WorldMapSection::ZoneSingle(s) => s.contains_destination_coord(x, y),
            WorldMapSection::ZoneMulti(s) => s.contains_destination_coord(x, y),
        }
    }

    pub fn convert_to_destination(&self, source: Coordinate) -> Coordinate {
        match self {
            WorldMapSection::MapsquareSingle(s) => s.convert_to_destination(source),
            WorldMapSection::MapsquareMulti(s) => s.convert_to_destination(source),
            WorldMapSection::ZoneSingle(s) => s.convert_to_destination(source),
            WorldMapSection::ZoneMulti(s) => s.convert_to_destination(source),
        }
    }

    /// Encode the type id plus the variant payload.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.section_type().id());
        match self {
            WorldMapSection::MapsquareSingle(s) => s.wire_encode(buf),
            WorldMapSection::MapsquareMulti(s) => s.wire_encode(buf),
            WorldMapSection::ZoneSingle(s) => s.wire_encode(buf),
            WorldMapSection::ZoneMulti(s) => s.wire_encode(buf),
        }
    }

    /// Decode a type id plus variant payload; an unknown id is fatal.
    pub fn decode(buf: &mut impl Buf) -> Result<Self, WorldMapError> {
        let type_id = take_u8(buf)?;
        Ok(match SectionType::from_id(type_id)? {
            SectionType::MapsquareMulti => {
                WorldMapSection::MapsquareMulti(MapsquareMultiSection::wire_decode(buf)?)
            }
            SectionType::MapsquareSingle => {
                WorldMapSection::MapsquareSingle(MapsquareSingleSection::wire_decode(buf)?)
            }
            SectionType::ZoneMulti => WorldMapSection::ZoneMulti(ZoneMultiSection::wire_decode(buf)?),
            SectionType::ZoneSingle => WorldMapSection::ZoneSingle(ZoneSingleSection::wire_decode(buf)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn single() -> MapsquareSingleSection {
        MapsquareSingleSection {
            level: 0,
            levels_count: 1,
            mapsquare_source_x: 45,
            mapsquare_source_y: 153,
            mapsquare_destination_x: 45,
            mapsquare_destination_y: 53,
        }
    }

    fn multi() -> MapsquareMultiSection {
        MapsquareMultiSection {
            level: 0,
            levels_count: 1,
            mapsquare_source_min_x: 10,
            mapsquare_source_min_y: 20,
            mapsquare_source_max_x: 12,
            mapsquare_source_max_y: 21,
            mapsquare_destination_min_x: 30,
            mapsquare_destination_min_y: 40,
            mapsquare_destination_max_x: 32,
            mapsquare_destination_max_y: 41,
        }
    }

    fn roundtrip(section: WorldMapSection) {
        let mut buf = BytesMut::new();
        section.encode(&mut buf);
        let decoded = WorldMapSection::decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded, section);
    }

    #[test]
    fn all_variants_roundtrip() {
        roundtrip(WorldMapSection::MapsquareSingle(single()));
        roundtrip(WorldMapSection::MapsquareMulti(multi()));
        roundtrip(WorldMapSection::ZoneSingle(ZoneSingleSection {
            level: 1,
            levels_count: 2,
            mapsquare_source_x: 50,
            zone_source_x: 3,
            mapsquare_source_y: 50,
            zone_source_y: 4,
            mapsquare_destination_x: 60,
            zone_destination_x: 1,
            mapsquare_destination_y: 61,
            zone_destination_y: 0,
        }));
        roundtrip(WorldMapSection::ZoneMulti(ZoneMultiSection {
            level: 0,
            levels_count: 4,
            mapsquare_source_x: 33,
            zone_source_min_x: 1,
            zone_source_max_x: 3,
            mapsquare_source_y: 34,
            zone_source_min_y: 2,
            zone_source_max_y: 5,
            mapsquare_destination_x: 35,
            zone_destination_min_x: 4,
            zone_destination_max_x: 6,
            mapsquare_destination_y: 36,
            zone_destination_min_y: 0,
            zone_destination_max_y: 3,
        }));
    }

    #[test]
    fn unknown_type_id_is_fatal() {
        let raw = [9u8, 0, 1];
        let result = WorldMapSection::decode(&mut &raw[..]);
        assert!(matches!(result, Err(WorldMapError::UnknownSectionType(9))));
    }

    #[test]
    fn multi_section_southwest_corner_maps_exactly() {
        // 3x2 source rect onto a 3x2 destination rect.
        let section = multi();
        section.verify().unwrap();
        let sw = Coordinate::new(10 << 6, 20 << 6, 0);
        let mapped = section.convert_to_destination(sw);
        assert_eq!(mapped.x(), 30 << 6);
        assert_eq!(mapped.y(), 40 << 6);
        assert_eq!(mapped.level(), 0);
    }

    #[test]
    fn multi_section_interior_preserves_delta() {
        let section = multi();
        let interior = Coordinate::new((10 << 6) + 97, (20 << 6) + 45, 2);
        let mapped = section.convert_to_destination(interior);
        assert_eq!(mapped.x() - (30 << 6), 97);
        assert_eq!(mapped.y() - (40 << 6), 45);
        assert_eq!(mapped.level(), 2);
    }

    #[test]
    fn zone_section_conversion_uses_zone_corner() {
        let section = ZoneSingleSection {
            level: 0,
            levels_count: 1,
            mapsquare_source_x: 50,
            zone_source_x: 2,
            mapsquare_source_y: 50,
            zone_source_y: 3,
            mapsquare_destination_x: 60,
            zone_destination_x: 5,
            mapsquare_destination_y: 61,
            zone_destination_y: 6,
        };
        let sw = Coordinate::new((50 << 6) + (2 << 3), (50 << 6) + (3 << 3), 0);
        let mapped = section.convert_to_destination(sw);
        assert_eq!(mapped.x(), (60 << 6) + (5 << 3));
        assert_eq!(mapped.y(), (61 << 6) + (6 << 3));
    }

    #[test]
    fn containment_checks() {
        let section = single();
        assert!(section.contains_source_coord(0, 45 << 6, 153 << 6));
        assert!(section.contains_source_coord(0, (45 << 6) + 63, (153 << 6) + 63));
        assert!(!section.contains_source_coord(1, 45 << 6, 153 << 6));
        assert!(!section.contains_source_coord(0, 46 << 6, 153 << 6));
        assert!(section.contains_destination_coord(45 << 6, 53 << 6));
        assert!(!section.contains_destination_coord(45 << 6, 54 << 6));
    }

    #[test]
    fn verify_rejects_out_of_range_fields() {
        let mut section = single();
        section.level = 4;
        assert!(matches!(
            section.verify(),
            Err(WorldMapError::FieldOutOfRange { field: "level", .. })
        ));

        let mut section = single();
        section.levels_count = 0;
        assert!(section.verify().is_err());

        // Source x is capped below the destination range.
        let mut section = single();
        section.mapsquare_source_x = 100;
        assert!(section.verify().is_err());
        let mut section = single();
        section.mapsquare_destination_x = 100;
        assert!(section.verify().is_ok());
        section.mapsquare_destination_x = 256;
        assert!(section.verify().is_err());

        let mut zone = ZoneSingleSection {
            level: 0,
            levels_count: 1,
            mapsquare_source_x: 0,
            zone_source_x: 0,
            mapsquare_source_y: 0,
            zone_source_y: 0,
            mapsquare_destination_x: 0,
            zone_destination_x: 0,
            mapsquare_destination_y: 0,
            zone_destination_y: 0,
        };
        zone.zone_source_x = 8;
        assert!(zone.verify().is_err());
    }

    #[test]
    fn verify_rejects_mismatched_extents() {
        let mut section = multi();
        section.mapsquare_destination_max_x = 33;
        assert!(matches!(
            section.verify(),
            Err(WorldMapError::MismatchedExtents { axis: "width", .. })
        ));

        let mut section = multi();
        section.mapsquare_source_max_y = 25;
        assert!(matches!(
            section.verify(),
            Err(WorldMapError::MismatchedExtents { axis: "height", .. })
        ));
    }
}
