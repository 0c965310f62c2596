//! Area content: block data records, map elements and the composite-map
//! codec that ties them to their geography groups.

use bytes::{Buf, BufMut};

use rsmap_buffer::codec::{
    get_smart_or_minus_one, put_smart_sentinel, take_i32, take_u16, take_u8,
};
use rsmap_buffer::{BufferError, WireDecode, WireEncode};

use crate::constants::{COMPOSITE_MAP_GROUP, DATA_ARCHIVE, DETAILS_GROUP, GEOGRAPHY_ARCHIVE};
use crate::coordinate::Coordinate;
use crate::details::WorldMapAreaDetails;
use crate::error::WorldMapError;
use crate::geography::{MapsquareGeography, ZoneGeography};
use crate::providers::CacheProvider;

/// Wire discriminant shared by block data and geography groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaType {
    Mapsquare,
    Zone,
}

impl AreaType {
    pub fn id(self) -> u8 {
        match self {
            AreaType::Mapsquare => 0,
            AreaType::Zone => 1,
        }
    }

    pub fn from_id(id: u8) -> Result<Self, WorldMapError> {
        match id {
            0 => Ok(AreaType::Mapsquare),
            1 => Ok(AreaType::Zone),
            other => Err(WorldMapError::UnknownAreaType(other)),
        }
    }
}

/// Positional/identity record of a mapsquare block. `group_id`/`file_id`
/// point at the geography group in the geography archive; -1 until assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsquareData {
    pub level: i32,
    pub levels_count: i32,
    pub mapsquare_source_x: i32,
    pub mapsquare_source_y: i32,
    pub mapsquare_destination_x: i32,
    pub mapsquare_destination_y: i32,
    pub group_id: i32,
    pub file_id: i32,
}

impl WireEncode for MapsquareData {
    fn wire_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(AreaType::Mapsquare.id());
        buf.put_u8(self.level as u8);
        buf.put_u8(self.levels_count as u8);
        buf.put_u16(self.mapsquare_source_x as u16);
        buf.put_u16(self.mapsquare_source_y as u16);
        buf.put_u16(self.mapsquare_destination_x as u16);
        buf.put_u16(self.mapsquare_destination_y as u16);
        let _ = put_smart_sentinel(buf, self.group_id);
        let _ = put_smart_sentinel(buf, self.file_id);
    }
}

impl WireDecode for MapsquareData {
    fn wire_decode(buf: &mut impl Buf) -> Result<Self, BufferError> {
        // The type byte is validated by the area-data decoder before
        // dispatching here.
        Ok(Self {
            level: take_u8(buf)? as i32,
            levels_count: take_u8(buf)? as i32,
            mapsquare_source_x: take_u16(buf)? as i32,
            mapsquare_source_y: take_u16(buf)? as i32,
            mapsquare_destination_x: take_u16(buf)? as i32,
            mapsquare_destination_y: take_u16(buf)? as i32,
            group_id: get_smart_or_minus_one(buf)?,
            file_id: get_smart_or_minus_one(buf)?,
        })
    }
}

/// Positional/identity record of a zone block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneData {
    pub level: i32,
    pub levels_count: i32,
    pub mapsquare_source_x: i32,
    pub mapsquare_source_y: i32,
    pub zone_source_x: i32,
    pub zone_source_y: i32,
    pub mapsquare_destination_x: i32,
    pub mapsquare_destination_y: i32,
    pub zone_destination_x: i32,
    pub zone_destination_y: i32,
    pub group_id: i32,
    pub file_id: i32,
}

impl WireEncode for ZoneData {
    fn wire_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(AreaType::Zone.id());
        buf.put_u8(self.level as u8);
        buf.put_u8(self.levels_count as u8);
        buf.put_u16(self.mapsquare_source_x as u16);
        buf.put_u16(self.mapsquare_source_y as u16);
        buf.put_u8(self.zone_source_x as u8);
        buf.put_u8(self.zone_source_y as u8);
        buf.put_u16(self.mapsquare_destination_x as u16);
        buf.put_u16(self.mapsquare_destination_y as u16);
        buf.put_u8(self.zone_destination_x as u8);
        buf.put_u8(self.zone_destination_y as u8);
        let _ = put_smart_sentinel(buf, self.group_id);
        let _ = put_smart_sentinel(buf, self.file_id);
    }
}

impl WireDecode for ZoneData {
    fn wire_decode(buf: &mut impl Buf) -> Result<Self, BufferError> {
        Ok(Self {
            level: take_u8(buf)? as i32,
            levels_count: take_u8(buf)? as i32,
            mapsquare_source_x: take_u16(buf)? as i32,
            mapsquare_source_y: take_u16(buf)? as i32,
            zone_source_x: take_u8(buf)? as i32,
            zone_source_y: take_u8(buf)? as i32,
            mapsquare_destination_x: take_u16(buf)? as i32,
            mapsquare_destination_y: take_u16(buf)? as i32,
            zone_destination_x: take_u8(buf)? as i32,
            zone_destination_y: take_u8(buf)? as i32,
            group_id: get_smart_or_minus_one(buf)?,
            file_id: get_smart_or_minus_one(buf)?,
        })
    }
}

/// A map label or icon placed at a world coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldMapElement {
    /// Element config id, -1 for none.
    pub element_id: i32,
    pub location: Coordinate,
    pub members: bool,
}

impl WireEncode for WorldMapElement {
    fn wire_encode(&self, buf: &mut impl BufMut) {
        let _ = put_smart_sentinel(buf, self.element_id);
        buf.put_i32(self.location.0);
        buf.put_u8(self.members as u8);
    }
}

impl WireDecode for WorldMapElement {
    fn wire_decode(buf: &mut impl Buf) -> Result<Self, BufferError> {
        Ok(Self {
            element_id: get_smart_or_minus_one(buf)?,
            location: Coordinate(take_i32(buf)?),
            members: take_u8(buf)? == 1,
        })
    }
}

/// A mapsquare block: data record plus decoded geography.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldMapMapsquare {
    pub data: MapsquareData,
    pub geography: MapsquareGeography,
}

/// A zone block: data record plus decoded geography.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldMapZone {
    pub data: ZoneData,
    pub geography: ZoneGeography,
}

/// Destination-mapsquare bounding rectangle of an area, in mapsquare units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldMapAreaBoundaries {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl WorldMapAreaBoundaries {
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }
}

/// All content of one area: its blocks and map elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldMapAreaData {
    pub mapsquares: Vec<WorldMapMapsquare>,
    pub zones: Vec<WorldMapZone>,
    pub elements: Vec<WorldMapElement>,
}

impl WorldMapAreaData {
    /// Encode the composite-map records. Geography groups are written
    /// separately to the geography archive.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.mapsquares.len() as u16);
        for mapsquare in &self.mapsquares {
            mapsquare.data.wire_encode(buf);
        }
        buf.put_u16(self.zones.len() as u16);
        for zone in &self.zones {
            zone.data.wire_encode(buf);
        }
        buf.put_u16(self.elements.len() as u16);
        for element in &self.elements {
            element.wire_encode(buf);
        }
    }

    /// Decode the composite-map records and pull each block's geography
    /// group from the cache.
    pub fn decode(cache: &dyn CacheProvider, buf: &mut impl Buf) -> Result<Self, WorldMapError> {
        let mapsquare_count = take_u16(buf)? as usize;
        let mut mapsquares = Vec::with_capacity(mapsquare_count);
        for _ in 0..mapsquare_count {
            let type_id = take_u8(buf)?;
            if AreaType::from_id(type_id)? != AreaType::Mapsquare {
                return Err(WorldMapError::UnknownAreaType(type_id));
            }
            let data = MapsquareData::wire_decode(buf)?;
            let mut geography_buf = read_geography(cache, data.group_id, data.file_id)?;
            let geography = MapsquareGeography::decode(
                &mut geography_buf,
                data.levels_count,
                data.mapsquare_destination_x,
                data.mapsquare_destination_y,
            )?;
            mapsquares.push(WorldMapMapsquare { data, geography });
        }

        let zone_count = take_u16(buf)? as usize;
        let mut zones = Vec::with_capacity(zone_count);
        for _ in 0..zone_count {
            let type_id = take_u8(buf)?;
            if AreaType::from_id(type_id)? != AreaType::Zone {
                return Err(WorldMapError::UnknownAreaType(type_id));
            }
            let data = ZoneData::wire_decode(buf)?;
            let mut geography_buf = read_geography(cache, data.group_id, data.file_id)?;
            let geography = ZoneGeography::decode(
                &mut geography_buf,
                data.levels_count,
                data.mapsquare_destination_x,
                data.mapsquare_destination_y,
                data.zone_destination_x,
                data.zone_destination_y,
            )?;
            zones.push(WorldMapZone { data, geography });
        }

        let element_count = take_u16(buf)? as usize;
        let mut elements = Vec::with_capacity(element_count);
        for _ in 0..element_count {
            elements.push(WorldMapElement::wire_decode(buf)?);
        }
        Ok(Self {
            mapsquares,
            zones,
            elements,
        })
    }

    /// Bounding rectangle over all destination mapsquares, degenerating to
    /// (0, 0, 0, 0) when the area holds no blocks.
    pub fn boundaries(&self) -> WorldMapAreaBoundaries {
        let xs = self
            .mapsquares
            .iter()
            .map(|m| m.geography.mapsquare_destination_x)
            .chain(self.zones.iter().map(|z| z.geography.mapsquare_destination_x));
        let ys = self
            .mapsquares
            .iter()
            .map(|m| m.geography.mapsquare_destination_y)
            .chain(self.zones.iter().map(|z| z.geography.mapsquare_destination_y));
        let (Some(min_x), Some(min_y)) = (xs.clone().min(), ys.clone().min()) else {
            return WorldMapAreaBoundaries {
                min_x: 0,
                min_y: 0,
                max_x: 0,
                max_y: 0,
            };
        };
        WorldMapAreaBoundaries {
            min_x,
            min_y,
            max_x: xs.max().unwrap_or(0),
            max_y: ys.max().unwrap_or(0),
        }
    }
}

fn read_geography(
    cache: &dyn CacheProvider,
    group_id: i32,
    file_id: i32,
) -> Result<bytes::Bytes, WorldMapError> {
    cache
        .read(GEOGRAPHY_ARCHIVE, group_id, file_id)
        .ok_or_else(|| WorldMapError::MissingEntry {
            archive: GEOGRAPHY_ARCHIVE,
            group: group_id.to_string(),
            file: file_id.to_string(),
        })
}

/// A fully decoded area: details plus content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldMapArea {
    pub internal_name: String,
    pub details: WorldMapAreaDetails,
    pub data: WorldMapAreaData,
}

impl WorldMapArea {
    pub fn boundaries(&self) -> WorldMapAreaBoundaries {
        self.data.boundaries()
    }

    /// Decode an area by name from the data archive.
    pub fn decode(cache: &dyn CacheProvider, name: &str) -> Result<Self, WorldMapError> {
        let id = crate::constants::area_id(name);
        let internal_name = name.strip_prefix("worldmap.").unwrap_or(name).to_string();
        let mut details_buf = cache
            .read_named(DATA_ARCHIVE, DETAILS_GROUP, &internal_name)
            .ok_or_else(|| WorldMapError::MissingEntry {
                archive: DATA_ARCHIVE,
                group: DETAILS_GROUP.to_string(),
                file: internal_name.clone(),
            })?;
        let details = WorldMapAreaDetails::decode(id, &mut details_buf)?;
        let mut data_buf = cache
            .read_named(DATA_ARCHIVE, COMPOSITE_MAP_GROUP, &internal_name)
            .ok_or_else(|| WorldMapError::MissingEntry {
                archive: DATA_ARCHIVE,
                group: COMPOSITE_MAP_GROUP.to_string(),
                file: internal_name.clone(),
            })?;
        let data = WorldMapAreaData::decode(cache, &mut data_buf)?;
        Ok(Self {
            internal_name,
            details,
            data,
        })
    }
}
