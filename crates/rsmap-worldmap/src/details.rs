//! Area details: identity, origin, background colour, zoom and the section
//! list, with their wire codec.

use bytes::{Buf, BufMut};

use rsmap_buffer::codec::{get_string, put_string, take_i32, take_u8};

use crate::constants::area_id;
use crate::coordinate::Coordinate;
use crate::error::WorldMapError;
use crate::section::WorldMapSection;

/// Metadata of one world-map area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldMapAreaDetails {
    pub id: i32,
    /// Cache lookup key of this area's groups.
    pub internal_name: String,
    /// Name shown in the area selection drop-down.
    pub display_name: String,
    /// Where the map opens when viewing this area.
    pub origin: Coordinate,
    /// Fill colour for parts of the map rectangle with no map data.
    pub background_colour: i32,
    /// Opening zoom, one of 50/75/100/150/200.
    pub zoom: i32,
    pub sections: Vec<WorldMapSection>,
    /// True exactly for the main surface map.
    pub is_main: bool,
}

impl WorldMapAreaDetails {
    /// Build details from an area name, deriving id and internal name.
    pub fn construct(
        name: &str,
        display_name: &str,
        origin: Coordinate,
        background_colour: i32,
        zoom: i32,
        sections: Vec<WorldMapSection>,
    ) -> Self {
        let internal_name = name.strip_prefix("worldmap.").unwrap_or(name).to_string();
        let is_main = internal_name == "main";
        Self {
            id: area_id(name),
            internal_name,
            display_name: display_name.to_string(),
            origin,
            background_colour,
            zoom,
            sections,
            is_main,
        }
    }

    fn verify(&self) -> Result<(), WorldMapError> {
        if self.sections.len() > u8::MAX as usize {
            return Err(WorldMapError::TooManySections(self.sections.len()));
        }
        Ok(())
    }

    pub fn encode(&self, buf: &mut impl BufMut) -> Result<(), WorldMapError> {
        self.verify()?;
        put_string(buf, &self.internal_name)?;
        put_string(buf, &self.display_name)?;
        buf.put_i32(self.origin.0);
        buf.put_i32(self.background_colour);
        // Reserved, always 1.
        buf.put_u8(1);
        buf.put_u8(self.is_main as u8);
        buf.put_u8(self.zoom as u8);
        buf.put_u8(self.sections.len() as u8);
        for section in &self.sections {
            section.verify()?;
            section.encode(buf);
        }
        Ok(())
    }

    pub fn decode(id: i32, buf: &mut impl Buf) -> Result<Self, WorldMapError> {
        let internal_name = get_string(buf)?;
        let display_name = get_string(buf)?;
        let origin = Coordinate(take_i32(buf)?);
        let background_colour = take_i32(buf)?;
        take_u8(buf)?; // reserved
        let is_main = take_u8(buf)? == 1;
        let zoom = take_u8(buf)? as i32;
        let count = take_u8(buf)? as usize;
        let mut sections = Vec::with_capacity(count);
        for _ in 0..count {
            sections.push(WorldMapSection::decode(buf)?);
        }
        Ok(Self {
            id,
            internal_name,
            display_name,
            origin,
            background_colour,
            zoom,
            sections,
            is_main,
        })
    }
}
