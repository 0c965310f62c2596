//! Capability contracts consumed by the builder, compositor and renderer.
//!
//! These are implemented by the surrounding cache/config layers as plain
//! structs, constructed once and passed in explicitly.

use bytes::Bytes;

use rsmap_raster::provider::{FontMetricsProvider, GraphicsDefaultsProvider, SpriteProvider};

use crate::coordinate::Coordinate;

/// Read/write access to the asset cache by archive-group-file triple. Groups
/// and files are addressed by id or by name depending on the archive layout.
///
/// Writes take `&self`: implementations are expected to be backed by
/// external storage (files, a cache library) or interior mutability.
pub trait CacheProvider {
    fn read(&self, archive: i32, group: i32, file: i32) -> Option<Bytes>;
    fn read_named(&self, archive: i32, group: &str, file: &str) -> Option<Bytes>;
    fn exists(&self, archive: i32, group: i32, file: i32) -> bool;
    fn exists_named(&self, archive: i32, group: &str, file: &str) -> bool;
    fn write(&self, archive: i32, group: i32, file: i32, data: &[u8]);
    fn write_named(&self, archive: i32, group: &str, file: &str, data: &[u8]);
    fn write_named_with_id(&self, archive: i32, group: &str, file: &str, file_id: i32, data: &[u8]);
    fn list(&self, archive: i32) -> Vec<i32>;
    fn list_group(&self, archive: i32, group: i32) -> Vec<i32>;

    /// The lowest unused group id in `0..=0xFFFF`, or `None` when the
    /// archive is full. Callers write to the returned id before allocating
    /// again.
    fn allocate_empty(&self, archive: i32) -> Option<i32> {
        let used: std::collections::HashSet<i32> = self.list(archive).into_iter().collect();
        (0..=0xFFFF).find(|id| !used.contains(id))
    }
}

/// One placed object, in raw cache format: the level coordinate is *not*
/// bridge-adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapObject {
    pub id: i32,
    /// Shape code, 0..=22.
    pub shape: i32,
    /// Rotation, 0..=3.
    pub rotation: i32,
    /// Local or global position; only the in-mapsquare part is used.
    pub coordinate: Coordinate,
}

/// Tile data of one source mapsquare.
pub trait Landscape {
    /// Underlay id at a tile, -1 when absent.
    fn underlay_id(&self, level: i32, x: i32, y: i32) -> i32;
    /// Overlay id at a tile, -1 when absent.
    fn overlay_id(&self, level: i32, x: i32, y: i32) -> i32;
    /// Overlay shape, 0 when absent.
    fn overlay_shape(&self, level: i32, x: i32, y: i32) -> i32;
    /// Overlay rotation, 0 when absent.
    fn overlay_rotation(&self, level: i32, x: i32, y: i32) -> i32;
    /// Tile flags, see [`crate::constants::flags`].
    fn flags(&self, level: i32, x: i32, y: i32) -> i32;
}

/// A source mapsquare: its landscape plus its placed objects.
pub struct SourceMapsquare {
    pub landscape: Box<dyn Landscape>,
    pub objects: Vec<MapObject>,
}

/// Source map lookup. `None` means the mapsquare does not exist at all (not
/// even water); a landscape without objects returns an empty object list.
pub trait MapProvider {
    fn map(&self, mapsquare_x: i32, mapsquare_y: i32) -> Option<SourceMapsquare>;
}

/// Object config lookups.
pub trait ObjectProvider {
    /// Map-scene id drawn for the object on the map, -1 when undefined.
    fn map_scene_id(&self, id: i32) -> i32;
    /// Map-icon id drawn for the object on the map, -1 when undefined.
    fn map_icon_id(&self, id: i32) -> i32;
    /// Boundary type: nonzero walls render highlighted.
    fn boundary_type(&self, id: i32) -> i32;
}

/// Overlay config lookups.
pub trait OverlayProvider {
    fn exists(&self, id: i32) -> bool;
    fn minimap_colour(&self, id: i32) -> i32;
    fn tile_colour(&self, id: i32) -> i32;
    fn texture_id(&self, id: i32) -> i32;
    fn hue(&self, id: i32) -> i32;
    fn saturation(&self, id: i32) -> i32;
    fn lightness(&self, id: i32) -> i32;
}

/// Underlay ground-colour components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Underlay {
    pub hue: i32,
    pub hue_multiplier: i32,
    pub saturation: i32,
    pub lightness: i32,
}

pub trait UnderlayProvider {
    fn underlay(&self, id: i32) -> Option<Underlay>;
}

/// Texture average colour as a packed HSL value, -1 when missing.
pub trait TextureProvider {
    fn hsl(&self, id: i32) -> i32;
}

/// One map element (label/icon) config entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapElement {
    pub text: Option<String>,
    pub text_size: i32,
    pub text_colour: i32,
    pub graphic: i32,
    pub horizontal_alignment: i32,
    pub vertical_alignment: i32,
}

pub trait MapElementConfigProvider {
    fn map_element(&self, id: i32) -> MapElement;
}

/// The full provider bundle the pipeline runs against.
pub struct Providers<'a> {
    pub cache: &'a dyn CacheProvider,
    pub textures: &'a dyn TextureProvider,
    pub sprites: &'a dyn SpriteProvider,
    pub font_metrics: &'a dyn FontMetricsProvider,
    pub objects: &'a dyn ObjectProvider,
    pub maps: &'a dyn MapProvider,
    pub overlays: &'a dyn OverlayProvider,
    pub map_elements: &'a dyn MapElementConfigProvider,
    pub graphics_defaults: &'a dyn GraphicsDefaultsProvider,
    pub underlays: &'a dyn UnderlayProvider,
}
