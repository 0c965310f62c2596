//! World-map cache codec and compositing pipeline.
//!
//! Decodes, builds and re-encodes the world-map data of a game asset cache:
//! per-area geography blocks (underlays, overlays, decorations), the section
//! algebra that maps source map tiles onto destination world-map tiles, and
//! the rasterization of that geography into map images.

pub mod area;
pub mod builder;
pub mod constants;
pub mod coordinate;
pub mod details;
pub mod error;
pub mod geography;
pub mod ground;
pub mod pack;
pub mod providers;
pub mod renderer;
pub mod section;

pub use area::{WorldMapArea, WorldMapAreaData};
pub use coordinate::{Coordinate, MapsquareId};
pub use details::WorldMapAreaDetails;
pub use error::WorldMapError;
pub use section::WorldMapSection;
