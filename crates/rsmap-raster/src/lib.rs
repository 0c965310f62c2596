//! CPU rasterization toolkit: pixel rasters, the HSL colour palette, overlay
//! tile-shape templates, sprite blitting, and the bitmap font renderer.

pub mod font;
pub mod palette;
pub mod provider;
pub mod raster;
pub mod shapes;
pub mod sprite;

pub use font::Font;
pub use palette::Palette;
pub use raster::Raster;
pub use shapes::OverlayShapes;
