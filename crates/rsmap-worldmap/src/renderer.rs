//! Map rasterization: overlays, decorations and map elements over the
//! composed ground colour, plus the downscaled composite texture path.

use image::RgbImage;
use tracing::warn;

use rsmap_raster::font::Font;
use rsmap_raster::palette::{adjust_lightness, Palette};
use rsmap_raster::provider::{FontMetricsProvider, SpriteProvider};
use rsmap_raster::shapes::OverlayShapes;
use rsmap_raster::sprite::{MapSceneSprites, ModIconSprites};
use rsmap_raster::Raster;

use std::collections::BTreeMap;

use crate::area::{WorldMapArea, WorldMapAreaBoundaries, WorldMapElement};
use crate::constants::MAPSQUARE_SIZE;
use crate::coordinate::{Coordinate, MapsquareId};
use crate::geography::DecorationObject;
use crate::ground::{GroundArea, GroundAreas};
use crate::providers::{ObjectProvider, OverlayProvider, Providers, TextureProvider};

const COMPOSITE_TEXTURE_PIXELS_PER_TILE: usize = 1;
const COMPOSITE_TEXTURE_DOWNSCALE_FACTOR: usize = 4;

/// Magenta sentinel drawn for the "no overlay" id.
const TRANSPARENT_OVERLAY_RGB: i32 = 0xFF00FF;
/// Highlighted wall colour (doors and other interactable boundaries).
const BOUNDARY_WALL_RGB: i32 = 0xFFCC0000u32 as i32;
/// Plain wall colour.
const PLAIN_WALL_RGB: i32 = 0xFFCCCCCCu32 as i32;

/// Map-scene sprites blitted one pixel larger than a tile footprint.
const OVERSIZED_MAP_SCENES: [i32; 2] = [46, 52];

/// The three label sizes and their zoom thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSize {
    Small,
    Medium,
    Large,
}

impl LabelSize {
    pub fn from_text_size(text_size: i32) -> Option<Self> {
        match text_size {
            0 => Some(LabelSize::Small),
            1 => Some(LabelSize::Medium),
            2 => Some(LabelSize::Large),
            _ => None,
        }
    }

    fn minimum_pixels_per_tile(self) -> i32 {
        match self {
            LabelSize::Small => 4,
            LabelSize::Medium => 2,
            LabelSize::Large => 0,
        }
    }

    pub fn should_draw(self, pixels_per_tile: i32) -> bool {
        pixels_per_tile >= self.minimum_pixels_per_tile()
    }
}

/// The three world-map label fonts.
pub struct WorldMapFonts {
    small: Font,
    medium: Font,
    large: Font,
}

impl WorldMapFonts {
    /// Build the Verdana font set; `None` when any sheet or metrics record
    /// is missing from the cache.
    pub fn build(
        sprites: &dyn SpriteProvider,
        metrics: &dyn FontMetricsProvider,
        mod_icons: &ModIconSprites,
    ) -> Option<Self> {
        let build_one = |sprite_id: i32, font_id: i32| -> Option<Font> {
            let sheet = sprites.sprite_sheet(sprite_id)?;
            let font_metrics = metrics.font(font_id)?;
            Font::new(font_metrics, &sheet, mod_icons.clone())
        };
        Some(Self {
            small: build_one(sprites.verdana_11_sprite_id(), metrics.verdana_11_font_id())?,
            medium: build_one(sprites.verdana_13_sprite_id(), metrics.verdana_13_font_id())?,
            large: build_one(sprites.verdana_15_sprite_id(), metrics.verdana_15_font_id())?,
        })
    }

    fn font_mut(&mut self, size: LabelSize) -> &mut Font {
        match size {
            LabelSize::Small => &mut self.small,
            LabelSize::Medium => &mut self.medium,
            LabelSize::Large => &mut self.large,
        }
    }
}

struct TextLabel {
    text: String,
    width: i32,
    height: i32,
    size: LabelSize,
}

/// Resolve the display colour of an overlay id.
fn determine_overlay_colour(
    palette: &Palette,
    overlays: &dyn OverlayProvider,
    textures: &dyn TextureProvider,
    overlay_id: i32,
    background_rgb: i32,
) -> i32 {
    if overlay_id == -1 {
        return TRANSPARENT_OVERLAY_RGB;
    }
    if !overlays.exists(overlay_id) {
        return background_rgb;
    }
    if overlays.minimap_colour(overlay_id) >= 0 {
        return overlays.minimap_colour(overlay_id) | 0xFF000000u32 as i32;
    }
    if overlays.texture_id(overlay_id) >= 0 {
        let average_hsl = textures.hsl(overlays.texture_id(overlay_id));
        let index = adjust_lightness(average_hsl, 96);
        return palette.table[index as usize] | 0xFF000000u32 as i32;
    }
    if overlays.tile_colour(overlay_id) == TRANSPARENT_OVERLAY_RGB {
        return background_rgb;
    }
    let hue = overlays.hue(overlay_id);
    let mut saturation = overlays.saturation(overlay_id);
    let lightness = overlays.lightness(overlay_id);
    // Bright tiles wash out; halve the saturation per threshold crossed.
    for threshold in [179, 192, 217, 243] {
        if lightness > threshold {
            saturation /= 2;
        }
    }
    let packed = ((saturation / 32) << 7) + lightness / 2 + ((hue / 4) << 10);
    let index = adjust_lightness(packed, 96);
    palette.table[index as usize] | 0xFF000000u32 as i32
}

fn image_rgb(image: &RgbImage, x: i32, y: i32) -> i32 {
    match image.get_pixel_checked(x as u32, y as u32) {
        Some(pixel) => {
            0xFF000000u32 as i32 | ((pixel[0] as i32) << 16) | ((pixel[1] as i32) << 8) | pixel[2] as i32
        }
        None => 0xFF000000u32 as i32,
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_tile_ground(
    palette: &Palette,
    raster: &mut Raster,
    providers: &Providers<'_>,
    shapes: &OverlayShapes,
    x: i32,
    y: i32,
    area: &GroundArea<'_>,
    image: &RgbImage,
    pixels_per_tile: i32,
    background_rgb: i32,
) {
    let underlay = area.underlay_id(x, y);
    let overlay_id = area.overlay_id(0, x, y);
    if underlay == -1 && overlay_id == -1 {
        raster.fill_rect(
            pixels_per_tile * x,
            pixels_per_tile * (63 - y),
            pixels_per_tile,
            pixels_per_tile,
            background_rgb,
        );
    }
    let overlay_rgb =
        determine_overlay_colour(palette, providers.overlays, providers.textures, overlay_id, background_rgb);
    let tile_shape = area.shape(0, x, y);
    let tile_rotation = area.rotation(0, x, y);
    if overlay_id > -1 && tile_shape == 0 {
        raster.fill_rect(
            pixels_per_tile * x,
            pixels_per_tile * (63 - y),
            pixels_per_tile,
            pixels_per_tile,
            overlay_rgb,
        );
        return;
    }
    let underlay_rgb = if underlay == -1 {
        background_rgb
    } else {
        image_rgb(image, x, y)
    };
    if overlay_id == -1 {
        raster.fill_rect(
            pixels_per_tile * x,
            pixels_per_tile * (63 - y),
            pixels_per_tile,
            pixels_per_tile,
            underlay_rgb,
        );
        return;
    }
    shapes.draw_overlay(
        raster,
        pixels_per_tile * x,
        pixels_per_tile * (63 - y),
        underlay_rgb,
        overlay_rgb,
        pixels_per_tile,
        pixels_per_tile,
        tile_shape,
        tile_rotation,
    );
}

#[allow(clippy::too_many_arguments)]
fn draw_above_tiles(
    palette: &Palette,
    raster: &mut Raster,
    providers: &Providers<'_>,
    shapes: &OverlayShapes,
    x: i32,
    y: i32,
    area: &GroundArea<'_>,
    pixels_per_tile: i32,
    background_rgb: i32,
) {
    for level in 1..area.levels() as i32 {
        let overlay_id = area.overlay_id(level, x, y);
        if overlay_id < 0 {
            continue;
        }
        let overlay_rgb = determine_overlay_colour(
            palette,
            providers.overlays,
            providers.textures,
            overlay_id,
            background_rgb,
        );
        let shape = area.shape(level, x, y);
        if shape == 0 {
            raster.fill_rect(
                pixels_per_tile * x,
                pixels_per_tile * (63 - y),
                pixels_per_tile,
                pixels_per_tile,
                overlay_rgb,
            );
        } else {
            shapes.draw_overlay(
                raster,
                pixels_per_tile * x,
                pixels_per_tile * (63 - y),
                0,
                overlay_rgb,
                pixels_per_tile,
                pixels_per_tile,
                shape,
                area.rotation(level, x, y),
            );
        }
    }
}

fn draw_wall_line(raster: &mut Raster, pixels_per_tile: i32, x: i32, y: i32, wall_rotation: i32, rgb: i32) {
    match wall_rotation % 4 {
        0 => raster.draw_vertical_line(pixels_per_tile * x, pixels_per_tile * (63 - y), pixels_per_tile, rgb),
        1 => raster.draw_horizontal_line(pixels_per_tile * x, pixels_per_tile * (63 - y), pixels_per_tile, rgb),
        2 => raster.draw_vertical_line(
            pixels_per_tile * x + pixels_per_tile - 1,
            pixels_per_tile * (63 - y),
            pixels_per_tile,
            rgb,
        ),
        _ => raster.draw_horizontal_line(
            pixels_per_tile * x,
            pixels_per_tile * (63 - y) + pixels_per_tile - 1,
            pixels_per_tile,
            rgb,
        ),
    }
}

fn draw_decorative_walls(
    raster: &mut Raster,
    objects: &dyn ObjectProvider,
    pixels_per_tile: i32,
    x: i32,
    y: i32,
    area: &GroundArea<'_>,
) {
    for level in 0..area.levels() as i32 {
        for decoration in area.decorations(level, x, y) {
            if !decoration.is_wall() {
                continue;
            }
            let boundary = objects.boundary_type(decoration.object_id);
            let rgb = if boundary != 0 { BOUNDARY_WALL_RGB } else { PLAIN_WALL_RGB };
            match decoration.shape {
                DecorationObject::WALL_STRAIGHT_SHAPE => {
                    draw_wall_line(raster, pixels_per_tile, x, y, decoration.rotation, rgb);
                }
                DecorationObject::WALL_L_SHAPE => {
                    draw_wall_line(raster, pixels_per_tile, x, y, decoration.rotation, PLAIN_WALL_RGB);
                    draw_wall_line(raster, pixels_per_tile, x, y, decoration.rotation + 1, rgb);
                }
                DecorationObject::WALL_SQUARE_CORNER_SHAPE => {
                    let (px, py) = match decoration.rotation {
                        0 => (pixels_per_tile * x, pixels_per_tile * (63 - y)),
                        1 => (pixels_per_tile + pixels_per_tile * x - 1, pixels_per_tile * (63 - y)),
                        2 => (
                            pixels_per_tile * x + pixels_per_tile - 1,
                            pixels_per_tile * (63 - y) + pixels_per_tile - 1,
                        ),
                        _ => (pixels_per_tile * x, pixels_per_tile * (63 - y) + pixels_per_tile - 1),
                    };
                    raster.draw_horizontal_line(px, py, 1, rgb);
                }
                DecorationObject::WALL_DIAGONAL_SHAPE => {
                    if decoration.rotation % 2 == 0 {
                        for step in 0..pixels_per_tile {
                            raster.draw_horizontal_line(
                                step + pixels_per_tile * x,
                                (64 - y) * pixels_per_tile - 1 - step,
                                1,
                                rgb,
                            );
                        }
                    } else {
                        for step in 0..pixels_per_tile {
                            raster.draw_horizontal_line(
                                step + pixels_per_tile * x,
                                step + pixels_per_tile * (63 - y),
                                1,
                                rgb,
                            );
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn draw_decorative_sprites(
    raster: &mut Raster,
    objects: &dyn ObjectProvider,
    map_scenes: &MapSceneSprites,
    pixels_per_tile: i32,
    x: i32,
    y: i32,
    area: &GroundArea<'_>,
) {
    for level in 0..area.levels() as i32 {
        for decoration in area.decorations(level, x, y) {
            if !decoration.is_centrepiece() && !decoration.is_ground_decoration() {
                continue;
            }
            let map_scene = objects.map_scene_id(decoration.object_id);
            if map_scene == -1 {
                continue;
            }
            let Some(sprite) = map_scenes.sprites.get(map_scene as usize) else {
                continue;
            };
            let oversize = if OVERSIZED_MAP_SCENES.contains(&map_scene) { 1 } else { 0 };
            sprite.rasterize_scan_line(
                raster,
                pixels_per_tile * x,
                pixels_per_tile * (63 - y),
                pixels_per_tile * 2 + oversize,
                pixels_per_tile * 2 + oversize,
            );
        }
    }
}

/// Harvest map icons from decoration objects across the area.
fn read_map_elements_from_objects(
    objects: &dyn ObjectProvider,
    boundaries: &WorldMapAreaBoundaries,
    areas: &GroundAreas<'_>,
) -> Vec<WorldMapElement> {
    let mut icons = Vec::new();
    for slot_x in 0..areas.width {
        for slot_y in 0..areas.height {
            let area = areas.get(slot_x, slot_y);
            if area.is_empty() {
                continue;
            }
            for x in 0..MAPSQUARE_SIZE as i32 {
                for y in 0..MAPSQUARE_SIZE as i32 {
                    for z in 0..area.levels() as i32 {
                        for decoration in area.decorations(z, x, y) {
                            let map_icon = objects.map_icon_id(decoration.object_id);
                            if map_icon == -1 {
                                continue;
                            }
                            let location = Coordinate::new(
                                (boundaries.min_x + slot_x as i32) * MAPSQUARE_SIZE as i32 + x,
                                (boundaries.min_y + slot_y as i32) * MAPSQUARE_SIZE as i32 + y,
                                z,
                            );
                            icons.push(WorldMapElement {
                                element_id: map_icon,
                                location,
                                members: false,
                            });
                        }
                    }
                }
            }
        }
    }
    icons
}

fn draw_sprite_element(
    raster: &mut Raster,
    providers: &Providers<'_>,
    x: i32,
    y: i32,
    element: &WorldMapElement,
) {
    if element.element_id < 0 {
        return;
    }
    let config = providers.map_elements.map_element(element.element_id);
    let Some(sheet) = providers.sprites.sprite_sheet(config.graphic) else {
        return;
    };
    let horizontal_offset = sheet.horizontal_offset(config.horizontal_alignment);
    let vertical_offset = sheet.vertical_offset(config.vertical_alignment);
    let Some(sprite) = sheet.to_single_sprite() else {
        return;
    };
    sprite.draw_transparent(raster, x + horizontal_offset, y + vertical_offset);
}

fn create_text_label(
    config: &crate::providers::MapElement,
    fonts: &mut WorldMapFonts,
) -> Option<TextLabel> {
    let text = config.text.clone()?;
    let size = LabelSize::from_text_size(config.text_size)?;
    let font = fonts.font_mut(size);
    let mut lines = Vec::new();
    font.break_lines(&text, None, &mut lines);
    let height = lines.len() as i32 * font.ascent / 2;
    let width = lines.iter().map(|line| font.text_width(line)).max().unwrap_or(0);
    Some(TextLabel {
        text,
        width,
        height,
        size,
    })
}

#[allow(clippy::too_many_arguments)]
fn draw_text_element(
    raster: &mut Raster,
    providers: &Providers<'_>,
    fonts: &mut WorldMapFonts,
    x: i32,
    y: i32,
    pixels_per_tile: i32,
    element: &WorldMapElement,
) {
    let config = providers.map_elements.map_element(element.element_id);
    let Some(label) = create_text_label(&config, fonts) else {
        return;
    };
    if !label.size.should_draw(pixels_per_tile) {
        return;
    }
    let font = fonts.font_mut(label.size);
    let line_height = font.ascent / 2;
    font.draw_lines(
        raster,
        &label.text,
        x - label.width / 2,
        y,
        label.width,
        label.height,
        config.text_colour | 0xFF000000u32 as i32,
        0,
        1,
        0,
        line_height,
    );
}

#[allow(clippy::too_many_arguments)]
fn draw_map_elements(
    raster: &mut Raster,
    providers: &Providers<'_>,
    fonts: Option<&mut WorldMapFonts>,
    min_x: i32,
    min_y: i32,
    width: i32,
    height: i32,
    pixels_per_tile: i32,
    elements: &[WorldMapElement],
) {
    let in_range = |element: &WorldMapElement| {
        let coord = element.location;
        coord.x() >= min_x && coord.x() < min_x + width && coord.y() >= min_y && coord.y() < min_y + height
    };
    // Sprites first, text above.
    for element in elements.iter().filter(|e| in_range(e)) {
        let offset_x = element.location.x() - min_x;
        let offset_y = element.location.y() - min_y;
        let half_a_tile = 8 - pixels_per_tile / 2;
        draw_sprite_element(
            raster,
            providers,
            pixels_per_tile * offset_x + half_a_tile,
            pixels_per_tile * (height - 1 - offset_y) - half_a_tile,
            element,
        );
    }
    let Some(fonts) = fonts else { return };
    for element in elements.iter().filter(|e| in_range(e)) {
        let offset_x = element.location.x() - min_x;
        let offset_y = element.location.y() - min_y;
        draw_text_element(
            raster,
            providers,
            fonts,
            pixels_per_tile * offset_x,
            pixels_per_tile * (height - 1 - offset_y),
            pixels_per_tile,
            element,
        );
    }
}

fn mapsquare_raster_size(pixels_per_tile: usize) -> usize {
    MAPSQUARE_SIZE * pixels_per_tile
}

#[allow(clippy::too_many_arguments)]
fn draw_slot(
    palette: &Palette,
    raster: &mut Raster,
    providers: &Providers<'_>,
    map_scenes: &MapSceneSprites,
    shapes: &OverlayShapes,
    area: &GroundArea<'_>,
    image: &RgbImage,
    pixels_per_tile: i32,
    background_rgb: i32,
    composite_texture: bool,
) {
    for x in 0..MAPSQUARE_SIZE as i32 {
        for y in 0..MAPSQUARE_SIZE as i32 {
            draw_tile_ground(
                palette,
                raster,
                providers,
                shapes,
                x,
                y,
                area,
                image,
                pixels_per_tile,
                background_rgb,
            );
            if !composite_texture {
                draw_above_tiles(
                    palette,
                    raster,
                    providers,
                    shapes,
                    x,
                    y,
                    area,
                    pixels_per_tile,
                    background_rgb,
                );
            }
        }
    }
    if !composite_texture {
        for x in 0..MAPSQUARE_SIZE as i32 {
            for y in 0..MAPSQUARE_SIZE as i32 {
                draw_decorative_walls(raster, providers.objects, pixels_per_tile, x, y, area);
                draw_decorative_sprites(raster, providers.objects, map_scenes, pixels_per_tile, x, y, area);
            }
        }
    }
}

/// Compose the per-slot rasters into the full-area raster, inverting the
/// mapsquare row order so north ends up at the top.
fn compose(rasters: Vec<(usize, usize, Raster)>, areas: &GroundAreas<'_>, pixels_per_tile: usize) -> Raster {
    let tile = mapsquare_raster_size(pixels_per_tile);
    let mut full = Raster::new(areas.width * tile, areas.height * tile);
    for (x, y, raster) in rasters {
        let offset_x = (x * tile) as i32;
        let offset_y = ((areas.height - y - 1) * tile) as i32;
        raster.blit_into(&mut full, offset_x, offset_y);
    }
    full
}

/// Render the low-zoom composite texture: 1 pixel per tile, ground and
/// level-0 overlay fill only, downscaled by a fixed factor.
pub fn generate_composite_texture(
    providers: &Providers<'_>,
    areas: &GroundAreas<'_>,
    images: &BTreeMap<MapsquareId, RgbImage>,
    background_rgb: i32,
    brightness: f64,
) -> RgbImage {
    let pixels_per_tile = COMPOSITE_TEXTURE_PIXELS_PER_TILE;
    let palette = Palette::new(brightness);
    let shapes = OverlayShapes::new(pixels_per_tile);
    let map_scenes = MapSceneSprites::build(providers.graphics_defaults, providers.sprites);
    let mut rasters = Vec::new();
    for x in 0..areas.width {
        for y in 0..areas.height {
            let slot = areas.get(x, y);
            if slot.is_empty() {
                continue;
            }
            let Some(image) = images.get(&slot.mapsquare_id()) else {
                warn!(mapsquare = %slot.mapsquare_id(), "no ground image for mapsquare, skipping");
                continue;
            };
            let size = mapsquare_raster_size(pixels_per_tile);
            let mut raster = Raster::new(size, size);
            draw_slot(
                &palette,
                &mut raster,
                providers,
                &map_scenes,
                &shapes,
                slot,
                image,
                pixels_per_tile as i32,
                background_rgb,
                true,
            );
            rasters.push((x, y, raster));
        }
    }
    let full = compose(rasters, areas, pixels_per_tile);
    full.downscale(COMPOSITE_TEXTURE_DOWNSCALE_FACTOR)
}

/// Render the full map image: ground, overlays on all levels, decorations
/// and map elements at the given resolution.
pub fn draw_overlays_and_elements(
    providers: &Providers<'_>,
    area: &WorldMapArea,
    areas: &GroundAreas<'_>,
    images: &BTreeMap<MapsquareId, RgbImage>,
    pixels_per_tile: usize,
    brightness: f64,
) -> RgbImage {
    let background_rgb = area.details.background_colour;
    let boundaries = area.boundaries();
    let palette = Palette::new(brightness);
    let shapes = OverlayShapes::new(pixels_per_tile);
    let map_scenes = MapSceneSprites::build(providers.graphics_defaults, providers.sprites);
    let mut rasters = Vec::new();
    for x in 0..areas.width {
        for y in 0..areas.height {
            let slot = areas.get(x, y);
            if slot.is_empty() {
                continue;
            }
            let Some(image) = images.get(&slot.mapsquare_id()) else {
                warn!(mapsquare = %slot.mapsquare_id(), "no ground image for mapsquare, skipping");
                continue;
            };
            let size = mapsquare_raster_size(pixels_per_tile);
            let mut raster = Raster::new(size, size);
            draw_slot(
                &palette,
                &mut raster,
                providers,
                &map_scenes,
                &shapes,
                slot,
                image,
                pixels_per_tile as i32,
                background_rgb,
                false,
            );
            rasters.push((x, y, raster));
        }
    }
    let icons = read_map_elements_from_objects(providers.objects, &boundaries, areas);
    let mut full = compose(rasters, areas, pixels_per_tile);

    let mod_icons = ModIconSprites::build(providers.graphics_defaults, providers.sprites);
    let mut fonts = WorldMapFonts::build(providers.sprites, providers.font_metrics, &mod_icons);
    if fonts.is_none() {
        warn!("world map fonts unavailable, text labels skipped");
    }
    let mut elements = area.data.elements.clone();
    elements.extend(icons);
    draw_map_elements(
        &mut full,
        providers,
        fonts.as_mut(),
        boundaries.min_x << 6,
        boundaries.min_y << 6,
        boundaries.width() << 6,
        boundaries.height() << 6,
        pixels_per_tile as i32,
        &elements,
    );
    full.to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestOverlays;

    impl OverlayProvider for TestOverlays {
        fn exists(&self, id: i32) -> bool {
            id < 100
        }
        fn minimap_colour(&self, id: i32) -> i32 {
            if id == 1 {
                0x123456
            } else {
                -1
            }
        }
        fn tile_colour(&self, id: i32) -> i32 {
            if id == 3 {
                TRANSPARENT_OVERLAY_RGB
            } else {
                0x334455
            }
        }
        fn texture_id(&self, id: i32) -> i32 {
            if id == 2 {
                7
            } else {
                -1
            }
        }
        fn hue(&self, _id: i32) -> i32 {
            40
        }
        fn saturation(&self, _id: i32) -> i32 {
            128
        }
        fn lightness(&self, id: i32) -> i32 {
            if id == 5 {
                200
            } else {
                100
            }
        }
    }

    struct TestTextures;

    impl TextureProvider for TestTextures {
        fn hsl(&self, _id: i32) -> i32 {
            (12 << 10) | (3 << 7) | 64
        }
    }

    #[test]
    fn overlay_colour_sentinel_and_background() {
        let palette = Palette::new(0.7);
        let colour = determine_overlay_colour(&palette, &TestOverlays, &TestTextures, -1, 0x111111);
        assert_eq!(colour, TRANSPARENT_OVERLAY_RGB);
        // Nonexistent overlay falls back to the background colour.
        let colour = determine_overlay_colour(&palette, &TestOverlays, &TestTextures, 200, 0x111111);
        assert_eq!(colour, 0x111111);
    }

    #[test]
    fn overlay_colour_prefers_minimap_colour() {
        let palette = Palette::new(0.7);
        let colour = determine_overlay_colour(&palette, &TestOverlays, &TestTextures, 1, 0);
        assert_eq!(colour, 0x123456 | 0xFF000000u32 as i32);
    }

    #[test]
    fn overlay_colour_texture_path_uses_palette() {
        let palette = Palette::new(0.7);
        let colour = determine_overlay_colour(&palette, &TestOverlays, &TestTextures, 2, 0);
        let expected_index = adjust_lightness((12 << 10) | (3 << 7) | 64, 96);
        assert_eq!(colour, palette.table[expected_index as usize] | 0xFF000000u32 as i32);
    }

    #[test]
    fn overlay_colour_reserved_tile_colour_passes_background() {
        let palette = Palette::new(0.7);
        let colour = determine_overlay_colour(&palette, &TestOverlays, &TestTextures, 3, 0x222222);
        assert_eq!(colour, 0x222222);
    }

    #[test]
    fn overlay_colour_hsl_saturation_falloff() {
        let palette = Palette::new(0.7);
        // Lightness 200 crosses two falloff thresholds: saturation 128 -> 32.
        let saturation = 128 / 2 / 2;
        let packed = ((saturation / 32) << 7) + 200 / 2 + ((40 / 4) << 10);
        let expected_index = adjust_lightness(packed, 96);
        let colour = determine_overlay_colour(&palette, &TestOverlays, &TestTextures, 5, 0);
        assert_eq!(colour, palette.table[expected_index as usize] | 0xFF000000u32 as i32);
    }

    #[test]
    fn label_sizes_gate_on_zoom() {
        assert!(LabelSize::Large.should_draw(0));
        assert!(!LabelSize::Medium.should_draw(1));
        assert!(LabelSize::Medium.should_draw(2));
        assert!(!LabelSize::Small.should_draw(3));
        assert!(LabelSize::Small.should_draw(4));
        assert_eq!(LabelSize::from_text_size(9), None);
    }
}
