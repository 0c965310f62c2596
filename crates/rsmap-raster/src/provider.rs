//! Capability traits implemented by the asset layer.

use crate::sprite::SpriteSheet;

const VERDANA_11_REGULAR_GROUP: i32 = 1442;
const VERDANA_13_REGULAR_GROUP: i32 = 1445;
const VERDANA_15_REGULAR_GROUP: i32 = 1447;

/// Sprite-sheet lookup by group id.
pub trait SpriteProvider {
    fn sprite_sheet(&self, id: i32) -> Option<SpriteSheet>;

    fn verdana_11_sprite_id(&self) -> i32 {
        VERDANA_11_REGULAR_GROUP
    }
    fn verdana_13_sprite_id(&self) -> i32 {
        VERDANA_13_REGULAR_GROUP
    }
    fn verdana_15_sprite_id(&self) -> i32 {
        VERDANA_15_REGULAR_GROUP
    }
}

/// Glyph metrics for one font: per-byte advances, optional kerning table
/// indexed `(previous << 8) + current`, and the baseline ascent.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    pub advances: Vec<i32>,
    pub kerning: Option<Vec<i8>>,
    pub ascent: i32,
}

pub trait FontMetricsProvider {
    fn font(&self, id: i32) -> Option<FontMetrics>;

    fn verdana_11_font_id(&self) -> i32 {
        VERDANA_11_REGULAR_GROUP
    }
    fn verdana_13_font_id(&self) -> i32 {
        VERDANA_13_REGULAR_GROUP
    }
    fn verdana_15_font_id(&self) -> i32 {
        VERDANA_15_REGULAR_GROUP
    }
}

/// The graphics-defaults config group: which sprite groups hold the map
/// scenes and the mod icons.
pub trait GraphicsDefaultsProvider {
    fn map_scenes_group(&self) -> i32;
    fn mod_icons_group(&self) -> i32;
}
