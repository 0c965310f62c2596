//! Packer configuration: logging, pack options and area definitions.

use serde::Deserialize;
use std::path::Path;

use rsmap_worldmap::area::WorldMapElement;
use rsmap_worldmap::coordinate::Coordinate;
use rsmap_worldmap::details::WorldMapAreaDetails;
use rsmap_worldmap::pack::PackOptions;
use rsmap_worldmap::section::{
    MapsquareMultiSection, MapsquareSingleSection, WorldMapSection, ZoneMultiSection,
    ZoneSingleSection,
};

#[derive(Debug, Deserialize)]
pub struct PackerConfig {
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub pack: PackSection,
    #[serde(default, rename = "area")]
    pub areas: Vec<AreaConfig>,
}

impl PackerConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        toml::from_str(&raw).map_err(|e| format!("cannot parse {}: {e}", path.display()))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Deserialize)]
pub struct PackSection {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "default_brightness")]
    pub brightness: f64,
    #[serde(default)]
    pub blend_borders_separately: bool,
}

impl Default for PackSection {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            brightness: default_brightness(),
            blend_borders_separately: false,
        }
    }
}

fn default_cache_dir() -> String {
    "cache".into()
}

fn default_brightness() -> f64 {
    0.7
}

impl PackSection {
    pub fn options(&self) -> PackOptions {
        PackOptions {
            blend_borders_separately: self.blend_borders_separately,
            brightness: self.brightness,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AreaConfig {
    pub name: String,
    pub display_name: String,
    pub origin: CoordinateConfig,
    #[serde(default)]
    pub background_colour: i32,
    #[serde(default = "default_zoom")]
    pub zoom: i32,
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
    #[serde(default)]
    pub elements: Vec<ElementConfig>,
}

fn default_zoom() -> i32 {
    100
}

impl AreaConfig {
    pub fn details(&self) -> WorldMapAreaDetails {
        WorldMapAreaDetails::construct(
            &self.name,
            &self.display_name,
            self.origin.coordinate(),
            self.background_colour,
            self.zoom,
            self.sections.iter().map(SectionConfig::section).collect(),
        )
    }

    pub fn map_elements(&self) -> Vec<WorldMapElement> {
        self.elements.iter().map(ElementConfig::element).collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct CoordinateConfig {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub level: i32,
}

impl CoordinateConfig {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.x, self.y, self.level)
    }
}

#[derive(Debug, Deserialize)]
pub struct ElementConfig {
    pub element_id: i32,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub members: bool,
}

impl ElementConfig {
    pub fn element(&self) -> WorldMapElement {
        WorldMapElement {
            element_id: self.element_id,
            location: Coordinate::new(self.x, self.y, self.level),
            members: self.members,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SectionConfig {
    MapsquareSingle {
        #[serde(default)]
        level: i32,
        #[serde(default = "default_levels_count")]
        levels_count: i32,
        mapsquare_source_x: i32,
        mapsquare_source_y: i32,
        mapsquare_destination_x: i32,
        mapsquare_destination_y: i32,
    },
    MapsquareMulti {
        #[serde(default)]
        level: i32,
        #[serde(default = "default_levels_count")]
        levels_count: i32,
        mapsquare_source_min_x: i32,
        mapsquare_source_min_y: i32,
        mapsquare_source_max_x: i32,
        mapsquare_source_max_y: i32,
        mapsquare_destination_min_x: i32,
        mapsquare_destination_min_y: i32,
        mapsquare_destination_max_x: i32,
        mapsquare_destination_max_y: i32,
    },
    ZoneSingle {
        #[serde(default)]
        level: i32,
        #[serde(default = "default_levels_count")]
        levels_count: i32,
        mapsquare_source_x: i32,
        zone_source_x: i32,
        mapsquare_source_y: i32,
        zone_source_y: i32,
        mapsquare_destination_x: i32,
        zone_destination_x: i32,
        mapsquare_destination_y: i32,
        zone_destination_y: i32,
    },
    ZoneMulti {
        #[serde(default)]
        level: i32,
        #[serde(default = "default_levels_count")]
        levels_count: i32,
        mapsquare_source_x: i32,
        zone_source_min_x: i32,
        zone_source_max_x: i32,
        mapsquare_source_y: i32,
        zone_source_min_y: i32,
        zone_source_max_y: i32,
        mapsquare_destination_x: i32,
        zone_destination_min_x: i32,
        zone_destination_max_x: i32,
        mapsquare_destination_y: i32,
        zone_destination_min_y: i32,
        zone_destination_max_y: i32,
    },
}

fn default_levels_count() -> i32 {
    1
}

impl SectionConfig {
    pub fn section(&self) -> WorldMapSection {
        match *self {
            SectionConfig::MapsquareSingle {
                level,
                levels_count,
                mapsquare_source_x,
                mapsquare_source_y,
                mapsquare_destination_x,
                mapsquare_destination_y,
            } => WorldMapSection::MapsquareSingle(MapsquareSingleSection {
                level,
                levels_count,
                mapsquare_source_x,
                mapsquare_source_y,
                mapsquare_destination_x,
                mapsquare_destination_y,
            }),
            SectionConfig::MapsquareMulti {
                level,
                levels_count,
                mapsquare_source_min_x,
                mapsquare_source_min_y,
                mapsquare_source_max_x,
                mapsquare_source_max_y,
                mapsquare_destination_min_x,
                mapsquare_destination_min_y,
                mapsquare_destination_max_x,
                mapsquare_destination_max_y,
            } => WorldMapSection::MapsquareMulti(MapsquareMultiSection {
                level,
                levels_count,
                mapsquare_source_min_x,
                mapsquare_source_min_y,
                mapsquare_source_max_x,
                mapsquare_source_max_y,
                mapsquare_destination_min_x,
                mapsquare_destination_min_y,
                mapsquare_destination_max_x,
                mapsquare_destination_max_y,
            }),
            SectionConfig::ZoneSingle {
                level,
                levels_count,
                mapsquare_source_x,
                zone_source_x,
                mapsquare_source_y,
                zone_source_y,
                mapsquare_destination_x,
                zone_destination_x,
                mapsquare_destination_y,
                zone_destination_y,
            } => WorldMapSection::ZoneSingle(ZoneSingleSection {
                level,
                levels_count,
                mapsquare_source_x,
                zone_source_x,
                mapsquare_source_y,
                zone_source_y,
                mapsquare_destination_x,
                zone_destination_x,
                mapsquare_destination_y,
                zone_destination_y,
            }),
            SectionConfig::ZoneMulti {
                level,
                levels_count,
                mapsquare_source_x,
                zone_source_min_x,
                zone_source_max_x,
                mapsquare_source_y,
                zone_source_min_y,
                zone_source_max_y,
                mapsquare_destination_x,
                zone_destination_min_x,
                zone_destination_max_x,
                mapsquare_destination_y,
                zone_destination_min_y,
                zone_destination_max_y,
            } => WorldMapSection::ZoneMulti(ZoneMultiSection {
                level,
                levels_count,
                mapsquare_source_x,
                zone_source_min_x,
                zone_source_max_x,
                mapsquare_source_y,
                zone_source_min_y,
                zone_source_max_y,
                mapsquare_destination_x,
                zone_destination_min_x,
                zone_destination_max_x,
                mapsquare_destination_y,
                zone_destination_min_y,
                zone_destination_max_y,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_area_config() {
        let raw = r#"
            [logging]
            level = "debug"

            [pack]
            cache_dir = "out"
            brightness = 0.8
            blend_borders_separately = true

            [[area]]
            name = "worldmap.zanaris"
            display_name = "Zanaris"
            origin = { x = 2450, y = 4470 }
            zoom = 75

            [[area.sections]]
            type = "mapsquare-single"
            mapsquare_source_x = 38
            mapsquare_source_y = 69
            mapsquare_destination_x = 38
            mapsquare_destination_y = 69

            [[area.elements]]
            element_id = 7
            x = 2437
            y = 4440
        "#;
        let config: PackerConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.pack.cache_dir, "out");
        assert!(config.pack.blend_borders_separately);
        assert_eq!(config.areas.len(), 1);

        let details = config.areas[0].details();
        assert_eq!(details.internal_name, "zanaris");
        assert_eq!(details.zoom, 75);
        assert_eq!(details.sections.len(), 1);
        details.sections[0].verify().unwrap();

        let elements = config.areas[0].map_elements();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].location.x(), 2437);
    }

    #[test]
    fn defaults_apply() {
        let raw = r#"
            [[area]]
            name = "worldmap.mole"
            display_name = "Mole hole"
            origin = { x = 1760, y = 5183, level = 0 }
        "#;
        let config: PackerConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.pack.cache_dir, "cache");
        let details = config.areas[0].details();
        assert_eq!(details.zoom, 100);
        assert_eq!(details.background_colour, 0);
        assert!(details.sections.is_empty());
    }

    #[test]
    fn zone_section_variant_parses() {
        let raw = r#"
            type = "zone-multi"
            level = 0
            levels_count = 2
            mapsquare_source_x = 33
            zone_source_min_x = 1
            zone_source_max_x = 3
            mapsquare_source_y = 34
            zone_source_min_y = 2
            zone_source_max_y = 5
            mapsquare_destination_x = 35
            zone_destination_min_x = 4
            zone_destination_max_x = 6
            mapsquare_destination_y = 36
            zone_destination_min_y = 0
            zone_destination_max_y = 3
        "#;
        let section: SectionConfig = toml::from_str(raw).unwrap();
        let section = section.section();
        section.verify().unwrap();
        assert_eq!(section.levels_count(), 2);
    }
}
