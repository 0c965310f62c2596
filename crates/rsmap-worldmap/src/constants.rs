//! Archive layout, grid dimensions and the fixed area-name table.

/// Archive holding per-block geography groups.
pub const GEOGRAPHY_ARCHIVE: i32 = 18;
/// Archive holding details / compositemap / compositetexture groups.
pub const DATA_ARCHIVE: i32 = 19;
/// Archive holding per-mapsquare ground images.
pub const GROUND_ARCHIVE: i32 = 20;

pub const DETAILS_GROUP: &str = "details";
pub const COMPOSITE_MAP_GROUP: &str = "compositemap";
pub const COMPOSITE_TEXTURE_GROUP: &str = "compositetexture";
pub const LABELS_FILE: &str = "labels";

pub const MAX_LEVELS: usize = 4;
pub const MAPSQUARE_SIZE: usize = 64;
pub const ZONE_SIZE: usize = 8;

/// Per-tile landscape flags.
pub mod flags {
    pub const BLOCKED: i32 = 0x1;
    /// Bridge: the tile's upper-level content visually belongs one level down.
    pub const LINK_BELOW: i32 = 0x2;
    pub const REMOVE_ROOF: i32 = 0x4;
    /// Content at this level is treated as visible from level 0.
    pub const VISIBLE_BELOW: i32 = 0x8;
    pub const FORCE_HIGH_DETAIL: i32 = 0x10;
}

/// The fixed area name → id table. Read-only shared data; ids are stable
/// across the cache ecosystem.
pub static AREA_IDS: &[(&str, i32)] = &[
    ("main", 0),
    ("ancient_cavern", 1),
    ("ardougne_underground", 2),
    ("asgarnia_ice_dungeon", 3),
    ("braindeath_island", 4),
    ("dorgeshkaan", 5),
    ("dwarven_mines", 6),
    ("godwars", 7),
    ("ghorrock_prison", 8),
    ("karamja_underground", 9),
    ("keldagrim", 10),
    ("miscellania_underground", 11),
    ("misthalin_underground", 12),
    ("mole", 13),
    ("morytania_underground", 14),
    ("mosleharmless_cave", 15),
    ("ourania", 16),
    ("slayer_cave", 17),
    ("sos", 18),
    ("stronghold_underground", 19),
    ("taverley_underground", 20),
    ("tolna", 21),
    ("troll_stronghold", 22),
    ("tzhaar_area", 23),
    ("undead_dungeon", 24),
    ("waterbirth", 25),
    ("wilderness_dungeons", 26),
    ("yanille_underground", 27),
    ("zanaris", 28),
    ("prifddinas", 29),
    ("fossil_underground", 30),
    ("feldip_underground", 31),
    ("kourend_underground", 32),
    ("kebos_underground", 33),
    ("prifddinas_underground", 34),
    ("grand_library", 35),
    ("br_default", 36),
    ("tutorial_2", 37),
    ("br_dark_varrock", 38),
    ("camdozaal", 39),
    ("the_abyss", 40),
    ("lassar_undercity", 41),
    ("desert_underground", 42),
];

/// Resolve an area name (with or without the `worldmap.` prefix) to its id.
/// Unknown names map to the main surface id.
pub fn area_id(name: &str) -> i32 {
    let key = name.strip_prefix("worldmap.").unwrap_or(name);
    AREA_IDS
        .iter()
        .find(|(entry, _)| *entry == key)
        .map(|&(_, id)| id)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_id_lookup() {
        assert_eq!(area_id("main"), 0);
        assert_eq!(area_id("worldmap.zanaris"), 28);
        assert_eq!(area_id("desert_underground"), 42);
        assert_eq!(area_id("no_such_area"), 0);
    }
}
