mod assets;
mod map_file;
mod tileset_file;

pub use assets::{
    load_sprite_sheet, validate_asset_path, AssetError, AssetPathError, AssetRegistry,
    SpriteManifestEntry, SpriteSheet,
};
pub use map_file::{load_map, parse_map, MapLoadError, EVENTS_LAYER, TERRAIN_LAYER, ZONES_LAYER};
pub use tileset_file::load_tileset_file;
