use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::math::Vec2;
use crate::tilemap::{GameMap, Rect, TilemapError, ZoneArea, ZoneId};

use super::tileset_file::{build_tileset, load_tileset_file, RawProperty, RawTileset};

pub const TERRAIN_LAYER: &str = "terrain";
pub const ZONES_LAYER: &str = "zones";
pub const EVENTS_LAYER: &str = "events";
const ZONE_PROPERTY: &str = "zone";
const SPAWN_TYPE_PROPERTY: &str = "spawnType";

#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {file} at {path}: {source}")]
    Json {
        file: PathBuf,
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed tileset XML in {file}: {source}")]
    Xml {
        file: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("invalid tileset {file}: {message}")]
    InvalidTileset { file: PathBuf, message: String },
    #[error("unsupported tileset source {tileset_path}")]
    UnknownTileset { tileset_path: PathBuf },
    #[error("map is missing required layer '{name}'")]
    MissingLayer { name: &'static str },
    #[error("layer '{name}' must be a {expected}, found '{found}'")]
    LayerKind {
        name: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("zone object {object_id} has no integer 'zone' property")]
    MissingZoneProperty { object_id: u32 },
    #[error("terrain layer is invalid: {0}")]
    Tilemap(#[from] TilemapError),
}

#[derive(Debug, Deserialize)]
struct RawMap {
    width: u32,
    height: u32,
    #[serde(rename = "tilewidth")]
    tile_width: u32,
    #[serde(rename = "tileheight")]
    tile_height: u32,
    layers: Vec<RawLayer>,
    #[serde(default)]
    tilesets: Vec<RawTilesetRef>,
}

#[derive(Debug, Deserialize)]
struct RawLayer {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    data: Vec<u32>,
    #[serde(default)]
    objects: Vec<RawObject>,
}

#[derive(Debug, Deserialize)]
struct RawObject {
    #[serde(default)]
    id: u32,
    x: f32,
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    polygon: Option<Vec<RawPoint>>,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

impl RawObject {
    fn property(&self, name: &str) -> Option<&RawProperty> {
        self.properties.iter().find(|property| property.name == name)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawPoint {
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
struct RawTilesetRef {
    #[serde(rename = "firstgid")]
    first_gid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    embedded: RawTileset,
}

/// Reads a Tiled JSON map plus every tileset it references. External
/// tileset paths resolve against the map file's directory.
pub fn load_map(path: &Path) -> Result<GameMap, MapLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| MapLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let map = parse_map(&raw, path)?;
    info!(
        path = %path.display(),
        width = map.width(),
        height = map.height(),
        tilesets = map.tilesets().len(),
        zones = map.zones().len(),
        spawners = map.spawners().len(),
        "map_loaded"
    );
    Ok(map)
}

pub fn parse_map(raw: &str, map_path: &Path) -> Result<GameMap, MapLoadError> {
    let parsed: RawMap = parse_json(raw, map_path)?;
    let base_dir = map_path.parent().unwrap_or_else(|| Path::new(""));

    let terrain = required_layer(&parsed.layers, TERRAIN_LAYER, "tilelayer")?;
    let zones = required_layer(&parsed.layers, ZONES_LAYER, "objectgroup")?;
    let events = required_layer(&parsed.layers, EVENTS_LAYER, "objectgroup")?;

    let (width, height) = if terrain.width > 0 && terrain.height > 0 {
        (terrain.width, terrain.height)
    } else {
        (parsed.width, parsed.height)
    };
    let mut map = GameMap::new(
        width,
        height,
        parsed.tile_width,
        parsed.tile_height,
        terrain.data.clone(),
    )?;

    for reference in parsed.tilesets {
        let tileset = match reference.source {
            Some(source) => load_tileset_file(&base_dir.join(source), reference.first_gid)?,
            None => build_tileset(reference.embedded, reference.first_gid, base_dir, map_path)?,
        };
        debug!(
            name = %tileset.name,
            first_gid = tileset.first_gid,
            slopes = tileset.slope_count(),
            "tileset_loaded"
        );
        map.add_tileset(tileset);
    }

    for object in &zones.objects {
        let Some(zone) = object
            .property(ZONE_PROPERTY)
            .and_then(RawProperty::as_f32)
            .filter(|value| *value >= 0.0 && value.fract() == 0.0)
        else {
            return Err(MapLoadError::MissingZoneProperty {
                object_id: object.id,
            });
        };
        map.add_zone_area(ZoneId(zone as u32), zone_area(object));
    }

    for object in &events.objects {
        let Some(spawn_type) = object
            .property(SPAWN_TYPE_PROPERTY)
            .and_then(|property| property.value.as_str())
        else {
            warn!(object_id = object.id, "event_without_spawn_type");
            continue;
        };
        map.add_spawner(Vec2::new(object.x, object.y), spawn_type);
    }

    Ok(map)
}

fn zone_area(object: &RawObject) -> ZoneArea {
    match &object.polygon {
        Some(points) => ZoneArea::Polygon(
            points
                .iter()
                .map(|point| Vec2::new(object.x + point.x, object.y + point.y))
                .collect(),
        ),
        None => ZoneArea::Rect(Rect::new(object.x, object.y, object.width, object.height)),
    }
}

fn required_layer<'a>(
    layers: &'a [RawLayer],
    name: &'static str,
    expected: &'static str,
) -> Result<&'a RawLayer, MapLoadError> {
    let layer = layers
        .iter()
        .find(|layer| layer.name == name)
        .ok_or(MapLoadError::MissingLayer { name })?;
    if layer.kind != expected {
        return Err(MapLoadError::LayerKind {
            name,
            expected,
            found: layer.kind.clone(),
        });
    }
    Ok(layer)
}

pub(crate) fn parse_json<T: DeserializeOwned>(raw: &str, file: &Path) -> Result<T, MapLoadError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        MapLoadError::Json {
            file: file.to_path_buf(),
            path,
            source: error.into_inner(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::{SlopeProfile, Zone};
    use std::fs;
    use tempfile::TempDir;

    fn map_json(layers: &str, tilesets: &str) -> String {
        format!(
            r#"{{ "width": 4, "height": 2, "tilewidth": 16, "tileheight": 16,
                 "layers": [{layers}], "tilesets": [{tilesets}] }}"#
        )
    }

    const TERRAIN: &str = r#"{ "name": "terrain", "type": "tilelayer", "width": 4, "height": 2,
                               "data": [0, 0, 0, 2, 1, 5, 1, 1] }"#;
    const ZONES: &str = r#"{ "name": "zones", "type": "objectgroup", "objects": [
        { "id": 1, "x": 0, "y": 0, "width": 32, "height": 32,
          "properties": [{ "name": "zone", "type": "int", "value": 1 }] },
        { "id": 2, "x": 32, "y": 0,
          "polygon": [{ "x": 0, "y": 0 }, { "x": 32, "y": 0 }, { "x": 32, "y": 32 }, { "x": 0, "y": 32 }],
          "properties": [{ "name": "zone", "type": "int", "value": 2 }] }
    ] }"#;
    const EVENTS: &str = r#"{ "name": "events", "type": "objectgroup", "objects": [
        { "id": 3, "x": 40, "y": 8, "point": true,
          "properties": [{ "name": "spawnType", "type": "string", "value": "turret" }] },
        { "id": 4, "x": 8, "y": 8, "point": true }
    ] }"#;
    const EMBEDDED_TILESET: &str = r#"{ "firstgid": 1, "name": "terrain", "tilewidth": 16,
        "tileheight": 16, "columns": 4, "tilecount": 16,
        "tiles": [{ "id": 4, "properties": [
            { "name": "slopeLeft", "type": "int", "value": 16 },
            { "name": "slopeRight", "type": "int", "value": 0 }
        ] }] }"#;

    fn parse(layers: &str, tilesets: &str) -> Result<GameMap, MapLoadError> {
        parse_map(&map_json(layers, tilesets), Path::new("maps/test.json"))
    }

    #[test]
    fn parses_layers_zones_spawners_and_embedded_tileset() {
        let layers = [TERRAIN, ZONES, EVENTS].join(",");
        let map = parse(&layers, EMBEDDED_TILESET).expect("map");

        assert_eq!((map.width(), map.height()), (4, 2));
        assert_eq!(
            map.slope_at(Vec2::new(20.0, 20.0), Vec2::ZERO),
            Some(SlopeProfile::new(16.0, 0.0))
        );
        assert_eq!(map.zones().len(), 2);
        assert_eq!(
            map.zone_containing(Vec2::new(50.0, 10.0)).map(Zone::id),
            Some(ZoneId(2))
        );
        assert_eq!(map.spawners().len(), 1);
        assert_eq!(map.spawners()[0].zone, Some(ZoneId(2)));
    }

    #[test]
    fn missing_required_layer_is_fatal() {
        for (layers, missing) in [
            ([ZONES, EVENTS].join(","), TERRAIN_LAYER),
            ([TERRAIN, EVENTS].join(","), ZONES_LAYER),
            ([TERRAIN, ZONES].join(","), EVENTS_LAYER),
        ] {
            let err = parse(&layers, EMBEDDED_TILESET).expect_err("err");
            assert!(
                matches!(err, MapLoadError::MissingLayer { name } if name == missing),
                "{err}"
            );
        }
    }

    #[test]
    fn layer_of_wrong_kind_is_rejected() {
        let zones_as_tiles = r#"{ "name": "zones", "type": "tilelayer", "data": [] }"#;
        let layers = [TERRAIN, zones_as_tiles, EVENTS].join(",");

        let err = parse(&layers, EMBEDDED_TILESET).expect_err("err");
        assert!(matches!(err, MapLoadError::LayerKind { name: "zones", .. }), "{err}");
    }

    #[test]
    fn zone_without_zone_property_is_rejected() {
        let zones = r#"{ "name": "zones", "type": "objectgroup", "objects": [
            { "id": 9, "x": 0, "y": 0, "width": 8, "height": 8 } ] }"#;
        let layers = [TERRAIN, zones, EVENTS].join(",");

        let err = parse(&layers, EMBEDDED_TILESET).expect_err("err");
        assert!(
            matches!(err, MapLoadError::MissingZoneProperty { object_id: 9 }),
            "{err}"
        );
    }

    #[test]
    fn wrong_terrain_size_surfaces_tilemap_error() {
        let terrain = r#"{ "name": "terrain", "type": "tilelayer", "width": 4, "height": 2,
                           "data": [0, 0, 0] }"#;
        let layers = [terrain, ZONES, EVENTS].join(",");

        let err = parse(&layers, EMBEDDED_TILESET).expect_err("err");
        assert!(matches!(err, MapLoadError::Tilemap(_)), "{err}");
    }

    #[test]
    fn json_errors_carry_the_field_path() {
        let err = parse_map(
            r#"{ "width": 4, "height": 2, "tilewidth": "sixteen", "tileheight": 16, "layers": [] }"#,
            Path::new("bad.json"),
        )
        .expect_err("err");
        match err {
            MapLoadError::Json { path, .. } => assert_eq!(path, "tilewidth"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_map_resolves_external_tileset_next_to_map() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            dir.path().join("terrain.json"),
            r#"{ "name": "terrain", "tilewidth": 16, "tileheight": 16, "columns": 4, "tilecount": 16 }"#,
        )
        .expect("write tileset");
        let layers = [TERRAIN, ZONES, EVENTS].join(",");
        let map_path = dir.path().join("level.json");
        fs::write(
            &map_path,
            map_json(&layers, r#"{ "firstgid": 1, "source": "terrain.json" }"#),
        )
        .expect("write map");

        let map = load_map(&map_path).expect("map");

        assert_eq!(map.tilesets().len(), 1);
        assert_eq!(map.terrain_at(Vec2::new(56.0, 0.0), Vec2::ZERO), Some(1));
    }

    #[test]
    fn load_map_reports_missing_file() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_map(&dir.path().join("absent.json")).expect_err("err");
        assert!(matches!(err, MapLoadError::Io { .. }), "{err}");
    }
}
