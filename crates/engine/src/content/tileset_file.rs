use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};
use serde::Deserialize;
use serde_json::Value;

use crate::tilemap::{SlopeProfile, Tileset};

use super::map_file::{parse_json, MapLoadError};

const SLOPE_LEFT_PROPERTY: &str = "slopeLeft";
const SLOPE_RIGHT_PROPERTY: &str = "slopeRight";

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawTileset {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "tilewidth")]
    pub tile_width: u32,
    #[serde(default, rename = "tileheight")]
    pub tile_height: u32,
    #[serde(default)]
    pub columns: u32,
    #[serde(default, rename = "tilecount")]
    pub tile_count: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tiles: Vec<RawTile>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawTile {
    pub id: u32,
    #[serde(default)]
    pub properties: Vec<RawProperty>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawProperty {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl RawProperty {
    pub fn as_f32(&self) -> Option<f32> {
        match &self.value {
            Value::Number(number) => number.as_f64().map(|value| value as f32),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Loads an external tileset referenced from a map. `.json` and `.tsx` are
/// supported; anything else is rejected.
pub fn load_tileset_file(path: &Path, first_gid: u32) -> Result<Tileset, MapLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| MapLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") | Some("tsj") => {
            let parsed: RawTileset = parse_json(&raw, path)?;
            build_tileset(parsed, first_gid, base_dir, path)
        }
        Some("tsx") => parse_tsx_tileset(&raw, first_gid, base_dir, path),
        _ => Err(MapLoadError::UnknownTileset {
            tileset_path: path.to_path_buf(),
        }),
    }
}

pub(crate) fn build_tileset(
    raw: RawTileset,
    first_gid: u32,
    base_dir: &Path,
    file: &Path,
) -> Result<Tileset, MapLoadError> {
    if raw.tile_width == 0 || raw.tile_height == 0 {
        return Err(invalid(file, "tilewidth and tileheight must be non-zero"));
    }
    let mut tileset = Tileset::new(first_gid, raw.name, raw.tile_width, raw.tile_height)
        .with_columns(raw.columns, raw.tile_count);
    if let Some(image) = raw.image {
        tileset = tileset.with_image(base_dir.join(image));
    }
    for tile in &raw.tiles {
        let left = tile
            .properties
            .iter()
            .find(|property| property.name == SLOPE_LEFT_PROPERTY);
        let right = tile
            .properties
            .iter()
            .find(|property| property.name == SLOPE_RIGHT_PROPERTY);
        if let Some(slope) = slope_from_pair(
            tile.id,
            left.map(|property| property.as_f32()),
            right.map(|property| property.as_f32()),
            file,
        )? {
            tileset.insert_slope(tile.id, slope);
        }
    }
    Ok(tileset)
}

fn slope_from_pair(
    tile_id: u32,
    left: Option<Option<f32>>,
    right: Option<Option<f32>>,
    file: &Path,
) -> Result<Option<SlopeProfile>, MapLoadError> {
    match (left, right) {
        (None, None) => Ok(None),
        (Some(Some(left)), Some(Some(right))) => Ok(Some(SlopeProfile::new(left, right))),
        (Some(None), _) | (_, Some(None)) => Err(invalid(
            file,
            &format!("tile {tile_id} has a non-numeric slope property"),
        )),
        _ => Err(invalid(
            file,
            &format!("tile {tile_id} must define both {SLOPE_LEFT_PROPERTY} and {SLOPE_RIGHT_PROPERTY}"),
        )),
    }
}

fn parse_tsx_tileset(
    raw: &str,
    first_gid: u32,
    base_dir: &Path,
    file: &Path,
) -> Result<Tileset, MapLoadError> {
    let doc = Document::parse(raw).map_err(|source| MapLoadError::Xml {
        file: file.to_path_buf(),
        source,
    })?;
    let root = doc.root_element();
    if root.tag_name().name() != "tileset" {
        return Err(invalid(file, "root element must be <tileset>"));
    }

    let mut parsed = RawTileset {
        name: root.attribute("name").unwrap_or_default().to_string(),
        tile_width: numeric_attribute(root, "tilewidth", file)?.unwrap_or(0),
        tile_height: numeric_attribute(root, "tileheight", file)?.unwrap_or(0),
        columns: numeric_attribute(root, "columns", file)?.unwrap_or(0),
        tile_count: numeric_attribute(root, "tilecount", file)?.unwrap_or(0),
        image: None,
        tiles: Vec::new(),
    };

    for child in root.children().filter(|node| node.is_element()) {
        match child.tag_name().name() {
            "image" => parsed.image = child.attribute("source").map(str::to_string),
            "tile" => {
                let Some(id) = numeric_attribute(child, "id", file)? else {
                    return Err(invalid(file, "<tile> is missing its id attribute"));
                };
                parsed.tiles.push(RawTile {
                    id,
                    properties: tsx_properties(child),
                });
            }
            _ => {}
        }
    }

    build_tileset(parsed, first_gid, base_dir, file)
}

fn tsx_properties(tile: Node<'_, '_>) -> Vec<RawProperty> {
    tile.children()
        .filter(|node| node.has_tag_name("properties"))
        .flat_map(|properties| properties.children())
        .filter(|node| node.has_tag_name("property"))
        .filter_map(|property| {
            let name = property.attribute("name")?;
            let value = property.attribute("value").unwrap_or_default();
            Some(RawProperty {
                name: name.to_string(),
                value: Value::String(value.to_string()),
            })
        })
        .collect()
}

fn numeric_attribute(
    node: Node<'_, '_>,
    name: &str,
    file: &Path,
) -> Result<Option<u32>, MapLoadError> {
    let Some(raw) = node.attribute(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| invalid(file, &format!("attribute {name}='{raw}' is not a non-negative integer")))
}

fn invalid(file: &Path, message: &str) -> MapLoadError {
    MapLoadError::InvalidTileset {
        file: file.to_path_buf(),
        message: message.to_string(),
    }
}
