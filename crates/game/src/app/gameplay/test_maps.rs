use engine::tilemap::Rect;
use engine::{GameMap, SlopeProfile, Tileset, Vec2, ZoneArea, ZoneId};

/// Builds a 16x16-tile map from ASCII rows. `#` is solid, `/` rises to the
/// right, `\` falls to the right, anything else is empty.
pub(crate) fn map_from_rows(rows: &[&str]) -> GameMap {
    let height = rows.len() as u32;
    let width = rows.first().map_or(0, |row| row.chars().count()) as u32;
    let terrain = rows
        .iter()
        .flat_map(|row| {
            row.chars().map(|cell| match cell {
                '#' => 1,
                '/' => 2,
                '\\' => 3,
                _ => 0,
            })
        })
        .collect();
    GameMap::new(width, height, 16, 16, terrain)
        .expect("rows form a rectangular map")
        .with_tileset(
            Tileset::new(1, "terrain", 16, 16)
                .with_slope(1, SlopeProfile::new(16.0, 0.0))
                .with_slope(2, SlopeProfile::new(0.0, 16.0)),
        )
}

/// Adds a rectangular zone covering the given tile columns over the full map height.
pub(crate) fn add_column_zone(map: &mut GameMap, id: u32, first_column: u32, columns: u32) {
    map.add_zone_area(
        ZoneId(id),
        ZoneArea::Rect(Rect::new(
            first_column as f32 * 16.0,
            0.0,
            columns as f32 * 16.0,
            map.height_px(),
        )),
    );
}

pub(crate) fn add_spawner(map: &mut GameMap, x: f32, y: f32, spawn_type: &str) {
    map.add_spawner(Vec2::new(x, y), spawn_type);
}
