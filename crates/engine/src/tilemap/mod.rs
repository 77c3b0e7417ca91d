mod tileset;
mod zone;

use thiserror::Error;

use crate::hitbox::AabbHitbox;
use crate::math::Vec2;

pub use tileset::{slope_height, SlopeProfile, Tileset};
pub use zone::{Rect, Spawner, Zone, ZoneArea, ZoneId};

/// Tiled stores horizontal/vertical/diagonal flip flags in the top three bits.
pub const TILE_FLIP_FLAGS_MASK: u32 = 0xE000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainTile {
    pub gid: u32,
    pub tileset: usize,
    pub local_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("tile size must be non-zero, got {width}x{height}")]
    ZeroTileSize { width: u32, height: u32 },
}

/// Terrain grid plus the zones and spawn markers authored on top of it.
///
/// Grid convention:
/// - tile (0,0) has its top-left corner at world (0,0) and y grows downward.
/// - the tile containing world `p` is `(floor(p.x / tile_width), floor(p.y / tile_height))`.
/// - lookups outside the grid resolve to empty space.
#[derive(Debug, Clone)]
pub struct GameMap {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    terrain: Vec<u32>,
    tilesets: Vec<Tileset>,
    zones: Vec<Zone>,
    spawners: Vec<Spawner>,
}

impl GameMap {
    pub fn new(
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
        terrain: Vec<u32>,
    ) -> Result<Self, TilemapError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(TilemapError::ZeroTileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        let expected = width as usize * height as usize;
        let actual = terrain.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tile_width,
            tile_height,
            terrain: terrain
                .into_iter()
                .map(|gid| gid & !TILE_FLIP_FLAGS_MASK)
                .collect(),
            tilesets: Vec::new(),
            zones: Vec::new(),
            spawners: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn width_px(&self) -> f32 {
        (self.width * self.tile_width) as f32
    }

    pub fn height_px(&self) -> f32 {
        (self.height * self.tile_height) as f32
    }

    /// Row-major global tile ids with flip flags already stripped.
    pub fn terrain(&self) -> &[u32] {
        &self.terrain
    }

    pub fn add_tileset(&mut self, tileset: Tileset) {
        let at = self
            .tilesets
            .partition_point(|existing| existing.first_gid <= tileset.first_gid);
        self.tilesets.insert(at, tileset);
    }

    pub fn with_tileset(mut self, tileset: Tileset) -> Self {
        self.add_tileset(tileset);
        self
    }

    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    /// Index of the tileset with the greatest `first_gid` not exceeding `gid`.
    pub fn tileset_for_gid(&self, gid: u32) -> Option<usize> {
        if gid == 0 {
            return None;
        }
        let after = self
            .tilesets
            .partition_point(|tileset| tileset.first_gid <= gid);
        after.checked_sub(1)
    }

    /// Adds `area` to zone `id`, creating the zone on first use. Registration
    /// order of zones is the order their first area was added.
    pub fn add_zone_area(&mut self, id: ZoneId, area: ZoneArea) {
        match self.zones.iter_mut().find(|zone| zone.id() == id) {
            Some(zone) => zone.push_area(area),
            None => self.zones.push(Zone::new(id, area)),
        }
        self.resolve_spawner_zones();
    }

    pub fn add_spawner(&mut self, position: Vec2, spawn_type: impl Into<String>) {
        let zone = first_zone_containing(&self.zones, position);
        self.spawners.push(Spawner {
            position,
            spawn_type: spawn_type.into(),
            zone,
        });
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id() == id)
    }

    pub fn spawners(&self) -> &[Spawner] {
        &self.spawners
    }

    pub fn spawners_in_zone(&self, id: ZoneId) -> impl Iterator<Item = &Spawner> + '_ {
        self.spawners
            .iter()
            .filter(move |spawner| spawner.zone == Some(id))
    }

    /// First zone in registration order with an area containing `world`.
    /// Overlapping zones resolve to whichever was registered first.
    pub fn zone_containing(&self, world: Vec2) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.contains(world))
    }

    pub fn tile_coords_at(&self, world: Vec2) -> Option<(u32, u32)> {
        let column = (world.x / self.tile_width as f32).floor();
        let row = (world.y / self.tile_height as f32).floor();
        if !column.is_finite() || !row.is_finite() || column < 0.0 || row < 0.0 {
            return None;
        }
        if column >= self.width as f32 || row >= self.height as f32 {
            return None;
        }
        Some((column as u32, row as u32))
    }

    pub fn tile_index_at(&self, world: Vec2) -> Option<usize> {
        let (column, row) = self.tile_coords_at(world)?;
        Some(row as usize * self.width as usize + column as usize)
    }

    pub fn tile_at(&self, world: Vec2) -> Option<TerrainTile> {
        let gid = self.terrain[self.tile_index_at(world)?];
        if gid == 0 {
            return None;
        }
        let tileset = self.tileset_for_gid(gid)?;
        Some(TerrainTile {
            gid,
            tileset,
            local_id: gid - self.tilesets[tileset].first_gid,
        })
    }

    /// Local id of the tile at `world + offset`, or `None` for empty space.
    pub fn terrain_at(&self, world: Vec2, offset: Vec2) -> Option<u32> {
        self.tile_at(world + offset).map(|tile| tile.local_id)
    }

    pub fn slope_properties(&self, tile: TerrainTile) -> Option<SlopeProfile> {
        self.tilesets.get(tile.tileset)?.slope(tile.local_id)
    }

    pub fn slope_at(&self, world: Vec2, offset: Vec2) -> Option<SlopeProfile> {
        let tile = self.tile_at(world + offset)?;
        self.slope_properties(tile)
    }

    /// True when the tile at `world + offset` is a solid block without a ramp.
    pub fn is_solid_block(&self, world: Vec2, offset: Vec2) -> bool {
        match self.tile_at(world + offset) {
            Some(tile) => self.slope_properties(tile).is_none(),
            None => false,
        }
    }

    /// Binary blocked test for entities without slope handling. Samples one
    /// point per tile across the box on both axes plus its four corners.
    pub fn collides_with_solid(&self, hitbox: &AabbHitbox) -> bool {
        let top_left = hitbox.top_left();
        let bottom_right = hitbox.bottom_right();
        let corners = [
            top_left,
            Vec2::new(bottom_right.x, top_left.y),
            Vec2::new(top_left.x, bottom_right.y),
            bottom_right,
        ];
        if corners.iter().any(|&corner| self.tile_at(corner).is_some()) {
            return true;
        }

        let step_x = self.tile_width as f32;
        let step_y = self.tile_height as f32;
        let mut y = top_left.y;
        while y <= bottom_right.y {
            let mut x = top_left.x;
            while x <= bottom_right.x {
                if self.tile_at(Vec2::new(x, y)).is_some() {
                    return true;
                }
                x += step_x;
            }
            y += step_y;
        }
        false
    }

    fn resolve_spawner_zones(&mut self) {
        for spawner in &mut self.spawners {
            spawner.zone = first_zone_containing(&self.zones, spawner.position);
        }
    }
}

fn first_zone_containing(zones: &[Zone], world: Vec2) -> Option<ZoneId> {
    zones
        .iter()
        .find(|zone| zone.contains(world))
        .map(Zone::id)
}
