use std::collections::HashMap;
use std::path::PathBuf;

use crate::math::lerp;

/// Per-tile ramp: the walkable surface sits `slope_left` pixels below the
/// tile's top edge at its left side and `slope_right` pixels at its right side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeProfile {
    pub slope_left: f32,
    pub slope_right: f32,
}

impl SlopeProfile {
    pub fn new(slope_left: f32, slope_right: f32) -> Self {
        Self {
            slope_left,
            slope_right,
        }
    }

    /// Surface height at `fraction` (0..1) of the way across the tile.
    pub fn height_at(&self, fraction: f32) -> f32 {
        slope_height(self.slope_left, self.slope_right, fraction)
    }
}

pub fn slope_height(slope_left: f32, slope_right: f32, fraction: f32) -> f32 {
    lerp(slope_left, slope_right, fraction)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tileset {
    pub first_gid: u32,
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub tile_count: u32,
    /// Image path resolved against the tileset file's directory.
    pub image: Option<PathBuf>,
    slopes: HashMap<u32, SlopeProfile>,
}

impl Tileset {
    pub fn new(first_gid: u32, name: impl Into<String>, tile_width: u32, tile_height: u32) -> Self {
        Self {
            first_gid,
            name: name.into(),
            tile_width,
            tile_height,
            columns: 1,
            tile_count: 0,
            image: None,
            slopes: HashMap::new(),
        }
    }

    pub fn with_columns(mut self, columns: u32, tile_count: u32) -> Self {
        self.columns = columns.max(1);
        self.tile_count = tile_count;
        self
    }

    pub fn with_image(mut self, image: impl Into<PathBuf>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_slope(mut self, local_id: u32, slope: SlopeProfile) -> Self {
        self.slopes.insert(local_id, slope);
        self
    }

    pub fn insert_slope(&mut self, local_id: u32, slope: SlopeProfile) {
        self.slopes.insert(local_id, slope);
    }

    pub fn slope(&self, local_id: u32) -> Option<SlopeProfile> {
        self.slopes.get(&local_id).copied()
    }

    pub fn slope_count(&self) -> usize {
        self.slopes.len()
    }

    /// Source rectangle origin of `local_id` inside the tileset image.
    pub fn image_origin_px(&self, local_id: u32) -> (u32, u32) {
        let columns = self.columns.max(1);
        (
            (local_id % columns) * self.tile_width,
            (local_id / columns) * self.tile_height,
        )
    }
}
