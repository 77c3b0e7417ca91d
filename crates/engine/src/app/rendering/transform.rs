use crate::app::Camera;
use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Inclusive-exclusive pixel rectangle in frame-buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ClipRect {
    pub fn of_viewport(viewport: Viewport) -> Self {
        Self {
            left: 0,
            top: 0,
            right: viewport.width as i32,
            bottom: viewport.height as i32,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    pub fn intersect(&self, other: ClipRect) -> ClipRect {
        ClipRect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }
}

pub fn world_to_screen_px(world: Vec2, camera: &Camera) -> (i32, i32) {
    let screen = camera.world_to_screen(world);
    (screen.x.floor() as i32, screen.y.floor() as i32)
}

/// Inclusive tile column/row range whose pixels intersect the camera viewport.
pub fn visible_tile_range(
    camera: &Camera,
    tile_size: (u32, u32),
    grid_size: (u32, u32),
) -> Option<((u32, u32), (u32, u32))> {
    let (tile_w, tile_h) = (tile_size.0.max(1) as f32, tile_size.1.max(1) as f32);
    let top_left = camera.screen_to_world(Vec2::ZERO);
    let bottom_right = camera.screen_to_world(camera.viewport());

    let first_column = (top_left.x / tile_w).floor().max(0.0);
    let first_row = (top_left.y / tile_h).floor().max(0.0);
    let last_column = ((bottom_right.x / tile_w).ceil() - 1.0).min(grid_size.0 as f32 - 1.0);
    let last_row = ((bottom_right.y / tile_h).ceil() - 1.0).min(grid_size.1 as f32 - 1.0);
    if last_column < first_column || last_row < first_row {
        return None;
    }
    Some((
        (first_column as u32, first_row as u32),
        (last_column as u32, last_row as u32),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_to_screen_applies_translation() {
        let mut camera = Camera::new(384.0, 288.0);
        camera.update_for_zone(None, Vec2::new(500.0, 100.0));

        assert_eq!(world_to_screen_px(Vec2::new(500.0, 100.0), &camera), (192, 144));
        assert_eq!(world_to_screen_px(Vec2::new(490.5, 90.5), &camera), (182, 134));
    }

    #[test]
    fn visible_tiles_cover_viewport_and_clamp_to_grid() {
        let mut camera = Camera::new(64.0, 32.0);
        camera.update_for_zone(None, Vec2::new(40.0, 24.0));

        let range = visible_tile_range(&camera, (16, 16), (100, 100)).expect("range");
        assert_eq!(range, ((0, 0), (4, 2)));

        let clipped = visible_tile_range(&camera, (16, 16), (2, 1)).expect("range");
        assert_eq!(clipped, ((0, 0), (1, 0)));
    }

    #[test]
    fn no_tiles_visible_when_grid_is_off_screen() {
        let mut camera = Camera::new(64.0, 32.0);
        camera.update_for_zone(None, Vec2::new(-500.0, -500.0));
        assert_eq!(visible_tile_range(&camera, (16, 16), (10, 10)), None);
    }

    #[test]
    fn clip_rect_intersection() {
        let a = ClipRect::of_viewport(Viewport {
            width: 512,
            height: 288,
        });
        let playfield = ClipRect {
            left: 0,
            top: 0,
            right: 384,
            bottom: 288,
        };
        let clip = a.intersect(playfield);
        assert!(clip.contains(383, 0));
        assert!(!clip.contains(384, 0));
        assert!(!clip.is_empty());
    }
}
