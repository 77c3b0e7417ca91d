use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{Camera, DrawItem, DrawSpace, SceneWorld};
use crate::content::SpriteSheet;
use crate::math::Vec2;
use crate::tilemap::{GameMap, SlopeProfile};

use super::transform::{visible_tile_range, world_to_screen_px, ClipRect, Viewport};

const CLEAR_COLOR: [u8; 4] = [203, 209, 190, 255];
const PANEL_COLOR: [u8; 4] = [28, 30, 38, 255];
const SOLID_FALLBACK_COLOR: [u8; 4] = [88, 96, 84, 255];
const SLOPE_FALLBACK_COLOR: [u8; 4] = [112, 124, 104, 255];

/// Software renderer into a fixed-size frame buffer that `pixels` scales to
/// the window. The left `playfield_width` columns show the world; the rest is
/// a side panel for screen-space items.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    buffer: Viewport,
    playfield_width: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, buffer: Viewport, playfield_width: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), buffer, size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            buffer,
            playfield_width: playfield_width.min(buffer.width),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), self.buffer, width, height)?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        buffer: Viewport,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width.max(1), surface_height.max(1), window);
        Pixels::new(buffer.width, buffer.height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        let buffer = self.buffer;
        let frame = self.pixels.frame_mut();
        compose_frame(frame, buffer, self.playfield_width, world);
        self.pixels.render()
    }
}

pub(crate) fn compose_frame(
    frame: &mut [u8],
    buffer: Viewport,
    playfield_width: u32,
    world: &SceneWorld,
) {
    let full = ClipRect::of_viewport(buffer);
    let playfield = full.intersect(ClipRect {
        left: 0,
        top: 0,
        right: playfield_width as i32,
        bottom: buffer.height as i32,
    });
    let panel = full.intersect(ClipRect {
        left: playfield_width as i32,
        ..full
    });

    fill_rect(frame, buffer, playfield, playfield, CLEAR_COLOR);
    fill_rect(frame, buffer, panel, panel, PANEL_COLOR);

    if let Some(map) = world.map() {
        draw_map(frame, buffer, playfield, world, map);
    }

    for item in world.draw_list() {
        match item.space {
            DrawSpace::World => {
                let (x, y) = world_to_screen_px(item.position, world.camera());
                draw_item(frame, buffer, playfield, x, y, item);
            }
            DrawSpace::Screen => {
                draw_item(
                    frame,
                    buffer,
                    full,
                    item.position.x.floor() as i32,
                    item.position.y.floor() as i32,
                    item,
                );
            }
        }
    }
}

fn draw_map(
    frame: &mut [u8],
    buffer: Viewport,
    clip: ClipRect,
    world: &SceneWorld,
    map: &GameMap,
) {
    let camera: &Camera = world.camera();
    let tile_size = (map.tile_width(), map.tile_height());
    let Some(((first_column, first_row), (last_column, last_row))) =
        visible_tile_range(camera, tile_size, (map.width(), map.height()))
    else {
        return;
    };

    for row in first_row..=last_row {
        for column in first_column..=last_column {
            let origin = Vec2::new(
                (column * tile_size.0) as f32,
                (row * tile_size.1) as f32,
            );
            let Some(tile) = map.tile_at(origin) else {
                continue;
            };
            let (x, y) = world_to_screen_px(origin, camera);
            let sheet = world.tileset_sheet(tile.tileset);
            if let (Some(sheet), Some(tileset)) = (sheet, map.tilesets().get(tile.tileset)) {
                let columns = tileset.columns.max(1);
                draw_sprite_frame(
                    frame,
                    buffer,
                    clip,
                    x,
                    y,
                    sheet,
                    tile.local_id % columns,
                    tile.local_id / columns,
                    false,
                );
                continue;
            }
            match map.slope_properties(tile) {
                Some(slope) => draw_slope_fallback(frame, buffer, clip, x, y, tile_size, slope),
                None => fill_rect(
                    frame,
                    buffer,
                    clip,
                    ClipRect {
                        left: x,
                        top: y,
                        right: x + tile_size.0 as i32,
                        bottom: y + tile_size.1 as i32,
                    },
                    SOLID_FALLBACK_COLOR,
                ),
            }
        }
    }
}

fn draw_slope_fallback(
    frame: &mut [u8],
    buffer: Viewport,
    clip: ClipRect,
    left: i32,
    top: i32,
    tile_size: (u32, u32),
    slope: SlopeProfile,
) {
    let width = tile_size.0.max(1);
    for dx in 0..width {
        let fraction = (dx as f32 + 0.5) / width as f32;
        let surface = slope.height_at(fraction).clamp(0.0, tile_size.1 as f32) as i32;
        fill_rect(
            frame,
            buffer,
            clip,
            ClipRect {
                left: left + dx as i32,
                top: top + surface,
                right: left + dx as i32 + 1,
                bottom: top + tile_size.1 as i32,
            },
            SLOPE_FALLBACK_COLOR,
        );
    }
}

fn draw_item(
    frame: &mut [u8],
    buffer: Viewport,
    clip: ClipRect,
    x: i32,
    y: i32,
    item: &DrawItem,
) {
    if let Some(sprite) = &item.sprite {
        draw_sprite_frame(
            frame,
            buffer,
            clip,
            x,
            y,
            &sprite.sheet,
            sprite.column,
            sprite.row,
            sprite.flip_x,
        );
        return;
    }
    let rect = ClipRect {
        left: x,
        top: y,
        right: x + item.size.x.round().max(1.0) as i32,
        bottom: y + item.size.y.round().max(1.0) as i32,
    };
    fill_rect(frame, buffer, clip, rect, item.color);
}

fn write_pixel_rgba_clipped(
    frame: &mut [u8],
    buffer: Viewport,
    clip: ClipRect,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    if !clip.contains(x, y) || x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= buffer.width as usize {
        return;
    }
    let Some(pixel_offset) = y
        .checked_mul(buffer.width as usize)
        .and_then(|row| row.checked_add(x))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(pixel) = frame.get_mut(byte_offset..byte_offset + 4) else {
        return;
    };
    pixel.copy_from_slice(&color);
}

fn fill_rect(frame: &mut [u8], buffer: Viewport, clip: ClipRect, rect: ClipRect, color: [u8; 4]) {
    let visible = rect.intersect(clip);
    if visible.is_empty() {
        return;
    }
    for y in visible.top..visible.bottom {
        for x in visible.left..visible.right {
            write_pixel_rgba_clipped(frame, buffer, clip, x, y, color);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_sprite_frame(
    frame: &mut [u8],
    buffer: Viewport,
    clip: ClipRect,
    left: i32,
    top: i32,
    sheet: &SpriteSheet,
    column: u32,
    row: u32,
    flip_x: bool,
) {
    let (frame_width, frame_height) = sheet.frame_size();
    for dy in 0..frame_height {
        for dx in 0..frame_width {
            let source_x = if flip_x { frame_width - 1 - dx } else { dx };
            let Some(color) = sheet.frame_pixel(column, row, source_x, dy) else {
                continue;
            };
            if color[3] == 0 {
                continue;
            }
            write_pixel_rgba_clipped(
                frame,
                buffer,
                clip,
                left + dx as i32,
                top + dy as i32,
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SpriteRef;
    use crate::tilemap::Tileset;

    const BUFFER: Viewport = Viewport {
        width: 8,
        height: 4,
    };

    fn blank() -> Vec<u8> {
        vec![0; (BUFFER.width * BUFFER.height * 4) as usize]
    }

    fn pixel(frame: &[u8], x: usize, y: usize) -> [u8; 4] {
        let offset = (y * BUFFER.width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn two_frame_sheet() -> SpriteSheet {
        // 2x1 frames of 2x1 pixels: red|green then blue|transparent.
        let rgba = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 0, 0, 0, 0,
        ];
        SpriteSheet::from_rgba(4, 1, rgba, 2, 1).expect("sheet")
    }

    #[test]
    fn fill_rect_respects_clip() {
        let mut frame = blank();
        let clip = ClipRect {
            left: 0,
            top: 0,
            right: 4,
            bottom: 4,
        };
        let rect = ClipRect {
            left: 2,
            top: -5,
            right: 20,
            bottom: 1,
        };
        fill_rect(&mut frame, BUFFER, clip, rect, [9, 9, 9, 255]);

        assert_eq!(pixel(&frame, 3, 0), [9, 9, 9, 255]);
        assert_eq!(pixel(&frame, 4, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 2, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn sprite_frames_flip_and_skip_transparent_pixels() {
        let mut frame = blank();
        let sheet = two_frame_sheet();
        let clip = ClipRect::of_viewport(BUFFER);

        draw_sprite_frame(&mut frame, BUFFER, clip, 0, 0, &sheet, 0, 0, true);
        draw_sprite_frame(&mut frame, BUFFER, clip, 4, 0, &sheet, 1, 0, false);

        assert_eq!(pixel(&frame, 0, 0), [0, 255, 0, 255]);
        assert_eq!(pixel(&frame, 1, 0), [255, 0, 0, 255]);
        assert_eq!(pixel(&frame, 4, 0), [0, 0, 255, 255]);
        assert_eq!(pixel(&frame, 5, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn composed_frame_splits_playfield_and_panel() {
        let mut world = SceneWorld::new(Camera::new(4.0, 4.0));
        world.camera_mut().update_for_zone(None, Vec2::new(2.0, 2.0));
        world.push_draw(DrawItem::block(
            Vec2::new(3.0, 0.0),
            Vec2::new(4.0, 1.0),
            [1, 2, 3, 255],
        ));
        world.push_draw(
            DrawItem::block(Vec2::new(6.0, 3.0), Vec2::new(1.0, 1.0), [7, 7, 7, 255])
                .in_screen_space(),
        );
        let mut frame = blank();

        compose_frame(&mut frame, BUFFER, 4, &world);

        assert_eq!(pixel(&frame, 0, 3), CLEAR_COLOR);
        assert_eq!(pixel(&frame, 3, 0), [1, 2, 3, 255]);
        assert_eq!(pixel(&frame, 4, 0), PANEL_COLOR);
        assert_eq!(pixel(&frame, 6, 3), [7, 7, 7, 255]);
    }

    #[test]
    fn map_tiles_fall_back_to_flat_colors() {
        let map = GameMap::new(2, 1, 2, 2, vec![1, 2])
            .expect("map")
            .with_tileset(
                Tileset::new(1, "terrain", 2, 2).with_slope(1, SlopeProfile::new(2.0, 2.0)),
            );
        let mut world = SceneWorld::new(Camera::new(4.0, 4.0));
        world.camera_mut().update_for_zone(None, Vec2::new(2.0, 2.0));
        world.set_map(map);
        let mut frame = blank();

        compose_frame(&mut frame, BUFFER, 4, &world);

        assert_eq!(pixel(&frame, 0, 0), SOLID_FALLBACK_COLOR);
        assert_eq!(pixel(&frame, 1, 1), SOLID_FALLBACK_COLOR);
        assert_eq!(pixel(&frame, 2, 0), CLEAR_COLOR);
        assert_eq!(pixel(&frame, 0, 2), CLEAR_COLOR);
    }

    #[test]
    fn sprite_items_draw_their_frame() {
        let mut world = SceneWorld::new(Camera::new(4.0, 4.0));
        world.camera_mut().update_for_zone(None, Vec2::new(2.0, 2.0));
        world.push_draw(
            DrawItem::block(Vec2::new(0.0, 2.0), Vec2::new(2.0, 1.0), [5, 5, 5, 255])
                .with_sprite(Some(SpriteRef {
                    sheet: Arc::new(two_frame_sheet()),
                    column: 0,
                    row: 0,
                    flip_x: false,
                })),
        );
        let mut frame = blank();

        compose_frame(&mut frame, BUFFER, 4, &world);

        assert_eq!(pixel(&frame, 0, 2), [255, 0, 0, 255]);
        assert_eq!(pixel(&frame, 1, 2), [0, 255, 0, 255]);
    }
}
