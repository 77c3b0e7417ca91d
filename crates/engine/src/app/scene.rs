use std::sync::Arc;

use super::camera::Camera;
use super::input::InputSnapshot;
use crate::content::SpriteSheet;
use crate::math::Vec2;
use crate::tilemap::GameMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawSpace {
    /// Positioned in world pixels; the camera translation is applied.
    World,
    /// Positioned in frame-buffer pixels, e.g. the side panel.
    Screen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRef {
    pub sheet: Arc<SpriteSheet>,
    pub column: u32,
    pub row: u32,
    pub flip_x: bool,
}

/// One rectangle for the renderer. Items without a sprite, or whose sprite
/// failed to load, are drawn as a flat `color` block of `size`.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub position: Vec2,
    pub size: Vec2,
    pub sprite: Option<SpriteRef>,
    pub color: [u8; 4],
    pub space: DrawSpace,
}

impl DrawItem {
    pub fn block(position: Vec2, size: Vec2, color: [u8; 4]) -> Self {
        Self {
            position,
            size,
            sprite: None,
            color,
            space: DrawSpace::World,
        }
    }

    pub fn with_sprite(mut self, sprite: Option<SpriteRef>) -> Self {
        self.sprite = sprite;
        self
    }

    pub fn in_screen_space(mut self) -> Self {
        self.space = DrawSpace::Screen;
        self
    }
}

/// State shared between a scene and the renderer: the map being played, the
/// camera, tileset art, and the draw list published for the current frame.
#[derive(Debug)]
pub struct SceneWorld {
    map: Option<GameMap>,
    camera: Camera,
    tileset_sheets: Vec<Option<Arc<SpriteSheet>>>,
    draw_list: Vec<DrawItem>,
}

impl SceneWorld {
    pub fn new(camera: Camera) -> Self {
        Self {
            map: None,
            camera,
            tileset_sheets: Vec::new(),
            draw_list: Vec::new(),
        }
    }

    pub fn set_map(&mut self, map: GameMap) {
        self.tileset_sheets = vec![None; map.tilesets().len()];
        self.map = Some(map);
    }

    pub fn map(&self) -> Option<&GameMap> {
        self.map.as_ref()
    }

    pub fn clear_map(&mut self) {
        self.map = None;
        self.tileset_sheets.clear();
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Both the map and the camera, for updates that need to read one while
    /// mutating the other.
    pub fn map_and_camera_mut(&mut self) -> (Option<&GameMap>, &mut Camera) {
        (self.map.as_ref(), &mut self.camera)
    }

    pub fn set_tileset_sheet(&mut self, tileset_index: usize, sheet: Arc<SpriteSheet>) {
        if let Some(slot) = self.tileset_sheets.get_mut(tileset_index) {
            *slot = Some(sheet);
        }
    }

    pub fn tileset_sheet(&self, tileset_index: usize) -> Option<&SpriteSheet> {
        self.tileset_sheets
            .get(tileset_index)
            .and_then(|slot| slot.as_deref())
    }

    pub fn clear_draw_list(&mut self) {
        self.draw_list.clear();
    }

    pub fn push_draw(&mut self, item: DrawItem) {
        self.draw_list.push(item);
    }

    pub fn draw_list(&self) -> &[DrawItem] {
        &self.draw_list
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    /// `dt_ms` is the capped frame delta in milliseconds.
    fn update(&mut self, dt_ms: f32, input: &InputSnapshot, world: &mut SceneWorld)
        -> SceneCommand;
    /// Publishes this frame's draw list into `world`.
    fn render(&mut self, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}
