use std::sync::Arc;

use engine::{
    load_sprite_sheet, AssetRegistry, DrawItem, GameMap, InputAction, InputSnapshot,
    MetricsHandle, Scene, SceneCommand, SceneWorld, SpriteManifestEntry, SpriteRef, Vec2,
};
use tracing::{info, warn};

use super::entities::{Entity, EntityKind, SpriteKind};
use super::player::{Facing, Player};
use super::simulation::{Simulation, PLAYER_START};

pub(crate) const SPRITE_MANIFEST: [SpriteManifestEntry<'static, SpriteKind>; 4] = [
    SpriteManifestEntry {
        key: SpriteKind::Turret,
        path: "images/ceiling-turret.png",
        frame_width: 32,
        frame_height: 32,
    },
    SpriteManifestEntry {
        key: SpriteKind::TurretBullet,
        path: "images/turret-bullet.png",
        frame_width: 8,
        frame_height: 8,
    },
    SpriteManifestEntry {
        key: SpriteKind::Crawler,
        path: "images/enemy-ag.png",
        frame_width: 36,
        frame_height: 26,
    },
    SpriteManifestEntry {
        key: SpriteKind::CrawlerBump,
        path: "images/ag-bump.png",
        frame_width: 36,
        frame_height: 26,
    },
];

const PLAYER_SLOPE_COLOR: [u8; 4] = [40, 90, 220, 255];
const PLAYER_GROUND_COLOR: [u8; 4] = [210, 50, 50, 255];
const PLAYER_AIR_COLOR: [u8; 4] = [230, 200, 40, 255];
const HEALTH_FULL_COLOR: [u8; 4] = [120, 210, 110, 255];
const HEALTH_EMPTY_COLOR: [u8; 4] = [70, 74, 86, 255];
const HEALTH_PIP_SIZE: f32 = 8.0;
const HEALTH_PIP_SPACING: f32 = 12.0;
const HUD_MARGIN: f32 = 8.0;

pub(crate) struct ColonyScene {
    pending_map: Option<GameMap>,
    simulation: Simulation,
    sprites: AssetRegistry<SpriteKind>,
    metrics: MetricsHandle,
    hud_origin_x: f32,
}

impl ColonyScene {
    pub(crate) fn new(
        map: GameMap,
        sprites: AssetRegistry<SpriteKind>,
        metrics: MetricsHandle,
        playfield_width: u32,
    ) -> Self {
        Self {
            pending_map: Some(map),
            simulation: Simulation::new(PLAYER_START),
            sprites,
            metrics,
            hud_origin_x: playfield_width as f32,
        }
    }

    fn entity_draw_item(&self, entity: &Entity) -> DrawItem {
        let sheet = self.sprites.get(entity.kind.sprite_kind());
        let size = match (sheet, entity.kind.hitbox()) {
            (Some(sheet), _) => {
                let (width, height) = sheet.frame_size();
                Vec2::new(width as f32, height as f32)
            }
            (None, Some(hitbox)) => hitbox.bottom_right_local(),
            (None, None) => placeholder_size(&entity.kind),
        };
        let sprite = sheet.map(|sheet| {
            let (column, row) = entity.kind.sprite_frame();
            SpriteRef {
                sheet: Arc::clone(sheet),
                column,
                row,
                flip_x: false,
            }
        });
        DrawItem::block(entity.position, size, placeholder_color(&entity.kind))
            .with_sprite(sprite)
    }

    fn push_health_pips(&self, world: &mut SceneWorld, player: &Player) {
        for pip in 0..super::player::MAX_HEALTH {
            let color = if pip < player.health() {
                HEALTH_FULL_COLOR
            } else {
                HEALTH_EMPTY_COLOR
            };
            let position = Vec2::new(
                self.hud_origin_x + HUD_MARGIN + pip as f32 * HEALTH_PIP_SPACING,
                HUD_MARGIN,
            );
            world.push_draw(
                DrawItem::block(position, Vec2::new(HEALTH_PIP_SIZE, HEALTH_PIP_SIZE), color)
                    .in_screen_space(),
            );
        }
    }
}

fn placeholder_size(kind: &EntityKind) -> Vec2 {
    match kind {
        EntityKind::Turret(_) => Vec2::new(32.0, 32.0),
        EntityKind::TurretBullet(_) => Vec2::new(8.0, 8.0),
        EntityKind::Crawler(_) | EntityKind::CrawlerBump(_) => Vec2::new(36.0, 26.0),
    }
}

fn placeholder_color(kind: &EntityKind) -> [u8; 4] {
    match kind {
        EntityKind::Turret(_) => [90, 96, 110, 255],
        EntityKind::TurretBullet(_) => [250, 120, 30, 255],
        EntityKind::Crawler(_) => [60, 140, 70, 255],
        EntityKind::CrawlerBump(_) => [240, 240, 200, 255],
    }
}

pub(crate) fn player_color(player: &Player) -> [u8; 4] {
    if player.is_on_slope() {
        PLAYER_SLOPE_COLOR
    } else if player.is_on_ground() {
        PLAYER_GROUND_COLOR
    } else {
        PLAYER_AIR_COLOR
    }
}

fn load_tileset_sheets(world: &mut SceneWorld) {
    let Some(map) = world.map() else {
        return;
    };
    let sheets: Vec<_> = map
        .tilesets()
        .iter()
        .enumerate()
        .filter_map(|(index, tileset)| {
            let image = tileset.image.as_ref()?;
            match load_sprite_sheet(image, tileset.tile_width, tileset.tile_height) {
                Ok(sheet) => Some((index, sheet)),
                Err(error) => {
                    warn!(
                        tileset = %tileset.name,
                        error = %error,
                        "tileset_image_load_failed"
                    );
                    None
                }
            }
        })
        .collect();
    for (index, sheet) in sheets {
        world.set_tileset_sheet(index, Arc::new(sheet));
    }
}

impl Scene for ColonyScene {
    fn load(&mut self, world: &mut SceneWorld) {
        if let Some(map) = self.pending_map.take() {
            info!(
                width = map.width(),
                height = map.height(),
                zones = map.zones().len(),
                spawners = map.spawners().len(),
                "map_installed"
            );
            world.set_map(map);
        }
        load_tileset_sheets(world);
        let (map, camera) = world.map_and_camera_mut();
        if let Some(map) = map {
            camera.update(map, self.simulation.player().position());
        }
        info!(
            sprites_loaded = self.sprites.len(),
            player_x = PLAYER_START.x,
            player_y = PLAYER_START.y,
            "colony_scene_loaded"
        );
    }

    fn update(
        &mut self,
        dt_ms: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.quit_requested() || input.is_down(InputAction::Quit) {
            return SceneCommand::Quit;
        }
        let (Some(map), camera) = world.map_and_camera_mut() else {
            return SceneCommand::None;
        };
        self.simulation.tick(dt_ms, input, map);
        camera.update(map, self.simulation.player().position());
        SceneCommand::None
    }

    fn render(&mut self, world: &mut SceneWorld) {
        for entity in self.simulation.registry().iter() {
            world.push_draw(self.entity_draw_item(entity));
        }

        let player = self.simulation.player();
        if !player.is_flashing() {
            let hitbox = player.hitbox();
            world.push_draw(DrawItem::block(
                hitbox.top_left(),
                Vec2::new(hitbox.width(), hitbox.height()),
                player_color(player),
            ));
        }
        self.push_health_pips(world, player);
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        let cleared = self.simulation.registry_mut().clear();
        world.clear_map();
        info!(
            entities_cleared = cleared,
            elapsed_ms = self.simulation.elapsed_ms(),
            embedded_recoveries = self.simulation.player().embedded_recoveries(),
            last_fault = ?self.simulation.player().last_fault(),
            "colony_scene_unloaded"
        );
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let player = self.simulation.player();
        let zone = self
            .simulation
            .current_zone()
            .map_or_else(|| "-".to_string(), |zone| zone.0.to_string());
        let facing = match player.facing() {
            Facing::Left => "L",
            Facing::Right => "R",
        };
        let metrics = self.metrics.snapshot();
        Some(format!(
            "Space Colony | zone {zone} | hp {} | {:?} {facing} | entities {} | {:.0} fps",
            player.health(),
            player.pose(),
            self.simulation.registry().len(),
            metrics.fps
        ))
    }
}
