use std::collections::HashMap;

use tracing::debug;

use crate::math::Vec2;
use crate::tilemap::{GameMap, Rect, Zone, ZoneId};

#[derive(Debug, Clone, Copy, PartialEq)]
enum AxisClamp {
    /// Zone fits on this axis: the translation is pinned to its center.
    Centered(f32),
    /// Zone is larger: follow the target within `[min, max]`.
    Follow { min: f32, max: f32 },
}

impl AxisClamp {
    fn for_extent(zone_min: f32, zone_extent: f32, viewport_extent: f32) -> Self {
        if zone_extent <= viewport_extent {
            return AxisClamp::Centered(viewport_extent * 0.5 - zone_min - zone_extent * 0.5);
        }
        AxisClamp::Follow {
            min: viewport_extent - (zone_min + zone_extent),
            max: -zone_min,
        }
    }

    fn apply(self, follow: f32) -> f32 {
        match self {
            AxisClamp::Centered(fixed) => fixed,
            AxisClamp::Follow { min, max } => follow.clamp(min, max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ZoneClamp {
    x: AxisClamp,
    y: AxisClamp,
}

impl ZoneClamp {
    fn new(bounds: Rect, viewport: Vec2) -> Self {
        Self {
            x: AxisClamp::for_extent(bounds.x, bounds.width, viewport.x),
            y: AxisClamp::for_extent(bounds.y, bounds.height, viewport.y),
        }
    }
}

/// World-to-screen translation for a fixed-size playfield. Screen position is
/// `world + translation`.
#[derive(Debug, Clone)]
pub struct Camera {
    viewport: Vec2,
    translation: Vec2,
    clamps: HashMap<ZoneId, ZoneClamp>,
}

impl Camera {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            viewport: Vec2::new(viewport_width, viewport_height),
            translation: Vec2::ZERO,
            clamps: HashMap::new(),
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    pub fn cached_zone_count(&self) -> usize {
        self.clamps.len()
    }

    pub fn update(&mut self, map: &GameMap, target: Vec2) -> Vec2 {
        self.update_for_zone(map.zone_containing(target), target)
    }

    /// Centers on `target` when outside every zone; otherwise each axis is
    /// either pinned to the zone center or follows within the zone's bounds.
    pub fn update_for_zone(&mut self, zone: Option<&Zone>, target: Vec2) -> Vec2 {
        let follow = self.viewport.scaled(0.5) - target;
        self.translation = match zone {
            None => follow,
            Some(zone) => {
                let viewport = self.viewport;
                let clamp = *self.clamps.entry(zone.id()).or_insert_with(|| {
                    debug!(zone = zone.id().0, "camera_zone_clamp_cached");
                    ZoneClamp::new(zone.bounds(), viewport)
                });
                Vec2::new(clamp.x.apply(follow.x), clamp.y.apply(follow.y))
            }
        };
        self.translation
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world + self.translation
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen - self.translation
    }
}
