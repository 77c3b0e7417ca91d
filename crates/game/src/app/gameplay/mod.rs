mod crawler;
mod entities;
mod player;
mod scene_impl;
mod simulation;
mod spawning;
mod turret;

#[cfg(test)]
mod test_maps;

pub(crate) use entities::SpriteKind;
pub(crate) use scene_impl::{ColonyScene, SPRITE_MANIFEST};
