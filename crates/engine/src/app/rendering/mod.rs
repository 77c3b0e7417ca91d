mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{visible_tile_range, world_to_screen_px, ClipRect, Viewport};
