mod camera;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use camera::Camera;
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{visible_tile_range, world_to_screen_px, ClipRect, Renderer, Viewport};
pub use scene::{DrawItem, DrawSpace, Scene, SceneCommand, SceneWorld, SpriteRef};
