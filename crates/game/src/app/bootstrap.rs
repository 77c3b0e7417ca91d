use std::path::{Path, PathBuf};

use engine::content::{validate_asset_path, AssetPathError};
use engine::{
    load_map, resolve_app_paths, AppError, AppPaths, AssetRegistry, LoopConfig, MapLoadError,
    MetricsHandle, Scene, StartupError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::{ColonyScene, SPRITE_MANIFEST};

const MAP_ENV_VAR: &str = "COLONY_MAP";
const DEFAULT_MAP_FILE: &str = "space_colony.json";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) metrics: MetricsHandle,
}

#[derive(Debug, Error)]
pub(crate) enum GameError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("{env_var}='{value}' is not a usable map path: {source}")]
    InvalidMapPath {
        env_var: &'static str,
        value: String,
        #[source]
        source: AssetPathError,
    },
    #[error(transparent)]
    Map(#[from] MapLoadError),
    #[error(transparent)]
    App(#[from] AppError),
}

pub(crate) fn build_app() -> Result<AppWiring, GameError> {
    init_tracing();
    info!("=== Space Colony Startup ===");

    let paths = resolve_app_paths()?;
    let map_path = resolve_map_path(&paths, std::env::var(MAP_ENV_VAR).ok())?;
    info!(path = %map_path.display(), env_var = MAP_ENV_VAR, "map_selected");
    let map = load_map(&map_path)?;

    let mut sprites = AssetRegistry::new(&paths.assets_dir);
    sprites.load(&SPRITE_MANIFEST);

    let config = LoopConfig::default();
    let metrics = MetricsHandle::default();
    let scene = ColonyScene::new(map, sprites, metrics.clone(), config.playfield_width);
    Ok(AppWiring {
        config,
        scene: Box::new(scene),
        metrics,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Map file under `assets/maps`, overridable with a relative name.
fn resolve_map_path(
    paths: &AppPaths,
    override_value: Option<String>,
) -> Result<PathBuf, GameError> {
    let Some(raw) = override_value else {
        return Ok(paths.maps_dir.join(DEFAULT_MAP_FILE));
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(paths.maps_dir.join(DEFAULT_MAP_FILE));
    }
    validate_asset_path(trimmed).map_err(|source| GameError::InvalidMapPath {
        env_var: MAP_ENV_VAR,
        value: raw.clone(),
        source,
    })?;
    Ok(join_relative(&paths.maps_dir, trimmed))
}

fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(base.to_path_buf(), |path, segment| path.join(segment))
}
