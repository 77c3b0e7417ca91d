use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetPathError {
    #[error("asset path must not be empty")]
    Empty,
    #[error("asset path must not start with '/'")]
    LeadingSlash,
    #[error("asset path must not contain '\\\\'")]
    Backslash,
    #[error("asset path must not contain '..'")]
    ParentTraversal,
    #[error("asset path contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid asset path '{path}': {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: AssetPathError,
    },
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame size {frame_width}x{frame_height} does not fit a {width}x{height} image")]
    FrameSize {
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },
}

/// Asset paths are relative to the assets root, lowercase, and may not escape it.
pub fn validate_asset_path(path: &str) -> Result<(), AssetPathError> {
    if path.is_empty() {
        return Err(AssetPathError::Empty);
    }
    if path.starts_with('/') {
        return Err(AssetPathError::LeadingSlash);
    }
    if path.contains('\\') {
        return Err(AssetPathError::Backslash);
    }
    if path.contains("..") {
        return Err(AssetPathError::ParentTraversal);
    }
    for ch in path.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-' | '.') {
            continue;
        }
        return Err(AssetPathError::InvalidCharacter { character: ch });
    }
    Ok(())
}

/// Decoded RGBA image cut into equally sized frames, addressed by
/// `(column, row)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteSheet {
    width: u32,
    height: u32,
    frame_width: u32,
    frame_height: u32,
    rgba: Vec<u8>,
}

impl SpriteSheet {
    pub fn from_rgba(
        width: u32,
        height: u32,
        rgba: Vec<u8>,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, AssetError> {
        let fits = frame_width > 0
            && frame_height > 0
            && frame_width <= width
            && frame_height <= height
            && rgba.len() >= width as usize * height as usize * 4;
        if !fits {
            return Err(AssetError::FrameSize {
                width,
                height,
                frame_width,
                frame_height,
            });
        }
        Ok(Self {
            width,
            height,
            frame_width,
            frame_height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    pub fn columns(&self) -> u32 {
        self.width / self.frame_width
    }

    pub fn rows(&self) -> u32 {
        self.height / self.frame_height
    }

    /// Pixel inside frame `(column, row)`; frame indices wrap so animation
    /// counters never address outside the sheet.
    pub fn frame_pixel(&self, column: u32, row: u32, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.frame_width || y >= self.frame_height {
            return None;
        }
        let column = column % self.columns().max(1);
        let row = row % self.rows().max(1);
        let px = column * self.frame_width + x;
        let py = row * self.frame_height + y;
        let offset = (py as usize * self.width as usize + px as usize) * 4;
        let bytes = self.rgba.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

pub fn load_sprite_sheet(
    path: &Path,
    frame_width: u32,
    frame_height: u32,
) -> Result<SpriteSheet, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    SpriteSheet::from_rgba(
        image.width(),
        image.height(),
        image.into_raw(),
        frame_width,
        frame_height,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteManifestEntry<'a, K> {
    pub key: K,
    pub path: &'a str,
    pub frame_width: u32,
    pub frame_height: u32,
}

/// Shared per-kind art. Filled once before the frame loop starts; keys that
/// fail to load stay absent and their owners draw placeholders.
#[derive(Debug)]
pub struct AssetRegistry<K> {
    root: PathBuf,
    sheets: HashMap<K, Arc<SpriteSheet>>,
    warned_keys: HashSet<K>,
}

impl<K> AssetRegistry<K>
where
    K: Copy + Eq + Hash + Debug,
{
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sheets: HashMap::new(),
            warned_keys: HashSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads every manifest entry and returns how many succeeded.
    pub fn load(&mut self, manifest: &[SpriteManifestEntry<'_, K>]) -> usize {
        let mut loaded = 0;
        for entry in manifest {
            match self.load_entry(entry) {
                Ok(sheet) => {
                    self.sheets.insert(entry.key, Arc::new(sheet));
                    loaded += 1;
                }
                Err(error) => self.warn_load_failed_once(entry.key, &error),
            }
        }
        info!(
            requested = manifest.len(),
            loaded,
            root = %self.root.display(),
            "asset_registry_loaded"
        );
        loaded
    }

    pub fn insert(&mut self, key: K, sheet: SpriteSheet) {
        self.sheets.insert(key, Arc::new(sheet));
    }

    pub fn get(&self, key: K) -> Option<&Arc<SpriteSheet>> {
        self.sheets.get(&key)
    }

    pub fn is_loaded(&self, key: K) -> bool {
        self.sheets.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    fn load_entry(&self, entry: &SpriteManifestEntry<'_, K>) -> Result<SpriteSheet, AssetError> {
        validate_asset_path(entry.path).map_err(|source| AssetError::InvalidPath {
            path: entry.path.to_string(),
            source,
        })?;
        load_sprite_sheet(
            &self.root.join(entry.path),
            entry.frame_width,
            entry.frame_height,
        )
    }

    fn warn_load_failed_once(&mut self, key: K, error: &AssetError) {
        if !self.warned_keys.insert(key) {
            return;
        }
        warn!(
            key = ?key,
            error = %error,
            "asset_load_failed_using_placeholder"
        );
    }
}
