use std::any::Any;
use std::path::{Path, PathBuf};
use std::time::Duration;

use shareasqr_states::{State, state_assign_impl};

/// Side length, in pixels, of every generated QR image.
pub const QR_SIZE: u32 = 400;

/// Subdirectory of the cache root that holds exported images.
pub const IMAGES_DIR: &str = "images";

/// Fixed name of the exported PNG. Every share overwrites it.
pub const EXPORT_FILE_NAME: &str = "qr_code.png";

pub const CHOOSER_TITLE: &str = "Share QR Code";

pub const DEFAULT_PROVIDER_AUTHORITY: &str = "app.shareasqr.provider";

const DEFAULT_GRANT_TTL: Duration = Duration::from_secs(60);

const APP_CACHE_DIR: &str = "shareasqr";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareConfig {
    /// Application-private cache directory. Nothing under it is expected to
    /// survive between sessions.
    pub cache_root: PathBuf,
    /// Authority part of the `content://` references handed to share targets.
    pub provider_authority: String,
    /// How long a share target may read an exported file.
    pub grant_ttl: Duration,
    pub qr_size: u32,
    pub chooser_title: String,
}

impl ShareConfig {
    pub fn with_cache_root(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            ..Self::default()
        }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.cache_root.join(IMAGES_DIR)
    }

    pub fn export_path(&self) -> PathBuf {
        self.images_dir().join(EXPORT_FILE_NAME)
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        let cache_root = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_CACHE_DIR);

        Self {
            cache_root,
            provider_authority: DEFAULT_PROVIDER_AUTHORITY.to_owned(),
            grant_ttl: DEFAULT_GRANT_TTL,
            qr_size: QR_SIZE,
            chooser_title: CHOOSER_TITLE.to_owned(),
        }
    }
}

impl State for ShareConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}
