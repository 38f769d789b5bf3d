use std::path::Path;
use std::sync::Arc;

use shareasqr_business::{QrSession, ShareConfig, ShareSheet};

use crate::utils::share_sheet::ClipboardShareSheet;
use crate::widgets::QrPreviewState;

/// The main application state.
pub struct State {
    /// The pipeline: input text, QR image and share status.
    pub session: QrSession,
    /// Text edit buffer. Follows the session when an inbound request replaces
    /// the input.
    pub input_buffer: String,
    /// Texture of the QR image currently on screen.
    pub preview: QrPreviewState,
}

impl Default for State {
    fn default() -> Self {
        Self::new(ShareConfig::default(), Arc::new(ClipboardShareSheet))
    }
}

impl State {
    pub fn new(config: ShareConfig, sheet: Arc<dyn ShareSheet>) -> Self {
        Self {
            session: QrSession::new(config, sheet),
            input_buffer: String::new(),
            preview: QrPreviewState::default(),
        }
    }

    /// State exporting into `cache_root` and sharing through `sheet`.
    pub fn test(cache_root: &Path, sheet: Arc<dyn ShareSheet>) -> Self {
        Self::new(ShareConfig::with_cache_root(cache_root), sheet)
    }

    /// Pulls the session's input into the edit buffer when they disagree.
    pub fn sync_input_buffer(&mut self) {
        if self.session.input() != self.input_buffer {
            self.input_buffer = self.session.input().to_owned();
        }
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("session", &self.session)
            .field("input_len", &self.input_buffer.len())
            .field("preview", &self.preview)
            .finish()
    }
}
