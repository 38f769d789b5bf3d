//! Shared helpers for the business integration tests.

#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};

use shareasqr_business::{FileProvider, PipelineError, QrSession, ShareChooser, ShareConfig, ShareSheet};
use tempfile::TempDir;

/// What a share target saw when the chooser was presented.
#[derive(Debug, Clone)]
pub struct Presented {
    pub chooser: ShareChooser,
    pub bytes: Vec<u8>,
}

/// Share sheet that reads the shared file through the provider and records it.
#[derive(Debug, Default)]
pub struct RecordingShareSheet {
    presented: Mutex<Vec<Presented>>,
    failures_left: Mutex<usize>,
}

impl RecordingShareSheet {
    pub fn presented(&self) -> Vec<Presented> {
        self.presented.lock().expect("not poisoned").clone()
    }

    /// The next `times` presentations fail as if no target accepted the share.
    pub fn fail_next(&self, times: usize) {
        *self.failures_left.lock().expect("not poisoned") = times;
    }
}

impl ShareSheet for RecordingShareSheet {
    fn present(&self, chooser: &ShareChooser, provider: &FileProvider) -> Result<(), PipelineError> {
        {
            let mut failures_left = self.failures_left.lock().expect("not poisoned");
            if *failures_left > 0 {
                *failures_left -= 1;
                return Err(PipelineError::Chooser("target rejected the share".to_owned()));
            }
        }

        let mut bytes = Vec::new();
        provider
            .open(&chooser.stream)?
            .read_to_end(&mut bytes)
            .map_err(|err| PipelineError::Chooser(err.to_string()))?;
        self.presented
            .lock()
            .expect("not poisoned")
            .push(Presented {
                chooser: chooser.clone(),
                bytes,
            });
        Ok(())
    }
}

/// A session writing into its own temporary cache directory.
pub struct Harness {
    pub cache: TempDir,
    pub sheet: Arc<RecordingShareSheet>,
    pub session: QrSession,
}

impl Harness {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let cache = tempfile::tempdir().expect("tempdir");
        let sheet = Arc::new(RecordingShareSheet::default());
        let session = QrSession::new(ShareConfig::with_cache_root(cache.path()), sheet.clone());
        Self {
            cache,
            sheet,
            session,
        }
    }

    pub fn export_path(&self) -> std::path::PathBuf {
        self.cache.path().join("images").join("qr_code.png")
    }
}

/// Decodes a greyscale QR raster with an independent reader.
pub fn decode(width: u32, height: u32, pixels: &[u8]) -> String {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        width as usize,
        height as usize,
        |x, y| pixels[y * width as usize + x],
    );
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "exactly one symbol expected");
    let (_meta, content) = grids[0].decode().expect("symbol decodes");
    content
}
