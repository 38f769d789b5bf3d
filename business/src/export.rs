//! Export packager: PNG to the cache directory, read grant, share chooser.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};

use crate::config::ShareConfig;
use crate::encoder::QrImage;
use crate::error::{PipelineError, Result};
use crate::intent::{EXTRA_STREAM, IntentAction, MIME_IMAGE_PNG};
use crate::provider::{FileProvider, ShareReference};

/// Outbound "send this image" request handed to a [`ShareSheet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareChooser {
    pub title: String,
    pub action: IntentAction,
    pub mime_type: String,
    /// Reference stored under [`EXTRA_STREAM`].
    pub stream: ShareReference,
    /// The receiving target may read `stream` for the grant's lifetime.
    pub grant_read: bool,
}

impl ShareChooser {
    pub fn new(title: impl Into<String>, stream: ShareReference) -> Self {
        Self {
            title: title.into(),
            action: IntentAction::Send,
            mime_type: MIME_IMAGE_PNG.to_owned(),
            stream,
            grant_read: true,
        }
    }

    /// Looks up an extra by key, as a share target would.
    pub fn extra(&self, key: &str) -> Option<&str> {
        (key == EXTRA_STREAM).then(|| self.stream.uri())
    }
}

/// Platform share surface. Returns once the user has picked a target (or
/// dismissed the chooser) and the target has read what it needs.
pub trait ShareSheet: Send + Sync {
    fn present(&self, chooser: &ShareChooser, provider: &FileProvider) -> Result<()>;
}

/// What the last share attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// No image existed. Nothing was written, no chooser was shown.
    Skipped,
    Shared {
        uri: String,
    },
    Failed {
        kind: &'static str,
        message: String,
    },
}

#[derive(Clone)]
pub struct ExportPackager {
    config: ShareConfig,
    provider: Arc<FileProvider>,
    sheet: Arc<dyn ShareSheet>,
}

impl std::fmt::Debug for ExportPackager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportPackager")
            .field("export_path", &self.config.export_path())
            .field("provider", &self.provider.authority())
            .finish_non_exhaustive()
    }
}

impl ExportPackager {
    pub fn new(config: ShareConfig, provider: Arc<FileProvider>, sheet: Arc<dyn ShareSheet>) -> Self {
        Self {
            config,
            provider,
            sheet,
        }
    }

    pub fn provider(&self) -> &Arc<FileProvider> {
        &self.provider
    }

    /// Writes `image` as PNG to the fixed export path.
    ///
    /// Bytes go to a temporary file in the same directory first, which is then
    /// renamed over the export path. Readers of the export path see either the
    /// previous file or the complete new one.
    pub fn write_png(&self, image: &QrImage) -> Result<PathBuf> {
        let dir = self.config.images_dir();
        std::fs::create_dir_all(&dir).map_err(|err| PipelineError::export_io(&dir, err))?;

        let png = image.to_png()?;
        let mut staged = tempfile::Builder::new()
            .prefix(".qr_code")
            .suffix(".png.part")
            .tempfile_in(&dir)
            .map_err(|err| PipelineError::export_io(&dir, err))?;
        let staged_path = staged.path().to_path_buf();
        staged
            .write_all(&png)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|err| PipelineError::export_io(&staged_path, err))?;

        let path = self.config.export_path();
        staged
            .persist(&path)
            .map_err(|err| PipelineError::export_io(&path, err.error))?;

        info!(
            target: "shareasqr::export",
            "wrote {} byte PNG to {}",
            png.len(),
            path.display()
        );
        Ok(path)
    }

    /// Writes, grants, shows the chooser, then revokes the grant.
    pub fn export_and_share(&self, image: Option<&QrImage>) -> Result<ShareReference> {
        let Some(image) = image else {
            return Err(PipelineError::NullImage);
        };

        let path = self.write_png(image)?;
        let reference = self.provider.grant_read(&path, MIME_IMAGE_PNG)?;
        let chooser = ShareChooser::new(self.config.chooser_title.clone(), reference.clone());

        let presented = self.sheet.present(&chooser, &self.provider);
        self.provider.revoke(&reference);
        presented?;

        Ok(reference)
    }

    /// [`Self::export_and_share`] with failures logged instead of returned.
    pub fn share(&self, image: Option<&QrImage>) -> ExportOutcome {
        match self.export_and_share(image) {
            Ok(reference) => {
                info!(target: "shareasqr::export", "shared {}", reference.uri());
                ExportOutcome::Shared {
                    uri: reference.uri().to_owned(),
                }
            }
            Err(PipelineError::NullImage) => {
                info!(
                    target: "shareasqr::export",
                    "{}: nothing to share",
                    PipelineError::NullImage.kind()
                );
                ExportOutcome::Skipped
            }
            Err(err) => {
                warn!(target: "shareasqr::export", "{}: {err}", err.kind());
                ExportOutcome::Failed {
                    kind: err.kind(),
                    message: err.to_string(),
                }
            }
        }
    }
}
