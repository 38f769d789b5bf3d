//! Failure taxonomy of the text → QR → share pipeline.
//!
//! Every variant is caught at the boundary of the operation that produced it
//! and turned into a log line; none of them ends the session.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The inbound request is not a plain-text share.
    #[error("inbound request is not a plain-text share: {reason}")]
    ResolveMismatch { reason: String },

    /// The QR library rejected the text (too long, unsupported content).
    #[error("failed to encode {} bytes of text as a QR code: {source}", .text.len())]
    Encode {
        text: String,
        #[source]
        source: qrcode::types::QrError,
    },

    /// Creating the cache directory, writing, closing or renaming the PNG failed.
    #[error("export I/O failed at {}: {source}", .path.display())]
    ExportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize QR code as PNG: {0}")]
    PngEncode(#[from] image::ImageError),

    /// The content provider refused to hand out a reference.
    #[error("no shareable reference for {}: {reason}", .path.display())]
    PermissionGrant { path: PathBuf, reason: String },

    /// Share requested while no QR image exists.
    #[error("no QR code image to share")]
    NullImage,

    /// The share target failed to take the image.
    #[error("share chooser failed: {0}")]
    Chooser(String),
}

impl PipelineError {
    pub fn resolve_mismatch(reason: impl Into<String>) -> Self {
        Self::ResolveMismatch {
            reason: reason.into(),
        }
    }

    pub fn export_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ExportIo {
            path: path.into(),
            source,
        }
    }

    pub fn permission_grant(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::PermissionGrant {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Short label used in diagnostics and in the UI status line.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ResolveMismatch { .. } => "ResolveMismatch",
            Self::Encode { .. } => "EncodeFailure",
            Self::ExportIo { .. } | Self::PngEncode(_) => "ExportIOFailure",
            Self::PermissionGrant { .. } => "PermissionGrantFailure",
            Self::NullImage => "NullImageShareAttempt",
            Self::Chooser(_) => "ChooserFailure",
        }
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
