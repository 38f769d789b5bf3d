//! Business logic for Share as QR: resolving shared text, encoding it as a QR
//! code, and exporting the image to a share target.

mod config;
mod encoder;
mod error;
mod export;
mod intent;
mod pipeline;
mod provider;
mod session;

pub use config::{
    CHOOSER_TITLE, DEFAULT_PROVIDER_AUTHORITY, EXPORT_FILE_NAME, IMAGES_DIR, QR_SIZE, ShareConfig,
};
pub use encoder::{QUIET_ZONE, QrImage, encode, encode_with_size};
pub use error::{PipelineError, Result};
pub use export::{ExportOutcome, ExportPackager, ShareChooser, ShareSheet};
pub use intent::{
    EXTRA_STREAM, EXTRA_TEXT, InboundReceiver, InboundRequest, InboundSender, IntentAction,
    MIME_IMAGE_PNG, MIME_TEXT_PLAIN, inbound_channel, resolve, resolve_shared_text,
};
pub use pipeline::{
    EncodeStatus, InputText, PipelinePhase, QrCodeCompute, ShareCompute, ShareQrCodeCommand,
    ShareStatus,
};
pub use provider::{FileProvider, ShareReference};
pub use session::QrSession;
