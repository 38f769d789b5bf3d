//! Text → QR → share pipeline expressed as states, computes and a command.
//!
//! [`InputText`] is the only editable state. [`QrCodeCompute`] re-encodes it
//! on a worker whenever it changes, and keeps only the result for the latest
//! revision. [`ShareQrCodeCommand`] snapshots the current image and exports it
//! on a worker, reporting into [`ShareCompute`].

use std::any::Any;
use std::sync::Arc;

use log::{debug, warn};
use shareasqr_states::{
    Command, Compute, ComputeDeps, Dep, State, TaskHandle, TaskId, Updater, spawn_work,
    state_assign_impl,
};

use crate::config::{QR_SIZE, ShareConfig};
use crate::encoder::{self, QrImage};
use crate::export::{ExportOutcome, ExportPackager};

/// The text in the input field. Every change bumps the revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputText {
    text: String,
    revision: u64,
}

impl InputText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let revision = u64::from(!text.is_empty());
        Self { text, revision }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replaces the text. Returns `false` (and keeps the revision) when it is
    /// unchanged.
    pub fn set(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.text {
            return false;
        }
        self.text = text;
        self.revision += 1;
        true
    }
}

impl State for InputText {
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

#[derive(Debug, Clone, Default)]
pub enum EncodeStatus {
    /// Input is empty.
    #[default]
    Idle,
    Encoding,
    Ready(Arc<QrImage>),
    Failed {
        message: String,
    },
}

/// Latest QR image for [`InputText`].
#[derive(Debug, Clone, Default)]
pub struct QrCodeCompute {
    /// Input revision this value describes.
    revision: u64,
    status: EncodeStatus,
    task: Option<TaskHandle>,
}

impl QrCodeCompute {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn status(&self) -> &EncodeStatus {
        &self.status
    }

    pub fn image(&self) -> Option<&Arc<QrImage>> {
        match &self.status {
            EncodeStatus::Ready(image) => Some(image),
            _ => None,
        }
    }

    fn settled(revision: u64, status: EncodeStatus) -> Self {
        Self {
            revision,
            status,
            task: None,
        }
    }
}

impl Compute for QrCodeCompute {
    fn deps(&self) -> ComputeDeps {
        ComputeDeps::new().state::<InputText>()
    }

    fn compute(&self, deps: Dep<'_>, updater: Updater) {
        let input = match deps.get_state_ref::<InputText>() {
            Ok(input) => input,
            Err(err) => {
                warn!(target: "shareasqr::pipeline", "cannot encode: {err}");
                return;
            }
        };
        let revision = input.revision();

        if let Some(previous) = &self.task {
            previous.cancel();
        }

        if input.is_empty() {
            updater.set(Self::settled(revision, EncodeStatus::Idle));
            return;
        }

        let size = deps
            .get_state_ref::<ShareConfig>()
            .map(|config| config.qr_size)
            .unwrap_or(QR_SIZE);
        let text = input.text().to_owned();
        let handle = TaskHandle::start(TaskId::of::<Self>(revision));

        updater.set(Self {
            revision,
            status: EncodeStatus::Encoding,
            task: Some(handle.clone()),
        });

        spawn_work("qr-encode", move || {
            let result = encoder::encode_with_size(&text, size);
            if handle.is_cancelled() {
                debug!(
                    target: "shareasqr::pipeline",
                    "encode for revision {revision} superseded"
                );
                return;
            }
            let status = match result {
                Ok(image) => EncodeStatus::Ready(Arc::new(image)),
                Err(err) => {
                    warn!(target: "shareasqr::pipeline", "{}: {err}", err.kind());
                    EncodeStatus::Failed {
                        message: err.to_string(),
                    }
                }
            };
            updater.set(Self::settled(revision, status));
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    /// Results for older revisions lose to whatever is already here.
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        match new_self.downcast::<Self>() {
            Ok(next) if next.revision < self.revision => {
                debug!(
                    target: "shareasqr::pipeline",
                    "dropping stale encode result for revision {} (current {})",
                    next.revision,
                    self.revision
                );
            }
            Ok(next) => *self = *next,
            Err(_) => warn!(
                target: "shareasqr::pipeline",
                "ignored update of unexpected type for QrCodeCompute"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShareStatus {
    #[default]
    Idle,
    Exporting,
    Done(ExportOutcome),
}

/// Progress of the most recent share request.
#[derive(Debug, Clone, Default)]
pub struct ShareCompute {
    request: u64,
    /// Input revision of the image being shared.
    revision: u64,
    status: ShareStatus,
}

impl ShareCompute {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn status(&self) -> &ShareStatus {
        &self.status
    }

    pub fn outcome(&self) -> Option<&ExportOutcome> {
        match &self.status {
            ShareStatus::Done(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_exporting(&self) -> bool {
        self.status == ShareStatus::Exporting
    }
}

impl Compute for ShareCompute {
    fn deps(&self) -> ComputeDeps {
        ComputeDeps::new()
    }

    // Only written by `ShareQrCodeCommand`.
    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        match new_self.downcast::<Self>() {
            Ok(next) if next.request < self.request => {
                debug!(
                    target: "shareasqr::pipeline",
                    "dropping outcome of superseded share request {}",
                    next.request
                );
            }
            Ok(next) => *self = *next,
            Err(_) => warn!(
                target: "shareasqr::pipeline",
                "ignored update of unexpected type for ShareCompute"
            ),
        }
    }
}

/// Exports the current QR image and opens the share chooser.
#[derive(Debug, Clone)]
pub struct ShareQrCodeCommand {
    packager: ExportPackager,
}

impl ShareQrCodeCommand {
    pub fn new(packager: ExportPackager) -> Self {
        Self { packager }
    }
}

impl Command for ShareQrCodeCommand {
    fn run(&self, deps: Dep<'_>, updater: Updater) {
        let request = deps
            .get_compute_ref::<ShareCompute>()
            .map(|share| share.request + 1)
            .unwrap_or(1);
        let encoded = deps.get_compute_ref::<QrCodeCompute>().ok();
        let revision = encoded.map(QrCodeCompute::revision).unwrap_or_default();
        let image = encoded.and_then(|encoded| encoded.image().cloned());

        let Some(image) = image else {
            let outcome = self.packager.share(None);
            updater.set(ShareCompute {
                request,
                revision,
                status: ShareStatus::Done(outcome),
            });
            return;
        };

        updater.set(ShareCompute {
            request,
            revision,
            status: ShareStatus::Exporting,
        });

        let packager = self.packager.clone();
        spawn_work("qr-export", move || {
            let outcome = packager.share(Some(&image));
            updater.set(ShareCompute {
                request,
                revision,
                status: ShareStatus::Done(outcome),
            });
        });
    }
}

/// User-visible phase of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Idle,
    Encoding,
    Ready,
    EncodeFailed,
    Exporting,
    Shared,
    ExportFailed,
}

impl PipelinePhase {
    /// Share outcomes only describe the image they were taken from; any edit
    /// since then falls back to the encode phase.
    pub fn of(encoded: &QrCodeCompute, share: &ShareCompute) -> Self {
        match encoded.status() {
            EncodeStatus::Idle => Self::Idle,
            EncodeStatus::Encoding => Self::Encoding,
            EncodeStatus::Failed { .. } => Self::EncodeFailed,
            EncodeStatus::Ready(_) if share.revision() != encoded.revision() => Self::Ready,
            EncodeStatus::Ready(_) => match share.status() {
                ShareStatus::Exporting => Self::Exporting,
                ShareStatus::Done(ExportOutcome::Shared { .. }) => Self::Shared,
                ShareStatus::Done(ExportOutcome::Failed { .. }) => Self::ExportFailed,
                ShareStatus::Idle | ShareStatus::Done(ExportOutcome::Skipped) => Self::Ready,
            },
        }
    }

    pub fn is_busy(self) -> bool {
        matches!(self, Self::Encoding | Self::Exporting)
    }
}
