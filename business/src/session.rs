//! One running instance of the pipeline.

use std::sync::Arc;

use log::{debug, error};
use shareasqr_states::StateCtx;

use crate::config::ShareConfig;
use crate::encoder::QrImage;
use crate::export::{ExportOutcome, ExportPackager, ShareSheet};
use crate::intent::{self, InboundReceiver, InboundRequest, InboundSender, inbound_channel};
use crate::pipeline::{
    EncodeStatus, InputText, PipelinePhase, QrCodeCompute, ShareCompute, ShareQrCodeCommand,
};
use crate::provider::FileProvider;

/// Owns the state context plus the inbound request queue.
///
/// Drive it from the UI loop with [`QrSession::poll`]; tests can use
/// [`QrSession::settle`] to wait until background work is done.
#[derive(Debug)]
pub struct QrSession {
    ctx: StateCtx,
    inbound: InboundReceiver,
    inbound_sender: InboundSender,
    provider: Arc<FileProvider>,
}

impl QrSession {
    pub fn new(config: ShareConfig, sheet: Arc<dyn ShareSheet>) -> Self {
        let provider = Arc::new(FileProvider::from_config(&config));
        let packager = ExportPackager::new(config.clone(), provider.clone(), sheet);
        let (inbound_sender, inbound) = inbound_channel();

        let mut ctx = StateCtx::new();
        ctx.add_state(config);
        ctx.add_state(InputText::default());
        ctx.record_compute(QrCodeCompute::default());
        ctx.record_compute(ShareCompute::default());
        ctx.record_command(ShareQrCodeCommand::new(packager));

        Self {
            ctx,
            inbound,
            inbound_sender,
            provider,
        }
    }

    /// Session started from an inbound request, as when another app launches
    /// us with "share text". A request that does not resolve leaves the input
    /// empty.
    pub fn launched_with(
        config: ShareConfig,
        sheet: Arc<dyn ShareSheet>,
        request: Option<&InboundRequest>,
    ) -> Self {
        let mut session = Self::new(config, sheet);
        if let Some(text) = intent::resolve(request) {
            session.set_input(text);
        }
        session.poll();
        session
    }

    pub fn ctx(&self) -> &StateCtx {
        &self.ctx
    }

    pub fn provider(&self) -> &Arc<FileProvider> {
        &self.provider
    }

    /// Queue for requests arriving while the session runs (drops, other threads).
    pub fn inbound_sender(&self) -> InboundSender {
        self.inbound_sender.clone()
    }

    pub fn input(&self) -> &str {
        self.ctx.state::<InputText>().map_or("", InputText::text)
    }

    /// Replaces the input text. Returns whether it changed.
    pub fn set_input(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        match self.ctx.update::<InputText>(|input| input.set(text)) {
            Ok(changed) => changed,
            Err(err) => {
                error!(target: "shareasqr::session", "input state missing: {err}");
                false
            }
        }
    }

    /// Handles a request delivered while the session is already running.
    ///
    /// Plain-text shares with a non-empty payload replace the input. Anything
    /// else leaves it alone.
    pub fn receive(&mut self, request: &InboundRequest) -> bool {
        let Some(text) = intent::resolve(Some(request)) else {
            return false;
        };
        if text.is_empty() {
            debug!(target: "shareasqr::session", "ignoring empty shared text");
            return false;
        }
        self.set_input(text)
    }

    /// Applies background results and queued requests, then re-runs dirty
    /// computes. Returns how many updates were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = self.ctx.sync_computes();

        let pending: Vec<InboundRequest> = self.inbound.try_iter().collect();
        for request in &pending {
            self.receive(request);
        }

        if let Err(err) = self.ctx.run_computed() {
            error!(target: "shareasqr::session", "dependency graph is invalid: {err}");
        }
        // Work that ran inline has already reported back.
        applied += self.ctx.sync_computes();
        applied
    }

    /// Polls until nothing is encoding or exporting.
    pub async fn settle(&mut self) {
        self.poll();
        while self.is_busy() {
            self.ctx.wait_for_update().await;
            self.poll();
        }
    }

    /// Starts exporting the current image. Without an image this only logs.
    pub fn share(&mut self) {
        if let Err(err) = self.ctx.dispatch::<ShareQrCodeCommand>() {
            error!(target: "shareasqr::session", "share command missing: {err}");
            return;
        }
        self.poll();
    }

    pub fn image(&self) -> Option<&Arc<QrImage>> {
        self.ctx
            .cached::<QrCodeCompute>()
            .and_then(QrCodeCompute::image)
    }

    pub fn phase(&self) -> PipelinePhase {
        match (
            self.ctx.cached::<QrCodeCompute>(),
            self.ctx.cached::<ShareCompute>(),
        ) {
            (Some(encoded), Some(share)) => PipelinePhase::of(encoded, share),
            _ => PipelinePhase::Idle,
        }
    }

    /// Whether an encode or export is still running.
    pub fn is_busy(&self) -> bool {
        self.phase().is_busy()
            || self
                .ctx
                .cached::<ShareCompute>()
                .is_some_and(ShareCompute::is_exporting)
    }

    /// Outcome of the latest finished share, if any.
    pub fn last_share(&self) -> Option<&ExportOutcome> {
        self.ctx
            .cached::<ShareCompute>()
            .and_then(ShareCompute::outcome)
    }

    /// One-line, human-readable status for the UI.
    pub fn status_line(&self) -> Option<String> {
        match self.phase() {
            PipelinePhase::Idle | PipelinePhase::Ready => None,
            PipelinePhase::Encoding => Some("Generating…".to_owned()),
            PipelinePhase::Exporting => Some("Sharing…".to_owned()),
            PipelinePhase::Shared => Some("Shared".to_owned()),
            PipelinePhase::EncodeFailed => match self.ctx.cached::<QrCodeCompute>()?.status() {
                EncodeStatus::Failed { message } => Some(message.clone()),
                _ => None,
            },
            PipelinePhase::ExportFailed => match self.last_share()? {
                ExportOutcome::Failed { message, .. } => Some(format!("Sharing failed: {message}")),
                _ => None,
            },
        }
    }
}
