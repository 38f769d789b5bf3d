use std::io::Read;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use egui_kittest::Harness;
use shareasqr_business::{FileProvider, PipelineError, ShareChooser, ShareSheet};
use shareasqr_ui::ShareAsQrApp;
use shareasqr_ui::state::State;
use shareasqr_ui::utils::drop_handler::DropHandler;
use tempfile::TempDir;

/// Share sheet standing in for the clipboard: records what it was handed.
#[derive(Debug, Default)]
pub struct RecordingShareSheet {
    shared: Mutex<Vec<(ShareChooser, usize)>>,
}

impl RecordingShareSheet {
    #[allow(unused)]
    pub fn shared(&self) -> Vec<(ShareChooser, usize)> {
        self.shared.lock().expect("not poisoned").clone()
    }
}

impl ShareSheet for RecordingShareSheet {
    fn present(&self, chooser: &ShareChooser, provider: &FileProvider) -> Result<(), PipelineError> {
        let mut bytes = Vec::new();
        provider
            .open(&chooser.stream)?
            .read_to_end(&mut bytes)
            .map_err(|err| PipelineError::Chooser(err.to_string()))?;
        self.shared
            .lock()
            .expect("not poisoned")
            .push((chooser.clone(), bytes.len()));
        Ok(())
    }
}

/// Drop handler fed by the test instead of the windowing system.
#[derive(Debug, Default, Clone)]
pub struct QueuedDrops {
    queue: Arc<Mutex<Vec<shareasqr_business::InboundRequest>>>,
}

impl QueuedDrops {
    #[allow(unused)]
    pub fn push(&self, request: shareasqr_business::InboundRequest) {
        self.queue.lock().expect("not poisoned").push(request);
    }
}

impl DropHandler for QueuedDrops {
    fn handle_drop(&self, _ctx: &egui::Context) -> Option<shareasqr_business::InboundRequest> {
        self.queue.lock().expect("not poisoned").pop()
    }
}

pub struct TestCtx<'a> {
    _cache: TempDir,
    pub sheet: Arc<RecordingShareSheet>,
    pub drops: QueuedDrops,
    harness: Harness<'a, ShareAsQrApp>,
}

impl<'a> TestCtx<'a> {
    pub fn new_app() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let cache = tempfile::tempdir().expect("tempdir");
        let sheet = Arc::new(RecordingShareSheet::default());
        let drops = QueuedDrops::default();

        let state = State::test(cache.path(), sheet.clone());
        let app = ShareAsQrApp::with_drop_handler(state, Box::new(drops.clone()));
        let harness = Harness::builder()
            .with_size(egui::vec2(420.0, 720.0))
            .build_eframe(|_| app);

        Self {
            _cache: cache,
            sheet,
            drops,
            harness,
        }
    }

    pub fn harness_mut(&mut self) -> &mut Harness<'a, ShareAsQrApp> {
        &mut self.harness
    }

    /// Steps frames until the session has no work in flight.
    pub async fn settle(&mut self) {
        for _ in 0..200 {
            self.harness.step();
            if !self.harness.state().state.session.is_busy() {
                self.harness.step();
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("session still busy after 200 frames");
    }
}
