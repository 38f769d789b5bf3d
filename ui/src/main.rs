#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use shareasqr_ui::ShareAsQrApp;
use shareasqr_ui::state::State;

mod alloc {
    #[global_allocator]
    static MALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;
}

fn main() -> eframe::Result {
    // Log to stderr (if you run with `RUST_LOG=debug`).
    // egui_winit logs an error whenever the clipboard holds something other than text.
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_module("egui_winit::clipboard", log::LevelFilter::Off)
        .init();

    // Encoding and export run on the blocking pool of this runtime. Without
    // it they run inline on the UI thread.
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .thread_name("shareasqr-worker")
        .worker_threads(1)
        .enable_all()
        .build()
    {
        Ok(runtime) => Some(runtime),
        Err(err) => {
            log::warn!("failed to start worker runtime, encoding on the UI thread: {err}");
            None
        }
    };
    let _guard = runtime.as_ref().map(tokio::runtime::Runtime::enter);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Share as QR")
            .with_inner_size([440.0, 640.0])
            .with_min_inner_size([280.0, 320.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Share as QR",
        native_options,
        Box::new(|_cc| {
            let state = State::default();
            let app = ShareAsQrApp::new(state);
            Ok(Box::new(app))
        }),
    )
}
