use shareasqr_business::InboundSender;

use crate::state::State;
use crate::utils::drop_handler::{DropHandler, SystemDropHandler};
use crate::widgets;

pub struct ShareAsQrApp {
    pub state: State,
    drop_handler: Box<dyn DropHandler>,
    inbound: InboundSender,
}

impl ShareAsQrApp {
    /// Called once before the first frame.
    pub fn new(state: State) -> Self {
        Self::with_drop_handler(state, Box::new(SystemDropHandler))
    }

    pub fn with_drop_handler(state: State, drop_handler: Box<dyn DropHandler>) -> Self {
        let inbound = state.session.inbound_sender();
        Self {
            state,
            drop_handler,
            inbound,
        }
    }

    fn forward_drops(&self, ctx: &egui::Context) {
        let Some(request) = self.drop_handler.handle_drop(ctx) else {
            return;
        };
        if self.inbound.send(request).is_err() {
            log::warn!(target: "shareasqr::ui", "session inbox closed, drop ignored");
        }
    }
}

impl eframe::App for ShareAsQrApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.forward_drops(ctx);

        // Apply background results and inbound requests before rendering.
        self.state.session.poll();
        self.state.sync_input_buffer();

        egui::CentralPanel::default().show(ctx, |ui| {
            let size = ui.available_size();
            if size.x > size.y {
                ui.columns(2, |columns| {
                    controls(&mut self.state, &mut columns[0]);
                    widgets::qr_preview(&mut self.state, &mut columns[1]);
                });
            } else {
                ui.vertical(|ui| {
                    widgets::qr_input(&mut self.state, ui);
                    ui.add_space(8.0);
                    widgets::qr_preview(&mut self.state, ui);
                    share_row(&mut self.state, ui);
                });
            }
        });

        // Encode what this frame's edits changed.
        self.state.session.poll();
        if self.state.session.is_busy() {
            ctx.request_repaint();
        }
    }
}

fn controls(state: &mut State, ui: &mut egui::Ui) {
    widgets::qr_input(state, ui);
    share_row(state, ui);
}

/// Share button (only with an image) and the pipeline status.
fn share_row(state: &mut State, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        if state.session.image().is_some() {
            widgets::share_button(state, ui);
        }
        if let Some(status) = state.session.status_line() {
            ui.weak(status);
        }
    });
}
