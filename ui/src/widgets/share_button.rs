use egui::{Button, Response, Ui};

use crate::state::State;

pub const SHARE_BUTTON_LABEL: &str = "Share QR Code";

/// Exports the current image and hands it to the share sheet. Disabled while
/// a previous share is still running.
pub fn share_button(state: &mut State, ui: &mut Ui) -> Response {
    let exporting = state
        .session
        .ctx()
        .cached::<shareasqr_business::ShareCompute>()
        .is_some_and(shareasqr_business::ShareCompute::is_exporting);

    let response = ui.add_enabled(!exporting, Button::new(SHARE_BUTTON_LABEL));
    if response.clicked() {
        log::info!(target: "shareasqr::ui", "share requested");
        state.session.share();
    }

    response
}
