use egui::{Response, TextEdit, Ui};

use crate::state::State;

pub const INPUT_HINT: &str = "Enter text to generate QR Code";

/// Multiline input bound to the session. Every edit re-encodes.
pub fn qr_input(state: &mut State, ui: &mut Ui) -> Response {
    let response = ui.add(
        TextEdit::multiline(&mut state.input_buffer)
            .hint_text(INPUT_HINT)
            .desired_rows(4)
            .desired_width(f32::INFINITY),
    );

    if response.changed() {
        state.session.set_input(state.input_buffer.clone());
    }

    response
}
