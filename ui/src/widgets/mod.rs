mod qr_input;
mod qr_preview;
mod share_button;

pub use qr_input::{INPUT_HINT, qr_input};
pub use qr_preview::{PREVIEW_LABEL, QrPreviewState, qr_preview, to_color_image};
pub use share_button::{SHARE_BUTTON_LABEL, share_button};
