//! QR code preview.
//!
//! The texture is rebuilt only when a new image is ready. While the next
//! revision is encoding the previous texture stays on screen.

use std::sync::Arc;

use egui::{Color32, ColorImage, Image, Response, TextureHandle, TextureOptions, Ui, Vec2};
use shareasqr_business::{EncodeStatus, QrCodeCompute, QrImage};

use crate::state::State;

pub const PREVIEW_LABEL: &str = "QR Code";

/// Largest side the preview is drawn at, in points.
const MAX_PREVIEW_SIDE: f32 = 400.0;

#[derive(Default)]
pub struct QrPreviewState {
    shown: Option<(Arc<QrImage>, TextureHandle)>,
}

impl std::fmt::Debug for QrPreviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrPreviewState")
            .field("text_len", &self.shown.as_ref().map(|(image, _)| image.text().len()))
            .finish()
    }
}

impl QrPreviewState {
    /// Text of the image on screen.
    pub fn shown_text(&self) -> Option<&str> {
        self.shown.as_ref().map(|(image, _)| image.text())
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.shown.as_ref().map(|(_, texture)| texture)
    }

    /// Follows the encoder: new texture on a new image, nothing on idle or
    /// failure, unchanged while encoding.
    pub fn sync(&mut self, ctx: &egui::Context, encoded: Option<&QrCodeCompute>) {
        let Some(encoded) = encoded else {
            self.shown = None;
            return;
        };

        match encoded.status() {
            EncodeStatus::Encoding => {}
            EncodeStatus::Idle | EncodeStatus::Failed { .. } => self.shown = None,
            EncodeStatus::Ready(image) => {
                let current = self
                    .shown
                    .as_ref()
                    .is_some_and(|(shown, _)| Arc::ptr_eq(shown, image));
                if !current {
                    let texture =
                        ctx.load_texture("qr_preview", to_color_image(image), TextureOptions::NEAREST);
                    self.shown = Some((image.clone(), texture));
                }
            }
        }
    }
}

/// Converts the greyscale raster into an egui image.
pub fn to_color_image(image: &QrImage) -> ColorImage {
    let width = image.width() as usize;
    let height = image.height() as usize;

    let pixels = image
        .pixels()
        .iter()
        .map(|&luma| Color32::from_gray(luma))
        .collect();

    ColorImage::new([width, height], pixels)
}

/// The "QR Code" caption and the image, sized to the available width.
pub fn qr_preview(state: &mut State, ui: &mut Ui) -> Option<Response> {
    let encoded = state.session.ctx().cached::<QrCodeCompute>();
    state.preview.sync(ui.ctx(), encoded);

    let texture = state.preview.texture()?;
    ui.label(PREVIEW_LABEL);

    let side = ui
        .available_width()
        .min(ui.available_height())
        .clamp(64.0, MAX_PREVIEW_SIDE);
    Some(ui.add(Image::new(texture).fit_to_exact_size(Vec2::splat(side))))
}
