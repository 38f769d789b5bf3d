//! Desktop share target.
//!
//! There is no system share chooser on the desktop. Sharing puts the QR image
//! on the clipboard so it can be pasted into any other application.

use std::io::Read;

use shareasqr_business::{FileProvider, PipelineError, ShareChooser, ShareSheet};

/// Copies the shared PNG to the system clipboard as an image.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClipboardShareSheet;

impl ShareSheet for ClipboardShareSheet {
    fn present(&self, chooser: &ShareChooser, provider: &FileProvider) -> Result<(), PipelineError> {
        let mut png = Vec::new();
        provider
            .open(&chooser.stream)?
            .read_to_end(&mut png)
            .map_err(|err| PipelineError::Chooser(format!("cannot read shared image: {err}")))?;

        let rgba = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
            .map_err(|err| PipelineError::Chooser(format!("shared file is not a PNG: {err}")))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut clipboard = arboard::Clipboard::new()
            .map_err(|err| PipelineError::Chooser(format!("clipboard unavailable: {err}")))?;
        clipboard
            .set_image(arboard::ImageData {
                width: width as usize,
                height: height as usize,
                bytes: rgba.into_raw().into(),
            })
            .map_err(|err| PipelineError::Chooser(format!("clipboard rejected image: {err}")))?;

        log::info!(
            target: "shareasqr::ui",
            "{}: copied {width}x{height} QR code from {} to the clipboard",
            chooser.title,
            chooser.stream.uri()
        );
        Ok(())
    }
}
