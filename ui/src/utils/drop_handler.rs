//! Drag-and-drop as an inbound share request.
//!
//! A file dropped onto the window is turned into a "send" request carrying
//! the file's MIME type and, for text files, its contents. The session's
//! intent resolver then decides whether it prefills the input.

use std::path::Path;

use shareasqr_business::{EXTRA_TEXT, InboundRequest, IntentAction, MIME_TEXT_PLAIN};

/// Trait for handling dropped files, so tests can inject requests without
/// system events.
pub trait DropHandler {
    /// The request for the first usable file dropped this frame, if any.
    fn handle_drop(&self, ctx: &egui::Context) -> Option<InboundRequest>;
}

/// Default drop handler using egui's raw input.
#[derive(Debug, Default)]
pub struct SystemDropHandler;

impl DropHandler for SystemDropHandler {
    fn handle_drop(&self, ctx: &egui::Context) -> Option<InboundRequest> {
        let dropped_files = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped_files.is_empty() {
            return None;
        }

        log::trace!(
            target: "shareasqr::ui::drop",
            "dropped_files={}",
            dropped_files.len()
        );
        dropped_files.iter().find_map(request_from_dropped_file)
    }
}

/// MIME type guessed from the file extension.
pub fn mime_for_name(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "text" | "md" => MIME_TEXT_PLAIN,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn request_from_dropped_file(file: &egui::DroppedFile) -> Option<InboundRequest> {
    let name = file
        .path
        .as_deref()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .unwrap_or(&file.name);
    let mime_type = mime_for_name(name);
    let request = InboundRequest::new(IntentAction::Send, Some(mime_type));

    if mime_type != MIME_TEXT_PLAIN {
        return Some(request);
    }

    let text = if let Some(path) = &file.path {
        match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!(
                    target: "shareasqr::ui::drop",
                    "cannot read dropped file {}: {err}",
                    path.display()
                );
                return None;
            }
        }
    } else if let Some(bytes) = &file.bytes {
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_owned(),
            Err(err) => {
                log::warn!(target: "shareasqr::ui::drop", "dropped {name} is not UTF-8: {err}");
                return None;
            }
        }
    } else {
        log::warn!(
            target: "shareasqr::ui::drop",
            "dropped_file_missing_path_and_bytes name={name}"
        );
        return None;
    };

    Some(request.with_extra(EXTRA_TEXT, text.trim_end_matches(['\r', '\n'])))
}
