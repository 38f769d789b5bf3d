//! Inbound share requests.
//!
//! Another application (or the desktop shell, via drag-and-drop) hands us a
//! request. Only "send plain text" requests prefill the input; everything else
//! is logged and ignored.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::error::{PipelineError, Result};

/// Extra key carrying the shared text payload.
pub const EXTRA_TEXT: &str = "extra.TEXT";

/// Extra key carrying a content reference (used by outbound image shares).
pub const EXTRA_STREAM: &str = "extra.STREAM";

pub const MIME_TEXT_PLAIN: &str = "text/plain";

pub const MIME_IMAGE_PNG: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentAction {
    /// Generic "send this to someone".
    Send,
    View,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub action: IntentAction,
    pub mime_type: Option<String>,
    pub extras: BTreeMap<String, String>,
}

impl InboundRequest {
    pub fn new(action: IntentAction, mime_type: Option<&str>) -> Self {
        Self {
            action,
            mime_type: mime_type.map(str::to_owned),
            extras: BTreeMap::new(),
        }
    }

    /// A well-formed "share plain text" request.
    pub fn share_text(text: impl Into<String>) -> Self {
        Self::new(IntentAction::Send, Some(MIME_TEXT_PLAIN)).with_extra(EXTRA_TEXT, text)
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }
}

/// `type/subtype` without parameters, lowercased.
fn mime_essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Extracts the payload of a "share plain text" request.
pub fn resolve_shared_text(request: &InboundRequest) -> Result<String> {
    if request.action != IntentAction::Send {
        return Err(PipelineError::resolve_mismatch(format!(
            "unhandled action {:?}",
            request.action
        )));
    }

    let Some(mime_type) = request.mime_type.as_deref() else {
        return Err(PipelineError::resolve_mismatch("request has no MIME type"));
    };
    if mime_essence(mime_type) != MIME_TEXT_PLAIN {
        return Err(PipelineError::resolve_mismatch(format!(
            "unhandled MIME type {mime_type}"
        )));
    }

    request
        .extra(EXTRA_TEXT)
        .map(str::to_owned)
        .ok_or_else(|| PipelineError::resolve_mismatch("plain-text share without text payload"))
}

/// Logging boundary around [`resolve_shared_text`]. `None` means nothing to prefill.
pub fn resolve(request: Option<&InboundRequest>) -> Option<String> {
    let Some(request) = request else {
        debug!(target: "shareasqr::intent", "no inbound request");
        return None;
    };

    match resolve_shared_text(request) {
        Ok(text) => {
            debug!(
                target: "shareasqr::intent",
                "shared text received ({} bytes)",
                text.len()
            );
            Some(text)
        }
        Err(err) => {
            warn!(target: "shareasqr::intent", "{}: {err}", err.kind());
            None
        }
    }
}

/// Producer side of the inbound request queue, cloneable across threads.
pub type InboundSender = flume::Sender<InboundRequest>;

/// Consumer side of the inbound request queue, owned by the session.
pub type InboundReceiver = flume::Receiver<InboundRequest>;

pub fn inbound_channel() -> (InboundSender, InboundReceiver) {
    flume::unbounded()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_share_resolves_to_payload() {
        let request = InboundRequest::share_text("Hello World");
        assert_eq!(resolve(Some(&request)).as_deref(), Some("Hello World"));
    }

    #[test]
    fn mime_parameters_and_case_are_ignored() {
        let request = InboundRequest::new(IntentAction::Send, Some("Text/Plain; charset=utf-8"))
            .with_extra(EXTRA_TEXT, "hi");
        assert_eq!(resolve_shared_text(&request).ok().as_deref(), Some("hi"));
    }

    #[test]
    fn other_mime_types_are_mismatches() {
        let request =
            InboundRequest::new(IntentAction::Send, Some("image/jpeg")).with_extra(EXTRA_TEXT, "x");

        let err = resolve_shared_text(&request).expect_err("jpeg is not text");
        assert!(matches!(err, PipelineError::ResolveMismatch { .. }));
        assert!(err.to_string().contains("image/jpeg"));
        assert_eq!(resolve(Some(&request)), None);
    }

    #[test]
    fn non_send_actions_are_mismatches() {
        let view = InboundRequest::new(IntentAction::View, Some(MIME_TEXT_PLAIN))
            .with_extra(EXTRA_TEXT, "x");
        let other = InboundRequest::new(IntentAction::Other("EDIT".to_owned()), None);

        assert_eq!(resolve(Some(&view)), None);
        assert_eq!(resolve(Some(&other)), None);
    }

    #[test]
    fn missing_type_or_payload_resolves_to_nothing() {
        let untyped = InboundRequest::new(IntentAction::Send, None).with_extra(EXTRA_TEXT, "x");
        let empty = InboundRequest::new(IntentAction::Send, Some(MIME_TEXT_PLAIN));

        assert_eq!(resolve(Some(&untyped)), None);
        assert_eq!(resolve(Some(&empty)), None);
        assert_eq!(resolve(None), None);
    }

    #[test]
    fn requests_flow_through_the_inbound_channel() {
        let (send, recv) = inbound_channel();
        send.send(InboundRequest::share_text("queued"))
            .expect("receiver alive");

        let request = recv.try_recv().expect("one request queued");
        assert_eq!(request.extra(EXTRA_TEXT), Some("queued"));
    }
}
