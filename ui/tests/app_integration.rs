//! Integration tests for the Share as QR window, driven through egui_kittest.

mod common;

use kittest::Queryable;
use shareasqr_business::{InboundRequest, IntentAction, PipelinePhase, EXTRA_TEXT};
use shareasqr_ui::widgets::{PREVIEW_LABEL, SHARE_BUTTON_LABEL};

use crate::common::TestCtx;

#[tokio::test]
async fn empty_window_shows_only_the_input() {
    let mut ctx = TestCtx::new_app();
    ctx.settle().await;
    let harness = ctx.harness_mut();

    assert!(
        harness.query_by_label(PREVIEW_LABEL).is_none(),
        "no preview without text"
    );
    assert!(
        harness.query_by_label(SHARE_BUTTON_LABEL).is_none(),
        "no share button without an image"
    );
    assert_eq!(harness.state().state.session.phase(), PipelinePhase::Idle);
}

#[tokio::test]
async fn entered_text_shows_preview_and_share_button() {
    let mut ctx = TestCtx::new_app();
    ctx.harness_mut()
        .state_mut()
        .state
        .session
        .set_input("https://example.com");
    ctx.settle().await;

    let harness = ctx.harness_mut();
    assert!(harness.query_by_label(PREVIEW_LABEL).is_some());
    assert!(harness.query_by_label(SHARE_BUTTON_LABEL).is_some());

    let app = harness.state();
    assert_eq!(app.state.input_buffer, "https://example.com");
    assert_eq!(
        app.state.preview.shown_text(),
        Some("https://example.com")
    );
}

#[tokio::test]
async fn share_button_hands_png_to_share_sheet() {
    let mut ctx = TestCtx::new_app();
    ctx.harness_mut()
        .state_mut()
        .state
        .session
        .set_input("share me");
    ctx.settle().await;

    ctx.harness_mut()
        .query_by_label(SHARE_BUTTON_LABEL)
        .expect("share button present")
        .click();
    ctx.settle().await;

    let shared = ctx.sheet.shared();
    assert_eq!(shared.len(), 1, "one share per click");
    let (chooser, bytes) = &shared[0];
    assert_eq!(chooser.title, "Share QR Code");
    assert_eq!(chooser.mime_type, "image/png");
    assert!(*bytes > 0);
    assert_eq!(
        ctx.harness_mut().state().state.session.phase(),
        PipelinePhase::Shared
    );
}

#[tokio::test]
async fn dropped_text_file_replaces_input() {
    let mut ctx = TestCtx::new_app();
    ctx.harness_mut().state_mut().state.session.set_input("typed");
    ctx.settle().await;

    ctx.drops.push(
        InboundRequest::new(IntentAction::Send, Some("text/plain"))
            .with_extra(EXTRA_TEXT, "dropped"),
    );
    ctx.settle().await;

    let app = ctx.harness_mut().state();
    assert_eq!(app.state.session.input(), "dropped");
    assert_eq!(app.state.input_buffer, "dropped");
    assert_eq!(app.state.preview.shown_text(), Some("dropped"));
}

#[tokio::test]
async fn dropped_image_is_ignored() {
    let mut ctx = TestCtx::new_app();
    ctx.harness_mut().state_mut().state.session.set_input("kept");
    ctx.settle().await;

    ctx.drops
        .push(InboundRequest::new(IntentAction::Send, Some("image/jpeg")));
    ctx.settle().await;

    let app = ctx.harness_mut().state();
    assert_eq!(app.state.session.input(), "kept");
    assert_eq!(app.state.preview.shown_text(), Some("kept"));
}

#[tokio::test]
async fn oversized_text_shows_failure_and_hides_share() {
    let mut ctx = TestCtx::new_app();
    ctx.harness_mut()
        .state_mut()
        .state
        .session
        .set_input("x".repeat(3000));
    ctx.settle().await;

    let harness = ctx.harness_mut();
    assert_eq!(
        harness.state().state.session.phase(),
        PipelinePhase::EncodeFailed
    );
    assert!(harness.query_by_label(SHARE_BUTTON_LABEL).is_none());
    assert!(harness.query_by_label(PREVIEW_LABEL).is_none());
}
