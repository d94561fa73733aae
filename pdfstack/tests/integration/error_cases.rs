//! Failure paths seen from the workspace.

use pdfstack::PdfStackError;
use pdfstack::config::OverwriteMode;
use pdfstack::preview::PreviewSlot;
use pdfstack::workspace::INSUFFICIENT_SELECTION_NOTICE;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;

use crate::common::TestBed;

#[rstest]
#[case::nothing_selected(0)]
#[case::one_file(1)]
#[tokio::test]
async fn test_merge_needs_two_files(#[case] count: usize) {
    let bed = TestBed::new();
    let paths: Vec<_> = (0..count)
        .map(|n| bed.pdf(&format!("f{n}.pdf"), 1))
        .collect();
    let mut workspace = bed.workspace();
    if !paths.is_empty() {
        workspace.select(&paths).await.unwrap();
    }

    let err = workspace.merge(Some("never")).await.unwrap_err();

    assert!(matches!(err, PdfStackError::InsufficientSelection { selected } if selected == count));
    assert_eq!(bed.notifier.alerts(), vec![INSUFFICIENT_SELECTION_NOTICE]);
    assert!(workspace.history().is_empty());
    assert!(!bed.downloads().join("never.pdf").exists());
}

#[tokio::test]
async fn test_missing_input_fails_selection() {
    let bed = TestBed::new();
    let a = bed.pdf("a.pdf", 1);
    let missing = bed.inputs().join("gone.pdf").to_string_lossy().into_owned();
    let mut workspace = bed.workspace();

    let err = workspace.select([a, missing]).await.unwrap_err();

    assert!(matches!(err, PdfStackError::FileNotFound { .. }));
    assert!(workspace.names().is_empty());
}

#[tokio::test]
async fn test_corrupt_pdf_previews_as_failed_and_blocks_merge() {
    let bed = TestBed::new();
    let good = bed.pdf("good.pdf", 1);
    let bad = bed.file("bad.pdf", b"%PDF-1.4\nthis is not a document");
    let mut workspace = bed.workspace();

    let slots = workspace.select([good, bad]).await.unwrap();
    assert!(matches!(slots[0], PreviewSlot::Ready(_)));
    assert!(matches!(slots[1], PreviewSlot::Failed { ref name, .. } if name == "bad.pdf"));

    let err = workspace.merge(Some("broken")).await.unwrap_err();

    assert!(matches!(
        err,
        PdfStackError::FailedToLoadPdf { .. } | PdfStackError::CorruptedPdf { .. }
    ));
    assert!(workspace.history().is_empty());
}

#[tokio::test]
async fn test_no_clobber_refuses_existing_download() {
    let bed = TestBed::new();
    let paths = [bed.pdf("a.pdf", 1), bed.pdf("b.pdf", 1)];
    std::fs::create_dir_all(bed.downloads()).unwrap();
    std::fs::write(bed.downloads().join("taken.pdf"), b"keep me").unwrap();

    let mut config = bed.config();
    config.overwrite_mode = OverwriteMode::NoClobber;
    let mut workspace = pdfstack::Workspace::open(
        &config,
        Arc::new(bed.platform.clone()),
        Arc::new(bed.notifier.clone()),
    )
    .unwrap();
    workspace.select(&paths).await.unwrap();

    let err = workspace.merge(Some("taken")).await.unwrap_err();

    assert!(matches!(err, PdfStackError::OutputExists { .. }));
    assert_eq!(std::fs::read(bed.downloads().join("taken.pdf")).unwrap(), b"keep me");
}

#[tokio::test]
async fn test_blank_merge_name_cancels() {
    let bed = TestBed::new();
    let paths = [bed.pdf("a.pdf", 1), bed.pdf("b.pdf", 1)];
    let mut workspace = bed.workspace();
    workspace.select(&paths).await.unwrap();

    let err = workspace.merge(Some("   ")).await.unwrap_err();

    assert!(matches!(err, PdfStackError::Cancelled));
    assert!(workspace.history().is_empty());
}

#[tokio::test]
async fn test_moving_unknown_file_leaves_order() {
    let bed = TestBed::new();
    let paths = [bed.pdf("a.pdf", 1), bed.pdf("b.pdf", 1)];
    let mut workspace = bed.workspace();
    workspace.select(&paths).await.unwrap();

    let err = workspace.move_item("c.pdf", 0).unwrap_err();

    assert!(matches!(err, PdfStackError::FileNotInSelection { .. }));
    assert_eq!(workspace.names(), vec!["a.pdf", "b.pdf"]);

    // The failed gesture must not block the next one.
    workspace.move_item("b.pdf", 0).unwrap();
    assert_eq!(workspace.names(), vec!["b.pdf", "a.pdf"]);
}

#[tokio::test]
async fn test_removing_unknown_file_fails() {
    let bed = TestBed::new();
    let paths = [bed.pdf("a.pdf", 1), bed.pdf("b.pdf", 1)];
    let mut workspace = bed.workspace();
    workspace.select(&paths).await.unwrap();

    let err = workspace.remove("zzz.pdf").await.unwrap_err();

    assert!(matches!(err, PdfStackError::FileNotInSelection { .. }));
    assert_eq!(workspace.names().len(), 2);
}

#[tokio::test]
async fn test_unknown_history_entry() {
    let bed = TestBed::new();
    let mut workspace = bed.workspace();

    let err = workspace.download_entry("nope.pdf").await.unwrap_err();
    assert!(matches!(err, PdfStackError::EntryNotFound { .. }));

    let err = workspace.rename_entry("nope.pdf", "other").unwrap_err();
    assert!(matches!(err, PdfStackError::EntryNotFound { .. }));

    assert!(!workspace.delete_entry("nope.pdf").unwrap());
}

#[tokio::test]
async fn test_malformed_history_file_is_reported() {
    let bed = TestBed::new();
    let state = bed.dir.path().join("state");
    std::fs::create_dir_all(&state).unwrap();
    std::fs::write(bed.state_file("mergeHistory"), "[1, 2, 3]").unwrap();

    let result = pdfstack::Workspace::open(
        &bed.config(),
        Arc::new(bed.platform.clone()),
        Arc::new(bed.notifier.clone()),
    );

    assert!(matches!(result, Err(PdfStackError::Storage { .. })));
}
