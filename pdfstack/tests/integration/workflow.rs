//! Selecting, arranging and merging files on disk.

use pdfstack::config::SortOrder;
use pdfstack::output::Notice;
use pdfstack::preview::PreviewSlot;
use pdfstack::workspace::{MERGED_STATUS, PREVIEW_STATUS, RESTORED_STATUS};
use pretty_assertions::assert_eq;

use crate::common::{TestBed, page_count};

#[tokio::test]
async fn test_select_merge_and_list_history() {
    let bed = TestBed::new();
    let a = bed.pdf("a.pdf", 2);
    let b = bed.pdf("b.pdf", 3);
    let mut workspace = bed.workspace();

    workspace.select([&a, &b]).await.unwrap();
    let outcome = workspace.merge(Some("out.pdf")).await.unwrap();

    assert_eq!(outcome.name, "out.pdf");
    assert_eq!(outcome.written.path, bed.downloads().join("out.pdf"));
    assert_eq!(page_count(&outcome.written.path), 5);
    assert_eq!(workspace.status(), MERGED_STATUS);

    let rows = workspace.history_rows(Some(SortOrder::Newest));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "out.pdf");
    assert!(bed.notifier.alerts().is_empty());
}

#[tokio::test]
async fn test_non_pdf_is_dropped_with_one_notice() {
    let bed = TestBed::new();
    let a = bed.pdf("a.pdf", 1);
    let txt = bed.file("b.txt", b"not a pdf");
    let md = bed.file("c.md", b"# notes");
    let mut workspace = bed.workspace();

    workspace.select([a, txt, md]).await.unwrap();

    assert_eq!(workspace.names(), vec!["a.pdf"]);
    assert_eq!(bed.notifier.alerts(), vec!["Only PDF files are allowed!"]);
    assert_eq!(workspace.status(), PREVIEW_STATUS);
}

#[tokio::test]
async fn test_merge_follows_reordered_list() {
    let bed = TestBed::new();
    let one = bed.pdf("one.pdf", 1);
    let two = bed.pdf("two.pdf", 2);
    let three = bed.pdf("three.pdf", 3);
    let mut workspace = bed.workspace();

    workspace.select([one, two, three]).await.unwrap();
    workspace.move_item("three.pdf", 0).unwrap();
    workspace.move_item("one.pdf", 2).unwrap();
    assert_eq!(workspace.names(), vec!["three.pdf", "two.pdf", "one.pdf"]);

    let outcome = workspace.merge(Some("reordered")).await.unwrap();

    // Page one of the result is page one of three.pdf.
    let merged = lopdf::Document::load(&outcome.written.path).unwrap();
    let first_page = merged.get_pages()[&1];
    let content = merged.get_page_content(first_page).unwrap();
    assert!(String::from_utf8_lossy(&content).contains("three.pdf 1"));
    assert_eq!(merged.get_pages().len(), 6);
}

#[tokio::test]
async fn test_remove_keeps_remaining_order() {
    let bed = TestBed::new();
    let paths = [bed.pdf("a.pdf", 1), bed.pdf("b.pdf", 1), bed.pdf("c.pdf", 1)];
    let mut workspace = bed.workspace();

    workspace.select(&paths).await.unwrap();
    let slots = workspace.remove("b.pdf").await.unwrap();

    let tiles: Vec<_> = slots.iter().map(PreviewSlot::name).collect();
    assert_eq!(tiles, vec!["a.pdf", "c.pdf"]);
    assert_eq!(workspace.names(), vec!["a.pdf", "c.pdf"]);
}

#[tokio::test]
async fn test_selection_is_restored_as_placeholders() {
    let bed = TestBed::new();
    let paths = [bed.pdf("a.pdf", 1), bed.pdf("b.pdf", 1)];

    let mut first = bed.workspace();
    first.select(&paths).await.unwrap();
    first.move_item("b.pdf", 0).unwrap();
    drop(first);

    let mut second = bed.workspace();
    let restored = second.restore().unwrap().to_vec();

    assert_eq!(restored, vec!["b.pdf", "a.pdf"]);
    assert_eq!(second.status(), RESTORED_STATUS);
    assert!(second.names().is_empty());
    assert_eq!(
        std::fs::read_to_string(bed.state_file("pdfFileList")).unwrap(),
        r#"["b.pdf","a.pdf"]"#
    );
}

#[tokio::test]
async fn test_clear_forgets_persisted_selection() {
    let bed = TestBed::new();
    let paths = [bed.pdf("a.pdf", 1), bed.pdf("b.pdf", 1)];
    let mut workspace = bed.workspace();

    workspace.select(&paths).await.unwrap();
    workspace.clear().unwrap();

    assert!(!bed.state_file("pdfFileList").exists());
    assert!(bed.workspace().restore().unwrap().is_empty());
    assert_eq!(
        bed.notifier.notices().last(),
        Some(&Notice::Status(String::new()))
    );
}

#[tokio::test]
async fn test_glob_and_directory_inputs() {
    let bed = TestBed::new();
    bed.pdf("b.pdf", 1);
    bed.pdf("a.pdf", 2);
    bed.file("notes.txt", b"skip me");
    let mut workspace = bed.workspace();

    let pattern = bed.inputs().join("*.pdf").to_string_lossy().into_owned();
    workspace.select([pattern]).await.unwrap();
    assert_eq!(workspace.names(), vec!["a.pdf", "b.pdf"]);
    assert!(bed.notifier.alerts().is_empty());

    let dir = bed.inputs().to_string_lossy().into_owned();
    workspace.select([dir]).await.unwrap();
    assert_eq!(workspace.names(), vec!["a.pdf", "b.pdf"]);
    assert_eq!(bed.notifier.alerts(), vec!["Only PDF files are allowed!"]);
}

#[tokio::test]
async fn test_previews_describe_files() {
    let bed = TestBed::new();
    let paths = [bed.pdf("short.pdf", 1), bed.pdf("long.pdf", 4)];
    let mut workspace = bed.workspace();

    let slots = workspace.select(&paths).await.unwrap();

    let labels: Vec<_> = slots
        .iter()
        .map(|slot| match slot {
            PreviewSlot::Ready(summary) => {
                assert_eq!(summary.page_dimensions, Some((595.0, 842.0)));
                summary.label()
            }
            other => panic!("unexpected slot {other:?}"),
        })
        .collect();

    assert!(labels[0].starts_with("short.pdf — 1 page — "));
    assert!(labels[1].starts_with("long.pdf — 4 pages — "));
}

#[tokio::test]
async fn test_second_merge_with_same_name_is_downloaded_beside_first() {
    let bed = TestBed::new();
    let paths = [bed.pdf("a.pdf", 1), bed.pdf("b.pdf", 1)];
    let mut workspace = bed.workspace();
    workspace.select(&paths).await.unwrap();

    let first = workspace.merge(Some("same")).await.unwrap();
    let second = workspace.merge(Some("same")).await.unwrap();

    assert_eq!(first.written.path, bed.downloads().join("same.pdf"));
    assert_eq!(second.written.path, bed.downloads().join("same (1).pdf"));
    assert_eq!(workspace.history().len(), 1);
    assert_eq!(
        workspace.history().get("same.pdf").unwrap().reference,
        second.reference
    );
}
