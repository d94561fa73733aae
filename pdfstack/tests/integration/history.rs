//! History persistence and the actions on history rows.

use std::path::PathBuf;

use pdfstack::PdfStackError;
use pdfstack::blob::{BlobRegistry, ReferenceHandle};
use pdfstack::config::SortOrder;
use pdfstack::history::{
    Availability, FileFilter, HistoryStore, RowAction, SAVE_FAILURE_NOTICE, SAVE_SUCCESS_NOTICE,
    SavePicker,
};
use pdfstack::output::Notice;
use pdfstack::platform::PlatformAction;
use pdfstack::storage::{MemoryStore, Repository};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::{TestBed, page_count};

/// Answers every save dialog with the same path, or cancels.
struct FixedPicker(Option<PathBuf>);

impl SavePicker for FixedPicker {
    fn pick(&mut self, _suggested_name: &str, _filter: &FileFilter) -> pdfstack::Result<Option<PathBuf>> {
        Ok(self.0.clone())
    }
}

fn handle(n: u32) -> ReferenceHandle {
    ReferenceHandle::from_url(format!("blob:pdfstack/earlier/{n}"))
}

/// A workspace that merged a 1-page and a 2-page file as `name`.
async fn merged_workspace(bed: &TestBed, name: &str) -> pdfstack::Workspace {
    let paths = [bed.pdf("a.pdf", 1), bed.pdf("b.pdf", 2)];
    let mut workspace = bed.workspace();
    workspace.select(&paths).await.unwrap();
    workspace.merge(Some(name)).await.unwrap();
    workspace
}

#[test]
fn test_recording_same_name_twice_keeps_one_entry() {
    let mut store = HistoryStore::load(Repository::new(MemoryStore::new())).unwrap();

    store.record("x.pdf", handle(1), 100).unwrap();
    store.record("x.pdf", handle(2), 200).unwrap();

    assert_eq!(store.len(), 1);
    let entry = store.get("x.pdf").unwrap();
    assert_eq!(entry.reference, handle(2));
    assert_eq!(entry.timestamp, 200);
}

#[rstest]
#[case(&[("a.pdf", 300), ("b.pdf", 100), ("c.pdf", 200)])]
#[case(&[("a.pdf", 1), ("b.pdf", 2), ("c.pdf", 3), ("d.pdf", 4)])]
#[case(&[("solo.pdf", 42)])]
fn test_newest_is_reverse_of_oldest(#[case] entries: &[(&str, i64)]) {
    let mut store = HistoryStore::load(Repository::new(MemoryStore::new())).unwrap();
    for (n, (name, timestamp)) in entries.iter().enumerate() {
        store.record(name, handle(n as u32), *timestamp).unwrap();
    }
    let blobs = BlobRegistry::new();

    let names = |sort| -> Vec<String> {
        store
            .list(sort, &blobs)
            .into_iter()
            .map(|listing| listing.entry.name)
            .collect()
    };

    let mut oldest = names(SortOrder::Oldest);
    oldest.reverse();
    assert_eq!(names(SortOrder::Newest), oldest);
}

#[tokio::test]
async fn test_history_survives_restart_without_content() {
    let bed = TestBed::new();
    let first = merged_workspace(&bed, "kept").await;
    assert_eq!(
        first.history_rows(None)[0].availability,
        Availability::Available
    );
    drop(first);

    let mut second = bed.workspace();
    let rows = second.history_rows(None);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "kept.pdf");
    assert_eq!(rows[0].availability, Availability::ContentUnavailable);
    assert_eq!(
        rows[0].actions(),
        vec![RowAction::Rename, RowAction::Delete]
    );

    let err = second.open_entry("kept.pdf").await.unwrap_err();
    assert!(matches!(err, PdfStackError::ContentUnavailable { .. }));
}

#[tokio::test]
async fn test_persisted_history_shape() {
    let bed = TestBed::new();
    let workspace = merged_workspace(&bed, "report").await;
    let entry = workspace.history().get("report.pdf").unwrap().clone();

    let raw = std::fs::read_to_string(bed.state_file("mergeHistory")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "report.pdf": { "url": entry.reference.as_str(), "timestamp": entry.timestamp }
        })
    );
    assert!(entry.reference.as_str().starts_with("blob:pdfstack/"));
}

#[tokio::test]
async fn test_rename_and_delete_are_persisted() {
    let bed = TestBed::new();
    let mut workspace = bed.workspace();
    let paths = [bed.pdf("a.pdf", 1), bed.pdf("b.pdf", 1)];
    workspace.select(&paths).await.unwrap();
    workspace.merge(Some("first")).await.unwrap();
    workspace.merge(Some("second")).await.unwrap();

    assert_eq!(workspace.rename_entry("first.pdf", "renamed").unwrap(), "renamed.pdf");
    assert!(workspace.delete_entry("second.pdf").unwrap());
    drop(workspace);

    let reopened = bed.workspace();
    let names: Vec<_> = reopened
        .history_rows(None)
        .into_iter()
        .map(|row| row.name)
        .collect();
    assert_eq!(names, vec!["renamed.pdf"]);
}

#[tokio::test]
async fn test_rename_to_taken_name_is_refused() {
    let bed = TestBed::new();
    let mut workspace = bed.workspace();
    let paths = [bed.pdf("a.pdf", 1), bed.pdf("b.pdf", 1)];
    workspace.select(&paths).await.unwrap();
    workspace.merge(Some("one")).await.unwrap();
    workspace.merge(Some("two")).await.unwrap();

    let err = workspace.rename_entry("one.pdf", "two").unwrap_err();

    assert!(matches!(err, PdfStackError::HistoryNameTaken { ref name } if name == "two.pdf"));
    assert_eq!(workspace.history().len(), 2);
}

#[tokio::test]
async fn test_open_and_share_go_through_platform() {
    let bed = TestBed::new();
    let mut workspace = merged_workspace(&bed, "hist-open-share").await;

    let opened = workspace.open_entry("hist-open-share.pdf").await.unwrap();
    let shared = workspace.share_entry("hist-open-share.pdf").await.unwrap();

    assert_eq!(
        bed.platform.actions(),
        vec![
            PlatformAction::Open(opened.clone()),
            PlatformAction::Share(shared.clone()),
        ]
    );
    assert_eq!(page_count(&opened), 3);
    assert!(shared.ends_with("hist-open-share.pdf"));
}

#[tokio::test]
async fn test_download_again_lands_beside_first_download() {
    let bed = TestBed::new();
    let mut workspace = merged_workspace(&bed, "again").await;

    let written = workspace.download_entry("again.pdf").await.unwrap();

    assert_eq!(written.path, bed.downloads().join("again (1).pdf"));
    assert_eq!(page_count(&written.path), 3);
}

#[tokio::test]
async fn test_save_writes_where_picker_points() {
    let bed = TestBed::new();
    let mut workspace = merged_workspace(&bed, "keep").await;
    let target = bed.dir.path().join("saved").join("copy.pdf");

    let saved = workspace
        .save_entry("keep.pdf", &mut FixedPicker(Some(target.clone())))
        .await
        .unwrap();

    assert_eq!(saved.as_deref(), Some(target.as_path()));
    assert_eq!(page_count(&target), 3);
    assert_eq!(
        bed.notifier.notices().last(),
        Some(&Notice::Alert(SAVE_SUCCESS_NOTICE.to_string()))
    );
}

#[tokio::test]
async fn test_cancelled_save_notifies_failure() {
    let bed = TestBed::new();
    let mut workspace = merged_workspace(&bed, "keep").await;

    let saved = workspace
        .save_entry("keep.pdf", &mut FixedPicker(None))
        .await
        .unwrap();

    assert_eq!(saved, None);
    assert_eq!(
        bed.notifier.notices().last(),
        Some(&Notice::Alert(SAVE_FAILURE_NOTICE.to_string()))
    );
}

#[tokio::test]
async fn test_menu_is_exclusive_and_closed_by_actions() {
    let bed = TestBed::new();
    let mut workspace = bed.workspace();
    let paths = [bed.pdf("a.pdf", 1), bed.pdf("b.pdf", 1)];
    workspace.select(&paths).await.unwrap();
    workspace.merge(Some("m1")).await.unwrap();
    workspace.merge(Some("m2")).await.unwrap();

    let open_menus = |workspace: &pdfstack::Workspace| -> Vec<String> {
        workspace
            .history_rows(Some(SortOrder::Oldest))
            .into_iter()
            .filter(|row| row.menu_open)
            .map(|row| row.name)
            .collect()
    };

    workspace.toggle_menu("m1.pdf");
    workspace.toggle_menu("m2.pdf");
    assert_eq!(open_menus(&workspace), vec!["m2.pdf"]);

    workspace.download_entry("m1.pdf").await.unwrap();
    assert!(open_menus(&workspace).is_empty());
}
