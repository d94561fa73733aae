//! Shared helpers: PDFs generated with lopdf and a workspace on a temp dir.

#![allow(dead_code)]

use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use pdfstack::Workspace;
use pdfstack::config::{Config, OverwriteMode};
use pdfstack::output::RecordingNotifier;
use pdfstack::platform::RecordingPlatform;

/// Serialize a PDF with `pages` pages, each showing `label` and its number.
pub fn pdf_bytes(pages: usize, label: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|number| {
            let text = format!("BT /F1 18 Tf 72 720 Td ({label} {number}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Contents" => content_id,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Count the pages of a PDF on disk.
pub fn page_count(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}

/// A temp directory with `inputs/`, `state/` and `downloads/`.
pub struct TestBed {
    pub dir: TempDir,
    pub notifier: RecordingNotifier,
    pub platform: RecordingPlatform,
}

impl TestBed {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("inputs")).unwrap();

        Self {
            dir,
            notifier: RecordingNotifier::new(),
            platform: RecordingPlatform::default(),
        }
    }

    pub fn config(&self) -> Config {
        let mut config = Config::with_state_dir(self.dir.path().join("state"));
        config.output_dir = self.downloads();
        config.overwrite_mode = OverwriteMode::Rename;
        config.jobs = Some(2);
        config
    }

    /// A fresh workspace on the persisted state, as after a restart.
    pub fn workspace(&self) -> Workspace {
        Workspace::open(
            &self.config(),
            Arc::new(self.platform.clone()),
            Arc::new(self.notifier.clone()),
        )
        .unwrap()
    }

    pub fn inputs(&self) -> PathBuf {
        self.dir.path().join("inputs")
    }

    pub fn downloads(&self) -> PathBuf {
        self.dir.path().join("downloads")
    }

    pub fn state_file(&self, key: &str) -> PathBuf {
        self.dir.path().join("state").join(format!("{key}.json"))
    }

    /// Write a PDF into `inputs/` and return its path as a string.
    pub fn pdf(&self, name: &str, pages: usize) -> String {
        self.file(name, &pdf_bytes(pages, name))
    }

    /// Write arbitrary bytes into `inputs/`.
    pub fn file(&self, name: &str, bytes: &[u8]) -> String {
        let path = self.inputs().join(name);
        std::fs::write(&path, bytes).unwrap();
        path.to_string_lossy().into_owned()
    }
}
