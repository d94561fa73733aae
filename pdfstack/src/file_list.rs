//! The ordered list of selected PDF files.
//!
//! The list is the single source of truth for merge order. Every mutation
//! persists the name-only projection ([`FileListRecord`]) so that a later
//! session can show what was selected, even though the file contents
//! themselves cannot be restored.

use crate::error::{PdfStackError, Result};
use crate::selection::SelectedFile;
use crate::storage::{FileListRecord, Repository};

/// User-ordered sequence of selected PDFs with unique names.
pub struct OrderedFileList {
    files: Vec<SelectedFile>,
    repo: Repository,
}

impl OrderedFileList {
    /// Create an empty list persisting through `repo`.
    ///
    /// Nothing is read from storage here; see [`Self::restore_placeholders`].
    pub fn new(repo: Repository) -> Self {
        Self {
            files: Vec::new(),
            repo,
        }
    }

    /// Replace the whole list.
    ///
    /// Non-PDF entries are dropped without notice. When two files share a
    /// name, the later one replaces the earlier but keeps its position.
    pub fn set_all(&mut self, files: impl IntoIterator<Item = SelectedFile>) -> Result<()> {
        let mut next: Vec<SelectedFile> = Vec::new();

        for file in files.into_iter().filter(SelectedFile::is_pdf) {
            match next.iter_mut().find(|f| f.name() == file.name()) {
                Some(existing) => *existing = file,
                None => next.push(file),
            }
        }

        self.files = next;
        self.persist()
    }

    /// Remove the entry named `name` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::FileNotInSelection`] for unknown names.
    pub fn remove(&mut self, name: &str) -> Result<SelectedFile> {
        let index = self
            .position(name)
            .ok_or_else(|| PdfStackError::not_in_selection(name))?;

        let removed = self.files.remove(index);
        self.persist()?;
        Ok(removed)
    }

    /// Replace the list with the files named in `new_order`, in that order.
    ///
    /// Unknown names are skipped, as are repeats of a name already placed.
    /// Files not named in `new_order` leave the list.
    pub fn reorder<S: AsRef<str>>(&mut self, new_order: &[S]) -> Result<()> {
        let mut pool: Vec<Option<SelectedFile>> =
            std::mem::take(&mut self.files).into_iter().map(Some).collect();

        for name in new_order {
            let slot = pool
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|f| f.name() == name.as_ref()));

            if let Some(file) = slot.and_then(Option::take) {
                self.files.push(file);
            }
        }

        self.persist()
    }

    /// Empty the list and forget the persisted names.
    pub fn clear(&mut self) -> Result<()> {
        self.files.clear();
        self.repo.delete::<FileListRecord>()
    }

    /// Names persisted by an earlier session.
    ///
    /// These are display-only placeholders; the user has to reselect the
    /// files before they can be previewed or merged.
    pub fn restore_placeholders(&self) -> Result<Vec<String>> {
        Ok(self
            .repo
            .load::<FileListRecord>()?
            .map(|record| record.0)
            .unwrap_or_default())
    }

    /// Current names in list order.
    pub fn names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.name().to_string()).collect()
    }

    /// Current files in list order.
    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    /// Look up a file by name.
    pub fn get(&self, name: &str) -> Option<&SelectedFile> {
        self.files.iter().find(|f| f.name() == name)
    }

    /// Index of the file named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|f| f.name() == name)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn persist(&self) -> Result<()> {
        self.repo.save(&FileListRecord(self.names()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use pretty_assertions::assert_eq;

    fn pdf(name: &str) -> SelectedFile {
        SelectedFile::from_bytes(name, name.as_bytes().to_vec())
    }

    fn list_of(names: &[&str]) -> (OrderedFileList, MemoryStore) {
        let store = MemoryStore::new();
        let mut list = OrderedFileList::new(Repository::new(store.clone()));
        list.set_all(names.iter().map(|n| pdf(n))).unwrap();
        (list, store)
    }

    #[test]
    fn test_set_all_drops_non_pdf_and_persists_names() {
        let (list, store) = list_of(&["a.pdf", "notes.txt", "b.pdf"]);

        assert_eq!(list.names(), vec!["a.pdf", "b.pdf"]);
        assert_eq!(
            store.get("pdfFileList").unwrap().as_deref(),
            Some(r#"["a.pdf","b.pdf"]"#)
        );
    }

    #[test]
    fn test_set_all_duplicate_name_keeps_first_position() {
        let store = MemoryStore::new();
        let mut list = OrderedFileList::new(Repository::new(store));
        list.set_all([
            SelectedFile::from_bytes("a.pdf", vec![1u8]),
            SelectedFile::from_bytes("b.pdf", vec![2u8]),
            SelectedFile::from_bytes("a.pdf", vec![3u8, 3]),
        ])
        .unwrap();

        assert_eq!(list.names(), vec!["a.pdf", "b.pdf"]);
        assert_eq!(list.get("a.pdf").unwrap().size_bytes(), 2);
    }

    #[test]
    fn test_remove_middle_entry() {
        let (mut list, store) = list_of(&["a.pdf", "b.pdf", "c.pdf"]);

        let removed = list.remove("b.pdf").unwrap();

        assert_eq!(removed.name(), "b.pdf");
        assert_eq!(list.names(), vec!["a.pdf", "c.pdf"]);
        assert_eq!(
            store.get("pdfFileList").unwrap().as_deref(),
            Some(r#"["a.pdf","c.pdf"]"#)
        );
    }

    #[test]
    fn test_remove_unknown_name() {
        let (mut list, _) = list_of(&["a.pdf"]);
        let err = list.remove("zzz.pdf").unwrap_err();
        assert!(matches!(err, PdfStackError::FileNotInSelection { .. }));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_reorder_is_resolved_subsequence() {
        let (mut list, _) = list_of(&["a.pdf", "b.pdf", "c.pdf"]);

        list.reorder(&["c.pdf", "ghost.pdf", "a.pdf", "c.pdf"]).unwrap();

        assert_eq!(list.names(), vec!["c.pdf", "a.pdf"]);
    }

    #[test]
    fn test_reorder_full_permutation() {
        let (mut list, store) = list_of(&["a.pdf", "b.pdf", "c.pdf"]);

        list.reorder(&["b.pdf", "c.pdf", "a.pdf"]).unwrap();

        assert_eq!(list.names(), vec!["b.pdf", "c.pdf", "a.pdf"]);
        assert_eq!(
            store.get("pdfFileList").unwrap().as_deref(),
            Some(r#"["b.pdf","c.pdf","a.pdf"]"#)
        );
    }

    #[test]
    fn test_clear_removes_persisted_names() {
        let (mut list, store) = list_of(&["a.pdf", "b.pdf"]);

        list.clear().unwrap();

        assert!(list.is_empty());
        assert_eq!(store.get("pdfFileList").unwrap(), None);
        assert!(list.restore_placeholders().unwrap().is_empty());
    }

    #[test]
    fn test_restore_placeholders_from_earlier_session() {
        let (_, store) = list_of(&["a.pdf", "b.pdf"]);

        let fresh = OrderedFileList::new(Repository::new(store));

        assert!(fresh.is_empty());
        assert_eq!(fresh.restore_placeholders().unwrap(), vec!["a.pdf", "b.pdf"]);
    }
}
