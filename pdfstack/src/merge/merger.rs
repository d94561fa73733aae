//! lopdf-backed merge engine.
//!
//! The first document is the base. Every following document has its
//! objects renumbered above the base's highest id, is copied in wholesale,
//! and has its pages appended to the base's root page tree.

use lopdf::{Document, Object, ObjectId};
use std::time::{Duration, Instant};

use super::MergeEngine;
use crate::config::CompressionLevel;
use crate::error::{PdfStackError, Result};
use crate::io::{LoadedPdf, PdfReader};
use crate::utils::format_file_size;

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of documents merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Total size of the inputs.
    pub input_size: u64,

    /// Size of the serialized output.
    pub output_size: u64,

    /// Time spent decoding, merging and serializing.
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Merges PDFs with lopdf.
#[derive(Debug, Clone, Default)]
pub struct LopdfMerger {
    reader: PdfReader,
    compression: CompressionLevel,
}

impl LopdfMerger {
    /// Create a merger with the given output compression.
    pub fn new(compression: CompressionLevel) -> Self {
        Self {
            reader: PdfReader::new(),
            compression,
        }
    }

    fn merge_documents(&self, loaded: Vec<LoadedPdf>) -> Result<Document> {
        let mut documents = loaded.into_iter().map(|pdf| pdf.document);
        let mut merged = documents.next().ok_or(PdfStackError::NoFilesToMerge)?;
        let mut max_id = merged.max_id;

        for mut doc in documents {
            doc.renumber_objects_with(max_id + 1);
            max_id = doc.max_id;

            let doc_pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
            merged.objects.extend(doc.objects);
            merged.max_id = max_id;

            add_pages_to_tree(&mut merged, &doc_pages)?;
        }

        match self.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => merged.compress(),
            CompressionLevel::Maximum => {
                merged.compress();
                merged.prune_objects();
            }
        }

        merged.renumber_objects();
        Ok(merged)
    }
}

impl MergeEngine for LopdfMerger {
    fn merge_with_stats(&self, inputs: &[Vec<u8>]) -> Result<(Vec<u8>, MergeStatistics)> {
        let start = Instant::now();

        if inputs.is_empty() {
            return Err(PdfStackError::NoFilesToMerge);
        }

        let loaded = inputs
            .iter()
            .enumerate()
            .map(|(idx, bytes)| self.reader.decode(&format!("input #{}", idx + 1), bytes))
            .collect::<Result<Vec<_>>>()?;

        let mut merged = self.merge_documents(loaded)?;
        let total_pages = merged.get_pages().len();

        let mut output = Vec::new();
        merged.save_to(&mut output)?;

        let statistics = MergeStatistics {
            files_merged: inputs.len(),
            total_pages,
            input_size: inputs.iter().map(|bytes| bytes.len() as u64).sum(),
            output_size: output.len() as u64,
            merge_time: start.elapsed(),
        };

        tracing::info!(
            files = statistics.files_merged,
            pages = statistics.total_pages,
            input = %statistics.format_input_size(),
            output = %format_file_size(statistics.output_size),
            elapsed = ?statistics.merge_time,
            "merged documents"
        );

        Ok((output, statistics))
    }
}

/// Append `page_ids` to the root page tree and reparent them.
fn add_pages_to_tree(merged: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
    let pages_id = merged
        .catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| PdfStackError::merge_failed(format!("Failed to get pages reference: {e}")))?;

    let Ok(Object::Dictionary(pages)) = merged.get_object_mut(pages_id) else {
        return Err(PdfStackError::merge_failed("Pages object is not a dictionary"));
    };

    let Ok(Object::Array(kids)) = pages.get_mut(b"Kids") else {
        return Err(PdfStackError::merge_failed("Pages dictionary missing Kids array"));
    };
    kids.extend(page_ids.iter().map(|&id| Object::Reference(id)));

    let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    pages.set("Count", Object::Integer(count + page_ids.len() as i64));

    for &page_id in page_ids {
        if let Ok(Object::Dictionary(page)) = merged.get_object_mut(page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    Ok(())
}
