//! Reading PDFs in and writing merged output out.

pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, PdfReader};
pub use writer::{OutputWriter, WrittenFile, write_to};
