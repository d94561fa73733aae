#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfstack::io::PdfReader;
use pdfstack::preview::PreviewSummary;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must come back as an error, never a panic.
    if let Ok(loaded) = PdfReader::new().decode("fuzz.pdf", data) {
        let _ = PreviewSummary::from_loaded(&loaded).label();
    }
});
