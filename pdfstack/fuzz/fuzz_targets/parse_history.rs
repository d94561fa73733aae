#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfstack::history::HistoryRecord;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(record) = serde_json::from_str::<HistoryRecord>(text) {
        // Names stay unique and survive a round trip.
        let json = serde_json::to_string(&record).unwrap();
        let again: HistoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, again);
    }
});
