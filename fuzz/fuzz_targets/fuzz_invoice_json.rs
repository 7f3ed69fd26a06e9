#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(invoices) = edibridge::transcode::invoices_from_json(data) {
        let _ = edibridge::transcode::serialize_lingo(&invoices, "FUZZ");
    }
});
