#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Parse -> serialize -> parse must not panic at any step.
        if let Ok(parsed) = edibridge::lingo::from_lingo_xml(s) {
            if let Ok(xml2) = edibridge::lingo::to_lingo_xml(&parsed.orders, "FUZZ") {
                let _ = edibridge::lingo::from_lingo_xml(&xml2);
            }
        }
    }
});
