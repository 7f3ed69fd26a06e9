#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Raw bytes, including invalid UTF-8 and byte order marks.
    let _ = edibridge::transcode::detect_and_parse_bytes(data);
});
