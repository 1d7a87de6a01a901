#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(count) = bulksend::fuzzing::parse_bundle_lines_input(input) {
            debug_assert!(count <= input.lines().count());
        }
        if let Ok(count) = bulksend::fuzzing::parse_bundle_document_input(input) {
            debug_assert!(count >= 1 || input.trim_start().starts_with('['));
        }
    }
});
