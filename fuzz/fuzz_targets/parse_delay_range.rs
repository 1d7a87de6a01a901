#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok((low, high)) = bulksend::fuzzing::parse_delay_range_input(input) {
            debug_assert!(low < high);
        }
    }
});
