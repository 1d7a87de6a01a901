#![no_main]

use clap::Parser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut args = vec!["bulksend".to_owned()];
        for token in input.split_whitespace().take(64) {
            args.push(token.to_owned());
        }
        if let Ok(parsed) = bulksend::args::SenderArgs::try_parse_from(&args) {
            debug_assert!(parsed.rate.is_finite() && parsed.rate > 0.0);
            debug_assert!(parsed.repeat.get() >= 1);
            if let Some((low, high)) = parsed.random_delay {
                debug_assert!(low < high);
            }
        }
    }
});
