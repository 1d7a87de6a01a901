#![no_main]

use bulksend::config::types::ConfigFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let parsed: Option<ConfigFile> = serde_json::from_slice(data).ok();
    let applied = bulksend::fuzzing::apply_config_from_json(data);
    if applied.is_ok() {
        if let Some(config) = parsed {
            debug_assert!(!(config.bundle.is_some() && config.data.is_some()));
            if let Some(rate) = config.rate {
                debug_assert!(rate.is_finite() && rate > 0.0);
            }
        }
    }
});
