#![no_main]

use bulksend::config::types::ConfigFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let parsed: Option<ConfigFile> = toml::from_str(input).ok();
        let applied = bulksend::fuzzing::apply_config_from_toml(input);
        if applied.is_ok() {
            if let Some(config) = parsed {
                debug_assert!(!(config.bundle.is_some() && config.data.is_some()));
                if let Some(statuses) = config.resend_status.as_ref() {
                    debug_assert!(statuses.iter().all(|status| (100..=599).contains(status)));
                }
            }
        }
    }
});
