//! Fuzz target: `SystemConfig::from_json_str`
//!
//! Feeds arbitrary text to the configuration parser and checks:
//! - No panics under any input
//! - Any accepted configuration passes `validate()` and yields a
//!   non-empty magnetron window
//!
//! cargo fuzz run fuzz_config

#![no_main]

use libfuzzer_sys::fuzz_target;
use microwave::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = SystemConfig::from_json_str(text) {
        assert!(config.validate().is_ok(), "accepted config must validate");
        assert!(config.magnetron_window_len() >= 1);
    }
});
