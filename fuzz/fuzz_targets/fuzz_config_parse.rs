//! Fuzz target: YAML parsing and validation of `Config`.
//!
//! Arbitrary documents must be rejected with an error, never a panic.

#![no_main]

use cse_core::Config;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = Config::from_yaml_str(text) {
        // Anything accepted must print a usable endpoint.
        assert!(!config.amqp.endpoint().to_string().is_empty());
        assert!(config.service.listeners >= 1);
    }
});
