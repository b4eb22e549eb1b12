//! Fuzz target: `TemplateFilter` parsing against the sample broker section.

#![no_main]

use cse_core::{Config, TemplateFilter};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(filter) = name.parse::<TemplateFilter>();
    let config = Config::from_yaml_str(cse_core::sample_config()).expect("sample config must load");
    let broker = config.broker.as_ref().expect("sample config has a broker section");

    match filter.select(broker) {
        Ok(selected) => assert!(selected.iter().all(|t| filter.matches(t))),
        Err(_) => assert!(matches!(filter, TemplateFilter::Named(_))),
    }
});
