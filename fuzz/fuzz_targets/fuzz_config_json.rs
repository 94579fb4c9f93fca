//! Fuzz target for JSON pipeline configuration parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ss_config::Config;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = Config::from_json_str(text);
});
