//! Fuzz target for TOML pipeline configuration parsing.
//!
//! Tests that parsing plus semantic validation handles arbitrary input
//! without panicking, and that accepted configs build every stage.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ss_config::Config;
use ss_core::StreamStory;

fuzz_target!(|data: &str| {
    // Parsing should never panic, only return an error
    if let Ok(config) = Config::from_toml_str(data) {
        // A validated config must always construct
        assert!(StreamStory::from_config(&config, vec!["s0"]).is_ok());
    }
});
