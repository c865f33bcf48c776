#![no_main]

use libfuzzer_sys::fuzz_target;
use odactk_scenario::FeatureFile;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        if let Ok(feature) = FeatureFile::parse(yaml_str, "fuzz-feature.yaml") {
            for scenario in &feature.scenarios {
                let _ = scenario.is_selected(&feature.tags, "tmfc028");
            }
        }
    }
});
