#![no_main]

use libfuzzer_sys::fuzz_target;
use odactk_core::manifest::{
    ComponentIdentity, KindMatch, declared_exposed_paths, find_component, parse_documents,
};

fuzz_target!(|data: &[u8]| {
    // helm 출력과 component.yaml은 모두 다중 문서 YAML 텍스트
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(documents) = parse_documents(text, "fuzz-manifest.yaml") {
            if let Some(component) = find_component(&documents, KindMatch::Exact) {
                let _ = declared_exposed_paths(component);
            }
        }
        let _ = ComponentIdentity::from_manifest(text, "fuzz-manifest.yaml");
    }
});
