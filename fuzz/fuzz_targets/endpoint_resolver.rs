#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use odactk_cluster::resolve_endpoints;
use odactk_core::types::{ComponentDeployment, DependentCorrelation};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// Component CR JSON 텍스트
    custom_resource: String,
    exposed_api_id: String,
    dependent_api_id: String,
    by_name: bool,
}

fuzz_target!(|input: FuzzInput| {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&input.custom_resource) else {
        return;
    };
    let Some(deployment) = ComponentDeployment::from_value(&value) else {
        return;
    };

    let correlation = if input.by_name {
        DependentCorrelation::ByName
    } else {
        DependentCorrelation::Positional
    };
    let endpoints = resolve_endpoints(
        &deployment,
        &input.exposed_api_id,
        &input.dependent_api_id,
        correlation,
    );

    // 빈 식별자는 절대 해석되지 않아야 함
    if input.dependent_api_id.is_empty() {
        assert!(endpoints.dependent.is_none());
    }
});
