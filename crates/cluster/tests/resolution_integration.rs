//! 스냅샷 파일에서 엔드포인트와 스텁까지 이어지는 통합 테스트
//!
//! 클러스터와 helm 없이, 공개 API와 테스트용 구현만으로 검증합니다.

use std::collections::HashMap;
use std::path::PathBuf;

use odactk_cluster::{
    ComponentApi, DiscoveryError, DiscoverySettings, EndpointDiscovery, EndpointSource,
    ReleaseManifests, StubMatcher, StubQuery,
};
use odactk_core::config::CtkConfig;
use odactk_core::types::{DependentCorrelation, Headers};
use serde_json::json;

/// 호출되면 실패하는 Component API (스냅샷만으로 충분해야 함)
struct UnreachableCluster;

impl ComponentApi for UnreachableCluster {
    async fn list_components(
        &self,
        _version: &str,
        _namespace: &str,
        _name: &str,
    ) -> Result<Vec<serde_json::Value>, DiscoveryError> {
        Err(DiscoveryError::KubeConnection("no cluster in tests".to_owned()))
    }
}

/// 릴리스 이름 -> 매니페스트 고정 응답
struct StaticReleases(HashMap<String, String>);

impl ReleaseManifests for StaticReleases {
    async fn rendered_manifest(
        &self,
        release: &str,
        _namespace: &str,
    ) -> Result<String, DiscoveryError> {
        self.0
            .get(release)
            .cloned()
            .ok_or_else(|| DiscoveryError::HelmCommand {
                release: release.to_owned(),
                reason: "release: not found".to_owned(),
            })
    }
}

const CONFIG: &str = r#"
[[dependent_stubs]]
component = "tmfc028"
name = "inventory"
release_name = "stub-inventory"

[[dependent_stubs]]
component = "tmfc028"
name = "catalog"
release_name = "stub-catalog"
headers = { "X-Stub" = "catalog" }
"#;

fn stub_manifest(path: &str) -> String {
    format!(
        "apiVersion: oda.tmforum.org/v1\nkind: Component\nmetadata:\n  name: stub\n\
         spec:\n  coreFunction:\n    exposedAPIs:\n      - name: api\n        path: {path}\n"
    )
}

#[tokio::test]
async fn snapshot_endpoints_feed_stub_matching() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = dir.path().join("deployment.json");
    let cr = json!({
        "spec": {"coreFunction": {
            "exposedAPIs": [{"id": "TMF632", "implementation": "r1-party"}],
            "dependentAPIs": [{"name": "catalog", "specification": [{"url": "https://specs/TMF620-ProductCatalog.json"}]}]
        }},
        "status": {
            "coreAPIs": [{"implementation": "r1-party", "url": "https://host/r1/tmf-api/party/v4"}],
            "coreDependentAPIs": [{"name": "catalog", "url": "https://host/stub-catalog/tmf-api/productCatalogManagement/v4"}]
        }
    });
    std::fs::write(&snapshot, json!({"body": {"items": [cr]}}).to_string()).expect("write");

    let discovery = EndpointDiscovery::new(
        UnreachableCluster,
        DiscoverySettings {
            namespace: "components".to_owned(),
            component_file: PathBuf::from("/nonexistent/component.yaml"),
            snapshot: Some(snapshot),
            correlation: DependentCorrelation::Positional,
        },
    );
    let endpoints = discovery.discover("tmf632", "TMF620").await;
    let dependent_url = endpoints.dependent.expect("dependent url");
    assert_eq!(
        endpoints.exposed.as_deref(),
        Some("https://host/r1/tmf-api/party/v4")
    );

    let config = CtkConfig::parse(CONFIG).expect("config");
    let candidates = config.stub_candidates("TMFC028");
    let matcher = StubMatcher::new(StaticReleases(HashMap::from([
        (
            "stub-inventory".to_owned(),
            stub_manifest("/stub-inventory/tmf-api/resourceInventory/v4"),
        ),
        (
            "stub-catalog".to_owned(),
            stub_manifest("/stub-catalog/tmf-api/productCatalogManagement/v4"),
        ),
    ])));

    let query = StubQuery {
        component_under_test: "tmfc028",
        dependent_component: "tmfc001",
        dependent_url: &dependent_url,
        namespace: "components",
    };
    let resolved = matcher
        .resolve(&query, &candidates, &Headers::new())
        .await
        .expect("catalog stub should match");

    assert_eq!(resolved.release_name, "stub-catalog");
    assert_eq!(
        resolved.headers.get("X-Stub").map(String::as_str),
        Some("catalog")
    );
}
