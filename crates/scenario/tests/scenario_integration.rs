//! 통합 테스트 -- 피처 파일에서 리포트까지 전체 실행 플로우 검증
//!
//! 피처 로딩 → 스냅샷 기반 엔드포인트 탐색 → 스텁 매칭 → 시드/동작/검증
//! → 정리 → JSON 리포트 시나리오를 메모리 내 API 서버로 테스트합니다.

use std::collections::HashMap;
use std::path::Path;

use odactk_cluster::{
    ComponentApi, DiscoveryError, DiscoverySettings, EndpointDiscovery, ReleaseManifests,
};
use odactk_core::config::CtkConfig;
use odactk_core::types::DependentCorrelation;
use odactk_scenario::{
    FeatureLoader, Method, PayloadStore, RunSettings, ScenarioRunner, Verdict,
};
use serde_json::{Value, json};

const EXPOSED: &str = "https://host/r1/tmf-api/partyManagement/v4";
const DEPENDENT: &str = "https://host/stub-partyrole/tmf-api/partyRoleManagement/v4";

// In-memory collaborators for integration tests
mod mock {
    use super::*;
    use odactk_scenario::{ApiRequest, ApiResponse, HttpApi, RunnerError};
    use std::sync::Mutex;

    /// 스냅샷만으로 해석되어야 하므로 호출되면 실패합니다.
    pub struct UnreachableCluster;

    impl ComponentApi for UnreachableCluster {
        async fn list_components(
            &self,
            _version: &str,
            _namespace: &str,
            _name: &str,
        ) -> Result<Vec<Value>, DiscoveryError> {
            Err(DiscoveryError::KubeConnection("no cluster in tests".to_owned()))
        }
    }

    pub struct StaticReleases(pub HashMap<String, String>);

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

    /// 리소스를 URL별로 저장하는 API 서버
    ///
    /// `individual` 생성은 `partyRoleRef.href`가 가리키는 리소스가 있어야 성공합니다.
    #[derive(Default)]
    pub struct InMemoryApis {
        store: Mutex<HashMap<String, Value>>,
        log: Mutex<Vec<(Method, String)>>,
        next_id: Mutex<u32>,
    }

    impl InMemoryApis {
        pub fn with_resource(self, url: &str, body: Value) -> Self {
            self.store.lock().unwrap().insert(url.to_owned(), body);
            self
        }

        pub fn resources(&self) -> Vec<String> {
            let mut urls: Vec<String> = self.store.lock().unwrap().keys().cloned().collect();
            urls.sort();
            urls
        }

        pub fn count(&self, method: Method, url: &str) -> usize {
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|(m, u)| *m == method && u == url)
                .count()
        }

        fn create(&self, collection: &str, mut body: Value) -> ApiResponse {
            if collection.ends_with("/individual") {
                let reference = body
                    .pointer("/partyRoleRef/href")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                if !self.store.lock().unwrap().contains_key(&reference) {
                    return ApiResponse::new(400, json!({"reason": "unknown partyRole"}));
                }
            }

            let id = {
                let mut next = self.next_id.lock().unwrap();
                *next += 1;
                format!("r{next}")
            };
            let href = format!("{collection}/{id}");
            body["id"] = json!(id);
            body["href"] = json!(href);
            self.store.lock().unwrap().insert(href, body.clone());
            ApiResponse::new(201, body)
        }
    }

    impl HttpApi for InMemoryApis {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, RunnerError> {
            self.log
                .lock()
                .unwrap()
                .push((request.method, request.url.clone()));

            let response = match request.method {
                Method::Get => match self.store.lock().unwrap().get(&request.url) {
                    Some(body) => ApiResponse::new(200, body.clone()),
                    None => ApiResponse::new(404, Value::Null),
                },
                Method::Post => self.create(&request.url, request.body.unwrap_or(Value::Null)),
                Method::Delete => match self.store.lock().unwrap().remove(&request.url) {
                    Some(_) => ApiResponse::new(204, Value::Null),
                    None => ApiResponse::new(404, Value::Null),
                },
            };
            Ok(response)
        }
    }
}

use mock::{InMemoryApis, StaticReleases, UnreachableCluster};

const FEATURE: &str = r#"
feature: Party management references party roles
tags: ["@tmfc028"]
scenarios:
  - name: Create individual with a seeded party role
    component: tmfc028-partymanagement
    exposed_api_id: TMF632
    dependent_api_id: TMF669
    stub: { component: tmfc035-permissionsmanagement, api: partyRole }
    seed: { resource: partyRole, payload: partyRole.json }
    action: { resource_type: individual, field_path: partyRoleRef, payload: individual.json, resource: individual, expect: success }
    then: { operation: createIndividual, expect: success }
  - name: Reject individual without a party role
    component: tmfc028-partymanagement
    exposed_api_id: TMF632
    dependent_api_id: TMF669
    stub: { component: tmfc035-permissionsmanagement, api: partyRole }
    seed: { resource: partyRole, payload: partyRole.json }
    action: { resource_type: individual, field_path: partyRoleRef, payload: individual.json, resource: individual, expect: failure }
    then: { operation: createIndividual, expect: failure }
"#;

const OTHER_FEATURE: &str = r#"
feature: Permissions are out of scope for this run
tags: ["@tmfc035"]
scenarios:
  - name: Create permission
    component: tmfc035-permissionsmanagement
    exposed_api_id: TMF672
    dependent_api_id: TMF669
    stub: { component: tmfc028-partymanagement, api: partyRole }
    seed: { resource: partyRole, payload: partyRole.json }
    action: { resource_type: permission, field_path: partyRoleRef, payload: individual.json, resource: permission, expect: success }
    then: { operation: createPermission, expect: success }
"#;

const CONFIG: &str = r#"
[run]
component_to_run = "tmfc028"

[[dependent_stubs]]
component = "tmfc028"
name = "inventory"
release_name = "stub-inventory"

[[dependent_stubs]]
component = "tmfc028"
name = "partyrole"
release_name = "stub-partyrole"
headers = { "X-Stub" = "partyrole" }
"#;

fn stub_manifest(path: &str) -> String {
    format!(
        "apiVersion: v1\nkind: Service\nmetadata:\n  name: stub\n---\n\
         apiVersion: oda.tmforum.org/v1\nkind: Component\nmetadata:\n  name: stub\n\
         spec:\n  coreFunction:\n    exposedAPIs:\n      - name: api\n        path: {path}\n"
    )
}

fn releases() -> StaticReleases {
    let mut manifests = HashMap::new();
    manifests.insert(
        "stub-inventory".to_owned(),
        stub_manifest("/tmf-api/resourceInventoryManagement/v4"),
    );
    manifests.insert(
        "stub-partyrole".to_owned(),
        stub_manifest("/tmf-api/partyRoleManagement/v4"),
    );
    StaticReleases(manifests)
}

fn write_snapshot(dir: &Path) -> std::path::PathBuf {
    let cr = json!({
        "spec": {"coreFunction": {
            "exposedAPIs": [{"id": "TMF632", "path": "/r1/tmf-api/partyManagement/v4"}],
            "dependentAPIs": [{"name": "partyrole", "specification": [{"url": "https://specs/TMF669-PartyRole-v4.0.0.swagger.json"}]}]
        }},
        "status": {
            "coreAPIs": [{"path": "/r1/tmf-api/partyManagement/v4", "url": EXPOSED}],
            "coreDependentAPIs": [{"name": "partyrole", "url": DEPENDENT}]
        }
    });
    let path = dir.join("deployment.json");
    std::fs::write(&path, json!({"body": {"items": [cr]}}).to_string()).expect("write snapshot");
    path
}

struct Workspace {
    _dir: tempfile::TempDir,
    root: std::path::PathBuf,
    config: CtkConfig,
    discovery: DiscoverySettings,
}

fn workspace(seed: Value) -> Workspace {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();

    let features = root.join("features");
    let payloads = features.join("payloads");
    std::fs::create_dir_all(&payloads).expect("payload dir");
    std::fs::write(features.join("a_party.yaml"), FEATURE).expect("feature");
    std::fs::write(features.join("b_permission.yml"), OTHER_FEATURE).expect("feature");
    std::fs::write(payloads.join("partyRole.json"), seed.to_string()).expect("payload");
    std::fs::write(
        payloads.join("individual.json"),
        json!({"givenName": "Jane", "familyName": "Doe"}).to_string(),
    )
    .expect("payload");

    let mut config = CtkConfig::parse(CONFIG).expect("config");
    config.run.features_dir = features.display().to_string();
    config.run.payloads_dir = payloads.display().to_string();
    config.run.artifacts_dir = root.join("artifacts").display().to_string();
    config.run.results_dir = root.join("results").display().to_string();

    let discovery = DiscoverySettings {
        namespace: config.cluster.namespace.clone(),
        component_file: root.join("component.yaml"),
        snapshot: Some(write_snapshot(&root)),
        correlation: DependentCorrelation::Positional,
    };

    Workspace {
        _dir: dir,
        root,
        config,
        discovery,
    }
}

fn runner(
    ws: &Workspace,
    apis: InMemoryApis,
) -> ScenarioRunner<EndpointDiscovery<UnreachableCluster>, StaticReleases, InMemoryApis> {
    ScenarioRunner::new(
        EndpointDiscovery::new(UnreachableCluster, ws.discovery.clone()),
        releases(),
        apis,
        PayloadStore::from_config(&ws.config.run),
        RunSettings::from_config(&ws.config),
    )
}

#[tokio::test]
async fn full_run_seeds_asserts_cleans_and_reports() {
    let ws = workspace(json!({"name": "Buyer", "@type": "PartyRole"}));
    let runner = runner(&ws, InMemoryApis::default());

    let features = FeatureLoader::load_directory(&ws.config.run.features_dir)
        .await
        .expect("features");
    assert_eq!(features.len(), 2);

    let report = runner.run_features(&features).await;

    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.passed, 2, "{:#?}", report.features);
    assert_eq!(report.summary.skipped, 1);
    assert!(report.passed());
    assert_eq!(report.features[1].verdict, Verdict::Skipped);

    // 생성된 party role 2건과 individual 1건이 모두 삭제되어야 합니다.
    assert!(runner.http().resources().is_empty());
    let seeded = format!("{DEPENDENT}/partyRole");
    assert_eq!(runner.http().count(Method::Post, &seeded), 2);
    assert_eq!(runner.http().count(Method::Delete, &format!("{seeded}/r1")), 1);

    // 원본 픽스처는 그대로, 주입 결과는 산출물 디렉토리에 남습니다.
    let fixture = std::fs::read_to_string(ws.root.join("features/payloads/individual.json"))
        .expect("fixture");
    assert!(!fixture.contains("partyRoleRef"));
    assert!(ws.root.join("artifacts/individual.json").exists());

    let path = report.write_json(&ws.config.run.results_dir).await.expect("report");
    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(path).expect("read report")).expect("json");
    assert_eq!(written["component"], "tmfc028");
    assert_eq!(written["summary"]["passed"], 2);
    assert_eq!(
        written["features"][0]["scenarios"][0]["cleanup"]["entries"]
            .as_array()
            .map(Vec::len),
        Some(2)
    );
}

#[tokio::test]
async fn existing_party_role_is_reused_and_not_deleted() {
    let existing = format!("{DEPENDENT}/partyRole/pr-1");
    let ws = workspace(json!({"id": "pr-1", "href": existing, "name": "Buyer"}));
    let apis = InMemoryApis::default().with_resource(&existing, json!({"id": "pr-1"}));
    let runner = runner(&ws, apis);

    let features = FeatureLoader::load_directory(&ws.config.run.features_dir)
        .await
        .expect("features");
    let report = runner.run_features(&features).await;

    assert!(report.passed(), "{:#?}", report.features);
    assert_eq!(
        runner.http().count(Method::Post, &format!("{DEPENDENT}/partyRole")),
        0
    );
    assert_eq!(runner.http().resources(), vec![existing]);
}

#[tokio::test]
async fn unmapped_component_fails_every_selected_scenario() {
    let ws = workspace(json!({"name": "Buyer"}));
    let mut config = ws.config.clone();
    config.dependent_stubs.clear();
    let runner = ScenarioRunner::new(
        EndpointDiscovery::new(UnreachableCluster, ws.discovery.clone()),
        releases(),
        InMemoryApis::default(),
        PayloadStore::from_config(&config.run),
        RunSettings::from_config(&config),
    );

    let features = FeatureLoader::load_directory(&config.run.features_dir)
        .await
        .expect("features");
    let report = runner.run_features(&features).await;

    assert_eq!(report.summary.failed, 2);
    assert!(!report.passed());
    let error = report.features[0].scenarios[0].error.clone().unwrap_or_default();
    assert!(error.contains("No dependent stub mapping found for 'tmfc028'"));
}
