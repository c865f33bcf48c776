//! 엔드포인트 탐색: 스냅샷 파일 우선, 실패 시 클러스터 조회
//!
//! 1. `deployment.json` 스냅샷 (`{body: {items: [CR]}}` 또는 `{items: [CR]}`)
//! 2. 두 URL 중 하나라도 비어 있으면 테스트 대상 Component 매니페스트에서
//!    이름/버전을 읽고 [`ComponentApi`]로 CR을 조회
//!
//! 각 단계의 실패는 로그만 남기고 "해석 불가"로 처리합니다.

use std::future::Future;
use std::path::{Path, PathBuf};

use odactk_core::config::ClusterConfig;
use odactk_core::manifest::ComponentIdentity;
use odactk_core::types::{ComponentDeployment, DependentCorrelation};
use tracing::{debug, info, warn};

use crate::error::DiscoveryError;
use crate::k8s::ComponentApi;
use crate::resolver::{ResolvedEndpoints, resolve_endpoints};

/// 노출/의존 API base URL 공급자
pub trait EndpointSource: Send + Sync + 'static {
    /// 두 식별자에 대한 base URL을 찾습니다. 찾지 못한 쪽은 `None`입니다.
    fn discover(
        &self,
        exposed_api_id: &str,
        dependent_api_id: &str,
    ) -> impl Future<Output = ResolvedEndpoints> + Send;
}

/// 탐색 설정
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub namespace: String,
    pub component_file: PathBuf,
    /// 비어 있으면 스냅샷 단계를 건너뜁니다.
    pub snapshot: Option<PathBuf>,
    pub correlation: DependentCorrelation,
}

impl DiscoverySettings {
    /// `[cluster]` 섹션에서 설정을 만듭니다.
    pub fn from_config(config: &ClusterConfig) -> Self {
        let snapshot = if config.deployment_snapshot.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&config.deployment_snapshot))
        };
        Self {
            namespace: config.namespace.clone(),
            component_file: PathBuf::from(&config.component_file),
            snapshot,
            correlation: config.correlation(),
        }
    }
}

/// 스냅샷 + 라이브 조회 탐색기
pub struct EndpointDiscovery<K> {
    api: K,
    settings: DiscoverySettings,
}

impl<K: ComponentApi> EndpointDiscovery<K> {
    pub fn new(api: K, settings: DiscoverySettings) -> Self {
        Self { api, settings }
    }

    /// 클러스터에서 테스트 대상 Component CR을 조회합니다.
    pub async fn fetch_live(&self) -> Result<ComponentDeployment, DiscoveryError> {
        let path = &self.settings.component_file;
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DiscoveryError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let identity = ComponentIdentity::from_manifest(&text, &path.display().to_string())?;
        debug!(name = %identity.name, version = %identity.version, "querying component");

        let items = self
            .api
            .list_components(&identity.version, &self.settings.namespace, &identity.name)
            .await?;

        items
            .first()
            .and_then(ComponentDeployment::from_value)
            .ok_or_else(|| DiscoveryError::ComponentNotFound {
                name: identity.name,
                namespace: self.settings.namespace.clone(),
            })
    }
}

impl<K: ComponentApi> EndpointSource for EndpointDiscovery<K> {
    async fn discover(&self, exposed_api_id: &str, dependent_api_id: &str) -> ResolvedEndpoints {
        let correlation = self.settings.correlation;

        let from_snapshot = match self.settings.snapshot.as_deref() {
            Some(path) => match load_snapshot(path).await {
                Ok(deployment) => resolve_endpoints(
                    &deployment,
                    exposed_api_id,
                    dependent_api_id,
                    correlation,
                ),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "deployment snapshot unusable");
                    ResolvedEndpoints::default()
                }
            },
            None => ResolvedEndpoints::default(),
        };

        if from_snapshot.is_complete() {
            info!(
                exposed = ?from_snapshot.exposed,
                dependent = ?from_snapshot.dependent,
                "endpoints resolved from snapshot"
            );
            return from_snapshot;
        }

        info!("fetching live endpoints from kubernetes");
        let from_cluster = match self.fetch_live().await {
            Ok(deployment) => {
                resolve_endpoints(&deployment, exposed_api_id, dependent_api_id, correlation)
            }
            Err(e) => {
                warn!(error = %e, "error fetching kubernetes component");
                ResolvedEndpoints::default()
            }
        };

        // 스냅샷 값이 우선, 클러스터는 빈 자리만 채움
        let resolved = from_snapshot.or(from_cluster);
        info!(
            exposed = ?resolved.exposed,
            dependent = ?resolved.dependent,
            "endpoints resolved"
        );
        resolved
    }
}

/// 스냅샷 파일에서 첫 번째 CR을 읽습니다.
pub async fn load_snapshot(path: &Path) -> Result<ComponentDeployment, DiscoveryError> {
    let read_error = |reason: String| DiscoveryError::Read {
        path: path.display().to_string(),
        reason,
    };

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| read_error(e.to_string()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| read_error(e.to_string()))?;

    let items = value
        .pointer("/body/items")
        .or_else(|| value.get("items"))
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| read_error("no items list".to_owned()))?;

    items
        .first()
        .and_then(ComponentDeployment::from_value)
        .ok_or_else(|| read_error("no items found".to_owned()))
}
