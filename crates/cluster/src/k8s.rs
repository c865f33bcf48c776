//! Kubernetes custom-resource access for ODA Components.
//!
//! The [`ComponentApi`] trait lists `components.oda.tmforum.org` objects by
//! name. [`KubeComponentApi`] is the production implementation backed by
//! `kube::Api<DynamicObject>`; tests use `MockComponentApi`.
//!
//! The client is created on first use, so building the discovery chain never
//! requires a reachable cluster.

use std::future::Future;

use kube::api::{Api, DynamicObject, ListParams};
use kube::discovery::ApiResource;
use odactk_core::manifest::{COMPONENTS_PLURAL, ODA_API_GROUP};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::DiscoveryError;

/// Trait abstracting the Component custom-resource listing.
pub trait ComponentApi: Send + Sync + 'static {
    /// Lists Components named `name` in `namespace` for API `version`.
    ///
    /// Each returned value carries the object's `spec` and `status`.
    fn list_components(
        &self,
        version: &str,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Vec<serde_json::Value>, DiscoveryError>> + Send;
}

/// `kube::Client` 기반 프로덕션 구현
#[derive(Default)]
pub struct KubeComponentApi {
    client: OnceCell<kube::Client>,
}

impl KubeComponentApi {
    /// 첫 호출 시 기본 kubeconfig로 연결합니다.
    pub fn new() -> Self {
        Self::default()
    }

    async fn client(&self) -> Result<kube::Client, DiscoveryError> {
        let client = self
            .client
            .get_or_try_init(|| async {
                debug!("initializing kubernetes client");
                kube::Client::try_default()
                    .await
                    .map_err(|e| DiscoveryError::KubeConnection(e.to_string()))
            })
            .await?;
        Ok(client.clone())
    }
}

fn component_resource(version: &str) -> ApiResource {
    ApiResource {
        group: ODA_API_GROUP.to_owned(),
        version: version.to_owned(),
        api_version: format!("{ODA_API_GROUP}/{version}"),
        kind: "Component".to_owned(),
        plural: COMPONENTS_PLURAL.to_owned(),
    }
}

impl ComponentApi for KubeComponentApi {
    async fn list_components(
        &self,
        version: &str,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<serde_json::Value>, DiscoveryError> {
        let client = self.client().await?;
        let resource = component_resource(version);
        let api: Api<DynamicObject> = Api::namespaced_with(client, namespace, &resource);
        let params = ListParams::default().fields(&format!("metadata.name={name}"));

        let list = api.list(&params).await.map_err(|e| {
            DiscoveryError::KubeApi(format!(
                "list {COMPONENTS_PLURAL}.{ODA_API_GROUP}/{version} in {namespace}: {e}"
            ))
        })?;
        debug!(name, namespace, count = list.items.len(), "listed components");

        Ok(list.items.into_iter().map(|object| object.data).collect())
    }
}

/// 테스트용 Mock Component API
#[cfg(test)]
#[derive(Default)]
pub struct MockComponentApi {
    pub items: Vec<serde_json::Value>,
    pub fail: bool,
}

#[cfg(test)]
impl MockComponentApi {
    pub fn with_items(items: Vec<serde_json::Value>) -> Self {
        Self { items, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            items: Vec::new(),
            fail: true,
        }
    }
}

#[cfg(test)]
impl ComponentApi for MockComponentApi {
    async fn list_components(
        &self,
        _version: &str,
        _namespace: &str,
        _name: &str,
    ) -> Result<Vec<serde_json::Value>, DiscoveryError> {
        if self.fail {
            return Err(DiscoveryError::KubeApi("mock failure".to_owned()));
        }
        Ok(self.items.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_resource_targets_oda_group() {
        let resource = component_resource("v1");
        assert_eq!(resource.group, "oda.tmforum.org");
        assert_eq!(resource.api_version, "oda.tmforum.org/v1");
        assert_eq!(resource.plural, "components");
    }

    #[tokio::test]
    async fn mock_failure_is_reported() {
        let api = MockComponentApi::failing();
        let err = api.list_components("v1", "ns", "x").await.unwrap_err();
        assert!(matches!(err, DiscoveryError::KubeApi(_)));
    }

    #[test]
    fn kube_component_api_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KubeComponentApi>();
    }
}
