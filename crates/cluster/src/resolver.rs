//! 엔드포인트 해석기: Component CR의 spec과 status에서 API base URL 계산
//!
//! - 노출 API: spec의 `id`를 대소문자 무시로 비교한 뒤, `path` 또는
//!   `implementation`이 같은 status 항목의 URL을 사용합니다.
//! - 의존 API: spec의 명세 URL에 식별자가 포함된 첫 항목의 인덱스를 구한 뒤,
//!   같은 인덱스의 status 항목을 사용합니다 ([`DependentCorrelation::Positional`]).
//!
//! 두 목록의 길이나 순서가 달라도 에러가 아니며, 찾지 못하면 `None`입니다.

use odactk_core::types::{ApiDescriptor, ApiStatus, ComponentDeployment, DependentCorrelation};
use serde::Serialize;
use tracing::debug;

/// 한 쌍의 노출/의존 API base URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedEndpoints {
    pub exposed: Option<String>,
    pub dependent: Option<String>,
}

impl ResolvedEndpoints {
    /// 두 URL이 모두 해석되었는지 여부
    pub fn is_complete(&self) -> bool {
        self.exposed.is_some() && self.dependent.is_some()
    }

    /// 비어 있는 쪽을 `other`의 값으로 채웁니다.
    pub fn or(self, other: ResolvedEndpoints) -> ResolvedEndpoints {
        ResolvedEndpoints {
            exposed: self.exposed.or(other.exposed),
            dependent: self.dependent.or(other.dependent),
        }
    }
}

/// 노출 API의 base URL을 해석합니다.
pub fn resolve_exposed(deployment: &ComponentDeployment, api_id: &str) -> Option<String> {
    let declared = deployment.exposed_apis().iter().find(|api| {
        api.id
            .as_deref()
            .is_some_and(|id| id.to_uppercase() == api_id.to_uppercase())
    })?;

    let status = deployment.status.core_apis.iter().find(|status| {
        same_key(status.path.as_deref(), declared.path.as_deref())
            || same_key(
                status.implementation.as_deref(),
                declared.implementation.as_deref(),
            )
    });

    if status.is_none() {
        debug!(api_id, "no status entry shares path or implementation");
    }
    status_url(status)
}

/// 의존 API의 base URL을 해석합니다.
pub fn resolve_dependent(
    deployment: &ComponentDeployment,
    api_id: &str,
    correlation: DependentCorrelation,
) -> Option<String> {
    if api_id.is_empty() {
        return None;
    }

    let declared = deployment.dependent_apis();
    let Some(index) = declared
        .iter()
        .position(|api| specification_mentions(api, api_id))
    else {
        debug!(api_id, "no dependent specification url mentions the id");
        return None;
    };

    let statuses = &deployment.status.core_dependent_apis;
    let status = match correlation {
        DependentCorrelation::Positional => statuses.get(index),
        DependentCorrelation::ByName => {
            let name = declared[index].name.as_deref()?;
            statuses
                .iter()
                .find(|status| status.name.as_deref() == Some(name))
        }
    };

    if status.is_none() {
        debug!(api_id, index, %correlation, "dependent status entry missing");
    }
    status_url(status)
}

/// 노출/의존 API를 한 번에 해석합니다.
pub fn resolve_endpoints(
    deployment: &ComponentDeployment,
    exposed_api_id: &str,
    dependent_api_id: &str,
    correlation: DependentCorrelation,
) -> ResolvedEndpoints {
    ResolvedEndpoints {
        exposed: resolve_exposed(deployment, exposed_api_id),
        dependent: resolve_dependent(deployment, dependent_api_id, correlation),
    }
}

// 빈 URL은 해석 실패와 같습니다.
fn status_url(status: Option<&ApiStatus>) -> Option<String> {
    status
        .and_then(|status| status.url.clone())
        .filter(|url| !url.is_empty())
}

// 양쪽 모두 값이 있을 때만 같은 키로 봅니다.
fn same_key(left: Option<&str>, right: Option<&str>) -> bool {
    matches!((left, right), (Some(l), Some(r)) if l == r)
}

fn specification_mentions(api: &ApiDescriptor, api_id: &str) -> bool {
    let needle = api_id.to_uppercase();
    api.specification.iter().any(|spec| {
        spec.url
            .as_deref()
            .is_some_and(|url| url.to_uppercase().contains(&needle))
    })
}
