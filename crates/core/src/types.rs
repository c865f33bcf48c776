//! 도메인 타입: ODA Component 커스텀 리소스와 스텁 후보
//!
//! [`ComponentDeployment`]는 Component CR의 선언(spec)과 실제 배정 상태(status)를
//! 함께 담습니다. 모든 목록과 필드는 누락을 허용하며, 누락된 입력은
//! 에러가 아니라 "해석 불가"로 처리됩니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP 헤더 집합 (이름 -> 값)
pub type Headers = BTreeMap<String, String>;

/// 배포된 Component의 선언과 상태
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentDeployment {
    #[serde(default)]
    pub spec: ComponentSpec,
    #[serde(default)]
    pub status: ComponentStatus,
}

impl ComponentDeployment {
    /// CR JSON 값에서 배포 정보를 추출합니다.
    ///
    /// 형식이 맞지 않는 필드는 기본값으로 대체되며, 최상위가 객체가 아니면 `None`입니다.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// 선언된 노출 API 목록
    pub fn exposed_apis(&self) -> &[ApiDescriptor] {
        &self.spec.core_function.exposed_apis
    }

    /// 선언된 의존 API 목록
    pub fn dependent_apis(&self) -> &[ApiDescriptor] {
        &self.spec.core_function.dependent_apis
    }
}

/// Component spec 섹션
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    #[serde(rename = "coreFunction", default)]
    pub core_function: CoreFunction,
}

/// `spec.coreFunction`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreFunction {
    #[serde(rename = "exposedAPIs", default, deserialize_with = "lenient_list")]
    pub exposed_apis: Vec<ApiDescriptor>,
    #[serde(rename = "dependentAPIs", default, deserialize_with = "lenient_list")]
    pub dependent_apis: Vec<ApiDescriptor>,
}

/// 선언된 API 한 건
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub implementation: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, deserialize_with = "lenient_list")]
    pub specification: Vec<SpecificationRef>,
}

/// API 명세 참조 (식별용 URL 포함)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecificationRef {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Component status 섹션
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentStatus {
    #[serde(rename = "coreAPIs", default, deserialize_with = "lenient_list")]
    pub core_apis: Vec<ApiStatus>,
    #[serde(rename = "coreDependentAPIs", default, deserialize_with = "lenient_list")]
    pub core_dependent_apis: Vec<ApiStatus>,
}

/// 실제 배정된 API 상태 한 건
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub implementation: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
}

/// 목록 필드를 관대하게 역직렬화합니다.
///
/// 목록이 아닌 값(null, 문자열 등)은 빈 목록으로, 형식이 맞지 않는 원소는
/// 기본값 원소로 대체하여 위치 정보를 보존합니다.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// 의존 API의 status 항목을 찾는 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependentCorrelation {
    /// spec 목록에서 찾은 인덱스를 status 목록에 그대로 사용
    #[default]
    Positional,
    /// spec 항목과 같은 `name`을 가진 status 항목을 사용
    ByName,
}

impl DependentCorrelation {
    /// 설정 문자열을 해석합니다.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "positional" => Some(Self::Positional),
            "by_name" => Some(Self::ByName),
            _ => None,
        }
    }
}

impl fmt::Display for DependentCorrelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positional => write!(f, "positional"),
            Self::ByName => write!(f, "by_name"),
        }
    }
}

/// 의존 API를 대신 제공할 수 있는 Helm 릴리스 후보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StubCandidate {
    /// 설정상의 후보 이름
    pub name: String,
    /// Helm 릴리스 이름
    pub release_name: String,
    /// 스텁 호출 시 사용할 헤더 (비어 있으면 기본 헤더 사용)
    #[serde(default)]
    pub headers: Headers,
}

/// 스텁 매칭 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStub {
    pub release_name: String,
    pub headers: Headers,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deployment_parses_full_custom_resource() {
        let value = json!({
            "spec": {"coreFunction": {
                "exposedAPIs": [{"id": "TMF632", "name": "party", "path": "/party", "implementation": "party-svc", "required": true,
                                 "specification": [{"url": "https://x/TMF632.json", "version": "v4.0.0"}]}],
                "dependentAPIs": [{"id": "TMF669", "name": "partyrole", "specification": [{"url": "https://x/TMF669-PartyRole.json"}]}]
            }},
            "status": {
                "coreAPIs": [{"name": "party", "path": "/party", "url": "https://host/party", "ready": true}],
                "coreDependentAPIs": [{"name": "partyrole", "url": "https://host/role"}]
            }
        });

        let deployment = ComponentDeployment::from_value(&value).unwrap();
        assert_eq!(deployment.exposed_apis().len(), 1);
        assert_eq!(deployment.dependent_apis().len(), 1);
        assert!(deployment.exposed_apis()[0].required);
        assert_eq!(
            deployment.status.core_apis[0].url.as_deref(),
            Some("https://host/party")
        );
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let deployment = ComponentDeployment::from_value(&json!({})).unwrap();
        assert!(deployment.exposed_apis().is_empty());
        assert!(deployment.status.core_dependent_apis.is_empty());
    }

    #[test]
    fn non_list_fields_become_empty_lists() {
        let value = json!({
            "spec": {"coreFunction": {"exposedAPIs": "oops", "dependentAPIs": null}},
            "status": {"coreAPIs": 42}
        });
        let deployment = ComponentDeployment::from_value(&value).unwrap();
        assert!(deployment.exposed_apis().is_empty());
        assert!(deployment.dependent_apis().is_empty());
        assert!(deployment.status.core_apis.is_empty());
    }

    #[test]
    fn malformed_list_entries_keep_their_position() {
        let value = json!({
            "status": {"coreDependentAPIs": ["garbage", {"url": "https://host/second"}]}
        });
        let deployment = ComponentDeployment::from_value(&value).unwrap();
        assert_eq!(deployment.status.core_dependent_apis.len(), 2);
        assert_eq!(deployment.status.core_dependent_apis[0].url, None);
        assert_eq!(
            deployment.status.core_dependent_apis[1].url.as_deref(),
            Some("https://host/second")
        );
    }

    #[test]
    fn non_object_value_is_rejected() {
        assert!(ComponentDeployment::from_value(&json!([1, 2])).is_none());
        assert!(ComponentDeployment::from_value(&json!(null)).is_none());
    }

    #[test]
    fn correlation_parse_and_display() {
        assert_eq!(
            DependentCorrelation::parse("positional"),
            Some(DependentCorrelation::Positional)
        );
        assert_eq!(
            DependentCorrelation::parse("by_name"),
            Some(DependentCorrelation::ByName)
        );
        assert_eq!(DependentCorrelation::parse("fuzzy"), None);
        assert_eq!(DependentCorrelation::ByName.to_string(), "by_name");
    }
}
