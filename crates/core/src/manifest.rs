//! 다중 문서 YAML 매니페스트 헬퍼
//!
//! Helm이 렌더링한 매니페스트나 Component 배포 파일은 `---`로 구분된
//! 여러 문서로 구성됩니다. 이 모듈은 그중 `kind: Component` 문서를 찾고,
//! 선언된 노출 API 경로와 CR 식별 정보를 꺼냅니다.

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::ParseError;

/// ODA Component CR의 API 그룹
pub const ODA_API_GROUP: &str = "oda.tmforum.org";

/// ODA Component CR의 복수형 리소스 이름
pub const COMPONENTS_PLURAL: &str = "components";

/// `kind` 비교 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindMatch {
    /// `Component`와 정확히 일치
    Exact,
    /// 대소문자 무시
    IgnoreCase,
}

/// 다중 문서 YAML 스트림을 파싱합니다.
///
/// 빈 문서(`null`)는 제외합니다. 어느 한 문서라도 잘못된 YAML이면 에러입니다.
pub fn parse_documents(text: &str, source_name: &str) -> Result<Vec<Value>, ParseError> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(document).map_err(|e| ParseError::Yaml {
            source_name: source_name.to_owned(),
            reason: e.to_string(),
        })?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// `kind`가 Component인 첫 문서를 찾습니다.
pub fn find_component(documents: &[Value], mode: KindMatch) -> Option<&Value> {
    documents.iter().find(|doc| {
        let kind = doc.get("kind").and_then(Value::as_str).unwrap_or_default();
        match mode {
            KindMatch::Exact => kind == "Component",
            KindMatch::IgnoreCase => kind.eq_ignore_ascii_case("component"),
        }
    })
}

/// `spec.coreFunction.exposedAPIs[*].path` 중 문자열인 값들을 순서대로 반환합니다.
pub fn declared_exposed_paths(component: &Value) -> Vec<String> {
    component
        .get("spec")
        .and_then(|spec| spec.get("coreFunction"))
        .and_then(|core| core.get("exposedAPIs"))
        .and_then(Value::as_sequence)
        .map(|apis| {
            apis.iter()
                .filter_map(|api| api.get("path").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// 클러스터에서 Component CR을 조회하기 위한 식별 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentIdentity {
    /// `metadata.name`
    pub name: String,
    /// `apiVersion`의 버전 부분 (`oda.tmforum.org/v1` -> `v1`)
    pub version: String,
}

impl ComponentIdentity {
    /// Component 문서에서 식별 정보를 추출합니다.
    pub fn from_document(component: &Value, source_name: &str) -> Result<Self, ParseError> {
        let api_version = component
            .get("apiVersion")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::MissingField {
                source_name: source_name.to_owned(),
                field: "apiVersion".to_owned(),
            })?;
        let version = api_version
            .split_once('/')
            .map(|(_, version)| version)
            .filter(|version| !version.is_empty())
            .ok_or_else(|| ParseError::MissingField {
                source_name: source_name.to_owned(),
                field: "apiVersion (group/version)".to_owned(),
            })?;
        let name = component
            .get("metadata")
            .and_then(|metadata| metadata.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::MissingField {
                source_name: source_name.to_owned(),
                field: "metadata.name".to_owned(),
            })?;

        Ok(Self {
            name: name.to_owned(),
            version: version.to_owned(),
        })
    }

    /// 다중 문서 텍스트에서 바로 식별 정보를 추출합니다.
    pub fn from_manifest(text: &str, source_name: &str) -> Result<Self, ParseError> {
        let documents = parse_documents(text, source_name)?;
        let component = find_component(&documents, KindMatch::IgnoreCase)
            .ok_or_else(|| ParseError::MissingComponent(source_name.to_owned()))?;
        Self::from_document(component, source_name)
    }
}
