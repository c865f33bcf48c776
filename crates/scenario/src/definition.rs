//! 피처 파일: YAML 시나리오 정의와 로더
//!
//! 피처 디렉토리 내의 `.yml`/`.yaml` 파일 하나가 피처 하나입니다.
//! 개별 파일 로딩 실패는 경고 로그를 남기고 건너뜁니다.
//!
//! ```yaml
//! feature: Party management creates individuals referencing party roles
//! tags: ["@tmfc028"]
//! scenarios:
//!   - name: Create individual with a valid party role
//!     component: tmfc028-partymanagement
//!     exposed_api_id: TMF632
//!     dependent_api_id: TMF669
//!     stub: { component: tmfc035-permissionsmanagement, api: partyRole }
//!     seed: { resource: partyRole, payload: partyRole.json }
//!     action: { resource_type: individual, field_path: partyRoleRef, payload: individual.json, resource: individual, expect: success }
//!     then: { operation: createIndividual, expect: success }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

/// 피처 파일 최대 크기
const MAX_FEATURE_FILE_SIZE: u64 = 1024 * 1024; // 1MB

/// 피처 하나
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFile {
    /// 피처 이름
    pub feature: String,
    /// 모든 시나리오에 적용되는 태그
    #[serde(default)]
    pub tags: Vec<String>,
    pub scenarios: Vec<ScenarioDefinition>,
    /// 로드한 파일 경로
    #[serde(skip)]
    pub source: String,
}

/// 시나리오 하나
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 테스트 대상 컴포넌트 이름 (로그용)
    pub component: String,
    pub exposed_api_id: String,
    pub dependent_api_id: String,
    pub stub: StubStep,
    pub seed: SeedStep,
    pub action: ActionStep,
    pub then: ThenStep,
}

/// 의존 스텁 확인 단계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StubStep {
    /// 의존 컴포넌트 이름
    pub component: String,
    /// 의존 API 이름
    pub api: String,
}

/// 의존 스텁 초기화 단계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedStep {
    /// 의존 API base URL 아래의 리소스 경로
    pub resource: String,
    /// 페이로드 파일 이름
    pub payload: String,
}

/// 테스트 대상 동작 단계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    pub resource_type: String,
    /// 의존 리소스 id/href를 넣을 점 표기 경로
    pub field_path: String,
    pub payload: String,
    /// 노출 API base URL 아래의 리소스 경로
    pub resource: String,
    pub expect: String,
}

/// 결과 검증 단계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThenStep {
    pub operation: String,
    pub expect: String,
}

impl FeatureFile {
    /// YAML 문자열을 파싱하고 검증합니다.
    pub fn parse(yaml_str: &str, source: &str) -> Result<Self, RunnerError> {
        let mut feature: FeatureFile =
            serde_yaml::from_str(yaml_str).map_err(|e| RunnerError::FeatureLoad {
                path: source.to_owned(),
                reason: format!("YAML parse error: {e}"),
            })?;
        feature.source = source.to_owned();
        feature.validate()?;
        Ok(feature)
    }

    fn validate(&self) -> Result<(), RunnerError> {
        let invalid = |reason: String| RunnerError::FeatureLoad {
            path: self.source.clone(),
            reason,
        };

        if self.feature.trim().is_empty() {
            return Err(invalid("feature name must not be empty".to_owned()));
        }
        if self.scenarios.is_empty() {
            return Err(invalid("feature has no scenarios".to_owned()));
        }
        for (index, scenario) in self.scenarios.iter().enumerate() {
            let required = [
                ("name", &scenario.name),
                ("exposed_api_id", &scenario.exposed_api_id),
                ("dependent_api_id", &scenario.dependent_api_id),
                ("seed.resource", &scenario.seed.resource),
                ("seed.payload", &scenario.seed.payload),
                ("action.payload", &scenario.action.payload),
                ("action.resource", &scenario.action.resource),
            ];
            for (field, value) in required {
                if value.trim().is_empty() {
                    return Err(invalid(format!(
                        "scenarios[{index}].{field} must not be empty"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl ScenarioDefinition {
    /// 피처 태그와 시나리오 태그 중 `@<component_to_run>`이 있는지 확인합니다.
    pub fn is_selected(&self, feature_tags: &[String], component_to_run: &str) -> bool {
        let component = component_to_run.trim();
        let wanted = format!("@{component}");
        !component.is_empty()
            && feature_tags
                .iter()
                .chain(self.tags.iter())
                .any(|tag| tag.eq_ignore_ascii_case(&wanted))
    }
}

/// 피처 파일 로더
pub struct FeatureLoader;

impl FeatureLoader {
    /// 디렉토리에서 모든 피처 파일을 경로 순으로 로드합니다.
    ///
    /// # Errors
    /// - 디렉토리를 읽을 수 없는 경우
    pub async fn load_directory(dir: impl AsRef<Path>) -> Result<Vec<FeatureFile>, RunnerError> {
        let dir = dir.as_ref();
        let dir_error = |reason: String| RunnerError::FeatureLoad {
            path: dir.display().to_string(),
            reason,
        };

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| dir_error(format!("failed to read directory: {e}")))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| dir_error(format!("failed to read directory entry: {e}")))?
        {
            let path = entry.path();
            let is_yaml = path
                .extension()
                .is_some_and(|ext| ext == "yml" || ext == "yaml");
            if is_yaml {
                paths.push(path);
            }
        }
        paths.sort();

        let mut features = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::load_file(&path).await {
                Ok(feature) => features.push(feature),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load feature file, skipping"
                    );
                }
            }
        }

        tracing::info!(
            dir = %dir.display(),
            count = features.len(),
            "loaded feature files"
        );
        Ok(features)
    }

    /// 단일 피처 파일을 로드합니다.
    pub async fn load_file(path: impl AsRef<Path>) -> Result<FeatureFile, RunnerError> {
        let path = path.as_ref();
        let file_error = |reason: String| RunnerError::FeatureLoad {
            path: path.display().to_string(),
            reason,
        };

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| file_error(format!("failed to read file metadata: {e}")))?;
        if metadata.len() > MAX_FEATURE_FILE_SIZE {
            return Err(file_error(format!(
                "file too large: {} bytes (max: {MAX_FEATURE_FILE_SIZE})",
                metadata.len()
            )));
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| file_error(format!("failed to read file: {e}")))?;
        FeatureFile::parse(&content, &path.display().to_string())
    }
}
