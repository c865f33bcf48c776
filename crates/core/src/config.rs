//! 설정 관리: odactk.toml 파싱 및 런타임 설정
//!
//! [`CtkConfig`]는 CTK 실행에 필요한 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`ODACTK_CLUSTER_NAMESPACE=components` 형식)
//! 3. 설정 파일 (`odactk.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), odactk_core::error::CtkError> {
//! use odactk_core::config::CtkConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = CtkConfig::load("odactk.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = CtkConfig::parse("[cluster]\nnamespace = \"components\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, CtkError};
use crate::types::{DependentCorrelation, Headers, StubCandidate};

/// 설정 상한값 상수
const MAX_TIMEOUT_SECS: u64 = 300;
const MAX_RETRY_INTERVAL_MS: u64 = 600_000;
const MAX_RETRIES: u32 = 1000;

/// odactk 통합 설정
///
/// `odactk.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CtkConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 클러스터 접근 설정
    #[serde(default)]
    pub cluster: ClusterConfig,
    /// 시나리오 실행 설정
    #[serde(default)]
    pub run: RunConfig,
    /// HTTP 클라이언트 설정
    #[serde(default)]
    pub http: HttpConfig,
    /// 재시도 설정
    #[serde(default)]
    pub retry: RetryConfig,
    /// 의존 API 스텁 후보 (파일에 적힌 순서가 매칭 순서)
    #[serde(default)]
    pub dependent_stubs: Vec<StubCandidateConfig>,
}

impl CtkConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CtkError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, CtkError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CtkError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CtkError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, CtkError> {
        toml::from_str(toml_str).map_err(|e| {
            CtkError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `ODACTK_{SECTION}_{FIELD}`
    /// 예: `ODACTK_RUN_COMPONENT_TO_RUN=tmfc028`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "ODACTK_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "ODACTK_GENERAL_LOG_FORMAT");

        // Cluster
        override_string(&mut self.cluster.namespace, "ODACTK_CLUSTER_NAMESPACE");
        override_string(
            &mut self.cluster.component_file,
            "ODACTK_CLUSTER_COMPONENT_FILE",
        );
        override_string(
            &mut self.cluster.deployment_snapshot,
            "ODACTK_CLUSTER_DEPLOYMENT_SNAPSHOT",
        );
        override_string(&mut self.cluster.helm_binary, "ODACTK_CLUSTER_HELM_BINARY");
        override_string(
            &mut self.cluster.dependent_correlation,
            "ODACTK_CLUSTER_DEPENDENT_CORRELATION",
        );

        // Run
        override_string(
            &mut self.run.component_to_run,
            "ODACTK_RUN_COMPONENT_TO_RUN",
        );
        override_string(&mut self.run.features_dir, "ODACTK_RUN_FEATURES_DIR");
        override_string(&mut self.run.payloads_dir, "ODACTK_RUN_PAYLOADS_DIR");
        override_string(&mut self.run.artifacts_dir, "ODACTK_RUN_ARTIFACTS_DIR");
        override_string(&mut self.run.results_dir, "ODACTK_RUN_RESULTS_DIR");
        override_u64(
            &mut self.run.teardown_timeout_secs,
            "ODACTK_RUN_TEARDOWN_TIMEOUT_SECS",
        );

        // HTTP
        override_u64(
            &mut self.http.request_timeout_secs,
            "ODACTK_HTTP_REQUEST_TIMEOUT_SECS",
        );
        override_bool(
            &mut self.http.accept_invalid_certs,
            "ODACTK_HTTP_ACCEPT_INVALID_CERTS",
        );

        // Retry
        override_u32(&mut self.retry.max_retries, "ODACTK_RETRY_MAX_RETRIES");
        override_u64(
            &mut self.retry.retry_interval_ms,
            "ODACTK_RETRY_RETRY_INTERVAL_MS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CtkError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.cluster.namespace.trim().is_empty() {
            return Err(invalid("cluster.namespace", "must not be empty".to_owned()));
        }

        if self.cluster.helm_binary.trim().is_empty() {
            return Err(invalid(
                "cluster.helm_binary",
                "must not be empty".to_owned(),
            ));
        }

        if DependentCorrelation::parse(&self.cluster.dependent_correlation).is_none() {
            return Err(invalid(
                "cluster.dependent_correlation",
                "must be one of: positional, by_name".to_owned(),
            ));
        }

        if self.run.teardown_timeout_secs == 0 || self.run.teardown_timeout_secs > MAX_TIMEOUT_SECS
        {
            return Err(invalid(
                "run.teardown_timeout_secs",
                format!("must be 1-{MAX_TIMEOUT_SECS}"),
            ));
        }

        if self.http.request_timeout_secs == 0 || self.http.request_timeout_secs > MAX_TIMEOUT_SECS
        {
            return Err(invalid(
                "http.request_timeout_secs",
                format!("must be 1-{MAX_TIMEOUT_SECS}"),
            ));
        }

        if self.retry.max_retries > MAX_RETRIES {
            return Err(invalid(
                "retry.max_retries",
                format!("must be 0-{MAX_RETRIES}"),
            ));
        }

        if self.retry.retry_interval_ms > MAX_RETRY_INTERVAL_MS {
            return Err(invalid(
                "retry.retry_interval_ms",
                format!("must be 0-{MAX_RETRY_INTERVAL_MS}"),
            ));
        }

        // 스텁 후보 검증
        let mut seen = HashSet::new();
        for (index, stub) in self.dependent_stubs.iter().enumerate() {
            for (field, value) in [
                ("component", &stub.component),
                ("name", &stub.name),
                ("release_name", &stub.release_name),
            ] {
                if value.trim().is_empty() {
                    return Err(invalid(
                        &format!("dependent_stubs[{index}].{field}"),
                        "must not be empty".to_owned(),
                    ));
                }
            }
            let key = (stub.component.to_lowercase(), stub.name.clone());
            if !seen.insert(key) {
                return Err(invalid(
                    &format!("dependent_stubs[{index}].name"),
                    format!(
                        "duplicate stub '{}' for component '{}'",
                        stub.name, stub.component
                    ),
                ));
            }
        }

        Ok(())
    }

    /// 지정한 컴포넌트의 스텁 후보를 파일 순서대로 반환합니다.
    ///
    /// 컴포넌트 이름은 대소문자를 구분하지 않습니다.
    pub fn stub_candidates(&self, component: &str) -> Vec<StubCandidate> {
        self.dependent_stubs
            .iter()
            .filter(|stub| stub.component.eq_ignore_ascii_case(component))
            .map(|stub| StubCandidate {
                name: stub.name.clone(),
                release_name: stub.release_name.clone(),
                headers: stub.headers.clone(),
            })
            .collect()
    }
}

fn invalid(field: &str, reason: String) -> CtkError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 클러스터 접근 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// 대상 Component가 배포된 네임스페이스
    pub namespace: String,
    /// 테스트 대상 Component 매니페스트 파일
    pub component_file: String,
    /// 캐시된 CR 목록 파일 (비어 있으면 사용 안 함)
    pub deployment_snapshot: String,
    /// helm 실행 파일
    pub helm_binary: String,
    /// 의존 API status 대응 방식 (positional, by_name)
    pub dependent_correlation: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            namespace: "components".to_owned(),
            component_file: "component.yaml".to_owned(),
            deployment_snapshot: "deployment.json".to_owned(),
            helm_binary: "helm".to_owned(),
            dependent_correlation: "positional".to_owned(),
        }
    }
}

impl ClusterConfig {
    /// 검증된 대응 방식을 반환합니다. 알 수 없는 값은 기본값입니다.
    pub fn correlation(&self) -> DependentCorrelation {
        DependentCorrelation::parse(&self.dependent_correlation).unwrap_or_default()
    }
}

/// 시나리오 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// 실행할 컴포넌트 (시나리오 태그 `@<component>`와 비교)
    pub component_to_run: String,
    /// 피처 파일 디렉토리
    pub features_dir: String,
    /// 페이로드 파일 디렉토리
    pub payloads_dir: String,
    /// 주입된 페이로드 사본을 남길 디렉토리 (비어 있으면 남기지 않음)
    pub artifacts_dir: String,
    /// 결과 리포트 디렉토리
    pub results_dir: String,
    /// 정리 단계 시간 예산 (초)
    pub teardown_timeout_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            component_to_run: String::new(),
            features_dir: "features".to_owned(),
            payloads_dir: "features/payloads".to_owned(),
            artifacts_dir: String::new(),
            results_dir: "results".to_owned(),
            teardown_timeout_secs: 15,
        }
    }
}

/// HTTP 클라이언트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// TLS 인증서 검증 생략 (테스트 환경 신뢰 모델)
    pub accept_invalid_certs: bool,
    /// 기본 요청 헤더
    pub default_headers: Headers,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let mut default_headers = Headers::new();
        default_headers.insert("Content-Type".to_owned(), "application/json".to_owned());
        Self {
            request_timeout_secs: 30,
            accept_invalid_certs: true,
            default_headers,
        }
    }
}

/// 재시도 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 최대 재시도 횟수
    pub max_retries: u32,
    /// 재시도 간격 (밀리초)
    pub retry_interval_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 30,
            retry_interval_ms: 10_000,
        }
    }
}

/// 스텁 후보 설정 한 건
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StubCandidateConfig {
    /// 테스트 대상 컴포넌트
    pub component: String,
    /// 후보 이름
    pub name: String,
    /// Helm 릴리스 이름
    pub release_name: String,
    /// 후보 전용 헤더
    #[serde(default)]
    pub headers: Headers,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = CtkConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.cluster.namespace, "components");
        assert_eq!(config.run.teardown_timeout_secs, 15);
        assert!(config.http.accept_invalid_certs);
        assert_eq!(
            config.http.default_headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(config.retry.max_retries, 30);
        assert_eq!(config.retry.retry_interval_ms, 10_000);
        assert!(config.dependent_stubs.is_empty());
    }

    #[test]
    fn default_config_passes_validation() {
        CtkConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = CtkConfig::parse("").unwrap();
        assert_eq!(config.cluster.helm_binary, "helm");
        assert_eq!(config.cluster.correlation(), DependentCorrelation::Positional);
    }

    #[test]
    fn stub_candidates_keep_file_order() {
        let toml = r#"
[[dependent_stubs]]
component = "TMFC028"
name = "b"
release_name = "stub-b"

[[dependent_stubs]]
component = "tmfc099"
name = "other"
release_name = "stub-other"

[[dependent_stubs]]
component = "tmfc028"
name = "a"
release_name = "stub-a"
headers = { Authorization = "Bearer x" }
"#;
        let config = CtkConfig::parse(toml).unwrap();
        config.validate().unwrap();

        let candidates = config.stub_candidates("tmfc028");
        let names: Vec<_> = candidates.iter().map(|c| c.release_name.as_str()).collect();
        assert_eq!(names, vec!["stub-b", "stub-a"]);
        assert!(candidates[0].headers.is_empty());
        assert_eq!(
            candidates[1].headers.get("Authorization").map(String::as_str),
            Some("Bearer x")
        );
    }

    #[test]
    fn stub_candidates_empty_for_unknown_component() {
        assert!(CtkConfig::default().stub_candidates("nope").is_empty());
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = CtkConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            CtkError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = CtkConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_empty_namespace() {
        let mut config = CtkConfig::default();
        config.cluster.namespace = "  ".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cluster.namespace"));
    }

    #[test]
    fn validate_rejects_unknown_correlation() {
        let mut config = CtkConfig::default();
        config.cluster.dependent_correlation = "fuzzy".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dependent_correlation"));
    }

    #[test]
    fn validate_rejects_zero_teardown_timeout() {
        let mut config = CtkConfig::default();
        config.run.teardown_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("teardown_timeout_secs"));
    }

    #[test]
    fn validate_rejects_excessive_retry_interval() {
        let mut config = CtkConfig::default();
        config.retry.retry_interval_ms = MAX_RETRY_INTERVAL_MS + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("retry_interval_ms"));
    }

    #[test]
    fn validate_rejects_stub_without_release() {
        let mut config = CtkConfig::default();
        config.dependent_stubs.push(StubCandidateConfig {
            component: "tmfc028".to_owned(),
            name: "a".to_owned(),
            release_name: String::new(),
            headers: Headers::new(),
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dependent_stubs[0].release_name"));
    }

    #[test]
    fn validate_rejects_duplicate_stub_names_per_component() {
        let stub = StubCandidateConfig {
            component: "tmfc028".to_owned(),
            name: "a".to_owned(),
            release_name: "stub-a".to_owned(),
            headers: Headers::new(),
        };
        let mut config = CtkConfig::default();
        config.dependent_stubs.push(stub.clone());
        config.dependent_stubs.push(StubCandidateConfig {
            component: "TMFC028".to_owned(),
            ..stub
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate stub"));
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: #[serial] 테스트에서만 환경변수를 조작합니다.
        unsafe { std::env::set_var("TEST_ODACTK_STR", "overridden") };
        override_string(&mut val, "TEST_ODACTK_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_ODACTK_STR") };
    }

    #[test]
    #[serial]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = true;
        // SAFETY: #[serial] 테스트에서만 환경변수를 조작합니다.
        unsafe { std::env::set_var("TEST_ODACTK_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_ODACTK_BOOL_BAD");
        assert!(val);
        unsafe { std::env::remove_var("TEST_ODACTK_BOOL_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_applies_to_config() {
        let mut config = CtkConfig::default();
        // SAFETY: #[serial] 테스트에서만 환경변수를 조작합니다.
        unsafe { std::env::set_var("ODACTK_RUN_COMPONENT_TO_RUN", "tmfc028") };
        unsafe { std::env::set_var("ODACTK_RUN_TEARDOWN_TIMEOUT_SECS", "20") };
        config.apply_env_overrides();
        unsafe { std::env::remove_var("ODACTK_RUN_COMPONENT_TO_RUN") };
        unsafe { std::env::remove_var("ODACTK_RUN_TEARDOWN_TIMEOUT_SECS") };

        assert_eq!(config.run.component_to_run, "tmfc028");
        assert_eq!(config.run.teardown_timeout_secs, 20);
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = 7_u64;
        override_u64(&mut val, "TEST_ODACTK_NONEXISTENT_12345");
        assert_eq!(val, 7);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let mut config = CtkConfig::default();
        config.dependent_stubs.push(StubCandidateConfig {
            component: "tmfc028".to_owned(),
            name: "a".to_owned(),
            release_name: "stub-a".to_owned(),
            headers: Headers::new(),
        });
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = CtkConfig::parse(&toml_str).unwrap();
        assert_eq!(parsed.cluster.namespace, config.cluster.namespace);
        assert_eq!(parsed.dependent_stubs.len(), 1);
        assert_eq!(parsed.http.default_headers, config.http.default_headers);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = CtkConfig::from_file("/nonexistent/path/odactk.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CtkError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
