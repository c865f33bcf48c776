//! 시나리오 실행 에러 타입
//!
//! [`RunnerError`]는 시나리오를 실패로 만드는 모든 원인을 표현합니다.
//! 2xx가 아닌 HTTP 응답과 정리 단계 실패는 에러가 아니라 값으로 다룹니다.

use odactk_cluster::DiscoveryError;
use odactk_core::error::{CtkError, ScenarioError};

/// 시나리오 실행 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// 잘못된 시나리오 설정 (스텁 매핑 누락, 알 수 없는 기대 결과 등)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 엔드포인트, 스텁 또는 식별자를 해석하지 못함
    #[error("could not resolve '{identifier}' against '{target}'")]
    Unresolved {
        /// 해석하려던 식별자
        identifier: String,
        /// 대상 URL 또는 검색 범위
        target: String,
    },

    /// 응답을 받지 못한 네트워크 수준 실패
    #[error("request {method} {url} failed: {reason}")]
    Network {
        method: String,
        url: String,
        reason: String,
    },

    /// 의존 스텁 초기화 실패 (201이 아닌 응답)
    #[error("dependent API stub '{resource}' failed to initialize (status {status})")]
    SeedFailed { resource: String, status: u16 },

    /// 기대 결과 불일치
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// 페이로드 파일 읽기/쓰기/파싱 실패
    #[error("payload '{name}': {reason}")]
    Payload { name: String, reason: String },

    /// 피처 파일 로딩 실패
    #[error("feature load error: {path}: {reason}")]
    FeatureLoad { path: String, reason: String },

    /// 클러스터 조회 실패
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

impl From<RunnerError> for CtkError {
    fn from(err: RunnerError) -> Self {
        let message = err.to_string();
        match err {
            RunnerError::Discovery(inner) => inner.into(),
            RunnerError::Configuration(_) | RunnerError::FeatureLoad { .. } => {
                CtkError::Scenario(ScenarioError::Configuration(message))
            }
            RunnerError::Unresolved { .. } => CtkError::Scenario(ScenarioError::Unresolved(message)),
            RunnerError::Network { .. } => CtkError::Scenario(ScenarioError::Http(message)),
            RunnerError::SeedFailed { .. }
            | RunnerError::Assertion(_)
            | RunnerError::Payload { .. } => CtkError::Scenario(ScenarioError::Assertion(message)),
        }
    }
}
