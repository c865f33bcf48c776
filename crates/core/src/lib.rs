//! # odactk-core
//!
//! ODA Component 적합성 테스트 도구의 공통 기반 크레이트입니다.
//!
//! - [`config`]: `odactk.toml` 로딩, 환경변수 오버라이드, 검증
//! - [`error`]: 도메인별 에러 타입
//! - [`types`]: Component CR 모델과 스텁 후보
//! - [`manifest`]: 다중 문서 YAML 매니페스트 헬퍼
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod manifest;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ClusterError, ConfigError, CtkError, ParseError, ScenarioError};

// 설정
pub use config::CtkConfig;

// 도메인 타입
pub use types::{
    ApiDescriptor, ApiStatus, ComponentDeployment, DependentCorrelation, Headers, ResolvedStub,
    StubCandidate,
};
