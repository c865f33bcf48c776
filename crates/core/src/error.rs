//! 에러 타입: 도메인별 에러 정의

/// odactk 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum CtkError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 매니페스트/페이로드 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 클러스터(Kubernetes, Helm) 조회 에러
    #[error("cluster error: {0}")]
    Cluster(#[from] ClusterError),

    /// 시나리오 실행 에러
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// YAML 스트림 파싱 실패
    #[error("invalid yaml in {source_name}: {reason}")]
    Yaml { source_name: String, reason: String },

    /// `kind: Component` 문서가 없음
    #[error("no document of kind 'Component' in {0}")]
    MissingComponent(String),

    /// 필수 필드 누락
    #[error("missing field '{field}' in {source_name}")]
    MissingField { source_name: String, field: String },
}

/// 클러스터 조회 에러
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// Kubernetes API 호출 실패
    #[error("kubernetes api: {0}")]
    Kubernetes(String),

    /// Helm 명령 실패
    #[error("helm release '{release}': {reason}")]
    Helm { release: String, reason: String },

    /// 대상 리소스 없음
    #[error("not found: {0}")]
    NotFound(String),
}

/// 시나리오 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// 시나리오 설정 오류 (스텁 매핑 누락, 잘못된 기대 결과 등)
    #[error("configuration: {0}")]
    Configuration(String),

    /// 엔드포인트/스텁 해석 실패
    #[error("unresolved: {0}")]
    Unresolved(String),

    /// 네트워크 수준 실패
    #[error("http: {0}")]
    Http(String),

    /// 결과 검증 실패
    #[error("assertion: {0}")]
    Assertion(String),
}
