//! 클러스터 조회 에러 타입
//!
//! [`DiscoveryError`]는 Kubernetes, Helm, 스냅샷 파일 조회 중 발생하는 에러를 표현합니다.
//! `From<DiscoveryError> for CtkError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use odactk_core::error::{ClusterError, CtkError, ParseError};

/// 클러스터 조회 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Kubernetes 클라이언트 생성 실패
    #[error("kubernetes connection error: {0}")]
    KubeConnection(String),

    /// Kubernetes API 호출 실패
    #[error("kubernetes api error: {0}")]
    KubeApi(String),

    /// Helm 명령 실패
    #[error("helm command failed for release '{release}': {reason}")]
    HelmCommand {
        /// 대상 릴리스
        release: String,
        /// 실패 사유 (stderr 또는 실행 에러)
        reason: String,
    },

    /// 허용되지 않는 릴리스 이름
    #[error("invalid release name '{0}'")]
    InvalidRelease(String),

    /// 스냅샷 또는 매니페스트 파일 읽기 실패
    #[error("failed to read {path}: {reason}")]
    Read {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 매니페스트 파싱 실패
    #[error(transparent)]
    Manifest(#[from] ParseError),

    /// 대상 Component CR 없음
    #[error("component '{name}' not found in namespace '{namespace}'")]
    ComponentNotFound {
        /// Component 이름
        name: String,
        /// 네임스페이스
        namespace: String,
    },
}

impl From<DiscoveryError> for CtkError {
    fn from(err: DiscoveryError) -> Self {
        let message = err.to_string();
        match err {
            DiscoveryError::Manifest(parse) => CtkError::Parse(parse),
            DiscoveryError::KubeConnection(msg) | DiscoveryError::KubeApi(msg) => {
                CtkError::Cluster(ClusterError::Kubernetes(msg))
            }
            DiscoveryError::HelmCommand { release, reason } => {
                CtkError::Cluster(ClusterError::Helm { release, reason })
            }
            DiscoveryError::InvalidRelease(release) => CtkError::Cluster(ClusterError::Helm {
                reason: "invalid release name".to_owned(),
                release,
            }),
            DiscoveryError::ComponentNotFound { .. } | DiscoveryError::Read { .. } => {
                CtkError::Cluster(ClusterError::NotFound(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helm_command_display() {
        let err = DiscoveryError::HelmCommand {
            release: "stub-a".to_owned(),
            reason: "release: not found".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("stub-a"));
        assert!(msg.contains("release: not found"));
    }

    #[test]
    fn component_not_found_display() {
        let err = DiscoveryError::ComponentNotFound {
            name: "r1-partymanagement".to_owned(),
            namespace: "components".to_owned(),
        };
        assert!(err.to_string().contains("r1-partymanagement"));
    }

    #[test]
    fn converts_helm_error() {
        let err = DiscoveryError::HelmCommand {
            release: "stub-a".to_owned(),
            reason: "boom".to_owned(),
        };
        let ctk: CtkError = err.into();
        assert!(matches!(
            ctk,
            CtkError::Cluster(ClusterError::Helm { ref release, .. }) if release == "stub-a"
        ));
    }

    #[test]
    fn converts_manifest_error_to_parse() {
        let err = DiscoveryError::from(ParseError::MissingComponent("component.yaml".to_owned()));
        let ctk: CtkError = err.into();
        assert!(matches!(ctk, CtkError::Parse(ParseError::MissingComponent(_))));
    }

    #[test]
    fn converts_kube_error() {
        let ctk: CtkError = DiscoveryError::KubeApi("forbidden".to_owned()).into();
        assert!(matches!(ctk, CtkError::Cluster(ClusterError::Kubernetes(_))));
    }
}
