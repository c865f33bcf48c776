//! Helm release manifest abstraction for testability.
//!
//! The [`ReleaseManifests`] trait abstracts `helm get manifest`, allowing
//! production code to use [`HelmCli`] while tests use `MockReleaseManifests`.
//!
//! # Release Name Validation
//!
//! Release names are passed to a child process, so they are validated first:
//! - Must be 1-53 characters
//! - Must contain only lowercase ASCII letters, digits, `-` and `.`

use std::future::Future;

use tracing::debug;

use crate::error::DiscoveryError;

/// Helm 릴리스 이름 최대 길이
const MAX_RELEASE_NAME_LEN: usize = 53;

fn validate_release_name(release: &str) -> Result<(), DiscoveryError> {
    let valid = !release.is_empty()
        && release.len() <= MAX_RELEASE_NAME_LEN
        && release
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(DiscoveryError::InvalidRelease(release.to_owned()))
    }
}

/// Trait abstracting rendered-manifest retrieval for a Helm release.
///
/// # Errors
///
/// - `DiscoveryError::InvalidRelease`: release name rejected before execution
/// - `DiscoveryError::HelmCommand`: helm could not be started or exited non-zero
pub trait ReleaseManifests: Send + Sync + 'static {
    /// Returns the multi-document YAML manifest rendered for `release`.
    fn rendered_manifest(
        &self,
        release: &str,
        namespace: &str,
    ) -> impl Future<Output = Result<String, DiscoveryError>> + Send;
}

/// `helm` 실행 파일을 호출하는 프로덕션 구현
pub struct HelmCli {
    binary: String,
}

impl HelmCli {
    /// 주어진 helm 실행 파일로 생성합니다.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for HelmCli {
    fn default() -> Self {
        Self::new("helm")
    }
}

impl ReleaseManifests for HelmCli {
    async fn rendered_manifest(
        &self,
        release: &str,
        namespace: &str,
    ) -> Result<String, DiscoveryError> {
        validate_release_name(release)?;
        debug!(release, namespace, binary = %self.binary, "fetching helm manifest");

        let output = tokio::process::Command::new(&self.binary)
            .args(["get", "manifest", release, "-n", namespace])
            .output()
            .await
            .map_err(|e| DiscoveryError::HelmCommand {
                release: release.to_owned(),
                reason: format!("failed to run {}: {e}", self.binary),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DiscoveryError::HelmCommand {
                release: release.to_owned(),
                reason: stderr.trim().to_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| DiscoveryError::HelmCommand {
            release: release.to_owned(),
            reason: format!("manifest is not utf-8: {e}"),
        })
    }
}

/// 테스트용 Mock 매니페스트 소스
///
/// 릴리스별 응답을 지정하고, 호출된 릴리스 순서를 기록합니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockReleaseManifests {
    manifests: std::collections::HashMap<String, Result<String, String>>,
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockReleaseManifests {
    pub fn new() -> Self {
        Self::default()
    }

    /// 릴리스의 렌더링 결과를 지정합니다.
    pub fn with_manifest(mut self, release: &str, manifest: &str) -> Self {
        self.manifests
            .insert(release.to_owned(), Ok(manifest.to_owned()));
        self
    }

    /// 릴리스 조회가 실패하도록 설정합니다.
    pub fn with_failure(mut self, release: &str, reason: &str) -> Self {
        self.manifests
            .insert(release.to_owned(), Err(reason.to_owned()));
        self
    }

    /// 지금까지 조회된 릴리스 목록
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl ReleaseManifests for MockReleaseManifests {
    async fn rendered_manifest(
        &self,
        release: &str,
        _namespace: &str,
    ) -> Result<String, DiscoveryError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(release.to_owned());
        }
        match self.manifests.get(release) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(reason)) => Err(DiscoveryError::HelmCommand {
                release: release.to_owned(),
                reason: reason.clone(),
            }),
            None => Err(DiscoveryError::HelmCommand {
                release: release.to_owned(),
                reason: "Error: release: not found".to_owned(),
            }),
        }
    }
}
