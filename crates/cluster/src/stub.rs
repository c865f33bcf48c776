//! 스텁 릴리스 매처
//!
//! 의존 API를 대신 제공할 수 있는 Helm 릴리스 후보들의 렌더링된 매니페스트를
//! 순서대로 조회하여, `kind: Component` 문서가 선언한 노출 API 경로가
//! 실제 의존 API URL에 포함되는 첫 후보를 고릅니다 (first match).
//!
//! 후보 하나의 조회/파싱 실패는 경고 후 다음 후보로 넘어갑니다.

use metrics::counter;
use odactk_core::manifest::{KindMatch, declared_exposed_paths, find_component, parse_documents};
use odactk_core::metrics as m;
use odactk_core::types::{Headers, ResolvedStub, StubCandidate};
use tracing::{debug, info, warn};

use crate::helm::ReleaseManifests;

/// 스텁 해석 요청
#[derive(Debug, Clone, Copy)]
pub struct StubQuery<'a> {
    /// 테스트 대상 컴포넌트
    pub component_under_test: &'a str,
    /// 의존 컴포넌트 이름 (로그용)
    pub dependent_component: &'a str,
    /// 해석된 의존 API base URL
    pub dependent_url: &'a str,
    /// 스텁 릴리스가 설치된 네임스페이스
    pub namespace: &'a str,
}

/// 렌더링된 매니페스트로 스텁 후보를 매칭합니다.
pub struct StubMatcher<M> {
    manifests: M,
}

impl<M: ReleaseManifests> StubMatcher<M> {
    pub fn new(manifests: M) -> Self {
        Self { manifests }
    }

    /// 매니페스트 소스에 대한 참조
    pub fn manifests(&self) -> &M {
        &self.manifests
    }

    /// 첫 번째로 일치하는 후보를 반환합니다.
    ///
    /// 후보 헤더가 비어 있으면 `default_headers`를 사용합니다.
    pub async fn resolve(
        &self,
        query: &StubQuery<'_>,
        candidates: &[StubCandidate],
        default_headers: &Headers,
    ) -> Option<ResolvedStub> {
        for candidate in candidates {
            let release = candidate.release_name.as_str();
            let Some(paths) = self.declared_paths(release, query.namespace).await else {
                continue;
            };

            let matched = paths
                .iter()
                .find(|path| !path.is_empty() && query.dependent_url.contains(path.as_str()));

            if let Some(path) = matched {
                info!(
                    component = query.component_under_test,
                    dependent = query.dependent_component,
                    release,
                    path = %path,
                    "stub release matched"
                );
                counter!(m::STUB_RESOLUTIONS_TOTAL, m::LABEL_RESULT => "matched").increment(1);

                let headers = if candidate.headers.is_empty() {
                    default_headers.clone()
                } else {
                    candidate.headers.clone()
                };
                return Some(ResolvedStub {
                    release_name: candidate.release_name.clone(),
                    headers,
                });
            }

            debug!(
                release,
                url = query.dependent_url,
                declared = paths.len(),
                "no declared path matches"
            );
        }

        warn!(
            component = query.component_under_test,
            dependent = query.dependent_component,
            url = query.dependent_url,
            candidates = candidates.len(),
            "no stub release serves the dependent api"
        );
        counter!(m::STUB_RESOLUTIONS_TOTAL, m::LABEL_RESULT => "unmatched").increment(1);
        None
    }

    // 조회 또는 파싱에 실패한 후보는 None
    async fn declared_paths(&self, release: &str, namespace: &str) -> Option<Vec<String>> {
        let text = match self.manifests.rendered_manifest(release, namespace).await {
            Ok(text) => text,
            Err(e) => {
                warn!(release, error = %e, "could not retrieve helm manifest, skipping");
                return None;
            }
        };

        let source_name = format!("helm:{release}");
        let documents = match parse_documents(&text, &source_name) {
            Ok(documents) => documents,
            Err(e) => {
                warn!(release, error = %e, "unparsable helm manifest, skipping");
                return None;
            }
        };

        let Some(component) = find_component(&documents, KindMatch::Exact) else {
            debug!(release, "no Component document in release");
            return None;
        };

        Some(declared_exposed_paths(component))
    }
}
