//! 리소스 원장: 시나리오 중 생성된 리소스 추적과 정리
//!
//! 생성 호출이 201과 식별자를 돌려주면 [`ResourceLedger`]에 기록하고,
//! 시나리오가 끝나면 성공/실패와 무관하게 [`teardown`]이 모든 항목에
//! DELETE를 보냅니다. 정리 결과는 에러가 아니라 [`CleanupReport`]로 반환됩니다.

use std::time::Duration;

use metrics::counter;
use odactk_core::metrics as m;
use odactk_core::types::Headers;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::http::{ApiRequest, HttpApi, join_url};

/// 생성된 리소스 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedResource {
    /// 리소스를 생성한 컬렉션 URL
    pub collection_url: String,
    /// 서버가 돌려준 식별자
    pub id: String,
    /// 생성 시 사용한 헤더 (삭제에도 사용)
    #[serde(skip)]
    pub headers: Headers,
}

impl TrackedResource {
    pub fn delete_url(&self) -> String {
        join_url(&self.collection_url, &self.id)
    }
}

/// 시나리오 단위 리소스 원장 (중복 제거 없음)
#[derive(Debug, Default)]
pub struct ResourceLedger {
    entries: Vec<TrackedResource>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 생성된 리소스를 기록합니다.
    pub fn track(&mut self, collection_url: &str, id: &str, headers: &Headers) {
        info!(collection = collection_url, id, "tracking resource for cleanup");
        self.entries.push(TrackedResource {
            collection_url: collection_url.to_owned(),
            id: id.to_owned(),
            headers: headers.clone(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 모든 항목을 꺼내고 원장을 비웁니다.
    pub fn take(&mut self) -> Vec<TrackedResource> {
        std::mem::take(&mut self.entries)
    }
}

/// 삭제 시도 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CleanupOutcome {
    /// 200 또는 204
    Deleted { status: u16 },
    /// 그 밖의 응답 (이미 삭제된 404 포함)
    Rejected { status: u16 },
    /// 응답을 받지 못함
    Failed { reason: String },
    /// 시간 예산 초과로 시도하지 않았거나 중단됨
    Abandoned,
}

impl CleanupOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Deleted { .. } => "deleted",
            Self::Rejected { .. } => "rejected",
            Self::Failed { .. } => "failed",
            Self::Abandoned => "abandoned",
        }
    }
}

/// 리소스별 정리 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupEntry {
    pub resource: TrackedResource,
    #[serde(flatten)]
    pub outcome: CleanupOutcome,
}

/// 정리 단계 전체 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub entries: Vec<CleanupEntry>,
}

impl CleanupReport {
    pub fn deleted(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, CleanupOutcome::Deleted { .. }))
            .count()
    }

    /// 모든 리소스가 삭제되었는지 여부
    pub fn is_clean(&self) -> bool {
        self.deleted() == self.entries.len()
    }
}

/// 원장의 모든 리소스를 삭제합니다.
///
/// 원장은 호출 직후 비워지며, `budget`이 지나면 남은 삭제는 중단됩니다.
pub async fn teardown<H: HttpApi>(
    ledger: &mut ResourceLedger,
    http: &H,
    budget: Duration,
) -> CleanupReport {
    let resources = ledger.take();
    if resources.is_empty() {
        debug!("no resources to clean up");
        return CleanupReport::default();
    }

    info!(count = resources.len(), "cleaning up created resources");
    let deadline = Instant::now() + budget;
    let mut report = CleanupReport::default();

    for resource in resources {
        let url = resource.delete_url();
        let outcome = if Instant::now() >= deadline {
            CleanupOutcome::Abandoned
        } else {
            let request = ApiRequest::delete(&url, &resource.headers);
            match tokio::time::timeout_at(deadline, http.send(request)).await {
                Ok(Ok(response)) if response.status == 200 || response.status == 204 => {
                    CleanupOutcome::Deleted {
                        status: response.status,
                    }
                }
                Ok(Ok(response)) => CleanupOutcome::Rejected {
                    status: response.status,
                },
                Ok(Err(e)) => CleanupOutcome::Failed {
                    reason: e.to_string(),
                },
                Err(_) => CleanupOutcome::Abandoned,
            }
        };

        match &outcome {
            CleanupOutcome::Deleted { .. } => info!(%url, "deleted resource"),
            CleanupOutcome::Rejected { status } => {
                warn!(%url, status, "failed to delete resource")
            }
            CleanupOutcome::Failed { reason } => warn!(%url, %reason, "error deleting resource"),
            CleanupOutcome::Abandoned => warn!(%url, "cleanup budget exhausted, resource abandoned"),
        }
        counter!(m::CLEANUP_DELETES_TOTAL, m::LABEL_RESULT => outcome.label()).increment(1);

        report.entries.push(CleanupEntry { resource, outcome });
    }

    report
}
