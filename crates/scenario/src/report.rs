//! 실행 결과 리포트
//!
//! 시나리오 판정을 피처 단위와 전체 실행 단위로 집계하고,
//! 외부 리포트 생성기가 읽을 JSON 파일(`bdd-report.json`)로 기록합니다.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::context::Phase;
use crate::error::RunnerError;
use crate::ledger::CleanupReport;

/// 리포트 파일 이름
pub const REPORT_FILE_NAME: &str = "bdd-report.json";

/// 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    Failed,
    Skipped,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// 시나리오 결과
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub verdict: Verdict,
    /// 마지막으로 도달한 단계
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub cleanup: CleanupReport,
    pub duration_ms: u64,
}

impl ScenarioReport {
    /// 태그가 맞지 않아 건너뛴 시나리오
    pub fn skipped(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            verdict: Verdict::Skipped,
            phase: Phase::Init,
            error: None,
            cleanup: CleanupReport::default(),
            duration_ms: 0,
        }
    }
}

/// 피처 결과
#[derive(Debug, Clone, Serialize)]
pub struct FeatureReport {
    pub name: String,
    pub source: String,
    pub verdict: Verdict,
    pub scenarios: Vec<ScenarioReport>,
}

impl FeatureReport {
    /// 시나리오 판정을 집계합니다.
    ///
    /// 하나라도 실패하면 실패, 모두 건너뛰었으면 건너뜀, 그 밖에는 통과입니다.
    pub fn new(name: &str, source: &str, scenarios: Vec<ScenarioReport>) -> Self {
        let verdict = if scenarios.iter().any(|s| s.verdict == Verdict::Failed) {
            Verdict::Failed
        } else if scenarios.iter().all(|s| s.verdict == Verdict::Skipped) {
            Verdict::Skipped
        } else {
            Verdict::Passed
        };
        Self {
            name: name.to_owned(),
            source: source.to_owned(),
            verdict,
            scenarios,
        }
    }
}

/// 판정별 시나리오 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// 전체 실행 결과
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub component: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub features: Vec<FeatureReport>,
}

impl RunReport {
    pub fn new(component: &str, started_at: DateTime<Utc>, features: Vec<FeatureReport>) -> Self {
        let mut summary = RunSummary::default();
        for scenario in features.iter().flat_map(|f| f.scenarios.iter()) {
            summary.total += 1;
            match scenario.verdict {
                Verdict::Passed => summary.passed += 1,
                Verdict::Failed => summary.failed += 1,
                Verdict::Skipped => summary.skipped += 1,
            }
        }
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            component: component.to_owned(),
            started_at,
            finished_at: Utc::now(),
            summary,
            features,
        }
    }

    /// 실패한 시나리오가 없으면 통과입니다.
    pub fn passed(&self) -> bool {
        self.summary.failed == 0
    }

    /// 리포트를 `dir/bdd-report.json`에 기록합니다.
    pub async fn write_json(&self, dir: impl AsRef<Path>) -> Result<PathBuf, RunnerError> {
        let dir = dir.as_ref();
        let report_error = |reason: String| RunnerError::Payload {
            name: REPORT_FILE_NAME.to_owned(),
            reason,
        };

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| report_error(format!("{}: {e}", dir.display())))?;
        let path = dir.join(REPORT_FILE_NAME);
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| report_error(format!("serialize: {e}")))?;
        tokio::fs::write(&path, text)
            .await
            .map_err(|e| report_error(format!("{}: {e}", path.display())))?;

        info!(path = %path.display(), "wrote run report");
        Ok(path)
    }
}
