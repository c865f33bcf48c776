//! 시나리오 단위 상태
//!
//! 한 시나리오가 소유하는 모든 가변 상태를 담습니다. 시나리오 사이에서
//! 공유되지 않으며, 단계가 진행될 때마다 [`Phase`]가 앞으로만 이동합니다.

use std::fmt;

use odactk_core::types::ResolvedStub;
use serde::Serialize;
use tracing::debug;

use crate::error::RunnerError;
use crate::http::ApiResponse;
use crate::ledger::ResourceLedger;

/// 시나리오 진행 단계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Init,
    EndpointsResolved,
    StubResolved,
    StubSeeded,
    ActionExecuted,
    Asserted,
    CleanedUp,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::EndpointsResolved => "endpoints_resolved",
            Self::StubResolved => "stub_resolved",
            Self::StubSeeded => "stub_seeded",
            Self::ActionExecuted => "action_executed",
            Self::Asserted => "asserted",
            Self::CleanedUp => "cleaned_up",
        };
        f.write_str(name)
    }
}

/// 의존 스텁에 준비된 리소스
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    pub id: String,
    pub href: Option<String>,
}

/// 시나리오 하나의 가변 상태
#[derive(Debug, Default)]
pub struct ScenarioContext {
    pub exposed_url: Option<String>,
    pub dependent_url: Option<String>,
    pub stub: Option<ResolvedStub>,
    pub dependent: Option<ResourceRef>,
    pub last_response: Option<ApiResponse>,
    pub ledger: ResourceLedger,
    phase: Phase,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 다음 단계로 이동합니다. 뒤로 가는 전이는 무시합니다.
    pub fn advance(&mut self, phase: Phase) {
        if phase > self.phase {
            debug!(from = %self.phase, to = %phase, "scenario phase");
            self.phase = phase;
        }
    }

    pub fn exposed_url(&self) -> Result<&str, RunnerError> {
        self.exposed_url
            .as_deref()
            .ok_or_else(|| RunnerError::Configuration("exposed API base URL not resolved".to_owned()))
    }

    pub fn dependent_url(&self) -> Result<&str, RunnerError> {
        self.dependent_url.as_deref().ok_or_else(|| {
            RunnerError::Configuration("dependent API base URL not resolved".to_owned())
        })
    }

    pub fn stub(&self) -> Result<&ResolvedStub, RunnerError> {
        self.stub
            .as_ref()
            .ok_or_else(|| RunnerError::Configuration("dependent stub not resolved".to_owned()))
    }
}
