//! 기대 결과 판정
//!
//! `success`는 정확히 201을, `failure`는 201이 아닌 모든 상태를 요구합니다.
//! 실패 상태 코드 목록은 메시지에만 쓰이며 검증에는 쓰이지 않습니다.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::RunnerError;

/// 생성 성공 상태 코드
pub const SUCCESS_STATUS: u16 = 201;

/// 흔한 실패 상태 코드 (메시지용)
pub const COMMON_FAILURE_STATUSES: [u16; 6] = [400, 404, 401, 403, 500, 503];

/// 시나리오가 기대하는 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedOutcome {
    Success,
    Failure,
}

impl FromStr for ExpectedOutcome {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            other => Err(RunnerError::Configuration(format!(
                "invalid expected response value: '{other}' (must be 'success' or 'failure')"
            ))),
        }
    }
}

impl fmt::Display for ExpectedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// 관측된 상태 코드가 기대 결과와 맞는지 검증합니다.
pub fn verify_outcome(
    operation: &str,
    expected: ExpectedOutcome,
    status: u16,
) -> Result<(), RunnerError> {
    match expected {
        ExpectedOutcome::Success if status != SUCCESS_STATUS => {
            Err(RunnerError::Assertion(format!(
                "operation {operation} failed: expected status {SUCCESS_STATUS}, but got {status}"
            )))
        }
        ExpectedOutcome::Failure if status == SUCCESS_STATUS => {
            let common = COMMON_FAILURE_STATUSES
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            Err(RunnerError::Assertion(format!(
                "operation {operation} unexpectedly succeeded: expected one of [{common}, etc.], but got {status}"
            )))
        }
        _ => Ok(()),
    }
}
