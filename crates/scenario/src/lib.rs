//! # odactk-scenario
//!
//! 피처 파일에 정의된 시나리오를 실제 API에 대해 실행합니다.
//! 의존 스텁에 리소스를 준비하고, 노출 API를 호출하고, 결과를 검증한 뒤
//! 생성한 리소스를 정리합니다.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`RunnerError`)
//! - [`http`]: Outbound HTTP abstraction (`HttpApi` trait, `ReqwestHttpClient`)
//! - [`payload`]: JSON fixtures and dotted-path injection (`PayloadStore`)
//! - [`ledger`]: Created-resource tracking and teardown (`ResourceLedger`, `CleanupReport`)
//! - [`outcome`]: Expected outcome assertion (`ExpectedOutcome`)
//! - [`context`]: Per-scenario state (`ScenarioContext`, `Phase`)
//! - [`definition`]: Feature files and tag selection (`FeatureFile`, `FeatureLoader`)
//! - [`runner`]: Main orchestrator (`ScenarioRunner`)
//! - [`report`]: Verdicts and the JSON run report (`RunReport`)
//!
//! # Architecture
//!
//! ```text
//! FeatureLoader ─> ScenarioRunner.run_features()
//!                      │  per scenario: ScenarioContext
//!                      ├─ EndpointSource.discover()
//!                      ├─ StubMatcher.resolve()
//!                      ├─ seed (HttpApi) ─┐
//!                      ├─ action (HttpApi)├─> ResourceLedger
//!                      ├─ verify_outcome  │
//!                      └─ teardown() <────┘ ─> CleanupReport
//!                  ─> RunReport ─> bdd-report.json
//! ```

pub mod context;
pub mod definition;
pub mod error;
pub mod http;
pub mod ledger;
pub mod outcome;
pub mod payload;
pub mod report;
pub mod runner;

// --- Public API Re-exports ---

// Runner (main orchestrator)
pub use runner::{RunSettings, ScenarioRunner};

// Error
pub use error::RunnerError;

// Definitions
pub use definition::{FeatureFile, FeatureLoader, ScenarioDefinition};

// HTTP
pub use http::{ApiRequest, ApiResponse, HttpApi, Method, ReqwestHttpClient};

// Payloads
pub use payload::PayloadStore;

// Ledger
pub use ledger::{CleanupOutcome, CleanupReport, ResourceLedger, teardown};

// Outcome
pub use outcome::{ExpectedOutcome, verify_outcome};

// Context and reports
pub use context::{Phase, ScenarioContext};
pub use report::{FeatureReport, RunReport, RunSummary, ScenarioReport, Verdict};
