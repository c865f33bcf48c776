//! 시나리오 실행기
//!
//! 시나리오 하나를 다음 순서로 진행합니다.
//!
//! 1. 노출/의존 API base URL 탐색
//! 2. 의존 API를 제공하는 스텁 릴리스 확인
//! 3. 스텁에 의존 리소스 준비 (이미 있으면 재사용)
//! 4. 의존 리소스 참조를 주입한 페이로드로 노출 API 호출
//! 5. 기대 결과 검증
//!
//! 어느 단계에서 실패하든 마지막에 정리(teardown)가 실행됩니다.
//! 모든 가변 상태는 시나리오마다 새로 만드는 [`ScenarioContext`]에 있습니다.

use std::time::Duration;

use chrono::Utc;
use metrics::{counter, histogram};
use odactk_cluster::{EndpointSource, ReleaseManifests, StubMatcher, StubQuery};
use odactk_core::config::CtkConfig;
use odactk_core::metrics as m;
use odactk_core::types::{Headers, StubCandidate};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::context::{Phase, ResourceRef, ScenarioContext};
use crate::definition::{ActionStep, FeatureFile, ScenarioDefinition, SeedStep, ThenStep};
use crate::error::RunnerError;
use crate::http::{ApiRequest, HttpApi, join_url};
use crate::ledger::teardown;
use crate::outcome::{ExpectedOutcome, SUCCESS_STATUS, verify_outcome};
use crate::payload::{PayloadStore, set_path, strip_identity};
use crate::report::{FeatureReport, RunReport, ScenarioReport, Verdict};

/// 실행기 설정
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// 실행할 컴포넌트 이름
    pub component_to_run: String,
    /// 스텁 릴리스 네임스페이스
    pub namespace: String,
    /// 노출 API 호출과 헤더가 없는 스텁 후보에 쓰는 헤더
    pub default_headers: Headers,
    /// 실행할 컴포넌트의 스텁 후보 (설정 파일 순서)
    pub candidates: Vec<StubCandidate>,
    /// 정리 단계 시간 예산
    pub teardown_budget: Duration,
}

impl RunSettings {
    pub fn from_config(config: &CtkConfig) -> Self {
        let component = config.run.component_to_run.trim();
        Self {
            component_to_run: component.to_owned(),
            namespace: config.cluster.namespace.clone(),
            default_headers: config.http.default_headers.clone(),
            candidates: config.stub_candidates(component),
            teardown_budget: Duration::from_secs(config.run.teardown_timeout_secs),
        }
    }
}

/// 시나리오 실행기
pub struct ScenarioRunner<E, M, H> {
    endpoints: E,
    matcher: StubMatcher<M>,
    http: H,
    payloads: PayloadStore,
    settings: RunSettings,
}

impl<E, M, H> ScenarioRunner<E, M, H>
where
    E: EndpointSource,
    M: ReleaseManifests,
    H: HttpApi,
{
    pub fn new(
        endpoints: E,
        manifests: M,
        http: H,
        payloads: PayloadStore,
        settings: RunSettings,
    ) -> Self {
        Self {
            endpoints,
            matcher: StubMatcher::new(manifests),
            http,
            payloads,
            settings,
        }
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    /// 모든 피처를 순서대로 실행하고 집계합니다.
    pub async fn run_features(&self, features: &[FeatureFile]) -> RunReport {
        let started_at = Utc::now();
        let mut reports = Vec::with_capacity(features.len());

        for feature in features {
            let mut scenarios = Vec::with_capacity(feature.scenarios.len());
            for scenario in &feature.scenarios {
                scenarios.push(self.run_scenario(&feature.tags, scenario).await);
            }
            let report = FeatureReport::new(&feature.feature, &feature.source, scenarios);
            info!(
                feature = %feature.feature,
                verdict = report.verdict.as_str(),
                "feature finished"
            );
            reports.push(report);
        }

        let report = RunReport::new(&self.settings.component_to_run, started_at, reports);
        info!(
            total = report.summary.total,
            passed = report.summary.passed,
            failed = report.summary.failed,
            skipped = report.summary.skipped,
            "run finished"
        );
        report
    }

    /// 시나리오 하나를 실행합니다. 선택되지 않은 시나리오는 건너뜁니다.
    pub async fn run_scenario(
        &self,
        feature_tags: &[String],
        scenario: &ScenarioDefinition,
    ) -> ScenarioReport {
        if !scenario.is_selected(feature_tags, &self.settings.component_to_run) {
            debug!(
                scenario = %scenario.name,
                component = %self.settings.component_to_run,
                "scenario not tagged for component, skipping"
            );
            counter!(m::SCENARIOS_TOTAL, m::LABEL_VERDICT => Verdict::Skipped.as_str())
                .increment(1);
            return ScenarioReport::skipped(&scenario.name);
        }

        let span = info_span!("scenario", name = %scenario.name, component = %scenario.component);
        self.execute(scenario).instrument(span).await
    }

    async fn execute(&self, scenario: &ScenarioDefinition) -> ScenarioReport {
        let started = Instant::now();
        let mut ctx = ScenarioContext::new();

        let result = self.drive(scenario, &mut ctx).await;
        let phase = ctx.phase();

        let cleanup = teardown(&mut ctx.ledger, &self.http, self.settings.teardown_budget).await;
        ctx.advance(Phase::CleanedUp);
        if !cleanup.is_clean() {
            warn!(
                attempted = cleanup.entries.len(),
                deleted = cleanup.deleted(),
                "cleanup incomplete"
            );
        }

        let (verdict, error) = match result {
            Ok(()) => {
                info!("scenario passed");
                (Verdict::Passed, None)
            }
            Err(e) => {
                error!(%phase, error = %e, "scenario failed");
                (Verdict::Failed, Some(e.to_string()))
            }
        };

        let elapsed = started.elapsed();
        counter!(m::SCENARIOS_TOTAL, m::LABEL_VERDICT => verdict.as_str()).increment(1);
        histogram!(m::SCENARIO_DURATION_SECONDS).record(elapsed.as_secs_f64());

        ScenarioReport {
            name: scenario.name.clone(),
            verdict,
            phase,
            error,
            cleanup,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    async fn drive(
        &self,
        scenario: &ScenarioDefinition,
        ctx: &mut ScenarioContext,
    ) -> Result<(), RunnerError> {
        self.resolve_endpoints(scenario, ctx).await?;
        self.resolve_stub(scenario, ctx).await?;
        self.seed_dependent(&scenario.seed, ctx).await?;
        self.execute_action(&scenario.action, ctx).await?;
        assert_outcome(&scenario.then, ctx)
    }

    async fn resolve_endpoints(
        &self,
        scenario: &ScenarioDefinition,
        ctx: &mut ScenarioContext,
    ) -> Result<(), RunnerError> {
        let endpoints = self
            .endpoints
            .discover(&scenario.exposed_api_id, &scenario.dependent_api_id)
            .await;
        let target = format!(
            "component '{}' in namespace '{}'",
            scenario.component, self.settings.namespace
        );

        let exposed = endpoints.exposed.ok_or_else(|| RunnerError::Unresolved {
            identifier: scenario.exposed_api_id.clone(),
            target: target.clone(),
        })?;
        let dependent = endpoints.dependent.ok_or_else(|| RunnerError::Unresolved {
            identifier: scenario.dependent_api_id.clone(),
            target,
        })?;

        info!(exposed = %exposed, dependent = %dependent, "resolved api endpoints");
        ctx.exposed_url = Some(exposed);
        ctx.dependent_url = Some(dependent);
        ctx.advance(Phase::EndpointsResolved);
        Ok(())
    }

    async fn resolve_stub(
        &self,
        scenario: &ScenarioDefinition,
        ctx: &mut ScenarioContext,
    ) -> Result<(), RunnerError> {
        if self.settings.candidates.is_empty() {
            return Err(RunnerError::Configuration(format!(
                "No dependent stub mapping found for '{}'",
                self.settings.component_to_run
            )));
        }

        let dependent_url = ctx.dependent_url()?;
        let query = StubQuery {
            component_under_test: &self.settings.component_to_run,
            dependent_component: &scenario.stub.component,
            dependent_url,
            namespace: &self.settings.namespace,
        };
        let stub = self
            .matcher
            .resolve(&query, &self.settings.candidates, &self.settings.default_headers)
            .await
            .ok_or_else(|| RunnerError::Unresolved {
                identifier: scenario.stub.api.clone(),
                target: dependent_url.to_owned(),
            })?;

        ctx.stub = Some(stub);
        ctx.advance(Phase::StubResolved);
        Ok(())
    }

    async fn seed_dependent(
        &self,
        seed: &SeedStep,
        ctx: &mut ScenarioContext,
    ) -> Result<(), RunnerError> {
        let collection = join_url(ctx.dependent_url()?, &seed.resource);
        let headers = ctx.stub()?.headers.clone();
        let mut payload = self.payloads.load(&seed.payload).await?;

        if let Some(existing) = existing_identity(&payload) {
            let url = join_url(&collection, &existing.id);
            match self.http.send(ApiRequest::get(&url, &headers)).await {
                Ok(response) if response.status == 200 => {
                    info!(%url, "dependent resource already present, reusing");
                    ctx.dependent = Some(existing);
                    ctx.advance(Phase::StubSeeded);
                    return Ok(());
                }
                Ok(response) => {
                    debug!(%url, status = response.status, "dependent resource not found, creating")
                }
                Err(e) => debug!(%url, error = %e, "existence check failed, creating"),
            }
        }

        strip_identity(&mut payload);
        let response = self
            .http
            .send(ApiRequest::post(&collection, &headers, payload))
            .await?;
        if response.status != SUCCESS_STATUS {
            return Err(RunnerError::SeedFailed {
                resource: seed.resource.clone(),
                status: response.status,
            });
        }

        match response.text_field("id") {
            Some(id) => {
                ctx.ledger.track(&collection, &id, &headers);
                ctx.dependent = Some(ResourceRef {
                    id,
                    href: response.text_field("href"),
                });
            }
            None => warn!(%collection, "stub created resource without an id"),
        }

        if ctx.dependent.is_none() {
            return Err(RunnerError::Unresolved {
                identifier: format!("{} id", seed.resource),
                target: collection,
            });
        }
        ctx.advance(Phase::StubSeeded);
        Ok(())
    }

    async fn execute_action(
        &self,
        action: &ActionStep,
        ctx: &mut ScenarioContext,
    ) -> Result<(), RunnerError> {
        let expected: ExpectedOutcome = action.expect.parse()?;
        let collection = join_url(ctx.exposed_url()?, &action.resource);
        let mut payload = self.payloads.load(&action.payload).await?;

        if expected == ExpectedOutcome::Success {
            if let Some(dependent) = &ctx.dependent {
                inject_reference(&mut payload, &action.field_path, dependent)?;
                if let Err(e) = self.payloads.write_artifact(&action.payload, &payload).await {
                    warn!(error = %e, "failed to persist payload artifact");
                }
            }
        }

        let headers = &self.settings.default_headers;
        let response = self
            .http
            .send(ApiRequest::post(&collection, headers, payload))
            .await?;

        // 기대 결과와 무관하게 실제로 생성된 리소스는 정리 대상입니다.
        if response.status == SUCCESS_STATUS {
            match response.text_field("id") {
                Some(id) => ctx.ledger.track(&collection, &id, headers),
                None => warn!(%collection, "created resource has no id, cannot clean up"),
            }
        }

        info!(
            resource_type = %action.resource_type,
            status = response.status,
            "action executed"
        );
        ctx.last_response = Some(response);
        ctx.advance(Phase::ActionExecuted);
        Ok(())
    }
}

fn assert_outcome(then: &ThenStep, ctx: &mut ScenarioContext) -> Result<(), RunnerError> {
    let expected: ExpectedOutcome = then.expect.parse()?;
    let status = ctx
        .last_response
        .as_ref()
        .map(|response| response.status)
        .ok_or_else(|| RunnerError::Configuration("no response to assert".to_owned()))?;

    verify_outcome(&then.operation, expected, status)?;
    ctx.advance(Phase::Asserted);
    Ok(())
}

// id(문자열 또는 숫자)와 href가 모두 있으면 기존 리소스로 간주
fn existing_identity(payload: &Value) -> Option<ResourceRef> {
    let id = match payload.get("id")? {
        Value::String(id) if !id.is_empty() => id.clone(),
        Value::Number(id) => id.to_string(),
        _ => return None,
    };
    let href = payload.get("href")?.as_str().filter(|href| !href.is_empty())?;
    Some(ResourceRef {
        id,
        href: Some(href.to_owned()),
    })
}

fn inject_reference(
    payload: &mut Value,
    field_path: &str,
    dependent: &ResourceRef,
) -> Result<(), RunnerError> {
    set_path(
        payload,
        &format!("{field_path}.id"),
        Value::String(dependent.id.clone()),
    )?;
    if let Some(href) = &dependent.href {
        set_path(payload, &format!("{field_path}.href"), Value::String(href.clone()))?;
    }
    debug!(field_path, id = %dependent.id, "injected dependent reference");
    Ok(())
}
