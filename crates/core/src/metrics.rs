//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다. 레코더가 설치되지 않은
//! 상태에서는 모든 호출이 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `odactk_`
//! - 영역: `scenario_`, `http_`, `cleanup_`, `stub_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//! use odactk_core::metrics as m;
//!
//! counter!(m::HTTP_REQUESTS_TOTAL, m::LABEL_METHOD => "POST").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 판정 레이블 키 (passed, failed, skipped)
pub const LABEL_VERDICT: &str = "verdict";

/// HTTP 메서드 레이블 키 (GET, POST, DELETE)
pub const LABEL_METHOD: &str = "method";

/// 결과 레이블 키
pub const LABEL_RESULT: &str = "result";

// ─── 시나리오 메트릭 ────────────────────────────────────────────────

/// 판정별 시나리오 수 (counter, label: verdict)
pub const SCENARIOS_TOTAL: &str = "odactk_scenarios_total";

/// 시나리오 1건 실행 시간 (histogram, 초)
pub const SCENARIO_DURATION_SECONDS: &str = "odactk_scenario_duration_seconds";

// ─── 클라이언트 메트릭 ──────────────────────────────────────────────

/// 전송한 HTTP 요청 수 (counter, label: method)
pub const HTTP_REQUESTS_TOTAL: &str = "odactk_http_requests_total";

/// 정리 단계 DELETE 결과 수 (counter, label: result)
pub const CLEANUP_DELETES_TOTAL: &str = "odactk_cleanup_deletes_total";

/// 스텁 해석 결과 수 (counter, label: result = matched | unmatched)
pub const STUB_RESOLUTIONS_TOTAL: &str = "odactk_stub_resolutions_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 시나리오 실행 시간 히스토그램 버킷 (초)
///
/// 100ms ~ 120s 범위 (원격 API 왕복 여러 번 포함)
pub const SCENARIO_DURATION_BUCKETS: [f64; 8] = [0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더가 없으면 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(SCENARIOS_TOTAL, "Scenarios executed, labelled by verdict");
    describe_histogram!(
        SCENARIO_DURATION_SECONDS,
        "Wall-clock time of a single scenario in seconds"
    );
    describe_counter!(
        HTTP_REQUESTS_TOTAL,
        "Outbound HTTP requests sent to exposed or stub APIs"
    );
    describe_counter!(
        CLEANUP_DELETES_TOTAL,
        "Teardown DELETE attempts, labelled by result"
    );
    describe_counter!(
        STUB_RESOLUTIONS_TOTAL,
        "Stub resolutions, labelled by matched or unmatched"
    );
}
