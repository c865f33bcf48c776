#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use odactk_scenario::payload::set_path;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 초기 페이로드 JSON 텍스트
    payload: String,
    /// 점 표기 경로
    field_path: String,
    value: String,
}

fuzz_target!(|input: FuzzInput| {
    let mut payload = serde_json::from_str(&input.payload).unwrap_or(serde_json::Value::Null);
    if set_path(
        &mut payload,
        &input.field_path,
        serde_json::Value::String(input.value.clone()),
    )
    .is_ok()
    {
        // 숫자 조각은 표기가 여러 가지라 문자 경로만 확인
        if !input
            .field_path
            .split('.')
            .all(|segment| segment.chars().all(|c| c.is_ascii_alphabetic()))
        {
            return;
        }
        let pointer: String = input
            .field_path
            .split('.')
            .map(|segment| format!("/{segment}"))
            .collect();
        assert_eq!(
            payload.pointer(&pointer),
            Some(&serde_json::Value::String(input.value))
        );
    }
});
