//! 페이로드 저장소: JSON 픽스처 로딩과 변환
//!
//! 원본 픽스처는 읽기 전용으로 취급합니다. 주입이 끝난 페이로드는
//! `artifacts_dir`이 설정된 경우에만 별도 파일로 남깁니다.

use std::path::{Path, PathBuf};

use odactk_core::config::RunConfig;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::RunnerError;

/// 페이로드 파일 최대 크기
const MAX_PAYLOAD_FILE_SIZE: u64 = 5 * 1024 * 1024; // 5MB

/// 배열 인덱스 경로 조각의 상한
const MAX_ARRAY_INDEX: usize = 1024;

/// 페이로드 디렉토리와 산출물 디렉토리
#[derive(Debug, Clone)]
pub struct PayloadStore {
    payloads_dir: PathBuf,
    artifacts_dir: Option<PathBuf>,
}

impl PayloadStore {
    pub fn new(payloads_dir: impl Into<PathBuf>, artifacts_dir: Option<PathBuf>) -> Self {
        Self {
            payloads_dir: payloads_dir.into(),
            artifacts_dir,
        }
    }

    /// `[run]` 섹션에서 저장소를 만듭니다. 빈 `artifacts_dir`은 비활성입니다.
    pub fn from_config(config: &RunConfig) -> Self {
        let artifacts_dir = if config.artifacts_dir.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&config.artifacts_dir))
        };
        Self::new(&config.payloads_dir, artifacts_dir)
    }

    pub fn payloads_dir(&self) -> &Path {
        &self.payloads_dir
    }

    /// 이름으로 페이로드를 읽어 JSON 값으로 반환합니다.
    pub async fn load(&self, name: &str) -> Result<Value, RunnerError> {
        validate_name(name)?;
        let path = self.payloads_dir.join(name);
        let payload_error = |reason: String| RunnerError::Payload {
            name: name.to_owned(),
            reason,
        };

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| payload_error(format!("{}: {e}", path.display())))?;
        if metadata.len() > MAX_PAYLOAD_FILE_SIZE {
            return Err(payload_error(format!(
                "file too large: {} bytes (max: {MAX_PAYLOAD_FILE_SIZE})",
                metadata.len()
            )));
        }

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| payload_error(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text).map_err(|e| payload_error(format!("invalid json: {e}")))
    }

    /// 주입된 페이로드를 산출물 디렉토리에 기록합니다.
    ///
    /// 산출물 디렉토리가 없으면 아무것도 쓰지 않고 `None`을 반환합니다.
    pub async fn write_artifact(
        &self,
        name: &str,
        payload: &Value,
    ) -> Result<Option<PathBuf>, RunnerError> {
        let Some(dir) = &self.artifacts_dir else {
            return Ok(None);
        };
        validate_name(name)?;
        let payload_error = |reason: String| RunnerError::Payload {
            name: name.to_owned(),
            reason,
        };

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| payload_error(format!("{}: {e}", dir.display())))?;
        let path = dir.join(name);
        let text = serde_json::to_string_pretty(payload)
            .map_err(|e| payload_error(format!("serialize: {e}")))?;
        tokio::fs::write(&path, text)
            .await
            .map_err(|e| payload_error(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), "wrote payload artifact");
        Ok(Some(path))
    }
}

// 디렉토리 밖을 가리키는 이름은 거부합니다.
fn validate_name(name: &str) -> Result<(), RunnerError> {
    let escapes = name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name == "."
        || name == "..";
    if escapes {
        return Err(RunnerError::Payload {
            name: name.to_owned(),
            reason: "payload name must be a plain file name".to_owned(),
        });
    }
    Ok(())
}

/// 최상위 `id`/`href` 필드를 제거합니다.
pub fn strip_identity(payload: &mut Value) {
    if let Some(object) = payload.as_object_mut() {
        object.remove("id");
        object.remove("href");
    }
}

/// 점 표기 경로(`a.b.0.c`)의 필드를 설정합니다.
///
/// 중간 객체가 없거나 스칼라면 새로 만들고, 배열은 숫자 조각으로 인덱싱합니다.
/// 다음 조각이 숫자면 새 중간 값은 배열입니다.
pub fn set_path(target: &mut Value, path: &str, value: Value) -> Result<(), RunnerError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(RunnerError::Configuration(format!(
            "invalid field path '{path}'"
        )));
    }

    let mut value = value;
    let mut current = target;
    for (i, segment) in segments.iter().enumerate() {
        let slot = child_slot(current, segment, path)?;
        match segments.get(i + 1) {
            None => {
                *slot = std::mem::take(&mut value);
            }
            Some(next) => {
                if !slot.is_object() && !slot.is_array() {
                    *slot = container_for(next);
                }
            }
        }
        current = slot;
    }
    Ok(())
}

fn container_for(next_segment: &str) -> Value {
    if next_segment.parse::<usize>().is_ok() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn child_slot<'v>(
    current: &'v mut Value,
    segment: &str,
    path: &str,
) -> Result<&'v mut Value, RunnerError> {
    match current {
        Value::Array(items) => {
            let index = segment
                .parse::<usize>()
                .ok()
                .filter(|index| *index <= MAX_ARRAY_INDEX)
                .ok_or_else(|| {
                    RunnerError::Configuration(format!(
                        "field path '{path}': '{segment}' does not index a list"
                    ))
                })?;
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            Ok(&mut items[index])
        }
        Value::Object(object) => Ok(object.entry(segment.to_owned()).or_insert(Value::Null)),
        other => {
            *other = Value::Object(Map::new());
            other.as_object_mut().map_or_else(
                || {
                    Err(RunnerError::Configuration(format!(
                        "field path '{path}' is not addressable"
                    )))
                },
                |object| Ok(object.entry(segment.to_owned()).or_insert(Value::Null)),
            )
        }
    }
}
