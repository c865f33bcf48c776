//! `[general]` 설정으로 tracing 구독자를 설치합니다.
//!
//! 진단 로그는 항상 stderr로 보냅니다. stdout에는 `--output`으로 고른
//! 명령 결과만 남습니다.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use odactk_core::config::GeneralConfig;

/// `general.log_format` 값
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    /// 줄 단위 JSON (CI 수집용)
    Json,
    /// 터미널용
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(anyhow::anyhow!(
                "unknown log format '{other}', expected 'json' or 'pretty'"
            )),
        }
    }
}

/// 전역 구독자를 한 번 설치합니다.
///
/// `RUST_LOG`가 있으면 `log_level`보다 우선합니다. 형식이 잘못되면
/// 아무것도 설치하지 않고 에러를 돌려줍니다.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let format = LogFormat::parse(&config.log_format)?;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install {format:?} log subscriber: {e}"))
}
