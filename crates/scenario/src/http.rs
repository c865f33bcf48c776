//! HTTP abstraction for testability.
//!
//! The [`HttpApi`] trait sends one request and returns the observed status and
//! body. Any HTTP status, including 4xx/5xx, is a successful observation; only
//! transport failures (no response at all) are errors.
//!
//! [`ReqwestHttpClient`] is the production implementation. Certificate
//! validation is disabled when `accept_invalid_certs` is set, which is the
//! trust model of the test environments this tool targets.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use metrics::counter;
use odactk_core::config::HttpConfig;
use odactk_core::metrics as m;
use odactk_core::types::Headers;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::RunnerError;

/// 지원하는 HTTP 메서드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 요청 한 건
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>, headers: &Headers) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: headers.clone(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, headers: &Headers, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: headers.clone(),
            body: Some(body),
        }
    }

    pub fn delete(url: impl Into<String>, headers: &Headers) -> Self {
        Self {
            method: Method::Delete,
            url: url.into(),
            headers: headers.clone(),
            body: None,
        }
    }
}

/// 관측된 응답
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    /// JSON 본문. JSON이 아니면 문자열, 비어 있으면 null입니다.
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// 본문 최상위 필드를 문자열로 읽습니다. 숫자 식별자도 문자열로 변환합니다.
    pub fn text_field(&self, key: &str) -> Option<String> {
        match self.body.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Trait abstracting outbound HTTP.
pub trait HttpApi: Send + Sync + 'static {
    /// Sends the request and returns whatever status the server answered.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::Network` only when no response was received.
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, RunnerError>> + Send;
}

/// `reqwest` 기반 프로덕션 클라이언트
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// `[http]` 설정으로 클라이언트를 만듭니다.
    pub fn new(config: &HttpConfig) -> Result<Self, RunnerError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| RunnerError::Configuration(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpApi for ReqwestHttpClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, RunnerError> {
        let ApiRequest {
            method,
            url,
            headers,
            body,
        } = request;

        debug!(%method, %url, ?headers, payload = ?body, "sending api request");
        counter!(m::HTTP_REQUESTS_TOTAL, m::LABEL_METHOD => method.as_str()).increment(1);

        let mut builder = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let network_error = |reason: String| RunnerError::Network {
            method: method.to_string(),
            url: url.clone(),
            reason,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| network_error(e.to_string()))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| network_error(format!("reading body: {e}")))?;
        let body = parse_body(&bytes);

        if (200..300).contains(&status) {
            info!(%method, %url, status, "api response");
        } else {
            warn!(%method, %url, status, body = %body, "api responded with non-success status");
        }

        Ok(ApiResponse { status, body })
    }
}

/// 응답 본문을 JSON 값으로 변환합니다.
pub fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// base URL 뒤에 경로 조각을 붙입니다. 슬래시는 하나만 남깁니다.
pub fn join_url(base: &str, segment: &str) -> String {
    let segment = segment.trim_start_matches('/');
    if base.ends_with('/') {
        format!("{base}{segment}")
    } else {
        format!("{base}/{segment}")
    }
}

/// 테스트용 Mock HTTP 클라이언트
///
/// `(method, url)`별로 응답을 지정하고, 보낸 요청을 순서대로 기록합니다.
/// 지정되지 않은 요청은 404를 돌려줍니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockHttpApi {
    routes: std::collections::HashMap<(Method, String), Result<ApiResponse, String>>,
    delay: Option<Duration>,
    requests: std::sync::Mutex<Vec<ApiRequest>>,
}

#[cfg(test)]
impl MockHttpApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, method: Method, url: &str, status: u16, body: Value) -> Self {
        self.routes.insert(
            (method, url.to_owned()),
            Ok(ApiResponse::new(status, body)),
        );
        self
    }

    pub fn with_network_error(mut self, method: Method, url: &str) -> Self {
        self.routes
            .insert((method, url.to_owned()), Err("connection refused".to_owned()));
        self
    }

    /// 모든 응답을 지정한 시간만큼 늦춥니다.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn count(&self, method: Method, url: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }
}

#[cfg(test)]
impl HttpApi for MockHttpApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, RunnerError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let key = (request.method, request.url.clone());
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match self.routes.get(&key) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(reason)) => Err(RunnerError::Network {
                method: request.method.to_string(),
                url: request.url,
                reason: reason.clone(),
            }),
            None => Ok(ApiResponse::new(404, Value::Null)),
        }
    }
}
