//! reqwest 实现的传输层
//!
//! 所有接口都是 `POST` + JSON，响应统一为 `{code, message, data}` 信封，
//! `code != 0` 视为失败。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use hcm_console_core::error::{CoreError, CoreResult};
use hcm_console_core::traits::ResourceTransport;
use hcm_console_core::types::{ListRequest, ListResponse, SubmitTarget};
use hcm_console_core::utils::{payload_for_log, truncate_for_log};

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Response envelope of the cloud API.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

/// `ResourceTransport` over HTTP.
pub struct HttpTransport {
    client: Client,
    api_prefix: String,
}

impl HttpTransport {
    /// # Errors
    /// Returns `CoreError::InvalidConfig` if the HTTP client cannot be built.
    pub fn new(api_prefix: impl Into<String>) -> CoreResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CoreError::InvalidConfig(format!("failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, api_prefix))
    }

    pub fn with_client(client: Client, api_prefix: impl Into<String>) -> Self {
        Self {
            client,
            api_prefix: api_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/cloud/{path}", self.api_prefix)
    }

    async fn execute<T>(&self, request: RequestBuilder, url: &str) -> CoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        log::debug!("[http] POST {url}");
        let response = request.send().await.map_err(|e| CoreError::Transport {
            status: 0,
            message: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| CoreError::Transport {
            status: status.as_u16(),
            message: format!("failed to read response body: {e}"),
        })?;
        log::debug!(
            "[http] {} {url}: {}",
            status.as_u16(),
            truncate_for_log(&text)
        );

        let envelope: Option<Envelope<T>> = serde_json::from_str(&text).ok();
        if !status.is_success() {
            let message = envelope
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| truncate_for_log(&text));
            return Err(CoreError::Transport {
                status: status.as_u16(),
                message,
            });
        }

        let envelope = envelope.ok_or_else(|| {
            CoreError::Serialization(format!("unexpected response from {url}"))
        })?;
        if envelope.code != 0 {
            return Err(CoreError::Transport {
                status: status.as_u16(),
                message: envelope.message,
            });
        }
        Ok(envelope.data)
    }

    async fn post<T>(&self, path: &str, body: &Value) -> CoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request = self.client.post(&url).json(body);
        self.execute(request, &url).await
    }
}

/// Total of a count-mode list response. A missing count is an error, never 0.
fn count_of(collection: &str, data: Option<ListResponse>) -> CoreResult<u64> {
    data.and_then(|d| d.count).ok_or_else(|| {
        CoreError::Serialization(format!("count missing from {collection} list response"))
    })
}

#[async_trait]
impl ResourceTransport for HttpTransport {
    async fn fetch_list(
        &self,
        collection: &str,
        request: &ListRequest,
    ) -> CoreResult<ListResponse> {
        let body = serde_json::to_value(request)?;
        let data: Option<ListResponse> = self.post(&format!("{collection}/list"), &body).await?;
        Ok(data.unwrap_or_default())
    }

    async fn fetch_count(&self, collection: &str, request: &ListRequest) -> CoreResult<u64> {
        let body = serde_json::to_value(request)?;
        let data: Option<ListResponse> = self.post(&format!("{collection}/list"), &body).await?;
        count_of(collection, data)
    }

    async fn submit(&self, target: &SubmitTarget, payload: &Value) -> CoreResult<()> {
        log::info!(
            "[http] submit {} {}: {}",
            target.vendor,
            target.kind,
            payload_for_log(payload)
        );
        let path = format!(
            "vendors/{}/applications/types/{}",
            target.vendor, target.kind
        );
        self.post::<Value>(&path, payload).await?;
        Ok(())
    }

    async fn attach_disk(&self, payload: &Value) -> CoreResult<()> {
        self.post::<Value>("disks/attach", payload).await?;
        Ok(())
    }
}
