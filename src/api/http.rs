//! reqwest による `Backend` 実装

use super::{Backend, RetryPolicy, with_retry};
use crate::config::Config;
use crate::error::{FridgeError, Result};
use async_trait::async_trait;
use serde::Serialize;
use smart_fridge_common::{
    AnalyzeRequest, DetectRequest, DetectedItem, PlanRequest, PlannedItem, PresignRequest,
    ResultBundle, UploadTarget, parse_analyze_response, parse_detect_response,
    parse_plan_response, parse_upload_target,
};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("smart-fridge/", env!("CARGO_PKG_VERSION"));

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>, retry: RetryPolicy) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base_url, config.timeout(), config.retry_policy())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 2xx 以外は `FridgeError::Status` として本文ごと返す
    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FridgeError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<String> {
        let url = self.url(path);
        let url = url.as_str();
        with_retry(&self.retry, path, move || async move {
            debug!(url, "POST");
            let response = self.client.post(url).json(body).send().await?;
            Self::read_body(response).await
        })
        .await
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn presign(&self, request: &PresignRequest) -> Result<UploadTarget> {
        let body = self.post_json("/api/presign", request).await?;
        Ok(parse_upload_target(&body)?)
    }

    async fn put_object(&self, target: &UploadTarget, content_type: &str, bytes: &[u8]) -> Result<()> {
        with_retry(&self.retry, "put_object", move || async move {
            debug!(key = %target.key, size = bytes.len(), "PUT upload");
            let response = self
                .client
                .put(&target.upload_url)
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(bytes.to_vec())
                .send()
                .await?;
            Self::read_body(response).await.map(|_| ())
        })
        .await
    }

    async fn detect(&self, request: &DetectRequest) -> Result<Vec<DetectedItem>> {
        let body = self.post_json("/api/vision/detect", request).await?;
        Ok(parse_detect_response(&body)?)
    }

    async fn plan(&self, request: &PlanRequest) -> Result<Vec<PlannedItem>> {
        let body = self.post_json("/api/plan", request).await?;
        Ok(parse_plan_response(&body)?)
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<ResultBundle> {
        let body = self.post_json("/api/analyze", request).await?;
        Ok(parse_analyze_response(&body)?)
    }

    async fn health(&self) -> Result<bool> {
        let response = self.client.get(self.url("/api/health")).send().await?;
        Ok(response.status().is_success())
    }
}
