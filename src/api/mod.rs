//! バックエンドAPI連携
//!
//! 全ネットワーク呼び出しを `Backend` トレイトの背後に置く。
//! 本番は `HttpBackend`（reqwest）、テストではスクリプト化したフェイクを差し込む。

mod http;
mod retry;

pub use http::HttpBackend;
pub use retry::{RetryPolicy, with_retry};

use crate::error::Result;
use async_trait::async_trait;
use smart_fridge_common::{
    AnalyzeRequest, DetectRequest, DetectedItem, PlanRequest, PlannedItem, PresignRequest,
    ResultBundle, UploadTarget,
};

#[async_trait]
pub trait Backend: Send + Sync {
    /// POST /api/presign
    async fn presign(&self, request: &PresignRequest) -> Result<UploadTarget>;

    /// PUT <uploadUrl>
    async fn put_object(&self, target: &UploadTarget, content_type: &str, bytes: &[u8]) -> Result<()>;

    /// POST /api/vision/detect
    async fn detect(&self, request: &DetectRequest) -> Result<Vec<DetectedItem>>;

    /// POST /api/plan
    async fn plan(&self, request: &PlanRequest) -> Result<Vec<PlannedItem>>;

    /// POST /api/analyze
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<ResultBundle>;

    /// GET /api/health
    async fn health(&self) -> Result<bool>;
}
