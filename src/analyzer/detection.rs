use crate::api::Backend;
use crate::demo::{DEMO_DETECT_DELAY, DemoMode, simulate_latency};
use crate::error::{FridgeError, Result};
use chrono::Utc;
use smart_fridge_common::demo::demo_detections;
use smart_fridge_common::{DetectRequest, InventoryItem, items_from_detections};
use std::sync::Arc;
use tracing::info;

/// 画像検出アダプタ
///
/// 有効なストレージキー全件を1回のバッチ呼び出しで送り、仮の在庫品目を生成する。
pub struct VisionDetector {
    backend: Arc<dyn Backend>,
    demo: DemoMode,
    bucket: String,
}

impl VisionDetector {
    pub fn new(backend: Arc<dyn Backend>, demo: DemoMode, bucket: impl Into<String>) -> Self {
        Self {
            backend,
            demo,
            bucket: bucket.into(),
        }
    }

    pub async fn detect(&self, keys: &[String]) -> Result<Vec<InventoryItem>> {
        if keys.is_empty() {
            return Err(FridgeError::Validation("No images uploaded successfully".into()));
        }

        let detections = if self.demo.is_enabled() {
            simulate_latency(DEMO_DETECT_DELAY).await;
            demo_detections()
        } else {
            let request = DetectRequest {
                keys: keys.to_vec(),
                bucket: self.bucket.clone(),
            };
            self.backend
                .detect(&request)
                .await
                .map_err(|e| FridgeError::Detection(e.to_string()))?
        };

        let items = items_from_detections(&detections, Utc::now().timestamp_millis());
        info!(keys = keys.len(), items = items.len(), "Detection finished");
        Ok(items)
    }
}
