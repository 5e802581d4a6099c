use crate::api::Backend;
use crate::demo::{DEMO_ANALYZE_DELAY, DemoMode, simulate_latency};
use crate::error::{FridgeError, Result};
use smart_fridge_common::demo::demo_bundle;
use smart_fridge_common::{AnalyzeRequest, InventoryItem, ResultBundle};
use std::sync::Arc;
use tracing::info;

/// 最終解析アダプタ
///
/// 失敗時は部分的な結果を返さず `FridgeError::Analysis` とする。
pub struct Aggregator {
    backend: Arc<dyn Backend>,
    demo: DemoMode,
}

impl Aggregator {
    pub fn new(backend: Arc<dyn Backend>, demo: DemoMode) -> Self {
        Self { backend, demo }
    }

    pub async fn analyze(
        &self,
        image_keys: &[String],
        people: u32,
        inventory: &[InventoryItem],
    ) -> Result<ResultBundle> {
        let bundle = if self.demo.is_enabled() {
            simulate_latency(DEMO_ANALYZE_DELAY).await;
            demo_bundle(inventory)
        } else {
            if image_keys.is_empty() {
                return Err(FridgeError::Validation("No images uploaded successfully".into()));
            }
            let request = AnalyzeRequest {
                image_keys: image_keys.to_vec(),
                people_count: people,
                inventory: inventory.to_vec(),
            };
            self.backend
                .analyze(&request)
                .await
                .map_err(|e| FridgeError::Analysis(e.to_string()))?
        };

        info!(
            recipes = bundle.recipes.len(),
            swap_tips = bundle.swap_tips.len(),
            total = bundle.total_carbon_impact,
            "Analysis finished"
        );
        Ok(bundle)
    }
}
