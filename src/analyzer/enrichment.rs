use crate::api::Backend;
use crate::demo::{DEMO_PLAN_DELAY, DemoMode, simulate_latency};
use crate::error::{FridgeError, Result};
use smart_fridge_common::demo::demo_plan;
use smart_fridge_common::{InventoryItem, MergeOutcome, PlanRequest, merge_carbon};
use std::sync::Arc;
use tracing::{debug, info};

/// カーボン情報アダプタ
///
/// 在庫の品目名と世帯人数を1回で送り、返ってきたカテゴリ・インパクトを名前でマージする。
/// 品目の増減は起きない。
pub struct CarbonPlanner {
    backend: Arc<dyn Backend>,
    demo: DemoMode,
}

impl CarbonPlanner {
    pub fn new(backend: Arc<dyn Backend>, demo: DemoMode) -> Self {
        Self { backend, demo }
    }

    pub async fn enrich(&self, inventory: &[InventoryItem], people: u32) -> Result<MergeOutcome> {
        if inventory.is_empty() {
            debug!("Empty inventory, skipping carbon planning");
            return Ok(MergeOutcome::default());
        }

        let names: Vec<String> = inventory.iter().map(|i| i.name.clone()).collect();
        let demo = self.demo.is_enabled();

        let planned = if demo {
            simulate_latency(DEMO_PLAN_DELAY).await;
            demo_plan(&names)
        } else {
            let request = PlanRequest {
                items: names,
                people,
                flags: Vec::new(),
                demo: false,
            };
            self.backend
                .plan(&request)
                .await
                .map_err(|e| FridgeError::Planning(e.to_string()))?
        };

        let outcome = merge_carbon(inventory, &planned);
        info!(
            items = outcome.items.len(),
            matched = outcome.matched,
            unmatched = outcome.unmatched.len(),
            "Carbon planning merged"
        );
        Ok(outcome)
    }
}
