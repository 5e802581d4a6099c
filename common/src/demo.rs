//! デモモード用の固定データ
//!
//! ネットワークを使わずにワークフロー全体を再現するための決定的なフィクスチャ。

use crate::types::{CarbonImpact, DetectedItem, InventoryItem, PlannedItem, Recipe, ResultBundle, SwapTip};

/// デモ解析の合計カーボンインパクト
pub const DEMO_TOTAL_CARBON_IMPACT: f64 = 2.3;

/// デモ解析の所要時間（秒）
pub const DEMO_ANALYSIS_TIME: f64 = 8.5;

/// デモ用アップロード先URLに付与するクエリ
pub const DEMO_URL_MARKER: &str = "demo=true";

/// 検出APIのデモ応答
pub fn demo_detections() -> Vec<DetectedItem> {
    [("egg", 4, 0.98), ("spinach", 1, 0.94), ("tortilla", 2, 0.92)]
        .into_iter()
        .map(|(name, count, confidence)| DetectedItem {
            name: name.to_string(),
            count,
            confidence,
        })
        .collect()
}

/// 品目名 → (カテゴリ, インパクト)
const DEMO_CARBON_TABLE: &[(&str, &str, CarbonImpact)] = &[
    ("egg", "Dairy & Eggs", CarbonImpact::Medium),
    ("spinach", "Vegetables", CarbonImpact::Low),
    ("tortilla", "Grains", CarbonImpact::Low),
    ("milk", "Dairy", CarbonImpact::Medium),
    ("ground beef", "Meat", CarbonImpact::High),
    ("tomato", "Vegetables", CarbonImpact::Low),
];

/// 計画APIのデモ応答
///
/// 表にある品目名のみ返す。表にない品目は応答に含まれず、マージ時に現状維持となる。
pub fn demo_plan(names: &[String]) -> Vec<PlannedItem> {
    names
        .iter()
        .filter_map(|name| {
            let lower = name.to_lowercase();
            DEMO_CARBON_TABLE
                .iter()
                .find(|(key, _, _)| *key == lower)
                .map(|(_, category, impact)| PlannedItem {
                    name: name.clone(),
                    category: Some(category.to_string()),
                    impact: Some(*impact),
                })
        })
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// 解析APIのデモ応答
///
/// レシピ2件・代替提案1件・合計 2.3 で固定。在庫スナップショットには送信した在庫をそのまま使う。
pub fn demo_bundle(inventory: &[InventoryItem]) -> ResultBundle {
    ResultBundle {
        inventory: inventory.to_vec(),
        recipes: vec![
            Recipe {
                id: "1".to_string(),
                title: "Beef Bolognese".to_string(),
                description: "Classic Italian pasta with ground beef and tomatoes".to_string(),
                ingredients: strings(&["Ground beef", "Tomatoes", "Onion", "Garlic", "Pasta"]),
                instructions: strings(&[
                    "Brown the ground beef in a large pan",
                    "Add diced onions and garlic",
                    "Add tomatoes and simmer for 20 minutes",
                    "Serve over cooked pasta",
                ]),
                carbon_impact: CarbonImpact::High,
                prep_time: 30,
                servings: 4,
                image_url: Some("/api/placeholder/400/300".to_string()),
            },
            Recipe {
                id: "2".to_string(),
                title: "Tomato Basil Salad".to_string(),
                description: "Fresh and light salad with tomatoes and basil".to_string(),
                ingredients: strings(&["Tomatoes", "Fresh basil", "Olive oil", "Salt", "Pepper"]),
                instructions: strings(&[
                    "Slice tomatoes",
                    "Chop fresh basil",
                    "Drizzle with olive oil",
                    "Season with salt and pepper",
                ]),
                carbon_impact: CarbonImpact::Low,
                prep_time: 10,
                servings: 2,
                image_url: Some("/api/placeholder/400/300".to_string()),
            },
        ],
        swap_tips: vec![SwapTip {
            id: "1".to_string(),
            original: "Ground Beef".to_string(),
            suggestion: "Lentils".to_string(),
            reason: "Plant-based protein with 90% less carbon footprint".to_string(),
            carbon_savings: 85.0,
        }],
        total_carbon_impact: DEMO_TOTAL_CARBON_IMPACT,
        analysis_time: DEMO_ANALYSIS_TIME,
    }
}
