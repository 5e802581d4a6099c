//! 型定義
//!
//! CLIとライブラリで共有される型:
//! - ドメイン型: InventoryItem / Recipe / SwapTip / ResultBundle
//! - ワイヤ型: 各APIエンドポイントのリクエスト・レスポンス

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ユーザーが追加した品目の信頼度
pub const USER_CONFIDENCE: f64 = 1.0;

/// カーボンインパクト区分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarbonImpact {
    Low,
    #[default]
    Medium,
    High,
}

impl CarbonImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarbonImpact::Low => "low",
            CarbonImpact::Medium => "medium",
            CarbonImpact::High => "high",
        }
    }

    /// 計画APIのタグを変換（"unknown" 等は None）
    pub fn from_tag(tag: &str) -> Option<Self> {
        tag.parse().ok()
    }
}

impl FromStr for CarbonImpact {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Ok(CarbonImpact::Low),
            "medium" | "med" | "m" => Ok(CarbonImpact::Medium),
            "high" | "h" => Ok(CarbonImpact::High),
            _ => Err(format!("Unknown impact: {}. Use low, medium, or high", s)),
        }
    }
}

impl fmt::Display for CarbonImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 在庫品目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub category: String,
    /// 数量（自由記述: "6 pieces", "1 lb" など）
    pub quantity: String,
    pub carbon_impact: CarbonImpact,
    /// 0.0〜1.0。ユーザー追加は 1.0、検出品目は 1.0 未満
    pub confidence: f64,
}

impl InventoryItem {
    pub fn is_user_authored(&self) -> bool {
        self.confidence >= USER_CONFIDENCE
    }
}

/// レシピ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub carbon_impact: CarbonImpact,
    /// 調理時間（分）
    pub prep_time: u32,
    pub servings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// 代替食材の提案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTip {
    pub id: String,
    pub original: String,
    pub suggestion: String,
    #[serde(default)]
    pub reason: String,
    /// 削減率（%）
    pub carbon_savings: f64,
}

/// 解析結果一式
///
/// 解析1回につき1つ生成され、再解析時は丸ごと置き換える。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBundle {
    pub inventory: Vec<InventoryItem>,
    pub recipes: Vec<Recipe>,
    pub swap_tips: Vec<SwapTip>,
    pub total_carbon_impact: f64,
    /// 解析所要時間（秒）
    pub analysis_time: f64,
}

// =============================================
// ワイヤ型
// =============================================

/// POST /api/presign
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub file_name: String,
    pub file_type: String,
}

/// 一回限りのアップロード先
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    pub upload_url: String,
    pub key: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// POST /api/vision/detect
#[derive(Debug, Clone, Serialize)]
pub struct DetectRequest {
    pub keys: Vec<String>,
    pub bucket: String,
}

/// 検出結果1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedItem {
    pub name: String,
    pub count: u32,
    pub confidence: f64,
}

/// POST /api/plan
#[derive(Debug, Clone, Serialize)]
pub struct PlanRequest {
    pub items: Vec<String>,
    pub people: u32,
    pub flags: Vec<String>,
    pub demo: bool,
}

/// 計画APIが返す品目ごとの正規値
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedItem {
    pub name: String,
    pub category: Option<String>,
    /// "unknown" タグの場合は None
    pub impact: Option<CarbonImpact>,
}

/// POST /api/analyze
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub image_keys: Vec<String>,
    pub people_count: u32,
    pub inventory: Vec<InventoryItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carbon_impact_from_tag() {
        assert_eq!(CarbonImpact::from_tag("low"), Some(CarbonImpact::Low));
        assert_eq!(CarbonImpact::from_tag("HIGH"), Some(CarbonImpact::High));
        assert_eq!(CarbonImpact::from_tag(" medium "), Some(CarbonImpact::Medium));
        assert_eq!(CarbonImpact::from_tag("unknown"), None);
    }

    #[test]
    fn test_inventory_item_camel_case() {
        let item = InventoryItem {
            id: "item-1".to_string(),
            name: "Milk".to_string(),
            category: "Dairy".to_string(),
            quantity: "1 gallon".to_string(),
            carbon_impact: CarbonImpact::Medium,
            confidence: 0.95,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["carbonImpact"], "medium");
        assert_eq!(json["confidence"], 0.95);
        assert!(!item.is_user_authored());
    }

    #[test]
    fn test_analyze_request_field_names() {
        let request = AnalyzeRequest {
            image_keys: vec!["uploads/a.jpg".to_string()],
            people_count: 3,
            inventory: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["imageKeys"][0], "uploads/a.jpg");
        assert_eq!(json["peopleCount"], 3);
        assert!(json["inventory"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_recipe_image_url_optional() {
        let json = r#"{"id":"1","title":"Salad","carbonImpact":"low","prepTime":10,"servings":2}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(recipe.image_url.is_none());
        assert!(recipe.ingredients.is_empty());
    }
}
