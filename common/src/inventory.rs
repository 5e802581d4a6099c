//! 在庫ロジック（ライブラリ/CLI共通）
//!
//! 検出結果からの在庫品目生成、ユーザー入力の検証、
//! カーボン情報のマージ処理

use crate::error::{Error, Result};
use crate::types::{CarbonImpact, DetectedItem, InventoryItem, PlannedItem, USER_CONFIDENCE};
use std::collections::HashMap;

/// 検出直後の仮カテゴリ
pub const PLACEHOLDER_CATEGORY: &str = "Unknown";

/// 検出直後の仮インパクト
pub const PLACEHOLDER_IMPACT: CarbonImpact = CarbonImpact::Medium;

/// 検出品目の信頼度上限（1.0 はユーザー追加品目専用）
pub const DETECTED_CONFIDENCE_CEILING: f64 = 0.99;

/// ユーザーが入力した品目（追加・編集用）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub category: String,
    pub quantity: String,
    pub carbon_impact: CarbonImpact,
}

impl ItemDraft {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: impl Into<String>,
        carbon_impact: CarbonImpact,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            quantity: quantity.into(),
            carbon_impact,
        }
    }

    /// 必須項目（名前・カテゴリ・数量）を検証し、前後の空白を除去して返す
    pub fn validated(&self) -> Result<ItemDraft> {
        let name = self.name.trim();
        let category = self.category.trim();
        let quantity = self.quantity.trim();
        if name.is_empty() || category.is_empty() || quantity.is_empty() {
            return Err(Error::Validation(
                "Please fill in all required fields".to_string(),
            ));
        }
        Ok(ItemDraft::new(name, category, quantity, self.carbon_impact))
    }
}

/// マージ結果
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub items: Vec<InventoryItem>,
    pub matched: usize,
    /// 計画APIに該当がなかった品目名
    pub unmatched: Vec<String>,
}

/// 数量表記を生成
pub fn format_quantity(count: u32) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{} items", count)
    }
}

/// ID用にラベルを正規化（小文字・英数字以外はハイフン）
fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "item".to_string()
    } else {
        trimmed.to_string()
    }
}

/// 検出結果から在庫品目を生成
///
/// IDは ラベル + 時刻 + 位置 で構成するため、同じラベルが複数あっても重複しない。
/// カテゴリとインパクトは仮の値で、後段のカーボン情報マージで上書きされる。
pub fn items_from_detections(detections: &[DetectedItem], timestamp_ms: i64) -> Vec<InventoryItem> {
    detections
        .iter()
        .enumerate()
        .map(|(index, detected)| InventoryItem {
            id: format!("{}-{}-{}", slug(&detected.name), timestamp_ms, index),
            name: detected.name.clone(),
            category: PLACEHOLDER_CATEGORY.to_string(),
            quantity: format_quantity(detected.count),
            carbon_impact: PLACEHOLDER_IMPACT,
            confidence: detected.confidence.clamp(0.0, DETECTED_CONFIDENCE_CEILING),
        })
        .collect()
}

/// ユーザー追加品目を生成（信頼度は常に 1.0）
pub fn user_item(id: String, draft: &ItemDraft) -> Result<InventoryItem> {
    let draft = draft.validated()?;
    Ok(InventoryItem {
        id,
        name: draft.name,
        category: draft.category,
        quantity: draft.quantity,
        carbon_impact: draft.carbon_impact,
        confidence: USER_CONFIDENCE,
    })
}

/// 既存品目に編集内容を適用（ID・信頼度は維持）
pub fn apply_edit(item: &InventoryItem, draft: &ItemDraft) -> Result<InventoryItem> {
    let draft = draft.validated()?;
    Ok(InventoryItem {
        id: item.id.clone(),
        name: draft.name,
        category: draft.category,
        quantity: draft.quantity,
        carbon_impact: draft.carbon_impact,
        confidence: item.confidence,
    })
}

/// カーボン情報を在庫にマージ
///
/// 品目名の大文字小文字を無視した完全一致のみで照合する。
/// 一致した品目はカテゴリとインパクトを置き換え、一致しない品目は現状維持。
/// 品目の追加・削除は行わない。
pub fn merge_carbon(inventory: &[InventoryItem], planned: &[PlannedItem]) -> MergeOutcome {
    let mut by_name: HashMap<String, &PlannedItem> = HashMap::new();
    for p in planned {
        by_name.entry(p.name.to_lowercase()).or_insert(p);
    }

    let mut outcome = MergeOutcome::default();
    for item in inventory {
        match by_name.get(&item.name.to_lowercase()) {
            Some(p) => {
                outcome.matched += 1;
                outcome.items.push(InventoryItem {
                    category: p.category.clone().unwrap_or_else(|| item.category.clone()),
                    carbon_impact: p.impact.unwrap_or(item.carbon_impact),
                    ..item.clone()
                });
            }
            None => {
                outcome.unmatched.push(item.name.clone());
                outcome.items.push(item.clone());
            }
        }
    }
    outcome
}
