//! APIレスポンスパーサー
//!
//! 各エンドポイントのレスポンス本文をパースし、形状と値域を検証する。
//! 呼び出し側でフィールドの存在を仮定しないよう、ここで不正な値を弾く。

use crate::error::{Error, Result};
use crate::types::{CarbonImpact, DetectedItem, PlannedItem, ResultBundle, UploadTarget};
use serde::Deserialize;

#[derive(Deserialize)]
struct RawDetectResponse {
    items: Vec<RawDetectedItem>,
}

#[derive(Deserialize)]
struct RawDetectedItem {
    name: String,
    count: i64,
    confidence: f64,
}

#[derive(Deserialize)]
struct RawPlanResponse {
    inventory: Vec<RawPlannedItem>,
}

#[derive(Deserialize)]
struct RawPlannedItem {
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    impact: Option<String>,
}

/// 空白のみの文字列を不正とみなす
fn require_non_blank(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// 信頼度を 0.0〜1.0 に正規化
///
/// ストレージ側の検出サービスはパーセント表記（0〜100）で返すことがあるため、
/// 1.0 を超え 100.0 以下の値は 100 で割る。
pub fn normalize_confidence(value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Validation(format!("confidence out of range: {}", value)));
    }
    if value <= 1.0 {
        Ok(value)
    } else if value <= 100.0 {
        Ok(value / 100.0)
    } else {
        Err(Error::Validation(format!("confidence out of range: {}", value)))
    }
}

/// POST /api/presign のレスポンスをパース
pub fn parse_upload_target(body: &str) -> Result<UploadTarget> {
    let target: UploadTarget = serde_json::from_str(body.trim())
        .map_err(|e| Error::Parse(format!("presign response: {}", e)))?;
    require_non_blank(&target.upload_url, "uploadUrl")?;
    require_non_blank(&target.key, "key")?;
    Ok(target)
}

/// POST /api/vision/detect のレスポンスをパース
///
/// # Returns
/// * `Ok(Vec<DetectedItem>)` - 検出順を保持
/// * `Err` - JSON不正、名前が空、個数が1未満、信頼度が範囲外
pub fn parse_detect_response(body: &str) -> Result<Vec<DetectedItem>> {
    let raw: RawDetectResponse = serde_json::from_str(body.trim())
        .map_err(|e| Error::Parse(format!("detect response: {}", e)))?;

    raw.items
        .into_iter()
        .map(|item| {
            require_non_blank(&item.name, "name")?;
            if item.count < 1 || item.count > i64::from(u32::MAX) {
                return Err(Error::Validation(format!(
                    "count out of range for {}: {}",
                    item.name, item.count
                )));
            }
            Ok(DetectedItem {
                name: item.name.trim().to_string(),
                count: item.count as u32,
                confidence: normalize_confidence(item.confidence)?,
            })
        })
        .collect()
}

/// POST /api/plan のレスポンスをパース
///
/// 未知のインパクトタグ（"unknown" 等）はエラーにせず None とする。
pub fn parse_plan_response(body: &str) -> Result<Vec<PlannedItem>> {
    let raw: RawPlanResponse = serde_json::from_str(body.trim())
        .map_err(|e| Error::Parse(format!("plan response: {}", e)))?;

    raw.inventory
        .into_iter()
        .map(|item| {
            require_non_blank(&item.name, "name")?;
            Ok(PlannedItem {
                name: item.name,
                category: item
                    .category
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty()),
                impact: item.impact.as_deref().and_then(CarbonImpact::from_tag),
            })
        })
        .collect()
}

/// POST /api/analyze のレスポンスをパース
///
/// 一部でも不正なら全体をエラーにする（部分的な結果は返さない）。
pub fn parse_analyze_response(body: &str) -> Result<ResultBundle> {
    let bundle: ResultBundle = serde_json::from_str(body.trim())
        .map_err(|e| Error::Parse(format!("analyze response: {}", e)))?;
    validate_bundle(&bundle)?;
    Ok(bundle)
}

/// 解析結果の値域チェック
pub fn validate_bundle(bundle: &ResultBundle) -> Result<()> {
    for recipe in &bundle.recipes {
        require_non_blank(&recipe.id, "recipe id")?;
        require_non_blank(&recipe.title, "recipe title")?;
    }
    for tip in &bundle.swap_tips {
        require_non_blank(&tip.original, "swap original")?;
        require_non_blank(&tip.suggestion, "swap suggestion")?;
        if !(0.0..=100.0).contains(&tip.carbon_savings) {
            return Err(Error::Validation(format!(
                "carbonSavings out of range: {}",
                tip.carbon_savings
            )));
        }
    }
    for item in &bundle.inventory {
        if !(0.0..=1.0).contains(&item.confidence) {
            return Err(Error::Validation(format!(
                "confidence out of range for {}: {}",
                item.name, item.confidence
            )));
        }
    }
    if !bundle.total_carbon_impact.is_finite() || bundle.total_carbon_impact < 0.0 {
        return Err(Error::Validation(format!(
            "totalCarbonImpact out of range: {}",
            bundle.total_carbon_impact
        )));
    }
    if !bundle.analysis_time.is_finite() || bundle.analysis_time < 0.0 {
        return Err(Error::Validation(format!(
            "analysisTime out of range: {}",
            bundle.analysis_time
        )));
    }
    Ok(())
}
