//! Smart Fridge Common Library
//!
//! ワークフロー本体とCLIで共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod parser;
pub mod inventory;
pub mod demo;

pub use types::{
    AnalyzeRequest, CarbonImpact, DetectRequest, DetectedItem, InventoryItem, PlanRequest,
    PlannedItem, PresignRequest, Recipe, ResultBundle, SwapTip, UploadTarget, USER_CONFIDENCE,
};
pub use error::{Error, Result};
pub use parser::{
    parse_analyze_response, parse_detect_response, parse_plan_response, parse_upload_target,
    validate_bundle,
};
pub use inventory::{ItemDraft, MergeOutcome, apply_edit, items_from_detections, merge_carbon, user_item};
