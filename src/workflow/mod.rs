//! 冷蔵庫解析ワークフロー
//!
//! Intro → Upload → Inventory → People → Results の5ステージ。
//! 状態遷移は `state::reduce`、外部呼び出しの順序付けは `Orchestrator` が担う。

mod orchestrator;
mod state;

pub use orchestrator::Orchestrator;
pub use state::{
    ANALYSIS_ERROR, Action, DETECTION_WARNING, INTERRUPTED_ERROR, Loading, Notice, NoticeLevel,
    PLANNING_WARNING, Stage, WorkflowState, reduce, validate_people,
};
