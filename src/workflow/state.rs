//! ワークフロー状態と遷移
//!
//! 状態は `reduce` だけが遷移させる。`reduce` は現在の状態を変更せず、
//! 新しい状態を丸ごと返す（コレクションはIDで置き換えたコピーを作る）。
//! 非同期処理の完了アクションは世代番号を持ち、リセット後に届いた古い完了は捨てる。

use crate::analyzer::MAX_PEOPLE;
use crate::config::DEFAULT_PEOPLE;
use crate::error::{FridgeError, Result};
use crate::upload::{MAX_FILES, UploadEvent, UploadTask, valid_keys};
use smart_fridge_common::{InventoryItem, ItemDraft, ResultBundle, apply_edit, user_item};
use std::fmt;
use tracing::{debug, warn};

pub const DETECTION_WARNING: &str =
    "Could not detect items automatically. Add items manually to continue.";
pub const PLANNING_WARNING: &str = "Carbon data unavailable; keeping current categories.";
pub const ANALYSIS_ERROR: &str = "Failed to analyze images. Please try again.";
pub const INTERRUPTED_ERROR: &str = "The operation was interrupted. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Intro,
    Upload,
    Inventory,
    People,
    Results,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Intro => "intro",
            Stage::Upload => "upload",
            Stage::Inventory => "inventory",
            Stage::People => "people",
            Stage::Results => "results",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ローディング表示（見出し + 補足）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loading {
    /// ローディング開始時のステージ
    pub stage: Stage,
    pub headline: String,
    pub detail: String,
}

impl Loading {
    fn detecting() -> Self {
        Self {
            stage: Stage::Upload,
            headline: "Detecting fridge contents...".into(),
            detail: "Looking for items across your photos".into(),
        }
    }

    fn analyzing() -> Self {
        Self {
            stage: Stage::People,
            headline: "Analyzing your fridge contents...".into(),
            detail: "This usually takes 5-10 seconds".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// ユーザーに表示するメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowState {
    pub stage: Stage,
    pub loading: Option<Loading>,
    pub people: u32,
    pub uploads: Vec<UploadTask>,
    pub inventory: Vec<InventoryItem>,
    /// stage == Results のときだけ Some
    pub results: Option<ResultBundle>,
    pub notice: Option<Notice>,
    /// リセットのたびに増える世代番号
    pub generation: u64,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            stage: Stage::Intro,
            loading: None,
            people: DEFAULT_PEOPLE,
            uploads: Vec::new(),
            inventory: Vec::new(),
            results: None,
            notice: None,
            generation: 0,
        }
    }
}

impl WorkflowState {
    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn valid_keys(&self) -> Vec<String> {
        valid_keys(&self.uploads)
    }

    /// 転送中のアップロードがあるか
    pub fn uploads_in_flight(&self) -> bool {
        self.uploads.iter().any(|t| !t.is_settled())
    }

    pub fn upload(&self, id: &str) -> Option<&UploadTask> {
        self.uploads.iter().find(|t| t.id == id)
    }

    pub fn item(&self, id: &str) -> Option<&InventoryItem> {
        self.inventory.iter().find(|i| i.id == id)
    }

    /// 現在の世代か
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

/// 状態遷移アクション
#[derive(Debug, Clone)]
pub enum Action {
    /// Intro → Upload
    Start,
    /// どのステージからでも Intro に戻り、全データを破棄
    Reset,
    /// Inventory → Upload / People → Inventory（Upload からは Reset と同じ）
    Back,
    UploadsQueued { generation: u64, tasks: Vec<UploadTask> },
    Upload { generation: u64, event: UploadEvent },
    /// 転送は止めない。以後そのIDへの通知は無視される
    RemoveUpload { id: String },
    DetectionStarted { generation: u64 },
    DetectionFinished { generation: u64, result: std::result::Result<Vec<InventoryItem>, String> },
    /// 下書きから利用者追加の品目（信頼度 1.0）を作る
    AddItem { id: String, draft: ItemDraft },
    UpdateItem { id: String, draft: ItemDraft },
    RemoveItem { id: String },
    /// Inventory → People
    ConfirmInventory,
    AnalysisStarted { generation: u64, people: u32 },
    EnrichmentFinished { generation: u64, result: std::result::Result<Vec<InventoryItem>, String> },
    AnalysisFinished { generation: u64, result: std::result::Result<ResultBundle, String> },
    /// 検出・解析が完了前に中断された（呼び出し側の future が破棄された）
    Interrupted { generation: u64 },
    DismissNotice,
}

impl Action {
    /// 非同期完了アクションの世代番号
    fn completion_generation(&self) -> Option<u64> {
        match self {
            Action::Upload { generation, .. }
            | Action::DetectionFinished { generation, .. }
            | Action::EnrichmentFinished { generation, .. }
            | Action::AnalysisFinished { generation, .. }
            | Action::Interrupted { generation } => Some(*generation),
            _ => None,
        }
    }
}

fn invalid(message: impl Into<String>) -> FridgeError {
    FridgeError::Validation(message.into())
}

fn require_stage(state: &WorkflowState, stage: Stage) -> Result<()> {
    if state.stage != stage {
        return Err(invalid(format!(
            "action requires {} stage, currently {}",
            stage, state.stage
        )));
    }
    Ok(())
}

fn require_idle(state: &WorkflowState) -> Result<()> {
    if state.is_loading() {
        return Err(invalid("another operation is in progress"));
    }
    Ok(())
}

/// Upload から進めるかを検証し、失敗タスクを除いたアップロード一覧を返す
fn ready_uploads(state: &WorkflowState) -> Result<Vec<UploadTask>> {
    require_stage(state, Stage::Upload)?;
    require_idle(state)?;
    if state.uploads_in_flight() {
        return Err(invalid("Uploads are still in progress"));
    }
    let retained: Vec<UploadTask> = state.uploads.iter().filter(|t| t.is_valid()).cloned().collect();
    if retained.is_empty() {
        return Err(invalid("No images uploaded successfully"));
    }
    Ok(retained)
}

/// 世帯人数の検証
pub fn validate_people(people: u32) -> Result<u32> {
    if people == 0 || people > MAX_PEOPLE {
        return Err(invalid(format!(
            "Household size must be between 1 and {}",
            MAX_PEOPLE
        )));
    }
    Ok(people)
}

/// 状態遷移
///
/// 検証に失敗した場合は `Err` を返し、状態は変わらない。
/// 世代番号が一致しない完了アクションはエラーにせず、そのままの状態を返す。
pub fn reduce(state: &WorkflowState, action: Action) -> Result<WorkflowState> {
    if let Some(generation) = action.completion_generation() {
        if !state.is_current(generation) {
            debug!(generation, current = state.generation, "Discarding stale completion");
            return Ok(state.clone());
        }
    }

    match action {
        Action::Start => {
            require_stage(state, Stage::Intro)?;
            Ok(WorkflowState {
                stage: Stage::Upload,
                notice: None,
                ..state.clone()
            })
        }

        Action::Reset => Ok(WorkflowState {
            generation: state.generation + 1,
            ..WorkflowState::default()
        }),

        Action::Back => {
            require_idle(state)?;
            let stage = match state.stage {
                Stage::Upload => return reduce(state, Action::Reset),
                Stage::Inventory => Stage::Upload,
                Stage::People => Stage::Inventory,
                other => return Err(invalid(format!("cannot go back from {}", other))),
            };
            Ok(WorkflowState {
                stage,
                notice: None,
                ..state.clone()
            })
        }

        Action::UploadsQueued { generation, tasks } => {
            if !state.is_current(generation) {
                return Ok(state.clone());
            }
            require_stage(state, Stage::Upload)?;
            require_idle(state)?;
            if state.uploads.len() + tasks.len() > MAX_FILES {
                return Err(invalid(format!("Upload up to {} images", MAX_FILES)));
            }
            let mut uploads = state.uploads.clone();
            uploads.extend(tasks);
            Ok(WorkflowState {
                uploads,
                ..state.clone()
            })
        }

        Action::Upload { event, .. } => {
            if state.upload(event.id()).is_none() {
                debug!(id = event.id(), "Ignoring completion for removed upload");
                return Ok(state.clone());
            }
            let uploads = state
                .uploads
                .iter()
                .map(|t| if t.id == event.id() { t.apply(&event) } else { t.clone() })
                .collect();
            Ok(WorkflowState {
                uploads,
                ..state.clone()
            })
        }

        Action::RemoveUpload { id } => {
            require_stage(state, Stage::Upload)?;
            require_idle(state)?;
            Ok(WorkflowState {
                uploads: state.uploads.iter().filter(|t| t.id != id).cloned().collect(),
                ..state.clone()
            })
        }

        Action::DetectionStarted { generation } => {
            if !state.is_current(generation) {
                return Ok(state.clone());
            }
            let uploads = ready_uploads(state)?;
            Ok(WorkflowState {
                uploads,
                loading: Some(Loading::detecting()),
                notice: None,
                ..state.clone()
            })
        }

        Action::DetectionFinished { result, .. } => {
            if state.stage != Stage::Upload || !state.is_loading() {
                warn!(stage = %state.stage, "Detection completion without pending detection");
                return Ok(state.clone());
            }
            let (inventory, notice) = match result {
                Ok(items) => (items, None),
                Err(reason) => {
                    warn!(reason = %reason, "Detection failed, continuing with empty inventory");
                    (Vec::new(), Some(Notice::warning(DETECTION_WARNING)))
                }
            };
            Ok(WorkflowState {
                stage: Stage::Inventory,
                loading: None,
                inventory,
                notice,
                ..state.clone()
            })
        }

        Action::AddItem { id, draft } => {
            require_stage(state, Stage::Inventory)?;
            if state.item(&id).is_some() {
                return Err(invalid(format!("duplicate item id {}", id)));
            }
            let item = user_item(id, &draft)?;
            let mut inventory = state.inventory.clone();
            inventory.push(item);
            Ok(WorkflowState {
                inventory,
                ..state.clone()
            })
        }

        Action::UpdateItem { id, draft } => {
            require_stage(state, Stage::Inventory)?;
            let current = state
                .item(&id)
                .ok_or_else(|| invalid(format!("unknown item {}", id)))?;
            let edited = apply_edit(current, &draft)?;
            let inventory = state
                .inventory
                .iter()
                .map(|i| if i.id == id { edited.clone() } else { i.clone() })
                .collect();
            Ok(WorkflowState {
                inventory,
                ..state.clone()
            })
        }

        Action::RemoveItem { id } => {
            require_stage(state, Stage::Inventory)?;
            if state.item(&id).is_none() {
                warn!(id = %id, "Removing unknown item");
            }
            Ok(WorkflowState {
                inventory: state.inventory.iter().filter(|i| i.id != id).cloned().collect(),
                ..state.clone()
            })
        }

        Action::ConfirmInventory => {
            require_stage(state, Stage::Inventory)?;
            Ok(WorkflowState {
                stage: Stage::People,
                notice: None,
                ..state.clone()
            })
        }

        Action::AnalysisStarted { generation, people } => {
            if !state.is_current(generation) {
                return Ok(state.clone());
            }
            require_stage(state, Stage::People)?;
            require_idle(state)?;
            let people = validate_people(people)?;
            if state.valid_keys().is_empty() {
                return Err(invalid("No images uploaded successfully"));
            }
            Ok(WorkflowState {
                people,
                loading: Some(Loading::analyzing()),
                notice: None,
                ..state.clone()
            })
        }

        Action::EnrichmentFinished { result, .. } => {
            if state.stage != Stage::People || !state.is_loading() {
                return Ok(state.clone());
            }
            match result {
                Ok(items) => {
                    let same_ids = items.len() == state.inventory.len()
                        && items.iter().zip(&state.inventory).all(|(a, b)| a.id == b.id);
                    if !same_ids {
                        warn!("Enriched inventory does not match current items, keeping current values");
                        return Ok(state.clone());
                    }
                    Ok(WorkflowState {
                        inventory: items,
                        ..state.clone()
                    })
                }
                Err(reason) => {
                    warn!(reason = %reason, "Carbon planning failed, keeping current values");
                    Ok(WorkflowState {
                        notice: Some(Notice::warning(PLANNING_WARNING)),
                        ..state.clone()
                    })
                }
            }
        }

        Action::AnalysisFinished { result, .. } => {
            if state.stage != Stage::People || !state.is_loading() {
                warn!(stage = %state.stage, "Analysis completion without pending analysis");
                return Ok(state.clone());
            }
            match result {
                Ok(bundle) => {
                    let notice = state
                        .notice
                        .clone()
                        .filter(|n| n.level == NoticeLevel::Warning);
                    Ok(WorkflowState {
                        stage: Stage::Results,
                        loading: None,
                        results: Some(bundle),
                        notice,
                        ..state.clone()
                    })
                }
                Err(reason) => {
                    warn!(reason = %reason, "Analysis failed, returning to household size");
                    Ok(WorkflowState {
                        stage: Stage::People,
                        loading: None,
                        results: None,
                        notice: Some(Notice::error(ANALYSIS_ERROR)),
                        ..state.clone()
                    })
                }
            }
        }

        Action::Interrupted { .. } => {
            let Some(loading) = &state.loading else {
                return Ok(state.clone());
            };
            warn!(stage = %loading.stage, "Pending operation interrupted");
            Ok(WorkflowState {
                stage: loading.stage,
                loading: None,
                notice: Some(Notice::error(INTERRUPTED_ERROR)),
                ..state.clone()
            })
        }

        Action::DismissNotice => Ok(WorkflowState {
            notice: None,
            ..state.clone()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::FileBlob;
    use smart_fridge_common::demo::demo_bundle;
    use smart_fridge_common::CarbonImpact;

    fn task(id: &str) -> UploadTask {
        UploadTask::new(id.to_string(), FileBlob::new(format!("{}.jpg", id), "image/jpeg", vec![0]))
    }

    fn succeeded(id: &str) -> UploadEvent {
        UploadEvent::Succeeded { id: id.to_string(), key: format!("uploads/{}", id) }
    }

    fn apply(state: WorkflowState, actions: Vec<Action>) -> WorkflowState {
        actions
            .into_iter()
            .fold(state, |s, a| reduce(&s, a).expect("action rejected"))
    }

    fn uploaded(ids: &[&str]) -> WorkflowState {
        let mut actions = vec![
            Action::Start,
            Action::UploadsQueued { generation: 0, tasks: ids.iter().map(|id| task(id)).collect() },
        ];
        actions.extend(ids.iter().map(|id| Action::Upload { generation: 0, event: succeeded(id) }));
        apply(WorkflowState::default(), actions)
    }

    fn item(id: &str, name: &str) -> InventoryItem {
        user_item(id.to_string(), &ItemDraft::new(name, "Other", "1", CarbonImpact::Medium)).unwrap()
    }

    fn at_people() -> WorkflowState {
        apply(
            uploaded(&["a"]),
            vec![
                Action::DetectionStarted { generation: 0 },
                Action::DetectionFinished { generation: 0, result: Ok(vec![item("x", "egg")]) },
                Action::ConfirmInventory,
            ],
        )
    }

    #[test]
    fn test_forward_path() {
        let state = at_people();
        assert_eq!(state.stage, Stage::People);
        let state = apply(
            state,
            vec![
                Action::AnalysisStarted { generation: 0, people: 3 },
                Action::AnalysisFinished { generation: 0, result: Ok(demo_bundle(&[])) },
            ],
        );
        assert_eq!(state.stage, Stage::Results);
        assert_eq!(state.people, 3);
        assert!(state.results.is_some());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_start_only_from_intro() {
        let state = uploaded(&["a"]);
        assert!(reduce(&state, Action::Start).is_err());
    }

    #[test]
    fn test_back_transitions() {
        let people = at_people();
        let inventory = reduce(&people, Action::Back).unwrap();
        assert_eq!(inventory.stage, Stage::Inventory);
        assert_eq!(inventory.inventory, people.inventory);
        let upload = reduce(&inventory, Action::Back).unwrap();
        assert_eq!(upload.stage, Stage::Upload);
        assert_eq!(upload.uploads.len(), 1);
        // Upload からの戻りはリセット
        let intro = reduce(&upload, Action::Back).unwrap();
        assert_eq!(intro.stage, Stage::Intro);
        assert!(intro.uploads.is_empty());
        assert_eq!(intro.generation, 1);
        assert!(reduce(&intro, Action::Back).is_err());
    }

    #[test]
    fn test_reset_clears_everything() {
        let state = apply(
            at_people(),
            vec![
                Action::AnalysisStarted { generation: 0, people: 5 },
                Action::AnalysisFinished { generation: 0, result: Ok(demo_bundle(&[])) },
                Action::Reset,
            ],
        );
        assert_eq!(state.stage, Stage::Intro);
        assert!(state.uploads.is_empty());
        assert!(state.inventory.is_empty());
        assert!(state.results.is_none());
        assert_eq!(state.people, DEFAULT_PEOPLE);
        assert_eq!(state.generation, 1);
    }

    #[test]
    fn test_stale_completion_discarded() {
        let state = apply(
            uploaded(&["a"]),
            vec![Action::DetectionStarted { generation: 0 }, Action::Reset],
        );
        let after = reduce(
            &state,
            Action::DetectionFinished { generation: 0, result: Ok(vec![item("x", "egg")]) },
        )
        .unwrap();
        assert_eq!(after, state);
        assert!(after.inventory.is_empty());
    }

    #[test]
    fn test_upload_event_for_removed_task_ignored() {
        let state = apply(
            WorkflowState::default(),
            vec![
                Action::Start,
                Action::UploadsQueued { generation: 0, tasks: vec![task("a"), task("b")] },
                Action::RemoveUpload { id: "b".into() },
            ],
        );
        let after = reduce(&state, Action::Upload { generation: 0, event: succeeded("b") }).unwrap();
        assert_eq!(after.uploads.len(), 1);
        assert_eq!(after.uploads[0].id, "a");
    }

    #[test]
    fn test_queue_limit() {
        let state = reduce(&WorkflowState::default(), Action::Start).unwrap();
        let tasks: Vec<_> = (0..6).map(|i| task(&format!("t{}", i))).collect();
        assert!(reduce(&state, Action::UploadsQueued { generation: 0, tasks }).is_err());
    }

    #[test]
    fn test_detection_requires_settled_uploads() {
        let state = apply(
            WorkflowState::default(),
            vec![
                Action::Start,
                Action::UploadsQueued { generation: 0, tasks: vec![task("a"), task("b")] },
                Action::Upload { generation: 0, event: succeeded("a") },
            ],
        );
        let err = reduce(&state, Action::DetectionStarted { generation: 0 }).unwrap_err();
        assert!(matches!(err, FridgeError::Validation(_)));
    }

    #[test]
    fn test_detection_requires_valid_key() {
        let state = apply(
            WorkflowState::default(),
            vec![
                Action::Start,
                Action::UploadsQueued { generation: 0, tasks: vec![task("a")] },
                Action::Upload {
                    generation: 0,
                    event: UploadEvent::Failed { id: "a".into(), reason: "x".into() },
                },
            ],
        );
        assert!(reduce(&state, Action::DetectionStarted { generation: 0 }).is_err());
    }

    #[test]
    fn test_detection_prunes_failed_uploads() {
        let state = apply(
            WorkflowState::default(),
            vec![
                Action::Start,
                Action::UploadsQueued { generation: 0, tasks: vec![task("a"), task("b")] },
                Action::Upload { generation: 0, event: succeeded("a") },
                Action::Upload {
                    generation: 0,
                    event: UploadEvent::Failed { id: "b".into(), reason: "x".into() },
                },
                Action::DetectionStarted { generation: 0 },
            ],
        );
        assert_eq!(state.uploads.len(), 1);
        assert!(state.uploads.iter().all(|t| t.is_valid()));
        assert_eq!(state.loading.as_ref().map(|l| l.stage), Some(Stage::Upload));
    }

    #[test]
    fn test_detection_failure_degrades() {
        let state = apply(
            uploaded(&["a"]),
            vec![
                Action::DetectionStarted { generation: 0 },
                Action::DetectionFinished { generation: 0, result: Err("503".into()) },
            ],
        );
        assert_eq!(state.stage, Stage::Inventory);
        assert!(state.inventory.is_empty());
        assert_eq!(state.notice, Some(Notice::warning(DETECTION_WARNING)));
    }

    #[test]
    fn test_inventory_edits() {
        let state = apply(
            uploaded(&["a"]),
            vec![
                Action::DetectionStarted { generation: 0 },
                Action::DetectionFinished { generation: 0, result: Ok(vec![item("x", "egg")]) },
                Action::AddItem {
                    id: "y".into(),
                    draft: ItemDraft::new("milk", "Dairy & Eggs", "1", CarbonImpact::Medium),
                },
                Action::UpdateItem {
                    id: "x".into(),
                    draft: ItemDraft::new("eggs", "Dairy & Eggs", "6", CarbonImpact::Medium),
                },
                Action::RemoveItem { id: "y".into() },
            ],
        );
        assert_eq!(state.inventory.len(), 1);
        assert_eq!(state.inventory[0].name, "eggs");
        let dup = ItemDraft::new("dup", "Other", "1", CarbonImpact::Low);
        assert!(reduce(&state, Action::AddItem { id: "x".into(), draft: dup }).is_err());
        let blank = ItemDraft::new("", "Dairy", "1", CarbonImpact::Low);
        assert!(reduce(&state, Action::UpdateItem { id: "x".into(), draft: blank.clone() }).is_err());
        assert!(reduce(&state, Action::AddItem { id: "z".into(), draft: blank }).is_err());
    }

    #[test]
    fn test_added_items_are_user_authored() {
        let state = apply(
            uploaded(&["a"]),
            vec![
                Action::DetectionStarted { generation: 0 },
                Action::DetectionFinished { generation: 0, result: Ok(vec![]) },
                Action::AddItem {
                    id: "y".into(),
                    draft: ItemDraft::new("tofu", "Protein", "2", CarbonImpact::Low),
                },
            ],
        );
        let added = state.item("y").expect("item added");
        assert_eq!(added.confidence, 1.0);
        assert_eq!(added.name, "tofu");
    }

    #[test]
    fn test_interrupted_analysis_unlocks_people() {
        let state = reduce(&at_people(), Action::AnalysisStarted { generation: 0, people: 2 }).unwrap();
        let after = reduce(&state, Action::Interrupted { generation: 0 }).unwrap();
        assert_eq!(after.stage, Stage::People);
        assert!(!after.is_loading());
        assert_eq!(after.inventory, state.inventory);
        assert_eq!(after.notice, Some(Notice::error(INTERRUPTED_ERROR)));
        assert!(reduce(&after, Action::Back).is_ok());
    }

    #[test]
    fn test_interrupted_detection_stays_on_upload() {
        let state = reduce(&uploaded(&["a"]), Action::DetectionStarted { generation: 0 }).unwrap();
        let after = reduce(&state, Action::Interrupted { generation: 0 }).unwrap();
        assert_eq!(after.stage, Stage::Upload);
        assert!(!after.is_loading());
        assert_eq!(after.uploads, state.uploads);
        assert!(reduce(&after, Action::DetectionStarted { generation: 0 }).is_ok());
    }

    #[test]
    fn test_interrupted_without_loading_is_noop() {
        let state = at_people();
        assert_eq!(reduce(&state, Action::Interrupted { generation: 0 }).unwrap(), state);
        let stale = reduce(&state, Action::AnalysisStarted { generation: 0, people: 2 }).unwrap();
        let reset = reduce(&stale, Action::Reset).unwrap();
        assert_eq!(reduce(&reset, Action::Interrupted { generation: 0 }).unwrap(), reset);
    }

    #[test]
    fn test_people_range() {
        let state = at_people();
        assert!(reduce(&state, Action::AnalysisStarted { generation: 0, people: 0 }).is_err());
        assert!(reduce(&state, Action::AnalysisStarted { generation: 0, people: 21 }).is_err());
        assert!(reduce(&state, Action::AnalysisStarted { generation: 0, people: 20 }).is_ok());
    }

    #[test]
    fn test_enrichment_cannot_change_ids() {
        let state = reduce(&at_people(), Action::AnalysisStarted { generation: 0, people: 2 }).unwrap();
        let after = reduce(
            &state,
            Action::EnrichmentFinished {
                generation: 0,
                result: Ok(vec![item("x", "egg"), item("z", "extra")]),
            },
        )
        .unwrap();
        assert_eq!(after.inventory, state.inventory);
    }

    #[test]
    fn test_analysis_failure_returns_to_people() {
        let state = reduce(&at_people(), Action::AnalysisStarted { generation: 0, people: 2 }).unwrap();
        let after = reduce(
            &state,
            Action::AnalysisFinished { generation: 0, result: Err("500".into()) },
        )
        .unwrap();
        assert_eq!(after.stage, Stage::People);
        assert!(after.results.is_none());
        assert!(!after.is_loading());
        assert_eq!(after.inventory, state.inventory);
        assert_eq!(after.uploads, state.uploads);
        assert_eq!(after.notice.map(|n| n.level), Some(NoticeLevel::Error));
    }

    #[test]
    fn test_loading_blocks_navigation() {
        let state = reduce(&at_people(), Action::AnalysisStarted { generation: 0, people: 2 }).unwrap();
        assert!(reduce(&state, Action::Back).is_err());
        assert!(reduce(&state, Action::AnalysisStarted { generation: 0, people: 2 }).is_err());
        // リセットは常に可能
        assert_eq!(reduce(&state, Action::Reset).unwrap().stage, Stage::Intro);
    }
}
