use super::state::{Action, WorkflowState, reduce};
use crate::analyzer::{Aggregator, CarbonPlanner, VisionDetector};
use crate::api::{Backend, HttpBackend};
use crate::config::Config;
use crate::demo::DemoMode;
use crate::error::{FridgeError, Result};
use crate::upload::{FileBlob, MAX_FILES, UploadEvent, UploadPipeline, UploadSummary};
use chrono::Utc;
use smart_fridge_common::{ItemDraft, ResultBundle};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{info, warn};

/// ワークフローの実行器
///
/// 状態は `watch` チャネルに1つだけ持ち、`reduce` が返した新しい値で丸ごと置き換える。
/// 購読者は常に一貫したスナップショットを見る。
/// 非同期処理は開始時の世代番号を持ち回り、完了時に照合する。
pub struct Orchestrator {
    state: watch::Sender<WorkflowState>,
    pipeline: UploadPipeline,
    detector: VisionDetector,
    planner: CarbonPlanner,
    aggregator: Aggregator,
    demo: DemoMode,
    /// アップロード・追加品目のID連番
    sequence: AtomicU64,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn Backend>, demo: DemoMode, bucket: impl Into<String>) -> Self {
        let (state, _) = watch::channel(WorkflowState::default());
        Self {
            state,
            pipeline: UploadPipeline::new(backend.clone(), demo.clone()),
            detector: VisionDetector::new(backend.clone(), demo.clone(), bucket),
            planner: CarbonPlanner::new(backend.clone(), demo.clone()),
            aggregator: Aggregator::new(backend, demo.clone()),
            demo,
            sequence: AtomicU64::new(0),
        }
    }

    /// 設定からHTTPバックエンドを構築
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = HttpBackend::from_config(config)?;
        let demo = DemoMode::new(config.demo_mode);
        Ok(Self::new(Arc::new(backend), demo, config.bucket.clone()))
    }

    pub fn demo(&self) -> &DemoMode {
        &self.demo
    }

    /// 現在の状態のコピー
    pub fn snapshot(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    /// 状態変化の購読
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    /// アクションを適用する。拒否された場合は状態を変えずにエラーを返す
    pub fn dispatch(&self, action: Action) -> Result<()> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|state| match reduce(state, action) {
            Ok(next) if next != *state => {
                *state = next;
                true
            }
            Ok(_) => false,
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }

    fn next_sequence(&self, count: u64) -> u64 {
        self.sequence.fetch_add(count, Ordering::SeqCst)
    }

    pub fn start(&self) -> Result<()> {
        self.dispatch(Action::Start)
    }

    pub fn back(&self) -> Result<()> {
        self.dispatch(Action::Back)
    }

    /// 進行中の処理があっても受け付ける。遅れて届いた完了は破棄される
    pub fn reset(&self) {
        if let Err(e) = self.dispatch(Action::Reset) {
            warn!(error = %e, "Reset rejected");
        }
        info!(generation = self.snapshot().generation, "Workflow reset");
    }

    pub fn dismiss_notice(&self) {
        if let Err(e) = self.dispatch(Action::DismissNotice) {
            warn!(error = %e, "Dismiss rejected");
        }
    }

    /// ファイルを受け付けて並行アップロードする
    ///
    /// 残り枠を超える分は無視する。個々の失敗はタスクに記録され、ここではエラーにならない。
    pub async fn upload_files(&self, files: Vec<FileBlob>) -> Result<UploadSummary> {
        let snapshot = self.snapshot();
        let capacity = MAX_FILES.saturating_sub(snapshot.uploads.len());
        if capacity == 0 {
            return Err(FridgeError::Validation(format!(
                "Upload up to {} images",
                MAX_FILES
            )));
        }
        if files.is_empty() {
            return Ok(UploadSummary::default());
        }

        let generation = snapshot.generation;
        let first_index = self.next_sequence(files.len().min(capacity) as u64);
        let tasks = UploadPipeline::prepare(
            files,
            capacity,
            Utc::now().timestamp_millis(),
            first_index,
        );
        self.dispatch(Action::UploadsQueued {
            generation,
            tasks: tasks.clone(),
        })?;

        let sink = |event: UploadEvent| {
            if let Err(e) = self.dispatch(Action::Upload { generation, event }) {
                warn!(error = %e, "Upload event rejected");
            }
        };
        let summary = self.pipeline.run(&tasks, &sink).await;
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Upload batch finished"
        );
        Ok(summary)
    }

    /// アップロード一覧から外す。転送は止めないが、以後の完了は無視される
    pub fn remove_upload(&self, id: &str) -> Result<()> {
        self.dispatch(Action::RemoveUpload { id: id.to_string() })
    }

    /// Upload → Inventory
    ///
    /// 検出に失敗しても空の在庫と警告で Inventory へ進む。
    pub async fn advance_from_upload(&self) -> Result<()> {
        let generation = self.snapshot().generation;
        self.dispatch(Action::DetectionStarted { generation })?;
        let guard = LoadingGuard::new(self, generation);
        let keys = self.snapshot().valid_keys();

        let result = self.detector.detect(&keys).await;
        if let Err(e) = &result {
            warn!(error = %e, "Detection failed");
        }
        self.dispatch(Action::DetectionFinished {
            generation,
            result: result.map_err(|e| e.to_string()),
        })?;
        guard.disarm();

        if !self.snapshot().is_current(generation) {
            return Err(FridgeError::Superseded);
        }
        Ok(())
    }

    /// 品目を追加し、採番したIDを返す
    pub fn add_item(&self, draft: &ItemDraft) -> Result<String> {
        let id = format!(
            "item-{}-{}",
            Utc::now().timestamp_millis(),
            self.next_sequence(1)
        );
        self.dispatch(Action::AddItem {
            id: id.clone(),
            draft: draft.clone(),
        })?;
        Ok(id)
    }

    pub fn update_item(&self, id: &str, draft: ItemDraft) -> Result<()> {
        self.dispatch(Action::UpdateItem {
            id: id.to_string(),
            draft,
        })
    }

    pub fn remove_item(&self, id: &str) -> Result<()> {
        self.dispatch(Action::RemoveItem { id: id.to_string() })
    }

    /// Inventory → People（空の在庫でも可）
    pub fn confirm_inventory(&self) -> Result<()> {
        self.dispatch(Action::ConfirmInventory)
    }

    /// 世帯人数を確定して解析する
    ///
    /// カーボン情報の付与（失敗しても続行）→ 最終解析 の順に実行する。
    /// 解析に失敗した場合は People に戻り、同じ在庫とキーで再送信できる。
    pub async fn submit_household(&self, people: u32) -> Result<ResultBundle> {
        let generation = self.snapshot().generation;
        self.dispatch(Action::AnalysisStarted { generation, people })?;
        let guard = LoadingGuard::new(self, generation);

        let inventory = self.snapshot().inventory;
        let enriched = self.planner.enrich(&inventory, people).await;
        self.dispatch(Action::EnrichmentFinished {
            generation,
            result: enriched.map(|outcome| outcome.items).map_err(|e| e.to_string()),
        })?;

        let state = self.snapshot();
        if !state.is_current(generation) {
            guard.disarm();
            return Err(FridgeError::Superseded);
        }

        let keys = state.valid_keys();
        let result = self
            .aggregator
            .analyze(&keys, state.people, &state.inventory)
            .await;

        match result {
            Ok(bundle) => {
                self.dispatch(Action::AnalysisFinished {
                    generation,
                    result: Ok(bundle.clone()),
                })?;
                guard.disarm();
                if !self.snapshot().is_current(generation) {
                    return Err(FridgeError::Superseded);
                }
                Ok(bundle)
            }
            Err(e) => {
                warn!(error = %e, "Analysis failed");
                self.dispatch(Action::AnalysisFinished {
                    generation,
                    result: Err(e.to_string()),
                })?;
                guard.disarm();
                Err(e)
            }
        }
    }
}

/// 検出・解析中のローディング解除
///
/// 完了アクションを送る前に future が破棄された場合、`Drop` で `Interrupted` を送る。
struct LoadingGuard<'a> {
    orchestrator: &'a Orchestrator,
    generation: u64,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(orchestrator: &'a Orchestrator, generation: u64) -> Self {
        Self {
            orchestrator,
            generation,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(generation = self.generation, "Operation dropped before completion");
        if let Err(e) = self.orchestrator.dispatch(Action::Interrupted {
            generation: self.generation,
        }) {
            warn!(error = %e, "Interrupt rejected");
        }
    }
}
