//! アップロードパイプライン
//!
//! 選択されたファイル（最大5件）を並行してストレージへ転送する。
//! 1ファイル内の手順（アップロード先取得 → 転送 → 記録）は逐次、ファイル間は独立。
//! あるファイルの失敗は他のファイルを止めない。

mod task;

pub use task::{FileBlob, UploadEvent, UploadTask, valid_keys};

use crate::api::Backend;
use crate::demo::{DEMO_UPLOAD_DELAY, DemoMode, demo_upload_target, simulate_latency};
use crate::error::{FridgeError, Result};
use futures::future::join_all;
use smart_fridge_common::PresignRequest;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 一度に受け付けるファイル数の上限
pub const MAX_FILES: usize = 5;
/// アップロード先取得後の進捗
pub const PROGRESS_TARGET_ACQUIRED: u8 = 50;
/// 転送完了時の進捗
pub const PROGRESS_DONE: u8 = 100;

/// 実行結果の件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct UploadPipeline {
    backend: Arc<dyn Backend>,
    demo: DemoMode,
}

impl UploadPipeline {
    pub fn new(backend: Arc<dyn Backend>, demo: DemoMode) -> Self {
        Self { backend, demo }
    }

    /// ファイルからタスクを生成（`capacity` 超過分は無視）
    ///
    /// IDは `img-<ms>-<連番>`。連番は `first_index` から始まる。
    pub fn prepare(
        files: Vec<FileBlob>,
        capacity: usize,
        timestamp_ms: i64,
        first_index: u64,
    ) -> Vec<UploadTask> {
        let capacity = capacity.min(MAX_FILES);
        if files.len() > capacity {
            warn!(selected = files.len(), limit = capacity, "Too many files, extra files ignored");
        }
        files
            .into_iter()
            .take(capacity)
            .zip(first_index..)
            .map(|(file, index)| UploadTask::new(format!("img-{}-{}", timestamp_ms, index), file))
            .collect()
    }

    /// 全タスクを並行実行し、進捗を `sink` に通知する
    ///
    /// 各タスクは必ず `Succeeded` か `Failed` のどちらかで終わる。
    pub async fn run(&self, tasks: &[UploadTask], sink: &(dyn Fn(UploadEvent) + Sync)) -> UploadSummary {
        let flows = tasks.iter().map(|task| async move {
            match self.upload_one(task, sink).await {
                Ok(key) => {
                    info!(id = %task.id, key = %key, "Upload succeeded");
                    sink(UploadEvent::Succeeded {
                        id: task.id.clone(),
                        key,
                    });
                    true
                }
                Err(e) => {
                    warn!(id = %task.id, file = %task.file.file_name(), error = %e, "Upload failed");
                    sink(UploadEvent::Failed {
                        id: task.id.clone(),
                        reason: e.to_string(),
                    });
                    false
                }
            }
        });

        let results = join_all(flows).await;
        let succeeded = results.iter().filter(|ok| **ok).count();
        UploadSummary {
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    async fn upload_one(&self, task: &UploadTask, sink: &(dyn Fn(UploadEvent) + Sync)) -> Result<String> {
        let file = &task.file;
        // 開始時のモードで最後まで実行する
        let demo = self.demo.is_enabled();
        let transfer_error = |e: FridgeError| FridgeError::Transfer {
            file: file.file_name().to_string(),
            reason: e.to_string(),
        };

        let target = if demo {
            demo_upload_target(&task.id, file.file_name())
        } else {
            let request = PresignRequest {
                file_name: file.file_name().to_string(),
                file_type: file.content_type().to_string(),
            };
            self.backend.presign(&request).await.map_err(transfer_error)?
        };
        debug!(id = %task.id, key = %target.key, demo, "Upload target acquired");
        sink(UploadEvent::Progress {
            id: task.id.clone(),
            progress: PROGRESS_TARGET_ACQUIRED,
        });

        if demo {
            simulate_latency(DEMO_UPLOAD_DELAY).await;
        } else {
            self.backend
                .put_object(&target, file.content_type(), file.bytes())
                .await
                .map_err(transfer_error)?;
        }

        Ok(target.key)
    }
}
