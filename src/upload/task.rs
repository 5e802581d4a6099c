use super::PROGRESS_DONE;
use std::fmt;
use std::sync::Arc;

/// アップロード対象のファイル
#[derive(Clone, PartialEq)]
pub struct FileBlob {
    file_name: String,
    content_type: String,
    bytes: Arc<[u8]>,
    preview: Option<String>,
}

impl FileBlob {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: Arc::from(bytes),
            preview: None,
        }
    }

    /// ローカルのプレビュー参照（パス等）
    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }
}

impl fmt::Debug for FileBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBlob")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// 1ファイル分のアップロード状態
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTask {
    pub id: String,
    pub file: FileBlob,
    pub preview: String,
    /// 0〜100。終端までは減少しない
    pub progress: u8,
    /// 成功時のみ設定
    pub storage_key: Option<String>,
    pub error: Option<String>,
}

impl UploadTask {
    pub fn new(id: String, file: FileBlob) -> Self {
        let preview = file
            .preview()
            .map(str::to_string)
            .unwrap_or_else(|| file.file_name().to_string());
        Self {
            id,
            file,
            preview,
            progress: 0,
            storage_key: None,
            error: None,
        }
    }

    /// 後続ステージで使えるか（進捗100かつエラーなし）
    pub fn is_valid(&self) -> bool {
        self.progress == PROGRESS_DONE && self.error.is_none() && self.storage_key.is_some()
    }

    /// 成功・失敗のどちらかで確定したか
    pub fn is_settled(&self) -> bool {
        self.progress == PROGRESS_DONE || self.error.is_some()
    }

    /// イベントを適用した新しいタスクを返す
    ///
    /// 確定済みのタスクへのイベントと、進捗を戻すイベントは無視する。
    pub fn apply(&self, event: &UploadEvent) -> UploadTask {
        if self.is_settled() {
            return self.clone();
        }
        match event {
            UploadEvent::Progress { progress, .. } if *progress > self.progress => UploadTask {
                progress: (*progress).min(PROGRESS_DONE - 1),
                ..self.clone()
            },
            UploadEvent::Progress { .. } => self.clone(),
            UploadEvent::Succeeded { key, .. } => UploadTask {
                progress: PROGRESS_DONE,
                storage_key: Some(key.clone()),
                ..self.clone()
            },
            UploadEvent::Failed { reason, .. } => UploadTask {
                error: Some(reason.clone()),
                ..self.clone()
            },
        }
    }
}

/// パイプラインからの通知
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Progress { id: String, progress: u8 },
    Succeeded { id: String, key: String },
    Failed { id: String, reason: String },
}

impl UploadEvent {
    pub fn id(&self) -> &str {
        match self {
            UploadEvent::Progress { id, .. }
            | UploadEvent::Succeeded { id, .. }
            | UploadEvent::Failed { id, .. } => id,
        }
    }
}

/// 有効なストレージキー（進捗100かつエラーなし）を順序通りに返す
pub fn valid_keys(tasks: &[UploadTask]) -> Vec<String> {
    tasks
        .iter()
        .filter(|t| t.is_valid())
        .filter_map(|t| t.storage_key.clone())
        .collect()
}
