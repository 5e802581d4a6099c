use thiserror::Error;

#[derive(Error, Debug)]
pub enum FridgeError {
    /// 1ファイルのアップロード失敗（他のファイルには影響しない）
    #[error("Upload failed for {file}: {reason}")]
    Transfer { file: String, reason: String },

    /// 検出APIの失敗（空の在庫で続行）
    #[error("Detection failed: {0}")]
    Detection(String),

    /// カーボン情報取得の失敗（既存の値を維持して続行）
    #[error("Carbon planning failed: {0}")]
    Planning(String),

    /// 解析の失敗（再送信が必要）
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// 進行条件を満たさない操作（ネットワーク呼び出し前に拒否）
    #[error("{0}")]
    Validation(String),

    /// 処理中にワークフローがリセットされ、結果が破棄された
    #[error("Workflow was reset before the operation finished")]
    Superseded,

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("No images found: {0}")]
    NoImagesFound(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] smart_fridge_common::Error),
}

impl FridgeError {
    /// 現在の試行を中断するエラーか
    pub fn is_fatal(&self) -> bool {
        matches!(self, FridgeError::Analysis(_) | FridgeError::Validation(_))
    }

    /// リトライで回復し得るエラーか（通信失敗・5xx・429）
    pub fn is_retryable(&self) -> bool {
        match self {
            FridgeError::Http(e) => !e.is_builder() && !e.is_decode(),
            FridgeError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FridgeError>;
