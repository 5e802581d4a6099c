//! リトライポリシー
//!
//! 各API呼び出しはこのポリシー経由で実行する。リトライなしも `RetryPolicy::none()` として明示する。

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 初回を除く再試行回数
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
}

impl RetryPolicy {
    /// リトライしない
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// 指数バックオフ（倍率2）
    pub fn exponential(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            multiplier: 2,
        }
    }

    /// n回目の再試行（1始まり）の前に待つ時間
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// ポリシーに従って非同期処理を実行
///
/// `FridgeError::is_retryable` が偽のエラー（検証・パース失敗など）は即座に返す。
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retry = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && retry < policy.max_retries => {
                retry += 1;
                let wait = policy.backoff_for(retry);
                warn!(operation, retry, wait_ms = wait.as_millis() as u64, error = %e, "Retrying API call");
                tokio::time::sleep(wait).await;
            }
            Err(e) => return Err(e),
        }
    }
}
