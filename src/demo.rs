//! デモモード制御
//!
//! 4つのネットワーク境界（アップロード先取得・検出・カーボン情報・解析）が
//! 呼び出し開始時にそれぞれ独立してフラグを読む。実行中の処理は開始時のモードで完了する。

use chrono::Utc;
use smart_fridge_common::UploadTarget;
use smart_fridge_common::demo::DEMO_URL_MARKER;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

/// 擬似アップロード時間
pub const DEMO_UPLOAD_DELAY: Duration = Duration::from_millis(1000);
/// 擬似検出時間
pub const DEMO_DETECT_DELAY: Duration = Duration::from_millis(1500);
/// 擬似カーボン情報取得時間
pub const DEMO_PLAN_DELAY: Duration = Duration::from_millis(500);
/// 擬似解析時間（本番の体感待ち時間に合わせる）
pub const DEMO_ANALYZE_DELAY: Duration = Duration::from_millis(2000);

/// プロセス全体で共有するデモモードフラグ
///
/// clone したハンドルはすべて同じフラグを参照する。
#[derive(Debug, Clone, Default)]
pub struct DemoMode {
    enabled: Arc<AtomicBool>,
}

impl DemoMode {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            info!(enabled, "Demo mode toggled");
        }
    }

    /// 切り替え後の値を返す
    pub fn toggle(&self) -> bool {
        let enabled = !self.enabled.fetch_xor(true, Ordering::SeqCst);
        info!(enabled, "Demo mode toggled");
        enabled
    }
}

/// ネットワーク遅延を模擬
pub async fn simulate_latency(delay: Duration) {
    tokio::time::sleep(delay).await;
}

/// デモ用のアップロード先を生成（実際の転送は行わない）
///
/// キーにアップロードIDを含めるため、同名ファイルを同時に送っても重複しない。
pub fn demo_upload_target(upload_id: &str, file_name: &str) -> UploadTarget {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let key = format!("demo/uploads/{}_{}_{}", timestamp, upload_id, file_name);
    UploadTarget {
        upload_url: format!("https://demo.invalid/{}?{}", key, DEMO_URL_MARKER),
        key,
        expires_in: 3600,
    }
}
