//! 解析チェーン
//!
//! 検出 → カーボン情報マージ → 最終解析 の3段階。
//! 各アダプタは呼び出し開始時にデモモードを確認し、デモ時は固定データと擬似遅延を返す。

mod aggregate;
mod detection;
mod enrichment;

pub use aggregate::Aggregator;
pub use detection::VisionDetector;
pub use enrichment::CarbonPlanner;

/// 世帯人数の上限
pub const MAX_PEOPLE: u32 = 20;
