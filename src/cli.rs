use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "smart-fridge")]
#[command(about = "冷蔵庫の写真から在庫を検出し、低炭素レシピを提案するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真をアップロードして解析まで実行
    Run {
        /// 画像ファイルまたはフォルダ（最大5枚）
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// 世帯人数（1〜20、省略時は設定値）
        #[arg(short, long)]
        people: Option<u32>,

        /// デモモードで実行（ネットワーク呼び出しなし）
        #[arg(long)]
        demo: bool,

        /// 在庫を対話的に確認・編集
        #[arg(short, long)]
        interactive: bool,

        /// 結果JSONの出力先
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// バックエンドの疎通確認
    Health,

    /// 設定を表示/編集
    Config {
        /// APIベースURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// デモモードを設定 (on/off)
        #[arg(long)]
        demo: Option<Toggle>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// on/off 指定
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(&self) -> bool {
        matches!(self, Toggle::On)
    }
}

impl std::str::FromStr for Toggle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" | "true" | "1" | "yes" => Ok(Toggle::On),
            "off" | "false" | "0" | "no" => Ok(Toggle::Off),
            _ => Err(format!("Unknown value: {}. Use on or off", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "smart-fridge", "run", "a.jpg", "b.png", "--people", "3", "--demo", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run { paths, people, demo, interactive, output } => {
                assert_eq!(paths.len(), 2);
                assert_eq!(people, Some(3));
                assert!(demo);
                assert!(!interactive);
                assert!(output.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_requires_paths() {
        assert!(Cli::try_parse_from(["smart-fridge", "run"]).is_err());
    }

    #[test]
    fn test_toggle() {
        assert_eq!("ON".parse::<Toggle>(), Ok(Toggle::On));
        assert_eq!("off".parse::<Toggle>(), Ok(Toggle::Off));
        assert!("maybe".parse::<Toggle>().is_err());
    }
}
