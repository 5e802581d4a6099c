use anyhow::{Context, bail};
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use smart_fridge::api::{Backend, HttpBackend};
use smart_fridge::cli::{Cli, Commands};
use smart_fridge::config::Config;
use smart_fridge::error::FridgeError;
use smart_fridge::upload::{FileBlob, MAX_FILES, UploadSummary};
use smart_fridge::workflow::{NoticeLevel, Orchestrator, WorkflowState, validate_people};
use smart_fridge::{review, scanner};
use smart_fridge_common::ResultBundle;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "smart_fridge=debug" } else { "smart_fridge=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load().context("設定の読み込みに失敗しました")?;

    match cli.command {
        Commands::Run { paths, people, demo, interactive, output } => {
            println!("🧊 smart-fridge - 冷蔵庫解析\n");
            let people = validate_people(people.unwrap_or(config.default_people))?;
            let orchestrator = Orchestrator::from_config(&config)?;
            if demo {
                orchestrator.demo().set(true);
            }
            if orchestrator.demo().is_enabled() {
                println!("(デモモード: ネットワーク呼び出しなし)\n");
            }
            run_workflow(&orchestrator, &paths, people, interactive, output).await?;
        }

        Commands::Health => {
            let backend = HttpBackend::from_config(&config)?;
            println!("バックエンド: {}", backend.base_url());
            match backend.health().await {
                Ok(true) => println!("✔ 正常"),
                Ok(false) => bail!("バックエンドが異常を返しました"),
                Err(e) => bail!("バックエンドに接続できません: {}", e),
            }
        }

        Commands::Config { set_api_url, demo, show } => {
            let mut config = config;

            if let Some(url) = set_api_url {
                config.set_api_base_url(url)?;
                println!("✔ APIベースURLを設定しました");
            }

            if let Some(toggle) = demo {
                config.set_demo_mode(toggle.enabled())?;
                println!("✔ デモモード: {}", if toggle.enabled() { "on" } else { "off" });
            }

            if show {
                println!("設定:");
                println!("  パス: {}", Config::config_path()?.display());
                println!("  APIベースURL: {}", config.api_base_url);
                println!("  バケット: {}", config.bucket);
                println!("  デモモード: {}", if config.demo_mode { "on" } else { "off" });
                println!("  世帯人数: {}", config.default_people);
                println!("  リトライ回数: {}", config.max_retries);
                match config.timeout_seconds {
                    Some(secs) => println!("  タイムアウト: {}秒", secs),
                    None => println!("  タイムアウト: なし"),
                }
            }
        }
    }

    Ok(())
}

async fn run_workflow(
    orchestrator: &Orchestrator,
    paths: &[PathBuf],
    people: u32,
    interactive: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    // 1. 画像収集
    println!("[1/4] 写真を読み込み中...");
    let images = scanner::collect_images(paths)?;
    if images.is_empty() {
        return Err(FridgeError::NoImagesFound(
            paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "),
        )
        .into());
    }
    if images.len() > MAX_FILES {
        println!("⚠ 最大{}枚まで。残り{}枚は無視します", MAX_FILES, images.len() - MAX_FILES);
    }
    let blobs = images
        .iter()
        .take(MAX_FILES)
        .map(|image| image.read_blob())
        .collect::<Result<Vec<FileBlob>, _>>()?;
    println!("✔ {}枚の写真\n", blobs.len());

    // 2. アップロード → 検出
    println!("[2/4] アップロード中...");
    orchestrator.start()?;
    let summary = upload_with_progress(orchestrator, blobs).await?;
    println!("✔ 成功 {}枚 / 失敗 {}枚\n", summary.succeeded, summary.failed);

    orchestrator
        .advance_from_upload()
        .await
        .context("在庫の検出に進めません")?;

    // 3. 在庫確認
    println!("[3/4] 在庫の確認");
    if interactive {
        if !review::run_interactive_review(orchestrator)? {
            println!("\nリセットしました");
            return Ok(());
        }
    } else {
        let state = orchestrator.snapshot();
        print_notice(&state);
        for (i, item) in state.inventory.iter().enumerate() {
            println!("  {}", review::format_item_line(i, item));
        }
        orchestrator.confirm_inventory()?;
    }
    println!();

    // 4. 解析
    println!("[4/4] 解析中... ({}人分)", people);
    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Analyzing your fridge contents...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    let result = orchestrator.submit_household(people).await;
    spinner.finish_and_clear();

    let bundle = match result {
        Ok(bundle) => bundle,
        Err(e) => {
            print_notice(&orchestrator.snapshot());
            return Err(e.into());
        }
    };
    print_notice(&orchestrator.snapshot());
    print_results(&bundle);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&bundle)?;
        std::fs::write(&path, json)
            .with_context(|| format!("結果を保存できません: {}", path.display()))?;
        println!("✔ 結果を保存: {}", path.display());
    }

    println!("\n✅ 完了");
    Ok(())
}

/// アップロードを実行し、状態の変化をプログレスバーに反映する
async fn upload_with_progress(
    orchestrator: &Orchestrator,
    blobs: Vec<FileBlob>,
) -> anyhow::Result<UploadSummary> {
    let multi = MultiProgress::new();
    let style = ProgressStyle::with_template("{prefix:>24} [{bar:30}] {pos:>3}% {msg}")?
        .progress_chars("=> ");
    let mut bars: HashMap<String, ProgressBar> = HashMap::new();
    let mut changes = orchestrator.subscribe();

    let upload = orchestrator.upload_files(blobs);
    tokio::pin!(upload);

    let summary = loop {
        tokio::select! {
            result = &mut upload => break result?,
            changed = changes.changed() => {
                if changed.is_err() {
                    break (&mut upload).await?;
                }
                let state = changes.borrow_and_update().clone();
                render_uploads(&state, &multi, &style, &mut bars);
            }
        }
    };

    render_uploads(&orchestrator.snapshot(), &multi, &style, &mut bars);
    for bar in bars.values() {
        bar.finish();
    }
    Ok(summary)
}

fn render_uploads(
    state: &WorkflowState,
    multi: &MultiProgress,
    style: &ProgressStyle,
    bars: &mut HashMap<String, ProgressBar>,
) {
    for task in &state.uploads {
        let bar = bars.entry(task.id.clone()).or_insert_with(|| {
            let bar = multi.add(ProgressBar::new(100));
            bar.set_style(style.clone());
            bar.set_prefix(task.file.file_name().to_string());
            bar
        });
        bar.set_position(u64::from(task.progress));
        if let Some(error) = &task.error {
            bar.set_message(format!("✗ {}", error));
        } else if task.is_valid() {
            bar.set_message("✔");
        }
    }
}

fn print_notice(state: &WorkflowState) {
    if let Some(notice) = &state.notice {
        match notice.level {
            NoticeLevel::Warning => println!("⚠ {}", notice.message),
            NoticeLevel::Error => println!("✗ {}", notice.message),
        }
    }
}

fn print_results(bundle: &ResultBundle) {
    println!("\n🍽 レシピ ({}件)", bundle.recipes.len());
    for recipe in &bundle.recipes {
        println!(
            "  - {} [{}] {}分 / {}人分",
            recipe.title, recipe.carbon_impact, recipe.prep_time, recipe.servings
        );
        println!("    {}", recipe.description);
    }

    if !bundle.swap_tips.is_empty() {
        println!("\n🌱 置き換えの提案");
        for tip in &bundle.swap_tips {
            println!(
                "  - {} → {} (-{:.0}%): {}",
                tip.original, tip.suggestion, tip.carbon_savings, tip.reason
            );
        }
    }

    println!(
        "\n合計カーボンインパクト: {:.1} kg CO₂e (解析 {:.1}秒)",
        bundle.total_carbon_impact, bundle.analysis_time
    );
}
