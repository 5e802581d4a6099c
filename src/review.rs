//! 対話式の在庫確認
//!
//! 検出結果を一覧表示し、追加・編集・削除を受け付ける。
//! 変更はすべて `Orchestrator` 経由で適用する。

use crate::error::{FridgeError, Result};
use crate::workflow::Orchestrator;
use dialoguer::Input;
use smart_fridge_common::{CarbonImpact, InventoryItem, ItemDraft};

/// 在庫確認の操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    /// 品目を追加
    Add,
    /// n番目（0始まり）を編集
    Edit(usize),
    /// n番目（0始まり）を削除
    Remove(usize),
    /// 確定して次へ
    Continue,
    /// 最初からやり直す
    Reset,
    /// 解釈できない入力
    Unknown(String),
}

/// 入力を操作に変換（番号は1始まりで受け付ける）
pub fn parse_review_command(input: &str, item_count: usize) -> ReviewCommand {
    let trimmed = input.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };

    let index = || {
        rest.parse::<usize>()
            .ok()
            .filter(|n| (1..=item_count).contains(n))
            .map(|n| n - 1)
    };

    match head {
        "" | "c" | "continue" => ReviewCommand::Continue,
        "a" | "add" => ReviewCommand::Add,
        "e" | "edit" => match index() {
            Some(i) => ReviewCommand::Edit(i),
            None => ReviewCommand::Unknown(trimmed.to_string()),
        },
        "d" | "rm" | "remove" => match index() {
            Some(i) => ReviewCommand::Remove(i),
            None => ReviewCommand::Unknown(trimmed.to_string()),
        },
        "reset" => ReviewCommand::Reset,
        _ => ReviewCommand::Unknown(trimmed.to_string()),
    }
}

/// 一覧表示用の1行
pub fn format_item_line(index: usize, item: &InventoryItem) -> String {
    let origin = if item.is_user_authored() {
        "added".to_string()
    } else {
        format!("{:.0}%", item.confidence * 100.0)
    };
    format!(
        "{:>2}. {} ({}) - {} [{}] {}",
        index + 1,
        item.name,
        item.quantity,
        item.category,
        item.carbon_impact,
        origin
    )
}

fn print_inventory(items: &[InventoryItem]) {
    if items.is_empty() {
        println!("  (在庫なし)");
        return;
    }
    for (i, item) in items.iter().enumerate() {
        println!("  {}", format_item_line(i, item));
    }
}

/// 対話式で在庫を確認する
///
/// 確定したら `true`、リセットを選んだら `false` を返す。
pub fn run_interactive_review(orchestrator: &Orchestrator) -> Result<bool> {
    println!("操作: [Enter/c]確定 [a]追加 [e N]編集 [d N]削除 [reset]やり直し");
    println!("---");

    loop {
        let state = orchestrator.snapshot();
        if let Some(notice) = &state.notice {
            println!("⚠ {}", notice.message);
        }
        print_inventory(&state.inventory);

        let input: String = Input::new()
            .with_prompt("在庫")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| FridgeError::Prompt(e.to_string()))?;

        match parse_review_command(&input, state.inventory.len()) {
            ReviewCommand::Continue => {
                orchestrator.confirm_inventory()?;
                return Ok(true);
            }
            ReviewCommand::Reset => {
                orchestrator.reset();
                return Ok(false);
            }
            ReviewCommand::Add => {
                let draft = prompt_draft(None)?;
                match orchestrator.add_item(&draft) {
                    Ok(_) => println!("  → 追加しました\n"),
                    Err(e) => println!("  → {}\n", e),
                }
            }
            ReviewCommand::Edit(i) => {
                let item = &state.inventory[i];
                let draft = prompt_draft(Some(item))?;
                match orchestrator.update_item(&item.id, draft) {
                    Ok(()) => println!("  → 更新しました\n"),
                    Err(e) => println!("  → {}\n", e),
                }
            }
            ReviewCommand::Remove(i) => {
                let item = &state.inventory[i];
                orchestrator.remove_item(&item.id)?;
                println!("  → {} を削除しました\n", item.name);
            }
            ReviewCommand::Unknown(input) => {
                println!("  → 不明な操作: {}\n", input);
            }
        }
    }
}

/// 品目の入力（編集時は現在値を初期値にする）
fn prompt_draft(current: Option<&InventoryItem>) -> Result<ItemDraft> {
    let text = |prompt: &str, initial: Option<&str>| -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(initial) = initial {
            input = input.with_initial_text(initial);
        }
        input
            .interact_text()
            .map_err(|e| FridgeError::Prompt(e.to_string()))
    };

    let name = text("  名前", current.map(|i| i.name.as_str()))?;
    let category = text("  カテゴリ", current.map(|i| i.category.as_str()))?;
    let quantity = text("  数量", current.map(|i| i.quantity.as_str()))?;
    let impact = text(
        "  インパクト (low/medium/high)",
        Some(current.map(|i| i.carbon_impact).unwrap_or_default().as_str()),
    )?;
    let carbon_impact = impact.parse::<CarbonImpact>().unwrap_or_default();

    Ok(ItemDraft::new(name, category, quantity, carbon_impact))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_review_command() {
        assert_eq!(parse_review_command("", 2), ReviewCommand::Continue);
        assert_eq!(parse_review_command(" c ", 2), ReviewCommand::Continue);
        assert_eq!(parse_review_command("a", 2), ReviewCommand::Add);
        assert_eq!(parse_review_command("e 2", 2), ReviewCommand::Edit(1));
        assert_eq!(parse_review_command("d 1", 2), ReviewCommand::Remove(0));
        assert_eq!(parse_review_command("reset", 2), ReviewCommand::Reset);
    }

    #[test]
    fn test_parse_review_command_out_of_range() {
        assert_eq!(
            parse_review_command("e 3", 2),
            ReviewCommand::Unknown("e 3".into())
        );
        assert_eq!(
            parse_review_command("d 0", 2),
            ReviewCommand::Unknown("d 0".into())
        );
        assert_eq!(parse_review_command("x", 0), ReviewCommand::Unknown("x".into()));
    }

    #[test]
    fn test_format_item_line() {
        let item = InventoryItem {
            id: "egg-1".into(),
            name: "egg".into(),
            category: "Dairy & Eggs".into(),
            quantity: "4 items".into(),
            carbon_impact: CarbonImpact::Medium,
            confidence: 0.98,
        };
        assert_eq!(
            format_item_line(0, &item),
            " 1. egg (4 items) - Dairy & Eggs [medium] 98%"
        );
        let added = InventoryItem { confidence: 1.0, ..item };
        assert!(format_item_line(1, &added).ends_with("added"));
    }
}
