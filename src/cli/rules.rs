use comfy_table::{Cell, Table};

use crate::cli::{confirm, Context};
use crate::error::Result;
use crate::models::RulePatch;
use crate::rules::{apply_all_rules, apply_rule, apply_rule_by_id, RuleStore};

pub fn add(ctx: &Context, keyword: &str, category: &str, apply: bool) -> Result<()> {
    let conn = ctx.open_db()?;
    let rule = RuleStore::new(&conn).add(keyword, category)?;
    println!("Added rule {}: '{}' \u{2192} {}", rule.id, rule.keyword, rule.category);
    if apply {
        let matched = apply_rule(&conn, &rule)?;
        println!("{matched} transactions matched");
    }
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let conn = ctx.open_db()?;
    let rules = RuleStore::new(&conn).list()?;
    if rules.is_empty() {
        println!("No rules yet. Add one with `sift rules add <keyword> --category <name>`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Keyword", "Category"]);
    for rule in rules {
        table.add_row(vec![
            Cell::new(rule.id),
            Cell::new(rule.keyword),
            Cell::new(rule.category),
        ]);
    }
    println!("Rules (applied top to bottom, last match wins)\n{table}");
    Ok(())
}

pub fn update(ctx: &Context, id: i64, keyword: Option<String>, category: Option<String>) -> Result<()> {
    let conn = ctx.open_db()?;
    let rule = RuleStore::new(&conn).update(id, &RulePatch { keyword, category })?;
    println!("Updated rule {id}: '{}' \u{2192} {}", rule.keyword, rule.category);
    Ok(())
}

pub fn delete(ctx: &Context, id: i64) -> Result<()> {
    let conn = ctx.open_db()?;
    let rule = RuleStore::new(&conn).delete(id)?;
    println!("Deleted rule {id}: '{}' \u{2192} {}", rule.keyword, rule.category);
    Ok(())
}

pub fn apply(ctx: &Context, id: i64) -> Result<()> {
    let conn = ctx.open_db()?;
    let matched = apply_rule_by_id(&conn, id)?;
    println!("Rule {id} matched {matched} transactions");
    Ok(())
}

pub fn apply_all(ctx: &Context) -> Result<()> {
    let conn = ctx.open_db()?;
    let result = apply_all_rules(&conn)?;
    println!("Applied {} rules ({} matches)", result.rules, result.matches);
    Ok(())
}

pub fn clear(ctx: &Context, yes: bool) -> Result<()> {
    let conn = ctx.open_db()?;
    let rules = RuleStore::new(&conn);
    let count = rules.count()?;
    if count == 0 {
        println!("No rules to delete.");
        return Ok(());
    }
    if !yes && !confirm(&format!("Delete all {count} rules?")) {
        println!("Cancelled.");
        return Ok(());
    }
    let deleted = rules.delete_all()?;
    println!("Deleted {deleted} rules");
    Ok(())
}
