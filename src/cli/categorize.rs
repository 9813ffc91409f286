use colored::Colorize;

use crate::cli::{confirm, Context};
use crate::error::Result;
use crate::rules::{apply_rule_by_id, propose_rule, reclassify};

pub struct RuleChoice {
    /// `Some` answers the "create rule?" question without prompting.
    pub create: Option<bool>,
    pub apply: bool,
}

pub fn run(ctx: &Context, id: i64, category: &str, choice: RuleChoice) -> Result<()> {
    let conn = ctx.open_db()?;
    let proposal = reclassify(&conn, id, category)?;
    if category.trim().is_empty() {
        println!("Cleared category on transaction {id}");
    } else {
        println!("{}", format!("\u{2192} Transaction {id} categorized as {}", category.trim()).green());
    }

    let Some(proposal) = proposal else {
        return Ok(());
    };

    let create = choice.create.unwrap_or_else(|| {
        confirm(&format!(
            "Create rule '{}' \u{2192} {} for future matches?",
            proposal.keyword, proposal.category
        ))
    });
    if !create {
        return Ok(());
    }

    let rule_id = propose_rule(&conn, &proposal)?;
    println!("Added rule {rule_id}: '{}' \u{2192} {}", proposal.keyword, proposal.category);

    if choice.apply || confirm("Apply it to all existing transactions?") {
        let matched = apply_rule_by_id(&conn, rule_id)?;
        println!("{matched} transactions now categorized as {}", proposal.category);
    }
    Ok(())
}
