use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Result, SiftError};
use crate::models::{Rule, RulePatch};
use crate::store::TransactionStore;

/// Case-insensitive substring match of `keyword` in `description`.
pub fn matches(description: &str, keyword: &str) -> bool {
    !keyword.is_empty() && description.to_lowercase().contains(&keyword.to_lowercase())
}

/// Rejects blank values. Keywords are kept as typed so surrounding spaces
/// can act as a word boundary; categories are trimmed labels.
fn required(field: &str, value: &str, trim: bool) -> Result<String> {
    if value.trim().is_empty() {
        return Err(SiftError::InvalidRule(format!("{field} must not be empty")));
    }
    Ok(if trim { value.trim() } else { value }.to_string())
}

// ---------------------------------------------------------------------------
// Rule store
// ---------------------------------------------------------------------------

/// Keyword rules, kept in insertion order.
pub struct RuleStore<'a> {
    conn: &'a Connection,
}

impl<'a> RuleStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn add(&self, keyword: &str, category: &str) -> Result<Rule> {
        let keyword = required("keyword", keyword, false)?;
        let category = required("category", category, true)?;
        self.conn.execute(
            "INSERT INTO rules (keyword, category) VALUES (?1, ?2)",
            params![keyword, category],
        )?;
        Ok(Rule {
            id: self.conn.last_insert_rowid(),
            keyword,
            category,
        })
    }

    pub fn get(&self, id: i64) -> Result<Rule> {
        self.conn
            .query_row(
                "SELECT id, keyword, category FROM rules WHERE id = ?1",
                [id],
                |row| {
                    Ok(Rule {
                        id: row.get(0)?,
                        keyword: row.get(1)?,
                        category: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or(SiftError::NotFound { entity: "rule", id })
    }

    /// All rules in storage order, which is the order they are applied in.
    pub fn list(&self) -> Result<Vec<Rule>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, keyword, category FROM rules ORDER BY id")?;
        let rules = stmt
            .query_map([], |row| {
                Ok(Rule {
                    id: row.get(0)?,
                    keyword: row.get(1)?,
                    category: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rules)
    }

    pub fn update(&self, id: i64, patch: &RulePatch) -> Result<Rule> {
        let mut rule = self.get(id)?;
        if let Some(keyword) = &patch.keyword {
            rule.keyword = required("keyword", keyword, false)?;
        }
        if let Some(category) = &patch.category {
            rule.category = required("category", category, true)?;
        }
        self.conn.execute(
            "UPDATE rules SET keyword = ?1, category = ?2 WHERE id = ?3",
            params![rule.keyword, rule.category, id],
        )?;
        Ok(rule)
    }

    pub fn delete(&self, id: i64) -> Result<Rule> {
        let rule = self.get(id)?;
        self.conn.execute("DELETE FROM rules WHERE id = ?1", [id])?;
        Ok(rule)
    }

    pub fn delete_all(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM rules", [])?)
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self.conn.query_row("SELECT count(*) FROM rules", [], |r| r.get(0))?)
    }

    /// Distinct target categories referenced by rules.
    pub fn categories(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM rules ORDER BY category")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Rule engine
// ---------------------------------------------------------------------------

/// Set `rule.category` on every stored transaction whose description
/// contains the keyword. Returns the number of matching transactions.
pub fn apply_rule(conn: &Connection, rule: &Rule) -> Result<usize> {
    let mut txn_stmt = conn.prepare_cached("SELECT id, description FROM transactions")?;
    let candidates: Vec<(i64, String)> = txn_stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut update = conn.prepare_cached("UPDATE transactions SET category = ?1 WHERE id = ?2")?;
    let mut matched = 0usize;
    for (txn_id, description) in &candidates {
        if matches(description, &rule.keyword) {
            update.execute(params![rule.category, txn_id])?;
            matched += 1;
        }
    }
    debug!(rule_id = rule.id, keyword = %rule.keyword, matched, "applied rule");
    Ok(matched)
}

pub fn apply_rule_by_id(conn: &Connection, id: i64) -> Result<usize> {
    let rule = RuleStore::new(conn).get(id)?;
    apply_rule(conn, &rule)
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ApplyResult {
    pub rules: usize,
    /// Sum of per-rule matches; a transaction hit by two rules counts twice.
    pub matches: usize,
}

/// Apply every rule in storage order. A transaction matched by several
/// rules ends up with the category of the last one.
pub fn apply_all_rules(conn: &Connection) -> Result<ApplyResult> {
    let rules = RuleStore::new(conn).list()?;
    let mut result = ApplyResult::default();
    for rule in &rules {
        result.matches += apply_rule(conn, rule)?;
        result.rules += 1;
    }
    info!(rules = result.rules, matches = result.matches, "applied all rules");
    Ok(result)
}

// ---------------------------------------------------------------------------
// Manual reclassification
// ---------------------------------------------------------------------------

/// A rule suggested after a manual category change. Nothing is stored
/// until it is passed to [`propose_rule`].
#[derive(Debug, Clone, PartialEq)]
pub struct RuleProposal {
    pub keyword: String,
    pub category: String,
}

/// Set a transaction's category and suggest a rule keyed on its full
/// description. No suggestion when the category is cleared or an identical
/// rule already exists.
pub fn reclassify(conn: &Connection, txn_id: i64, category: &str) -> Result<Option<RuleProposal>> {
    let store = TransactionStore::new(conn);
    let txn = store.get(txn_id)?;
    let category = category.trim();
    store.update_category(txn_id, category)?;

    if category.is_empty() {
        return Ok(None);
    }
    let known = RuleStore::new(conn).list()?.into_iter().any(|r| {
        r.keyword.to_lowercase() == txn.description.to_lowercase() && r.category == category
    });
    if known {
        return Ok(None);
    }
    Ok(Some(RuleProposal {
        keyword: txn.description,
        category: category.to_string(),
    }))
}

/// Persist an accepted proposal. Applying it to existing transactions is a
/// separate step: [`apply_rule_by_id`].
pub fn propose_rule(conn: &Connection, proposal: &RuleProposal) -> Result<i64> {
    let rule = RuleStore::new(conn).add(&proposal.keyword, &proposal.category)?;
    info!(rule_id = rule.id, keyword = %rule.keyword, category = %rule.category, "created rule");
    Ok(rule.id)
}
