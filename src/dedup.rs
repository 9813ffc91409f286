use std::collections::HashSet;

use tracing::debug;

use crate::models::{NewTransaction, Transaction};

/// `(transaction_date, description, amount)`: identifies a statement line
/// regardless of its store id. Amounts compare by exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub transaction_date: String,
    pub description: String,
    amount_bits: u64,
}

impl NaturalKey {
    pub fn new(transaction_date: &str, description: &str, amount: f64) -> Self {
        // -0.0 and 0.0 are the same amount
        let amount = if amount == 0.0 { 0.0 } else { amount };
        Self {
            transaction_date: transaction_date.to_string(),
            description: description.to_string(),
            amount_bits: amount.to_bits(),
        }
    }

    pub fn amount(&self) -> f64 {
        f64::from_bits(self.amount_bits)
    }
}

impl From<&NewTransaction> for NaturalKey {
    fn from(txn: &NewTransaction) -> Self {
        Self::new(&txn.transaction_date, &txn.description, txn.amount)
    }
}

impl From<&Transaction> for NaturalKey {
    fn from(txn: &Transaction) -> Self {
        Self::new(&txn.transaction_date, &txn.description, txn.amount)
    }
}

#[derive(Debug, Default)]
pub struct BatchDedupe {
    pub rows: Vec<NewTransaction>,
    pub duplicates: usize,
}

/// Collapse a batch to one row per natural key. The first occurrence wins
/// and input order is kept.
pub fn dedupe_batch<I>(rows: I) -> BatchDedupe
where
    I: IntoIterator<Item = NewTransaction>,
{
    let mut seen: HashSet<NaturalKey> = HashSet::new();
    let mut result = BatchDedupe::default();
    for row in rows {
        if seen.insert(NaturalKey::from(&row)) {
            result.rows.push(row);
        } else {
            debug!(
                date = %row.transaction_date,
                description = %row.description,
                amount = row.amount,
                "duplicate row in batch"
            );
            result.duplicates += 1;
        }
    }
    result
}
