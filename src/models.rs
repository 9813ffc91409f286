/// A persisted statement line.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub transaction_date: String,
    pub post_date: String,
    pub description: String,
    pub category: String,
    /// The statement's "Type" column; informational only.
    pub txn_type: String,
    pub amount: f64,
    pub memo: String,
}

/// Canonical record produced by the normalizer, not yet stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewTransaction {
    pub transaction_date: String,
    pub post_date: String,
    pub description: String,
    pub category: String,
    pub txn_type: String,
    pub amount: f64,
    pub memo: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: i64,
    pub keyword: String,
    pub category: String,
}

/// Partial edit for a rule; `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct RulePatch {
    pub keyword: Option<String>,
    pub category: Option<String>,
}
