use std::cmp::Ordering;

use chrono::NaiveDate;
use clap::ValueEnum;

use crate::error::Result;
use crate::models::Transaction;
use crate::settings::{SettingsStore, SORT_COLUMN, SORT_DESCENDING};

// Two-digit years first: `%Y` would happily read "25" as year 25.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortColumn {
    #[value(name = "transaction_date", alias = "date")]
    TransactionDate,
    #[value(name = "post_date")]
    PostDate,
    Description,
    Category,
    #[value(name = "type")]
    Type,
    Amount,
    Memo,
}

impl SortColumn {
    pub fn key(&self) -> &'static str {
        match self {
            Self::TransactionDate => "transaction_date",
            Self::PostDate => "post_date",
            Self::Description => "description",
            Self::Category => "category",
            Self::Type => "type",
            Self::Amount => "amount",
            Self::Memo => "memo",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::value_variants()
            .iter()
            .find(|c| c.key() == key)
            .copied()
    }

    fn text<'a>(&self, txn: &'a Transaction) -> &'a str {
        match self {
            Self::TransactionDate => &txn.transaction_date,
            Self::PostDate => &txn.post_date,
            Self::Description => &txn.description,
            Self::Category => &txn.category,
            Self::Type => &txn.txn_type,
            Self::Memo => &txn.memo,
            Self::Amount => "",
        }
    }
}

/// Dates in any of the statement formats we see; `None` sorts first.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn compare(a: &Transaction, b: &Transaction, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Amount => a.amount.total_cmp(&b.amount),
        SortColumn::TransactionDate => {
            parse_date(&a.transaction_date).cmp(&parse_date(&b.transaction_date))
        }
        SortColumn::PostDate => parse_date(&a.post_date).cmp(&parse_date(&b.post_date)),
        other => other.text(a).cmp(other.text(b)),
    }
}

/// Ordered view of `transactions`; the input is left untouched.
pub fn sort_transactions(
    transactions: &[Transaction],
    column: SortColumn,
    descending: bool,
) -> Vec<&Transaction> {
    let mut view: Vec<&Transaction> = transactions.iter().collect();
    if descending {
        view.sort_by(|a, b| compare(b, a, column));
    } else {
        view.sort_by(|a, b| compare(a, b, column));
    }
    view
}

/// Which column the view is sorted by, toggled by header selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub descending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::TransactionDate,
            descending: true,
        }
    }
}

impl SortState {
    /// Reselecting the current column flips direction. A new column starts
    /// descending for the transaction date and ascending otherwise.
    pub fn select(&mut self, column: SortColumn) {
        if column == self.column {
            self.descending = !self.descending;
        } else {
            self.column = column;
            self.descending = column == SortColumn::TransactionDate;
        }
    }

    pub fn load(settings: &dyn SettingsStore) -> Self {
        let default = Self::default();
        let column = settings
            .get(SORT_COLUMN)
            .and_then(|key| SortColumn::from_key(&key))
            .unwrap_or(default.column);
        let descending = settings
            .get(SORT_DESCENDING)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.descending);
        Self { column, descending }
    }

    pub fn save(&self, settings: &mut dyn SettingsStore) -> Result<()> {
        settings.set(SORT_COLUMN, self.column.key())?;
        settings.set(SORT_DESCENDING, &self.descending.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn txn(id: i64, date: &str, desc: &str, amount: f64) -> Transaction {
        Transaction {
            id,
            transaction_date: date.to_string(),
            post_date: String::new(),
            description: desc.to_string(),
            category: String::new(),
            txn_type: String::new(),
            amount,
            memo: String::new(),
        }
    }

    fn amounts(view: &[&Transaction]) -> Vec<f64> {
        view.iter().map(|t| t.amount).collect()
    }

    #[test]
    fn test_amount_sorts_numerically() {
        let txns = vec![txn(1, "", "a", 5.0), txn(2, "", "b", -2.0), txn(3, "", "c", 100.0)];
        assert_eq!(amounts(&sort_transactions(&txns, SortColumn::Amount, false)), vec![-2.0, 5.0, 100.0]);
        assert_eq!(amounts(&sort_transactions(&txns, SortColumn::Amount, true)), vec![100.0, 5.0, -2.0]);
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let txns = vec![txn(1, "", "b", 2.0), txn(2, "", "a", 1.0)];
        let before = txns.clone();
        sort_transactions(&txns, SortColumn::Description, false);
        assert_eq!(txns, before);
    }

    #[test]
    fn test_dates_compare_as_dates() {
        let txns = vec![
            txn(1, "12/01/2024", "a", 0.0),
            txn(2, "01/15/2025", "b", 0.0),
            txn(3, "02/03/2024", "c", 0.0),
        ];
        let view = sort_transactions(&txns, SortColumn::TransactionDate, false);
        let ids: Vec<_> = view.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_unparseable_dates_sort_first() {
        let txns = vec![
            txn(1, "2025-01-15", "a", 0.0),
            txn(2, "pending", "b", 0.0),
            txn(3, "2024-06-01", "c", 0.0),
        ];
        let asc: Vec<_> = sort_transactions(&txns, SortColumn::TransactionDate, false)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(asc, vec![2, 3, 1]);
        let desc: Vec<_> = sort_transactions(&txns, SortColumn::TransactionDate, true)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(desc, vec![1, 3, 2]);
    }

    #[test]
    fn test_empty_post_date_is_minimum() {
        let mut a = txn(1, "", "a", 0.0);
        a.post_date = "2025-01-02".to_string();
        let b = txn(2, "", "b", 0.0);
        let both = [a, b];
        let view = sort_transactions(&both, SortColumn::PostDate, false);
        assert_eq!(view[0].id, 2);
    }

    #[test]
    fn test_text_columns_are_case_sensitive() {
        let txns = vec![txn(1, "", "apple", 0.0), txn(2, "", "Banana", 0.0), txn(3, "", "", 0.0)];
        let view = sort_transactions(&txns, SortColumn::Description, false);
        let descs: Vec<_> = view.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descs, vec!["", "Banana", "apple"]);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 15);
        assert_eq!(parse_date("2025-01-15"), expected);
        assert_eq!(parse_date("01/15/2025"), expected);
        assert_eq!(parse_date("1/15/25"), expected);
        assert_eq!(parse_date("2025/01/15"), expected);
        assert_eq!(parse_date("15th Jan"), None);
    }

    #[test]
    fn test_sort_state_machine() {
        let mut state = SortState::default();
        assert_eq!(state, SortState { column: SortColumn::TransactionDate, descending: true });

        state.select(SortColumn::TransactionDate);
        assert!(!state.descending);

        state.select(SortColumn::Amount);
        assert_eq!(state, SortState { column: SortColumn::Amount, descending: false });
        state.select(SortColumn::Amount);
        assert!(state.descending);

        state.select(SortColumn::TransactionDate);
        assert_eq!(state, SortState { column: SortColumn::TransactionDate, descending: true });
    }

    #[test]
    fn test_sort_state_persists_in_settings() {
        let mut settings = Settings::default();
        let mut state = SortState::load(&settings);
        state.select(SortColumn::Category);
        state.save(&mut settings).unwrap();
        assert_eq!(
            SortState::load(&settings),
            SortState { column: SortColumn::Category, descending: false }
        );
    }

    #[test]
    fn test_column_keys_round_trip() {
        for column in SortColumn::value_variants() {
            assert_eq!(SortColumn::from_key(column.key()), Some(*column));
        }
        assert_eq!(SortColumn::from_key("balance"), None);
    }
}
