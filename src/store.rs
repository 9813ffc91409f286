use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::dedup::NaturalKey;
use crate::error::{Result, SiftError};
use crate::models::{NewTransaction, Transaction};

const SELECT_COLUMNS: &str =
    "SELECT id, transaction_date, post_date, description, category, type, amount, memo FROM transactions";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        transaction_date: row.get(1)?,
        post_date: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        txn_type: row.get(5)?,
        amount: row.get(6)?,
        memo: row.get(7)?,
    })
}

/// Persistent transactions. At most one row per natural key as long as all
/// writes go through [`crate::importer`].
pub struct TransactionStore<'a> {
    conn: &'a Connection,
}

impl<'a> TransactionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn exists(&self, key: &NaturalKey) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT 1 FROM transactions WHERE transaction_date = ?1 AND description = ?2 AND amount = ?3",
        )?;
        Ok(stmt.exists(params![key.transaction_date, key.description, key.amount()])?)
    }

    pub fn insert(&self, txn: &NewTransaction) -> Result<i64> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO transactions (transaction_date, post_date, description, category, type, amount, memo) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        stmt.execute(params![
            txn.transaction_date,
            txn.post_date,
            txn.description,
            txn.category,
            txn.txn_type,
            txn.amount,
            txn.memo,
        ])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get(&self, id: i64) -> Result<Transaction> {
        self.conn
            .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id], from_row)
            .optional()?
            .ok_or(SiftError::NotFound { entity: "transaction", id })
    }

    /// Every stored transaction. Callers sort for display.
    pub fn list_all(&self) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(SELECT_COLUMNS)?;
        let rows = stmt
            .query_map([], from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn update_category(&self, id: i64, category: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE transactions SET category = ?1 WHERE id = ?2",
            params![category, id],
        )?;
        if changed == 0 {
            return Err(SiftError::NotFound { entity: "transaction", id });
        }
        Ok(())
    }

    pub fn update_memo(&self, id: i64, memo: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE transactions SET memo = ?1 WHERE id = ?2",
            params![memo, id],
        )?;
        if changed == 0 {
            return Err(SiftError::NotFound { entity: "transaction", id });
        }
        Ok(())
    }

    /// Remove every transaction. Irreversible; confirmation is the caller's job.
    pub fn delete_all(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM transactions", [])?)
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?)
    }

    /// Distinct non-empty category labels currently on transactions.
    pub fn categories(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT category FROM transactions WHERE category <> '' ORDER BY category",
        )?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    fn candidate(date: &str, desc: &str, amount: f64) -> NewTransaction {
        NewTransaction {
            transaction_date: date.to_string(),
            description: desc.to_string(),
            amount,
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_and_get() {
        let (_dir, conn) = test_db();
        let store = TransactionStore::new(&conn);
        let mut txn = candidate("2025-01-15", "ADOBE CREATIVE", -50.0);
        txn.post_date = "2025-01-16".to_string();
        txn.txn_type = "Sale".to_string();
        let id = store.insert(&txn).unwrap();
        let stored = store.get(id).unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.description, "ADOBE CREATIVE");
        assert_eq!(stored.post_date, "2025-01-16");
        assert_eq!(stored.txn_type, "Sale");
        assert_eq!(stored.amount, -50.0);
        assert_eq!(stored.category, "");
    }

    #[test]
    fn test_ids_are_unique() {
        let (_dir, conn) = test_db();
        let store = TransactionStore::new(&conn);
        let a = store.insert(&candidate("d1", "a", 1.0)).unwrap();
        let b = store.insert(&candidate("d2", "b", 2.0)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_exists_uses_natural_key() {
        let (_dir, conn) = test_db();
        let store = TransactionStore::new(&conn);
        let txn = candidate("2025-01-15", "ADOBE", -50.0);
        assert!(!store.exists(&NaturalKey::from(&txn)).unwrap());
        let id = store.insert(&txn).unwrap();
        assert!(store.exists(&NaturalKey::from(&txn)).unwrap());
        assert!(store.exists(&NaturalKey::from(&store.get(id).unwrap())).unwrap());
        assert!(!store.exists(&NaturalKey::new("2025-01-15", "ADOBE", -50.01)).unwrap());
        assert!(!store.exists(&NaturalKey::new("2025-01-15", "adobe", -50.0)).unwrap());
    }

    #[test]
    fn test_update_category_and_memo() {
        let (_dir, conn) = test_db();
        let store = TransactionStore::new(&conn);
        let id = store.insert(&candidate("d1", "GROCER", -20.0)).unwrap();
        store.update_category(id, "Groceries").unwrap();
        store.update_memo(id, "split with Sam").unwrap();
        let txn = store.get(id).unwrap();
        assert_eq!(txn.category, "Groceries");
        assert_eq!(txn.memo, "split with Sam");
    }

    #[test]
    fn test_updates_on_missing_id_are_not_found() {
        let (_dir, conn) = test_db();
        let store = TransactionStore::new(&conn);
        assert!(matches!(
            store.update_category(99, "X"),
            Err(SiftError::NotFound { id: 99, .. })
        ));
        assert!(matches!(
            store.update_memo(99, "x"),
            Err(SiftError::NotFound { id: 99, .. })
        ));
        assert!(matches!(store.get(99), Err(SiftError::NotFound { .. })));
    }

    #[test]
    fn test_delete_all() {
        let (_dir, conn) = test_db();
        let store = TransactionStore::new(&conn);
        store.insert(&candidate("d1", "a", 1.0)).unwrap();
        store.insert(&candidate("d2", "b", 2.0)).unwrap();
        assert_eq!(store.delete_all().unwrap(), 2);
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_categories_are_distinct_and_non_empty() {
        let (_dir, conn) = test_db();
        let store = TransactionStore::new(&conn);
        let a = store.insert(&candidate("d1", "a", 1.0)).unwrap();
        let b = store.insert(&candidate("d2", "b", 2.0)).unwrap();
        store.insert(&candidate("d3", "c", 3.0)).unwrap();
        store.update_category(a, "Food").unwrap();
        store.update_category(b, "Food").unwrap();
        assert_eq!(store.categories().unwrap(), vec!["Food".to_string()]);
    }
}
