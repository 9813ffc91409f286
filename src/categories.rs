use rusqlite::Connection;

use crate::error::{Result, SiftError};
use crate::rules::RuleStore;
use crate::settings::{SettingsStore, CATEGORIES};
use crate::store::TransactionStore;

/// Category labels, deduplicated case-insensitively. The first spelling
/// inserted is the one kept.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CategorySet {
    labels: Vec<String>,
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of labels on transactions, labels on rules and the explicitly
    /// added labels cached in settings.
    pub fn derive(conn: &Connection, settings: &dyn SettingsStore) -> Result<Self> {
        let mut set = Self::new();
        set.extend(TransactionStore::new(conn).categories()?);
        set.extend(RuleStore::new(conn).categories()?);
        set.extend(explicit_categories(settings)?);
        Ok(set)
    }

    /// Returns false when the label is blank or already present.
    pub fn insert(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.contains(label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }

    pub fn extend<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for label in labels {
            self.insert(label.as_ref());
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        let wanted = label.trim().to_lowercase();
        self.labels.iter().any(|l| l.to_lowercase() == wanted)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

pub fn explicit_categories(settings: &dyn SettingsStore) -> Result<Vec<String>> {
    match settings.get(CATEGORIES) {
        Some(raw) if !raw.is_empty() => serde_json::from_str(&raw)
            .map_err(|e| SiftError::Settings(format!("{CATEGORIES}: {e}"))),
        _ => Ok(Vec::new()),
    }
}

/// Remember a label even if nothing uses it yet. Returns false when it was
/// blank or already cached.
pub fn add_category(settings: &mut dyn SettingsStore, label: &str) -> Result<bool> {
    let mut cached = CategorySet::new();
    cached.extend(explicit_categories(settings)?);
    if !cached.insert(label) {
        return Ok(false);
    }
    let json = serde_json::to_string(cached.labels())
        .map_err(|e| SiftError::Settings(e.to_string()))?;
    settings.set(CATEGORIES, &json)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::models::NewTransaction;
    use crate::settings::Settings;

    #[test]
    fn test_insert_dedupes_case_insensitively() {
        let mut set = CategorySet::new();
        assert!(set.insert("Groceries"));
        assert!(!set.insert("groceries"));
        assert!(!set.insert("  GROCERIES "));
        assert!(!set.insert("   "));
        assert_eq!(set.labels().to_vec(), vec!["Groceries"]);
    }

    #[test]
    fn test_add_category_persists_in_settings() {
        let mut settings = Settings::default();
        assert!(add_category(&mut settings, " Pets ").unwrap());
        assert!(!add_category(&mut settings, "pets").unwrap());
        assert_eq!(settings.categories, vec!["Pets"]);
    }

    #[test]
    fn test_derive_unions_all_sources() {
        let (_dir, conn) = test_db();
        let store = TransactionStore::new(&conn);
        let id = store
            .insert(&NewTransaction {
                transaction_date: "2025-01-01".into(),
                description: "GROCER".into(),
                amount: -5.0,
                ..Default::default()
            })
            .unwrap();
        store.update_category(id, "Groceries").unwrap();
        RuleStore::new(&conn).add("uber", "Travel").unwrap();
        RuleStore::new(&conn).add("aldi", "groceries").unwrap();

        let mut settings = Settings::default();
        add_category(&mut settings, "Gifts").unwrap();

        let set = CategorySet::derive(&conn, &settings).unwrap();
        assert_eq!(set.labels().to_vec(), vec!["Groceries", "Travel", "Gifts"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_corrupt_cache_is_settings_error() {
        assert!(explicit_categories(&Settings::default()).unwrap().is_empty());

        struct Raw;
        impl SettingsStore for Raw {
            fn get(&self, _: &str) -> Option<String> {
                Some("not json".into())
            }
            fn set(&mut self, _: &str, _: &str) -> Result<()> {
                Ok(())
            }
        }
        assert!(matches!(explicit_categories(&Raw), Err(SiftError::Settings(_))));
    }
}
