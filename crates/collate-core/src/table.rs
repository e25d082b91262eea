//! In-memory reference table

use crate::reconcile::RecordKind;
use std::collections::BTreeMap;
use std::fmt;

/// A key-unique table of canonical records of one kind
pub struct Table<K: RecordKind> {
    records: BTreeMap<K::Key, K::Record>,
}

impl<K: RecordKind> Table<K> {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Get the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find a record by key
    pub fn get(&self, key: &K::Key) -> Option<&K::Record> {
        self.records.get(key)
    }

    /// Check if a key is present
    pub fn contains_key(&self, key: &K::Key) -> bool {
        self.records.contains_key(key)
    }

    /// Rows in on-disk order
    pub fn to_rows(&self) -> Vec<K::Row> {
        let mut rows: Vec<K::Row> = self
            .records
            .iter()
            .map(|(key, record)| K::join_row(key, record))
            .collect();
        K::sort_rows(&mut rows);
        rows
    }

    /// Insert a record, returning the one it displaced
    pub(crate) fn insert(&mut self, key: K::Key, record: K::Record) -> Option<K::Record> {
        self.records.insert(key, record)
    }
}

impl<K: RecordKind> Default for Table<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: RecordKind> Clone for Table<K> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

impl<K: RecordKind> PartialEq for Table<K> {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl<K: RecordKind> fmt::Debug for Table<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("kind", &K::LABEL)
            .field("records", &self.records)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{Commodities, Ships};
    use crate::record::{CommodityRecord, ShipRecord};

    #[test]
    fn test_ship_rows_in_id_order() {
        let mut table: Table<Ships> = Table::new();
        table.insert(128049255, ShipRecord { name: "Eagle".to_string() });
        table.insert(128049249, ShipRecord { name: "Sidewinder".to_string() });

        let ids: Vec<i64> = table.to_rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![128049249, 128049255]);
    }

    #[test]
    fn test_commodity_rows_by_category_then_name() {
        let mut table: Table<Commodities> = Table::new();
        for (name, id, category) in [
            ("Tea", 3, "Foods"),
            ("Gold", 1, "Metals"),
            ("Coffee", 2, "Foods"),
            ("Beryllium", 4, "Metals"),
        ] {
            table.insert(
                name.to_string(),
                CommodityRecord {
                    id,
                    category: category.to_string(),
                    average: 100,
                },
            );
        }

        let names: Vec<String> = table.to_rows().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Coffee", "Tea", "Beryllium", "Gold"]);
    }

    #[test]
    fn test_insert_reports_displaced() {
        let mut table: Table<Ships> = Table::new();
        assert!(table.insert(1, ShipRecord { name: "Adder".to_string() }).is_none());
        assert!(table.insert(1, ShipRecord { name: "Adder".to_string() }).is_some());
        assert_eq!(table.len(), 1);
    }
}
