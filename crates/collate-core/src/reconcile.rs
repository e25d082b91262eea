//! Reconciliation of fresh observations against a stored reference table
//!
//! Each record kind knows how to pull keyed canonical records out of its part
//! of a snapshot and which fields must stay stable for a key. The reconciler
//! adds keys it has not seen and refuses to continue when a known key comes
//! back different: that means the mapping tables disagree with the game.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::parser::{parse_table, write_table};
use crate::record::{
    CommodityRecord, CommodityRow, ModuleRecord, ModuleRow, ShipRecord, ShipRow,
};
use crate::snapshot::{RawCommodity, RawModule, RawShips};
use crate::store::TableStore;
use crate::table::Table;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// One kind of reference record
pub trait RecordKind {
    /// Stable identifier; tables iterate in key order
    type Key: Ord + Clone + fmt::Display + fmt::Debug;
    /// Canonical record stored under a key
    type Record: Clone + PartialEq + fmt::Debug;
    /// On-disk row
    type Row: Serialize + DeserializeOwned;
    /// The part of a snapshot this kind is observed in
    type Source: ?Sized;

    /// Plural name used in messages
    const LABEL: &'static str;
    /// Table file name
    const FILE_NAME: &'static str;
    /// CSV header, matching the field order of `Row`
    const HEADER: &'static [&'static str];

    /// Extract keyed canonical records. Entries that canonicalize to nothing
    /// are left out; an entry whose embedded id disagrees with where it is
    /// filed is an integrity fault.
    fn observe(source: &Self::Source, catalog: &Catalog) -> Result<Vec<(Self::Key, Self::Record)>>;

    fn split_row(row: Self::Row) -> (Self::Key, Self::Record);

    fn join_row(key: &Self::Key, record: &Self::Record) -> Self::Row;

    /// Compare the fields that must not change for a key
    fn check_consistent(key: &Self::Key, new: &Self::Record, old: &Self::Record) -> Result<()>;

    /// Put rows in on-disk order; rows arrive in key order
    fn sort_rows(_rows: &mut [Self::Row]) {}
}

fn same_field<T>(kind: &'static str, key: &dyn fmt::Display, field: &'static str, new: &T, old: &T) -> Result<()>
where
    T: PartialEq + fmt::Display + ?Sized,
{
    if new == old {
        Ok(())
    } else {
        Err(Error::FieldMismatch {
            kind,
            key: key.to_string(),
            field,
            new: new.to_string(),
            old: old.to_string(),
        })
    }
}

/// Market commodities, keyed by canonical name
pub struct Commodities;

impl RecordKind for Commodities {
    type Key = String;
    type Record = CommodityRecord;
    type Row = CommodityRow;
    type Source = [RawCommodity];

    const LABEL: &'static str = "commodities";
    const FILE_NAME: &'static str = "commodity.csv";
    const HEADER: &'static [&'static str] = &["id", "category", "name", "average"];

    fn observe(source: &[RawCommodity], catalog: &Catalog) -> Result<Vec<(String, CommodityRecord)>> {
        Ok(source
            .iter()
            .map(|commodity| {
                let key = catalog.names.commodity(&commodity.name).to_string();
                let record = CommodityRecord {
                    id: commodity.id,
                    category: catalog.names.category(&commodity.categoryname).to_string(),
                    average: commodity.cost_mean,
                };
                (key, record)
            })
            .collect())
    }

    fn split_row(row: CommodityRow) -> (String, CommodityRecord) {
        (
            row.name,
            CommodityRecord {
                id: row.id,
                category: row.category,
                average: row.average,
            },
        )
    }

    fn join_row(key: &String, record: &CommodityRecord) -> CommodityRow {
        CommodityRow {
            id: record.id,
            category: record.category.clone(),
            name: key.clone(),
            average: record.average,
        }
    }

    fn check_consistent(key: &String, new: &CommodityRecord, old: &CommodityRecord) -> Result<()> {
        same_field(Self::LABEL, key, "id", &new.id, &old.id)?;
        same_field(Self::LABEL, key, "category", new.category.as_str(), old.category.as_str())?;
        same_field(Self::LABEL, key, "average", &new.average, &old.average)
    }

    fn sort_rows(rows: &mut [CommodityRow]) {
        rows.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
    }
}

/// Outfitting modules, keyed by id
pub struct Modules;

impl RecordKind for Modules {
    type Key = i64;
    type Record = ModuleRecord;
    type Row = ModuleRow;
    type Source = BTreeMap<String, RawModule>;

    const LABEL: &'static str = "modules";
    const FILE_NAME: &'static str = "outfitting.csv";
    const HEADER: &'static [&'static str] = &[
        "id", "category", "name", "mount", "guidance", "ship", "class", "rating",
    ];

    fn observe(source: &BTreeMap<String, RawModule>, catalog: &Catalog) -> Result<Vec<(i64, ModuleRecord)>> {
        let mut observed = Vec::with_capacity(source.len());
        for (key, module) in source {
            if key.parse::<i64>().ok() != Some(module.id) {
                return Err(Error::IdMismatch {
                    kind: Self::LABEL,
                    key: key.clone(),
                    embedded: module.id,
                });
            }
            match catalog.modules.resolve(module, &catalog.names) {
                Some(record) => observed.push((module.id, record)),
                None => trace!("Skipping unrecognised module {} {}", module.id, module.name),
            }
        }
        Ok(observed)
    }

    fn split_row(row: ModuleRow) -> (i64, ModuleRecord) {
        (
            row.id,
            ModuleRecord {
                category: row.category,
                name: row.name,
                mount: row.mount,
                guidance: row.guidance,
                ship: row.ship,
                class: row.class,
                rating: row.rating,
            },
        )
    }

    fn join_row(key: &i64, record: &ModuleRecord) -> ModuleRow {
        ModuleRow {
            id: *key,
            category: record.category.clone(),
            name: record.name.clone(),
            mount: record.mount.clone(),
            guidance: record.guidance.clone(),
            ship: record.ship.clone(),
            class: record.class.clone(),
            rating: record.rating.clone(),
        }
    }

    fn check_consistent(key: &i64, new: &ModuleRecord, old: &ModuleRecord) -> Result<()> {
        let fields: [(&'static str, &str, &str); 7] = [
            ("category", new.category.as_str(), old.category.as_str()),
            ("name", new.name.as_str(), old.name.as_str()),
            ("mount", new.mount.as_str(), old.mount.as_str()),
            ("guidance", new.guidance.as_str(), old.guidance.as_str()),
            ("ship", new.ship.as_str(), old.ship.as_str()),
            ("class", new.class.as_str(), old.class.as_str()),
            ("rating", new.rating.as_str(), old.rating.as_str()),
        ];
        for (field, new, old) in fields {
            same_field(Self::LABEL, key, field, new, old)?;
        }
        Ok(())
    }
}

/// Shipyard hulls, keyed by id
pub struct Ships;

impl RecordKind for Ships {
    type Key = i64;
    type Record = ShipRecord;
    type Row = ShipRow;
    type Source = RawShips;

    const LABEL: &'static str = "ships";
    const FILE_NAME: &'static str = "shipyard.csv";
    const HEADER: &'static [&'static str] = &["id", "name"];

    /// Shipyard lists are keyed by ship symbol rather than id, so the id
    /// cross-check only applies to numeric keys.
    fn observe(source: &RawShips, catalog: &Catalog) -> Result<Vec<(i64, ShipRecord)>> {
        let mut observed = Vec::new();
        for (key, ship) in source.candidates() {
            if let Some(listed) = key.and_then(|k| k.parse::<i64>().ok()) {
                if listed != ship.id {
                    return Err(Error::IdMismatch {
                        kind: Self::LABEL,
                        key: listed.to_string(),
                        embedded: ship.id,
                    });
                }
            }
            match catalog.names.ship(&ship.name) {
                Some(name) => observed.push((
                    ship.id,
                    ShipRecord {
                        name: name.to_string(),
                    },
                )),
                None => trace!("Skipping unrecognised ship {} {}", ship.id, ship.name),
            }
        }
        Ok(observed)
    }

    fn split_row(row: ShipRow) -> (i64, ShipRecord) {
        (row.id, ShipRecord { name: row.name })
    }

    fn join_row(key: &i64, record: &ShipRecord) -> ShipRow {
        ShipRow {
            id: *key,
            name: record.name.clone(),
        }
    }

    fn check_consistent(key: &i64, new: &ShipRecord, old: &ShipRecord) -> Result<()> {
        same_field(Self::LABEL, key, "name", new.name.as_str(), old.name.as_str())
    }
}

/// Load, merge and save one kind of reference table
pub struct Reconciler<K: RecordKind> {
    _kind: PhantomData<K>,
}

impl<K: RecordKind> Reconciler<K> {
    pub fn new() -> Self {
        Self { _kind: PhantomData }
    }

    /// Load the stored table; a table that was never written is empty
    pub fn load<S: TableStore + ?Sized>(&self, store: &S) -> Result<Table<K>> {
        match store.read(K::FILE_NAME)? {
            Some(content) => parse_table(&content),
            None => Ok(Table::new()),
        }
    }

    /// Merge observations into `table`, returning how many keys were added
    ///
    /// Either every new key is added or, on an integrity fault, none are.
    pub fn reconcile<I>(&self, table: &mut Table<K>, observations: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K::Key, K::Record)>,
    {
        let mut added: BTreeMap<K::Key, K::Record> = BTreeMap::new();

        for (key, record) in observations {
            match table.get(&key).or_else(|| added.get(&key)) {
                Some(old) => K::check_consistent(&key, &record, old)?,
                None => {
                    debug!("New {} entry {}: {:?}", K::LABEL, key, record);
                    added.insert(key, record);
                }
            }
        }

        let count = added.len();
        for (key, record) in added {
            table.insert(key, record);
        }
        Ok(count)
    }

    /// Write the table, keeping the previous version as a backup
    pub fn save<S: TableStore + ?Sized>(&self, store: &mut S, table: &Table<K>) -> Result<()> {
        let content = write_table(table)?;
        store.replace(K::FILE_NAME, &content)
    }

    /// Reconcile one snapshot section against the stored table, writing the
    /// table back only if something was added. Nothing is written on error.
    pub fn run<S: TableStore + ?Sized>(
        &self,
        store: &mut S,
        source: &K::Source,
        catalog: &Catalog,
    ) -> Result<usize> {
        let mut table = self.load(store)?;
        let observations = K::observe(source, catalog)?;
        let added = self.reconcile(&mut table, observations)?;

        if added > 0 {
            self.save(store, &table)?;
        }
        Ok(added)
    }
}

impl<K: RecordKind> Default for Reconciler<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{MappingOverrides, NameMaps};
    use crate::outfitting::Outfitting;
    use crate::snapshot::RawShip;
    use crate::store::MemoryStore;

    fn commodity(id: i64, name: &str, category: &str, price: i64) -> RawCommodity {
        RawCommodity {
            id,
            name: name.to_string(),
            categoryname: category.to_string(),
            cost_mean: price,
        }
    }

    fn ship(id: i64, name: &str) -> RawShip {
        RawShip {
            id,
            name: name.to_string(),
        }
    }

    fn modules(entries: &[(&str, i64, &str)]) -> BTreeMap<String, RawModule> {
        entries
            .iter()
            .map(|(key, id, name)| {
                (
                    key.to_string(),
                    RawModule {
                        id: *id,
                        name: name.to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_canonical_commodity_added() {
        let overrides = MappingOverrides {
            commodities: [("Foo".to_string(), "Bar".to_string())].into_iter().collect(),
            ..Default::default()
        };
        let catalog = Catalog::new(NameMaps::builtin().with_overrides(overrides), Outfitting);
        let mut store = MemoryStore::new();
        store.insert("commodity.csv", "id,category,name,average\n128049202,Metals,Gold,9401\n");

        let added = Reconciler::<Commodities>::new()
            .run(&mut store, &[commodity(42, "Foo", "Metals", 1234)], &catalog)
            .unwrap();

        assert_eq!(added, 1);
        assert_eq!(
            store.get_str("commodity.csv").unwrap(),
            "id,category,name,average\n42,Metals,Bar,1234\n128049202,Metals,Gold,9401\n"
        );
    }

    #[test]
    fn test_second_run_adds_nothing() {
        let catalog = Catalog::builtin();
        let mut store = MemoryStore::new();
        let market = [
            commodity(128049202, "Gold", "Metals", 9401),
            commodity(128049152, "Water", "Chemicals", 120),
        ];
        let reconciler = Reconciler::<Commodities>::new();

        assert_eq!(reconciler.run(&mut store, &market, &catalog).unwrap(), 2);
        let first = store.get_str("commodity.csv").unwrap().to_string();

        assert_eq!(reconciler.run(&mut store, &market, &catalog).unwrap(), 0);
        assert_eq!(store.get_str("commodity.csv").unwrap(), first);
        assert!(store.get("commodity.csv.bak").is_none());
    }

    #[test]
    fn test_conflict_aborts_without_writing() {
        let catalog = Catalog::builtin();
        let mut store = MemoryStore::new();
        let stored = "id,name\n128049249,Eagle\n";
        store.insert("shipyard.csv", stored);

        let ships = RawShips {
            shipyard_list: None,
            unavailable_list: Some(vec![ship(128049255, "Eagle"), ship(128049249, "SideWinder")]),
        };
        let err = Reconciler::<Ships>::new()
            .run(&mut store, &ships, &catalog)
            .unwrap_err();

        assert!(err.is_integrity());
        assert!(matches!(err, Error::FieldMismatch { field: "name", .. }));
        assert_eq!(store.get_str("shipyard.csv").unwrap(), stored);
        assert!(store.get("shipyard.csv.bak").is_none());
    }

    #[test]
    fn test_reconcile_is_all_or_nothing() {
        let reconciler = Reconciler::<Ships>::new();
        let mut table: Table<Ships> = Table::new();
        table.insert(2, ShipRecord { name: "Eagle".to_string() });

        let observations = vec![
            (1, ShipRecord { name: "Adder".to_string() }),
            (2, ShipRecord { name: "Hauler".to_string() }),
        ];
        assert!(reconciler.reconcile(&mut table, observations).is_err());
        assert_eq!(table.len(), 1);
        assert!(!table.contains_key(&1));
    }

    #[test]
    fn test_duplicate_observations_within_snapshot() {
        let reconciler = Reconciler::<Ships>::new();
        let mut table: Table<Ships> = Table::new();

        let agree = vec![
            (1, ShipRecord { name: "Adder".to_string() }),
            (1, ShipRecord { name: "Adder".to_string() }),
        ];
        assert_eq!(reconciler.reconcile(&mut table, agree).unwrap(), 1);

        let mut table: Table<Ships> = Table::new();
        let disagree = vec![
            (1, ShipRecord { name: "Adder".to_string() }),
            (1, ShipRecord { name: "Eagle".to_string() }),
        ];
        assert!(reconciler.reconcile(&mut table, disagree).is_err());
    }

    #[test]
    fn test_commodity_price_change_is_a_conflict() {
        let catalog = Catalog::builtin();
        let mut store = MemoryStore::new();
        store.insert("commodity.csv", "id,category,name,average\n128049202,Metals,Gold,9401\n");

        let err = Reconciler::<Commodities>::new()
            .run(&mut store, &[commodity(128049202, "Gold", "Metals", 9500)], &catalog)
            .unwrap_err();

        assert!(matches!(err, Error::FieldMismatch { field: "average", .. }));
    }

    #[test]
    fn test_module_id_cross_check() {
        let catalog = Catalog::builtin();
        let mut store = MemoryStore::new();
        let outfitting = modules(&[("128049381", 128049382, "Hpt_PulseLaser_Fixed_Small")]);

        let err = Reconciler::<Modules>::new()
            .run(&mut store, &outfitting, &catalog)
            .unwrap_err();

        assert!(matches!(err, Error::IdMismatch { .. }));
        assert!(store.get("outfitting.csv").is_none());
    }

    #[test]
    fn test_modules_sorted_and_unknown_skipped() {
        let catalog = Catalog::builtin();
        let mut store = MemoryStore::new();
        let outfitting = modules(&[
            ("128049381", 128049381, "Hpt_PulseLaser_Fixed_Small"),
            ("128049250", 128049250, "SideWinder_Armour_Grade1"),
            ("128667727", 128667727, "PaintJob_CobraMkiii_Default_52"),
        ]);

        let added = Reconciler::<Modules>::new()
            .run(&mut store, &outfitting, &catalog)
            .unwrap();

        assert_eq!(added, 2);
        assert_eq!(
            store.get_str("outfitting.csv").unwrap(),
            "id,category,name,mount,guidance,ship,class,rating\n\
             128049250,standard,Lightweight Alloy,,,Sidewinder,1,I\n\
             128049381,hardpoint,Pulse Laser,Fixed,,,1,F\n"
        );
    }

    #[test]
    fn test_ship_lists_combined() {
        let catalog = Catalog::builtin();
        let mut store = MemoryStore::new();
        let ships = RawShips {
            shipyard_list: Some(
                [("SideWinder".to_string(), ship(128049249, "SideWinder"))]
                    .into_iter()
                    .collect(),
            ),
            unavailable_list: Some(vec![ship(128049255, "Eagle"), ship(1, "Mystery_Hull")]),
        };

        let added = Reconciler::<Ships>::new().run(&mut store, &ships, &catalog).unwrap();

        assert_eq!(added, 2);
        assert_eq!(
            store.get_str("shipyard.csv").unwrap(),
            "id,name\n128049249,Sidewinder\n128049255,Eagle\n"
        );
    }

    #[test]
    fn test_backup_holds_previous_table() {
        let catalog = Catalog::builtin();
        let mut store = MemoryStore::new();
        let reconciler = Reconciler::<Ships>::new();
        let first = RawShips {
            shipyard_list: None,
            unavailable_list: Some(vec![ship(128049249, "SideWinder")]),
        };
        let second = RawShips {
            shipyard_list: None,
            unavailable_list: Some(vec![ship(128049255, "Eagle")]),
        };

        reconciler.run(&mut store, &first, &catalog).unwrap();
        let before_second = store.get_str("shipyard.csv").unwrap().to_string();
        reconciler.run(&mut store, &second, &catalog).unwrap();

        assert_eq!(store.get_str("shipyard.csv.bak").unwrap(), before_second);
        assert_eq!(
            store.get_str("shipyard.csv").unwrap(),
            "id,name\n128049249,Sidewinder\n128049255,Eagle\n"
        );
    }

    #[test]
    fn test_load_save_round_trip() {
        let reconciler = Reconciler::<Modules>::new();
        let mut store = MemoryStore::new();
        let mut table: Table<Modules> = Table::new();
        table.insert(
            128049381,
            ModuleRecord {
                category: "hardpoint".to_string(),
                name: "Pulse Laser".to_string(),
                mount: "Fixed".to_string(),
                class: "1".to_string(),
                rating: "F".to_string(),
                ..Default::default()
            },
        );

        reconciler.save(&mut store, &table).unwrap();
        assert_eq!(reconciler.load(&store).unwrap(), table);
    }
}
