//! Canonical record types and their CSV row layouts
//!
//! Records hold everything except the key; rows are the flattened form
//! written to disk, with column order fixed by field order.

use serde::{Deserialize, Serialize};

/// A commodity, keyed by canonical name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommodityRecord {
    pub id: i64,
    pub category: String,
    /// Galactic average price in whole credits
    pub average: i64,
}

/// An outfitting module, keyed by id. Fields that do not apply to a module
/// type are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRecord {
    pub category: String,
    pub name: String,
    pub mount: String,
    pub guidance: String,
    pub ship: String,
    pub class: String,
    pub rating: String,
}

/// A ship, keyed by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipRecord {
    pub name: String,
}

/// `commodity.csv` row: id,category,name,average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityRow {
    pub id: i64,
    pub category: String,
    pub name: String,
    pub average: i64,
}

/// `outfitting.csv` row: id,category,name,mount,guidance,ship,class,rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRow {
    pub id: i64,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub mount: String,
    #[serde(default)]
    pub guidance: String,
    #[serde(default)]
    pub ship: String,
    pub class: String,
    pub rating: String,
}

/// `shipyard.csv` row: id,name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipRow {
    pub id: i64,
    pub name: String,
}
