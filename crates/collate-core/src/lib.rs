//! collate-core: Core library for collating station snapshots into reference tables
//!
//! This library provides functionality to:
//! - Parse JSON snapshots of a station's market, outfitting and shipyard
//! - Canonicalize in-game names and outfitting symbols
//! - Merge new observations into persisted CSV tables, refusing contradictions
//! - Rotate a backup of each table whenever it is rewritten

pub mod catalog;
pub mod collate;
pub mod error;
pub mod mapping;
pub mod outfitting;
pub mod parser;
pub mod reconcile;
pub mod record;
pub mod scanner;
pub mod snapshot;
pub mod store;
pub mod table;

pub use catalog::Catalog;
pub use collate::{Collator, Outcome, Report};
pub use error::{Error, FaultKind, Result};
pub use mapping::{MappingOverrides, NameMaps};
pub use outfitting::{ModuleResolver, Outfitting};
pub use parser::{parse_table, write_table};
pub use reconcile::{Commodities, Modules, RecordKind, Reconciler, Ships};
pub use record::{CommodityRecord, ModuleRecord, ShipRecord};
pub use scanner::discover_snapshots;
pub use snapshot::{Skip, Snapshot};
pub use store::{FileStore, MemoryStore, TableStore};
pub use table::Table;
