//! Per-snapshot collation into the three reference tables

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::reconcile::{Commodities, Modules, RecordKind, Reconciler, Ships};
use crate::snapshot::{Skip, Snapshot};
use crate::store::TableStore;
use std::path::Path;
use tracing::{error, info};

/// What happened to one record kind
#[derive(Debug)]
pub enum Outcome {
    /// The station had no data of this kind
    Absent,
    /// Number of new records written (zero means the table was left alone)
    Added(usize),
    /// The table could not be read or written; other kinds still ran
    Failed(Error),
}

impl Outcome {
    /// Records added, or zero
    pub fn added(&self) -> usize {
        match self {
            Outcome::Added(n) => *n,
            _ => 0,
        }
    }

    /// Whether this kind failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Result of collating one snapshot
#[derive(Debug)]
pub struct Report {
    /// Set when the snapshot was not usable at all
    pub skipped: Option<Skip>,
    pub commodities: Outcome,
    pub modules: Outcome,
    pub ships: Outcome,
}

impl Report {
    fn skipped(skip: Skip) -> Self {
        Self {
            skipped: Some(skip),
            commodities: Outcome::Absent,
            modules: Outcome::Absent,
            ships: Outcome::Absent,
        }
    }

    /// Total records added across all kinds
    pub fn total_added(&self) -> usize {
        self.commodities.added() + self.modules.added() + self.ships.added()
    }

    /// Errors from kinds that failed
    pub fn failures(&self) -> impl Iterator<Item = &Error> {
        [&self.commodities, &self.modules, &self.ships]
            .into_iter()
            .filter_map(|outcome| match outcome {
                Outcome::Failed(e) => Some(e),
                _ => None,
            })
    }

    /// Whether any kind failed
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Collates snapshots into a table store
pub struct Collator<S: TableStore> {
    store: S,
    catalog: Catalog,
}

impl<S: TableStore> Collator<S> {
    pub fn new(store: S, catalog: Catalog) -> Self {
        Self { store, catalog }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the collator, returning the store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Load and collate a snapshot file
    pub fn collate_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Report> {
        let snapshot = Snapshot::load(path)?;
        self.collate(&snapshot)
    }

    /// Collate one snapshot: commodities, then modules, then ships
    ///
    /// An integrity fault stops everything and is returned. A table that
    /// cannot be read or written is recorded against its kind and the
    /// remaining kinds still run.
    pub fn collate(&mut self, snapshot: &Snapshot) -> Result<Report> {
        let starport = match snapshot.starport() {
            Ok(starport) => starport,
            Err(skip) => {
                info!("{}", skip);
                return Ok(Report::skipped(skip));
            }
        };

        if let Some(name) = &starport.name {
            info!("Station {}", name);
        }

        let commodities = match starport.market() {
            Some(market) => self.run::<Commodities>(market)?,
            None => {
                info!("No market");
                Outcome::Absent
            }
        };

        let modules = match starport.outfitting() {
            Some(outfitting) => self.run::<Modules>(outfitting)?,
            None => {
                info!("No outfitting");
                Outcome::Absent
            }
        };

        let ships = match starport.shipyard() {
            Some(shipyard) => self.run::<Ships>(shipyard)?,
            None => {
                info!("No shipyard");
                Outcome::Absent
            }
        };

        Ok(Report {
            skipped: None,
            commodities,
            modules,
            ships,
        })
    }

    fn run<K: RecordKind>(&mut self, source: &K::Source) -> Result<Outcome> {
        match Reconciler::<K>::new().run(&mut self.store, source, &self.catalog) {
            Ok(added) => {
                if added > 0 {
                    info!("Added {} new {}", added, K::LABEL);
                }
                Ok(Outcome::Added(added))
            }
            Err(e) if e.is_integrity() => Err(e),
            Err(e) => {
                error!("Failed to update {}: {}", K::FILE_NAME, e);
                Ok(Outcome::Failed(e))
            }
        }
    }
}
