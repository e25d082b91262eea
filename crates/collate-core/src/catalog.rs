//! Canonicalization context handed to every record kind

use crate::mapping::NameMaps;
use crate::outfitting::{ModuleResolver, Outfitting};

/// Name tables plus the module resolver
pub struct Catalog {
    pub names: NameMaps,
    pub modules: Box<dyn ModuleResolver>,
}

impl Catalog {
    /// Build a catalog from name tables and a resolver
    pub fn new<R: ModuleResolver + 'static>(names: NameMaps, modules: R) -> Self {
        Self {
            names,
            modules: Box::new(modules),
        }
    }

    /// Built-in name tables and the built-in outfitting resolver
    pub fn builtin() -> Self {
        Self::new(NameMaps::builtin(), Outfitting)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
