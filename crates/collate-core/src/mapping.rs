//! Name canonicalization tables
//!
//! The game reports commodities, categories and ships by internal names that
//! drift from the names players see. These tables map them to stable display
//! names. Extra entries can be layered on top from a JSON file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// In-game commodity names that differ from their display names
const COMMODITIES: &[(&str, &str)] = &[
    ("Agricultural Medicines", "Agri-Medicines"),
    ("Ai Relics", "AI Relics"),
    ("Atmospheric Extractors", "Atmospheric Processors"),
    ("Auto Fabricators", "Auto-Fabricators"),
    ("Basic Narcotics", "Narcotics"),
    ("Bio Reducing Lichen", "Bioreducing Lichen"),
    ("C M M Composite", "CMM Composite"),
    ("Comercial Samples", "Commercial Samples"),
    ("Diagnostic Sensor", "Hardware Diagnostic Sensor"),
    ("Drones", "Limpet"),
    ("Encripted Data Storage", "Encrypted Data Storage"),
    ("H N Shock Mount", "HN Shock Mount"),
    ("Hafnium178", "Hafnium 178"),
    ("Hazardous Environment Suits", "H.E. Suits"),
    ("Heliostatic Furnaces", "Microbial Furnaces"),
    ("Low Temperature Diamond", "Low Temperature Diamonds"),
    ("Marine Supplies", "Marine Equipment"),
    ("Meta Alloys", "Meta-Alloys"),
    ("Mu Tom Imager", "Muon Imager"),
    ("Non Lethal Weapons", "Non-Lethal Weapons"),
    ("Power Grid Assembly", "Energy Grid Assembly"),
    ("Power Transfer Conduits", "Power Transfer Bus"),
    ("S A P8 Core Container", "SAP 8 Core Container"),
    ("Skimer Components", "Skimmer Components"),
    ("Terrain Enrichment Systems", "Land Enrichment Systems"),
    ("Trinkets Of Fortune", "Trinkets Of Hidden Fortune"),
    ("Unknown Artifact", "Unknown Artefact"),
    ("U S S Cargo Ancient Artefact", "Ancient Artefact"),
    ("U S S Cargo Experimental Chemicals", "Experimental Chemicals"),
    ("U S S Cargo Military Plans", "Military Plans"),
    ("U S S Cargo Prototype Tech", "Prototype Tech"),
    ("U S S Cargo Rebel Transmissions", "Rebel Transmissions"),
    ("U S S Cargo Technical Blueprints", "Technical Blueprints"),
    ("U S S Cargo Trade Data", "Trade Data"),
    ("Wreckage Components", "Salvageable Wreckage"),
];

/// In-game category names that differ from their display names
const CATEGORIES: &[(&str, &str)] = &[
    ("Narcotics", "Legal Drugs"),
    ("Slaves", "Slavery"),
];

/// Lower-cased in-game ship symbols to display names
const SHIPS: &[(&str, &str)] = &[
    ("adder", "Adder"),
    ("anaconda", "Anaconda"),
    ("asp", "Asp Explorer"),
    ("asp_scout", "Asp Scout"),
    ("belugaliner", "Beluga Liner"),
    ("cobramkiii", "Cobra MkIII"),
    ("cobramkiv", "Cobra MkIV"),
    ("cutter", "Imperial Cutter"),
    ("diamondback", "Diamondback Scout"),
    ("diamondbackxl", "Diamondback Explorer"),
    ("eagle", "Eagle"),
    ("empire_courier", "Imperial Courier"),
    ("empire_eagle", "Imperial Eagle"),
    ("empire_trader", "Imperial Clipper"),
    ("federation_corvette", "Federal Corvette"),
    ("federation_dropship", "Federal Dropship"),
    ("federation_dropship_mkii", "Federal Assault Ship"),
    ("federation_gunship", "Federal Gunship"),
    ("ferdelance", "Fer-de-Lance"),
    ("hauler", "Hauler"),
    ("independant_trader", "Keelback"),
    ("orca", "Orca"),
    ("python", "Python"),
    ("sidewinder", "Sidewinder"),
    ("type6", "Type-6 Transporter"),
    ("type7", "Type-7 Transporter"),
    ("type9", "Type-9 Heavy"),
    ("viper", "Viper MkIII"),
    ("viper_mkiv", "Viper MkIV"),
    ("vulture", "Vulture"),
];

/// Extra or replacement mappings loaded from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingOverrides {
    pub commodities: HashMap<String, String>,
    pub categories: HashMap<String, String>,
    /// Keys are matched case-insensitively
    pub ships: HashMap<String, String>,
}

impl MappingOverrides {
    /// Load overrides from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| Error::Mappings {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Lookup tables from in-game names to canonical names
#[derive(Debug, Clone, Default)]
pub struct NameMaps {
    commodities: HashMap<String, String>,
    categories: HashMap<String, String>,
    ships: HashMap<String, String>,
}

impl NameMaps {
    /// Tables with no entries; every commodity and category maps to itself
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in tables
    pub fn builtin() -> Self {
        fn owned(pairs: &[(&str, &str)]) -> HashMap<String, String> {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        }

        Self {
            commodities: owned(COMMODITIES),
            categories: owned(CATEGORIES),
            ships: owned(SHIPS),
        }
    }

    /// Layer overrides on top of these tables
    pub fn with_overrides(mut self, overrides: MappingOverrides) -> Self {
        self.commodities.extend(overrides.commodities);
        self.categories.extend(overrides.categories);
        self.ships.extend(
            overrides
                .ships
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v)),
        );
        self
    }

    /// Canonical commodity name, falling back to the raw name
    pub fn commodity<'a>(&'a self, raw: &'a str) -> &'a str {
        self.commodities.get(raw).map_or(raw, String::as_str)
    }

    /// Canonical category name, falling back to the raw name
    pub fn category<'a>(&'a self, raw: &'a str) -> &'a str {
        self.categories.get(raw).map_or(raw, String::as_str)
    }

    /// Display name for a ship symbol; unknown ships have none
    pub fn ship(&self, raw: &str) -> Option<&str> {
        self.ships.get(&raw.to_lowercase()).map(String::as_str)
    }

    /// Number of entries in each table: (commodities, categories, ships)
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.commodities.len(), self.categories.len(), self.ships.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commodity_fallback() {
        let maps = NameMaps::builtin();
        assert_eq!(maps.commodity("Drones"), "Limpet");
        assert_eq!(maps.commodity("Gold"), "Gold");
    }

    #[test]
    fn test_category_mapping() {
        let maps = NameMaps::builtin();
        assert_eq!(maps.category("Narcotics"), "Legal Drugs");
        assert_eq!(maps.category("Metals"), "Metals");
    }

    #[test]
    fn test_ship_lookup_is_case_insensitive() {
        let maps = NameMaps::builtin();
        assert_eq!(maps.ship("SideWinder"), Some("Sidewinder"));
        assert_eq!(maps.ship("Federation_Dropship_MkII"), Some("Federal Assault Ship"));
        assert_eq!(maps.ship("Unknown_Hull"), None);
    }

    #[test]
    fn test_overrides_replace_builtin() {
        let overrides: MappingOverrides = serde_json::from_str(
            r#"{"commodities": {"Drones": "Limpets", "Foo": "Bar"}, "ships": {"Krait_MkII": "Krait Mk II"}}"#,
        )
        .unwrap();
        let maps = NameMaps::builtin().with_overrides(overrides);

        assert_eq!(maps.commodity("Drones"), "Limpets");
        assert_eq!(maps.commodity("Foo"), "Bar");
        assert_eq!(maps.ship("krait_mkii"), Some("Krait Mk II"));
        assert_eq!(maps.category("Slaves"), "Slavery");
    }
}
