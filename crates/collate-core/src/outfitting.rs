//! Resolution of outfitting symbols into canonical module records
//!
//! Symbols look like `Hpt_PulseLaser_Fixed_Small`, `Int_Engine_Size2_Class1`
//! or `Sidewinder_Armour_Grade1`. Cosmetics and anything not listed here
//! resolve to nothing and are left out of the outfitting table.

use crate::mapping::NameMaps;
use crate::record::ModuleRecord;
use crate::snapshot::RawModule;

/// Turns a raw outfitting entry into a canonical module record
pub trait ModuleResolver {
    /// `None` when the module is not recognised
    fn resolve(&self, module: &RawModule, names: &NameMaps) -> Option<ModuleRecord>;
}

/// Weapon symbol -> (display name, missile guidance)
const WEAPONS: &[(&str, &str, Option<&str>)] = &[
    ("advancedtorppylon", "Torpedo Pylon", Some("Seeker")),
    ("basicmissilerack", "Missile Rack", Some("Seeker")),
    ("beamlaser", "Beam Laser", None),
    ("cannon", "Cannon", None),
    ("drunkmissilerack", "Pack-Hound Missile Rack", Some("Seeker")),
    ("dumbfiremissilerack", "Missile Rack", Some("Dumbfire")),
    ("minelauncher", "Mine Launcher", None),
    ("mininglaser", "Mining Laser", None),
    ("multicannon", "Multi-Cannon", None),
    ("plasmaaccelerator", "Plasma Accelerator", None),
    ("pulselaser", "Pulse Laser", None),
    ("pulselaserburst", "Burst Laser", None),
    ("railgun", "Rail Gun", None),
    ("slugshot", "Fragment Cannon", None),
];

/// (weapon, mount, size) -> rating
const WEAPON_RATINGS: &[(&str, &str, &str, &str)] = &[
    ("advancedtorppylon", "fixed", "small", "I"),
    ("advancedtorppylon", "fixed", "medium", "I"),
    ("basicmissilerack", "fixed", "small", "B"),
    ("basicmissilerack", "fixed", "medium", "B"),
    ("beamlaser", "fixed", "small", "E"),
    ("beamlaser", "fixed", "medium", "D"),
    ("beamlaser", "fixed", "large", "C"),
    ("beamlaser", "fixed", "huge", "A"),
    ("beamlaser", "gimbal", "small", "E"),
    ("beamlaser", "gimbal", "medium", "D"),
    ("beamlaser", "gimbal", "large", "C"),
    ("beamlaser", "turret", "small", "F"),
    ("beamlaser", "turret", "medium", "E"),
    ("beamlaser", "turret", "large", "D"),
    ("cannon", "fixed", "small", "D"),
    ("cannon", "fixed", "medium", "D"),
    ("cannon", "fixed", "large", "C"),
    ("cannon", "fixed", "huge", "B"),
    ("cannon", "gimbal", "small", "E"),
    ("cannon", "gimbal", "medium", "D"),
    ("cannon", "gimbal", "huge", "B"),
    ("cannon", "turret", "small", "F"),
    ("cannon", "turret", "medium", "E"),
    ("cannon", "turret", "large", "D"),
    ("drunkmissilerack", "fixed", "medium", "B"),
    ("dumbfiremissilerack", "fixed", "small", "B"),
    ("dumbfiremissilerack", "fixed", "medium", "B"),
    ("minelauncher", "fixed", "small", "I"),
    ("minelauncher", "fixed", "medium", "I"),
    ("mininglaser", "fixed", "small", "D"),
    ("mininglaser", "fixed", "medium", "D"),
    ("multicannon", "fixed", "small", "F"),
    ("multicannon", "fixed", "medium", "E"),
    ("multicannon", "gimbal", "small", "G"),
    ("multicannon", "gimbal", "medium", "F"),
    ("multicannon", "turret", "small", "G"),
    ("multicannon", "turret", "medium", "F"),
    ("plasmaaccelerator", "fixed", "medium", "C"),
    ("plasmaaccelerator", "fixed", "large", "B"),
    ("plasmaaccelerator", "fixed", "huge", "A"),
    ("pulselaser", "fixed", "small", "F"),
    ("pulselaser", "fixed", "medium", "E"),
    ("pulselaser", "fixed", "large", "D"),
    ("pulselaser", "fixed", "huge", "A"),
    ("pulselaser", "gimbal", "small", "G"),
    ("pulselaser", "gimbal", "medium", "F"),
    ("pulselaser", "gimbal", "large", "E"),
    ("pulselaser", "turret", "small", "G"),
    ("pulselaser", "turret", "medium", "F"),
    ("pulselaser", "turret", "large", "F"),
    ("pulselaserburst", "fixed", "small", "F"),
    ("pulselaserburst", "fixed", "medium", "E"),
    ("pulselaserburst", "fixed", "large", "D"),
    ("pulselaserburst", "fixed", "huge", "E"),
    ("pulselaserburst", "gimbal", "small", "G"),
    ("pulselaserburst", "gimbal", "medium", "F"),
    ("pulselaserburst", "gimbal", "large", "E"),
    ("pulselaserburst", "turret", "small", "G"),
    ("pulselaserburst", "turret", "medium", "F"),
    ("pulselaserburst", "turret", "large", "E"),
    ("railgun", "fixed", "small", "D"),
    ("railgun", "fixed", "medium", "B"),
    ("slugshot", "fixed", "small", "E"),
    ("slugshot", "fixed", "medium", "A"),
    ("slugshot", "fixed", "large", "C"),
    ("slugshot", "gimbal", "small", "E"),
    ("slugshot", "gimbal", "medium", "D"),
    ("slugshot", "turret", "small", "E"),
    ("slugshot", "turret", "medium", "D"),
];

const MOUNTS: &[(&str, &str)] = &[("fixed", "Fixed"), ("gimbal", "Gimballed"), ("turret", "Turreted")];

const WEAPON_SIZES: &[(&str, &str)] = &[
    ("tiny", "0"),
    ("small", "1"),
    ("medium", "2"),
    ("large", "3"),
    ("huge", "4"),
];

/// Utility mounts with a fixed rating
const COUNTERMEASURES: &[(&str, &str, &str)] = &[
    ("chafflauncher", "Chaff Launcher", "I"),
    ("electroniccountermeasure", "Electronic Countermeasure", "F"),
    ("heatsinklauncher", "Heat Sink Launcher", "I"),
    ("plasmapointdefence", "Point Defence", "I"),
];

/// Utility mounts rated by their class suffix
const UTILITIES: &[(&str, &str)] = &[
    ("cargoscanner", "Cargo Scanner"),
    ("cloudscanner", "Frame Shift Wake Scanner"),
    ("crimescanner", "Kill Warrant Scanner"),
    ("shieldbooster", "Shield Booster"),
];

const ARMOUR: &[(&str, &str)] = &[
    ("grade1", "Lightweight Alloy"),
    ("grade2", "Reinforced Alloy"),
    ("grade3", "Military Grade Composite"),
    ("mirrored", "Mirrored Surface Composite"),
    ("reactive", "Reactive Surface Composite"),
];

/// Core internals every ship carries
const STANDARD: &[(&str, &str)] = &[
    ("engine", "Thrusters"),
    ("fueltank", "Fuel Tank"),
    ("hyperdrive", "Frame Shift Drive"),
    ("lifesupport", "Life Support"),
    ("powerdistributor", "Power Distributor"),
    ("powerplant", "Power Plant"),
    ("sensors", "Sensors"),
];

/// Optional internals -> (display name, rating override)
const INTERNAL: &[(&str, &str, Option<&str>)] = &[
    ("buggybay", "Planetary Vehicle Hangar", None),
    ("cargorack", "Cargo Rack", Some("E")),
    ("collection", "Collector Limpet Controller", None),
    ("fsdinterdictor", "Frame Shift Drive Interdictor", None),
    ("fuelscoop", "Fuel Scoop", None),
    ("fueltransfer", "Fuel Transfer Limpet Controller", None),
    ("hullreinforcement", "Hull Reinforcement Package", None),
    ("prospector", "Prospector Limpet Controller", None),
    ("refinery", "Refinery", None),
    ("repairer", "Auto Field-Maintenance Unit", None),
    ("shieldcellbank", "Shield Cell Bank", None),
    ("shieldgenerator", "Shield Generator", None),
];

/// Internals with no size or class in their symbol -> (display name, class, rating)
const FIXED_INTERNAL: &[(&str, &str, &str, &str)] = &[
    ("int_detailedsurfacescanner_tiny", "Detailed Surface Scanner", "1", "C"),
    ("int_dockingcomputer_standard", "Standard Docking Computer", "1", "E"),
    ("int_planetapproachsuite", "Planetary Approach Suite", "1", "I"),
    ("int_stellarbodydiscoveryscanner_standard", "Basic Discovery Scanner", "1", "E"),
    ("int_stellarbodydiscoveryscanner_intermediate", "Intermediate Discovery Scanner", "1", "D"),
    ("int_stellarbodydiscoveryscanner_advanced", "Advanced Discovery Scanner", "1", "C"),
];

fn lookup<'a>(table: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Class digit to letter rating, 1 = E through 5 = A
fn class_rating(class: u32) -> Option<&'static str> {
    ["E", "D", "C", "B", "A"].get(class.checked_sub(1)? as usize).copied()
}

/// Digits following a prefix, e.g. `size3` -> 3
fn suffix_number(part: &str, prefix: &str) -> Option<u32> {
    part.strip_prefix(prefix)?.parse().ok()
}

/// The built-in resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct Outfitting;

impl ModuleResolver for Outfitting {
    fn resolve(&self, module: &RawModule, names: &NameMaps) -> Option<ModuleRecord> {
        let symbol = module.name.to_lowercase();
        let parts: Vec<&str> = symbol.split('_').collect();

        match parts.first().copied()? {
            "hpt" => hardpoint(&parts),
            "int" => internal(&symbol, &parts),
            _ => armour(&parts, names),
        }
    }
}

fn hardpoint(parts: &[&str]) -> Option<ModuleRecord> {
    let item = *parts.get(1)?;

    if let Some((_, name, rating)) = COUNTERMEASURES.iter().find(|(k, _, _)| *k == item) {
        return Some(ModuleRecord {
            category: "utility".to_string(),
            name: name.to_string(),
            class: "0".to_string(),
            rating: rating.to_string(),
            ..Default::default()
        });
    }

    if let Some(name) = lookup(UTILITIES, item) {
        let class = suffix_number(parts.get(2)?, "size")?;
        let rating = class_rating(suffix_number(parts.get(3)?, "class")?)?;
        return Some(ModuleRecord {
            category: "utility".to_string(),
            name: name.to_string(),
            class: class.to_string(),
            rating: rating.to_string(),
            ..Default::default()
        });
    }

    let (_, name, guidance) = WEAPONS.iter().find(|(k, _, _)| *k == item)?;
    let mount = *parts.get(2)?;
    let size = *parts.get(3)?;
    let (_, _, _, rating) = WEAPON_RATINGS
        .iter()
        .find(|(w, m, s, _)| *w == item && *m == mount && *s == size)?;

    Some(ModuleRecord {
        category: "hardpoint".to_string(),
        name: name.to_string(),
        mount: lookup(MOUNTS, mount)?.to_string(),
        guidance: guidance.unwrap_or_default().to_string(),
        class: lookup(WEAPON_SIZES, size)?.to_string(),
        rating: rating.to_string(),
        ..Default::default()
    })
}

fn internal(symbol: &str, parts: &[&str]) -> Option<ModuleRecord> {
    if let Some((_, name, class, rating)) = FIXED_INTERNAL.iter().find(|(k, _, _, _)| *k == symbol) {
        return Some(ModuleRecord {
            category: "internal".to_string(),
            name: name.to_string(),
            class: class.to_string(),
            rating: rating.to_string(),
            ..Default::default()
        });
    }

    let item = *parts.get(1)?;
    let class = suffix_number(parts.get(2)?, "size")?;
    let grade = suffix_number(parts.get(3)?, "class")?;

    let (category, name, rating) = if let Some(name) = lookup(STANDARD, item) {
        let rating = if item == "fueltank" { Some("C") } else { None };
        ("standard", name, rating)
    } else {
        let (_, name, rating) = INTERNAL.iter().find(|(k, _, _)| *k == item)?;
        ("internal", *name, *rating)
    };

    Some(ModuleRecord {
        category: category.to_string(),
        name: name.to_string(),
        class: class.to_string(),
        rating: rating.or_else(|| class_rating(grade))?.to_string(),
        ..Default::default()
    })
}

/// `<ship>_armour_<grade>`, where the ship symbol may itself contain underscores
fn armour(parts: &[&str], names: &NameMaps) -> Option<ModuleRecord> {
    let pos = parts.iter().position(|p| *p == "armour")?;
    if pos == 0 {
        return None;
    }
    let ship = names.ship(&parts[..pos].join("_"))?;
    let name = lookup(ARMOUR, parts.get(pos + 1)?)?;

    Some(ModuleRecord {
        category: "standard".to_string(),
        name: name.to_string(),
        ship: ship.to_string(),
        class: "1".to_string(),
        rating: "I".to_string(),
        ..Default::default()
    })
}
