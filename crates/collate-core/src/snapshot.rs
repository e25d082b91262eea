//! Snapshot model for station market, outfitting and shipyard dumps
//!
//! A snapshot is one JSON document captured while docked. Only the parts
//! needed for collation are modelled; everything else in the dump is ignored.

use crate::error::{Error, Result};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// A parsed snapshot document
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    /// Commander state at capture time
    pub commander: Commander,
    /// Station the commander last docked at; `{}` counts as none
    #[serde(rename = "lastStarport", default, deserialize_with = "non_empty_starport")]
    pub last_starport: Option<Starport>,
}

/// Commander state
#[derive(Debug, Clone, Deserialize)]
pub struct Commander {
    #[serde(default)]
    pub docked: bool,
}

/// Station data: market, outfitting and shipyard are each optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Starport {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub commodities: Option<Vec<RawCommodity>>,
    #[serde(default, deserialize_with = "keyed_by_id")]
    pub modules: Option<BTreeMap<String, RawModule>>,
    #[serde(default)]
    pub ships: Option<RawShips>,
}

/// A market entry as reported by the game
#[derive(Debug, Clone, Deserialize)]
pub struct RawCommodity {
    pub id: i64,
    pub name: String,
    pub categoryname: String,
    /// Galactic average price, truncated to whole credits
    #[serde(deserialize_with = "truncated_price")]
    pub cost_mean: i64,
}

/// An outfitting entry as reported by the game
#[derive(Debug, Clone, Deserialize)]
pub struct RawModule {
    pub id: i64,
    /// In-game symbol, e.g. `Hpt_PulseLaser_Fixed_Small`
    pub name: String,
}

/// A shipyard entry as reported by the game
#[derive(Debug, Clone, Deserialize)]
pub struct RawShip {
    pub id: i64,
    /// In-game symbol, e.g. `SideWinder`
    pub name: String,
}

/// Shipyard contents: ships for sale plus ships listed but unavailable
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawShips {
    #[serde(default, deserialize_with = "keyed_by_id")]
    pub shipyard_list: Option<BTreeMap<String, RawShip>>,
    #[serde(default)]
    pub unavailable_list: Option<Vec<RawShip>>,
}

impl RawShips {
    /// All ships seen at the shipyard, for sale first, then unavailable
    pub fn candidates(&self) -> impl Iterator<Item = (Option<&str>, &RawShip)> {
        let listed = self
            .shipyard_list
            .iter()
            .flatten()
            .map(|(key, ship)| (Some(key.as_str()), ship));
        let unavailable = self.unavailable_list.iter().flatten().map(|ship| (None, ship));
        listed.chain(unavailable)
    }

    /// True when neither list has any entries
    pub fn is_empty(&self) -> bool {
        self.shipyard_list.as_ref().map_or(true, |l| l.is_empty())
            && self.unavailable_list.as_ref().map_or(true, |l| l.is_empty())
    }
}

/// Why a snapshot was not collated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    NotDocked,
    NoStarport,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::NotDocked => write!(f, "Not docked!"),
            Skip::NoStarport => write!(f, "No starport!"),
        }
    }
}

impl Snapshot {
    /// Load a snapshot from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    /// Parse a snapshot from a JSON string; `path` is only used for errors
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Snapshot {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// The station to collate, or the reason there is none
    pub fn starport(&self) -> std::result::Result<&Starport, Skip> {
        if !self.commander.docked {
            return Err(Skip::NotDocked);
        }
        match &self.last_starport {
            Some(starport) => Ok(starport),
            None => Err(Skip::NoStarport),
        }
    }
}

impl Starport {
    /// Market entries, if the station has a market
    pub fn market(&self) -> Option<&[RawCommodity]> {
        self.commodities.as_deref().filter(|c| !c.is_empty())
    }

    /// Outfitting entries keyed by id, if the station has outfitting
    pub fn outfitting(&self) -> Option<&BTreeMap<String, RawModule>> {
        self.modules.as_ref().filter(|m| !m.is_empty())
    }

    /// Shipyard contents, if the station has a shipyard
    pub fn shipyard(&self) -> Option<&RawShips> {
        self.ships.as_ref().filter(|s| !s.is_empty())
    }
}

/// A missing, null or empty `lastStarport` means no station. Any other
/// object is a station, even if none of its fields are ones we model.
fn non_empty_starport<'de, D>(deserializer: D) -> std::result::Result<Option<Starport>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Value::Object(fields)) if fields.is_empty() => Ok(None),
        Some(value) => Starport::deserialize(value)
            .map(Some)
            .map_err(de::Error::custom),
    }
}

/// Entries that carry their own numeric id
trait HasId {
    fn id(&self) -> i64;
}

impl HasId for RawModule {
    fn id(&self) -> i64 {
        self.id
    }
}

impl HasId for RawShip {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Accept either an object keyed by id or an array (the API sends `[]` for
/// an empty object). Array entries are keyed by their own id.
fn keyed_by_id<'de, D, T>(deserializer: D) -> std::result::Result<Option<BTreeMap<String, T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + HasId,
{
    let entries = match Option::<Value>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| T::deserialize(item).map(|entry| (entry.id().to_string(), entry)))
            .collect::<std::result::Result<BTreeMap<_, _>, _>>(),
        Some(value @ Value::Object(_)) => BTreeMap::<String, T>::deserialize(value),
        Some(other) => {
            return Err(de::Error::custom(format!(
                "expected an object or array of entries, found {}",
                other
            )))
        }
    };
    entries.map(Some).map_err(de::Error::custom)
}

/// Prices arrive as decimal strings ("1234.56") or plain numbers
fn truncated_price<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Integer(i64),
        Float(f64),
        Text(String),
    }

    match Price::deserialize(deserializer)? {
        Price::Integer(i) => Ok(i),
        Price::Float(f) => truncate_float(f)
            .ok_or_else(|| de::Error::custom(format!("price {} out of range", f))),
        Price::Text(s) => parse_price(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid price '{}'", s))),
    }
}

// i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
fn truncate_float(f: f64) -> Option<i64> {
    let whole = f.trunc();
    (whole.is_finite() && whole >= i64::MIN as f64 && whole < i64::MAX as f64).then(|| whole as i64)
}

fn parse_price(s: &str) -> Option<i64> {
    let whole = s.trim().split('.').next()?;
    match whole {
        "" | "-" => Some(0),
        _ => whole.parse().ok(),
    }
}
