use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub const MARKETS_COLLECTION: &str = "markets";
pub const VENDORS_COLLECTION: &str = "managed_vendors";

/// A physical or recurring market event, owned by the admin system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub operating_days: Vec<String>,
    #[serde(default)]
    pub operating_hours: BTreeMap<String, String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// A business participating in one or more markets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_id: Option<String>,
}

/// Distinct non-empty cities, sorted ascending.
pub fn distinct_cities<'a, I>(cities: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    cities
        .into_iter()
        .filter(|city| !city.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
