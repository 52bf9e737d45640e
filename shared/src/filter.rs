use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::location::Location;

/// Category option meaning "no category filter".
pub const ALL_CATEGORIES: &str = "Todos os tipos";
/// Place option meaning "no place filter".
pub const ALL_PLACES: &str = "Todos os locais";
/// Region code for addresses without a trailing state code.
pub const UNDETERMINED_REGION: &str = "ND";

static REGION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s*([A-Z]{2})\s*$").expect("region suffix pattern compiles"));

/// Two-letter region code taken from a trailing `"- XX"` in the address.
pub fn region_code(address: Option<&str>) -> &str {
    address
        .and_then(|addr| REGION_SUFFIX.captures(addr))
        .and_then(|caps| caps.get(1))
        .map_or(UNDETERMINED_REGION, |m| m.as_str())
}

pub fn location_region(location: &Location) -> &str {
    region_code(location.address.as_deref())
}

fn with_sentinel<'a>(sentinel: &str, values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(sentinel.to_owned())
        .chain(
            values
                .filter(|value| seen.insert(*value))
                .map(str::to_owned),
        )
        .collect()
}

/// Sentinel followed by each distinct category in order of first appearance.
pub fn category_options(locations: &[Location]) -> Vec<String> {
    with_sentinel(
        ALL_CATEGORIES,
        locations.iter().map(|l| l.category.as_str()),
    )
}

/// Sentinel followed by each distinct region code in order of first appearance.
pub fn place_options(locations: &[Location]) -> Vec<String> {
    with_sentinel(ALL_PLACES, locations.iter().map(location_region))
}

/// The two dropdown selections of the clients map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationFilter {
    pub category: String,
    pub place: String,
}

impl Default for LocationFilter {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_owned(),
            place: ALL_PLACES.to_owned(),
        }
    }
}

impl LocationFilter {
    pub fn new(category: impl Into<String>, place: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            place: place.into(),
        }
    }

    pub fn matches(&self, location: &Location) -> bool {
        let category_ok = self.category == ALL_CATEGORIES || location.category == self.category;
        let place_ok = self.place == ALL_PLACES || location_region(location) == self.place;
        category_ok && place_ok
    }

    pub fn apply(&self, locations: &[Location]) -> Vec<Location> {
        locations
            .iter()
            .filter(|location| self.matches(location))
            .cloned()
            .collect()
    }
}
