use crate::catalog::{is_known_map, HeroSet};
use crate::error::AppError;
use crate::planner::MapId;
use serde::Serialize;
use std::fmt;

/// Lowercase hero identifier as used by the stats API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HeroKey(String);

impl HeroKey {
    pub fn new(key: &str) -> Self {
        HeroKey(key.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HeroKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits the comma-separated input and checks every key against `heroes`.
///
/// Order and duplicates are kept. The first unknown key rejects the whole input.
pub fn validate(raw_input: &str, heroes: &HeroSet) -> Result<Vec<HeroKey>, AppError> {
    let mut keys = Vec::new();

    for token in raw_input.split(',') {
        let key = HeroKey::new(token);
        if key.as_str().is_empty() {
            continue;
        }
        if !heroes.is_valid_hero(key.as_str()) {
            return Err(AppError::InvalidHero {
                key: key.as_str().to_string(),
            });
        }
        keys.push(key);
    }

    Ok(keys)
}

/// An empty value means no map filter.
pub fn validate_map(raw: Option<&str>) -> Result<Option<MapId>, AppError> {
    let map = match raw.map(|m| m.trim().to_lowercase()) {
        Some(m) if !m.is_empty() => m,
        _ => return Ok(None),
    };

    if is_known_map(&map) {
        Ok(Some(MapId::new(&map)))
    } else {
        Err(AppError::UnknownMap(map))
    }
}
