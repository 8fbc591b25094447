use crate::catalog::{is_broken_map, Gamemode, Rank, Region};
use crate::validate::HeroKey;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MapId(String);

impl MapId {
    pub fn new(map: &str) -> Self {
        MapId(map.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_broken(&self) -> bool {
        is_broken_map(&self.0)
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionScope {
    pub all_regions: bool,
}

impl RegionScope {
    pub fn regions(&self) -> &'static [Region] {
        if self.all_regions {
            &Region::ALL
        } else {
            &[Region::Americas]
        }
    }
}

/// One stats request to make.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTask {
    pub hero: HeroKey,
    /// Position of `hero` in the validated input, so repeated keys stay distinct.
    pub hero_slot: usize,
    pub region: Region,
    pub gamemode: Gamemode,
    pub rank: Option<Rank>,
    pub map: Option<MapId>,
}

/// Hero (input order) -> region (fixed order) -> rank (competitive only).
pub fn plan(
    heroes: &[HeroKey],
    scope: RegionScope,
    gamemode: Gamemode,
    map: Option<&MapId>,
) -> Vec<QueryTask> {
    let ranks: Vec<Option<Rank>> = match gamemode {
        Gamemode::Quickplay => vec![None],
        Gamemode::Competitive => Rank::ALL.iter().copied().map(Some).collect(),
    };

    let mut tasks = Vec::with_capacity(heroes.len() * scope.regions().len() * ranks.len());
    for (hero_slot, hero) in heroes.iter().enumerate() {
        for &region in scope.regions() {
            for &rank in &ranks {
                tasks.push(QueryTask {
                    hero: hero.clone(),
                    hero_slot,
                    region,
                    gamemode,
                    rank,
                    map: map.cloned(),
                });
            }
        }
    }
    tasks
}
