//! Reference data: the remote hero catalog plus the static region, rank and map lists.

use crate::api::models::HeroSummary;
use crate::error::AppError;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Americas,
    Europe,
    Asia,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Americas, Region::Europe, Region::Asia];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Americas => "americas",
            Region::Europe => "europe",
            Region::Asia => "asia",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Competitive divisions, lowest first. Report lines follow this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Grandmaster,
}

impl Rank {
    pub const ALL: [Rank; 7] = [
        Rank::Bronze,
        Rank::Silver,
        Rank::Gold,
        Rank::Platinum,
        Rank::Diamond,
        Rank::Master,
        Rank::Grandmaster,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Bronze => "bronze",
            Rank::Silver => "silver",
            Rank::Gold => "gold",
            Rank::Platinum => "platinum",
            Rank::Diamond => "diamond",
            Rank::Master => "master",
            Rank::Grandmaster => "grandmaster",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Gamemode {
    Quickplay,
    Competitive,
}

impl Gamemode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gamemode::Quickplay => "quickplay",
            Gamemode::Competitive => "competitive",
        }
    }
}

impl fmt::Display for Gamemode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const MAPS: [&str; 31] = [
    "aatlis",
    "anubis",
    "blizzard-world",
    "busan",
    "circuit-royal",
    "colosseo",
    "dorado",
    "eichenwalde",
    "esperanca",
    "hanaoka",
    "havana",
    "hollywood",
    "horizon",
    "ilios",
    "junkertown",
    "lijiang-tower",
    "kings-row",
    "midtown",
    "necropolis",
    "nepal",
    "new-junk-city",
    "new-queen-street",
    "numbani",
    "oasis",
    "paraiso",
    "rialto",
    "route-66",
    "runasapi",
    "samoa",
    "shambali-monastery",
    "suravasa",
];

// The stats endpoint returns nothing usable for these.
pub const BROKEN_MAPS: [&str; 2] = ["anubis", "hanaoka"];

pub fn is_known_map(map: &str) -> bool {
    MAPS.contains(&map)
}

pub fn is_broken_map(map: &str) -> bool {
    BROKEN_MAPS.contains(&map)
}

/// "blizzard-world" -> "Blizzard World"
pub fn map_display_name(map: &str) -> String {
    map.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Immutable snapshot of the valid hero keys.
#[derive(Debug, Clone, Default)]
pub struct HeroSet {
    keys: Arc<HashSet<String>>,
}

impl HeroSet {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HeroSet {
            keys: Arc::new(keys.into_iter().map(Into::into).collect()),
        }
    }

    pub fn is_valid_hero(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Anything that can produce the remote hero list.
pub trait HeroSource {
    fn fetch_heroes(&self) -> Result<Vec<HeroSummary>, AppError>;
}

#[derive(Debug, Clone)]
pub enum CatalogState {
    Uninitialized,
    Loading,
    Ready {
        heroes: HeroSet,
        summaries: Arc<Vec<HeroSummary>>,
    },
    Failed(String),
}

impl CatalogState {
    fn is_settled(&self) -> bool {
        matches!(self, CatalogState::Ready { .. } | CatalogState::Failed(_))
    }
}

/// Process-wide hero catalog, written once and read through snapshots.
pub struct HeroCatalog {
    state: Mutex<CatalogState>,
    settled: Condvar,
}

impl HeroCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(HeroCatalog {
            state: Mutex::new(CatalogState::Uninitialized),
            settled: Condvar::new(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Starts the one-time load on a background thread.
    pub fn spawn_load<S>(self: &Arc<Self>, source: S) -> JoinHandle<()>
    where
        S: HeroSource + Send + 'static,
    {
        let catalog = Arc::clone(self);
        thread::spawn(move || catalog.load_from(&source))
    }

    /// Loads the hero list. Failures are logged and leave the catalog `Failed`, which
    /// makes every hero look unknown.
    pub fn load_from(&self, source: &dyn HeroSource) {
        {
            let mut state = self.lock();
            if !matches!(*state, CatalogState::Uninitialized) {
                return;
            }
            *state = CatalogState::Loading;
        }

        let next = match source.fetch_heroes() {
            Ok(summaries) => {
                let heroes = HeroSet::new(summaries.iter().map(|h| h.key.to_lowercase()));
                info!("Loaded {} heroes into the catalog", heroes.len());
                CatalogState::Ready {
                    heroes,
                    summaries: Arc::new(summaries),
                }
            }
            Err(e) => {
                let err = AppError::CatalogLoadError(e.to_string());
                warn!("{}", err);
                CatalogState::Failed(e.to_string())
            }
        };

        *self.lock() = next;
        self.settled.notify_all();
    }

    pub fn state(&self) -> CatalogState {
        self.lock().clone()
    }

    /// Current hero set; empty unless the load has completed successfully.
    pub fn snapshot(&self) -> HeroSet {
        match &*self.lock() {
            CatalogState::Ready { heroes, .. } => heroes.clone(),
            _ => HeroSet::default(),
        }
    }

    pub fn summaries(&self) -> Vec<HeroSummary> {
        match &*self.lock() {
            CatalogState::Ready { summaries, .. } => summaries.as_ref().clone(),
            _ => Vec::new(),
        }
    }

    /// Blocks until the load settles or `timeout` passes, then returns the snapshot.
    pub fn wait_ready(&self, timeout: Duration) -> HeroSet {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();

        while !state.is_settled() {
            let now = Instant::now();
            if now >= deadline {
                warn!("Hero catalog not ready after {:?}", timeout);
                break;
            }
            state = match self.settled.wait_timeout(state, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }

        drop(state);
        self.snapshot()
    }
}
