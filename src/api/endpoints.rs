// Overfast API paths and query construction

use crate::planner::QueryTask;

pub const HEROES_PATH: &str = "/heroes";
pub const HERO_STATS_PATH: &str = "/heroes/stats";
pub const PLATFORM: &str = "pc";

pub fn heroes_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), HEROES_PATH)
}

pub fn hero_stats_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), HERO_STATS_PATH)
}

/// Query parameters for one stats request, in the order they are sent.
pub fn hero_stats_query(task: &QueryTask) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("platform", PLATFORM.to_string()),
        ("gamemode", task.gamemode.as_str().to_string()),
        ("region", task.region.as_str().to_string()),
    ];
    if let Some(rank) = task.rank {
        params.push(("competitive_division", rank.as_str().to_string()));
    }
    if let Some(map) = &task.map {
        params.push(("map", map.as_str().to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Gamemode, Rank, Region};
    use crate::planner::MapId;
    use crate::validate::HeroKey;
    use pretty_assertions::assert_eq;

    fn task(rank: Option<Rank>, map: Option<&str>) -> QueryTask {
        QueryTask {
            hero: HeroKey::new("ana"),
            hero_slot: 0,
            region: Region::Europe,
            gamemode: if rank.is_some() {
                Gamemode::Competitive
            } else {
                Gamemode::Quickplay
            },
            rank,
            map: map.map(MapId::new),
        }
    }

    #[test]
    fn test_urls_tolerate_trailing_slash() {
        assert_eq!(
            heroes_url("https://overfast-api.tekrop.fr/"),
            "https://overfast-api.tekrop.fr/heroes"
        );
        assert_eq!(
            hero_stats_url("http://localhost:8000"),
            "http://localhost:8000/heroes/stats"
        );
    }

    #[test]
    fn test_quickplay_query() {
        assert_eq!(
            hero_stats_query(&task(None, None)),
            vec![
                ("platform", "pc".to_string()),
                ("gamemode", "quickplay".to_string()),
                ("region", "europe".to_string()),
            ]
        );
    }

    #[test]
    fn test_competitive_query_with_map() {
        assert_eq!(
            hero_stats_query(&task(Some(Rank::Grandmaster), Some("kings-row"))),
            vec![
                ("platform", "pc".to_string()),
                ("gamemode", "competitive".to_string()),
                ("region", "europe".to_string()),
                ("competitive_division", "grandmaster".to_string()),
                ("map", "kings-row".to_string()),
            ]
        );
    }
}
