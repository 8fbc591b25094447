use crate::catalog::HeroSource;
use crate::config::Config;
use crate::error::AppError;
use crate::executor::{FetchFailure, StatsSource};
use crate::planner::QueryTask;
use tracing::debug;
use ureq::{Agent, AgentBuilder};

use super::endpoints::{hero_stats_query, hero_stats_url, heroes_url};
use super::models::*;

const USER_AGENT: &str = concat!("hero_stats/", env!("CARGO_PKG_VERSION"));

/// Blocking client for the Overfast API. Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct OverfastClient {
    agent: Agent,
    base_url: String,
}

impl OverfastClient {
    pub fn new(config: &Config) -> Self {
        let agent = AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build();
        OverfastClient {
            agent,
            base_url: config.base_url.clone(),
        }
    }

    pub fn get_heroes(&self) -> Result<Vec<HeroSummary>, AppError> {
        let url = heroes_url(&self.base_url);
        debug!("GET {}", url);

        self.agent
            .get(&url)
            .call()
            .map_err(|e| AppError::HttpError(e.to_string()))?
            .into_json::<Vec<HeroSummary>>()
            .map_err(|e| AppError::JsonError(e.to_string()))
    }

    /// One GET against the stats endpoint. No retries.
    pub fn get_hero_stats(&self, task: &QueryTask) -> Result<Vec<HeroStatRecord>, FetchFailure> {
        let url = hero_stats_url(&self.base_url);
        let mut request = self.agent.get(&url);
        for (name, value) in hero_stats_query(task) {
            request = request.query(name, &value);
        }
        debug!("GET {}", request.url());

        match request.call() {
            Ok(resp) => resp
                .into_json::<Vec<HeroStatRecord>>()
                .map_err(|e| FetchFailure::Parse(e.to_string())),
            Err(ureq::Error::Status(status, _)) => Err(FetchFailure::Status(status)),
            Err(ureq::Error::Transport(transport)) => {
                Err(FetchFailure::Transport(transport.to_string()))
            }
        }
    }
}

impl HeroSource for OverfastClient {
    fn fetch_heroes(&self) -> Result<Vec<HeroSummary>, AppError> {
        self.get_heroes()
    }
}

impl StatsSource for OverfastClient {
    fn fetch_stats(&self, task: &QueryTask) -> Result<Vec<HeroStatRecord>, FetchFailure> {
        self.get_hero_stats(task)
    }
}
