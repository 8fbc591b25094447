//! Runs planned stats requests one at a time and classifies each outcome.

use crate::api::models::HeroStatRecord;
use crate::planner::QueryTask;
use crate::rate_limit::Pacer;
use tracing::{debug, warn};

/// Outcome of a single task. Failures stay local to their task.
#[derive(Debug, Clone, PartialEq)]
pub enum StatResult {
    Success { winrate: f64, pickrate: f64 },
    NotFound,
    HttpError { status: u16 },
    NetworkError,
    MapUnavailable,
}

/// Why a stats request produced no payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchFailure {
    Status(u16),
    Transport(String),
    Parse(String),
}

pub trait StatsSource {
    fn fetch_stats(&self, task: &QueryTask) -> Result<Vec<HeroStatRecord>, FetchFailure>;
}

pub fn classify(
    task: &QueryTask,
    response: Result<Vec<HeroStatRecord>, FetchFailure>,
) -> StatResult {
    match response {
        Ok(records) => match records
            .iter()
            .find(|record| record.hero == task.hero.as_str())
        {
            None => StatResult::NotFound,
            Some(record) => match record.rates() {
                Some((winrate, pickrate)) => StatResult::Success { winrate, pickrate },
                // A record we cannot read counts as a bad body, same as a parse failure.
                None => {
                    warn!(
                        hero = %task.hero,
                        region = %task.region,
                        "stats record has no usable rates: {:?}",
                        record
                    );
                    StatResult::NetworkError
                }
            },
        },
        Err(FetchFailure::Status(status)) => StatResult::HttpError { status },
        Err(FetchFailure::Transport(reason)) | Err(FetchFailure::Parse(reason)) => {
            warn!(hero = %task.hero, region = %task.region, "stats request failed: {}", reason);
            StatResult::NetworkError
        }
    }
}

pub struct FetchExecutor<'a, S: StatsSource + ?Sized> {
    source: &'a S,
    pacer: Box<dyn Pacer>,
}

impl<'a, S: StatsSource + ?Sized> FetchExecutor<'a, S> {
    pub fn new(source: &'a S, pacer: Box<dyn Pacer>) -> Self {
        FetchExecutor { source, pacer }
    }

    /// Resolves one task. Broken maps short-circuit without pacing or I/O.
    pub fn execute(&mut self, task: &QueryTask) -> StatResult {
        if task.map.as_ref().is_some_and(|map| map.is_broken()) {
            debug!(hero = %task.hero, region = %task.region, "map unavailable, skipping request");
            return StatResult::MapUnavailable;
        }

        self.pacer.pace();
        classify(task, self.source.fetch_stats(task))
    }

    /// Runs every task in order and reports each result before starting the next.
    pub fn execute_all<F>(&mut self, tasks: &[QueryTask], mut on_result: F)
    where
        F: FnMut(&QueryTask, &StatResult),
    {
        for task in tasks {
            let result = self.execute(task);
            on_result(task, &result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Gamemode, Rank, Region};
    use crate::planner::{plan, MapId, RegionScope};
    use crate::validate::HeroKey;
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Replays canned responses and records every request.
    #[derive(Default)]
    struct ScriptedSource {
        responses: RefCell<VecDeque<Result<Vec<HeroStatRecord>, FetchFailure>>>,
        requests: RefCell<Vec<(String, Region, Option<Rank>)>>,
    }

    impl ScriptedSource {
        fn with(responses: Vec<Result<Vec<HeroStatRecord>, FetchFailure>>) -> Self {
            ScriptedSource {
                responses: RefCell::new(responses.into()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl StatsSource for ScriptedSource {
        fn fetch_stats(&self, task: &QueryTask) -> Result<Vec<HeroStatRecord>, FetchFailure> {
            self.requests
                .borrow_mut()
                .push((task.hero.to_string(), task.region, task.rank));
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    struct CountingPacer(Rc<Cell<usize>>);

    impl Pacer for CountingPacer {
        fn pace(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn record(hero: &str, winrate: f64, pickrate: f64) -> HeroStatRecord {
        HeroStatRecord {
            hero: hero.to_string(),
            winrate: Some(winrate),
            pickrate: Some(pickrate),
        }
    }

    fn heroes(keys: &[&str]) -> Vec<HeroKey> {
        keys.iter().map(|k| HeroKey::new(k)).collect()
    }

    #[test]
    fn test_results_arrive_once_per_task_in_plan_order() {
        let tasks = plan(
            &heroes(&["ana", "mercy"]),
            RegionScope { all_regions: true },
            Gamemode::Competitive,
            None,
        );
        let source = ScriptedSource::default();
        let paced = Rc::new(Cell::new(0));
        let mut executor = FetchExecutor::new(&source, Box::new(CountingPacer(paced.clone())));

        let mut seen = Vec::new();
        executor.execute_all(&tasks, |task, _| seen.push(task.clone()));

        assert_eq!(seen, tasks);
        assert_eq!(source.requests.borrow().len(), tasks.len());
        assert_eq!(paced.get(), tasks.len());
    }

    #[test]
    fn test_pacing_happens_before_each_request() {
        struct OrderCheck<'a> {
            paced: &'a Cell<usize>,
            calls: Cell<usize>,
        }
        impl StatsSource for OrderCheck<'_> {
            fn fetch_stats(&self, _: &QueryTask) -> Result<Vec<HeroStatRecord>, FetchFailure> {
                self.calls.set(self.calls.get() + 1);
                assert_eq!(self.paced.get(), self.calls.get());
                Ok(Vec::new())
            }
        }

        let paced = Rc::new(Cell::new(0));
        let source = OrderCheck {
            paced: &paced,
            calls: Cell::new(0),
        };
        let tasks = plan(
            &heroes(&["ana"]),
            RegionScope { all_regions: true },
            Gamemode::Quickplay,
            None,
        );
        let mut executor = FetchExecutor::new(&source, Box::new(CountingPacer(paced.clone())));
        executor.execute_all(&tasks, |_, _| {});
        assert_eq!(source.calls.get(), 3);
    }

    #[test]
    fn test_success_takes_values_verbatim() {
        let source = ScriptedSource::with(vec![Ok(vec![
            record("mercy", 49.0, 12.0),
            record("ana", 52.345, 7.1),
        ])]);
        let tasks = plan(
            &heroes(&["ana"]),
            RegionScope { all_regions: false },
            Gamemode::Quickplay,
            None,
        );
        let mut executor = FetchExecutor::new(&source, Box::new(CountingPacer(Rc::default())));

        assert_eq!(
            executor.execute(&tasks[0]),
            StatResult::Success {
                winrate: 52.345,
                pickrate: 7.1
            }
        );
    }

    #[test]
    fn test_unreadable_neighbour_does_not_hide_the_hero() {
        let task = &plan(
            &heroes(&["ana"]),
            RegionScope { all_regions: false },
            Gamemode::Quickplay,
            None,
        )[0];
        let hazard = HeroStatRecord {
            hero: "hazard".to_string(),
            winrate: None,
            pickrate: Some(0.0),
        };

        assert_eq!(
            classify(task, Ok(vec![record("ana", 52.3, 7.1), hazard.clone()])),
            StatResult::Success {
                winrate: 52.3,
                pickrate: 7.1
            }
        );

        let unreadable_ana = HeroStatRecord {
            hero: "ana".to_string(),
            ..hazard
        };
        assert_eq!(
            classify(task, Ok(vec![unreadable_ana])),
            StatResult::NetworkError
        );
    }

    #[test]
    fn test_failures_are_classified_and_do_not_stop_the_run() {
        let source = ScriptedSource::with(vec![
            Ok(vec![record("mercy", 49.0, 12.0)]),
            Err(FetchFailure::Status(500)),
            Err(FetchFailure::Transport("connection reset".to_string())),
            Err(FetchFailure::Parse("expected value at line 1".to_string())),
            Ok(vec![record("ana", 50.0, 5.0)]),
        ]);
        let tasks = plan(
            &heroes(&["ana"]),
            RegionScope { all_regions: false },
            Gamemode::Competitive,
            None,
        );
        let mut executor = FetchExecutor::new(&source, Box::new(CountingPacer(Rc::default())));

        let mut results = Vec::new();
        executor.execute_all(&tasks, |_, result| results.push(result.clone()));

        assert_eq!(results.len(), 7);
        assert_eq!(results[0], StatResult::NotFound);
        assert_eq!(results[1], StatResult::HttpError { status: 500 });
        assert_eq!(results[2], StatResult::NetworkError);
        assert_eq!(results[3], StatResult::NetworkError);
        assert_eq!(
            results[4],
            StatResult::Success {
                winrate: 50.0,
                pickrate: 5.0
            }
        );
    }

    #[test]
    fn test_broken_map_skips_pacing_and_network() {
        let map = MapId::new("hanaoka");
        let tasks = plan(
            &heroes(&["ana", "mercy"]),
            RegionScope { all_regions: true },
            Gamemode::Competitive,
            Some(&map),
        );
        let source = ScriptedSource::default();
        let paced = Rc::new(Cell::new(0));
        let mut executor = FetchExecutor::new(&source, Box::new(CountingPacer(paced.clone())));

        let mut results = Vec::new();
        executor.execute_all(&tasks, |_, result| results.push(result.clone()));

        assert_eq!(results.len(), tasks.len());
        assert!(results.iter().all(|r| *r == StatResult::MapUnavailable));
        assert!(source.requests.borrow().is_empty());
        assert_eq!(paced.get(), 0);
    }

    #[test]
    fn test_working_map_is_requested() {
        let map = MapId::new("kings-row");
        let tasks = plan(
            &heroes(&["ana"]),
            RegionScope { all_regions: false },
            Gamemode::Quickplay,
            Some(&map),
        );
        let source = ScriptedSource::with(vec![Err(FetchFailure::Status(404))]);
        let mut executor = FetchExecutor::new(&source, Box::new(CountingPacer(Rc::default())));

        assert_eq!(
            executor.execute(&tasks[0]),
            StatResult::HttpError { status: 404 }
        );
        assert_eq!(source.requests.borrow().len(), 1);
    }
}
