use crate::catalog::{Gamemode, HeroSet};
use crate::display::report::{Report, ReportAccumulator, ReportSink};
use crate::error::AppError;
use crate::executor::{FetchExecutor, StatResult, StatsSource};
use crate::planner::{plan, MapId, QueryTask, RegionScope};
use crate::rate_limit::Pacer;
use crate::validate::validate;
use tracing::info;

/// What the user asked for, as collected by the CLI.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub heroes: String,
    pub scope: RegionScope,
    pub gamemode: Gamemode,
    pub map: Option<MapId>,
}

/// Validates, plans, and executes one run, streaming the report into `sink`.
///
/// Only an invalid or empty hero list aborts, and it does so before any request is made.
/// `on_progress` sees every result after the report has absorbed it.
pub fn run_report<S, F>(
    request: &RunRequest,
    known_heroes: &HeroSet,
    source: &S,
    pacer: Box<dyn Pacer>,
    sink: &mut dyn ReportSink,
    mut on_progress: F,
) -> Result<Report, AppError>
where
    S: StatsSource + ?Sized,
    F: FnMut(&QueryTask, &StatResult),
{
    let heroes = validate(&request.heroes, known_heroes)?;
    if heroes.is_empty() {
        return Err(AppError::NoHeroes);
    }

    let tasks = plan(&heroes, request.scope, request.gamemode, request.map.as_ref());
    info!(
        "Planned {} requests for {} heroes ({}, {} regions)",
        tasks.len(),
        heroes.len(),
        request.gamemode,
        request.scope.regions().len()
    );

    sink.run_started(tasks.len());
    let mut report = ReportAccumulator::new(request.gamemode, request.map.clone(), sink);
    let mut executor = FetchExecutor::new(source, pacer);
    executor.execute_all(&tasks, |task, result| {
        report.on_result(task, result);
        on_progress(task, result);
    });

    Ok(report.finish())
}
