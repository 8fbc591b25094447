//! Builds the per-(hero, region) report as results come in.

use crate::catalog::{Gamemode, Region};
use crate::executor::StatResult;
use crate::planner::{MapId, QueryTask};
use crate::validate::HeroKey;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

pub const COLUMN_WIDTH: usize = 12;
pub const MAP_UNAVAILABLE_LINE: &str = "No data available for this map";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub hero: HeroKey,
    pub region: Region,
    pub title: String,
    pub lines: Vec<String>,
    #[serde(skip)]
    map_unavailable: bool,
}

impl ReportSection {
    fn new(hero: &HeroKey, region: Region) -> Self {
        ReportSection {
            hero: hero.clone(),
            region,
            title: format!(
                "{} - {}",
                hero.as_str().to_uppercase(),
                region.as_str().to_uppercase()
            ),
            lines: Vec::new(),
            map_unavailable: false,
        }
    }
}

/// Receives report changes as they happen.
pub trait ReportSink {
    fn run_started(&mut self, _total_tasks: usize) {}
    fn section_opened(&mut self, section: &ReportSection);
    fn line_appended(&mut self, section: &ReportSection, line: &str);
    /// The section body was replaced wholesale; `section.lines` holds the new body.
    fn section_replaced(&mut self, section: &ReportSection);
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub gamemode: Gamemode,
    pub map: Option<MapId>,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|section| {
                let mut block = section.title.clone();
                for line in &section.lines {
                    block.push('\n');
                    block.push_str(line);
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub struct ReportAccumulator<'s> {
    gamemode: Gamemode,
    map: Option<MapId>,
    sections: Vec<ReportSection>,
    by_key: HashMap<(usize, Region), usize>,
    sink: &'s mut dyn ReportSink,
}

impl<'s> ReportAccumulator<'s> {
    pub fn new(gamemode: Gamemode, map: Option<MapId>, sink: &'s mut dyn ReportSink) -> Self {
        ReportAccumulator {
            gamemode,
            map,
            sections: Vec::new(),
            by_key: HashMap::new(),
            sink,
        }
    }

    pub fn on_result(&mut self, task: &QueryTask, result: &StatResult) {
        let key = (task.hero_slot, task.region);
        let index = match self.by_key.get(&key) {
            Some(&index) => index,
            None => {
                let section = ReportSection::new(&task.hero, task.region);
                self.sink.section_opened(&section);
                self.sections.push(section);
                self.by_key.insert(key, self.sections.len() - 1);
                self.sections.len() - 1
            }
        };

        let section = &mut self.sections[index];
        if section.map_unavailable {
            return;
        }

        if *result == StatResult::MapUnavailable {
            section.map_unavailable = true;
            section.lines = vec![MAP_UNAVAILABLE_LINE.to_string()];
            self.sink.section_replaced(section);
            return;
        }

        let line = format_line(task, result);
        section.lines.push(line.clone());
        self.sink.line_appended(section, &line);
    }

    pub fn finish(self) -> Report {
        Report {
            generated_at: Utc::now(),
            gamemode: self.gamemode,
            map: self.map,
            sections: self.sections,
        }
    }
}

/// Formats one result line. Competitive lines start with the padded rank name.
pub fn format_line(task: &QueryTask, result: &StatResult) -> String {
    let label = task
        .rank
        .map(|rank| format!("{:<width$} ", rank.as_str(), width = COLUMN_WIDTH))
        .unwrap_or_default();

    let body = match result {
        StatResult::Success { winrate, pickrate } => format!(
            "Winrate: {:<width$} Pickrate: {:<width$}",
            percent(*winrate),
            percent(*pickrate),
            width = COLUMN_WIDTH
        ),
        StatResult::NotFound => "No data".to_string(),
        StatResult::HttpError { status: 404 } if task.map.is_some() => {
            "No stats available for this map".to_string()
        }
        StatResult::HttpError { status } => format!("API error (HTTP {})", status),
        StatResult::NetworkError => "Network error".to_string(),
        StatResult::MapUnavailable => MAP_UNAVAILABLE_LINE.to_string(),
    };

    format!("{}{}", label, body).trim_end().to_string()
}

// Rounds the nearest double half away from zero: 52.345 shows as 52.35, but 1.005 is
// stored just below and shows as 1.00.
fn percent(value: f64) -> String {
    format!("{:.2}%", (value * 100.0).round() / 100.0)
}
