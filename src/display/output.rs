use crate::api::models::HeroSummary;
use crate::catalog::{is_broken_map, map_display_name, MAPS};
use crate::display::report::{ReportSection, ReportSink, MAP_UNAVAILABLE_LINE};
use colored::*;
use indicatif::ProgressBar;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MapRow {
    #[tabled(rename = "#")]
    number: String,
    key: String,
    name: String,
    status: String,
}

#[derive(Tabled)]
struct HeroRow {
    key: String,
    name: String,
    role: String,
}

/// Prints each section as it opens and each line as it arrives, above the progress bar.
pub struct TerminalSink {
    progress: ProgressBar,
}

impl TerminalSink {
    pub fn new(progress: ProgressBar) -> Self {
        TerminalSink { progress }
    }

    fn print(&self, text: String) {
        self.progress.suspend(|| println!("{}", text));
    }
}

fn colour_line(line: &str) -> ColoredString {
    if line.contains("Winrate:") {
        line.green()
    } else if line.ends_with("Network error") || line.contains("API error") {
        line.red()
    } else {
        line.yellow()
    }
}

impl ReportSink for TerminalSink {
    fn run_started(&mut self, total_tasks: usize) {
        self.progress.set_length(total_tasks as u64);
    }

    fn section_opened(&mut self, section: &ReportSection) {
        self.print(format!("\n{}", section.title.bold().cyan()));
        self.print(format!("{}", "-".repeat(60).cyan()));
    }

    fn line_appended(&mut self, _section: &ReportSection, line: &str) {
        self.print(format!("{}", colour_line(line)));
    }

    fn section_replaced(&mut self, section: &ReportSection) {
        // Lines already on screen cannot be taken back; only the new body is printed.
        for line in &section.lines {
            self.print(format!("{}", line.as_str().yellow()));
        }
    }
}

/// Swallows updates when only the finished report is printed (`--json`, `--plain`).
pub struct QuietSink;

impl ReportSink for QuietSink {
    fn section_opened(&mut self, _section: &ReportSection) {}
    fn line_appended(&mut self, _section: &ReportSection, _line: &str) {}
    fn section_replaced(&mut self, _section: &ReportSection) {}
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn display_maps() {
    println!("\n{}", "🗺️  MAPS".bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    let rows: Vec<MapRow> = MAPS
        .iter()
        .enumerate()
        .map(|(idx, map)| MapRow {
            number: format!("{}", idx + 1),
            key: map.to_string(),
            name: map_display_name(map),
            status: if is_broken_map(map) {
                "⚠ no data".yellow().to_string()
            } else {
                "ok".green().to_string()
            },
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
    println!(
        "Maps marked {} always report \"{}\".\n",
        "⚠".yellow(),
        MAP_UNAVAILABLE_LINE
    );
}

pub fn display_heroes(heroes: &[HeroSummary]) {
    if heroes.is_empty() {
        println!("{}", "No heroes available (catalog did not load)".yellow());
        return;
    }

    println!("\n{}", format!("🦸 HEROES ({})", heroes.len()).bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    let mut sorted: Vec<&HeroSummary> = heroes.iter().collect();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));

    let rows: Vec<HeroRow> = sorted
        .into_iter()
        .map(|hero| HeroRow {
            key: hero.key.clone(),
            name: hero.name.clone(),
            role: hero.role.clone().unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}
