mod api;
mod catalog;
mod config;
mod display;
mod error;
mod executor;
mod orchestrator;
mod planner;
mod rate_limit;
mod validate;

use anyhow::Context;
use api::client::OverfastClient;
use catalog::{map_display_name, CatalogState, Gamemode, HeroCatalog};
use clap::Parser;
use config::{parse_burst, Config};
use display::output::{
    display_error, display_heroes, display_info, display_maps, display_success, display_warning,
    QuietSink, TerminalSink,
};
use display::report::ReportSink;
use indicatif::{ProgressBar, ProgressStyle};
use orchestrator::{run_report, RunRequest};
use planner::RegionScope;
use rate_limit::{build_pacer, PacingMode};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "hero_stats")]
#[command(about = "Win rate and pick rate per hero, region and rank", long_about = None)]
#[command(version)]
struct Args {
    /// Comma-separated hero keys, e.g. "ana, mercy"
    #[arg(required_unless_present_any = ["list_maps", "list_heroes"])]
    heroes: Option<String>,

    /// Query americas, europe and asia instead of americas only
    #[arg(short, long)]
    all_regions: bool,

    /// Game mode; competitive queries every rank
    #[arg(short, long, value_enum, default_value_t = Gamemode::Quickplay)]
    gamemode: Gamemode,

    /// Only count games on this map (see --list-maps)
    #[arg(short, long)]
    map: Option<String>,

    /// API base URL (overrides OVERFAST_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Delay between stats requests in milliseconds (default: 400)
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Pace requests with a token bucket instead of a fixed sleep
    #[arg(long)]
    token_bucket: bool,

    /// Token bucket only: requests allowed back to back (default: 1)
    #[arg(long)]
    burst: Option<u64>,

    /// Per-request timeout in seconds (default: 30)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the finished report as JSON instead of streaming text
    #[arg(long, conflicts_with = "plain")]
    json: bool,

    /// Print the finished report as uncoloured text instead of streaming it
    #[arg(long)]
    plain: bool,

    /// List map keys and exit
    #[arg(long)]
    list_maps: bool,

    /// List hero keys from the API and exit
    #[arg(long)]
    list_heroes: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    if args.list_maps {
        display_maps();
        return Ok(());
    }

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(ms) = args.pacing_ms {
        config.pacing_interval = Duration::from_millis(ms);
    }
    if args.token_bucket {
        config.pacing = PacingMode::TokenBucket;
    }
    if let Some(burst) = args.burst {
        config.burst = parse_burst(burst)?;
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    tracing::info!(
        "Starting hero_stats v{} against {}",
        env!("CARGO_PKG_VERSION"),
        config.base_url
    );

    // Anything but streaming output keeps stdout for the finished report.
    let streaming = !(args.json || args.plain);

    let map = validate::validate_map(args.map.as_deref())?;

    // Hero list loads in the background while the rest of the input is checked.
    let client = OverfastClient::new(&config);
    let catalog = HeroCatalog::new();
    let _loader = catalog.spawn_load(client.clone());

    if args.list_heroes {
        catalog.wait_ready(config.catalog_wait);
        display_heroes(&catalog.summaries());
        return Ok(());
    }

    if let Some(map) = &map {
        if map.is_broken() && streaming {
            display_warning(&format!(
                "{} has no data in the API; every section will say so",
                map_display_name(map.as_str())
            ));
        }
    }

    let request = RunRequest {
        heroes: args.heroes.unwrap_or_default(),
        scope: RegionScope {
            all_regions: args.all_regions,
        },
        gamemode: args.gamemode,
        map,
    };

    let known_heroes = catalog.wait_ready(config.catalog_wait);
    if known_heroes.is_empty() {
        match catalog.state() {
            CatalogState::Failed(reason) => {
                tracing::warn!("Validating against an empty hero catalog: {}", reason)
            }
            _ => tracing::warn!("Hero catalog still loading; every hero will be rejected"),
        }
    } else {
        tracing::debug!("{} heroes known", known_heroes.len());
    }

    if streaming {
        display_info(&format!(
            "Fetching {} stats from {} (pacing: {}, {:?})",
            request.gamemode, config.base_url, config.pacing, config.pacing_interval
        ));
    }

    let progress = if streaming {
        ProgressBar::new(0)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} requests") {
        progress.set_style(style.progress_chars("=> "));
    }

    let mut terminal = TerminalSink::new(progress.clone());
    let mut quiet = QuietSink;
    let sink: &mut dyn ReportSink = if streaming { &mut terminal } else { &mut quiet };

    let pacer = build_pacer(config.pacing, config.pacing_interval, config.burst);
    let report = run_report(&request, &known_heroes, &client, pacer, sink, |_, _| {
        progress.inc(1)
    })?;
    progress.finish_and_clear();

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else if args.plain {
        println!("{}", report.render());
    } else {
        println!();
        display_success(&format!(
            "{} sections finished at {}",
            report.sections.len(),
            report.generated_at.with_timezone(&chrono::Local).format("%H:%M:%S")
        ));
    }

    Ok(())
}
