use crate::error::AppError;
use crate::rate_limit::PacingMode;
use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://overfast-api.tekrop.fr";
pub const DEFAULT_PACING_MS: u64 = 400;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CATALOG_WAIT_SECS: u64 = 10;
const DEFAULT_BURST: u64 = 1;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub pacing: PacingMode,
    pub pacing_interval: Duration,
    /// Token bucket only: requests allowed back to back before pacing kicks in.
    pub burst: NonZeroU32,
    pub timeout: Duration,
    pub catalog_wait: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            pacing: PacingMode::Fixed,
            pacing_interval: Duration::from_millis(DEFAULT_PACING_MS),
            burst: NonZeroU32::MIN,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            catalog_wait: Duration::from_secs(DEFAULT_CATALOG_WAIT_SECS),
        }
    }
}

impl Config {
    /// Reads `./.env`, then the per-user file, then the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        if let Some(path) = Self::user_env_path() {
            dotenvy::from_path(path).ok();
        }

        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn user_env_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hero_stats").join(".env"))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("OVERFAST_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let pacing = match lookup("HERO_STATS_PACING") {
            Some(raw) => raw.parse::<PacingMode>()?,
            None => PacingMode::Fixed,
        };

        let pacing_ms = parse_u64(&lookup, "HERO_STATS_PACING_MS", DEFAULT_PACING_MS)?;
        let burst = parse_burst(parse_u64(&lookup, "HERO_STATS_BURST", DEFAULT_BURST)?)?;
        let timeout_secs = parse_u64(&lookup, "HERO_STATS_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let wait_secs = parse_u64(
            &lookup,
            "HERO_STATS_CATALOG_WAIT_SECS",
            DEFAULT_CATALOG_WAIT_SECS,
        )?;

        Ok(Config {
            base_url,
            pacing,
            pacing_interval: Duration::from_millis(pacing_ms),
            burst,
            timeout: Duration::from_secs(timeout_secs),
            catalog_wait: Duration::from_secs(wait_secs),
        })
    }
}

fn parse_u64<F>(lookup: &F, name: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            AppError::ConfigError(format!("{} must be a whole number, got {:?}", name, raw))
        }),
        None => Ok(default),
    }
}

/// Burst sizes must be at least 1 and fit governor's `u32` quota.
pub fn parse_burst(raw: u64) -> Result<NonZeroU32, AppError> {
    u32::try_from(raw)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| {
            AppError::ConfigError(format!(
                "burst must be between 1 and {}, got {}",
                u32::MAX,
                raw
            ))
        })
}
