use crate::error::AppError;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Suspends the caller before each outgoing stats request.
pub trait Pacer {
    fn pace(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingMode {
    Fixed,
    TokenBucket,
}

impl FromStr for PacingMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(PacingMode::Fixed),
            "token-bucket" | "token_bucket" => Ok(PacingMode::TokenBucket),
            other => Err(AppError::ConfigError(format!(
                "unknown pacing mode {:?} (expected \"fixed\" or \"token-bucket\")",
                other
            ))),
        }
    }
}

impl fmt::Display for PacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacingMode::Fixed => write!(f, "fixed"),
            PacingMode::TokenBucket => write!(f, "token-bucket"),
        }
    }
}

/// Sleeps the same interval before every request, including the first.
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        FixedInterval { interval }
    }
}

impl Pacer for FixedInterval {
    fn pace(&mut self) {
        if !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
    }
}

/// One request per interval on average, with a small burst allowance.
pub struct TokenBucket {
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    clock: DefaultClock,
}

impl TokenBucket {
    /// Returns `None` for a zero interval, which governor cannot express as a quota.
    pub fn new(interval: Duration, burst: NonZeroU32) -> Option<Self> {
        let quota = Quota::with_period(interval)?.allow_burst(burst);
        Some(TokenBucket {
            rate_limiter: RateLimiter::direct(quota),
            clock: DefaultClock::default(),
        })
    }
}

impl Pacer for TokenBucket {
    fn pace(&mut self) {
        loop {
            match self.rate_limiter.check() {
                Ok(()) => return,
                Err(not_until) => {
                    let wait = not_until.wait_time_from(self.clock.now());
                    debug!("token bucket empty, waiting {:?}", wait);
                    thread::sleep(wait);
                }
            }
        }
    }
}

/// `burst` only applies to the token bucket; the fixed interval always sleeps.
pub fn build_pacer(mode: PacingMode, interval: Duration, burst: NonZeroU32) -> Box<dyn Pacer> {
    match mode {
        PacingMode::Fixed => Box::new(FixedInterval::new(interval)),
        PacingMode::TokenBucket => match TokenBucket::new(interval, burst) {
            Some(bucket) => Box::new(bucket),
            None => Box::new(FixedInterval::new(interval)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_parse_pacing_mode() {
        assert_eq!("fixed".parse::<PacingMode>().unwrap(), PacingMode::Fixed);
        assert_eq!(
            "Token-Bucket".parse::<PacingMode>().unwrap(),
            PacingMode::TokenBucket
        );
        assert!("jitter".parse::<PacingMode>().is_err());
    }

    #[test]
    fn test_fixed_interval_sleeps_before_each_call() {
        let mut pacer = FixedInterval::new(Duration::from_millis(20));
        let start = Instant::now();
        pacer.pace();
        pacer.pace();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_zero_interval_token_bucket_is_rejected() {
        assert!(TokenBucket::new(Duration::ZERO, NonZeroU32::MIN).is_none());
    }

    #[test]
    fn test_token_bucket_spaces_out_requests() {
        let mut pacer = TokenBucket::new(Duration::from_millis(30), NonZeroU32::MIN).unwrap();
        let start = Instant::now();
        pacer.pace();
        pacer.pace();
        pacer.pace();
        // the first cell is free; the next two each wait for a refill
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_burst_lets_requests_through_back_to_back() {
        let burst = NonZeroU32::new(3).unwrap();
        let mut pacer = build_pacer(PacingMode::TokenBucket, Duration::from_millis(200), burst);
        let start = Instant::now();
        pacer.pace();
        pacer.pace();
        pacer.pace();
        assert!(start.elapsed() < Duration::from_millis(150));

        // bucket drained; the fourth waits for a refill
        pacer.pace();
        assert!(start.elapsed() >= Duration::from_millis(150));
    }
}
