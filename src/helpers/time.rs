use chrono::Utc;
use tokio::time::Instant;

/// Current UNIX time in whole seconds, clamped at zero.
pub fn unix_seconds() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Wall-clock stopwatch used for the duration histograms.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch(Instant);

impl Stopwatch {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.0.elapsed().as_secs_f64()
    }
}
