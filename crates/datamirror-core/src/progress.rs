//! Progress reporting for archive fetches (bytes done, rate).
//!
//! Purely cosmetic: the fetcher reports to an optional [`ProgressObserver`],
//! and nothing in the pipeline depends on what the observer does.

/// Snapshot of one fetch's progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchProgress {
    /// Bytes received so far.
    pub bytes_done: u64,
    /// Total size, when the server reports it.
    pub total_bytes: Option<u64>,
    /// Elapsed time since the fetch started (seconds).
    pub elapsed_secs: f64,
}

impl FetchProgress {
    /// Download rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Fraction complete in [0.0, 1.0]; `None` when the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(1.0),
            Some(total) => Some((self.bytes_done as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}

/// Receives progress callbacks from a fetcher.
pub trait ProgressObserver {
    fn on_start(&mut self, _url: &str) {}
    fn on_progress(&mut self, progress: &FetchProgress);
    fn on_finish(&mut self, _progress: &FetchProgress) {}
}

/// Observer that logs every 10% step (or every 8 MiB when the size is unknown).
#[derive(Debug, Default)]
pub struct LogProgress {
    last_step: u64,
}

const UNKNOWN_SIZE_STEP: u64 = 8 * 1024 * 1024;

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn step_of(progress: &FetchProgress) -> u64 {
        match progress.fraction() {
            Some(f) => (f * 10.0).floor() as u64,
            None => progress.bytes_done / UNKNOWN_SIZE_STEP,
        }
    }
}

impl ProgressObserver for LogProgress {
    fn on_start(&mut self, url: &str) {
        self.last_step = 0;
        tracing::info!("fetching {}", url);
    }

    fn on_progress(&mut self, progress: &FetchProgress) {
        let step = Self::step_of(progress);
        if step <= self.last_step {
            return;
        }
        self.last_step = step;
        match progress.total_bytes {
            Some(total) => tracing::info!(
                "fetched {}/{} bytes ({:.0}%)",
                progress.bytes_done,
                total,
                progress.fraction().unwrap_or(0.0) * 100.0
            ),
            None => tracing::info!("fetched {} bytes", progress.bytes_done),
        }
    }

    fn on_finish(&mut self, progress: &FetchProgress) {
        tracing::info!(
            "fetch finished: {} bytes in {:.1}s ({:.0} B/s)",
            progress.bytes_done,
            progress.elapsed_secs,
            progress.bytes_per_sec()
        );
    }
}
