//! Single-stream HTTP GET of the dataset archive.
//!
//! Writes the response body sequentially to the destination, truncating any
//! previous content. There is no resume: a failed fetch leaves the file in an
//! undefined state and the caller re-verifies before trusting it.

use crate::error::{MirrorError, MirrorResult};
use crate::progress::{FetchProgress, ProgressObserver};
use curl::easy::Easy;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Retrieves a remote resource to a local path.
pub trait Fetcher {
    fn fetch(&mut self, url: &str, destination: &Path) -> MirrorResult<()>;
}

/// Transport settings for [`CurlFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    /// Whole-transfer timeout; zero disables it.
    pub timeout: Duration,
    /// Abort when slower than this many bytes/sec for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub max_redirections: u32,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(3600),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            max_redirections: 10,
            user_agent: concat!("datamirror/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// libcurl-backed fetcher with an optional progress observer.
pub struct CurlFetcher {
    options: FetchOptions,
    progress: Option<Box<dyn ProgressObserver>>,
}

impl CurlFetcher {
    pub fn new(options: FetchOptions) -> Self {
        Self {
            options,
            progress: None,
        }
    }

    pub fn with_progress(mut self, observer: Box<dyn ProgressObserver>) -> Self {
        self.progress = Some(observer);
        self
    }

    fn configure(&self, easy: &mut Easy, url: &str) -> Result<(), curl::Error> {
        let o = &self.options;
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(o.max_redirections)?;
        easy.connect_timeout(o.connect_timeout)?;
        easy.timeout(o.timeout)?;
        easy.low_speed_limit(o.low_speed_limit)?;
        easy.low_speed_time(o.low_speed_time)?;
        easy.useragent(&o.user_agent)?;
        easy.progress(self.progress.is_some())?;
        Ok(())
    }
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::new(FetchOptions::default())
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&mut self, url: &str, destination: &Path) -> MirrorResult<()> {
        let network = |reason: String| MirrorError::Network {
            url: url.to_string(),
            reason,
        };

        let mut file = File::create(destination)
            .map_err(|e| MirrorError::io("create archive file", destination, e))?;
        let mut easy = Easy::new();
        self.configure(&mut easy, url)
            .map_err(|e| network(e.to_string()))?;

        if let Some(observer) = self.progress.as_deref_mut() {
            observer.on_start(url);
        }
        let started = Instant::now();
        let mut bytes_done = 0u64;
        let mut write_err: Option<io::Error> = None;

        let outcome = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match file.write_all(data) {
                    Ok(()) => {
                        bytes_done += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        write_err = Some(e);
                        Ok(0) // abort transfer
                    }
                })
                .map_err(|e| network(e.to_string()))?;
            if let Some(observer) = self.progress.as_deref_mut() {
                transfer
                    .progress_function(|dl_total, dl_now, _, _| {
                        observer.on_progress(&FetchProgress {
                            bytes_done: dl_now as u64,
                            total_bytes: (dl_total > 0.0).then_some(dl_total as u64),
                            elapsed_secs: started.elapsed().as_secs_f64(),
                        });
                        true
                    })
                    .map_err(|e| network(e.to_string()))?;
            }
            transfer.perform()
        };

        if let Err(e) = outcome {
            return Err(match write_err {
                Some(io_err) => MirrorError::io("write archive file", destination, io_err),
                None => network(e.to_string()),
            });
        }

        let code = easy.response_code().map_err(|e| network(e.to_string()))?;
        if !(200..300).contains(&code) {
            return Err(network(format!("HTTP {}", code)));
        }
        file.sync_all()
            .map_err(|e| MirrorError::io("sync archive file", destination, e))?;

        let elapsed_secs = started.elapsed().as_secs_f64();
        tracing::debug!("fetched {} bytes from {} in {:.1}s", bytes_done, url, elapsed_secs);
        if let Some(observer) = self.progress.as_deref_mut() {
            observer.on_finish(&FetchProgress {
                bytes_done,
                total_bytes: Some(bytes_done),
                elapsed_secs,
            });
        }
        Ok(())
    }
}
