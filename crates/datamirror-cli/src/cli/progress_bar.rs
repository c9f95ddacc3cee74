//! Terminal progress bar for archive fetches.

use datamirror_core::progress::{FetchProgress, ProgressObserver};
use datamirror_core::url_model::archive_file_name;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] [{bar:40.green/white}] {bytes}/{total_bytes} @ {bytes_per_sec}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg} [{elapsed_precise}] {bytes} @ {bytes_per_sec}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Draws a bar when the server reports a size, a spinner otherwise.
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressObserver for BarProgress {
    fn on_start(&mut self, url: &str) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.set_message(archive_file_name(url).unwrap_or_else(|_| url.to_string()));
        bar.enable_steady_tick(Duration::from_millis(200));
        self.bar = Some(bar);
    }

    fn on_progress(&mut self, progress: &FetchProgress) {
        let Some(bar) = &self.bar else {
            return;
        };
        if let Some(total) = progress.total_bytes {
            if bar.length() != Some(total) {
                bar.set_length(total);
                bar.set_style(bar_style());
            }
        }
        bar.set_position(progress.bytes_done);
    }

    fn on_finish(&mut self, progress: &FetchProgress) {
        if let Some(bar) = self.bar.take() {
            bar.set_position(progress.bytes_done);
            bar.finish();
        }
    }
}
