// components/video_downloader/src/progress.rs
//! Terminal progress for a running download, driven by engine status records.
use crate::types::ProgressEvent;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{prefix} {wide_bar:.cyan/blue} {bytes}/{total_bytes} [{elapsed}<{eta}, {bytes_per_sec}]";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {prefix} {bytes} [{elapsed}, {bytes_per_sec}]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawTarget {
    Stderr,
    Hidden,
}

struct ActiveBar {
    bar: ProgressBar,
    /// Last cumulative byte count the engine reported for this file
    last_seen: u64,
}

/// Receives engine status records for one download run.
///
/// A bar is opened on the first `Downloading` record of each file and closed
/// on `Finished`. Closing is idempotent and also happens on drop, so an
/// aborted run never leaves a half-drawn line behind.
pub struct ProgressReporter<W: Write = io::Stdout> {
    out: W,
    target: DrawTarget,
    active: Option<ActiveBar>,
    finished_files: Vec<String>,
}

impl ProgressReporter<io::Stdout> {
    pub fn terminal() -> Self {
        Self::new(io::stdout(), DrawTarget::Stderr)
    }
}

impl<W: Write> ProgressReporter<W> {
    pub fn new(out: W, target: DrawTarget) -> Self {
        Self {
            out,
            target,
            active: None,
            finished_files: Vec::new(),
        }
    }

    pub fn handle(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Downloading {
                downloaded_bytes,
                total_bytes,
                filename,
            } => self.on_downloading(downloaded_bytes, total_bytes, filename.as_deref()),
            ProgressEvent::Finished { filename } => self.on_finished(filename),
            ProgressEvent::Other(status) => {
                tracing::debug!(%status, "ignoring progress status");
            }
        }
    }

    /// Abandon the bar, if one is open, leaving the terminal on a fresh line.
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            active.bar.abandon();
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn position(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.bar.position())
    }

    pub fn finished_files(&self) -> &[String] {
        &self.finished_files
    }

    fn on_downloading(&mut self, downloaded: u64, total: Option<u64>, filename: Option<&str>) {
        let target = self.target;
        let active = self.active.get_or_insert_with(|| ActiveBar {
            bar: open_bar(target, total, filename),
            last_seen: 0,
        });

        if let Some(total) = total {
            let total = total.max(active.last_seen);
            if active.bar.length() != Some(total) {
                if active.bar.length().is_none() {
                    active.bar.set_style(bar_style());
                }
                active.bar.set_length(total);
            }
        }

        let delta = downloaded.saturating_sub(active.last_seen);
        if delta > 0 {
            active.bar.inc(delta);
            active.last_seen = downloaded;
        }
    }

    fn on_finished(&mut self, filename: Option<String>) {
        if let Some(active) = self.active.take() {
            active.bar.finish();
        }

        let name = filename
            .as_deref()
            .map(display_name)
            .unwrap_or_else(|| "unknown file".to_string());
        if let Err(e) = writeln!(self.out, "\n✅ Download complete: {name}") {
            tracing::warn!("could not write completion line: {e}");
        }
        if let Some(filename) = filename {
            self.finished_files.push(filename);
        }
    }
}

impl<W: Write> Drop for ProgressReporter<W> {
    fn drop(&mut self) {
        self.close();
    }
}

fn open_bar(target: DrawTarget, total: Option<u64>, filename: Option<&str>) -> ProgressBar {
    let draw_target = match target {
        DrawTarget::Stderr => ProgressDrawTarget::stderr(),
        DrawTarget::Hidden => ProgressDrawTarget::hidden(),
    };
    let bar = ProgressBar::with_draw_target(total, draw_target);
    match total {
        Some(_) => bar.set_style(bar_style()),
        None => {
            bar.set_style(spinner_style());
            if target == DrawTarget::Stderr {
                bar.enable_steady_tick(Duration::from_millis(120));
            }
        }
    }
    bar.set_prefix(
        filename
            .map(display_name)
            .unwrap_or_else(|| "downloading...".to_string()),
    );
    bar
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
