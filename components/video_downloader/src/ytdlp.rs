// components/video_downloader/src/ytdlp.rs
use crate::types::{DownloadError, EngineOptions, ProgressEvent, VideoMetadata};
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

const YT_DLP: &str = "yt-dlp";

/// Marks our progress lines among whatever else the engine prints.
const PROGRESS_MARKER: &str = "[vdl-progress]";

/// Progress callback registered with the engine for one download.
pub type ProgressHook<'a> = dyn FnMut(ProgressEvent) + Send + 'a;

/// The external extraction engine.
#[async_trait]
pub trait Downloader {
    /// Check if the engine is installed and callable
    async fn check_available(&self) -> Result<(), DownloadError>;

    /// Fetch metadata about a video without downloading it. `url` may also
    /// be a bare video id.
    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata, DownloadError>;

    /// Download `url`, calling `hook` with every status record the engine
    /// reports. Returns the engine's failure text as `DownloadFailed`.
    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        hook: &mut ProgressHook<'_>,
    ) -> Result<(), DownloadError>;
}

pub struct YtDlp;

impl YtDlp {
    fn download_args(url: &str, options: &EngineOptions) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            options.format.as_str().to_string(),
            "--output".to_string(),
            options.output_template.clone(),
        ];
        if options.no_playlist {
            args.push("--no-playlist".to_string());
        }
        if options.quiet {
            args.extend(["--quiet".to_string(), "--no-warnings".to_string()]);
        }
        if options.no_progress {
            // Keep the progress hook alive under --quiet but swap the
            // built-in bar for one machine-readable line per update.
            args.extend([
                "--progress".to_string(),
                "--newline".to_string(),
                "--progress-template".to_string(),
                format!("download:{PROGRESS_MARKER}%(progress)j"),
            ]);
        }
        // ids may start with '-'
        args.extend(["--".to_string(), url.to_string()]);
        args
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn check_available(&self) -> Result<(), DownloadError> {
        which::which(YT_DLP)
            .map(|path| tracing::debug!("using {}", path.display()))
            .map_err(|_| DownloadError::DependencyNotFound(YT_DLP))
    }

    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata, DownloadError> {
        tracing::debug!(%url, "fetching metadata");

        let output = Command::new(YT_DLP)
            .arg("--dump-json")
            .arg("--no-download")
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg("--")
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(DownloadError::MetadataError(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| DownloadError::MetadataError(e.to_string()))
    }

    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        hook: &mut ProgressHook<'_>,
    ) -> Result<(), DownloadError> {
        let args = Self::download_args(url, options);
        tracing::debug!(?args, "starting {YT_DLP}");

        let mut child = Command::new(YT_DLP)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DownloadError::DownloadFailed(format!("{YT_DLP} stdout was not captured"))
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| {
            DownloadError::DownloadFailed(format!("{YT_DLP} stderr was not captured"))
        })?;

        let stderr_task = tokio::spawn(async move {
            let mut text = String::new();
            stderr.read_to_string(&mut text).await?;
            Ok::<_, std::io::Error>(text)
        });

        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            match parse_progress_line(&line) {
                Some(event) => hook(event),
                None if !line.trim().is_empty() => tracing::debug!("{YT_DLP}: {line}"),
                None => {}
            }
        }

        let status = child.wait().await?;
        let stderr_text = match stderr_task.await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(e.into()),
            Err(e) => format!("could not collect {YT_DLP} output: {e}"),
        };

        if !status.success() {
            let detail = error_text(&stderr_text)
                .unwrap_or_else(|| format!("{YT_DLP} exited with status: {status}"));
            return Err(DownloadError::DownloadFailed(detail));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RawProgress {
    status: String,
    downloaded_bytes: Option<f64>,
    total_bytes: Option<f64>,
    total_bytes_estimate: Option<f64>,
    filename: Option<String>,
}

/// Turn one line of engine output into a status record, if it is one of ours.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let json = line.trim().strip_prefix(PROGRESS_MARKER)?;
    let raw: RawProgress = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!("unreadable progress record: {e}");
            return None;
        }
    };

    let bytes = |value: Option<f64>| value.filter(|v| *v >= 0.0).map(|v| v as u64);
    let event = match raw.status.as_str() {
        "downloading" => ProgressEvent::Downloading {
            downloaded_bytes: bytes(raw.downloaded_bytes).unwrap_or(0),
            total_bytes: bytes(raw.total_bytes).or_else(|| bytes(raw.total_bytes_estimate)),
            filename: raw.filename,
        },
        "finished" => ProgressEvent::Finished {
            filename: raw.filename,
        },
        _ => ProgressEvent::Other(raw.status),
    };
    Some(event)
}

/// The `ERROR:` lines of the engine's stderr, or the whole text if none.
fn error_text(stderr: &str) -> Option<String> {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("ERROR:"))
        .collect();
    if !errors.is_empty() {
        return Some(errors.join("\n"));
    }
    let trimmed = stderr.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
pub mod stub {
    use super::*;
    use std::sync::Mutex;

    /// Engine double that replays scripted events, then succeeds or fails.
    #[derive(Default)]
    pub struct DownloaderStub {
        pub title: String,
        pub events: Vec<ProgressEvent>,
        pub failure: Option<String>,
        pub download_calls: Mutex<Vec<EngineOptions>>,
    }

    impl DownloaderStub {
        pub fn new(title: &str) -> Self {
            Self {
                title: title.to_string(),
                ..Default::default()
            }
        }

        pub fn with_events(mut self, events: Vec<ProgressEvent>) -> Self {
            self.events = events;
            self
        }

        pub fn failing_with(mut self, text: &str) -> Self {
            self.failure = Some(text.to_string());
            self
        }

        pub fn calls(&self) -> Vec<EngineOptions> {
            self.download_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Downloader for DownloaderStub {
        async fn check_available(&self) -> Result<(), DownloadError> {
            Ok(())
        }

        async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata, DownloadError> {
            Ok(VideoMetadata {
                id: Some("stub".to_string()),
                title: self.title.clone(),
                uploader: Some("Test Uploader".to_string()),
                duration: Some(42.0),
                webpage_url: Some(url.to_string()),
            })
        }

        async fn download(
            &self,
            _url: &str,
            options: &EngineOptions,
            hook: &mut ProgressHook<'_>,
        ) -> Result<(), DownloadError> {
            self.download_calls.lock().unwrap().push(options.clone());
            for event in &self.events {
                hook(event.clone());
            }
            match &self.failure {
                Some(text) => Err(DownloadError::DownloadFailed(text.clone())),
                None => Ok(()),
            }
        }
    }
}
