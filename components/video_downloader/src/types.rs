// components/video_downloader/src/types.rs
use crate::format::FormatSelector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Text the engine uses when no stream matches the requested selector.
pub const FORMAT_UNAVAILABLE_MARKER: &str = "not available";

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Required dependency not found: {0}")]
    DependencyNotFound(&'static str),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Requested format {selector} is not available: {detail}")]
    FormatUnavailable {
        selector: FormatSelector,
        detail: String,
    },

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Metadata error: {0}")]
    MetadataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DownloadError {
    /// Map raw engine failure text onto the error taxonomy.
    pub fn from_engine_text(selector: &FormatSelector, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.contains(FORMAT_UNAVAILABLE_MARKER) {
            DownloadError::FormatUnavailable {
                selector: selector.clone(),
                detail: text,
            }
        } else {
            DownloadError::DownloadFailed(text)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: Option<String>,

    pub title: String,

    pub uploader: Option<String>,

    /// Duration in seconds
    pub duration: Option<f64>,

    pub webpage_url: Option<String>,
}

/// Everything the orchestrator needs for one run. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Link or bare video id, as validated by `parse_url`/`clean_url`
    pub url: String,
    pub format: FormatSelector,
    pub output_template: String,
}

/// Option bag handed to the engine for a single download call.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub format: FormatSelector,
    pub output_template: String,
    pub no_playlist: bool,
    pub quiet: bool,
    /// Suppress the engine's own progress rendering
    pub no_progress: bool,
}

impl EngineOptions {
    pub fn for_request(request: &DownloadRequest) -> Self {
        Self {
            format: request.format.clone(),
            output_template: request.output_template.clone(),
            no_playlist: true,
            quiet: true,
            no_progress: true,
        }
    }
}

/// Status record reported by the engine while a download runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Downloading {
        downloaded_bytes: u64,
        total_bytes: Option<u64>,
        filename: Option<String>,
    },
    Finished {
        filename: Option<String>,
    },
    Other(String),
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub metadata: VideoMetadata,

    pub format: String,

    pub output_dir: PathBuf,

    /// Files the engine reported as finished, in order
    pub files: Vec<String>,

    pub completed_at: DateTime<Utc>,
}
