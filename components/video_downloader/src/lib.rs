// components/video_downloader/src/lib.rs
mod format;
mod progress;
mod types;
mod utils;
mod ytdlp;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use format::{FormatSelector, Quality, StreamMode, CPU_FRIENDLY_720P};
pub use progress::{DrawTarget, ProgressReporter};
pub use types::{
    DownloadError, DownloadOutcome, DownloadRequest, EngineOptions, ProgressEvent, VideoMetadata,
    FORMAT_UNAVAILABLE_MARKER,
};
pub use utils::{clean_url, output_template, parse_url};
pub use ytdlp::{parse_progress_line, Downloader, ProgressHook, YtDlp};

pub struct VideoDownloader {
    output_dir: PathBuf,
    downloader: Arc<dyn Downloader + Send + Sync>,
}

impl VideoDownloader {
    /// Create a new VideoDownloader that will store files in the given directory
    pub async fn new(output_dir: impl AsRef<Path>) -> Result<Self, DownloadError> {
        Self::new_with_downloader(output_dir, Arc::new(YtDlp)).await
    }

    /// Create a new VideoDownloader with a specific engine implementation
    pub async fn new_with_downloader(
        output_dir: impl AsRef<Path>,
        downloader: Arc<dyn Downloader + Send + Sync>,
    ) -> Result<Self, DownloadError> {
        downloader.check_available().await?;

        let output_dir = output_dir.as_ref();
        if !output_dir.exists() {
            tracing::info!("creating output directory {}", output_dir.display());
        }
        tokio::fs::create_dir_all(output_dir).await?;
        let output_dir = dunce::canonicalize(output_dir)?;

        Ok(Self {
            output_dir,
            downloader,
        })
    }

    pub fn request(&self, url: String, format: FormatSelector) -> DownloadRequest {
        DownloadRequest {
            url,
            format,
            output_template: output_template(&self.output_dir),
        }
    }

    /// Run one download. The engine is invoked exactly once; `reporter` sees
    /// every status record and is closed before this returns, whatever the
    /// result.
    pub async fn download<W: Write + Send>(
        &self,
        request: &DownloadRequest,
        reporter: &mut ProgressReporter<W>,
    ) -> Result<DownloadOutcome, DownloadError> {
        tracing::info!(url = %request.url, format = %request.format, "resolving metadata");
        let metadata = match self.downloader.fetch_metadata(&request.url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                reporter.close();
                return Err(e);
            }
        };

        tracing::info!(title = %metadata.title, "downloading");
        let options = EngineOptions::for_request(request);
        let result = self
            .downloader
            .download(&request.url, &options, &mut |event| reporter.handle(event))
            .await;
        reporter.close();

        match result {
            Ok(()) => {
                tracing::info!(title = %metadata.title, "completed");
                Ok(DownloadOutcome {
                    metadata,
                    format: request.format.to_string(),
                    output_dir: self.output_dir.clone(),
                    files: reporter.finished_files().to_vec(),
                    completed_at: chrono::Utc::now(),
                })
            }
            Err(DownloadError::DownloadFailed(text)) => {
                tracing::info!("failed");
                Err(DownloadError::from_engine_text(&request.format, text))
            }
            Err(e) => {
                tracing::info!("failed");
                Err(e)
            }
        }
    }
}
