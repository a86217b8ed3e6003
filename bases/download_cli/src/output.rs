// bases/download_cli/src/output.rs
use std::path::Path;
use video_downloader::{DownloadError, DownloadOutcome, FormatSelector};

pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_creating_directory(&self, dir: &Path) {
        println!("Creating directory: {}", dir.display());
    }

    pub fn print_cpu_friendly_start(&self) {
        println!("⬇️  Preparing to download (CPU-Friendly Mode)...");
    }

    pub fn print_download_start(&self, url: &str, format: &FormatSelector) {
        if self.verbose {
            println!("Starting download from: {url}");
            println!("Format: {format}");
        }
    }

    pub fn print_quality_fallback(&self) {
        println!("Unknown quality, using the best available format.");
    }

    pub fn print_download_complete(&self, outcome: &DownloadOutcome) {
        println!("Downloaded: {}", outcome.metadata.title);

        if self.verbose {
            if let Some(uploader) = &outcome.metadata.uploader {
                println!("Uploader: {uploader}");
            }
            if let Some(duration) = outcome.metadata.duration {
                println!("Duration: {duration:.1} seconds");
            }
            println!("Format: {}", outcome.format);
            println!("Saved to: {}", outcome.output_dir.display());
            for file in &outcome.files {
                println!("  {file}");
            }
            println!("Download time: {}", outcome.completed_at);
        }
    }

    pub fn print_invalid_option(&self) {
        println!("Invalid option. Exiting.");
    }

    pub fn print_no_url(&self) {
        println!("No URL entered. Exiting.");
    }

    pub fn print_cancelled(&self) {
        println!("\nOperation cancelled by user. Exiting.");
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("\n{}", error_message(error));

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }
}

/// User-facing text for a failed run.
pub fn error_message(error: &color_eyre::Report) -> String {
    match error.downcast_ref::<DownloadError>() {
        Some(DownloadError::FormatUnavailable { selector, .. }) if selector.is_cpu_friendly() => {
            "❌ A pre-merged 720p format is not available for this video.\n   \
             This can happen with very new videos or certain live streams."
                .to_string()
        }
        Some(DownloadError::FormatUnavailable { selector, .. }) => format!(
            "❌ Format {selector} is not available for this video.\n   \
             Try a lower quality or a different download type."
        ),
        Some(DownloadError::DownloadFailed(text)) => format!("❌ An error occurred: {text}"),
        _ => format!("❌ An error occurred: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::eyre;

    fn unavailable(selector: FormatSelector) -> color_eyre::Report {
        DownloadError::FormatUnavailable {
            selector,
            detail: "ERROR: [youtube] y: Requested format is not available".to_string(),
        }
        .into()
    }

    #[test]
    fn cpu_friendly_unavailable_gets_720p_hint() {
        let message = error_message(&unavailable(FormatSelector::cpu_friendly()));
        assert!(message.contains("pre-merged 720p format is not available"));
        assert!(!message.contains("An error occurred"));
    }

    #[test]
    fn other_unavailable_formats_name_the_selector() {
        let message = error_message(&unavailable(FormatSelector::new("313+140")));
        assert!(message.contains("Format 313+140 is not available"));
    }

    #[test]
    fn generic_failure_shows_raw_text() {
        let error: color_eyre::Report =
            DownloadError::DownloadFailed("ERROR: HTTP Error 403: Forbidden".to_string()).into();
        assert_eq!(
            error_message(&error),
            "❌ An error occurred: ERROR: HTTP Error 403: Forbidden"
        );
    }

    #[test]
    fn foreign_errors_use_their_display() {
        let error = eyre!("disk full");
        assert_eq!(error_message(&error), "❌ An error occurred: disk full");
    }
}
