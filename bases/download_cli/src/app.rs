// bases/download_cli/src/app.rs
use crate::args::Profile;
use crate::config::Config;
use crate::output::OutputHandler;
use crate::prompt::{Prompt, PromptError, TerminalPrompt};
use color_eyre::Result;
use std::io::Write;
use std::sync::Arc;
use video_downloader::{
    clean_url, parse_url, DownloadError, DownloadOutcome, Downloader, FormatSelector,
    ProgressReporter, Quality, VideoDownloader, YtDlp,
};

const CUSTOM_URL_QUESTION: &str = "Enter the URL of the YouTube video or shorts:";
const CPU_FRIENDLY_URL_QUESTION: &str = "Enter the YouTube video URL:";

/// How a run ended when nothing went wrong.
#[derive(Debug)]
pub enum Outcome {
    Completed(DownloadOutcome),
    InvalidOption,
    NoUrl,
}

pub struct App {
    config: Config,
    output: OutputHandler,
}

impl App {
    pub fn new(config: Config) -> Self {
        let output = OutputHandler::new(config.verbose);
        Self { config, output }
    }

    pub async fn run(&self) -> Result<Outcome> {
        let mut reporter = ProgressReporter::terminal();
        self.run_with(&mut TerminalPrompt, Arc::new(YtDlp), &mut reporter)
            .await
    }

    pub async fn run_with<O: Write + Send>(
        &self,
        prompt: &mut dyn Prompt,
        engine: Arc<dyn Downloader + Send + Sync>,
        reporter: &mut ProgressReporter<O>,
    ) -> Result<Outcome> {
        if !self.config.output_dir.exists() {
            self.output.print_creating_directory(&self.config.output_dir);
        }
        let downloader =
            VideoDownloader::new_with_downloader(&self.config.output_dir, engine).await?;

        let question = match self.config.profile {
            Profile::Custom => CUSTOM_URL_QUESTION,
            Profile::CpuFriendly => CPU_FRIENDLY_URL_QUESTION,
        };
        let raw_url = match &self.config.url {
            Some(url) => url.clone(),
            None => prompt.ask_url(question).await?,
        };
        if raw_url.is_empty() {
            return Ok(Outcome::NoUrl);
        }

        let (url, format) = match self.config.profile {
            Profile::Custom => {
                let tier = prompt.ask_quality().await?;
                let mode = prompt.ask_stream_mode().await?;
                let format = match FormatSelector::from_choices(tier, mode) {
                    Ok(format) => format,
                    Err(DownloadError::InvalidOption(reason)) => {
                        tracing::debug!("rejected choice: {reason}");
                        return Ok(Outcome::InvalidOption);
                    }
                    Err(e) => return Err(e.into()),
                };
                if Quality::from_choice(tier).is_none() {
                    self.output.print_quality_fallback();
                }
                (parse_url(&raw_url)?, format)
            }
            Profile::CpuFriendly => {
                self.output.print_cpu_friendly_start();
                (clean_url(&raw_url)?, FormatSelector::cpu_friendly())
            }
        };

        let request = downloader.request(url, format);
        self.output
            .print_download_start(&request.url, &request.format);
        let outcome = downloader.download(&request, reporter).await?;
        Ok(Outcome::Completed(outcome))
    }

    pub fn print_outcome(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Completed(outcome) => self.output.print_download_complete(outcome),
            Outcome::InvalidOption => self.output.print_invalid_option(),
            Outcome::NoUrl => self.output.print_no_url(),
        }
    }

    pub fn print_cancelled(&self) {
        self.output.print_cancelled();
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }
}

/// Interrupts and closed input end the run quietly.
pub fn is_cancellation(error: &color_eyre::Report) -> bool {
    matches!(
        error.downcast_ref::<PromptError>(),
        Some(PromptError::Cancelled)
    )
}
