// bases/download_cli/src/prompt.rs
use async_trait::async_trait;
use inquire::{CustomType, InquireError, Text};
use std::fmt::Display;
use std::io;
use thiserror::Error;
use video_downloader::{Quality, StreamMode};

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("cancelled by user")]
    Cancelled,

    #[error("could not use the terminal: {0}")]
    Io(#[from] io::Error),

    #[error("could not ask the question: {0}")]
    Terminal(String),
}

impl From<InquireError> for PromptError {
    fn from(error: InquireError) -> Self {
        match error {
            InquireError::OperationCanceled | InquireError::OperationInterrupted => Self::Cancelled,
            InquireError::IO(e) => Self::Io(e),
            other => Self::Terminal(other.to_string()),
        }
    }
}

/// The questions one run asks. Menu answers are returned as typed, in range
/// or not; deciding what they mean is up to the caller.
#[async_trait]
pub trait Prompt: Send {
    async fn ask_url(&mut self, question: &str) -> Result<String, PromptError>;

    async fn ask_quality(&mut self) -> Result<i64, PromptError>;

    async fn ask_stream_mode(&mut self) -> Result<i64, PromptError>;
}

/// Interactive prompts on the controlling terminal.
pub struct TerminalPrompt;

#[async_trait]
impl Prompt for TerminalPrompt {
    async fn ask_url(&mut self, question: &str) -> Result<String, PromptError> {
        let question = question.to_string();
        let answer = blocking(move || Text::new(&question).prompt()).await?;
        Ok(answer.trim().to_string())
    }

    async fn ask_quality(&mut self) -> Result<i64, PromptError> {
        ask_choice(quality_menu(), Quality::ALL.len()).await
    }

    async fn ask_stream_mode(&mut self) -> Result<i64, PromptError> {
        ask_choice(stream_menu(), StreamMode::ALL.len()).await
    }
}

async fn ask_choice(menu: String, options: usize) -> Result<i64, PromptError> {
    blocking(move || {
        println!("{menu}");
        CustomType::<i64>::new(&choice_question(options))
            .with_error_message("Please type a number")
            .prompt()
    })
    .await
}

/// inquire blocks on the terminal, so keep it off the runtime threads.
async fn blocking<T, F>(ask: F) -> Result<T, PromptError>
where
    T: Send + 'static,
    F: FnOnce() -> inquire::error::InquireResult<T> + Send + 'static,
{
    let answer = tokio::task::spawn_blocking(ask)
        .await
        .map_err(|e| PromptError::Terminal(e.to_string()))?;
    Ok(answer?)
}

fn choice_question(options: usize) -> String {
    format!("Enter your choice (1-{options}):")
}

fn menu<T: Display>(title: &str, items: impl IntoIterator<Item = T>) -> String {
    let mut text = format!("\n{title}");
    for (index, item) in items.into_iter().enumerate() {
        text.push_str(&format!("\n{}. {item}", index + 1));
    }
    text
}

fn quality_menu() -> String {
    menu("Select quality:", Quality::ALL)
}

fn stream_menu() -> String {
    menu(
        "Select download type:",
        StreamMode::ALL.iter().map(|mode| mode.description()),
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[test]
    fn quality_menu_lists_every_tier() {
        let shown = quality_menu();
        assert!(shown.starts_with("\nSelect quality:\n1. 144p"));
        assert!(shown.ends_with("7. 2160p"));
        assert_eq!(choice_question(Quality::ALL.len()), "Enter your choice (1-7):");
    }

    #[test]
    fn stream_menu_lists_every_mode() {
        let shown = stream_menu();
        assert!(shown.starts_with("\nSelect download type:\n1. "));
        assert!(shown.contains("3. Download both audio and video"));
        assert_eq!(choice_question(StreamMode::ALL.len()), "Enter your choice (1-3):");
    }

    #[rstest]
    #[case(InquireError::OperationCanceled)]
    #[case(InquireError::OperationInterrupted)]
    fn escape_and_ctrl_c_cancel(#[case] error: InquireError) {
        assert_matches!(PromptError::from(error), PromptError::Cancelled);
    }

    #[test]
    fn terminal_failures_are_errors() {
        assert_matches!(PromptError::from(InquireError::NotTTY), PromptError::Terminal(_));
        let io = InquireError::IO(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert_matches!(PromptError::from(io), PromptError::Io(_));
    }

    #[tokio::test]
    async fn failed_blocking_prompt_is_reported() {
        let result: Result<i64, _> = blocking(|| Err(InquireError::OperationInterrupted)).await;
        assert_matches!(result, Err(PromptError::Cancelled));

        let result = blocking(|| Ok(42_i64)).await;
        assert_matches!(result, Ok(42));
    }
}
