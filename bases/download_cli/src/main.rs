// bases/download_cli/src/main.rs
mod app;
mod args;
mod config;
mod output;
mod prompt;

use app::App;
use args::Args;
use clap::Parser;
use color_eyre::Result;
use config::Config;
use prompt::PromptError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let config = Config::from_args(args);
    init_tracing(&config);

    let app = App::new(config);
    let result = tokio::select! {
        result = app.run() => result,
        _ = tokio::signal::ctrl_c() => Err(PromptError::Cancelled.into()),
    };

    match result {
        Ok(outcome) => app.print_outcome(&outcome),
        Err(error) if app::is_cancellation(&error) => {
            app.print_cancelled();
            // a prompt may still hold the terminal on a blocking thread
            std::process::exit(0);
        }
        Err(error) => {
            app.print_error(&error);
            std::process::exit(1);
        }
    }
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
