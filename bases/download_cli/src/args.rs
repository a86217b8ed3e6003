// bases/download_cli/src/args.rs
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Ask for quality and stream type
    #[default]
    Custom,
    /// Pre-merged stream capped at 720p, no prompts beyond the URL
    CpuFriendly,
}

/// Download a video, choosing quality and stream type interactively
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// URL to download from; prompted for when omitted
    pub url: Option<String>,

    /// Directory to store downloaded files (defaults to the platform's
    /// download or video folder)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Which download flow to run
    #[arg(short, long, value_enum, default_value_t = Profile::Custom)]
    pub profile: Profile,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
