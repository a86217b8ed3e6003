// bases/download_cli/src/config.rs
use crate::args::{Args, Profile};
use std::path::PathBuf;

#[cfg(target_os = "android")]
const ANDROID_DOWNLOADS: &str = "/storage/emulated/0/Download";
#[cfg(target_os = "android")]
const ANDROID_VIDEOS: &str = "/storage/emulated/0/Videos";

/// Resolved run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub url: Option<String>,

    pub output_dir: PathBuf,

    pub profile: Profile,

    pub verbose: bool,
}

impl Config {
    /// Create configuration from CLI arguments
    pub fn from_args(args: Args) -> Self {
        let output_dir = args
            .output_dir
            .unwrap_or_else(|| default_output_dir(args.profile));

        Self {
            url: args.url.filter(|url| !url.trim().is_empty()),
            output_dir,
            profile: args.profile,
            verbose: args.verbose,
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

#[cfg(target_os = "android")]
fn default_output_dir(profile: Profile) -> PathBuf {
    match profile {
        Profile::Custom => PathBuf::from(ANDROID_DOWNLOADS),
        Profile::CpuFriendly => PathBuf::from(ANDROID_VIDEOS),
    }
}

#[cfg(not(target_os = "android"))]
fn default_output_dir(profile: Profile) -> PathBuf {
    let dir = match profile {
        Profile::Custom => dirs::download_dir(),
        Profile::CpuFriendly => dirs::video_dir(),
    };
    dir.unwrap_or_else(|| PathBuf::from("."))
}
