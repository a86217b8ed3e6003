// components/video_downloader/src/format.rs
//! Maps the user's quality and stream choices onto an engine format selector.
use crate::types::DownloadError;
use std::fmt;

const BEST: &str = "best";
const BEST_AUDIO: &str = "bestaudio";
const STREAM_SEPARATOR: char = '+';

/// Pre-merged stream capped at 720p, for devices that cannot afford a remux.
pub const CPU_FRIENDLY_720P: &str =
    "best[height<=720][vcodec!=none][acodec!=none]/best[height<=720]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    P144,
    P360,
    P480,
    P720,
    P1080,
    P1440,
    P2160,
}

impl Quality {
    pub const ALL: [Quality; 7] = [
        Quality::P144,
        Quality::P360,
        Quality::P480,
        Quality::P720,
        Quality::P1080,
        Quality::P1440,
        Quality::P2160,
    ];

    /// Menu number (1-7) to tier.
    pub fn from_choice(choice: i64) -> Option<Self> {
        usize::try_from(choice)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::P144 => "144p",
            Quality::P360 => "360p",
            Quality::P480 => "480p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
            Quality::P1440 => "1440p",
            Quality::P2160 => "2160p",
        }
    }

    /// Engine format ids: either one merged stream or `video+audio`.
    ///
    /// 144p and 360p share the merged stream `18`; that is the table as it
    /// has always been shipped.
    pub fn stream_ids(self) -> &'static str {
        match self {
            Quality::P144 => "18",
            Quality::P360 => "18",
            Quality::P480 => "135+140",
            Quality::P720 => "136+140",
            Quality::P1080 => "137+140",
            Quality::P1440 => "271+140",
            Quality::P2160 => "313+140",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    AudioOnly,
    VideoOnly,
    AudioAndVideo,
}

impl StreamMode {
    pub const ALL: [StreamMode; 3] = [
        StreamMode::AudioOnly,
        StreamMode::VideoOnly,
        StreamMode::AudioAndVideo,
    ];

    pub fn from_choice(choice: i64) -> Option<Self> {
        match choice {
            1 => Some(StreamMode::AudioOnly),
            2 => Some(StreamMode::VideoOnly),
            3 => Some(StreamMode::AudioAndVideo),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StreamMode::AudioOnly => "Download audio only",
            StreamMode::VideoOnly => "Download video only",
            StreamMode::AudioAndVideo => "Download both audio and video",
        }
    }
}

/// A format expression understood by the extraction engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelector(String);

impl FormatSelector {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    pub fn best() -> Self {
        Self::new(BEST)
    }

    pub fn cpu_friendly() -> Self {
        Self::new(CPU_FRIENDLY_720P)
    }

    /// Combine a tier (`None` when the user picked something off the menu)
    /// with a stream mode.
    pub fn resolve(quality: Option<Quality>, mode: StreamMode) -> Self {
        let paired = quality.map_or(BEST, Quality::stream_ids);
        let expr = match mode {
            StreamMode::AudioOnly => BEST_AUDIO,
            StreamMode::VideoOnly => paired
                .split(STREAM_SEPARATOR)
                .next()
                .unwrap_or(paired),
            StreamMode::AudioAndVideo => paired,
        };
        Self::new(expr)
    }

    /// Resolve raw menu numbers. An unknown tier falls back to `best`; an
    /// unknown stream mode is rejected so the caller never starts a download.
    pub fn from_choices(tier: i64, mode: i64) -> Result<Self, DownloadError> {
        let mode = StreamMode::from_choice(mode)
            .ok_or_else(|| DownloadError::InvalidOption(format!("stream mode {mode}")))?;
        let quality = Quality::from_choice(tier);
        if quality.is_none() {
            tracing::debug!(tier, "unknown quality tier, falling back to {}", BEST);
        }
        Ok(Self::resolve(quality, mode))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_cpu_friendly(&self) -> bool {
        self.0 == CPU_FRIENDLY_720P
    }
}

impl fmt::Display for FormatSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    #[rstest]
    #[case(1, "18")]
    #[case(2, "18")]
    #[case(3, "135+140")]
    #[case(4, "136+140")]
    #[case(5, "137+140")]
    #[case(6, "271+140")]
    #[case(7, "313+140")]
    fn audio_and_video_keeps_table_entry(#[case] tier: i64, #[case] expected: &str) {
        let selector = FormatSelector::from_choices(tier, 3).unwrap();
        assert_eq!(selector.as_str(), expected);
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    #[case(7)]
    #[case(0)]
    #[case(42)]
    fn audio_only_ignores_tier(#[case] tier: i64) {
        let selector = FormatSelector::from_choices(tier, 1).unwrap();
        assert_eq!(selector.as_str(), "bestaudio");
    }

    #[rstest]
    #[case(1, "18")]
    #[case(3, "135")]
    #[case(4, "136")]
    #[case(7, "313")]
    fn video_only_drops_audio_stream(#[case] tier: i64, #[case] expected: &str) {
        let selector = FormatSelector::from_choices(tier, 2).unwrap();
        assert_eq!(selector.as_str(), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(8)]
    #[case(-3)]
    fn unknown_tier_falls_back_to_best(#[case] tier: i64) {
        assert_eq!(FormatSelector::from_choices(tier, 3).unwrap(), FormatSelector::best());
        assert_eq!(FormatSelector::from_choices(tier, 2).unwrap(), FormatSelector::best());
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(-1)]
    fn unknown_stream_mode_is_rejected(#[case] mode: i64) {
        assert_matches!(
            FormatSelector::from_choices(4, mode),
            Err(DownloadError::InvalidOption(_))
        );
    }

    #[test]
    fn every_quality_has_a_distinct_menu_number() {
        for (index, quality) in Quality::ALL.iter().enumerate() {
            assert_eq!(Quality::from_choice(index as i64 + 1), Some(*quality));
        }
        assert_eq!(Quality::from_choice(0), None);
        assert_eq!(Quality::from_choice(8), None);
    }

    #[test]
    fn cpu_friendly_is_recognised() {
        assert!(FormatSelector::cpu_friendly().is_cpu_friendly());
        assert!(!FormatSelector::best().is_cpu_friendly());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logs_at(level: Level, f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn quality_fallback_is_not_logged_as_a_warning() {
        // the CLI prints its own notice for this
        let at_warn = logs_at(Level::WARN, || {
            FormatSelector::from_choices(9, 3).unwrap();
        });
        assert_eq!(at_warn, "");

        let at_debug = logs_at(Level::DEBUG, || {
            FormatSelector::from_choices(9, 3).unwrap();
        });
        assert!(at_debug.contains("unknown quality tier"));
    }
}
