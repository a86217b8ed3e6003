// components/video_downloader/src/utils.rs
use crate::types::DownloadError;
use std::path::Path;
use url::{ParseError, Url};

/// Query parameter that identifies the video on watch pages.
const VIDEO_ID_PARAM: &str = "v";

/// Engine output template: `<dir>/<title>.<ext>`
pub fn output_template(dir: &Path) -> String {
    dir.join("%(title)s.%(ext)s").to_string_lossy().into_owned()
}

/// What the user typed, in a form the engine accepts.
enum Source {
    Link(Url),
    /// Bare video id, passed through for the engine to resolve
    VideoId(String),
}

fn parse_source(raw: &str) -> Result<Source, DownloadError> {
    let raw = raw.trim();
    let invalid = |e: &dyn std::fmt::Display| DownloadError::InvalidUrl(format!("{raw}: {e}"));

    match Url::parse(raw) {
        Ok(url) => Ok(Source::Link(url)),
        Err(ParseError::RelativeUrlWithoutBase) if is_video_id(raw) => {
            Ok(Source::VideoId(raw.to_string()))
        }
        // "youtu.be/abc" and "www.youtube.com/watch?v=abc"
        Err(ParseError::RelativeUrlWithoutBase) if !raw.contains(char::is_whitespace) => {
            Url::parse(&format!("https://{raw}"))
                .map(Source::Link)
                .map_err(|e| invalid(&e))
        }
        Err(e) => Err(invalid(&e)),
    }
}

fn is_video_id(raw: &str) -> bool {
    !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Validate a pasted link. Links without a scheme get `https://`; bare
/// video ids are kept as they are.
pub fn parse_url(raw: &str) -> Result<String, DownloadError> {
    Ok(match parse_source(raw)? {
        Source::Link(url) => url.to_string(),
        Source::VideoId(id) => id,
    })
}

/// Drop tracking parameters and fragments from a pasted link, keeping only
/// the video id parameter.
pub fn clean_url(raw: &str) -> Result<String, DownloadError> {
    let mut url = match parse_source(raw)? {
        Source::Link(url) => url,
        Source::VideoId(id) => return Ok(id),
    };
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key == VIDEO_ID_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_fragment(None);
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[test]
    fn test_output_template() {
        let template = output_template(Path::new("/storage/emulated/0/Videos"));
        assert_eq!(template, "/storage/emulated/0/Videos/%(title)s.%(ext)s");
    }

    #[rstest]
    #[case("https://youtu.be/abc123?si=tracking", "https://youtu.be/abc123")]
    #[case(
        "https://www.youtube.com/watch?v=abc123&list=PL1&t=42s",
        "https://www.youtube.com/watch?v=abc123"
    )]
    #[case("https://www.youtube.com/shorts/xyz?feature=share", "https://www.youtube.com/shorts/xyz")]
    #[case("https://x/y#t=10", "https://x/y")]
    #[case("  https://x/y  ", "https://x/y")]
    #[case("youtu.be/abc123?si=tracking", "https://youtu.be/abc123")]
    #[case("www.youtube.com/watch?v=abc123&t=1", "https://www.youtube.com/watch?v=abc123")]
    #[case("dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    fn test_clean_url(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(clean_url(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("youtu.be/abc123", "https://youtu.be/abc123")]
    #[case("www.youtube.com/watch?v=abc123", "https://www.youtube.com/watch?v=abc123")]
    #[case(" dQw4w9WgXcQ\n", "dQw4w9WgXcQ")]
    #[case("https://x/y?a=1", "https://x/y?a=1")]
    fn test_parse_url_without_scheme(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(parse_url(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("not a url")]
    #[case("")]
    #[case("   ")]
    #[case("http://")]
    fn test_invalid_url(#[case] raw: &str) {
        assert_matches!(clean_url(raw), Err(DownloadError::InvalidUrl(_)));
        assert_matches!(parse_url(raw), Err(DownloadError::InvalidUrl(_)));
    }
}
