//! Media reference classification and embed URL normalization.
//!
//! A project's `image_url` is a free-form string: a pasted YouTube or Vimeo
//! link, a direct video file, an uploaded image's public URL, or anything else
//! a user typed. [`classify`] decides what that string denotes and
//! [`MediaReference::embed`] turns it into the element the page should render.
//! Both the public landing page and the admin list go through these two
//! functions, so a reference always renders the same way everywhere.
//!
//! ## Classification order
//!
//! First match wins:
//!
//! | Check | Pattern (case-insensitive, unanchored unless noted) | Result |
//! |-------|------------------------------------------------------|--------|
//! | empty | blank after trimming | [`MediaReference::None`] |
//! | YouTube | `youtube.com/watch?v=` or `youtu.be/` | [`MediaReference::YouTubeVideo`] |
//! | Vimeo | `vimeo.com/` | [`MediaReference::VimeoVideo`] |
//! | video file | ends in `.mp4`/`.webm`/`.ogg`, optional `?query` | [`MediaReference::DirectVideoFile`] |
//! | anything else | | [`MediaReference::Image`] |
//!
//! No URL validation happens here. A string that is not a URL at all is an
//! image reference that will simply fail to load.
//!
//! ## Embed normalization
//!
//! Hosted videos are rewritten to their player URLs
//! (`https://www.youtube.com/embed/{id}`, `https://player.vimeo.com/video/{id}`).
//! When no identifier can be extracted the raw string is used instead; a broken
//! frame is cosmetic, and the raw link still works.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)youtube\.com/watch\?v=|youtu\.be/").expect("valid regex")
});
static VIMEO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)vimeo\.com/").expect("valid regex"));
static VIMEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)vimeo\.com/(\d+)").expect("valid regex"));
static VIDEO_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(mp4|webm|ogg)(\?.*)?$").expect("valid regex"));

const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed/";
const VIMEO_PLAYER_BASE: &str = "https://player.vimeo.com/video/";

/// Feature policy for YouTube player frames.
pub const YOUTUBE_FRAME_ALLOW: &str = "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share";
/// Feature policy for Vimeo player frames.
pub const VIMEO_FRAME_ALLOW: &str = "autoplay; fullscreen; picture-in-picture";

/// What a stored media string denotes. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaReference {
    YouTubeVideo { watch_url: String },
    VimeoVideo { watch_url: String },
    DirectVideoFile { url: String },
    Image { url: String },
    None,
}

/// Classify a raw media string. Total over all inputs.
pub fn classify(raw: Option<&str>) -> MediaReference {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return MediaReference::None;
    };

    let owned = raw.to_string();
    if YOUTUBE_RE.is_match(raw) {
        MediaReference::YouTubeVideo { watch_url: owned }
    } else if VIMEO_RE.is_match(raw) {
        MediaReference::VimeoVideo { watch_url: owned }
    } else if VIDEO_FILE_RE.is_match(raw) {
        MediaReference::DirectVideoFile { url: owned }
    } else {
        MediaReference::Image { url: owned }
    }
}

/// Rendering instruction for a media reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embed {
    /// A hosted-video player frame.
    Frame {
        src: String,
        allow: &'static str,
    },
    /// A native `<video>` element.
    Video { src: String },
    /// A plain `<img>` element.
    Image { src: String },
}

impl MediaReference {
    /// The string this reference was classified from.
    pub fn raw(&self) -> Option<&str> {
        match self {
            MediaReference::YouTubeVideo { watch_url } | MediaReference::VimeoVideo { watch_url } => {
                Some(watch_url.as_str())
            }
            MediaReference::DirectVideoFile { url } | MediaReference::Image { url } => {
                Some(url.as_str())
            }
            MediaReference::None => None,
        }
    }

    /// Short label for CLI output and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MediaReference::YouTubeVideo { .. } => "youtube",
            MediaReference::VimeoVideo { .. } => "vimeo",
            MediaReference::DirectVideoFile { .. } => "video",
            MediaReference::Image { .. } => "image",
            MediaReference::None => "none",
        }
    }

    /// URL to place in the rendered element. `None` only for [`MediaReference::None`].
    ///
    /// Hosted videos map to their player URL, falling back to the raw string
    /// when no video id can be extracted. Files and images are returned as-is.
    pub fn embed_url(&self) -> Option<String> {
        match self {
            MediaReference::YouTubeVideo { watch_url } => Some(
                youtube_video_id(watch_url)
                    .map(|id| format!("{YOUTUBE_EMBED_BASE}{id}"))
                    .unwrap_or_else(|| watch_url.clone()),
            ),
            MediaReference::VimeoVideo { watch_url } => Some(
                vimeo_video_id(watch_url)
                    .map(|id| format!("{VIMEO_PLAYER_BASE}{id}"))
                    .unwrap_or_else(|| watch_url.clone()),
            ),
            MediaReference::DirectVideoFile { url } | MediaReference::Image { url } => {
                Some(url.clone())
            }
            MediaReference::None => None,
        }
    }

    /// The element to render, or `None` when there is no media.
    pub fn embed(&self) -> Option<Embed> {
        match self {
            MediaReference::YouTubeVideo { .. } => Some(Embed::Frame {
                src: self.embed_url()?,
                allow: YOUTUBE_FRAME_ALLOW,
            }),
            MediaReference::VimeoVideo { .. } => Some(Embed::Frame {
                src: self.embed_url()?,
                allow: VIMEO_FRAME_ALLOW,
            }),
            MediaReference::DirectVideoFile { url } => Some(Embed::Video { src: url.clone() }),
            MediaReference::Image { url } => Some(Embed::Image { src: url.clone() }),
            MediaReference::None => None,
        }
    }
}

/// Parse leniently: pasted links often omit the scheme.
fn parse_lenient(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{raw}")).ok(),
        Err(_) => None,
    }
}

/// Short links carry the id in the path; watch pages in the `v` parameter.
fn youtube_video_id(raw: &str) -> Option<String> {
    let url = parse_lenient(raw)?;
    let host = url.host_str()?;
    let id = if host.contains("youtu.be") {
        url.path().strip_prefix('/').unwrap_or(url.path()).to_string()
    } else {
        url.query_pairs()
            .find(|(key, _)| key.eq_ignore_ascii_case("v"))
            .map(|(_, value)| value.into_owned())?
    };
    (!id.is_empty()).then_some(id)
}

fn vimeo_video_id(raw: &str) -> Option<&str> {
    VIMEO_ID_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
