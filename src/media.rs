//! Media link resolution.
//!
//! Turns the free-form video URLs people paste into the builder into typed
//! references the popup can render without re-parsing. This is a pure string
//! transform: nothing here touches the network.
//!
//! | Input shape | Kind | Thumbnail |
//! |---|---|---|
//! | `youtube.com/watch?v=ID` | YouTube | `img.youtube.com/vi/ID/maxresdefault.jpg` |
//! | `youtu.be/ID` | YouTube | same |
//! | `vimeo.com/<digits>` | Vimeo | none |
//! | anything else non-blank | Other | none |
//!
//! YouTube IDs run up to the first `&`, `?`, `#` or newline, so
//! `youtu.be/xyz?t=10` resolves to `xyz`.
//!
//! ## Thumbnail fallback
//!
//! Not every video has a `maxresdefault` image. The popup runtime walks
//! [`YOUTUBE_THUMBNAIL_QUALITIES`] on image load errors, trying each quality at
//! most once per `<img>` element. The full chain is carried on the reference as
//! `thumbnailFallbacks` so the runtime never builds YouTube URLs itself.

use crate::document::ChecklistDocument;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Thumbnail qualities tried in order, best first.
pub const YOUTUBE_THUMBNAIL_QUALITIES: [&str; 3] = ["maxresdefault", "hqdefault", "mqdefault"];

static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&\n?#]+)").expect("valid regex")
});

static VIMEO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vimeo\.com/(\d+)").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoKind {
    Youtube,
    Vimeo,
    Other,
}

/// A parsed video link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoReference {
    pub kind: VideoKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
    pub canonical_url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub thumbnail_fallbacks: Vec<String>,
}

/// Resolve a raw URL. Returns `None` for empty or whitespace-only input.
pub fn resolve(url: &str) -> Option<VideoReference> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    if let Some(id) = YOUTUBE.captures(url).map(|c| c[1].to_string()) {
        let fallbacks = youtube_thumbnails(&id);
        return Some(VideoReference {
            kind: VideoKind::Youtube,
            thumbnail_url: fallbacks.first().cloned(),
            embed_url: Some(format!("https://www.youtube.com/embed/{id}")),
            canonical_url: format!("https://www.youtube.com/watch?v={id}"),
            thumbnail_fallbacks: fallbacks,
            id: Some(id),
        });
    }

    if let Some(id) = VIMEO.captures(url).map(|c| c[1].to_string()) {
        return Some(VideoReference {
            kind: VideoKind::Vimeo,
            thumbnail_url: None,
            embed_url: Some(format!("https://player.vimeo.com/video/{id}")),
            canonical_url: format!("https://vimeo.com/{id}"),
            thumbnail_fallbacks: Vec::new(),
            id: Some(id),
        });
    }

    Some(VideoReference {
        kind: VideoKind::Other,
        id: None,
        thumbnail_url: None,
        embed_url: None,
        canonical_url: url.to_string(),
        thumbnail_fallbacks: Vec::new(),
    })
}

/// Thumbnail URLs for a YouTube ID in fallback order.
pub fn youtube_thumbnails(id: &str) -> Vec<String> {
    YOUTUBE_THUMBNAIL_QUALITIES
        .iter()
        .map(|q| format!("https://img.youtube.com/vi/{id}/{q}.jpg"))
        .collect()
}

/// What the popup shows in its leading "What is …?" section.
///
/// Resolved once per export. A custom image wins over a video when a
/// document carries both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MediaPresentation {
    #[serde(rename_all = "camelCase")]
    Image {
        src: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        redirect_url: Option<String>,
    },
    Video(VideoReference),
    None,
}

impl MediaPresentation {
    pub fn for_document(doc: &ChecklistDocument) -> Self {
        if let Some(src) = doc.custom_image_url() {
            return Self::Image {
                src: src.to_string(),
                redirect_url: doc.custom_image_redirect().map(str::to_string),
            };
        }
        match doc.video_link().and_then(resolve) {
            Some(video) => Self::Video(video),
            None => Self::None,
        }
    }

    /// Whether the popup renders a preview in the media slot.
    ///
    /// Only custom images and YouTube videos have one; Vimeo and other links
    /// leave the slot empty, matching the builder's preview mode.
    pub fn has_preview(&self) -> bool {
        match self {
            Self::Image { .. } => true,
            Self::Video(video) => video.kind == VideoKind::Youtube,
            Self::None => false,
        }
    }
}
