#![forbid(unsafe_code)]

//! Boolean media predicates over attachment descriptors.
//!
//! A descriptor without a MIME type is never media. Otherwise a file is an
//! image if its MIME type starts with `image/` or its url (falling back to
//! its name) ends in a known image extension, compared without case;
//! likewise for video. Classification checks image first, so a descriptor
//! matching both is an image.

use serde::{Deserialize, Serialize};

use crate::media_viewer::MediaItem;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "wmv", "flv", "webm", "mkv", "m4v", "3gp", "ogv",
];

/// An attachment as delivered by the application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileDescriptor {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

impl FileDescriptor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = Some(name.into());
        self
    }

    /// Parse a descriptor from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Name shown to the user: display name, then original name, then name.
    #[must_use]
    pub fn label(&self) -> &str {
        [&self.display_name, &self.original_name, &self.name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    /// Path the extension is read from: the url, else the name.
    fn extension_source(&self) -> &str {
        [&self.url, &self.name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    /// Viewer payload for this file.
    #[must_use]
    pub fn media_item(&self) -> MediaItem {
        MediaItem::new(self.url.clone().unwrap_or_default(), self.label())
    }
}

/// Result of classifying a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Image,
    Video,
    Other,
}

/// The MIME type, when present and non-empty.
fn mime_type(file: &FileDescriptor) -> Option<&str> {
    file.mime_type.as_deref().filter(|t| !t.is_empty())
}

/// Whether `path` ends in `.ext` for one of `set`, ignoring case.
fn has_extension(path: &str, set: &[&str]) -> bool {
    set.iter().any(|ext| {
        path.len()
            .checked_sub(ext.len() + 1)
            .and_then(|start| path.get(start..))
            .and_then(|tail| tail.strip_prefix('.'))
            .is_some_and(|tail| tail.eq_ignore_ascii_case(ext))
    })
}

fn is_media(file: &FileDescriptor, prefix: &str, extensions: &[&str]) -> bool {
    mime_type(file).is_some_and(|t| {
        t.starts_with(prefix) || has_extension(file.extension_source(), extensions)
    })
}

/// Whether `file` is shown by the image viewer.
#[must_use]
pub fn is_image_file(file: &FileDescriptor) -> bool {
    is_media(file, "image/", IMAGE_EXTENSIONS)
}

/// Whether `file` is shown by the video viewer.
#[must_use]
pub fn is_video_file(file: &FileDescriptor) -> bool {
    is_media(file, "video/", VIDEO_EXTENSIONS)
}

/// Classify `file`, image first.
#[must_use]
pub fn classify(file: &FileDescriptor) -> FileKind {
    if is_image_file(file) {
        FileKind::Image
    } else if is_video_file(file) {
        FileKind::Video
    } else {
        FileKind::Other
    }
}
