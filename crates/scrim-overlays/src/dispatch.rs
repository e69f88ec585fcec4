#![forbid(unsafe_code)]

//! Route an attachment to the viewer that can show it.
//!
//! The image viewer is held directly; video playback is an injected
//! capability, so this module never depends on the video viewer's type.

use std::fmt;
use std::rc::Rc;

use scrim_runtime::Page;

use crate::file_kind::{FileDescriptor, FileKind, classify};
use crate::media_viewer::{ImageViewer, MediaItem};

/// Capability that opens a video.
pub type OpenVideo = Rc<dyn Fn(MediaItem)>;

/// Where a file was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRoute {
    Image,
    Video,
    /// Handed to the host to open in a new browsing context.
    External,
}

impl FileRoute {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::External => "external",
        }
    }
}

/// File-open dispatcher.
#[derive(Clone)]
pub struct FileOpener {
    page: Page,
    images: ImageViewer,
    open_video: OpenVideo,
}

impl fmt::Debug for FileOpener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileOpener")
            .field("images", &self.images)
            .finish_non_exhaustive()
    }
}

impl FileOpener {
    #[must_use]
    pub fn new(page: &Page, images: ImageViewer, open_video: impl Fn(MediaItem) + 'static) -> Self {
        Self {
            page: page.clone(),
            images,
            open_video: Rc::new(open_video),
        }
    }

    /// Open `file` in the matching viewer, or externally when neither
    /// viewer handles it.
    pub fn open(&self, file: &FileDescriptor) -> FileRoute {
        let route = self.route(file);
        scrim_core::debug!(route = route.as_str(), name = file.label(), "file dispatched");
        route
    }

    fn route(&self, file: &FileDescriptor) -> FileRoute {
        match classify(file) {
            FileKind::Image => {
                self.images.open(file.media_item());
                FileRoute::Image
            }
            FileKind::Video => {
                (self.open_video)(file.media_item());
                FileRoute::Video
            }
            FileKind::Other => {
                self.open_external(file);
                FileRoute::External
            }
        }
    }

    fn open_external(&self, file: &FileDescriptor) {
        let Some(host) = self.page.host() else {
            scrim_core::trace!("no document, external open skipped");
            return;
        };
        let url = file.url.as_deref().unwrap_or_default();
        if url.is_empty() {
            scrim_core::warn!(name = file.label(), "file has no url to open");
            return;
        }
        if let Err(err) = host.open_external(url) {
            scrim_core::warn!(url, error = %err, "external open failed");
        }
    }
}
