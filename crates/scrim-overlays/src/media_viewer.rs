#![forbid(unsafe_code)]

//! Full-screen image and video viewers.
//!
//! Both viewers hold a viewport guard, so pinch-zoom is disabled while they
//! are shown. They do not touch the side-menu memory.

use serde::{Deserialize, Serialize};

use scrim_core::Subscription;
use scrim_runtime::{LockProfile, Page};

use crate::registry::{OverlayRegistry, OverlayState};

/// Media shown by a viewer. The neutral item has empty fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    pub name: String,
}

impl MediaItem {
    #[must_use]
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }
}

macro_rules! media_viewer {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $profile:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            registry: OverlayRegistry<MediaItem>,
        }

        impl $name {
            #[must_use]
            pub fn new(page: &Page) -> Self {
                let guard = page.viewport_guard($profile);
                Self {
                    registry: OverlayRegistry::new($kind, page.clone(), guard.as_lock().clone(), false),
                }
            }

            /// Show `item`.
            pub fn open(&self, item: MediaItem) {
                self.registry.open(item);
            }

            /// Hide the viewer and restore scrolling and zoom.
            pub fn close(&self) -> bool {
                self.registry.close()
            }

            #[must_use]
            pub fn state(&self) -> OverlayState<MediaItem> {
                self.registry.state()
            }

            #[must_use]
            pub fn is_visible(&self) -> bool {
                self.registry.is_visible()
            }

            pub fn subscribe(&self, listener: impl Fn(&OverlayState<MediaItem>) + 'static) -> Subscription {
                self.registry.subscribe(listener)
            }

            #[must_use]
            pub fn registry(&self) -> &OverlayRegistry<MediaItem> {
                &self.registry
            }
        }
    };
}

media_viewer!(
    /// Full-screen image viewer.
    ImageViewer,
    "image-viewer",
    LockProfile::image_viewer()
);

media_viewer!(
    /// Full-screen video viewer.
    VideoViewer,
    "video-viewer",
    LockProfile::video_viewer()
);
