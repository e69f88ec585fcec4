#![forbid(unsafe_code)]

//! Page-wide overlay coordinator.
//!
//! [`Overlays`] builds the page context and every overlay kind once, wires
//! the file dispatcher, and maps dismiss gestures onto the popup stack. It
//! also owns the page-level scroll lock held behind the side menus, which is
//! released by the menus' deferred unlock.

use core::time::Duration;
use std::rc::Rc;

use scrim_core::{Document, ScrimConfig, Subscription};
use scrim_runtime::{LockOutcome, LockProfile, MenuCallback, MenuCallbacks, Page, ScrollLock};

use crate::dispatch::{FileOpener, FileRoute};
use crate::file_kind::FileDescriptor;
use crate::map_popup::{MapPoint, MapPopup};
use crate::media_viewer::{ImageViewer, VideoViewer};
use crate::modal_set::ModalSet;

/// User gesture asking to dismiss the most recent overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissGesture {
    /// Escape key.
    Escape,
    /// Browser back navigation.
    Back,
}

/// Result of [`Overlays::dismiss`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DismissOutcome {
    /// An overlay was closed.
    pub closed: bool,
    /// The host should cancel the gesture's default action (key handling,
    /// history navigation).
    pub prevent_default: bool,
}

/// Listener registration over every overlay's state. Dropping it
/// unsubscribes.
#[derive(Debug)]
#[must_use = "dropping this guard unsubscribes the listener"]
pub struct OverlayWatch {
    _subscriptions: [Subscription; 4],
}

/// Every overlay of a page.
#[derive(Debug, Clone)]
pub struct Overlays {
    page: Page,
    page_lock: Rc<ScrollLock>,
    map_popup: MapPopup,
    modals: ModalSet,
    images: ImageViewer,
    videos: VideoViewer,
    files: FileOpener,
}

impl Overlays {
    /// Overlays over a live document.
    #[must_use]
    pub fn new(host: Rc<dyn Document>, config: ScrimConfig) -> Self {
        Self::from_page(Page::new(host, config))
    }

    /// Overlays without a document; scroll locks are skipped.
    #[must_use]
    pub fn headless(config: ScrimConfig) -> Self {
        Self::from_page(Page::headless(config))
    }

    /// Overlays bound to an existing page context.
    #[must_use]
    pub fn from_page(page: Page) -> Self {
        let page_lock = Rc::new(page.scroll_lock(LockProfile::page()));
        let map_popup = MapPopup::new(&page);
        let modals = ModalSet::new(&page);
        let images = ImageViewer::new(&page);
        let videos = VideoViewer::new(&page);
        let video_handle = videos.clone();
        let files = FileOpener::new(&page, images.clone(), move |item| video_handle.open(item));
        Self {
            page,
            page_lock,
            map_popup,
            modals,
            images,
            videos,
            files,
        }
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Page-level lock held while a side menu is open.
    #[must_use]
    pub fn page_lock(&self) -> &ScrollLock {
        &self.page_lock
    }

    /// Suspend page scrolling behind the side menus.
    pub fn lock_scroll(&self) -> LockOutcome {
        self.page_lock.suspend()
    }

    /// Release the side-menu scroll lock.
    pub fn unlock_scroll(&self) -> LockOutcome {
        self.page_lock.resume()
    }

    /// Install the menus' close functions with [`unlock_scroll`](Self::unlock_scroll)
    /// as the deferred unlock run after `close_all_menus`.
    pub fn register_menu_close_callbacks(&self, close: MenuCallbacks) {
        let lock = Rc::downgrade(&self.page_lock);
        let unlock: MenuCallback = Rc::new(move || {
            if let Some(lock) = lock.upgrade() {
                lock.resume();
            }
        });
        self.page.menus().register_close_callbacks(close, Some(unlock));
    }

    #[must_use]
    pub fn map_popup(&self) -> &MapPopup {
        &self.map_popup
    }

    #[must_use]
    pub fn modals(&self) -> &ModalSet {
        &self.modals
    }

    #[must_use]
    pub fn image_viewer(&self) -> &ImageViewer {
        &self.images
    }

    #[must_use]
    pub fn video_viewer(&self) -> &VideoViewer {
        &self.videos
    }

    #[must_use]
    pub fn files(&self) -> &FileOpener {
        &self.files
    }

    /// Whether any overlay is open.
    #[must_use]
    pub fn any_open(&self) -> bool {
        !self.page.popups().is_empty()
    }

    /// Call `listener` whenever any overlay's visibility or payload changes.
    pub fn watch(&self, listener: impl Fn() + 'static) -> OverlayWatch {
        let listener: Rc<dyn Fn()> = Rc::new(listener);
        let (a, b, c, d) = (
            Rc::clone(&listener),
            Rc::clone(&listener),
            Rc::clone(&listener),
            listener,
        );
        OverlayWatch {
            _subscriptions: [
                self.map_popup.subscribe(move |_| a()),
                self.modals.subscribe(move |_| b()),
                self.images.subscribe(move |_| c()),
                self.videos.subscribe(move |_| d()),
            ],
        }
    }

    /// Close the most recently opened overlay.
    pub fn dismiss(&self, gesture: DismissGesture) -> DismissOutcome {
        let closed = self.page.popups().close_top();
        scrim_core::debug!(?gesture, closed, "dismiss gesture");
        DismissOutcome {
            closed,
            prevent_default: closed,
        }
    }

    /// Open an attachment in the matching viewer.
    pub fn open_file(&self, file: &FileDescriptor) -> FileRoute {
        self.files.open(file)
    }

    /// Remember and close open side menus, then show the map popup.
    ///
    /// Returns whether menu state was stored.
    pub fn open_map_popup_over_menus(&self, point: MapPoint) -> bool {
        let menus = self.page.menus();
        let stored = menus.close_menus_for_popup(menus.current_state());
        self.map_popup.open(point);
        stored
    }

    /// Advance page time and run due deferred work.
    pub fn tick(&self, now: Duration) -> usize {
        self.page.tick(now)
    }
}
