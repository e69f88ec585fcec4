#![forbid(unsafe_code)]

//! Page-scoped context.
//!
//! A [`Page`] groups everything that lives exactly as long as one page load:
//! the host document, the configuration, the deferred task queue, the document
//! lease shared by all scroll locks, the side-menu memory and the dismiss
//! stack. Construct one at startup and hand clones to the components that need
//! it; dropping the last clone tears the page down.

use core::time::Duration;
use std::fmt;
use std::rc::Rc;

use scrim_core::{DeferredQueue, Document, ScrimConfig};

use crate::menu_state::MenuState;
use crate::popup_stack::PopupStack;
use crate::scroll_lock::{DocumentLease, LockProfile, ScrollLock, ScrollSnapshot, ViewportGuard};

struct PageInner {
    host: Option<Rc<dyn Document>>,
    config: ScrimConfig,
    deferred: DeferredQueue,
    lease: DocumentLease,
    menus: MenuState,
    popups: PopupStack,
}

/// Shared handle to the page context.
#[derive(Clone)]
pub struct Page {
    inner: Rc<PageInner>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("client", &self.is_client())
            .field("deferred", &self.inner.deferred)
            .field("lease_holders", &self.inner.lease.holder_count())
            .field("popups", &self.inner.popups.len())
            .finish()
    }
}

impl Page {
    /// Page backed by a live document.
    #[must_use]
    pub fn new(host: Rc<dyn Document>, config: ScrimConfig) -> Self {
        Self::build(Some(host), config)
    }

    /// Page without a document, as in a server-side render pass. Scroll locks
    /// skip all work; menus and the popup stack behave normally.
    #[must_use]
    pub fn headless(config: ScrimConfig) -> Self {
        Self::build(None, config)
    }

    fn build(host: Option<Rc<dyn Document>>, config: ScrimConfig) -> Self {
        let deferred = DeferredQueue::new();
        let menus = MenuState::new(
            deferred.clone(),
            config.menu_unlock_delay,
            config.menu_interaction_delay,
        );
        Self {
            inner: Rc::new(PageInner {
                host,
                config,
                deferred,
                lease: DocumentLease::default(),
                menus,
                popups: PopupStack::new(),
            }),
        }
    }

    /// The host document, `None` outside a browser.
    #[must_use]
    pub fn host(&self) -> Option<&Rc<dyn Document>> {
        self.inner.host.as_ref()
    }

    /// Whether a document is available.
    #[must_use]
    pub fn is_client(&self) -> bool {
        self.inner.host.is_some()
    }

    /// Page configuration.
    #[must_use]
    pub fn config(&self) -> &ScrimConfig {
        &self.inner.config
    }

    /// Deferred task queue driven by [`tick`](Self::tick).
    #[must_use]
    pub fn deferred(&self) -> &DeferredQueue {
        &self.inner.deferred
    }

    /// Side-menu memory.
    #[must_use]
    pub fn menus(&self) -> &MenuState {
        &self.inner.menus
    }

    /// Dismiss stack of open overlays.
    #[must_use]
    pub fn popups(&self) -> &PopupStack {
        &self.inner.popups
    }

    /// Advance page time to `now` and run due deferred work.
    pub fn tick(&self, now: Duration) -> usize {
        self.inner.deferred.advance_to(now)
    }

    /// Create a scroll lock bound to this page's document lease.
    #[must_use]
    pub fn scroll_lock(&self, profile: LockProfile) -> ScrollLock {
        ScrollLock::new(self.clone(), profile)
    }

    /// Create a viewport guard bound to this page's document lease.
    #[must_use]
    pub fn viewport_guard(&self, profile: LockProfile) -> ViewportGuard {
        ViewportGuard::new(self.clone(), profile)
    }

    /// Number of locks currently holding the document.
    #[must_use]
    pub fn lease_holders(&self) -> usize {
        self.inner.lease.holder_count()
    }

    /// The outstanding document snapshot, if any lock holds the document.
    #[must_use]
    pub fn document_snapshot(&self) -> Option<ScrollSnapshot> {
        self.inner.lease.snapshot()
    }

    pub(crate) fn lease(&self) -> &DocumentLease {
        &self.inner.lease
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_core::MemoryDocument;

    #[test]
    fn headless_page_reports_no_client() {
        let page = Page::headless(ScrimConfig::default());
        assert!(!page.is_client());
        assert!(page.host().is_none());
        assert_eq!(page.lease_holders(), 0);
    }

    #[test]
    fn clones_share_state() {
        let page = Page::new(Rc::new(MemoryDocument::new()), ScrimConfig::default());
        let other = page.clone();
        page.popups().push(|| {});
        assert_eq!(other.popups().len(), 1);

        let lock = other.scroll_lock(LockProfile::modal());
        lock.suspend();
        assert_eq!(page.lease_holders(), 1);
        assert!(page.document_snapshot().is_some());
    }

    #[test]
    fn tick_runs_deferred_work() {
        let page = Page::headless(ScrimConfig::default());
        let hit = Rc::new(std::cell::Cell::new(false));
        let h = Rc::clone(&hit);
        page.deferred()
            .schedule("test", Duration::from_millis(5), move || h.set(true));
        assert_eq!(page.tick(Duration::from_millis(4)), 0);
        assert_eq!(page.tick(Duration::from_millis(5)), 1);
        assert!(hit.get());
    }
}
