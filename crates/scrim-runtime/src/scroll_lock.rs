#![forbid(unsafe_code)]

//! Page scroll suspension with exact restoration.
//!
//! A [`ScrollLock`] pins the body at its current scroll offset while an
//! overlay is shown and puts every inline style it touched back on resume.
//! A [`ViewportGuard`] is the same lock with pinch-zoom disabled through the
//! viewport meta tag, used by full-screen media viewers.
//!
//! # Ownership
//!
//! The document is one global resource, so all locks of a [`Page`] share a
//! single lease:
//!
//! ```text
//!   suspend (lease free)   -> capture snapshot, pin body, add marker   [Acquired]
//!   suspend (lease held)   -> add marker, freeze viewport if needed    [Joined]
//!   suspend (already held) -> nothing                                  [Unchanged]
//!   resume  (others remain)-> drop own marker                          [Retained]
//!   resume  (last holder)  -> restore snapshot, schedule scroll write  [Released]
//! ```
//!
//! # Invariants
//!
//! 1. At most one snapshot exists per page. A second `suspend` never
//!    overwrites it.
//! 2. `suspend` then `resume` on a free lease restores every tracked inline
//!    style, the viewport tag and (after the deferred write) the scroll offset.
//! 3. After the last holder resumes the snapshot slot is empty, so the next
//!    `suspend` starts fresh.
//! 4. Without a document (non-browser render pass) both calls are skipped.
//!
//! # Failure Modes
//!
//! | Failure                      | Behavior                                      |
//! |------------------------------|-----------------------------------------------|
//! | Host rejects a style write   | Logged at warn, remaining writes still happen |
//! | Resume without suspend       | `Unchanged`, no host access                   |
//! | Page torn down before delay  | Deferred scroll write runs against the host   |

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use scrim_core::host::{Document, Element, HostResult, InlineStyle, Priority, StyleProp};

use crate::page::Page;

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// How a lock marks and pins the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockProfile {
    /// Class added to the root element while the lock is held.
    pub marker_class: Cow<'static, str>,
    /// Force the viewport meta tag to disable pinch-zoom.
    pub freeze_viewport: bool,
    /// Pad the body by the scrollbar width so content does not shift.
    pub compensate_scrollbar: bool,
}

impl LockProfile {
    /// Plain profile with the given marker class.
    #[must_use]
    pub fn new(marker_class: impl Into<Cow<'static, str>>) -> Self {
        Self {
            marker_class: marker_class.into(),
            freeze_viewport: false,
            compensate_scrollbar: false,
        }
    }

    /// Also freeze the viewport meta tag.
    #[must_use]
    pub fn freezing_viewport(mut self) -> Self {
        self.freeze_viewport = true;
        self
    }

    /// Also compensate for the scrollbar width.
    #[must_use]
    pub fn compensating_scrollbar(mut self) -> Self {
        self.compensate_scrollbar = true;
        self
    }

    /// Page-level lock used behind the side menus.
    #[must_use]
    pub const fn page() -> Self {
        Self {
            marker_class: Cow::Borrowed("scroll-locked"),
            freeze_viewport: false,
            compensate_scrollbar: true,
        }
    }

    /// Map detail popup.
    #[must_use]
    pub const fn map_popup() -> Self {
        Self {
            marker_class: Cow::Borrowed("map-popup-active"),
            freeze_viewport: false,
            compensate_scrollbar: false,
        }
    }

    /// Global modal set.
    #[must_use]
    pub const fn modal() -> Self {
        Self {
            marker_class: Cow::Borrowed("modal-open"),
            freeze_viewport: false,
            compensate_scrollbar: false,
        }
    }

    /// Full-screen image viewer.
    #[must_use]
    pub const fn image_viewer() -> Self {
        Self {
            marker_class: Cow::Borrowed("viewer-active"),
            freeze_viewport: true,
            compensate_scrollbar: false,
        }
    }

    /// Full-screen video viewer.
    #[must_use]
    pub const fn video_viewer() -> Self {
        Self {
            marker_class: Cow::Borrowed("video-viewer-active"),
            freeze_viewport: true,
            compensate_scrollbar: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Document state captured when the lease is first acquired.
///
/// Each style is kept with its priority, so an `!important` declaration
/// comes back as `!important`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollSnapshot {
    /// Window scroll offset before pinning.
    pub scroll_y: f64,
    pub body_overflow: Option<InlineStyle>,
    pub body_position: Option<InlineStyle>,
    pub body_top: Option<InlineStyle>,
    pub body_width: Option<InlineStyle>,
    pub body_touch_action: Option<InlineStyle>,
    pub body_padding_right: Option<InlineStyle>,
    pub html_overflow: Option<InlineStyle>,
    pub html_scroll_behavior: Option<InlineStyle>,
    /// Viewport meta content, `None` when the tag was absent.
    pub viewport_meta: Option<String>,
}

impl ScrollSnapshot {
    /// Read the current document state.
    #[must_use]
    pub fn capture(host: &dyn Document) -> Self {
        let body = |prop| host.inline_style(Element::Body, prop);
        let html = |prop| host.inline_style(Element::Root, prop);
        Self {
            scroll_y: host.scroll_y(),
            body_overflow: body(StyleProp::Overflow),
            body_position: body(StyleProp::Position),
            body_top: body(StyleProp::Top),
            body_width: body(StyleProp::Width),
            body_touch_action: body(StyleProp::TouchAction),
            body_padding_right: body(StyleProp::PaddingRight),
            html_overflow: html(StyleProp::Overflow),
            html_scroll_behavior: html(StyleProp::ScrollBehavior),
            viewport_meta: host.viewport_meta(),
        }
    }

    fn styles(&self) -> [(Element, StyleProp, Option<&InlineStyle>); 8] {
        [
            (Element::Body, StyleProp::Overflow, self.body_overflow.as_ref()),
            (Element::Body, StyleProp::Position, self.body_position.as_ref()),
            (Element::Body, StyleProp::Top, self.body_top.as_ref()),
            (Element::Body, StyleProp::Width, self.body_width.as_ref()),
            (
                Element::Body,
                StyleProp::TouchAction,
                self.body_touch_action.as_ref(),
            ),
            (
                Element::Body,
                StyleProp::PaddingRight,
                self.body_padding_right.as_ref(),
            ),
            (Element::Root, StyleProp::Overflow, self.html_overflow.as_ref()),
            (
                Element::Root,
                StyleProp::ScrollBehavior,
                self.html_scroll_behavior.as_ref(),
            ),
        ]
    }

    /// Put every captured inline style back at its captured priority,
    /// removing properties that had no inline value. Restores the viewport
    /// tag when `viewport` is set.
    fn restore(&self, host: &dyn Document, viewport: bool) {
        for (element, prop, original) in self.styles() {
            let result = match original {
                Some(style) => host.set_style(element, prop, &style.value, style.priority),
                None => host.remove_style(element, prop),
            };
            report("restore style", result);
        }
        if viewport {
            let result = match &self.viewport_meta {
                Some(content) => host.set_viewport_meta(content),
                None => host.remove_viewport_meta(),
            };
            report("restore viewport", result);
        }
    }
}

fn report(what: &'static str, result: HostResult<()>) {
    if let Err(err) = result {
        scrim_core::warn!(what, error = %err, "host write failed");
    }
}

fn pin(host: &dyn Document, snapshot: &ScrollSnapshot, padding: Option<f64>) {
    let top = format!("-{}px", snapshot.scroll_y);
    let writes = [
        (Element::Body, StyleProp::Overflow, "hidden"),
        (Element::Body, StyleProp::Position, "fixed"),
        (Element::Body, StyleProp::Top, top.as_str()),
        (Element::Body, StyleProp::Width, "100%"),
        (Element::Body, StyleProp::TouchAction, "none"),
        (Element::Root, StyleProp::Overflow, "hidden"),
        (Element::Root, StyleProp::ScrollBehavior, "auto"),
    ];
    for (element, prop, value) in writes {
        report(
            "pin style",
            host.set_style(element, prop, value, Priority::Important),
        );
    }
    if let Some(width) = padding {
        let value = format!("{width}px");
        report(
            "pin padding",
            host.set_style(
                Element::Body,
                StyleProp::PaddingRight,
                &value,
                Priority::Important,
            ),
        );
    }
}

// ---------------------------------------------------------------------------
// Lease
// ---------------------------------------------------------------------------

/// Result of a `suspend` / `resume` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// First holder: snapshot captured, document pinned.
    Acquired,
    /// Joined a lease held by another lock.
    Joined,
    /// Already in the requested state.
    Unchanged,
    /// Released, other holders keep the document pinned.
    Retained,
    /// Last holder released: document restored.
    Released,
    /// No document available; nothing was done.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LockId(u64);

#[derive(Debug, Default)]
struct LeaseState {
    next_id: u64,
    holders: Vec<(LockId, Rc<LockProfile>)>,
    snapshot: Option<ScrollSnapshot>,
    viewport_frozen: bool,
}

/// Ownership token for the page document, shared by every lock of a page.
#[derive(Debug, Clone, Default)]
pub(crate) struct DocumentLease {
    state: Rc<RefCell<LeaseState>>,
}

impl DocumentLease {
    pub(crate) fn next_id(&self) -> LockId {
        let mut state = self.state.borrow_mut();
        let id = LockId(state.next_id);
        state.next_id += 1;
        id
    }

    pub(crate) fn holder_count(&self) -> usize {
        self.state.borrow().holders.len()
    }

    pub(crate) fn snapshot(&self) -> Option<ScrollSnapshot> {
        self.state.borrow().snapshot.clone()
    }

    fn is_held_by(&self, id: LockId) -> bool {
        self.state.borrow().holders.iter().any(|(h, _)| *h == id)
    }
}

// ---------------------------------------------------------------------------
// ScrollLock
// ---------------------------------------------------------------------------

/// Suspends and restores page scrolling for one overlay.
///
/// Cloning yields another handle to the same lock.
#[derive(Debug, Clone)]
pub struct ScrollLock {
    id: LockId,
    profile: Rc<LockProfile>,
    page: Page,
}

impl ScrollLock {
    pub(crate) fn new(page: Page, profile: LockProfile) -> Self {
        Self {
            id: page.lease().next_id(),
            profile: Rc::new(profile),
            page,
        }
    }

    /// This lock's profile.
    #[must_use]
    pub fn profile(&self) -> &LockProfile {
        &self.profile
    }

    /// Whether this lock currently holds the document.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.page.lease().is_held_by(self.id)
    }

    /// The page snapshot while this lock holds the document.
    #[must_use]
    pub fn snapshot(&self) -> Option<ScrollSnapshot> {
        if self.is_suspended() {
            self.page.lease().snapshot()
        } else {
            None
        }
    }

    /// Suspend page scrolling. Idempotent.
    pub fn suspend(&self) -> LockOutcome {
        let Some(host) = self.page.host() else {
            scrim_core::trace!(marker = %self.profile.marker_class, "no document, suspend skipped");
            return LockOutcome::Skipped;
        };
        let host = host.as_ref();
        let config = self.page.config();

        let mut lease = self.page.lease().state.borrow_mut();
        if lease.holders.iter().any(|(h, _)| *h == self.id) {
            return LockOutcome::Unchanged;
        }

        let outcome = if lease.holders.is_empty() {
            let snapshot = ScrollSnapshot::capture(host);
            let padding = (self.profile.compensate_scrollbar && config.compensate_scrollbar)
                .then(|| host.scrollbar_width())
                .filter(|w| *w > 0.0);
            pin(host, &snapshot, padding);
            scrim_core::debug!(
                marker = %self.profile.marker_class,
                scroll_y = snapshot.scroll_y,
                "document lease acquired"
            );
            lease.snapshot = Some(snapshot);
            LockOutcome::Acquired
        } else {
            scrim_core::debug!(
                marker = %self.profile.marker_class,
                holders = lease.holders.len(),
                "document lease joined"
            );
            LockOutcome::Joined
        };

        lease.holders.push((self.id, Rc::clone(&self.profile)));
        report(
            "add marker",
            host.add_class(Element::Root, &self.profile.marker_class),
        );
        if self.profile.freeze_viewport && !lease.viewport_frozen {
            report(
                "freeze viewport",
                host.set_viewport_meta(&config.locked_viewport_content),
            );
            lease.viewport_frozen = true;
        }
        outcome
    }

    /// Resume page scrolling. Idempotent.
    pub fn resume(&self) -> LockOutcome {
        let Some(host) = self.page.host() else {
            scrim_core::trace!(marker = %self.profile.marker_class, "no document, resume skipped");
            return LockOutcome::Skipped;
        };

        let (snapshot, viewport_frozen) = {
            let mut lease = self.page.lease().state.borrow_mut();
            let Some(pos) = lease.holders.iter().position(|(h, _)| *h == self.id) else {
                return LockOutcome::Unchanged;
            };
            lease.holders.remove(pos);

            let marker_shared = lease
                .holders
                .iter()
                .any(|(_, p)| p.marker_class == self.profile.marker_class);
            if !marker_shared {
                report(
                    "remove marker",
                    host.remove_class(Element::Root, &self.profile.marker_class),
                );
            }

            if !lease.holders.is_empty() {
                scrim_core::debug!(
                    marker = %self.profile.marker_class,
                    holders = lease.holders.len(),
                    "document lease retained by other locks"
                );
                return LockOutcome::Retained;
            }
            (
                lease.snapshot.take(),
                std::mem::take(&mut lease.viewport_frozen),
            )
        };

        if let Some(snapshot) = snapshot {
            snapshot.restore(host.as_ref(), viewport_frozen);
            let host = Rc::clone(host);
            let scroll_y = snapshot.scroll_y;
            self.page.deferred().schedule(
                "scroll-restore",
                self.page.config().scroll_restore_delay,
                move || {
                    host.scroll_to(scroll_y);
                    host.dispatch_resize();
                },
            );
            scrim_core::debug!(
                marker = %self.profile.marker_class,
                scroll_y,
                "document lease released"
            );
        }
        LockOutcome::Released
    }
}

// ---------------------------------------------------------------------------
// ViewportGuard
// ---------------------------------------------------------------------------

/// A [`ScrollLock`] that also disables pinch-zoom while held.
#[derive(Debug, Clone)]
pub struct ViewportGuard {
    lock: ScrollLock,
}

impl ViewportGuard {
    pub(crate) fn new(page: Page, profile: LockProfile) -> Self {
        Self {
            lock: ScrollLock::new(page, profile.freezing_viewport()),
        }
    }

    /// Suspend scrolling and freeze the viewport. Idempotent.
    pub fn suspend(&self) -> LockOutcome {
        self.lock.suspend()
    }

    /// Resume scrolling and restore the viewport. Idempotent.
    pub fn resume(&self) -> LockOutcome {
        self.lock.resume()
    }

    /// Whether this guard currently holds the document.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.lock.is_suspended()
    }

    /// The page snapshot while this guard holds the document.
    #[must_use]
    pub fn snapshot(&self) -> Option<ScrollSnapshot> {
        self.lock.snapshot()
    }

    /// The underlying lock.
    #[must_use]
    pub fn as_lock(&self) -> &ScrollLock {
        &self.lock
    }
}
