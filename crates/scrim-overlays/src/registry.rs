#![forbid(unsafe_code)]

//! Generic single-payload overlay registry.
//!
//! An [`OverlayRegistry`] owns the observable [`OverlayState`] of one overlay
//! kind and composes the shared page resources on open and close:
//!
//! ```text
//! open(p):  state := {visible, p} → push close fn on PopupStack → lock.suspend()
//! close():  remove stack entry → state := neutral → lock.resume() → [restore menus]
//! ```
//!
//! # Invariants
//!
//! 1. A visible overlay owns exactly one popup-stack entry and one lock hold.
//! 2. Re-opening a visible overlay replaces the payload only.
//! 3. `close` on a hidden overlay does nothing, so closing through the stack
//!    and through the overlay's own UI are both safe.
//! 4. The stack entry holds a weak reference; a dropped registry leaves a
//!    harmless no-op entry behind.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use scrim_core::{Observable, Subscription};
use scrim_runtime::{Page, PopupId, ScrollLock};

/// Visibility plus payload of one overlay.
///
/// The payload's `Default` value is the kind's neutral payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayState<P> {
    pub visible: bool,
    pub payload: P,
}

impl<P: Default> OverlayState<P> {
    /// Hidden with a neutral payload.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            visible: false,
            payload: P::default(),
        }
    }

    /// Visible with `payload`.
    #[must_use]
    pub fn shown(payload: P) -> Self {
        Self {
            visible: true,
            payload,
        }
    }
}

struct RegistryInner<P> {
    kind: &'static str,
    page: Page,
    state: Observable<OverlayState<P>>,
    lock: ScrollLock,
    entry: Cell<Option<PopupId>>,
    restores_menus: bool,
}

/// One overlay kind: observable state, a scroll lock and a dismiss entry.
///
/// Cloning yields another handle to the same overlay.
pub struct OverlayRegistry<P> {
    inner: Rc<RegistryInner<P>>,
}

impl<P> Clone for OverlayRegistry<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for OverlayRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayRegistry")
            .field("kind", &self.inner.kind)
            .field("state", &self.inner.state)
            .field("entry", &self.inner.entry.get())
            .finish()
    }
}

impl<P> OverlayRegistry<P>
where
    P: Clone + PartialEq + Default + 'static,
{
    /// Registry guarded by `lock`. When `restores_menus` is set, every close
    /// reopens the side menus remembered before the overlay opened.
    #[must_use]
    pub fn new(kind: &'static str, page: Page, lock: ScrollLock, restores_menus: bool) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                kind,
                page,
                state: Observable::new(OverlayState::hidden()),
                lock,
                entry: Cell::new(None),
                restores_menus,
            }),
        }
    }

    /// Show the overlay with `payload`.
    pub fn open(&self, payload: P) {
        let inner = &self.inner;
        inner.state.set(OverlayState::shown(payload));

        if inner.entry.get().is_some() {
            scrim_core::debug!(kind = inner.kind, "overlay already open, payload replaced");
            return;
        }
        let weak: Weak<RegistryInner<P>> = Rc::downgrade(inner);
        let id = inner.page.popups().push(move || {
            if let Some(inner) = weak.upgrade() {
                OverlayRegistry { inner }.close();
            }
        });
        inner.entry.set(Some(id));
        inner.lock.suspend();
        scrim_core::debug!(kind = inner.kind, "overlay opened");
    }

    /// Hide the overlay and release what `open` acquired.
    ///
    /// Returns `false` if the overlay was not visible.
    pub fn close(&self) -> bool {
        let inner = &self.inner;
        if !inner.state.with(|s| s.visible) {
            return false;
        }
        if let Some(id) = inner.entry.take() {
            inner.page.popups().remove(id);
        }
        inner.state.set(OverlayState::hidden());
        inner.lock.resume();
        if inner.restores_menus {
            inner.page.menus().restore_menu_state();
        }
        scrim_core::debug!(kind = inner.kind, "overlay closed");
        true
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> OverlayState<P> {
        self.inner.state.get()
    }

    /// Whether the overlay is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.inner.state.with(|s| s.visible)
    }

    /// Observe state changes.
    pub fn subscribe(&self, listener: impl Fn(&OverlayState<P>) + 'static) -> Subscription {
        self.inner.state.subscribe(listener)
    }

    /// The observable state container.
    #[must_use]
    pub fn observable(&self) -> &Observable<OverlayState<P>> {
        &self.inner.state
    }

    /// The lock suspended while the overlay is visible.
    #[must_use]
    pub fn lock(&self) -> &ScrollLock {
        &self.inner.lock
    }

    /// Dismiss-stack entry while visible.
    #[must_use]
    pub fn popup_entry(&self) -> Option<PopupId> {
        self.inner.entry.get()
    }

    /// Overlay kind name used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.inner.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scrim_core::{MemoryDocument, ScrimConfig};
    use scrim_runtime::{LockOutcome, LockProfile};

    fn registry(page: &Page) -> OverlayRegistry<String> {
        let lock = page.scroll_lock(LockProfile::new("test-overlay"));
        OverlayRegistry::new("test", page.clone(), lock, false)
    }

    #[test]
    fn open_then_close() {
        let page = Page::new(Rc::new(MemoryDocument::new()), ScrimConfig::default());
        let overlay = registry(&page);

        overlay.open("a".into());
        assert_eq!(overlay.state(), OverlayState::shown("a".to_string()));
        assert!(overlay.lock().is_suspended());
        assert_eq!(page.popups().len(), 1);

        assert!(overlay.close());
        assert_eq!(overlay.state(), OverlayState::hidden());
        assert!(!overlay.lock().is_suspended());
        assert!(page.popups().is_empty());
    }

    #[test]
    fn reopen_replaces_payload_only() {
        let page = Page::new(Rc::new(MemoryDocument::new()), ScrimConfig::default());
        let overlay = registry(&page);

        overlay.open("a".into());
        let entry = overlay.popup_entry();
        overlay.open("b".into());
        assert_eq!(overlay.state().payload, "b");
        assert_eq!(overlay.popup_entry(), entry);
        assert_eq!(page.popups().len(), 1);
        assert_eq!(page.lease_holders(), 1);
    }

    #[test]
    fn close_is_idempotent() {
        let page = Page::new(Rc::new(MemoryDocument::new()), ScrimConfig::default());
        let overlay = registry(&page);
        assert!(!overlay.close());
        overlay.open("a".into());
        assert!(overlay.close());
        assert!(!overlay.close());
        assert_eq!(overlay.lock().resume(), LockOutcome::Unchanged);
    }

    #[test]
    fn stack_close_runs_full_close() {
        let page = Page::new(Rc::new(MemoryDocument::new()), ScrimConfig::default());
        let overlay = registry(&page);
        overlay.open("a".into());

        assert!(page.popups().close_top());
        assert!(!overlay.is_visible());
        assert_eq!(overlay.popup_entry(), None);
        assert_eq!(page.lease_holders(), 0);
    }

    #[test]
    fn dropped_registry_leaves_inert_entry() {
        let page = Page::new(Rc::new(MemoryDocument::new()), ScrimConfig::default());
        {
            let overlay = registry(&page);
            overlay.open("a".into());
        }
        assert!(page.popups().close_top());
        assert!(page.popups().is_empty());
    }

    #[test]
    fn subscribers_see_open_and_close() {
        let page = Page::headless(ScrimConfig::default());
        let overlay = registry(&page);
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = overlay.subscribe(move |state| s.borrow_mut().push(state.visible));

        overlay.open("x".into());
        overlay.close();
        assert_eq!(*seen.borrow(), vec![true, false]);
    }
}
