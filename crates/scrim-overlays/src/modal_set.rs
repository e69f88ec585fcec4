#![forbid(unsafe_code)]

//! The global modal set: four independent modals sharing one state
//! container and one scroll lock.
//!
//! # Invariants
//!
//! 1. Opening or closing one modal never changes another modal's slot.
//! 2. The shared lock is held while at least one modal is visible.
//! 3. Each visible modal owns exactly one popup-stack entry.
//! 4. [`ModalSet::has_open_modals`] equals the disjunction of the four
//!    visibility flags after every change.
//! 5. Every effective close restores the side-menu memory.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use serde_json::Value;

use scrim_core::{Computed, Observable, Subscription};
use scrim_runtime::{LockProfile, Page, PopupId, ScrollLock};

use crate::registry::OverlayState;

/// One modal of the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    AddMemory,
    AddPosition,
    MemoryDetails,
    PositionDetails,
}

impl ModalKind {
    pub const ALL: [Self; 4] = [
        Self::AddMemory,
        Self::AddPosition,
        Self::MemoryDetails,
        Self::PositionDetails,
    ];

    const fn index(self) -> usize {
        match self {
            Self::AddMemory => 0,
            Self::AddPosition => 1,
            Self::MemoryDetails => 2,
            Self::PositionDetails => 3,
        }
    }

    /// Camel-case name used by the JavaScript surface.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddMemory => "addMemory",
            Self::AddPosition => "addPosition",
            Self::MemoryDetails => "memoryDetails",
            Self::PositionDetails => "positionDetails",
        }
    }
}

impl fmt::Display for ModalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown modal name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModal(pub String);

impl fmt::Display for UnknownModal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown modal: {}", self.0)
    }
}

impl std::error::Error for UnknownModal {}

impl FromStr for ModalKind {
    type Err = UnknownModal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| UnknownModal(s.to_owned()))
    }
}

/// State of all four modals. A hidden slot carries no payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModalSetState {
    slots: [OverlayState<Option<Value>>; 4],
}

impl ModalSetState {
    #[must_use]
    pub fn is_open(&self, kind: ModalKind) -> bool {
        self.slots[kind.index()].visible
    }

    #[must_use]
    pub fn payload(&self, kind: ModalKind) -> Option<&Value> {
        self.slots[kind.index()].payload.as_ref()
    }

    #[must_use]
    pub fn slot(&self, kind: ModalKind) -> &OverlayState<Option<Value>> {
        &self.slots[kind.index()]
    }

    /// Whether any modal is visible.
    #[must_use]
    pub fn any_open(&self) -> bool {
        self.slots.iter().any(|s| s.visible)
    }

    /// Visible modals in declaration order.
    #[must_use]
    pub fn open_kinds(&self) -> Vec<ModalKind> {
        ModalKind::ALL
            .into_iter()
            .filter(|k| self.is_open(*k))
            .collect()
    }
}

struct ModalInner {
    page: Page,
    state: Observable<ModalSetState>,
    has_open: Computed<bool>,
    lock: ScrollLock,
    entries: [Cell<Option<PopupId>>; 4],
}

/// The global modal set. Cloning yields another handle.
#[derive(Clone)]
pub struct ModalSet {
    inner: Rc<ModalInner>,
}

impl fmt::Debug for ModalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalSet")
            .field("open", &self.inner.state.with(ModalSetState::open_kinds))
            .field("locked", &self.inner.lock.is_suspended())
            .finish()
    }
}

impl ModalSet {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let state = Observable::new(ModalSetState::default());
        let has_open = Computed::new(&state, ModalSetState::any_open);
        Self {
            inner: Rc::new(ModalInner {
                page: page.clone(),
                state,
                has_open,
                lock: page.scroll_lock(LockProfile::modal()),
                entries: Default::default(),
            }),
        }
    }

    /// Show `kind` with an optional payload. Re-opening a visible modal
    /// replaces its payload.
    pub fn open(&self, kind: ModalKind, payload: Option<Value>) {
        let inner = &self.inner;
        inner.state.update(|s| {
            s.slots[kind.index()] = OverlayState::shown(payload);
        });

        let entry = &inner.entries[kind.index()];
        if entry.get().is_none() {
            let weak: Weak<ModalInner> = Rc::downgrade(inner);
            let id = inner.page.popups().push(move || {
                if let Some(inner) = weak.upgrade() {
                    ModalSet { inner }.close(kind);
                }
            });
            entry.set(Some(id));
        }
        inner.lock.suspend();
        scrim_core::debug!(modal = kind.name(), "modal opened");
    }

    /// Hide `kind`. Returns `false` if it was not visible.
    pub fn close(&self, kind: ModalKind) -> bool {
        let inner = &self.inner;
        if !inner.state.with(|s| s.is_open(kind)) {
            return false;
        }
        if let Some(id) = inner.entries[kind.index()].take() {
            inner.page.popups().remove(id);
        }
        inner.state.update(|s| {
            s.slots[kind.index()] = OverlayState::hidden();
        });
        if !inner.state.with(ModalSetState::any_open) {
            inner.lock.resume();
        }
        inner.page.menus().restore_menu_state();
        scrim_core::debug!(modal = kind.name(), "modal closed");
        true
    }

    /// Close every visible modal. Returns how many were closed.
    pub fn close_all(&self) -> usize {
        ModalKind::ALL
            .into_iter()
            .filter(|k| self.close(*k))
            .count()
    }

    #[must_use]
    pub fn state(&self) -> ModalSetState {
        self.inner.state.get()
    }

    #[must_use]
    pub fn is_open(&self, kind: ModalKind) -> bool {
        self.inner.state.with(|s| s.is_open(kind))
    }

    /// Payload of `kind`, `None` while hidden or opened without one.
    #[must_use]
    pub fn payload(&self, kind: ModalKind) -> Option<Value> {
        self.inner.state.with(|s| s.payload(kind).cloned())
    }

    /// Derived flag: any modal visible.
    #[must_use]
    pub fn has_open_modals(&self) -> &Computed<bool> {
        &self.inner.has_open
    }

    pub fn subscribe(&self, listener: impl Fn(&ModalSetState) + 'static) -> Subscription {
        self.inner.state.subscribe(listener)
    }

    /// The shared modal lock.
    #[must_use]
    pub fn lock(&self) -> &ScrollLock {
        &self.inner.lock
    }

    /// Dismiss-stack entry of `kind` while visible.
    #[must_use]
    pub fn popup_entry(&self, kind: ModalKind) -> Option<PopupId> {
        self.inner.entries[kind.index()].get()
    }

    pub fn open_add_memory(&self, data: Option<Value>) {
        self.open(ModalKind::AddMemory, data);
    }

    pub fn close_add_memory(&self) -> bool {
        self.close(ModalKind::AddMemory)
    }

    pub fn open_add_position(&self, data: Option<Value>) {
        self.open(ModalKind::AddPosition, data);
    }

    pub fn close_add_position(&self) -> bool {
        self.close(ModalKind::AddPosition)
    }

    pub fn open_memory_details(&self, memory: Value) {
        self.open(ModalKind::MemoryDetails, Some(memory));
    }

    pub fn close_memory_details(&self) -> bool {
        self.close(ModalKind::MemoryDetails)
    }

    pub fn open_position_details(&self, position: Value) {
        self.open(ModalKind::PositionDetails, Some(position));
    }

    pub fn close_position_details(&self) -> bool {
        self.close(ModalKind::PositionDetails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scrim_core::{Document, Element, MemoryDocument, ScrimConfig};
    use scrim_runtime::{LockOutcome, MenuCallbacks, MenuSet};
    use serde_json::json;
    use std::cell::RefCell;

    fn page() -> (Page, Rc<MemoryDocument>) {
        let doc = Rc::new(MemoryDocument::new());
        (Page::new(doc.clone(), ScrimConfig::default()), doc)
    }

    #[test]
    fn modals_are_independent() {
        let (page, _) = page();
        let modals = ModalSet::new(&page);

        modals.open_add_memory(Some(json!({"title": "trip"})));
        modals.open_position_details(json!({"id": 7}));
        assert_eq!(
            modals.state().open_kinds(),
            vec![ModalKind::AddMemory, ModalKind::PositionDetails]
        );

        assert!(modals.close_add_memory());
        assert!(modals.is_open(ModalKind::PositionDetails));
        assert_eq!(modals.payload(ModalKind::PositionDetails), Some(json!({"id": 7})));
        assert_eq!(modals.payload(ModalKind::AddMemory), None);
    }

    #[test]
    fn shared_lock_held_until_last_close() {
        let (page, doc) = page();
        let modals = ModalSet::new(&page);

        modals.open_add_memory(None);
        modals.open_add_position(None);
        assert_eq!(page.lease_holders(), 1);

        modals.close_add_memory();
        assert!(modals.lock().is_suspended());
        assert!(doc.has_class(Element::Root, "modal-open"));

        modals.close_add_position();
        assert!(!modals.lock().is_suspended());
        assert!(!doc.has_class(Element::Root, "modal-open"));
        assert_eq!(modals.lock().resume(), LockOutcome::Unchanged);
    }

    #[test]
    fn has_open_modals_tracks_flags() {
        let (page, _) = page();
        let modals = ModalSet::new(&page);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = modals.has_open_modals().subscribe(move |v| s.borrow_mut().push(*v));

        assert!(!modals.has_open_modals().get());
        modals.open_add_memory(None);
        modals.open_memory_details(json!({}));
        modals.close_add_memory();
        modals.close_memory_details();
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn every_close_restores_menus() {
        let (page, _) = page();
        let reopened = Rc::new(RefCell::new(0));
        let (a, b) = (Rc::clone(&reopened), Rc::clone(&reopened));
        page.menus().register_open_callbacks(MenuCallbacks::new(
            move || *a.borrow_mut() += 1,
            move || *b.borrow_mut() += 1,
        ));
        let modals = ModalSet::new(&page);

        page.menus().store_menu_state(MenuSet::MEMORIES);
        modals.open_add_memory(None);
        modals.close_add_memory();
        assert_eq!(*reopened.borrow(), 1);

        // Hidden modal: nothing to close, nothing restored.
        page.menus().store_menu_state(MenuSet::MEMORIES);
        assert!(!modals.close_add_memory());
        assert!(page.menus().stored_snapshot().stored);
    }

    #[test]
    fn close_all_closes_every_visible_modal() {
        let (page, _) = page();
        let modals = ModalSet::new(&page);
        modals.open_add_memory(None);
        modals.open_add_position(None);
        modals.open_memory_details(json!(1));
        assert_eq!(modals.close_all(), 3);
        assert!(page.popups().is_empty());
        assert_eq!(page.lease_holders(), 0);
    }

    #[test]
    fn modal_names_round_trip() {
        for kind in ModalKind::ALL {
            assert_eq!(kind.name().parse::<ModalKind>(), Ok(kind));
        }
        assert_eq!(
            "settings".parse::<ModalKind>(),
            Err(UnknownModal("settings".into()))
        );
    }
}
