#![forbid(unsafe_code)]

//! LIFO registry of open overlays.
//!
//! Every overlay pushes its close function when it opens. A single dismiss
//! gesture (escape key, back navigation) closes whatever opened last through
//! [`PopupStack::close_top`], without knowing which kind of overlay it is.
//!
//! # Invariants
//!
//! 1. Entry order equals open order.
//! 2. Each entry leaves the stack exactly once: by `close_top` (invoked), or by
//!    `pop`/`remove` (not invoked).
//! 3. `close_top` removes the entry before invoking it, so a close function
//!    that reaches back into the stack cannot remove its own entry again.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use scrim_core::Observable;

/// Identifier of one stack entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupId(u64);

type CloseFn = Box<dyn FnOnce()>;

#[derive(Default)]
struct StackInner {
    next_id: u64,
    entries: Vec<(PopupId, CloseFn)>,
}

/// Shared dismiss stack. Cloning yields another handle.
#[derive(Clone)]
pub struct PopupStack {
    inner: Rc<RefCell<StackInner>>,
    depth: Observable<usize>,
}

impl Default for PopupStack {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PopupStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupStack")
            .field("ids", &self.ids())
            .finish()
    }
}

impl PopupStack {
    /// Empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(StackInner::default())),
            depth: Observable::new(0),
        }
    }

    /// Append a close function. Returns its entry id.
    pub fn push(&self, on_close: impl FnOnce() + 'static) -> PopupId {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = PopupId(inner.next_id);
            inner.next_id += 1;
            inner.entries.push((id, Box::new(on_close)));
            id
        };
        scrim_core::trace!(id = id.0, "popup pushed");
        self.sync_depth();
        id
    }

    /// Remove the most recent entry without invoking it.
    pub fn pop(&self) -> Option<PopupId> {
        let popped = self.inner.borrow_mut().entries.pop().map(|(id, _)| id);
        if popped.is_some() {
            self.sync_depth();
        }
        popped
    }

    /// Remove a specific entry without invoking it.
    ///
    /// Returns `false` if the entry already left the stack.
    pub fn remove(&self, id: PopupId) -> bool {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            match inner.entries.iter().position(|(e, _)| *e == id) {
                Some(pos) => {
                    inner.entries.remove(pos);
                    true
                }
                None => false,
            }
        };
        if removed {
            scrim_core::trace!(id = id.0, "popup removed");
            self.sync_depth();
        }
        removed
    }

    /// Close the most recently opened overlay.
    ///
    /// Returns `false` and does nothing if the stack is empty.
    pub fn close_top(&self) -> bool {
        let top = self.inner.borrow_mut().entries.pop();
        let Some((id, on_close)) = top else {
            return false;
        };
        scrim_core::trace!(id = id.0, "closing top popup");
        self.sync_depth();
        on_close();
        true
    }

    /// Number of open entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Whether no overlay is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is still on the stack.
    #[must_use]
    pub fn contains(&self, id: PopupId) -> bool {
        self.inner.borrow().entries.iter().any(|(e, _)| *e == id)
    }

    /// Id of the most recent entry.
    #[must_use]
    pub fn top(&self) -> Option<PopupId> {
        self.inner.borrow().entries.last().map(|(id, _)| *id)
    }

    /// Entry ids, oldest first.
    #[must_use]
    pub fn ids(&self) -> Vec<PopupId> {
        self.inner.borrow().entries.iter().map(|(id, _)| *id).collect()
    }

    /// Observable stack depth.
    #[must_use]
    pub fn depth(&self) -> &Observable<usize> {
        &self.depth
    }

    fn sync_depth(&self) {
        let len = self.len();
        self.depth.set(len);
    }
}
