#![forbid(unsafe_code)]

//! Side-menu memory across overlays.
//!
//! Before an overlay opens, the side menus (memories, positions) are closed
//! and their open/closed status is remembered. When the overlay closes, the
//! menus that were open are reopened. The menus themselves are external UI
//! components: they register their open/close functions here and report their
//! status through [`MenuState::update_current_state`].
//!
//! # Invariants
//!
//! 1. The menu snapshot is a single slot: the last `store_menu_state` wins.
//! 2. `restore_menu_state` consumes the snapshot; a second call is a no-op.
//! 3. `close_menus_for_popup` with every menu closed records nothing, so a
//!    neutral snapshot is never mistaken for "all menus were closed on purpose".
//! 4. Unregistered callbacks are skipped silently.
//! 5. Callbacks run after internal state is released; they may call back in.

use core::time::Duration;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use bitflags::bitflags;
use scrim_core::DeferredQueue;

bitflags! {
    /// Set of side menus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MenuSet: u8 {
        /// The memories menu.
        const MEMORIES  = 0b01;
        /// The positions menu.
        const POSITIONS = 0b10;
    }
}

impl Default for MenuSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl MenuSet {
    /// Build a set from per-menu open flags.
    #[must_use]
    pub fn from_open(memories: bool, positions: bool) -> Self {
        let mut set = Self::empty();
        set.set(Self::MEMORIES, memories);
        set.set(Self::POSITIONS, positions);
        set
    }
}

/// One side menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Menu {
    Memories,
    Positions,
}

impl Menu {
    /// Both menus, in callback order.
    pub const ALL: [Menu; 2] = [Menu::Memories, Menu::Positions];

    /// The single-menu set for this menu.
    #[must_use]
    pub const fn flag(self) -> MenuSet {
        match self {
            Self::Memories => MenuSet::MEMORIES,
            Self::Positions => MenuSet::POSITIONS,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Memories => 0,
            Self::Positions => 1,
        }
    }
}

/// Saved menu status from before an overlay opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuSnapshot {
    /// Menus that were open.
    pub was_open: MenuSet,
    /// Whether anything is waiting to be restored.
    pub stored: bool,
}

impl MenuSnapshot {
    /// Nothing to restore.
    pub const NEUTRAL: Self = Self {
        was_open: MenuSet::empty(),
        stored: false,
    };
}

/// Callback registered by a menu component.
pub type MenuCallback = Rc<dyn Fn()>;

/// A pair of per-menu callbacks; either side may be missing.
#[derive(Clone, Default)]
pub struct MenuCallbacks {
    pub memories: Option<MenuCallback>,
    pub positions: Option<MenuCallback>,
}

impl MenuCallbacks {
    /// Both callbacks present.
    #[must_use]
    pub fn new(memories: impl Fn() + 'static, positions: impl Fn() + 'static) -> Self {
        Self {
            memories: Some(Rc::new(memories)),
            positions: Some(Rc::new(positions)),
        }
    }

    fn into_array(self) -> [Option<MenuCallback>; 2] {
        [self.memories, self.positions]
    }
}

impl fmt::Debug for MenuCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuCallbacks")
            .field("memories", &self.memories.is_some())
            .field("positions", &self.positions.is_some())
            .finish()
    }
}

#[derive(Default)]
struct MenuInner {
    close: [Option<MenuCallback>; 2],
    open: [Option<MenuCallback>; 2],
    unlock_scroll: Option<MenuCallback>,
    current: MenuSet,
    snapshot: MenuSnapshot,
}

/// Process-wide side-menu memory. Cloning yields another handle.
#[derive(Clone)]
pub struct MenuState {
    inner: Rc<RefCell<MenuInner>>,
    deferred: DeferredQueue,
    unlock_delay: Duration,
    interaction_delay: Duration,
}

impl fmt::Debug for MenuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MenuState")
            .field("current", &inner.current)
            .field("snapshot", &inner.snapshot)
            .finish()
    }
}

impl MenuState {
    /// Menu memory that schedules follow-up work on `deferred`.
    #[must_use]
    pub fn new(deferred: DeferredQueue, unlock_delay: Duration, interaction_delay: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MenuInner::default())),
            deferred,
            unlock_delay,
            interaction_delay,
        }
    }

    /// Install the menus' close functions and the page scroll-unlock function.
    pub fn register_close_callbacks(&self, close: MenuCallbacks, unlock_scroll: Option<MenuCallback>) {
        let mut inner = self.inner.borrow_mut();
        inner.close = close.into_array();
        inner.unlock_scroll = unlock_scroll;
    }

    /// Install the menus' open functions.
    pub fn register_open_callbacks(&self, open: MenuCallbacks) {
        self.inner.borrow_mut().open = open.into_array();
    }

    /// Record which menus are open right now.
    pub fn update_current_state(&self, open: MenuSet) {
        self.inner.borrow_mut().current = open;
    }

    /// Last reported open menus.
    #[must_use]
    pub fn current_state(&self) -> MenuSet {
        self.inner.borrow().current
    }

    /// The pending snapshot, [`MenuSnapshot::NEUTRAL`] when none.
    #[must_use]
    pub fn stored_snapshot(&self) -> MenuSnapshot {
        self.inner.borrow().snapshot
    }

    /// Remember `open` for a later restore, replacing any previous snapshot.
    pub fn store_menu_state(&self, open: MenuSet) {
        let snapshot = MenuSnapshot {
            was_open: open,
            stored: true,
        };
        self.inner.borrow_mut().snapshot = snapshot;
        scrim_core::debug!(was_open = ?open, "menu state stored");
    }

    /// Reopen the menus recorded by the last store and forget the snapshot.
    ///
    /// Returns the menus whose open callback ran.
    pub fn restore_menu_state(&self) -> MenuSet {
        let (snapshot, open) = {
            let mut inner = self.inner.borrow_mut();
            let snapshot = std::mem::replace(&mut inner.snapshot, MenuSnapshot::NEUTRAL);
            (snapshot, inner.open.clone())
        };
        if !snapshot.stored {
            scrim_core::debug!("no menu state to restore");
            return MenuSet::empty();
        }

        scrim_core::debug!(was_open = ?snapshot.was_open, "restoring menu state");
        let mut reopened = MenuSet::empty();
        for menu in Menu::ALL {
            if !snapshot.was_open.contains(menu.flag()) {
                continue;
            }
            if let Some(callback) = &open[menu.index()] {
                callback();
                reopened |= menu.flag();
            }
        }
        reopened
    }

    /// Forget the snapshot without reopening anything.
    pub fn clear_stored_menu_state(&self) {
        self.inner.borrow_mut().snapshot = MenuSnapshot::NEUTRAL;
        scrim_core::debug!("menu state cleared");
    }

    /// Store and close the menus if at least one is open.
    ///
    /// Returns whether anything was stored.
    pub fn close_menus_for_popup(&self, open: MenuSet) -> bool {
        if open.is_empty() {
            return false;
        }
        self.store_menu_state(open);
        self.close_all_menus();
        scrim_core::debug!("menus closed for popup, state stored");
        true
    }

    /// Run every registered close callback. If any ran, schedule the
    /// registered scroll-unlock function after the unlock delay.
    ///
    /// Returns whether any menu was closed.
    pub fn close_all_menus(&self) -> bool {
        let close = self.inner.borrow().close.clone();
        let mut closed = false;
        for callback in close.iter().flatten() {
            callback();
            closed = true;
        }

        let has_unlock = self.inner.borrow().unlock_scroll.is_some();
        if closed && has_unlock {
            let weak: Weak<RefCell<MenuInner>> = Rc::downgrade(&self.inner);
            self.deferred
                .schedule("menu-scroll-unlock", self.unlock_delay, move || {
                    let unlock = weak
                        .upgrade()
                        .and_then(|inner| inner.borrow().unlock_scroll.clone());
                    if let Some(unlock) = unlock {
                        unlock();
                    }
                });
        }
        closed
    }

    /// Run one menu's close callback. Returns whether it was registered.
    pub fn close_menu(&self, menu: Menu) -> bool {
        let callback = self.inner.borrow().close[menu.index()].clone();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Close every menu after the interaction delay, letting the action that
    /// triggered it complete first.
    pub fn close_menus_on_interaction(&self) {
        let menus = self.clone();
        self.deferred
            .schedule("menu-close-on-interaction", self.interaction_delay, move || {
                menus.close_all_menus();
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn recorder(log: &Log, name: &'static str) -> impl Fn() + 'static {
        let log = Rc::clone(log);
        move || log.borrow_mut().push(name)
    }

    fn menus() -> (MenuState, DeferredQueue, Log) {
        let deferred = DeferredQueue::new();
        let state = MenuState::new(
            deferred.clone(),
            Duration::from_millis(100),
            Duration::from_millis(50),
        );
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        state.register_open_callbacks(MenuCallbacks::new(
            recorder(&log, "open memories"),
            recorder(&log, "open positions"),
        ));
        state.register_close_callbacks(
            MenuCallbacks::new(
                recorder(&log, "close memories"),
                recorder(&log, "close positions"),
            ),
            Some(Rc::new(recorder(&log, "unlock"))),
        );
        (state, deferred, log)
    }

    #[test]
    fn restore_without_store_opens_nothing() {
        let (state, _, log) = menus();
        assert_eq!(state.restore_menu_state(), MenuSet::empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn last_store_wins() {
        let (state, _, log) = menus();
        state.store_menu_state(MenuSet::MEMORIES);
        state.store_menu_state(MenuSet::POSITIONS);
        assert_eq!(state.restore_menu_state(), MenuSet::POSITIONS);
        assert_eq!(*log.borrow(), vec!["open positions"]);
    }

    #[test]
    fn restore_consumes_snapshot() {
        let (state, _, log) = menus();
        state.store_menu_state(MenuSet::all());
        state.restore_menu_state();
        state.restore_menu_state();
        assert_eq!(*log.borrow(), vec!["open memories", "open positions"]);
        assert_eq!(state.stored_snapshot(), MenuSnapshot::NEUTRAL);
    }

    #[test]
    fn clear_discards_without_opening() {
        let (state, _, log) = menus();
        state.store_menu_state(MenuSet::all());
        state.clear_stored_menu_state();
        assert_eq!(state.restore_menu_state(), MenuSet::empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn close_for_popup_with_nothing_open_records_nothing() {
        let (state, deferred, log) = menus();
        assert!(!state.close_menus_for_popup(MenuSet::empty()));
        assert!(!state.stored_snapshot().stored);
        assert_eq!(deferred.pending(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn close_for_popup_stores_and_closes() {
        let (state, deferred, log) = menus();
        assert!(state.close_menus_for_popup(MenuSet::from_open(true, false)));
        assert_eq!(
            state.stored_snapshot(),
            MenuSnapshot {
                was_open: MenuSet::MEMORIES,
                stored: true
            }
        );
        assert_eq!(*log.borrow(), vec!["close memories", "close positions"]);

        deferred.advance(Duration::from_millis(99));
        assert!(!log.borrow().contains(&"unlock"));
        deferred.advance(Duration::from_millis(1));
        assert_eq!(log.borrow().last(), Some(&"unlock"));
    }

    #[test]
    fn unregistered_callbacks_are_noops() {
        let deferred = DeferredQueue::new();
        let state = MenuState::new(deferred.clone(), Duration::ZERO, Duration::ZERO);
        state.store_menu_state(MenuSet::all());
        assert_eq!(state.restore_menu_state(), MenuSet::empty());
        assert!(!state.close_all_menus());
        assert!(!state.close_menu(Menu::Positions));
        assert_eq!(deferred.pending(), 0);
    }

    #[test]
    fn unlock_is_skipped_without_registration() {
        let deferred = DeferredQueue::new();
        let state = MenuState::new(deferred.clone(), Duration::ZERO, Duration::ZERO);
        state.register_close_callbacks(MenuCallbacks::new(|| {}, || {}), None);
        assert!(state.close_all_menus());
        assert_eq!(deferred.pending(), 0);
    }

    #[test]
    fn close_single_menu() {
        let (state, _, log) = menus();
        assert!(state.close_menu(Menu::Positions));
        assert_eq!(*log.borrow(), vec!["close positions"]);
    }

    #[test]
    fn interaction_close_is_deferred() {
        let (state, deferred, log) = menus();
        state.close_menus_on_interaction();
        assert!(log.borrow().is_empty());
        deferred.advance(Duration::from_millis(50));
        assert_eq!(*log.borrow(), vec!["close memories", "close positions"]);
        deferred.advance(Duration::from_millis(100));
        assert_eq!(log.borrow().last(), Some(&"unlock"));
    }

    #[test]
    fn callbacks_may_reenter() {
        let deferred = DeferredQueue::new();
        let state = MenuState::new(deferred, Duration::ZERO, Duration::ZERO);
        let handle = state.clone();
        state.register_open_callbacks(MenuCallbacks {
            memories: Some(Rc::new(move || {
                handle.update_current_state(MenuSet::MEMORIES);
            })),
            positions: None,
        });
        state.store_menu_state(MenuSet::all());
        assert_eq!(state.restore_menu_state(), MenuSet::MEMORIES);
        assert_eq!(state.current_state(), MenuSet::MEMORIES);
    }

    #[test]
    fn current_state_is_a_cache() {
        let (state, _, log) = menus();
        state.update_current_state(MenuSet::from_open(false, true));
        assert_eq!(state.current_state(), MenuSet::POSITIONS);
        assert!(log.borrow().is_empty());
    }
}
