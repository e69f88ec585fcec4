//! Property-based invariant tests for scroll locks, menu memory and the
//! dismiss stack.
//!
//! 1. Suspend is idempotent: a second suspend never replaces the snapshot.
//! 2. Suspend then resume restores every tracked property at its original
//!    priority, and the deferred scroll write lands on the original offset.
//! 3. Any interleaving of nested locks leaves the document untouched once
//!    every lock has resumed.
//! 4. Menu memory is a single slot: only the last store is restored.
//! 5. Restore without a store reopens nothing.
//! 6. `close_top` invokes close functions in reverse push order.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use scrim_core::{Document, Element, MemoryDocument, Priority, ScrimConfig, StyleProp};
use scrim_runtime::{
    LockOutcome, LockProfile, MenuCallbacks, MenuSet, MenuState, Page, PopupStack,
};

// ── Strategies ────────────────────────────────────────────────────────────

fn css_value() -> impl Strategy<Value = Option<(String, Priority)>> {
    prop::option::of((
        prop::sample::select(vec![
            "auto", "visible", "scroll", "relative", "static", "12px", "50%", "pan-y", "smooth",
        ]),
        prop_oneof![Just(Priority::Normal), Just(Priority::Important)],
    ))
    .prop_map(|v| v.map(|(value, priority)| (value.to_owned(), priority)))
}

fn document_strategy() -> impl Strategy<Value = MemoryDocument> {
    (
        0u32..5_000,
        prop::collection::vec(css_value(), 7),
        prop::option::of(prop::sample::select(vec![
            "width=device-width",
            "width=device-width, initial-scale=1",
            "",
        ])),
        any::<bool>(),
    )
        .prop_map(|(scroll, values, viewport, scrollbar)| {
            let props = [
                (Element::Body, StyleProp::Overflow),
                (Element::Body, StyleProp::Position),
                (Element::Body, StyleProp::Top),
                (Element::Body, StyleProp::Width),
                (Element::Body, StyleProp::TouchAction),
                (Element::Root, StyleProp::Overflow),
                (Element::Root, StyleProp::ScrollBehavior),
            ];
            let mut doc = MemoryDocument::new()
                .with_scroll_y(f64::from(scroll))
                .with_class(Element::Root, "theme-dark");
            if scrollbar {
                doc = doc.with_widths(1024.0, 1009.0);
            }
            for ((element, prop), value) in props.into_iter().zip(values) {
                if let Some((value, priority)) = value {
                    doc = doc.with_style_priority(element, prop, value, priority);
                }
            }
            if let Some(content) = viewport {
                doc = doc.with_viewport(content);
            }
            doc
        })
}

fn profile_strategy() -> impl Strategy<Value = LockProfile> {
    prop::sample::select(vec![
        LockProfile::page(),
        LockProfile::map_popup(),
        LockProfile::modal(),
        LockProfile::image_viewer(),
        LockProfile::video_viewer(),
    ])
}

fn settle(page: &Page) {
    page.tick(page.deferred().now() + Duration::from_secs(1));
}

fn menu_recorder() -> (MenuState, Rc<RefCell<Vec<&'static str>>>) {
    let page = Page::headless(ScrimConfig::default());
    let menus = page.menus().clone();
    let log = Rc::new(RefCell::new(Vec::new()));
    let (a, b) = (Rc::clone(&log), Rc::clone(&log));
    menus.register_open_callbacks(MenuCallbacks::new(
        move || a.borrow_mut().push("memories"),
        move || b.borrow_mut().push("positions"),
    ));
    (menus, log)
}

// ── Scroll lock ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn suspend_is_idempotent(doc in document_strategy(), profile in profile_strategy(), drift in 0u32..3_000) {
        let doc = Rc::new(doc);
        let page = Page::new(doc.clone(), ScrimConfig::default());
        let lock = page.scroll_lock(profile);

        prop_assert_eq!(lock.suspend(), LockOutcome::Acquired);
        let first = lock.snapshot();
        doc.user_scroll(f64::from(drift));
        prop_assert_eq!(lock.suspend(), LockOutcome::Unchanged);
        prop_assert_eq!(lock.snapshot(), first);
    }

    #[test]
    fn suspend_resume_round_trip(doc in document_strategy(), profile in profile_strategy()) {
        let doc = Rc::new(doc);
        let before = doc.state();
        let page = Page::new(doc.clone(), ScrimConfig::default());
        let lock = page.scroll_lock(profile);

        lock.suspend();
        prop_assert_eq!(lock.resume(), LockOutcome::Released);
        settle(&page);

        prop_assert_eq!(doc.state(), before.clone());
        prop_assert_eq!(doc.scroll_writes(), vec![before.scroll_y]);
        prop_assert_eq!(doc.resize_events(), 1);
        prop_assert_eq!(page.lease_holders(), 0);
    }

    #[test]
    fn nested_locks_restore_once_all_resume(
        doc in document_strategy(),
        profiles in prop::collection::vec(profile_strategy(), 1..5),
        order in any::<prop::sample::Index>(),
    ) {
        let doc = Rc::new(doc);
        let before = doc.state();
        let page = Page::new(doc.clone(), ScrimConfig::default());
        let locks: Vec<_> = profiles.into_iter().map(|p| page.scroll_lock(p)).collect();

        for lock in &locks {
            lock.suspend();
        }
        prop_assert_eq!(page.lease_holders(), locks.len());

        // Rotate the release order so the first lock is not always released first.
        let start = order.index(locks.len());
        for i in 0..locks.len() {
            locks[(start + i) % locks.len()].resume();
        }
        settle(&page);

        prop_assert_eq!(page.lease_holders(), 0);
        prop_assert_eq!(doc.state(), before);
        prop_assert!(doc.scroll_y() >= 0.0);
    }
}

// ── Menu memory ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn last_store_wins(stores in prop::collection::vec((any::<bool>(), any::<bool>()), 1..6)) {
        let (menus, log) = menu_recorder();
        for (memories, positions) in &stores {
            menus.store_menu_state(MenuSet::from_open(*memories, *positions));
        }
        let (memories, positions) = *stores.last().unwrap_or(&(false, false));
        let expected = MenuSet::from_open(memories, positions);

        prop_assert_eq!(menus.restore_menu_state(), expected);
        let mut want = Vec::new();
        if memories { want.push("memories"); }
        if positions { want.push("positions"); }
        prop_assert_eq!(log.borrow().clone(), want);

        // Consumed: a second restore is a no-op.
        prop_assert_eq!(menus.restore_menu_state(), MenuSet::empty());
    }

    #[test]
    fn close_menus_for_popup_guard(memories in any::<bool>(), positions in any::<bool>()) {
        let (menus, log) = menu_recorder();
        let open = MenuSet::from_open(memories, positions);

        let stored = menus.close_menus_for_popup(open);
        prop_assert_eq!(stored, !open.is_empty());
        prop_assert_eq!(menus.stored_snapshot().stored, stored);
        prop_assert_eq!(menus.restore_menu_state(), open);
        prop_assert_eq!(log.borrow().len(), open.bits().count_ones() as usize);
    }
}

#[test]
fn restore_without_store_reopens_nothing() {
    let (menus, log) = menu_recorder();
    assert_eq!(menus.restore_menu_state(), MenuSet::empty());
    assert!(log.borrow().is_empty());
}

// ── Dismiss stack ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn close_top_reverses_push_order(n in 0usize..12) {
        let stack = PopupStack::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..n {
            let log = Rc::clone(&log);
            stack.push(move || log.borrow_mut().push(i));
        }

        for _ in 0..n {
            prop_assert!(stack.close_top());
        }
        prop_assert!(!stack.close_top());
        let expected: Vec<usize> = (0..n).rev().collect();
        prop_assert_eq!(log.borrow().clone(), expected);
        prop_assert_eq!(stack.depth().get(), 0);
    }
}
