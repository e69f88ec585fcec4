#![forbid(unsafe_code)]

//! Single-threaded reactive value containers.
//!
//! [`Observable`] holds a value and notifies subscribers when it changes.
//! [`Computed`] derives a value from one source observable and recomputes
//! on every upstream notification.
//!
//! # Invariants
//!
//! 1. `set`/`update` notify only when the new value differs (`PartialEq`).
//! 2. The version counter advances exactly once per observed change.
//! 3. Listeners run after the internal borrow is released, so a listener may
//!    read or write this observable or any other one.
//! 4. Notification is not re-entrant. A write made while listeners run stops
//!    the current pass, and a fresh pass starts with the newest value. Every
//!    listener therefore ends on the final value.
//! 5. Dropping a [`Subscription`] removes its listener; notifications already
//!    in flight still reach it once.
//!
//! # Failure Modes
//!
//! | Scenario                              | Behavior                                |
//! |---------------------------------------|-----------------------------------------|
//! | Listener writes to its own observable | Pass restarts with the newest value     |
//! | Listener panics                       | Notification state reset on unwind      |
//! | Subscription outlives the observable  | Drop is a no-op                         |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Slot<T> {
    value: T,
    version: u64,
    next_id: u64,
    notifying: bool,
    listeners: Vec<(u64, Listener<T>)>,
}

/// Clears `notifying` when the outermost pass ends, including on unwind.
struct NotifyGuard<'a, T> {
    slot: &'a RefCell<Slot<T>>,
}

impl<T> Drop for NotifyGuard<'_, T> {
    fn drop(&mut self) {
        self.slot.borrow_mut().notifying = false;
    }
}

/// Shared, observable value.
///
/// Cloning an `Observable` yields another handle to the same value.
pub struct Observable<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("Observable")
            .field("value", &slot.value)
            .field("version", &slot.version)
            .field("listeners", &slot.listeners.len())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable holding `value` at version 0.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                value,
                version: 0,
                next_id: 0,
                notifying: false,
                listeners: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.slot.borrow().value.clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.borrow().value)
    }

    /// Replace the value. Notifies subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut slot = self.slot.borrow_mut();
            if slot.value == value {
                return;
            }
            slot.value = value;
            slot.version += 1;
        }
        self.notify();
    }

    /// Mutate the value in place. Notifies subscribers if it changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut slot = self.slot.borrow_mut();
            let before = slot.value.clone();
            f(&mut slot.value);
            if slot.value == before {
                return;
            }
            slot.version += 1;
        }
        self.notify();
    }

    /// Register a change listener.
    ///
    /// The listener is not called with the current value; it runs on the
    /// next change. Dropping the returned guard unsubscribes.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut slot = self.slot.borrow_mut();
            let id = slot.next_id;
            slot.next_id += 1;
            slot.listeners.push((id, Rc::new(listener)));
            id
        };
        let weak: Weak<RefCell<Slot<T>>> = Rc::downgrade(&self.slot);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(slot) = weak.upgrade() {
                    slot.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Number of changes observed so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.slot.borrow().version
    }

    /// Number of live listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.slot.borrow().listeners.len()
    }

    fn notify(&self) {
        {
            let mut slot = self.slot.borrow_mut();
            if slot.notifying {
                // The running pass sees the version change and restarts.
                return;
            }
            slot.notifying = true;
        }
        let _guard = NotifyGuard { slot: &self.slot };

        'pass: loop {
            let (value, version, listeners) = {
                let slot = self.slot.borrow();
                let listeners: Vec<Listener<T>> =
                    slot.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
                (slot.value.clone(), slot.version, listeners)
            };
            for listener in listeners {
                listener(&value);
                if self.version() != version {
                    continue 'pass;
                }
            }
            break;
        }
    }
}

/// RAII guard for an observable listener.
#[must_use = "dropping this guard unsubscribes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the listener registered for the life of its source.
    pub fn detach(mut self) {
        self.cancel = None;
    }

    /// Remove the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Value derived from a source [`Observable`].
///
/// Recomputed on every upstream notification; its own subscribers are only
/// notified when the derived value changes.
pub struct Computed<T> {
    value: Observable<T>,
    _source: Rc<Subscription>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _source: Rc::clone(&self._source),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Computed").field(&self.value).finish()
    }
}

impl<T: Clone + PartialEq + 'static> Computed<T> {
    /// Derive a value from `source` with `map`.
    pub fn new<S>(source: &Observable<S>, map: impl Fn(&S) -> T + 'static) -> Self
    where
        S: Clone + PartialEq + 'static,
    {
        let value = Observable::new(source.with(&map));
        let target = value.clone();
        let subscription = source.subscribe(move |s| target.set(map(s)));
        Self {
            value,
            _source: Rc::new(subscription),
        }
    }

    /// Current derived value.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Listen for changes of the derived value.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.value.subscribe(listener)
    }

    /// Number of derived-value changes observed so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.value.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn set_same_value_does_not_bump_version() {
        let obs = Observable::new(3_u32);
        obs.set(3);
        assert_eq!(obs.version(), 0);
        obs.set(4);
        assert_eq!(obs.version(), 1);
        assert_eq!(obs.get(), 4);
    }

    #[test]
    fn update_notifies_once_per_change() {
        let obs = Observable::new(vec![1, 2]);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = obs.subscribe(move |_| h.set(h.get() + 1));

        obs.update(|v| v.push(3));
        obs.update(|_| {});
        assert_eq!(hits.get(), 1);
        assert_eq!(obs.get(), vec![1, 2, 3]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let obs = Observable::new(0_i32);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let sub = obs.subscribe(move |v| s.set(*v));
        obs.set(5);
        drop(sub);
        obs.set(9);
        assert_eq!(seen.get(), 5);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn detached_subscription_stays_registered() {
        let obs = Observable::new(0_i32);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        obs.subscribe(move |v| s.set(*v)).detach();
        obs.set(7);
        assert_eq!(seen.get(), 7);
        assert_eq!(obs.subscriber_count(), 1);
    }

    #[test]
    fn listener_may_write_its_own_observable() {
        let obs = Observable::new(0_i32);
        let inner = obs.clone();
        let _sub = obs.subscribe(move |v| {
            if *v < 3 {
                inner.set(v + 1);
            }
        });
        obs.set(1);
        assert_eq!(obs.get(), 3);
    }

    #[test]
    fn write_back_leaves_every_listener_on_final_value() {
        let obs = Observable::new(0_i32);
        let inner = obs.clone();
        let _bump = obs.subscribe(move |v| {
            if *v == 1 {
                inner.set(2);
            }
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _record = obs.subscribe(move |v| s.borrow_mut().push(*v));

        obs.set(1);
        assert_eq!(obs.get(), 2);
        assert_eq!(*seen.borrow(), vec![2]);
        assert_eq!(obs.version(), 2);
    }

    #[test]
    fn computed_after_write_back_listener_is_current() {
        let source = Observable::new(0_i32);
        let inner = source.clone();
        let _bump = source.subscribe(move |v| {
            if *v == 1 {
                inner.set(2);
            }
        });
        let doubled = Computed::new(&source, |v| v * 2);

        source.set(1);
        assert_eq!(source.get(), 2);
        assert_eq!(doubled.get(), 4);
    }

    #[test]
    fn panicking_listener_does_not_wedge_notifications() {
        let obs = Observable::new(0_i32);
        let sub = obs.subscribe(|v| assert!(*v != 1, "listener rejects 1"));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| obs.set(1)));
        assert!(result.is_err());
        drop(sub);

        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let _sub = obs.subscribe(move |v| s.set(*v));
        obs.set(5);
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn subscription_outliving_source_is_harmless() {
        let sub = {
            let obs = Observable::new(1_u8);
            obs.subscribe(|_| {})
        };
        drop(sub);
    }

    #[test]
    fn computed_tracks_source() {
        let source = Observable::new((false, false));
        let any = Computed::new(&source, |(a, b)| *a || *b);
        assert!(!any.get());

        source.set((true, false));
        assert!(any.get());
        source.set((true, true));
        assert!(any.get());
        assert_eq!(any.version(), 1);

        source.set((false, false));
        assert!(!any.get());
        assert_eq!(any.version(), 2);
    }

    #[test]
    fn computed_subscribers_see_derived_changes_only() {
        let source = Observable::new(0_u32);
        let parity = Computed::new(&source, |n| n % 2);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = parity.subscribe(move |_| h.set(h.get() + 1));

        source.set(2);
        source.set(4);
        source.set(5);
        assert_eq!(hits.get(), 1);
    }
}
