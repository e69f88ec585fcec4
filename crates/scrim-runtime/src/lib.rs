#![forbid(unsafe_code)]

//! Scrim runtime: the state machines behind overlay coordination.
//!
//! # Key Components
//!
//! - [`Page`] - page-scoped context owning the document, timers and shared state
//! - [`ScrollLock`] / [`ViewportGuard`] - scroll suspension with exact restoration
//! - [`MenuState`] - remembers and reopens side menus around overlays
//! - [`PopupStack`] - LIFO registry used by the dismiss gesture
//!
//! Overlay kinds themselves live in `scrim-overlays`; this crate only knows
//! about the shared resources they coordinate on.

pub mod menu_state;
pub mod page;
pub mod popup_stack;
pub mod scroll_lock;

pub use menu_state::{Menu, MenuCallback, MenuCallbacks, MenuSet, MenuSnapshot, MenuState};
pub use page::Page;
pub use popup_stack::{PopupId, PopupStack};
pub use scroll_lock::{LockOutcome, LockProfile, ScrollLock, ScrollSnapshot, ViewportGuard};
