#![forbid(unsafe_code)]

//! Core: reactive containers, the host document seam, deferred work, and
//! configuration shared by every Scrim crate.

pub mod config;
pub mod deferred;
pub mod host;
pub mod logging;
pub mod memory_host;
pub mod reactive;

pub use config::{ConfigError, LOCKED_VIEWPORT_CONTENT, ScrimConfig};
pub use deferred::{DeferredQueue, DeterministicClock};
pub use host::{
    Document, Element, HostError, HostResult, InlineStyle, Priority, StyleProp,
};
pub use memory_host::{DocumentState, MemoryDocument};
pub use reactive::{Computed, Observable, Subscription};

// Root paths for the log macros; the no-op versions are `#[macro_export]`ed.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};
