#![forbid(unsafe_code)]

//! Log macros for every Scrim crate.
//!
//! With the `tracing` feature the `tracing` event macros are re-exported.
//! Without it, same-named macros expand to nothing, so call sites such as
//! `scrim_core::debug!(marker = %class, "document lease acquired")` compile
//! either way. Scrim logs at trace, debug and warn and opens no spans.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Discarded: built without `tracing`.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Discarded: built without `tracing`.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Discarded: built without `tracing`.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}
