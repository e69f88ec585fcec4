#![forbid(unsafe_code)]

//! Scrim public facade crate.
//!
//! Re-exports the overlay coordination surface from the internal crates and
//! offers a prelude for day-to-day usage.
//!
//! ```
//! use scrim::prelude::*;
//! use std::rc::Rc;
//!
//! let doc = Rc::new(MemoryDocument::new().with_scroll_y(120.0));
//! let overlays = Overlays::new(doc.clone(), ScrimConfig::default());
//!
//! overlays.modals().open_add_memory(None);
//! assert_eq!(doc.style(Element::Body, StyleProp::Position).as_deref(), Some("fixed"));
//!
//! overlays.dismiss(DismissGesture::Escape);
//! overlays.tick(std::time::Duration::from_millis(50));
//! assert_eq!(doc.scroll_y(), 120.0);
//! ```

use std::fmt;
#[cfg(feature = "overlays")]
use std::rc::Rc;

// --- Core re-exports -------------------------------------------------------

pub use scrim_core::{
    Computed, ConfigError, DeferredQueue, DeterministicClock, Document, DocumentState, Element,
    HostError, HostResult, InlineStyle, LOCKED_VIEWPORT_CONTENT, MemoryDocument, Observable,
    Priority, ScrimConfig, StyleProp, Subscription,
};

// --- Runtime re-exports ----------------------------------------------------

pub use scrim_runtime::{
    LockOutcome, LockProfile, Menu, MenuCallback, MenuCallbacks, MenuSet, MenuSnapshot,
    MenuState, Page, PopupId, PopupStack, ScrollLock, ScrollSnapshot, ViewportGuard,
};

// --- Overlay re-exports ----------------------------------------------------

#[cfg(feature = "overlays")]
pub use scrim_overlays::{
    DismissGesture, DismissOutcome, FileDescriptor, FileKind, FileOpener, FileRoute, ImageViewer,
    MapPoint, MapPopup, MediaItem, ModalKind, ModalSet, ModalSetState, OverlayRegistry,
    OverlayState, OverlayWatch, Overlays, UnknownModal, VideoViewer, classify, is_image_file,
    is_video_file,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Scrim setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration could not be loaded.
    Config(ConfigError),
    /// The host document rejected an operation or is missing.
    Host(HostError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Host(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Host(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<HostError> for Error {
    fn from(err: HostError) -> Self {
        Self::Host(err)
    }
}

/// Standard result type for Scrim APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Setup ----------------------------------------------------------------

/// Overlays bound to `host`.
///
/// Fails with [`Error::Host`] when no document is available; use
/// [`Overlays::headless`] for render passes without one.
#[cfg(feature = "overlays")]
pub fn attach(host: Option<Rc<dyn Document>>, config: ScrimConfig) -> Result<Overlays> {
    let host = host.ok_or(HostError::Unavailable("document"))?;
    Ok(Overlays::new(host, config))
}

/// [`attach`] with the configuration read from JSON.
#[cfg(all(feature = "overlays", feature = "serde"))]
pub fn attach_json(host: Option<Rc<dyn Document>>, config: &str) -> Result<Overlays> {
    let config = ScrimConfig::from_json(config)?;
    attach(host, config)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Document, Element, Error, LockProfile, MemoryDocument, MenuCallbacks, MenuSet, Page,
        Result, ScrimConfig, StyleProp,
    };

    #[cfg(feature = "overlays")]
    pub use crate::{
        DismissGesture, FileDescriptor, MapPoint, MediaItem, ModalKind, Overlays, attach,
    };

    pub use crate::{core, runtime};

    #[cfg(feature = "overlays")]
    pub use crate::overlays;
}

pub use scrim_core as core;
#[cfg(feature = "overlays")]
pub use scrim_overlays as overlays;
pub use scrim_runtime as runtime;
