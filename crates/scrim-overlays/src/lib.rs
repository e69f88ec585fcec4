#![forbid(unsafe_code)]

//! Scrim overlays: map popup, modal set, image and video viewers.
//!
//! Each overlay kind is a reactive state container whose open and close
//! actions compose the page's scroll lease, side-menu memory and dismiss
//! stack from `scrim-runtime`.
//!
//! # Example
//!
//! ```
//! use scrim_core::ScrimConfig;
//! use scrim_overlays::{DismissGesture, MapPoint, Overlays};
//!
//! let overlays = Overlays::headless(ScrimConfig::default());
//! overlays.map_popup().open(MapPoint::new(45.0, 9.0, "Milan"));
//! assert!(overlays.dismiss(DismissGesture::Escape).closed);
//! assert!(!overlays.map_popup().is_visible());
//! ```

pub mod coordinator;
pub mod dispatch;
pub mod file_kind;
pub mod map_popup;
pub mod media_viewer;
pub mod modal_set;
pub mod registry;

pub use coordinator::{DismissGesture, DismissOutcome, OverlayWatch, Overlays};
pub use dispatch::{FileOpener, FileRoute, OpenVideo};
pub use file_kind::{FileDescriptor, FileKind, classify, is_image_file, is_video_file};
pub use map_popup::{MapPoint, MapPopup};
pub use media_viewer::{ImageViewer, MediaItem, VideoViewer};
pub use modal_set::{ModalKind, ModalSet, ModalSetState, UnknownModal};
pub use registry::{OverlayRegistry, OverlayState};
