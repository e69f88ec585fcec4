#![forbid(unsafe_code)]

//! Map detail popup for a selected point.

use serde::{Deserialize, Serialize};

use scrim_core::Subscription;
use scrim_runtime::{LockProfile, Page};

use crate::registry::{OverlayRegistry, OverlayState};

/// A point selected on the map. The neutral point is `(0, 0, "")`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub title: String,
}

impl MapPoint {
    #[must_use]
    pub fn new(lat: f64, lon: f64, title: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            title: title.into(),
        }
    }
}

/// The map popup overlay. Closing it reopens remembered side menus.
#[derive(Debug, Clone)]
pub struct MapPopup {
    registry: OverlayRegistry<MapPoint>,
}

impl MapPopup {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let lock = page.scroll_lock(LockProfile::map_popup());
        Self {
            registry: OverlayRegistry::new("map-popup", page.clone(), lock, true),
        }
    }

    /// Show the popup for `point`.
    pub fn open(&self, point: MapPoint) {
        self.registry.open(point);
    }

    /// Hide the popup, resume scrolling and restore side menus.
    pub fn close(&self) -> bool {
        self.registry.close()
    }

    #[must_use]
    pub fn state(&self) -> OverlayState<MapPoint> {
        self.registry.state()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.registry.is_visible()
    }

    /// The selected point, neutral while hidden.
    #[must_use]
    pub fn selected(&self) -> MapPoint {
        self.registry.state().payload
    }

    pub fn subscribe(&self, listener: impl Fn(&OverlayState<MapPoint>) + 'static) -> Subscription {
        self.registry.subscribe(listener)
    }

    #[must_use]
    pub fn registry(&self) -> &OverlayRegistry<MapPoint> {
        &self.registry
    }
}
