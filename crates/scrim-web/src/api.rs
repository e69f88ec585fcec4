#![forbid(unsafe_code)]

//! Target-independent pieces of the JavaScript surface: argument parsing
//! and the JSON summary returned to scripts.

use core::time::Duration;

use serde::Serialize;

use scrim_core::{ConfigError, ScrimConfig};
use scrim_overlays::{DismissGesture, FileDescriptor, MapPoint, MediaItem, ModalKind, Overlays, UnknownModal};

/// Error surfaced to JavaScript as a thrown string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Config(String),
    Modal(String),
    Json(String),
    Host(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "invalid config: {msg}"),
            Self::Modal(msg) => write!(f, "{msg}"),
            Self::Json(msg) => write!(f, "invalid JSON: {msg}"),
            Self::Host(msg) => write!(f, "host unavailable: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<UnknownModal> for ApiError {
    fn from(err: UnknownModal) -> Self {
        Self::Modal(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Configuration from an optional JSON string; absent or blank means defaults.
pub fn parse_config(json: Option<&str>) -> Result<ScrimConfig, ApiError> {
    match json.map(str::trim) {
        None | Some("") => Ok(ScrimConfig::default()),
        Some(json) => Ok(ScrimConfig::from_json(json)?),
    }
}

/// Page time from a `performance.now()` reading. Negative or non-finite
/// readings map to `None`.
#[must_use]
pub fn page_time(now_ms: f64) -> Option<Duration> {
    if !now_ms.is_finite() || now_ms < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(now_ms / 1000.0).ok()
}

#[must_use]
pub fn gesture(back: bool) -> DismissGesture {
    if back {
        DismissGesture::Back
    } else {
        DismissGesture::Escape
    }
}

/// Modal kind and optional JSON payload.
pub fn parse_modal(
    name: &str,
    payload: Option<&str>,
) -> Result<(ModalKind, Option<serde_json::Value>), ApiError> {
    let kind = name.parse::<ModalKind>()?;
    let payload = match payload.map(str::trim) {
        None | Some("") => None,
        Some(json) => Some(serde_json::from_str(json)?),
    };
    Ok((kind, payload))
}

pub fn parse_file(json: &str) -> Result<FileDescriptor, ApiError> {
    Ok(FileDescriptor::from_json(json)?)
}

/// Observable overlay state, serialized for scripts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySummary {
    pub map_popup: Option<MapPoint>,
    pub open_modals: Vec<&'static str>,
    pub has_open_modals: bool,
    pub image: Option<MediaItem>,
    pub video: Option<MediaItem>,
    pub stack_depth: usize,
    pub scroll_locked: bool,
}

impl OverlaySummary {
    #[must_use]
    pub fn of(overlays: &Overlays) -> Self {
        let visible = |state: scrim_overlays::OverlayState<MediaItem>| {
            state.visible.then_some(state.payload)
        };
        let map = overlays.map_popup().state();
        Self {
            map_popup: map.visible.then_some(map.payload),
            open_modals: overlays
                .modals()
                .state()
                .open_kinds()
                .into_iter()
                .map(ModalKind::name)
                .collect(),
            has_open_modals: overlays.modals().has_open_modals().get(),
            image: visible(overlays.image_viewer().state()),
            video: visible(overlays.video_viewer().state()),
            stack_depth: overlays.page().popups().len(),
            scroll_locked: overlays.page().lease_holders() > 0,
        }
    }

    pub fn to_json(&self) -> Result<String, ApiError> {
        Ok(serde_json::to_string(self)?)
    }
}
