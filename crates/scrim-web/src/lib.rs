#![forbid(unsafe_code)]

//! Browser host for Scrim.
//!
//! On `wasm32` this crate provides [`WebDocument`], the DOM implementation
//! of the host document, and `ScrimWeb`, the `wasm-bindgen` surface scripts
//! use to open and dismiss overlays and to register side-menu callbacks.

pub mod api;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom::WebDocument;
#[cfg(target_arch = "wasm32")]
pub use wasm::ScrimWeb;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets. The stub coordinates overlays without a document.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct ScrimWeb {
    overlays: scrim_overlays::Overlays,
}

#[cfg(not(target_arch = "wasm32"))]
impl ScrimWeb {
    /// Headless coordinator; `config` is an optional JSON object.
    pub fn new(config: Option<String>) -> Result<Self, api::ApiError> {
        let config = api::parse_config(config.as_deref())?;
        Ok(Self {
            overlays: scrim_overlays::Overlays::headless(config),
        })
    }

    /// Current overlay state as JSON.
    pub fn summary(&self) -> Result<String, api::ApiError> {
        api::OverlaySummary::of(&self.overlays).to_json()
    }

    #[must_use]
    pub fn overlays(&self) -> &scrim_overlays::Overlays {
        &self.overlays
    }
}
