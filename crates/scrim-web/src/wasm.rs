#![forbid(unsafe_code)]

use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::prelude::*;

use scrim_overlays::{MapPoint, OverlayWatch, Overlays};
use scrim_runtime::{LockOutcome, MenuCallback, MenuCallbacks, MenuSet};

use crate::api::{self, ApiError, OverlaySummary};
use crate::dom::WebDocument;

fn js_err(err: ApiError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn js_callback(f: Function) -> impl Fn() + 'static {
    move || {
        if let Err(err) = f.call0(&JsValue::NULL) {
            scrim_core::warn!(error = ?err, "script callback threw");
        }
    }
}

/// Handle returned by `ScrimWeb.watch`; call `free()` or `unsubscribe()` to
/// stop notifications.
#[wasm_bindgen]
pub struct ScrimWatch {
    _watch: OverlayWatch,
}

#[wasm_bindgen]
impl ScrimWatch {
    pub fn unsubscribe(self) {}
}

/// Overlay coordinator exported to JavaScript.
///
/// Scripts drive time with `tick(performance.now())` from an animation frame
/// or timer; deferred scroll restores and menu follow-ups run from there.
#[wasm_bindgen]
pub struct ScrimWeb {
    overlays: Overlays,
}

#[wasm_bindgen]
impl ScrimWeb {
    /// Bind to the page document. `config` is an optional JSON object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<ScrimWeb, JsValue> {
        let config = api::parse_config(config.as_deref()).map_err(js_err)?;
        let host = WebDocument::from_global()
            .map_err(|e| js_err(ApiError::Host(e.to_string())))?;
        Ok(Self {
            overlays: Overlays::new(Rc::new(host), config),
        })
    }

    /// Advance page time to `now_ms`. Returns the number of deferred tasks run.
    pub fn tick(&self, now_ms: f64) -> u32 {
        api::page_time(now_ms)
            .map_or(0, |now| u32::try_from(self.overlays.tick(now)).unwrap_or(u32::MAX))
    }

    /// Close the most recent overlay. Returns whether the caller should
    /// prevent the gesture's default action.
    pub fn dismiss(&self, back: Option<bool>) -> bool {
        self.overlays
            .dismiss(api::gesture(back.unwrap_or(false)))
            .prevent_default
    }

    #[wasm_bindgen(js_name = openMapPopup)]
    pub fn open_map_popup(&self, lat: f64, lon: f64, title: String) {
        self.overlays.map_popup().open(MapPoint::new(lat, lon, title));
    }

    /// Close menus (remembering them) and open the map popup.
    #[wasm_bindgen(js_name = openMapPopupOverMenus)]
    pub fn open_map_popup_over_menus(&self, lat: f64, lon: f64, title: String) -> bool {
        self.overlays
            .open_map_popup_over_menus(MapPoint::new(lat, lon, title))
    }

    #[wasm_bindgen(js_name = closeMapPopup)]
    pub fn close_map_popup(&self) -> bool {
        self.overlays.map_popup().close()
    }

    /// Open a modal by name (`addMemory`, `addPosition`, `memoryDetails`,
    /// `positionDetails`) with an optional JSON payload.
    #[wasm_bindgen(js_name = openModal)]
    pub fn open_modal(&self, name: &str, payload: Option<String>) -> Result<(), JsValue> {
        let (kind, payload) = api::parse_modal(name, payload.as_deref()).map_err(js_err)?;
        self.overlays.modals().open(kind, payload);
        Ok(())
    }

    #[wasm_bindgen(js_name = closeModal)]
    pub fn close_modal(&self, name: &str) -> Result<bool, JsValue> {
        let (kind, _) = api::parse_modal(name, None).map_err(js_err)?;
        Ok(self.overlays.modals().close(kind))
    }

    #[wasm_bindgen(js_name = hasOpenModals)]
    pub fn has_open_modals(&self) -> bool {
        self.overlays.modals().has_open_modals().get()
    }

    /// Route a file descriptor (JSON) to a viewer. Returns `"image"`,
    /// `"video"` or `"external"`.
    #[wasm_bindgen(js_name = openFile)]
    pub fn open_file(&self, file: &str) -> Result<String, JsValue> {
        let file = api::parse_file(file).map_err(js_err)?;
        Ok(self.overlays.open_file(&file).as_str().to_owned())
    }

    #[wasm_bindgen(js_name = closeImageViewer)]
    pub fn close_image_viewer(&self) -> bool {
        self.overlays.image_viewer().close()
    }

    #[wasm_bindgen(js_name = closeVideoViewer)]
    pub fn close_video_viewer(&self) -> bool {
        self.overlays.video_viewer().close()
    }

    /// Call `callback` whenever an overlay opens, closes or changes payload,
    /// including closes made by `dismiss`.
    pub fn watch(&self, callback: Function) -> ScrimWatch {
        ScrimWatch {
            _watch: self.overlays.watch(js_callback(callback)),
        }
    }

    /// Lock page scrolling behind the side menus.
    #[wasm_bindgen(js_name = lockScroll)]
    pub fn lock_scroll(&self) -> bool {
        matches!(
            self.overlays.lock_scroll(),
            LockOutcome::Acquired | LockOutcome::Joined
        )
    }

    #[wasm_bindgen(js_name = unlockScroll)]
    pub fn unlock_scroll(&self) -> bool {
        matches!(
            self.overlays.unlock_scroll(),
            LockOutcome::Released | LockOutcome::Retained
        )
    }

    /// Register the menus' close functions. Without `unlock_scroll`, the
    /// deferred unlock releases the lock taken by `lockScroll`.
    #[wasm_bindgen(js_name = registerMenuCloseCallbacks)]
    pub fn register_menu_close_callbacks(
        &self,
        memories: Function,
        positions: Function,
        unlock_scroll: Option<Function>,
    ) {
        let close = MenuCallbacks::new(js_callback(memories), js_callback(positions));
        match unlock_scroll {
            Some(f) => {
                let unlock = Rc::new(js_callback(f)) as MenuCallback;
                self.overlays
                    .page()
                    .menus()
                    .register_close_callbacks(close, Some(unlock));
            }
            None => self.overlays.register_menu_close_callbacks(close),
        }
    }

    #[wasm_bindgen(js_name = registerMenuOpenCallbacks)]
    pub fn register_menu_open_callbacks(&self, memories: Function, positions: Function) {
        self.overlays
            .page()
            .menus()
            .register_open_callbacks(MenuCallbacks::new(js_callback(memories), js_callback(positions)));
    }

    #[wasm_bindgen(js_name = updateMenuState)]
    pub fn update_menu_state(&self, memories: bool, positions: bool) {
        self.overlays
            .page()
            .menus()
            .update_current_state(MenuSet::from_open(memories, positions));
    }

    #[wasm_bindgen(js_name = closeMenusForPopup)]
    pub fn close_menus_for_popup(&self, memories: bool, positions: bool) -> bool {
        self.overlays
            .page()
            .menus()
            .close_menus_for_popup(MenuSet::from_open(memories, positions))
    }

    #[wasm_bindgen(js_name = storeMenuState)]
    pub fn store_menu_state(&self, memories: bool, positions: bool) {
        self.overlays
            .page()
            .menus()
            .store_menu_state(MenuSet::from_open(memories, positions));
    }

    #[wasm_bindgen(js_name = restoreMenuState)]
    pub fn restore_menu_state(&self) {
        self.overlays.page().menus().restore_menu_state();
    }

    #[wasm_bindgen(js_name = clearStoredMenuState)]
    pub fn clear_stored_menu_state(&self) {
        self.overlays.page().menus().clear_stored_menu_state();
    }

    #[wasm_bindgen(js_name = closeAllMenus)]
    pub fn close_all_menus(&self) -> bool {
        self.overlays.page().menus().close_all_menus()
    }

    #[wasm_bindgen(js_name = closeMenusOnInteraction)]
    pub fn close_menus_on_interaction(&self) {
        self.overlays.page().menus().close_menus_on_interaction();
    }

    /// Current overlay state as JSON.
    pub fn summary(&self) -> Result<String, JsValue> {
        OverlaySummary::of(&self.overlays).to_json().map_err(js_err)
    }
}
